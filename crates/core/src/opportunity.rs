//! Opportunity models and value normalization.
//!
//! Capsule stores an opportunity's `value.amount` as a per-unit figure: an
//! amount of 20 with a MONTH duration basis and a duration of 6 is worth 120
//! in total. At the tool boundary the amount may instead be supplied as a
//! total, discriminated by `value_type`; [`normalize_for_write`] converts it
//! back to the per-unit figure the remote API expects. On read, [`derive`]
//! computes the total and the probability-weighted current value.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// The monetary value of an opportunity. On the wire `amount` is always per
/// unit of the duration basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityValue {
    pub amount: f64,
    /// Currency code, e.g. `EUR` or `USD`.
    pub currency: String,
}

/// The time unit over which a per-unit opportunity value recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DurationBasis {
    Fixed,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// How a supplied `value.amount` is to be interpreted. Local-only
/// discriminator; never forwarded to the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    PerUnit,
    Total,
}

/// Reference to a linked record by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub id: u64,
}

/// Shallow linked record as embedded in read payloads; unrecognized keys
/// (`type`, `pictureURL`, ...) are preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedRecord {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for creating or updating an opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityDraft {
    pub name: String,
    /// The main contact for this opportunity.
    pub party: RecordRef,
    /// The pipeline milestone this opportunity belongs to.
    pub milestone: RecordRef,
    pub value: OpportunityValue,
    /// `per_unit` if `value.amount` is per duration unit, `total` if it is
    /// the total across all units.
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Expected close date (ISO 8601 date).
    #[serde(rename = "expectedCloseOn", default, skip_serializing_if = "Option::is_none")]
    pub expected_close_on: Option<NaiveDate>,
    /// Win probability percentage (0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<u8>,
    #[serde(rename = "durationBasis", default, skip_serializing_if = "Option::is_none")]
    pub duration_basis: Option<DurationBasis>,
    /// Must be absent when `durationBasis` is FIXED.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl OpportunityDraft {
    /// Check schema invariants not expressible in the type shape.
    pub fn validate(&self) -> CoreResult<()> {
        if self.duration.is_some() && self.duration_basis == Some(DurationBasis::Fixed) {
            return Err(CoreError::Validation(
                "duration must be null when durationBasis is FIXED".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the wire payload for create/update calls.
    ///
    /// `value_type` is stripped (the remote API has no such field) and a
    /// `total` amount is converted to the per-unit figure the API stores.
    /// `None` fields are omitted.
    pub fn to_wire(&self) -> CoreResult<Value> {
        self.validate()?;
        let mut wire = serde_json::to_value(self)?;
        if let Value::Object(ref mut fields) = wire {
            fields.remove("value_type");
            let amount = normalize_for_write(self.value.amount, self.value_type, self.duration);
            if let Some(Value::Object(value_fields)) = fields.get_mut("value") {
                value_fields.insert("amount".to_string(), amount.into());
            }
        }
        Ok(wire)
    }
}

/// An opportunity as returned by the remote API, plus the derived value
/// fields computed locally after decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<LinkedRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<LinkedRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<OpportunityValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_close_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_basis: Option<DurationBasis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Total value across the full duration. Computed locally, never read
    /// from the wire.
    #[serde(rename = "total_value", skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub total_value: Option<f64>,
    /// Probability-weighted value, the preferred figure for reporting.
    /// Computed locally, never read from the wire.
    #[serde(rename = "current_value", skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
}

impl Opportunity {
    /// Attach `total_value`/`current_value` derived from the raw fields.
    /// Opportunities without a value stay underived.
    pub fn with_derived(mut self) -> Self {
        if let Some(value) = &self.value {
            let derived = derive(
                value.amount,
                self.duration,
                self.duration_basis,
                self.probability,
            );
            self.total_value = Some(derived.total_value);
            self.current_value = derived.current_value;
        }
        self
    }
}

/// Convert a tool-boundary amount to the per-unit figure the remote API
/// stores: a `total` amount is divided by the duration when one is present
/// and non-zero; everything else passes through unchanged. The duration
/// basis plays no part in this rule.
pub fn normalize_for_write(amount: f64, value_type: ValueType, duration: Option<u32>) -> f64 {
    match (value_type, duration) {
        (ValueType::Total, Some(duration)) if duration != 0 => amount / duration as f64,
        _ => amount,
    }
}

/// Derived value figures for an opportunity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedValue {
    pub total_value: f64,
    /// Absent when the opportunity carries no probability.
    pub current_value: Option<f64>,
}

/// Compute the total and probability-weighted value from raw fields:
/// `total = amount * duration` when a non-FIXED basis and a duration are both
/// present, else `amount`; `current = total * probability / 100` when a
/// probability is present.
pub fn derive(
    amount: f64,
    duration: Option<u32>,
    duration_basis: Option<DurationBasis>,
    probability: Option<u8>,
) -> DerivedValue {
    let total_value = match (duration_basis, duration) {
        (Some(basis), Some(duration)) if basis != DurationBasis::Fixed => {
            amount * duration as f64
        }
        _ => amount,
    };
    let current_value = probability.map(|p| total_value * p as f64 / 100.0);
    DerivedValue {
        total_value,
        current_value,
    }
}
