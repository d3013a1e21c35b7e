//! Structured filter queries for the Capsule filter endpoints.
//!
//! Capsule retrieves filtered entities through `POST /{entity}/filters/results`
//! with a list of field/operator/value conditions combined with AND semantics.
//! [`build_filter`] translates the loosely-typed key/value map a tool receives
//! into that shape, inferring operators from key suffixes ("addedOn_after") or
//! explicit `{"operator": ..., "value": ...}` maps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Control keys understood by the query layer. These are never treated as
/// filter fields, even when an entity has a filterable field of the same name.
pub const RESERVED_KEYS: &[&str] = &["page", "per_page", "embed", "q"];

/// Operator suffixes accepted in input keys, e.g. `dueOn_after`.
/// Unrecognized suffixes fall back to `is`.
const OPERATOR_SUFFIXES: &[(&str, &str)] = &[
    ("after", "is after"),
    ("before", "is before"),
    ("contains", "contains"),
    ("starts", "starts with"),
    ("ends", "ends with"),
    ("gt", "is greater than"),
    ("lt", "is less than"),
    ("within", "is within last"),
    ("not", "is not"),
];

/// Fields the opportunity filter endpoint accepts.
pub const OPPORTUNITY_FILTER_FIELDS: &[&str] = &["addedOn", "milestone", "owner", "status", "tag"];

/// Fields the task filter endpoint accepts.
pub const TASK_FILTER_FIELDS: &[&str] = &[
    "addedOn",
    "category",
    "completedOn",
    "description",
    "dueOn",
    "id",
    "opportunity",
    "owner",
    "party",
    "status",
    "tag",
    "updatedOn",
];

/// Fields the party filter endpoint accepts.
pub const PARTY_FILTER_FIELDS: &[&str] = &[
    "addedOn",
    "city",
    "email",
    "hasEmailAddress",
    "hasPeople",
    "id",
    "jobTitle",
    "lastContactedOn",
    "name",
    "owner",
    "phone",
    "tag",
    "team",
    "type",
    "updatedOn",
];

/// A single field/operator/value predicate. The value is always carried as a
/// string on the wire regardless of its source type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    pub value: String,
}

/// Sort order for filtered results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    /// `ascending` or `descending`.
    pub direction: String,
}

/// A structured filter query: conditions combined with AND semantics.
///
/// The remote API documents nested groups for OR logic inside `conditions`;
/// no call path here constructs them, so this layer models the flat AND list
/// only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub conditions: Vec<Condition>,
    #[serde(rename = "orderBy", default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<OrderBy>>,
}

impl Filter {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            order_by: None,
        }
    }
}

fn operator_for_suffix(suffix: &str) -> &'static str {
    OPERATOR_SUFFIXES
        .iter()
        .find(|(s, _)| *s == suffix)
        .map(|(_, op)| *op)
        .unwrap_or("is")
}

/// Render a condition value as the string the filter API expects.
/// JSON strings are used verbatim; everything else uses its JSON rendering.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build a [`Filter`] from a free-form user input map.
///
/// Each input key is classified as either a reserved control key (skipped), a
/// plain filterable field, a filterable field with an operator suffix
/// (`field_suffix` where the prefix up to the first `_` is itself filterable),
/// or an unknown key (silently ignored). A value of the form
/// `{"operator": ..., "value": ...}` overrides any suffix-derived operator.
///
/// Conditions are emitted in lexicographic order of the effective field name,
/// ties broken by the original input key; caller-supplied input order is not
/// part of the contract. Returns `None` when no condition was produced, so
/// the caller can fall through to free-text search or a plain listing.
pub fn build_filter(user_input: &Map<String, Value>, filterable_fields: &[&str]) -> Option<Filter> {
    let mut picked: Vec<(&str, Condition)> = Vec::new();

    for (key, raw) in user_input {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }

        let (field, suffix_operator) = if filterable_fields.contains(&key.as_str()) {
            (key.as_str(), "is")
        } else if let Some((prefix, suffix)) = key.split_once('_') {
            // Only split when the prefix is itself a filterable field; a field
            // name that merely contains the separator is left alone.
            if filterable_fields.contains(&prefix) {
                (prefix, operator_for_suffix(suffix))
            } else {
                continue;
            }
        } else {
            continue;
        };

        // An explicit operator map wins over the suffix-derived operator.
        let (operator, value) = match raw.as_object() {
            Some(map) if map.contains_key("operator") => {
                let operator = map
                    .get("operator")
                    .and_then(Value::as_str)
                    .unwrap_or(suffix_operator)
                    .to_string();
                let value = map.get("value").cloned().unwrap_or(Value::Null);
                (operator, stringify(&value))
            }
            _ => (suffix_operator.to_string(), stringify(raw)),
        };

        picked.push((
            key.as_str(),
            Condition {
                field: field.to_string(),
                operator,
                value,
            },
        ));
    }

    if picked.is_empty() {
        return None;
    }

    picked.sort_by(|(a_key, a), (b_key, b)| a.field.cmp(&b.field).then(a_key.cmp(b_key)));
    Some(Filter::new(picked.into_iter().map(|(_, c)| c).collect()))
}
