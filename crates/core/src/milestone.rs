//! Milestone models. Milestones are static pipeline reference data and are
//! read-only in this system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sales pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    pub name: String,
}

/// A named stage in a sales pipeline carrying a win-probability percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
    pub probability: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<Pipeline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_stale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn milestone_payload_decodes() {
        let milestone: Milestone = serde_json::from_value(json!({
            "id": 5,
            "name": "Proposal",
            "probability": 40,
            "pipeline": {"id": 1, "name": "Sales"},
            "daysUntilStale": 14,
        }))
        .unwrap();
        assert_eq!(milestone.probability, 40);
        assert_eq!(milestone.pipeline.unwrap().name, "Sales");
        assert_eq!(milestone.days_until_stale, Some(14));
    }
}
