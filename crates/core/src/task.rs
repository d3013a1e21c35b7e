//! Task models.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::party::Party;

/// Task status filter values accepted by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Open,
    Completed,
    Pending,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Completed => "completed",
            TaskStatus::Pending => "pending",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Open
    }
}

/// A task category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
}

/// Repeat rule for recurring tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repeat {
    /// Repeats every `interval` weeks/months/years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<RepeatFrequency>,
    /// Day of the week or month this task repeats on; `-1` for the last day
    /// of the month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RepeatFrequency {
    Yearly,
    Monthly,
    Weekly,
}

/// A user as embedded in task payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedUser {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A task, possibly linked to a party or opportunity and possibly part of a
/// track (a templated sequence of tasks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Assigned by the remote API; omitted on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Date (without a time element) when this task is due.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_on: Option<NaiveDate>,
    /// Time (without a date element) when this task is due, in the user's
    /// timezone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<Party>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<NestedUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<Repeat>,
    /// Days after the previous task, when part of a track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_after: Option<u32>,
    /// How the due date is calculated for tracks: TRACK_START, END_DATE or
    /// LAST_TASK.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_delay_rule: Option<String>,
    /// How `daysAfter` is counted for tracks: TRACK_DAYS, TRACK_WORKDAYS or
    /// TRACK_WEEKS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_day_delay_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_task: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_track: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
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
    fn task_payload_decodes() {
        let task: Task = serde_json::from_value(json!({
            "id": 21,
            "description": "Call back",
            "dueOn": "2025-06-01",
            "dueTime": "17:00:00",
            "status": "open",
            "owner": {"id": 2, "username": "ada"},
            "party": {"id": 3, "type": "person", "firstName": "Ada"},
            "repeat": {"interval": 2, "frequency": "WEEKLY", "on": "MONDAY"},
        }))
        .unwrap();
        assert_eq!(task.id, Some(21));
        assert_eq!(task.status, Some(TaskStatus::Open));
        assert_eq!(task.due_on.unwrap().to_string(), "2025-06-01");
        assert_eq!(task.owner.unwrap().username.as_deref(), Some("ada"));
        assert!(matches!(task.party, Some(Party::Person(_))));
        assert_eq!(
            task.repeat.unwrap().frequency,
            Some(RepeatFrequency::Weekly)
        );
    }

    #[test]
    fn nested_unknown_party_type_fails_task_decode() {
        let result: Result<Task, _> = serde_json::from_value(json!({
            "id": 21,
            "description": "Call back",
            "party": {"id": 3, "type": "robot"},
        }));
        assert!(result.is_err());
    }

    #[test]
    fn task_serializes_without_absent_fields() {
        let task = Task {
            id: None,
            description: "Send offer".to_string(),
            detail: None,
            category: None,
            due_on: None,
            due_time: None,
            status: Some(TaskStatus::Pending),
            party: None,
            opportunity: None,
            owner: None,
            repeat: None,
            days_after: None,
            task_delay_rule: None,
            task_day_delay_rule: None,
            next_task: None,
            has_track: None,
            completed_by: None,
            completed_at: None,
            created_at: None,
            updated_at: None,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            json!({"description": "Send offer", "status": "pending"})
        );
    }
}
