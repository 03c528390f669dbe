//! Records produced by parsing one inference response.
//!
//! Both types live only for the duration of a single list's workflow.

use serde::{Deserialize, Deserializer, Serialize};

/// Width of a rank position string ("00001").
pub const POSITION_WIDTH: usize = 5;

/// Score given to a record whose priority is out of range.
pub const NEUTRAL_PRIORITY: f64 = 50.0;

/// One task's ranking as returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityRecord {
    pub task_id: String,

    /// Score in [0, 100]; higher is more urgent
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,

    /// Fixed-width zero-padded rank, "00001" being the highest
    #[serde(default, deserialize_with = "null_as_default")]
    pub new_position: String,
}

/// Models emit `null` for fields they have nothing to say about; treat it
/// like an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PriorityRecord {
    pub fn new(
        task_id: impl Into<String>,
        priority: f64,
        explanation: impl Into<String>,
        new_position: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            priority,
            explanation: explanation.into(),
            new_position: new_position.into(),
        }
    }

    /// Zero-padded rank for the record at `index` (0-based) of a response.
    ///
    /// Only indexes below 99999 fit the five-digit width.
    pub fn synthesize_position(index: usize) -> String {
        debug_assert!(index < 99_999, "rank {index} does not fit {POSITION_WIDTH} digits");
        format!("{:0width$}", index + 1, width = POSITION_WIDTH)
    }

    pub fn has_valid_priority(&self) -> bool {
        (0.0..=100.0).contains(&self.priority)
    }

    /// Exactly five ASCII digits, so string order equals rank order.
    pub fn has_valid_position(&self) -> bool {
        self.new_position.len() == POSITION_WIDTH
            && self.new_position.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Proposed decomposition of one top-level task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskSuggestion {
    pub parent_task_id: String,

    /// Proposed subtask titles, in the order they should be created
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtasks: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_positions_are_zero_padded() {
        assert_eq!(PriorityRecord::synthesize_position(0), "00001");
        assert_eq!(PriorityRecord::synthesize_position(9), "00010");
        assert_eq!(PriorityRecord::synthesize_position(122), "00123");
        assert_eq!(PriorityRecord::synthesize_position(99_998), "99999");
    }

    #[test]
    fn test_padded_positions_sort_numerically() {
        let mut positions = vec!["00010", "00002", "00001"];
        positions.sort_unstable();
        assert_eq!(positions, vec!["00001", "00002", "00010"]);
    }

    #[test]
    fn test_missing_priority_is_zero() {
        let record: PriorityRecord =
            serde_json::from_str(r#"{"taskId": "a", "newPosition": "00001"}"#).unwrap();
        assert!(record.priority.abs() < f64::EPSILON);
        assert!(record.has_valid_priority());
        assert!(record.has_valid_position());
        assert!(record.explanation.is_empty());
    }

    #[test]
    fn test_null_fields_decode_as_empty() {
        let record: PriorityRecord = serde_json::from_str(
            r#"{"taskId": "a", "priority": null, "explanation": null, "newPosition": null}"#,
        )
        .unwrap();
        assert!(record.priority.abs() < f64::EPSILON);
        assert!(record.explanation.is_empty());
        assert!(record.new_position.is_empty());

        let suggestion: SubtaskSuggestion = serde_json::from_str(
            r#"{"parentTaskId": "p1", "subtasks": null, "rationale": null}"#,
        )
        .unwrap();
        assert!(suggestion.subtasks.is_empty());
        assert!(suggestion.rationale.is_empty());
    }

    #[test]
    fn test_position_must_be_five_digits() {
        let mut record = PriorityRecord::new("a", 50.0, "", "0001");
        assert!(!record.has_valid_position());
        record.new_position = "0001a".to_string();
        assert!(!record.has_valid_position());
        record.new_position = "00042".to_string();
        assert!(record.has_valid_position());
    }

    #[test]
    fn test_suggestion_wire_names() {
        let suggestion: SubtaskSuggestion = serde_json::from_str(
            r#"{"parentTaskId": "p1", "subtasks": ["Research", "Design"], "rationale": "big"}"#,
        )
        .unwrap();
        assert_eq!(suggestion.parent_task_id, "p1");
        assert_eq!(suggestion.subtasks, vec!["Research", "Design"]);
    }
}
