//! Parsing and validation of model output.
//!
//! Model output is untrusted. Structural problems (undecodable JSON, wrong
//! record count, unknown task IDs) are errors; recoverable field problems are
//! repaired in place and logged.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::entities::{PriorityRecord, SubtaskSuggestion, Task, NEUTRAL_PRIORITY};
use crate::errors::{PrioritizerError, PrioritizerResult};

/// Strip surrounding whitespace and markdown code fences, with or without a
/// language tag.
pub fn clean_response(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        text = &rest[tag_len..];
    }

    let trimmed = text.trim_end();
    text = trimmed.strip_suffix("```").unwrap_or(trimmed);

    text.trim()
}

/// Decode a JSON array of `R`, check it has exactly `expected` records, and
/// run `repair` over each record with its 0-based index.
pub fn parse_records<R, F>(
    raw: &str,
    kind: &'static str,
    expected: usize,
    mut repair: F,
) -> PrioritizerResult<Vec<R>>
where
    R: DeserializeOwned,
    F: FnMut(usize, &mut R),
{
    let cleaned = clean_response(raw);

    let mut records: Vec<R> =
        serde_json::from_str(cleaned).map_err(|e| PrioritizerError::AiResponseParse {
            reason: e.to_string(),
            response: cleaned.to_string(),
        })?;

    if records.len() != expected {
        return Err(PrioritizerError::RecordCountMismatch {
            kind,
            expected,
            got: records.len(),
        });
    }

    for (index, record) in records.iter_mut().enumerate() {
        repair(index, record);
    }

    Ok(records)
}

/// Parse a ranking response for the tasks that were submitted.
///
/// Out-of-range priorities become 50 and malformed positions are replaced
/// with the record's 1-based array rank.
pub fn parse_priorities(raw: &str, submitted: &[Task]) -> PrioritizerResult<Vec<PriorityRecord>> {
    let records = parse_records(raw, "priorities", submitted.len(), repair_priority)?;

    let known: HashSet<&str> = submitted.iter().map(|t| t.id.as_str()).collect();
    check_ids(records.iter().map(|r| r.task_id.as_str()), &known)?;

    Ok(records)
}

fn repair_priority(index: usize, record: &mut PriorityRecord) {
    if !record.has_valid_priority() {
        warn!(
            task_id = %record.task_id,
            priority = record.priority,
            "Priority out of range, using neutral default"
        );
        record.priority = NEUTRAL_PRIORITY;
    }

    if !record.has_valid_position() {
        let position = PriorityRecord::synthesize_position(index);
        warn!(
            task_id = %record.task_id,
            position = %record.new_position,
            replacement = %position,
            "Malformed position, synthesizing from rank"
        );
        record.new_position = position;
    }
}

/// Parse a subtask-suggestion response.
///
/// One suggestion is required per top-level task in `submitted`; suggestions
/// for subtasks or unknown tasks are rejected. Titles are trimmed, blanks and
/// repeats dropped, and the list capped at `max_subtasks`.
pub fn parse_subtask_suggestions(
    raw: &str,
    submitted: &[Task],
    max_subtasks: usize,
) -> PrioritizerResult<Vec<SubtaskSuggestion>> {
    let top_level: HashSet<&str> = submitted
        .iter()
        .filter(|t| t.is_top_level())
        .map(|t| t.id.as_str())
        .collect();

    let suggestions = parse_records(
        raw,
        "subtask suggestions",
        top_level.len(),
        |_, suggestion: &mut SubtaskSuggestion| {
            let mut seen = HashSet::new();
            suggestion.subtasks = suggestion
                .subtasks
                .iter()
                .map(|title| title.trim().to_string())
                .filter(|title| !title.is_empty() && seen.insert(title.clone()))
                .collect();

            if suggestion.subtasks.len() > max_subtasks {
                warn!(
                    parent = %suggestion.parent_task_id,
                    count = suggestion.subtasks.len(),
                    max = max_subtasks,
                    "Too many subtasks suggested, truncating"
                );
                suggestion.subtasks.truncate(max_subtasks);
            }
        },
    )?;

    check_ids(
        suggestions.iter().map(|s| s.parent_task_id.as_str()),
        &top_level,
    )?;

    Ok(suggestions)
}

/// Every ID must be known and appear once.
fn check_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    known: &HashSet<&str>,
) -> PrioritizerResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !known.contains(id) {
            return Err(PrioritizerError::UnknownTask {
                task_id: id.to_string(),
            });
        }
        if !seen.insert(id) {
            return Err(PrioritizerError::DuplicateTask {
                task_id: id.to_string(),
            });
        }
    }
    Ok(())
}
