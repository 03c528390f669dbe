//! Reordering engine.
//!
//! The store only knows relative moves ("put X right after Y"), so a ranking
//! is replayed front to back: the first task moves to the front, and every
//! following task moves to just after the one placed before it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::ai::prompts::{RankTasksContext, RANK_TASKS};
use crate::ai::{parse_priorities, AIProvider, PromptManager};
use crate::entities::{PriorityRecord, Task, TaskList};
use crate::errors::{PrioritizerError, PrioritizerResult};
use crate::store::TaskStore;

use super::{generate, ModelSettings};

/// One relative move: place `task_id` right after `previous`, or at the front
/// when `previous` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOp {
    pub task_id: String,
    pub previous: Option<String>,
}

/// Stable sort by position string. Positions are zero-padded, so string order
/// is rank order; ties keep their response order.
pub fn sort_by_position(mut records: Vec<PriorityRecord>) -> Vec<PriorityRecord> {
    records.sort_by(|a, b| a.new_position.cmp(&b.new_position));
    records
}

/// Turn a ranked sequence into exactly one move per record.
pub fn plan_moves(ranked: &[PriorityRecord]) -> Vec<MoveOp> {
    ranked
        .iter()
        .fold(
            (Vec::with_capacity(ranked.len()), None::<&str>),
            |(mut moves, previous), record| {
                moves.push(MoveOp {
                    task_id: record.task_id.clone(),
                    previous: previous.map(str::to_string),
                });
                (moves, Some(record.task_id.as_str()))
            },
        )
        .0
}

/// Ranks a list's top-level tasks and rewrites the list order to match.
pub struct ReorderEngine {
    store: Arc<dyn TaskStore>,
    provider: Arc<dyn AIProvider>,
    prompts: PromptManager,
    settings: ModelSettings,
    move_delay: Duration,
}

impl ReorderEngine {
    pub fn new(
        store: Arc<dyn TaskStore>,
        provider: Arc<dyn AIProvider>,
        settings: ModelSettings,
    ) -> Self {
        Self {
            store,
            provider,
            prompts: PromptManager::default(),
            settings,
            move_delay: Duration::ZERO,
        }
    }

    /// Pause between successive moves. Zero disables the pause.
    pub fn with_move_delay(mut self, delay: Duration) -> Self {
        self.move_delay = delay;
        self
    }

    /// Ask the model to rank the top-level tasks in `tasks`, returning the
    /// validated records sorted by position.
    pub async fn rank(&self, tasks: &[Task]) -> PrioritizerResult<Vec<PriorityRecord>> {
        let top_level: Vec<Task> = tasks.iter().filter(|t| t.is_top_level()).cloned().collect();
        if top_level.is_empty() {
            return Ok(Vec::new());
        }

        let context = RankTasksContext::new(&top_level);
        let raw = generate(
            self.provider.as_ref(),
            &self.prompts,
            &self.settings,
            RANK_TASKS,
            &context,
        )
        .await?;

        let records = parse_priorities(&raw, &top_level)?;
        Ok(sort_by_position(records))
    }

    /// Apply moves one at a time. The first failure stops the replay.
    pub async fn apply_moves(&self, list: &TaskList, moves: &[MoveOp]) -> PrioritizerResult<usize> {
        for (i, op) in moves.iter().enumerate() {
            if i > 0 && !self.move_delay.is_zero() {
                tokio::time::sleep(self.move_delay).await;
            }

            debug!(
                list = %list.title,
                task_id = %op.task_id,
                previous = ?op.previous,
                "Moving task"
            );

            self.store
                .move_task(&list.id, &op.task_id, op.previous.as_deref())
                .await
                .map_err(|e| PrioritizerError::MoveFailed {
                    task_id: op.task_id.clone(),
                    list: list.title.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(moves.len())
    }

    /// Rank and reorder one list. Returns the number of moves issued.
    pub async fn reorder(&self, list: &TaskList, tasks: &[Task]) -> PrioritizerResult<usize> {
        let ranked = self.rank(tasks).await?;
        if ranked.is_empty() {
            info!(list = %list.title, "No top-level tasks to reorder");
            return Ok(0);
        }

        for record in &ranked {
            debug!(
                list = %list.title,
                task_id = %record.task_id,
                priority = record.priority,
                position = %record.new_position,
                explanation = %record.explanation,
                "Ranked task"
            );
        }

        let moves = plan_moves(&ranked);
        let moved = self.apply_moves(list, &moves).await?;
        info!(list = %list.title, count = moved, "Reordered list");
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, position: &str) -> PriorityRecord {
        PriorityRecord::new(id, 50.0, "", position)
    }

    #[test]
    fn test_padded_positions_sort_numerically() {
        let sorted = sort_by_position(vec![
            record("ten", "00010"),
            record("one", "00001"),
            record("two", "00002"),
        ]);
        let ids: Vec<_> = sorted.iter().map(|r| r.task_id.as_str()).collect();
        assert_eq!(ids, vec!["one", "two", "ten"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let sorted = sort_by_position(vec![
            record("b", "00001"),
            record("a", "00001"),
            record("c", "00000"),
        ]);
        let ids: Vec<_> = sorted.iter().map(|r| r.task_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_plan_moves_chains_predecessors() {
        let ranked = sort_by_position(vec![
            record("A", "00002"),
            record("B", "00003"),
            record("C", "00001"),
        ]);

        let moves = plan_moves(&ranked);

        assert_eq!(
            moves,
            vec![
                MoveOp {
                    task_id: "C".to_string(),
                    previous: None
                },
                MoveOp {
                    task_id: "A".to_string(),
                    previous: Some("C".to_string())
                },
                MoveOp {
                    task_id: "B".to_string(),
                    previous: Some("A".to_string())
                },
            ]
        );
    }

    #[test]
    fn test_plan_moves_empty() {
        assert!(plan_moves(&[]).is_empty());
    }
}
