//! Core entities for task prioritization.

mod records;
mod task;

pub use records::{PriorityRecord, SubtaskSuggestion, NEUTRAL_PRIORITY, POSITION_WIDTH};
pub use task::{NewTask, Task, TaskList, TaskStatus};
