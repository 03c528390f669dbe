//! Rank tasks prompt template.
//!
//! Asks the model to score and order a batch of top-level tasks.

use serde::Serialize;

use crate::entities::Task;

use super::PromptTemplate;

/// Template ID
pub const RANK_TASKS: &str = "rank-tasks";

/// Context for the rank-tasks prompt.
#[derive(Debug, Clone, Serialize)]
pub struct RankTasksContext {
    /// Number of records the model must return
    pub task_count: usize,
    /// Tasks to rank
    pub tasks: Vec<RankCandidate>,
}

impl RankTasksContext {
    pub fn new(tasks: &[Task]) -> Self {
        Self {
            task_count: tasks.len(),
            tasks: tasks.iter().map(RankCandidate::from).collect(),
        }
    }
}

/// The task fields the model sees when ranking.
#[derive(Debug, Clone, Serialize)]
pub struct RankCandidate {
    pub id: String,
    pub title: String,
    pub due: String,
    pub notes: String,
    pub position: String,
}

impl From<&Task> for RankCandidate {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            due: task.due.clone().unwrap_or_default(),
            notes: task.notes.clone().unwrap_or_default(),
            position: task.position.clone(),
        }
    }
}

/// Get the rank-tasks template.
pub fn template() -> PromptTemplate {
    PromptTemplate::new(RANK_TASKS, SYSTEM_PROMPT, USER_PROMPT)
        .with_description("Score and order tasks by priority")
}

const SYSTEM_PROMPT: &str = r#"You are a task prioritization assistant. Your job is to analyze tasks and return a JSON array of prioritized tasks.

Rules:
1. Analyze due dates - tasks with closer due dates get higher priority
2. Look for priority markers in titles like [HIGH], [URGENT], [P1]
3. Consider task complexity and dependencies from notes
4. Return ONLY a valid JSON array with no additional text or markdown formatting

Response format (strict JSON array):
[
  {
    "taskId": "task-id-1",
    "priority": 95.5,
    "explanation": "High priority due to urgent marker and close deadline",
    "newPosition": "00001"
  }
]

The priority should be a number between 0-100, with higher numbers indicating higher priority.
The newPosition should be a string of 5 digits, ordered from highest to lowest priority (00001 being highest)."#;

const USER_PROMPT: &str = r"Prioritize these {{task_count}} tasks. Return exactly {{task_count}} entries, one per task, using each task's id as taskId.

Input tasks:
{{{json tasks}}}

Respond with ONLY the JSON array, no other text.";
