//! Suggest subtasks prompt template.
//!
//! Asks the model to decompose each top-level task into a few subtasks.

use serde::Serialize;

use crate::entities::Task;

use super::PromptTemplate;

/// Template ID
pub const SUGGEST_SUBTASKS: &str = "suggest-subtasks";

/// Context for the suggest-subtasks prompt.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestSubtasksContext {
    /// Number of tasks with an empty parent in the batch
    pub top_level_count: usize,
    /// Upper bound on subtasks per task
    pub max_subtasks: usize,
    /// The whole batch, subtasks included
    pub tasks: Vec<SuggestionCandidate>,
}

impl SuggestSubtasksContext {
    pub fn new(tasks: &[Task], max_subtasks: usize) -> Self {
        Self {
            top_level_count: tasks.iter().filter(|t| t.is_top_level()).count(),
            max_subtasks,
            tasks: tasks.iter().map(SuggestionCandidate::from).collect(),
        }
    }
}

/// The task fields the model sees when decomposing.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionCandidate {
    pub id: String,
    pub title: String,
    pub notes: String,
    pub parent: String,
}

impl From<&Task> for SuggestionCandidate {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            notes: task.notes.clone().unwrap_or_default(),
            parent: task.parent.clone(),
        }
    }
}

/// Get the suggest-subtasks template.
pub fn template() -> PromptTemplate {
    PromptTemplate::new(SUGGEST_SUBTASKS, SYSTEM_PROMPT, USER_PROMPT)
        .with_description("Propose actionable subtasks for top-level tasks")
}

const SYSTEM_PROMPT: &str = r#"You are a task planning assistant. Break high-level tasks into small, concrete, actionable subtasks.

Rules:
1. Only propose subtasks for tasks whose "parent" field is empty
2. Tasks with a non-empty "parent" are already subtasks; never return an entry for them
3. Propose between 1 and {{max_subtasks}} subtask titles per task, each short and actionable
4. Do not repeat subtasks that already exist under a task
5. Return ONLY a valid JSON array with no additional text or markdown formatting

Response format (strict JSON array):
[
  {
    "parentTaskId": "task-id-1",
    "subtasks": ["First concrete step", "Second concrete step"],
    "rationale": "Why this breakdown helps"
  }
]"#;

const USER_PROMPT: &str = r"Suggest subtasks for the following tasks. Return exactly {{top_level_count}} entries, one for each task with an empty parent.

Input tasks:
{{{json tasks}}}

Respond with ONLY the JSON array, no other text.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_counts_top_level_tasks() {
        let tasks = vec![
            Task::new("p1", "Plan offsite"),
            Task::new("c1", "Book venue").with_parent("p1"),
            Task::new("p2", "Write report"),
        ];

        let context = SuggestSubtasksContext::new(&tasks, 3);
        assert_eq!(context.top_level_count, 2);
        assert_eq!(context.tasks.len(), 3);

        let (system, user) = template().render(&context).unwrap();
        assert!(system.contains("between 1 and 3 subtask titles"));
        assert!(user.contains("Return exactly 2 entries"));
        assert!(user.contains("\"parent\": \"p1\""));
    }
}
