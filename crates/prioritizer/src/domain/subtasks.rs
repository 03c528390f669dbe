//! Subtask materializer.
//!
//! Suggestions are requested for the whole fetched batch; the parser checks
//! the count against the locally computed top-level tasks. Creation is
//! sequential and stops at the first failed insert.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::ai::prompts::{SuggestSubtasksContext, SUGGEST_SUBTASKS};
use crate::ai::{parse_subtask_suggestions, AIProvider, PromptManager};
use crate::entities::{NewTask, SubtaskSuggestion, Task, TaskList};
use crate::errors::{PrioritizerError, PrioritizerResult};
use crate::store::TaskStore;

use super::{generate, ModelSettings};

/// Notes attached to every generated subtask.
pub fn subtask_notes(rationale: &str) -> String {
    format!("Auto-generated subtask suggested by AI.\nRationale: {rationale}")
}

pub struct SubtaskMaterializer {
    store: Arc<dyn TaskStore>,
    provider: Arc<dyn AIProvider>,
    prompts: PromptManager,
    settings: ModelSettings,
    max_subtasks: usize,
}

impl SubtaskMaterializer {
    pub fn new(
        store: Arc<dyn TaskStore>,
        provider: Arc<dyn AIProvider>,
        settings: ModelSettings,
        max_subtasks: usize,
    ) -> Self {
        Self {
            store,
            provider,
            prompts: PromptManager::default(),
            settings,
            max_subtasks,
        }
    }

    /// Ask for one suggestion per top-level task in `tasks`.
    ///
    /// No request is made when the batch has no top-level tasks.
    pub async fn suggest(&self, tasks: &[Task]) -> PrioritizerResult<Vec<SubtaskSuggestion>> {
        if !tasks.iter().any(Task::is_top_level) {
            return Ok(Vec::new());
        }

        let context = SuggestSubtasksContext::new(tasks, self.max_subtasks);
        let raw = generate(
            self.provider.as_ref(),
            &self.prompts,
            &self.settings,
            SUGGEST_SUBTASKS,
            &context,
        )
        .await?;

        parse_subtask_suggestions(&raw, tasks, self.max_subtasks)
    }

    /// Create the suggested subtasks. Titles already present under the same
    /// parent, in `existing` or created earlier in this call, are skipped.
    pub async fn materialize(
        &self,
        list: &TaskList,
        existing: &[Task],
        suggestions: &[SubtaskSuggestion],
    ) -> PrioritizerResult<Vec<Task>> {
        let mut created = Vec::new();
        let mut created_titles: HashSet<(String, String)> = HashSet::new();

        for suggestion in suggestions {
            let parent = self
                .store
                .get_task(&list.id, &suggestion.parent_task_id)
                .await?;

            for title in &suggestion.subtasks {
                let key = (parent.id.clone(), title.trim().to_string());
                if has_child_titled(existing, &parent.id, title) || created_titles.contains(&key) {
                    debug!(
                        list = %list.title,
                        parent = %parent.id,
                        title = %title,
                        "Subtask already exists, skipping"
                    );
                    continue;
                }

                let mut new_task = NewTask::new(title.clone());
                new_task.parent = Some(parent.id.clone());
                new_task.notes = Some(subtask_notes(&suggestion.rationale));
                new_task.due.clone_from(&parent.due);

                let task = self
                    .store
                    .insert_task(&list.id, &new_task, Some(&parent.id))
                    .await
                    .map_err(|e| PrioritizerError::InsertFailed {
                        parent_id: parent.id.clone(),
                        title: title.clone(),
                        reason: e.to_string(),
                    })?;

                debug!(list = %list.title, parent = %parent.id, task_id = %task.id, "Created subtask");
                created_titles.insert(key);
                created.push(task);
            }
        }

        Ok(created)
    }

    /// Suggest and create subtasks for one list's batch.
    pub async fn run(&self, list: &TaskList, tasks: &[Task]) -> PrioritizerResult<Vec<Task>> {
        let suggestions = self.suggest(tasks).await?;
        let created = self.materialize(list, tasks, &suggestions).await?;
        info!(list = %list.title, count = created.len(), "Created subtasks");
        Ok(created)
    }
}

fn has_child_titled(tasks: &[Task], parent_id: &str, title: &str) -> bool {
    let title = title.trim();
    tasks
        .iter()
        .any(|t| t.parent == parent_id && t.title.trim() == title)
}
