//! Task store trait definitions.

use async_trait::async_trait;

use crate::entities::{NewTask, Task, TaskList, TaskStatus};
use crate::errors::{PrioritizerError, PrioritizerResult};

/// Remote task-list service keyed by list ID and task ID.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Get store type identifier
    fn store_type(&self) -> &'static str;

    // === List Operations ===

    /// All task lists visible to the authenticated user
    async fn list_task_lists(&self) -> PrioritizerResult<Vec<TaskList>>;

    /// A single task list by ID
    async fn get_task_list(&self, list_id: &str) -> PrioritizerResult<TaskList>;

    // === Task Operations ===

    /// Every task in a list, including subtasks and completed tasks
    async fn list_tasks(&self, list_id: &str) -> PrioritizerResult<Vec<Task>>;

    /// A single task
    async fn get_task(&self, list_id: &str, task_id: &str) -> PrioritizerResult<Task>;

    /// Replace a task's fields
    async fn update_task(&self, list_id: &str, task: &Task) -> PrioritizerResult<Task>;

    /// Move a task to immediately follow `previous`, or to the front of its
    /// level when `previous` is `None`.
    async fn move_task(
        &self,
        list_id: &str,
        task_id: &str,
        previous: Option<&str>,
    ) -> PrioritizerResult<Task>;

    /// Create a task, optionally as a child of `parent`.
    async fn insert_task(
        &self,
        list_id: &str,
        task: &NewTask,
        parent: Option<&str>,
    ) -> PrioritizerResult<Task>;
}

/// Resolve a list title to its list. Matching is exact and case-sensitive.
pub async fn find_list_by_title(
    store: &dyn TaskStore,
    title: &str,
) -> PrioritizerResult<TaskList> {
    store
        .list_task_lists()
        .await?
        .into_iter()
        .find(|list| list.title == title)
        .ok_or_else(|| PrioritizerError::ListNotFound {
            title: title.to_string(),
        })
}

/// Fetch a task, set its status, and write it back.
pub async fn set_task_status(
    store: &dyn TaskStore,
    list_id: &str,
    task_id: &str,
    status: TaskStatus,
) -> PrioritizerResult<Task> {
    let mut task = store.get_task(list_id, task_id).await?;
    task.status = status;
    if status == TaskStatus::NeedsAction {
        task.completed = None;
    }
    store.update_task(list_id, &task).await
}
