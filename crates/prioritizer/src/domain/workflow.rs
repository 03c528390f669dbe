//! Per-list workflow driver.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::ai::AIProvider;
use crate::config::PrioritizerConfig;
use crate::entities::{Task, TaskList};
use crate::errors::{PrioritizerError, PrioritizerResult};
use crate::store::{find_list_by_title, TaskStore};

use super::{ModelSettings, ReorderEngine, SubtaskMaterializer};

/// What happened to one target list.
#[derive(Debug, Clone)]
pub enum ListOutcome {
    Completed {
        moved: usize,
        subtasks_created: usize,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: PrioritizerError,
    },
}

impl ListOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Outcome for one configured list title.
#[derive(Debug, Clone)]
pub struct ListReport {
    pub title: String,
    pub outcome: ListOutcome,
}

/// Result of a full run, one entry per configured title in order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub lists: Vec<ListReport>,
}

impl RunReport {
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, ListOutcome::Completed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ListOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ListOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&ListOutcome) -> bool) -> usize {
        self.lists.iter().filter(|l| pred(&l.outcome)).count()
    }
}

/// Runs reorder and subtask creation over each target list in turn.
pub struct Workflow {
    store: Arc<dyn TaskStore>,
    reorder: ReorderEngine,
    materializer: Option<SubtaskMaterializer>,
}

impl Workflow {
    pub fn new(
        store: Arc<dyn TaskStore>,
        provider: Arc<dyn AIProvider>,
        config: &PrioritizerConfig,
    ) -> Self {
        let settings = ModelSettings::from(config);

        let reorder = ReorderEngine::new(Arc::clone(&store), Arc::clone(&provider), settings.clone())
            .with_move_delay(Duration::from_millis(config.move_delay_ms));

        let materializer = config.suggest_subtasks.then(|| {
            SubtaskMaterializer::new(
                Arc::clone(&store),
                Arc::clone(&provider),
                settings,
                config.max_subtasks,
            )
        });

        Self {
            store,
            reorder,
            materializer,
        }
    }

    /// Process every title in order. A failed list never stops the next one.
    pub async fn run(&self, target_lists: &[String]) -> RunReport {
        let mut report = RunReport::default();

        for title in target_lists {
            let outcome = self.process_list(title).await;

            match &outcome {
                ListOutcome::Completed {
                    moved,
                    subtasks_created,
                } => info!(
                    list = %title,
                    moved = moved,
                    subtasks = subtasks_created,
                    "List processed"
                ),
                ListOutcome::Skipped { reason } => warn!(list = %title, reason = %reason, "List skipped"),
                ListOutcome::Failed { error } => error!(list = %title, error = %error, "List failed"),
            }

            report.lists.push(ListReport {
                title: title.clone(),
                outcome,
            });
        }

        report
    }

    /// Resolve, fetch, reorder, then materialize one list.
    pub async fn process_list(&self, title: &str) -> ListOutcome {
        let list = match find_list_by_title(self.store.as_ref(), title).await {
            Ok(list) => list,
            Err(e @ PrioritizerError::ListNotFound { .. }) => {
                return ListOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
            Err(error) => return ListOutcome::Failed { error },
        };

        info!(list = %list.title, list_id = %list.id, "Processing list");

        let tasks = match self.store.list_tasks(&list.id).await {
            Ok(tasks) => tasks,
            Err(error) => return ListOutcome::Failed { error },
        };

        if !tasks.iter().any(Task::is_top_level) {
            return ListOutcome::Skipped {
                reason: "no top-level tasks".to_string(),
            };
        }

        match self.process_tasks(&list, &tasks).await {
            Ok((moved, subtasks_created)) => ListOutcome::Completed {
                moved,
                subtasks_created,
            },
            Err(error) => ListOutcome::Failed { error },
        }
    }

    async fn process_tasks(
        &self,
        list: &TaskList,
        tasks: &[Task],
    ) -> PrioritizerResult<(usize, usize)> {
        let moved = self.reorder.reorder(list, tasks).await?;

        let created = match &self.materializer {
            Some(materializer) => materializer.run(list, tasks).await?.len(),
            None => 0,
        };

        Ok((moved, created))
    }
}
