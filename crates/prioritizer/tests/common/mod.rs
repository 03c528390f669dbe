//! In-memory fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use prioritizer::ai::{AIMessage, AIProvider, AIResponse, GenerateOptions, TokenUsage};
use prioritizer::entities::{NewTask, Task, TaskList};
use prioritizer::errors::{PrioritizerError, PrioritizerResult};
use prioritizer::store::TaskStore;

/// A store call worth asserting on.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Move {
        task_id: String,
        previous: Option<String>,
    },
    Insert {
        list_id: String,
        task: NewTask,
        parent: Option<String>,
    },
}

#[derive(Default)]
struct StoreState {
    lists: Vec<TaskList>,
    tasks: HashMap<String, Vec<Task>>,
    calls: Vec<StoreCall>,
    fail_move: Option<String>,
    fail_insert: Option<String>,
    next_id: usize,
}

/// Task store backed by vectors; vector order is list order.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<StoreState>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(self, id: &str, title: &str, tasks: Vec<Task>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.lists.push(TaskList::new(id, title));
            state.tasks.insert(id.to_string(), tasks);
        }
        self
    }

    /// Make every move of `task_id` fail.
    pub fn fail_move_of(self, task_id: &str) -> Self {
        self.state.lock().unwrap().fail_move = Some(task_id.to_string());
        self
    }

    /// Make every insert titled `title` fail.
    pub fn fail_insert_of(self, title: &str) -> Self {
        self.state.lock().unwrap().fail_insert = Some(title.to_string());
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn moves(&self) -> Vec<(String, Option<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StoreCall::Move { task_id, previous } => Some((task_id, previous)),
                StoreCall::Insert { .. } => None,
            })
            .collect()
    }

    pub fn inserts(&self) -> Vec<(NewTask, Option<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StoreCall::Insert { task, parent, .. } => Some((task, parent)),
                StoreCall::Move { .. } => None,
            })
            .collect()
    }

    pub fn order(&self, list_id: &str) -> Vec<String> {
        self.state.lock().unwrap().tasks[list_id]
            .iter()
            .map(|t| t.id.clone())
            .collect()
    }
}

#[async_trait]
impl TaskStore for FakeStore {
    fn store_type(&self) -> &'static str {
        "fake"
    }

    async fn list_task_lists(&self) -> PrioritizerResult<Vec<TaskList>> {
        Ok(self.state.lock().unwrap().lists.clone())
    }

    async fn get_task_list(&self, list_id: &str) -> PrioritizerResult<TaskList> {
        self.state
            .lock()
            .unwrap()
            .lists
            .iter()
            .find(|l| l.id == list_id)
            .cloned()
            .ok_or_else(|| PrioritizerError::StoreApi {
                status: 404,
                message: "Not Found".to_string(),
            })
    }

    async fn list_tasks(&self, list_id: &str) -> PrioritizerResult<Vec<Task>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .tasks
            .get(list_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_task(&self, list_id: &str, task_id: &str) -> PrioritizerResult<Task> {
        let state = self.state.lock().unwrap();
        state
            .tasks
            .get(list_id)
            .and_then(|tasks| tasks.iter().find(|t| t.id == task_id))
            .cloned()
            .ok_or_else(|| PrioritizerError::TaskNotFound {
                list_id: list_id.to_string(),
                task_id: task_id.to_string(),
            })
    }

    async fn update_task(&self, list_id: &str, task: &Task) -> PrioritizerResult<Task> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .tasks
            .get_mut(list_id)
            .and_then(|tasks| tasks.iter_mut().find(|t| t.id == task.id))
            .ok_or_else(|| PrioritizerError::TaskNotFound {
                list_id: list_id.to_string(),
                task_id: task.id.clone(),
            })?;
        *slot = task.clone();
        Ok(task.clone())
    }

    async fn move_task(
        &self,
        list_id: &str,
        task_id: &str,
        previous: Option<&str>,
    ) -> PrioritizerResult<Task> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Move {
            task_id: task_id.to_string(),
            previous: previous.map(str::to_string),
        });

        if state.fail_move.as_deref() == Some(task_id) {
            return Err(PrioritizerError::StoreApi {
                status: 503,
                message: "Backend Error".to_string(),
            });
        }

        let tasks = state.tasks.get_mut(list_id).unwrap();
        let from = tasks.iter().position(|t| t.id == task_id).unwrap();
        let task = tasks.remove(from);
        let to = match previous {
            Some(prev) => tasks.iter().position(|t| t.id == prev).unwrap() + 1,
            None => 0,
        };
        tasks.insert(to, task.clone());
        Ok(task)
    }

    async fn insert_task(
        &self,
        list_id: &str,
        task: &NewTask,
        parent: Option<&str>,
    ) -> PrioritizerResult<Task> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Insert {
            list_id: list_id.to_string(),
            task: task.clone(),
            parent: parent.map(str::to_string),
        });

        if state.fail_insert.as_deref() == Some(task.title.as_str()) {
            return Err(PrioritizerError::StoreApi {
                status: 500,
                message: "Internal Error".to_string(),
            });
        }

        state.next_id += 1;
        let mut created = Task::new(format!("new-{}", state.next_id), task.title.clone());
        created.parent = parent.unwrap_or_default().to_string();
        created.due.clone_from(&task.due);
        created.notes.clone_from(&task.notes);
        state
            .tasks
            .entry(list_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }
}

/// Provider that replays canned responses in order and records prompts.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<PrioritizerResult<String>>>,
    prompts: Mutex<Vec<Vec<AIMessage>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, text: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn fail(self, error: PrioritizerError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// User message of the `n`th call.
    pub fn user_prompt(&self, n: usize) -> String {
        self.prompts.lock().unwrap()[n]
            .iter()
            .rev()
            .find(|m| m.role == prioritizer::ai::AIRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AIProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn generate_text(
        &self,
        model: &str,
        messages: &[AIMessage],
        _options: &GenerateOptions,
    ) -> PrioritizerResult<AIResponse> {
        self.prompts.lock().unwrap().push(messages.to_vec());

        let text = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PrioritizerError::Ai("no scripted response".to_string())))?;

        Ok(AIResponse {
            text,
            usage: TokenUsage::default(),
            model: model.to_string(),
            provider: "scripted".to_string(),
        })
    }
}
