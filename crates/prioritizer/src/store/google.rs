//! Google Tasks REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::traits::TaskStore;
use crate::config::DEFAULT_TASKS_BASE_URL;
use crate::entities::{NewTask, Task, TaskList};
use crate::errors::{PrioritizerError, PrioritizerResult};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size for list requests (the API maximum).
const PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

/// Google Tasks store.
#[derive(Clone)]
pub struct GoogleTasksStore {
    /// HTTP client.
    client: Client,
    /// API root, without trailing slash.
    base_url: String,
    /// Bearer token for the impersonated user.
    access_token: String,
}

impl GoogleTasksStore {
    /// Create a store authenticated with `access_token`.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new(access_token: impl Into<String>) -> PrioritizerResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_TASKS_BASE_URL.to_string(),
            access_token: access_token.into(),
        })
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> PrioritizerResult<T> {
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(url)
            .header("Authorization", self.bearer())
            .query(query)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn send_json<T, B>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        body: Option<&B>,
    ) -> PrioritizerResult<T>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        debug!(url = %url, "Write request");

        let mut request = request.header("Authorization", self.bearer());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;

        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> PrioritizerResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse response");
                PrioritizerError::Store {
                    reason: format!("unexpected response body: {e}"),
                }
            })
        } else {
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map_or(text, |body| body.error.message);
            Err(PrioritizerError::StoreApi {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Follow `nextPageToken` until the listing is exhausted.
    async fn get_all<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> PrioritizerResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params: Vec<(&str, &str)> = query.to_vec();
            params.push(("maxResults", PAGE_SIZE));
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let page: Page<T> = self.get(url, &params).await?;
            items.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl TaskStore for GoogleTasksStore {
    fn store_type(&self) -> &'static str {
        "google-tasks"
    }

    async fn list_task_lists(&self) -> PrioritizerResult<Vec<TaskList>> {
        let url = format!("{}/users/@me/lists", self.base_url);
        self.get_all(&url, &[]).await
    }

    async fn get_task_list(&self, list_id: &str) -> PrioritizerResult<TaskList> {
        let url = format!("{}/users/@me/lists/{list_id}", self.base_url);
        self.get(&url, &[]).await
    }

    async fn list_tasks(&self, list_id: &str) -> PrioritizerResult<Vec<Task>> {
        let url = format!("{}/lists/{list_id}/tasks", self.base_url);
        self.get_all(&url, &[("showCompleted", "true")]).await
    }

    async fn get_task(&self, list_id: &str, task_id: &str) -> PrioritizerResult<Task> {
        let url = format!("{}/lists/{list_id}/tasks/{task_id}", self.base_url);
        self.get(&url, &[]).await.map_err(|e| match e {
            PrioritizerError::StoreApi { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
                PrioritizerError::TaskNotFound {
                    list_id: list_id.to_string(),
                    task_id: task_id.to_string(),
                }
            }
            other => other,
        })
    }

    async fn update_task(&self, list_id: &str, task: &Task) -> PrioritizerResult<Task> {
        let url = format!("{}/lists/{list_id}/tasks/{}", self.base_url, task.id);
        let request = self.client.put(&url);
        self.send_json(request, &url, Some(task)).await
    }

    async fn move_task(
        &self,
        list_id: &str,
        task_id: &str,
        previous: Option<&str>,
    ) -> PrioritizerResult<Task> {
        let url = format!("{}/lists/{list_id}/tasks/{task_id}/move", self.base_url);
        let mut request = self.client.post(&url);
        if let Some(previous) = previous {
            request = request.query(&[("previous", previous)]);
        }
        self.send_json::<Task, ()>(request, &url, None).await
    }

    async fn insert_task(
        &self,
        list_id: &str,
        task: &NewTask,
        parent: Option<&str>,
    ) -> PrioritizerResult<Task> {
        let url = format!("{}/lists/{list_id}/tasks", self.base_url);
        let mut request = self.client.post(&url);
        if let Some(parent) = parent {
            request = request.query(&[("parent", parent)]);
        }
        self.send_json(request, &url, Some(task)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = GoogleTasksStore::new("token")
            .unwrap()
            .with_base_url("http://localhost:9000/tasks/v1/");
        assert_eq!(store.base_url, "http://localhost:9000/tasks/v1");
        assert_eq!(store.store_type(), "google-tasks");
    }

    #[test]
    fn test_page_without_items() {
        let page: Page<TaskList> = serde_json::from_str(r#"{"kind": "tasks#taskLists"}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
