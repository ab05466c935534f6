use async_trait::async_trait;
use db::models::task::{CreateTask, Task, UpdateTask};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use utils::response::ApiResponse;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("Failed to reach task API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Task API returned {status}: {message}")]
    Http { status: StatusCode, message: String },
    #[error("Task API returned error: {0}")]
    Rejected(String),
    #[error("Failed to parse task API response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    #[error("Task API response missing data field")]
    MissingData,
}

/// Remote task collection as seen by the board.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiClientError>;
    async fn create_task(&self, payload: &CreateTask) -> Result<Task, ApiClientError>;
    async fn update_task(&self, id: Uuid, payload: &UpdateTask) -> Result<Task, ApiClientError>;
    async fn delete_task(&self, id: Uuid) -> Result<(), ApiClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTaskApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send_envelope<T: DeserializeOwned>(
        &self,
        rb: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiClientError> {
        let resp = rb.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message().map(str::to_string))
                .unwrap_or_else(|| truncate_body(&body, 200));
            return Err(ApiClientError::Http { status, message });
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body)?;
        if !envelope.is_success() {
            let message = envelope.message().unwrap_or("Unknown error").to_string();
            return Err(ApiClientError::Rejected(message));
        }
        Ok(envelope)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        rb: reqwest::RequestBuilder,
    ) -> Result<T, ApiClientError> {
        self.send_envelope::<T>(rb)
            .await?
            .into_data()
            .ok_or(ApiClientError::MissingData)
    }

    async fn send_ok(&self, rb: reqwest::RequestBuilder) -> Result<(), ApiClientError> {
        self.send_envelope::<serde_json::Value>(rb).await.map(|_| ())
    }
}

fn truncate_body(body: &str, max: usize) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiClientError> {
        let url = self.url("/tasks");
        self.send_json(self.client.get(&url)).await
    }

    async fn create_task(&self, payload: &CreateTask) -> Result<Task, ApiClientError> {
        let url = self.url("/tasks");
        self.send_json(self.client.post(&url).json(payload)).await
    }

    async fn update_task(&self, id: Uuid, payload: &UpdateTask) -> Result<Task, ApiClientError> {
        let url = self.url(&format!("/tasks/{id}"));
        self.send_json(self.client.put(&url).json(payload)).await
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), ApiClientError> {
        let url = self.url(&format!("/tasks/{id}"));
        self.send_ok(self.client.delete(&url)).await
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };

    use chrono::Utc;

    use super::*;

    /// In-memory `TaskApi` with switchable failures and a call counter.
    #[derive(Default)]
    pub(crate) struct FakeTaskApi {
        tasks: Mutex<Vec<Task>>,
        pub(crate) fail_list: AtomicBool,
        pub(crate) fail_create: AtomicBool,
        pub(crate) fail_update: AtomicBool,
        pub(crate) fail_delete: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeTaskApi {
        pub(crate) fn with_tasks(tasks: Vec<Task>) -> Self {
            Self {
                tasks: Mutex::new(tasks),
                ..Default::default()
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn stored(&self) -> Vec<Task> {
            self.tasks.lock().unwrap().clone()
        }

        fn record(&self, fail: &AtomicBool) -> Result<(), ApiClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if fail.load(Ordering::SeqCst) {
                return Err(ApiClientError::Http {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "unavailable".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TaskApi for FakeTaskApi {
        async fn list_tasks(&self) -> Result<Vec<Task>, ApiClientError> {
            self.record(&self.fail_list)?;
            Ok(self.stored())
        }

        async fn create_task(&self, payload: &CreateTask) -> Result<Task, ApiClientError> {
            self.record(&self.fail_create)?;
            let now = Utc::now();
            let task = Task {
                id: Uuid::new_v4(),
                title: payload.title.trim().to_string(),
                description: payload
                    .description
                    .clone()
                    .filter(|description| !description.is_empty()),
                status: payload.status.unwrap_or_default(),
                created_at: now,
                updated_at: now,
            };
            self.tasks.lock().unwrap().push(task.clone());
            Ok(task)
        }

        async fn update_task(
            &self,
            id: Uuid,
            payload: &UpdateTask,
        ) -> Result<Task, ApiClientError> {
            self.record(&self.fail_update)?;
            let mut tasks = self.tasks.lock().unwrap();
            let Some(slot) = tasks.iter_mut().find(|task| task.id == id) else {
                return Err(ApiClientError::Http {
                    status: StatusCode::NOT_FOUND,
                    message: "Task not found".to_string(),
                });
            };
            let merged = payload
                .clone()
                .merge(slot.clone())
                .map_err(|err| ApiClientError::Rejected(err.to_string()))?;
            *slot = merged.clone();
            Ok(merged)
        }

        async fn delete_task(&self, id: Uuid) -> Result<(), ApiClientError> {
            self.record(&self.fail_delete)?;
            self.tasks.lock().unwrap().retain(|task| task.id != id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let api = HttpTaskApi::new("http://localhost:5001/api/");
        assert_eq!(api.url("/tasks"), "http://localhost:5001/api/tasks");
        assert_eq!(api.url("tasks/abc"), "http://localhost:5001/api/tasks/abc");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        assert_eq!(truncate_body("  short  ", 10), "short");
        assert_eq!(truncate_body("ééééé", 2), "éé...");
    }
}
