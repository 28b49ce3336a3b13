//! HTTP client for the board API.
//!
//! Every failure is normalized into [`ClientError`]. For non-2xx responses the
//! message comes from a JSON `{"message": ...}` body when the backend sends
//! one, otherwise from the status line. Nothing is retried.
//!
//! Writes succeed on any 2xx. The saved entity is returned when the body
//! holds one; the views only need the acknowledgement and re-fetch anyway.

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::models::*;

/// Prefix for every API route. The health check lives outside it.
const API_PREFIX: &str = "/api";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A non-2xx response. `message` falls back to the status line when the
    /// body carries none, and is then not repeated in the display.
    #[error("HTTP error {}", api_summary(.status, .message))]
    Api { status: StatusCode, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(e) => e.status(),
            Self::Api { status, .. } => Some(*status),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the board API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Create a client from resolved configuration.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}{}", self.base_url, API_PREFIX, path);
        tracing::debug!("{} {}", method, url);
        self.client.request(method, &url)
    }

    /// Turn a non-2xx response into [`ClientError::Api`].
    async fn error_for(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| status_line(status));
        ClientError::Api { status, message }
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::error_for(response).await)
        }
    }

    /// Handle a delete response. Any 2xx, including 204 No Content, is success
    /// and the body is never parsed.
    async fn handle_empty_response(response: reqwest::Response) -> Result<(), ClientError> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_for(response).await)
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<T, ClientError> {
        let mut req = self.request(method.clone(), path);
        if let Some(body) = body {
            req = req.json(body);
        }
        let result = match req.send().await {
            Ok(response) => Self::handle_response(response).await,
            Err(e) => Err(e.into()),
        };
        if let Err(ref e) = result {
            tracing::warn!("{} {} failed: {}", method, path, e);
        }
        result
    }

    /// Send a write. Any 2xx counts as applied; the body is returned only
    /// when it decodes as `T`.
    async fn send_write<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<Option<T>, ClientError> {
        let req = self.request(method.clone(), path).json(body);
        let result = match req.send().await {
            Ok(response) => Self::handle_write_response(response).await,
            Err(e) => Err(e.into()),
        };
        if let Err(ref e) = result {
            tracing::warn!("{} {} failed: {}", method, path, e);
        }
        result
    }

    async fn handle_write_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Option<T>, ClientError> {
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        let body = response.text().await?;
        match serde_json::from_str(&body) {
            Ok(entity) => Ok(Some(entity)),
            Err(e) => {
                tracing::debug!("Write succeeded without an entity body: {}", e);
                Ok(None)
            }
        }
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let result = match self.request(Method::DELETE, path).send().await {
            Ok(response) => Self::handle_empty_response(response).await,
            Err(e) => Err(e.into()),
        };
        if let Err(ref e) = result {
            tracing::warn!("DELETE {} failed: {}", path, e);
        }
        result
    }

    // ============================================================
    // Health
    // ============================================================

    /// Plain-text health check at `/hello`, outside the API prefix.
    pub async fn hello(&self) -> Result<String, ClientError> {
        let url = format!("{}/hello", self.base_url);
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        if response.status().is_success() {
            Ok(response.text().await?)
        } else {
            let err = Self::error_for(response).await;
            tracing::warn!("GET /hello failed: {}", err);
            Err(err)
        }
    }

    // ============================================================
    // Project Operations
    // ============================================================

    pub async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.send(Method::GET, "/projects", None::<&()>).await
    }

    pub async fn create_project(
        &self,
        input: &CreateProjectInput,
    ) -> Result<Option<Project>, ClientError> {
        self.send_write(Method::POST, "/projects", input).await
    }

    /// Fetch a project with its nested stages, tasks and subtasks.
    ///
    /// The tree comes back in the backend's order; see
    /// [`crate::ordering::sort_board`].
    pub async fn get_project(&self, id: ProjectId) -> Result<ProjectBoard, ClientError> {
        self.send(Method::GET, &format!("/projects/{}", id), None::<&()>)
            .await
    }

    pub async fn delete_project(&self, id: ProjectId) -> Result<(), ClientError> {
        self.delete(&format!("/projects/{}", id)).await
    }

    // ============================================================
    // Stage Operations
    // ============================================================

    pub async fn create_stage(
        &self,
        project_id: ProjectId,
        input: &CreateStageInput,
    ) -> Result<Option<Stage>, ClientError> {
        self.send_write(Method::POST, &format!("/projects/{}/stages", project_id), input).await
    }

    pub async fn update_stage(
        &self,
        id: StageId,
        input: &UpdateStageInput,
    ) -> Result<Option<Stage>, ClientError> {
        self.send_write(Method::PUT, &format!("/stages/{}", id), input).await
    }

    pub async fn delete_stage(&self, id: StageId) -> Result<(), ClientError> {
        self.delete(&format!("/stages/{}", id)).await
    }

    // ============================================================
    // Task Operations
    // ============================================================

    pub async fn create_task(
        &self,
        stage_id: StageId,
        input: &CreateTaskInput,
    ) -> Result<Option<Task>, ClientError> {
        self.send_write(Method::POST, &format!("/stages/{}/tasks", stage_id), input).await
    }

    pub async fn update_task(
        &self,
        id: TaskId,
        input: &UpdateTaskInput,
    ) -> Result<Option<Task>, ClientError> {
        self.send_write(Method::PUT, &format!("/tasks/{}", id), input).await
    }

    pub async fn delete_task(&self, id: TaskId) -> Result<(), ClientError> {
        self.delete(&format!("/tasks/{}", id)).await
    }

    // ============================================================
    // Subtask Operations
    // ============================================================

    pub async fn create_subtask(
        &self,
        task_id: TaskId,
        input: &CreateSubtaskInput,
    ) -> Result<Option<Subtask>, ClientError> {
        self.send_write(Method::POST, &format!("/tasks/{}/subtasks", task_id), input).await
    }

    pub async fn update_subtask(
        &self,
        id: SubtaskId,
        input: &UpdateSubtaskInput,
    ) -> Result<Option<Subtask>, ClientError> {
        self.send_write(Method::PUT, &format!("/subtasks/{}", id), input).await
    }

    pub async fn delete_subtask(&self, id: SubtaskId) -> Result<(), ClientError> {
        self.delete(&format!("/subtasks/{}", id)).await
    }
}

fn api_summary(status: &StatusCode, message: &str) -> String {
    let line = status_line(*status);
    if message == line {
        line
    } else {
        format!("{}: {}", line, message)
    }
}

/// `404 Not Found`, or just the code for non-standard statuses.
fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
