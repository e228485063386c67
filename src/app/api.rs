// Communication with the remote task service.
// Every operation is a single request/response round trip with no retry;
// caching and failure presentation are the dashboard's problem.

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::app::models::{Task, TaskDraft};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(StatusCode),
}

/// The boundary between the controllers and the remote service. The
/// dashboard, detail and form controllers only ever see this trait, which
/// keeps them testable against an in-memory fake.
pub trait TaskRepository {
    fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;
    /// `Ok(None)` exactly when the service reports 404 for the id; any
    /// other non-success status is an error.
    fn get_task(&self, id: &str) -> Result<Option<Task>, ApiError>;
    fn create_task(&self, draft: &TaskDraft) -> Result<Task, ApiError>;
    /// Full replace of every field except the id.
    fn update_task(&self, id: &str, draft: &TaskDraft) -> Result<Task, ApiError>;
    fn delete_task(&self, id: &str) -> Result<(), ApiError>;
}

/// REST implementation over a blocking HTTP client. The resource URL is
/// injected at construction; nothing here reads ambient configuration.
pub struct HttpTaskRepository {
    http: Client,
    base_url: String,
}

impl HttpTaskRepository {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpTaskRepository {
            http: Client::new(),
            base_url,
        }
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }

    fn check(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status(response.status()))
        }
    }
}

impl TaskRepository for HttpTaskRepository {
    fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        debug!(url = %self.base_url, "listing tasks");
        let response = Self::check(self.http.get(&self.base_url).send()?)?;
        Ok(response.json()?)
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>, ApiError> {
        debug!(id, "fetching task");
        let response = self.http.get(self.item_url(id)).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response)?;
        Ok(Some(response.json()?))
    }

    fn create_task(&self, draft: &TaskDraft) -> Result<Task, ApiError> {
        debug!(title = %draft.title, "creating task");
        let response = Self::check(self.http.post(&self.base_url).json(draft).send()?)?;
        Ok(response.json()?)
    }

    fn update_task(&self, id: &str, draft: &TaskDraft) -> Result<Task, ApiError> {
        debug!(id, "updating task");
        let response = Self::check(self.http.put(self.item_url(id)).json(draft).send()?)?;
        Ok(response.json()?)
    }

    fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        debug!(id, "deleting task");
        Self::check(self.http.delete(self.item_url(id)).send()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_in_base_url_is_normalized() {
        let repo = HttpTaskRepository::new("http://localhost:8080/api/v1/tasks/");
        assert_eq!(repo.item_url("7"), "http://localhost:8080/api/v1/tasks/7");
    }
}
