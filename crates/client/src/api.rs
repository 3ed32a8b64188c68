//! The seam between client state and the todo HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use db::models::{
    category::Category,
    todo::{BulkUpdateTodos, CreateTodo, Todo},
};
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ApiClientError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("http {status}: {message}")]
    Http { status: u16, message: String },
    #[error("json error: {0}")]
    Serde(String),
}

impl ApiClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for showing next to a form, when the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }
}

#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn get_categories(&self) -> Result<Vec<Category>, ApiClientError>;

    async fn get_todos(&self, category: Option<&str>) -> Result<Vec<Todo>, ApiClientError>;

    async fn create_todo(&self, data: &CreateTodo) -> Result<Todo, ApiClientError>;

    async fn update_todo(&self, id: i64, completed: bool) -> Result<Todo, ApiClientError>;

    async fn delete_todo(&self, id: i64) -> Result<(), ApiClientError>;

    /// One request for every id; the server applies all or none.
    async fn bulk_update_todos(
        &self,
        ids: &[i64],
        completed: bool,
    ) -> Result<Vec<Todo>, ApiClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `reqwest` implementation talking to the server's JSON API.
#[derive(Debug, Clone)]
pub struct HttpTodoApi {
    http: Client,
    base_url: String,
}

impl HttpTodoApi {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// `base_url` includes any route prefix, e.g. `http://localhost:3001/api`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiClientError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("todo-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiClientError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(res: Response) -> Result<Response, ApiClientError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        Err(ApiClientError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(res: Response) -> Result<T, ApiClientError> {
        Self::check(res)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiClientError::Serde(e.to_string()))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ApiClientError {
    ApiClientError::Transport(e.to_string())
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn get_categories(&self) -> Result<Vec<Category>, ApiClientError> {
        let res = self
            .http
            .get(self.url("/categories"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::json(res).await
    }

    async fn get_todos(&self, category: Option<&str>) -> Result<Vec<Todo>, ApiClientError> {
        let mut req = self.http.get(self.url("/todos"));
        if let Some(category) = category {
            req = req.query(&[("category", category)]);
        }
        let res = req.send().await.map_err(map_reqwest_error)?;
        Self::json(res).await
    }

    async fn create_todo(&self, data: &CreateTodo) -> Result<Todo, ApiClientError> {
        let res = self
            .http
            .post(self.url("/todos"))
            .json(data)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::json(res).await
    }

    async fn update_todo(&self, id: i64, completed: bool) -> Result<Todo, ApiClientError> {
        let res = self
            .http
            .patch(self.url(&format!("/todos/{}", id)))
            .json(&json!({ "completed": completed }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::json(res).await
    }

    async fn delete_todo(&self, id: i64) -> Result<(), ApiClientError> {
        let res = self
            .http
            .delete(self.url(&format!("/todos/{}", id)))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::check(res).await?;
        Ok(())
    }

    async fn bulk_update_todos(
        &self,
        ids: &[i64],
        completed: bool,
    ) -> Result<Vec<Todo>, ApiClientError> {
        let body = BulkUpdateTodos {
            ids: ids.to_vec(),
            completed,
        };
        let res = self
            .http
            .patch(self.url("/todos/bulk"))
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::json(res).await
    }
}
