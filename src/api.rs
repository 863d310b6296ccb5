use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::models::{Credentials, LoginResponse, NewTask, Task, TaskUpdate};
use crate::session::SessionStore;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Operations offered by the task server. One call is one request, never retried.
#[allow(async_fn_in_trait)]
pub trait TaskApi {
    async fn register(&self, username: &str, password: &str) -> Result<serde_json::Value, ApiError>;
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError>;
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;
    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError>;
    async fn update_task(&self, id: u64, update: &TaskUpdate) -> Result<Task, ApiError>;
    async fn delete_task(&self, id: u64) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ErrorBody {
    /// FastAPI-style bodies carry either a string or a list of validation errors.
    fn message(self) -> Option<String> {
        match self.detail {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

/// HTTP client for the task server.
///
/// The bearer credential is read from the session store right before each
/// request, so a login performed through this client authenticates the next call.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient { base_url, http: reqwest::Client::new(), session }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "sending request");
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(CONTENT_TYPE, "application/json");
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Turns a non-success response into [`ApiError::Status`].
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.json::<ErrorBody>().await.ok().and_then(ErrorBody::message);
        debug!(status = status.as_u16(), detail = ?detail, "request rejected");
        Err(ApiError::Status { status: status.as_u16(), detail })
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json().await?)
    }
}

impl TaskApi for ApiClient {
    async fn register(&self, username: &str, password: &str) -> Result<serde_json::Value, ApiError> {
        let body = Credentials { username: username.to_string(), password: password.to_string() };
        let response = Self::check(self.request(Method::POST, "/register").json(&body).send().await?).await?;
        // Any 2xx is a success; the payload shape is not fixed.
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = Credentials { username: username.to_string(), password: password.to_string() };
        self.send(self.request(Method::POST, "/login").json(&body)).await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.send(self.request(Method::GET, "/tasks")).await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        self.send(self.request(Method::POST, "/tasks").json(task)).await
    }

    async fn update_task(&self, id: u64, update: &TaskUpdate) -> Result<Task, ApiError> {
        self.send(self.request(Method::PUT, &format!("/tasks/{}", id)).json(update)).await
    }

    async fn delete_task(&self, id: u64) -> Result<(), ApiError> {
        // The confirmation body is not needed.
        Self::check(self.request(Method::DELETE, &format!("/tasks/{}", id)).send().await?).await?;
        Ok(())
    }
}
