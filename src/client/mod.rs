//! Typed HTTP client for the task board API.
//!
//! Every call attaches the stored bearer token when there is one. A 401
//! clears the store; if a token had been sent the call fails with
//! [`ClientError::SessionExpired`].

pub mod token_store;

use std::fmt;
use std::io;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::{AuthResponse, LoginRequest, ProfileResponse, RegisterRequest};
use crate::models::{
    CreateTaskRequest, DataResponse, ErrorBody, MessageDataResponse, MessageResponse, TaskPatch, TaskView,
    UserView,
};
use crate::pagination::Paginated;

pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

#[derive(Debug)]
pub enum ClientError {
    Http(reqwest::Error),
    Api { status: u16, message: String },
    SessionExpired,
    InvalidResponse(String),
    Storage(io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClientError::Http(err) => write!(f, "HTTP error: {}", err),
            ClientError::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            ClientError::SessionExpired => write!(f, "Session expired, please log in again"),
            ClientError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ClientError::Storage(err) => write!(f, "Token storage error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err)
    }
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        ClientError::Storage(err)
    }
}

/// Typed filters for [`ApiClient::list_tasks`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Box<dyn TokenStore>,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:8080/api`.
    pub fn new(base_url: impl Into<String>, tokens: Box<dyn TokenStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.load().is_some()
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.tokens.clear()?;
        Ok(())
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let auth: AuthResponse = self.send(self.request(Method::POST, "/register").json(request)).await?;
        self.tokens.save(&auth.token)?;
        Ok(auth)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let credentials = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self
            .send(self.request(Method::POST, "/login").json(&credentials))
            .await?;
        self.tokens.save(&auth.token)?;
        Ok(auth)
    }

    pub async fn profile(&self) -> Result<UserView, ClientError> {
        let profile: ProfileResponse = self.send(self.request(Method::GET, "/profile")).await?;
        Ok(profile.user)
    }

    pub async fn list_tasks(&self, query: &ListQuery) -> Result<Paginated<TaskView>, ClientError> {
        self.send(self.request(Method::GET, "/tasks").query(query)).await
    }

    pub async fn get_task(&self, id: i64) -> Result<TaskView, ClientError> {
        let body: DataResponse<TaskView> = self
            .send(self.request(Method::GET, &format!("/tasks/{}", id)))
            .await?;
        Ok(body.data)
    }

    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<TaskView, ClientError> {
        let body: MessageDataResponse<TaskView> = self
            .send(self.request(Method::POST, "/tasks").json(request))
            .await?;
        Ok(body.data)
    }

    pub async fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<TaskView, ClientError> {
        let body: MessageDataResponse<TaskView> = self
            .send(self.request(Method::PUT, &format!("/tasks/{}", id)).json(patch))
            .await?;
        Ok(body.data)
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        let _: MessageResponse = self
            .send(self.request(Method::DELETE, &format!("/tasks/{}", id)))
            .await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let token = self.tokens.load();
        let request = match &token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status == StatusCode::UNAUTHORIZED {
            self.tokens.clear()?;
            if token.is_some() {
                log::info!("Stored token rejected, session cleared");
                return Err(ClientError::SessionExpired);
            }
        }

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|err| err.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|err| ClientError::InvalidResponse(err.to_string()))
    }
}
