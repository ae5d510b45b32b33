//! reqwest-backed implementation of `RawApiPort`

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::ports::outbound::{ApiError, RawApiPort};

/// HTTP adapter for the school administration backend
#[derive(Clone)]
pub struct ApiAdapter {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiAdapter {
    /// Adapter with reqwest's default client settings and no credentials
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        });

        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        }
    }

    /// Attach `Authorization: Bearer <token>` to every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Value, ApiError> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "HTTP request failed");
            ApiError::RequestFailed(e.to_string())
        })?;
        read_json(response, path).await
    }
}

async fn read_json(response: Response, path: &str) -> Result<Value, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(path, status = status.as_u16(), "HTTP error response");
        return Err(status_error(status, &body));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ApiError::ParseError(e.to_string()))
}

/// Map a non-2xx response to an `ApiError`, preferring the body's `message`
fn status_error(status: StatusCode, body: &str) -> ApiError {
    if status == StatusCode::UNAUTHORIZED {
        return ApiError::Unauthorized;
    }

    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                body.trim().to_string()
            }
        });

    ApiError::http(status.as_u16(), message)
}

#[async_trait]
impl RawApiPort for ApiAdapter {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        tracing::debug!(path, "GET");
        self.send(self.request(Method::GET, path), path).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        tracing::debug!(path, "POST");
        self.send(self.request(Method::POST, path).json(body), path)
            .await
    }
}
