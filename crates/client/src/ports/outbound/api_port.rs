//! HTTP boundary errors
//!
//! Adapters translate transport failures into `ApiError`; the application
//! layer never sees reqwest types.

/// Errors raised at the HTTP boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection, timeout)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Non-2xx response other than 401
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// 401 - the session is missing or expired
    #[error("Unauthorized")]
    Unauthorized,

    /// Response body was not the expected JSON
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request body could not be encoded
    #[error("Failed to serialize request: {0}")]
    SerializeError(String),
}

impl ApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            message: message.into(),
        }
    }

    /// Check if the failure happened before any response arrived
    pub fn is_network(&self) -> bool {
        matches!(self, Self::RequestFailed(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
