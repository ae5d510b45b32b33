//! Service layer error types
//!
//! This module defines errors that can occur in the application service layer,
//! abstracting over transport failures and application-level refusals.

use bursar_domain::DomainError;

use crate::ports::outbound::ApiError;

/// Message shown when the session is gone; mirrors the 401 handling elsewhere
/// in the admin application.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Errors that can occur in service operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// Transport failure or non-2xx response
    #[error(transparent)]
    Api(#[from] ApiError),

    /// 2xx response carrying `success: false`
    #[error("Server rejected the request: {0}")]
    Rejected(String),

    /// Input refused before any request was made
    #[error(transparent)]
    InvalidInput(#[from] DomainError),
}

impl ServiceError {
    /// Check if this is an authorization error
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ServiceError::Api(ApiError::Unauthorized))
    }

    /// Flat message for the error banner / toast.
    ///
    /// Server-provided refusals and input errors are shown verbatim; transport
    /// failures collapse to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ServiceError::Rejected(message) if !message.trim().is_empty() => message.clone(),
            ServiceError::InvalidInput(DomainError::Validation(message)) => message.clone(),
            ServiceError::InvalidInput(e) => e.to_string(),
            ServiceError::Api(ApiError::Unauthorized) => SESSION_EXPIRED_MESSAGE.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Response bodies that carry the backend's `{ success, message }` envelope
pub trait Envelope {
    fn success(&self) -> bool;
    fn message(&self) -> Option<&str>;
}

/// Helper trait for turning an envelope into a `Result`
pub trait EnsureSuccess: Sized {
    /// Fail with `ServiceError::Rejected` when the body says `success: false`
    fn ensure_success(self, fallback: &str) -> Result<Self, ServiceError>;
}

impl<T: Envelope> EnsureSuccess for T {
    fn ensure_success(self, fallback: &str) -> Result<Self, ServiceError> {
        if self.success() {
            Ok(self)
        } else {
            let message = self
                .message()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(fallback)
                .to_string();
            Err(ServiceError::Rejected(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Body {
        success: bool,
        message: Option<String>,
    }

    impl Envelope for Body {
        fn success(&self) -> bool {
            self.success
        }

        fn message(&self) -> Option<&str> {
            self.message.as_deref()
        }
    }

    #[test]
    fn test_ensure_success_passes_successful_body() {
        let body = Body {
            success: true,
            message: None,
        };
        assert!(body.ensure_success("fallback").is_ok());
    }

    #[test]
    fn test_ensure_success_uses_server_message_then_fallback() {
        let err = Body {
            success: false,
            message: Some("Expense already validated".to_string()),
        }
        .ensure_success("fallback")
        .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Rejected("Expense already validated".to_string())
        );

        let err = Body {
            success: false,
            message: Some("  ".to_string()),
        }
        .ensure_success("fallback")
        .unwrap_err();
        assert_eq!(err, ServiceError::Rejected("fallback".to_string()));
    }

    #[test]
    fn test_user_message_collapses_transport_failures() {
        let network = ServiceError::from(ApiError::RequestFailed("connection refused".into()));
        let http = ServiceError::from(ApiError::http(500, "boom"));
        assert_eq!(network.user_message("Failed to load"), "Failed to load");
        assert_eq!(http.user_message("Failed to load"), "Failed to load");
    }

    #[test]
    fn test_user_message_special_cases() {
        let unauthorized = ServiceError::from(ApiError::Unauthorized);
        assert!(unauthorized.is_unauthorized());
        assert_eq!(unauthorized.user_message("x"), SESSION_EXPIRED_MESSAGE);

        let invalid = ServiceError::from(DomainError::validation("Select at least one expense"));
        assert_eq!(invalid.user_message("x"), "Select at least one expense");

        let rejected = ServiceError::Rejected("Not allowed".to_string());
        assert_eq!(rejected.user_message("x"), "Not allowed");
    }
}
