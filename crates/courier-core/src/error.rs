//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for Courier.
///
/// The job engine has its own fine-grained error enum; this type is what
/// crosses layer boundaries (configuration, HTTP adapter, server wiring).
#[derive(Error, Debug)]
pub enum CourierError {
    /// Request validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The service cannot accept work right now (queue full or closed).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An operation was attempted in the wrong lifecycle state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CourierError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 422,
            Self::ServiceUnavailable(_) | Self::Timeout(_) => 503,
            Self::InvalidState(_) => 409,
            Self::Configuration(_) | Self::Internal(_) | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a service unavailable error.
    #[must_use]
    pub fn unavailable<T: Into<String>>(message: T) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if the caller may retry the same request later.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_) | Self::Timeout(_))
    }
}

impl From<serde_json::Error> for CourierError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-level validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `CourierError`.
    #[must_use]
    pub fn from_error(error: &CourierError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: None,
        }
    }

    /// Creates an error response with an explicit code and message.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Sets field-level validation errors.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&CourierError> for ErrorResponse {
    fn from(error: &CourierError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(CourierError::validation("missing subject").status_code(), 422);
        assert_eq!(CourierError::unavailable("queue is full").status_code(), 503);
        assert_eq!(CourierError::Timeout("drain".to_string()).status_code(), 503);
        assert_eq!(CourierError::InvalidState("stopped".to_string()).status_code(), 409);
        assert_eq!(CourierError::Configuration("bad".to_string()).status_code(), 500);
        assert_eq!(CourierError::internal("oops").status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CourierError::validation("x").error_code(), "VALIDATION_ERROR");
        assert_eq!(CourierError::unavailable("x").error_code(), "SERVICE_UNAVAILABLE");
        assert_eq!(CourierError::internal("x").error_code(), "INTERNAL_ERROR");
        assert_eq!(
            CourierError::Other(anyhow::anyhow!("boom")).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_transient_errors() {
        assert!(CourierError::unavailable("queue is full").is_transient());
        assert!(CourierError::Timeout("slow".to_string()).is_transient());
        assert!(!CourierError::validation("bad input").is_transient());
        assert!(!CourierError::internal("bug").is_transient());
    }

    #[test]
    fn test_error_response_from_error() {
        let err = CourierError::unavailable("queue is full");
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.code, "SERVICE_UNAVAILABLE");
        assert!(response.message.contains("queue is full"));
        assert!(response.details.is_none());
    }

    #[test]
    fn test_error_response_with_details() {
        let details = vec![FieldError {
            field: "to".to_string(),
            message: "Invalid email format".to_string(),
            code: "email".to_string(),
        }];
        let response = ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
            .with_details(details);
        assert_eq!(response.details.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_error_response_skips_empty_details() {
        let response = ErrorResponse::new("INVALID_JSON", "Invalid JSON");
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("details").is_none());
    }
}
