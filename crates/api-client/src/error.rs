//! Error types for the API client

use healthwatch_core::validation::{FieldErrors, ValidationResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// One entry of a server validation error list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Dotted path of the offending field, e.g. `healthProfile.age`
    #[serde(default)]
    pub path: String,
    /// Human readable message
    pub message: String,
}

/// API client errors
///
/// Everything but [`ApiError::Validation`] is a network/API failure that the
/// caller answers with a fallback.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body decoding)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Input rejected, either by the server or by the client-side checks
    #[error("Validation failed: {message}")]
    Validation {
        /// Summary message
        message: String,
        /// Per-field problems
        errors: Vec<FieldIssue>,
    },

    /// A successful envelope without the expected `data`
    #[error("Response for {0} carried no data")]
    MissingData(String),

    /// A record in the response could not be turned into a client event
    #[error("Invalid event in response: {0}")]
    Event(#[from] healthwatch_events::EventError),

    /// An identifier that cannot be used as a path segment
    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),

    /// The call needs a logged-in user
    #[error("Not logged in")]
    NotAuthenticated,

    /// Circuit breaker is open
    #[error("Circuit breaker is open - service temporarily unavailable")]
    CircuitOpen,

}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Create a validation error from client-side checks
    #[must_use]
    pub fn from_validation(result: &ValidationResult) -> Self {
        let errors: Vec<FieldIssue> = result
            .errors()
            .iter()
            .map(|e| FieldIssue {
                path: e.field.clone(),
                message: e.message.clone(),
            })
            .collect();
        Self::Validation {
            message: format!("{} field(s) invalid", errors.len()),
            errors,
        }
    }

    /// Per-field messages for form display; empty unless this is a validation error
    #[must_use]
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            Self::Validation { errors, .. } => FieldErrors::from_pairs(
                errors.iter().map(|e| (e.path.as_str(), e.message.as_str())),
            ),
            _ => FieldErrors::default(),
        }
    }

    /// Validation failures are the user's to fix; everything else is a
    /// network/API failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Whether the backend itself looks unhealthy; only these count against
    /// the circuit breaker.
    #[must_use]
    pub fn is_backend_failure(&self) -> bool {
        match self {
            Self::Request(e) => !e.is_decode() && !e.is_builder(),
            Self::ApiResponse { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if *status >= 500)
    }

    /// HTTP 401
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::ApiResponse { status: 401, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthwatch_core::validation::Validator;

    #[test]
    fn test_field_errors_from_server_paths() {
        let err = ApiError::Validation {
            message: "Invalid health profile".into(),
            errors: vec![
                FieldIssue {
                    path: "healthProfile.age".into(),
                    message: "Age must be at most 120".into(),
                },
                FieldIssue {
                    path: "body.weight".into(),
                    message: "Weight is required".into(),
                },
            ],
        };

        let fields = err.field_errors();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("age"), Some("Age must be at most 120"));
        assert_eq!(fields.get("weight"), Some("Weight is required"));
        assert!(err.is_validation());
        assert!(!err.is_backend_failure());
    }

    #[test]
    fn test_from_client_validation() {
        let result = Validator::new().range("height", 10.0, 30.0, 272.0).validate();
        let err = ApiError::from_validation(&result);
        assert!(err.field_errors().get("height").is_some());
    }

    #[test]
    fn test_classification() {
        let server = ApiError::api_response(503, "down");
        assert!(server.is_backend_failure());
        assert!(server.is_server_error());

        let client = ApiError::api_response(404, "missing");
        assert!(!client.is_backend_failure());
        assert!(client.is_client_error());

        assert!(ApiError::api_response(401, "expired").is_unauthorized());
        assert!(ApiError::CircuitOpen.field_errors().is_empty());
    }
}
