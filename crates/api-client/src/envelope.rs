//! The `{success, data, message, errors}` response envelope.

use crate::error::{ApiError, ApiResult, FieldIssue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope shared by every endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    /// Whether the server handled the request
    #[serde(default)]
    pub success: bool,
    /// Payload on success
    #[serde(default)]
    pub data: Option<Value>,
    /// Human readable status or error message
    #[serde(default)]
    pub message: Option<String>,
    /// Validation errors
    #[serde(default)]
    pub errors: Option<Vec<FieldIssue>>,
}

impl Envelope {
    /// Turn a decoded envelope into the payload or the matching error
    pub(crate) fn into_data(self, status: u16, context: &str) -> ApiResult<Value> {
        let succeeded = self.success && (200..300).contains(&status);
        if succeeded {
            return self
                .data
                .ok_or_else(|| ApiError::MissingData(context.to_string()));
        }

        let message = self
            .message
            .unwrap_or_else(|| format!("Request to {context} failed"));
        match self.errors {
            Some(errors) if !errors.is_empty() => Err(ApiError::Validation { message, errors }),
            _ => Err(ApiError::api_response(status, message)),
        }
    }
}

/// Decode a raw response body.
///
/// Bodies that are not an envelope are reported by status: successful ones
/// as a JSON error, failing ones with the body text as the message.
pub(crate) fn decode_body(status: u16, body: &str, context: &str) -> ApiResult<Value> {
    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => envelope.into_data(status, context),
        Err(e) if (200..300).contains(&status) => Err(ApiError::Json(e)),
        Err(_) => {
            let message = if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                body.trim().chars().take(200).collect()
            };
            Err(ApiError::api_response(status, message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_returns_data() {
        let data = decode_body(200, r#"{"success": true, "data": {"events": []}}"#, "events").unwrap();
        assert_eq!(data["events"], serde_json::json!([]));
    }

    #[test]
    fn test_success_without_data() {
        let err = decode_body(200, r#"{"success": true}"#, "events").unwrap_err();
        assert!(matches!(err, ApiError::MissingData(_)));
    }

    #[test]
    fn test_validation_errors() {
        let body = r#"{
            "success": false,
            "message": "Validation failed",
            "errors": [{"path": "age", "message": "Age must be between 0 and 120"}]
        }"#;
        let err = decode_body(400, body, "profile/health").unwrap_err();
        assert_eq!(err.field_errors().get("age"), Some("Age must be between 0 and 120"));
    }

    #[test]
    fn test_failure_with_message() {
        let err = decode_body(404, r#"{"success": false, "message": "Event not found"}"#, "events/x")
            .unwrap_err();
        assert!(matches!(err, ApiError::ApiResponse { status: 404, ref message } if message == "Event not found"));
    }

    #[test]
    fn test_unsuccessful_envelope_with_ok_status() {
        let err = decode_body(200, r#"{"success": false, "message": "Try later"}"#, "events").unwrap_err();
        assert!(matches!(err, ApiError::ApiResponse { status: 200, .. }));
    }

    #[test]
    fn test_non_envelope_bodies() {
        let err = decode_body(502, "<html>Bad Gateway</html>", "events").unwrap_err();
        assert!(err.is_server_error());

        let err = decode_body(200, "not json", "events").unwrap_err();
        assert!(matches!(err, ApiError::Json(_)));
    }
}
