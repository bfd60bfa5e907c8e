use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("credential rejected"))]
    AuthRejected { message: Option<String> },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Unknown(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error payload the backend and the identity provider both use:
/// `{"error": {"message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let end = (0..=MAX_ERROR_BODY_LENGTH)
            .rev()
            .find(|&i| body.is_char_boundary(i))
            .unwrap_or(0);
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    fn structured_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error.message)
            .filter(|m| !m.trim().is_empty())
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::structured_message(body);
        match (status.as_u16(), message) {
            (401, message) => ApiError::AuthRejected { message },
            (code, Some(message)) => ApiError::Server { status: code, message },
            (_, None) => ApiError::Unknown(format!(
                "Status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }

    /// The server-supplied message, if the response carried one
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::AuthRejected { message } => message.as_deref(),
            ApiError::Server { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, ApiError::AuthRejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_keeps_backend_message() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Invalid credentials"}}"#,
        );
        assert!(err.is_auth_rejected());
        assert_eq!(err.message(), Some("Invalid credentials"));
    }

    #[test]
    fn test_unauthorized_without_body() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        assert!(err.is_auth_rejected());
        assert_eq!(err.message(), None);
        assert_eq!(err.to_string(), "Unauthorized: credential rejected");
    }

    #[test]
    fn test_structured_server_error() {
        let err = ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"error":{"message":"Invalid status"}}"#,
        );
        match err {
            ApiError::Server { status, ref message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Invalid status");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[test]
    fn test_unstructured_error_is_unknown() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, ApiError::Unknown(_)));
        assert!(err.to_string().contains("bad gateway"));
        assert_eq!(err.message(), None);
    }

    #[test]
    fn test_truncate_body() {
        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));

        assert_eq!(ApiError::truncate_body("short"), "short");
    }
}
