//! Errors raised while talking to the AskNarelle backend.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by backend calls.
///
/// Non-2xx responses are the backend's only error channel. They are sorted
/// into the categories the admin views distinguish: forbidden, not found,
/// validation (400/409) and everything else.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 403: the signed-in user may not see this course.
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// HTTP 404: the course, domain or file does not exist.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// HTTP 400 or 409: the backend rejected the input.
    #[error("{message}")]
    Validation { status: StatusCode, message: String },

    /// Any other non-2xx response.
    #[error("Server error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    #[error("Failed to connect to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid backend URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl ApiError {
    /// Classify a non-2xx response by status, pulling the best message out of its body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = extract_message(status, body);
        match status {
            StatusCode::FORBIDDEN => Self::Forbidden { message },
            StatusCode::NOT_FOUND => Self::NotFound { message },
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => Self::Validation { status, message },
            _ => Self::Server { status, message },
        }
    }

    /// HTTP status of the failed response, if the request got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Forbidden { .. } => Some(StatusCode::FORBIDDEN),
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::Validation { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Transport { .. }
            | Self::Decode { .. }
            | Self::Client(_)
            | Self::InvalidBaseUrl { .. } => None,
        }
    }

    /// The message to show the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::Validation { message, .. }
            | Self::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Tries the JSON `error` field, then `message`, then the raw body text, and
/// falls back to the HTTP status line.
pub fn extract_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            match value.get(key) {
                Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                    return s.trim().to_string();
                }
                Some(serde_json::Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('{') && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }

    match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_forbidden_and_not_found() {
        let err = ApiError::from_response(
            StatusCode::FORBIDDEN,
            r#"{"message": "User is not authorised to access this page"}"#,
        );
        assert!(err.is_forbidden());
        assert_eq!(err.user_message(), "User is not authorised to access this page");

        let err = ApiError::from_response(StatusCode::NOT_FOUND, "");
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "HTTP 404 Not Found");
    }

    #[test]
    fn test_classifies_validation_statuses() {
        for status in [StatusCode::BAD_REQUEST, StatusCode::CONFLICT] {
            let err = ApiError::from_response(status, r#"{"error": "Invalid files"}"#);
            assert!(matches!(err, ApiError::Validation { .. }));
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn test_other_statuses_are_server_errors() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, "");
        assert!(matches!(err, ApiError::Server { .. }));
        assert_eq!(err.user_message(), "HTTP 502 Bad Gateway");
    }

    #[test]
    fn test_extract_message_prefers_error_field() {
        let body = r#"{"error": "Container already exists", "message": "ignored"}"#;
        assert_eq!(
            extract_message(StatusCode::CONFLICT, body),
            "Container already exists"
        );
    }

    #[test]
    fn test_extract_message_falls_back_to_message_field() {
        let body = r#"{"message": "Failed to create index"}"#;
        assert_eq!(
            extract_message(StatusCode::INTERNAL_SERVER_ERROR, body),
            "Failed to create index"
        );
    }

    #[test]
    fn test_extract_message_renders_structured_error() {
        let body = r#"{"error": {"code": "Request_BadRequest"}}"#;
        assert_eq!(
            extract_message(StatusCode::BAD_REQUEST, body),
            r#"{"code":"Request_BadRequest"}"#
        );
    }

    #[test]
    fn test_extract_message_uses_plain_text_body() {
        assert_eq!(
            extract_message(StatusCode::INTERNAL_SERVER_ERROR, "  upstream timeout \n"),
            "upstream timeout"
        );
    }

    #[test]
    fn test_extract_message_ignores_html_pages() {
        let body = "<html><body>Internal Server Error</body></html>";
        assert_eq!(
            extract_message(StatusCode::INTERNAL_SERVER_ERROR, body),
            "HTTP 500 Internal Server Error"
        );
    }
}
