use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{extract_message, ApiError};

/// A successful (2xx) backend response, body already read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub url: String,
    pub body: String,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode {
            url: self.url.clone(),
            reason: e.to_string(),
        })
    }

    /// Acknowledgement text: the `message` field, the plain body, or the status line.
    pub fn message(&self) -> String {
        extract_message(self.status, &self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: StatusCode, body: &str) -> ApiResponse {
        ApiResponse {
            status,
            url: "http://localhost:5000/x".to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_message_from_body() {
        let r = response(StatusCode::CREATED, r#"{"message": "Files uploaded"}"#);
        assert_eq!(r.message(), "Files uploaded");
        assert_eq!(response(StatusCode::OK, "").message(), "HTTP 200 OK");
    }

    #[test]
    fn test_json_decode_error_names_url() {
        let err = response(StatusCode::OK, "[1,").json::<Vec<u32>>().unwrap_err();
        assert!(matches!(err, ApiError::Decode { ref url, .. } if url.ends_with("/x")));
    }
}
