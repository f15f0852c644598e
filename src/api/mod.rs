//! HTTP client for the AskNarelle REST backend.
//!
//! One method per backend route, grouped by resource. Every call either
//! returns the decoded body or an [`ApiError`] classified from the status.

mod access;
mod activities;
mod courses;
mod dashboard;
mod documents;
mod domains;
mod response;
mod videos;

use std::time::{Duration, Instant};

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::Settings;
use crate::error::ApiError;

pub use courses::DUPLICATE_COURSE_MESSAGE;
pub use response::ApiResponse;

/// Client for the AskNarelle backend and its video service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    api_url: String,
    video_api_url: String,
    upload_timeout: Duration,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let api_url = check_base_url(&settings.api_url)?;
        let video_api_url = check_base_url(&settings.video_api_url)?;

        let client = Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(settings.request_timeout())
            .gzip(true)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            api_url,
            video_api_url,
            upload_timeout: settings.upload_timeout(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn video_api_url(&self) -> &str {
        &self.video_api_url
    }

    /// Backend URL for `segments`, each percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> String {
        join_url(&self.api_url, segments)
    }

    pub fn video_endpoint(&self, segments: &[&str]) -> String {
        join_url(&self.video_api_url, segments)
    }

    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Same as [`request`](Self::request) with the long upload timeout.
    pub(crate) fn upload_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .timeout(self.upload_timeout)
    }

    /// Send a request. Non-2xx responses become classified errors.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        method: &Method,
        url: &str,
    ) -> Result<ApiResponse, ApiError> {
        let started = Instant::now();
        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        debug!(
            "{} {} -> {} ({} ms)",
            method,
            url,
            status.as_u16(),
            started.elapsed().as_millis()
        );

        if !status.is_success() {
            let err = ApiError::from_response(status, &body);
            warn!("{} {} failed: {}", method, url, err);
            return Err(err);
        }

        Ok(ApiResponse {
            status,
            url: url.to_string(),
            body,
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, url), &Method::GET, url)
            .await?
            .json()
    }

    /// Send a JSON body and return the backend's acknowledgement message.
    pub(crate) async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<String, ApiError> {
        let request = self.request(method.clone(), url).json(body);
        Ok(self.send(request, &method, url).await?.message())
    }
}

fn check_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(trimmed).map_err(|source| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    Ok(trimmed.to_string())
}

fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.to_string();
    for segment in segments {
        url.push('/');
        url.push_str(&urlencoding::encode(segment));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> ApiClient {
        ApiClient::new(&Settings {
            api_url: api_url.to_string(),
            video_api_url: "http://video:8000/".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = client("http://localhost:5000/");
        assert_eq!(
            api.endpoint(&["api", "collections", "alice@example.com", "cs 1003"]),
            "http://localhost:5000/api/collections/alice%40example.com/cs%201003"
        );
        assert_eq!(
            api.video_endpoint(&["vi", "videos"]),
            "http://video:8000/vi/videos"
        );
    }

    #[test]
    fn test_base_urls_are_trimmed() {
        let api = client(" http://localhost:5000/ ");
        assert_eq!(api.api_url(), "http://localhost:5000");
        assert_eq!(api.video_api_url(), "http://video:8000");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = ApiClient::new(&Settings {
            api_url: "not a url".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    }
}
