//! Configuration management for narelle using the prefer crate.
//!
//! Precedence, lowest to highest: built-in defaults, the config file
//! (auto-discovered or `--config`), environment variables, CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ingest::ChunkingParams;

/// Default backend address used by the admin app during development.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Base URL of the REST backend.
    pub api_url: String,
    /// Base URL of the video service (`/vi/...` routes).
    pub video_api_url: String,
    /// Signed-in principal, as reported by the identity provider.
    pub username: Option<String>,
    /// Timeout for ordinary requests, in seconds.
    pub request_timeout: u64,
    /// Timeout for uploads and vector-store requests, in seconds.
    pub upload_timeout: u64,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Default text-splitting parameters for ingestion.
    pub chunking: ChunkingParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            video_api_url: DEFAULT_API_URL.to_string(),
            username: None,
            request_timeout: 30,
            upload_timeout: 600,
            user_agent: format!("narelle-admin/{}", env!("CARGO_PKG_VERSION")),
            chunking: ChunkingParams::default(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Defaults to `api_url` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "user")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap: Option<u32>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers narelle config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("narelle").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref url) = self.api_url {
            settings.api_url = normalize_url(url);
        }
        if let Some(ref user) = self.username {
            settings.username = non_empty(user);
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(timeout) = self.upload_timeout {
            settings.upload_timeout = timeout;
        }
        if let Some(ref ua) = self.user_agent {
            settings.user_agent = ua.clone();
        }
        if let Some(size) = self.chunk_size {
            settings.chunking.chunk_size = size;
        }
        if let Some(overlap) = self.overlap {
            settings.chunking.overlap = overlap;
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// `--api-url` flag.
    pub api_url: Option<String>,
    /// `--video-api-url` flag.
    pub video_api_url: Option<String>,
    /// `--user` flag.
    pub username: Option<String>,
}

/// Overrides read from `NARELLE_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub api_url: Option<String>,
    pub video_api_url: Option<String>,
    pub username: Option<String>,
    pub request_timeout: Option<u64>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().and_then(|v| non_empty(&v));
        Self {
            api_url: var("NARELLE_API_URL"),
            video_api_url: var("NARELLE_VIDEO_API_URL"),
            username: var("NARELLE_USER"),
            request_timeout: var("NARELLE_TIMEOUT").and_then(|v| v.parse().ok()),
        }
    }

    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref url) = self.api_url {
            tracing::debug!("Using NARELLE_API_URL from environment: {}", url);
            settings.api_url = normalize_url(url);
        }
        if let Some(ref user) = self.username {
            settings.username = Some(user.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
    }
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = match options.config_path {
        Some(ref path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            match Config::load_from_path(Path::new(&expanded)).await {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("{}; falling back to defaults", e);
                    Config::default()
                }
            }
        }
        None => Config::load().await,
    };

    let settings = resolve_settings(&config, &EnvOverrides::from_env(), &options);
    (settings, config)
}

/// Layer config file, environment and flags over the defaults.
///
/// `video_api_url` is taken from the highest layer that names it, and
/// falls back to the final `api_url` only when no layer does.
pub fn resolve_settings(config: &Config, env: &EnvOverrides, options: &LoadOptions) -> Settings {
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    env.apply_to_settings(&mut settings);
    apply_flag_overrides(options, &mut settings);

    settings.video_api_url = [
        &options.video_api_url,
        &env.video_api_url,
        &config.video_api_url,
    ]
    .into_iter()
    .flatten()
    .find_map(|url| non_empty(url))
    .map(|url| normalize_url(&url))
    .unwrap_or_else(|| settings.api_url.clone());
    settings
}

/// CLI flags take precedence over everything else.
/// `video_api_url` is settled by [`resolve_settings`].
pub fn apply_flag_overrides(options: &LoadOptions, settings: &mut Settings) {
    if let Some(ref url) = options.api_url {
        settings.api_url = normalize_url(url);
    }
    if let Some(ref user) = options.username {
        settings.username = non_empty(user);
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(ext: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{}", ext))
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_toml_config() {
        let file = write_config(
            "toml",
            r#"
api_url = "https://asknarelle-backend.example.com/"
user = "alice@example.com"
chunk_size = 1500
"#,
        );
        let config = Config::load_from_path(file.path()).await.unwrap();
        assert_eq!(config.username.as_deref(), Some("alice@example.com"));
        assert_eq!(config.chunk_size, Some(1500));
        assert_eq!(config.source_path.as_deref(), Some(file.path()));

        let settings = resolve_settings(&config, &EnvOverrides::default(), &LoadOptions::default());
        assert_eq!(settings.api_url, "https://asknarelle-backend.example.com");
        assert_eq!(settings.video_api_url, settings.api_url);
        assert_eq!(settings.chunking.chunk_size, 1500);
        assert_eq!(settings.chunking.overlap, 100);
    }

    #[tokio::test]
    async fn test_load_yaml_config_with_video_service() {
        let file = write_config(
            "yaml",
            "api_url: http://localhost:5000\nvideo_api_url: http://localhost:8000\n",
        );
        let config = Config::load_from_path(file.path()).await.unwrap();
        let settings = resolve_settings(&config, &EnvOverrides::default(), &LoadOptions::default());
        assert_eq!(settings.api_url, "http://localhost:5000");
        assert_eq!(settings.video_api_url, "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_load_json_config_rejects_garbage() {
        let file = write_config("json", "{ not json");
        let err = Config::load_from_path(file.path()).await.unwrap_err();
        assert!(err.contains("JSON"));
    }

    fn config_with_video_service() -> Config {
        Config {
            api_url: Some("http://config:5000".to_string()),
            video_api_url: Some("http://video:8000".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_env_overrides_beat_config() {
        let config = Config {
            api_url: Some("http://config:5000".to_string()),
            ..Default::default()
        };
        let env = EnvOverrides {
            api_url: Some("http://env:5000/".to_string()),
            username: Some("carol".to_string()),
            ..Default::default()
        };
        let settings = resolve_settings(&config, &env, &LoadOptions::default());

        assert_eq!(settings.api_url, "http://env:5000");
        assert_eq!(settings.video_api_url, "http://env:5000");
        assert_eq!(settings.username.as_deref(), Some("carol"));
    }

    #[test]
    fn test_flags_beat_env() {
        let env = EnvOverrides {
            username: Some("from-env".to_string()),
            video_api_url: Some("http://env-video:8000".to_string()),
            ..Default::default()
        };
        let options = LoadOptions {
            api_url: Some("http://flag:5000".to_string()),
            video_api_url: Some("http://video:8000".to_string()),
            username: Some("from-flag".to_string()),
            ..Default::default()
        };
        let settings = resolve_settings(&Config::default(), &env, &options);
        assert_eq!(settings.api_url, "http://flag:5000");
        assert_eq!(settings.video_api_url, "http://video:8000");
        assert_eq!(settings.username.as_deref(), Some("from-flag"));
    }

    #[test]
    fn test_env_api_url_keeps_configured_video_service() {
        let env = EnvOverrides {
            api_url: Some("http://env:5000".to_string()),
            ..Default::default()
        };
        let settings = resolve_settings(&config_with_video_service(), &env, &LoadOptions::default());
        assert_eq!(settings.api_url, "http://env:5000");
        assert_eq!(settings.video_api_url, "http://video:8000");
    }

    #[test]
    fn test_flag_api_url_keeps_configured_video_service() {
        let options = LoadOptions {
            api_url: Some("http://flag:5000".to_string()),
            ..Default::default()
        };
        let settings =
            resolve_settings(&config_with_video_service(), &EnvOverrides::default(), &options);
        assert_eq!(settings.api_url, "http://flag:5000");
        assert_eq!(settings.video_api_url, "http://video:8000");
    }

    #[test]
    fn test_env_video_service_beats_config() {
        let env = EnvOverrides {
            video_api_url: Some("http://env-video:8000/".to_string()),
            ..Default::default()
        };
        let settings = resolve_settings(&config_with_video_service(), &env, &LoadOptions::default());
        assert_eq!(settings.api_url, "http://config:5000");
        assert_eq!(settings.video_api_url, "http://env-video:8000");
    }

    #[test]
    fn test_blank_user_is_ignored() {
        let mut settings = Settings::default();
        Config {
            username: Some("   ".to_string()),
            ..Default::default()
        }
        .apply_to_settings(&mut settings);
        assert_eq!(settings.username, None);
    }
}
