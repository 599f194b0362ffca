//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::client::{ClientConfig, DocumentQuery, DEFAULT_API_BASE};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub documents: DocumentsConfig,

    #[serde(default)]
    pub chats: ChatsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

/// Where the bearer token lives
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_token_file")]
    pub token_file: String,
}

fn default_token_file() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("sentinel").join("session.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./sentinel_session.json".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
        }
    }
}

/// Document listing parameters
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_page_limit")]
    pub limit: u32,

    #[serde(default)]
    pub offset: u32,

    #[serde(default = "default_status_filter")]
    pub status: String,

    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    #[serde(default = "default_sort_order")]
    pub sort_order: String,
}

fn default_page_limit() -> u32 {
    20
}

fn default_status_filter() -> String {
    "completed".to_string()
}

fn default_sort_by() -> String {
    "filename".to_string()
}

fn default_sort_order() -> String {
    "asc".to_string()
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            limit: default_page_limit(),
            offset: 0,
            status: default_status_filter(),
            sort_by: default_sort_by(),
            sort_order: default_sort_order(),
        }
    }
}

impl DocumentsConfig {
    pub fn query(&self) -> DocumentQuery {
        DocumentQuery {
            limit: self.limit,
            offset: self.offset,
            status: self.status.clone(),
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order.clone(),
        }
    }
}

/// Chat log fetching
#[derive(Debug, Clone, Deserialize)]
pub struct ChatsConfig {
    #[serde(default = "default_chat_limit")]
    pub limit: u32,
}

fn default_chat_limit() -> u32 {
    100
}

impl Default for ChatsConfig {
    fn default() -> Self {
        Self {
            limit: default_chat_limit(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("sentinel").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SENTINEL_API_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = lookup("SENTINEL_REQUEST_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.api.request_timeout_secs = secs;
            }
        }
        if let Some(path) = lookup("SENTINEL_TOKEN_FILE") {
            self.session.token_file = path;
        }
        if let Some(level) = lookup("SENTINEL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("SENTINEL_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Sentinel Console Configuration
#
# Environment variables override these settings:
# - SENTINEL_API_URL
# - SENTINEL_REQUEST_TIMEOUT
# - SENTINEL_TOKEN_FILE
# - SENTINEL_LOG_LEVEL
# - SENTINEL_LOG_FORMAT

[api]
# Backend base URL
base_url = "https://api.nswebassistant.site"

# Request timeout in seconds
request_timeout_secs = 30

[session]
# File holding the bearer token
# token_file = "~/.local/share/sentinel/session.json"

[documents]
# Listing page and filter
limit = 20
offset = 0
status = "completed"
sort_by = "filename"
sort_order = "asc"

[chats]
# Maximum chat log entries fetched at once
limit = 100

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
