//! Query Guard Configuration
//!
//! Explicit configuration object handed to every component that needs it.
//! Loaded from `~/.config/query-guard/config.toml` by the CLI.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`QUERY_GUARD_*`)
//! 2. Config file
//! 3. Defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};
use crate::fuzzy::{DEFAULT_MAX_DISTANCE, DEFAULT_MAX_SUGGESTIONS};

/// Rows sampled per MATCH filter when looking for pattern hits
pub const DEFAULT_SAMPLE_ROW_LIMIT: u64 = 1000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GuardConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub validation: ValidationSettings,

    #[serde(default)]
    pub results: ResultSettings,
}

/// Remote query endpoint
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Base URL of the analytics server
    pub url: Option<String>,

    /// Path of the query endpoint, relative to `url`
    #[serde(default = "default_query_path")]
    pub query_path: String,

    /// Opaque token obtained by the caller
    pub api_token: Option<String>,

    /// Header the token is sent in
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
}

fn default_query_path() -> String {
    "api/v1/vizql-data-service/query-datasource".to_string()
}

fn default_auth_header() -> String {
    "X-Auth-Token".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            query_path: default_query_path(),
            api_token: None,
            auth_header: default_auth_header(),
        }
    }
}

impl ServerConfig {
    /// Server URL, or a config error naming what is missing
    pub fn server_url(&self) -> Result<&str> {
        self.url.as_deref().ok_or_else(|| GuardError::ConfigError {
            reason: "server.url is not set (or QUERY_GUARD_SERVER_URL)".to_string(),
        })
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("url", &self.url)
            .field("query_path", &self.query_path)
            .field("api_token", &self.api_token.as_deref().map(|t| mask_token(t, 4)))
            .field("auth_header", &self.auth_header)
            .finish()
    }
}

/// Filter value correction knobs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationSettings {
    /// Check SET/MATCH filter values against live data
    #[serde(default = "default_true")]
    pub filter_validation: bool,

    #[serde(default = "default_max_distance")]
    pub max_distance: usize,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    #[serde(default = "default_sample_row_limit")]
    pub sample_row_limit: u64,
}

fn default_true() -> bool {
    true
}

fn default_max_distance() -> usize {
    DEFAULT_MAX_DISTANCE
}

fn default_max_suggestions() -> usize {
    DEFAULT_MAX_SUGGESTIONS
}

fn default_sample_row_limit() -> u64 {
    DEFAULT_SAMPLE_ROW_LIMIT
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            filter_validation: true,
            max_distance: DEFAULT_MAX_DISTANCE,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            sample_row_limit: DEFAULT_SAMPLE_ROW_LIMIT,
        }
    }
}

/// Result shaping for guarded execution
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultSettings {
    /// Cap on rows returned to the caller
    pub max_result_limit: Option<usize>,
}

impl GuardConfig {
    /// Get the config directory path
    ///
    /// Returns `~/.config/query-guard/` on Unix, `%APPDATA%/query-guard/` on Windows
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("query-guard")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file
    ///
    /// Returns default config if the file doesn't exist.
    /// Returns error if the file exists but is malformed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GuardError::ConfigError {
            reason: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GuardError::ConfigError {
            reason: format!("Failed to parse config file: {}", e),
        })
    }

    /// Merge with environment variables
    ///
    /// Non-empty environment variables take precedence over file values.
    pub fn with_env(mut self) -> Self {
        if let Some(url) = non_empty_env("QUERY_GUARD_SERVER_URL") {
            self.server.url = Some(url);
        }
        if let Some(token) = non_empty_env("QUERY_GUARD_API_TOKEN") {
            self.server.api_token = Some(token);
        }
        if let Some(flag) = non_empty_env("QUERY_GUARD_DISABLE_FILTER_VALIDATION") {
            self.validation.filter_validation = !is_truthy(&flag);
        }
        if let Some(limit) = non_empty_env("QUERY_GUARD_MAX_RESULT_LIMIT") {
            match limit.parse::<usize>() {
                Ok(n) if n > 0 => self.results.max_result_limit = Some(n),
                _ => tracing::warn!(value = %limit, "Ignoring invalid QUERY_GUARD_MAX_RESULT_LIMIT"),
            }
        }
        self
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Mask a token for display
///
/// Shows first N chars + asterisks, e.g. "abcd***"
pub fn mask_token(token: &str, visible_chars: usize) -> String {
    if token.is_empty() {
        return String::new();
    }

    let visible: String = token.chars().take(visible_chars).collect();
    format!("{}***", visible)
}
