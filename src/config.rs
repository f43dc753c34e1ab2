//! Configuration file parser for ~/.config/dapur/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde and logged as warnings so typos show up.
use crate::feed::{FeedSettings, DEFAULT_PAGE_LIMIT};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable that takes precedence over the `token` key.
pub const TOKEN_ENV_VAR: &str = "DAPUR_TOKEN";

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// 5 MiB
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// `Debug` masks `token`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the recipe API, e.g. `https://dapur.example.com/api`.
    pub api_url: String,

    /// Page size for the feed.
    pub page_limit: u32,

    /// Minimum time the feed refresh indicator stays up, in milliseconds.
    pub refresh_floor_ms: u64,

    /// Delay before the own-recipes refresh request, in milliseconds.
    pub profile_refresh_delay_ms: u64,

    pub request_timeout_secs: u64,

    /// Largest photo accepted for upload, before base64 encoding.
    pub max_image_bytes: u64,

    /// Bearer token (alternative to the DAPUR_TOKEN env var).
    /// Env var takes precedence over config file.
    pub token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            refresh_floor_ms: 800,
            profile_refresh_delay_ms: 500,
            request_timeout_secs: 30,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            token: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("page_limit", &self.page_limit)
            .field("refresh_floor_ms", &self.refresh_floor_ms)
            .field("profile_refresh_delay_ms", &self.profile_refresh_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Runtime knobs handed to [`crate::app::App`], derived from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub feed: FeedSettings,
    pub profile_refresh_delay: Duration,
    pub max_image_bytes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().settings()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "api_url",
        "page_limit",
        "refresh_floor_ms",
        "profile_refresh_delay_ms",
        "request_timeout_secs",
        "max_image_bytes",
        "token",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parses TOML text; whitespace-only input gives the defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(
            api_url = %config.api_url,
            page_limit = config.page_limit,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// The bearer token: `DAPUR_TOKEN` if set and non-empty, else `token`.
    pub fn token(&self) -> Option<SecretString> {
        self.token_with_env(std::env::var(TOKEN_ENV_VAR).ok())
    }

    fn token_with_env(&self, env: Option<String>) -> Option<SecretString> {
        env.filter(|t| !t.is_empty())
            .or_else(|| self.token.clone().filter(|t| !t.is_empty()))
            .map(SecretString::from)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn settings(&self) -> Settings {
        Settings {
            feed: FeedSettings {
                // A zero limit would make the server return nothing
                page_limit: self.page_limit.max(1),
                refresh_floor: Duration::from_millis(self.refresh_floor_ms),
            },
            profile_refresh_delay: Duration::from_millis(self.profile_refresh_delay_ms),
            max_image_bytes: self.max_image_bytes,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
