//! Client configuration loaded from environment variables
//!
//! # Environment Variables
//!
//! - `API_BASE_URL` - Backend origin (default: `http://localhost:5000`)
//! - `BURSAR_API_TOKEN` - Bearer token sent with every request (optional)
//! - `BURSAR_POLL_INTERVAL_SECS` - Refresh period in seconds (default: 30, max: one day)
//! - `BURSAR_REQUEST_TIMEOUT_MS` - Per-request timeout in milliseconds (optional, max: 10 minutes)

use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::infrastructure::polling::{DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

const MAX_REQUEST_TIMEOUT_MS: u64 = 600_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API_BASE_URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },
    #[error("Invalid {key} '{value}': expected an integer from 1 to {max}")]
    InvalidNumber {
        key: &'static str,
        value: String,
        max: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub poll_interval: Duration,
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_base_url = match get("API_BASE_URL") {
            Some(value) => validate_base_url(&value)?,
            None => DEFAULT_API_BASE_URL.to_string(),
        };

        let poll_interval = match get("BURSAR_POLL_INTERVAL_SECS") {
            Some(value) => Duration::from_secs(bounded(
                "BURSAR_POLL_INTERVAL_SECS",
                value,
                MAX_POLL_INTERVAL.as_secs(),
            )?),
            None => DEFAULT_POLL_INTERVAL,
        };

        let request_timeout = get("BURSAR_REQUEST_TIMEOUT_MS")
            .map(|value| {
                bounded("BURSAR_REQUEST_TIMEOUT_MS", value, MAX_REQUEST_TIMEOUT_MS)
                    .map(Duration::from_millis)
            })
            .transpose()?;

        Ok(Self {
            api_base_url,
            api_token: get("BURSAR_API_TOKEN"),
            poll_interval,
            request_timeout,
        })
    }
}

fn validate_base_url(value: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        value: value.to_string(),
        reason,
    };

    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(value.trim_end_matches('/').to_string())
}

fn bounded(key: &'static str, value: String, max: u64) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(n) if (1..=max).contains(&n) => Ok(n),
        _ => Err(ConfigError::InvalidNumber { key, value, max }),
    }
}

/// Load `.env.local` then `.env` from `dir`. Existing variables win.
pub fn load_dotenv(dir: &Path) {
    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = dir.join(filename);
        if path.exists() {
            if let Err(e) = dotenvy::from_path(&path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load env file");
            }
        }
    }
}
