//! Resilience configuration parsed from environment variables.

use std::time::Duration;

use crate::error::ErrorCode;
use crate::retry::RetryPolicy;

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_GENERAL_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_GENERAL_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_GENERAL_MAX_DELAY_MS: u64 = 10_000;
pub const DEFAULT_AI_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_AI_BASE_DELAY_MS: u64 = 2000;
pub const DEFAULT_AI_MAX_DELAY_MS: u64 = 15_000;
pub const DEFAULT_RATE_LIMIT_MAX_DELAY_MS: u64 = 60_000;
pub const DEFAULT_OFFLINE_QUEUE_KEY: &str = "scholar-assist.offline-queue";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable: {var}")]
    Missing { var: String },
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
    #[error("http client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "E_CONFIG_MISSING",
            Self::Invalid { .. } => "E_CONFIG_INVALID",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }
}

/// Named retry policies, one per operation class.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyTable {
    pub general: RetryPolicy,
    pub ai_service: RetryPolicy,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self { general: RetryPolicy::general(), ai_service: RetryPolicy::ai_service() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResilienceConfig {
    pub policies: PolicyTable,
    /// Store key the offline queue persists under.
    pub offline_queue_key: String,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self { policies: PolicyTable::default(), offline_queue_key: DEFAULT_OFFLINE_QUEUE_KEY.to_string() }
    }
}

impl ResilienceConfig {
    /// Build config from environment variables. Unparseable values fall back to defaults.
    ///
    /// Optional:
    /// - `ASSIST_REQUEST_TIMEOUT_MS`: default 30000
    /// - `ASSIST_GENERAL_MAX_ATTEMPTS` / `_BASE_DELAY_MS` / `_MAX_DELAY_MS`: 3 / 1000 / 10000
    /// - `ASSIST_AI_MAX_ATTEMPTS` / `_BASE_DELAY_MS` / `_MAX_DELAY_MS`: 3 / 2000 / 15000
    /// - `ASSIST_RATE_LIMIT_MAX_DELAY_MS`: default 60000
    /// - `ASSIST_OFFLINE_QUEUE_KEY`: default `scholar-assist.offline-queue`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ResilienceConfig::from_env`] over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let timeout = Duration::from_millis(env_parse(&lookup, "ASSIST_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS));
        let rate_limit_max_delay =
            Duration::from_millis(env_parse(&lookup, "ASSIST_RATE_LIMIT_MAX_DELAY_MS", DEFAULT_RATE_LIMIT_MAX_DELAY_MS));

        let general = RetryPolicy {
            max_attempts: env_parse(&lookup, "ASSIST_GENERAL_MAX_ATTEMPTS", DEFAULT_GENERAL_MAX_ATTEMPTS),
            base_delay: Duration::from_millis(env_parse(
                &lookup,
                "ASSIST_GENERAL_BASE_DELAY_MS",
                DEFAULT_GENERAL_BASE_DELAY_MS,
            )),
            max_delay: Duration::from_millis(env_parse(&lookup, "ASSIST_GENERAL_MAX_DELAY_MS", DEFAULT_GENERAL_MAX_DELAY_MS)),
            timeout,
            ..RetryPolicy::general()
        };

        let ai_service = RetryPolicy {
            max_attempts: env_parse(&lookup, "ASSIST_AI_MAX_ATTEMPTS", DEFAULT_AI_MAX_ATTEMPTS),
            base_delay: Duration::from_millis(env_parse(&lookup, "ASSIST_AI_BASE_DELAY_MS", DEFAULT_AI_BASE_DELAY_MS)),
            max_delay: Duration::from_millis(env_parse(&lookup, "ASSIST_AI_MAX_DELAY_MS", DEFAULT_AI_MAX_DELAY_MS)),
            rate_limit_max_delay,
            timeout,
            ..RetryPolicy::ai_service()
        };

        let offline_queue_key = lookup("ASSIST_OFFLINE_QUEUE_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_OFFLINE_QUEUE_KEY.to_string());

        Self { policies: PolicyTable { general, ai_service }, offline_queue_key }
    }
}

/// Settings for the reqwest-backed transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub connect_timeout_secs: u64,
}

impl HttpConfig {
    /// Build HTTP config from environment variables.
    ///
    /// Required:
    /// - `ASSIST_API_BASE_URL`
    ///
    /// Optional:
    /// - `ASSIST_API_KEY_ENV` (names the env var containing a bearer token)
    /// - `ASSIST_CONNECT_TIMEOUT_SECS`: default 10
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("ASSIST_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing { var: "ASSIST_API_BASE_URL".into() })?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "ASSIST_API_BASE_URL".into(),
                reason: format!("expected an http(s) URL, got '{base_url}'"),
            });
        }
        let base_url = base_url.trim_end_matches('/').to_string();

        let api_key = match lookup("ASSIST_API_KEY_ENV") {
            Some(key_var) => Some(lookup(&key_var).ok_or(ConfigError::Missing { var: key_var })?),
            None => None,
        };

        let connect_timeout_secs = env_parse(&lookup, "ASSIST_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS);

        Ok(Self { base_url, api_key, connect_timeout_secs })
    }
}

/// Read and parse `key` through `lookup`, falling back to `default`.
fn env_parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
