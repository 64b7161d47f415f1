//! Startup configuration
//!
//! Everything is read once from the environment. The API credential is the
//! only required value; its absence stops the process before it binds.

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_IDLE_TTL_SECS: u64 = 60 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Completion API settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Remote relay endpoint; the in-process relay is used when unset
    pub relay_url: Option<String>,
    /// Deadline for one relay round trip
    pub request_timeout: Duration,
    /// How long an untouched conversation is kept
    pub idle_ttl: Duration,
    pub llm: LlmConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let port: u16 = match get("CONCIERGE_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "CONCIERGE_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let positive_secs = |name: &'static str, default: u64| match get(name) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                _ => Err(ConfigError::Invalid { name, value }),
            },
            None => Ok(Duration::from_secs(default)),
        };
        let request_timeout = positive_secs("CONCIERGE_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let idle_ttl = positive_secs("CONCIERGE_IDLE_TTL_SECS", DEFAULT_IDLE_TTL_SECS)?;

        let base_url = get("OPENAI_BASE_URL")
            .map_or_else(|| DEFAULT_BASE_URL.to_string(), |url| {
                url.trim_end_matches('/').to_string()
            });

        Ok(Self {
            port,
            relay_url: get("CONCIERGE_RELAY_URL"),
            request_timeout,
            idle_ttl,
            llm: LlmConfig {
                api_key,
                base_url,
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                timeout: request_timeout,
            },
        })
    }
}
