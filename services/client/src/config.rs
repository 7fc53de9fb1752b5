//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use storybook_core::{AuthPolicy, Language, PolicyTable};
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub log_level: Level,
    pub device_id: Option<String>,
    pub settings_path: Option<PathBuf>,
    pub assets_path: PathBuf,
    pub default_language: Language,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
    pub stats_delay: Duration,
    pub auth_policy: AuthPolicy,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Backend Settings ---
        let api_base_url = std::env::var("STORYBOOK_API_URL")
            .map_err(|_| ConfigError::MissingVar("STORYBOOK_API_URL".to_string()))?;
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "STORYBOOK_API_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_base_url),
            ));
        }

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let request_timeout = Duration::from_secs(parse_number("REQUEST_TIMEOUT_SECS", 30)?);

        // --- Load Device and Local Storage Settings ---
        let device_id = std::env::var("DEVICE_ID")
            .ok()
            .filter(|id| !id.trim().is_empty());
        let settings_path = std::env::var("SETTINGS_PATH").ok().map(PathBuf::from);
        let assets_path = std::env::var("ASSETS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./assets"));
        let default_language = std::env::var("DEFAULT_LANGUAGE")
            .map(Language::new)
            .unwrap_or_default();

        // --- Load Session Flow Timing ---
        let poll_interval = Duration::from_millis(parse_number("POLL_INTERVAL_MS", 1000)?);
        let poll_max_attempts = parse_number("POLL_MAX_ATTEMPTS", 30)? as u32;
        let stats_delay = Duration::from_millis(parse_number("STATS_DELAY_MS", 1500)?);

        let auth_policy = match std::env::var("AUTH_POLICY") {
            Ok(value) => AuthPolicy::parse(&value).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "AUTH_POLICY".to_string(),
                    format!("'{}' is not a known auth policy", value),
                )
            })?,
            Err(_) => AuthPolicy::default(),
        };

        Ok(Self {
            api_base_url,
            log_level,
            device_id,
            settings_path,
            assets_path,
            default_language,
            request_timeout,
            poll_interval,
            poll_max_attempts,
            stats_delay,
            auth_policy,
        })
    }

    /// Builds a configuration pointing at `api_base_url` with default timings.
    pub fn for_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            log_level: Level::INFO,
            device_id: None,
            settings_path: None,
            assets_path: PathBuf::from("./assets"),
            default_language: Language::default(),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(1000),
            poll_max_attempts: 30,
            stats_delay: Duration::from_millis(1500),
            auth_policy: AuthPolicy::default(),
        }
    }

    pub fn policy_table(&self) -> PolicyTable {
        PolicyTable::new(self.stats_delay)
    }
}

fn parse_number(var: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
