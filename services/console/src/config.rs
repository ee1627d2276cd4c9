//! services/console/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
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
    /// Base URL of the remote school API, e.g. `https://api.example.org`.
    pub api_base_url: String,
    /// Where the session mirror (token, role, school name) is persisted.
    pub session_file: PathBuf,
    pub request_timeout: Duration,
    pub log_level: Level,
    /// Optional credentials for the smoke binary's automatic login.
    pub login_email: Option<String>,
    pub login_password: Option<String>,
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

        let api_base_url = std::env::var("CONSOLE_API_URL")
            .map_err(|_| ConfigError::MissingVar("CONSOLE_API_URL".to_string()))?;

        let session_file = std::env::var("CONSOLE_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.console-session.json"));

        let timeout_str =
            std::env::var("CONSOLE_REQUEST_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("CONSOLE_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let login_email = std::env::var("CONSOLE_EMAIL").ok();
        let login_password = std::env::var("CONSOLE_PASSWORD").ok();

        Ok(Self {
            api_base_url,
            session_file,
            request_timeout: Duration::from_secs(timeout_secs),
            log_level,
            login_email,
            login_password,
        })
    }
}
