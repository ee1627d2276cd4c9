//! services/console/src/error.rs
//!
//! Defines the primary error type for the entire console service.

use crate::config::ConfigError;
use school_console_core::ports::PortError;

/// The primary error type for the `console` service.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying HTTP client library.
    #[error("HTTP Client Error: {0}")]
    Http(#[from] reqwest::Error),
}
