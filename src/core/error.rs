//! Error types for gateway startup.
//!
//! Tool, cache and transport failures have their own domain types; this is
//! what building the shared context can fail with.

use thiserror::Error;

/// A specialized Result type for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the gateway.
#[derive(Debug, Error)]
pub enum Error {
    /// Failure building the outbound HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
