//! Cache-specific error types.

use thiserror::Error;

/// Errors raised by cache backends.
///
/// These never escape [`super::CacheStore`]: the store logs them and
/// degrades to "no cache" behavior.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Establishing the connection to the cache failed.
    #[error("Cache connection failed: {0}")]
    Connection(String),

    /// A previous connection attempt failed and the cool-down has not elapsed.
    #[error("Cache unavailable")]
    Unavailable,

    /// A command against an established connection failed.
    #[error("Cache operation failed: {0}")]
    Operation(String),

    /// A value could not be serialized for storage.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Create a new connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a new operation error.
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::Operation(err.to_string())
    }
}
