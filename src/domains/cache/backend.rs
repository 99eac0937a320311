//! The contract every cache engine implements.

use std::time::Duration;

use async_trait::async_trait;

use super::CacheError;

/// Connection status of a cache backend, as reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Caching is turned off by configuration.
    Disabled,
    /// No connection has been made yet (or it was dropped).
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// Ready to serve commands.
    Connected,
    /// The last connection attempt failed.
    Unavailable,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Unavailable => "unavailable",
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Self::Disabled => 0,
            Self::Disconnected => 1,
            Self::Connecting => 2,
            Self::Connected => 3,
            Self::Unavailable => 4,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Disabled,
            2 => Self::Connecting,
            3 => Self::Connected,
            4 => Self::Unavailable,
            _ => Self::Disconnected,
        }
    }
}

/// Raw string key/value operations with optional expiry.
///
/// Implementations report failures honestly; deciding that a failure means
/// "no cache" is the job of [`super::CacheStore`].
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Current connection status.
    fn status(&self) -> CacheStatus;

    /// Fetch the raw value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`. `None` means no expiry.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Remove `key`.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Whether `key` currently holds a value.
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Release any held connection.
    async fn disconnect(&self) {}
}
