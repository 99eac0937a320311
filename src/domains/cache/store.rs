//! JSON cache-aside store.
//!
//! Wraps a [`CacheBackend`] with JSON (de)serialization and failure
//! degradation. Every backend error is logged and turned into "no cache":
//! `get` misses, `set`/`delete`/`exists` return `false`. A corrupt stored
//! value is a miss too. Callers never see a cache error.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use super::{CacheBackend, CacheStatus, MemoryBackend, RedisBackend};
use crate::core::config::{CacheBackendKind, CacheConfig};

/// Key prefix shared by every cached backend response.
const KEY_PREFIX: &str = "cache";

/// User segment used when a request carries no user id.
pub const DEFAULT_CACHE_USER: &str = "default";

/// Shared, optional read-through cache.
#[derive(Clone)]
pub struct CacheStore {
    backend: Option<Arc<dyn CacheBackend>>,
}

impl CacheStore {
    /// Create an enabled store over `backend`.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Create a store that never caches.
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Build the store described by configuration.
    ///
    /// An unusable Redis URL disables caching rather than failing startup.
    pub fn from_config(config: &CacheConfig) -> Self {
        if !config.enabled {
            debug!("Response cache disabled");
            return Self::disabled();
        }

        match config.backend {
            CacheBackendKind::Memory => Self::new(Arc::new(MemoryBackend::new())),
            CacheBackendKind::Redis => match RedisBackend::new(&config.redis_url) {
                Ok(backend) => Self::new(Arc::new(backend)),
                Err(e) => {
                    warn!("Invalid Redis configuration, caching disabled: {}", e);
                    Self::disabled()
                }
            },
        }
    }

    /// Build the key for a backend response: `cache:{user}:{url}`.
    pub fn key_for(user_id: Option<&str>, url: &str) -> String {
        let user = user_id.filter(|u| !u.is_empty()).unwrap_or(DEFAULT_CACHE_USER);
        format!("{}:{}:{}", KEY_PREFIX, user, url)
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn status(&self) -> CacheStatus {
        self.backend
            .as_ref()
            .map(|b| b.status())
            .unwrap_or(CacheStatus::Disabled)
    }

    /// Look up a cached JSON value.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let backend = self.backend.as_ref()?;

        let raw = match backend.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Cache get failed for {} ({}): {}", key, backend.name(), e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding unparsable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Store a JSON value. Every entry expires; the TTL is at least one second.
    pub async fn set(&self, key: &str, value: &Value, ttl_secs: u64) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Cannot serialize cache entry {}: {}", key, e);
                return false;
            }
        };

        let ttl = Duration::from_secs(ttl_secs.max(1));
        match backend.set(key, raw, Some(ttl)).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Cache set failed for {} ({}): {}", key, backend.name(), e);
                false
            }
        }
    }

    pub async fn delete(&self, key: &str) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };

        match backend.delete(key).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Cache delete failed for {}: {}", key, e);
                false
            }
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };

        match backend.exists(key).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Cache exists failed for {}: {}", key, e);
                false
            }
        }
    }

    /// Close the backend connection. Called once at shutdown.
    pub async fn disconnect(&self) {
        if let Some(backend) = self.backend.as_ref() {
            backend.disconnect().await;
        }
    }
}
