//! In-process cache backend.
//!
//! Useful for single-instance deployments without Redis and as the cache
//! used by tests. Entries carry their own deadline so every `set` can use a
//! different TTL.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;

use super::{CacheBackend, CacheError, CacheStatus};

const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Bounded in-memory backend built on `moka`.
pub struct MemoryBackend {
    entries: Cache<String, MemoryEntry>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    async fn live_entry(&self, key: &str) -> Option<MemoryEntry> {
        let entry = self.entries.get(key).await?;
        if entry.is_expired() {
            self.entries.invalidate(key).await;
            return None;
        }
        Some(entry)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn status(&self) -> CacheStatus {
        CacheStatus::Connected
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.live_entry(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        let entry = MemoryEntry {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.invalidate(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.live_entry(key).await.is_some())
    }
}
