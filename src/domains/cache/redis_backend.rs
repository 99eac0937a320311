//! Redis cache backend with a lazily established shared connection.
//!
//! The connection moves through `Disconnected -> Connecting -> Connected`.
//! A failed attempt parks the backend in `Unavailable` until the cool-down
//! elapses, so a dead Redis does not add connect latency to every request.
//! Connection state lives behind an async mutex: concurrent first users wait
//! for the single in-flight attempt instead of racing their own.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{CacheBackend, CacheError, CacheStatus};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

enum ConnectionState {
    Disconnected,
    Connected(MultiplexedConnection),
    Unavailable { since: Instant },
}

/// Redis-backed cache.
pub struct RedisBackend {
    client: redis::Client,
    state: Mutex<ConnectionState>,
    status: AtomicU8,
    retry_after: Duration,
}

impl RedisBackend {
    /// Create a backend for `url`. No I/O happens until first use.
    pub fn new(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(|e| CacheError::connection(e.to_string()))?;
        Ok(Self {
            client,
            state: Mutex::new(ConnectionState::Disconnected),
            status: AtomicU8::new(CacheStatus::Disconnected.to_u8()),
            retry_after: DEFAULT_RETRY_AFTER,
        })
    }

    /// Override how long to wait before retrying a failed connection.
    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    fn set_status(&self, status: CacheStatus) {
        self.status.store(status.to_u8(), Ordering::Relaxed);
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        let mut state = self.state.lock().await;

        match &*state {
            ConnectionState::Connected(conn) => return Ok(conn.clone()),
            ConnectionState::Unavailable { since } if since.elapsed() < self.retry_after => {
                return Err(CacheError::Unavailable);
            }
            _ => {}
        }

        self.set_status(CacheStatus::Connecting);
        debug!("Connecting to Redis");

        let attempt =
            tokio::time::timeout(CONNECT_TIMEOUT, self.client.get_multiplexed_async_connection())
                .await;

        match attempt {
            Ok(Ok(conn)) => {
                info!("Redis connected");
                *state = ConnectionState::Connected(conn.clone());
                self.set_status(CacheStatus::Connected);
                Ok(conn)
            }
            Ok(Err(e)) => {
                warn!("Failed to connect to Redis: {}", e);
                *state = ConnectionState::Unavailable {
                    since: Instant::now(),
                };
                self.set_status(CacheStatus::Unavailable);
                Err(CacheError::connection(e.to_string()))
            }
            Err(_) => {
                warn!("Timed out connecting to Redis after {:?}", CONNECT_TIMEOUT);
                *state = ConnectionState::Unavailable {
                    since: Instant::now(),
                };
                self.set_status(CacheStatus::Unavailable);
                Err(CacheError::connection("connect timed out"))
            }
        }
    }

    /// Drop a broken connection so the next call reconnects.
    async fn on_command_error(&self, err: redis::RedisError) -> CacheError {
        if err.is_io_error() || err.is_connection_dropped() || err.is_timeout() {
            let mut state = self.state.lock().await;
            if matches!(*state, ConnectionState::Connected(_)) {
                warn!("Redis connection lost: {}", err);
                *state = ConnectionState::Disconnected;
                self.set_status(CacheStatus::Disconnected);
            }
        }
        CacheError::from(err)
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn status(&self) -> CacheStatus {
        CacheStatus::from_u8(self.status.load(Ordering::Relaxed))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let result: redis::RedisResult<Option<String>> = conn.get(key).await;
        match result {
            Ok(value) => Ok(value),
            Err(e) => Err(self.on_command_error(e).await),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }

        let result: redis::RedisResult<()> = cmd.query_async(&mut conn).await;
        match result {
            Ok(()) => Ok(()),
            Err(e) => Err(self.on_command_error(e).await),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let result: redis::RedisResult<i64> = conn.del(key).await;
        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(self.on_command_error(e).await),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        let result: redis::RedisResult<bool> = conn.exists(key).await;
        match result {
            Ok(found) => Ok(found),
            Err(e) => Err(self.on_command_error(e).await),
        }
    }

    async fn disconnect(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, ConnectionState::Connected(_)) {
            info!("Redis disconnected");
        }
        *state = ConnectionState::Disconnected;
        self.set_status(CacheStatus::Disconnected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Port 1 is never a Redis server; connecting fails fast.
    const UNREACHABLE: &str = "redis://127.0.0.1:1/0";

    #[test]
    fn test_invalid_url_rejected() {
        assert!(RedisBackend::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_starts_disconnected() {
        let backend = RedisBackend::new(UNREACHABLE).unwrap();
        assert_eq!(backend.status(), CacheStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_unavailable() {
        let backend = RedisBackend::new(UNREACHABLE).unwrap();

        assert!(backend.get("key").await.is_err());
        assert_eq!(backend.status(), CacheStatus::Unavailable);

        // Within the cool-down no new attempt is made.
        assert!(matches!(
            backend.get("key").await,
            Err(CacheError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_reconnect_after_cool_down() {
        let backend = RedisBackend::new(UNREACHABLE)
            .unwrap()
            .with_retry_after(Duration::ZERO);

        assert!(backend.get("key").await.is_err());
        assert!(matches!(
            backend.get("key").await,
            Err(CacheError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_disconnect_resets_state() {
        let backend = RedisBackend::new(UNREACHABLE).unwrap();
        let _ = backend.exists("key").await;
        backend.disconnect().await;
        assert_eq!(backend.status(), CacheStatus::Disconnected);
    }
}
