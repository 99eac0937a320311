//! Cache domain module.
//!
//! An optional cache-aside accelerator for backend GET responses. The cache
//! is never the system of record: when it is missing, broken or disabled the
//! gateway stays correct and only gets slower.
//!
//! ## Architecture
//!
//! - `backend.rs` - The `CacheBackend` trait and connection status
//! - `redis_backend.rs` - Shared Redis cache with lazy connection
//! - `memory.rs` - In-process cache
//! - `store.rs` - JSON wrapper that degrades failures to cache misses

mod backend;
mod error;
mod memory;
mod redis_backend;
mod store;

pub use backend::{CacheBackend, CacheStatus};
pub use error::CacheError;
pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;
pub use store::{CacheStore, DEFAULT_CACHE_USER};
