//! Transport layer for the gateway.
//!
//! - **HTTP**: REST tool routes plus MCP JSON-RPC over POST - feature: `http` (default)
//! - **STDIO**: MCP over standard input/output - feature: `stdio`
//!
//! Both front ends call tools through the same [`crate::core::McpServer`].

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub mod rate_limit;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::{HttpConfig, RateLimitConfig};
