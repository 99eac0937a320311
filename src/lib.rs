//! ERP MCP Gateway Library
//!
//! A protocol-translation gateway that exposes ERP sales, indent and
//! project-node operations as named tools, over both MCP (JSON-RPC 2.0) and
//! plain REST. Every tool call becomes exactly one HTTP request to the ERP
//! backend, with cache-aside GET caching and bounded retry.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the server and its transports
//! - **domains**: business logic
//!   - **cache**: response cache with Redis and in-memory backends
//!   - **backend**: per-request identity and the request executor
//!   - **tools**: tool descriptors, validation, invoker, OpenAPI
//!
//! # Example
//!
//! ```rust,no_run
//! use erp_mcp_gateway::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
