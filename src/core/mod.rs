//! Core module containing shared infrastructure components.
//!
//! Configuration, the unified error type, the server that owns the shared
//! gateway context, and the transports that expose it.

pub mod config;
pub mod error;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use server::{McpServer, PROTOCOL_VERSION};
pub use transport::{TransportConfig, TransportService};
