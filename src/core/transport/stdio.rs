//! STDIO transport implementation.
//!
//! MCP over stdin/stdout through rmcp. There are no request headers here, so
//! every tool call runs with the identity built from configured defaults.

use rmcp::ServiceExt;
use tracing::info;

use super::{TransportError, TransportResult};
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Run the STDIO transport until the client disconnects.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        info!("Ready - communicating via stdin/stdout");

        let service = server
            .clone()
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(e.to_string()))?;

        let waited = service
            .waiting()
            .await
            .map_err(|e| TransportError::service(e.to_string()));

        server.shutdown().await;
        info!("STDIO transport finished");
        waited.map(|_| ())
    }
}
