//! ERP MCP Gateway Entry Point
//!
//! Initializes logging, loads configuration, builds the shared gateway
//! context and runs the configured transport until shutdown.

use anyhow::{Context, Result};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use erp_mcp_gateway::core::{Config, McpServer, TransportService};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging comes first so configuration warnings are not lost.
    dotenvy::dotenv().ok();
    init_logging(&std::env::var("MCP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

    let config = Config::from_env();

    info!("Starting {} v{}", config.server.name, config.server.version);

    let server = McpServer::new(config.clone()).context("failed to initialize gateway")?;

    let transport = TransportService::new(config.transport);
    transport.run(server).await?;

    info!("Server shut down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr; stdout belongs to the stdio transport.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
