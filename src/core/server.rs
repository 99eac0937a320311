//! Gateway server and lifecycle management.
//!
//! [`McpServer`] owns the shared context every front end needs: the
//! configuration, the tool invoker (with its executor and cache) and the
//! rmcp tool router. It is built once at startup and cloned cheaply into
//! each transport.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

use super::config::Config;
use super::error::Error;
use crate::domains::backend::{BackendIdentity, IdentityHeaders, RequestExecutor};
use crate::domains::cache::{CacheStatus, CacheStore};
use crate::domains::tools::{
    Arguments, ToolError, ToolInvocation, ToolInvoker, ToolRegistry, build_tool_router,
};

/// MCP protocol revision announced to clients.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

const INSTRUCTIONS: &str = "ERP gateway. Tools check and create leads, manage events and \
     event teams, capture conversations and summaries, raise indents, and search or update \
     project nodes. Pass erptoken/baseurl/userid headers to act on a specific ERP tenant.";

/// The gateway server.
///
/// Implements `ServerHandler` for the rmcp transports and exposes the same
/// operations directly for the HTTP front end.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Tool invoker shared by every transport.
    invoker: Arc<ToolInvoker>,

    /// Tool router for rmcp transports.
    tool_router: ToolRouter<Self>,

    started_at: Instant,
}

impl McpServer {
    /// Create the server and its shared context from configuration.
    pub fn new(config: Config) -> crate::core::Result<Self> {
        let base_url = &config.backend.default_base_url;
        match reqwest::Url::parse(base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(Error::config(format!(
                    "DEFAULT_ERP_BASE_URL must be http(s), got scheme {:?}",
                    url.scheme()
                )));
            }
            Err(e) => {
                return Err(Error::config(format!(
                    "invalid DEFAULT_ERP_BASE_URL {:?}: {}",
                    base_url, e
                )));
            }
        }

        let cache = Arc::new(CacheStore::from_config(&config.cache));
        let executor = RequestExecutor::from_config(&config, cache)?;
        let invoker = ToolInvoker::new(ToolRegistry::new(), executor);
        Ok(Self::with_invoker(config, invoker))
    }

    /// Create the server around an already built invoker.
    pub fn with_invoker(config: Config, invoker: ToolInvoker) -> Self {
        let config = Arc::new(config);
        let invoker = Arc::new(invoker);
        let defaults = BackendIdentity::from_defaults(&config.backend);

        info!(
            "Gateway ready: {} tools, backend {}, cache {}",
            invoker.registry().len(),
            config.backend.default_base_url,
            invoker.executor().cache().status().as_str()
        );

        Self {
            tool_router: build_tool_router::<Self>(invoker.clone(), defaults),
            config,
            invoker,
            started_at: Instant::now(),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn invoker(&self) -> &Arc<ToolInvoker> {
        &self.invoker
    }

    pub fn cache_status(&self) -> CacheStatus {
        self.invoker.executor().cache().status()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Instructions sent in the `initialize` result.
    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all tools as `{ name, description, inputSchema }`, in catalog order.
    pub fn list_tools(&self) -> Vec<Value> {
        self.invoker
            .registry()
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": Value::Object(tool.input_schema()),
                })
            })
            .collect()
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.invoker.list_tool_names()
    }

    pub fn tool_exists(&self, name: &str) -> bool {
        self.invoker.tool_exists(name)
    }

    /// Resolve caller headers against the configured defaults.
    pub fn identity_for(&self, headers: &IdentityHeaders) -> BackendIdentity {
        BackendIdentity::resolve(headers, &self.config.backend)
    }

    /// Call a tool by name with the caller's identity headers.
    #[instrument(skip(self, arguments, headers))]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Arguments,
        headers: &IdentityHeaders,
    ) -> Result<Value, ToolError> {
        let invocation = ToolInvocation::new(name, arguments, self.identity_for(headers));
        self.invoker.invoke(&invocation).await
    }

    /// Release long-lived resources. Called once the transport has stopped.
    pub async fn shutdown(&self) {
        info!("Shutting down: closing cache connection");
        self.invoker.executor().cache().disconnect().await;
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}
