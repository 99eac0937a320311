//! Transport configuration types.

use serde::{Deserialize, Serialize};

#[cfg(feature = "http")]
use crate::core::config::{env_flag, env_non_empty, env_parse};

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport (MCP only).
    #[cfg(feature = "stdio")]
    Stdio,

    /// HTTP transport: REST tools plus JSON-RPC over POST.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// HTTP transport configuration.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path for JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,

    /// Rate limiting of the REST tool endpoints.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Fixed-window rate limit applied per client to `/tools/*`.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether limiting is active.
    pub enabled: bool,

    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Requests allowed per client per window.
    pub max_requests: u32,
}

#[cfg(feature = "http")]
fn default_host() -> String {
    "0.0.0.0".to_string()
}

#[cfg(feature = "http")]
fn default_rpc_path() -> String {
    "/".to_string()
}

#[cfg(feature = "http")]
fn default_cors() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "http")]
        {
            return Self::Http(HttpConfig::default());
        }

        #[cfg(all(not(feature = "http"), feature = "stdio"))]
        {
            return Self::Stdio;
        }

        #[cfg(not(any(feature = "stdio", feature = "http")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio or http");
        }
    }
}

#[cfg(feature = "http")]
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[cfg(feature = "http")]
impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_ms: 60_000,
            max_requests: 100,
        }
    }
}

#[cfg(feature = "http")]
impl HttpConfig {
    /// Load HTTP settings from `MCP_HTTP_*`, `PORT` and `RATE_LIMIT_*`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = env_non_empty("MCP_HTTP_PORT")
            .or_else(|| env_non_empty("PORT"))
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        Self {
            port,
            host: env_non_empty("MCP_HTTP_HOST").unwrap_or(defaults.host),
            rpc_path: env_non_empty("MCP_HTTP_PATH").unwrap_or(defaults.rpc_path),
            enable_cors: env_flag("MCP_HTTP_CORS").unwrap_or(defaults.enable_cors),
            rate_limit: RateLimitConfig::from_env(),
        }
    }
}

#[cfg(feature = "http")]
impl RateLimitConfig {
    /// Load rate limit settings from `RATE_LIMIT_*`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_flag("RATE_LIMIT_ENABLED").unwrap_or(defaults.enabled),
            window_ms: env_parse("RATE_LIMIT_WINDOW_MS", defaults.window_ms).max(1),
            max_requests: env_parse("RATE_LIMIT_MAX_REQUESTS", defaults.max_requests),
        }
    }
}

impl TransportConfig {
    /// Create a STDIO transport config.
    #[cfg(feature = "stdio")]
    pub fn stdio() -> Self {
        Self::Stdio
    }

    /// Create an HTTP transport config.
    #[cfg(feature = "http")]
    pub fn http(port: u16, host: impl Into<String>) -> Self {
        Self::Http(HttpConfig {
            port,
            host: host.into(),
            ..Default::default()
        })
    }

    /// Load transport config from environment variables.
    pub fn from_env() -> Self {
        let transport = std::env::var("MCP_TRANSPORT")
            .unwrap_or_default()
            .to_lowercase();

        match transport.as_str() {
            #[cfg(feature = "stdio")]
            "stdio" => Self::Stdio,
            #[cfg(feature = "http")]
            _ => Self::Http(HttpConfig::from_env()),
            #[cfg(not(feature = "http"))]
            _ => Self::Stdio,
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {}:{}", cfg.host, cfg.port),
        }
    }

    /// Check if this transport is the standard STDIO mode.
    pub fn is_stdio(&self) -> bool {
        #[cfg(feature = "stdio")]
        {
            matches!(self, Self::Stdio)
        }
        #[cfg(not(feature = "stdio"))]
        {
            false
        }
    }
}
