//! HTTP transport implementation.
//!
//! One axum server carries both front ends:
//! - MCP JSON-RPC 2.0 over `POST /` (path configurable)
//! - REST tools at `POST /tools/{name}`, with `GET /tools` and `GET /openapi.json`
//!
//! plus `GET /` server info and `GET /health`. Identity headers (`erptoken`,
//! `baseurl`, `userid`) are read on every tool route and forwarded downstream.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderName, Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use super::rate_limit::{RateLimiter, rate_limit};
use super::{TransportConfig, TransportError, TransportResult, config::HttpConfig};
use crate::core::server::{McpServer, PROTOCOL_VERSION};
use crate::domains::backend::{
    BASE_URL_HEADER, ERP_TOKEN_HEADER, FailureKind, IdentityHeaders, USER_ID_HEADER,
};
use crate::domains::tools::router::success_result;
use crate::domains::tools::{Arguments, ToolError, openapi_document};

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self::error_with_data(id, code, message, None)
    }

    pub fn error_with_data(
        id: Option<Value>,
        code: i32,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data,
            }),
        }
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::error(None, Self::PARSE_ERROR, msg)
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<Value>, method: &str) -> Self {
        Self::error(id, Self::METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, Self::INVALID_REQUEST, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, Self::INVALID_PARAMS, msg)
    }

    /// Internal error.
    pub fn internal_error(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, Self::INTERNAL_ERROR, msg)
    }

    /// Map a failed tool call onto JSON-RPC.
    fn from_tool_error(id: Option<Value>, err: ToolError) -> Self {
        match err {
            ToolError::NotFound(_) => Self::error(id, Self::METHOD_NOT_FOUND, err.to_string()),
            ToolError::Backend(failure) => Self::error_with_data(
                id,
                Self::INTERNAL_ERROR,
                failure.message.clone(),
                Some(json!({
                    "kind": failure.kind,
                    "httpStatus": failure.http_status,
                    "attempts": failure.attempts,
                })),
            ),
            err if err.is_validation() => Self::invalid_params(id, err.to_string()),
            err => Self::internal_error(id, err.to_string()),
        }
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    server: McpServer,
    rpc_path: String,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Create from TransportConfig (extracts HTTP config).
    pub fn from_transport_config(config: &TransportConfig) -> Option<Self> {
        match config {
            TransportConfig::Http(http_config) => Some(Self::new(http_config.clone())),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport until SIGINT/SIGTERM, then release the cache.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = build_router(server.clone(), &self.config);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!(
            "Ready - listening on {} (CORS {}, cache {})",
            addr,
            cors_status,
            server.cache_status().as_str()
        );
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → REST:     POST /tools/{{name}} ({} tools)", server.tool_names().len());
        info!("  → OpenAPI:  GET /openapi.json");
        info!("  → Health:   GET /health");

        let served = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        server.shutdown().await;
        served.map_err(|e| TransportError::http(e.to_string()))
    }
}

/// Build the router for the given server and HTTP settings.
pub fn build_router(server: McpServer, config: &HttpConfig) -> Router {
    let state = AppState {
        server,
        rpc_path: config.rpc_path.clone(),
    };
    let limiter = Arc::new(RateLimiter::new(&config.rate_limit));

    let tool_routes = Router::new()
        .route("/tools", get(handle_tools_index))
        .route("/tools/{name}", post(handle_tool_call))
        .route_layer(middleware::from_fn_with_state(limiter, rate_limit))
        .with_state(state.clone());

    let base = if config.rpc_path == "/" {
        Router::new().route("/", get(root_handler).post(handle_rpc))
    } else {
        Router::new()
            .route("/", get(root_handler))
            .route(&config.rpc_path, post(handle_rpc))
    };

    let mut app = base
        .route("/health", get(health_check))
        .route("/openapi.json", get(handle_openapi))
        .with_state(state)
        .merge(tool_routes);

    if config.enable_cors {
        app = app.layer(cors_layer());
    }
    app.layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(ERP_TOKEN_HEADER),
            HeaderName::from_static(BASE_URL_HEADER),
            HeaderName::from_static(USER_ID_HEADER),
        ])
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

fn identity_headers(headers: &HeaderMap) -> IdentityHeaders {
    IdentityHeaders::from_pairs(
        headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v))),
    )
}

/// Root handler - provides server info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "transport": "HTTP",
        "endpoints": {
            "rpc": state.rpc_path,
            "tools": "/tools",
            "toolCall": "/tools/{name}",
            "openapi": "/openapi.json",
            "health": "/health"
        }
    }))
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "protocol": PROTOCOL_VERSION,
        "cache": state.server.cache_status().as_str(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptimeSecs": state.server.uptime().as_secs(),
    }))
}

async fn handle_openapi(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let server_url = headers
        .get(header::HOST)
        .and_then(|host| host.to_str().ok())
        .map(|host| format!("http://{host}"));
    Json(openapi_document(
        state.server.invoker().registry(),
        state.server.name(),
        server_url.as_deref(),
    ))
}

async fn handle_tools_index(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "tools": state.server.tool_names() }))
}

// ============================================================================
// REST
// ============================================================================

fn rest_error(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let body = json!({
        "success": false,
        "error": { "code": code, "message": message.into() }
    });
    (status, Json(body)).into_response()
}

fn rest_status(err: &ToolError) -> StatusCode {
    match err {
        ToolError::NotFound(_) => StatusCode::NOT_FOUND,
        ToolError::MissingArgument(_) | ToolError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
        ToolError::Backend(failure) => match (failure.kind, failure.http_status) {
            (FailureKind::ClientError, Some(code)) => {
                StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::BAD_GATEWAY,
        },
        ToolError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Parse a REST body into arguments. Missing or blank bodies mean `{}`.
fn parse_arguments(body: &[u8]) -> Result<Arguments, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Arguments::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Arguments::new()),
        Ok(_) => Err("Request body must be a JSON object".to_string()),
        Err(e) => Err(format!("Invalid JSON body: {e}")),
    }
}

#[instrument(skip(state, headers, body))]
async fn handle_tool_call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !state.server.tool_exists(&name) {
        let err = ToolError::not_found(&name);
        return rest_error(StatusCode::NOT_FOUND, err.code(), err.to_string());
    }

    let arguments = match parse_arguments(&body) {
        Ok(arguments) => arguments,
        Err(message) => return rest_error(StatusCode::BAD_REQUEST, "validation_error", message),
    };

    match state
        .server
        .call_tool(&name, arguments, &identity_headers(&headers))
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => {
            warn!("REST call to {} failed: {}", name, err);
            rest_error(rest_status(&err), err.code(), err.to_string())
        }
    }
}

// ============================================================================
// JSON-RPC
// ============================================================================

/// Handle JSON-RPC requests.
#[instrument(skip_all)]
async fn handle_rpc(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let message = match serde_json::from_slice::<Value>(&body) {
        Ok(message) => message,
        Err(e) => {
            warn!("Unparsable JSON-RPC message: {}", e);
            return Json(JsonRpcResponse::parse_error(format!("Parse error: {e}"))).into_response();
        }
    };
    if !message.is_object() {
        warn!("JSON-RPC message is not an object");
        return Json(JsonRpcResponse::invalid_request(None)).into_response();
    }
    let id = message.get("id").filter(|id| !id.is_null()).cloned();
    let request = match serde_json::from_value::<JsonRpcRequest>(message) {
        Ok(request) => request,
        Err(e) => {
            warn!("Malformed JSON-RPC request: {}", e);
            return Json(JsonRpcResponse::invalid_request(id)).into_response();
        }
    };
    info!("Received JSON-RPC request: {}", request.method);

    if request.id.is_none() && request.method.starts_with("notifications/") {
        handle_notification(&request);
        return StatusCode::ACCEPTED.into_response();
    }

    let response = process_request(&state, request, &identity_headers(&headers)).await;
    (StatusCode::OK, Json(response)).into_response()
}

/// Process a JSON-RPC request and return the response.
async fn process_request(
    state: &AppState,
    request: JsonRpcRequest,
    headers: &IdentityHeaders,
) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(state, request),
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        "tools/list" => handle_tools_list(state, request),
        "tools/call" => handle_tools_call(state, request, headers).await,
        method if method.starts_with("notifications/") => {
            handle_notification(&request);
            JsonRpcResponse::success(request.id, Value::Null)
        }
        method => {
            warn!("Unknown method: {}", method);
            JsonRpcResponse::method_not_found(request.id, method)
        }
    }
}

fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing initialize request");

    let result = json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": state.server.name(),
            "version": state.server.version()
        },
        "instructions": state.server.instructions()
    });

    JsonRpcResponse::success(request.id, result)
}

fn handle_tools_list(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    JsonRpcResponse::success(request.id, json!({ "tools": state.server.list_tools() }))
}

async fn handle_tools_call(
    state: &AppState,
    request: JsonRpcRequest,
    headers: &IdentityHeaders,
) -> JsonRpcResponse {
    let Some(params) = request.params else {
        return JsonRpcResponse::invalid_params(request.id, "Missing params");
    };

    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::invalid_params(request.id, "Missing tool name");
    };

    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => Arguments::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return JsonRpcResponse::invalid_params(request.id, "Tool arguments must be an object");
        }
    };

    match state.server.call_tool(name, arguments, headers).await {
        Ok(value) => match serde_json::to_value(success_result(value)) {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
        },
        Err(err) => {
            warn!("tools/call {} failed: {}", name, err);
            JsonRpcResponse::from_tool_error(request.id, err)
        }
    }
}

fn handle_notification(request: &JsonRpcRequest) {
    match request.method.as_str() {
        "notifications/initialized" => info!("Client sent initialized notification"),
        method => info!("Received notification: {}", method),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::core::transport::RateLimitConfig;
    use crate::domains::backend::{RequestExecutor, RetryPolicy};
    use crate::domains::cache::CacheStore;
    use crate::domains::tools::{ToolInvoker, ToolRegistry};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_server(base_url: &str) -> McpServer {
        let mut config = Config::default();
        config.backend.default_base_url = base_url.to_string();
        let executor = RequestExecutor::new(
            reqwest::Client::new(),
            Arc::new(CacheStore::disabled()),
            RetryPolicy {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
                retry_non_idempotent: true,
            },
            300,
        );
        McpServer::with_invoker(config, ToolInvoker::new(ToolRegistry::new(), executor))
    }

    fn app(base_url: &str) -> Router {
        build_router(test_server(base_url), &HttpConfig::default())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_info() {
        let response = app("http://127.0.0.1:1")
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(body["endpoints"]["rpc"], "/");
    }

    #[tokio::test]
    async fn test_health() {
        let response = app("http://127.0.0.1:1")
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = read_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["protocol"], PROTOCOL_VERSION);
        assert_eq!(body["cache"], "disabled");
        assert!(body["uptimeSecs"].is_u64());
    }

    #[tokio::test]
    async fn test_tools_index_and_openapi() {
        let app = app("http://127.0.0.1:1");
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["tools"].as_array().unwrap().len(), 22);

        let response = app
            .oneshot(Request::builder().uri("/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["openapi"], "3.1.0");
        assert!(body["paths"]["/tools/check_lead_by_mobile"].is_object());
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = app("http://127.0.0.1:1")
            .oneshot(post_json(
                "/",
                json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            ))
            .await
            .unwrap();

        let body = read_json(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(body["result"]["capabilities"], json!({"tools": {}}));
    }

    #[tokio::test]
    async fn test_tools_list_in_registry_order() {
        let response = app("http://127.0.0.1:1")
            .oneshot(post_json("/", json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})))
            .await
            .unwrap();

        let body = read_json(response).await;
        let tools = body["result"]["tools"].as_array().unwrap();
        let names: Vec<_> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, ToolRegistry::new().tool_names());
        assert!(tools[0]["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn test_notification_without_id_is_accepted() {
        let response = app("http://127.0.0.1:1")
            .oneshot(post_json(
                "/",
                json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_rpc_error_codes() {
        let app = app("http://127.0.0.1:1");

        let body = read_json(
            app.clone()
                .oneshot(post_json("/", json!({"jsonrpc": "1.0", "id": 1, "method": "tools/list"})))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(body["error"]["code"], -32600);

        let body = read_json(
            app.clone()
                .oneshot(post_json("/", json!({"jsonrpc": "2.0", "id": 2, "method": "nope"})))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(body["error"]["code"], -32601);

        let body = read_json(
            app.clone()
                .oneshot(post_json(
                    "/",
                    json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
                           "params": {"name": "x", "arguments": {}}}),
                ))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(body["error"]["code"], -32601);
        assert_eq!(body["error"]["message"], "Tool not found: x");

        let body = read_json(
            app.oneshot(post_json(
                "/",
                json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
                       "params": {"name": "create_lead", "arguments": {"fullName": "Asha"}}}),
            ))
            .await
            .unwrap(),
        )
        .await;
        assert_eq!(body["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_rpc_parse_vs_invalid_request() {
        let app = app("http://127.0.0.1:1");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["error"]["code"], -32700);

        let body = read_json(
            app.clone()
                .oneshot(post_json("/", json!({"jsonrpc": "2.0", "id": 5})))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(body["error"]["code"], -32600);
        assert_eq!(body["id"], 5);

        let body = read_json(
            app.oneshot(post_json(
                "/",
                json!([{"jsonrpc": "2.0", "id": 1, "method": "tools/list"}]),
            ))
            .await
            .unwrap(),
        )
        .await;
        assert_eq!(body["error"]["code"], -32600);
        assert!(body["id"].is_null());
    }

    #[tokio::test]
    async fn test_rpc_tools_call_success_forwards_identity() {
        let mut backend = mockito::Server::new_async().await;
        let mock = backend
            .mock("GET", "/api/v1/indents/generate-number")
            .match_header("authorization", "Bearer rpc-token")
            .with_status(200)
            .with_body(r#"{"data":"IND-9"}"#)
            .expect(1)
            .create_async()
            .await;

        let mut request = post_json(
            "/",
            json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call",
                   "params": {"name": "generateIndentNumber"}}),
        );
        request
            .headers_mut()
            .insert("erptoken", "rpc-token".parse().unwrap());

        let body = read_json(app(&backend.url()).oneshot(request).await.unwrap()).await;

        mock.assert_async().await;
        let result = &body["result"];
        assert_eq!(result["isError"], false);
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["structuredContent"]["indentNumber"], "IND-9");
    }

    #[tokio::test]
    async fn test_rpc_backend_failure_carries_data() {
        let mut backend = mockito::Server::new_async().await;
        let _mock = backend
            .mock("GET", "/api/v1/units")
            .with_status(503)
            .with_body(r#"{"message":"down for maintenance"}"#)
            .expect(2)
            .create_async()
            .await;

        let body = read_json(
            app(&backend.url())
                .oneshot(post_json(
                    "/",
                    json!({"jsonrpc": "2.0", "id": 8, "method": "tools/call",
                           "params": {"name": "listUnits", "arguments": {}}}),
                ))
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(body["error"]["code"], -32603);
        assert_eq!(body["error"]["message"], "Failed after 2 attempts: down for maintenance");
        assert_eq!(body["error"]["data"]["kind"], "ServerError");
        assert_eq!(body["error"]["data"]["httpStatus"], 503);
        assert_eq!(body["error"]["data"]["attempts"], 2);
    }

    #[tokio::test]
    async fn test_rest_status_mapping() {
        let mut backend = mockito::Server::new_async().await;
        let _conflict = backend
            .mock("POST", "/api/v1/sales/leads")
            .with_status(409)
            .with_body(r#"{"message":"Lead already exists"}"#)
            .create_async()
            .await;
        let app = app(&backend.url());

        let response = app
            .clone()
            .oneshot(post_json("/tools/nope", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = read_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "tool_not_found");

        let response = app
            .clone()
            .oneshot(post_json("/tools/create_lead", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(post_json(
                "/tools/create_lead",
                json!({"fullName": "Asha", "mobile": "9800000000"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = read_json(response).await;
        assert_eq!(body["error"]["code"], "client_error");
        assert_eq!(body["error"]["message"], "Failed after 1 attempts: Lead already exists");
    }

    #[tokio::test]
    async fn test_rest_network_error_is_bad_gateway() {
        let response = app("http://127.0.0.1:1")
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tools/listUnits")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = read_json(response).await;
        assert_eq!(body["error"]["code"], "network_error");
    }

    #[tokio::test]
    async fn test_rest_rate_limit() {
        let config = HttpConfig {
            rate_limit: RateLimitConfig {
                enabled: true,
                window_ms: 60_000,
                max_requests: 2,
            },
            ..HttpConfig::default()
        };
        let app = build_router(test_server("http://127.0.0.1:1"), &config);

        let tools_request = || {
            Request::builder()
                .uri("/tools")
                .header("x-forwarded-for", "198.51.100.4")
                .body(Body::empty())
                .unwrap()
        };

        for _ in 0..2 {
            let response = app.clone().oneshot(tools_request()).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app.clone().oneshot(tools_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        // Health is not limited.
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_parse_arguments() {
        assert!(parse_arguments(b"").unwrap().is_empty());
        assert!(parse_arguments(b"  \n").unwrap().is_empty());
        assert!(parse_arguments(b"null").unwrap().is_empty());
        assert_eq!(parse_arguments(br#"{"a":1}"#).unwrap()["a"], 1);
        assert!(parse_arguments(b"[1]").is_err());
        assert!(parse_arguments(b"{oops").is_err());
    }

    #[test]
    fn test_identity_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("erptoken", "t".parse().unwrap());
        headers.insert("userid", "7".parse().unwrap());
        headers.insert("x-other", "ignored".parse().unwrap());

        let identity = identity_headers(&headers);
        assert_eq!(identity.erp_token.as_deref(), Some("t"));
        assert_eq!(identity.user_id.as_deref(), Some("7"));
        assert!(identity.base_url.is_none());
    }
}
