//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Used by the stdio transport, where there are no per-request headers: every
//! call runs with the identity built from configured defaults.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
    model::{CallToolResult, Content},
};
use serde_json::{Value, json};
use tracing::warn;

use super::error::ToolError;
use super::invoker::{ToolInvocation, ToolInvoker};
use super::registry::ToolDescriptor;
use crate::domains::backend::BackendIdentity;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(invoker: Arc<ToolInvoker>, identity: BackendIdentity) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    invoker
        .registry()
        .iter()
        .fold(ToolRouter::new(), |router, tool| {
            router.with_route(create_route(tool, invoker.clone(), identity.clone()))
        })
}

fn create_route<S>(
    tool: &ToolDescriptor,
    invoker: Arc<ToolInvoker>,
    identity: BackendIdentity,
) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
{
    let name = tool.name;
    ToolRoute::new_dyn(tool.to_tool(), move |ctx: ToolCallContext<'_, S>| {
        let arguments = ctx.arguments.clone().unwrap_or_default();
        let invocation = ToolInvocation::new(name, arguments, identity.clone());
        let invoker = invoker.clone();
        async move { into_call_result(invoker.invoke(&invocation).await) }.boxed()
    })
}

/// Text content is the pretty-printed result; the same value is attached
/// as structured content.
pub fn success_result(value: Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content: Some(value),
        is_error: Some(false),
        meta: None,
    }
}

/// Map an invocation outcome onto MCP.
///
/// Backend failures are tool results with `isError`, so the model sees the
/// message. Caller mistakes are protocol errors.
pub fn into_call_result(result: Result<Value, ToolError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => Ok(success_result(value)),
        Err(ToolError::Backend(failure)) => {
            warn!("Tool call failed: {}", failure);
            let mut result = CallToolResult::error(vec![Content::text(failure.message.clone())]);
            result.structured_content = Some(json!({
                "success": false,
                "error": failure,
            }));
            Ok(result)
        }
        Err(err) if err.is_validation() => Err(McpError::invalid_params(err.to_string(), None)),
        Err(err @ ToolError::NotFound(_)) => Err(McpError::invalid_params(err.to_string(), None)),
        Err(err) => Err(McpError::internal_error(err.to_string(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::backend::{Failure, FailureKind, RequestExecutor, RetryPolicy};
    use crate::domains::cache::CacheStore;
    use crate::domains::tools::ToolRegistry;
    use rmcp::model::{ErrorCode, RawContent};

    struct TestServer {}

    fn invoker() -> Arc<ToolInvoker> {
        let executor = RequestExecutor::new(
            reqwest::Client::new(),
            Arc::new(CacheStore::disabled()),
            RetryPolicy::default(),
            300,
        );
        Arc::new(ToolInvoker::new(ToolRegistry::new(), executor))
    }

    #[test]
    fn test_build_router() {
        let identity = BackendIdentity::new("http://127.0.0.1:1", None, None);
        let router: ToolRouter<TestServer> = build_tool_router(invoker(), identity);
        let tools = router.list_all();
        assert_eq!(tools.len(), 22);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"check_lead_by_mobile"));
        assert!(names.contains(&"searchNodesArray"));
        assert!(names.contains(&"finalizeAfterUpload"));
    }

    #[test]
    fn test_registry_matches_router() {
        let invoker = invoker();
        let registry_names = invoker.list_tool_names();

        let identity = BackendIdentity::new("http://127.0.0.1:1", None, None);
        let router: ToolRouter<TestServer> = build_tool_router(invoker.clone(), identity);
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in registry_names {
            assert!(router_names.contains(&name));
        }
    }

    #[test]
    fn test_success_result() {
        let result = into_call_result(Ok(json!({"success": true}))).unwrap();
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.structured_content, Some(json!({"success": true})));

        let text = match &result.content[0].raw {
            RawContent::Text(text) => &text.text,
            _ => panic!("Expected text content"),
        };
        assert!(text.contains("\"success\": true"));
    }

    #[test]
    fn test_backend_failure_is_tool_error() {
        let result = into_call_result(Err(ToolError::Backend(Failure {
            kind: FailureKind::NetworkError,
            http_status: None,
            message: "Failed after 3 attempts: connection refused".to_string(),
            attempts: 3,
        })))
        .unwrap();

        assert_eq!(result.is_error, Some(true));
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["error"]["kind"], "NetworkError");
        assert_eq!(structured["error"]["attempts"], 3);
    }

    #[test]
    fn test_validation_is_invalid_params() {
        let err = into_call_result(Err(ToolError::missing_argument("nodeId"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "'nodeId' is required");
    }
}
