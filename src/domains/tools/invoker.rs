//! Tool Invoker - runs one tool invocation end to end.
//!
//! Looks the tool up, validates the arguments, renders the backend call,
//! hands it to the [`RequestExecutor`] and reshapes the payload.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::error::ToolError;
use super::registry::{Arguments, BackendCall, Delegation, Dispatch, ToolRegistry};
use super::validation::validate;
use crate::domains::backend::{BackendIdentity, RequestExecutor};

/// One tool call as submitted by a front end.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub arguments: Arguments,
    pub identity: BackendIdentity,
}

impl ToolInvocation {
    pub fn new(tool_name: impl Into<String>, arguments: Arguments, identity: BackendIdentity) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            identity,
        }
    }
}

pub struct ToolInvoker {
    registry: ToolRegistry,
    executor: RequestExecutor,
}

impl ToolInvoker {
    pub fn new(registry: ToolRegistry, executor: RequestExecutor) -> Self {
        Self { registry, executor }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn list_tool_names(&self) -> Vec<&'static str> {
        self.registry.tool_names()
    }

    pub fn tool_exists(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Run the invocation and return the normalized result.
    #[instrument(skip_all, fields(tool = %invocation.tool_name))]
    pub async fn invoke(&self, invocation: &ToolInvocation) -> Result<Value, ToolError> {
        let descriptor = self.registry.get(&invocation.tool_name).ok_or_else(|| {
            warn!("Unknown tool requested: {}", invocation.tool_name);
            ToolError::not_found(&invocation.tool_name)
        })?;

        validate(descriptor.fields, &invocation.arguments)?;

        match descriptor.dispatch {
            Dispatch::Backend(call) => {
                self.call_backend(&call, &invocation.arguments, &invocation.identity)
                    .await
            }
            Dispatch::Delegate(choose) => match choose(&invocation.arguments) {
                Delegation::Done(result) => {
                    debug!("{} had nothing to delegate", descriptor.name);
                    Ok(result)
                }
                Delegation::Forward { tool, arguments } => {
                    info!("{} delegating to {}", descriptor.name, tool);
                    self.forward(tool, &arguments, &invocation.identity).await
                }
            },
        }
    }

    /// Run a delegated tool. Delegation is one level deep.
    async fn forward(
        &self,
        tool: &str,
        arguments: &Arguments,
        identity: &BackendIdentity,
    ) -> Result<Value, ToolError> {
        let target = self
            .registry
            .get(tool)
            .ok_or_else(|| ToolError::internal(format!("Delegation target missing: {}", tool)))?;

        validate(target.fields, arguments)?;

        match target.dispatch {
            Dispatch::Backend(call) => self.call_backend(&call, arguments, identity).await,
            Dispatch::Delegate(_) => Err(ToolError::internal(format!(
                "Delegation target {} delegates again",
                tool
            ))),
        }
    }

    async fn call_backend(
        &self,
        call: &BackendCall,
        arguments: &Arguments,
        identity: &BackendIdentity,
    ) -> Result<Value, ToolError> {
        let endpoint = call.endpoint(arguments)?;
        let body = call.body.build(arguments);

        let result = self
            .executor
            .execute(call.method, &endpoint, body.as_ref(), identity)
            .await;

        match result.into_payload() {
            Ok(payload) => Ok((call.shape)(&payload, arguments)),
            Err(failure) => match call.on_not_found {
                Some(not_found) if failure.is_not_found() => {
                    info!("Backend reported 404, treating as not found");
                    Ok(not_found(arguments))
                }
                _ => Err(ToolError::Backend(failure)),
            },
        }
    }
}
