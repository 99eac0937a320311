//! Tools domain module.
//!
//! Tools are named operations that MCP and REST clients call. Each one maps
//! to exactly one ERP backend request.
//!
//! ## Architecture
//!
//! - `definitions/` - Tool descriptors grouped by business area
//! - `registry.rs` - Descriptor types and the name-indexed registry
//! - `validation.rs` - Required and enum argument checks
//! - `invoker.rs` - Runs an invocation through the request executor
//! - `router.rs` - rmcp ToolRouter for the stdio transport
//! - `openapi.rs` - OpenAPI document for the REST surface
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Add a `ToolDescriptor` const to the matching file in `definitions/`
//! 2. List it in `definitions::all()`
//!
//! No transport code changes: routes, schemas and OpenAPI entries are all
//! derived from the registry.

pub mod definitions;
mod error;
pub mod invoker;
pub mod openapi;
pub mod registry;
pub mod router;
mod validation;

pub use error::ToolError;
pub use invoker::{ToolInvocation, ToolInvoker};
pub use openapi::openapi_document;
pub use registry::{Arguments, ToolDescriptor, ToolRegistry};
pub use router::build_tool_router;
