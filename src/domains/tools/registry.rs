//! Tool Registry - descriptor table for every tool.
//!
//! A tool is data, not code: its argument fields, the backend call it maps
//! to, and a function that reshapes the backend envelope. The registry is
//! built once at startup and looked up by name. Both transports and the
//! OpenAPI document read tool metadata from here.

use std::collections::HashMap;
use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use serde_json::{Map, Value, json};

use super::definitions;
use super::error::ToolError;
use super::validation::{is_missing, value_as_text};
use crate::domains::backend::HttpMethod;

/// Tool arguments as received from the caller.
pub type Arguments = Map<String, Value>;

/// Reshape a raw backend payload into the tool's result.
pub type ShapeFn = fn(&Value, &Arguments) -> Value;

/// JSON type of an argument, used for schemas only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    Array,
    Object,
}

impl FieldKind {
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// One declared argument of a tool.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
    pub required: bool,
    /// Empty when any value is accepted.
    pub allowed_values: &'static [&'static str],
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
            allowed_values: &[],
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
            allowed_values: &[],
        }
    }

    /// Restrict the field to a fixed set of values.
    pub const fn one_of(self, values: &'static [&'static str]) -> Self {
        Self {
            allowed_values: values,
            ..self
        }
    }

    fn schema(&self) -> Value {
        let mut schema = json!({
            "type": self.kind.json_type(),
            "description": self.description,
        });
        if !self.allowed_values.is_empty() {
            schema["enum"] = json!(self.allowed_values);
        }
        schema
    }
}

/// A query-string parameter taken from the arguments.
#[derive(Debug, Clone, Copy)]
pub struct QueryParam {
    pub name: &'static str,
    /// Used when the argument is missing; `None` leaves the parameter out.
    pub default: Option<&'static str>,
}

impl QueryParam {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            default: None,
        }
    }

    pub const fn with_default(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            default: Some(default),
        }
    }
}

/// What to send as the request body.
#[derive(Debug, Clone, Copy)]
pub enum BodyPolicy {
    /// No body.
    None,
    /// All arguments, unchanged.
    Arguments,
    /// An empty object.
    Empty,
    /// Only the named arguments that are present.
    Select(&'static [&'static str]),
    /// Only the named arguments that are strings.
    StringFields(&'static [&'static str]),
}

impl BodyPolicy {
    pub fn build(&self, args: &Arguments) -> Option<Value> {
        match self {
            Self::None => None,
            Self::Arguments => Some(Value::Object(args.clone())),
            Self::Empty => Some(Value::Object(Map::new())),
            Self::Select(names) => Some(pick(args, names, |v| !v.is_null())),
            Self::StringFields(names) => Some(pick(args, names, Value::is_string)),
        }
    }
}

fn pick(args: &Arguments, names: &[&str], keep: impl Fn(&Value) -> bool) -> Value {
    let picked = names
        .iter()
        .filter_map(|name| {
            args.get(*name)
                .filter(|&value| keep(value))
                .map(|value| (name.to_string(), value.clone()))
        })
        .collect::<Map<_, _>>();
    Value::Object(picked)
}

/// A single backend request and how to interpret its answer.
#[derive(Debug, Clone, Copy)]
pub struct BackendCall {
    pub method: HttpMethod,
    /// Path with `{field}` placeholders filled from the arguments.
    pub path: &'static str,
    pub query: &'static [QueryParam],
    pub body: BodyPolicy,
    pub shape: ShapeFn,
    /// Result to return instead of an error when the backend answers 404.
    pub on_not_found: Option<fn(&Arguments) -> Value>,
}

impl BackendCall {
    /// Render the endpoint (path plus query string) for these arguments.
    pub fn endpoint(&self, args: &Arguments) -> Result<String, ToolError> {
        let mut endpoint = render_path(self.path, args)?;

        let pairs: Vec<(&str, String)> = self
            .query
            .iter()
            .filter_map(|param| {
                let value = args.get(param.name);
                if is_missing(value) {
                    param.default.map(|d| (param.name, d.to_string()))
                } else {
                    value.and_then(value_as_text).map(|v| (param.name, v))
                }
            })
            .collect();

        if !pairs.is_empty() {
            let query = serde_urlencoded::to_string(&pairs)
                .map_err(|e| ToolError::internal(format!("Failed to encode query: {}", e)))?;
            endpoint.push('?');
            endpoint.push_str(&query);
        }

        Ok(endpoint)
    }
}

fn render_path(template: &str, args: &Arguments) -> Result<String, ToolError> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        let value = args
            .get(name)
            .filter(|v| !is_missing(Some(*v)))
            .and_then(value_as_text)
            .ok_or_else(|| ToolError::missing_argument(name))?;

        rendered.push_str(&rest[..start]);
        rendered.push_str(&urlencoding::encode(&value));
        rest = &rest[start + len + 1..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}

/// Outcome of a delegating tool.
#[derive(Debug, Clone, PartialEq)]
pub enum Delegation {
    /// Run another (backend) tool with these arguments.
    Forward {
        tool: &'static str,
        arguments: Arguments,
    },
    /// Nothing to call; return this result.
    Done(Value),
}

#[derive(Debug, Clone, Copy)]
pub enum Dispatch {
    Backend(BackendCall),
    Delegate(fn(&Arguments) -> Delegation),
}

/// Everything known about one tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldSpec],
    pub dispatch: Dispatch,
}

impl ToolDescriptor {
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect()
    }

    pub fn enum_constraints(&self) -> Vec<(&'static str, &'static [&'static str])> {
        self.fields
            .iter()
            .filter(|f| !f.allowed_values.is_empty())
            .map(|f| (f.name, f.allowed_values))
            .collect()
    }

    /// JSON Schema of the arguments object.
    pub fn input_schema(&self) -> JsonObject {
        let properties = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.schema()))
            .collect::<Map<_, _>>();

        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        let required = self.required_fields();
        if !required.is_empty() {
            schema.insert("required".to_string(), json!(required));
        }
        schema
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.into(),
            description: Some(self.description.into()),
            input_schema: Arc::new(self.input_schema()),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - every available tool, in catalog order.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Registry of the full tool catalog.
    pub fn new() -> Self {
        Self::from_descriptors(definitions::all())
    }

    pub fn from_descriptors(tools: Vec<ToolDescriptor>) -> Self {
        let index = tools
            .iter()
            .enumerate()
            .map(|(i, tool)| (tool.name, i))
            .collect();
        Self { tools, index }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get all tool names, in catalog order.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all tools as Tool models (metadata).
    pub fn to_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolDescriptor::to_tool).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
