//! OpenAPI 3.1 description of the REST surface, generated from the registry.

use serde_json::{Map, Value, json};

use super::registry::{ToolDescriptor, ToolRegistry};

/// camelCase operation id for a tool name (`get_events` -> `getEvents`).
fn operation_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            id.extend(c.to_uppercase());
            upper = false;
        } else {
            id.push(c);
        }
    }
    id
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {"$ref": "#/components/schemas/ErrorResponse"}
            }
        }
    })
}

fn tool_path(tool: &ToolDescriptor) -> Value {
    json!({
        "post": {
            "summary": tool.description,
            "operationId": operation_id(tool.name),
            "requestBody": {
                "required": !tool.required_fields().is_empty(),
                "content": {
                    "application/json": {
                        "schema": Value::Object(tool.input_schema())
                    }
                }
            },
            "responses": {
                "200": {
                    "description": "Normalized tool result",
                    "content": {
                        "application/json": {
                            "schema": {"$ref": "#/components/schemas/ToolResult"}
                        }
                    }
                },
                "400": error_response("Missing or invalid arguments"),
                "404": error_response("Unknown tool"),
                "429": error_response("Rate limit exceeded"),
                "502": error_response("Backend unavailable or failing"),
            }
        }
    })
}

/// Build the document. `server_url` is advertised when known.
pub fn openapi_document(registry: &ToolRegistry, title: &str, server_url: Option<&str>) -> Value {
    let mut paths = Map::new();
    paths.insert(
        "/health".to_string(),
        json!({
            "get": {
                "summary": "Health check",
                "operationId": "healthCheck",
                "responses": {"200": {"description": "Server is healthy"}}
            }
        }),
    );
    paths.insert(
        "/tools".to_string(),
        json!({
            "get": {
                "summary": "List tool names",
                "operationId": "listTools",
                "responses": {"200": {"description": "Tool names in catalog order"}}
            }
        }),
    );
    for tool in registry.iter() {
        paths.insert(format!("/tools/{}", tool.name), tool_path(tool));
    }

    let mut document = json!({
        "openapi": "3.1.0",
        "info": {
            "title": title,
            "description": "REST access to ERP sales, indent and project-node tools",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": paths,
        "components": {
            "schemas": {
                "ToolResult": {
                    "type": "object",
                    "required": ["success"],
                    "properties": {
                        "success": {"type": "boolean"},
                        "message": {"type": "string"}
                    }
                },
                "ErrorResponse": {
                    "type": "object",
                    "properties": {
                        "success": {"type": "boolean", "const": false},
                        "error": {
                            "type": "object",
                            "properties": {
                                "code": {"type": "string"},
                                "message": {"type": "string"}
                            }
                        }
                    }
                }
            },
            "securitySchemes": {
                "ErpToken": {"type": "apiKey", "in": "header", "name": "erptoken"}
            }
        }
    });

    if let Some(url) = server_url {
        document["servers"] = json!([{"url": url}]);
    }
    document
}
