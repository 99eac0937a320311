//! Project node tools: search, status and detail updates, creation.
//!
//! `finalizeAfterUpload` is a delegating tool. It calls no endpoint of its
//! own but picks `updateNodeStatus` or `updateNode` from the `update`
//! object it receives.

use serde_json::{Value, json};

use super::common::{data, or_default, or_null, parse_embedded_json, record, success};
use crate::domains::backend::HttpMethod;
use crate::domains::tools::registry::{
    Arguments, BackendCall, BodyPolicy, Delegation, Dispatch, FieldKind, FieldSpec, QueryParam,
    ToolDescriptor,
};
use crate::domains::tools::validation::is_truthy;

/// Workflow states accepted by the node status endpoints.
pub const NODE_STATUSES: &[&str] = &["Not Started", "In Progress", "Blocked", "Completed", "On Hold"];

const NODE_ID: FieldSpec = FieldSpec::required("nodeId", FieldKind::String, "Node ID (recCode)");

// ============================================================================
// searchNodesArray
// ============================================================================

const SEARCH_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("keywords", FieldKind::String, "Search keywords"),
    FieldSpec::optional("page", FieldKind::Integer, "Page number (default: 0)"),
    FieldSpec::optional("size", FieldKind::Integer, "Page size (default: 50)"),
    FieldSpec::optional("sort", FieldKind::String, "Sort order (default: insertDate,ASC)"),
    FieldSpec::optional("includePaths", FieldKind::Boolean, "Include tree paths (default: true)"),
    FieldSpec::optional(
        "includeStakeholders",
        FieldKind::Boolean,
        "Include stakeholders (default: true)",
    ),
];

const SEARCH_QUERY: &[QueryParam] = &[
    QueryParam::new("keywords"),
    QueryParam::with_default("page", "0"),
    QueryParam::with_default("size", "50"),
    QueryParam::with_default("sort", "insertDate,ASC"),
    QueryParam::with_default("includePaths", "true"),
    QueryParam::with_default("includeStakeholders", "true"),
];

fn node_option(node: &Value) -> Value {
    json!({
        "nodeId": node["recCode"],
        "nodeName": node["nodeName"],
        "nodeTypeName": node["nodeTypeName"],
        "treeLevel": node["treeLevel"],
        "treePath": parse_embedded_json(&node["treePath"]),
        "status": node["status"],
        "parentNodeId": or_null(&node["parentNodeId"]),
        "rootNodeId": or_null(&node["rootNodeId"]),
    })
}

fn node_options(payload: &Value, _: &Arguments) -> Value {
    let data = data(payload);
    let options: Vec<Value> = data["content"]
        .as_array()
        .map(|nodes| nodes.iter().map(node_option).collect())
        .unwrap_or_default();
    let count = json!(options.len());

    success(
        [
            ("total", or_default(&data["totalElements"], count.clone())),
            ("page", or_default(&data["pageable"]["pageNumber"], json!(0))),
            ("size", or_default(&data["pageable"]["pageSize"], count)),
            ("options", Value::Array(options)),
        ],
        "Nodes searched successfully",
    )
}

pub const SEARCH_NODES_ARRAY: ToolDescriptor = ToolDescriptor {
    name: "searchNodesArray",
    description: "Search project nodes by keywords and return them as selectable options",
    fields: SEARCH_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Get,
        path: "/api/v1/projects/nodes/search/searchNodesArray",
        query: SEARCH_QUERY,
        body: BodyPolicy::None,
        shape: node_options,
        on_not_found: None,
    }),
};

// ============================================================================
// updateNodeStatus / updateNode
// ============================================================================

const UPDATE_STATUS_FIELDS: &[FieldSpec] = &[
    NODE_ID,
    FieldSpec::required("status", FieldKind::String, "New status").one_of(NODE_STATUSES),
];

fn status_updated(payload: &Value, _: &Arguments) -> Value {
    success(
        [("updated", json!(true)), ("node", data(payload).clone())],
        "Node status updated successfully",
    )
}

pub const UPDATE_NODE_STATUS: ToolDescriptor = ToolDescriptor {
    name: "updateNodeStatus",
    description: "Update only the status of a project node",
    fields: UPDATE_STATUS_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Put,
        path: "/api/v1/projects/nodes/{nodeId}/status",
        query: &[],
        body: BodyPolicy::Select(&["status"]),
        shape: status_updated,
        on_not_found: None,
    }),
};

const UPDATE_NODE_FIELDS: &[FieldSpec] = &[
    NODE_ID,
    FieldSpec::optional("status", FieldKind::String, "New status").one_of(NODE_STATUSES),
    FieldSpec::optional("nodeDescription", FieldKind::String, "New description"),
    FieldSpec::optional("parentNodeId", FieldKind::String, "New parent node ID"),
];

fn node_updated(payload: &Value, _: &Arguments) -> Value {
    success(
        [("updated", json!(true)), ("node", data(payload).clone())],
        "Node updated successfully",
    )
}

pub const UPDATE_NODE: ToolDescriptor = ToolDescriptor {
    name: "updateNode",
    description: "Update a project node's status, description or parent",
    fields: UPDATE_NODE_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Put,
        path: "/api/v1/projects/nodes/{nodeId}",
        query: &[],
        body: BodyPolicy::StringFields(&["status", "nodeDescription", "parentNodeId"]),
        shape: node_updated,
        on_not_found: None,
    }),
};

// ============================================================================
// finalizeAfterUpload
// ============================================================================

const FINALIZE_FIELDS: &[FieldSpec] = &[
    NODE_ID,
    FieldSpec::optional(
        "update",
        FieldKind::Object,
        "Changes to apply: status, nodeDescription, parentNodeId",
    ),
];

fn finalize_after_upload(args: &Arguments) -> Delegation {
    let empty = Value::Object(Arguments::new());
    let update = args.get("update").filter(|u| u.is_object()).unwrap_or(&empty);
    let node_id = args.get("nodeId").cloned().unwrap_or(Value::Null);

    let status = update.get("status");
    let description = update.get("nodeDescription");
    let parent = update.get("parentNodeId");

    if is_truthy(status) && !is_truthy(description) && parent.is_none() {
        let mut arguments = Arguments::new();
        arguments.insert("nodeId".to_string(), node_id);
        arguments.extend(status.map(|s| ("status".to_string(), s.clone())));
        return Delegation::Forward {
            tool: UPDATE_NODE_STATUS.name,
            arguments,
        };
    }

    if is_truthy(status)
        || description.is_some_and(Value::is_string)
        || parent.is_some_and(Value::is_string)
    {
        let mut arguments = Arguments::new();
        arguments.insert("nodeId".to_string(), node_id);
        for (key, value) in [
            ("status", status),
            ("nodeDescription", description),
            ("parentNodeId", parent),
        ] {
            if let Some(value) = value {
                arguments.insert(key.to_string(), value.clone());
            }
        }
        return Delegation::Forward {
            tool: UPDATE_NODE.name,
            arguments,
        };
    }

    Delegation::Done(success([], "Nothing to update after upload."))
}

pub const FINALIZE_AFTER_UPLOAD: ToolDescriptor = ToolDescriptor {
    name: "finalizeAfterUpload",
    description: "Apply status or detail changes to a node after a media upload",
    fields: FINALIZE_FIELDS,
    dispatch: Dispatch::Delegate(finalize_after_upload),
};

// ============================================================================
// createNode
// ============================================================================

const CREATE_NODE_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("nodeName", FieldKind::String, "Node name"),
    FieldSpec::optional("nodeTypeId", FieldKind::String, "Node type ID"),
    FieldSpec::optional("parentNodeId", FieldKind::String, "Parent node ID"),
    FieldSpec::optional("rootNodeId", FieldKind::String, "Root node ID"),
    FieldSpec::optional("nodeDescription", FieldKind::String, "Description"),
];

fn node_created(payload: &Value, _: &Arguments) -> Value {
    record(payload, "node", "Node created successfully")
}

pub const CREATE_NODE: ToolDescriptor = ToolDescriptor {
    name: "createNode",
    description: "Create a project node",
    fields: CREATE_NODE_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Post,
        path: "/api/v1/projects/nodes",
        query: &[],
        body: BodyPolicy::Arguments,
        shape: node_created,
        on_not_found: None,
    }),
};

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_node_options_shape() {
        let payload = json!({
            "data": {
                "content": [{
                    "recCode": "N1",
                    "nodeName": "Foundation",
                    "nodeTypeName": "Task",
                    "treeLevel": 2,
                    "treePath": "[\"Site\",\"Foundation\"]",
                    "status": "In Progress",
                    "parentNodeId": "",
                    "rootNodeId": "R1",
                }],
                "totalElements": 7,
                "pageable": {"pageNumber": 1, "pageSize": 50},
            }
        });
        let shaped = node_options(&payload, &Arguments::new());

        assert_eq!(shaped["total"], 7);
        assert_eq!(shaped["page"], 1);
        assert_eq!(shaped["size"], 50);
        let option = &shaped["options"][0];
        assert_eq!(option["nodeId"], "N1");
        assert_eq!(option["treePath"], json!(["Site", "Foundation"]));
        assert_eq!(option["parentNodeId"], Value::Null);
        assert_eq!(option["rootNodeId"], "R1");
    }

    #[test]
    fn test_node_options_fallbacks() {
        let payload = json!({"data": {"content": [{"recCode": "N1", "treePath": "{broken"}]}});
        let shaped = node_options(&payload, &Arguments::new());

        assert_eq!(shaped["total"], 1);
        assert_eq!(shaped["page"], 0);
        assert_eq!(shaped["size"], 1);
        assert_eq!(shaped["options"][0]["treePath"], json!([]));

        let empty = node_options(&json!({"data": null}), &Arguments::new());
        assert_eq!(empty["options"], json!([]));
        assert_eq!(empty["total"], 0);
    }

    #[test]
    fn test_search_query() {
        let Dispatch::Backend(call) = SEARCH_NODES_ARRAY.dispatch else {
            panic!("searchNodesArray calls the backend");
        };
        let endpoint = call.endpoint(&args(json!({"keywords": "slab pour"}))).unwrap();
        assert_eq!(
            endpoint,
            "/api/v1/projects/nodes/search/searchNodesArray?keywords=slab+pour&page=0&size=50\
             &sort=insertDate%2CASC&includePaths=true&includeStakeholders=true"
        );

        let endpoint = call
            .endpoint(&args(json!({"keywords": "x", "includePaths": false, "size": 10})))
            .unwrap();
        assert!(endpoint.contains("size=10"));
        assert!(endpoint.contains("includePaths=false"));
    }

    #[test]
    fn test_finalize_status_only() {
        let delegation = finalize_after_upload(&args(json!({
            "nodeId": "N1",
            "update": {"status": "Completed"},
        })));
        assert_eq!(
            delegation,
            Delegation::Forward {
                tool: "updateNodeStatus",
                arguments: args(json!({"nodeId": "N1", "status": "Completed"})),
            }
        );
    }

    #[test]
    fn test_finalize_combined_update() {
        let delegation = finalize_after_upload(&args(json!({
            "nodeId": "N1",
            "update": {"status": "Completed", "nodeDescription": "Photos attached"},
        })));
        assert_eq!(
            delegation,
            Delegation::Forward {
                tool: "updateNode",
                arguments: args(json!({
                    "nodeId": "N1",
                    "status": "Completed",
                    "nodeDescription": "Photos attached",
                })),
            }
        );

        // A present parentNodeId, even null, rules out the status endpoint.
        let delegation = finalize_after_upload(&args(json!({
            "nodeId": "N1",
            "update": {"status": "Blocked", "parentNodeId": null},
        })));
        assert!(matches!(delegation, Delegation::Forward { tool: "updateNode", .. }));
    }

    #[test]
    fn test_finalize_nothing_to_do() {
        for update in [json!({}), json!({"status": ""}), json!("garbage")] {
            let delegation = finalize_after_upload(&args(json!({"nodeId": "N1", "update": update})));
            assert_eq!(
                delegation,
                Delegation::Done(json!({
                    "success": true,
                    "message": "Nothing to update after upload.",
                }))
            );
        }
        let delegation = finalize_after_upload(&args(json!({"nodeId": "N1"})));
        assert!(matches!(delegation, Delegation::Done(_)));
    }
}
