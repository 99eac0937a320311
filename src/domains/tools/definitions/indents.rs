//! Indent tools and the master data an indent refers to.

use serde_json::Value;

use super::common::{data, page, record, success};
use crate::domains::backend::HttpMethod;
use crate::domains::tools::registry::{
    Arguments, BackendCall, BodyPolicy, Dispatch, FieldKind, FieldSpec, ToolDescriptor,
};

/// A parameterless GET whose result is a page of records.
const fn list(path: &'static str, shape: fn(&Value, &Arguments) -> Value) -> Dispatch {
    Dispatch::Backend(BackendCall {
        method: HttpMethod::Get,
        path,
        query: &[],
        body: BodyPolicy::None,
        shape,
        on_not_found: None,
    })
}

fn indent_number(payload: &Value, _: &Arguments) -> Value {
    success(
        [("indentNumber", data(payload).clone())],
        "Indent number generated successfully",
    )
}

pub const GENERATE_INDENT_NUMBER: ToolDescriptor = ToolDescriptor {
    name: "generateIndentNumber",
    description: "Generate the next indent number",
    fields: &[],
    dispatch: list("/api/v1/indents/generate-number", indent_number),
};

fn projects(payload: &Value, _: &Arguments) -> Value {
    page(payload, "projects", "totalProjects", "Projects retrieved successfully")
}

pub const FETCH_PROJECTS: ToolDescriptor = ToolDescriptor {
    name: "fetchProjects",
    description: "List projects an indent can be raised against",
    fields: &[],
    dispatch: list("/api/v1/projects", projects),
};

fn locations(payload: &Value, _: &Arguments) -> Value {
    page(payload, "locations", "totalLocations", "Locations retrieved successfully")
}

pub const LIST_LOCATIONS: ToolDescriptor = ToolDescriptor {
    name: "listLocations",
    description: "List delivery locations",
    fields: &[],
    dispatch: list("/api/v1/locations", locations),
};

fn items(payload: &Value, _: &Arguments) -> Value {
    page(payload, "items", "totalItems", "Items retrieved successfully")
}

pub const LIST_ITEMS: ToolDescriptor = ToolDescriptor {
    name: "listItems",
    description: "List items that can be indented",
    fields: &[],
    dispatch: list("/api/v1/items", items),
};

fn units(payload: &Value, _: &Arguments) -> Value {
    page(payload, "units", "totalUnits", "Units retrieved successfully")
}

pub const LIST_UNITS: ToolDescriptor = ToolDescriptor {
    name: "listUnits",
    description: "List units of measure",
    fields: &[],
    dispatch: list("/api/v1/units", units),
};

const CREATE_INDENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("indentNumber", FieldKind::String, "Indent number from generateIndentNumber"),
    FieldSpec::optional("projectId", FieldKind::String, "Project ID"),
    FieldSpec::optional("locationId", FieldKind::String, "Delivery location ID"),
    FieldSpec::optional("requiredDate", FieldKind::String, "Required by (YYYY-MM-DD)"),
    FieldSpec::optional("remarks", FieldKind::String, "Remarks"),
    FieldSpec::required(
        "indentItems",
        FieldKind::Array,
        "Line items: item ID, unit ID and quantity",
    ),
];

fn indent_created(payload: &Value, _: &Arguments) -> Value {
    record(payload, "indent", "Indent created successfully")
}

pub const CREATE_INDENT: ToolDescriptor = ToolDescriptor {
    name: "createIndent",
    description: "Create a material indent",
    fields: CREATE_INDENT_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Post,
        path: "/api/v1/indents",
        query: &[],
        body: BodyPolicy::Arguments,
        shape: indent_created,
        on_not_found: None,
    }),
};
