//! Lead tools: existence check, creation and follow-up activities.

use serde_json::{Value, json};

use super::common::{data, record, success};
use crate::domains::backend::HttpMethod;
use crate::domains::tools::registry::{
    Arguments, BackendCall, BodyPolicy, Dispatch, FieldKind, FieldSpec, ToolDescriptor,
};

// ============================================================================
// check_lead_by_mobile
// ============================================================================

const CHECK_LEAD_FIELDS: &[FieldSpec] = &[FieldSpec::required(
    "mobile",
    FieldKind::String,
    "Mobile number (e.g., +919876543210)",
)];

fn lead_found(payload: &Value, _: &Arguments) -> Value {
    success(
        [("exists", json!(true)), ("lead", data(payload).clone())],
        "Lead found successfully",
    )
}

/// A 404 means "no such lead", which is an answer rather than a failure.
fn lead_not_found(args: &Arguments) -> Value {
    success(
        [
            ("exists", json!(false)),
            ("mobile", args.get("mobile").cloned().unwrap_or(Value::Null)),
        ],
        "Lead not found with this mobile number",
    )
}

pub const CHECK_LEAD_BY_MOBILE: ToolDescriptor = ToolDescriptor {
    name: "check_lead_by_mobile",
    description: "Check if a lead exists by mobile number",
    fields: CHECK_LEAD_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Get,
        path: "/api/v1/sales/leads/mobile/{mobile}",
        query: &[],
        body: BodyPolicy::None,
        shape: lead_found,
        on_not_found: Some(lead_not_found),
    }),
};

// ============================================================================
// create_lead
// ============================================================================

const CREATE_LEAD_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("mobile", FieldKind::String, "Mobile number (REQUIRED)"),
    FieldSpec::optional("fullName", FieldKind::String, "Full name"),
    FieldSpec::optional("email", FieldKind::String, "Email address"),
    FieldSpec::optional("companyName", FieldKind::String, "Company name"),
    FieldSpec::optional("designation", FieldKind::String, "Job designation"),
    FieldSpec::optional("department", FieldKind::String, "Department"),
    FieldSpec::optional("industry", FieldKind::String, "Industry"),
    FieldSpec::optional("city", FieldKind::String, "City"),
    FieldSpec::optional("state", FieldKind::String, "State"),
    FieldSpec::optional("country", FieldKind::String, "Country"),
];

fn lead_created(payload: &Value, _: &Arguments) -> Value {
    record(payload, "lead", "Lead created successfully")
}

pub const CREATE_LEAD: ToolDescriptor = ToolDescriptor {
    name: "create_lead",
    description: "Create a new lead with contact information",
    fields: CREATE_LEAD_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Post,
        path: "/api/v1/sales/leads",
        query: &[],
        body: BodyPolicy::Arguments,
        shape: lead_created,
        on_not_found: None,
    }),
};

// ============================================================================
// followUpActivity
// ============================================================================

const FOLLOW_UP_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("eventLeadId", FieldKind::String, "EventLead ID"),
    FieldSpec::optional("activityType", FieldKind::String, "Type of follow-up (call, email, meeting)"),
    FieldSpec::optional("activityDate", FieldKind::String, "Scheduled date (YYYY-MM-DD)"),
    FieldSpec::optional("remarks", FieldKind::String, "Notes for the follow-up"),
];

fn follow_up_created(payload: &Value, _: &Arguments) -> Value {
    success(
        [
            ("followUp", data(payload).clone()),
            ("timestamp", payload["timestamp"].clone()),
            ("path", payload["path"].clone()),
        ],
        "Follow-up activity created successfully",
    )
}

pub const FOLLOW_UP_ACTIVITY: ToolDescriptor = ToolDescriptor {
    name: "followUpActivity",
    description: "Create a follow-up activity for a lead",
    fields: FOLLOW_UP_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Post,
        path: "/api/v1/sales/followup/followUpActivity",
        query: &[],
        body: BodyPolicy::Arguments,
        shape: follow_up_created,
        on_not_found: None,
    }),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_found_shape() {
        let payload = json!({"data": {"recCode": "L1", "mobile": "+91900000"}});
        let shaped = lead_found(&payload, &Arguments::new());

        assert_eq!(shaped["success"], true);
        assert_eq!(shaped["exists"], true);
        assert_eq!(shaped["lead"]["recCode"], "L1");
    }

    #[test]
    fn test_lead_not_found_shape() {
        let mut args = Arguments::new();
        args.insert("mobile".to_string(), json!("+91900000"));
        let shaped = lead_not_found(&args);

        assert_eq!(
            shaped,
            json!({
                "success": true,
                "exists": false,
                "mobile": "+91900000",
                "message": "Lead not found with this mobile number",
            })
        );
    }

    #[test]
    fn test_follow_up_keeps_envelope_metadata() {
        let payload = json!({
            "data": {"id": 4},
            "timestamp": "2024-05-01T10:00:00Z",
            "path": "/api/v1/sales/followup/followUpActivity",
        });
        let shaped = follow_up_created(&payload, &Arguments::new());

        assert_eq!(shaped["followUp"]["id"], 4);
        assert_eq!(shaped["timestamp"], "2024-05-01T10:00:00Z");
        assert_eq!(shaped["path"], "/api/v1/sales/followup/followUpActivity");
    }
}
