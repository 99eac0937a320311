//! Event tools: listing and creating events, staffing them, linking leads.

use serde_json::Value;

use super::common::{data, record, success};
use crate::domains::backend::HttpMethod;
use crate::domains::tools::registry::{
    Arguments, BackendCall, BodyPolicy, Dispatch, FieldKind, FieldSpec, QueryParam,
    ToolDescriptor,
};

const GET_EVENTS_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("page", FieldKind::Integer, "Page number (default: 0)"),
    FieldSpec::optional("size", FieldKind::Integer, "Page size (default: 20)"),
];

const GET_EVENTS_QUERY: &[QueryParam] = &[
    QueryParam::with_default("page", "0"),
    QueryParam::with_default("size", "20"),
];

fn events_page(payload: &Value, _: &Arguments) -> Value {
    let data = data(payload);
    success(
        [
            ("events", data["content"].clone()),
            ("totalEvents", data["totalElements"].clone()),
            ("currentPage", data["number"].clone()),
            ("totalPages", data["totalPages"].clone()),
        ],
        "Events retrieved successfully",
    )
}

pub const GET_EVENTS: ToolDescriptor = ToolDescriptor {
    name: "get_events",
    description: "Get a paginated list of events",
    fields: GET_EVENTS_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Get,
        path: "/api/v1/sales/events",
        query: GET_EVENTS_QUERY,
        body: BodyPolicy::None,
        shape: events_page,
        on_not_found: None,
    }),
};

const CREATE_EVENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("eventName", FieldKind::String, "Event name"),
    FieldSpec::required("eventType", FieldKind::String, "Event type"),
    FieldSpec::required("startDate", FieldKind::String, "Start date (YYYY-MM-DD)"),
    FieldSpec::required("endDate", FieldKind::String, "End date (YYYY-MM-DD)"),
    FieldSpec::optional("location", FieldKind::String, "Event location"),
    FieldSpec::optional("eventStatus", FieldKind::String, "Event status"),
];

fn event_created(payload: &Value, _: &Arguments) -> Value {
    record(payload, "event", "Event created successfully")
}

pub const CREATE_EVENT: ToolDescriptor = ToolDescriptor {
    name: "create_event",
    description: "Create a new event",
    fields: CREATE_EVENT_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Post,
        path: "/api/v1/sales/events",
        query: &[],
        body: BodyPolicy::Arguments,
        shape: event_created,
        on_not_found: None,
    }),
};

const MEMBER_TYPES: &[&str] = &["User", "ExternalPerson"];

const ADD_TEAM_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("eventId", FieldKind::String, "Event ID"),
    FieldSpec::required("memberType", FieldKind::String, "Member type").one_of(MEMBER_TYPES),
    FieldSpec::optional("userId", FieldKind::String, "User ID (if memberType is User)"),
    FieldSpec::optional(
        "externalPersonId",
        FieldKind::String,
        "External Person ID (if memberType is ExternalPerson)",
    ),
    FieldSpec::required("eventRole", FieldKind::String, "Role: SalesRep, Supervisor, Head"),
    FieldSpec::required("assignmentDate", FieldKind::String, "Assignment date (YYYY-MM-DD)"),
    FieldSpec::optional("isActive", FieldKind::Boolean, "Is active"),
];

fn team_member_added(payload: &Value, _: &Arguments) -> Value {
    record(payload, "teamMember", "Team member added to event successfully")
}

pub const ADD_TEAM_TO_EVENT: ToolDescriptor = ToolDescriptor {
    name: "add_team_to_event",
    description: "Add a team member to an event",
    fields: ADD_TEAM_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Post,
        path: "/api/v1/sales/event-teams",
        query: &[],
        body: BodyPolicy::Arguments,
        shape: team_member_added,
        on_not_found: None,
    }),
};

const TEMPERATURES: &[&str] = &["Hot", "Warm", "Cold"];
const PRIORITIES: &[&str] = &["High", "Medium", "Low"];

const CREATE_EVENT_LEAD_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("eventId", FieldKind::String, "Event ID"),
    FieldSpec::required("leadId", FieldKind::String, "Lead ID"),
    FieldSpec::optional("temperatureCategory", FieldKind::String, "Temperature category")
        .one_of(TEMPERATURES),
    FieldSpec::optional("leadStatus", FieldKind::String, "Lead status"),
    FieldSpec::optional("leadPriority", FieldKind::String, "Priority").one_of(PRIORITIES),
];

fn event_lead_created(payload: &Value, _: &Arguments) -> Value {
    let data = data(payload);
    success(
        [
            ("eventLead", data.clone()),
            ("eventLeadId", data["recCode"].clone()),
        ],
        "EventLead created successfully. Use eventLeadId for messaging.",
    )
}

pub const CREATE_EVENT_LEAD: ToolDescriptor = ToolDescriptor {
    name: "create_event_lead",
    description: "Create an EventLead (link a lead to an event)",
    fields: CREATE_EVENT_LEAD_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Post,
        path: "/api/v1/sales/event-leads",
        query: &[],
        body: BodyPolicy::Arguments,
        shape: event_lead_created,
        on_not_found: None,
    }),
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_events_page_shape() {
        let payload = json!({
            "data": {
                "content": [{"recCode": "E1"}],
                "totalElements": 41,
                "number": 2,
                "totalPages": 3,
            }
        });
        let shaped = events_page(&payload, &Arguments::new());

        assert_eq!(shaped["events"][0]["recCode"], "E1");
        assert_eq!(shaped["totalEvents"], 41);
        assert_eq!(shaped["currentPage"], 2);
        assert_eq!(shaped["totalPages"], 3);
    }

    #[test]
    fn test_event_lead_exposes_id() {
        let payload = json!({"data": {"recCode": "EL-9", "leadId": "L1"}});
        let shaped = event_lead_created(&payload, &Arguments::new());
        assert_eq!(shaped["eventLeadId"], "EL-9");
        assert_eq!(shaped["eventLead"]["leadId"], "L1");
    }

    #[test]
    fn test_events_query_defaults() {
        let Dispatch::Backend(call) = GET_EVENTS.dispatch else {
            panic!("get_events calls the backend");
        };
        assert_eq!(
            call.endpoint(&Arguments::new()).unwrap(),
            "/api/v1/sales/events?page=0&size=20"
        );
    }
}
