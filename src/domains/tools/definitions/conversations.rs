//! Conversation tools: message capture and summary generation.

use serde_json::{Value, json};

use super::common::{data, or_default, record, success};
use crate::domains::backend::HttpMethod;
use crate::domains::tools::registry::{
    Arguments, BackendCall, BodyPolicy, Dispatch, FieldKind, FieldSpec, ToolDescriptor,
};

const EVENT_LEAD_ID: FieldSpec =
    FieldSpec::required("eventLeadId", FieldKind::String, "EventLead ID");

const SAVE_MESSAGE_FIELDS: &[FieldSpec] = &[
    EVENT_LEAD_ID,
    FieldSpec::required("message", FieldKind::String, "Message content"),
];

fn message_saved(payload: &Value, _: &Arguments) -> Value {
    let data = data(payload);
    success(
        [
            ("messageId", data["messageId"].clone()),
            ("timestamp", data["timestamp"].clone()),
            ("acknowledgment", data["acknowledgment"].clone()),
        ],
        "Message saved successfully",
    )
}

pub const SAVE_SIMPLE_MESSAGE: ToolDescriptor = ToolDescriptor {
    name: "save_simple_message",
    description: "Save a message from a lead without generating AI response",
    fields: SAVE_MESSAGE_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Post,
        path: "/api/v1/sales/lead-messages/simple",
        query: &[],
        body: BodyPolicy::Arguments,
        shape: message_saved,
        on_not_found: None,
    }),
};

const EVENT_LEAD_FIELDS: &[FieldSpec] = &[EVENT_LEAD_ID];

fn summary_data(payload: &Value, _: &Arguments) -> Value {
    let data = data(payload);
    let new_messages = data["newMessageCount"].as_i64().unwrap_or(0);
    let message = if new_messages > 0 {
        format!("Found {} new messages to summarize", new_messages)
    } else {
        "No new messages since last summary".to_string()
    };

    success(
        [
            ("eventLeadId", data["eventLeadId"].clone()),
            ("interactionId", data["interactionId"].clone()),
            ("previousSummaries", or_default(&data["previousSummaries"], json!([]))),
            ("newMessages", or_default(&data["newMessages"], json!([]))),
            ("totalMessages", data["totalMessages"].clone()),
            ("newMessageCount", data["newMessageCount"].clone()),
            ("lastSummaryTimestamp", data["lastSummaryTimestamp"].clone()),
            ("structuredChatData", data["structuredChatData"].clone()),
        ],
        &message,
    )
}

pub const GENERATE_SUMMARY: ToolDescriptor = ToolDescriptor {
    name: "generate_summary",
    description: "Generate summary data for a conversation (incremental)",
    fields: EVENT_LEAD_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Post,
        path: "/api/v1/sales/lead-conversations/{eventLeadId}/generate-summary",
        query: &[],
        body: BodyPolicy::Empty,
        shape: summary_data,
        on_not_found: None,
    }),
};

const SAVE_SUMMARY_FIELDS: &[FieldSpec] = &[
    EVENT_LEAD_ID,
    FieldSpec::required("summary", FieldKind::String, "AI-generated summary text"),
];

fn summary_saved(payload: &Value, _: &Arguments) -> Value {
    record(payload, "interaction", "Summary saved successfully")
}

pub const SAVE_SUMMARY: ToolDescriptor = ToolDescriptor {
    name: "save_summary",
    description: "Save an AI-generated summary for a conversation",
    fields: SAVE_SUMMARY_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Post,
        path: "/api/v1/sales/lead-conversations/{eventLeadId}/save-summary",
        query: &[],
        body: BodyPolicy::Select(&["summary"]),
        shape: summary_saved,
        on_not_found: None,
    }),
};

fn history(payload: &Value, _: &Arguments) -> Value {
    let data = data(payload);
    success(
        [
            ("eventLead", data["eventLead"].clone()),
            ("interaction", data["interaction"].clone()),
            ("messages", data["messages"].clone()),
            ("overallSummary", data["overallSummary"].clone()),
            ("totalMessages", data["totalMessages"].clone()),
        ],
        "Conversation history retrieved successfully",
    )
}

pub const GET_CONVERSATION_HISTORY: ToolDescriptor = ToolDescriptor {
    name: "get_conversation_history",
    description: "Get complete conversation history for an EventLead",
    fields: EVENT_LEAD_FIELDS,
    dispatch: Dispatch::Backend(BackendCall {
        method: HttpMethod::Get,
        path: "/api/v1/sales/lead-conversations/{eventLeadId}/history",
        query: &[],
        body: BodyPolicy::None,
        shape: history,
        on_not_found: None,
    }),
};
