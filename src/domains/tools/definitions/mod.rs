//! Tool definitions module.
//!
//! Each file groups the descriptors of one business area. [`all`] fixes the
//! catalog order reported by `tools/list`.

pub mod common;
pub mod conversations;
pub mod events;
pub mod indents;
pub mod leads;
pub mod nodes;

use super::registry::ToolDescriptor;

pub use nodes::NODE_STATUSES;

/// Every tool, in catalog order.
pub fn all() -> Vec<ToolDescriptor> {
    vec![
        leads::CHECK_LEAD_BY_MOBILE,
        leads::CREATE_LEAD,
        events::GET_EVENTS,
        events::CREATE_EVENT,
        events::ADD_TEAM_TO_EVENT,
        events::CREATE_EVENT_LEAD,
        conversations::SAVE_SIMPLE_MESSAGE,
        conversations::GENERATE_SUMMARY,
        conversations::SAVE_SUMMARY,
        conversations::GET_CONVERSATION_HISTORY,
        indents::GENERATE_INDENT_NUMBER,
        indents::FETCH_PROJECTS,
        indents::LIST_LOCATIONS,
        indents::LIST_ITEMS,
        indents::LIST_UNITS,
        indents::CREATE_INDENT,
        nodes::SEARCH_NODES_ARRAY,
        nodes::UPDATE_NODE_STATUS,
        nodes::UPDATE_NODE,
        nodes::FINALIZE_AFTER_UPLOAD,
        leads::FOLLOW_UP_ACTIVITY,
        nodes::CREATE_NODE,
    ]
}
