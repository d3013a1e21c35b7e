// MCP tools wrapping the Capsule API client

pub mod milestones;
pub mod opportunities;
pub mod parties;
pub mod tasks;
mod registry;

pub use milestones::ListMilestonesTool;
pub use opportunities::{
    CreateOpportunityTool, FindOpportunitiesTool, GetOpportunityTool, ListOpportunitiesTool,
    SearchOpportunitiesTool, UpdateOpportunityTool,
};
pub use parties::{
    CreatePartyTool, FindPartiesTool, GetPartyTool, ListPartiesTool, SearchPartiesTool,
    UpdatePartyTool,
};
pub use registry::{
    json_schema_integer, json_schema_object, json_schema_record, json_schema_string, Tool,
    ToolRegistry,
};
pub use tasks::{
    CreateTaskTool, FindTasksTool, GetTaskTool, ListTasksTool, SearchTasksTool, UpdateTaskTool,
};

use crate::protocol::{CallToolResult, ToolContent};
use capsule_core::query::PageParams;
use capsule_sdk::CapsuleResult;

/// Render an API call outcome as a tool result. Remote failures surface as
/// tool-level errors (`is_error`), not JSON-RPC errors, so the client sees
/// the error kind and detail as content.
pub(crate) fn api_result<T: serde::Serialize>(
    outcome: CapsuleResult<T>,
) -> anyhow::Result<CallToolResult> {
    match outcome {
        Ok(value) => {
            let json = serde_json::to_string_pretty(&value)?;
            Ok(CallToolResult {
                content: vec![ToolContent::text(json)],
                is_error: None,
            })
        }
        Err(err) => Ok(CallToolResult {
            content: vec![ToolContent::error(err.to_string())],
            is_error: Some(true),
        }),
    }
}

pub(crate) fn page_params(page: Option<u32>, per_page: Option<u32>) -> PageParams {
    let defaults = PageParams::default();
    PageParams {
        page: page.unwrap_or(defaults.page),
        per_page: per_page.unwrap_or(defaults.per_page),
    }
}
