// Milestone tools (read-only pipeline reference data)

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{api_result, json_schema_integer, json_schema_object, page_params, Tool};
use anyhow::{Context, Result};
use capsule_sdk::CapsuleClient;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Tool to list pipeline milestones
pub struct ListMilestonesTool {
    client: Arc<CapsuleClient>,
}

impl ListMilestonesTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ListMilestonesArgs {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
}

#[async_trait::async_trait]
impl Tool for ListMilestonesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_milestones".to_string(),
            description: "List all pipeline milestones used for tracking opportunity progress."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "page": json_schema_integer("The page of results to return (default: 1)"),
                    "per_page": json_schema_integer("The number of entities per page (default: 50)")
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ListMilestonesArgs =
            serde_json::from_value(arguments).context("Invalid arguments for list_milestones")?;
        api_result(
            self.client
                .milestones()
                .list(page_params(args.page, args.per_page))
                .await,
        )
    }
}
