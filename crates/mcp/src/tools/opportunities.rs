// Opportunity (sales) tools
//
// Responses carry the locally computed `current_value`, the
// probability-weighted figure preferred for reporting.

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    api_result, json_schema_integer, json_schema_object, json_schema_record, json_schema_string,
    page_params, Tool,
};
use anyhow::{Context, Result};
use capsule_core::opportunity::OpportunityDraft;
use capsule_sdk::CapsuleClient;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Tool to list opportunities with pagination
pub struct ListOpportunitiesTool {
    client: Arc<CapsuleClient>,
}

impl ListOpportunitiesTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ListOpportunitiesArgs {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
}

#[async_trait::async_trait]
impl Tool for ListOpportunitiesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_opportunities".to_string(),
            description: "List all sales opportunities with pagination. For reporting and value queries, use the 'current_value' attribute if present.".to_string(),
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
        let args: ListOpportunitiesArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for list_opportunities")?;
        api_result(
            self.client
                .opportunities()
                .list(page_params(args.page, args.per_page))
                .await,
        )
    }
}

/// Tool to get a specific opportunity by id
pub struct GetOpportunityTool {
    client: Arc<CapsuleClient>,
}

impl GetOpportunityTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetOpportunityArgs {
    opportunity_id: u64,
}

#[async_trait::async_trait]
impl Tool for GetOpportunityTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_opportunity".to_string(),
            description: "Get a specific sales opportunity by ID, including value, probability and the calculated 'current_value'.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "opportunity_id": json_schema_integer("The unique ID of the opportunity")
                }),
                vec!["opportunity_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: GetOpportunityArgs =
            serde_json::from_value(arguments).context("Invalid arguments for get_opportunity")?;
        api_result(self.client.opportunities().get(args.opportunity_id).await)
    }
}

/// Tool to create a new opportunity
pub struct CreateOpportunityTool {
    client: Arc<CapsuleClient>,
}

impl CreateOpportunityTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct CreateOpportunityArgs {
    opportunity: OpportunityDraft,
}

#[async_trait::async_trait]
impl Tool for CreateOpportunityTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "create_opportunity".to_string(),
            description: "Create a new sales opportunity with name, party, milestone and value. 'value_type' must be 'per_unit' (value.amount is per duration unit) or 'total' (value.amount covers all units).".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "opportunity": json_schema_record("The opportunity to create")
                }),
                vec!["opportunity"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: CreateOpportunityArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for create_opportunity")?;
        api_result(self.client.opportunities().create(&args.opportunity).await)
    }
}

/// Tool to update an existing opportunity
pub struct UpdateOpportunityTool {
    client: Arc<CapsuleClient>,
}

impl UpdateOpportunityTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateOpportunityArgs {
    opportunity_id: u64,
    opportunity: OpportunityDraft,
}

#[async_trait::async_trait]
impl Tool for UpdateOpportunityTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_opportunity".to_string(),
            description: "Update an existing sales opportunity by ID.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "opportunity_id": json_schema_integer("The unique ID of the opportunity to update"),
                    "opportunity": json_schema_record("The updated opportunity data")
                }),
                vec!["opportunity_id", "opportunity"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: UpdateOpportunityArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for update_opportunity")?;
        api_result(
            self.client
                .opportunities()
                .update(args.opportunity_id, &args.opportunity)
                .await,
        )
    }
}

/// Tool to search opportunities by free text
pub struct SearchOpportunitiesTool {
    client: Arc<CapsuleClient>,
}

impl SearchOpportunitiesTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct SearchOpportunitiesArgs {
    q: String,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
    #[serde(default)]
    embed: Option<String>,
}

#[async_trait::async_trait]
impl Tool for SearchOpportunitiesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_opportunities".to_string(),
            description: "Search opportunities by name, description or associated party details."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "q": json_schema_string("The search query (e.g. name, description, party name)"),
                    "page": json_schema_integer("The page of results to return (default: 1)"),
                    "per_page": json_schema_integer("The number of entities per page (default: 50)"),
                    "embed": json_schema_string("Comma-separated list of extra fields to include (e.g. 'tags,fields')")
                }),
                vec!["q"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: SearchOpportunitiesArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for search_opportunities")?;
        api_result(
            self.client
                .opportunities()
                .search(
                    &args.q,
                    page_params(args.page, args.per_page),
                    args.embed.as_deref(),
                )
                .await,
        )
    }
}

/// Tool to find opportunities with structured filters or free text
pub struct FindOpportunitiesTool {
    client: Arc<CapsuleClient>,
}

impl FindOpportunitiesTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct FindOpportunitiesArgs {
    user_input: Map<String, Value>,
}

#[async_trait::async_trait]
impl Tool for FindOpportunitiesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "find_opportunities".to_string(),
            description: "Find opportunities with structured filters or free text search. Use 'q' for free text, or filterable fields like 'status', 'tag', 'owner', 'milestone'; suffixes such as 'addedOn_after' select comparison operators. For reporting, use 'current_value' if present.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "user_input": json_schema_record("Dictionary of search and/or filter parameters")
                }),
                vec!["user_input"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: FindOpportunitiesArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for find_opportunities")?;
        api_result(self.client.opportunities().find(&args.user_input).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capsule_sdk::CapsuleClient;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn find_tool_returns_opportunities_with_current_value() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/opportunities/filters/results"))
            .and(body_json(json!({
                "filter": {
                    "conditions": [
                        {"field": "status", "operator": "is", "value": "open"},
                        {"field": "tag", "operator": "is", "value": "vip"},
                    ]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "opportunities": [{
                    "id": 7,
                    "name": "Renewal",
                    "value": {"amount": 20.0, "currency": "EUR"},
                    "durationBasis": "MONTH",
                    "duration": 6,
                    "probability": 50,
                }]
            })))
            .mount(&server)
            .await;

        let client = Arc::new(
            CapsuleClient::builder()
                .base_url(server.uri())
                .access_token("test-token")
                .build()
                .unwrap(),
        );
        let tool = FindOpportunitiesTool::new(client);

        let result = tool
            .execute(json!({"user_input": {"status": "open", "tag": "vip"}}))
            .await
            .unwrap();

        assert_eq!(result.is_error, None);
        let crate::protocol::ToolContent::Text { text } = &result.content[0];
        let decoded: Value = serde_json::from_str(text).unwrap();
        assert_eq!(decoded[0]["current_value"], json!(60.0));
        assert_eq!(decoded[0]["total_value"], json!(120.0));
    }

    #[tokio::test]
    async fn remote_failure_surfaces_as_tool_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/opportunities/1"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "no such opportunity"})),
            )
            .mount(&server)
            .await;

        let client = Arc::new(
            CapsuleClient::builder()
                .base_url(server.uri())
                .access_token("test-token")
                .build()
                .unwrap(),
        );
        let tool = GetOpportunityTool::new(client);

        let result = tool.execute(json!({"opportunity_id": 1})).await.unwrap();
        assert_eq!(result.is_error, Some(true));
        let crate::protocol::ToolContent::Text { text } = &result.content[0];
        assert!(text.contains("404"));
        assert!(text.contains("no such opportunity"));
    }
}
