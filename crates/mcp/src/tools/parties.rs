// Party tools (people and organisations)

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    api_result, json_schema_integer, json_schema_object, json_schema_record, json_schema_string,
    page_params, Tool,
};
use anyhow::{Context, Result};
use capsule_core::party::Party;
use capsule_sdk::CapsuleClient;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Tool to list parties with pagination
pub struct ListPartiesTool {
    client: Arc<CapsuleClient>,
}

impl ListPartiesTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ListPartiesArgs {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
}

#[async_trait::async_trait]
impl Tool for ListPartiesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_parties".to_string(),
            description: "List all parties (people and organisations) with pagination."
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
        let args: ListPartiesArgs =
            serde_json::from_value(arguments).context("Invalid arguments for list_parties")?;
        api_result(
            self.client
                .parties()
                .list(page_params(args.page, args.per_page))
                .await,
        )
    }
}

/// Tool to get a specific party by id
pub struct GetPartyTool {
    client: Arc<CapsuleClient>,
}

impl GetPartyTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetPartyArgs {
    party_id: u64,
}

#[async_trait::async_trait]
impl Tool for GetPartyTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_party".to_string(),
            description: "Get a specific party (person or organisation) by ID.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "party_id": json_schema_integer("The unique ID of the party")
                }),
                vec!["party_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: GetPartyArgs =
            serde_json::from_value(arguments).context("Invalid arguments for get_party")?;
        api_result(self.client.parties().get(args.party_id).await)
    }
}

/// Tool to create a new party
pub struct CreatePartyTool {
    client: Arc<CapsuleClient>,
}

impl CreatePartyTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct CreatePartyArgs {
    party: Party,
}

#[async_trait::async_trait]
impl Tool for CreatePartyTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "create_party".to_string(),
            description: "Create a new party; the payload must carry type 'person' or 'organisation'.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "party": json_schema_record("The party to create, discriminated by its 'type' field")
                }),
                vec!["party"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: CreatePartyArgs =
            serde_json::from_value(arguments).context("Invalid arguments for create_party")?;
        api_result(self.client.parties().create(&args.party).await)
    }
}

/// Tool to update an existing party
pub struct UpdatePartyTool {
    client: Arc<CapsuleClient>,
}

impl UpdatePartyTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct UpdatePartyArgs {
    party_id: u64,
    party: Party,
}

#[async_trait::async_trait]
impl Tool for UpdatePartyTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_party".to_string(),
            description: "Update an existing party by ID.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "party_id": json_schema_integer("The unique ID of the party to update"),
                    "party": json_schema_record("The updated party, discriminated by its 'type' field")
                }),
                vec!["party_id", "party"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: UpdatePartyArgs =
            serde_json::from_value(arguments).context("Invalid arguments for update_party")?;
        api_result(
            self.client
                .parties()
                .update(args.party_id, &args.party)
                .await,
        )
    }
}

/// Tool to search parties by free text
pub struct SearchPartiesTool {
    client: Arc<CapsuleClient>,
}

impl SearchPartiesTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct SearchPartiesArgs {
    q: String,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
    #[serde(default)]
    embed: Option<String>,
}

#[async_trait::async_trait]
impl Tool for SearchPartiesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_parties".to_string(),
            description: "Search parties by name, address, phone number or email address."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "q": json_schema_string("The search query (e.g. name, postcode, phone number)"),
                    "page": json_schema_integer("The page of results to return (default: 1)"),
                    "per_page": json_schema_integer("The number of entities per page (default: 50)"),
                    "embed": json_schema_string("Comma-separated list of extra fields to include (e.g. 'tags,fields')")
                }),
                vec!["q"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: SearchPartiesArgs =
            serde_json::from_value(arguments).context("Invalid arguments for search_parties")?;
        api_result(
            self.client
                .parties()
                .search(
                    &args.q,
                    page_params(args.page, args.per_page),
                    args.embed.as_deref(),
                )
                .await,
        )
    }
}

/// Tool to find parties with structured filters or free text
pub struct FindPartiesTool {
    client: Arc<CapsuleClient>,
}

impl FindPartiesTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct FindPartiesArgs {
    user_input: Map<String, Value>,
}

#[async_trait::async_trait]
impl Tool for FindPartiesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "find_parties".to_string(),
            description: "Find parties with structured filters or free text search. Use 'q' for free text, or filterable fields like 'tag', 'type', 'owner'; suffixes such as 'addedOn_after' select comparison operators.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "user_input": json_schema_record("Dictionary of search and/or filter parameters")
                }),
                vec!["user_input"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: FindPartiesArgs =
            serde_json::from_value(arguments).context("Invalid arguments for find_parties")?;
        api_result(self.client.parties().find(&args.user_input).await)
    }
}
