// Task tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    api_result, json_schema_integer, json_schema_object, json_schema_record, json_schema_string,
    page_params, Tool,
};
use anyhow::{Context, Result};
use capsule_core::task::{Task, TaskStatus};
use capsule_sdk::CapsuleClient;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Tool to list tasks with pagination and status filtering
pub struct ListTasksTool {
    client: Arc<CapsuleClient>,
}

impl ListTasksTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ListTasksArgs {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
    #[serde(default)]
    status: Option<TaskStatus>,
}

#[async_trait::async_trait]
impl Tool for ListTasksTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_tasks".to_string(),
            description: "List tasks with filtering by status: 'open', 'completed' or 'pending' (default: open).".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "page": json_schema_integer("The page of results to return (default: 1)"),
                    "per_page": json_schema_integer("The number of entities per page (default: 50)"),
                    "status": {
                        "type": "string",
                        "description": "Filter by task status (default: open)",
                        "enum": ["open", "completed", "pending"]
                    }
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: ListTasksArgs =
            serde_json::from_value(arguments).context("Invalid arguments for list_tasks")?;
        api_result(
            self.client
                .tasks()
                .list(
                    page_params(args.page, args.per_page),
                    args.status.unwrap_or_default(),
                )
                .await,
        )
    }
}

/// Tool to get a specific task by id
pub struct GetTaskTool {
    client: Arc<CapsuleClient>,
}

impl GetTaskTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetTaskArgs {
    task_id: u64,
}

#[async_trait::async_trait]
impl Tool for GetTaskTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_task".to_string(),
            description: "Get a specific task by ID with full details including due date and owner.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "task_id": json_schema_integer("The unique ID of the task")
                }),
                vec!["task_id"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: GetTaskArgs =
            serde_json::from_value(arguments).context("Invalid arguments for get_task")?;
        api_result(self.client.tasks().get(args.task_id).await)
    }
}

/// Tool to create a new task
pub struct CreateTaskTool {
    client: Arc<CapsuleClient>,
}

impl CreateTaskTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct CreateTaskArgs {
    task: Task,
}

#[async_trait::async_trait]
impl Tool for CreateTaskTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "create_task".to_string(),
            description: "Create a new task with description, due date and assignment details."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "task": json_schema_record("The task to create")
                }),
                vec!["task"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: CreateTaskArgs =
            serde_json::from_value(arguments).context("Invalid arguments for create_task")?;
        api_result(self.client.tasks().create(&args.task).await)
    }
}

/// Tool to update an existing task
pub struct UpdateTaskTool {
    client: Arc<CapsuleClient>,
}

impl UpdateTaskTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateTaskArgs {
    task_id: u64,
    task: Task,
}

#[async_trait::async_trait]
impl Tool for UpdateTaskTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "update_task".to_string(),
            description: "Update an existing task by ID, including status, due date or assignment.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "task_id": json_schema_integer("The unique ID of the task to update"),
                    "task": json_schema_record("The updated task")
                }),
                vec!["task_id", "task"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: UpdateTaskArgs =
            serde_json::from_value(arguments).context("Invalid arguments for update_task")?;
        api_result(self.client.tasks().update(args.task_id, &args.task).await)
    }
}

/// Tool to search tasks by free text
pub struct SearchTasksTool {
    client: Arc<CapsuleClient>,
}

impl SearchTasksTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct SearchTasksArgs {
    q: String,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
    #[serde(default)]
    embed: Option<String>,
}

#[async_trait::async_trait]
impl Tool for SearchTasksTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_tasks".to_string(),
            description: "Search tasks by description, status or associated party/opportunity."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "q": json_schema_string("The search query (e.g. description, status, party name)"),
                    "page": json_schema_integer("The page of results to return (default: 1)"),
                    "per_page": json_schema_integer("The number of entities per page (default: 50)"),
                    "embed": json_schema_string("Comma-separated list of extra fields to include (e.g. 'party,opportunity')")
                }),
                vec!["q"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: SearchTasksArgs =
            serde_json::from_value(arguments).context("Invalid arguments for search_tasks")?;
        api_result(
            self.client
                .tasks()
                .search(
                    &args.q,
                    page_params(args.page, args.per_page),
                    args.embed.as_deref(),
                )
                .await,
        )
    }
}

/// Tool to find tasks with structured filters or free text
pub struct FindTasksTool {
    client: Arc<CapsuleClient>,
}

impl FindTasksTool {
    pub fn new(client: Arc<CapsuleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct FindTasksArgs {
    user_input: Map<String, Value>,
}

#[async_trait::async_trait]
impl Tool for FindTasksTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "find_tasks".to_string(),
            description: "Find tasks with structured filters or free text search. Use 'q' for free text, or filterable fields like 'status', 'tag', 'owner', 'dueOn'; suffixes such as 'dueOn_after' select comparison operators.".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "user_input": json_schema_record("Dictionary of search and/or filter parameters")
                }),
                vec!["user_input"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let args: FindTasksArgs =
            serde_json::from_value(arguments).context("Invalid arguments for find_tasks")?;
        api_result(self.client.tasks().find(&args.user_input).await)
    }
}
