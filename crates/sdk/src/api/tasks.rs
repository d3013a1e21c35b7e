//! Tasks API endpoints.

use crate::api::{filter_query, page_query, search_query};
use crate::client::CapsuleClient;
use crate::error::CapsuleResult;
use capsule_core::filter::{Filter, TASK_FILTER_FIELDS};
use capsule_core::query::{resolve, PageParams, QueryStrategy};
use capsule_core::task::{Task, TaskStatus};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Tasks API.
pub struct TasksApi<'a> {
    client: &'a CapsuleClient,
}

impl<'a> TasksApi<'a> {
    pub(crate) fn new(client: &'a CapsuleClient) -> Self {
        Self { client }
    }

    /// List tasks with pagination, filtered by status.
    pub async fn list(&self, page: PageParams, status: TaskStatus) -> CapsuleResult<Vec<Task>> {
        let mut query = page_query(page);
        query.push(("status", status.as_str().to_string()));
        let envelope: TasksEnvelope = self.client.http.get_with_query("/tasks", &query).await?;
        Ok(envelope.tasks)
    }

    /// Search tasks by description, status or associated party/opportunity.
    pub async fn search(
        &self,
        q: &str,
        page: PageParams,
        embed: Option<&str>,
    ) -> CapsuleResult<Vec<Task>> {
        let envelope: TasksEnvelope = self
            .client
            .http
            .get_with_query("/tasks/search", &search_query(q, page, embed))
            .await?;
        Ok(envelope.tasks)
    }

    /// Get a specific task by id.
    pub async fn get(&self, task_id: u64) -> CapsuleResult<Task> {
        let envelope: TaskEnvelope = self.client.http.get(&format!("/tasks/{task_id}")).await?;
        Ok(envelope.task)
    }

    /// Create a new task.
    pub async fn create(&self, task: &Task) -> CapsuleResult<Task> {
        let envelope: TaskEnvelope = self
            .client
            .http
            .post("/tasks", &json!({ "task": task }))
            .await?;
        Ok(envelope.task)
    }

    /// Update an existing task by id.
    pub async fn update(&self, task_id: u64, task: &Task) -> CapsuleResult<Task> {
        let envelope: TaskEnvelope = self
            .client
            .http
            .put(&format!("/tasks/{task_id}"), &json!({ "task": task }))
            .await?;
        Ok(envelope.task)
    }

    /// Retrieve tasks matching a structured filter.
    pub async fn filter(
        &self,
        filter: &Filter,
        page: PageParams,
        embed: Option<&str>,
    ) -> CapsuleResult<Vec<Task>> {
        let envelope: TasksEnvelope = self
            .client
            .http
            .post_with_query(
                "/tasks/filters/results",
                &filter_query(page, embed),
                &json!({ "filter": filter }),
            )
            .await?;
        Ok(envelope.tasks)
    }

    /// Find tasks with structured filters or free-text search; falls back to
    /// a plain listing (status `open`) when the input carries neither.
    pub async fn find(&self, user_input: &Map<String, Value>) -> CapsuleResult<Vec<Task>> {
        let plan = resolve(user_input, TASK_FILTER_FIELDS);
        match plan.strategy {
            QueryStrategy::Filtered(filter) => {
                self.filter(&filter, plan.page, plan.embed.as_deref()).await
            }
            QueryStrategy::Search(q) => self.search(&q, plan.page, plan.embed.as_deref()).await,
            QueryStrategy::List => self.list(plan.page, TaskStatus::default()).await,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TasksEnvelope {
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    task: Task,
}
