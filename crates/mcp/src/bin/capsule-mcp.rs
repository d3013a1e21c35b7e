// Standalone MCP server binary

use anyhow::Result;
use capsule_mcp::server::McpServer;
use capsule_mcp::tools::*;
use capsule_sdk::CapsuleClient;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol, so all logging goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::info!("Capsule MCP server starting...");

    // A missing access token is fatal before any tool is registered.
    let client = match CapsuleClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(err) => {
            tracing::error!("Failed to configure Capsule client: {}", err);
            std::process::exit(1);
        }
    };

    let mut registry = ToolRegistry::new();

    // Parties
    registry.register(Arc::new(ListPartiesTool::new(client.clone())));
    registry.register(Arc::new(GetPartyTool::new(client.clone())));
    registry.register(Arc::new(CreatePartyTool::new(client.clone())));
    registry.register(Arc::new(UpdatePartyTool::new(client.clone())));
    registry.register(Arc::new(SearchPartiesTool::new(client.clone())));
    registry.register(Arc::new(FindPartiesTool::new(client.clone())));

    // Opportunities
    registry.register(Arc::new(ListOpportunitiesTool::new(client.clone())));
    registry.register(Arc::new(GetOpportunityTool::new(client.clone())));
    registry.register(Arc::new(CreateOpportunityTool::new(client.clone())));
    registry.register(Arc::new(UpdateOpportunityTool::new(client.clone())));
    registry.register(Arc::new(SearchOpportunitiesTool::new(client.clone())));
    registry.register(Arc::new(FindOpportunitiesTool::new(client.clone())));

    // Tasks
    registry.register(Arc::new(ListTasksTool::new(client.clone())));
    registry.register(Arc::new(GetTaskTool::new(client.clone())));
    registry.register(Arc::new(CreateTaskTool::new(client.clone())));
    registry.register(Arc::new(UpdateTaskTool::new(client.clone())));
    registry.register(Arc::new(SearchTasksTool::new(client.clone())));
    registry.register(Arc::new(FindTasksTool::new(client.clone())));

    // Milestones
    registry.register(Arc::new(ListMilestonesTool::new(client)));

    tracing::info!("Registered {} tools", registry.list_schemas().len());

    let server = McpServer::new(registry);
    server.run().await
}
