// MCP server: JSON-RPC 2.0 over stdio, newline-delimited

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::protocol::{
    CallToolParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, ServerCapabilities, ServerInfo, ToolsCapability,
};
use crate::tools::ToolRegistry;

/// MCP server that communicates over stdio. Tool calls are independent and
/// hold no shared mutable state beyond the registry, which is read-only
/// after startup.
pub struct McpServer {
    registry: ToolRegistry,
    initialized: bool,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            initialized: false,
        }
    }

    /// Run the server, reading requests from stdin and writing responses to
    /// stdout. Logging goes to stderr; stdout belongs to the protocol.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                info!("Client disconnected");
                break;
            }

            let message = line.trim();
            if message.is_empty() {
                continue;
            }

            debug!("Received: {}", message);

            if let Some(response) = self.handle_message(message).await {
                let serialized = serde_json::to_string(&response)?;
                debug!("Sending: {}", serialized);
                stdout.write_all(serialized.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle a single JSON-RPC message. Notifications produce no response.
    async fn handle_message(&mut self, message: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(err) => {
                error!("Failed to parse request: {}", err);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    JsonRpcError::parse_error(format!("Parse error: {}", err)),
                ));
            }
        };

        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };

        match self.handle_request(&request.method, request.params).await {
            Ok(result) => Some(JsonRpcResponse::success(id, result)),
            Err(err) => Some(JsonRpcResponse::error(id, err)),
        }
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" => {
                info!("Client initialized");
                self.initialized = true;
            }
            "notifications/cancelled" => {
                debug!("Request cancelled");
            }
            other => {
                debug!("Unknown notification: {}", other);
            }
        }
    }

    async fn handle_request(
        &mut self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, JsonRpcError> {
        match method {
            "initialize" => self.handle_initialize(),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(params).await,
            "ping" => Ok(serde_json::json!({})),
            other => {
                warn!("Unknown method: {}", other);
                Err(JsonRpcError::method_not_found(other))
            }
        }
    }

    fn handle_initialize(&mut self) -> Result<Value, JsonRpcError> {
        info!("Initializing MCP server");

        let result = InitializeResult {
            protocol_version: "2024-11-05".to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "capsule-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        serde_json::to_value(result)
            .map_err(|err| JsonRpcError::internal_error(format!("Serialization error: {}", err)))
    }

    fn handle_list_tools(&self) -> Result<Value, JsonRpcError> {
        let result = ListToolsResult {
            tools: self.registry.list_schemas(),
        };

        serde_json::to_value(result)
            .map_err(|err| JsonRpcError::internal_error(format!("Serialization error: {}", err)))
    }

    async fn handle_call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = match params {
            Some(params) => serde_json::from_value(params)
                .map_err(|err| JsonRpcError::invalid_params(format!("Invalid params: {}", err)))?,
            None => return Err(JsonRpcError::invalid_params("Missing params")),
        };

        let Some(tool) = self.registry.get(&params.name) else {
            return Err(JsonRpcError::invalid_params(format!(
                "Unknown tool: {}",
                params.name
            )));
        };

        info!("Calling tool: {}", params.name);
        let arguments = params.arguments.unwrap_or_else(|| serde_json::json!({}));

        // Tool failures (including remote API errors) are reported as tool
        // results with is_error set, not as JSON-RPC errors.
        let result = match tool.execute(arguments).await {
            Ok(result) => result,
            Err(err) => {
                error!("Tool {} failed: {:#}", params.name, err);
                crate::protocol::CallToolResult {
                    content: vec![crate::protocol::ToolContent::error(format!("{:#}", err))],
                    is_error: Some(true),
                }
            }
        };

        serde_json::to_value(result)
            .map_err(|err| JsonRpcError::internal_error(format!("Serialization error: {}", err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CallToolResult, ToolContent, ToolSchema};
    use crate::tools::{json_schema_object, Tool};
    use std::sync::Arc;

    struct EchoTool;

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".to_string(),
                description: "Echo the arguments back".to_string(),
                input_schema: json_schema_object(serde_json::json!({}), vec![]),
            }
        }

        async fn execute(&self, arguments: Value) -> anyhow::Result<CallToolResult> {
            Ok(CallToolResult {
                content: vec![ToolContent::text(arguments.to_string())],
                is_error: None,
            })
        }
    }

    fn server() -> McpServer {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        McpServer::new(registry)
    }

    #[tokio::test]
    async fn initialize_reports_tool_capability() {
        let mut server = server();
        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#)
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "capsule-mcp");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn tools_list_contains_registered_tools() {
        let mut server = server();
        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .unwrap();

        let result = response.result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "echo");
    }

    #[tokio::test]
    async fn tools_call_dispatches_to_tool() {
        let mut server = server();
        let response = server
            .handle_message(
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"echo","arguments":{"x":1}}}"#,
            )
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["content"][0]["text"], r#"{"x":1}"#);
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let mut server = server();
        let response = server
            .handle_message(
                r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"nope"}}"#,
            )
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let mut server = server();
        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","id":5,"method":"frobnicate"}"#)
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let mut server = server();
        let response = server.handle_message("{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, -32700);
    }

    #[tokio::test]
    async fn notifications_produce_no_response() {
        let mut server = server();
        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }
}
