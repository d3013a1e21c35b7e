// MCP (Model Context Protocol) server exposing the Capsule CRM API as tools

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpServer;
