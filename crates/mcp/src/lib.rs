// MCP (Model Context Protocol) server for the Kuaidi100 courier API
// Exposes trace, delivery-time and price estimation as tools to agent clients

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpServer;
