//! JSON-RPC stdio server
//!
//! Exposes upload, analysis, chat and report operations as tools, and pushes
//! progress events to the connected client.

mod server;
mod tools;
mod types;

pub use server::McpServer;
pub use types::{McpError, McpRequest, McpResponse};
