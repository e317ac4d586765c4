//! Line-delimited JSON-RPC server over stdio
//!
//! Requests and responses share stdout with pushed `notifications/event`
//! messages, one JSON document per line.

use super::tools::{get_tool_definitions, handle_tool_call};
use super::types::{CallToolParams, McpError, McpMessage, McpNotification, McpRequest, McpResponse, ToolResult};
use crate::app::App;
use crate::error::{Error, Result};
use crate::events::Event;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

const EVENT_METHOD: &str = "notifications/event";

pub struct McpServer {
    app: Arc<App>,
}

/// Map a domain error to its wire form; caller mistakes become invalid params
fn to_rpc_error(err: &Error) -> McpError {
    if err.is_client_error() {
        McpError::invalid_params(err.to_string())
    } else if err.is_database_error() {
        error!("Database error while handling request: {}", err);
        McpError::internal_error("database error")
    } else {
        McpError::internal_error(err.to_string())
    }
}

fn event_notification(event: &Event) -> Result<String> {
    let notification = McpNotification::new(EVENT_METHOD, serde_json::to_value(event)?);
    Ok(serde_json::to_string(&notification)?)
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

impl McpServer {
    pub fn new(app: Arc<App>) -> Self {
        Self { app }
    }

    /// Serve on the process's stdin and stdout until stdin closes
    pub async fn run(&self) -> Result<()> {
        info!("JSON-RPC server starting on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await?;
        info!("JSON-RPC server shutting down");
        Ok(())
    }

    /// Serve one request stream, interleaving pushed events with responses
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut events = self.app.events.subscribe();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if let Some(reply) = self.handle_line(&line).await {
                        debug!("Sending: {}", reply);
                        write_line(&mut writer, &reply).await?;
                    }
                }
                Some(event) = events.recv() => {
                    write_line(&mut writer, &event_notification(&event)?).await?;
                }
            }
        }

        while let Some(event) = events.try_recv() {
            write_line(&mut writer, &event_notification(&event)?).await?;
        }
        if events.missed() > 0 {
            warn!("{} events were dropped for this client", events.missed());
        }
        Ok(())
    }

    /// Handle one input line; `None` when nothing should be written back
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        debug!("Received: {}", line);

        let response = match serde_json::from_str::<McpMessage>(line) {
            Ok(McpMessage::Request(req)) => self.handle_request(req).await,
            Ok(McpMessage::Notification(notif)) => {
                match notif.method.as_str() {
                    "notifications/initialized" => info!("Client initialized"),
                    "notifications/cancelled" => info!("Request cancelled"),
                    other => debug!("Unknown notification: {}", other),
                }
                return None;
            }
            Ok(McpMessage::Response(_)) => {
                warn!("Unexpected response message received");
                return None;
            }
            Err(e) => {
                error!("Failed to parse message: {}", e);
                McpResponse::error(None, McpError::parse_error(format!("Parse error: {}", e)))
            }
        };

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                None
            }
        }
    }

    async fn handle_request(&self, request: McpRequest) -> McpResponse {
        let id = request.id.clone();
        if request.jsonrpc != "2.0" {
            return McpResponse::error(id, McpError::invalid_request("jsonrpc must be \"2.0\""));
        }

        match request.method.as_str() {
            "initialize" => McpResponse::success(
                id,
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {
                        "tools": { "listChanged": false }
                    },
                    "serverInfo": {
                        "name": "alterego",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            ),
            "tools/list" => McpResponse::success(id, json!({ "tools": get_tool_definitions() })),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "ping" => McpResponse::success(id, json!({})),
            other => McpResponse::error(id, McpError::method_not_found(other)),
        }
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> McpResponse {
        let Some(params) = params else {
            return McpResponse::error(id, McpError::invalid_params("Missing params"));
        };
        let params: CallToolParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return McpResponse::error(
                    id,
                    McpError::invalid_params(format!("Invalid tool call: {}", e)),
                )
            }
        };

        debug!("Calling tool: {} with args: {:?}", params.name, params.arguments);

        match handle_tool_call(&params.name, &params.arguments, &self.app).await {
            Ok(value) => McpResponse::success(id, json!(ToolResult::json(&value))),
            Err(e) => {
                warn!("Tool {} failed: {}", params.name, e);
                McpResponse::error(id, to_rpc_error(&e))
            }
        }
    }
}
