//! Tool definitions and handlers for the stdio server

use super::types::ToolDefinition;
use crate::app::App;
use crate::chat::Mode;
use crate::commands::{
    cmd_ask, cmd_autopsy_generate, cmd_autopsy_show, cmd_job, cmd_status, cmd_upload, cmd_voice,
};
use crate::error::{Error, Result};
use crate::pipeline::start_analysis;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

fn job_id_property() -> Value {
    json!({
        "type": "string",
        "description": "Analysis job ID (default: latest job)"
    })
}

fn mode_property() -> Value {
    json!({
        "type": "string",
        "enum": ["mirror", "devil"],
        "description": "Conversational stance (default: mirror)",
        "default": "mirror"
    })
}

/// Get all available tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "upload".to_string(),
            description: "Replace all stored history with a watch-history export (.zip). Existing posts, jobs and conversations are wiped first.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the .zip export on this machine"
                    }
                },
                "required": ["path"]
            }),
        },
        ToolDefinition {
            name: "analyze".to_string(),
            description: "Start the analysis pipeline in the background. Returns the job ID immediately; progress arrives as notifications/event messages.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDefinition {
            name: "analysis_status".to_string(),
            description: "Get the status and results of an analysis job.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "job_id": job_id_property()
                }
            }),
        },
        ToolDefinition {
            name: "ask".to_string(),
            description: "Ask the AI twin a question, answered with context from the user's own history.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "The question or statement for the twin"
                    },
                    "job_id": job_id_property(),
                    "mode": mode_property()
                },
                "required": ["question"]
            }),
        },
        ToolDefinition {
            name: "voice".to_string(),
            description: "Transcribe an audio question, answer it, and synthesize the reply.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "audio_path": {
                        "type": "string",
                        "description": "Path to the recorded audio file"
                    },
                    "job_id": job_id_property(),
                    "mode": mode_property()
                },
                "required": ["audio_path"]
            }),
        },
        ToolDefinition {
            name: "autopsy_generate".to_string(),
            description: "Generate the psychological autopsy report (archetype, bias scores, drift score).".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "job_id": job_id_property()
                }
            }),
        },
        ToolDefinition {
            name: "autopsy_get".to_string(),
            description: "Fetch the most recently generated autopsy report for a job.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "job_id": job_id_property()
                }
            }),
        },
        ToolDefinition {
            name: "status".to_string(),
            description: "Get service health, store counts and the latest job.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
    ]
}

fn required_str<'a>(arguments: &'a HashMap<String, Value>, key: &str) -> Result<&'a str> {
    match arguments.get(key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        _ => Err(Error::Validation(format!(
            "Missing required parameter: {}",
            key
        ))),
    }
}

fn optional_str<'a>(arguments: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    arguments.get(key).and_then(Value::as_str)
}

fn mode_arg(arguments: &HashMap<String, Value>) -> Mode {
    optional_str(arguments, "mode")
        .map(Mode::parse_lenient)
        .unwrap_or_default()
}

/// Handle a tool call, returning the JSON body of a successful result
pub async fn handle_tool_call(
    name: &str,
    arguments: &HashMap<String, Value>,
    app: &Arc<App>,
) -> Result<Value> {
    match name {
        "upload" => {
            let path = PathBuf::from(required_str(arguments, "path")?);
            Ok(serde_json::to_value(cmd_upload(app, &path).await?)?)
        }
        "analyze" => {
            let handle = start_analysis(app.clone()).await?;
            info!("Analysis job {} started from tool call", handle.job_id);
            Ok(json!({
                "job_id": handle.job_id,
                "status": "pending",
                "message": "Analysis started"
            }))
        }
        "analysis_status" => {
            let report = cmd_job(app, optional_str(arguments, "job_id")).await?;
            Ok(serde_json::to_value(report)?)
        }
        "ask" => {
            let question = required_str(arguments, "question")?;
            let reply = cmd_ask(
                app,
                question,
                optional_str(arguments, "job_id"),
                mode_arg(arguments),
            )
            .await?;
            Ok(serde_json::to_value(reply)?)
        }
        "voice" => {
            let audio_path = PathBuf::from(required_str(arguments, "audio_path")?);
            let reply = cmd_voice(
                app,
                &audio_path,
                optional_str(arguments, "job_id"),
                mode_arg(arguments),
            )
            .await?;
            Ok(serde_json::to_value(reply)?)
        }
        "autopsy_generate" => {
            let report = cmd_autopsy_generate(app, optional_str(arguments, "job_id")).await?;
            Ok(serde_json::to_value(report)?)
        }
        "autopsy_get" => {
            let report = cmd_autopsy_show(app, optional_str(arguments, "job_id")).await?;
            Ok(serde_json::to_value(report)?)
        }
        "status" => Ok(serde_json::to_value(cmd_status(app).await?)?),
        _ => Err(Error::Validation(format!("Unknown tool: {}", name))),
    }
}
