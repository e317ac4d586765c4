//! Status command implementation

use crate::app::App;
use crate::error::Result;
use crate::meta::GlobalStats;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Status information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub db_path: String,
    pub qdrant_url: String,
    pub collection_name: String,
    pub embedding_model: String,
    pub llm_model: Option<String>,
    pub qdrant_connected: bool,
    pub qdrant_points: usize,
    pub speech_to_text: bool,
    pub text_to_speech: bool,
    pub latest_job: Option<String>,
    pub latest_job_status: Option<String>,
    pub db_stats: GlobalStats,
}

/// Get system status
pub async fn cmd_status(app: &App) -> Result<StatusInfo> {
    info!("Getting status");

    let db_stats = app.db.get_global_stats().await?;
    let latest = app.db.latest_job().await?;

    let (qdrant_connected, qdrant_points) = match app.index.stats().await {
        Ok(Some(stats)) => (true, stats.points_count),
        Ok(None) => (true, 0),
        Err(e) => {
            debug!("Qdrant connection error: {:?}", e);
            (false, 0)
        }
    };

    let config = &app.config;
    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        db_path: config.paths.db_file.display().to_string(),
        qdrant_url: config.qdrant_url.clone(),
        collection_name: config.collection_name.clone(),
        embedding_model: app.embedder.model_name().to_string(),
        llm_model: app.summarizer.model_name().map(String::from),
        qdrant_connected,
        qdrant_points,
        speech_to_text: app.transcriber.is_some(),
        text_to_speech: app.synthesizer.is_some(),
        latest_job: latest.as_ref().map(|j| j.id.clone()),
        latest_job_status: latest.map(|j| j.status),
        db_stats,
    })
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 alterego Status\n");
    println!("Configuration: {}", status.config_path);
    println!("Database: {}", status.db_path);
    println!("\nQdrant:");
    println!("  URL: {}", status.qdrant_url);
    println!("  Collection: {}", status.collection_name);
    let connection_status = if status.qdrant_connected {
        "✓ Connected"
    } else {
        "✗ Not connected"
    };
    println!("  Status: {}", connection_status);
    println!("  Points: {}", status.qdrant_points);

    println!("\nModels:");
    println!("  Embedding: {}", status.embedding_model);
    match &status.llm_model {
        Some(model) => println!("  LLM: {}", model),
        None => println!("  LLM: ⚠ not configured (set LLM_API_KEY)"),
    }
    println!(
        "  Voice: stt {}, tts {}",
        if status.speech_to_text { "✓" } else { "✗" },
        if status.text_to_speech { "✓" } else { "✗" }
    );

    println!("\nDatabase Stats:");
    println!("  Uploads: {}", status.db_stats.upload_count);
    println!("  Posts: {}", status.db_stats.post_count);
    println!("  Analysis jobs: {}", status.db_stats.job_count);
    println!("  Conversations: {}", status.db_stats.conversation_count);

    if let (Some(id), Some(job_status)) = (&status.latest_job, &status.latest_job_status) {
        println!("\nLatest job: {} ({})", id, job_status);
    }
}
