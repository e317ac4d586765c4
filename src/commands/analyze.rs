//! Analyze and job-status commands

use crate::app::App;
use crate::error::{Error, Result};
use crate::meta::AnalysisJob;
use crate::pipeline::start_analysis;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    pub name: String,
    pub keywords: Vec<String>,
    pub post_count: i64,
}

/// A job with its persisted results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: String,
    pub job_type: String,
    pub status: String,
    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub error_message: Option<String>,
    pub results: BTreeMap<String, Value>,
    pub topics: Vec<TopicSummary>,
}

/// Run a full analysis and wait for it to finish
pub async fn cmd_analyze(app: Arc<App>) -> Result<JobReport> {
    let handle = start_analysis(app.clone()).await?;
    let job_id = handle.job_id.clone();
    info!("Waiting for analysis job {}", job_id);
    handle.wait().await?;
    cmd_job(&app, Some(&job_id)).await
}

/// Status and results of a job (latest when `job_id` is omitted)
pub async fn cmd_job(app: &App, job_id: Option<&str>) -> Result<JobReport> {
    let job = match job_id {
        Some(id) => app
            .db
            .get_job(id)
            .await?
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?,
        None => app.db.latest_job().await?.ok_or(Error::NoAnalysis)?,
    };
    job_report(app, job).await
}

async fn job_report(app: &App, job: AnalysisJob) -> Result<JobReport> {
    let mut results = BTreeMap::new();
    for row in app.db.list_results(&job.id).await? {
        let value = row.payload()?.to_value()?;
        results.entry(row.analysis_type).or_insert(value);
    }

    let topics = app
        .db
        .list_topics(&job.id)
        .await?
        .into_iter()
        .map(|t| TopicSummary {
            keywords: t.keywords(),
            name: t.topic_name,
            post_count: t.post_count,
        })
        .collect();

    Ok(JobReport {
        job_id: job.id,
        job_type: job.job_type,
        status: job.status,
        created_at: job.created_at,
        started_at: job.started_at,
        completed_at: job.completed_at,
        error_message: job.error_message,
        results,
        topics,
    })
}

pub fn print_job_report(report: &JobReport) {
    let icon = match report.status.as_str() {
        "completed" => "✓",
        "failed" => "✗",
        _ => "…",
    };
    println!("\n{} Analysis job {} [{}]", icon, report.job_id, report.status);
    println!("  Created: {}", report.created_at);
    if let Some(done) = &report.completed_at {
        println!("  Finished: {}", done);
    }
    if let Some(err) = &report.error_message {
        println!("  Error: {}", err);
    }

    if let Some(sentiment) = report.results.get("sentiment_summary") {
        let ratio = sentiment["positive_ratio"].as_f64().unwrap_or(0.0);
        println!("\n😊 Positive content: {:.0}%", ratio * 100.0);
    }

    if !report.topics.is_empty() {
        println!("\n🗂  Topics");
        for topic in &report.topics {
            println!(
                "  • {} ({} posts): {}",
                topic.name,
                topic.post_count,
                topic.keywords.join(", ")
            );
        }
    }

    if let Some(text) = report
        .results
        .get("behavioral_summary")
        .and_then(|v| v["text"].as_str())
    {
        println!("\n🧠 Behavioral summary\n{}", text);
    }

    if let Some(prompt) = report
        .results
        .get("avatar_persona")
        .and_then(|v| v["system_prompt"].as_str())
    {
        println!("\n🪞 Twin persona\n{}", prompt);
    }
}
