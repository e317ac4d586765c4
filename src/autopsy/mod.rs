//! Autopsy report: archetype, bias scores and drift score from the profile
//! and recent twin conversations

use crate::app::App;
use crate::error::{Error, Result};
use crate::models::{
    AnalysisPayload, AnalysisType, Archetype, AutopsyReport, BiasScore, BIAS_CATEGORIES,
};
use serde_json::Value;
use tracing::{error, info};

const NO_SUMMARY: &str = "No prior analysis found.";

const AUTOPSY_SYSTEM_PROMPT: &str = r#"You are an expert psychoanalyst and data profiler.
Your goal is to perform a 'digital autopsy' on a user based on their social media consumption and chat interactions.

Output strictly valid JSON with the following structure:
{
    "archetype": {
        "name": "Title (e.g., The Passive Observer, The Outrage Merchant)",
        "description": "2-3 sentence ruthless but accurate description."
    },
    "biases": [
        {"name": "Narcissism", "score": 0-100},
        {"name": "Empathy", "score": 0-100},
        {"name": "Impulse", "score": 0-100},
        {"name": "Deception", "score": 0-100},
        {"name": "Validation", "score": 0-100},
        {"name": "Aggression", "score": 0-100}
    ],
    "drift_score": 0-100
}
drift_score is the gap between who the user thinks they are and who their data says they are."#;

fn fallback(name: &str, description: &str, error: String) -> AutopsyReport {
    AutopsyReport {
        archetype: Archetype {
            name: name.to_string(),
            description: description.to_string(),
        },
        biases: Vec::new(),
        drift_score: 0,
        error: Some(error),
    }
}

fn clamp_score(value: Option<&Value>) -> u8 {
    value
        .and_then(Value::as_f64)
        .map(|v| v.clamp(0.0, 100.0).round() as u8)
        .unwrap_or(0)
}

/// Shape a model reply into a report: known bias categories in fixed order,
/// missing ones scored 0, every score clamped to 0-100
fn parse_report(value: &Value) -> Result<AutopsyReport> {
    let archetype = value
        .get("archetype")
        .filter(|a| a.is_object())
        .ok_or_else(|| Error::Parse("Autopsy reply has no archetype".to_string()))?;
    let text = |key: &str| {
        archetype
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let reported = value
        .get("biases")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let biases = BIAS_CATEGORIES
        .iter()
        .map(|category| {
            let score = reported
                .iter()
                .find(|b| {
                    b.get("name")
                        .and_then(Value::as_str)
                        .is_some_and(|n| n.eq_ignore_ascii_case(category))
                })
                .and_then(|b| b.get("score"));
            BiasScore {
                name: category.to_string(),
                score: clamp_score(score),
            }
        })
        .collect();

    Ok(AutopsyReport {
        archetype: Archetype {
            name: text("name"),
            description: text("description"),
        },
        biases,
        drift_score: clamp_score(value.get("drift_score")),
        error: None,
    })
}

async fn resolve_job(app: &App, job_id: Option<&str>) -> Result<String> {
    match job_id {
        Some(id) => Ok(app
            .db
            .get_job(id)
            .await?
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?
            .id),
        None => latest_job_id(app).await,
    }
}

/// Id of the most recent analysis job
pub async fn latest_job_id(app: &App) -> Result<String> {
    Ok(app.db.latest_job().await?.ok_or(Error::NoAnalysis)?.id)
}

/// Generate a report for `job_id` (latest job when omitted).
///
/// Model failures produce a fallback report carrying `error` rather than an
/// `Err`; only successful reports are persisted.
pub async fn generate(app: &App, job_id: Option<&str>) -> Result<AutopsyReport> {
    let job_id = resolve_job(app, job_id).await?;

    let summary = match app
        .db
        .get_result(&job_id, AnalysisType::BehavioralSummary)
        .await?
    {
        Some(AnalysisPayload::BehavioralSummary(s)) => s.text,
        _ => NO_SUMMARY.to_string(),
    };

    let mut conversations = app
        .db
        .recent_conversations(app.config.chat.autopsy_history)
        .await?;
    conversations.reverse();
    let history = conversations
        .iter()
        .map(|c| format!("User: {}\nAvatar: {}", c.user_question, c.avatar_response))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "Here is the behavioral analysis of the user's content consumption:\n{}\n\n\
         Here are their recent interactions with their AI twin:\n{}\n\n\
         Generate the Autopsy Report now.",
        summary, history
    );

    let reply = match app
        .summarizer
        .complete_json(AUTOPSY_SYSTEM_PROMPT, &prompt)
        .await
    {
        Ok(Some(value)) => parse_report(&value),
        Ok(None) => {
            return Ok(fallback(
                "The Unknown",
                "Data insufficient.",
                "LLM Client not initialized".to_string(),
            ))
        }
        Err(e) => Err(e),
    };

    match reply {
        Ok(report) => {
            app.db
                .insert_result(&job_id, &AnalysisPayload::AutopsyReport(report.clone()))
                .await?;
            info!(
                "Autopsy report for job {}: {}",
                job_id, report.archetype.name
            );
            Ok(report)
        }
        Err(e) => {
            error!("Autopsy generation failed: {}", e);
            Ok(fallback(
                "The Glitch",
                "Analysis failed due to system error.",
                e.to_string(),
            ))
        }
    }
}

/// Most recently persisted report for a job
pub async fn latest(app: &App, job_id: &str) -> Result<AutopsyReport> {
    let rows = app.db.list_results(job_id).await?;
    let row = rows
        .iter()
        .rev()
        .find(|r| r.analysis_type == AnalysisType::AutopsyReport.as_str())
        .ok_or_else(|| Error::ReportNotFound(job_id.to_string()))?;

    match row.payload()? {
        AnalysisPayload::AutopsyReport(report) => Ok(report),
        _ => Err(Error::ReportNotFound(job_id.to_string())),
    }
}
