//! Conversation orchestration: prompt selection, fallback replies, persistence

use crate::app::App;
use crate::error::{Error, Result};
use crate::meta::Conversation;
use crate::models::{AnalysisPayload, AnalysisType};
use crate::retrieval::{ContextBuilder, EvidenceItem};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

const MIRROR_CONSTRAINTS: &str = "CURRENT CONTEXT: You are in a video call with your real-world self.\n\
CONSTRAINTS:\n\
1. Speak in the first person ('I').\n\
2. Be extremely concise (1-2 sentences max).\n\
3. Do not monologue or lecture.\n\
4. React naturally to the user's input based on your shared history.";

const GENERIC_TWIN_PROMPT: &str = "You are the user's digital twin in a casual video call. \
Speak in the first person. Be extremely concise (1-2 sentences max). Do not monologue or lecture. \
Do not over-explain your interests unless specifically asked. \
Act like a real person having a quick chat, not an encyclopedia.";

const DEVIL_PROMPT: &str = "You are operating in DEVIL'S ADVOCATE MODE.\n\
The role is to challenge the user's interpretation of their digital identity.\n\
Communication style: Direct, sharp, analytical, contrasting.\n\
Do NOT be polite. Do NOT agree. Challenge the premise.";

pub const FALLBACK_REPLIES: [&str; 3] = [
    "I'm feeling a bit disconnected from the cloud right now (API Quota Exceeded), but I can tell you that your watch history shows a strong interest in learning and tech!",
    "My brain is offline (LLM Error), but based on your recent videos, you seem to be really into self-improvement.",
    "I can't access my advanced language model at the moment, but your data is safely stored. Try again later!",
];

/// Conversational stance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Mirror,
    Devil,
}

impl Mode {
    /// Unknown tags fall back to mirror
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "devil" => Mode::Devil,
            "mirror" => Mode::Mirror,
            other => {
                warn!("Unknown mode '{}', using mirror", other);
                Mode::Mirror
            }
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Mirror => write!(f, "mirror"),
            Mode::Devil => write!(f, "devil"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub avatar_response: String,
    pub context_used: Vec<EvidenceItem>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

pub struct Orchestrator<'a> {
    app: &'a App,
}

impl<'a> Orchestrator<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }

    async fn mirror_system_prompt(&self, job_id: &str) -> Result<String> {
        let persona = self
            .app
            .db
            .get_result(job_id, AnalysisType::AvatarPersona)
            .await?;
        Ok(match persona {
            Some(AnalysisPayload::AvatarPersona(p)) if !p.system_prompt.is_empty() => {
                format!("{}\n\n{}", p.system_prompt, MIRROR_CONSTRAINTS)
            }
            _ => GENERIC_TWIN_PROMPT.to_string(),
        })
    }

    /// Answer one question and append the exchange to the conversation log
    pub async fn respond(&self, job_id: &str, question: &str, mode: Mode) -> Result<ChatReply> {
        let context = ContextBuilder::new(self.app).build(job_id, question).await?;

        info!(mode = %mode, evidence = context.evidence.len(), "Processing chat request");

        let (system_prompt, prompt) = match mode {
            Mode::Devil => (
                DEVIL_PROMPT.to_string(),
                format!(
                    "CONTEXT:\n{}\n\nUSER STATEMENT: {}\n\n\
                     TASK: Play Devil's Advocate. Challenge this statement. \
                     Expose hidden downsides, contradictions, or self-deception. \
                     CRITICAL CONSTRAINT: Answer in exactly 3 lines or less. Be sharp, ruthless, and brief.",
                    context.text, question
                ),
            ),
            Mode::Mirror => (
                self.mirror_system_prompt(job_id).await?,
                format!(
                    "CONTEXT:\n{}\n\nUSER QUESTION: {}\n\nRespond as the AI Avatar.",
                    context.text, question
                ),
            ),
        };

        let reply = self
            .app
            .summarizer
            .generate_summary(&prompt, Some(&system_prompt))
            .await;

        let avatar_response = if reply.starts_with("Error") {
            warn!("Using fallback reply due to API error: {}", reply);
            random_fallback().to_string()
        } else {
            reply
        };

        let context_ids: Vec<String> = context.evidence.iter().map(|e| e.post_id.clone()).collect();
        self.app
            .db
            .insert_conversation(&Conversation::new(
                question.to_string(),
                avatar_response.clone(),
                &context_ids,
            ))
            .await?;

        Ok(ChatReply {
            avatar_response,
            context_used: context.evidence,
            confidence: 1.0,
            audio_url: None,
        })
    }
}

fn random_fallback() -> &'static str {
    let idx = rand::rng().random_range(0..FALLBACK_REPLIES.len());
    FALLBACK_REPLIES[idx]
}

/// Resolve the target job (latest when omitted) and answer
pub async fn ask(app: &App, question: &str, job_id: Option<&str>, mode: Mode) -> Result<ChatReply> {
    if question.trim().is_empty() {
        return Err(Error::Validation("Question must not be empty".to_string()));
    }

    let job_id = match job_id {
        Some(id) => app
            .db
            .get_job(id)
            .await?
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?
            .id,
        None => app.db.latest_job().await?.ok_or(Error::NoAnalysis)?.id,
    };

    Orchestrator::new(app).respond(&job_id, question, mode).await
}
