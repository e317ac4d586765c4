//! Context assembly for conversational answers
//!
//! The context is built from up to three sections, always in this order:
//! persona, behavioral summary, evidence. Missing sections are left out.

use crate::app::App;
use crate::error::Result;
use crate::models::{AnalysisPayload, AnalysisType};
use crate::store::SearchHit;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceMetadata {
    pub title: String,
    pub channel: String,
    pub date: String,
}

/// A retrieved post grounding an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub post_id: String,
    pub score: f32,
    pub metadata: EvidenceMetadata,
}

impl From<SearchHit> for EvidenceItem {
    fn from(hit: SearchHit) -> Self {
        Self {
            post_id: hit.payload.post_id,
            score: hit.score,
            metadata: EvidenceMetadata {
                title: hit.payload.title,
                channel: hit.payload.channel,
                date: hit.payload.date,
            },
        }
    }
}

/// Assembled prompt context plus the evidence it cites
#[derive(Debug, Clone, Default)]
pub struct BuiltContext {
    pub text: String,
    pub evidence: Vec<EvidenceItem>,
}

pub struct ContextBuilder<'a> {
    app: &'a App,
    top_k: usize,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(app: &'a App) -> Self {
        Self {
            app,
            top_k: app.config.chat.top_k,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub async fn build(&self, job_id: &str, question: &str) -> Result<BuiltContext> {
        let persona = match self
            .app
            .db
            .get_result(job_id, AnalysisType::AvatarPersona)
            .await?
        {
            Some(AnalysisPayload::AvatarPersona(p)) => Some(p.system_prompt),
            _ => None,
        };
        let summary = match self
            .app
            .db
            .get_result(job_id, AnalysisType::BehavioralSummary)
            .await?
        {
            Some(AnalysisPayload::BehavioralSummary(s)) => Some(s.text),
            _ => None,
        };

        let evidence = self.search_relevant_posts(question).await;
        let text = assemble(persona.as_deref(), summary.as_deref(), &evidence);

        Ok(BuiltContext { text, evidence })
    }

    /// Nearest posts to the question; upstream failures yield no evidence
    pub async fn search_relevant_posts(&self, question: &str) -> Vec<EvidenceItem> {
        let vector = match self.app.embedder.embed(vec![question.to_string()]).await {
            Ok(mut vectors) if !vectors.is_empty() => vectors.swap_remove(0),
            Ok(_) => {
                error!("Embedder returned no vector for the question");
                return Vec::new();
            }
            Err(e) => {
                error!("Failed to embed question: {}", e);
                return Vec::new();
            }
        };

        match self.app.index.search(vector, self.top_k).await {
            Ok(hits) => {
                debug!("Retrieved {} evidence items", hits.len());
                hits.into_iter().map(EvidenceItem::from).collect()
            }
            Err(e) => {
                error!("Vector search failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Join the present sections with blank lines
pub fn assemble(persona: Option<&str>, summary: Option<&str>, evidence: &[EvidenceItem]) -> String {
    let mut sections = Vec::new();

    if let Some(p) = persona.filter(|p| !p.is_empty()) {
        sections.push(format!("SYSTEM INSTRUCTION (YOUR PERSONA):\n{}", p));
    }
    if let Some(s) = summary.filter(|s| !s.is_empty()) {
        sections.push(format!("USER BEHAVIORAL SUMMARY:\n{}", s));
    }
    if !evidence.is_empty() {
        let lines: Vec<String> = evidence
            .iter()
            .map(|e| {
                format!(
                    "- '{}' by {} (Date: {})",
                    e.metadata.title, e.metadata.channel, e.metadata.date
                )
            })
            .collect();
        sections.push(format!(
            "RELEVANT WATCH HISTORY (Use as evidence):\n{}",
            lines.join("\n")
        ));
    }

    sections.join("\n\n")
}
