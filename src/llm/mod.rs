//! LLM access: chat-completion backends and the summarizer built on them

mod openai;

pub use openai::*;

use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

pub const DEFAULT_ANALYST_PROMPT: &str = "You are a helpful AI analyst.";
pub const MISSING_KEY_REPLY: &str = "Analysis unavailable: LLM API key missing.";
const PERSONA_CREATOR_PROMPT: &str = "You are an expert character creator.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub prompt: String,
    /// Ask the provider for a JSON object response
    pub json_mode: bool,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            json_mode: false,
        }
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: Role::System,
                content: self.system.clone(),
            },
            ChatMessage {
                role: Role::User,
                content: self.prompt.clone(),
            },
        ]
    }
}

/// Chat-completion provider
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// Build the configured chat model; `None` when no API key is set
pub fn create_chat_model(config: &Config) -> Result<Option<Arc<dyn ChatModel>>> {
    match config.llm_api_key() {
        Some(key) => Ok(Some(Arc::new(OpenAiCompatible::new(&config.llm, key)?))),
        None => {
            warn!(
                "{} is not set; LLM features will return placeholder text",
                config.llm.api_key_env
            );
            Ok(None)
        }
    }
}

/// Summaries and personas over an optional chat model
///
/// Upstream failures never escape as errors from the text helpers: they come
/// back as a reply starting with `Error`, which callers may detect.
#[derive(Clone)]
pub struct Summarizer {
    model: Option<Arc<dyn ChatModel>>,
}

impl Summarizer {
    pub fn new(model: Option<Arc<dyn ChatModel>>) -> Self {
        Self { model }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.model_name())
    }

    /// Free-text completion; `system` defaults to the analyst prompt
    pub async fn generate_summary(&self, prompt: &str, system: Option<&str>) -> String {
        let Some(model) = &self.model else {
            warn!("LLM client not initialized (missing key); returning placeholder");
            return MISSING_KEY_REPLY.to_string();
        };

        let request = ChatRequest::new(system.unwrap_or(DEFAULT_ANALYST_PROMPT), prompt);
        match model.complete(request).await {
            Ok(text) => text,
            Err(e) => {
                error!("LLM API error: {}", e);
                format!("Error generating summary: {}", e)
            }
        }
    }

    /// System prompt for the user's twin, derived from a behavioral summary
    pub async fn generate_avatar_persona(&self, user_summary: &str) -> String {
        let prompt = format!(
            "Based on the following user analysis, define a persona for the specific \"AI Twin\" of this user.\n\
             The twin should mirror the user's documented anxieties, interests, and patterns.\n\n\
             User Analysis:\n{}\n\n\
             Output a system prompt description for this Avatar.",
            user_summary
        );
        self.generate_summary(&prompt, Some(PERSONA_CREATOR_PROMPT))
            .await
    }

    /// JSON-mode completion; `Ok(None)` when no model is configured
    pub async fn complete_json(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<Option<serde_json::Value>> {
        let Some(model) = &self.model else {
            return Ok(None);
        };
        let text = model.complete(ChatRequest::new(system, prompt).json()).await?;
        Ok(Some(serde_json::from_str(&text)?))
    }
}
