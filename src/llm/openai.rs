//! OpenAI-compatible chat completions (Groq, OpenAI, local servers)

use super::{ChatMessage, ChatModel, ChatRequest};
use crate::config::LlmConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiCompatible {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiCompatible {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatible {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let body = CompletionRequest {
            model: &self.model,
            messages: request.messages(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        debug!(model = %self.model, json = request.json_mode, "Sending chat completion");

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Llm(format!("API returned {}: {}", status, text)));
        }

        let data: CompletionResponse = resp.json().await?;
        data.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Llm("Completion contained no message content".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String) -> LlmConfig {
        LlmConfig {
            base_url,
            model: "llama-test".to_string(),
            api_key_env: "UNUSED".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_completion_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({
                "model": "llama-test",
                "max_tokens": 500,
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "hello"}}]
            })))
            .mount(&server)
            .await;

        let model = OpenAiCompatible::new(&config(server.uri()), "secret".to_string()).unwrap();
        let reply = model.complete(ChatRequest::new("sys", "hi")).await.unwrap();
        assert_eq!(reply, "hello");
    }

    #[tokio::test]
    async fn test_json_mode_sets_response_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"response_format": {"type": "json_object"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "{}"}}]
            })))
            .mount(&server)
            .await;

        let model = OpenAiCompatible::new(&config(server.uri()), "k".to_string()).unwrap();
        let reply = model
            .complete(ChatRequest::new("s", "p").json())
            .await
            .unwrap();
        assert_eq!(reply, "{}");
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let model = OpenAiCompatible::new(&config(server.uri()), "k".to_string()).unwrap();
        let err = model.complete(ChatRequest::new("s", "p")).await.unwrap_err();
        assert!(matches!(err, Error::Llm(msg) if msg.contains("429")));
    }
}
