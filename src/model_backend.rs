//! HTTP client for the local model sidecar (embeddings and text classification)

use crate::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize)]
struct EmbedTextRequest {
    model: String,
    inputs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ClassifyRequest {
    inputs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum EmbeddingResponse {
    Embeddings { embeddings: Vec<Vec<f32>> },
    Vectors { vectors: Vec<Vec<f32>> },
    Data { data: Vec<EmbeddingData> },
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    fn into_embeddings(self) -> Vec<Vec<f32>> {
        match self {
            EmbeddingResponse::Embeddings { embeddings } => embeddings,
            EmbeddingResponse::Vectors { vectors } => vectors,
            EmbeddingResponse::Data { data } => data.into_iter().map(|d| d.embedding).collect(),
        }
    }
}

/// One classifier verdict, e.g. `{"label": "POSITIVE", "score": 0.98}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Results { results: Vec<Classification> },
    Bare(Vec<Classification>),
}

pub struct ModelBackendClient {
    client: Client,
    base_url: Url,
    retries: usize,
}

impl ModelBackendClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let timeout = Duration::from_secs(30);
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            retries: 2,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid model backend URL: {}", e)))
    }

    async fn send_with_retry<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let mut last_err: Option<Error> = None;
        for attempt in 0..=self.retries {
            let req = request
                .try_clone()
                .ok_or_else(|| Error::Embedding("Failed to clone backend request".to_string()))?;
            match req.send().await {
                Ok(response) => match response.error_for_status() {
                    Ok(ok) => return Ok(ok.json::<T>().await?),
                    Err(e) => last_err = Some(Error::Embedding(e.to_string())),
                },
                Err(e) => last_err = Some(Error::Embedding(e.to_string())),
            }

            if attempt < self.retries {
                tokio::time::sleep(Duration::from_millis(200 * (attempt + 1) as u64)).await;
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::Embedding("Model backend request failed".to_string())))
    }

    /// Whether the sidecar answers its health probe
    pub async fn health(&self) -> bool {
        let Ok(url) = self.endpoint("/health") else {
            return false;
        };
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    pub async fn embed_text(&self, model: &str, inputs: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let url = self.endpoint("/v1/embed/text")?;
        let request = EmbedTextRequest {
            model: model.to_string(),
            inputs,
        };
        let parsed: EmbeddingResponse = self
            .send_with_retry(self.client.post(url).json(&request))
            .await?;
        Ok(parsed.into_embeddings())
    }

    pub async fn classify(&self, inputs: Vec<String>) -> Result<Vec<Classification>> {
        let url = self.endpoint("/v1/classify")?;
        let request = ClassifyRequest { inputs };
        let parsed: ClassifyResponse = self
            .send_with_retry(self.client.post(url).json(&request))
            .await?;
        Ok(match parsed {
            ClassifyResponse::Results { results } => results,
            ClassifyResponse::Bare(results) => results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_embed_text_accepts_data_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embed/text"))
            .and(body_json(json!({"model": "m", "inputs": ["a"]})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [{"embedding": [0.1, 0.2]}]})),
            )
            .mount(&server)
            .await;

        let client = ModelBackendClient::new(&server.uri()).unwrap();
        let vectors = client.embed_text("m", vec!["a".to_string()]).await.unwrap();
        assert_eq!(vectors, vec![vec![0.1, 0.2]]);
    }

    #[tokio::test]
    async fn test_retries_then_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/classify"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let client = ModelBackendClient::new(&server.uri()).unwrap();
        assert!(client.classify(vec!["x".to_string()]).await.is_err());
    }

    #[tokio::test]
    async fn test_classify_bare_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/classify"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"label": "POSITIVE", "score": 0.9}])),
            )
            .mount(&server)
            .await;

        let client = ModelBackendClient::new(&server.uri()).unwrap();
        let results = client.classify(vec!["great".to_string()]).await.unwrap();
        assert_eq!(results[0].label, "POSITIVE");
    }

    #[tokio::test]
    async fn test_health_unreachable() {
        let client = ModelBackendClient::new("http://127.0.0.1:9").unwrap();
        assert!(!client.health().await);
    }
}
