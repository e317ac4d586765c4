use super::Embedder;
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use crate::model_backend::ModelBackendClient;
use async_trait::async_trait;

/// Embedder backed by the model sidecar's `/v1/embed/text`
pub struct HttpEmbedder {
    client: ModelBackendClient,
    model_id: String,
    dimension: usize,
}

impl HttpEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = ModelBackendClient::new(&config.backend_url)?;
        Ok(Self {
            client,
            model_id: config.model.clone(),
            dimension: config.resolved_dimension(),
        })
    }

    fn validate_dimensions(&self, embeddings: &[Vec<f32>]) -> Result<()> {
        if let Some(mismatch) = embeddings.iter().find(|vec| vec.len() != self.dimension) {
            return Err(Error::Embedding(format!(
                "Embedding dimension mismatch for model '{}': expected {}, got {}",
                self.model_id,
                self.dimension,
                mismatch.len()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.client.embed_text(&self.model_id, texts).await?;
        self.validate_dimensions(&embeddings)?;
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: String, dimension: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            backend: "http".to_string(),
            backend_url: url,
            model: "custom/model".to_string(),
            dimension,
            batch_size: 8,
        }
    }

    #[tokio::test]
    async fn test_rejects_wrong_dimension() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embed/text"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"embeddings": [[0.1, 0.2]]})),
            )
            .mount(&server)
            .await;

        let embedder = HttpEmbedder::new(&config(server.uri(), 3)).unwrap();
        let err = embedder.embed(vec!["a".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::Embedding(msg) if msg.contains("mismatch")));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let embedder = HttpEmbedder::new(&config("http://127.0.0.1:9".to_string(), 2)).unwrap();
        assert!(embedder.embed(Vec::new()).await.unwrap().is_empty());
    }
}
