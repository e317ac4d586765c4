//! FastEmbed implementation for local embeddings

use super::Embedder;
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

/// FastEmbed-based embedder; the model is loaded on first use
pub struct FastEmbedder {
    model: OnceCell<Arc<Mutex<TextEmbedding>>>,
    model_name: String,
    dimension: usize,
}

impl FastEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self {
            model: OnceCell::new(),
            model_name: config.model.clone(),
            dimension: config.resolved_dimension(),
        }
    }

    fn model_enum(name: &str) -> EmbeddingModel {
        match name {
            "BAAI/bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
            "BAAI/bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
            "BAAI/bge-large-en-v1.5" => EmbeddingModel::BGELargeENV15,
            "sentence-transformers/all-MiniLM-L6-v2" => EmbeddingModel::AllMiniLML6V2,
            _ => {
                debug!("Unknown model '{}', using default AllMiniLML6V2", name);
                EmbeddingModel::AllMiniLML6V2
            }
        }
    }

    async fn model(&self) -> Result<Arc<Mutex<TextEmbedding>>> {
        let model = self
            .model
            .get_or_try_init(|| async {
                info!("Initializing FastEmbed with model: {}", self.model_name);
                let options = InitOptions::new(Self::model_enum(&self.model_name))
                    .with_show_download_progress(true);

                let model = tokio::task::spawn_blocking(move || TextEmbedding::try_new(options))
                    .await
                    .map_err(|e| Error::Embedding(format!("Task join error: {}", e)))?
                    .map_err(|e| Error::Embedding(format!("Failed to initialize model: {}", e)))?;

                info!("FastEmbed model loaded successfully");
                Ok::<_, Error>(Arc::new(Mutex::new(model)))
            })
            .await?;
        Ok(model.clone())
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding {} texts", texts.len());

        // FastEmbed is synchronous, so we wrap in blocking task
        let model = self.model().await?;
        let embeddings = tokio::task::spawn_blocking(move || {
            let model = model.blocking_lock();
            model.embed(texts, None)
        })
        .await
        .map_err(|e| Error::Embedding(format!("Task join error: {}", e)))?
        .map_err(|e| Error::Embedding(format!("Embedding failed: {}", e)))?;

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_is_lazy() {
        let config = EmbeddingConfig {
            backend: "local".to_string(),
            backend_url: String::new(),
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimension: 384,
            batch_size: 32,
        };

        let embedder = FastEmbedder::new(&config);
        assert!(embedder.model.get().is_none());
        assert_eq!(embedder.dimension(), 384);
    }

    // Integration test - requires model download
    #[tokio::test]
    #[ignore] // Run manually with: cargo test -- --ignored
    async fn test_fastembed_integration() {
        let config = EmbeddingConfig {
            backend: "local".to_string(),
            backend_url: String::new(),
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimension: 384,
            batch_size: 32,
        };

        let embedder = FastEmbedder::new(&config);
        let embeddings = embedder
            .embed(vec!["Hello world".to_string(), "Another text".to_string()])
            .await
            .unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), 384);
    }
}
