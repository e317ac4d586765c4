//! Embedding generation
//!
//! This module provides an abstraction over embedding models with:
//! - A trait for different embedding backends
//! - HTTP sidecar backend and an optional in-process FastEmbed backend
//! - Batch processing for efficiency

mod http_backend;
#[cfg(feature = "local-embed")]
mod fastembed_impl;

pub use http_backend::*;
#[cfg(feature = "local-embed")]
pub use fastembed_impl::*;

use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Create an embedder based on configuration
pub fn create_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    match config.embedding.backend.as_str() {
        "http" => Ok(Arc::new(HttpEmbedder::new(&config.embedding)?)),
        #[cfg(feature = "local-embed")]
        "local" => Ok(Arc::new(FastEmbedder::new(&config.embedding))),
        #[cfg(not(feature = "local-embed"))]
        "local" => Err(Error::Config(
            "embedding.backend 'local' requires the local-embed feature".to_string(),
        )),
        other => Err(Error::Config(format!(
            "Unsupported embedding backend '{}'",
            other
        ))),
    }
}

/// Helper to embed in batches
pub async fn embed_in_batches(
    embedder: &dyn Embedder,
    texts: Vec<String>,
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    let mut all_embeddings = Vec::with_capacity(texts.len());

    for chunk in texts.chunks(batch_size.max(1)) {
        let batch_texts: Vec<String> = chunk.to_vec();
        let expected = batch_texts.len();
        let embeddings = embedder.embed(batch_texts).await?;
        if embeddings.len() != expected {
            return Err(Error::Embedding(format!(
                "Embedder returned {} vectors for {} texts",
                embeddings.len(),
                expected
            )));
        }
        all_embeddings.extend(embeddings);
    }

    Ok(all_embeddings)
}
