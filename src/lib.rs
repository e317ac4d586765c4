//! alterego - an AI twin built from an exported watch history
//!
//! This crate provides:
//! - Ingestion of YouTube Takeout (and scraped caption/tweet) exports
//! - A background analysis pipeline: sentiment, embeddings, topic clustering,
//!   LLM behavioral summary and twin persona
//! - Retrieval-augmented chat with the twin in mirror or devil's-advocate mode
//! - Autopsy reports and a voice round trip
//! - A CLI and a line-delimited JSON-RPC server over stdio

pub mod app;
pub mod autopsy;
pub mod chat;
pub mod cluster;
pub mod commands;
pub mod config;
pub mod embed;
pub mod error;
pub mod events;
pub mod ingest;
pub mod llm;
pub mod mcp;
pub mod meta;
pub mod model_backend;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod retrieval;
pub mod sentiment;
pub mod store;
pub mod voice;

#[cfg(test)]
mod testing;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
