//! Service container shared by the CLI and the stdio server

use crate::config::Config;
use crate::embed::{create_embedder, Embedder};
use crate::error::Result;
use crate::events::EventBus;
use crate::llm::{create_chat_model, Summarizer};
use crate::meta::MetaDb;
use crate::sentiment::{create_classifier, SentimentClassifier};
use crate::store::{QdrantStore, VectorIndex};
use crate::voice::{create_synthesizer, create_transcriber, Synthesizer, Transcriber};
use std::sync::Arc;
use tracing::info;

/// Explicitly constructed service handles
pub struct App {
    pub config: Config,
    pub db: MetaDb,
    pub embedder: Arc<dyn Embedder>,
    pub index: Arc<dyn VectorIndex>,
    pub summarizer: Summarizer,
    pub sentiment: Arc<dyn SentimentClassifier>,
    pub transcriber: Option<Arc<dyn Transcriber>>,
    pub synthesizer: Option<Arc<dyn Synthesizer>>,
    pub events: Arc<EventBus>,
}

impl App {
    pub async fn connect(config: Config) -> Result<Arc<Self>> {
        let db = MetaDb::connect(&config).await?;
        let embedder = create_embedder(&config)?;
        let index: Arc<dyn VectorIndex> = Arc::new(QdrantStore::connect(&config)?);

        let chat = create_chat_model(&config)?;

        let sentiment = create_classifier(&config.sentiment)?;
        let speech_key = config.speech_api_key();
        let transcriber = create_transcriber(&config.speech, speech_key.clone())?;
        let synthesizer = create_synthesizer(&config.speech, speech_key)?;
        let events = Arc::new(EventBus::new(config.server.event_queue_capacity));

        info!(
            embedder = embedder.model_name(),
            llm = chat.as_ref().map(|m| m.model_name()).unwrap_or("none"),
            "Services initialized"
        );

        Ok(Arc::new(Self {
            config,
            db,
            embedder,
            index,
            summarizer: Summarizer::new(chat),
            sentiment,
            transcriber,
            synthesizer,
            events,
        }))
    }
}
