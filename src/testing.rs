//! In-process test doubles for the external collaborators

use crate::app::App;
use crate::config::Config;
use crate::embed::Embedder;
use crate::error::{Error, Result};
use crate::events::EventBus;
use crate::llm::{ChatModel, ChatRequest, Summarizer};
use crate::meta::MetaDb;
use crate::sentiment::NeutralClassifier;
use crate::store::{CollectionStats, PostPoint, PostPayload, SearchHit, VectorIndex};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Deterministic embedder: the same text always maps to the same unit vector
pub struct FixedEmbedder {
    dimension: usize,
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl FixedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let hash = blake3::hash(text.to_lowercase().as_bytes());
        let bytes = hash.as_bytes();
        let raw: Vec<f32> = (0..self.dimension)
            .map(|i| bytes[i % bytes.len()] as f32 + 1.0)
            .collect();
        let norm = raw.iter().map(|v| v * v).sum::<f32>().sqrt();
        raw.into_iter().map(|v| v / norm).collect()
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Embedding("embedder offline".to_string()));
        }
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "fixed-test"
    }
}

/// Brute-force cosine index kept in memory
#[derive(Default)]
pub struct MemoryIndex {
    points: Mutex<HashMap<String, (Vec<f32>, PostPayload)>>,
    fail: AtomicBool,
    clears: AtomicUsize,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (Vec<f32>, PostPayload)>> {
        self.points.lock().unwrap()
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Qdrant("index offline".to_string()));
        }
        Ok(())
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let nb = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn ensure_ready(&self) -> Result<()> {
        self.check()
    }

    async fn upsert(&self, points: Vec<PostPoint>) -> Result<()> {
        self.check()?;
        let mut map = self.lock();
        for p in points {
            map.insert(p.id, (p.vector, p.payload));
        }
        Ok(())
    }

    async fn search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<SearchHit>> {
        self.check()?;
        let mut hits: Vec<SearchHit> = self
            .lock()
            .iter()
            .map(|(id, (v, payload))| SearchHit {
                id: id.clone(),
                score: cosine(&vector, v),
                payload: payload.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn clear(&self) -> Result<()> {
        self.check()?;
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.lock().clear();
        Ok(())
    }

    async fn stats(&self) -> Result<Option<CollectionStats>> {
        self.check()?;
        Ok(Some(CollectionStats {
            collection: "memory".to_string(),
            points_count: self.len(),
        }))
    }
}

/// Chat model that replays canned replies and records every request
pub struct ScriptedChatModel {
    replies: Mutex<VecDeque<String>>,
    always_fail: Option<String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChatModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            always_fail: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            always_fail: Some(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        if let Some(message) = &self.always_fail {
            return Err(Error::Llm(message.clone()));
        }
        match self.replies.lock().unwrap().pop_front() {
            Some(text) => Ok(text),
            None => Ok("scripted reply".to_string()),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Handles to the doubles wired into a test [`App`]
pub struct TestHarness {
    pub app: Arc<App>,
    pub embedder: Arc<FixedEmbedder>,
    pub index: Arc<MemoryIndex>,
    pub _tmp: TempDir,
}

/// App backed by a temp SQLite file and in-memory collaborators
pub async fn test_app(chat: Option<Arc<dyn ChatModel>>) -> TestHarness {
    test_app_with(chat, |_| {}).await
}

/// Like [`test_app`], with a hook to swap collaborators before sharing
pub async fn test_app_with(
    chat: Option<Arc<dyn ChatModel>>,
    customize: impl FnOnce(&mut App),
) -> TestHarness {
    let tmp = TempDir::new().unwrap();
    let mut config = Config::default();
    config.init_paths(Some(tmp.path().to_path_buf()));
    config.database_url = None;

    let db = MetaDb::new(&config.paths.db_file).await.unwrap();
    let embedder = Arc::new(FixedEmbedder::new(8));
    let index = Arc::new(MemoryIndex::new());

    let mut app = App {
        config,
        db,
        embedder: embedder.clone(),
        index: index.clone(),
        summarizer: Summarizer::new(chat),
        sentiment: Arc::new(NeutralClassifier),
        transcriber: None,
        synthesizer: None,
        events: Arc::new(EventBus::new(64)),
    };
    customize(&mut app);
    let app = Arc::new(app);

    TestHarness {
        app,
        embedder,
        index,
        _tmp: tmp,
    }
}
