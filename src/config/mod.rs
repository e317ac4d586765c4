//! Configuration management for alterego
//!
//! Handles loading, saving, and validating configuration from TOML files.
//! Recognized environment variables override values read from disk; secrets
//! are only ever read from the environment.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Datastore connection string (e.g. `sqlite:///var/lib/alterego.db`)
    #[serde(default = "default_database_url", skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Qdrant connection URL
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    /// Environment variable name for Qdrant API key
    #[serde(default = "default_qdrant_api_key_env")]
    pub qdrant_api_key_env: String,

    /// Qdrant collection name
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Embedding model configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Chat completion provider configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Sentiment classifier configuration
    #[serde(default)]
    pub sentiment: SentimentConfig,

    /// Analysis pipeline configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Conversation configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Speech services configuration
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Server/transport configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Backend kind: "local" (fastembed) or "http"
    #[serde(default = "default_embedding_backend")]
    pub backend: String,

    /// Base URL of the HTTP embedding backend
    #[serde(default = "default_embedding_backend_url")]
    pub backend_url: String,

    /// Model name/identifier
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension (must match model)
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Batch size for embedding and vector upserts
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,
}

/// Lookup the expected embedding dimension for a known model
pub fn embedding_dimension_for_model(model: &str) -> Option<usize> {
    match model {
        "BAAI/bge-small-en-v1.5" => Some(384),
        "BAAI/bge-base-en-v1.5" => Some(768),
        "BAAI/bge-large-en-v1.5" => Some(1024),
        "sentence-transformers/all-MiniLM-L6-v2" => Some(384),
        _ => None,
    }
}

impl EmbeddingConfig {
    /// Resolve the effective embedding dimension based on the configured model
    pub fn resolved_dimension(&self) -> usize {
        if let Some(expected) = embedding_dimension_for_model(&self.model) {
            if expected != self.dimension {
                warn!(
                    "Embedding dimension {} does not match model '{}' ({}); using {}",
                    self.dimension, self.model, expected, expected
                );
            }
            expected
        } else {
            self.dimension
        }
    }
}

/// Chat completion provider configuration (OpenAI-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

/// Sentiment classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Classifier endpoint; every text is scored neutral when unset
    #[serde(default = "default_sentiment_backend_url", skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,

    /// Texts are truncated to this many characters before classification
    #[serde(default = "default_sentiment_max_chars")]
    pub max_chars: usize,
}

/// Analysis pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Upper bound on the number of topic clusters
    #[serde(default = "default_cluster_count")]
    pub cluster_count: usize,

    #[serde(default = "default_keywords_per_cluster")]
    pub keywords_per_cluster: usize,

    /// TF-IDF vocabulary size
    #[serde(default = "default_max_features")]
    pub max_features: usize,
}

/// Conversation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Evidence items retrieved per question
    #[serde(default = "default_chat_top_k")]
    pub top_k: usize,

    /// Recent conversations included in an autopsy report
    #[serde(default = "default_autopsy_history")]
    pub autopsy_history: usize,
}

/// Speech services configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Speech-to-text endpoint base URL
    #[serde(default = "default_stt_url", skip_serializing_if = "Option::is_none")]
    pub stt_url: Option<String>,

    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    /// Text-to-speech endpoint base URL
    #[serde(default = "default_tts_url", skip_serializing_if = "Option::is_none")]
    pub tts_url: Option<String>,

    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,

    /// Environment variable holding the speech service credentials
    #[serde(default = "default_speech_api_key_env")]
    pub api_key_env: String,
}

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Per-subscriber event queue capacity
    #[serde(default = "default_event_queue_capacity")]
    pub event_queue_capacity: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_debug")]
    pub debug: bool,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for alterego data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to SQLite database
    pub db_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            qdrant_url: default_qdrant_url(),
            qdrant_api_key_env: default_qdrant_api_key_env(),
            collection_name: default_collection_name(),
            embedding: EmbeddingConfig::default(),
            llm: LlmConfig::default(),
            sentiment: SentimentConfig::default(),
            analysis: AnalysisConfig::default(),
            chat: ChatConfig::default(),
            speech: SpeechConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: default_embedding_backend(),
            backend_url: default_embedding_backend_url(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            batch_size: default_embedding_batch_size(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key_env: default_llm_api_key_env(),
            max_tokens: default_llm_max_tokens(),
            temperature: default_llm_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            backend_url: default_sentiment_backend_url(),
            max_chars: default_sentiment_max_chars(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cluster_count: default_cluster_count(),
            keywords_per_cluster: default_keywords_per_cluster(),
            max_features: default_max_features(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            top_k: default_chat_top_k(),
            autopsy_history: default_autopsy_history(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt_url: default_stt_url(),
            stt_model: default_stt_model(),
            tts_url: default_tts_url(),
            tts_voice: default_tts_voice(),
            api_key_env: default_speech_api_key_env(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: default_event_queue_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            debug: default_debug(),
        }
    }
}

impl LoggingConfig {
    /// Defaults with `LOG_LEVEL`/`DEBUG` applied, for commands that run
    /// without a config file
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config.logging
    }

    /// `EnvFilter` directive; `--verbose` and `debug` force debug output
    pub fn filter_directive(&self, verbose: bool) -> String {
        if verbose || self.debug {
            "debug".to_string()
        } else {
            self.level.clone()
        }
    }
}

impl Config {
    /// Get the default base directory for alterego (~/.alterego)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".alterego")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig::for_base(base);
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig::for_base(base);
        config.paths.config_file = config_path.to_path_buf();

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_config_path())
    }

    /// Load configuration from a base directory, falling back to defaults
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Apply recognized environment variables on top of file values
    pub fn apply_env_overrides(&mut self) {
        apply_env_overrides_from(self, |key| std::env::var(key).ok());
    }

    /// Get the Qdrant API key from environment
    pub fn qdrant_api_key(&self) -> Option<String> {
        read_secret(&self.qdrant_api_key_env)
    }

    /// Get the LLM API key from environment
    pub fn llm_api_key(&self) -> Option<String> {
        read_secret(&self.llm.api_key_env)
    }

    /// Get the speech service credentials from environment
    pub fn speech_api_key(&self) -> Option<String> {
        read_secret(&self.speech.api_key_env)
    }

    /// Check if alterego is initialized (config and DB exist)
    pub fn is_initialized(&self) -> bool {
        self.paths.config_file.exists()
            && (self.database_url.is_some() || self.paths.db_file.exists())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.embedding.backend.as_str() {
            "local" | "http" => {}
            other => {
                return Err(Error::Config(format!(
                    "embedding.backend must be 'local' or 'http', got '{}'",
                    other
                )))
            }
        }

        if self.embedding.batch_size == 0 {
            return Err(Error::Config(
                "embedding.batch_size must be positive".to_string(),
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(Error::Config("llm.max_tokens must be positive".to_string()));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(Error::Config(
                "llm.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.analysis.cluster_count == 0 {
            return Err(Error::Config(
                "analysis.cluster_count must be positive".to_string(),
            ));
        }

        if self.analysis.max_features == 0 {
            return Err(Error::Config(
                "analysis.max_features must be positive".to_string(),
            ));
        }

        if self.chat.top_k == 0 {
            return Err(Error::Config("chat.top_k must be positive".to_string()));
        }

        if self.server.event_queue_capacity == 0 {
            return Err(Error::Config(
                "server.event_queue_capacity must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl PathsConfig {
    fn for_base(base: PathBuf) -> Self {
        Self {
            config_file: base.join("config.toml"),
            db_file: base.join("alterego.db"),
            base_dir: base,
        }
    }
}

fn read_secret(env_name: &str) -> Option<String> {
    if env_name.is_empty() {
        return None;
    }
    std::env::var(env_name).ok().filter(|v| !v.is_empty())
}

fn apply_env_overrides_from(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(url) = get("DATABASE_URL") {
        config.database_url = Some(url);
    }
    if let Some(url) = get("QDRANT_URL") {
        config.qdrant_url = url;
    }
    if let Some(url) = get("LLM_BASE_URL") {
        config.llm.base_url = url;
    }
    if let Some(model) = get("LLM_MODEL") {
        config.llm.model = model;
    }
    if let Some(url) = get("ALTEREGO_EMBEDDING_BACKEND_URL") {
        config.embedding.backend_url = url;
    }
    if let Some(url) = get("ALTEREGO_SENTIMENT_BACKEND_URL") {
        config.sentiment.backend_url = Some(url);
    }
    if let Some(url) = get("ALTEREGO_STT_URL") {
        config.speech.stt_url = Some(url);
    }
    if let Some(url) = get("ALTEREGO_TTS_URL") {
        config.speech.tts_url = Some(url);
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(flag) = get("DEBUG") {
        config.logging.debug = parse_bool_flag(&flag);
    }
}

/// Get the database URL for sqlx
pub fn database_url(config: &Config) -> String {
    match &config.database_url {
        Some(url) => url.clone(),
        None => format!("sqlite://{}?mode=rwc", config.paths.db_file.display()),
    }
}
