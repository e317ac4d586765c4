//! Default values for configuration

/// Default Qdrant gRPC URL for local development (port 6334, not 6333 REST)
pub fn default_qdrant_url() -> String {
    std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://127.0.0.1:6334".to_string())
}

/// Default environment variable name for Qdrant API key
pub fn default_qdrant_api_key_env() -> String {
    "QDRANT_API_KEY".to_string()
}

/// Default collection name
pub fn default_collection_name() -> String {
    "alterego_posts".to_string()
}

/// Optional datastore connection string (falls back to the local SQLite file)
pub fn default_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty())
}

/// Default embedding backend kind ("local" or "http")
pub fn default_embedding_backend() -> String {
    if cfg!(feature = "local-embed") {
        "local".to_string()
    } else {
        "http".to_string()
    }
}

/// Default embedding backend URL
pub fn default_embedding_backend_url() -> String {
    std::env::var("ALTEREGO_EMBEDDING_BACKEND_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:7997".to_string())
}

/// Default embedding model (sentence-transformers/all-MiniLM-L6-v2)
pub fn default_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

/// Default embedding dimension
pub fn default_embedding_dimension() -> usize {
    384
}

/// Default batch size for embedding and vector upserts
pub fn default_embedding_batch_size() -> usize {
    100
}

/// Default OpenAI-compatible chat completions base URL
pub fn default_llm_base_url() -> String {
    std::env::var("LLM_BASE_URL").unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string())
}

/// Default chat model
pub fn default_llm_model() -> String {
    std::env::var("LLM_MODEL").unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string())
}

/// Default environment variable name for the LLM API key
pub fn default_llm_api_key_env() -> String {
    "LLM_API_KEY".to_string()
}

pub fn default_llm_max_tokens() -> u32 {
    500
}

pub fn default_llm_temperature() -> f32 {
    0.7
}

/// Default LLM request timeout in seconds
pub fn default_llm_timeout() -> u64 {
    60
}

/// Default sentiment classifier URL (disabled when unset)
pub fn default_sentiment_backend_url() -> Option<String> {
    std::env::var("ALTEREGO_SENTIMENT_BACKEND_URL")
        .ok()
        .filter(|v| !v.is_empty())
}

/// Default maximum characters sent to the sentiment classifier per text
pub fn default_sentiment_max_chars() -> usize {
    512
}

/// Default number of topic clusters
pub fn default_cluster_count() -> usize {
    5
}

/// Default keywords kept per cluster
pub fn default_keywords_per_cluster() -> usize {
    5
}

/// Default TF-IDF vocabulary size
pub fn default_max_features() -> usize {
    1000
}

/// Default number of evidence items retrieved per question
pub fn default_chat_top_k() -> usize {
    3
}

/// Default number of recent conversations fed into the autopsy report
pub fn default_autopsy_history() -> usize {
    20
}

/// Default speech-to-text URL (disabled when unset)
pub fn default_stt_url() -> Option<String> {
    std::env::var("ALTEREGO_STT_URL").ok().filter(|v| !v.is_empty())
}

/// Default text-to-speech URL (disabled when unset)
pub fn default_tts_url() -> Option<String> {
    std::env::var("ALTEREGO_TTS_URL").ok().filter(|v| !v.is_empty())
}

/// Default environment variable name for the speech service credentials
pub fn default_speech_api_key_env() -> String {
    "SPEECH_API_KEY".to_string()
}

pub fn default_stt_model() -> String {
    "whisper-large-v3".to_string()
}

pub fn default_tts_voice() -> String {
    "default".to_string()
}

/// Default per-subscriber event queue capacity
pub fn default_event_queue_capacity() -> usize {
    64
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_debug() -> bool {
    false
}

pub(crate) fn parse_bool_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
