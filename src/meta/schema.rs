//! SQLite schema definition

/// SQL schema for the relational store
pub const SCHEMA_SQL: &str = r#"
-- Uploads: one row per upload attempt
CREATE TABLE IF NOT EXISTS uploads (
    id TEXT PRIMARY KEY,
    file_name TEXT NOT NULL,
    file_size INTEGER NOT NULL,
    total_posts_in_file INTEGER NOT NULL DEFAULT 0,
    posts_new INTEGER NOT NULL DEFAULT 0,
    posts_skipped INTEGER NOT NULL DEFAULT 0,
    upload_status TEXT NOT NULL,
    uploaded_at TEXT NOT NULL,
    parsed_at TEXT
);

-- Posts: normalized history entries, unique by fingerprint
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    platform TEXT NOT NULL,
    platform_post_id TEXT,
    content_type TEXT NOT NULL,
    title TEXT NOT NULL,
    channel_name TEXT NOT NULL,
    watch_date TEXT,
    content_hash TEXT NOT NULL UNIQUE,
    metadata_json TEXT NOT NULL,
    uploaded_at TEXT NOT NULL,
    is_deleted INTEGER NOT NULL DEFAULT 0
);

-- Analysis jobs: one row per pipeline run
CREATE TABLE IF NOT EXISTS analysis_jobs (
    id TEXT PRIMARY KEY,
    job_type TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    started_at TEXT,
    completed_at TEXT,
    error_message TEXT
);

-- Analysis results: typed payloads keyed by (job, type)
CREATE TABLE IF NOT EXISTS analysis_results (
    id TEXT PRIMARY KEY,
    analysis_job_id TEXT NOT NULL REFERENCES analysis_jobs(id),
    analysis_type TEXT NOT NULL,
    result_json TEXT NOT NULL,
    generated_at TEXT NOT NULL
);

-- Topics: one row per cluster produced by a job
CREATE TABLE IF NOT EXISTS topics (
    id TEXT PRIMARY KEY,
    analysis_job_id TEXT NOT NULL REFERENCES analysis_jobs(id),
    topic_name TEXT NOT NULL,
    topic_description TEXT,
    confidence_score REAL NOT NULL,
    post_ids_json TEXT NOT NULL,
    keywords_json TEXT NOT NULL,
    post_count INTEGER NOT NULL
);

-- Conversations: append-only question/answer log
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    user_question TEXT NOT NULL,
    avatar_response TEXT NOT NULL,
    context_post_ids_json TEXT NOT NULL,
    confidence_score REAL NOT NULL,
    created_at TEXT NOT NULL
);

-- Indexes for performance
CREATE INDEX IF NOT EXISTS idx_posts_deleted ON posts(is_deleted);
CREATE INDEX IF NOT EXISTS idx_jobs_created ON analysis_jobs(created_at);
CREATE INDEX IF NOT EXISTS idx_results_job_type ON analysis_results(analysis_job_id, analysis_type);
CREATE INDEX IF NOT EXISTS idx_topics_job ON topics(analysis_job_id);
CREATE INDEX IF NOT EXISTS idx_conversations_created ON conversations(created_at);
"#;
