//! Relational storage using SQLite
//!
//! This module owns every relational entity:
//! - Uploads (one per upload attempt)
//! - Posts (normalized history, unique by fingerprint)
//! - Analysis jobs and their typed results
//! - Topics produced by clustering
//! - Conversations (append-only)

mod schema;

pub use schema::*;

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::models::{AnalysisPayload, AnalysisType, NormalizedPost, PostMetadata};
use crate::normalize::fingerprint::date_key;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// Upload status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Parsing,
    Completed,
    Failed,
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadStatus::Parsing => write!(f, "parsing"),
            UploadStatus::Completed => write!(f, "completed"),
            UploadStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for UploadStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "parsing" => Ok(UploadStatus::Parsing),
            "completed" => Ok(UploadStatus::Completed),
            "failed" => Ok(UploadStatus::Failed),
            _ => Err(Error::Parse(format!("Unknown upload status: {}", s))),
        }
    }
}

/// Analysis job status
///
/// `pending -> in_progress -> {completed, failed}`; terminal states never
/// change again. A pending job may also fail directly (e.g. cancelled before
/// it started).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::InProgress)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::InProgress, JobStatus::Completed)
                | (JobStatus::InProgress, JobStatus::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::InProgress => write!(f, "in_progress"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "in_progress" => Ok(JobStatus::InProgress),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(Error::Parse(format!("Unknown job status: {}", s))),
        }
    }
}

/// An upload attempt
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: String,
    pub file_name: String,
    pub file_size: i64,
    pub total_posts_in_file: i64,
    pub posts_new: i64,
    pub posts_skipped: i64,
    pub upload_status: String,
    pub uploaded_at: String,
    pub parsed_at: Option<String>,
}

impl UploadRecord {
    pub fn new(file_name: String, file_size: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file_name,
            file_size,
            total_posts_in_file: 0,
            posts_new: 0,
            posts_skipped: 0,
            upload_status: UploadStatus::Parsing.to_string(),
            uploaded_at: Utc::now().to_rfc3339(),
            parsed_at: None,
        }
    }

    pub fn status(&self) -> Result<UploadStatus> {
        self.upload_status.parse()
    }
}

/// A persisted post
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub platform: String,
    pub platform_post_id: Option<String>,
    pub content_type: String,
    pub title: String,
    pub channel_name: String,
    pub watch_date: Option<String>,
    pub content_hash: String,
    pub metadata_json: String,
    pub uploaded_at: String,
    pub is_deleted: bool,
}

impl Post {
    pub fn from_normalized(post: &NormalizedPost) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            platform: post.platform.to_string(),
            platform_post_id: post.platform_post_id.clone(),
            content_type: post.content_type.to_string(),
            title: post.title.clone(),
            channel_name: post.channel_name.clone(),
            watch_date: post.watch_date.map(|d| d.to_rfc3339()),
            content_hash: post.content_hash.clone(),
            metadata_json: serde_json::to_string(&post.metadata)?,
            uploaded_at: Utc::now().to_rfc3339(),
            is_deleted: false,
        })
    }

    pub fn metadata(&self) -> Result<PostMetadata> {
        Ok(serde_json::from_str(&self.metadata_json)?)
    }

    /// Date rendered for prompts and vector payloads, e.g.
    /// `2024-01-01 00:00:00+00:00`, or `None`
    pub fn display_date(&self) -> String {
        match self.watch_date.as_deref() {
            None => date_key(None),
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|d| date_key(Some(&d.with_timezone(&Utc))))
                .unwrap_or_else(|_| raw.to_string()),
        }
    }
}

/// An analysis job
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub id: String,
    pub job_type: String,
    pub status: String,
    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub error_message: Option<String>,
}

pub const FULL_ANALYSIS: &str = "full_analysis";

impl AnalysisJob {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            job_type: FULL_ANALYSIS.to_string(),
            status: JobStatus::Pending.to_string(),
            created_at: Utc::now().to_rfc3339(),
            started_at: None,
            completed_at: None,
            error_message: None,
        }
    }

    pub fn status(&self) -> Result<JobStatus> {
        self.status.parse()
    }
}

impl Default for AnalysisJob {
    fn default() -> Self {
        Self::new()
    }
}

/// A persisted analysis result row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AnalysisResultRow {
    pub id: String,
    pub analysis_job_id: String,
    pub analysis_type: String,
    pub result_json: String,
    pub generated_at: String,
}

impl AnalysisResultRow {
    pub fn payload(&self) -> Result<AnalysisPayload> {
        let ty: AnalysisType = self.analysis_type.parse()?;
        AnalysisPayload::from_parts(ty, &self.result_json)
    }
}

/// A topic cluster produced by an analysis job
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub analysis_job_id: String,
    pub topic_name: String,
    pub topic_description: Option<String>,
    pub confidence_score: f64,
    pub post_ids_json: String,
    pub keywords_json: String,
    pub post_count: i64,
}

impl Topic {
    pub fn new(
        analysis_job_id: String,
        topic_name: String,
        keywords: &[String],
        post_ids: &[String],
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            analysis_job_id,
            topic_name,
            topic_description: Some(keywords.join(", ")),
            confidence_score: 1.0,
            post_ids_json: serde_json::to_string(post_ids).unwrap_or_else(|_| "[]".to_string()),
            keywords_json: serde_json::to_string(keywords).unwrap_or_else(|_| "[]".to_string()),
            post_count: post_ids.len() as i64,
        }
    }

    pub fn post_ids(&self) -> Vec<String> {
        serde_json::from_str(&self.post_ids_json).unwrap_or_default()
    }

    pub fn keywords(&self) -> Vec<String> {
        serde_json::from_str(&self.keywords_json).unwrap_or_default()
    }
}

/// A question/answer exchange
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_question: String,
    pub avatar_response: String,
    pub context_post_ids_json: String,
    pub confidence_score: f64,
    pub created_at: String,
}

impl Conversation {
    pub fn new(user_question: String, avatar_response: String, context_post_ids: &[String]) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_question,
            avatar_response,
            context_post_ids_json: serde_json::to_string(context_post_ids)
                .unwrap_or_else(|_| "[]".to_string()),
            confidence_score: 1.0,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn context_post_ids(&self) -> Vec<String> {
        serde_json::from_str(&self.context_post_ids_json).unwrap_or_default()
    }
}

/// Relational store handle
#[derive(Clone)]
pub struct MetaDb {
    pool: SqlitePool,
}

impl MetaDb {
    /// Connect using the configured connection string or the local database file
    pub async fn connect(config: &Config) -> Result<Self> {
        let options = match &config.database_url {
            Some(url) => {
                debug!("Connecting to database at {}", url);
                SqliteConnectOptions::from_str(url)?.create_if_missing(true)
            }
            None => {
                let db_path = &config.paths.db_file;
                if let Some(parent) = db_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                debug!("Connecting to SQLite database at {:?}", db_path);
                SqliteConnectOptions::new()
                    .filename(db_path)
                    .create_if_missing(true)
            }
        }
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        if !db.is_initialized().await? {
            db.init_schema().await?;
        }
        debug!("Database ready ({})", config::database_url(config));
        Ok(db)
    }

    /// Create database with path directly (without full config)
    pub async fn new(db_path: &std::path::Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };

        if !db.is_initialized().await? {
            db.init_schema().await?;
        }

        Ok(db)
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing database schema");
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Check if database is initialized
    pub async fn is_initialized(&self) -> Result<bool> {
        let result: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM sqlite_master WHERE type='table' AND name='posts'")
                .fetch_optional(&self.pool)
                .await?;
        Ok(result.is_some())
    }

    /// Delete every relational row (conversations, topics, results, jobs, posts, uploads)
    pub async fn clear_all(&self) -> Result<()> {
        info!("Clearing all relational data");
        for table in [
            "conversations",
            "topics",
            "analysis_results",
            "analysis_jobs",
            "posts",
            "uploads",
        ] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    // ===== Upload Operations =====

    pub async fn insert_upload(&self, upload: &UploadRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO uploads (id, file_name, file_size, total_posts_in_file, posts_new, posts_skipped, upload_status, uploaded_at, parsed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&upload.id)
        .bind(&upload.file_name)
        .bind(upload.file_size)
        .bind(upload.total_posts_in_file)
        .bind(upload.posts_new)
        .bind(upload.posts_skipped)
        .bind(&upload.upload_status)
        .bind(&upload.uploaded_at)
        .bind(&upload.parsed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record parse counts and move the upload to a terminal status
    pub async fn finish_upload(
        &self,
        id: &str,
        status: UploadStatus,
        total: usize,
        new_count: usize,
        skipped: usize,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE uploads SET
                upload_status = ?,
                total_posts_in_file = ?,
                posts_new = ?,
                posts_skipped = ?,
                parsed_at = ?
            WHERE id = ? AND upload_status = 'parsing'
            "#,
        )
        .bind(status.to_string())
        .bind(total as i64)
        .bind(new_count as i64)
        .bind(skipped as i64)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_upload(&self, id: &str) -> Result<Option<UploadRecord>> {
        let upload = sqlx::query_as::<_, UploadRecord>("SELECT * FROM uploads WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(upload)
    }

    pub async fn latest_upload(&self) -> Result<Option<UploadRecord>> {
        let upload = sqlx::query_as::<_, UploadRecord>(
            "SELECT * FROM uploads ORDER BY uploaded_at DESC, rowid DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(upload)
    }

    // ===== Post Operations =====

    /// Find a post by fingerprint
    pub async fn get_post_by_hash(&self, content_hash: &str) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE content_hash = ?")
            .bind(content_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    /// Insert a post; returns false when the fingerprint already exists
    pub async fn insert_post(&self, post: &Post) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (id, platform, platform_post_id, content_type, title, channel_name, watch_date, content_hash, metadata_json, uploaded_at, is_deleted)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(content_hash) DO NOTHING
            "#,
        )
        .bind(&post.id)
        .bind(&post.platform)
        .bind(&post.platform_post_id)
        .bind(&post.content_type)
        .bind(&post.title)
        .bind(&post.channel_name)
        .bind(&post.watch_date)
        .bind(&post.content_hash)
        .bind(&post.metadata_json)
        .bind(&post.uploaded_at)
        .bind(post.is_deleted)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// All posts that are not soft-deleted, in insertion order
    pub async fn list_active_posts(&self) -> Result<Vec<Post>> {
        let posts =
            sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE is_deleted = 0 ORDER BY rowid")
                .fetch_all(&self.pool)
                .await?;
        Ok(posts)
    }

    pub async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    pub async fn soft_delete_post(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE posts SET is_deleted = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ===== Job Operations =====

    /// Create a job in the pending state
    pub async fn create_job(&self) -> Result<AnalysisJob> {
        let job = AnalysisJob::new();
        sqlx::query(
            r#"
            INSERT INTO analysis_jobs (id, job_type, status, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.job_type)
        .bind(&job.status)
        .bind(&job.created_at)
        .execute(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn get_job(&self, id: &str) -> Result<Option<AnalysisJob>> {
        let job = sqlx::query_as::<_, AnalysisJob>("SELECT * FROM analysis_jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    /// The current job: latest by creation time
    pub async fn latest_job(&self) -> Result<Option<AnalysisJob>> {
        let job = sqlx::query_as::<_, AnalysisJob>(
            "SELECT * FROM analysis_jobs ORDER BY created_at DESC, rowid DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    /// Move a job to a new status, enforcing the lifecycle state machine
    pub async fn transition_job(
        &self,
        id: &str,
        next: JobStatus,
        error_message: Option<&str>,
    ) -> Result<AnalysisJob> {
        let job = self
            .get_job(id)
            .await?
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?;
        let current = job.status()?;

        if !current.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                job_id: id.to_string(),
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        let now = Utc::now().to_rfc3339();
        let started_at = if next == JobStatus::InProgress {
            Some(now.clone())
        } else {
            job.started_at.clone()
        };
        let completed_at = if next.is_terminal() {
            Some(now)
        } else {
            None
        };

        let result = sqlx::query(
            r#"
            UPDATE analysis_jobs SET
                status = ?,
                started_at = ?,
                completed_at = ?,
                error_message = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(next.to_string())
        .bind(&started_at)
        .bind(&completed_at)
        .bind(error_message)
        .bind(id)
        .bind(current.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::InvalidTransition {
                job_id: id.to_string(),
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        Ok(AnalysisJob {
            status: next.to_string(),
            started_at,
            completed_at,
            error_message: error_message.map(ToString::to_string),
            ..job
        })
    }

    // ===== Result Operations =====

    pub async fn insert_result(
        &self,
        job_id: &str,
        payload: &AnalysisPayload,
    ) -> Result<AnalysisResultRow> {
        let row = AnalysisResultRow {
            id: Uuid::new_v4().to_string(),
            analysis_job_id: job_id.to_string(),
            analysis_type: payload.analysis_type().to_string(),
            result_json: payload.to_json()?,
            generated_at: Utc::now().to_rfc3339(),
        };

        sqlx::query(
            r#"
            INSERT INTO analysis_results (id, analysis_job_id, analysis_type, result_json, generated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.analysis_job_id)
        .bind(&row.analysis_type)
        .bind(&row.result_json)
        .bind(&row.generated_at)
        .execute(&self.pool)
        .await?;
        Ok(row)
    }

    /// First result of a type for a job, in insertion order
    pub async fn get_result(
        &self,
        job_id: &str,
        analysis_type: AnalysisType,
    ) -> Result<Option<AnalysisPayload>> {
        let row = sqlx::query_as::<_, AnalysisResultRow>(
            "SELECT * FROM analysis_results WHERE analysis_job_id = ? AND analysis_type = ? ORDER BY rowid LIMIT 1",
        )
        .bind(job_id)
        .bind(analysis_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.payload()).transpose()
    }

    pub async fn list_results(&self, job_id: &str) -> Result<Vec<AnalysisResultRow>> {
        let rows = sqlx::query_as::<_, AnalysisResultRow>(
            "SELECT * FROM analysis_results WHERE analysis_job_id = ? ORDER BY rowid",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ===== Topic Operations =====

    pub async fn insert_topic(&self, topic: &Topic) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO topics (id, analysis_job_id, topic_name, topic_description, confidence_score, post_ids_json, keywords_json, post_count)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&topic.id)
        .bind(&topic.analysis_job_id)
        .bind(&topic.topic_name)
        .bind(&topic.topic_description)
        .bind(topic.confidence_score)
        .bind(&topic.post_ids_json)
        .bind(&topic.keywords_json)
        .bind(topic.post_count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_topics(&self, job_id: &str) -> Result<Vec<Topic>> {
        let topics = sqlx::query_as::<_, Topic>(
            "SELECT * FROM topics WHERE analysis_job_id = ? ORDER BY rowid",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(topics)
    }

    // ===== Conversation Operations =====

    pub async fn insert_conversation(&self, conversation: &Conversation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO conversations (id, user_question, avatar_response, context_post_ids_json, confidence_score, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&conversation.id)
        .bind(&conversation.user_question)
        .bind(&conversation.avatar_response)
        .bind(&conversation.context_post_ids_json)
        .bind(conversation.confidence_score)
        .bind(&conversation.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent conversations first
    pub async fn recent_conversations(&self, limit: usize) -> Result<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ===== Statistics =====

    pub async fn get_global_stats(&self) -> Result<GlobalStats> {
        let post_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE is_deleted = 0")
                .fetch_one(&self.pool)
                .await?;

        let upload_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM uploads")
            .fetch_one(&self.pool)
            .await?;

        let job_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM analysis_jobs")
            .fetch_one(&self.pool)
            .await?;

        let conversation_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
            .fetch_one(&self.pool)
            .await?;

        Ok(GlobalStats {
            post_count: post_count as usize,
            upload_count: upload_count as usize,
            job_count: job_count as usize,
            conversation_count: conversation_count as usize,
        })
    }
}

/// Global statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalStats {
    pub post_count: usize,
    pub upload_count: usize,
    pub job_count: usize,
    pub conversation_count: usize,
}
