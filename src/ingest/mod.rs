//! Upload ingestion: archive extraction, normalization and deduplicated storage

pub mod archive;

use crate::app::App;
use crate::error::{Error, Result};
use crate::events::{Event, EventType};
use crate::meta::{MetaDb, Post, UploadRecord, UploadStatus};
use crate::models::NormalizedPost;
use crate::normalize::normalize_export;
use crate::progress::{advance_progress, finish_progress, start_progress_bar};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Counts produced by one deduplication pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestCounts {
    pub new_count: usize,
    pub skipped_count: usize,
    pub total_count: usize,
}

/// Result of a processed upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSummary {
    pub upload_id: String,
    pub file_name: String,
    pub posts_parsed: usize,
    pub posts_skipped: usize,
    pub total_found: usize,
}

/// Store posts whose fingerprint is not yet known; the rest count as skipped
pub async fn deduplicate_and_store(db: &MetaDb, posts: &[NormalizedPost]) -> Result<IngestCounts> {
    let mut counts = IngestCounts {
        total_count: posts.len(),
        ..Default::default()
    };

    let pb = start_progress_bar(posts.len(), "Storing posts");
    for post in posts {
        advance_progress(&pb, 1);

        if db.get_post_by_hash(&post.content_hash).await?.is_some() {
            counts.skipped_count += 1;
            continue;
        }

        if db.insert_post(&Post::from_normalized(post)?).await? {
            counts.new_count += 1;
        } else {
            counts.skipped_count += 1;
        }
    }
    finish_progress(pb, "Posts stored");

    debug!(
        new = counts.new_count,
        skipped = counts.skipped_count,
        total = counts.total_count,
        "Deduplication finished"
    );
    Ok(counts)
}

/// Replace all stored data with the contents of a `.zip` export
pub async fn process_upload(app: &App, path: &Path) -> Result<UploadSummary> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if !file_name.to_lowercase().ends_with(".zip") {
        return Err(Error::Validation("Only .zip files are supported".to_string()));
    }

    let file_size = tokio::fs::metadata(path).await?.len() as i64;

    info!("Clearing existing data before new upload");
    app.db.clear_all().await?;
    if let Err(e) = app.index.clear().await {
        warn!("Failed to clear vector collection: {}", e);
    }

    let upload = UploadRecord::new(file_name.clone(), file_size);
    app.db.insert_upload(&upload).await?;
    app.events.publish(Event::with_data(
        EventType::UploadStarted,
        json!({ "upload_id": upload.id, "file_name": file_name }),
    ));

    match parse_and_store(&app.db, path.to_path_buf()).await {
        Ok(counts) => {
            app.db
                .finish_upload(
                    &upload.id,
                    UploadStatus::Completed,
                    counts.total_count,
                    counts.new_count,
                    counts.skipped_count,
                )
                .await?;

            info!(
                "Upload {} processed: {} new, {} skipped, {} found",
                upload.id, counts.new_count, counts.skipped_count, counts.total_count
            );

            app.events.publish(Event::with_data(
                EventType::UploadComplete,
                json!({
                    "posts_parsed": counts.new_count,
                    "posts_skipped": counts.skipped_count,
                    "total_found": counts.total_count,
                }),
            ));

            Ok(UploadSummary {
                upload_id: upload.id,
                file_name,
                posts_parsed: counts.new_count,
                posts_skipped: counts.skipped_count,
                total_found: counts.total_count,
            })
        }
        Err(e) => {
            error!("Error processing upload {}: {}", upload.id, e);
            if let Err(mark_err) = app
                .db
                .finish_upload(&upload.id, UploadStatus::Failed, 0, 0, 0)
                .await
            {
                warn!("Failed to mark upload {} as failed: {}", upload.id, mark_err);
            }
            Err(e)
        }
    }
}

async fn parse_and_store(db: &MetaDb, path: PathBuf) -> Result<IngestCounts> {
    let document = tokio::task::spawn_blocking(move || archive::read_export(&path))
        .await
        .map_err(|e| Error::Other(format!("Archive task failed: {}", e)))??;

    let Some(document) = document else {
        return Ok(IngestCounts::default());
    };

    let posts = normalize_export(&document.value);
    info!("Parsed {} posts from {}", posts.len(), document.entry_name);
    deduplicate_and_store(db, &posts).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::archive::tests::write_zip;
    use crate::testing::test_app;
    use tempfile::TempDir;

    const HISTORY: &str = r#"[
        {"title": "Watched Rust in 100 Seconds", "titleUrl": "https://www.youtube.com/watch?v=abc",
         "subtitles": [{"name": "Fireship"}], "time": "2024-01-02T10:00:00Z"},
        {"title": "Watched Learn Go", "subtitles": [{"name": "Go Team"}], "time": "2024-01-03T10:00:00Z"},
        {"title": "Watched Cooking Pasta", "time": "2024-01-04T10:00:00Z"},
        {"title": "Watched No Timestamp", "subtitles": [{"name": "Nobody"}]}
    ]"#;

    #[tokio::test]
    async fn test_upload_counts_valid_entries() {
        let h = test_app(None).await;
        let dir = TempDir::new().unwrap();
        let zip = write_zip(dir.path(), "takeout.zip", &[("Takeout/history/watch-history.json", HISTORY)]);

        let mut sub = h.app.events.subscribe();
        let summary = process_upload(&h.app, &zip).await.unwrap();
        assert_eq!(summary.posts_parsed, 3);
        assert_eq!(summary.posts_skipped, 0);
        assert_eq!(summary.total_found, 3);

        let upload = h.app.db.get_upload(&summary.upload_id).await.unwrap().unwrap();
        assert_eq!(upload.status().unwrap(), UploadStatus::Completed);
        assert_eq!(upload.posts_new, 3);

        assert_eq!(sub.try_recv().unwrap().kind, EventType::UploadStarted);
        let done = sub.try_recv().unwrap();
        assert_eq!(done.kind, EventType::UploadComplete);
        assert_eq!(done.data.unwrap()["posts_parsed"], 3);
    }

    #[tokio::test]
    async fn test_reupload_wipes_previous_data() {
        let h = test_app(None).await;
        let dir = TempDir::new().unwrap();
        let zip = write_zip(dir.path(), "takeout.zip", &[("watch-history.json", HISTORY)]);

        process_upload(&h.app, &zip).await.unwrap();
        h.app.db.create_job().await.unwrap();

        let second = process_upload(&h.app, &zip).await.unwrap();
        assert_eq!(second.posts_parsed, 3);
        assert_eq!(h.index.clears(), 2);

        let stats = h.app.db.get_global_stats().await.unwrap();
        assert_eq!(stats.post_count, 3);
        assert_eq!(stats.job_count, 0);
        assert_eq!(stats.upload_count, 1);
    }

    #[tokio::test]
    async fn test_duplicates_within_file_are_skipped() {
        let h = test_app(None).await;
        let dir = TempDir::new().unwrap();
        let doubled = r#"[
            {"title": "Watched Same", "subtitles": [{"name": "C"}], "time": "2024-01-02T10:00:00Z"},
            {"title": "Watched same ", "subtitles": [{"name": "c"}], "time": "2024-01-02T10:00:00Z"}
        ]"#;
        let zip = write_zip(dir.path(), "dup.zip", &[("watch-history.json", doubled)]);

        let summary = process_upload(&h.app, &zip).await.unwrap();
        assert_eq!(summary.posts_parsed, 1);
        assert_eq!(summary.posts_skipped, 1);
        assert_eq!(summary.total_found, 2);
    }

    #[tokio::test]
    async fn test_second_pass_skips_everything() {
        let h = test_app(None).await;
        let posts = crate::normalize::normalize_export(&serde_json::from_str(HISTORY).unwrap());

        let first = deduplicate_and_store(&h.app.db, &posts).await.unwrap();
        assert_eq!(first.new_count, 3);

        let second = deduplicate_and_store(&h.app.db, &posts).await.unwrap();
        assert_eq!(second.new_count, 0);
        assert_eq!(second.skipped_count, second.total_count);
    }

    #[tokio::test]
    async fn test_rejects_non_zip() {
        let h = test_app(None).await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "[]").unwrap();

        let err = process_upload(&h.app, &path).await.unwrap_err();
        assert_eq!(err.to_string(), "Only .zip files are supported");
        assert!(h.app.db.latest_upload().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_archive_without_json_completes_empty() {
        let h = test_app(None).await;
        let dir = TempDir::new().unwrap();
        let zip = write_zip(dir.path(), "empty.zip", &[("readme.txt", "hi")]);

        let summary = process_upload(&h.app, &zip).await.unwrap();
        assert_eq!(summary.total_found, 0);
        let upload = h.app.db.latest_upload().await.unwrap().unwrap();
        assert_eq!(upload.status().unwrap(), UploadStatus::Completed);
    }

    #[tokio::test]
    async fn test_corrupt_archive_marks_failed() {
        let h = test_app(None).await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, b"not a zip").unwrap();

        assert!(process_upload(&h.app, &path).await.is_err());
        let upload = h.app.db.latest_upload().await.unwrap().unwrap();
        assert_eq!(upload.status().unwrap(), UploadStatus::Failed);
    }
}
