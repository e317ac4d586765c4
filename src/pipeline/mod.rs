//! Background analysis pipeline
//!
//! Stages run in a fixed order and each persists its output before the next
//! starts, so a failure part-way keeps the earlier results.

use crate::app::App;
use crate::cluster::cluster_texts;
use crate::embed::embed_in_batches;
use crate::error::{Error, Result};
use crate::events::{Event, EventType};
use crate::meta::{JobStatus, Post, Topic};
use crate::models::{AnalysisPayload, AvatarPersona, BehavioralSummary};
use crate::progress::start_stage_bar;
use crate::sentiment;
use crate::store::{PostPayload, PostPoint};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const STAGE_COUNT: usize = 4;
const CANCELLED: &str = "cancelled";
const NO_POSTS: &str = "No posts to analyze";

/// A running analysis job
pub struct JobHandle {
    pub job_id: String,
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl JobHandle {
    /// Request cancellation; honored between stages
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Wait for the background task to finish
    pub async fn wait(self) -> Result<()> {
        self.handle
            .await
            .map_err(|e| Error::Other(format!("Analysis task failed: {}", e)))
    }
}

/// Create a pending job and run the pipeline on a detached task
pub async fn start_analysis(app: Arc<App>) -> Result<JobHandle> {
    let job = app.db.create_job().await?;
    let job_id = job.id.clone();
    let (cancel, cancelled) = watch::channel(false);

    info!("Starting analysis job {}", job_id);
    let task_job_id = job_id.clone();
    let handle = tokio::spawn(async move {
        let worker = tokio::spawn({
            let app = app.clone();
            let job_id = task_job_id.clone();
            async move { run_job(&app, &job_id, cancelled).await }
        });
        if let Err(e) = worker.await {
            fail_job(&app, &task_job_id, &format!("Analysis task aborted: {}", e)).await;
        }
    });

    Ok(JobHandle {
        job_id,
        cancel,
        handle,
    })
}

/// Drive one job through its lifecycle, recording the outcome
pub async fn run_job(app: &App, job_id: &str, cancelled: watch::Receiver<bool>) {
    if let Err(e) = app
        .db
        .transition_job(job_id, JobStatus::InProgress, None)
        .await
    {
        error!("Could not start job {}: {}", job_id, e);
        fail_job(app, job_id, &e.to_string()).await;
        return;
    }
    app.events.publish(Event::with_data(
        EventType::AnalysisStarted,
        json!({ "job_id": job_id }),
    ));

    match run_pipeline(app, job_id, &cancelled).await {
        Ok(()) => {
            if let Err(e) = app
                .db
                .transition_job(job_id, JobStatus::Completed, None)
                .await
            {
                error!("Failed to mark job {} completed: {}", job_id, e);
                return;
            }
            info!("Analysis job {} completed", job_id);
            app.events.publish(Event::with_data(
                EventType::AnalysisComplete,
                json!({ "job_id": job_id }),
            ));
        }
        Err(e) => {
            error!("Analysis job {} failed: {}", job_id, e);
            fail_job(app, job_id, &e.to_string()).await;
        }
    }
}

/// Mark a job failed and announce it; a job that cannot be marked (already
/// finished, or gone) is left alone
async fn fail_job(app: &App, job_id: &str, message: &str) {
    if let Err(e) = app
        .db
        .transition_job(job_id, JobStatus::Failed, Some(message))
        .await
    {
        error!("Failed to mark job {} failed: {}", job_id, e);
        return;
    }
    let mut event = Event::with_data(EventType::AnalysisFailed, json!({ "job_id": job_id }));
    event.message = Some(message.to_string());
    app.events.publish(event);
}

fn check_cancelled(cancelled: &watch::Receiver<bool>) -> Result<()> {
    if *cancelled.borrow() {
        return Err(Error::Other(CANCELLED.to_string()));
    }
    Ok(())
}

fn report(app: &App, bar: &indicatif::ProgressBar, message: &str) {
    bar.inc(1);
    bar.set_message(message.to_string());
    app.events
        .publish(Event::with_message(EventType::AnalysisProgress, message));
}

/// The analysis stages for an already-started job
pub async fn run_pipeline(
    app: &App,
    job_id: &str,
    cancelled: &watch::Receiver<bool>,
) -> Result<()> {
    check_cancelled(cancelled)?;

    let posts = app.db.list_active_posts().await?;
    if posts.is_empty() {
        return Err(Error::Other(NO_POSTS.to_string()));
    }
    let titles: Vec<String> = posts.iter().map(|p| p.title.clone()).collect();
    info!("Analyzing {} posts for job {}", posts.len(), job_id);

    let bar = start_stage_bar(STAGE_COUNT);

    // 1. Sentiment
    bar.set_message("Running sentiment analysis");
    let labels = app.sentiment.classify(&titles).await;
    app.db
        .insert_result(
            job_id,
            &AnalysisPayload::SentimentSummary(sentiment::summarize(&labels)),
        )
        .await?;
    report(app, &bar, "Sentiment analysis complete");
    check_cancelled(cancelled)?;

    // 2. Embeddings
    bar.set_message("Generating embeddings");
    let vectors = embed_in_batches(
        app.embedder.as_ref(),
        titles.clone(),
        app.config.embedding.batch_size,
    )
    .await?;
    sync_vectors(app, &posts, vectors).await;
    report(app, &bar, "Embeddings generated and synced");
    check_cancelled(cancelled)?;

    // 3. Clustering
    bar.set_message("Clustering topics");
    let analysis = &app.config.analysis;
    let clusters = cluster_texts(
        &titles,
        analysis.cluster_count,
        analysis.max_features,
        analysis.keywords_per_cluster,
    );
    for cluster in &clusters {
        let post_ids: Vec<String> = cluster
            .indices
            .iter()
            .filter_map(|&i| posts.get(i).map(|p| p.id.clone()))
            .collect();
        app.db
            .insert_topic(&Topic::new(
                job_id.to_string(),
                format!("Topic {}", cluster.id),
                &cluster.keywords,
                &post_ids,
            ))
            .await?;
    }
    report(app, &bar, "Topic clustering complete");
    check_cancelled(cancelled)?;

    // 4. Summary and persona
    bar.set_message("Generating AI summaries");
    let cluster_lines: Vec<String> = clusters
        .iter()
        .map(|c| format!("Cluster {}: {}", c.id, c.keywords.join(", ")))
        .collect();
    let prompt = format!(
        "Analyze these video clusters from a user's watch history:\n{}\n\nWhat are the key behavioral patterns?",
        cluster_lines.join("\n")
    );
    let summary = app.summarizer.generate_summary(&prompt, None).await;
    app.db
        .insert_result(
            job_id,
            &AnalysisPayload::BehavioralSummary(BehavioralSummary {
                text: summary.clone(),
            }),
        )
        .await?;

    let persona = app.summarizer.generate_avatar_persona(&summary).await;
    app.db
        .insert_result(
            job_id,
            &AnalysisPayload::AvatarPersona(AvatarPersona {
                system_prompt: persona,
            }),
        )
        .await?;
    report(app, &bar, "AI summaries generated");
    bar.finish_and_clear();

    Ok(())
}

/// Upsert post vectors; index failures are logged and do not fail the job
async fn sync_vectors(app: &App, posts: &[Post], vectors: Vec<Vec<f32>>) {
    let points: Vec<PostPoint> = posts
        .iter()
        .zip(vectors)
        .map(|(post, vector)| PostPoint {
            id: post.id.clone(),
            vector,
            payload: PostPayload {
                post_id: post.id.clone(),
                title: post.title.clone(),
                channel: post.channel_name.clone(),
                date: post.display_date(),
            },
        })
        .collect();

    let count = points.len();
    let result: Result<()> = async {
        app.index.ensure_ready().await?;
        app.index.upsert(points).await
    }
    .await;

    match result {
        Ok(()) => info!("Synced {} vectors", count),
        Err(e) => warn!("Vector sync failed, continuing without it: {}", e),
    }
}
