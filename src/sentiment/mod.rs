//! Sentiment classification of post titles

use crate::config::SentimentConfig;
use crate::error::Result;
use crate::model_backend::{Classification, ModelBackendClient};
use crate::models::SentimentSummary;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, warn};

pub const POSITIVE: &str = "POSITIVE";
pub const NEUTRAL: &str = "NEUTRAL";

/// Labels a batch of texts; never fails, degrading to neutral verdicts
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, texts: &[String]) -> Vec<Classification>;
}

pub fn neutral(count: usize) -> Vec<Classification> {
    vec![
        Classification {
            label: NEUTRAL.to_string(),
            score: 0.5,
        };
        count
    ]
}

/// Classifier used when no sentiment backend is configured
pub struct NeutralClassifier;

#[async_trait]
impl SentimentClassifier for NeutralClassifier {
    async fn classify(&self, texts: &[String]) -> Vec<Classification> {
        neutral(texts.len())
    }
}

/// Classifier backed by the model sidecar's `/v1/classify`
pub struct HttpSentimentClassifier {
    client: ModelBackendClient,
    max_chars: usize,
}

impl HttpSentimentClassifier {
    pub fn new(backend_url: &str, max_chars: usize) -> Result<Self> {
        Ok(Self {
            client: ModelBackendClient::new(backend_url)?,
            max_chars,
        })
    }
}

#[async_trait]
impl SentimentClassifier for HttpSentimentClassifier {
    async fn classify(&self, texts: &[String]) -> Vec<Classification> {
        if texts.is_empty() {
            return Vec::new();
        }

        let truncated: Vec<String> = texts
            .iter()
            .map(|t| t.chars().take(self.max_chars).collect())
            .collect();

        match self.client.classify(truncated).await {
            Ok(results) if results.len() == texts.len() => results,
            Ok(results) => {
                error!(
                    "Sentiment backend returned {} labels for {} texts",
                    results.len(),
                    texts.len()
                );
                neutral(texts.len())
            }
            Err(e) => {
                error!("Error during sentiment analysis: {}", e);
                neutral(texts.len())
            }
        }
    }
}

pub fn create_classifier(config: &SentimentConfig) -> Result<Arc<dyn SentimentClassifier>> {
    match &config.backend_url {
        Some(url) => Ok(Arc::new(HttpSentimentClassifier::new(url, config.max_chars)?)),
        None => {
            warn!("No sentiment backend configured; all posts will be scored neutral");
            Ok(Arc::new(NeutralClassifier))
        }
    }
}

/// Share of positive labels
pub fn summarize(labels: &[Classification]) -> SentimentSummary {
    let positive = labels.iter().filter(|l| l.label == POSITIVE).count();
    let positive_ratio = if labels.is_empty() {
        0.0
    } else {
        positive as f64 / labels.len() as f64
    };
    SentimentSummary {
        positive_ratio,
        count: labels.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn label(l: &str) -> Classification {
        Classification {
            label: l.to_string(),
            score: 0.9,
        }
    }

    #[test]
    fn test_summarize_ratio() {
        let summary = summarize(&[label("POSITIVE"), label("NEGATIVE"), label("POSITIVE"), label("NEUTRAL")]);
        assert_eq!(summary.count, 4);
        assert!((summary.positive_ratio - 0.5).abs() < f64::EPSILON);

        assert_eq!(summarize(&[]).positive_ratio, 0.0);
    }

    #[tokio::test]
    async fn test_backend_failure_is_neutral() {
        let classifier = HttpSentimentClassifier::new("http://127.0.0.1:9", 512).unwrap();
        let labels = classifier
            .classify(&["great".to_string(), "awful".to_string()])
            .await;
        assert_eq!(labels, neutral(2));
    }

    #[tokio::test]
    async fn test_inputs_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/classify"))
            .respond_with(|req: &Request| {
                let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
                let len = body["inputs"][0].as_str().unwrap().chars().count();
                let verdict = if len == 4 { "POSITIVE" } else { "NEGATIVE" };
                ResponseTemplate::new(200)
                    .set_body_json(json!({"results": [{"label": verdict, "score": 0.99}]}))
            })
            .mount(&server)
            .await;

        let classifier = HttpSentimentClassifier::new(&server.uri(), 4).unwrap();
        let labels = classifier.classify(&["abcdefgh".to_string()]).await;
        assert_eq!(labels[0].label, "POSITIVE");
    }

    #[tokio::test]
    async fn test_count_mismatch_is_neutral() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/classify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let classifier = HttpSentimentClassifier::new(&server.uri(), 512).unwrap();
        assert_eq!(classifier.classify(&["x".to_string()]).await, neutral(1));
    }
}
