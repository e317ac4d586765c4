//! Domain models shared by ingestion, analysis and conversation.
//!
//! Metadata that used to be free-form JSON is modelled as tagged unions so
//! every consumer matches on a closed set of shapes.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform a post was exported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Twitter,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Youtube => write!(f, "youtube"),
            Platform::Twitter => write!(f, "twitter"),
        }
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "youtube" => Ok(Platform::Youtube),
            "twitter" => Ok(Platform::Twitter),
            _ => Err(Error::Parse(format!("Unknown platform: {}", s))),
        }
    }
}

/// Kind of content a post represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Tweet,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Video => write!(f, "video"),
            ContentType::Tweet => write!(f, "tweet"),
        }
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "video" => Ok(ContentType::Video),
            "tweet" => Ok(ContentType::Tweet),
            _ => Err(Error::Parse(format!("Unknown content type: {}", s))),
        }
    }
}

/// Source-specific details kept alongside a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostMetadata {
    Video {
        #[serde(default)]
        original_url: Option<String>,
    },
    Tweet {
        full_text: String,
        #[serde(default)]
        url: Option<String>,
    },
}

/// A post produced by the normalizer, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPost {
    pub platform: Platform,
    pub platform_post_id: Option<String>,
    pub content_type: ContentType,
    pub title: String,
    pub channel_name: String,
    pub watch_date: Option<DateTime<Utc>>,
    pub content_hash: String,
    pub metadata: PostMetadata,
}

/// Kinds of persisted analysis results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    SentimentSummary,
    BehavioralSummary,
    AvatarPersona,
    AutopsyReport,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::SentimentSummary => "sentiment_summary",
            AnalysisType::BehavioralSummary => "behavioral_summary",
            AnalysisType::AvatarPersona => "avatar_persona",
            AnalysisType::AutopsyReport => "autopsy_report",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sentiment_summary" => Ok(AnalysisType::SentimentSummary),
            "behavioral_summary" => Ok(AnalysisType::BehavioralSummary),
            "avatar_persona" => Ok(AnalysisType::AvatarPersona),
            "autopsy_report" => Ok(AnalysisType::AutopsyReport),
            _ => Err(Error::Parse(format!("Unknown analysis type: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub positive_ratio: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralSummary {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarPersona {
    pub system_prompt: String,
}

/// Fixed bias categories scored by the autopsy report, in display order
pub const BIAS_CATEGORIES: [&str; 6] = [
    "Narcissism",
    "Empathy",
    "Impulse",
    "Deception",
    "Validation",
    "Aggression",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasScore {
    pub name: String,
    pub score: u8,
}

/// Structured psychological profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutopsyReport {
    pub archetype: Archetype,
    pub biases: Vec<BiasScore>,
    pub drift_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Typed payload of an analysis result, one shape per [`AnalysisType`]
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisPayload {
    SentimentSummary(SentimentSummary),
    BehavioralSummary(BehavioralSummary),
    AvatarPersona(AvatarPersona),
    AutopsyReport(AutopsyReport),
}

impl AnalysisPayload {
    pub fn analysis_type(&self) -> AnalysisType {
        match self {
            AnalysisPayload::SentimentSummary(_) => AnalysisType::SentimentSummary,
            AnalysisPayload::BehavioralSummary(_) => AnalysisType::BehavioralSummary,
            AnalysisPayload::AvatarPersona(_) => AnalysisType::AvatarPersona,
            AnalysisPayload::AutopsyReport(_) => AnalysisType::AutopsyReport,
        }
    }

    /// Serialize the payload body (the type lives in its own column)
    pub fn to_json(&self) -> Result<String> {
        let json = match self {
            AnalysisPayload::SentimentSummary(v) => serde_json::to_string(v)?,
            AnalysisPayload::BehavioralSummary(v) => serde_json::to_string(v)?,
            AnalysisPayload::AvatarPersona(v) => serde_json::to_string(v)?,
            AnalysisPayload::AutopsyReport(v) => serde_json::to_string(v)?,
        };
        Ok(json)
    }

    /// Rebuild a payload from its stored type tag and body
    pub fn from_parts(analysis_type: AnalysisType, json: &str) -> Result<Self> {
        let payload = match analysis_type {
            AnalysisType::SentimentSummary => {
                AnalysisPayload::SentimentSummary(serde_json::from_str(json)?)
            }
            AnalysisType::BehavioralSummary => {
                AnalysisPayload::BehavioralSummary(serde_json::from_str(json)?)
            }
            AnalysisType::AvatarPersona => {
                AnalysisPayload::AvatarPersona(serde_json::from_str(json)?)
            }
            AnalysisType::AutopsyReport => {
                AnalysisPayload::AutopsyReport(serde_json::from_str(json)?)
            }
        };
        Ok(payload)
    }

    /// JSON value of the body, used by status responses
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.to_json()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_metadata_is_tagged() {
        let meta = PostMetadata::Tweet {
            full_text: "hello".to_string(),
            url: None,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["kind"], "tweet");

        let parsed: PostMetadata =
            serde_json::from_str(r#"{"kind":"video","original_url":"https://y.t/watch?v=1"}"#)
                .unwrap();
        assert_eq!(
            parsed,
            PostMetadata::Video {
                original_url: Some("https://y.t/watch?v=1".to_string())
            }
        );
    }

    #[test]
    fn test_payload_parts_follow_type_tag() {
        let payload = AnalysisPayload::AvatarPersona(AvatarPersona {
            system_prompt: "You are curious.".to_string(),
        });
        let json = payload.to_json().unwrap();
        assert_eq!(json, r#"{"system_prompt":"You are curious."}"#);

        let back = AnalysisPayload::from_parts(AnalysisType::AvatarPersona, &json).unwrap();
        assert_eq!(back, payload);

        // a body that does not match its tag is rejected
        assert!(AnalysisPayload::from_parts(AnalysisType::SentimentSummary, &json).is_err());
    }

    #[test]
    fn test_analysis_type_names() {
        for ty in [
            AnalysisType::SentimentSummary,
            AnalysisType::BehavioralSummary,
            AnalysisType::AvatarPersona,
            AnalysisType::AutopsyReport,
        ] {
            assert_eq!(ty.as_str().parse::<AnalysisType>().unwrap(), ty);
        }
        assert!("topic_map".parse::<AnalysisType>().is_err());
    }
}
