//! Content normalization
//!
//! Turns a parsed export document into [`NormalizedPost`]s. Two shapes are
//! recognized:
//! - Google Takeout watch history (a JSON array)
//! - Scraped activity (an object with `captions` and/or `tweets` arrays)
//!
//! Normalization is a pure transform. Malformed records are skipped.

pub mod fingerprint;
pub mod scraped;
pub mod takeout;

pub use fingerprint::fingerprint;

use crate::models::NormalizedPost;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

/// Normalize an export document into posts, in source order
pub fn normalize_export(raw: &Value) -> Vec<NormalizedPost> {
    match raw {
        Value::Array(entries) => {
            info!("Detected Takeout format with {} entries", entries.len());
            takeout::parse_entries(entries)
        }
        Value::Object(map) => {
            info!("Detected scraped activity format");
            let mut posts = Vec::new();

            if let Some(Value::Array(captions)) = map.get("captions") {
                info!("Found {} YouTube entries", captions.len());
                posts.extend(scraped::parse_captions(captions));
            }

            if let Some(Value::Array(tweets)) = map.get("tweets") {
                info!("Found {} Twitter entries", tweets.len());
                posts.extend(scraped::parse_tweets(tweets));
            }

            posts
        }
        other => {
            warn!("Unknown export format: {}", json_kind(other));
            Vec::new()
        }
    }
}

/// Parse an ISO 8601 timestamp into UTC. Values without an offset are
/// read as UTC.
pub fn parse_iso_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(d) = DateTime::parse_from_rfc3339(&value.replace('Z', "+00:00")) {
        return Some(d.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Parse a scraped `DD/MM/YYYY, HH:MM:SS` timestamp, read as UTC
pub fn parse_scraped_timestamp(value: &str) -> Option<DateTime<Utc>> {
    match NaiveDateTime::parse_from_str(value, "%d/%m/%Y, %H:%M:%S") {
        Ok(naive) => Some(naive.and_utc()),
        Err(e) => {
            warn!("Failed to parse date {}: {}", value, e);
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_dispatch_by_shape() {
        let takeout = json!([{
            "title": "Watched Intro to Rust",
            "time": "2024-03-01T10:00:00.000Z",
            "subtitles": [{"name": "Rustacean"}]
        }]);
        assert_eq!(normalize_export(&takeout).len(), 1);

        let scraped = json!({
            "tweets": [{"text": "hello world", "timestamp": "09/02/2026, 16:23:49"}],
            "captions": [{"title": "A video", "author": "Someone"}]
        });
        let posts = normalize_export(&scraped);
        assert_eq!(posts.len(), 2);
        // captions come first regardless of key order
        assert_eq!(posts[0].platform, Platform::Youtube);
        assert_eq!(posts[1].platform, Platform::Twitter);

        assert!(normalize_export(&json!("nope")).is_empty());
        assert!(normalize_export(&json!({"other": []})).is_empty());
    }

    #[test]
    fn test_same_video_fingerprints_match_across_formats() {
        let takeout = normalize_export(&json!([{
            "title": "Watched Same Video",
            "time": "2026-02-09T16:23:49Z",
            "subtitles": [{"name": "Chan"}]
        }]));
        let scraped = normalize_export(&json!({
            "captions": [{
                "title": "Same Video",
                "author": "Chan",
                "timestamp": "09/02/2026, 16:23:49"
            }]
        }));

        assert_eq!(takeout.len(), 1);
        assert_eq!(scraped.len(), 1);
        assert_eq!(takeout[0].watch_date, scraped[0].watch_date);
        assert_eq!(takeout[0].content_hash, scraped[0].content_hash);
    }

    #[test]
    fn test_takeout_time_without_offset_is_utc() {
        let posts = normalize_export(&json!([{
            "title": "Watched Naive Clock",
            "time": "2023-10-27T14:30:00",
            "subtitles": [{"name": "Chan"}]
        }]));

        assert_eq!(
            posts[0].watch_date,
            Some(Utc.with_ymd_and_hms(2023, 10, 27, 14, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_timestamp_parsers() {
        let expected = Some(Utc.with_ymd_and_hms(2023, 10, 27, 14, 30, 0).unwrap());
        assert_eq!(parse_iso_timestamp("2023-10-27T14:30:00.000Z"), expected);
        assert_eq!(parse_iso_timestamp("2023-10-27T16:30:00+02:00"), expected);
        assert_eq!(parse_iso_timestamp("2023-10-27T14:30:00"), expected);
        assert_eq!(parse_iso_timestamp("2023-10-27 14:30:00"), expected);
        assert!(parse_iso_timestamp("yesterday").is_none());

        assert_eq!(
            parse_scraped_timestamp("09/02/2026, 16:23:49"),
            Some(Utc.with_ymd_and_hms(2026, 2, 9, 16, 23, 49).unwrap())
        );
        assert!(parse_scraped_timestamp("2026-02-09").is_none());
    }
}
