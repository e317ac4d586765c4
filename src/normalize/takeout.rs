//! Google Takeout watch-history entries

use super::{fingerprint, parse_iso_timestamp};
use crate::models::{ContentType, NormalizedPost, Platform, PostMetadata};
use serde_json::Value;
use tracing::{debug, info};

const WATCHED_PREFIX: &str = "Watched ";
const MUSIC_VISIT_MARKER: &str = "Visited YouTube Music";
const UNKNOWN_CHANNEL: &str = "Unknown";

/// Parse Takeout entries; entries without `title` or `time` are skipped
pub fn parse_entries(entries: &[Value]) -> Vec<NormalizedPost> {
    let posts: Vec<NormalizedPost> = entries.iter().filter_map(parse_entry).collect();
    info!("Parsed {} YouTube videos", posts.len());
    posts
}

fn parse_entry(entry: &Value) -> Option<NormalizedPost> {
    let obj = entry.as_object()?;
    if !obj.contains_key("title") || !obj.contains_key("time") {
        return None;
    }

    let title = obj.get("title")?.as_str()?.replacen(WATCHED_PREFIX, "", 1);
    if title.contains(MUSIC_VISIT_MARKER) {
        debug!("Skipping music visit entry");
        return None;
    }

    let title_url = obj.get("titleUrl").and_then(Value::as_str);
    let video_id = title_url.and_then(video_id_from_url);

    let channel_name = obj
        .get("subtitles")
        .and_then(Value::as_array)
        .and_then(|subs| subs.first())
        .and_then(|first| first.get("name"))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_CHANNEL)
        .to_string();

    let watch_date = obj
        .get("time")
        .and_then(Value::as_str)
        .and_then(parse_iso_timestamp);

    let content_hash = fingerprint(&title, &channel_name, watch_date.as_ref());

    Some(NormalizedPost {
        platform: Platform::Youtube,
        platform_post_id: video_id,
        content_type: ContentType::Video,
        title,
        channel_name,
        watch_date,
        content_hash,
        metadata: PostMetadata::Video {
            original_url: title_url.map(ToString::to_string),
        },
    })
}

/// The segment after the first `v=` marker, up to the next one
fn video_id_from_url(url: &str) -> Option<String> {
    url.split("v=").nth(1).map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_parses_valid_entry() {
        let entries = vec![json!({
            "header": "YouTube",
            "title": "Watched How CPUs work",
            "titleUrl": "https://www.youtube.com/watch?v=abc123",
            "subtitles": [{"name": "Branch Education", "url": "https://..."}],
            "time": "2023-10-27T14:30:00.000Z"
        })];

        let posts = parse_entries(&entries);
        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.title, "How CPUs work");
        assert_eq!(post.channel_name, "Branch Education");
        assert_eq!(post.platform_post_id.as_deref(), Some("abc123"));
        assert_eq!(
            post.watch_date,
            Some(Utc.with_ymd_and_hms(2023, 10, 27, 14, 30, 0).unwrap())
        );
        assert_eq!(
            post.content_hash,
            fingerprint("How CPUs work", "Branch Education", post.watch_date.as_ref())
        );
    }

    #[test]
    fn test_skips_incomplete_and_music_entries() {
        let entries = vec![
            json!({"title": "Watched No time here"}),
            json!({"time": "2023-10-27T14:30:00Z"}),
            json!({"title": "Visited YouTube Music", "time": "2023-10-27T14:30:00Z"}),
            json!("not an object"),
        ];
        assert!(parse_entries(&entries).is_empty());
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let entries = vec![json!({"title": "Watched Mystery", "time": "garbage"})];
        let posts = parse_entries(&entries);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].channel_name, "Unknown");
        assert!(posts[0].watch_date.is_none());
        assert!(posts[0].platform_post_id.is_none());
    }

    #[test]
    fn test_video_id_segment() {
        assert_eq!(
            video_id_from_url("https://youtube.com/watch?v=xyz&list=1"),
            Some("xyz&list=1".to_string())
        );
        assert_eq!(
            video_id_from_url("https://youtube.com/watch?v=a&v=b"),
            Some("a&".to_string())
        );
        assert_eq!(video_id_from_url("https://youtube.com/channel/x"), None);
    }
}
