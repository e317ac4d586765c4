//! Scraped activity entries (browser-extension captures)

use super::{fingerprint, parse_scraped_timestamp};
use crate::models::{ContentType, NormalizedPost, Platform, PostMetadata};
use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;

const DEFAULT_ACTION: &str = "Tweeted";
const TWEET_TITLE_GRAPHEMES: usize = 50;

fn str_field<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry.get(key).and_then(Value::as_str)
}

/// YouTube captures; entries need a non-empty `title`
pub fn parse_captions(entries: &[Value]) -> Vec<NormalizedPost> {
    entries
        .iter()
        .filter_map(|entry| {
            let title = str_field(entry, "title").filter(|t| !t.is_empty())?;
            let channel_name = str_field(entry, "author").unwrap_or("Unknown");
            let watch_date = str_field(entry, "timestamp").and_then(parse_scraped_timestamp);

            Some(NormalizedPost {
                platform: Platform::Youtube,
                platform_post_id: str_field(entry, "videoId").map(ToString::to_string),
                content_type: ContentType::Video,
                title: title.to_string(),
                channel_name: channel_name.to_string(),
                watch_date,
                content_hash: fingerprint(title, channel_name, watch_date.as_ref()),
                metadata: PostMetadata::Video {
                    original_url: str_field(entry, "url").map(ToString::to_string),
                },
            })
        })
        .collect()
}

/// Twitter captures; entries need a non-empty `text`
pub fn parse_tweets(entries: &[Value]) -> Vec<NormalizedPost> {
    entries
        .iter()
        .filter_map(|entry| {
            let text = str_field(entry, "text").filter(|t| !t.is_empty())?;
            let action = str_field(entry, "action").unwrap_or(DEFAULT_ACTION);
            let watch_date = str_field(entry, "timestamp").and_then(parse_scraped_timestamp);

            Some(NormalizedPost {
                platform: Platform::Twitter,
                platform_post_id: None,
                content_type: ContentType::Tweet,
                title: tweet_title(action, text),
                channel_name: action.to_string(),
                watch_date,
                content_hash: fingerprint(text, action, watch_date.as_ref()),
                metadata: PostMetadata::Tweet {
                    full_text: text.to_string(),
                    url: str_field(entry, "url").map(ToString::to_string),
                },
            })
        })
        .collect()
}

fn tweet_title(action: &str, text: &str) -> String {
    let head: String = text.graphemes(true).take(TWEET_TITLE_GRAPHEMES).collect();
    format!("{}: {}...", action, head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_captions() {
        let entries = vec![
            json!({
                "title": "Building a compiler",
                "videoId": "vid1",
                "author": "Tsoding",
                "url": "https://youtube.com/watch?v=vid1",
                "timestamp": "09/02/2026, 16:23:49"
            }),
            json!({"title": "", "author": "Nobody"}),
            json!({"title": "Anonymous upload"}),
        ];

        let posts = parse_captions(&entries);
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].platform_post_id.as_deref(), Some("vid1"));
        assert!(posts[0].watch_date.is_some());
        assert_eq!(posts[1].channel_name, "Unknown");
        assert!(posts[1].watch_date.is_none());
    }

    #[test]
    fn test_tweets() {
        let long = "a".repeat(80);
        let entries = vec![
            json!({"text": long, "action": "Liked", "url": "https://x.com/1"}),
            json!({"text": "short one", "timestamp": "01/01/2025, 00:00:00"}),
            json!({"action": "Liked"}),
        ];

        let posts = parse_tweets(&entries);
        assert_eq!(posts.len(), 2);

        assert_eq!(posts[0].title, format!("Liked: {}...", "a".repeat(50)));
        assert_eq!(posts[0].channel_name, "Liked");
        assert_eq!(
            posts[0].metadata,
            PostMetadata::Tweet {
                full_text: "a".repeat(80),
                url: Some("https://x.com/1".to_string())
            }
        );

        assert_eq!(posts[1].title, "Tweeted: short one...");
        // fingerprint covers the full text, not the truncated title
        assert_eq!(
            posts[1].content_hash,
            fingerprint("short one", "Tweeted", posts[1].watch_date.as_ref())
        );
    }

    #[test]
    fn test_tweet_title_keeps_graphemes_whole() {
        let text = "👍🏽".repeat(60);
        let title = tweet_title("Tweeted", &text);
        assert_eq!(title, format!("Tweeted: {}...", "👍🏽".repeat(50)));
    }
}
