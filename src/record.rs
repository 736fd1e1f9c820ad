use serde::{Deserialize, Serialize};

/// A supported source platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Instagram,
    Tiktok,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
    Gif,
}

/// One fully-resolved media entry of the canonical record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub username: String,
    pub display_name: String,
    pub avatar: String,
    pub verified: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    pub text: String,
    pub media: Vec<MediaItem>,
}

/// Engagement counters. Every field is platform-dependent; fields the
/// platform does not report are omitted from the serialized record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reposts: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
}

impl Stats {
    pub fn is_empty(&self) -> bool {
        self.likes.is_none()
            && self.reposts.is_none()
            && self.replies.is_none()
            && self.views.is_none()
            && self.comments.is_none()
    }
}

/// The canonical output of the extraction pipeline.
///
/// When `embed_mode` is true the record carries only `embed_url` and the
/// client renders the platform's official widget; author/content/stats are
/// omitted entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// ISO-8601, or empty when the source did not provide one.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
    pub original_url: String,
    pub embed_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
}

impl ContentRecord {
    /// True if the record carries at least one directly playable video.
    pub fn has_playable_video(&self) -> bool {
        self.content
            .as_ref()
            .map(|c| {
                c.media
                    .iter()
                    .any(|m| m.kind == MediaKind::Video && !m.url.is_empty())
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_camel_case() {
        let record = ContentRecord {
            platform: Platform::Twitter,
            author: None,
            content: None,
            timestamp: String::new(),
            stats: None,
            original_url: "https://twitter.com/a/status/1".to_string(),
            embed_mode: true,
            embed_url: Some("https://platform.twitter.com/embed/Tweet.html?id=1".to_string()),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["platform"], "twitter");
        assert_eq!(json["embedMode"], true);
        assert_eq!(json["originalUrl"], "https://twitter.com/a/status/1");
        assert!(json.get("author").is_none());
        assert!(json.get("content").is_none());
        assert!(json.get("stats").is_none());
    }

    #[test]
    fn test_media_item_type_field() {
        let item = MediaItem {
            kind: MediaKind::Video,
            url: "https://example.com/v.mp4".to_string(),
            thumbnail: None,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "video");
        assert!(json.get("thumbnail").is_none());
    }

    #[test]
    fn test_has_playable_video() {
        let mut record = ContentRecord {
            platform: Platform::Tiktok,
            author: None,
            content: Some(Content {
                text: String::new(),
                media: vec![MediaItem {
                    kind: MediaKind::Image,
                    url: "https://example.com/i.jpg".to_string(),
                    thumbnail: None,
                }],
            }),
            timestamp: String::new(),
            stats: None,
            original_url: String::new(),
            embed_mode: false,
            embed_url: None,
        };
        assert!(!record.has_playable_video());

        record.content.as_mut().unwrap().media.push(MediaItem {
            kind: MediaKind::Video,
            url: "https://example.com/v.mp4".to_string(),
            thumbnail: None,
        });
        assert!(record.has_playable_video());
    }

    #[test]
    fn test_empty_stats_detection() {
        assert!(Stats::default().is_empty());
        assert!(!Stats {
            views: Some(1),
            ..Default::default()
        }
        .is_empty());
    }
}
