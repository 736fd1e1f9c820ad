use crate::record::MediaKind;
use serde::Deserialize;

/// Raw media entry as an extractor saw it. A video with an empty url is a
/// placeholder ("a video exists here but its address is unknown yet") and is
/// only meaningful inside the pipeline; the reconciler fills or drops it
/// before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMedia {
    pub kind: MediaKind,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl RawMedia {
    pub fn is_placeholder(&self) -> bool {
        self.kind == MediaKind::Video && self.url.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStats {
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub reposts: Option<u64>,
    #[serde(default)]
    pub replies: Option<u64>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub comments: Option<u64>,
}

/// Extractor-specific raw output, before normalization.
///
/// Every field tolerates absence. The shape doubles as the deserialization
/// target for the in-page DOM extraction script, which returns it as JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub author_username: Option<String>,
    #[serde(default)]
    pub author_display_name: Option<String>,
    #[serde(default)]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub author_verified: Option<bool>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub media: Vec<RawMedia>,
    /// ISO-8601 when the source provides one.
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub stats: RawStats,
}

impl Candidate {
    /// True if any field worth normalizing is present.
    pub fn has_any_data(&self) -> bool {
        self.author_username.is_some()
            || self.author_display_name.is_some()
            || self.text.is_some()
            || !self.media.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_parses_from_dom_json() {
        let json = r#"{
            "author_username": "jack",
            "author_display_name": "Jack",
            "text": "just setting up",
            "media": [
                {"kind": "video", "url": "", "thumbnail": "https://example.com/t.jpg"}
            ],
            "stats": {"likes": 3, "views": 100}
        }"#;

        let candidate: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.author_username.as_deref(), Some("jack"));
        assert_eq!(candidate.media.len(), 1);
        assert!(candidate.media[0].is_placeholder());
        assert_eq!(candidate.stats.likes, Some(3));
        assert_eq!(candidate.stats.reposts, None);
    }

    #[test]
    fn test_candidate_tolerates_empty_object() {
        let candidate: Candidate = serde_json::from_str("{}").unwrap();
        assert!(!candidate.has_any_data());
    }
}
