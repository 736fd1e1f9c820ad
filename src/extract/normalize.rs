use crate::extract::candidate::Candidate;
use crate::extract::errors::ExtractError;
use crate::record::{Author, Content, ContentRecord, MediaItem, Platform, Stats};

/// Collapse a raw candidate into the canonical record.
///
/// Deterministic field mapping: absent optionals become empty strings or are
/// omitted, never null. Output media are fully resolved and keep discovery
/// order; a video placeholder that survived this far is dropped here as the
/// last line of defense. A candidate with nothing usable at all signals
/// insufficient data instead of producing an empty record.
pub fn normalize(
    candidate: Candidate,
    platform: Platform,
    original_url: &str,
) -> Result<ContentRecord, ExtractError> {
    if !candidate.has_any_data() {
        return Err(ExtractError::Normalization(
            "candidate has no usable fields".to_string(),
        ));
    }

    let media: Vec<MediaItem> = candidate
        .media
        .into_iter()
        .filter(|m| {
            if m.is_placeholder() {
                log::warn!("dropping unresolved video placeholder before output");
                return false;
            }
            !m.url.is_empty()
        })
        .map(|m| MediaItem {
            kind: m.kind,
            url: m.url,
            thumbnail: m.thumbnail.filter(|t| !t.is_empty()),
        })
        .collect();

    let author = Author {
        username: candidate.author_username.unwrap_or_default(),
        display_name: candidate.author_display_name.unwrap_or_default(),
        avatar: candidate.author_avatar.unwrap_or_default(),
        verified: candidate.author_verified.unwrap_or(false),
    };

    let stats = Stats {
        likes: candidate.stats.likes,
        reposts: candidate.stats.reposts,
        replies: candidate.stats.replies,
        views: candidate.stats.views,
        comments: candidate.stats.comments,
    };

    Ok(ContentRecord {
        platform,
        author: Some(author),
        content: Some(Content {
            text: candidate.text.unwrap_or_default(),
            media,
        }),
        timestamp: candidate.timestamp.unwrap_or_default(),
        stats: if stats.is_empty() { None } else { Some(stats) },
        original_url: original_url.to_string(),
        embed_mode: false,
        embed_url: None,
    })
}
