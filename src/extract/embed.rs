use crate::record::{ContentRecord, Platform};
use once_cell::sync::Lazy;
use regex::Regex;

static TWEET_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/status(?:es)?/(\d+)").unwrap());

static INSTAGRAM_SHORTCODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(?:p|reel|reels|tv)/([A-Za-z0-9_-]+)").unwrap());

static TIKTOK_VIDEO_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/video/(\d+)").unwrap());

/// Derive the platform's official embed-widget URL for a post.
///
/// Alternate domains collapse to the primary one as a side effect of working
/// from the extracted id/shortcode alone. Unrecognized shapes come back
/// unchanged; this function never fails.
pub fn build_embed_url(platform: Platform, url: &str) -> String {
    match platform {
        Platform::Twitter => TWEET_ID
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|id| {
                format!(
                    "https://platform.twitter.com/embed/Tweet.html?id={}",
                    id.as_str()
                )
            })
            .unwrap_or_else(|| url.to_string()),

        Platform::Instagram => INSTAGRAM_SHORTCODE
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|code| format!("https://www.instagram.com/p/{}/embed/", code.as_str()))
            .unwrap_or_else(|| url.to_string()),

        Platform::Tiktok => TIKTOK_VIDEO_ID
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|id| format!("https://www.tiktok.com/embed/v2/{}", id.as_str()))
            .unwrap_or_else(|| url.to_string()),
    }
}

/// Terminal fallback record: the client renders the official widget.
pub fn build_embed_record(platform: Platform, url: &str) -> ContentRecord {
    ContentRecord {
        platform,
        author: None,
        content: None,
        timestamp: String::new(),
        stats: None,
        original_url: url.to_string(),
        embed_mode: true,
        embed_url: Some(build_embed_url(platform, url)),
    }
}
