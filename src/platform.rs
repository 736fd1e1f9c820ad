use crate::record::Platform;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

const TWITTER_HOSTS: &[&str] = &[
    "twitter.com",
    "www.twitter.com",
    "mobile.twitter.com",
    "x.com",
    "www.x.com",
];

const INSTAGRAM_HOSTS: &[&str] = &["instagram.com", "www.instagram.com", "instagr.am"];

const TIKTOK_HOSTS: &[&str] = &["tiktok.com", "www.tiktok.com", "m.tiktok.com"];

/// Shortened share links that redirect to a canonical post URL.
const TIKTOK_SHORT_HOSTS: &[&str] = &["vm.tiktok.com", "vt.tiktok.com"];

static TWITTER_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/[A-Za-z0-9_]{1,15}/status(?:es)?/\d+").unwrap());

static INSTAGRAM_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(?:[A-Za-z0-9_.]+/)?(?:p|reel|reels|tv)/[A-Za-z0-9_-]+").unwrap());

static TIKTOK_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(?:@[A-Za-z0-9_.-]+/video/\d+|t/[A-Za-z0-9]+)").unwrap());

static TIKTOK_SHORT_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/[A-Za-z0-9]+/?$").unwrap());

/// Classify a URL into a supported platform.
///
/// Matching is structural (host allowlist plus path shape), never a plain
/// substring scan, so a post link smuggled inside another URL's query string
/// does not match. Returns `None` for anything unrecognized.
pub fn detect(url: &str) -> Option<Platform> {
    let parsed = Url::parse(url).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let host = parsed.host_str()?.to_lowercase();
    let path = parsed.path();

    if TWITTER_HOSTS.contains(&host.as_str()) && TWITTER_PATH.is_match(path) {
        return Some(Platform::Twitter);
    }

    if INSTAGRAM_HOSTS.contains(&host.as_str()) && INSTAGRAM_PATH.is_match(path) {
        return Some(Platform::Instagram);
    }

    if TIKTOK_HOSTS.contains(&host.as_str()) && TIKTOK_PATH.is_match(path) {
        return Some(Platform::Tiktok);
    }

    if TIKTOK_SHORT_HOSTS.contains(&host.as_str()) && TIKTOK_SHORT_PATH.is_match(path) {
        return Some(Platform::Tiktok);
    }

    None
}

/// True if the URL is a shortened share link that must be resolved to the
/// canonical post URL before a page can be driven against it.
pub fn is_short_link(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .map(|host| TIKTOK_SHORT_HOSTS.contains(&host.as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_twitter_status_urls() {
        let urls = [
            "https://twitter.com/jack/status/20",
            "https://x.com/jack/status/20",
            "https://mobile.twitter.com/jack/statuses/20",
            "http://www.x.com/someone_else/status/1234567890123456789",
        ];
        for url in urls {
            assert_eq!(detect(url), Some(Platform::Twitter), "{url}");
        }
    }

    #[test]
    fn test_detect_instagram_urls() {
        let urls = [
            "https://www.instagram.com/p/Cabc123_-x/",
            "https://instagram.com/reel/Cabc123/",
            "https://www.instagram.com/tv/Cabc123/",
            "https://www.instagram.com/someuser/p/Cabc123/",
            "https://instagr.am/p/Cabc123/",
        ];
        for url in urls {
            assert_eq!(detect(url), Some(Platform::Instagram), "{url}");
        }
    }

    #[test]
    fn test_detect_tiktok_urls() {
        let urls = [
            "https://www.tiktok.com/@somebody/video/7123456789012345678",
            "https://m.tiktok.com/@some.body/video/7123456789012345678",
            "https://www.tiktok.com/t/ZTRabc123/",
            "https://vm.tiktok.com/ZTRabc123/",
            "https://vt.tiktok.com/ZTRabc123",
        ];
        for url in urls {
            assert_eq!(detect(url), Some(Platform::Tiktok), "{url}");
        }
    }

    #[test]
    fn test_detect_rejects_unrelated_urls() {
        let urls = [
            "https://example.com/post/1",
            "https://news.ycombinator.com/item?id=1",
            "ftp://twitter.com/jack/status/20",
            "not a url at all",
        ];
        for url in urls {
            assert_eq!(detect(url), None, "{url}");
        }
    }

    #[test]
    fn test_detect_rejects_post_link_in_query_param() {
        // The post URL only appears as a query parameter of an unrelated
        // host; structural matching must not be fooled.
        let url = "https://example.com/redirect?to=https://twitter.com/jack/status/20";
        assert_eq!(detect(url), None);

        let url = "https://example.com/?u=https%3A%2F%2Fx.com%2Fjack%2Fstatus%2F20";
        assert_eq!(detect(url), None);
    }

    #[test]
    fn test_detect_rejects_non_post_paths() {
        let urls = [
            "https://twitter.com/jack",
            "https://twitter.com/home",
            "https://www.instagram.com/someuser/",
            "https://www.tiktok.com/@somebody",
            "https://www.tiktok.com/foryou",
        ];
        for url in urls {
            assert_eq!(detect(url), None, "{url}");
        }
    }

    #[test]
    fn test_detect_is_stable_for_canonical_urls() {
        // Canonical URLs of each platform round-trip to that platform.
        let cases = [
            ("https://twitter.com/jack/status/20", Platform::Twitter),
            ("https://www.instagram.com/p/Cabc123/", Platform::Instagram),
            (
                "https://www.tiktok.com/@somebody/video/7123456789012345678",
                Platform::Tiktok,
            ),
        ];
        for (url, platform) in cases {
            assert_eq!(detect(url), Some(platform));
            // idempotent: detecting again yields the same answer
            assert_eq!(detect(url), Some(platform));
        }
    }

    #[test]
    fn test_short_link_detection() {
        assert!(is_short_link("https://vm.tiktok.com/ZTRabc123/"));
        assert!(is_short_link("https://vt.tiktok.com/ZTRabc123"));
        assert!(!is_short_link(
            "https://www.tiktok.com/@somebody/video/7123456789012345678"
        ));
        assert!(!is_short_link("https://twitter.com/jack/status/20"));
    }
}
