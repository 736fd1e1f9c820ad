pub mod evidence;
pub mod strategy;

use crate::extract::candidate::{Candidate, RawMedia};
use crate::record::MediaKind;

#[cfg(feature = "headless")]
pub use driver::{shutdown_browser, PageExtractor};

/// Without the headless feature there is no browser to stop.
#[cfg(not(feature = "headless"))]
pub fn shutdown_browser() {}

/// Fill candidate gaps from the rendered page's meta tags. The og: fields
/// are the most durable part of every platform's markup, so they back up the
/// selector-driven pass: text and display name fill only when missing, an
/// og:video becomes a media entry when the DOM produced none, and an
/// og:image serves as poster or, failing everything else, as the sole image.
pub(crate) fn merge_meta(candidate: &mut Candidate, html: &str) {
    let document = scraper::Html::parse_document(html);
    let meta_selector = scraper::Selector::parse("meta").unwrap();

    let mut og_image: Option<String> = None;
    let mut og_video: Option<String> = None;

    for element in document.select(&meta_selector) {
        let prop = element.attr("property").unwrap_or_default();
        let key = element
            .attr("name")
            .filter(|name| !name.is_empty())
            .unwrap_or(prop);
        let value = element.attr("content").unwrap_or_default();
        if value.is_empty() {
            continue;
        }

        match key {
            "og:description" | "twitter:description" => {
                if candidate.text.is_none() {
                    candidate.text = Some(value.to_string());
                }
            }
            "og:title" | "twitter:title" => {
                if candidate.author_display_name.is_none() {
                    candidate.author_display_name = Some(strip_site_suffix(value));
                }
            }
            "og:image" | "twitter:image" => {
                if og_image.is_none() {
                    og_image = Some(value.to_string());
                }
            }
            "og:video" | "og:video:url" | "og:video:secure_url" => {
                if og_video.is_none() {
                    og_video = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    if let Some(url) = og_video {
        if !candidate
            .media
            .iter()
            .any(|m| m.kind == MediaKind::Video || m.kind == MediaKind::Gif)
        {
            candidate.media.push(RawMedia {
                kind: MediaKind::Video,
                url,
                thumbnail: og_image.clone(),
            });
        }
    }

    if let Some(url) = og_image {
        if let Some(video) = candidate
            .media
            .iter_mut()
            .find(|m| m.kind == MediaKind::Video && m.thumbnail.is_none())
        {
            video.thumbnail = Some(url);
        } else if candidate.media.is_empty() {
            candidate.media.push(RawMedia {
                kind: MediaKind::Image,
                url,
                thumbnail: None,
            });
        }
    }
}

/// `og:title` arrives as `Name on X: "..."` / `Name on TikTok`; keep the name.
fn strip_site_suffix(title: &str) -> String {
    for marker in [" on X", " on Twitter", " on TikTok"] {
        if let Some(idx) = title.rfind(marker) {
            let rest = &title[idx + marker.len()..];
            if rest.is_empty() || rest.starts_with(':') {
                return title[..idx].trim().to_string();
            }
        }
    }
    title.trim().to_string()
}

#[cfg(feature = "headless")]
mod driver {
    use super::{merge_meta, strategy};
    use crate::config::ScrapeConfig;
    use crate::extract::candidate::Candidate;
    use crate::extract::{ExtractError, Extractor};
    use crate::record::Platform;
    use crate::scrape::evidence::{self, CapturedEvidence};
    use crate::scrape::strategy::{Observed, ScrapeStrategy};
    use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
    use once_cell::sync::Lazy;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::thread::sleep;
    use std::time::Duration;

    /// The crate default (30s) would reap the shared process between
    /// requests; keep it effectively unbounded.
    const IDLE_BROWSER_TIMEOUT_SECS: u64 = 24 * 60 * 60;

    /// One browser process for the whole daemon, launched on first use.
    static BROWSER: Lazy<Mutex<Option<Browser>>> = Lazy::new(|| Mutex::new(None));

    fn launch_browser(config: &ScrapeConfig) -> Result<Browser, ExtractError> {
        let chrome_path = config
            .chrome_path
            .clone()
            .or_else(|| std::env::var("CHROME_PATH").ok())
            .map(PathBuf::from);

        let options = LaunchOptionsBuilder::default()
            .sandbox(false)
            .path(chrome_path)
            .idle_browser_timeout(Duration::from_secs(IDLE_BROWSER_TIMEOUT_SECS))
            .build()
            .map_err(|err| ExtractError::Scrape(format!("chrome launch options: {err}")))?;

        log::info!("starting shared headless browser");
        Browser::new(options)
            .map_err(|err| ExtractError::Scrape(format!("failed to start chrome: {err}")))
    }

    fn open_tab(browser: &Browser) -> anyhow::Result<Arc<Tab>> {
        // blank isolated tab; navigation happens after the response
        // listener is registered so nothing on the wire is missed
        Ok(browser.new_tab()?)
    }

    /// Open an isolated tab against the shared browser, relaunching the
    /// process if it died since the last request.
    fn acquire_tab(config: &ScrapeConfig) -> Result<Arc<Tab>, ExtractError> {
        let mut guard = BROWSER.lock().unwrap();

        if let Some(browser) = guard.as_ref() {
            match open_tab(browser) {
                Ok(tab) => return Ok(tab),
                Err(err) => {
                    log::warn!("shared browser unusable ({err}), relaunching");
                    *guard = None;
                }
            }
        }

        let browser = launch_browser(config)?;
        let tab = open_tab(&browser)
            .map_err(|err| ExtractError::Scrape(format!("failed to open tab: {err}")))?;
        *guard = Some(browser);
        Ok(tab)
    }

    /// Stop the shared process. Wired to daemon shutdown; requests in flight
    /// fail their secondary tier and fall through to embed mode.
    pub fn shutdown_browser() {
        let mut guard = BROWSER.lock().unwrap();
        if guard.take().is_some() {
            log::info!("shared headless browser stopped");
        }
    }

    /// Secondary tier: drives the post page in the shared browser, observing
    /// the network and the DOM concurrently.
    pub struct PageExtractor {
        config: ScrapeConfig,
    }

    impl PageExtractor {
        pub fn new(config: ScrapeConfig) -> Self {
            Self { config }
        }
    }

    impl Extractor for PageExtractor {
        fn name(&self) -> &'static str {
            "page-observer"
        }

        fn extract(&self, url: &str, platform: Platform) -> Result<Candidate, ExtractError> {
            let strategy = strategy::for_platform(platform).ok_or_else(|| {
                ExtractError::Scrape(format!("no scrape strategy for {platform}"))
            })?;

            let url = canonical_post_url(platform, url, &self.config);
            let tab = acquire_tab(&self.config)?;

            let result = drive(&tab, strategy, &url, &self.config);

            // the tab always closes, the shared browser never does
            let _ = tab.close(true);

            result
        }
    }

    fn drive(
        tab: &Arc<Tab>,
        strategy: &'static ScrapeStrategy,
        url: &str,
        config: &ScrapeConfig,
    ) -> Result<Candidate, ExtractError> {
        let evidence = Arc::new(Mutex::new(CapturedEvidence::default()));

        // The transport thread appends wire sightings while the page loads;
        // the DOM pass below reads whatever has arrived by then.
        let sink = Arc::clone(&evidence);
        tab.register_response_handling(
            "media-capture",
            Box::new(move |params, _fetch_body| {
                let response = &params.response;
                match strategy.classify(&response.url, &response.mime_type) {
                    Some(Observed::Video) => sink.lock().unwrap().record_video(&response.url),
                    Some(Observed::Image) => sink.lock().unwrap().record_image(&response.url),
                    None => {}
                }
            }),
        )
        .map_err(|err| ExtractError::Scrape(format!("response listener: {err}")))?;

        let _ = tab.enable_stealth_mode();
        tab.set_user_agent(&config.user_agent, Some("en-US,en"), None)
            .map_err(|err| ExtractError::Scrape(format!("set user agent: {err}")))?;
        tab.set_default_timeout(Duration::from_secs(config.navigation_timeout_secs));

        tab.navigate_to(url)
            .map_err(|err| ExtractError::Scrape(format!("navigation failed: {err}")))?;
        tab.wait_until_navigated()
            .map_err(|err| ExtractError::Scrape(format!("navigation timed out: {err}")))?;

        // content readiness is best-effort; the settle delay still applies
        let _ = tab.wait_for_element_with_custom_timeout(
            strategy.ready_selector,
            Duration::from_secs(config.content_wait_secs),
        );
        sleep(Duration::from_millis(config.settle_delay_ms));

        if strategy.settle_interact {
            // advisory nudge for script-loaded players; the wire evidence is
            // the correctness backstop when this does nothing
            let _ = tab.evaluate(
                "(() => { const v = document.querySelector('video'); \
                 if (v) { v.muted = true; const p = v.play(); if (p && p.catch) p.catch(() => {}); } })()",
                false,
            );
            sleep(Duration::from_millis(config.settle_delay_ms));
        }

        let mut candidate = dom_pass(tab, strategy);
        if let Ok(html) = tab.get_content() {
            merge_meta(&mut candidate, &html);
        }

        let snapshot = evidence.lock().unwrap().clone();
        let candidate = evidence::reconcile(candidate, &snapshot, strategy.quality_tokens);

        if !candidate.has_any_data() {
            return Err(ExtractError::Scrape(
                "page produced no extractable fields".to_string(),
            ));
        }

        Ok(candidate)
    }

    /// Run the strategy's extraction script in the page. Any failure here
    /// degrades to an empty candidate; the meta pass and the evidence log
    /// still get their chance.
    fn dom_pass(tab: &Arc<Tab>, strategy: &ScrapeStrategy) -> Candidate {
        let value = match tab.evaluate(strategy.dom_script, false) {
            Ok(object) => object.value,
            Err(err) => {
                log::warn!("dom extraction script failed: {err}");
                None
            }
        };

        value
            .and_then(|v| v.as_str().map(str::to_owned))
            .and_then(|raw| match serde_json::from_str::<Candidate>(&raw) {
                Ok(candidate) => Some(candidate),
                Err(err) => {
                    log::warn!("dom extraction returned malformed payload: {err}");
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Shortened share links redirect to the real post; the page must be
    /// driven against the canonical URL.
    fn canonical_post_url(platform: Platform, url: &str, config: &ScrapeConfig) -> String {
        if platform == Platform::Tiktok && crate::platform::is_short_link(url) {
            match resolve_redirect(url, config) {
                Some(resolved) => {
                    log::debug!("resolved short link {url} -> {resolved}");
                    return resolved;
                }
                None => log::debug!("short link resolution failed, driving {url} directly"),
            }
        }
        url.to_string()
    }

    fn resolve_redirect(url: &str, config: &ScrapeConfig) -> Option<String> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .ok()?;

        let resp = client.get(url).send().ok()?;
        Some(resp.url().to_string())
    }
}
