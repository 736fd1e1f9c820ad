pub mod candidate;
pub mod embed;
pub mod errors;
pub mod normalize;
pub mod ytdlp;

pub use errors::ExtractError;

use crate::config::Config;
use crate::platform;
use crate::record::{ContentRecord, Platform};
use candidate::Candidate;
use std::time::Duration;
use url::Url;

/// One extraction tier. Both the external-tool tier and the live-page tier
/// produce the same raw candidate shape; the pipeline owns the policy of
/// what counts as success at each tier.
pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, url: &str, platform: Platform) -> Result<Candidate, ExtractError>;
}

/// The request-scoped extraction state machine:
///
/// Detecting -> PrimaryAttempt -> {Success | SecondaryAttempt}
///           -> {Success | EmbedFallback} -> Done
///
/// Each tier runs at most once; resilience comes from falling through, not
/// from retries. Exactly one record or one fatal error leaves `run`.
pub struct Pipeline {
    primary: Option<Box<dyn Extractor>>,
    secondary: Option<Box<dyn Extractor>>,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        let primary: Option<Box<dyn Extractor>> = Some(Box::new(ytdlp::ToolExtractor::new(
            config.tool.path.clone(),
            Duration::from_secs(config.tool.timeout_secs),
        )));

        #[cfg(feature = "headless")]
        let secondary: Option<Box<dyn Extractor>> =
            Some(Box::new(crate::scrape::PageExtractor::new(
                config.scrape.clone(),
            )));
        #[cfg(not(feature = "headless"))]
        let secondary: Option<Box<dyn Extractor>> = None;

        Self { primary, secondary }
    }

    /// Swap tiers out; used by tests and the CLI's --no-primary /
    /// --no-secondary toggles.
    pub fn with_extractors(
        primary: Option<Box<dyn Extractor>>,
        secondary: Option<Box<dyn Extractor>>,
    ) -> Self {
        Self { primary, secondary }
    }

    pub fn disable_primary(&mut self) {
        self.primary = None;
    }

    pub fn disable_secondary(&mut self) {
        self.secondary = None;
    }

    pub fn run(&self, raw_url: &str) -> Result<ContentRecord, ExtractError> {
        let url = validate_url(raw_url)?;

        let platform = platform::detect(url.as_str())
            .ok_or_else(|| ExtractError::UnsupportedPlatform(raw_url.to_string()))?;

        log::info!("extracting platform={platform} url={url}");

        // primary must deliver a directly playable video; anything less
        // (error, empty media, image-only) falls through
        if let Some(primary) = &self.primary {
            match self.attempt(primary.as_ref(), url.as_str(), platform) {
                Ok(record) if record.has_playable_video() => {
                    log::info!("tier={} outcome=success", primary.name());
                    return Ok(record);
                }
                Ok(_) => {
                    log::info!("tier={} outcome=no-video", primary.name());
                }
                Err(err) => {
                    log::warn!("tier={} outcome=error err={err}", primary.name());
                }
            }
        }

        // secondary accepts any normalizable record, image-only included
        if let Some(secondary) = &self.secondary {
            if crate::scrape::strategy::for_platform(platform).is_some() {
                match self.attempt(secondary.as_ref(), url.as_str(), platform) {
                    Ok(record) => {
                        log::info!("tier={} outcome=success", secondary.name());
                        return Ok(record);
                    }
                    Err(err) => {
                        log::warn!("tier={} outcome=error err={err}", secondary.name());
                    }
                }
            }
        }

        log::info!("tier=embed outcome=fallback platform={platform}");
        Ok(embed::build_embed_record(platform, url.as_str()))
    }

    fn attempt(
        &self,
        extractor: &dyn Extractor,
        url: &str,
        platform: Platform,
    ) -> Result<ContentRecord, ExtractError> {
        let candidate = extractor.extract(url, platform)?;
        normalize::normalize(candidate, platform, url)
    }
}

fn validate_url(raw: &str) -> Result<Url, ExtractError> {
    let url =
        Url::parse(raw).map_err(|err| ExtractError::InvalidUrl(format!("{raw}: {err}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ExtractError::InvalidUrl(format!(
            "{raw}: unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ExtractError::InvalidUrl(format!("{raw}: missing host")));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("https://x.com/a/status/1").is_ok());
        assert!(validate_url("http://x.com/a/status/1").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_garbage() {
        for raw in ["", "not a url", "ftp://x.com/a", "file:///etc/passwd", "https://"] {
            let err = validate_url(raw).unwrap_err();
            assert!(matches!(err, ExtractError::InvalidUrl(_)), "{raw}");
        }
    }
}
