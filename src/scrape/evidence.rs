use crate::extract::candidate::{Candidate, RawMedia};
use crate::record::MediaKind;

/// Upper bound per kind; a post page never legitimately streams more
/// distinct media URLs than this.
const MAX_CAPTURED_PER_KIND: usize = 64;

/// Media URLs observed on the wire during one secondary-extraction attempt.
///
/// Deduplicated by exact URL, kept in observation order, bounded. Created
/// when the attempt starts and dropped when it completes; never shared
/// across requests.
#[derive(Debug, Clone, Default)]
pub struct CapturedEvidence {
    videos: Vec<String>,
    images: Vec<String>,
}

impl CapturedEvidence {
    pub fn record_video(&mut self, url: &str) {
        Self::record(&mut self.videos, url);
    }

    pub fn record_image(&mut self, url: &str) {
        Self::record(&mut self.images, url);
    }

    fn record(entries: &mut Vec<String>, url: &str) {
        if url.is_empty() || entries.iter().any(|u| u == url) {
            return;
        }
        if entries.len() >= MAX_CAPTURED_PER_KIND {
            return;
        }
        entries.push(url.to_string());
    }

    pub fn videos(&self) -> &[String] {
        &self.videos
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty() && self.images.is_empty()
    }

    /// Select one entry: first quality-token hit scanning newest-first,
    /// falling back to the most recently observed entry.
    fn pick(entries: &[String], quality_tokens: &[&str]) -> Option<String> {
        for token in quality_tokens {
            if let Some(hit) = entries.iter().rev().find(|u| u.contains(token)) {
                return Some(hit.clone());
            }
        }
        entries.last().cloned()
    }
}

/// Merge DOM-derived media with wire evidence.
///
/// Rules, in order: a DOM video with a URL is kept as-is; a DOM video
/// placeholder is filled from captured video evidence; with no DOM media at
/// all and image-only evidence, the best captured image is promoted; any
/// video still lacking a URL after that is dropped. The output never
/// contains a video placeholder.
pub fn reconcile(
    mut candidate: Candidate,
    evidence: &CapturedEvidence,
    quality_tokens: &[&str],
) -> Candidate {
    for item in candidate.media.iter_mut() {
        if item.is_placeholder() {
            if let Some(url) = CapturedEvidence::pick(evidence.videos(), quality_tokens) {
                log::debug!("filled video placeholder from wire evidence: {url}");
                item.url = url;
            }
        }
    }

    if candidate.media.is_empty() && evidence.videos().is_empty() {
        if let Some(url) = CapturedEvidence::pick(evidence.images(), quality_tokens) {
            log::debug!("no DOM media; promoting captured image: {url}");
            candidate.media.push(RawMedia {
                kind: MediaKind::Image,
                url,
                thumbnail: None,
            });
        }
    }

    candidate.media.retain(|m| !m.is_placeholder());

    candidate
}
