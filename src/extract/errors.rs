/// Error taxonomy of the extraction pipeline.
///
/// Only `InvalidUrl` and `UnsupportedPlatform` ever reach the caller; every
/// other variant is absorbed by the orchestrator, logged, and answered by the
/// next tier down.
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("external tool error: {0}")]
    ExternalTool(String),

    #[error("scrape error: {0}")]
    Scrape(String),

    #[error("normalization error: {0}")]
    Normalization(String),
}

impl ExtractError {
    /// Fatal errors terminate the request; the rest trigger tier fallback.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExtractError::InvalidUrl(_) | ExtractError::UnsupportedPlatform(_)
        )
    }

    /// Machine-readable kind for the HTTP error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::InvalidUrl(_) => "invalid_url",
            ExtractError::UnsupportedPlatform(_) => "unsupported_platform",
            ExtractError::ExternalTool(_)
            | ExtractError::Scrape(_)
            | ExtractError::Normalization(_) => "extraction_failed",
        }
    }
}
