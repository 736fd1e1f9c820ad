use crate::extract::candidate::{Candidate, RawMedia, RawStats};
use crate::extract::{Extractor, ExtractError};
use crate::record::{MediaKind, Platform};
use serde::Deserialize;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// How often the child process is polled while waiting for the deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Structured description emitted by the media-info tool in `--dump-json`
/// mode. Only the fields the pipeline consumes are modeled; everything else
/// is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub uploader_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// The tool's own top-level selected URL, used when no format qualifies.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub formats: Vec<ToolFormat>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub repost_count: Option<u64>,
    #[serde(default)]
    pub comment_count: Option<u64>,
    #[serde(default)]
    pub view_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolFormat {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub height: Option<u64>,
    #[serde(default)]
    pub width: Option<u64>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub video_ext: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
}

fn has_video_codec(format: &ToolFormat) -> bool {
    let vcodec = format.vcodec.as_deref().unwrap_or("none");
    let video_ext = format.video_ext.as_deref().unwrap_or("none");
    (vcodec != "none" && !vcodec.is_empty()) || (video_ext != "none" && !video_ext.is_empty())
}

/// A progressive stream carries audio and video in one container; segmented
/// (DASH/HLS) delivery is marked in format_id or protocol.
fn is_progressive(format: &ToolFormat) -> bool {
    let id_segmented = format
        .format_id
        .as_deref()
        .map(|id| id.to_ascii_lowercase().contains("dash"))
        .unwrap_or(false);
    let protocol_segmented = format
        .protocol
        .as_deref()
        .map(|p| {
            let p = p.to_ascii_lowercase();
            p.contains("dash") || p.contains("m3u8")
        })
        .unwrap_or(false);
    !(id_segmented || protocol_segmented)
}

/// Pick the single best direct video URL from the formats list.
///
/// Total and deterministic: progressive beats segmented, then larger height
/// wins, and equal-quality entries are ordered by format_id/url so the choice
/// is stable under any re-ordering of the input.
pub fn select_video_url(formats: &[ToolFormat]) -> Option<String> {
    let mut candidates: Vec<&ToolFormat> = formats
        .iter()
        .filter(|f| {
            has_video_codec(f)
                && f.height.is_some()
                && f.url.as_deref().map(|u| !u.is_empty()).unwrap_or(false)
        })
        .collect();

    candidates.sort_by(|a, b| {
        is_progressive(b)
            .cmp(&is_progressive(a))
            .then_with(|| b.height.cmp(&a.height))
            .then_with(|| a.format_id.cmp(&b.format_id))
            .then_with(|| a.url.cmp(&b.url))
    });

    candidates.first().and_then(|f| f.url.clone())
}

fn unix_to_iso8601(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

/// Map the tool payload onto the raw candidate shape.
pub fn payload_to_candidate(payload: ToolPayload) -> Candidate {
    let mut media = Vec::new();

    if let Some(video_url) = select_video_url(&payload.formats).or_else(|| {
        payload
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(str::to_owned)
    }) {
        media.push(RawMedia {
            kind: MediaKind::Video,
            url: video_url,
            thumbnail: payload.thumbnail.clone(),
        });
    } else if let Some(thumbnail) = payload.thumbnail.as_deref().filter(|t| !t.is_empty()) {
        // thumbnail-only result; the orchestrator treats this as "no video"
        // and falls through to the next tier
        media.push(RawMedia {
            kind: MediaKind::Image,
            url: thumbnail.to_string(),
            thumbnail: None,
        });
    }

    Candidate {
        author_username: payload.uploader_id,
        author_display_name: payload.uploader,
        author_avatar: None,
        author_verified: None,
        text: payload.description.or(payload.title),
        media,
        timestamp: payload.timestamp.map(unix_to_iso8601),
        stats: RawStats {
            likes: payload.like_count,
            reposts: payload.repost_count,
            replies: None,
            views: payload.view_count,
            comments: payload.comment_count,
        },
    }
}

/// Primary tier: drives the external media-info tool in metadata-only mode.
pub struct ToolExtractor {
    tool_path: String,
    timeout: Duration,
}

impl ToolExtractor {
    pub fn new(tool_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            tool_path: tool_path.into(),
            timeout,
        }
    }

    fn run_tool(&self, url: &str) -> Result<Vec<u8>, ExtractError> {
        let mut child = Command::new(&self.tool_path)
            .args(["--dump-json", "--no-download", "--no-warnings", "--no-playlist"])
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                ExtractError::ExternalTool(format!("failed to spawn {}: {err}", self.tool_path))
            })?;

        // Drain the pipes on their own threads; --dump-json output easily
        // exceeds the pipe buffer and would deadlock a poll-then-read loop.
        let mut stdout_pipe = child.stdout.take().expect("stdout was piped");
        let mut stderr_pipe = child.stderr.take().expect("stderr was piped");
        let stdout_handle = std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stdout_pipe.read_to_end(&mut buf);
            buf
        });
        let stderr_handle = std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stderr_pipe.read_to_end(&mut buf);
            buf
        });

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if started.elapsed() >= self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ExtractError::ExternalTool(format!(
                            "{} timed out after {}s",
                            self.tool_path,
                            self.timeout.as_secs()
                        )));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(err) => {
                    return Err(ExtractError::ExternalTool(format!(
                        "failed to wait on {}: {err}",
                        self.tool_path
                    )));
                }
            }
        };

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();

        if !status.success() {
            let detail = String::from_utf8_lossy(&stderr);
            let detail = detail.lines().next().unwrap_or("no stderr output");
            return Err(ExtractError::ExternalTool(format!(
                "{} exited with {status}: {detail}",
                self.tool_path
            )));
        }

        Ok(stdout)
    }
}

impl Extractor for ToolExtractor {
    fn name(&self) -> &'static str {
        "media-tool"
    }

    fn extract(&self, url: &str, _platform: Platform) -> Result<Candidate, ExtractError> {
        let stdout = self.run_tool(url)?;

        let payload: ToolPayload = serde_json::from_slice(&stdout).map_err(|err| {
            ExtractError::ExternalTool(format!("unparsable tool output: {err}"))
        })?;

        Ok(payload_to_candidate(payload))
    }
}
