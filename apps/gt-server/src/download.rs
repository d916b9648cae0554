//! Per-request download lifecycle.
//!
//! One pipeline per incoming request: fetch metadata, derive the
//! deterministic artifact name, run the extraction invocation while
//! forwarding parsed progress to the client's push channel, locate the
//! produced file, and hand it back for streaming with a cleanup guard that
//! removes every scratch artifact once the response body is dropped.
//!
//! Failures surface immediately; no invocation is ever retried. A
//! disconnected push channel never cancels the child process, and a client
//! that aborts the response mid-stream still gets its artifacts reaped via
//! the guard.

use std::path::PathBuf;

use axum::http::StatusCode;
use gt_core::{metadata, names, progress, runner};
use gt_protocol::{DownloadKind, ProgressEvent};
use thiserror::Error;
use tracing::{debug, warn};

use crate::AppState;

pub(crate) const NO_SUBTITLES: &str =
    "no subtitles available: this video has neither written nor auto-generated English subtitles";

#[derive(Debug, Error)]
pub(crate) enum DownloadError {
    #[error("{0}")]
    Input(String),
    #[error("failed to fetch media details: {0}")]
    Metadata(String),
    #[error("download failed: {0}")]
    Extraction(String),
    #[error("{0}")]
    MissingOutput(String),
}

impl DownloadError {
    pub fn status(&self) -> StatusCode {
        match self {
            DownloadError::Input(_)
            | DownloadError::Metadata(_)
            | DownloadError::MissingOutput(_) => StatusCode::BAD_REQUEST,
            DownloadError::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A produced file ready to stream, plus everything to delete afterwards.
/// For subtitles `cleanup` covers every existing probe candidate, not just
/// the file being served.
pub(crate) struct Artifact {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: &'static str,
    pub cleanup: Vec<PathBuf>,
}

/// Removes scratch artifacts on drop: after a completed stream, an aborted
/// one, or an error that prevented streaming entirely.
pub(crate) struct CleanupGuard {
    paths: Vec<PathBuf>,
}

impl CleanupGuard {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "removed scratch artifact"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to remove scratch artifact")
                }
            }
        }
    }
}

/// Drive one download to the point where its artifact is ready to stream.
pub(crate) async fn run(
    state: &AppState,
    kind: DownloadKind,
    url: &str,
    quality: Option<&str>,
    client_id: Option<&str>,
) -> Result<Artifact, DownloadError> {
    // Input validation happens before any process is spawned.
    let url = url.trim();
    if url.is_empty() || url::Url::parse(url).is_err() {
        return Err(DownloadError::Input(
            "missing or invalid url parameter".into(),
        ));
    }
    let requested_height = match kind {
        DownloadKind::Video => Some(parse_height(quality)?),
        DownloadKind::Audio | DownloadKind::Subtitle => None,
    };

    let bin = runner::resolve_binary(state.tool_override());

    // fetching-metadata
    let doc = runner::run_json(&bin, &runner::metadata_args(url))
        .await
        .map_err(|err| DownloadError::Metadata(err.to_string()))?;
    let title = metadata::title(&doc)
        .ok_or_else(|| DownloadError::Metadata("tool output is missing a title".into()))?;

    // building-filename
    let base = names::base_name(metadata::upload_date(&doc), title);
    let file_name = format!("{base}.{}", kind.extension());
    let scratch = state.scratch().to_path_buf();
    let out_path = scratch.join(&file_name);

    // extracting
    let args = match (kind, requested_height) {
        (DownloadKind::Video, Some(height)) => runner::video_args(url, height, &out_path),
        (DownloadKind::Video, None) => {
            return Err(DownloadError::Input("missing quality parameter".into()))
        }
        (DownloadKind::Audio, _) => runner::audio_args(url, &out_path),
        (DownloadKind::Subtitle, _) => runner::subtitle_args(url, &scratch.join(&base)),
    };

    let wire_kind = kind.progress_kind();
    let registry = state.registry();
    let mut last_progress = 0.0_f64;
    let outcome = runner::run_streaming(&bin, &args, |line| {
        let Some(event) = progress::parse_line(wire_kind, line) else {
            return;
        };
        // Progress never runs backwards within one download, whatever
        // order the tool's per-stream percentages arrive in.
        if let Some(pct) = event.progress {
            if pct < last_progress {
                return;
            }
            last_progress = pct;
        }
        if let Some(id) = client_id {
            registry.send(id, event);
        }
    })
    .await
    .map_err(|err| DownloadError::Extraction(err.to_string()))?;

    if !outcome.status.success() {
        return Err(DownloadError::Extraction(outcome.failure_message()));
    }

    // streaming-response: locate what the tool actually produced.
    let (path, cleanup) = match kind {
        DownloadKind::Subtitle => {
            let candidates = names::subtitle_candidates(&scratch, &base);
            let found = candidates
                .iter()
                .find(|p| p.exists())
                .cloned()
                .ok_or_else(|| DownloadError::MissingOutput(NO_SUBTITLES.into()))?;
            let existing = candidates.into_iter().filter(|p| p.exists()).collect();
            (found, existing)
        }
        DownloadKind::Video | DownloadKind::Audio => {
            if !out_path.exists() {
                return Err(DownloadError::MissingOutput(
                    "expected output file was not produced".into(),
                ));
            }
            (out_path.clone(), vec![out_path])
        }
    };

    // Completion is decided here, once the artifact is verified, not by the
    // tool's transfer lines.
    if let Some(id) = client_id {
        registry.send(id, ProgressEvent::progress(wire_kind, 100.0, "done"));
    }

    Ok(Artifact {
        path,
        file_name,
        content_type: kind.content_type(),
        cleanup,
    })
}

fn parse_height(quality: Option<&str>) -> Result<u32, DownloadError> {
    let raw = quality
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| DownloadError::Input("missing quality parameter".into()))?;
    let height: u32 = raw
        .strip_suffix('p')
        .unwrap_or(raw)
        .parse()
        .map_err(|_| DownloadError::Input(format!("invalid quality selector {raw:?}")))?;
    if height == 0 {
        return Err(DownloadError::Input(format!(
            "invalid quality selector {raw:?}"
        )));
    }
    Ok(height)
}
