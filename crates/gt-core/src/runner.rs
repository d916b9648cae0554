//! Spawn wrapper around the external media-fetching binary.
//!
//! Two modes: [`run_json`] buffers stdout and parses it as a single JSON
//! document (metadata fetches), [`run_streaming`] hands every stdout line to
//! a callback as it arrives (extraction runs, scraped for progress). Both
//! capture stderr so a failing invocation can surface the tool's own words.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Name of the external tool on PATH.
pub const TOOL_NAME: &str = "yt-dlp";

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to launch {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    /// Non-zero exit; the message is the captured stderr, or a generic
    /// status line when the tool said nothing.
    #[error("{0}")]
    Failed(String),
    #[error("unreadable tool output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("i/o error while talking to the tool: {0}")]
    Io(#[from] std::io::Error),
}

fn bin_name() -> &'static str {
    if cfg!(windows) {
        "yt-dlp.exe"
    } else {
        TOOL_NAME
    }
}

/// Ordered lookup for the tool binary: explicit override, a copy sitting
/// next to the server executable, PATH, then the bare name as a last resort
/// (letting the OS report the miss at spawn time).
pub fn resolve_binary(override_path: Option<&Path>) -> PathBuf {
    if let Some(path) = override_path {
        return path.to_path_buf();
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let bundled = dir.join(bin_name());
            if bundled.exists() {
                return bundled;
            }
        }
    }
    if let Ok(found) = which::which(TOOL_NAME) {
        return found;
    }
    PathBuf::from(TOOL_NAME)
}

/// Flags for a metadata-only run: one JSON document on stdout, no download.
pub fn metadata_args(url: &str) -> Vec<String> {
    [
        url,
        "--dump-single-json",
        "--no-warnings",
        "--no-call-home",
        "--prefer-free-formats",
        "--youtube-skip-dash-manifest",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Best video+audio bounded by `height`, merged into a single mp4.
pub fn video_args(url: &str, height: u32, out: &Path) -> Vec<String> {
    vec![
        url.to_string(),
        "-f".into(),
        format!("bestvideo[height={height}]+bestaudio/best[height<={height}]"),
        "-o".into(),
        out.display().to_string(),
        "--merge-output-format".into(),
        "mp4".into(),
    ]
}

/// Extract the audio track and transcode to mp3 at maximum quality.
pub fn audio_args(url: &str, out: &Path) -> Vec<String> {
    vec![
        url.to_string(),
        "-x".into(),
        "--audio-format".into(),
        "mp3".into(),
        "--audio-quality".into(),
        "0".into(),
        "-o".into(),
        out.display().to_string(),
    ]
}

/// Written plus auto-generated English subtitles, converted to srt. `base`
/// has no extension; the tool appends its own language suffixes.
pub fn subtitle_args(url: &str, base: &Path) -> Vec<String> {
    vec![
        url.to_string(),
        "--skip-download".into(),
        "--write-auto-sub".into(),
        "--write-sub".into(),
        "--sub-lang".into(),
        "en.*".into(),
        "--convert-subs".into(),
        "srt".into(),
        "-o".into(),
        base.display().to_string(),
    ]
}

/// Run to completion, parse buffered stdout as one JSON document.
pub async fn run_json(bin: &Path, args: &[String]) -> Result<serde_json::Value, RunnerError> {
    info!(bin = %bin.display(), "spawning metadata fetch");
    let output = Command::new(bin)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| RunnerError::Spawn {
            bin: bin.display().to_string(),
            source,
        })?;

    debug!(
        code = ?output.status.code(),
        stdout_bytes = output.stdout.len(),
        stderr_bytes = output.stderr.len(),
        "metadata fetch exited"
    );
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!(code = ?output.status.code(), "tool exited non-zero");
        return Err(RunnerError::Failed(if stderr.is_empty() {
            format!("tool exited with status {}", output.status)
        } else {
            stderr
        }));
    }
    Ok(serde_json::from_slice(&output.stdout)?)
}

/// Result of a streaming run: the exit status plus everything the tool
/// wrote to stderr.
pub struct StreamOutcome {
    pub status: std::process::ExitStatus,
    pub stderr: String,
}

impl StreamOutcome {
    /// Failure message for a non-zero exit, preferring the tool's stderr.
    pub fn failure_message(&self) -> String {
        let trimmed = self.stderr.trim();
        if trimmed.is_empty() {
            format!("tool exited with status {}", self.status)
        } else {
            trimmed.to_string()
        }
    }
}

/// Spawn the tool and feed every stdout line to `on_line` as it arrives.
/// Resolves once the process exits; the exit status is not interpreted here.
pub async fn run_streaming<F>(
    bin: &Path,
    args: &[String],
    mut on_line: F,
) -> Result<StreamOutcome, RunnerError>
where
    F: FnMut(&str),
{
    info!(bin = %bin.display(), "spawning extraction");
    let mut child = Command::new(bin)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| RunnerError::Spawn {
            bin: bin.display().to_string(),
            source,
        })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| RunnerError::Failed("tool stdout was not captured".into()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RunnerError::Failed("tool stderr was not captured".into()))?;

    let stderr_task = tokio::spawn(async move {
        let mut collected = String::new();
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(target: "gt::tool", "stderr: {line}");
            collected.push_str(&line);
            collected.push('\n');
        }
        collected
    });

    let mut lines = BufReader::new(stdout).lines();
    while let Some(line) = lines.next_line().await? {
        debug!(target: "gt::tool", "stdout: {line}");
        on_line(&line);
    }

    let status = child.wait().await?;
    let stderr = stderr_task.await.unwrap_or_default();
    info!(code = ?status.code(), "extraction process exited");
    Ok(StreamOutcome { status, stderr })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_args_start_with_the_url() {
        let args = metadata_args("https://example.com/watch?v=x");
        assert_eq!(args[0], "https://example.com/watch?v=x");
        assert!(args.contains(&"--dump-single-json".to_string()));
    }

    #[test]
    fn video_args_bound_height_and_merge() {
        let args = video_args("u", 720, Path::new("/tmp/out.mp4"));
        assert!(args.contains(&"bestvideo[height=720]+bestaudio/best[height<=720]".to_string()));
        assert!(args.contains(&"--merge-output-format".to_string()));
    }

    #[test]
    fn subtitle_args_skip_the_download() {
        let args = subtitle_args("u", Path::new("/tmp/base"));
        assert!(args.contains(&"--skip-download".to_string()));
        assert!(args.contains(&"en.*".to_string()));
    }

    #[test]
    fn resolve_binary_prefers_the_override() {
        let resolved = resolve_binary(Some(Path::new("/opt/tools/yt-dlp")));
        assert_eq!(resolved, PathBuf::from("/opt/tools/yt-dlp"));
    }

    #[cfg(unix)]
    mod process {
        use super::super::*;

        #[tokio::test]
        async fn run_json_parses_stdout_on_success() {
            let args = vec!["-c".to_string(), "echo '{\"title\":\"t\"}'".to_string()];
            let value = run_json(Path::new("/bin/sh"), &args).await.unwrap();
            assert_eq!(value["title"], "t");
        }

        #[tokio::test]
        async fn run_json_surfaces_stderr_on_failure() {
            let args = vec!["-c".to_string(), "echo nope >&2; exit 3".to_string()];
            let err = run_json(Path::new("/bin/sh"), &args).await.unwrap_err();
            match err {
                RunnerError::Failed(msg) => assert_eq!(msg, "nope"),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn run_json_rejects_non_json_output() {
            let args = vec!["-c".to_string(), "echo not-json".to_string()];
            let err = run_json(Path::new("/bin/sh"), &args).await.unwrap_err();
            assert!(matches!(err, RunnerError::Parse(_)));
        }

        #[tokio::test]
        async fn missing_binary_fails_fast_with_spawn_error() {
            let err = run_json(Path::new("/nonexistent/tool"), &[])
                .await
                .unwrap_err();
            assert!(matches!(err, RunnerError::Spawn { .. }));
        }

        #[tokio::test]
        async fn run_streaming_feeds_lines_and_reports_exit() {
            let args = vec![
                "-c".to_string(),
                "echo one; echo two; echo err >&2; exit 2".to_string(),
            ];
            let mut seen = Vec::new();
            let outcome = run_streaming(Path::new("/bin/sh"), &args, |line| {
                seen.push(line.to_string());
            })
            .await
            .unwrap();
            assert_eq!(seen, vec!["one", "two"]);
            assert_eq!(outcome.status.code(), Some(2));
            assert_eq!(outcome.failure_message(), "err");
        }
    }
}
