//! Wire types shared between the HTTP surface and the push channel.
//!
//! Everything here crosses a serialization boundary: the `/info` response,
//! the JSON error body, and the progress events delivered to the browser.
//! Field names follow the browser-facing camelCase convention.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of track a download request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    Video,
    Audio,
    Subtitle,
}

impl DownloadKind {
    /// File extension of the artifact the external tool produces.
    pub fn extension(self) -> &'static str {
        match self {
            DownloadKind::Video => "mp4",
            DownloadKind::Audio => "mp3",
            DownloadKind::Subtitle => "srt",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            DownloadKind::Video => "video/mp4",
            DownloadKind::Audio => "audio/mp3",
            DownloadKind::Subtitle => "application/x-subrip",
        }
    }

    /// Wire `type` used when forwarding progress for this kind. The push
    /// contract only knows `video` and `audio`; subtitle runs report under
    /// `video`.
    pub fn progress_kind(self) -> ProgressKind {
        match self {
            DownloadKind::Audio => ProgressKind::Audio,
            DownloadKind::Video | DownloadKind::Subtitle => ProgressKind::Video,
        }
    }
}

/// Discriminant of a [`ProgressEvent`] on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProgressKind {
    Video,
    Audio,
    Error,
}

/// One status update pushed to a connected browser session.
///
/// Progress values range 0–100; 100 is reserved for true completion.
/// Events are ephemeral: produced while a download runs, delivered
/// at-most-once, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressEvent {
    pub fn progress(kind: ProgressKind, progress: f64, status: impl Into<String>) -> Self {
        Self {
            kind,
            progress: Some(progress),
            status: Some(status.into()),
            size: None,
            speed: None,
            eta: None,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Error,
            progress: None,
            status: None,
            size: None,
            speed: None,
            eta: None,
            message: Some(message.into()),
        }
    }

    pub fn with_throughput(
        mut self,
        size: Option<String>,
        speed: Option<String>,
        eta: Option<String>,
    ) -> Self {
        self.size = size;
        self.speed = speed;
        self.eta = eta;
        self
    }
}

/// `/info` response: metadata plus the filtered list of offered formats.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub formats: Vec<FormatDescriptor>,
}

/// One selectable format as reported by the external tool.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormatDescriptor {
    pub format_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    pub container: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcodec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acodec: Option<String>,
}

/// JSON error body returned by every failing route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_event_wire_shape() {
        let ev = ProgressEvent::progress(ProgressKind::Video, 42.5, "downloading")
            .with_throughput(Some("10.00MiB".into()), Some("1.50MiB/s".into()), None);
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(value["type"], "video");
        assert_eq!(value["progress"], 42.5);
        assert_eq!(value["status"], "downloading");
        assert_eq!(value["size"], "10.00MiB");
        assert_eq!(value["speed"], "1.50MiB/s");
        assert!(value.get("eta").is_none());
        assert!(value.get("message").is_none());
    }

    #[test]
    fn error_event_carries_only_message() {
        let value = serde_json::to_value(ProgressEvent::error("boom")).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["message"], "boom");
        assert!(value.get("progress").is_none());
    }

    #[test]
    fn format_descriptor_uses_camel_case() {
        let desc = FormatDescriptor {
            format_id: "137".into(),
            quality: Some("720p".into()),
            container: "mp4".into(),
            resolution: Some("1280x720".into()),
            fps: Some(30.0),
            vcodec: Some("avc1".into()),
            acodec: Some("mp4a".into()),
        };
        let value = serde_json::to_value(&desc).unwrap();
        assert_eq!(value["formatId"], "137");
        assert_eq!(value["container"], "mp4");
    }

    #[test]
    fn subtitle_progress_reports_as_video() {
        assert_eq!(DownloadKind::Subtitle.progress_kind(), ProgressKind::Video);
        assert_eq!(DownloadKind::Subtitle.extension(), "srt");
        assert_eq!(
            DownloadKind::Subtitle.content_type(),
            "application/x-subrip"
        );
    }
}
