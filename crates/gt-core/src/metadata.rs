//! Projection of the tool's `--dump-single-json` document into wire types.

use gt_protocol::{FormatDescriptor, MediaInfo};
use serde_json::Value;

/// Title as reported by the tool; absent on malformed documents.
pub fn title(doc: &Value) -> Option<&str> {
    doc.get("title").and_then(Value::as_str)
}

pub fn upload_date(doc: &Value) -> Option<&str> {
    doc.get("upload_date").and_then(Value::as_str)
}

/// Keep a format when it is an mp4 that carries at least one real stream:
/// muxed files and DASH video-only tracks pass, stubs with neither codec
/// are dropped along with every non-mp4 container.
fn offerable(format: &Value) -> bool {
    let ext = format.get("ext").and_then(Value::as_str);
    if ext != Some("mp4") {
        return false;
    }
    let acodec = format.get("acodec").and_then(Value::as_str).unwrap_or("none");
    let vcodec = format.get("vcodec").and_then(Value::as_str).unwrap_or("none");
    acodec != "none" || vcodec != "none"
}

fn descriptor(format: &Value) -> Option<FormatDescriptor> {
    let format_id = format.get("format_id").and_then(Value::as_str)?.to_string();
    let quality = match format.get("height").and_then(Value::as_u64) {
        Some(height) => Some(format!("{height}p")),
        None => format
            .get("format_note")
            .and_then(Value::as_str)
            .map(str::to_string),
    };
    Some(FormatDescriptor {
        format_id,
        quality,
        container: format
            .get("ext")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        resolution: format
            .get("resolution")
            .and_then(Value::as_str)
            .map(str::to_string),
        fps: format.get("fps").and_then(Value::as_f64),
        vcodec: format
            .get("vcodec")
            .and_then(Value::as_str)
            .map(str::to_string),
        acodec: format
            .get("acodec")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Build the `/info` response body from a metadata document.
pub fn media_info(doc: &Value) -> MediaInfo {
    let formats = doc
        .get("formats")
        .and_then(Value::as_array)
        .map(|formats| {
            formats
                .iter()
                .filter(|f| offerable(f))
                .filter_map(descriptor)
                .collect()
        })
        .unwrap_or_default();
    MediaInfo {
        title: title(doc).map(str::to_string),
        thumbnail: doc
            .get("thumbnail")
            .and_then(Value::as_str)
            .map(str::to_string),
        duration: doc.get("duration").and_then(Value::as_f64),
        formats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filters_to_mp4_with_at_least_one_codec() {
        let doc = json!({
            "title": "Test Video",
            "thumbnail": "https://example.com/t.jpg",
            "duration": 212.0,
            "formats": [
                {"format_id": "22", "ext": "mp4", "height": 720, "acodec": "mp4a", "vcodec": "avc1"},
                {"format_id": "137", "ext": "mp4", "height": 1080, "acodec": "none", "vcodec": "avc1"},
                {"format_id": "251", "ext": "webm", "acodec": "opus", "vcodec": "none"},
                {"format_id": "sb0", "ext": "mp4", "acodec": "none", "vcodec": "none"},
            ]
        });
        let info = media_info(&doc);
        assert_eq!(info.title.as_deref(), Some("Test Video"));
        assert_eq!(info.duration, Some(212.0));
        let ids: Vec<_> = info.formats.iter().map(|f| f.format_id.as_str()).collect();
        assert_eq!(ids, vec!["22", "137"]);
    }

    #[test]
    fn quality_prefers_height_then_format_note() {
        let doc = json!({
            "formats": [
                {"format_id": "22", "ext": "mp4", "height": 720, "acodec": "mp4a", "vcodec": "avc1"},
                {"format_id": "18", "ext": "mp4", "format_note": "medium", "acodec": "mp4a", "vcodec": "avc1"},
            ]
        });
        let info = media_info(&doc);
        assert_eq!(info.formats[0].quality.as_deref(), Some("720p"));
        assert_eq!(info.formats[1].quality.as_deref(), Some("medium"));
    }

    #[test]
    fn tolerates_documents_without_formats() {
        let info = media_info(&json!({"title": "bare"}));
        assert!(info.formats.is_empty());
    }
}
