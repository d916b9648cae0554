//! Scrapes progress out of the tool's status lines.
//!
//! The line formats here are the tool's own console output, a best-effort
//! text contract rather than an API. Transfer percentages are capped at 99:
//! the tool keeps working (merge, transcode, cleanup) after the last
//! transfer line, so 100 is reserved for the one marker it prints strictly
//! after post-processing, and for the orchestrator's own final event once
//! the output file is verified. If the tool ever rephrases that marker,
//! parser-driven completion stops firing; that fragility is part of the
//! contract and is not papered over here.

use gt_protocol::{ProgressEvent, ProgressKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Transfer line: `[download]  42.5% of ~10.00MiB at 1.50MiB/s ETA 00:05`.
static PERCENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[download\]\s+(\d+(?:\.\d+)?)%\s+of\s+~?(\S+)(?:\s+at\s+(\S+))?(?:\s+ETA\s+(\S+))?")
        .expect("transfer line regex")
});

/// Fragmented (DASH/HLS) transfer line suffix: `(frag 12/22)`.
static FRAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(frag (\d+)/(\d+)\)").expect("frag regex"));

const TRANSFER_CAP: f64 = 99.0;
const POSTPROCESS_PROGRESS: f64 = 99.5;

/// Parse one stdout line into at most one event. Lines that match nothing
/// yield `None`; most of the tool's output is not a progress line.
pub fn parse_line(kind: ProgressKind, line: &str) -> Option<ProgressEvent> {
    // Fragment counts outrank the percentage on the same line: early in a
    // fragmented download the tool's own percentage is per-fragment and
    // jumps around, while frag N/M is cumulative.
    if let Some(caps) = FRAG_RE.captures(line) {
        let current: f64 = caps[1].parse().ok()?;
        let total: f64 = caps[2].parse().ok()?;
        if total <= 0.0 {
            return None;
        }
        let pct = ((current / total * 1000.0).round() / 10.0).min(TRANSFER_CAP);
        return Some(ProgressEvent::progress(kind, pct, "downloading"));
    }

    if let Some(caps) = PERCENT_RE.captures(line) {
        let pct: f64 = caps[1].parse().ok()?;
        let size = caps.get(2).map(|m| m.as_str().to_string());
        let speed = caps.get(3).map(|m| m.as_str().to_string());
        let eta = caps.get(4).map(|m| m.as_str().to_string());
        return Some(
            ProgressEvent::progress(kind, pct.min(TRANSFER_CAP), "downloading")
                .with_throughput(size, speed, eta),
        );
    }

    if line.contains("[Merger]") {
        return Some(ProgressEvent::progress(kind, POSTPROCESS_PROGRESS, "merging"));
    }
    if line.contains("[ExtractAudio]") {
        return Some(ProgressEvent::progress(
            kind,
            POSTPROCESS_PROGRESS,
            "converting",
        ));
    }

    // Printed only after every post-processing step is done; the single
    // line the parser trusts to mean 100%.
    if line.trim_start().starts_with("Deleting original file") {
        return Some(ProgressEvent::progress(kind, 100.0, "complete"));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Option<ProgressEvent> {
        parse_line(ProgressKind::Video, line)
    }

    #[test]
    fn transfer_line_yields_capped_percent_with_throughput() {
        let ev = parse("[download]  42.5% of ~10.00MiB at 1.50MiB/s ETA 00:05").unwrap();
        assert_eq!(ev.progress, Some(42.5));
        assert_eq!(ev.status.as_deref(), Some("downloading"));
        assert_eq!(ev.size.as_deref(), Some("10.00MiB"));
        assert_eq!(ev.speed.as_deref(), Some("1.50MiB/s"));
        assert_eq!(ev.eta.as_deref(), Some("00:05"));
    }

    #[test]
    fn one_hundred_percent_transfer_is_capped_at_99() {
        let ev = parse("[download] 100% of 51.32MiB at 160.90KiB/s ETA 00:00").unwrap();
        assert_eq!(ev.progress, Some(99.0));
    }

    #[test]
    fn transfer_line_without_speed_still_parses() {
        let ev = parse("[download]  12.0% of 4.00MiB").unwrap();
        assert_eq!(ev.progress, Some(12.0));
        assert_eq!(ev.size.as_deref(), Some("4.00MiB"));
        assert!(ev.speed.is_none());
        assert!(ev.eta.is_none());
    }

    #[test]
    fn frag_counts_outrank_the_line_percent() {
        let ev = parse("[download]  54.5% of ~132.00MiB at 4.94MiB/s ETA 00:13 (frag 12/22)")
            .unwrap();
        // 12/22 = 54.545..., rounded to one decimal.
        assert_eq!(ev.progress, Some(54.5));
    }

    #[test]
    fn frag_progress_rounds_to_one_decimal_and_caps() {
        let ev = parse("(frag 1/3)").unwrap();
        assert_eq!(ev.progress, Some(33.3));
        let ev = parse("(frag 22/22)").unwrap();
        assert_eq!(ev.progress, Some(99.0));
    }

    #[test]
    fn frag_with_zero_total_yields_nothing() {
        assert!(parse("[download] 0.0% of 1MiB (frag 0/0)").is_none());
    }

    #[test]
    fn merger_line_is_a_fixed_postprocess_event() {
        let ev = parse("[Merger] Merging formats into \"/tmp/out.mp4\"").unwrap();
        assert_eq!(ev.progress, Some(99.5));
        assert_eq!(ev.status.as_deref(), Some("merging"));
    }

    #[test]
    fn extract_audio_line_reports_converting() {
        let ev = parse("[ExtractAudio] Destination: /tmp/out.mp3").unwrap();
        assert_eq!(ev.progress, Some(99.5));
        assert_eq!(ev.status.as_deref(), Some("converting"));
    }

    #[test]
    fn deleting_original_file_is_the_completion_marker() {
        let ev = parse("Deleting original file /tmp/out.f303 (pass -k to keep)").unwrap();
        assert_eq!(ev.progress, Some(100.0));
        assert_eq!(ev.status.as_deref(), Some("complete"));
    }

    #[test]
    fn ordinary_output_lines_yield_nothing() {
        for line in [
            "[youtube] dQw4w9WgXcQ: Downloading webpage",
            "[info] Writing video subtitles to: base.en.srt",
            "[download] Destination: /tmp/out.mp4",
            "WARNING: unable to extract channel id",
            "",
        ] {
            assert!(parse(line).is_none(), "line should not parse: {line:?}");
        }
    }

    #[test]
    fn events_carry_the_requested_kind() {
        let ev = parse_line(
            ProgressKind::Audio,
            "[download]  10.0% of 2.00MiB at 1.00MiB/s ETA 00:01",
        )
        .unwrap();
        assert_eq!(ev.kind, ProgressKind::Audio);
    }
}
