//! Deterministic artifact naming: `{uploadDate}_{sanitizedTitle}.{ext}`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// Characters the filesystem (or a Content-Disposition header) cannot
/// stomach, replaced with `_`. Idempotent: sanitizing a sanitized title is
/// a no-op.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || c.is_control()
            {
                '_'
            } else {
                c
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Normalize an upload date to `YYYYMMDD`. The tool already reports dates in
/// that form; anything else is parsed as an ISO date if possible, and an
/// unparseable or missing value falls back to today (local time).
pub fn format_date(raw: Option<&str>) -> String {
    if let Some(raw) = raw {
        let trimmed = raw.trim();
        if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return trimmed.to_string();
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return date.format("%Y%m%d").to_string();
        }
    }
    chrono::Local::now().format("%Y%m%d").to_string()
}

/// Extensionless base name shared by a download and its subtitle variants.
pub fn base_name(upload_date: Option<&str>, title: &str) -> String {
    format!("{}_{}", format_date(upload_date), sanitize_title(title))
}

/// Full artifact file name for a given kind's extension.
pub fn output_file_name(upload_date: Option<&str>, title: &str, ext: &str) -> String {
    format!("{}.{}", base_name(upload_date, title), ext)
}

/// Ordered probe list for subtitle artifacts. The tool appends a language
/// or language-region suffix of its own choosing; these are the variants
/// observed for English tracks, most specific last. Widening this list for
/// other languages is a contract change, not a fix.
pub fn subtitle_candidates(dir: &Path, base: &str) -> Vec<PathBuf> {
    ["srt", "en.srt", "en-US.srt", "en-GB.srt", "en_US.srt", "en_GB.srt"]
        .iter()
        .map(|suffix| dir.join(format!("{base}.{suffix}")))
        .collect()
}
