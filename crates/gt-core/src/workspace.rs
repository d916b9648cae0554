//! Scratch directory for in-flight download artifacts.

use std::path::{Path, PathBuf};

use tracing::warn;

/// Subdirectory under the system temp root used by default.
pub const SCRATCH_SUBDIR: &str = "grabtube";

/// Resolve a writable scratch directory, creating it when absent.
///
/// With an explicit override the override is created and used; otherwise a
/// dedicated subdirectory under the system temp root. If creation fails the
/// bare temp root is used instead; artifacts still land somewhere
/// writable, just unscoped. The directory persists across runs; artifacts
/// are deleted per-download, never swept wholesale.
pub fn scratch_dir(override_dir: Option<&Path>) -> PathBuf {
    let dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::temp_dir().join(SCRATCH_SUBDIR),
    };
    match std::fs::create_dir_all(&dir) {
        Ok(()) => dir,
        Err(err) => {
            warn!(dir = %dir.display(), %err, "scratch dir uncreatable, using system temp root");
            std::env::temp_dir()
        }
    }
}
