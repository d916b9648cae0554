use std::path::{Path, PathBuf};
use std::sync::Arc;

use gt_events::Registry;

/// Shared per-process state handed to every request handler.
///
/// The session registry is the only cross-request mutable state in the
/// whole server; the rest is resolved-once configuration.
#[derive(Clone)]
pub(crate) struct AppState {
    registry: Registry,
    tool_bin: Option<Arc<PathBuf>>,
    scratch: Arc<PathBuf>,
}

impl AppState {
    pub fn new(registry: Registry, tool_bin: Option<PathBuf>, scratch: PathBuf) -> Self {
        Self {
            registry,
            tool_bin: tool_bin.map(Arc::new),
            scratch: Arc::new(scratch),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Explicit tool location, if configured; `None` means the ordered
    /// lookup in `gt_core::runner` decides per invocation.
    pub fn tool_override(&self) -> Option<&Path> {
        self.tool_bin.as_deref().map(PathBuf::as_path)
    }

    pub fn scratch(&self) -> &Path {
        &self.scratch
    }
}
