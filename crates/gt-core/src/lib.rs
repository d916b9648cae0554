//! Orchestration primitives around the external media-fetching tool.
//!
//! Nothing in this crate touches HTTP. It knows how to find and invoke the
//! tool, how to scrape progress out of its status lines, how to derive the
//! deterministic artifact names, and where scratch files live. The server
//! app composes these into the per-request download lifecycle.

pub mod metadata;
pub mod names;
pub mod progress;
pub mod runner;
pub mod workspace;
