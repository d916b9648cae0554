use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Startup configuration, read from the environment once at bootstrap.
pub(crate) struct ServerConfig {
    pub addr: SocketAddr,
    /// Explicit location of the external tool (`GT_YTDLP_BIN`).
    pub tool_bin: Option<PathBuf>,
    /// Scratch directory override (`GT_SCRATCH_DIR`).
    pub scratch_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let host = env_var("GT_BIND").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = match env_var("GT_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid GT_PORT value {raw:?}"))?,
            None => 3000,
        };
        let addr = format!("{host}:{port}")
            .parse()
            .with_context(|| format!("invalid GT_BIND value {host:?}"))?;
        Ok(Self {
            addr,
            tool_bin: env_var("GT_YTDLP_BIN").map(PathBuf::from),
            scratch_dir: env_var("GT_SCRATCH_DIR").map(PathBuf::from),
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
