//! Render pipeline configuration.

use crate::error::{PipelineError, PipelineResult};
use std::path::PathBuf;

/// Configuration for the render pipeline service.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Socket address to bind the HTTP server on.
    pub bind_addr: String,

    /// Root directory for encrypted blobs and session workspaces.
    pub data_dir: PathBuf,

    /// Shared key authenticating origin→pipeline calls
    /// (`x-internal-key` header).
    pub internal_key: String,

    /// View session time-to-live in seconds.
    pub session_ttl_secs: u64,

    /// How often the reaper sweeps expired sessions, in seconds.
    pub reap_interval_secs: u64,

    /// Upload size cap in bytes.
    pub max_upload_bytes: usize,

    /// Target HLS segment duration in seconds.
    pub segment_secs: u32,
}

impl PipelineConfig {
    /// Builds a config with service defaults for the given data
    /// directory and internal key.
    pub fn new(data_dir: impl Into<PathBuf>, internal_key: impl Into<String>) -> PipelineResult<Self> {
        let internal_key = internal_key.into();
        if internal_key.is_empty() {
            return Err(PipelineError::Config("internal key must not be empty".into()));
        }
        Ok(Self {
            bind_addr: "127.0.0.1:8600".to_string(),
            data_dir: data_dir.into(),
            internal_key,
            session_ttl_secs: 300,
            reap_interval_secs: 30,
            max_upload_bytes: 200 * 1024 * 1024,
            segment_secs: 8,
        })
    }

    /// Reads configuration from the environment.
    ///
    /// `LOCKSLATE_INTERNAL_KEY` is required and must be non-empty; the
    /// service fails fast at startup otherwise.
    pub fn from_env() -> PipelineResult<Self> {
        let internal_key = std::env::var("LOCKSLATE_INTERNAL_KEY")
            .map_err(|_| PipelineError::Config("LOCKSLATE_INTERNAL_KEY not set".into()))?;
        let data_dir = std::env::var("LOCKSLATE_PIPELINE_DATA_DIR")
            .unwrap_or_else(|_| "pipeline-data".to_string());

        let mut config = Self::new(data_dir, internal_key)?;
        if let Ok(addr) = std::env::var("LOCKSLATE_PIPELINE_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(ttl) = std::env::var("LOCKSLATE_SESSION_TTL_SECS") {
            config.session_ttl_secs = ttl
                .parse()
                .map_err(|_| PipelineError::Config("LOCKSLATE_SESSION_TTL_SECS must be an integer".into()))?;
        }
        Ok(config)
    }

    /// Directory holding encrypted blobs.
    pub fn blob_dir(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    /// Directory holding per-session decrypted/rendered workspaces.
    pub fn session_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }
}
