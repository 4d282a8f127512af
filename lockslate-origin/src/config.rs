//! Origin service configuration.

use crate::error::{OriginError, OriginResult};
use std::path::PathBuf;

/// Configuration for the origin service.
#[derive(Clone, Debug)]
pub struct OriginConfig {
    /// Socket address to bind the HTTP server on.
    pub bind_addr: String,

    /// DuckDB database path (`:memory:` for tests).
    pub db_path: PathBuf,

    /// Base URL of the render pipeline (e.g. "http://127.0.0.1:8600").
    pub pipeline_base_url: String,

    /// Shared key for the origin→pipeline channel.
    pub internal_key: String,

    /// Master key protecting per-material secrets in the catalog.
    pub master_key: String,

    /// Directory where uploads are spooled before ingestion.
    pub spool_dir: PathBuf,

    /// Timeout for pipeline calls in seconds.
    pub pipeline_timeout_secs: u64,
}

impl OriginConfig {
    /// Reads configuration from the environment.
    ///
    /// `LOCKSLATE_MASTER_KEY` and `LOCKSLATE_INTERNAL_KEY` are required;
    /// an empty master key is additionally rejected when the secret
    /// codec is built at startup.
    pub fn from_env() -> OriginResult<Self> {
        let master_key = std::env::var("LOCKSLATE_MASTER_KEY")
            .map_err(|_| OriginError::Config("LOCKSLATE_MASTER_KEY not set".into()))?;
        let internal_key = std::env::var("LOCKSLATE_INTERNAL_KEY")
            .map_err(|_| OriginError::Config("LOCKSLATE_INTERNAL_KEY not set".into()))?;

        Ok(Self {
            bind_addr: std::env::var("LOCKSLATE_ORIGIN_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8500".to_string()),
            db_path: std::env::var("LOCKSLATE_DB_PATH")
                .unwrap_or_else(|_| "origin-data/catalog.duckdb".to_string())
                .into(),
            pipeline_base_url: std::env::var("LOCKSLATE_PIPELINE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8600".to_string()),
            internal_key,
            master_key,
            spool_dir: std::env::var("LOCKSLATE_SPOOL_DIR")
                .unwrap_or_else(|_| "origin-data/spool".to_string())
                .into(),
            pipeline_timeout_secs: 60,
        })
    }
}
