//! Origin service binary.

use anyhow::Context;
use lockslate_crypto::SecretCodec;
use lockslate_origin::db::MaterialStore;
use lockslate_origin::http::{OriginState, router};
use lockslate_origin::pipeline_client::PipelineClient;
use lockslate_origin::{MaterialService, OriginConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = OriginConfig::from_env().context("loading origin configuration")?;

    // Fails fast on an empty master key
    let codec = Arc::new(SecretCodec::new(&config.master_key).context("building secret codec")?);

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent).context("creating database directory")?;
    }
    std::fs::create_dir_all(&config.spool_dir).context("creating spool directory")?;

    let db = MaterialStore::open(&config.db_path).context("opening material catalog")?;
    let pipeline = PipelineClient::new(
        &config.pipeline_base_url,
        &config.internal_key,
        config.pipeline_timeout_secs,
    )
    .context("building pipeline client")?;

    let state = OriginState {
        service: Arc::new(MaterialService::new(db, pipeline, codec)),
        spool_dir: config.spool_dir.clone(),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("origin listening on {}", config.bind_addr);

    axum::serve(listener, router(state))
        .await
        .context("serving origin")?;
    Ok(())
}
