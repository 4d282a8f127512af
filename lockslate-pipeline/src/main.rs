//! Render pipeline service binary.

use anyhow::Context;
use lockslate_pipeline::render::CommandRenderer;
use lockslate_pipeline::{AppState, PipelineConfig, router};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = PipelineConfig::from_env().context("loading pipeline configuration")?;
    let bind_addr = config.bind_addr.clone();

    let state = AppState::new(config, Arc::new(CommandRenderer))
        .await
        .context("opening pipeline state")?;
    state.spawn_reaper();

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!("render pipeline listening on {bind_addr}");

    axum::serve(listener, router(state))
        .await
        .context("serving render pipeline")?;
    Ok(())
}
