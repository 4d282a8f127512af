//! Shared test support: a deterministic stub renderer and a pipeline
//! server harness.

use async_trait::async_trait;
use lockslate_pipeline::render::Renderer;
use lockslate_pipeline::{AppState, PipelineConfig, PipelineError, PipelineResult, router};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const INTERNAL_KEY: &str = "test-internal-key";

/// Renderer that interprets the decrypted source as a line-per-page
/// script instead of shelling out to the real toolchain.
///
/// - each non-empty line becomes one page, in order
/// - a line reading `SKIP` consumes its page index without producing a
///   page (simulates a partially rasterizable document)
/// - a source containing `UNRENDERABLE` fails outright
pub struct StubRenderer;

#[async_trait]
impl Renderer for StubRenderer {
    async fn rasterize_document(
        &self,
        source: &Path,
        out_dir: &Path,
    ) -> PipelineResult<Vec<(u32, PathBuf)>> {
        let text = tokio::fs::read_to_string(source)
            .await
            .map_err(|e| PipelineError::Render(format!("unreadable source: {e}")))?;
        if text.contains("UNRENDERABLE") {
            return Err(PipelineError::Render("stub: unrenderable source".into()));
        }

        let mut pages = Vec::new();
        for (i, line) in text.lines().filter(|l| !l.is_empty()).enumerate() {
            let index = (i + 1) as u32;
            if line == "SKIP" {
                continue;
            }
            let path = out_dir.join(format!("page-{index}.png"));
            tokio::fs::write(&path, line.as_bytes()).await?;
            pages.push((index, path));
        }
        if pages.is_empty() {
            return Err(PipelineError::Render("document produced no pages".into()));
        }
        Ok(pages)
    }

    async fn segment_video(
        &self,
        source: &Path,
        out_dir: &Path,
        segment_secs: u32,
    ) -> PipelineResult<()> {
        let bytes = tokio::fs::read(source).await?;
        if bytes.windows(12).any(|w| w == b"UNRENDERABLE") {
            return Err(PipelineError::Render("stub: unrenderable source".into()));
        }

        let mut playlist = format!(
            "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:{segment_secs}\n#EXT-X-PLAYLIST-TYPE:VOD\n"
        );
        for i in 0..2u32 {
            playlist.push_str(&format!("#EXTINF:{segment_secs}.0,\nsegment_{i:03}.ts\n"));
            tokio::fs::write(
                out_dir.join(format!("segment_{i:03}.ts")),
                format!("segment {i}").as_bytes(),
            )
            .await?;
        }
        playlist.push_str("#EXT-X-ENDLIST\n");
        tokio::fs::write(out_dir.join("playlist.m3u8"), playlist.as_bytes()).await?;
        Ok(())
    }
}

/// A pipeline server running on an ephemeral port with the stub
/// renderer. Dropping the harness tears down the data directory.
pub struct PipelineHarness {
    pub base_url: String,
    pub state: AppState,
    _data_dir: TempDir,
}

pub async fn spawn_pipeline(session_ttl_secs: u64) -> PipelineHarness {
    let data_dir = TempDir::new().unwrap();
    let mut config = PipelineConfig::new(data_dir.path(), INTERNAL_KEY).unwrap();
    config.session_ttl_secs = session_ttl_secs;

    let state = AppState::new(config, Arc::new(StubRenderer)).await.unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    PipelineHarness {
        base_url,
        state,
        _data_dir: data_dir,
    }
}
