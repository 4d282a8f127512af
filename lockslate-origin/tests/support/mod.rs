//! End-to-end harness: a real pipeline server (with a stub renderer)
//! plus a real origin server, each on an ephemeral port.

use async_trait::async_trait;
use lockslate_crypto::SecretCodec;
use lockslate_origin::db::MaterialStore;
use lockslate_origin::http::{OriginState, router as origin_router};
use lockslate_origin::pipeline_client::PipelineClient;
use lockslate_origin::MaterialService;
use lockslate_pipeline::render::Renderer;
use lockslate_pipeline::{AppState, PipelineConfig, PipelineError, PipelineResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const INTERNAL_KEY: &str = "e2e-internal-key";
pub const MASTER_KEY: &str = "e2e-master-key";

/// Line-per-page document renderer, byte-copy video "transcoder".
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
        let mut pages = Vec::new();
        for (i, line) in text.lines().filter(|l| !l.is_empty()).enumerate() {
            let index = (i + 1) as u32;
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
        let mut playlist = format!("#EXTM3U\n#EXT-X-TARGETDURATION:{segment_secs}\n");
        for i in 0..3u32 {
            playlist.push_str(&format!("#EXTINF:{segment_secs}.0,\nsegment_{i:03}.ts\n"));
            let mut segment = format!("seg{i}:").into_bytes();
            segment.extend_from_slice(&bytes);
            tokio::fs::write(out_dir.join(format!("segment_{i:03}.ts")), segment).await?;
        }
        playlist.push_str("#EXT-X-ENDLIST\n");
        tokio::fs::write(out_dir.join("playlist.m3u8"), playlist).await?;
        Ok(())
    }
}

pub struct E2eHarness {
    pub pipeline_url: String,
    pub origin_url: String,
    pub service: Arc<MaterialService>,
    pub spool_dir: PathBuf,
    _pipeline_data: TempDir,
    _origin_data: TempDir,
}

pub async fn spawn_stack() -> E2eHarness {
    // Pipeline
    let pipeline_data = TempDir::new().unwrap();
    let pipeline_config = PipelineConfig::new(pipeline_data.path(), INTERNAL_KEY).unwrap();
    let pipeline_state = AppState::new(pipeline_config, Arc::new(StubRenderer))
        .await
        .unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let pipeline_url = format!("http://{}", listener.local_addr().unwrap());
    let app = lockslate_pipeline::router(pipeline_state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Origin
    let origin_data = TempDir::new().unwrap();
    let spool_dir = origin_data.path().join("spool");
    tokio::fs::create_dir_all(&spool_dir).await.unwrap();

    let db = MaterialStore::open_in_memory().unwrap();
    let service = Arc::new(MaterialService::new(
        db,
        PipelineClient::new(&pipeline_url, INTERNAL_KEY, 60).unwrap(),
        Arc::new(SecretCodec::new(MASTER_KEY).unwrap()),
    ));
    let state = OriginState {
        service: service.clone(),
        spool_dir: spool_dir.clone(),
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let origin_url = format!("http://{}", listener.local_addr().unwrap());
    let app = origin_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    E2eHarness {
        pipeline_url,
        origin_url,
        service,
        spool_dir,
        _pipeline_data: pipeline_data,
        _origin_data: origin_data,
    }
}
