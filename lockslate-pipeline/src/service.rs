//! HTTP surface of the render pipeline.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::render::Renderer;
use crate::session::SessionStore;
use crate::store::ArtifactStore;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use lockslate_crypto::{ContentSecret, decrypt_content, encrypt_content};
use lockslate_types::{ContentKind, SessionDescriptor};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Header carrying the shared origin↔pipeline key.
pub const INTERNAL_KEY_HEADER: &str = "x-internal-key";

/// Shared state for the pipeline's axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<PipelineConfig>,
    store: ArtifactStore,
    sessions: SessionStore,
    renderer: Arc<dyn Renderer>,
}

impl AppState {
    /// Opens the blob store and session registry for the given config.
    pub async fn new(config: PipelineConfig, renderer: Arc<dyn Renderer>) -> PipelineResult<Self> {
        let store = ArtifactStore::open(config.blob_dir()).await?;
        tokio::fs::create_dir_all(config.session_dir()).await?;
        let sessions = SessionStore::new(config.session_ttl_secs);
        Ok(Self {
            config: Arc::new(config),
            store,
            sessions,
            renderer,
        })
    }

    /// Starts the TTL reaper for this state's session registry.
    pub fn spawn_reaper(&self) -> tokio::task::JoinHandle<()> {
        self.sessions.spawn_reaper(self.config.reap_interval_secs)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

/// Builds the pipeline router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/encrypt", post(encrypt))
        .route("/decrypt/:stored_as", post(decrypt))
        .route("/document/:token/pages", get(document_pages))
        .route("/document/:token/page/:name", get(document_page))
        .route("/video/:token/playlist.m3u8", get(video_playlist))
        .route("/video/:token/:segment", get(video_segment))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn verify_internal_key(state: &AppState, headers: &HeaderMap) -> PipelineResult<()> {
    let provided = headers
        .get(INTERNAL_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    if provided != Some(state.config.internal_key.as_str()) {
        return Err(PipelineError::Forbidden);
    }
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ── Internal endpoints (origin only) ──

async fn encrypt(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> PipelineResult<Json<serde_json::Value>> {
    verify_internal_key(&state, &headers)?;

    let mut file_bytes: Option<Vec<u8>> = None;
    let mut secret_hex: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PipelineError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| PipelineError::BadRequest(format!("file read failed: {e}")))?;
                file_bytes = Some(bytes.to_vec());
            }
            Some("secret") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| PipelineError::BadRequest(format!("secret read failed: {e}")))?;
                secret_hex = Some(text);
            }
            _ => {}
        }
    }

    let file_bytes =
        file_bytes.ok_or_else(|| PipelineError::BadRequest("missing file field".into()))?;
    if file_bytes.is_empty() {
        return Err(PipelineError::BadRequest("file is empty".into()));
    }
    let secret_hex =
        secret_hex.ok_or_else(|| PipelineError::BadRequest("missing secret field".into()))?;
    let secret = ContentSecret::from_hex(&secret_hex)
        .map_err(|e| PipelineError::BadRequest(format!("invalid secret: {e}")))?;

    let blob = encrypt_content(&secret, &file_bytes)?;
    let stored_as = state.store.put(&blob).await?;

    info!(%stored_as, size = file_bytes.len(), "stored encrypted material");
    Ok(Json(serde_json::json!({ "stored_as": stored_as })))
}

#[derive(Deserialize)]
struct DecryptRequest {
    filename: String,
    secret: String,
}

async fn decrypt(
    State(state): State<AppState>,
    Path(stored_as): Path<String>,
    headers: HeaderMap,
    Json(req): Json<DecryptRequest>,
) -> PipelineResult<Json<SessionDescriptor>> {
    verify_internal_key(&state, &headers)?;

    let blob = state.store.get(&stored_as).await?;
    let secret = ContentSecret::from_hex(&req.secret)
        .map_err(|e| PipelineError::BadRequest(format!("invalid secret: {e}")))?;

    let kind = ContentKind::from_filename(&req.filename);
    let source_name = sanitize_filename(&req.filename)?;

    // Encrypted → Decrypting: plaintext exists only inside the session
    // workspace from here on
    let plaintext = decrypt_content(&secret, &blob)?;

    let token = SessionStore::mint_token();
    let dir = state.config.session_dir().join(&token);
    tokio::fs::create_dir_all(&dir).await?;

    let rendered =
        render_into(&state, &stored_as, kind, &dir, &source_name, plaintext, &token).await;
    let descriptor = match rendered {
        Ok(descriptor) => descriptor,
        Err(e) => {
            // Never leave a half-rendered workspace behind
            let _ = tokio::fs::remove_dir_all(&dir).await;
            return Err(e);
        }
    };

    info!(%stored_as, kind = kind.as_str(), "view session ready");
    Ok(Json(descriptor))
}

/// Decrypted bytes → rendered artifacts → registered session.
async fn render_into(
    state: &AppState,
    stored_as: &str,
    kind: ContentKind,
    dir: &std::path::Path,
    source_name: &str,
    plaintext: Vec<u8>,
    token: &str,
) -> PipelineResult<SessionDescriptor> {
    let source = dir.join(source_name);
    tokio::fs::write(&source, &plaintext).await?;

    let (pages, descriptor) = match kind {
        ContentKind::Document => {
            let pages = state.renderer.rasterize_document(&source, dir).await?;
            let descriptor = SessionDescriptor::Document {
                token: token.to_string(),
                pages: format!("/document/{token}/pages"),
            };
            (pages, descriptor)
        }
        ContentKind::Video => {
            state
                .renderer
                .segment_video(&source, dir, state.config.segment_secs)
                .await?;
            let descriptor = SessionDescriptor::Video {
                token: token.to_string(),
                playlist: format!("/video/{token}/playlist.m3u8"),
            };
            (Vec::new(), descriptor)
        }
        ContentKind::Image | ContentKind::Other => {
            return Err(PipelineError::Render(format!(
                "no render path for {} content",
                kind.as_str()
            )));
        }
    };

    // The rendered artifacts are the session's content; the decrypted
    // source has served its purpose
    let _ = tokio::fs::remove_file(&source).await;

    state
        .sessions
        .insert(
            token.to_string(),
            stored_as.to_string(),
            kind,
            dir.to_path_buf(),
            pages,
        )
        .await;
    Ok(descriptor)
}

/// Keeps only the final path component of a client-supplied filename.
fn sanitize_filename(filename: &str) -> PipelineResult<String> {
    let name = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        return Err(PipelineError::BadRequest("invalid filename".into()));
    }
    Ok(name.to_string())
}

// ── Public token-scoped endpoints ──

async fn document_pages(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> PipelineResult<Json<serde_json::Value>> {
    let session = state.sessions.get(&token).await?;
    if session.kind != ContentKind::Document {
        return Err(PipelineError::NotFound("page listing".into()));
    }
    let pages: Vec<String> = session
        .pages
        .iter()
        .map(|(index, _)| format!("/document/{token}/page/{index}.png"))
        .collect();
    Ok(Json(serde_json::json!({ "pages": pages })))
}

async fn document_page(
    State(state): State<AppState>,
    Path((token, name)): Path<(String, String)>,
) -> PipelineResult<impl IntoResponse> {
    let session = state.sessions.get(&token).await?;
    let index: u32 = name
        .strip_suffix(".png")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| PipelineError::NotFound(format!("page {name}")))?;
    let path = session
        .pages
        .iter()
        .find(|(i, _)| *i == index)
        .map(|(_, p)| p.clone())
        .ok_or_else(|| PipelineError::NotFound(format!("page {index}")))?;

    let bytes = read_artifact(&path).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

async fn video_playlist(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> PipelineResult<impl IntoResponse> {
    let session = state.sessions.get(&token).await?;
    if session.kind != ContentKind::Video {
        return Err(PipelineError::NotFound("playlist".into()));
    }
    let bytes = read_artifact(&session.dir.join("playlist.m3u8")).await?;
    Ok(([(header::CONTENT_TYPE, "application/vnd.apple.mpegurl")], bytes))
}

async fn video_segment(
    State(state): State<AppState>,
    Path((token, segment)): Path<(String, String)>,
) -> PipelineResult<impl IntoResponse> {
    let session = state.sessions.get(&token).await?;
    // Only manifest-shaped segment names resolve; anything else 404s
    let valid = segment.strip_prefix("segment_").is_some_and(|rest| {
        rest.strip_suffix(".ts")
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    });
    if session.kind != ContentKind::Video || !valid {
        return Err(PipelineError::NotFound(format!("segment {segment}")));
    }
    let bytes = read_artifact(&session.dir.join(&segment)).await?;
    Ok(([(header::CONTENT_TYPE, "video/MP2T")], bytes))
}

async fn read_artifact(path: &std::path::Path) -> PipelineResult<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PipelineError::NotFound("artifact".into()))
        }
        Err(e) => Err(e.into()),
    }
}
