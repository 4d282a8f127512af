//! Browser-facing HTTP surface of the origin.

use crate::error::{OriginError, OriginResult};
use crate::materials::MaterialService;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use lockslate_types::{ClassId, MaterialId, Requester, Role, SessionDescriptor};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Upload size cap, matching the pipeline's.
const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Shared state for the origin's axum handlers.
#[derive(Clone)]
pub struct OriginState {
    pub service: Arc<MaterialService>,
    pub spool_dir: PathBuf,
}

/// Builds the origin router.
pub fn router(state: OriginState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/material/upload", post(upload_material))
        // GET takes a class id, DELETE a material id, matching the
        // external routes this mirrors
        .route(
            "/api/material/:id",
            get(list_materials).delete(delete_material),
        )
        .route("/material/view/:id", get(view_material))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Extracts the caller identity installed by the fronting auth layer.
fn requester_from_headers(headers: &HeaderMap) -> OriginResult<Requester> {
    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    let role = headers
        .get("x-user-role")
        .and_then(|v| v.to_str().ok())
        .and_then(Role::parse);
    match (user_id, role) {
        (Some(user_id), Some(role)) => Ok(Requester { user_id, role }),
        _ => Err(OriginError::Authorization),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn upload_material(
    State(state): State<OriginState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> OriginResult<Json<serde_json::Value>> {
    let requester = requester_from_headers(&headers)?;

    let mut class_id: Option<ClassId> = None;
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut upload: Option<(String, tempfile::NamedTempFile)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| OriginError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("class_id") => {
                let text = read_text(field).await?;
                class_id = Some(
                    text.parse()
                        .map_err(|_| OriginError::BadRequest("class_id must be an integer".into()))?,
                );
            }
            Some("title") => title = Some(read_text(field).await?),
            Some("description") => description = Some(read_text(field).await?),
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| OriginError::BadRequest("file field needs a filename".into()))?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| OriginError::BadRequest(format!("file read failed: {e}")))?;

                // Spool to disk behind a guard: the temp file is removed
                // when this handler returns, success or not
                let mut spool = tempfile::NamedTempFile::new_in(&state.spool_dir)
                    .map_err(|e| OriginError::Storage(format!("spool create failed: {e}")))?;
                spool
                    .write_all(&bytes)
                    .map_err(|e| OriginError::Storage(format!("spool write failed: {e}")))?;
                upload = Some((filename, spool));
            }
            _ => {}
        }
    }

    let class_id =
        class_id.ok_or_else(|| OriginError::BadRequest("missing class_id field".into()))?;
    let title = title.ok_or_else(|| OriginError::BadRequest("missing title field".into()))?;
    let (filename, spool) =
        upload.ok_or_else(|| OriginError::BadRequest("missing file field".into()))?;

    let id = state
        .service
        .ingest(
            class_id,
            &title,
            description.as_deref(),
            &filename,
            spool.path(),
            requester,
        )
        .await?;

    Ok(Json(serde_json::json!({ "id": id })))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> OriginResult<String> {
    field
        .text()
        .await
        .map_err(|e| OriginError::BadRequest(format!("field read failed: {e}")))
}

async fn list_materials(
    State(state): State<OriginState>,
    Path(class_id): Path<ClassId>,
    headers: HeaderMap,
) -> OriginResult<Json<serde_json::Value>> {
    let requester = requester_from_headers(&headers)?;
    let materials = state.service.list(class_id, requester)?;
    Ok(Json(serde_json::json!({ "materials": materials })))
}

async fn delete_material(
    State(state): State<OriginState>,
    Path(id): Path<MaterialId>,
    headers: HeaderMap,
) -> OriginResult<Json<serde_json::Value>> {
    let requester = requester_from_headers(&headers)?;
    state.service.delete(id, requester)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Relays the pipeline's session descriptor verbatim; never the raw
/// storage id or the encryption key.
async fn view_material(
    State(state): State<OriginState>,
    Path(id): Path<MaterialId>,
    headers: HeaderMap,
) -> OriginResult<Json<SessionDescriptor>> {
    let requester = requester_from_headers(&headers)?;
    let descriptor = state.service.authorize_view(id, requester).await?;
    Ok(Json(descriptor))
}
