//! Render pipeline error types and HTTP mappings.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can occur in the render pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid internal key")]
    Forbidden,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("session expired")]
    SessionExpired,

    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] lockslate_crypto::CryptoError),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Forbidden => (StatusCode::FORBIDDEN, "invalid internal key".to_string()),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("not found: {what}")),
            // 410, deliberately distinguishable from 404: the token was
            // real but its TTL elapsed and the client must re-authorize
            Self::SessionExpired => (StatusCode::GONE, "session expired".to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // Bad input (undecryptable/unrenderable), not infrastructure
            Self::Render(_) | Self::Crypto(_) => {
                tracing::warn!("render failure: {self}");
                (StatusCode::UNPROCESSABLE_ENTITY, "render failed".to_string())
            }
            Self::Io(_) | Self::Config(_) => {
                tracing::error!("internal pipeline error: {self}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
