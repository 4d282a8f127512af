//! Origin error taxonomy and HTTP mappings.
//!
//! Everything internal is caught at the view-handling boundary and
//! mapped to a generic user-visible message plus a machine-readable
//! `kind`. Raw error text and stack traces never reach the browser;
//! full detail goes to the server-side log.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type for origin operations.
pub type OriginResult<T> = Result<T, OriginError>;

/// Errors that can occur in the origin service.
#[derive(Debug, Error)]
pub enum OriginError {
    #[error("requester lacks access")]
    Authorization,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("pipeline unavailable: {0}")]
    PipelineUnavailable(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("pipeline contract violation: {0}")]
    Contract(String),

    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("catalog error: {0}")]
    Storage(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] lockslate_crypto::CryptoError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl OriginError {
    /// Machine-readable kind for the response body.
    fn kind(&self) -> &'static str {
        match self {
            Self::Authorization => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::PipelineUnavailable(_) | Self::Contract(_) => "pipeline_unavailable",
            Self::Render(_) | Self::Crypto(_) => "render_failed",
            Self::BadRequest(_) => "bad_request",
            Self::Storage(_) | Self::Config(_) => "internal",
        }
    }
}

impl IntoResponse for OriginError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Authorization => (StatusCode::FORBIDDEN, "access denied"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not found"),
            Self::PipelineUnavailable(_) | Self::Contract(_) => {
                tracing::error!("pipeline failure: {self}");
                (StatusCode::BAD_GATEWAY, "viewing failed")
            }
            Self::Render(_) | Self::Crypto(_) => {
                tracing::warn!("render failure: {self}");
                (StatusCode::BAD_GATEWAY, "viewing failed")
            }
            Self::BadRequest(msg) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": msg, "kind": "bad_request" })),
                )
                    .into_response();
            }
            Self::Storage(_) | Self::Config(_) => {
                tracing::error!("internal origin error: {self}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        };
        (
            status,
            Json(serde_json::json!({ "error": message, "kind": self.kind() })),
        )
            .into_response()
    }
}

impl From<duckdb::Error> for OriginError {
    fn from(e: duckdb::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
