//! HTTP client for the render pipeline's internal endpoints.
//!
//! Both calls block on network I/O under an explicit timeout; a timeout
//! or connection failure surfaces as PipelineUnavailable, distinct from
//! the pipeline rejecting the input (Render), so operators can tell
//! infrastructure failure apart from bad source files.

use crate::error::{OriginError, OriginResult};
use lockslate_types::SessionDescriptor;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Header carrying the shared origin↔pipeline key.
const INTERNAL_KEY_HEADER: &str = "x-internal-key";

/// Client for the pipeline's `/encrypt` and `/decrypt` endpoints.
#[derive(Clone)]
pub struct PipelineClient {
    client: Client,
    base_url: String,
    internal_key: String,
}

impl PipelineClient {
    pub fn new(
        base_url: impl Into<String>,
        internal_key: impl Into<String>,
        timeout_secs: u64,
    ) -> OriginResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| OriginError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            internal_key: internal_key.into(),
        })
    }

    /// Sends raw file bytes plus the material secret for
    /// encryption-at-rest; returns the opaque storage identifier.
    pub async fn encrypt(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        secret_hex: &str,
    ) -> OriginResult<String> {
        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string()),
            )
            .text("secret", secret_hex.to_string());

        let resp = self
            .client
            .post(format!("{}/encrypt", self.base_url))
            .header(INTERNAL_KEY_HEADER, &self.internal_key)
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        let resp = check_status(resp)?;

        #[derive(serde::Deserialize)]
        struct EncryptResponse {
            stored_as: Option<String>,
        }
        let body: EncryptResponse = resp
            .json()
            .await
            .map_err(|e| OriginError::Contract(format!("unparseable encrypt response: {e}")))?;

        // A 200 without a storage id means the blob's whereabouts are
        // unknown; fatal for this ingestion, no row may be committed
        body.stored_as
            .filter(|s| !s.is_empty())
            .ok_or_else(|| OriginError::Contract("encrypt response missing stored_as".into()))
    }

    /// Asks the pipeline to open a view session for a stored blob.
    pub async fn decrypt(
        &self,
        stored_as: &str,
        filename: &str,
        secret_hex: &str,
    ) -> OriginResult<SessionDescriptor> {
        let resp = self
            .client
            .post(format!("{}/decrypt/{stored_as}", self.base_url))
            .header(INTERNAL_KEY_HEADER, &self.internal_key)
            .json(&serde_json::json!({ "filename": filename, "secret": secret_hex }))
            .send()
            .await
            .map_err(map_transport_error)?;
        let resp = check_status(resp)?;

        let descriptor: SessionDescriptor = resp.json().await.map_err(|e| {
            OriginError::Contract(format!("failed to retrieve access token: {e}"))
        })?;
        debug!("pipeline opened session for {stored_as}");
        Ok(descriptor)
    }
}

fn map_transport_error(e: reqwest::Error) -> OriginError {
    if e.is_timeout() {
        OriginError::PipelineUnavailable("pipeline call timed out".into())
    } else {
        OriginError::PipelineUnavailable(e.to_string())
    }
}

fn check_status(resp: reqwest::Response) -> OriginResult<reqwest::Response> {
    match resp.status() {
        s if s.is_success() => Ok(resp),
        StatusCode::NOT_FOUND => Err(OriginError::NotFound("stored material blob".into())),
        StatusCode::UNPROCESSABLE_ENTITY => {
            Err(OriginError::Render("pipeline rejected source content".into()))
        }
        s => Err(OriginError::PipelineUnavailable(format!(
            "pipeline returned {s}"
        ))),
    }
}
