//! Session client: material id → token → artifact URLs.

use crate::descriptor::RawDescriptor;
use crate::error::{ViewerError, ViewerResult};
use lockslate_types::{MaterialId, Role, UserId};
use reqwest::Client;
use tracing::debug;

/// Who is looking at the content.
///
/// `name`/`email` feed the watermark label (a deterrent, not a security
/// control). `user_id`/`role` are what the origin's auth layer expects.
#[derive(Clone, Debug)]
pub struct ViewerIdentity {
    pub user_id: UserId,
    pub role: Role,
    pub name: String,
    pub email: String,
}

/// Resolved, renderable content for one view session.
///
/// Every URL is token-scoped and ephemeral; there is nothing here a
/// "save as" could target once the session expires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewContent {
    Document {
        token: String,
        /// Absolute page-image URLs, in page order. The embedder may
        /// render eagerly or lazy-load below the fold, but must flag
        /// the elements non-draggable and context-menu-disabled.
        page_urls: Vec<String>,
    },
    Video {
        token: String,
        /// Absolute playlist URL for a native media element with
        /// download controls disabled.
        playlist_url: String,
    },
}

/// Controller-side HTTP client for the origin and the pipeline.
pub struct ViewerClient {
    client: Client,
    origin_base_url: String,
    pipeline_base_url: String,
    identity: ViewerIdentity,
}

impl ViewerClient {
    pub fn new(
        origin_base_url: impl Into<String>,
        pipeline_base_url: impl Into<String>,
        identity: ViewerIdentity,
    ) -> Self {
        Self {
            client: Client::new(),
            origin_base_url: origin_base_url.into(),
            pipeline_base_url: pipeline_base_url.into(),
            identity,
        }
    }

    pub fn identity(&self) -> &ViewerIdentity {
        &self.identity
    }

    /// Opens a view session for a material.
    ///
    /// One origin round-trip for the descriptor, plus (for documents)
    /// one pipeline round-trip for the page listing. No automatic
    /// retries on failure: the user closes the error state and tries
    /// again deliberately.
    pub async fn open(&self, material_id: MaterialId) -> ViewerResult<ViewContent> {
        let resp = self
            .client
            .get(format!("{}/material/view/{material_id}", self.origin_base_url))
            .header("x-user-id", self.identity.user_id.to_string())
            .header("x-user-role", self.identity.role.as_str())
            .send()
            .await
            .map_err(|e| ViewerError::TokenRetrieval(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ViewerError::TokenRetrieval(format!(
                "origin returned {}",
                resp.status()
            )));
        }
        let descriptor: RawDescriptor = resp
            .json()
            .await
            .map_err(|e| ViewerError::TokenRetrieval(e.to_string()))?;

        let token = descriptor
            .derive_token()
            .ok_or_else(|| ViewerError::TokenRetrieval("descriptor carries no token".into()))?;
        debug!(material = material_id, "view session opened");

        match descriptor.content_type.as_deref() {
            Some("document") => {
                let pages_path = descriptor
                    .pages
                    .clone()
                    .unwrap_or_else(|| format!("/document/{token}/pages"));
                let page_urls = self.fetch_page_listing(&pages_path).await?;
                Ok(ViewContent::Document { token, page_urls })
            }
            Some("video") => {
                let playlist_path = descriptor
                    .playlist
                    .clone()
                    .unwrap_or_else(|| format!("/video/{token}/playlist.m3u8"));
                Ok(ViewContent::Video {
                    token,
                    playlist_url: format!("{}{playlist_path}", self.pipeline_base_url),
                })
            }
            other => Err(ViewerError::UnsupportedContent(
                other.unwrap_or("unknown").to_string(),
            )),
        }
    }

    /// Fetches the page listing once and resolves absolute image URLs.
    async fn fetch_page_listing(&self, pages_path: &str) -> ViewerResult<Vec<String>> {
        #[derive(serde::Deserialize)]
        struct Listing {
            pages: Vec<String>,
        }

        let resp = self
            .client
            .get(format!("{}{pages_path}", self.pipeline_base_url))
            .send()
            .await
            .map_err(|e| ViewerError::PageListing(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ViewerError::PageListing(format!(
                "pipeline returned {}",
                resp.status()
            )));
        }
        let listing: Listing = resp
            .json()
            .await
            .map_err(|e| ViewerError::PageListing(e.to_string()))?;

        if listing.pages.is_empty() {
            return Err(ViewerError::PageListing("empty page listing".into()));
        }
        Ok(listing
            .pages
            .into_iter()
            .map(|p| format!("{}{p}", self.pipeline_base_url))
            .collect())
    }

    /// Fetches one page image (the embedder decides eager vs lazy).
    pub async fn fetch_page(&self, page_url: &str) -> ViewerResult<Vec<u8>> {
        let resp = self
            .client
            .get(page_url)
            .send()
            .await
            .map_err(|e| ViewerError::PageListing(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ViewerError::PageListing(format!(
                "page fetch returned {}",
                resp.status()
            )));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ViewerError::PageListing(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
