//! Viewer controller for Lockslate.
//!
//! The browser-side half of the secure delivery pipeline, as an
//! embeddable controller: exchanges a material id for a session
//! descriptor through the origin, resolves the token and artifact URLs,
//! and runs the anti-exfiltration guard (focus-loss obscuring, key-chord
//! interception, watermark tiling) for as long as content is on screen.
//!
//! Nothing here is a cryptographic control: the guard and watermark are
//! deterrents; the actual protection is that the viewer only ever holds
//! ephemeral, token-scoped artifact URLs, never a raw file URL.

pub mod client;
pub mod descriptor;
pub mod guard;
pub mod watermark;

pub use client::{ViewContent, ViewerClient, ViewerIdentity};
pub use descriptor::RawDescriptor;
pub use error::{ViewerError, ViewerResult};
pub use guard::{ExfiltrationGuard, GuardEffect, GuardEvent, KeyChord};
pub use watermark::Watermark;

mod error {
    use thiserror::Error;

    /// Result type for viewer operations.
    pub type ViewerResult<T> = Result<T, ViewerError>;

    /// Distinct inline error states the embedding UI renders, each with
    /// a manual close affordance. None of them auto-retries: repeated
    /// silent retries against a failing decrypt pipeline amplify load
    /// without benefit.
    #[derive(Debug, Error)]
    pub enum ViewerError {
        #[error("failed to retrieve access token: {0}")]
        TokenRetrieval(String),

        #[error("failed to load page listing: {0}")]
        PageListing(String),

        #[error("unsupported content type: {0}")]
        UnsupportedContent(String),
    }
}
