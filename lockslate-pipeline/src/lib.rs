//! Render pipeline service for Lockslate.
//!
//! Owns the encrypted-at-rest material blobs and the ephemeral view
//! sessions derived from them:
//! - `/encrypt` stores an uploaded file encrypted under its per-material
//!   secret and hands back an opaque storage identifier
//! - `/decrypt/{stored_as}` decrypts a blob in a scoped workspace,
//!   renders it into viewer-consumable artifacts (page images or an HLS
//!   playlist) and opens a token-scoped view session
//! - token-scoped endpoints serve the rendered artifacts until the
//!   session TTL elapses; a background reaper reclaims records and disk
//!
//! The origin service is the only caller of the two internal endpoints,
//! authenticated by a shared internal key header. Artifact endpoints are
//! public: possession of a session token is the capability.

pub mod config;
pub mod error;
pub mod render;
pub mod service;
pub mod session;
pub mod store;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use service::{AppState, router};
