//! Origin service for Lockslate.
//!
//! Owns the material catalog (DuckDB) and the master key, and brokers
//! everything between browsers and the render pipeline:
//! - ingestion: spool the upload, generate a per-material secret, hand
//!   the bytes to the pipeline for encryption-at-rest, persist the
//!   catalog row with the codec-encrypted secret
//! - viewing: authorize class membership, decrypt the secret in memory,
//!   ask the pipeline to open a view session, relay the descriptor
//!   verbatim
//!
//! Authentication is an external collaborator: the fronting auth layer
//! installs `x-user-id`/`x-user-role` headers that this service trusts,
//! the same way it trusts the static internal key on the pipeline
//! channel. Neither is safe outside a private network boundary.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod materials;
pub mod pipeline_client;

pub use config::OriginConfig;
pub use error::{OriginError, OriginResult};
pub use materials::MaterialService;
