//! Encryption layer for Lockslate.
//!
//! Provides material-at-rest protection using:
//! - AES-256-GCM for the uploaded file bytes, under a random per-material
//!   secret
//! - AES-256-CBC (deterministic, see below) for storing that secret in
//!   the material catalog
//!
//! # Architecture
//!
//! The encryption uses a two-tier key system:
//!
//! 1. **Master Key**: environment-provided to the origin service. Its
//!    SHA-256 digest is the codec key that protects per-material secrets
//!    in the catalog. It never reaches the pipeline or a browser.
//!
//! 2. **Material Secret**: 32 random bytes generated per upload. The
//!    pipeline encrypts the file under this secret; the origin stores it
//!    only in codec-encrypted form and decrypts it transiently in memory
//!    when brokering a view session.
//!
//! This split keeps the catalog row useless without the master key, and
//! the encrypted blob useless without its per-material secret.

mod content;
mod error;
mod secret;

pub use content::{NONCE_SIZE, decrypt_content, encrypt_content};
pub use error::{CryptoError, CryptoResult};
pub use secret::{ContentSecret, SECRET_SIZE, SecretCodec};
