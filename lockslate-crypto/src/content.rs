//! AES-256-GCM content cipher for material blobs.
//!
//! The pipeline stores every uploaded file as `nonce || ciphertext+tag`
//! under the material's random secret. A fresh 96-bit nonce per
//! encryption keeps GCM safe even though the secret is reused across the
//! (single) blob it protects.

use crate::error::{CryptoError, CryptoResult};
use crate::secret::ContentSecret;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;

/// Size of the GCM nonce prepended to every encrypted blob.
pub const NONCE_SIZE: usize = 12;

/// Encrypts file bytes under a material secret.
pub fn encrypt_content(secret: &ContentSecret, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(secret.as_bytes()));

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| CryptoError::Encryption(format!("content encrypt failed: {e}")))?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypts a stored blob back into the original file bytes.
///
/// Fails on truncated blobs and on any tampering (GCM authentication).
pub fn decrypt_content(secret: &ContentSecret, blob: &[u8]) -> CryptoResult<Vec<u8>> {
    if blob.len() < NONCE_SIZE {
        return Err(CryptoError::Decryption(format!(
            "blob too short: {} bytes",
            blob.len()
        )));
    }
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(secret.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| {
            CryptoError::Decryption("content decrypt failed (wrong secret or tampered blob)".into())
        })
}
