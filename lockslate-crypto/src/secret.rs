//! Per-material secrets and the catalog secret codec.

use crate::error::{CryptoError, CryptoResult};
use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Size of a material secret in bytes (256 bits).
pub const SECRET_SIZE: usize = 32;

/// A random per-material content encryption secret.
///
/// Generated once at ingest, hex-encoded on the wire between services,
/// and zeroized on drop. `Debug` never prints the key material.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ContentSecret([u8; SECRET_SIZE]);

impl ContentSecret {
    /// Generates a fresh random secret from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Reconstructs a secret from its hex encoding.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::Decode(e.to_string()))?;
        if bytes.len() != SECRET_SIZE {
            return Err(CryptoError::InvalidSecretLength {
                expected: SECRET_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; SECRET_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Hex encoding for transport to the pipeline and for codec storage.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; SECRET_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for ContentSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ContentSecret(..)")
    }
}

/// Deterministic codec for the catalog's `encryption_key` column.
///
/// AES-256-CBC with a key derived by hashing the master key and a fixed
/// all-zero IV. The fixed IV makes encryption deterministic: equal
/// secrets encrypt to equal ciphertext. That is a known CBC weakness and
/// is tolerable here only because every stored plaintext is itself a
/// random, unique per-material secret. A hardened variant would prepend
/// a random IV to the ciphertext or switch to an AEAD mode; the contract
/// (`encrypt -> hex blob`, `decrypt -> secret`) would not change.
pub struct SecretCodec {
    key: [u8; 32],
}

impl std::fmt::Debug for SecretCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretCodec(..)")
    }
}

impl Drop for SecretCodec {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl SecretCodec {
    /// Builds a codec from the environment-provided master key.
    ///
    /// An empty master key is a startup error, never a fallback.
    pub fn new(master_key: &str) -> CryptoResult<Self> {
        if master_key.is_empty() {
            return Err(CryptoError::EmptyMasterKey);
        }
        let key: [u8; 32] = Sha256::digest(master_key.as_bytes()).into();
        Ok(Self { key })
    }

    /// Encrypts a secret string, returning hex ciphertext for storage.
    pub fn encrypt_secret(&self, secret: &str) -> String {
        let iv = [0u8; 16];
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(secret.as_bytes());
        hex::encode(ciphertext)
    }

    /// Decrypts a stored hex ciphertext back into the secret string.
    pub fn decrypt_secret(&self, ciphertext_hex: &str) -> CryptoResult<String> {
        let ciphertext =
            hex::decode(ciphertext_hex).map_err(|e| CryptoError::Decode(e.to_string()))?;
        let iv = [0u8; 16];
        let plaintext = Aes256CbcDec::new(&self.key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|e| CryptoError::Decode(e.to_string()))?;
        match String::from_utf8(plaintext) {
            Ok(secret) => Ok(secret),
            Err(e) => {
                let mut bytes = e.into_bytes();
                bytes.zeroize();
                Err(CryptoError::Decode("plaintext is not valid UTF-8".into()))
            }
        }
    }
}
