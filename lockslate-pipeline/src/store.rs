//! Filesystem store for encrypted material blobs.
//!
//! Blobs are opaque `nonce || ciphertext` files named by a freshly
//! generated identifier. The identifier is the only handle the origin
//! ever sees; it carries no information about the content.

use crate::error::{PipelineError, PipelineResult};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File extension for encrypted blobs.
const BLOB_EXT: &str = "slate";

/// Blob store rooted at a single directory.
#[derive(Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Opens the store, creating the root directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> PipelineResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Writes an encrypted blob under a new opaque identifier.
    pub async fn put(&self, ciphertext: &[u8]) -> PipelineResult<String> {
        let stored_as = format!("{}.{BLOB_EXT}", Uuid::new_v4().simple());
        tokio::fs::write(self.root.join(&stored_as), ciphertext).await?;
        Ok(stored_as)
    }

    /// Reads a blob back by its identifier.
    pub async fn get(&self, stored_as: &str) -> PipelineResult<Vec<u8>> {
        let path = self.path_for(stored_as)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PipelineError::NotFound(format!("blob {stored_as}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolves an identifier to its on-disk path, rejecting anything
    /// that is not a well-formed blob id (no traversal via crafted ids).
    fn path_for(&self, stored_as: &str) -> PipelineResult<PathBuf> {
        let valid = stored_as
            .strip_suffix(&format!(".{BLOB_EXT}"))
            .is_some_and(|stem| !stem.is_empty() && stem.chars().all(|c| c.is_ascii_hexdigit()));
        if !valid {
            return Err(PipelineError::NotFound(format!("blob {stored_as}")));
        }
        Ok(self.root.join(stored_as))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
