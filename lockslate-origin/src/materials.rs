//! Material ingestion and view-session brokering.

use crate::db::MaterialStore;
use crate::error::{OriginError, OriginResult};
use crate::pipeline_client::PipelineClient;
use lockslate_crypto::{ContentSecret, SecretCodec};
use lockslate_types::{ClassId, ContentKind, MaterialId, MaterialSummary, Requester, Role, SessionDescriptor};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Core material operations behind the HTTP surface.
#[derive(Clone)]
pub struct MaterialService {
    db: MaterialStore,
    pipeline: PipelineClient,
    codec: Arc<SecretCodec>,
}

impl MaterialService {
    pub fn new(db: MaterialStore, pipeline: PipelineClient, codec: Arc<SecretCodec>) -> Self {
        Self { db, pipeline, codec }
    }

    pub fn db(&self) -> &MaterialStore {
        &self.db
    }

    /// Ingests a spooled upload.
    ///
    /// The spool file itself belongs to the caller, whose guard deletes
    /// it on every path out of here; this function never persists the
    /// plaintext anywhere else on the origin.
    pub async fn ingest(
        &self,
        class_id: ClassId,
        title: &str,
        description: Option<&str>,
        filename: &str,
        spool: &Path,
        requester: Requester,
    ) -> OriginResult<MaterialId> {
        if requester.role != Role::Teacher
            || self.db.role_in_class(class_id, requester.user_id)? != Some(Role::Teacher)
        {
            return Err(OriginError::Authorization);
        }
        if title.is_empty() {
            return Err(OriginError::BadRequest("title must not be empty".into()));
        }

        let bytes = tokio::fs::read(spool)
            .await
            .map_err(|e| OriginError::Storage(format!("spool read failed: {e}")))?;
        if bytes.is_empty() {
            return Err(OriginError::BadRequest("file must not be empty".into()));
        }
        let size = bytes.len();

        // Fresh secret per upload; an ingestion retry after failure
        // deliberately re-generates it rather than reusing state
        let secret = ContentSecret::generate();
        let stored_as = self
            .pipeline
            .encrypt(filename, bytes, &secret.to_hex())
            .await?;

        let encrypted_key = self.codec.encrypt_secret(&secret.to_hex());
        let id = self.db.insert_material(
            class_id,
            title,
            description,
            ContentKind::from_filename(filename),
            filename,
            &stored_as,
            &encrypted_key,
            requester.user_id,
        )?;

        info!(material = id, class = class_id, size, "material ingested");
        Ok(id)
    }

    /// Authorizes a view request and brokers a pipeline session.
    ///
    /// The decrypted secret exists only on this call's stack; it is
    /// forwarded to the pipeline and dropped.
    pub async fn authorize_view(
        &self,
        material_id: MaterialId,
        requester: Requester,
    ) -> OriginResult<SessionDescriptor> {
        let record = self.db.get(material_id)?;
        if !self.db.is_member(record.class_id, requester.user_id)? {
            return Err(OriginError::Authorization);
        }

        let secret_hex = self.codec.decrypt_secret(&record.encryption_key)?;
        let descriptor = self
            .pipeline
            .decrypt(&record.stored_as, &record.filename, &secret_hex)
            .await?;

        // Advisory metadata only: failure must not fail the view
        if let Err(e) = self.db.touch_last_accessed(material_id) {
            warn!(material = material_id, "last_accessed update failed: {e}");
        }

        info!(material = material_id, user = requester.user_id, "view session brokered");
        Ok(descriptor)
    }

    /// Lists a class's materials for a member.
    pub fn list(&self, class_id: ClassId, requester: Requester) -> OriginResult<Vec<MaterialSummary>> {
        if !self.db.is_member(class_id, requester.user_id)? {
            return Err(OriginError::Authorization);
        }
        self.db.list_for_class(class_id)
    }

    /// Removes a material from the catalog (teacher of its class only).
    pub fn delete(&self, material_id: MaterialId, requester: Requester) -> OriginResult<()> {
        let record = self.db.get(material_id)?;
        if self.db.role_in_class(record.class_id, requester.user_id)? != Some(Role::Teacher) {
            return Err(OriginError::Authorization);
        }
        self.db.delete(material_id)
    }
}
