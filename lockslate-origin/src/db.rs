//! DuckDB-backed material catalog and class-membership reads.
//!
//! The origin exclusively owns the `materials` table. `class_members`
//! belongs to the external roster system; this store only reads it for
//! authorization (plus a seeding helper for deployments and tests).

use crate::error::{OriginError, OriginResult};
use chrono::{DateTime, TimeZone, Utc};
use duckdb::{Connection, params};
use lockslate_types::{ClassId, ContentKind, MaterialId, MaterialSummary, Role, UserId};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// One full catalog row, service-internal.
///
/// `encryption_key` is the codec-encrypted per-material secret; it is
/// never serialized outward.
#[derive(Clone, Debug)]
pub struct MaterialRecord {
    pub id: MaterialId,
    pub class_id: ClassId,
    pub title: String,
    pub description: Option<String>,
    pub content_kind: ContentKind,
    pub filename: String,
    pub stored_as: String,
    pub encryption_key: String,
    pub uploaded_by: UserId,
    pub created_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
}

/// Material catalog backed by DuckDB.
#[derive(Clone)]
pub struct MaterialStore {
    conn: Arc<Mutex<Connection>>,
}

impl MaterialStore {
    /// Opens or creates the catalog at the given path.
    pub fn open(db_path: &Path) -> OriginResult<Self> {
        let conn = if db_path.to_str() == Some(":memory:") {
            Connection::open_in_memory()
        } else {
            Connection::open(db_path)
        }?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.ensure_tables()?;
        Ok(store)
    }

    /// Opens an in-memory catalog (for testing).
    pub fn open_in_memory() -> OriginResult<Self> {
        Self::open(Path::new(":memory:"))
    }

    fn ensure_tables(&self) -> OriginResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "CREATE SEQUENCE IF NOT EXISTS material_ids START 1;
             CREATE TABLE IF NOT EXISTS materials (
                id BIGINT PRIMARY KEY DEFAULT nextval('material_ids'),
                class_id BIGINT NOT NULL,
                title VARCHAR NOT NULL,
                description VARCHAR,
                content_kind VARCHAR NOT NULL,
                filename VARCHAR NOT NULL,
                stored_as VARCHAR NOT NULL,
                encryption_key VARCHAR NOT NULL,
                uploaded_by BIGINT NOT NULL,
                created_at BIGINT NOT NULL,
                last_accessed BIGINT
             );
             CREATE TABLE IF NOT EXISTS class_members (
                class_id BIGINT NOT NULL,
                user_id BIGINT NOT NULL,
                role VARCHAR NOT NULL,
                PRIMARY KEY (class_id, user_id)
             );",
        )?;
        Ok(())
    }

    fn lock(&self) -> OriginResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| OriginError::Storage(e.to_string()))
    }

    /// Inserts a new material row and returns its id.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_material(
        &self,
        class_id: ClassId,
        title: &str,
        description: Option<&str>,
        content_kind: ContentKind,
        filename: &str,
        stored_as: &str,
        encryption_key: &str,
        uploaded_by: UserId,
    ) -> OriginResult<MaterialId> {
        let conn = self.lock()?;
        let id = conn.query_row(
            "INSERT INTO materials
                (class_id, title, description, content_kind, filename,
                 stored_as, encryption_key, uploaded_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
            params![
                class_id,
                title,
                description,
                content_kind.as_str(),
                filename,
                stored_as,
                encryption_key,
                uploaded_by,
                Utc::now().timestamp_millis(),
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Loads one material by id.
    pub fn get(&self, id: MaterialId) -> OriginResult<MaterialRecord> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, class_id, title, description, content_kind, filename,
                    stored_as, encryption_key, uploaded_by, created_at, last_accessed
             FROM materials WHERE id = ?",
            params![id],
            |row| {
                Ok(MaterialRecord {
                    id: row.get(0)?,
                    class_id: row.get(1)?,
                    title: row.get(2)?,
                    description: row.get(3)?,
                    content_kind: ContentKind::parse(&row.get::<_, String>(4)?)
                        .unwrap_or(ContentKind::Other),
                    filename: row.get(5)?,
                    stored_as: row.get(6)?,
                    encryption_key: row.get(7)?,
                    uploaded_by: row.get(8)?,
                    created_at: millis_to_datetime(row.get(9)?),
                    last_accessed: row.get::<_, Option<i64>>(10)?.map(millis_to_datetime),
                })
            },
        )
        .map_err(|_| OriginError::NotFound(format!("material {id}")))
    }

    /// Lists a class's materials, newest first.
    pub fn list_for_class(&self, class_id: ClassId) -> OriginResult<Vec<MaterialSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, class_id, title, description, content_kind,
                    uploaded_by, created_at, last_accessed
             FROM materials WHERE class_id = ? ORDER BY created_at DESC, id DESC",
        )?;
        let rows: Vec<MaterialSummary> = stmt
            .query_map(params![class_id], |row| {
                Ok(MaterialSummary {
                    id: row.get(0)?,
                    class_id: row.get(1)?,
                    title: row.get(2)?,
                    description: row.get(3)?,
                    content_kind: ContentKind::parse(&row.get::<_, String>(4)?)
                        .unwrap_or(ContentKind::Other),
                    uploaded_by: row.get(5)?,
                    created_at: millis_to_datetime(row.get(6)?),
                    last_accessed: row.get::<_, Option<i64>>(7)?.map(millis_to_datetime),
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Deletes a material row.
    pub fn delete(&self, id: MaterialId) -> OriginResult<()> {
        let conn = self.lock()?;
        let affected = conn.execute("DELETE FROM materials WHERE id = ?", params![id])?;
        if affected == 0 {
            return Err(OriginError::NotFound(format!("material {id}")));
        }
        Ok(())
    }

    /// Advisory last-accessed update; last-write-wins under concurrency.
    pub fn touch_last_accessed(&self, id: MaterialId) -> OriginResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE materials SET last_accessed = ? WHERE id = ?",
            params![Utc::now().timestamp_millis(), id],
        )?;
        Ok(())
    }

    // ── class_members (external, read-mostly) ──

    /// Seeds a membership row (deployments and tests; roster CRUD is
    /// the external system's job).
    pub fn add_member(&self, class_id: ClassId, user_id: UserId, role: Role) -> OriginResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO class_members (class_id, user_id, role) VALUES (?, ?, ?)",
            params![class_id, user_id, role.as_str()],
        )?;
        Ok(())
    }

    /// Returns the requester's role within a class, if any.
    pub fn role_in_class(&self, class_id: ClassId, user_id: UserId) -> OriginResult<Option<Role>> {
        let conn = self.lock()?;
        let role: Option<String> = conn
            .query_row(
                "SELECT role FROM class_members WHERE class_id = ? AND user_id = ?",
                params![class_id, user_id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                duckdb::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        Ok(role.as_deref().and_then(Role::parse))
    }

    /// Membership check gating every material operation.
    pub fn is_member(&self, class_id: ClassId, user_id: UserId) -> OriginResult<bool> {
        Ok(self.role_in_class(class_id, user_id)?.is_some())
    }
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(Utc::now)
}
