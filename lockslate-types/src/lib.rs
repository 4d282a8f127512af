//! Shared types for Lockslate services.
//!
//! The origin service, the render pipeline and the viewer controller all
//! speak in terms of these identifiers and wire shapes. Anything that
//! crosses a service boundary lives here; service-private rows and
//! session records stay in their owning crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Primary key of a material row in the origin's catalog.
pub type MaterialId = i64;

/// Identifier of a class, owned by the external roster system.
pub type ClassId = i64;

/// Identifier of a user, owned by the external auth system.
pub type UserId = i64;

/// Role a user holds within a class, as recorded in `class_members`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    /// Parses the role string the auth layer forwards in headers.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "teacher" => Some(Self::Teacher),
            "student" => Some(Self::Student),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }
}

/// The authenticated caller, as established by the fronting auth layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Requester {
    pub user_id: UserId,
    pub role: Role,
}

/// Broad content category of an uploaded material.
///
/// Drives which render path a view session takes: documents become page
/// images, videos become an HLS playlist. Images and everything else are
/// stored encrypted but have no render path in this core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Document,
    Video,
    Image,
    Other,
}

impl ContentKind {
    /// Classifies a material by the uploaded file's extension.
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, e)| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" | "doc" | "docx" | "ppt" | "pptx" => Self::Document,
            "mp4" | "mov" | "mkv" => Self::Video,
            "png" | "jpg" | "jpeg" | "gif" | "webp" => Self::Image,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Video => "video",
            Self::Image => "image",
            Self::Other => "other",
        }
    }

    /// Parses the value stored in the catalog's `content_kind` column.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "document" => Some(Self::Document),
            "video" => Some(Self::Video),
            "image" => Some(Self::Image),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Access descriptor returned by the pipeline's decrypt endpoint and
/// relayed verbatim to the browser.
///
/// The session token is an explicit field; the `pages`/`playlist` paths
/// embed the same token for clients that address sub-resources by path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SessionDescriptor {
    Document { token: String, pages: String },
    Video { token: String, playlist: String },
}

impl SessionDescriptor {
    pub fn token(&self) -> &str {
        match self {
            Self::Document { token, .. } | Self::Video { token, .. } => token,
        }
    }
}

/// Catalog metadata for one material, as listed to class members.
///
/// Never carries `stored_as` or the encrypted secret; those stay inside
/// the services.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialSummary {
    pub id: MaterialId,
    pub class_id: ClassId,
    pub title: String,
    pub description: Option<String>,
    pub content_kind: ContentKind,
    pub uploaded_by: UserId,
    pub created_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
}
