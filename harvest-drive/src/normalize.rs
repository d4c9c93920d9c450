//! Metadata normalization
//!
//! Flattens raw listing records into the uniform [`FileRecord`] shape that
//! downstream indexing consumes. Normalization is per-record and infallible:
//! a missing or malformed field degrades that field, never the record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{DriveFile, FolderRef};

/// A single access grant, flattened from the raw permission object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PermissionEntry {
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Uniform flattened record for one remote file.
///
/// Every field is always present in serialized output, `null` or empty when
/// unknown, so consumers see a stable shape regardless of which optional
/// fields the service returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    // Identity
    pub file_id: String,
    pub filename: Option<String>,
    pub mime_type: Option<String>,

    // Links
    pub web_view_link: Option<String>,
    pub download_link: Option<String>,
    pub icon_link: Option<String>,
    pub thumbnail_link: Option<String>,

    // Temporal
    pub created_time: Option<String>,
    pub modified_time: Option<String>,
    pub indexed_at: DateTime<Utc>,

    // Provenance
    pub owner_email: Option<String>,
    pub modified_by_email: Option<String>,
    pub permissions: Vec<PermissionEntry>,
    pub shared: bool,

    // Organization
    pub parent_folder_id: Option<String>,
    pub parent_folder_name: Option<String>,

    // Technical
    pub file_size_bytes: Option<u64>,
    pub version: Option<String>,
    pub trashed: bool,
    pub starred: bool,

    // Extensible
    pub properties: HashMap<String, String>,
    pub app_properties: HashMap<String, String>,

    // Enrichment slots populated by later pipeline stages, never here.
    pub text_content: Option<String>,
    pub chunks: Vec<String>,
    pub document_type: Option<String>,
    pub case_id: Option<String>,
    pub iso_clauses: Vec<String>,
    pub approval_status: Option<String>,
}

/// Resolves a folder id to its display name.
#[async_trait]
pub trait ParentLookup: Send + Sync {
    async fn lookup_folder(&self, folder_id: &str) -> Result<FolderRef>;
}

/// Memoizes parent lookups for the duration of one listing call.
///
/// Failed lookups are cached too, so a folder that cannot be resolved costs
/// one request instead of one per child.
pub struct ParentCache<L: ParentLookup> {
    inner: L,
    cache: Mutex<HashMap<String, Option<FolderRef>>>,
}

impl<L: ParentLookup> ParentCache<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a folder, consulting the memo first. Returns `None` when the
    /// lookup failed (now or on a previous attempt).
    pub async fn resolve(&self, folder_id: &str) -> Option<FolderRef> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(folder_id) {
            return cached.clone();
        }
        let resolved = match self.inner.lookup_folder(folder_id).await {
            Ok(folder) => Some(folder),
            Err(e) => {
                warn!(folder_id, error = %e, "Parent folder lookup failed");
                None
            }
        };
        cache.insert(folder_id.to_string(), resolved.clone());
        resolved
    }
}

/// Turns raw listing records into [`FileRecord`]s.
pub struct MetadataNormalizer;

impl MetadataNormalizer {
    /// Normalize one raw record. First listed parent wins; an unresolvable
    /// parent keeps its id with the name `"Unknown"`.
    pub async fn normalize<L: ParentLookup>(
        raw: DriveFile,
        parents: &ParentCache<L>,
    ) -> FileRecord {
        let (parent_folder_id, parent_folder_name) = match raw.parents.first() {
            Some(parent_id) => match parents.resolve(parent_id).await {
                Some(folder) => (Some(folder.id), Some(folder.name)),
                None => (Some(parent_id.clone()), Some("Unknown".to_string())),
            },
            None => (None, None),
        };

        let file_size_bytes = raw
            .size
            .as_deref()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&n| n != 0);

        let owner_email = raw
            .owners
            .first()
            .and_then(|owner| owner.email_address.clone());
        let modified_by_email = raw
            .last_modifying_user
            .as_ref()
            .and_then(|user| user.email_address.clone());

        let permissions = raw
            .permissions
            .into_iter()
            .map(|p| PermissionEntry {
                email: p.email_address,
                role: p.role,
                kind: p.kind,
            })
            .collect();

        debug!(file_id = %raw.id, "Normalized record");

        FileRecord {
            file_id: raw.id,
            filename: raw.name,
            mime_type: raw.mime_type,
            web_view_link: raw.web_view_link,
            download_link: raw.web_content_link,
            icon_link: raw.icon_link,
            thumbnail_link: raw.thumbnail_link,
            created_time: raw.created_time,
            modified_time: raw.modified_time,
            indexed_at: Utc::now(),
            owner_email,
            modified_by_email,
            permissions,
            shared: raw.shared,
            parent_folder_id,
            parent_folder_name,
            file_size_bytes,
            version: raw.version,
            trashed: raw.trashed,
            starred: raw.starred,
            properties: raw.properties,
            app_properties: raw.app_properties,
            text_content: None,
            chunks: Vec::new(),
            document_type: None,
            case_id: None,
            iso_clauses: Vec::new(),
            approval_status: None,
        }
    }
}
