//! High-level metadata harvesting client
//!
//! Ties credential acquisition, query construction, pagination, parent
//! resolution, normalization, and content retrieval into the operations a
//! caller actually invokes. Credentials are acquired fresh per operation so
//! an expired cache entry never outlives a call.

use harvest_auth::CredentialProvider;
use harvest_http::{HttpClient, HttpMethod, HttpRequest};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::content::ContentRetriever;
use crate::error::{DriveError, Result};
use crate::normalize::{FileRecord, MetadataNormalizer, ParentCache, ParentLookup};
use crate::pager::{PageFetcher, DRIVE_API_BASE};
use crate::query::ListQuery;

/// MIME types harvested by the scoped pilot-folder operation.
pub const PILOT_MIME_TYPES: [&str; 4] = [
    "application/pdf",
    "application/vnd.google-apps.document",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// Resolves folder names through the files metadata endpoint.
struct FolderResolver {
    http: Arc<dyn HttpClient>,
    access_token: String,
}

#[async_trait::async_trait]
impl ParentLookup for FolderResolver {
    async fn lookup_folder(&self, folder_id: &str) -> Result<crate::types::FolderRef> {
        let url = format!(
            "{}/files/{}?fields=id,name&supportsAllDrives=true",
            DRIVE_API_BASE,
            urlencoding::encode(folder_id)
        );
        let request = HttpRequest::new(HttpMethod::Get, url)
            .bearer_token(&self.access_token)
            .header("Accept", "application/json");
        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(DriveError::Api {
                status: response.status,
                message: response
                    .text()
                    .unwrap_or_else(|_| "Unable to read error response".to_string()),
            });
        }
        serde_json::from_slice(&response.body)
            .map_err(|e| DriveError::Parse(format!("files.get response: {}", e)))
    }
}

/// Client for listing and retrieving Drive file metadata and content.
pub struct DriveClient {
    http: Arc<dyn HttpClient>,
    credentials: Arc<dyn CredentialProvider>,
    pager: PageFetcher,
    retriever: ContentRetriever,
}

impl DriveClient {
    pub fn new(http: Arc<dyn HttpClient>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            pager: PageFetcher::new(Arc::clone(&http)),
            retriever: ContentRetriever::new(Arc::clone(&http)),
            http,
            credentials,
        }
    }

    /// List files matching `query`, fully normalized.
    ///
    /// Listing is read-only against remote state and repeatable; two
    /// identical calls against unchanged remote state return the same
    /// records, `indexed_at` aside.
    pub async fn list_files(&self, query: &ListQuery) -> Result<Vec<FileRecord>> {
        self.list_files_with_cancel(query, None).await
    }

    /// Same as [`list_files`](Self::list_files), honoring `cancel` at page
    /// boundaries.
    #[instrument(skip(self, query, cancel))]
    pub async fn list_files_with_cancel(
        &self,
        query: &ListQuery,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<FileRecord>> {
        let credential = self.credentials.acquire().await?;
        let drive_query = query.to_drive_query();
        debug!(query = ?drive_query, "Listing files");

        let raw_files = self
            .pager
            .fetch(
                &credential.access_token,
                drive_query.as_deref(),
                query.max_results,
                cancel,
            )
            .await?;

        // Parents memoized for the duration of this call only.
        let parents = ParentCache::new(FolderResolver {
            http: Arc::clone(&self.http),
            access_token: credential.access_token,
        });

        let mut records = Vec::with_capacity(raw_files.len());
        for raw in raw_files {
            records.push(MetadataNormalizer::normalize(raw, &parents).await);
        }

        info!(count = records.len(), "Listing complete");
        Ok(records)
    }

    /// List the pilot folder: a fixed allow-list of document formats inside
    /// one folder, trash excluded.
    pub async fn list_pilot_folder(&self, folder_id: &str) -> Result<Vec<FileRecord>> {
        let query = ListQuery::new()
            .in_folder(folder_id)
            .with_mime_types(PILOT_MIME_TYPES);
        self.list_files(&query).await
    }

    /// Download the content bytes of one file.
    pub async fn download_content(
        &self,
        file_id: &str,
        mime_type: &str,
    ) -> Result<bytes::Bytes> {
        let credential = self.credentials.acquire().await?;
        self.retriever
            .retrieve(&credential.access_token, file_id, mime_type)
            .await
    }
}
