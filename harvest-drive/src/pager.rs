//! Paginated listing protocol
//!
//! One page request per iteration, following continuation cursors, with an
//! optional result cap. A fresh call always starts a fresh pagination walk
//! from page one; cursors are never persisted.

use harvest_http::{HttpClient, HttpMethod, HttpRequest, TransportError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::error::{DriveError, Result};
use crate::types::{DriveFile, FilesListResponse};

/// Drive API base URL
pub(crate) const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Records requested per page (Drive caps a listing page at this size)
const PAGE_SIZE: u32 = 100;

/// Fields requested for every listed record. Fixed: the normalizer depends
/// on this exact set being asked for.
const LIST_FIELDS: &str = "nextPageToken,incompleteSearch,files(\
id,name,mimeType,createdTime,modifiedTime,size,version,\
webViewLink,webContentLink,iconLink,thumbnailLink,\
trashed,starred,shared,\
owners(emailAddress,displayName),lastModifyingUser(emailAddress,displayName),\
permissions(id,emailAddress,role,type),parents,properties,appProperties)";

/// Fetches raw file records across paginated listing responses.
pub struct PageFetcher {
    http: Arc<dyn HttpClient>,
}

impl PageFetcher {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// Walk the paginated listing and accumulate raw records.
    ///
    /// After each page, if `cap` is reached or exceeded the accumulated
    /// records are truncated to exactly `cap` and the walk stops, even if
    /// more pages remain. Otherwise the walk continues while a continuation
    /// cursor is present. Shared/team drives are always included; this is
    /// client configuration, not a per-call option.
    ///
    /// `cancel` is honored at page-boundary granularity and surfaces as
    /// [`TransportError::Cancelled`].
    #[instrument(skip(self, access_token, cancel), fields(query = ?query, cap = ?cap))]
    pub async fn fetch(
        &self,
        access_token: &str,
        query: Option<&str>,
        cap: Option<usize>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<DriveFile>> {
        let mut all_files: Vec<DriveFile> = Vec::new();
        let mut page_token: Option<String> = None;
        let mut page_count = 0u32;

        loop {
            if let Some(token) = cancel {
                if token.is_cancelled() {
                    debug!(pages = page_count, "Listing cancelled at page boundary");
                    return Err(TransportError::Cancelled.into());
                }
            }

            page_count += 1;
            debug!(page = page_count, "Fetching listing page");

            let mut url = format!(
                "{}/files?pageSize={}&fields={}&supportsAllDrives=true&includeItemsFromAllDrives=true",
                DRIVE_API_BASE, PAGE_SIZE, LIST_FIELDS
            );
            if let Some(q) = query {
                url.push_str(&format!("&q={}", urlencoding::encode(q)));
            }
            if let Some(ref token) = page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let request = HttpRequest::new(HttpMethod::Get, url)
                .bearer_token(access_token)
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

            let page: FilesListResponse = serde_json::from_slice(&response.body)
                .map_err(|e| DriveError::Parse(format!("files.list response: {}", e)))?;

            debug!(page = page_count, records = page.files.len(), "Page received");
            all_files.extend(page.files);

            if let Some(cap) = cap {
                if all_files.len() >= cap {
                    all_files.truncate(cap);
                    break;
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!(total = all_files.len(), pages = page_count, "Listing walk complete");
        Ok(all_files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use harvest_http::HttpResponse;
    use mockall::mock;

    mock! {
        Http {}

        #[async_trait::async_trait]
        impl HttpClient for Http {
            async fn execute(
                &self,
                request: HttpRequest,
            ) -> std::result::Result<HttpResponse, TransportError>;
        }
    }

    fn page_json(count: usize, start: usize, next_token: Option<&str>) -> String {
        let files: Vec<String> = (0..count)
            .map(|i| format!(r#"{{"id": "file{}"}}"#, start + i))
            .collect();
        match next_token {
            Some(token) => format!(
                r#"{{"files": [{}], "nextPageToken": "{}"}}"#,
                files.join(","),
                token
            ),
            None => format!(r#"{{"files": [{}]}}"#, files.join(",")),
        }
    }

    fn ok_response(body: String) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Default::default(),
            body: Bytes::from(body),
        }
    }

    #[tokio::test]
    async fn test_cap_truncates_mid_walk() {
        let mut http = MockHttp::new();
        let mut call = 0u32;
        // Two pages of 100 each; the cap of 150 must stop the walk after the
        // second page and truncate, even though a cursor remains.
        http.expect_execute().times(2).returning(move |_| {
            call += 1;
            let body = if call == 1 {
                page_json(100, 0, Some("page2"))
            } else {
                page_json(100, 100, Some("page3"))
            };
            Ok(ok_response(body))
        });

        let fetcher = PageFetcher::new(Arc::new(http));
        let files = fetcher.fetch("tok", None, Some(150), None).await.unwrap();

        assert_eq!(files.len(), 150);
        assert_eq!(files[0].id, "file0");
        assert_eq!(files[149].id, "file149");
    }

    #[tokio::test]
    async fn test_uncapped_walk_follows_cursors_to_the_end() {
        let mut http = MockHttp::new();
        let mut call = 0u32;
        http.expect_execute().times(3).returning(move |request| {
            call += 1;
            let body = match call {
                1 => {
                    assert!(!request.url.contains("pageToken"));
                    page_json(100, 0, Some("p2"))
                }
                2 => {
                    assert!(request.url.contains("pageToken=p2"));
                    page_json(100, 100, Some("p3"))
                }
                _ => {
                    assert!(request.url.contains("pageToken=p3"));
                    page_json(37, 200, None)
                }
            };
            Ok(ok_response(body))
        });

        let fetcher = PageFetcher::new(Arc::new(http));
        let files = fetcher.fetch("tok", None, None, None).await.unwrap();
        assert_eq!(files.len(), 237);
    }

    #[tokio::test]
    async fn test_request_shape_is_fixed() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|request| {
            assert!(request.url.contains("pageSize=100"));
            assert!(request.url.contains("supportsAllDrives=true"));
            assert!(request.url.contains("includeItemsFromAllDrives=true"));
            assert!(request.url.contains("permissions(id,emailAddress,role,type)"));
            assert!(request.url.contains("q=trashed%3Dfalse"));
            assert_eq!(
                request.headers.get("Authorization"),
                Some(&"Bearer tok".to_string())
            );
            Ok(ok_response(page_json(1, 0, None)))
        });

        let fetcher = PageFetcher::new(Arc::new(http));
        let files = fetcher
            .fetch("tok", Some("trashed=false"), None, None)
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn test_api_error_propagates() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|_| {
            Ok(HttpResponse {
                status: 403,
                headers: Default::default(),
                body: Bytes::from("insufficient permissions"),
            })
        });

        let fetcher = PageFetcher::new(Arc::new(http));
        let err = fetcher.fetch("tok", None, None, None).await.unwrap_err();
        assert!(matches!(err, DriveError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_page() {
        let http = MockHttp::new();
        let token = CancellationToken::new();
        token.cancel();

        let fetcher = PageFetcher::new(Arc::new(http));
        let err = fetcher
            .fetch("tok", None, None, Some(&token))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DriveError::Transport(TransportError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_empty_listing_is_success() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(ok_response(r#"{"files": []}"#.to_string())));

        let fetcher = PageFetcher::new(Arc::new(http));
        let files = fetcher.fetch("tok", None, None, None).await.unwrap();
        assert!(files.is_empty());
    }
}
