//! Content retrieval
//!
//! Chooses between direct byte download and format export based on the
//! file's MIME type, then performs a single retrieval round trip.

use bytes::Bytes;
use harvest_http::{HttpClient, HttpMethod, HttpRequest};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{DriveError, Result};
use crate::pager::DRIVE_API_BASE;

/// MIME prefix for provider-native document formats, which have no binary
/// payload and must be exported.
const NATIVE_PREFIX: &str = "application/vnd.google-apps";

const PDF_MIME: &str = "application/pdf";

/// How a file's bytes are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrieval {
    /// Stored binary content, downloaded as is.
    Direct,
    /// Provider-native format, exported to the given target MIME type.
    Export(&'static str),
}

/// Decide the retrieval mode for a MIME type.
///
/// Native documents, spreadsheets, and presentations export to PDF; any
/// other native format also falls back to PDF export. Everything else
/// downloads directly.
pub fn select_retrieval(mime_type: &str) -> Retrieval {
    match mime_type {
        "application/vnd.google-apps.document"
        | "application/vnd.google-apps.spreadsheet"
        | "application/vnd.google-apps.presentation" => Retrieval::Export(PDF_MIME),
        other if other.starts_with(NATIVE_PREFIX) => Retrieval::Export(PDF_MIME),
        _ => Retrieval::Direct,
    }
}

/// Retrieves file content bytes.
pub struct ContentRetriever {
    http: Arc<dyn HttpClient>,
}

impl ContentRetriever {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// Fetch the bytes of one file in a single round trip.
    #[instrument(skip(self, access_token))]
    pub async fn retrieve(
        &self,
        access_token: &str,
        file_id: &str,
        mime_type: &str,
    ) -> Result<Bytes> {
        let url = match select_retrieval(mime_type) {
            Retrieval::Direct => {
                debug!(file_id, "Direct download");
                format!(
                    "{}/files/{}?alt=media&supportsAllDrives=true",
                    DRIVE_API_BASE,
                    urlencoding::encode(file_id)
                )
            }
            Retrieval::Export(target) => {
                debug!(file_id, target, "Export download");
                format!(
                    "{}/files/{}/export?mimeType={}",
                    DRIVE_API_BASE,
                    urlencoding::encode(file_id),
                    urlencoding::encode(target)
                )
            }
        };

        let request = HttpRequest::new(HttpMethod::Get, url).bearer_token(access_token);
        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(DriveError::Api {
                status: response.status,
                message: response
                    .text()
                    .unwrap_or_else(|_| "Unable to read error response".to_string()),
            });
        }
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_http::{HttpResponse, TransportError};
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

    #[test]
    fn test_native_editors_export_to_pdf() {
        assert_eq!(
            select_retrieval("application/vnd.google-apps.document"),
            Retrieval::Export("application/pdf")
        );
        assert_eq!(
            select_retrieval("application/vnd.google-apps.spreadsheet"),
            Retrieval::Export("application/pdf")
        );
        assert_eq!(
            select_retrieval("application/vnd.google-apps.presentation"),
            Retrieval::Export("application/pdf")
        );
    }

    #[test]
    fn test_unmapped_native_format_falls_back_to_pdf_export() {
        assert_eq!(
            select_retrieval("application/vnd.google-apps.drawing"),
            Retrieval::Export("application/pdf")
        );
    }

    #[test]
    fn test_binary_formats_download_directly() {
        assert_eq!(select_retrieval("application/pdf"), Retrieval::Direct);
        assert_eq!(select_retrieval("image/png"), Retrieval::Direct);
        assert_eq!(
            select_retrieval(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            Retrieval::Direct
        );
    }

    #[tokio::test]
    async fn test_spreadsheet_uses_export_endpoint() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|request| {
            assert!(request.url.contains("/files/sheet1/export"));
            assert!(request.url.contains("mimeType=application%2Fpdf"));
            Ok(HttpResponse {
                status: 200,
                headers: Default::default(),
                body: Bytes::from_static(b"%PDF-"),
            })
        });

        let retriever = ContentRetriever::new(Arc::new(http));
        let bytes = retriever
            .retrieve("tok", "sheet1", "application/vnd.google-apps.spreadsheet")
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"%PDF-");
    }

    #[tokio::test]
    async fn test_pdf_uses_media_endpoint() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|request| {
            assert!(request.url.contains("/files/doc1?alt=media"));
            assert!(request.url.contains("supportsAllDrives=true"));
            Ok(HttpResponse {
                status: 200,
                headers: Default::default(),
                body: Bytes::from_static(b"raw bytes"),
            })
        });

        let retriever = ContentRetriever::new(Arc::new(http));
        let bytes = retriever
            .retrieve("tok", "doc1", "application/pdf")
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"raw bytes");
    }

    #[tokio::test]
    async fn test_error_status_surfaces_once() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|_| {
            Ok(HttpResponse {
                status: 404,
                headers: Default::default(),
                body: Bytes::from_static(b"no such file"),
            })
        });

        let retriever = ContentRetriever::new(Arc::new(http));
        let err = retriever
            .retrieve("tok", "gone", "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, DriveError::Api { status: 404, .. }));
    }
}
