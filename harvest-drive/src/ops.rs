//! Typed operation boundary
//!
//! Wraps client calls into serializable success and failure reports for
//! callers that consume structured output instead of Rust types directly.
//! An empty listing is a success with zero records, never a failure.

use serde::Serialize;
use tracing::{error, info};

use crate::client::DriveClient;
use crate::error::DriveError;
use crate::normalize::FileRecord;
use crate::query::ListQuery;

/// Successful listing output.
#[derive(Debug, Serialize)]
pub struct ListReport {
    pub total_files: usize,
    pub files: Vec<FileRecord>,
}

/// Successful scoped-folder listing output.
#[derive(Debug, Serialize)]
pub struct PilotFolderReport {
    pub folder_id: String,
    pub total_files: usize,
    pub files: Vec<FileRecord>,
}

/// Successful content download output. Carries size, not bytes; callers
/// that need the bytes use [`DriveClient::download_content`] directly.
#[derive(Debug, Serialize)]
pub struct DownloadReport {
    pub file_id: String,
    pub mime_type: String,
    pub size_bytes: usize,
}

/// Failure output with an error class and a remediation hint.
#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub error: String,
    pub message: String,
}

impl FailureReport {
    fn from_error(err: &DriveError) -> Self {
        let (error, message) = match err {
            DriveError::Credential(inner) => (
                "credential_error",
                format!("{}. Verify credentials are configured.", inner),
            ),
            DriveError::Transport(inner) => (
                "transport_error",
                format!("{}. Check network connectivity and retry.", inner),
            ),
            DriveError::Api { status, message } => (
                "api_error",
                format!("Service rejected the request ({}): {}", status, message),
            ),
            DriveError::Parse(detail) => (
                "parse_error",
                format!("Unexpected response shape: {}", detail),
            ),
        };
        Self {
            error: error.to_string(),
            message,
        }
    }
}

/// Outcome of one operation, serializable in both arms.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome<T: Serialize> {
    Success(T),
    Failure(FailureReport),
}

/// Run a listing and report the outcome.
pub async fn run_list(client: &DriveClient, query: &ListQuery) -> ToolOutcome<ListReport> {
    match client.list_files(query).await {
        Ok(files) => {
            info!(total = files.len(), "List operation succeeded");
            ToolOutcome::Success(ListReport {
                total_files: files.len(),
                files,
            })
        }
        Err(e) => {
            error!(error = %e, "List operation failed");
            ToolOutcome::Failure(FailureReport::from_error(&e))
        }
    }
}

/// Run the scoped pilot-folder listing and report the outcome.
pub async fn run_pilot_folder(
    client: &DriveClient,
    folder_id: &str,
) -> ToolOutcome<PilotFolderReport> {
    match client.list_pilot_folder(folder_id).await {
        Ok(files) => {
            info!(folder_id, total = files.len(), "Pilot folder listing succeeded");
            ToolOutcome::Success(PilotFolderReport {
                folder_id: folder_id.to_string(),
                total_files: files.len(),
                files,
            })
        }
        Err(e) => {
            error!(folder_id, error = %e, "Pilot folder listing failed");
            ToolOutcome::Failure(FailureReport::from_error(&e))
        }
    }
}

/// Download one file's content and report its size.
pub async fn run_download(
    client: &DriveClient,
    file_id: &str,
    mime_type: &str,
) -> ToolOutcome<DownloadReport> {
    match client.download_content(file_id, mime_type).await {
        Ok(bytes) => {
            info!(file_id, size = bytes.len(), "Download succeeded");
            ToolOutcome::Success(DownloadReport {
                file_id: file_id.to_string(),
                mime_type: mime_type.to_string(),
                size_bytes: bytes.len(),
            })
        }
        Err(e) => {
            error!(file_id, error = %e, "Download failed");
            ToolOutcome::Failure(FailureReport::from_error(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use harvest_auth::{Credential, CredentialError, CredentialProvider};
    use harvest_http::{HttpClient, HttpRequest, HttpResponse, TransportError};
    use mockall::mock;
    use std::sync::Arc;

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

    mock! {
        Provider {}

        #[async_trait::async_trait]
        impl CredentialProvider for Provider {
            async fn acquire(&self) -> std::result::Result<Credential, CredentialError>;
        }
    }

    fn client_with(http: MockHttp, provider: MockProvider) -> DriveClient {
        DriveClient::new(Arc::new(http), Arc::new(provider))
    }

    fn static_provider() -> MockProvider {
        let mut provider = MockProvider::new();
        provider
            .expect_acquire()
            .returning(|| Ok(Credential::service("tok".to_string())));
        provider
    }

    #[tokio::test]
    async fn test_empty_listing_is_success() {
        let mut http = MockHttp::new();
        http.expect_execute().returning(|_| {
            Ok(HttpResponse {
                status: 200,
                headers: Default::default(),
                body: Bytes::from_static(br#"{"files": []}"#),
            })
        });

        let outcome = run_list(&client_with(http, static_provider()), &ListQuery::new()).await;
        match outcome {
            ToolOutcome::Success(report) => assert_eq!(report.total_files, 0),
            ToolOutcome::Failure(f) => panic!("expected success, got {:?}", f),
        }
    }

    #[tokio::test]
    async fn test_credential_failure_reports_remediation() {
        let http = MockHttp::new();
        let mut provider = MockProvider::new();
        provider.expect_acquire().returning(|| {
            Err(CredentialError::MissingKeyFile {
                path: "service-account.json".into(),
            })
        });

        let outcome = run_list(&client_with(http, provider), &ListQuery::new()).await;
        match outcome {
            ToolOutcome::Failure(report) => {
                assert_eq!(report.error, "credential_error");
                assert!(report.message.contains("Verify credentials"));
            }
            ToolOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_reports_connectivity_hint() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .returning(|_| Err(TransportError::Network("connection refused".to_string())));

        let outcome = run_list(&client_with(http, static_provider()), &ListQuery::new()).await;
        match outcome {
            ToolOutcome::Failure(report) => {
                assert_eq!(report.error, "transport_error");
                assert!(report.message.contains("connectivity"));
            }
            ToolOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_download_report_carries_size() {
        let mut http = MockHttp::new();
        http.expect_execute().returning(|_| {
            Ok(HttpResponse {
                status: 200,
                headers: Default::default(),
                body: Bytes::from_static(b"ten bytes!"),
            })
        });

        let outcome = run_download(
            &client_with(http, static_provider()),
            "f1",
            "application/pdf",
        )
        .await;
        match outcome {
            ToolOutcome::Success(report) => {
                assert_eq!(report.size_bytes, 10);
                assert_eq!(report.file_id, "f1");
            }
            ToolOutcome::Failure(f) => panic!("expected success, got {:?}", f),
        }
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome: ToolOutcome<ListReport> = ToolOutcome::Failure(FailureReport {
            error: "api_error".to_string(),
            message: "boom".to_string(),
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["error"], "api_error");
    }
}
