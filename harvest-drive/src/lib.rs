//! Google Drive metadata harvesting
//!
//! Lists file metadata from Drive folders, normalizes it into a uniform
//! record shape for downstream indexing, and retrieves file content with
//! automatic export of provider-native formats.
//!
//! [`DriveClient`] is the entry point; [`ops`] wraps its calls into
//! serializable success and failure reports.

pub mod client;
pub mod content;
pub mod error;
pub mod normalize;
pub mod ops;
pub mod pager;
pub mod query;
pub mod types;

pub use client::{DriveClient, PILOT_MIME_TYPES};
pub use content::{select_retrieval, ContentRetriever, Retrieval};
pub use error::{DriveError, Result};
pub use normalize::{FileRecord, MetadataNormalizer, ParentCache, ParentLookup, PermissionEntry};
pub use ops::{
    run_download, run_list, run_pilot_folder, DownloadReport, FailureReport, ListReport,
    PilotFolderReport, ToolOutcome,
};
pub use pager::PageFetcher;
pub use query::ListQuery;
pub use types::{DriveFile, DrivePermission, DriveUser, FilesListResponse, FolderRef};
