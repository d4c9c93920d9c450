//! Google Drive API response types
//!
//! Data structures for deserializing Drive API v3 responses. Raw records
//! arrive with inconsistently-present fields, so every optional attribute is
//! an explicit `Option` or defaulted collection; an absent field and a null
//! value never collapse into a panic or a fabricated default here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user reference on a file resource (owner, last modifier).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveUser {
    #[serde(default)]
    pub email_address: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,
}

/// A permission entry on a file resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivePermission {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub email_address: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Drive API file resource, as returned by `files.list`.
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID (the only field the API guarantees)
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub mime_type: Option<String>,

    /// Creation time (RFC 3339)
    #[serde(default)]
    pub created_time: Option<String>,

    /// Modification time (RFC 3339)
    #[serde(default)]
    pub modified_time: Option<String>,

    /// File size in bytes, as a decimal string (omitted for folders and
    /// provider-native documents)
    #[serde(default)]
    pub size: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub web_view_link: Option<String>,

    #[serde(default)]
    pub web_content_link: Option<String>,

    #[serde(default)]
    pub icon_link: Option<String>,

    #[serde(default)]
    pub thumbnail_link: Option<String>,

    #[serde(default)]
    pub trashed: bool,

    #[serde(default)]
    pub starred: bool,

    #[serde(default)]
    pub shared: bool,

    #[serde(default)]
    pub owners: Vec<DriveUser>,

    #[serde(default)]
    pub last_modifying_user: Option<DriveUser>,

    #[serde(default)]
    pub permissions: Vec<DrivePermission>,

    /// Parent folder IDs
    #[serde(default)]
    pub parents: Vec<String>,

    /// Custom properties visible to all apps
    #[serde(default)]
    pub properties: HashMap<String, String>,

    /// Custom properties private to the requesting app
    #[serde(default)]
    pub app_properties: HashMap<String, String>,
}

/// Drive API `files.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    #[serde(default)]
    pub files: Vec<DriveFile>,

    /// Continuation cursor; absent on the last page
    #[serde(default)]
    pub next_page_token: Option<String>,

    #[serde(default)]
    pub incomplete_search: bool,
}

/// Minimal folder reference from the parent-lookup call
/// (`files.get` with `fields=id,name`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRef {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_drive_file() {
        let json = r#"{
            "id": "abc123",
            "name": "QMS Manual.pdf",
            "mimeType": "application/pdf",
            "createdTime": "2023-01-01T00:00:00.000Z",
            "modifiedTime": "2023-01-02T00:00:00.000Z",
            "size": "4096",
            "version": "12",
            "webViewLink": "https://drive.google.com/file/d/abc123/view",
            "webContentLink": "https://drive.google.com/uc?id=abc123",
            "iconLink": "https://drive.google.com/icon.png",
            "thumbnailLink": "https://drive.google.com/thumb.png",
            "trashed": false,
            "starred": true,
            "shared": true,
            "owners": [{"emailAddress": "owner@example.com", "displayName": "Owner"}],
            "lastModifyingUser": {"emailAddress": "editor@example.com"},
            "permissions": [
                {"id": "p1", "emailAddress": "reader@example.com", "role": "reader", "type": "user"}
            ],
            "parents": ["folder1"],
            "properties": {"caseId": "QMS-17"},
            "appProperties": {}
        }"#;

        let file: DriveFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.id, "abc123");
        assert_eq!(file.name.as_deref(), Some("QMS Manual.pdf"));
        assert_eq!(file.size.as_deref(), Some("4096"));
        assert_eq!(file.owners.len(), 1);
        assert_eq!(file.permissions[0].kind.as_deref(), Some("user"));
        assert_eq!(file.properties.get("caseId"), Some(&"QMS-17".to_string()));
        assert!(file.starred);
    }

    #[test]
    fn test_deserialize_sparse_drive_file() {
        // Only the ID is guaranteed; everything else defaults
        let file: DriveFile = serde_json::from_str(r#"{"id": "bare"}"#).unwrap();
        assert_eq!(file.id, "bare");
        assert!(file.name.is_none());
        assert!(file.size.is_none());
        assert!(file.owners.is_empty());
        assert!(file.permissions.is_empty());
        assert!(file.parents.is_empty());
        assert!(!file.trashed);
        assert!(!file.shared);
    }

    #[test]
    fn test_deserialize_files_list_response() {
        let json = r#"{
            "files": [{"id": "file1", "name": "a.pdf", "mimeType": "application/pdf"}],
            "nextPageToken": "token123"
        }"#;

        let response: FilesListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.files.len(), 1);
        assert_eq!(response.next_page_token.as_deref(), Some("token123"));
        assert!(!response.incomplete_search);
    }

    #[test]
    fn test_deserialize_last_page() {
        let response: FilesListResponse = serde_json::from_str(r#"{"files": []}"#).unwrap();
        assert!(response.files.is_empty());
        assert!(response.next_page_token.is_none());
    }

    #[test]
    fn test_deserialize_folder_ref() {
        let folder: FolderRef =
            serde_json::from_str(r#"{"id": "f1", "name": "Cases 2023"}"#).unwrap();
        assert_eq!(folder.id, "f1");
        assert_eq!(folder.name, "Cases 2023");
    }
}
