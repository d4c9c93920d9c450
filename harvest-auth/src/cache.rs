//! On-disk token cache
//!
//! Persists the most recently obtained delegated credential. The cache file
//! is owned exclusively by the credential provider and always reflects the
//! latest credential state: every write replaces the whole file atomically
//! via a sibling temp file and rename, so an interrupted refresh cannot leave
//! a half-written cache behind.

use crate::error::{CredentialError, Result};
use crate::types::Credential;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Serializable wrapper for the cached credential.
///
/// Expiry is stored as a Unix timestamp so the file format stays stable
/// across chrono versions.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
}

impl StoredCredential {
    fn from_credential(credential: &Credential) -> Self {
        Self {
            access_token: credential.access_token.clone(),
            refresh_token: credential.refresh_token.clone(),
            expires_at: credential.expires_at.map(|t| t.timestamp()),
        }
    }

    fn into_credential(self) -> Option<Credential> {
        let expires_at = match self.expires_at {
            None => None,
            Some(ts) => Some(parse_timestamp(ts)?),
        };
        Some(Credential {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        })
    }
}

fn parse_timestamp(ts: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0).single()
}

/// Token cache file handle.
#[derive(Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached credential, if any.
    ///
    /// A missing file means "no cache". An unreadable or unparseable file is
    /// treated the same way (the next successful acquisition overwrites it),
    /// so a corrupted cache degrades to re-authorization instead of wedging
    /// the client.
    pub async fn load(&self) -> Result<Option<Credential>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No token cache file");
                return Ok(None);
            }
            Err(e) => {
                return Err(CredentialError::CacheIo {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        match serde_json::from_slice::<StoredCredential>(&bytes) {
            Ok(stored) => match stored.into_credential() {
                Some(credential) => {
                    debug!(path = %self.path.display(), "Loaded cached credential");
                    Ok(Some(credential))
                }
                None => {
                    warn!(path = %self.path.display(), "Cached credential has invalid expiry, ignoring");
                    Ok(None)
                }
            },
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Token cache is unparseable, ignoring"
                );
                Ok(None)
            }
        }
    }

    /// Persist a credential, replacing any prior cache content.
    ///
    /// Writes to a sibling temp file first and renames it into place; the
    /// rename stays on one filesystem, so readers observe either the old or
    /// the new cache, never a partial write.
    pub async fn store(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CredentialError::CacheIo {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let stored = StoredCredential::from_credential(credential);
        let json = serde_json::to_vec_pretty(&stored)
            .map_err(|e| CredentialError::Other(format!("Failed to serialize credential: {}", e)))?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, &json)
            .await
            .map_err(|e| CredentialError::CacheIo {
                path: tmp_path.clone(),
                source: e,
            })?;

        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| CredentialError::CacheIo {
                path: self.path.clone(),
                source: e,
            })?;

        debug!(path = %self.path.display(), "Persisted credential to cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn cache_in(dir: &tempfile::TempDir) -> TokenCache {
        TokenCache::new(dir.path().join("token-cache.json"))
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        assert!(cache.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);

        let credential = Credential {
            access_token: "tok".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        };
        cache.store(&credential).await.unwrap();

        let loaded = cache.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "tok");
        assert_eq!(loaded.refresh_token, Some("refresh".to_string()));
        assert!(loaded.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_store_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);

        cache
            .store(&Credential::service("tok".to_string()))
            .await
            .unwrap();

        assert!(cache.path().exists());
        assert!(!cache.path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_store_overwrites_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);

        cache
            .store(&Credential::service("first".to_string()))
            .await
            .unwrap();
        cache
            .store(&Credential::service("second".to_string()))
            .await
            .unwrap();

        let loaded = cache.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "second");
    }

    #[tokio::test]
    async fn test_corrupt_cache_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);

        tokio::fs::write(cache.path(), b"{not json").await.unwrap();
        assert!(cache.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::new(dir.path().join("nested").join("token-cache.json"));

        cache
            .store(&Credential::service("tok".to_string()))
            .await
            .unwrap();
        assert!(cache.path().exists());
    }
}
