//! Service-identity credential provider
//!
//! Loads a pre-provisioned key file from a fixed location. This path issues
//! no network calls: the credential never expires and has no refresh step, so
//! the only failure mode is a missing or malformed key file, reported before
//! anything else happens.

use crate::error::{CredentialError, Result};
use crate::provider::CredentialProvider;
use crate::types::{Credential, ServiceIdentityKey};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Default key file name inside the credentials directory.
pub const SERVICE_ACCOUNT_FILE: &str = "service-account.json";

/// Credential provider backed by a service-identity key file.
pub struct ServiceIdentityProvider {
    key_path: PathBuf,
}

impl ServiceIdentityProvider {
    /// Use an explicit key file path.
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
        }
    }

    /// Use the conventional key file name inside `credentials_dir`.
    pub fn in_dir(credentials_dir: impl AsRef<Path>) -> Self {
        Self::new(credentials_dir.as_ref().join(SERVICE_ACCOUNT_FILE))
    }

    /// Path of the key file this provider reads.
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    async fn load_key(&self) -> Result<ServiceIdentityKey> {
        if let Some(parent) = self.key_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CredentialError::CacheIo {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let bytes = match fs::read(&self.key_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CredentialError::MissingKeyFile {
                    path: self.key_path.clone(),
                })
            }
            Err(e) => {
                return Err(CredentialError::CacheIo {
                    path: self.key_path.clone(),
                    source: e,
                })
            }
        };

        let key: ServiceIdentityKey =
            serde_json::from_slice(&bytes).map_err(|e| CredentialError::MalformedKeyFile {
                path: self.key_path.clone(),
                reason: e.to_string(),
            })?;

        if key.key_type != "service_account" {
            return Err(CredentialError::MalformedKeyFile {
                path: self.key_path.clone(),
                reason: format!("unexpected key type '{}'", key.key_type),
            });
        }
        if key.token.is_empty() {
            return Err(CredentialError::MalformedKeyFile {
                path: self.key_path.clone(),
                reason: "empty token".to_string(),
            });
        }

        Ok(key)
    }
}

#[async_trait]
impl CredentialProvider for ServiceIdentityProvider {
    #[instrument(skip(self), fields(path = %self.key_path.display()))]
    async fn acquire(&self) -> Result<Credential> {
        let key = self.load_key().await?;
        info!(client_email = %key.client_email, "Service identity loaded");
        Ok(Credential::service(key.token))
    }
}
