//! Credential provider trait

use crate::error::Result;
use crate::types::Credential;
use async_trait::async_trait;

/// Source of access credentials for the drive client.
///
/// Implementations own their storage exclusively; callers never touch key
/// files or the token cache directly.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Obtain a currently-valid credential.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CredentialError`] when key material is missing or
    /// malformed, or when (delegated mode) interactive authorization cannot
    /// complete.
    async fn acquire(&self) -> Result<Credential>;
}
