//! # Harvest Auth
//!
//! Credential lifecycle management for the drive-harvest client.
//!
//! ## Overview
//!
//! Two acquisition paths produce a [`Credential`]:
//!
//! - [`ServiceIdentityProvider`] loads a pre-provisioned, never-expiring
//!   service-identity key file from disk. No network I/O; the only failure
//!   mode is a missing or malformed key file.
//! - [`DelegatedProvider`] manages an interactive OAuth 2.0 (PKCE) credential
//!   with an on-disk token cache: a cached valid credential is returned
//!   immediately, an expired one is refreshed in place when a refresh token
//!   exists, and otherwise a full interactive grant runs through a
//!   host-supplied [`InteractiveAuthorizer`].
//!
//! Both providers implement the [`CredentialProvider`] trait consumed by the
//! drive client. The token cache file is owned exclusively by this crate and
//! is written atomically (temp-file-then-rename), so an interrupted refresh
//! never leaves a corrupt cache behind.
//!
//! Credential material is never logged; `Credential`'s `Debug` implementation
//! redacts token fields.

pub mod cache;
pub mod delegated;
pub mod error;
pub mod oauth;
pub mod provider;
pub mod service;
pub mod types;

pub use cache::TokenCache;
pub use delegated::{
    AuthorizationGrant, DelegatedConfig, DelegatedProvider, InteractiveAuthorizer,
};
pub use error::{CredentialError, Result};
pub use oauth::{OAuthConfig, OAuthFlowManager, PkceVerifier};
pub use provider::CredentialProvider;
pub use service::ServiceIdentityProvider;
pub use types::{AppSecret, Credential, ServiceIdentityKey};

use std::path::PathBuf;

/// Default directory holding credential files.
///
/// Resolves to the platform config directory (falling back to the current
/// directory), e.g. `~/.config/drive-harvest/credentials` on Linux.
pub fn default_credentials_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("drive-harvest")
        .join("credentials")
}
