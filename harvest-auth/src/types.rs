//! Credential and key-file types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default buffer before expiry at which a credential is treated as expired.
///
/// Refreshing slightly early avoids issuing API calls with a token that dies
/// mid-listing.
pub const EXPIRY_BUFFER_SECONDS: i64 = 300;

/// An acquired access credential.
///
/// Opaque token material plus expiry and an optional refresh token.
/// `expires_at == None` means the credential never expires (service
/// identity).
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token presented on API requests
    pub access_token: String,
    /// Refresh token, if the grant issued one
    pub refresh_token: Option<String>,
    /// Expiry instant (UTC); `None` for non-expiring credentials
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Create a never-expiring service-identity credential.
    pub fn service(access_token: String) -> Self {
        Self {
            access_token,
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Create a delegated credential expiring `expires_in` seconds from now.
    pub fn delegated(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: Some(Utc::now() + chrono::Duration::seconds(expires_in)),
        }
    }

    /// Whether the credential is expired (with the default buffer).
    pub fn is_expired(&self) -> bool {
        self.is_expired_with_buffer(EXPIRY_BUFFER_SECONDS)
    }

    /// Whether the credential is expired or will expire within
    /// `buffer_seconds`. Never-expiring credentials always return `false`.
    pub fn is_expired_with_buffer(&self, buffer_seconds: i64) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => {
                Utc::now() >= expires_at - chrono::Duration::seconds(buffer_seconds)
            }
        }
    }

    /// Whether a refresh can be attempted once the credential expires.
    pub fn is_refreshable(&self) -> bool {
        self.refresh_token.is_some()
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Parsed service-identity key file.
///
/// The key file is provisioned out of band and carries a long-lived bearer
/// token for the harvesting identity. It never expires and has no refresh
/// step; the filesystem is its sole store.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceIdentityKey {
    /// Must be `"service_account"`
    #[serde(rename = "type")]
    pub key_type: String,

    /// Identity of the service account
    pub client_email: String,

    /// Long-lived bearer token
    pub token: String,

    /// Scopes the token was provisioned for
    #[serde(default)]
    pub scopes: Vec<String>,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_redirect_uri() -> String {
    "http://localhost:8080/callback".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        "https://www.googleapis.com/auth/drive.metadata.readonly".to_string(),
        "https://www.googleapis.com/auth/drive.readonly".to_string(),
    ]
}

/// Parsed application-secret file for the delegated path.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSecret {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret (optional for public clients)
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Authorization endpoint
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,

    /// Token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    /// Redirect URI for the OAuth callback
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Scopes to request
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}
