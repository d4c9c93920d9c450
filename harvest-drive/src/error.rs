//! Error types for the drive client

use harvest_auth::CredentialError;
use harvest_http::TransportError;
use thiserror::Error;

/// Drive client errors
#[derive(Error, Debug)]
pub enum DriveError {
    /// Credential acquisition failed
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Transport-level failure on a remote call
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// API request returned an error status
    #[error("Drive API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to parse an API response
    #[error("Failed to parse API response: {0}")]
    Parse(String),
}

/// Result type for drive operations
pub type Result<T> = std::result::Result<T, DriveError>;
