//! Credential error types

use harvest_http::TransportError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while acquiring or persisting a credential.
///
/// Credential errors are fatal to the operation in progress and are never
/// retried. Missing-file variants name the expected path so the operator can
/// fix the configuration.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Expected key or secret file does not exist
    #[error("Credential file not found at {path}; place the expected key file there before retrying")]
    MissingKeyFile { path: PathBuf },

    /// Key or secret file exists but could not be parsed or validated
    #[error("Malformed credential file {path}: {reason}")]
    MalformedKeyFile { path: PathBuf, reason: String },

    /// Interactive authorization could not complete
    #[error("Interactive authorization failed: {0}")]
    AuthorizationFailed(String),

    /// OAuth callback state did not match the value we issued
    #[error("OAuth state mismatch: expected '{expected}', got '{actual}'")]
    StateMismatch { expected: String, actual: String },

    /// Token endpoint rejected an exchange or refresh request
    #[error("Token endpoint returned {status}: {message}")]
    TokenEndpoint { status: u16, message: String },

    /// Reading or writing the token cache file failed
    #[error("Credential cache I/O error at {path}: {source}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network failure during an OAuth round trip
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Anything else (encoding failures, unparseable token responses)
    #[error("{0}")]
    Other(String),
}

/// Result type for credential operations
pub type Result<T> = std::result::Result<T, CredentialError>;
