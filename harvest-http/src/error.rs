//! Transport-level error types

use thiserror::Error;

/// Failure of a remote call.
///
/// Transport errors are propagated to the caller unchanged; no automatic
/// retry happens at this layer.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection-level failure (DNS, TLS, refused connection, broken pipe)
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded its deadline
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The remote endpoint answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Local I/O failure while handling a request or response
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let error = TransportError::Status {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(error.to_string(), "HTTP 503: Service Unavailable");
    }

    #[test]
    fn test_cancelled_display() {
        assert_eq!(TransportError::Cancelled.to_string(), "Operation cancelled");
    }
}
