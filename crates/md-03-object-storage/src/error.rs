//! Object storage error types.

use thiserror::Error;

/// Errors raised while naming, signing, or uploading objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// File name empty or unusable after sanitizing
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// Folder contains characters outside `[A-Za-z0-9._-]` or empty segments
    #[error("Invalid folder: {0}")]
    InvalidFolder(String),

    /// Key longer than the store accepts
    #[error("Object key too long: {len} bytes (max {max})")]
    KeyTooLong {
        /// Actual length in bytes
        len: usize,
        /// Maximum length in bytes
        max: usize,
    },

    /// Presigned URL lifetime out of range
    #[error("Invalid expiry: {secs}s (allowed 1..={max})")]
    InvalidExpiry {
        /// Requested lifetime in seconds
        secs: u64,
        /// Maximum lifetime in seconds
        max: u64,
    },

    /// Missing or malformed storage settings
    #[error("Storage configuration error: {0}")]
    Config(String),

    /// Request signing failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Store rejected the upload
    #[error("Upload rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status returned by the store
        status: u16,
        /// Response body, truncated
        message: String,
    },

    /// Store unreachable
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Whether the caller supplied bad input, as opposed to a store failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFileName(_)
                | Self::InvalidFolder(_)
                | Self::KeyTooLong { .. }
                | Self::InvalidExpiry { .. }
        )
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
