//! # Error Types
//!
//! The error taxonomy every backend port reports through. Adapters map
//! transport and provider failures onto these variants so callers branch on
//! the variant, never on message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by the hosted auth, row store and object store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The addressed row or account does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Credentials are missing, expired or lack the required role.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend rejected the request payload.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Network failure, timeout or 5xx from the provider.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Anything else, including undecodable responses.
    #[error("internal backend error: {0}")]
    Internal(String),
}

/// Discriminant of [`BackendError`] for logging and wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    Conflict,
    Invalid,
    Unavailable,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Invalid => "invalid",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
        }
    }
}

impl BackendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::NotFound(_) => ErrorKind::NotFound,
            BackendError::Unauthorized(_) => ErrorKind::Unauthorized,
            BackendError::Conflict(_) => ErrorKind::Conflict,
            BackendError::Invalid(_) => ErrorKind::Invalid,
            BackendError::Unavailable(_) => ErrorKind::Unavailable,
            BackendError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Only transport-level failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Unavailable(_))
    }

    /// The detail message without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            BackendError::NotFound(m)
            | BackendError::Unauthorized(m)
            | BackendError::Conflict(m)
            | BackendError::Invalid(m)
            | BackendError::Unavailable(m)
            | BackendError::Internal(m) => m,
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_retry() {
        let err = BackendError::Unavailable("connect refused".into());
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert!(err.is_retryable());

        let err = BackendError::Conflict("duplicate key".into());
        assert_eq!(err.kind().as_str(), "conflict");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_display_and_detail() {
        let err = BackendError::NotFound("todo 4".into());
        assert_eq!(err.to_string(), "not found: todo 4");
        assert_eq!(err.detail(), "todo 4");
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
    }
}
