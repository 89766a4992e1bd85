//! Error types for Folio core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the caller (route layer or CLI)
//! maps these to user-facing messages and status codes.
//!
//! Absence of a record is not an error here: lookups return `Option`.

use thiserror::Error;

/// Result type alias for Folio operations.
pub type Result<T> = std::result::Result<T, FolioError>;

/// Core error type for Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Collection file could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Hashing or signing failure
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Missing or invalid boot-time configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session token is past its expiry
    #[error("Token has expired")]
    ExpiredToken,

    /// Session token is malformed or its signature does not match
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Session token was issued for an older token version
    #[error("Token has been invalidated")]
    RevokedToken,

    /// Session token refers to an account that no longer exists
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),
}

impl FolioError {
    /// Whether retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FolioError::Storage(_))
    }

    /// Whether this error rejects a session token.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            FolioError::ExpiredToken
                | FolioError::InvalidToken(_)
                | FolioError::RevokedToken
                | FolioError::SubjectNotFound(_)
        )
    }
}

impl From<std::io::Error> for FolioError {
    fn from(err: std::io::Error) -> Self {
        FolioError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::Validation(err.to_string())
    }
}
