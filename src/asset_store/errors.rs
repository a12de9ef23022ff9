//! # Asset Store Errors

use thiserror::Error;

/// Result type for asset store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Asset store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Checksum mismatch for key: {0}")]
    ChecksumMismatch(String),

    /// Backend refused or could not be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::ObjectNotFound(_) => "STORAGE_OBJECT_NOT_FOUND",
            StorageError::InvalidKey(_) => "STORAGE_INVALID_KEY",
            StorageError::ChecksumMismatch(_) => "STORAGE_CHECKSUM_MISMATCH",
            StorageError::Unavailable(_) => "STORAGE_UNAVAILABLE",
            StorageError::IoError(_) => "STORAGE_IO_ERROR",
            StorageError::Internal(_) => "STORAGE_INTERNAL",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::ObjectNotFound(_))
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::IoError(e.to_string())
    }
}
