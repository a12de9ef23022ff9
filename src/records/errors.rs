//! # Record Store Errors

use thiserror::Error;

pub type RecordStoreResult<T> = Result<T, RecordStoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordStoreError {
    #[error("Record not found: {record_type}/{id}")]
    NotFound { record_type: String, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence engine failure
    #[error("Record store error: {0}")]
    Backend(String),
}

impl RecordStoreError {
    pub fn not_found(record_type: impl Into<String>, id: impl ToString) -> Self {
        RecordStoreError::NotFound {
            record_type: record_type.into(),
            id: id.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RecordStoreError::NotFound { .. } => "RECORD_NOT_FOUND",
            RecordStoreError::Conflict(_) => "RECORD_CONFLICT",
            RecordStoreError::Backend(_) => "RECORD_STORE_BACKEND",
        }
    }
}
