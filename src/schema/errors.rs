//! Schema introspection errors
//!
//! Every variant is fatal for the operation that hit it: a record type
//! that cannot be introspected is never retried.

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Record type was never registered
    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),

    /// Schema metadata is structurally invalid
    #[error("Malformed schema '{origin}': {reason}")]
    MalformedSchema { origin: String, reason: String },

    /// Record types are registered once
    #[error("Record type already registered: {0}")]
    DuplicateRecordType(String),
}

impl SchemaError {
    pub fn malformed(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::MalformedSchema {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownRecordType(_) => "SCHEMA_UNKNOWN_RECORD_TYPE",
            SchemaError::MalformedSchema { .. } => "SCHEMA_MALFORMED",
            SchemaError::DuplicateRecordType(_) => "SCHEMA_DUPLICATE_RECORD_TYPE",
        }
    }
}
