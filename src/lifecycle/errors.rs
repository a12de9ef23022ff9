//! Lifecycle errors
//!
//! Any error returned from a save aborts it before the record store is
//! asked to commit. Storage failures during cascade delete never surface
//! here; they are logged and counted instead.

use thiserror::Error;

use crate::asset_store::StorageError;
use crate::naming::AllocationError;
use crate::records::RecordStoreError;
use crate::schema::SchemaError;

pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    #[error("No free asset key for '{base}' after {attempts} attempts")]
    NameCollisionExhausted { base: String, attempts: u32 },

    #[error("Schema introspection failed: {0}")]
    SchemaIntrospection(#[from] SchemaError),

    #[error("Record store failure: {0}")]
    RecordStore(#[from] RecordStoreError),

    #[error("'{field}' is not an asset field of '{record_type}'")]
    UnknownAssetField { record_type: String, field: String },

    #[error("'{field}' is not a relation collection of '{record_type}'")]
    UnknownRelationField { record_type: String, field: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Cascade exceeded depth {0}")]
    CascadeTooDeep(usize),
}

impl From<AllocationError> for LifecycleError {
    fn from(e: AllocationError) -> Self {
        match e {
            AllocationError::Exhausted { base, attempts } => {
                LifecycleError::NameCollisionExhausted { base, attempts }
            }
            AllocationError::Storage(inner) => LifecycleError::StorageUnavailable(inner),
        }
    }
}

impl LifecycleError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            LifecycleError::StorageUnavailable(_) => "ASSET_STORAGE_UNAVAILABLE",
            LifecycleError::NameCollisionExhausted { .. } => "ASSET_NAME_COLLISION_EXHAUSTED",
            LifecycleError::SchemaIntrospection(_) => "ASSET_SCHEMA_INTROSPECTION_FAILED",
            LifecycleError::RecordStore(_) => "ASSET_RECORD_STORE_FAILED",
            LifecycleError::UnknownAssetField { .. } => "ASSET_UNKNOWN_FIELD",
            LifecycleError::UnknownRelationField { .. } => "ASSET_UNKNOWN_RELATION",
            LifecycleError::InvalidRecord(_) => "ASSET_INVALID_RECORD",
            LifecycleError::CascadeTooDeep(_) => "ASSET_CASCADE_TOO_DEEP",
        }
    }
}
