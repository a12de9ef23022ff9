//! assetkeeper - lifecycle management for binary assets attached to records
//!
//! Guarantees, for every record with asset fields:
//! - a replaced asset is deleted only after its replacement is stored
//! - an asset field the caller did not touch keeps its key
//! - newly allocated keys never collide with existing objects
//! - deleting a record deletes its relation members and their assets

pub mod asset_store;
pub mod config;
pub mod lifecycle;
pub mod naming;
pub mod observability;
pub mod records;
pub mod schema;

pub use config::{ConfigError, LifecycleConfig};
pub use lifecycle::{
    AssetReconciler, AssetUpload, CascadeDeleter, DeleteReport, LifecycleError, LifecycleResult, PendingAssets,
    PriorState, RecordLifecycle, ResolvedAssets,
};
