//! # Asset Lifecycle
//!
//! Keeps the storage objects referenced by a record's asset fields in
//! step with the record itself: replaced assets are deleted after their
//! replacement is stored, untouched fields keep their key, and deleting a
//! record removes its relation members and stored assets.

mod cascade;
mod errors;
mod reconciler;
mod service;
mod state;

pub use cascade::{CascadeDeleter, DeleteReport};
pub use errors::{LifecycleError, LifecycleResult};
pub use reconciler::{AssetReconciler, StagedAssets};
pub use service::RecordLifecycle;
pub use state::{AssetUpload, PendingAsset, PendingAssets, PriorState, ResolvedAssets};
