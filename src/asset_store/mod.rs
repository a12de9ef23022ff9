//! # Asset Store
//!
//! Thin key/blob capability underneath the lifecycle core. No business
//! logic lives here: callers decide keys, this module only moves bytes.

pub mod backend;
pub mod checksum;
pub mod errors;
pub mod local;
pub mod memory;

pub use backend::AssetStore;
pub use checksum::{calculate_checksum, verify_stored};
pub use errors::{StorageError, StorageResult};
pub use local::LocalAssetStore;
pub use memory::InMemoryAssetStore;
