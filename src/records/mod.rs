//! # Records
//!
//! The lifecycle core observes records but never owns them. Persistence
//! is delegated to a [`RecordStore`].

mod errors;
mod memory;
mod store;
mod types;

pub use errors::{RecordStoreError, RecordStoreResult};
pub use memory::InMemoryRecordStore;
pub use store::RecordStore;
pub use types::{Record, RecordId};
