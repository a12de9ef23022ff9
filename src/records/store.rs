//! Record store seam.

use std::sync::Arc;

use super::errors::RecordStoreResult;
use super::types::{Record, RecordId};
use crate::lifecycle::PriorState;
use crate::schema::{AssetFieldDescriptor, RelationFieldDescriptor};

/// Persistence engine the lifecycle core drives.
///
/// `commit` must be atomic from the caller's point of view: either all
/// field values persist or none do. The host serializes mutations per
/// record id; nothing here locks.
pub trait RecordStore: Send + Sync {
    /// Load the persisted state of a record
    fn load(&self, record_type: &str, id: &RecordId) -> RecordStoreResult<Option<Record>>;

    /// Persist a record, assigning an id when it has none
    fn commit(&self, record: Record) -> RecordStoreResult<Record>;

    /// Remove a record
    fn remove(&self, record_type: &str, id: &RecordId) -> RecordStoreResult<()>;

    /// Members of a to-many relation of `parent`
    fn related(&self, parent: &Record, relation: &RelationFieldDescriptor) -> RecordStoreResult<Vec<Record>>;

    /// Snapshot of the asset keys persisted for a record before a save.
    ///
    /// A record that does not exist yet has an empty prior state.
    fn load_prior_state(
        &self,
        record_type: &str,
        id: &RecordId,
        asset_fields: &[AssetFieldDescriptor],
    ) -> RecordStoreResult<PriorState> {
        Ok(self
            .load(record_type, id)?
            .map(|existing| PriorState::capture(&existing, asset_fields))
            .unwrap_or_default())
    }
}

impl<R: RecordStore + ?Sized> RecordStore for Arc<R> {
    fn load(&self, record_type: &str, id: &RecordId) -> RecordStoreResult<Option<Record>> {
        (**self).load(record_type, id)
    }

    fn commit(&self, record: Record) -> RecordStoreResult<Record> {
        (**self).commit(record)
    }

    fn remove(&self, record_type: &str, id: &RecordId) -> RecordStoreResult<()> {
        (**self).remove(record_type, id)
    }

    fn related(&self, parent: &Record, relation: &RelationFieldDescriptor) -> RecordStoreResult<Vec<Record>> {
        (**self).related(parent, relation)
    }

    fn load_prior_state(
        &self,
        record_type: &str,
        id: &RecordId,
        asset_fields: &[AssetFieldDescriptor],
    ) -> RecordStoreResult<PriorState> {
        (**self).load_prior_state(record_type, id, asset_fields)
    }
}
