//! Cascade deletion
//!
//! Deleting a record removes, in order: every member of its relation
//! collections (each cascaded the same way), the storage objects its
//! asset fields reference, and finally the record itself.
//!
//! Asset deletion is best effort. A missing or undeletable object is
//! logged and counted but never stops the record from being removed.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::errors::{LifecycleError, LifecycleResult};
use crate::asset_store::AssetStore;
use crate::observability::{LifecycleEvent, LifecycleMetrics};
use crate::records::{Record, RecordId, RecordStore, RecordStoreError};
use crate::schema::SchemaIntrospector;

/// What a cascade removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// `(record_type, id)` in removal order; members come before owners
    pub records_removed: Vec<(String, RecordId)>,
    pub assets_deleted: Vec<String>,
    /// Keys that could not be deleted, with the reason
    pub asset_failures: Vec<(String, String)>,
}

impl DeleteReport {
    pub fn merge(&mut self, other: DeleteReport) {
        self.records_removed.extend(other.records_removed);
        self.assets_deleted.extend(other.assets_deleted);
        self.asset_failures.extend(other.asset_failures);
    }
}

pub struct CascadeDeleter<S, I, R>
where
    S: AssetStore + ?Sized,
    I: SchemaIntrospector + ?Sized,
    R: RecordStore + ?Sized,
{
    store: Arc<S>,
    schema: Arc<I>,
    records: Arc<R>,
    max_depth: usize,
    metrics: Arc<LifecycleMetrics>,
}

impl<S, I, R> CascadeDeleter<S, I, R>
where
    S: AssetStore + ?Sized,
    I: SchemaIntrospector + ?Sized,
    R: RecordStore + ?Sized,
{
    pub fn new(store: Arc<S>, schema: Arc<I>, records: Arc<R>, max_depth: usize, metrics: Arc<LifecycleMetrics>) -> Self {
        Self {
            store,
            schema,
            records,
            max_depth,
            metrics,
        }
    }

    /// Delete a record and everything it owns.
    ///
    /// The persisted state is re-read before anything is removed, so the
    /// passed record only needs its type and id. The whole graph is walked
    /// read-only first; nothing is removed unless it fits the depth bound.
    pub fn delete_record(&self, record: &Record) -> LifecycleResult<DeleteReport> {
        let id = record
            .id
            .clone()
            .ok_or_else(|| LifecycleError::InvalidRecord(format!("cannot delete uncommitted '{}'", record.record_type)))?;

        info!(event = %LifecycleEvent::CascadeBegin, record_type = %record.record_type, id = %id, "cascade delete");

        let mut visited = HashSet::new();
        let mut plan = Vec::new();
        self.plan(&record.record_type, &id, 0, &mut visited, &mut plan)?;
        debug!(record_type = %record.record_type, id = %id, records = plan.len(), "cascade planned");

        let mut report = DeleteReport::default();
        for removal in plan {
            self.remove(removal, &mut report)?;
        }
        Ok(report)
    }

    /// Collect removals in order, members before their owners.
    fn plan(
        &self,
        record_type: &str,
        id: &RecordId,
        depth: usize,
        visited: &mut HashSet<(String, RecordId)>,
        plan: &mut Vec<PlannedRemoval>,
    ) -> LifecycleResult<()> {
        // cycles through relation collections
        let node = (record_type.to_string(), id.clone());
        if visited.contains(&node) {
            return Ok(());
        }
        if depth > self.max_depth {
            return Err(LifecycleError::CascadeTooDeep(self.max_depth));
        }
        visited.insert(node);

        let record = self
            .records
            .load(record_type, id)?
            .ok_or_else(|| RecordStoreError::not_found(record_type, id))?;

        for relation in self.schema.relation_collection_fields(record_type)? {
            let members = self.records.related(&record, &relation)?;
            debug!(record_type, id = %id, relation = %relation.name, members = members.len(), "cascading into relation");
            for member in members {
                let Some(member_id) = member.id.as_ref() else {
                    continue;
                };
                self.plan(&member.record_type, member_id, depth + 1, visited, plan)?;
            }
        }

        let asset_keys = self
            .schema
            .asset_fields(record_type)?
            .iter()
            .filter_map(|field| record.asset_key(&field.name).map(str::to_string))
            .collect();

        plan.push(PlannedRemoval {
            record_type: record_type.to_string(),
            id: id.clone(),
            asset_keys,
        });
        Ok(())
    }

    fn remove(&self, removal: PlannedRemoval, report: &mut DeleteReport) -> LifecycleResult<()> {
        let PlannedRemoval { record_type, id, asset_keys } = removal;

        for key in asset_keys {
            match self.store.delete(&key) {
                Ok(()) => {
                    self.metrics.increment_cascade_assets_deleted();
                    debug!(event = %LifecycleEvent::CascadeAssetDeleted, record_type = %record_type, id = %id, key = %key, "asset deleted");
                    report.assets_deleted.push(key);
                }
                Err(e) if e.is_not_found() => {
                    debug!(event = %LifecycleEvent::CascadeAssetDeleted, record_type = %record_type, id = %id, key = %key, "asset already gone");
                }
                Err(e) => {
                    self.metrics.increment_cleanup_failures();
                    warn!(event = %LifecycleEvent::CascadeAssetFailed, record_type = %record_type, id = %id, key = %key, error = %e, "asset delete failed, continuing");
                    report.asset_failures.push((key, e.to_string()));
                }
            }
        }

        self.records.remove(&record_type, &id)?;
        self.metrics.increment_records_removed();
        info!(event = %LifecycleEvent::RecordRemoved, record_type = %record_type, id = %id, "record removed");
        report.records_removed.push((record_type, id));
        Ok(())
    }
}

/// One record of a cascade, with the asset keys it held when planned
#[derive(Debug)]
struct PlannedRemoval {
    record_type: String,
    id: RecordId,
    asset_keys: Vec<String>,
}
