//! # Record Lifecycle
//!
//! Entry point the host calls on save and delete. Ties schema
//! introspection, asset reconciliation, record persistence and cascade
//! deletion together.
//!
//! Save order:
//! 1. introspect asset fields
//! 2. snapshot prior keys from the persisted record
//! 3. write and verify uploads
//! 4. commit the record with resolved keys
//! 5. delete replaced prior keys
//!
//! A failed commit removes the uploads from step 3, so no stored object
//! is left without a referencing record. Prior keys are only deleted
//! once the commit has succeeded.

use std::sync::Arc;

use tracing::{info, warn};

use super::cascade::{CascadeDeleter, DeleteReport};
use super::errors::{LifecycleError, LifecycleResult};
use super::reconciler::AssetReconciler;
use super::state::{PendingAssets, PriorState};
use crate::asset_store::AssetStore;
use crate::config::LifecycleConfig;
use crate::observability::{LifecycleEvent, LifecycleMetrics};
use crate::records::{Record, RecordId, RecordStore};
use crate::schema::SchemaIntrospector;

pub struct RecordLifecycle<S, I, R>
where
    S: AssetStore + ?Sized,
    I: SchemaIntrospector + ?Sized,
    R: RecordStore + ?Sized,
{
    schema: Arc<I>,
    records: Arc<R>,
    reconciler: AssetReconciler<S, I>,
    deleter: CascadeDeleter<S, I, R>,
    metrics: Arc<LifecycleMetrics>,
}

impl<S, I, R> RecordLifecycle<S, I, R>
where
    S: AssetStore + ?Sized,
    I: SchemaIntrospector + ?Sized,
    R: RecordStore + ?Sized,
{
    pub fn new(store: Arc<S>, schema: Arc<I>, records: Arc<R>, config: &LifecycleConfig) -> Self {
        Self::with_metrics(store, schema, records, config, Arc::new(LifecycleMetrics::new()))
    }

    pub fn with_metrics(
        store: Arc<S>,
        schema: Arc<I>,
        records: Arc<R>,
        config: &LifecycleConfig,
        metrics: Arc<LifecycleMetrics>,
    ) -> Self {
        let reconciler = AssetReconciler::new(Arc::clone(&store), Arc::clone(&schema), config, Arc::clone(&metrics));
        let deleter = CascadeDeleter::new(
            store,
            Arc::clone(&schema),
            Arc::clone(&records),
            config.max_cascade_depth,
            Arc::clone(&metrics),
        );
        Self {
            schema,
            records,
            reconciler,
            deleter,
            metrics,
        }
    }

    pub fn metrics(&self) -> &LifecycleMetrics {
        &self.metrics
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    /// Persist `record`, reconciling its asset fields against `pending`.
    ///
    /// Asset field values already on `record` are treated as markers and
    /// never clear a stored key. Returns the committed record.
    pub fn save(&self, mut record: Record, pending: PendingAssets) -> LifecycleResult<Record> {
        let record_type = record.record_type.clone();
        let asset_fields = self.schema.asset_fields(&record_type)?;

        let prior = match &record.id {
            Some(id) => self.records.load_prior_state(&record_type, id, &asset_fields)?,
            None => PriorState::empty(),
        };
        let pending = pending.with_markers_from(&record, &asset_fields);

        let staged = self
            .reconciler
            .stage(&record_type, record.id.as_ref(), &prior, &pending)?;
        staged.resolved().apply_to(&mut record);

        let committed = match self.records.commit(record) {
            Ok(committed) => committed,
            Err(e) => {
                warn!(event = %LifecycleEvent::ReconcileRolledBack, record_type = %record_type, error = %e, "commit failed, removing staged assets");
                self.reconciler.abort(staged);
                return Err(e.into());
            }
        };

        let resolved = self.reconciler.finish(staged);
        let id = committed.id.as_ref().map(RecordId::as_str).unwrap_or_default();
        info!(
            event = %LifecycleEvent::RecordCommitted,
            record_type = %record_type,
            id,
            written = resolved.written.len(),
            deleted = resolved.deleted.len(),
            "record saved"
        );
        Ok(committed)
    }

    /// Delete a record with its relation members and stored assets
    pub fn delete(&self, record: &Record) -> LifecycleResult<DeleteReport> {
        self.deleter.delete_record(record)
    }

    /// Cascade-delete members of `relation` that are not in `keep`.
    ///
    /// Used when a parent is saved with a reduced member list.
    pub fn prune_relation(&self, parent: &Record, relation: &str, keep: &[RecordId]) -> LifecycleResult<DeleteReport> {
        let descriptor = self
            .schema
            .relation_collection_fields(&parent.record_type)?
            .into_iter()
            .find(|r| r.name == relation)
            .ok_or_else(|| LifecycleError::UnknownRelationField {
                record_type: parent.record_type.clone(),
                field: relation.to_string(),
            })?;

        let mut report = DeleteReport::default();
        for member in self.records.related(parent, &descriptor)? {
            if member.id.as_ref().map_or(true, |id| keep.contains(id)) {
                continue;
            }
            report.merge(self.deleter.delete_record(&member)?);
        }
        Ok(report)
    }
}
