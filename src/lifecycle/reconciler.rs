//! Asset reconciliation for a single save
//!
//! Per asset field:
//!
//! | pending             | prior  | result                                  |
//! |---------------------|--------|-----------------------------------------|
//! | absent / marker     | any    | keep prior                              |
//! | upload              | none   | write new key                           |
//! | upload              | key    | write new key, then delete prior key    |
//!
//! Replacement follows write-new, verify, delete-old. Every upload of the
//! save is written and verified before any prior key is deleted, so a
//! failure part-way leaves all prior keys untouched.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::errors::{LifecycleError, LifecycleResult};
use super::state::{AssetUpload, PendingAsset, PendingAssets, PriorState, ResolvedAssets};
use crate::asset_store::{calculate_checksum, verify_stored, AssetStore, StorageError};
use crate::config::LifecycleConfig;
use crate::naming::{KeyTemplate, NameAllocator};
use crate::observability::{LifecycleEvent, LifecycleMetrics};
use crate::records::RecordId;
use crate::schema::{AssetFieldDescriptor, SchemaIntrospector};

/// Uploads written and verified, prior keys not yet deleted.
///
/// Either [`AssetReconciler::finish`] or [`AssetReconciler::abort`] must
/// consume it.
#[derive(Debug)]
#[must_use = "staged assets must be finished or aborted"]
pub struct StagedAssets {
    resolved: ResolvedAssets,
    retired: Vec<String>,
}

impl StagedAssets {
    /// Resolved field values, valid once the stage is finished
    pub fn resolved(&self) -> &ResolvedAssets {
        &self.resolved
    }

    /// Prior keys that will be deleted on finish
    pub fn retired(&self) -> &[String] {
        &self.retired
    }
}

pub struct AssetReconciler<S: AssetStore + ?Sized, I: SchemaIntrospector + ?Sized> {
    store: Arc<S>,
    schema: Arc<I>,
    allocator: NameAllocator,
    verify_writes: bool,
    metrics: Arc<LifecycleMetrics>,
}

impl<S: AssetStore + ?Sized, I: SchemaIntrospector + ?Sized> AssetReconciler<S, I> {
    pub fn new(store: Arc<S>, schema: Arc<I>, config: &LifecycleConfig, metrics: Arc<LifecycleMetrics>) -> Self {
        Self {
            store,
            schema,
            allocator: NameAllocator::new(
                config.max_name_attempts,
                config.fallback_attempts,
                Arc::clone(&metrics),
            ),
            verify_writes: config.verify_writes,
            metrics,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve every asset field of one save, performing all storage
    /// writes and deletes before returning.
    pub fn reconcile(
        &self,
        record_type: &str,
        record_id: Option<&RecordId>,
        prior: &PriorState,
        pending: &PendingAssets,
    ) -> LifecycleResult<ResolvedAssets> {
        let staged = self.stage(record_type, record_id, prior, pending)?;
        Ok(self.finish(staged))
    }

    /// Write and verify every upload; defer deletion of prior keys.
    ///
    /// On error, keys written by this call are removed again and no prior
    /// key has been touched.
    pub fn stage(
        &self,
        record_type: &str,
        record_id: Option<&RecordId>,
        prior: &PriorState,
        pending: &PendingAssets,
    ) -> LifecycleResult<StagedAssets> {
        let fields = self.schema.asset_fields(record_type)?;

        if let Some(unknown) = pending.fields().find(|f| !fields.iter().any(|d| d.name == *f)) {
            return Err(LifecycleError::UnknownAssetField {
                record_type: record_type.to_string(),
                field: unknown.to_string(),
            });
        }

        let id = record_id.map(RecordId::as_str).unwrap_or("<new>");
        debug!(event = %LifecycleEvent::ReconcileBegin, record_type, id, fields = fields.len(), "reconciling assets");

        let mut staged = StagedAssets {
            resolved: ResolvedAssets::default(),
            retired: Vec::new(),
        };

        for field in &fields {
            let prior_key = prior.get(&field.name);
            match pending.get(&field.name) {
                Some(PendingAsset::Upload(upload)) => {
                    let key = match self.store_upload(field, upload, &mut staged.resolved.written) {
                        Ok(key) => key,
                        Err(e) => {
                            warn!(event = %LifecycleEvent::ReconcileRolledBack, record_type, id, error = %e, "asset stage failed");
                            self.rollback(&staged.resolved.written);
                            return Err(e);
                        }
                    };
                    info!(event = %LifecycleEvent::AssetWritten, record_type, id, field = %field.name, key = %key, "asset stored");
                    if let Some(old) = prior_key.filter(|old| *old != key) {
                        staged.retired.push(old.to_string());
                    }
                    staged.resolved.set(&field.name, Some(key));
                }
                Some(PendingAsset::Marker(marker)) => {
                    self.metrics.increment_sentinels_ignored();
                    debug!(event = %LifecycleEvent::SentinelIgnored, record_type, id, field = %field.name, marker = %marker, "non-binary asset value ignored");
                    self.retain(&mut staged.resolved, field, prior_key);
                }
                None => self.retain(&mut staged.resolved, field, prior_key),
            }
        }

        Ok(staged)
    }

    /// Delete retired prior keys and return the resolved values.
    ///
    /// A prior key that cannot be deleted is logged and counted; the new
    /// key is already durable, so the save itself stays valid.
    pub fn finish(&self, staged: StagedAssets) -> ResolvedAssets {
        let StagedAssets { mut resolved, retired } = staged;

        for old in retired {
            match self.store.delete(&old) {
                Ok(()) => {
                    self.metrics.increment_assets_replaced();
                    info!(event = %LifecycleEvent::AssetReplaced, key = %old, "prior asset deleted");
                    resolved.deleted.push(old);
                }
                Err(e) if e.is_not_found() => {
                    debug!(event = %LifecycleEvent::AssetReplaced, key = %old, "prior asset already gone");
                }
                Err(e) => {
                    self.metrics.increment_cleanup_failures();
                    warn!(event = %LifecycleEvent::AssetReplaced, key = %old, error = %e, "failed to delete prior asset");
                }
            }
        }

        debug!(event = %LifecycleEvent::ReconcileComplete, written = resolved.written.len(), deleted = resolved.deleted.len(), "reconcile complete");
        resolved
    }

    /// Remove every key written by a stage; prior keys stay referenced.
    pub fn abort(&self, staged: StagedAssets) {
        self.rollback(&staged.resolved.written);
    }

    fn retain(&self, resolved: &mut ResolvedAssets, field: &AssetFieldDescriptor, prior_key: Option<&str>) {
        if let Some(key) = prior_key {
            self.metrics.increment_assets_retained();
            debug!(event = %LifecycleEvent::AssetRetained, field = %field.name, key, "prior asset kept");
        }
        resolved.set(&field.name, prior_key.map(str::to_string));
    }

    fn store_upload(
        &self,
        field: &AssetFieldDescriptor,
        upload: &AssetUpload,
        written: &mut Vec<String>,
    ) -> LifecycleResult<String> {
        let template = KeyTemplate::for_upload(
            field.upload_to.as_deref(),
            field.base_name.as_deref(),
            &upload.file_name,
        );
        let key = self.allocator.allocate_template(self.store.as_ref(), &template)?;

        let stored = self.store.write(&key, &upload.data)?;
        written.push(stored.clone());

        if self.verify_writes {
            verify_stored(self.store.as_ref(), &stored, &calculate_checksum(&upload.data))?;
        } else if !self.store.exists(&stored)? {
            return Err(StorageError::ObjectNotFound(stored).into());
        }

        self.metrics.increment_assets_written();
        Ok(stored)
    }

    fn rollback(&self, written: &[String]) {
        if written.is_empty() {
            return;
        }
        self.metrics.increment_rollbacks();
        for key in written {
            if let Err(e) = self.store.delete(key) {
                if !e.is_not_found() {
                    self.metrics.increment_cleanup_failures();
                    warn!(event = %LifecycleEvent::ReconcileRolledBack, key = %key, error = %e, "failed to remove asset during rollback");
                }
            }
        }
        info!(event = %LifecycleEvent::ReconcileRolledBack, keys = written.len(), "rolled back written assets");
    }
}
