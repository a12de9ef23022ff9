//! Observable lifecycle events
//!
//! Every log line emitted by the lifecycle core carries one of these as
//! its `event` field, so log consumers can match on stable names.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    // Save path
    /// Reconciliation for one save begins
    ReconcileBegin,
    /// Reconciliation finished, fields resolved
    ReconcileComplete,
    /// New asset written and verified
    AssetWritten,
    /// Prior asset deleted after its replacement was stored
    AssetReplaced,
    /// Field kept its prior key
    AssetRetained,
    /// Non-binary marker ignored for an asset field
    SentinelIgnored,
    /// Keys written by a failed reconcile were removed again
    ReconcileRolledBack,
    /// Record committed to the record store
    RecordCommitted,

    // Naming
    /// Candidate key already existed
    NameCollision,
    /// Random candidates exhausted, counter fallback used
    NameFallback,

    // Delete path
    /// Cascade delete of one record begins
    CascadeBegin,
    /// Asset removed during cascade
    CascadeAssetDeleted,
    /// Asset removal failed and was swallowed
    CascadeAssetFailed,
    /// Record removed from the record store
    RecordRemoved,

    // Setup
    /// Configuration loaded
    ConfigLoaded,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::ReconcileBegin => "RECONCILE_BEGIN",
            LifecycleEvent::ReconcileComplete => "RECONCILE_COMPLETE",
            LifecycleEvent::AssetWritten => "ASSET_WRITTEN",
            LifecycleEvent::AssetReplaced => "ASSET_REPLACED",
            LifecycleEvent::AssetRetained => "ASSET_RETAINED",
            LifecycleEvent::SentinelIgnored => "ASSET_SENTINEL_IGNORED",
            LifecycleEvent::ReconcileRolledBack => "RECONCILE_ROLLED_BACK",
            LifecycleEvent::RecordCommitted => "RECORD_COMMITTED",
            LifecycleEvent::NameCollision => "NAME_COLLISION",
            LifecycleEvent::NameFallback => "NAME_FALLBACK",
            LifecycleEvent::CascadeBegin => "CASCADE_BEGIN",
            LifecycleEvent::CascadeAssetDeleted => "CASCADE_ASSET_DELETED",
            LifecycleEvent::CascadeAssetFailed => "CASCADE_ASSET_FAILED",
            LifecycleEvent::RecordRemoved => "RECORD_REMOVED",
            LifecycleEvent::ConfigLoaded => "CONFIG_LOADED",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
