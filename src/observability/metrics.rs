//! Lifecycle counters
//!
//! - Counters only, monotonic
//! - Thread-safe, Relaxed ordering
//! - Injected per service, never process-global

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct LifecycleMetrics {
    /// New blobs written by reconcile
    assets_written: AtomicU64,
    /// Prior blobs deleted after replacement
    assets_replaced: AtomicU64,
    /// Fields that kept their prior key
    assets_retained: AtomicU64,
    /// Sentinel values ignored
    sentinels_ignored: AtomicU64,
    /// Reconciles that rolled back written keys
    rollbacks: AtomicU64,
    /// Blobs deleted by cascade
    cascade_assets_deleted: AtomicU64,
    /// Swallowed delete failures (retired priors, cascade, rollback)
    cleanup_failures: AtomicU64,
    /// Records removed by cascade
    records_removed: AtomicU64,
    /// Candidate keys that already existed
    name_collisions: AtomicU64,
    /// Keys produced by the counter fallback
    fallback_allocations: AtomicU64,
}

impl LifecycleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_assets_written(&self) {
        self.assets_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_assets_replaced(&self) {
        self.assets_replaced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_assets_retained(&self) {
        self.assets_retained.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sentinels_ignored(&self) {
        self.sentinels_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rollbacks(&self) {
        self.rollbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cascade_assets_deleted(&self) {
        self.cascade_assets_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cleanup_failures(&self) {
        self.cleanup_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_records_removed(&self) {
        self.records_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_name_collisions(&self) {
        self.name_collisions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fallback_allocations(&self) {
        self.fallback_allocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            assets_written: self.assets_written.load(Ordering::Relaxed),
            assets_replaced: self.assets_replaced.load(Ordering::Relaxed),
            assets_retained: self.assets_retained.load(Ordering::Relaxed),
            sentinels_ignored: self.sentinels_ignored.load(Ordering::Relaxed),
            rollbacks: self.rollbacks.load(Ordering::Relaxed),
            cascade_assets_deleted: self.cascade_assets_deleted.load(Ordering::Relaxed),
            cleanup_failures: self.cleanup_failures.load(Ordering::Relaxed),
            records_removed: self.records_removed.load(Ordering::Relaxed),
            name_collisions: self.name_collisions.load(Ordering::Relaxed),
            fallback_allocations: self.fallback_allocations.load(Ordering::Relaxed),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub assets_written: u64,
    pub assets_replaced: u64,
    pub assets_retained: u64,
    pub sentinels_ignored: u64,
    pub rollbacks: u64,
    pub cascade_assets_deleted: u64,
    pub cleanup_failures: u64,
    pub records_removed: u64,
    pub name_collisions: u64,
    pub fallback_allocations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_metrics_are_zero() {
        assert_eq!(LifecycleMetrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increment_counters() {
        let metrics = LifecycleMetrics::new();

        metrics.increment_assets_written();
        metrics.increment_assets_written();
        metrics.increment_assets_replaced();
        metrics.increment_cleanup_failures();
        metrics.increment_records_removed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.assets_written, 2);
        assert_eq!(snapshot.assets_replaced, 1);
        assert_eq!(snapshot.cleanup_failures, 1);
        assert_eq!(snapshot.records_removed, 1);
        assert_eq!(snapshot.rollbacks, 0);
    }

    #[test]
    fn test_to_json() {
        let metrics = LifecycleMetrics::new();
        metrics.increment_sentinels_ignored();

        let parsed: serde_json::Value = serde_json::from_str(&metrics.to_json()).unwrap();
        assert_eq!(parsed["sentinels_ignored"], 1);
        assert_eq!(parsed["assets_written"], 0);
    }

    #[test]
    fn test_thread_safety() {
        let metrics = Arc::new(LifecycleMetrics::new());
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let m = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..100 {
                        m.increment_name_collisions();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(metrics.snapshot().name_collisions, 1000);
    }
}
