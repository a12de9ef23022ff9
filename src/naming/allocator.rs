//! Collision-free key allocation
//!
//! Candidates look like `{base}-{unix_ts}-{uuid_v4}.{ext}`. A taken
//! candidate is regenerated with a fresh timestamp and token. After
//! `max_attempts` random candidates the allocator switches to a
//! monotonic counter suffix, and gives up after `fallback_attempts` more.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use super::name::KeyTemplate;
use crate::asset_store::{AssetStore, StorageError};
use crate::observability::{LifecycleEvent, LifecycleMetrics};

pub type AllocationResult<T> = Result<T, AllocationError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("No free key for '{base}' after {attempts} attempts")]
    Exhausted { base: String, attempts: u32 },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Produces storage keys that do not exist yet. Never writes.
#[derive(Debug)]
pub struct NameAllocator {
    max_attempts: u32,
    fallback_attempts: u32,
    counter: AtomicU64,
    metrics: Arc<LifecycleMetrics>,
}

impl NameAllocator {
    pub fn new(max_attempts: u32, fallback_attempts: u32, metrics: Arc<LifecycleMetrics>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            fallback_attempts,
            counter: AtomicU64::new(0),
            metrics,
        }
    }

    /// Total candidates tried before giving up
    pub fn attempt_bound(&self) -> u32 {
        self.max_attempts.saturating_add(self.fallback_attempts)
    }

    /// Allocate `{base}-{ts}-{token}.{extension}` with no namespace.
    pub fn allocate<S: AssetStore + ?Sized>(
        &self,
        store: &S,
        base_name: &str,
        extension: Option<&str>,
    ) -> AllocationResult<String> {
        let template = KeyTemplate {
            namespace: None,
            base: base_name.to_string(),
            extension: extension.map(str::to_string),
        };
        self.allocate_template(store, &template)
    }

    /// Allocate a free key for a fully built template.
    pub fn allocate_template<S: AssetStore + ?Sized>(
        &self,
        store: &S,
        template: &KeyTemplate,
    ) -> AllocationResult<String> {
        let mut token = String::new();

        for _ in 0..self.max_attempts {
            token = Uuid::new_v4().to_string();
            let candidate = template.render(&format!("{}-{}", Utc::now().timestamp(), token));
            if !store.exists(&candidate)? {
                return Ok(candidate);
            }
            self.metrics.increment_name_collisions();
            debug!(event = %LifecycleEvent::NameCollision, key = %candidate, "candidate key taken");
        }

        // Random candidates are exhausted; only a broken or adversarial
        // store gets here. Keep the last token and count upwards.
        for _ in 0..self.fallback_attempts {
            let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
            let candidate = template.render(&format!("{}-{}-{}", Utc::now().timestamp(), token, n));
            if !store.exists(&candidate)? {
                self.metrics.increment_fallback_allocations();
                warn!(event = %LifecycleEvent::NameFallback, key = %candidate, "allocated key via counter fallback");
                return Ok(candidate);
            }
            self.metrics.increment_name_collisions();
        }

        Err(AllocationError::Exhausted {
            base: template.base.clone(),
            attempts: self.attempt_bound(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_store::{InMemoryAssetStore, StorageResult};
    use std::sync::atomic::AtomicU32;

    /// Reports the first `taken` candidates as occupied.
    #[derive(Debug)]
    struct CrowdedStore {
        taken: u32,
        calls: AtomicU32,
    }

    impl CrowdedStore {
        fn new(taken: u32) -> Self {
            Self { taken, calls: AtomicU32::new(0) }
        }
    }

    impl AssetStore for CrowdedStore {
        fn exists(&self, _key: &str) -> StorageResult<bool> {
            Ok(self.calls.fetch_add(1, Ordering::SeqCst) < self.taken)
        }
        fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
            Err(StorageError::ObjectNotFound(key.into()))
        }
        fn write(&self, key: &str, _data: &[u8]) -> StorageResult<String> {
            Ok(key.into())
        }
        fn delete(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
        fn list(&self, _prefix: &str) -> StorageResult<Vec<String>> {
            Ok(vec![])
        }
    }

    fn allocator(max: u32, fallback: u32) -> (NameAllocator, Arc<LifecycleMetrics>) {
        let metrics = Arc::new(LifecycleMetrics::new());
        (NameAllocator::new(max, fallback, Arc::clone(&metrics)), metrics)
    }

    #[test]
    fn test_key_shape() {
        let (alloc, _) = allocator(4, 4);
        let store = InMemoryAssetStore::new();

        let key = alloc.allocate(&store, "event", Some("png")).unwrap();
        let (base, rest) = key.split_once('-').unwrap();
        assert_eq!(base, "event");
        assert!(rest.ends_with(".png"));
        let (ts, token) = rest.trim_end_matches(".png").split_once('-').unwrap();
        assert!(ts.parse::<i64>().is_ok());
        assert!(Uuid::parse_str(token).is_ok());
    }

    #[test]
    fn test_does_not_write() {
        let (alloc, _) = allocator(4, 4);
        let store = InMemoryAssetStore::new();

        alloc.allocate(&store, "event", Some("png")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_retries_on_collision() {
        let (alloc, metrics) = allocator(4, 4);
        let store = CrowdedStore::new(2);

        let key = alloc.allocate(&store, "event", Some("png")).unwrap();
        assert!(key.starts_with("event-"));
        assert_eq!(metrics.snapshot().name_collisions, 2);
        assert_eq!(metrics.snapshot().fallback_allocations, 0);
    }

    #[test]
    fn test_counter_fallback() {
        let (alloc, metrics) = allocator(3, 5);
        let store = CrowdedStore::new(4);

        let key = alloc.allocate(&store, "event", Some("png")).unwrap();
        assert!(key.ends_with("-2.png"), "got {}", key);
        assert_eq!(metrics.snapshot().fallback_allocations, 1);
    }

    #[test]
    fn test_exhausted_is_bounded() {
        let (alloc, _) = allocator(3, 2);
        let store = CrowdedStore::new(u32::MAX);

        assert_eq!(
            alloc.allocate(&store, "event", Some("png")),
            Err(AllocationError::Exhausted { base: "event".into(), attempts: 5 })
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_namespace_template() {
        let (alloc, _) = allocator(2, 0);
        let store = InMemoryAssetStore::new();
        let template = KeyTemplate::for_upload(Some("events/images"), Some("event"), "x.jpg");

        let key = alloc.allocate_template(&store, &template).unwrap();
        assert!(key.starts_with("events/images/event-"));
        assert!(key.ends_with(".jpg"));
    }
}
