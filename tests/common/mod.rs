//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use assetkeeper::asset_store::{AssetStore, InMemoryAssetStore, StorageError, StorageResult};
use assetkeeper::records::InMemoryRecordStore;
use assetkeeper::schema::{FieldDef, RecordSchema, SchemaRegistry};
use assetkeeper::{LifecycleConfig, RecordLifecycle};

/// One call observed by [`RecordingAssetStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Exists(String),
    Read(String),
    Write(String),
    Delete(String),
    List(String),
}

/// In-memory store that records every call in order
#[derive(Debug, Default)]
pub struct RecordingAssetStore {
    inner: InMemoryAssetStore,
    calls: Mutex<Vec<StoreCall>>,
}

impl RecordingAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn seed(&self, key: &str, data: &[u8]) {
        self.inner.write(key, data).unwrap();
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AssetStore for RecordingAssetStore {
    fn exists(&self, key: &str) -> StorageResult<bool> {
        self.record(StoreCall::Exists(key.to_string()));
        self.inner.exists(key)
    }

    fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.record(StoreCall::Read(key.to_string()));
        self.inner.read(key)
    }

    fn write(&self, key: &str, data: &[u8]) -> StorageResult<String> {
        self.record(StoreCall::Write(key.to_string()));
        self.inner.write(key, data)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.record(StoreCall::Delete(key.to_string()));
        self.inner.delete(key)
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.record(StoreCall::List(prefix.to_string()));
        self.inner.list(prefix)
    }
}

/// In-memory store with switchable write and delete failures
#[derive(Debug, Default)]
pub struct FailingAssetStore {
    pub inner: InMemoryAssetStore,
    fail_writes: Mutex<bool>,
    fail_deletes: Mutex<bool>,
    /// Fail writes after this many have succeeded
    writes_before_failure: Mutex<Option<usize>>,
}

impl FailingAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    pub fn fail_deletes(&self, fail: bool) {
        *self.fail_deletes.lock().unwrap() = fail;
    }

    pub fn fail_writes_after(&self, successes: usize) {
        *self.writes_before_failure.lock().unwrap() = Some(successes);
    }
}

impl AssetStore for FailingAssetStore {
    fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key)
    }

    fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, data: &[u8]) -> StorageResult<String> {
        if *self.fail_writes.lock().unwrap() {
            return Err(StorageError::Unavailable("write refused".into()));
        }
        let mut remaining = self.writes_before_failure.lock().unwrap();
        if let Some(n) = remaining.as_mut() {
            if *n == 0 {
                return Err(StorageError::Unavailable("write refused".into()));
            }
            *n -= 1;
        }
        self.inner.write(key, data)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        if *self.fail_deletes.lock().unwrap() {
            return Err(StorageError::Unavailable("delete refused".into()));
        }
        self.inner.delete(key)
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix)
    }
}

/// Event and contact-person schemas: events own contacts through an
/// `event` foreign key, both carry an image.
pub fn event_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry
        .register(
            RecordSchema::new("event")
                .with_base_name("event")
                .with_field("title", FieldDef::scalar())
                .with_field("event_image", FieldDef::asset())
                .with_field("contact_persons", FieldDef::relation_by_foreign_key("contact", "event")),
        )
        .unwrap();
    registry
        .register(
            RecordSchema::new("contact")
                .with_field("name", FieldDef::scalar())
                .with_field("event", FieldDef::scalar())
                .with_field("photo", FieldDef::asset()),
        )
        .unwrap();
    registry
}

pub type Lifecycle<S> = RecordLifecycle<S, SchemaRegistry, InMemoryRecordStore>;

pub fn lifecycle_over<S: AssetStore>(store: Arc<S>) -> (Lifecycle<S>, Arc<InMemoryRecordStore>) {
    let records = Arc::new(InMemoryRecordStore::new());
    let lifecycle = RecordLifecycle::new(
        store,
        Arc::new(event_registry()),
        Arc::clone(&records),
        &LifecycleConfig::default(),
    );
    (lifecycle, records)
}
