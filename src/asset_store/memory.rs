//! # In-Memory Asset Store

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::backend::AssetStore;
use super::errors::{StorageError, StorageResult};

/// In-memory asset store for testing and embedding
#[derive(Debug, Default)]
pub struct InMemoryAssetStore {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::Internal("Lock poisoned".to_string())
}

impl AssetStore for InMemoryAssetStore {
    fn exists(&self, key: &str) -> StorageResult<bool> {
        let blobs = self.blobs.read().map_err(|_| poisoned())?;
        Ok(blobs.contains_key(key))
    }

    fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let blobs = self.blobs.read().map_err(|_| poisoned())?;
        blobs
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::ObjectNotFound(key.to_string()))
    }

    fn write(&self, key: &str, data: &[u8]) -> StorageResult<String> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        blobs.insert(key.to_string(), data.to_vec());
        Ok(key.to_string())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;
        blobs
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::ObjectNotFound(key.to_string()))
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let blobs = self.blobs.read().map_err(|_| poisoned())?;
        Ok(blobs
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
