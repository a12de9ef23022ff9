//! # Asset Store Trait

use super::errors::StorageResult;

/// Key/blob capability the lifecycle core writes assets through.
///
/// Implementations must tolerate concurrent calls on independent keys.
pub trait AssetStore: Send + Sync + std::fmt::Debug {
    /// Check if key exists
    fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Read the blob stored under key
    fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Write data under key, returning the key actually stored
    fn write(&self, key: &str, data: &[u8]) -> StorageResult<String>;

    /// Delete the blob stored under key
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// List keys starting with prefix, sorted.
    ///
    /// Not used by save or delete; exists for inspection, orphan audits
    /// and tests.
    fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;
}

impl<S: AssetStore + ?Sized> AssetStore for std::sync::Arc<S> {
    fn exists(&self, key: &str) -> StorageResult<bool> {
        (**self).exists(key)
    }

    fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, data: &[u8]) -> StorageResult<String> {
        (**self).write(key, data)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        (**self).delete(key)
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        (**self).list(prefix)
    }
}
