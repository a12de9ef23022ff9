//! SHA-256 content checksums used to verify asset writes.

use sha2::{Digest, Sha256};

use super::backend::AssetStore;
use super::errors::{StorageError, StorageResult};

/// Calculate the hex SHA-256 of data
pub fn calculate_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Read key back from the store and compare it against the expected checksum.
pub fn verify_stored<S: AssetStore + ?Sized>(
    store: &S,
    key: &str,
    expected: &str,
) -> StorageResult<()> {
    let stored = store.read(key)?;
    if calculate_checksum(&stored) != expected {
        return Err(StorageError::ChecksumMismatch(key.to_string()));
    }
    Ok(())
}
