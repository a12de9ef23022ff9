//! # Local Filesystem Asset Store

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use super::backend::AssetStore;
use super::errors::{StorageError, StorageResult};

const PARTIAL_SUFFIX: &str = ".partial";

/// Filesystem-backed asset store rooted at a directory.
///
/// Writes land in a temp file first and are renamed into place, so a
/// reader never observes a half-written asset under its final key.
#[derive(Debug)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    /// Create a new local store
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn map_missing(key: &str, e: std::io::Error) -> StorageError {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::ObjectNotFound(key.to_string())
        } else {
            StorageError::IoError(e.to_string())
        }
    }

    fn collect(&self, dir: &Path, out: &mut Vec<String>) -> StorageResult<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                self.collect(&path, out)?;
                continue;
            }
            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            let key = relative
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect::<Vec<_>>()
                .join("/");
            if !key.ends_with(PARTIAL_SUFFIX) {
                out.push(key);
            }
        }
        Ok(())
    }
}

/// Reject keys that would escape the store root.
fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains('\\') || key.ends_with(PARTIAL_SUFFIX) {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    let path = Path::new(key);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

impl AssetStore for LocalAssetStore {
    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.full_path(key)?.is_file())
    }

    fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let full_path = self.full_path(key)?;
        fs::read(&full_path).map_err(|e| Self::map_missing(key, e))
    }

    fn write(&self, key: &str, data: &[u8]) -> StorageResult<String> {
        let full_path = self.full_path(key)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // fixed-length sibling name, so any key that fits NAME_MAX can be written
        let temp_path = full_path.with_file_name(format!(".{}{}", Uuid::new_v4().simple(), PARTIAL_SUFFIX));

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        let written = file.write_all(data).and_then(|_| file.sync_all());
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &full_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        if let Some(parent) = full_path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(key.to_string())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let full_path = self.full_path(key)?;
        fs::remove_file(&full_path).map_err(|e| Self::map_missing(key, e))
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        if self.root.is_dir() {
            self.collect(&self.root, &mut keys)?;
        }
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }
}
