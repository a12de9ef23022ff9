//! # Lifecycle Configuration
//!
//! Loaded from a JSON file. Every field is optional; an empty object
//! yields the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::asset_store::LocalAssetStore;
use crate::observability::LifecycleEvent;
use crate::schema::{SchemaError, SchemaRegistry};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Schema load failed: {0}")]
    Schema(#[from] SchemaError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Random key candidates tried before the counter fallback
    #[serde(default = "default_max_name_attempts")]
    pub max_name_attempts: u32,

    /// Counter-suffixed candidates tried after the random ones
    #[serde(default = "default_fallback_attempts")]
    pub fallback_attempts: u32,

    /// Re-read and checksum every write before it counts as stored
    #[serde(default = "default_verify_writes")]
    pub verify_writes: bool,

    #[serde(default = "default_max_cascade_depth")]
    pub max_cascade_depth: usize,

    /// Root directory of the filesystem asset store
    #[serde(default)]
    pub storage_root: Option<PathBuf>,

    /// Directory of `*.json` record schemas
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,
}

fn default_max_name_attempts() -> u32 {
    8
}
fn default_fallback_attempts() -> u32 {
    64
}
fn default_verify_writes() -> bool {
    true
}
fn default_max_cascade_depth() -> usize {
    16
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_name_attempts: default_max_name_attempts(),
            fallback_attempts: default_fallback_attempts(),
            verify_writes: default_verify_writes(),
            max_cascade_depth: default_max_cascade_depth(),
            storage_root: None,
            schema_dir: None,
        }
    }
}

impl LifecycleConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: LifecycleConfig = serde_json::from_str(&content)?;
        config.validate()?;

        info!(
            event = %LifecycleEvent::ConfigLoaded,
            path = %path.display(),
            max_name_attempts = config.max_name_attempts,
            verify_writes = config.verify_writes,
            "config loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_name_attempts == 0 {
            return Err(ConfigError::Invalid("max_name_attempts must be > 0".into()));
        }
        if self.max_cascade_depth == 0 {
            return Err(ConfigError::Invalid("max_cascade_depth must be > 0".into()));
        }
        Ok(())
    }

    /// Filesystem asset store rooted at `storage_root`
    pub fn open_local_store(&self) -> ConfigResult<LocalAssetStore> {
        let root = self
            .storage_root
            .clone()
            .ok_or_else(|| ConfigError::Invalid("storage_root is not set".into()))?;
        fs::create_dir_all(&root)?;
        Ok(LocalAssetStore::new(root))
    }

    /// Schemas from `schema_dir`, or an empty registry when unset
    pub fn load_schemas(&self) -> ConfigResult<SchemaRegistry> {
        match &self.schema_dir {
            Some(dir) => Ok(SchemaRegistry::load_dir(dir)?),
            None => Ok(SchemaRegistry::new()),
        }
    }
}
