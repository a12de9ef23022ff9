//! Per-save asset state: what was persisted, what the caller sent, and
//! what the record should hold afterwards.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::records::Record;
use crate::schema::AssetFieldDescriptor;

/// Asset keys persisted before the current save began.
///
/// Lives for a single save and is never persisted itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorState {
    keys: BTreeMap<String, String>,
}

impl PriorState {
    /// State of a record that has never been committed
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the asset keys of a persisted record
    pub fn capture(record: &Record, asset_fields: &[AssetFieldDescriptor]) -> Self {
        let keys = asset_fields
            .iter()
            .filter_map(|f| record.asset_key(&f.name).map(|k| (f.name.clone(), k.to_string())))
            .collect();
        Self { keys }
    }

    pub fn with(mut self, field: impl Into<String>, key: impl Into<String>) -> Self {
        self.keys.insert(field.into(), key.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.keys.get(field).map(String::as_str)
    }
}

/// A new binary payload for an asset field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUpload {
    /// Name the client uploaded the file under; supplies the extension
    pub file_name: String,
    pub data: Vec<u8>,
}

impl AssetUpload {
    pub fn new(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }
}

/// What the caller sent for one asset field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAsset {
    Upload(AssetUpload),
    /// Any non-binary value ("null", "None", "undefined", an old key...).
    /// Never clears the field; the prior key is kept.
    Marker(String),
}

/// Pending asset values of one save. Fields not present are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingAssets {
    values: BTreeMap<String, PendingAsset>,
}

impl PendingAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(mut self, field: impl Into<String>, upload: AssetUpload) -> Self {
        self.values.insert(field.into(), PendingAsset::Upload(upload));
        self
    }

    pub fn marker(mut self, field: impl Into<String>, marker: impl Into<String>) -> Self {
        self.values.insert(field.into(), PendingAsset::Marker(marker.into()));
        self
    }

    /// Collect markers from the asset fields of an incoming record payload.
    ///
    /// Clients that cannot send a binary for an asset field send a string
    /// or `null` instead; both end up as markers.
    pub fn with_markers_from(mut self, record: &Record, asset_fields: &[AssetFieldDescriptor]) -> Self {
        for field in asset_fields {
            if self.values.contains_key(&field.name) {
                continue;
            }
            let marker = match record.get(&field.name) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) => "null".to_string(),
                Some(other) => other.to_string(),
                None => continue,
            };
            self.values.insert(field.name.clone(), PendingAsset::Marker(marker));
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&PendingAsset> {
        self.values.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Final asset field values of one save
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAssets {
    values: BTreeMap<String, Option<String>>,
    /// Keys written during this save
    pub written: Vec<String>,
    /// Prior keys deleted after their replacement was stored
    pub deleted: Vec<String>,
}

impl ResolvedAssets {
    pub(crate) fn set(&mut self, field: &str, key: Option<String>) {
        self.values.insert(field.to_string(), key);
    }

    /// Resolved key of a field; `None` when empty or not an asset field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(|k| k.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values.iter().map(|(f, k)| (f.as_str(), k.as_deref()))
    }

    /// Overwrite every asset field of `record` with its resolved value
    pub fn apply_to(&self, record: &mut Record) {
        for (field, key) in &self.values {
            record.set_asset_key(field, key.clone());
        }
    }
}
