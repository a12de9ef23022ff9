//! Schema registry
//!
//! Holds the declared schema of every record type and answers
//! introspection queries. Schemas come from `*.json` files in a directory
//! or from Rust types implementing [`DescribeRecord`].

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::errors::{SchemaError, SchemaResult};
use super::introspector::SchemaIntrospector;
use super::types::{AssetFieldDescriptor, FieldKind, RecordSchema, RelationFieldDescriptor};

/// Implemented by host record types that declare their own schema.
pub trait DescribeRecord {
    fn describe() -> RecordSchema;
}

/// In-memory registry of record schemas keyed by record type.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, RecordSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.json` schema file in `dir`, in file name order.
    ///
    /// A missing directory yields an empty registry; an unreadable or
    /// malformed file fails the whole load.
    pub fn load_dir(dir: &Path) -> SchemaResult<Self> {
        let mut registry = Self::new();
        if !dir.exists() {
            return Ok(registry);
        }

        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::malformed(dir.display().to_string(), format!("Failed to read schema directory: {}", e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(dir.display().to_string(), format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            registry.load_file(&path)?;
        }

        debug!(schemas = registry.len(), dir = %dir.display(), "schemas loaded");
        Ok(registry)
    }

    fn load_file(&mut self, path: &Path) -> SchemaResult<()> {
        let origin = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| SchemaError::malformed(origin.clone(), format!("Failed to read file: {}", e)))?;

        let schema: RecordSchema = serde_json::from_str(&content)
            .map_err(|e| SchemaError::malformed(origin.clone(), format!("Invalid JSON: {}", e)))?;

        self.insert(schema, &origin)
    }

    /// Registers a schema directly.
    pub fn register(&mut self, schema: RecordSchema) -> SchemaResult<()> {
        self.insert(schema, "<in-memory>")
    }

    /// Registers the schema a Rust type declares for itself.
    pub fn register_type<T: DescribeRecord>(&mut self) -> SchemaResult<()> {
        self.register(T::describe())
    }

    fn insert(&mut self, schema: RecordSchema, origin: &str) -> SchemaResult<()> {
        schema
            .validate_structure()
            .map_err(|reason| SchemaError::malformed(origin, reason))?;

        if self.schemas.contains_key(&schema.record_type) {
            return Err(SchemaError::DuplicateRecordType(schema.record_type));
        }
        self.schemas.insert(schema.record_type.clone(), schema);
        Ok(())
    }

    pub fn get(&self, record_type: &str) -> SchemaResult<&RecordSchema> {
        self.schemas
            .get(record_type)
            .ok_or_else(|| SchemaError::UnknownRecordType(record_type.to_string()))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl SchemaIntrospector for SchemaRegistry {
    fn asset_fields(&self, record_type: &str) -> SchemaResult<Vec<AssetFieldDescriptor>> {
        let schema = self.get(record_type)?;
        Ok(schema
            .fields
            .iter()
            .filter_map(|(name, def)| match &def.kind {
                FieldKind::Asset { upload_to } => Some(AssetFieldDescriptor {
                    name: name.clone(),
                    upload_to: upload_to.clone(),
                    base_name: schema.asset_base_name.clone(),
                }),
                _ => None,
            })
            .collect())
    }

    fn relation_collection_fields(&self, record_type: &str) -> SchemaResult<Vec<RelationFieldDescriptor>> {
        let schema = self.get(record_type)?;
        let mut relations = Vec::new();
        for (name, def) in &schema.fields {
            if let FieldKind::RelationCollection { target, foreign_key } = &def.kind {
                if !self.schemas.contains_key(target) {
                    return Err(SchemaError::malformed(
                        record_type,
                        format!("field '{}' targets unregistered record type '{}'", name, target),
                    ));
                }
                relations.push(RelationFieldDescriptor {
                    name: name.clone(),
                    target: target.clone(),
                    foreign_key: foreign_key.clone(),
                });
            }
        }
        Ok(relations)
    }
}
