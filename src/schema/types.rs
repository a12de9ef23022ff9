//! Record schema declarations
//!
//! A record type declares which of its fields are asset-typed and which
//! are to-many relations. Everything else is a scalar the lifecycle core
//! never looks at.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Domain value, opaque to the lifecycle core
    Scalar,
    /// Reference to a blob in the asset store
    Asset {
        /// Key prefix for newly stored blobs (e.g. "events/images")
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upload_to: Option<String>,
    },
    /// To-many relation whose members are deleted with the parent
    RelationCollection {
        /// Record type of the members
        target: String,
        /// Member field pointing back at the parent id.
        /// When absent the parent field itself holds the member ids.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        foreign_key: Option<String>,
    },
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldDef {
    pub fn scalar() -> Self {
        Self { kind: FieldKind::Scalar }
    }

    /// Asset field stored at the root of the store
    pub fn asset() -> Self {
        Self {
            kind: FieldKind::Asset { upload_to: None },
        }
    }

    /// Asset field stored under a key prefix
    pub fn asset_under(upload_to: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Asset {
                upload_to: Some(upload_to.into()),
            },
        }
    }

    /// Relation whose members carry a foreign key to the parent
    pub fn relation_by_foreign_key(target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::RelationCollection {
                target: target.into(),
                foreign_key: Some(foreign_key.into()),
            },
        }
    }

    /// Relation whose member ids are held on the parent field
    pub fn relation_by_ids(target: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::RelationCollection {
                target: target.into(),
                foreign_key: None,
            },
        }
    }
}

/// Complete declaration of one record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Unique record type name
    pub record_type: String,
    /// Logical base name seeding asset keys (e.g. "event").
    /// Falls back to the uploaded file's stem when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_base_name: Option<String>,
    /// Field definitions, ordered by name
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDef>,
}

impl RecordSchema {
    pub fn new(record_type: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            asset_base_name: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.asset_base_name = Some(base_name.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    /// Validates the declaration itself (not a record)
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.record_type.trim().is_empty() {
            return Err("record_type must not be empty".into());
        }

        if let Some(base) = &self.asset_base_name {
            if base.trim().is_empty() || base.contains('/') {
                return Err(format!("invalid asset_base_name '{}'", base));
            }
        }

        for (name, def) in &self.fields {
            if name.trim().is_empty() {
                return Err("field names must not be empty".into());
            }
            match &def.kind {
                FieldKind::Scalar => {}
                FieldKind::Asset { upload_to } => {
                    if let Some(prefix) = upload_to {
                        let bad = prefix.starts_with('/')
                            || prefix.split('/').any(|seg| seg.is_empty() || seg == "..");
                        if bad {
                            return Err(format!("field '{}': invalid upload_to '{}'", name, prefix));
                        }
                    }
                }
                FieldKind::RelationCollection { target, foreign_key } => {
                    if target.trim().is_empty() {
                        return Err(format!("field '{}': relation target must not be empty", name));
                    }
                    if matches!(foreign_key, Some(fk) if fk.trim().is_empty()) {
                        return Err(format!("field '{}': foreign_key must not be empty", name));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Asset field as seen by the reconciler and cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFieldDescriptor {
    pub name: String,
    pub upload_to: Option<String>,
    /// Per-type base name, copied from the owning schema
    pub base_name: Option<String>,
}

/// To-many relation as seen by the cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationFieldDescriptor {
    pub name: String,
    pub target: String,
    pub foreign_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_schema() {
        let schema: RecordSchema = serde_json::from_value(json!({
            "record_type": "event",
            "asset_base_name": "event",
            "fields": {
                "title": {"kind": "scalar"},
                "event_image": {"kind": "asset", "upload_to": "events/images"},
                "contact_persons": {
                    "kind": "relation_collection",
                    "target": "event_contact_person",
                    "foreign_key": "event"
                }
            }
        }))
        .unwrap();

        assert_eq!(schema.fields.len(), 3);
        assert_eq!(schema.fields["event_image"], FieldDef::asset_under("events/images"));
        assert_eq!(
            schema.fields["contact_persons"],
            FieldDef::relation_by_foreign_key("event_contact_person", "event")
        );
        assert!(schema.validate_structure().is_ok());
    }

    #[test]
    fn test_rejects_bad_upload_to() {
        for prefix in ["/abs", "a/../b", "a//b", "trailing/"] {
            let schema = RecordSchema::new("event").with_field("img", FieldDef::asset_under(prefix));
            assert!(schema.validate_structure().is_err(), "prefix {:?}", prefix);
        }
    }

    #[test]
    fn test_rejects_empty_record_type() {
        assert!(RecordSchema::new("  ").validate_structure().is_err());
    }

    #[test]
    fn test_rejects_empty_relation_target() {
        let schema = RecordSchema::new("event").with_field("members", FieldDef::relation_by_ids(""));
        assert!(schema.validate_structure().is_err());
    }
}
