//! Field discovery seam between the lifecycle core and host metadata.

use std::sync::Arc;

use super::errors::SchemaResult;
use super::types::{AssetFieldDescriptor, RelationFieldDescriptor};

/// Enumerates the asset and relation-collection fields of a record type.
///
/// Implementations must be deterministic and free of side effects: the
/// same record type always yields the same descriptors in the same order.
pub trait SchemaIntrospector: Send + Sync {
    fn asset_fields(&self, record_type: &str) -> SchemaResult<Vec<AssetFieldDescriptor>>;

    fn relation_collection_fields(&self, record_type: &str) -> SchemaResult<Vec<RelationFieldDescriptor>>;
}

impl<I: SchemaIntrospector + ?Sized> SchemaIntrospector for Arc<I> {
    fn asset_fields(&self, record_type: &str) -> SchemaResult<Vec<AssetFieldDescriptor>> {
        (**self).asset_fields(record_type)
    }

    fn relation_collection_fields(&self, record_type: &str) -> SchemaResult<Vec<RelationFieldDescriptor>> {
        (**self).relation_collection_fields(record_type)
    }
}
