//! Schema introspection for asset-bearing records
//!
//! The lifecycle core never hard-codes per-type knowledge. It asks a
//! [`SchemaIntrospector`] which fields hold assets and which fields are
//! to-many relations, and acts on the answer.

mod errors;
mod introspector;
mod registry;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use introspector::SchemaIntrospector;
pub use registry::{DescribeRecord, SchemaRegistry};
pub use types::{AssetFieldDescriptor, FieldDef, FieldKind, RecordSchema, RelationFieldDescriptor};
