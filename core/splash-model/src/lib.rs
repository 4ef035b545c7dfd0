//! Field schema model for the Splash bridge.
//!
//! Defines the declarative side of field synchronization:
//! - [`FieldDescriptor`]: one synchronizable attribute (identifier, semantic type, flags)
//! - [`FieldType`]: the semantic type that governs value normalization
//! - [`FieldsFactory`]: chained builder that field modules declare into
//! - [`EntitySchema`]: the ordered field list of one object type, plus its views
//! - [`SchemaCache`]: build-once cache of schemas keyed by object type
//!
//! Nothing here touches storage; the object adapters own the behaviour.

mod cache;
mod factory;
mod field_type;
mod schema;

pub use cache::SchemaCache;
pub use factory::FieldsFactory;
pub use field_type::{FieldType, DATETIME_FORMAT, DATE_FORMAT};
pub use schema::{EntitySchema, FieldChoice, FieldDescriptor, FieldFlags, MicroData};
