//! Field modules.
//!
//! An adapter is an ordered list of [`FieldHandler`]s sharing one field
//! namespace. Each handler declares its descriptors, claims identifiers and
//! reads / writes them against the handle or the store's metadata. Values
//! reaching [`FieldHandler::set`] are already validated, normalized and
//! known to differ from the persisted value.

mod address;
mod custom;
mod order;
mod owner;
mod user;

pub use address::{AddressFields, AddressStorage};
pub use custom::CustomMetaFields;
pub use order::OrderCoreFields;
pub use owner::{OwnerField, OwnerSource};
pub use user::{UserCoreFields, UserMetaFields};

use crate::{FieldError, FieldResult, ObjectHandle, PendingFields};
use serde_json::Value;
use splash_model::FieldsFactory;
use splash_storage::{BackingStore, FieldMap};

/// One field module of an object adapter.
pub trait FieldHandler: Send + Sync {
    /// Module name, for logs.
    fn name(&self) -> &'static str;

    /// Adds this module's descriptors to the schema being built.
    fn declare(&self, factory: &mut FieldsFactory);

    /// Whether this module owns `field_id`.
    fn claims(&self, field_id: &str) -> bool;

    fn get(
        &self,
        store: &dyn BackingStore,
        handle: &ObjectHandle,
        field_id: &str,
    ) -> FieldResult<Option<Value>>;

    fn set(
        &self,
        store: &dyn BackingStore,
        handle: &mut ObjectHandle,
        field_id: &str,
        value: Value,
    ) -> FieldResult<()>;

    /// Backing column of a field, used to sort and to insert required
    /// values on create. `None` for metadata or computed fields.
    fn column(&self, _field_id: &str) -> Option<&str> {
        None
    }

    /// Metadata keys this module maps; hidden from custom fields.
    fn meta_keys(&self) -> Vec<String> {
        Vec::new()
    }

    /// Fills create-time defaults into the record about to be inserted.
    /// Input consumed here is removed from `input`.
    fn prepare_create(&self, _input: &mut PendingFields, _fields: &mut FieldMap) {}
}

/// Metadata value as a field value.
pub(crate) fn read_meta(
    store: &dyn BackingStore,
    handle: &ObjectHandle,
    key: &str,
    field_id: &str,
) -> FieldResult<Option<Value>> {
    let value = store
        .get_meta(handle.record().kind.as_str(), handle.backing_id(), key)
        .map_err(FieldError::store(field_id))?;
    Ok(value.map(Value::String))
}

/// Writes a metadata key; null and empty strings remove it.
pub(crate) fn write_meta(
    store: &dyn BackingStore,
    handle: &ObjectHandle,
    key: &str,
    field_id: &str,
    value: &Value,
) -> FieldResult<()> {
    let kind = handle.record().kind.as_str();
    let id = handle.backing_id();
    let written = match meta_text(value) {
        None => store.delete_meta(kind, id, key),
        Some(text) => store.set_meta(kind, id, key, &text),
    };
    written.map(|_| ()).map_err(FieldError::store(field_id))
}

fn meta_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Looks a field id up in a static `(field_id, column)` table.
pub(crate) fn lookup<'a>(table: &'a [(&'a str, &'a str)], field_id: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(id, _)| *id == field_id)
        .map(|(_, column)| *column)
}
