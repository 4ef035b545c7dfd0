use super::FieldHandler;
use crate::{FieldError, FieldResult, ObjectHandle};
use serde_json::Value;
use splash_model::{FieldType, FieldsFactory};
use splash_storage::BackingStore;
use splash_types::{IdCodec, ObjectId};

/// Where the owning user's id comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerSource {
    /// The backing record is the user itself.
    Record,
    /// A column holding the user's numeric id.
    Column(String),
}

/// Reference from an object to the user owning it.
#[derive(Debug, Clone)]
pub struct OwnerField {
    field_id: String,
    name: String,
    target_type: String,
    codec: IdCodec,
    source: OwnerSource,
    writable: bool,
}

impl OwnerField {
    /// `codec` encodes references to `target_type` objects.
    pub fn new(
        field_id: &str,
        name: &str,
        target_type: &str,
        codec: IdCodec,
        source: OwnerSource,
    ) -> Self {
        Self {
            field_id: field_id.to_string(),
            name: name.to_string(),
            target_type: target_type.to_string(),
            codec,
            source,
            writable: false,
        }
    }

    /// Accepts writes; only column-backed references can be writable.
    #[must_use]
    pub fn writable(mut self) -> Self {
        self.writable = matches!(self.source, OwnerSource::Column(_));
        self
    }

    fn owner_id(&self, handle: &ObjectHandle) -> Option<u64> {
        let id = match &self.source {
            OwnerSource::Record => Some(handle.backing_id()),
            OwnerSource::Column(column) => match handle.column(column)? {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            },
        };
        id.filter(|id| *id > 0)
    }
}

impl FieldHandler for OwnerField {
    fn name(&self) -> &'static str {
        "owner"
    }

    fn declare(&self, factory: &mut FieldsFactory) {
        factory
            .create(FieldType::ObjectId(self.target_type.clone()))
            .identifier(&self.field_id)
            .name(&self.name)
            .micro_data("http://schema.org/Organization", "ID")
            .is_listed();
        if !self.writable {
            factory.is_read_only();
        }
    }

    fn claims(&self, field_id: &str) -> bool {
        field_id == self.field_id
    }

    fn get(
        &self,
        _store: &dyn BackingStore,
        handle: &ObjectHandle,
        field_id: &str,
    ) -> FieldResult<Option<Value>> {
        let Some(id) = self.owner_id(handle) else {
            return Ok(None);
        };
        self.codec
            .encode(id, None)
            .map(|s| Some(Value::String(s)))
            .map_err(|e| FieldError::invalid(field_id, e.to_string()))
    }

    fn set(
        &self,
        _store: &dyn BackingStore,
        handle: &mut ObjectHandle,
        field_id: &str,
        value: Value,
    ) -> FieldResult<()> {
        let OwnerSource::Column(column) = &self.source else {
            return Err(FieldError::ReadOnly(field_id.to_string()));
        };
        if !self.writable {
            return Err(FieldError::ReadOnly(field_id.to_string()));
        }
        let owner = match value.as_str().unwrap_or_default() {
            "" => Value::Null,
            s => {
                let id: ObjectId = self
                    .codec
                    .decode(s)
                    .map_err(|e| FieldError::invalid(field_id, e.to_string()))?;
                Value::from(id.backing_id())
            }
        };
        handle.set_column(column, owner);
        Ok(())
    }
}
