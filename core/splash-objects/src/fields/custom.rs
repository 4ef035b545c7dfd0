use super::{read_meta, write_meta, FieldHandler};
use crate::{FieldError, FieldResult, ObjectHandle};
use serde_json::Value;
use splash_model::{FieldType, FieldsFactory};
use splash_storage::BackingStore;
use std::sync::Arc;
use tracing::{debug, warn};

const PREFIX: &str = "meta_";

/// Exposes unmapped metadata keys as free-text fields.
///
/// The key set is taken from the store when the schema is built; keys added
/// later appear only in a fresh schema cache.
pub struct CustomMetaFields {
    store: Arc<dyn BackingStore>,
    kind: String,
    excluded: Vec<String>,
}

impl CustomMetaFields {
    /// `excluded` holds the keys other modules of the adapter already map.
    pub fn new(store: Arc<dyn BackingStore>, kind: &str, excluded: Vec<String>) -> Self {
        Self {
            store,
            kind: kind.to_string(),
            excluded,
        }
    }

    fn is_custom(&self, key: &str) -> bool {
        !key.is_empty() && !key.starts_with('_') && !self.excluded.iter().any(|k| k == key)
    }

    fn key<'a>(&self, field_id: &'a str) -> FieldResult<&'a str> {
        field_id
            .strip_prefix(PREFIX)
            .filter(|key| self.is_custom(key))
            .ok_or_else(|| FieldError::invalid(field_id, "not a custom field"))
    }
}

impl FieldHandler for CustomMetaFields {
    fn name(&self) -> &'static str {
        "custom-meta"
    }

    fn declare(&self, factory: &mut FieldsFactory) {
        let keys = match self.store.meta_keys(&self.kind) {
            Ok(keys) => keys,
            Err(e) => {
                warn!("custom fields of {} unavailable: {e}", self.kind);
                return;
            }
        };
        let mut declared = 0;
        for key in keys.iter().filter(|k| self.is_custom(k)) {
            factory
                .create(FieldType::Varchar)
                .identifier(&format!("{PREFIX}{key}"))
                .name(key)
                .group("Custom fields")
                .is_not_tested();
            declared += 1;
        }
        debug!("{declared} custom fields declared for {}", self.kind);
    }

    fn claims(&self, field_id: &str) -> bool {
        field_id
            .strip_prefix(PREFIX)
            .is_some_and(|key| self.is_custom(key))
    }

    fn get(
        &self,
        store: &dyn BackingStore,
        handle: &ObjectHandle,
        field_id: &str,
    ) -> FieldResult<Option<Value>> {
        let key = self.key(field_id)?;
        read_meta(store, handle, key, field_id)
    }

    fn set(
        &self,
        store: &dyn BackingStore,
        handle: &mut ObjectHandle,
        field_id: &str,
        value: Value,
    ) -> FieldResult<()> {
        let key = self.key(field_id)?;
        write_meta(store, handle, key, field_id, &value)
    }
}
