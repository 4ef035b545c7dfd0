use crate::EntitySchema;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Build-once schema cache keyed by object type.
///
/// The builder runs under the cache lock, so two callers racing on a cold
/// entry get the same `Arc` and the builder runs exactly once. Schemas are
/// never evicted; they live as long as the cache.
#[derive(Debug, Default)]
pub struct SchemaCache {
    schemas: Mutex<HashMap<String, Arc<EntitySchema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached schema, building it on first use.
    pub fn get_or_build<F>(&self, object_type: &str, build: F) -> Arc<EntitySchema>
    where
        F: FnOnce() -> EntitySchema,
    {
        let mut schemas = self.schemas.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(schema) = schemas.get(object_type) {
            return Arc::clone(schema);
        }
        let schema = Arc::new(build());
        debug!(
            "built schema for {object_type} ({} fields)",
            schema.fields.len()
        );
        schemas.insert(object_type.to_string(), Arc::clone(&schema));
        schema
    }

    pub fn get(&self, object_type: &str) -> Option<Arc<EntitySchema>> {
        self.schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(object_type)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
