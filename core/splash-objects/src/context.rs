use splash_model::SchemaCache;
use splash_notify::{LockRegistry, SyncEngine};
use splash_storage::BackingStore;
use splash_types::Settings;
use std::sync::Arc;

/// Everything an adapter needs, handed over at construction.
///
/// There is no global state: two contexts over two stores are fully
/// independent, including their schema caches and locks.
#[derive(Clone)]
pub struct SyncContext {
    pub store: Arc<dyn BackingStore>,
    pub schemas: Arc<SchemaCache>,
    pub locks: Arc<LockRegistry>,
    pub engine: Arc<dyn SyncEngine>,
}

impl SyncContext {
    pub fn new(store: Arc<dyn BackingStore>, engine: Arc<dyn SyncEngine>) -> Self {
        Self {
            store,
            schemas: Arc::new(SchemaCache::new()),
            locks: Arc::new(LockRegistry::new()),
            engine,
        }
    }

    /// Current settings, read through the engine.
    pub fn settings(&self) -> Settings {
        self.engine.settings()
    }
}
