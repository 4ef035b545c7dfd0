#![allow(dead_code)]

use serde_json::Value;
use splash_notify::{ChangeNotifier, CommitNotification, MemoryNoticeStore, MemorySyncEngine};
use splash_objects::{ObjectAdapter, ObjectRegistry, PendingFields, SyncContext};
use splash_storage::{BackingStore, MemoryStore};
use splash_types::Settings;
use std::sync::Arc;

/// A registry over a memory store, with change notifications wired in.
pub struct Bridge {
    pub store: Arc<MemoryStore>,
    pub engine: Arc<MemorySyncEngine>,
    pub notices: Arc<MemoryNoticeStore>,
    pub notifier: Arc<ChangeNotifier>,
    pub registry: ObjectRegistry,
}

impl Bridge {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self::over(Arc::new(MemoryStore::new()), settings)
    }

    /// Builds the registry over an already populated store.
    pub fn over(store: Arc<MemoryStore>, settings: Settings) -> Self {
        let engine = Arc::new(MemorySyncEngine::new(settings));
        let ctx = SyncContext::new(store.clone(), engine.clone());
        let registry = ObjectRegistry::with_defaults(ctx).expect("registry");
        let notices = Arc::new(MemoryNoticeStore::new());
        let notifier = Arc::new(registry.change_notifier(notices.clone()));
        store.set_observer(notifier.clone());
        Self {
            store,
            engine,
            notices,
            notifier,
            registry,
        }
    }

    pub fn adapter(&self, object_type: &str) -> Arc<dyn ObjectAdapter> {
        self.registry.adapter(object_type).expect("adapter")
    }

    /// Queued commits, dropping them from the queue.
    pub fn drain_pending(&self) -> Vec<CommitNotification> {
        let pending = self.notifier.pending();
        self.notifier.flush();
        pending
    }

    /// Creates a user locally and clears the resulting notifications.
    pub fn user(&self, email: &str) -> String {
        let mut input = fields(&[("email", email)]);
        let handle = self
            .adapter("ThirdParty")
            .create(&mut input)
            .expect("create user");
        self.drain_pending();
        handle.id().to_string()
    }

    /// Creates an order locally and clears the resulting notifications.
    pub fn order(&self, reference: &str) -> String {
        let mut input = fields(&[("reference", reference)]);
        let handle = self
            .adapter("Order")
            .create(&mut input)
            .expect("create order");
        self.drain_pending();
        handle.id().to_string()
    }
}

pub fn fields(pairs: &[(&str, &str)]) -> PendingFields {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
        .collect()
}
