//! Lifecycle events emitted by stores.
//!
//! This replaces implicit host hooks with an explicit registration: the
//! store calls its observer after every successful write, outside of any
//! internal lock, so observers may read the store back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// What happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreAction {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for StoreAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// A record lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEvent {
    pub kind: String,
    pub id: u64,
    pub action: StoreAction,
}

impl StoreEvent {
    pub fn new(kind: impl Into<String>, id: u64, action: StoreAction) -> Self {
        Self {
            kind: kind.into(),
            id,
            action,
        }
    }
}

/// Receives store lifecycle events.
pub trait StoreObserver: Send + Sync {
    fn on_event(&self, event: &StoreEvent);
}

/// Holder for an optional observer, shared by the store implementations.
#[derive(Default)]
pub struct ObserverSlot {
    observer: RwLock<Option<Arc<dyn StoreObserver>>>,
}

impl ObserverSlot {
    pub fn set(&self, observer: Arc<dyn StoreObserver>) {
        *self.observer.write().unwrap_or_else(PoisonError::into_inner) = Some(observer);
    }

    pub fn emit(&self, kind: &str, id: u64, action: StoreAction) {
        let observer = self
            .observer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(observer) = observer {
            observer.on_event(&StoreEvent::new(kind, id, action));
        }
    }
}

impl fmt::Debug for ObserverSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let installed = self
            .observer
            .read()
            .map(|o| o.is_some())
            .unwrap_or(false);
        f.debug_struct("ObserverSlot")
            .field("installed", &installed)
            .finish()
    }
}
