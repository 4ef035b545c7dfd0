//! Per-object locks that mute change notifications.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Lock key standing for "an object of this type being created".
pub const NEW_OBJECT: &str = "new";

/// Tracks which objects the sync engine is currently writing.
///
/// Locks are counted, so nesting on the same object is fine, and released by
/// dropping the [`LockGuard`]; an early return or an error path cannot leave
/// an object locked.
#[derive(Debug, Default)]
pub struct LockRegistry {
    state: Mutex<LockState>,
}

#[derive(Debug, Default)]
struct LockState {
    held: HashMap<(String, String), usize>,
    /// Creations per type whose `Created` event has not been seen yet.
    unclaimed: HashMap<String, usize>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks one object until the guard is dropped.
    #[must_use = "the lock is released when the guard is dropped"]
    pub fn lock(&self, object_type: &str, object_id: &str) -> LockGuard<'_> {
        let key = (object_type.to_string(), object_id.to_string());
        *self.state().held.entry(key.clone()).or_insert(0) += 1;
        trace!("locked {}:{}", key.0, key.1);
        LockGuard {
            registry: self,
            key,
        }
    }

    /// Reserves one creation of `object_type` until the guard is dropped.
    ///
    /// The reservation covers a single record: the first `Created` event
    /// of the type claims it (see [`claim_creation`](Self::claim_creation)).
    /// Later writes to that record are covered by locking its id.
    #[must_use = "the lock is released when the guard is dropped"]
    pub fn lock_new(&self, object_type: &str) -> LockGuard<'_> {
        let guard = self.lock(object_type, NEW_OBJECT);
        *self
            .state()
            .unclaimed
            .entry(object_type.to_string())
            .or_insert(0) += 1;
        guard
    }

    pub fn is_locked(&self, object_type: &str, object_id: &str) -> bool {
        self.state()
            .held
            .contains_key(&(object_type.to_string(), object_id.to_string()))
    }

    pub fn is_creating(&self, object_type: &str) -> bool {
        self.is_locked(object_type, NEW_OBJECT)
    }

    /// Takes one unclaimed creation of `object_type`, if any.
    pub fn claim_creation(&self, object_type: &str) -> bool {
        let mut state = self.state();
        let Some(count) = state.unclaimed.get_mut(object_type) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            state.unclaimed.remove(object_type);
        }
        true
    }

    /// Number of distinct objects locked.
    pub fn len(&self) -> usize {
        self.state().held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, key: &(String, String)) {
        let mut state = self.state();
        let remaining = match state.held.get_mut(key) {
            Some(count) => {
                *count -= 1;
                *count
            }
            None => 0,
        };
        if remaining == 0 {
            state.held.remove(key);
        }
        if key.1 == NEW_OBJECT {
            // An unclaimed creation cannot outlive its reservation.
            let unclaimed = state.unclaimed.get(&key.0).copied().unwrap_or(0);
            if unclaimed > remaining {
                if remaining == 0 {
                    state.unclaimed.remove(&key.0);
                } else {
                    state.unclaimed.insert(key.0.clone(), remaining);
                }
            }
        }
        trace!("released {}:{}", key.0, key.1);
    }
}

/// Releases its lock on drop.
#[derive(Debug)]
pub struct LockGuard<'a> {
    registry: &'a LockRegistry,
    key: (String, String),
}

impl LockGuard<'_> {
    pub fn object_id(&self) -> &str {
        &self.key.1
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}
