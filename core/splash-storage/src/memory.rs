//! Process-local store.

use crate::{
    BackingStore, FieldMap, ListCriteria, ObserverSlot, Record, RecordPage, StorageError,
    StorageResult, StoreAction, StoreObserver,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

type Key = (String, u64);

#[derive(Debug, Default)]
struct State {
    records: BTreeMap<Key, FieldMap>,
    meta: BTreeMap<Key, BTreeMap<String, String>>,
    next_ids: HashMap<String, u64>,
}

/// In-memory [`BackingStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    observer: ObserverSlot,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records of a kind.
    pub fn count(&self, kind: &str) -> usize {
        self.lock().records.keys().filter(|(k, _)| k == kind).count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BackingStore for MemoryStore {
    fn get(&self, kind: &str, id: u64) -> StorageResult<Option<Record>> {
        let state = self.lock();
        Ok(state
            .records
            .get(&(kind.to_string(), id))
            .map(|fields| Record::new(kind, id, fields.clone())))
    }

    fn list(&self, kind: &str, criteria: &ListCriteria) -> StorageResult<RecordPage> {
        let state = self.lock();
        let mut matching: Vec<Record> = state
            .records
            .iter()
            .filter(|((k, _), _)| k == kind)
            .map(|((_, id), fields)| Record::new(kind, *id, fields.clone()))
            .filter(|r| criteria.matches(r))
            .collect();
        matching.sort_by(|a, b| criteria.compare(a, b));

        let total = matching.len();
        let records = matching
            .into_iter()
            .skip(criteria.offset)
            .take(criteria.limit)
            .collect();
        Ok(RecordPage { records, total })
    }

    fn insert(&self, kind: &str, fields: FieldMap) -> StorageResult<Record> {
        let record = {
            let mut state = self.lock();
            let next = state.next_ids.entry(kind.to_string()).or_insert(1);
            let id = *next;
            *next += 1;
            state.records.insert((kind.to_string(), id), fields.clone());
            Record::new(kind, id, fields)
        };
        debug!("inserted {kind} #{}", record.id);
        self.observer.emit(kind, record.id, StoreAction::Created);
        Ok(record)
    }

    fn update(&self, record: &Record) -> StorageResult<bool> {
        let changed = {
            let mut state = self.lock();
            let Some(stored) = state.records.get_mut(&(record.kind.clone(), record.id)) else {
                return Err(StorageError::NotFound {
                    kind: record.kind.clone(),
                    id: record.id,
                });
            };
            let changed = *stored != record.fields;
            if changed {
                *stored = record.fields.clone();
            }
            changed
        };
        self.observer.emit(&record.kind, record.id, StoreAction::Updated);
        Ok(changed)
    }

    fn delete(&self, kind: &str, id: u64) -> StorageResult<bool> {
        let existed = {
            let mut state = self.lock();
            let key = (kind.to_string(), id);
            state.meta.remove(&key);
            state.records.remove(&key).is_some()
        };
        if existed {
            self.observer.emit(kind, id, StoreAction::Deleted);
        }
        Ok(existed)
    }

    fn get_meta(&self, kind: &str, id: u64, key: &str) -> StorageResult<Option<String>> {
        let state = self.lock();
        Ok(state
            .meta
            .get(&(kind.to_string(), id))
            .and_then(|m| m.get(key))
            .cloned())
    }

    fn set_meta(&self, kind: &str, id: u64, key: &str, value: &str) -> StorageResult<bool> {
        let mut state = self.lock();
        let record_key = (kind.to_string(), id);
        if !state.records.contains_key(&record_key) {
            return Err(StorageError::NotFound {
                kind: kind.to_string(),
                id,
            });
        }
        let meta = state.meta.entry(record_key).or_default();
        if meta.get(key).map(String::as_str) == Some(value) {
            return Ok(false);
        }
        meta.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    fn delete_meta(&self, kind: &str, id: u64, key: &str) -> StorageResult<bool> {
        let mut state = self.lock();
        Ok(state
            .meta
            .get_mut(&(kind.to_string(), id))
            .and_then(|m| m.remove(key))
            .is_some())
    }

    fn record_meta(&self, kind: &str, id: u64) -> StorageResult<BTreeMap<String, String>> {
        let state = self.lock();
        Ok(state
            .meta
            .get(&(kind.to_string(), id))
            .cloned()
            .unwrap_or_default())
    }

    fn meta_keys(&self, kind: &str) -> StorageResult<Vec<String>> {
        let state = self.lock();
        let keys: BTreeSet<&String> = state
            .meta
            .iter()
            .filter(|((k, _), _)| k == kind)
            .flat_map(|(_, m)| m.keys())
            .collect();
        Ok(keys.into_iter().cloned().collect())
    }

    fn set_observer(&self, observer: Arc<dyn StoreObserver>) {
        self.observer.set(observer);
    }
}
