//! Backing-store contract for the Splash bridge.
//!
//! The bridge never owns its data: users and orders live in the host
//! application's store. This crate pins down what the bridge needs from that
//! store ([`BackingStore`]) and ships two implementations:
//!
//! - [`MemoryStore`]: process-local, used by tests and demos
//! - [`SqliteStore`]: persistent, used by the `splash-bridge` binary
//!
//! # Architecture
//!
//! - A [`Record`] is a numeric id plus a map of column values (JSON scalars)
//! - Each record also owns string metadata (key/value pairs), written
//!   independently of the record columns
//! - Stores report create/update/delete to an optional [`StoreObserver`],
//!   which is how change notifications reach the sync engine

mod error;
mod memory;
mod observer;
mod query;
mod record;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use observer::{ObserverSlot, StoreAction, StoreEvent, StoreObserver};
pub use query::{ListCriteria, RecordPage};
pub use record::{FieldMap, Record};
pub use sqlite::SqliteStore;

use std::collections::BTreeMap;
use std::sync::Arc;

/// What the bridge requires from the host's storage.
///
/// All methods are synchronous and blocking. Implementations must be safe
/// to share between threads; each call is independent (no transactions).
pub trait BackingStore: Send + Sync {
    /// Fetches one record.
    fn get(&self, kind: &str, id: u64) -> StorageResult<Option<Record>>;

    /// Filters, sorts and paginates records of a kind.
    fn list(&self, kind: &str, criteria: &ListCriteria) -> StorageResult<RecordPage>;

    /// Inserts a record and assigns it a fresh id. Ids are never reused.
    fn insert(&self, kind: &str, fields: FieldMap) -> StorageResult<Record>;

    /// Replaces the columns of an existing record.
    ///
    /// Returns `false` when the stored columns were already identical. The
    /// observer is notified either way; a missing record is `NotFound`.
    fn update(&self, record: &Record) -> StorageResult<bool>;

    /// Deletes a record and its metadata. Returns `false` if it did not exist.
    fn delete(&self, kind: &str, id: u64) -> StorageResult<bool>;

    fn get_meta(&self, kind: &str, id: u64, key: &str) -> StorageResult<Option<String>>;

    /// Writes one metadata value. Returns `false` when unchanged.
    fn set_meta(&self, kind: &str, id: u64, key: &str, value: &str) -> StorageResult<bool>;

    fn delete_meta(&self, kind: &str, id: u64, key: &str) -> StorageResult<bool>;

    /// All metadata of one record.
    fn record_meta(&self, kind: &str, id: u64) -> StorageResult<BTreeMap<String, String>>;

    /// Distinct metadata keys in use across all records of a kind, sorted.
    fn meta_keys(&self, kind: &str) -> StorageResult<Vec<String>>;

    /// Installs the lifecycle observer, replacing any previous one.
    fn set_observer(&self, observer: Arc<dyn StoreObserver>);
}
