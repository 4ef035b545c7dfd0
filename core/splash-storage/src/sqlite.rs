//! Persistent store backed by SQLite.
//!
//! Records keep their columns as one JSON document; sorting and searching
//! go through `json_extract`. Ids come from a per-kind sequence table so a
//! deleted id is never handed out again.

use crate::{
    BackingStore, FieldMap, ListCriteria, ObserverSlot, Record, RecordPage, StorageError,
    StorageResult, StoreAction, StoreObserver,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// SQLite-backed [`BackingStore`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
    observer: ObserverSlot,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        info!("opened sqlite store at {}", path.display());
        Self::with_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
            observer: ObserverSlot::default(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StorageResult<()> {
        self.lock().execute_batch(
            "
            CREATE TABLE IF NOT EXISTS records (
                kind TEXT NOT NULL,
                id INTEGER NOT NULL,
                fields TEXT NOT NULL,
                PRIMARY KEY (kind, id)
            );

            CREATE TABLE IF NOT EXISTS record_meta (
                kind TEXT NOT NULL,
                record_id INTEGER NOT NULL,
                meta_key TEXT NOT NULL,
                meta_value TEXT NOT NULL,
                UNIQUE (kind, record_id, meta_key)
            );

            CREATE TABLE IF NOT EXISTS sequences (
                kind TEXT PRIMARY KEY,
                next_id INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn exists(conn: &Connection, kind: &str, id: u64) -> StorageResult<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM records WHERE kind = ?1 AND id = ?2",
                params![kind, to_sql_id(id)?],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

fn to_sql_id(id: u64) -> StorageResult<i64> {
    i64::try_from(id).map_err(|_| StorageError::InvalidData(format!("id {id} out of range")))
}

fn from_sql_id(id: i64) -> StorageResult<u64> {
    u64::try_from(id).map_err(|_| StorageError::InvalidData(format!("negative id {id}")))
}

fn json_path(column: &str) -> String {
    format!("$.\"{}\"", column.replace('"', ""))
}

fn decode_fields(raw: &str) -> StorageResult<FieldMap> {
    Ok(serde_json::from_str(raw)?)
}

impl BackingStore for SqliteStore {
    fn get(&self, kind: &str, id: u64) -> StorageResult<Option<Record>> {
        let conn = self.lock();
        let raw: Option<String> = conn
            .query_row(
                "SELECT fields FROM records WHERE kind = ?1 AND id = ?2",
                params![kind, to_sql_id(id)?],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(raw) => Ok(Some(Record::new(kind, id, decode_fields(&raw)?))),
            None => Ok(None),
        }
    }

    fn list(&self, kind: &str, criteria: &ListCriteria) -> StorageResult<RecordPage> {
        let conn = self.lock();

        let mut where_sql = String::from("kind = ?");
        let mut args: Vec<String> = vec![kind.to_string()];
        if let Some(needle) = criteria.needle() {
            if criteria.search_columns.is_empty() {
                // Nothing searchable: nothing matches.
                return Ok(RecordPage::default());
            }
            let clauses: Vec<&str> = criteria
                .search_columns
                .iter()
                .map(|_| "instr(LOWER(CAST(json_extract(fields, ?) AS TEXT)), ?) > 0")
                .collect();
            where_sql.push_str(&format!(" AND ({})", clauses.join(" OR ")));
            for column in &criteria.search_columns {
                args.push(json_path(column));
                args.push(needle.clone());
            }
        }

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM records WHERE {where_sql}"),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let direction = if criteria.descending { "DESC" } else { "ASC" };
        let order_sql = if criteria.sort_column == "id" {
            format!("id {direction}")
        } else {
            args.push(json_path(&criteria.sort_column));
            format!("json_extract(fields, ?) {direction}, id {direction}")
        };
        let sql = format!(
            "SELECT id, fields FROM records WHERE {where_sql} ORDER BY {order_sql} LIMIT {} OFFSET {}",
            i64::try_from(criteria.limit).unwrap_or(i64::MAX),
            i64::try_from(criteria.offset).unwrap_or(i64::MAX)
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let records = rows
            .into_iter()
            .map(|(id, raw)| -> StorageResult<Record> {
                Ok(Record::new(kind, from_sql_id(id)?, decode_fields(&raw)?))
            })
            .collect::<StorageResult<Vec<_>>>()?;

        Ok(RecordPage {
            records,
            total: usize::try_from(total).unwrap_or_default(),
        })
    }

    fn insert(&self, kind: &str, fields: FieldMap) -> StorageResult<Record> {
        let raw = serde_json::to_string(&fields)?;
        let id = {
            let mut conn = self.lock();
            let tx = conn.transaction()?;
            let next: Option<i64> = tx
                .query_row(
                    "SELECT next_id FROM sequences WHERE kind = ?1",
                    params![kind],
                    |row| row.get(0),
                )
                .optional()?;
            let id = next.unwrap_or(1);
            tx.execute(
                "INSERT OR REPLACE INTO sequences (kind, next_id) VALUES (?1, ?2)",
                params![kind, id + 1],
            )?;
            tx.execute(
                "INSERT INTO records (kind, id, fields) VALUES (?1, ?2, ?3)",
                params![kind, id, raw],
            )?;
            tx.commit()?;
            from_sql_id(id)?
        };
        debug!("inserted {kind} #{id}");
        self.observer.emit(kind, id, StoreAction::Created);
        Ok(Record::new(kind, id, fields))
    }

    fn update(&self, record: &Record) -> StorageResult<bool> {
        let changed = {
            let conn = self.lock();
            let id = to_sql_id(record.id)?;
            let stored: Option<String> = conn
                .query_row(
                    "SELECT fields FROM records WHERE kind = ?1 AND id = ?2",
                    params![record.kind, id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(stored) = stored else {
                return Err(StorageError::NotFound {
                    kind: record.kind.clone(),
                    id: record.id,
                });
            };
            let changed = decode_fields(&stored)? != record.fields;
            if changed {
                conn.execute(
                    "UPDATE records SET fields = ?1 WHERE kind = ?2 AND id = ?3",
                    params![serde_json::to_string(&record.fields)?, record.kind, id],
                )?;
            }
            changed
        };
        self.observer.emit(&record.kind, record.id, StoreAction::Updated);
        Ok(changed)
    }

    fn delete(&self, kind: &str, id: u64) -> StorageResult<bool> {
        let existed = {
            let conn = self.lock();
            let sql_id = to_sql_id(id)?;
            conn.execute(
                "DELETE FROM record_meta WHERE kind = ?1 AND record_id = ?2",
                params![kind, sql_id],
            )?;
            conn.execute(
                "DELETE FROM records WHERE kind = ?1 AND id = ?2",
                params![kind, sql_id],
            )? > 0
        };
        if existed {
            self.observer.emit(kind, id, StoreAction::Deleted);
        }
        Ok(existed)
    }

    fn get_meta(&self, kind: &str, id: u64, key: &str) -> StorageResult<Option<String>> {
        let conn = self.lock();
        Ok(conn
            .query_row(
                "SELECT meta_value FROM record_meta WHERE kind = ?1 AND record_id = ?2 AND meta_key = ?3",
                params![kind, to_sql_id(id)?, key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set_meta(&self, kind: &str, id: u64, key: &str, value: &str) -> StorageResult<bool> {
        let conn = self.lock();
        if !Self::exists(&conn, kind, id)? {
            return Err(StorageError::NotFound {
                kind: kind.to_string(),
                id,
            });
        }
        let sql_id = to_sql_id(id)?;
        let current: Option<String> = conn
            .query_row(
                "SELECT meta_value FROM record_meta WHERE kind = ?1 AND record_id = ?2 AND meta_key = ?3",
                params![kind, sql_id, key],
                |row| row.get(0),
            )
            .optional()?;
        if current.as_deref() == Some(value) {
            return Ok(false);
        }
        conn.execute(
            "INSERT OR REPLACE INTO record_meta (kind, record_id, meta_key, meta_value) VALUES (?1, ?2, ?3, ?4)",
            params![kind, sql_id, key, value],
        )?;
        Ok(true)
    }

    fn delete_meta(&self, kind: &str, id: u64, key: &str) -> StorageResult<bool> {
        let conn = self.lock();
        let removed = conn.execute(
            "DELETE FROM record_meta WHERE kind = ?1 AND record_id = ?2 AND meta_key = ?3",
            params![kind, to_sql_id(id)?, key],
        )?;
        Ok(removed > 0)
    }

    fn record_meta(&self, kind: &str, id: u64) -> StorageResult<BTreeMap<String, String>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT meta_key, meta_value FROM record_meta WHERE kind = ?1 AND record_id = ?2",
        )?;
        let meta = stmt
            .query_map(params![kind, to_sql_id(id)?], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(meta)
    }

    fn meta_keys(&self, kind: &str) -> StorageResult<Vec<String>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT meta_key FROM record_meta WHERE kind = ?1 ORDER BY meta_key",
        )?;
        let keys = stmt
            .query_map(params![kind], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn set_observer(&self, observer: Arc<dyn StoreObserver>) {
        self.observer.set(observer);
    }
}
