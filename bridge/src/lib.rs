//! Wiring and commands for the `splash-bridge` binary.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use serde_json::{json, Value};
use splash_notify::{
    ChangeNotifier, FileNoticeStore, MemorySyncEngine, Notice, NoticeLevel, NoticeStore,
};
use splash_objects::{ListParams, ObjectRegistry, PendingFields, SortOrder, SyncContext};
use splash_storage::{BackingStore, SqliteStore};
use splash_types::Settings;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the object types served
    Types,
    /// Print the field schema of an object type
    Schema { object_type: String },
    /// List objects of a type
    List {
        object_type: String,
        /// Case-insensitive text filter
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        max: Option<i64>,
        #[arg(long)]
        offset: Option<i64>,
        /// Field to sort by
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Read fields of one object (all fields when none are named)
    Get {
        object_type: String,
        id: String,
        fields: Vec<String>,
    },
    /// Write fields to an object, creating it when no id is given
    Set {
        object_type: String,
        id: Option<String>,
        /// JSON object of field id -> value
        #[arg(long)]
        json: String,
        /// Apply as a shop-side edit, notifying the sync engine
        #[arg(long)]
        local: bool,
    },
    /// Delete one object
    Delete { object_type: String, id: String },
    /// Print and clear stored notices
    Notices,
}

/// A registry over a SQLite shop database, with notifications wired in.
pub struct Bridge {
    registry: ObjectRegistry,
    engine: Arc<MemorySyncEngine>,
    notifier: Arc<ChangeNotifier>,
    notices: Arc<FileNoticeStore>,
}

impl Bridge {
    /// Opens the database at `db`; notices are kept next to it.
    pub fn open(db: &Path, settings: Settings) -> Result<Self> {
        let store = Arc::new(
            SqliteStore::open(db).with_context(|| format!("opening {}", db.display()))?,
        );
        let notices = Arc::new(FileNoticeStore::new(notices_path(db)));
        let engine = Arc::new(MemorySyncEngine::new(settings));
        let registry = ObjectRegistry::with_defaults(SyncContext::new(store.clone(), engine.clone()))?;
        let notifier = Arc::new(registry.change_notifier(notices.clone()));
        store.set_observer(notifier.clone());
        info!(
            "serving {} from {}",
            registry.object_types().join(", "),
            db.display()
        );
        Ok(Self {
            registry,
            engine,
            notifier,
            notices,
        })
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Runs one command and returns its JSON output.
    pub fn run(&self, command: Command) -> Result<Value> {
        debug!("running {command:?}");
        let output = match command {
            Command::Types => json!(self.registry.object_types()),
            Command::Schema { object_type } => {
                serde_json::to_value(&*self.registry.describe(&object_type)?)?
            }
            Command::List {
                object_type,
                filter,
                max,
                offset,
                sort,
                desc,
            } => {
                let params = ListParams {
                    max,
                    offset,
                    sort_field: sort,
                    sort_order: Some(if desc { SortOrder::Desc } else { SortOrder::Asc }),
                };
                serde_json::to_value(self.registry.list(&object_type, filter.as_deref(), &params)?)?
            }
            Command::Get {
                object_type,
                id,
                fields,
            } => {
                let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
                serde_json::to_value(self.registry.get(&object_type, &id, &fields)?)?
            }
            Command::Set {
                object_type,
                id,
                json,
                local,
            } => {
                let input: PendingFields =
                    serde_json::from_str(&json).context("--json must be a JSON object")?;
                if local {
                    self.set_local(&object_type, id.as_deref(), input)?
                } else {
                    self.set_remote(&object_type, id.as_deref(), input)?
                }
            }
            Command::Delete { object_type, id } => {
                json!({ "deleted": self.registry.delete(&object_type, &id)? })
            }
            Command::Notices => serde_json::to_value(self.notices.take_all()?)?,
        };
        Ok(output)
    }

    fn set_remote(&self, object_type: &str, id: Option<&str>, input: PendingFields) -> Result<Value> {
        let outcome = self.registry.set(object_type, id, input)?;
        let errors: Vec<String> = outcome.field_errors.iter().map(ToString::to_string).collect();
        self.warn(&errors)?;
        Ok(json!({
            "id": outcome.id.to_string(),
            "created": outcome.created,
            "errors": errors,
            "ignored": outcome.unclaimed,
            "commits": self.flush()?,
        }))
    }

    fn set_local(&self, object_type: &str, id: Option<&str>, mut input: PendingFields) -> Result<Value> {
        let adapter = self.registry.adapter(object_type)?;
        let (id, errors) = match id {
            Some(id) => {
                let mut handle = adapter.load(id)?;
                let errors = adapter.set_fields(&mut handle, &mut input);
                (adapter.update(&mut handle)?, errors)
            }
            None => (adapter.create(&mut input)?.id().clone(), Vec::new()),
        };
        let errors: Vec<String> = errors.iter().map(ToString::to_string).collect();
        self.warn(&errors)?;
        Ok(json!({
            "id": id.to_string(),
            "errors": errors,
            "ignored": input.field_ids().collect::<Vec<_>>(),
            "commits": self.flush()?,
        }))
    }

    fn warn(&self, errors: &[String]) -> Result<()> {
        let notices = errors
            .iter()
            .map(|e| Notice::new(NoticeLevel::Warning, e.clone()))
            .collect();
        self.notices.push(notices)?;
        Ok(())
    }

    /// Delivers queued commits and returns what the engine received.
    fn flush(&self) -> Result<Value> {
        let before = self.engine.commits().len();
        self.notifier.flush();
        let delivered: Vec<_> = self.engine.commits().into_iter().skip(before).collect();
        Ok(serde_json::to_value(delivered)?)
    }
}

/// Notices of `db` live in `<db>.notices.json`.
pub fn notices_path(db: &Path) -> PathBuf {
    let mut name = db.as_os_str().to_owned();
    name.push(".notices.json");
    PathBuf::from(name)
}

/// Settings from `path`, or defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    if !path.exists() {
        bail!("settings file {} not found", path.display());
    }
    Settings::load(path).with_context(|| format!("reading settings from {}", path.display()))
}
