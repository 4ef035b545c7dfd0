//! Store-and-forward notices.
//!
//! Messages produced during a synchronization pass are not rendered where
//! they happen. They are persisted here and shown once, on the next admin
//! page view, then cleared.

use crate::NotifyResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// One user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Persists notices until they are displayed.
pub trait NoticeStore: Send + Sync {
    fn push(&self, notices: Vec<Notice>) -> NotifyResult<()>;

    /// Returns pending notices without clearing them.
    fn peek(&self) -> NotifyResult<Vec<Notice>>;

    /// Returns and clears pending notices (render-once).
    fn take_all(&self) -> NotifyResult<Vec<Notice>>;
}

#[derive(Debug, Default)]
pub struct MemoryNoticeStore {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNoticeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoticeStore for MemoryNoticeStore {
    fn push(&self, notices: Vec<Notice>) -> NotifyResult<()> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(notices);
        Ok(())
    }

    fn peek(&self) -> NotifyResult<Vec<Notice>> {
        Ok(self
            .notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn take_all(&self) -> NotifyResult<Vec<Notice>> {
        Ok(std::mem::take(
            &mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner),
        ))
    }
}

/// Notice store kept in a JSON file, so notices survive a restart.
#[derive(Debug)]
pub struct FileNoticeStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    io: Mutex<()>,
}

impl FileNoticeStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            io: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> NotifyResult<Vec<Notice>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the file in one rename, so readers never see a partial write.
    fn write(&self, notices: &[Notice]) -> NotifyResult<()> {
        let staging = self.staging_path();
        std::fs::write(&staging, serde_json::to_string_pretty(notices)?)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl NoticeStore for FileNoticeStore {
    fn push(&self, notices: Vec<Notice>) -> NotifyResult<()> {
        if notices.is_empty() {
            return Ok(());
        }
        let _io = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stored = self.read()?;
        stored.extend(notices);
        self.write(&stored)
    }

    fn peek(&self) -> NotifyResult<Vec<Notice>> {
        let _io = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        self.read()
    }

    fn take_all(&self) -> NotifyResult<Vec<Notice>> {
        let _io = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        let stored = self.read()?;
        if !stored.is_empty() {
            self.write(&[])?;
        }
        Ok(stored)
    }
}
