use crate::{CommitNotification, Notice, NoticeLevel, NotifyError, NotifyResult};
use splash_types::Settings;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::debug;

/// The slice of the external sync engine the bridge calls back into.
pub trait SyncEngine: Send + Sync {
    /// Submits one commit notification.
    fn commit(&self, commit: &CommitNotification) -> NotifyResult<()>;

    /// Takes the log messages the engine accumulated since the last drain.
    fn drain_messages(&self) -> Vec<Notice>;

    /// Current configuration values.
    fn settings(&self) -> Settings;

    fn update_settings(&self, settings: Settings);
}

/// Engine that keeps everything in memory.
///
/// Stands in for the remote SDK in tests and in the command-line driver,
/// where committed notifications are printed instead of sent.
#[derive(Debug, Default)]
pub struct MemorySyncEngine {
    commits: Mutex<Vec<CommitNotification>>,
    messages: Mutex<Vec<Notice>>,
    settings: RwLock<Settings>,
    failing: AtomicBool,
}

impl MemorySyncEngine {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
            ..Self::default()
        }
    }

    /// Commits received so far.
    pub fn commits(&self) -> Vec<CommitNotification> {
        self.commits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Queues a message as if the engine had logged it.
    pub fn log(&self, level: NoticeLevel, message: impl Into<String>) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notice::new(level, message));
    }

    /// Makes every following commit fail (connection lost).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl SyncEngine for MemorySyncEngine {
    fn commit(&self, commit: &CommitNotification) -> NotifyResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            self.log(
                NoticeLevel::Error,
                format!("unable to commit {} {:?}", commit.object_type, commit.ids),
            );
            return Err(NotifyError::Engine("engine unreachable".into()));
        }
        debug!("commit {} {:?} ({})", commit.object_type, commit.ids, commit.action);
        self.commits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(commit.clone());
        Ok(())
    }

    fn drain_messages(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn settings(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_settings(&self, settings: Settings) {
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }
}
