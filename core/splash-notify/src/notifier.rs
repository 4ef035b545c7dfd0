use crate::{
    CommitAction, CommitNotification, LockRegistry, Notice, NoticeLevel, NoticeStore, SyncEngine,
};
use splash_storage::{StoreAction, StoreEvent, StoreObserver};
use splash_types::IdCodec;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Maps a backing kind to one synchronizable object type.
///
/// A record of `kind` projects one object of `object_type` per view (or a
/// single object when `views` is empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyRoute {
    pub kind: String,
    pub object_type: String,
    pub views: Vec<String>,
}

impl NotifyRoute {
    pub fn new(kind: &str, object_type: &str) -> Self {
        Self {
            kind: kind.to_string(),
            object_type: object_type.to_string(),
            views: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_views(mut self, views: &[&str]) -> Self {
        self.views = views.iter().map(|v| (*v).to_string()).collect();
        self
    }

    fn object_ids(&self, id: u64) -> Vec<String> {
        let codec = match IdCodec::new(self.kind.clone()) {
            Ok(codec) => codec,
            Err(e) => {
                warn!("route {} has an invalid kind: {e}", self.object_type);
                return Vec::new();
            }
        };
        if self.views.is_empty() {
            return codec.encode(id, None).into_iter().collect();
        }
        self.views
            .iter()
            .filter_map(|view| codec.encode(id, Some(view)).ok())
            .collect()
    }
}

/// Turns store lifecycle events into queued commit notifications.
pub struct ChangeNotifier {
    routes: Vec<NotifyRoute>,
    locks: Arc<LockRegistry>,
    engine: Arc<dyn SyncEngine>,
    notices: Arc<dyn NoticeStore>,
    queue: Mutex<VecDeque<CommitNotification>>,
}

impl ChangeNotifier {
    pub fn new(
        locks: Arc<LockRegistry>,
        engine: Arc<dyn SyncEngine>,
        notices: Arc<dyn NoticeStore>,
    ) -> Self {
        Self {
            routes: Vec::new(),
            locks,
            engine,
            notices,
            queue: Mutex::new(VecDeque::new()),
        }
    }

    #[must_use]
    pub fn with_route(mut self, route: NotifyRoute) -> Self {
        self.routes.push(route);
        self
    }

    pub fn routes(&self) -> &[NotifyRoute] {
        &self.routes
    }

    pub fn on_created(&self, kind: &str, id: u64) {
        self.handle(kind, id, StoreAction::Created);
    }

    pub fn on_updated(&self, kind: &str, id: u64) {
        self.handle(kind, id, StoreAction::Updated);
    }

    pub fn on_deleted(&self, kind: &str, id: u64) {
        self.handle(kind, id, StoreAction::Deleted);
    }

    /// Commits waiting for [`flush`](Self::flush).
    pub fn pending(&self) -> Vec<CommitNotification> {
        self.queue().iter().cloned().collect()
    }

    /// Delivers queued commits to the engine, then moves the engine's
    /// messages into the notice store. Returns the number of commits the
    /// engine accepted.
    pub fn flush(&self) -> usize {
        let batch: Vec<CommitNotification> = self.queue().drain(..).collect();
        let mut delivered = 0;
        let mut failures = Vec::new();
        for commit in &batch {
            match self.engine.commit(commit) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    error!("commit of {} {:?} failed: {e}", commit.object_type, commit.ids);
                    failures.push(Notice::new(
                        NoticeLevel::Error,
                        format!("{} {}: {e}", commit.object_type, commit.ids.join(", ")),
                    ));
                }
            }
        }
        if !batch.is_empty() {
            info!("flushed {delivered}/{} commit notifications", batch.len());
        }

        let mut notices = self.engine.drain_messages();
        notices.extend(failures);
        if let Err(e) = self.notices.push(notices) {
            warn!("unable to store notices: {e}");
        }
        delivered
    }

    fn handle(&self, kind: &str, id: u64, action: StoreAction) {
        let settings = self.engine.settings();
        if !settings.features.commits {
            debug!("commits disabled, ignoring {kind} #{id} {action}");
            return;
        }

        let targets: Vec<(&NotifyRoute, Vec<String>)> = self
            .routes
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| (r, r.object_ids(id)))
            .collect();
        if targets.is_empty() {
            return;
        }

        let locked = targets.iter().any(|(route, ids)| {
            ids.iter()
                .any(|oid| self.locks.is_locked(&route.object_type, oid))
        }) || (action == StoreAction::Created
            && targets
                .iter()
                .any(|(route, _)| self.locks.claim_creation(&route.object_type)));
        if locked {
            debug!("{kind} #{id} {action} while locked, notification suppressed");
            return;
        }

        let action = CommitAction::from(action);
        let mut queue = self.queue();
        for (route, ids) in targets {
            if ids.is_empty() {
                continue;
            }
            debug!("queued commit {} {:?} ({action})", route.object_type, ids);
            queue.push_back(CommitNotification {
                object_type: route.object_type.clone(),
                ids,
                action,
                origin: settings.operating_user.clone(),
                reason: format!("{} {action} locally", route.object_type),
            });
        }
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<CommitNotification>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StoreObserver for ChangeNotifier {
    fn on_event(&self, event: &StoreEvent) {
        self.handle(&event.kind, event.id, event.action);
    }
}
