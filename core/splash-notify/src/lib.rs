//! Change notification for the Splash bridge.
//!
//! When a backing record changes outside of a synchronization request, the
//! sync engine must be told so it can pull the new state. This crate turns
//! store lifecycle events into commit notifications:
//!
//! 1. The store reports an event to [`ChangeNotifier`] (a `StoreObserver`)
//! 2. The notifier maps the record to every object it projects (a user is a
//!    ThirdParty and two Addresses) and queues one [`CommitNotification`]
//!    per object type
//! 3. Events on objects held in the [`LockRegistry`] are dropped; the
//!    engine is writing them right now and echoing the change back would
//!    loop forever
//! 4. [`ChangeNotifier::flush`] hands the queue to the [`SyncEngine`] and
//!    moves the engine's pending messages into the [`NoticeStore`]

mod commit;
mod engine;
mod error;
mod locks;
mod notice;
mod notifier;

pub use commit::{CommitAction, CommitNotification};
pub use engine::{MemorySyncEngine, SyncEngine};
pub use error::{NotifyError, NotifyResult};
pub use locks::{LockGuard, LockRegistry, NEW_OBJECT};
pub use notice::{FileNoticeStore, MemoryNoticeStore, Notice, NoticeLevel, NoticeStore};
pub use notifier::{ChangeNotifier, NotifyRoute};
