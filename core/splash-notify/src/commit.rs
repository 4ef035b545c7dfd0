use serde::{Deserialize, Serialize};
use splash_storage::StoreAction;
use std::fmt;

/// Kind of change reported to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitAction {
    Create,
    Update,
    Delete,
}

impl From<StoreAction> for CommitAction {
    fn from(action: StoreAction) -> Self {
        match action {
            StoreAction::Created => Self::Create,
            StoreAction::Updated => Self::Update,
            StoreAction::Deleted => Self::Delete,
        }
    }
}

impl fmt::Display for CommitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "created"),
            Self::Update => write!(f, "updated"),
            Self::Delete => write!(f, "deleted"),
        }
    }
}

/// Tells the engine that local objects changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitNotification {
    pub object_type: String,
    /// Encoded object identifiers, one per view of the changed record.
    pub ids: Vec<String>,
    pub action: CommitAction,
    /// Local user the change is attributed to.
    pub origin: String,
    pub reason: String,
}
