//! Error types for the object layer.

use splash_storage::StorageError;
use splash_types::IdError;
use thiserror::Error;

/// Result type for object-level (CRUD) operations.
pub type ObjectResult<T> = Result<T, ObjectError>;

/// Result type for field-level operations.
pub type FieldResult<T> = Result<T, FieldError>;

/// Failures that abort a whole object operation.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// Identifier resolved (or failed to) but no record matches.
    #[error("object not found: {0}")]
    NotFound(String),

    /// An identifier could not be built for this adapter.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdError),

    /// Required fields missing or unusable on create.
    #[error("{object_type}: missing or invalid required fields {fields:?}")]
    Validation {
        object_type: String,
        fields: Vec<String>,
    },

    /// The operation never applies to this object type.
    #[error("{object_type}: {operation} is not permitted")]
    PermissionDenied {
        object_type: String,
        operation: &'static str,
    },

    /// No adapter registered under this name.
    #[error("unknown object type: {0}")]
    UnknownType(String),

    /// The backing store failed.
    #[error("storage error: {0}")]
    Store(#[from] StorageError),
}

/// Failures isolated to one field; the rest of the buffer still applies.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("field {0} is read-only")]
    ReadOnly(String),

    #[error("field {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("field {field}: storage error: {source}")]
    Store {
        field: String,
        #[source]
        source: StorageError,
    },
}

impl FieldError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Adapter for `map_err` on store calls made on behalf of a field.
    pub fn store(field: &str) -> impl FnOnce(StorageError) -> Self + '_ {
        move |source| Self::Store {
            field: field.to_string(),
            source,
        }
    }

    /// The field this error is about.
    pub fn field(&self) -> &str {
        match self {
            Self::ReadOnly(field) => field,
            Self::InvalidValue { field, .. } | Self::Store { field, .. } => field,
        }
    }
}
