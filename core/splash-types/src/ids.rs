//! Composite object identifiers.
//!
//! The sync engine only ever sees one string per synchronizable object.
//! That string carries the backing kind, the numeric backing id and, for
//! objects that project several views out of one record (billing and
//! shipping addresses of a user), the view name:
//!
//! ```text
//! user-42            kind "user", id 42
//! user-billing-42    kind "user", view "billing", id 42
//! ```
//!
//! Segments are lowercase ASCII alphanumerics starting with a letter, the id
//! is a plain decimal without sign or leading zeros. Under these rules the
//! encoding is canonical: `encode(decode(s)) == s` for every accepted `s`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = '-';

/// Errors produced while decoding or building an identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("identifier is empty")]
    Empty,

    #[error("malformed identifier: {0}")]
    Malformed(String),

    #[error("invalid segment {0:?}: expected lowercase alphanumerics starting with a letter")]
    InvalidSegment(String),

    #[error("invalid backing id {0:?}")]
    InvalidNumber(String),

    #[error("identifier kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: String, found: String },
}

/// A decoded composite identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId {
    kind: String,
    view: Option<String>,
    backing_id: u64,
}

impl ObjectId {
    /// Builds a single-view identifier.
    pub fn new(kind: impl Into<String>, backing_id: u64) -> Result<Self, IdError> {
        let kind = kind.into();
        validate_segment(&kind)?;
        Ok(Self {
            kind,
            view: None,
            backing_id,
        })
    }

    /// Builds an identifier for one view of a backing record.
    pub fn with_view(
        kind: impl Into<String>,
        view: impl Into<String>,
        backing_id: u64,
    ) -> Result<Self, IdError> {
        let kind = kind.into();
        let view = view.into();
        validate_segment(&kind)?;
        validate_segment(&view)?;
        Ok(Self {
            kind,
            view: Some(view),
            backing_id,
        })
    }

    /// Backing kind discriminator (e.g. `user`, `order`).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// View discriminator, if this is a projected object.
    pub fn view(&self) -> Option<&str> {
        self.view.as_deref()
    }

    /// Numeric id of the backing record.
    #[must_use]
    pub const fn backing_id(&self) -> u64 {
        self.backing_id
    }

    /// Same backing record, another view.
    pub fn sibling(&self, view: &str) -> Result<Self, IdError> {
        Self::with_view(self.kind.clone(), view, self.backing_id)
    }

    /// Encodes to the wire string.
    pub fn encode(&self) -> String {
        match &self.view {
            Some(view) => format!("{}{SEPARATOR}{view}{SEPARATOR}{}", self.kind, self.backing_id),
            None => format!("{}{SEPARATOR}{}", self.kind, self.backing_id),
        }
    }

    /// Decodes a wire string. Never panics on malformed input.
    pub fn decode(s: &str) -> Result<Self, IdError> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        let parts: Vec<&str> = s.split(SEPARATOR).collect();
        match parts.as_slice() {
            [kind, id] => Self::new(*kind, parse_backing_id(id)?),
            [kind, view, id] => Self::with_view(*kind, *view, parse_backing_id(id)?),
            _ => Err(IdError::Malformed(s.to_string())),
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for ObjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::decode(&value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.encode()
    }
}

/// Codec bound to one backing kind.
///
/// Adapters hold one of these so that an identifier minted for another kind
/// (an order id handed to the user adapter) is rejected at decode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCodec {
    kind: String,
}

impl IdCodec {
    pub fn new(kind: impl Into<String>) -> Result<Self, IdError> {
        let kind = kind.into();
        validate_segment(&kind)?;
        Ok(Self { kind })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Encodes a backing id and optional view into a wire string.
    pub fn encode(&self, backing_id: u64, view: Option<&str>) -> Result<String, IdError> {
        self.object_id(backing_id, view).map(|id| id.encode())
    }

    /// Builds the typed identifier without encoding it.
    pub fn object_id(&self, backing_id: u64, view: Option<&str>) -> Result<ObjectId, IdError> {
        match view {
            Some(view) => ObjectId::with_view(self.kind.clone(), view, backing_id),
            None => ObjectId::new(self.kind.clone(), backing_id),
        }
    }

    /// Decodes a wire string, checking it belongs to this codec's kind.
    pub fn decode(&self, s: &str) -> Result<ObjectId, IdError> {
        let id = ObjectId::decode(s)?;
        if id.kind != self.kind {
            return Err(IdError::KindMismatch {
                expected: self.kind.clone(),
                found: id.kind,
            });
        }
        Ok(id)
    }
}

fn validate_segment(segment: &str) -> Result<(), IdError> {
    let mut chars = segment.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(IdError::InvalidSegment(segment.to_string()))
    }
}

fn parse_backing_id(s: &str) -> Result<u64, IdError> {
    let canonical = !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_digit())
        && (s == "0" || !s.starts_with('0'));
    if !canonical {
        return Err(IdError::InvalidNumber(s.to_string()));
    }
    s.parse().map_err(|_| IdError::InvalidNumber(s.to_string()))
}
