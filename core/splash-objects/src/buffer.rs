use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field values read from an object, keyed by field identifier.
pub type FieldValues = BTreeMap<String, Value>;

/// Field writes not yet claimed by any module.
///
/// Passed by `&mut` through the ordered module list; each module removes
/// the identifiers it handles. Keys still present afterwards were claimed by
/// nobody.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingFields {
    fields: BTreeMap<String, Value>,
}

impl PendingFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field_id: impl Into<String>, value: Value) {
        self.fields.insert(field_id.into(), value);
    }

    #[must_use]
    pub fn with(mut self, field_id: impl Into<String>, value: Value) -> Self {
        self.insert(field_id, value);
        self
    }

    pub fn get(&self, field_id: &str) -> Option<&Value> {
        self.fields.get(field_id)
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.fields.contains_key(field_id)
    }

    /// Claims a field: removes and returns its value.
    pub fn take(&mut self, field_id: &str) -> Option<Value> {
        self.fields.remove(field_id)
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for PendingFields {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl FromIterator<(String, Value)> for PendingFields {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
