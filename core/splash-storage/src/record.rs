use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Column values of a record.
pub type FieldMap = BTreeMap<String, Value>;

/// One backing record: a kind, a numeric id and its column values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub kind: String,
    pub id: u64,
    pub fields: FieldMap,
}

impl Record {
    pub fn new(kind: impl Into<String>, id: u64, fields: FieldMap) -> Self {
        Self {
            kind: kind.into(),
            id,
            fields,
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// String value of a column; non-string scalars are not coerced.
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(Value::as_str)
    }

    /// Sets a column and reports whether the stored value changed.
    /// Writing `null` removes the column.
    pub fn set(&mut self, column: &str, value: Value) -> bool {
        if value.is_null() {
            return self.fields.remove(column).is_some();
        }
        if self.fields.get(column) == Some(&value) {
            return false;
        }
        self.fields.insert(column.to_string(), value);
        true
    }
}
