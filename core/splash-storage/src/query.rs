use crate::Record;
use serde_json::Value;
use std::cmp::Ordering;

/// Filter, sort and pagination for [`BackingStore::list`](crate::BackingStore::list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCriteria {
    /// Literal substring searched in `search_columns`, ignoring ASCII case.
    pub search: Option<String>,
    pub search_columns: Vec<String>,
    /// Column to sort by; `"id"` sorts by record id.
    pub sort_column: String,
    pub descending: bool,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ListCriteria {
    fn default() -> Self {
        Self {
            search: None,
            search_columns: Vec::new(),
            sort_column: "id".to_string(),
            descending: false,
            limit: 10,
            offset: 0,
        }
    }
}

impl ListCriteria {
    pub(crate) fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_ascii_lowercase)
    }

    pub(crate) fn matches(&self, record: &Record) -> bool {
        let Some(needle) = self.needle() else {
            return true;
        };
        self.search_columns.iter().any(|column| {
            record
                .get(column)
                .map(|v| scalar_text(v).to_ascii_lowercase().contains(&needle))
                .unwrap_or(false)
        })
    }

    pub(crate) fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ord = if self.sort_column == "id" {
            a.id.cmp(&b.id)
        } else {
            compare_values(a.get(&self.sort_column), b.get(&self.sort_column))
                .then(a.id.cmp(&b.id))
        };
        if self.descending { ord.reverse() } else { ord }
    }
}

/// One page of records plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordPage {
    pub records: Vec<Record>,
    pub total: usize,
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// Missing sorts first, then numbers, then everything else as text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Number(_)), Some(_)) => Ordering::Less,
        (Some(_), Some(Value::Number(_))) => Ordering::Greater,
        (Some(x), Some(y)) => scalar_text(x).cmp(&scalar_text(y)),
    }
}
