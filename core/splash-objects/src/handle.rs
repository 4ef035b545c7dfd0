use splash_storage::Record;
use splash_types::ObjectId;
use serde_json::Value;

/// Records which fields of a handle changed since the last reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyTracker {
    changed: Vec<String>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, field_id: &str) {
        if !self.changed.iter().any(|f| f == field_id) {
            self.changed.push(field_id.to_string());
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.changed.is_empty()
    }

    pub fn changed_fields(&self) -> &[String] {
        &self.changed
    }

    pub fn reset(&mut self) {
        self.changed.clear();
    }
}

/// One loaded object, owned by the operation working on it.
///
/// Holds a copy of the backing record; column writes land here and reach
/// the store on `update`. Metadata writes go straight to the store.
#[derive(Debug, Clone)]
pub struct ObjectHandle {
    object_type: String,
    id: ObjectId,
    record: Record,
    dirty: DirtyTracker,
}

impl ObjectHandle {
    pub fn new(object_type: impl Into<String>, id: ObjectId, record: Record) -> Self {
        Self {
            object_type: object_type.into(),
            id,
            record,
            dirty: DirtyTracker::new(),
        }
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// View of the backing record this object projects, if any.
    pub fn view(&self) -> Option<&str> {
        self.id.view()
    }

    pub fn backing_id(&self) -> u64 {
        self.record.id
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn column(&self, column: &str) -> Option<&Value> {
        self.record.get(column)
    }

    /// Stages a column value; returns whether it differs from the staged one.
    pub fn set_column(&mut self, column: &str, value: Value) -> bool {
        self.record.set(column, value)
    }

    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub(crate) fn dirty_mut(&mut self) -> &mut DirtyTracker {
        &mut self.dirty
    }
}
