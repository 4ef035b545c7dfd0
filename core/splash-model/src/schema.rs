use crate::FieldType;
use serde::{Deserialize, Serialize};

/// Describes one synchronizable attribute of an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique within the schema; the key used on the wire.
    pub identifier: String,
    pub field_type: FieldType,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Presentation group, e.g. "Address".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micro_data: Option<MicroData>,
    pub flags: FieldFlags,
    /// Other fields shown together with this one (first/last name).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associations: Vec<String>,
    /// Allowed values for enumerated fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<FieldChoice>,
}

impl FieldDescriptor {
    /// A blank descriptor of the given type; the factory fills the rest.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            identifier: String::new(),
            field_type,
            name: String::new(),
            description: String::new(),
            group: String::new(),
            micro_data: None,
            flags: FieldFlags::default(),
            associations: Vec::new(),
            choices: Vec::new(),
        }
    }

    /// True when remote writes to this field are ignored.
    pub fn is_read_only(&self) -> bool {
        self.flags.read_only
    }

    /// True when `value` is one of the declared choices, or no choices exist.
    pub fn accepts_choice(&self, value: &str) -> bool {
        self.choices.is_empty() || self.choices.iter().any(|c| c.value == value)
    }
}

/// Flags attached to a field descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFlags {
    /// Must be present and non-empty on create.
    pub required: bool,
    pub read_only: bool,
    pub write_only: bool,
    /// Included in list results.
    pub listed: bool,
    /// Value changes are worth logging.
    pub logged: bool,
    /// Excluded from the engine's automated tests.
    pub not_tested: bool,
}

/// schema.org hint for the sync engine's field matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroData {
    pub item_type: String,
    pub item_prop: String,
}

/// One allowed value of an enumerated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChoice {
    pub value: String,
    pub label: String,
}

/// The ordered field list of one object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub object_type: String,
    #[serde(default)]
    pub description: String,
    /// Declaration order is preserved; listing UIs rely on it.
    pub fields: Vec<FieldDescriptor>,
    /// View discriminators projected out of each backing record. Empty
    /// means one object per record.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<String>,
}

impl EntitySchema {
    pub fn new(object_type: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            object_type: object_type.into(),
            description: String::new(),
            fields,
            views: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_views<I, S>(mut self, views: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.views = views.into_iter().map(Into::into).collect();
        self
    }

    pub fn field(&self, identifier: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.identifier == identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.field(identifier).is_some()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.identifier.as_str())
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.flags.required)
    }

    pub fn listed_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.flags.listed)
    }

    /// Number of synchronizable objects per backing record (at least 1).
    pub fn views_per_record(&self) -> usize {
        self.views.len().max(1)
    }

    pub fn has_view(&self, view: &str) -> bool {
        self.views.iter().any(|v| v == view)
    }
}
