//! Chained field declaration.
//!
//! ```
//! use splash_model::{FieldType, FieldsFactory};
//!
//! let mut factory = FieldsFactory::new();
//! factory
//!     .create(FieldType::Email)
//!     .identifier("email")
//!     .name("Email")
//!     .micro_data("http://schema.org/ContactPoint", "email")
//!     .is_required()
//!     .is_listed();
//! factory
//!     .create(FieldType::Varchar)
//!     .identifier("firstname")
//!     .name("First name")
//!     .association(&["lastname"]);
//!
//! let schema = factory.build("ThirdParty");
//! assert_eq!(schema.fields.len(), 2);
//! // "lastname" was never declared, so the association is dropped.
//! assert!(schema.fields[1].associations.is_empty());
//! ```

use crate::schema::{EntitySchema, FieldChoice, FieldDescriptor, MicroData};
use crate::FieldType;
use std::collections::HashSet;
use tracing::warn;

/// Accumulates field descriptors for one object type.
///
/// The descriptor being configured is finalized when the next
/// [`create`](Self::create) begins or when [`build`](Self::build) runs.
#[derive(Debug, Default)]
pub struct FieldsFactory {
    fields: Vec<FieldDescriptor>,
    current: Option<FieldDescriptor>,
}

impl FieldsFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new descriptor, finalizing the one in progress.
    pub fn create(&mut self, field_type: FieldType) -> &mut Self {
        self.commit();
        self.current = Some(FieldDescriptor::new(field_type));
        self
    }

    pub fn identifier(&mut self, identifier: &str) -> &mut Self {
        self.edit("identifier", |f| f.identifier = identifier.to_string())
    }

    pub fn name(&mut self, name: &str) -> &mut Self {
        self.edit("name", |f| f.name = name.to_string())
    }

    pub fn description(&mut self, description: &str) -> &mut Self {
        self.edit("description", |f| f.description = description.to_string())
    }

    pub fn group(&mut self, group: &str) -> &mut Self {
        self.edit("group", |f| f.group = group.to_string())
    }

    pub fn micro_data(&mut self, item_type: &str, item_prop: &str) -> &mut Self {
        self.edit("micro_data", |f| {
            f.micro_data = Some(MicroData {
                item_type: item_type.to_string(),
                item_prop: item_prop.to_string(),
            })
        })
    }

    pub fn is_required(&mut self) -> &mut Self {
        self.edit("is_required", |f| f.flags.required = true)
    }

    pub fn is_read_only(&mut self) -> &mut Self {
        self.edit("is_read_only", |f| f.flags.read_only = true)
    }

    pub fn is_write_only(&mut self) -> &mut Self {
        self.edit("is_write_only", |f| f.flags.write_only = true)
    }

    pub fn is_listed(&mut self) -> &mut Self {
        self.edit("is_listed", |f| f.flags.listed = true)
    }

    pub fn is_logged(&mut self) -> &mut Self {
        self.edit("is_logged", |f| f.flags.logged = true)
    }

    pub fn is_not_tested(&mut self) -> &mut Self {
        self.edit("is_not_tested", |f| f.flags.not_tested = true)
    }

    /// Links this field with others of the same schema. Unknown identifiers
    /// are dropped with a warning when the schema is built.
    pub fn association(&mut self, identifiers: &[&str]) -> &mut Self {
        self.edit("association", |f| {
            f.associations
                .extend(identifiers.iter().map(|id| (*id).to_string()))
        })
    }

    pub fn add_choice(&mut self, value: &str, label: &str) -> &mut Self {
        self.edit("add_choice", |f| {
            f.choices.push(FieldChoice {
                value: value.to_string(),
                label: label.to_string(),
            })
        })
    }

    /// Number of finalized descriptors so far.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.current.is_none()
    }

    /// Finalizes the last descriptor and produces the schema.
    pub fn build(mut self, object_type: &str) -> EntitySchema {
        self.commit();

        let known: HashSet<String> = self.fields.iter().map(|f| f.identifier.clone()).collect();
        for field in &mut self.fields {
            let own = field.identifier.clone();
            field.associations.retain(|other| {
                let ok = known.contains(other) && *other != own;
                if !ok {
                    warn!(
                        "[{object_type}] field {own} associated with unknown field {other}, ignored"
                    );
                }
                ok
            });
        }

        EntitySchema::new(object_type, self.fields)
    }

    fn edit(&mut self, what: &str, apply: impl FnOnce(&mut FieldDescriptor)) -> &mut Self {
        match self.current.as_mut() {
            Some(field) => apply(field),
            None => warn!("{what}() called before create(), ignored"),
        }
        self
    }

    fn commit(&mut self) {
        let Some(mut field) = self.current.take() else {
            return;
        };
        if field.identifier.is_empty() {
            warn!("field of type {} declared without identifier, dropped", field.field_type.wire_name());
            return;
        }
        if self.fields.iter().any(|f| f.identifier == field.identifier) {
            warn!("duplicate field identifier {}, keeping first declaration", field.identifier);
            return;
        }
        if field.name.is_empty() {
            field.name = field.identifier.clone();
        }
        self.fields.push(field);
    }
}
