use super::{read_meta, write_meta, FieldHandler};
use crate::{FieldError, FieldResult, ObjectHandle};
use serde_json::Value;
use splash_model::{FieldType, FieldsFactory};
use splash_storage::BackingStore;

/// Where an address block lives on its backing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressStorage {
    /// Metadata keys `{prefix}_{column}` (addresses of a user).
    Meta,
    /// Record columns `{prefix}_{column}` (addresses of an order).
    Columns,
}

/// `(field_id, column, type, name, schema.org property)`
const ADDRESS_FIELDS: &[(&str, &str, FieldType, &str, &str)] = &[
    ("company", "company", FieldType::Varchar, "Company", "legalName"),
    ("firstname", "first_name", FieldType::Varchar, "First name", "givenName"),
    ("lastname", "last_name", FieldType::Varchar, "Last name", "familyName"),
    ("address1", "address_1", FieldType::Varchar, "Address line 1", "streetAddress"),
    ("address2", "address_2", FieldType::Varchar, "Address line 2", "postOfficeBoxNumber"),
    ("zip", "postcode", FieldType::Varchar, "Postcode", "postalCode"),
    ("city", "city", FieldType::Varchar, "City", "addressLocality"),
    ("state", "state", FieldType::State, "State", "addressRegion"),
    ("country", "country", FieldType::Country, "Country", "addressCountry"),
    ("phone", "phone", FieldType::Phone, "Phone", "telephone"),
    ("email", "email", FieldType::Email, "Email", "email"),
];

const TYPE_FIELD: &str = "type";

/// Postal address block, projected per view of the backing record.
///
/// The view selects the key prefix: `billing` maps to `billing_*`, and a
/// view can be renamed (`delivery` reads `shipping_*` on orders).
#[derive(Debug, Clone)]
pub struct AddressFields {
    storage: AddressStorage,
    prefixes: Vec<(String, String)>,
}

impl AddressFields {
    /// `views` lists every view this block is projected for.
    pub fn new(storage: AddressStorage, views: &[&str]) -> Self {
        Self {
            storage,
            prefixes: views
                .iter()
                .map(|v| ((*v).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Reads `view` from keys prefixed `prefix` instead of its own name.
    #[must_use]
    pub fn with_prefix(mut self, view: &str, prefix: &str) -> Self {
        match self.prefixes.iter_mut().find(|(v, _)| v == view) {
            Some(entry) => entry.1 = prefix.to_string(),
            None => self.prefixes.push((view.to_string(), prefix.to_string())),
        }
        self
    }

    pub fn prefix<'a>(&'a self, view: &'a str) -> &'a str {
        self.prefixes
            .iter()
            .find(|(v, _)| v == view)
            .map_or(view, |(_, prefix)| prefix.as_str())
    }

    fn key(&self, handle: &ObjectHandle, field_id: &str) -> FieldResult<String> {
        let column = ADDRESS_FIELDS
            .iter()
            .find(|(id, ..)| *id == field_id)
            .map(|(_, column, ..)| *column)
            .ok_or_else(|| FieldError::invalid(field_id, "not an address field"))?;
        let view = handle
            .view()
            .ok_or_else(|| FieldError::invalid(field_id, "address handle without a view"))?;
        Ok(format!("{}_{column}", self.prefix(view)))
    }
}

impl FieldHandler for AddressFields {
    fn name(&self) -> &'static str {
        "address"
    }

    fn declare(&self, factory: &mut FieldsFactory) {
        for (id, _, field_type, name, prop) in ADDRESS_FIELDS {
            factory
                .create(field_type.clone())
                .identifier(id)
                .name(name)
                .group("Address")
                .micro_data("http://schema.org/PostalAddress", prop);
        }
        factory
            .create(FieldType::Varchar)
            .identifier(TYPE_FIELD)
            .name("Address type")
            .description("Which address of the owner this object projects")
            .is_read_only()
            .is_listed();
    }

    fn claims(&self, field_id: &str) -> bool {
        field_id == TYPE_FIELD || ADDRESS_FIELDS.iter().any(|(id, ..)| *id == field_id)
    }

    fn get(
        &self,
        store: &dyn BackingStore,
        handle: &ObjectHandle,
        field_id: &str,
    ) -> FieldResult<Option<Value>> {
        if field_id == TYPE_FIELD {
            return Ok(handle.view().map(|v| Value::String(v.to_string())));
        }
        let key = self.key(handle, field_id)?;
        match self.storage {
            AddressStorage::Meta => read_meta(store, handle, &key, field_id),
            AddressStorage::Columns => Ok(handle.column(&key).cloned()),
        }
    }

    fn set(
        &self,
        store: &dyn BackingStore,
        handle: &mut ObjectHandle,
        field_id: &str,
        value: Value,
    ) -> FieldResult<()> {
        if field_id == TYPE_FIELD {
            return Err(FieldError::ReadOnly(field_id.to_string()));
        }
        let key = self.key(handle, field_id)?;
        match self.storage {
            AddressStorage::Meta => write_meta(store, handle, &key, field_id, &value),
            AddressStorage::Columns => {
                handle.set_column(&key, value);
                Ok(())
            }
        }
    }

    fn meta_keys(&self) -> Vec<String> {
        if self.storage != AddressStorage::Meta {
            return Vec::new();
        }
        self.prefixes
            .iter()
            .flat_map(|(_, prefix)| {
                ADDRESS_FIELDS
                    .iter()
                    .map(move |(_, column, ..)| format!("{prefix}_{column}"))
            })
            .collect()
    }
}
