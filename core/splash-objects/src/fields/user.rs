use super::{lookup, read_meta, write_meta, FieldHandler};
use crate::{FieldError, FieldResult, ObjectHandle, PendingFields};
use chrono::Utc;
use serde_json::Value;
use splash_model::{FieldType, FieldsFactory, DATETIME_FORMAT};
use splash_storage::{BackingStore, FieldMap};

const CORE_COLUMNS: &[(&str, &str)] = &[
    ("email", "email"),
    ("login", "login"),
    ("firstname", "first_name"),
    ("lastname", "last_name"),
    ("website", "url"),
    ("registered", "registered"),
    ("role", "role"),
];

const ROLES: &[(&str, &str)] = &[
    ("customer", "Customer"),
    ("subscriber", "Subscriber"),
    ("shop_manager", "Shop manager"),
    ("administrator", "Administrator"),
];

/// Account columns of a user record.
#[derive(Debug, Default)]
pub struct UserCoreFields;

impl FieldHandler for UserCoreFields {
    fn name(&self) -> &'static str {
        "user-core"
    }

    fn declare(&self, factory: &mut FieldsFactory) {
        factory
            .create(FieldType::Email)
            .identifier("email")
            .name("Email")
            .micro_data("http://schema.org/ContactPoint", "email")
            .is_required()
            .is_listed()
            .is_logged();
        factory
            .create(FieldType::Varchar)
            .identifier("login")
            .name("Username")
            .description("Login name, fixed once the account exists")
            .micro_data("http://schema.org/Organization", "alternateName")
            .is_read_only()
            .is_listed();
        factory
            .create(FieldType::Varchar)
            .identifier("firstname")
            .name("First name")
            .micro_data("http://schema.org/Person", "givenName")
            .association(&["lastname"]);
        factory
            .create(FieldType::Varchar)
            .identifier("lastname")
            .name("Last name")
            .micro_data("http://schema.org/Person", "familyName")
            .association(&["firstname"]);
        factory
            .create(FieldType::Url)
            .identifier("website")
            .name("Website")
            .micro_data("http://schema.org/Organization", "url");
        factory
            .create(FieldType::DateTime)
            .identifier("registered")
            .name("Registered")
            .micro_data("http://schema.org/DataFeedItem", "dateCreated")
            .is_read_only()
            .is_not_tested();
        factory
            .create(FieldType::Varchar)
            .identifier("role")
            .name("Role")
            .group("Account");
        for (value, label) in ROLES {
            factory.add_choice(value, label);
        }
    }

    fn claims(&self, field_id: &str) -> bool {
        lookup(CORE_COLUMNS, field_id).is_some()
    }

    fn get(
        &self,
        _store: &dyn BackingStore,
        handle: &ObjectHandle,
        field_id: &str,
    ) -> FieldResult<Option<Value>> {
        Ok(lookup(CORE_COLUMNS, field_id).and_then(|column| handle.column(column).cloned()))
    }

    fn set(
        &self,
        _store: &dyn BackingStore,
        handle: &mut ObjectHandle,
        field_id: &str,
        value: Value,
    ) -> FieldResult<()> {
        let column = lookup(CORE_COLUMNS, field_id)
            .ok_or_else(|| FieldError::invalid(field_id, "not a user column"))?;
        handle.set_column(column, value);
        Ok(())
    }

    fn column(&self, field_id: &str) -> Option<&str> {
        lookup(CORE_COLUMNS, field_id)
    }

    fn prepare_create(&self, input: &mut PendingFields, fields: &mut FieldMap) {
        let login = input
            .take("login")
            .and_then(|v| v.as_str().map(str::trim).map(str::to_string))
            .filter(|s| !s.is_empty())
            .or_else(|| fields.get("email").and_then(Value::as_str).map(str::to_string));
        if let Some(login) = login {
            fields.insert("login".into(), Value::String(login));
        }
        fields.insert(
            "registered".into(),
            Value::String(Utc::now().naive_utc().format(DATETIME_FORMAT).to_string()),
        );
        fields
            .entry("role".to_string())
            .or_insert_with(|| Value::String("customer".into()));
    }
}

const META_KEYS: &[(&str, &str)] = &[
    ("nickname", "nickname"),
    ("description", "description"),
    ("phone", "phone"),
    ("company", "company"),
];

/// Profile values kept in the user's metadata.
///
/// Writes go to the store immediately; they do not wait for `update`.
#[derive(Debug, Default)]
pub struct UserMetaFields;

impl FieldHandler for UserMetaFields {
    fn name(&self) -> &'static str {
        "user-meta"
    }

    fn declare(&self, factory: &mut FieldsFactory) {
        factory
            .create(FieldType::Varchar)
            .identifier("nickname")
            .name("Nickname")
            .micro_data("http://schema.org/Person", "alternateName");
        factory
            .create(FieldType::Text)
            .identifier("description")
            .name("Biographical info")
            .micro_data("http://schema.org/Person", "description");
        factory
            .create(FieldType::Phone)
            .identifier("phone")
            .name("Phone")
            .micro_data("http://schema.org/Person", "telephone");
        factory
            .create(FieldType::Varchar)
            .identifier("company")
            .name("Company")
            .micro_data("http://schema.org/Organization", "legalName")
            .is_listed();
    }

    fn claims(&self, field_id: &str) -> bool {
        lookup(META_KEYS, field_id).is_some()
    }

    fn get(
        &self,
        store: &dyn BackingStore,
        handle: &ObjectHandle,
        field_id: &str,
    ) -> FieldResult<Option<Value>> {
        match lookup(META_KEYS, field_id) {
            Some(key) => read_meta(store, handle, key, field_id),
            None => Ok(None),
        }
    }

    fn set(
        &self,
        store: &dyn BackingStore,
        handle: &mut ObjectHandle,
        field_id: &str,
        value: Value,
    ) -> FieldResult<()> {
        let key = lookup(META_KEYS, field_id)
            .ok_or_else(|| FieldError::invalid(field_id, "not a user metadata field"))?;
        write_meta(store, handle, key, field_id, &value)
    }

    fn meta_keys(&self) -> Vec<String> {
        META_KEYS.iter().map(|(_, key)| (*key).to_string()).collect()
    }
}
