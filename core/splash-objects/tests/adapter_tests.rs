mod common;

use common::{fields, Bridge};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use splash_notify::CommitAction;
use splash_objects::{FieldError, ObjectError, PendingFields};
use splash_storage::{BackingStore, FieldMap};
use splash_types::{FeatureFlags, Settings};
use std::sync::Arc;

// ── Users ────────────────────────────────────────────────────────

#[test]
fn create_without_required_field_fails_before_any_write() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");

    let err = users.create(&mut PendingFields::new()).unwrap_err();
    match err {
        ObjectError::Validation { object_type, fields } => {
            assert_eq!(object_type, "ThirdParty");
            assert_eq!(fields, vec!["email".to_string()]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(bridge.store.count("user"), 0);
    assert!(bridge.notifier.pending().is_empty());
}

#[test]
fn create_rejects_unusable_required_value() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");

    let err = users
        .create(&mut fields(&[("email", "not an address")]))
        .unwrap_err();
    assert!(matches!(err, ObjectError::Validation { .. }));
    assert_eq!(bridge.store.count("user"), 0);
}

#[test]
fn created_user_reads_back() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");

    let handle = users
        .create(&mut fields(&[("email", "a@b.com"), ("firstname", "Ada")]))
        .unwrap();
    assert_eq!(handle.id().to_string(), "user-1");
    assert!(!handle.is_dirty());

    let loaded = users.load("user-1").unwrap();
    assert_eq!(users.get_field(&loaded, "email"), Some(json!("a@b.com")));
    assert_eq!(users.get_field(&loaded, "firstname"), Some(json!("Ada")));
    assert_eq!(users.get_field(&loaded, "login"), Some(json!("a@b.com")));
    assert_eq!(users.get_field(&loaded, "role"), Some(json!("customer")));
    assert!(users.get_field(&loaded, "registered").is_some());
}

#[test]
fn explicit_login_wins_over_email_default() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");

    let mut input = fields(&[("email", "a@b.com"), ("login", "ada")]);
    let handle = users.create(&mut input).unwrap();
    assert!(input.is_empty());
    assert_eq!(users.get_field(&handle, "login"), Some(json!("ada")));
}

#[test]
fn load_rejects_foreign_and_malformed_identifiers() {
    let bridge = Bridge::new();
    bridge.user("a@b.com");
    let users = bridge.adapter("ThirdParty");

    for id in ["garbage", "", "order-1", "user-billing-1", "user-01", "user-99"] {
        assert!(
            matches!(users.load(id), Err(ObjectError::NotFound(_))),
            "{id} should not load"
        );
    }
}

#[test]
fn unknown_fields_are_ignored() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");
    let id = bridge.user("a@b.com");
    let mut handle = users.load(&id).unwrap();

    users.set_field(&mut handle, "shoe_size", json!(44)).unwrap();
    assert_eq!(users.get_field(&handle, "shoe_size"), None);
    assert!(!handle.is_dirty());

    let values = users.get_fields(&handle, &["email", "shoe_size"]);
    assert_eq!(values.keys().collect::<Vec<_>>(), vec!["email"]);
}

#[test]
fn get_fields_without_selection_reads_whole_schema() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");
    let id = bridge.user("a@b.com");
    let handle = users.load(&id).unwrap();

    let values = users.get_fields(&handle, &[]);
    let schema = users.schema();
    assert_eq!(values.len(), schema.fields.len());
    assert_eq!(values["nickname"], Value::Null);
}

// ── Dirty tracking ───────────────────────────────────────────────

#[test]
fn writing_the_persisted_value_is_not_a_change() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");
    let id = bridge.user("a@b.com");
    let mut handle = users.load(&id).unwrap();

    users.set_field(&mut handle, "email", json!(" a@b.com ")).unwrap();
    users.set_field(&mut handle, "lastname", json!("")).unwrap();
    assert!(!handle.is_dirty());

    users.update(&mut handle).unwrap();
    assert!(bridge.notifier.pending().is_empty());
}

#[test]
fn one_change_yields_one_commit_per_object_type() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");
    let id = bridge.user("a@b.com");
    let mut handle = users.load(&id).unwrap();

    users.set_field(&mut handle, "firstname", json!("Ada")).unwrap();
    users.set_field(&mut handle, "lastname", json!("Lovelace")).unwrap();
    assert!(handle.is_dirty());
    assert_eq!(
        handle.dirty().changed_fields(),
        &["firstname".to_string(), "lastname".to_string()]
    );
    assert!(bridge.notifier.pending().is_empty());

    let saved = users.update(&mut handle).unwrap();
    assert_eq!(saved.to_string(), "user-1");
    assert!(!handle.is_dirty());

    let pending = bridge.notifier.pending();
    let summary: Vec<(&str, Vec<String>, CommitAction)> = pending
        .iter()
        .map(|c| (c.object_type.as_str(), c.ids.clone(), c.action))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("ThirdParty", vec!["user-1".to_string()], CommitAction::Update),
            (
                "Address",
                vec!["user-billing-1".to_string(), "user-shipping-1".to_string()],
                CommitAction::Update
            ),
        ]
    );
}

#[test]
fn metadata_is_written_before_update() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");
    let id = bridge.user("a@b.com");
    let mut handle = users.load(&id).unwrap();

    users.set_field(&mut handle, "nickname", json!("ada")).unwrap();
    assert!(handle.is_dirty());
    assert_eq!(
        bridge.store.get_meta("user", 1, "nickname").unwrap(),
        Some("ada".to_string())
    );

    users.set_field(&mut handle, "nickname", Value::Null).unwrap();
    assert_eq!(bridge.store.get_meta("user", 1, "nickname").unwrap(), None);
}

#[test]
fn update_of_metadata_only_still_notifies_once() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");
    let id = bridge.user("a@b.com");
    let mut handle = users.load(&id).unwrap();

    users.set_field(&mut handle, "company", json!("Analytical Engines")).unwrap();
    users.update(&mut handle).unwrap();

    let third_party: Vec<_> = bridge
        .notifier
        .pending()
        .into_iter()
        .filter(|c| c.object_type == "ThirdParty")
        .collect();
    assert_eq!(third_party.len(), 1);
}

// ── Field failures ───────────────────────────────────────────────

#[test]
fn read_only_fields_refuse_changes_but_accept_their_value() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");
    let id = bridge.user("a@b.com");
    let mut handle = users.load(&id).unwrap();

    users.set_field(&mut handle, "login", json!("a@b.com")).unwrap();
    let err = users.set_field(&mut handle, "login", json!("other")).unwrap_err();
    assert!(matches!(err, FieldError::ReadOnly(ref f) if f == "login"));
    assert!(!handle.is_dirty());
}

#[test]
fn choices_are_enforced() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");
    let id = bridge.user("a@b.com");
    let mut handle = users.load(&id).unwrap();

    let err = users.set_field(&mut handle, "role", json!("pirate")).unwrap_err();
    assert!(matches!(err, FieldError::InvalidValue { .. }));
    users.set_field(&mut handle, "role", json!("subscriber")).unwrap();
    assert_eq!(users.get_field(&handle, "role"), Some(json!("subscriber")));
}

#[test]
fn set_fields_claims_entries_and_isolates_failures() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");
    let id = bridge.user("a@b.com");
    let mut handle = users.load(&id).unwrap();

    let mut input = PendingFields::new()
        .with("email", json!("broken"))
        .with("firstname", json!("Ada"))
        .with("phone", json!("+44 20 7946 0000"))
        .with("favourite_colour", json!("green"));
    let errors = users.set_fields(&mut handle, &mut input);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field(), "email");
    assert_eq!(input.field_ids().collect::<Vec<_>>(), vec!["favourite_colour"]);
    assert_eq!(users.get_field(&handle, "firstname"), Some(json!("Ada")));
    assert_eq!(users.get_field(&handle, "email"), Some(json!("a@b.com")));
    assert_eq!(
        users.get_field(&handle, "phone"),
        Some(json!("+44 20 7946 0000"))
    );
}

// ── Delete ───────────────────────────────────────────────────────

#[test]
fn delete_reports_whether_the_user_existed() {
    let bridge = Bridge::new();
    let users = bridge.adapter("ThirdParty");
    let id = bridge.user("a@b.com");

    assert!(users.delete(&id).unwrap());
    assert!(!users.delete(&id).unwrap());
    assert!(!users.delete("nonsense").unwrap());
    assert_eq!(bridge.store.count("user"), 0);
}

// ── Addresses ────────────────────────────────────────────────────

#[test]
fn one_user_projects_two_distinct_addresses() {
    let bridge = Bridge::new();
    bridge.user("a@b.com");
    let addresses = bridge.adapter("Address");

    let mut billing = addresses.load("user-billing-1").unwrap();
    let shipping = addresses.load("user-shipping-1").unwrap();
    assert_ne!(billing.id(), shipping.id());
    assert_eq!(billing.backing_id(), shipping.backing_id());

    addresses.set_field(&mut billing, "city", json!("London")).unwrap();
    addresses.set_field(&mut billing, "country", json!("gb")).unwrap();
    addresses.update(&mut billing).unwrap();

    assert_eq!(
        bridge.store.get_meta("user", 1, "billing_city").unwrap(),
        Some("London".to_string())
    );
    assert_eq!(addresses.get_field(&billing, "country"), Some(json!("GB")));
    assert_eq!(addresses.get_field(&shipping, "city"), None);
    assert_eq!(addresses.get_field(&billing, "type"), Some(json!("billing")));
    assert_eq!(addresses.get_field(&shipping, "type"), Some(json!("shipping")));
    assert_eq!(addresses.get_field(&shipping, "user"), Some(json!("user-1")));
}

#[test]
fn address_identifiers_need_a_known_view() {
    let bridge = Bridge::new();
    bridge.user("a@b.com");
    let addresses = bridge.adapter("Address");

    for id in ["user-1", "user-delivery-1", "user-billing-2"] {
        assert!(matches!(addresses.load(id), Err(ObjectError::NotFound(_))));
    }
}

#[test]
fn addresses_cannot_be_created_or_deleted() {
    let bridge = Bridge::new();
    bridge.user("a@b.com");
    let addresses = bridge.adapter("Address");

    let err = addresses
        .create(&mut fields(&[("city", "London")]))
        .unwrap_err();
    assert!(matches!(
        err,
        ObjectError::PermissionDenied { operation: "create", .. }
    ));

    let err = addresses.delete("user-billing-1").unwrap_err();
    assert!(matches!(
        err,
        ObjectError::PermissionDenied { operation: "delete", .. }
    ));
    assert_eq!(bridge.store.count("user"), 1);
    assert!(bridge.notifier.pending().is_empty());
}

// ── Orders ───────────────────────────────────────────────────────

#[test]
fn order_requires_reference_and_starts_pending() {
    let bridge = Bridge::new();
    let orders = bridge.adapter("Order");

    assert!(matches!(
        orders.create(&mut PendingFields::new()),
        Err(ObjectError::Validation { .. })
    ));

    let id = bridge.order("WC-1001");
    assert_eq!(id, "order-1");
    let handle = orders.load(&id).unwrap();
    assert_eq!(orders.get_field(&handle, "reference"), Some(json!("WC-1001")));
    assert_eq!(orders.get_field(&handle, "status"), Some(json!("pending")));
    assert_eq!(orders.get_field(&handle, "customer"), None);
}

#[test]
fn order_customer_is_a_user_reference() {
    let bridge = Bridge::new();
    let user = bridge.user("a@b.com");
    let orders = bridge.adapter("Order");
    let id = bridge.order("WC-1001");
    let mut handle = orders.load(&id).unwrap();

    orders.set_field(&mut handle, "customer", json!(user)).unwrap();
    assert_eq!(handle.column("customer_id"), Some(&json!(1)));
    orders.update(&mut handle).unwrap();

    let handle = orders.load(&id).unwrap();
    assert_eq!(orders.get_field(&handle, "customer"), Some(json!("user-1")));

    let mut handle = handle;
    let err = orders
        .set_field(&mut handle, "customer", json!("order-1"))
        .unwrap_err();
    assert!(matches!(err, FieldError::InvalidValue { .. }));
}

#[test]
fn order_total_compares_numerically() {
    let bridge = Bridge::new();
    let orders = bridge.adapter("Order");
    let id = bridge.order("WC-1001");
    let mut handle = orders.load(&id).unwrap();

    orders.set_field(&mut handle, "total", json!("12.50")).unwrap();
    orders.update(&mut handle).unwrap();
    bridge.drain_pending();

    let mut handle = orders.load(&id).unwrap();
    orders.set_field(&mut handle, "total", json!(12.5)).unwrap();
    orders.set_field(&mut handle, "total", json!("12.5")).unwrap();
    assert!(!handle.is_dirty());

    let err = orders
        .set_field(&mut handle, "status", json!("lost"))
        .unwrap_err();
    assert!(matches!(err, FieldError::InvalidValue { .. }));
}

#[test]
fn order_delivery_address_uses_shipping_columns() {
    let bridge = Bridge::new();
    bridge.order("WC-1001");
    let addresses = bridge.adapter("OrderAddress");

    let mut delivery = addresses.load("order-delivery-1").unwrap();
    addresses.set_field(&mut delivery, "city", json!("Paris")).unwrap();
    addresses.update(&mut delivery).unwrap();

    let record = bridge.store.get("order", 1).unwrap().unwrap();
    assert_eq!(record.get("shipping_city"), Some(&json!("Paris")));
    assert_eq!(record.get("delivery_city"), None);

    let billing = addresses.load("order-billing-1").unwrap();
    assert_eq!(addresses.get_field(&billing, "city"), None);
    assert!(addresses.load("order-shipping-1").is_err());
}

// ── Custom fields ────────────────────────────────────────────────

fn custom_settings() -> Settings {
    Settings {
        features: FeatureFlags {
            custom_fields: true,
            ..FeatureFlags::default()
        },
        ..Settings::default()
    }
}

#[test]
fn custom_fields_expose_unmapped_metadata() {
    let store = Arc::new(splash_storage::MemoryStore::new());
    let user = store.insert("user", FieldMap::new()).unwrap();
    for key in ["loyalty_tier", "_session_tokens", "nickname", "billing_city"] {
        store.set_meta("user", user.id, key, "x").unwrap();
    }
    let bridge = Bridge::over(store, custom_settings());
    let users = bridge.adapter("ThirdParty");

    let schema = users.schema();
    let custom: Vec<&str> = schema
        .identifiers()
        .filter(|id| id.starts_with("meta_"))
        .collect();
    assert_eq!(custom, vec!["meta_loyalty_tier"]);

    let mut handle = users.load("user-1").unwrap();
    assert_eq!(users.get_field(&handle, "meta_loyalty_tier"), Some(json!("x")));
    users
        .set_field(&mut handle, "meta_loyalty_tier", json!("gold"))
        .unwrap();
    assert_eq!(
        bridge.store.get_meta("user", 1, "loyalty_tier").unwrap(),
        Some("gold".to_string())
    );
    users
        .set_field(&mut handle, "meta__session_tokens", json!("y"))
        .unwrap();
    assert_eq!(
        bridge.store.get_meta("user", 1, "_session_tokens").unwrap(),
        Some("x".to_string())
    );
}

#[test]
fn custom_fields_are_off_by_default() {
    let store = Arc::new(splash_storage::MemoryStore::new());
    let user = store.insert("user", FieldMap::new()).unwrap();
    store.set_meta("user", user.id, "loyalty_tier", "x").unwrap();
    let bridge = Bridge::over(store, Settings::default());

    assert!(!bridge.adapter("ThirdParty").schema().contains("meta_loyalty_tier"));
}
