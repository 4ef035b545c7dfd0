mod common;

use common::{fields, Bridge};
use pretty_assertions::assert_eq;
use serde_json::json;
use splash_objects::{ListParams, ObjectPage, SortOrder};

fn ids(page: &ObjectPage) -> Vec<&str> {
    page.items.iter().map(|item| item.id.as_str()).collect()
}

fn params(max: i64, offset: i64) -> ListParams {
    ListParams {
        max: Some(max),
        offset: Some(offset),
        ..ListParams::default()
    }
}

// ── Views ────────────────────────────────────────────────────────

#[test]
fn one_user_lists_two_addresses() {
    let bridge = Bridge::new();
    bridge.user("a@b.com");

    let page = bridge
        .registry
        .list("Address", None, &ListParams::default())
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.current, 2);
    assert_eq!(ids(&page), vec!["user-billing-1", "user-shipping-1"]);
    assert_eq!(page.items[0].fields["type"], json!("billing"));
}

#[test]
fn pages_are_cut_in_object_space() {
    let bridge = Bridge::new();
    for email in ["a@b.com", "b@b.com", "c@b.com"] {
        bridge.user(email);
    }

    let page = bridge.registry.list("Address", None, &params(4, 3)).unwrap();
    assert_eq!(page.total, 6);
    assert_eq!(
        ids(&page),
        vec!["user-shipping-2", "user-billing-3", "user-shipping-3"]
    );
    assert_eq!(page.current, 3);

    let page = bridge.registry.list("Address", None, &params(3, 0)).unwrap();
    assert_eq!(
        ids(&page),
        vec!["user-billing-1", "user-shipping-1", "user-billing-2"]
    );

    let page = bridge.registry.list("Address", None, &params(5, 6)).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 6);
}

#[test]
fn order_addresses_list_billing_and_delivery() {
    let bridge = Bridge::new();
    bridge.order("WC-1");

    let page = bridge
        .registry
        .list("OrderAddress", None, &ListParams::default())
        .unwrap();
    assert_eq!(ids(&page), vec!["order-billing-1", "order-delivery-1"]);
}

// ── Parameters ───────────────────────────────────────────────────

#[test]
fn huge_page_size_returns_everything() {
    let bridge = Bridge::new();
    bridge.user("a@b.com");
    bridge.user("b@b.com");

    let page = bridge
        .registry
        .list("ThirdParty", None, &params(i64::MAX, 0))
        .unwrap();
    assert_eq!(page.current, 2);
    assert_eq!(page.total, 2);

    let page = bridge
        .registry
        .list("Address", None, &params(i64::MAX, 1))
        .unwrap();
    assert_eq!(
        ids(&page),
        vec!["user-shipping-1", "user-billing-2", "user-shipping-2"]
    );

    let page = bridge
        .registry
        .list("Address", None, &params(i64::MAX, i64::MAX))
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 4);
}

#[test]
fn non_positive_parameters_fall_back_to_defaults() {
    let bridge = Bridge::new();
    for i in 0..12 {
        bridge.user(&format!("user{i}@b.com"));
    }

    let page = bridge.registry.list("ThirdParty", None, &params(0, -4)).unwrap();
    assert_eq!(page.current, 10);
    assert_eq!(page.total, 12);
    assert_eq!(page.items[0].id, "user-1");

    let p = params(-1, 0);
    assert_eq!((p.max(), p.offset(), p.sort_field()), (10, 0, "id"));
    assert_eq!(p.sort_order(), SortOrder::Asc);
}

#[test]
fn listed_fields_only() {
    let bridge = Bridge::new();
    let id = bridge.user("a@b.com");
    let users = bridge.adapter("ThirdParty");
    let mut handle = users.load(&id).unwrap();
    users
        .set_fields(&mut handle, &mut fields(&[("firstname", "Ada"), ("company", "AE")]));
    users.update(&mut handle).unwrap();

    let page = bridge
        .registry
        .list("ThirdParty", None, &ListParams::default())
        .unwrap();
    let item = &page.items[0];
    assert_eq!(item.fields["email"], json!("a@b.com"));
    assert_eq!(item.fields["company"], json!("AE"));
    assert!(!item.fields.contains_key("firstname"));
}

// ── Filter and sort ──────────────────────────────────────────────

#[test]
fn filter_is_case_insensitive() {
    let bridge = Bridge::new();
    bridge.user("alice@example.com");
    bridge.user("bob@example.com");
    bridge.user("malice@example.org");

    let page = bridge
        .registry
        .list("ThirdParty", Some("ALICE"), &ListParams::default())
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(ids(&page), vec!["user-1", "user-3"]);
}

#[test]
fn sort_by_field_uses_its_column() {
    let bridge = Bridge::new();
    bridge.user("carol@b.com");
    bridge.user("alice@b.com");
    bridge.user("bob@b.com");

    let by_email = ListParams {
        sort_field: Some("email".into()),
        sort_order: Some(SortOrder::Desc),
        ..ListParams::default()
    };
    let page = bridge.registry.list("ThirdParty", None, &by_email).unwrap();
    assert_eq!(ids(&page), vec!["user-1", "user-3", "user-2"]);

    let unknown = ListParams {
        sort_field: Some("shoe_size".into()),
        ..ListParams::default()
    };
    let page = bridge.registry.list("ThirdParty", None, &unknown).unwrap();
    assert_eq!(ids(&page), vec!["user-1", "user-2", "user-3"]);
}
