use pretty_assertions::assert_eq;
use splash_types::{IdCodec, IdError, ObjectId};

// ── Encoding ─────────────────────────────────────────────────────

#[test]
fn single_view_encodes_kind_and_id() {
    let id = ObjectId::new("user", 42).unwrap();
    assert_eq!(id.encode(), "user-42");
    assert_eq!(id.to_string(), "user-42");
    assert_eq!(id.view(), None);
}

#[test]
fn view_is_encoded_between_kind_and_id() {
    let id = ObjectId::with_view("user", "billing", 42).unwrap();
    assert_eq!(id.encode(), "user-billing-42");
    assert_eq!(id.view(), Some("billing"));
}

#[test]
fn zero_is_a_valid_backing_id() {
    let id = ObjectId::decode("order-0").unwrap();
    assert_eq!(id.backing_id(), 0);
    assert_eq!(id.encode(), "order-0");
}

#[test]
fn two_views_of_one_record_are_distinct() {
    let billing = ObjectId::with_view("user", "billing", 42).unwrap();
    let shipping = billing.sibling("shipping").unwrap();

    assert_ne!(billing, shipping);
    assert_ne!(billing.encode(), shipping.encode());
    assert_eq!(billing.backing_id(), shipping.backing_id());
}

#[test]
fn invalid_kind_is_rejected() {
    assert_eq!(
        ObjectId::new("User", 1),
        Err(IdError::InvalidSegment("User".into()))
    );
    assert!(ObjectId::new("", 1).is_err());
    assert!(ObjectId::new("9lives", 1).is_err());
    assert!(ObjectId::with_view("user", "bill-ing", 1).is_err());
}

// ── Decoding ─────────────────────────────────────────────────────

#[test]
fn decode_rejects_empty() {
    assert_eq!(ObjectId::decode(""), Err(IdError::Empty));
}

#[test]
fn decode_rejects_malformed_without_panicking() {
    for raw in [
        "42",
        "user",
        "user-",
        "-42",
        "user--42",
        "user-billing-x-42",
        "user-+42",
        "user-042",
        "user-4 2",
        "user-18446744073709551616",
        "USER-1",
        "user-billing-",
        "user-é-1",
    ] {
        assert!(ObjectId::decode(raw).is_err(), "{raw} should not decode");
    }
}

#[test]
fn decode_accepts_u64_max() {
    let id = ObjectId::decode("user-18446744073709551615").unwrap();
    assert_eq!(id.backing_id(), u64::MAX);
}

#[test]
fn from_str_matches_decode() {
    let parsed: ObjectId = "order-delivery-7".parse().unwrap();
    assert_eq!(parsed.kind(), "order");
    assert_eq!(parsed.view(), Some("delivery"));
    assert_eq!(parsed.backing_id(), 7);
}

#[test]
fn serde_uses_wire_string() {
    let id = ObjectId::with_view("user", "shipping", 3).unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"user-shipping-3\"");

    let back: ObjectId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);

    assert!(serde_json::from_str::<ObjectId>("\"nope\"").is_err());
}

// ── IdCodec ──────────────────────────────────────────────────────

#[test]
fn codec_encodes_with_its_kind() {
    let codec = IdCodec::new("user").unwrap();
    assert_eq!(codec.encode(5, None).unwrap(), "user-5");
    assert_eq!(codec.encode(5, Some("billing")).unwrap(), "user-billing-5");
}

#[test]
fn codec_rejects_foreign_kind() {
    let codec = IdCodec::new("user").unwrap();
    assert_eq!(
        codec.decode("order-5"),
        Err(IdError::KindMismatch {
            expected: "user".into(),
            found: "order".into(),
        })
    );
}

#[test]
fn codec_rejects_invalid_view() {
    let codec = IdCodec::new("user").unwrap();
    assert!(codec.encode(5, Some("Billing")).is_err());
}
