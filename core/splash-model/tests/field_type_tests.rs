use serde_json::{json, Value};
use splash_model::FieldType;

fn ok(ft: FieldType, v: Value) -> Value {
    ft.normalize(&v).unwrap()
}

#[test]
fn null_passes_through_every_type() {
    for ft in [
        FieldType::Varchar,
        FieldType::Email,
        FieldType::Bool,
        FieldType::Double,
        FieldType::DateTime,
        FieldType::ObjectId("ThirdParty".into()),
    ] {
        assert_eq!(ft.normalize(&Value::Null).unwrap(), Value::Null);
    }
}

#[test]
fn varchar_trims_and_stringifies_scalars() {
    assert_eq!(ok(FieldType::Varchar, json!("  Paris ")), json!("Paris"));
    assert_eq!(ok(FieldType::Varchar, json!(75001)), json!("75001"));
    assert!(FieldType::Varchar.normalize(&json!(["a"])).is_err());
}

#[test]
fn email_validation() {
    assert_eq!(ok(FieldType::Email, json!(" a@b.com ")), json!("a@b.com"));
    assert_eq!(ok(FieldType::Email, json!("")), json!(""));
    assert!(FieldType::Email.normalize(&json!("not-an-email")).is_err());
    assert!(FieldType::Email.normalize(&json!("a@b")).is_err());
    assert!(FieldType::Email.normalize(&json!("a b@c.com")).is_err());
}

#[test]
fn url_requires_http_scheme() {
    assert_eq!(ok(FieldType::Url, json!(" https://splash.io ")), json!("https://splash.io/"));
    assert_eq!(
        ok(FieldType::Url, json!("HTTP://Splash.IO/Shop?q=1")),
        json!("http://splash.io/Shop?q=1")
    );
    assert_eq!(ok(FieldType::Url, json!("")), json!(""));
    assert!(FieldType::Url.normalize(&json!("ftp://x")).is_err());
    assert!(FieldType::Url.normalize(&json!("splash.io")).is_err());
}

#[test]
fn malformed_urls_are_rejected() {
    for raw in ["http://", "https://exa mple .com", "http://[::1", "mailto:a@b.com"] {
        assert!(FieldType::Url.normalize(&json!(raw)).is_err(), "{raw}");
    }
}

#[test]
fn iso_codes_are_uppercased() {
    assert_eq!(ok(FieldType::Country, json!("fr")), json!("FR"));
    assert_eq!(ok(FieldType::Currency, json!("eur")), json!("EUR"));
    assert!(FieldType::Country.normalize(&json!("FRA")).is_err());
    assert!(FieldType::Currency.normalize(&json!("E1R")).is_err());
}

#[test]
fn datetime_accepts_wire_format_and_rfc3339() {
    assert_eq!(
        ok(FieldType::DateTime, json!("2024-03-01 10:20:30")),
        json!("2024-03-01 10:20:30")
    );
    assert_eq!(
        ok(FieldType::DateTime, json!("2024-03-01T10:20:30+00:00")),
        json!("2024-03-01 10:20:30")
    );
    assert!(FieldType::DateTime.normalize(&json!("yesterday")).is_err());
}

#[test]
fn date_truncates_datetimes() {
    assert_eq!(ok(FieldType::Date, json!("2024-03-01")), json!("2024-03-01"));
    assert_eq!(ok(FieldType::Date, json!("2024-03-01 23:59:59")), json!("2024-03-01"));
}

#[test]
fn bool_accepts_common_spellings() {
    assert_eq!(ok(FieldType::Bool, json!("1")), json!(true));
    assert_eq!(ok(FieldType::Bool, json!("false")), json!(false));
    assert_eq!(ok(FieldType::Bool, json!(0)), json!(false));
    assert!(FieldType::Bool.normalize(&json!("maybe")).is_err());
}

#[test]
fn numbers_parse_from_strings() {
    assert_eq!(ok(FieldType::Int, json!("42")), json!(42));
    assert_eq!(ok(FieldType::Double, json!("12.5")), json!(12.5));
    assert_eq!(ok(FieldType::Double, json!(10)), json!(10.0));
    assert!(FieldType::Int.normalize(&json!("4.2")).is_err());
    assert!(FieldType::Double.normalize(&json!("NaN")).is_err());
}

#[test]
fn object_id_must_decode() {
    let ft = FieldType::ObjectId("ThirdParty".into());
    assert_eq!(ok(ft.clone(), json!("user-7")), json!("user-7"));
    assert_eq!(ok(ft.clone(), json!("")), json!(""));
    assert!(ft.normalize(&json!("seven")).is_err());
}
