use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use splash_types::ObjectId;
use url::Url;

/// Wire format of `DateTime` values.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Wire format of `Date` values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The semantic type of a synchronized field.
///
/// The type decides how written values are validated and normalized before
/// they are compared against the persisted value. It says nothing about how
/// the value is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Varchar,
    Text,
    Email,
    Phone,
    Url,
    /// ISO 3166-1 alpha-2 country code.
    Country,
    /// Region or state code, free-form.
    State,
    Date,
    DateTime,
    Bool,
    Int,
    Double,
    /// ISO 4217 currency code.
    Currency,
    /// Reference to another object; carries the target object type.
    ObjectId(String),
}

impl FieldType {
    /// Short name used in schema dumps (`varchar`, `objectid::ThirdParty`).
    pub fn wire_name(&self) -> String {
        match self {
            Self::Varchar => "varchar".into(),
            Self::Text => "text".into(),
            Self::Email => "email".into(),
            Self::Phone => "phone".into(),
            Self::Url => "url".into(),
            Self::Country => "country".into(),
            Self::State => "state".into(),
            Self::Date => "date".into(),
            Self::DateTime => "datetime".into(),
            Self::Bool => "bool".into(),
            Self::Int => "int".into(),
            Self::Double => "double".into(),
            Self::Currency => "currency".into(),
            Self::ObjectId(target) => format!("objectid::{target}"),
        }
    }

    /// Validates and canonicalizes a written value.
    ///
    /// `null` passes through for every type and means "clear". On failure the
    /// error is a human-readable reason.
    pub fn normalize(&self, value: &Value) -> Result<Value, String> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self {
            Self::Varchar | Self::Text | Self::Phone | Self::State => {
                scalar_string(value).map(|s| Value::String(s.trim().to_string()))
            }
            Self::Email => {
                let s = scalar_string(value)?.trim().to_string();
                if s.is_empty() || is_email(&s) {
                    Ok(Value::String(s))
                } else {
                    Err(format!("{s:?} is not an email address"))
                }
            }
            Self::Url => {
                let s = scalar_string(value)?;
                let s = s.trim();
                if s.is_empty() {
                    return Ok(Value::String(String::new()));
                }
                let url = Url::parse(s).map_err(|e| format!("{s:?} is not a url: {e}"))?;
                match url.scheme() {
                    "http" | "https" if url.has_host() => Ok(Value::String(url.into())),
                    _ => Err(format!("{s:?} is not an http(s) url")),
                }
            }
            Self::Country => iso_code(value, 2, "country"),
            Self::Currency => iso_code(value, 3, "currency"),
            Self::Date => {
                let s = scalar_string(value)?;
                let s = s.trim();
                if s.is_empty() {
                    return Ok(Value::String(String::new()));
                }
                let date = NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .or_else(|_| parse_datetime(s).map(|dt| dt.date()))
                    .map_err(|_| format!("{s:?} is not a date"))?;
                Ok(Value::String(date.format(DATE_FORMAT).to_string()))
            }
            Self::DateTime => {
                let s = scalar_string(value)?;
                let s = s.trim();
                if s.is_empty() {
                    return Ok(Value::String(String::new()));
                }
                let dt = parse_datetime(s).map_err(|_| format!("{s:?} is not a date-time"))?;
                Ok(Value::String(dt.format(DATETIME_FORMAT).to_string()))
            }
            Self::Bool => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::Number(n) => match n.as_i64() {
                    Some(0) => Ok(Value::Bool(false)),
                    Some(1) => Ok(Value::Bool(true)),
                    _ => Err(format!("{n} is not a boolean")),
                },
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "1" | "true" | "yes" => Ok(Value::Bool(true)),
                    "0" | "false" | "no" | "" => Ok(Value::Bool(false)),
                    other => Err(format!("{other:?} is not a boolean")),
                },
                other => Err(format!("{other} is not a boolean")),
            },
            Self::Int => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| format!("{s:?} is not an integer")),
                other => Err(format!("{other} is not an integer")),
            },
            Self::Double => match value {
                Value::Number(n) => n
                    .as_f64()
                    .map(Value::from)
                    .ok_or_else(|| format!("{n} is not a number")),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(Value::from)
                    .ok_or_else(|| format!("{s:?} is not a number")),
                other => Err(format!("{other} is not a number")),
            },
            Self::ObjectId(target) => {
                let s = scalar_string(value)?;
                let s = s.trim();
                if s.is_empty() {
                    return Ok(Value::String(String::new()));
                }
                ObjectId::decode(s)
                    .map(|id| Value::String(id.encode()))
                    .map_err(|e| format!("not a {target} reference: {e}"))
            }
        }
    }
}

fn scalar_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(if *b { "1".into() } else { "0".into() }),
        other => Err(format!("expected a scalar, got {other}")),
    }
}

fn is_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn iso_code(value: &Value, len: usize, what: &str) -> Result<Value, String> {
    let s = scalar_string(value)?.trim().to_ascii_uppercase();
    if s.is_empty() || (s.len() == len && s.bytes().all(|b| b.is_ascii_uppercase())) {
        Ok(Value::String(s))
    } else {
        Err(format!("{s:?} is not an ISO {what} code"))
    }
}

fn parse_datetime(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.naive_utc()))
}
