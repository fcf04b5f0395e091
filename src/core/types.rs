//! Core value type that flows between requests, validators and models.
//!
//! Submitted form data, action parameters and database rows all share the
//! same dynamically typed [`Value`]. The set of variants is closed so rule
//! predicates and the persistence layer can match exhaustively.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered field mapping used for submitted data and database rows.
pub type Fields = IndexMap<String, Value>;

/// A dynamically typed request or row datum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(untagged)]
pub enum Value {
    /// Represents absence of value
    #[default]
    None,
    /// Boolean value
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Ordered list of values
    Array(Vec<Value>),
    /// Key-value map
    Map(IndexMap<String, Value>),
}

/// Discriminant of a [`Value`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    None,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Map,
}

impl Value {
    /// Get the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::None => ValueKind::None,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Map(_) => ValueKind::Map,
        }
    }

    /// Try to get this value as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Try to get this value as a float.
    /// Integers are automatically converted to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Try to get this value as an array reference.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        if let Value::Array(arr) = self {
            Some(arr)
        } else {
            None
        }
    }

    /// Try to get this value as a map reference.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        if let Value::Map(map) = self {
            Some(map)
        } else {
            None
        }
    }

    /// Check if this value is None.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Whether the value counts as "empty".
    ///
    /// `None`, `false`, `0`, `0.0`, `""`, `"0"` and empty containers are
    /// empty; everything else is not.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::None => true,
            Value::Boolean(b) => !b,
            Value::Integer(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::String(s) => s.is_empty() || s == "0",
            Value::Array(arr) => arr.is_empty(),
            Value::Map(map) => map.is_empty(),
        }
    }

    /// Scalar string form of this value.
    ///
    /// Containers have no scalar form and return `None`.
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            Value::None => Some(String::new()),
            Value::Boolean(true) => Some("1".to_string()),
            Value::Boolean(false) => Some(String::new()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(format_float(*f)),
            Value::String(s) => Some(s.clone()),
            Value::Array(_) | Value::Map(_) => None,
        }
    }
}

/// Significant digits used when a float is turned into text.
const FLOAT_PRECISION: i32 = 14;

/// Format a float the way form values are stringified: 14 significant
/// digits, trailing zeros dropped, exponent form (`1.0E+20`) once the
/// decimal point falls outside `-4..=14`.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.*e}", (FLOAT_PRECISION - 1) as usize, f.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let digits = digits.trim_end_matches('0');
    let point = exponent + 1;

    let mut out = String::new();
    if f < 0.0 {
        out.push('-');
    }
    if point < -3 || point > FLOAT_PRECISION {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        out.push('.');
        out.push_str(if rest.is_empty() { "0" } else { rest });
        out.push('E');
        out.push(if exponent < 0 { '-' } else { '+' });
        out.push_str(&exponent.abs().to_string());
    } else if point <= 0 {
        out.push_str("0.");
        out.push_str(&"0".repeat((-point) as usize));
        out.push_str(digits);
    } else if digits.len() <= point as usize {
        out.push_str(digits);
        out.push_str(&"0".repeat(point as usize - digits.len()));
    } else {
        let (whole, fraction) = digits.split_at(point as usize);
        out.push_str(whole);
        out.push('.');
        out.push_str(fraction);
    }
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => f.write_str(&format_float(*fl)),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(arr) => write!(f, "Array[{}]", arr.len()),
            Value::Map(map) => write!(f, "Map{{{} entries}}", map.len()),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::None => "none",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Map => "map",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::None)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Value::Map(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Build a [`Fields`] map from `(key, value)` pairs.
pub fn fields<K, V, I>(pairs: I) -> Fields
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emptiness() {
        assert!(Value::None.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::from("0").is_empty());
        assert!(Value::from(false).is_empty());
        assert!(Value::from(0).is_empty());
        assert!(Value::from(0.0).is_empty());
        assert!(Value::Array(Vec::new()).is_empty());

        assert!(!Value::from("a").is_empty());
        assert!(!Value::from("0.0").is_empty());
        assert!(!Value::from(true).is_empty());
        assert!(!Value::from(-1).is_empty());
    }

    #[test]
    fn test_scalar_string() {
        assert_eq!(Value::from(true).to_scalar_string().as_deref(), Some("1"));
        assert_eq!(Value::from(false).to_scalar_string().as_deref(), Some(""));
        assert_eq!(Value::None.to_scalar_string().as_deref(), Some(""));
        assert_eq!(Value::from(123456).to_scalar_string().as_deref(), Some("123456"));
        assert_eq!(Value::from(1.5).to_scalar_string().as_deref(), Some("1.5"));
        assert!(Value::Array(vec![]).to_scalar_string().is_none());
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(2.0), "2");
        assert_eq!(format_float(-1.25), "-1.25");
        assert_eq!(format_float(0.1 + 0.2), "0.3");
        assert_eq!(format_float(1.0 / 3.0), "0.33333333333333");
        assert_eq!(format_float(1e13), "10000000000000");
        assert_eq!(format_float(1e14), "1.0E+14");
        assert_eq!(format_float(1e20), "1.0E+20");
        assert_eq!(format_float(-1.5e20), "-1.5E+20");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00001), "1.0E-5");
        assert_eq!(format_float(f64::INFINITY), "INF");
        assert_eq!(format_float(f64::NAN), "NAN");
        assert_eq!(Value::from(1e20).to_scalar_string().as_deref(), Some("1.0E+20"));
        assert_eq!(Value::from(1e20).to_string(), "1.0E+20");
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"name": "ana", "age": 31, "tags": ["a"], "ok": true, "x": null});
        let value = Value::from(json);
        let map = value.as_map().unwrap();
        assert_eq!(map["name"], Value::from("ana"));
        assert_eq!(map["age"], Value::Integer(31));
        assert_eq!(map["tags"].as_array().unwrap().len(), 1);
        assert_eq!(map["ok"], Value::Boolean(true));
        assert!(map["x"].is_none());
    }

    #[test]
    fn test_untagged_deserialize() {
        let data: Fields = serde_json::from_str(r#"{"email": "a@b.co", "age": 7}"#).unwrap();
        assert_eq!(data["email"].as_str(), Some("a@b.co"));
        assert_eq!(data["age"].as_integer(), Some(7));
    }
}
