use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::key::Key;

/// A concrete value carried by a filter condition.
///
/// Literal scalars come straight from the query text; the remaining
/// variants are produced by cast functions (`Date(...)`, `GeoPt(...)`,
/// `Key(...)`) or by schema coercion during lowering.
///
/// # Examples
///
/// ```
/// use gql_lang::Value;
///
/// let integer = Value::Integer(42);
/// let string = Value::String("xxx".to_string());
///
/// assert_eq!(integer.to_string(), "42");
/// assert_eq!(string.to_string(), "'xxx'");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,

    Boolean(bool),

    Integer(i64),

    Float(f64),

    String(String),

    /// Date, datetime or time-of-day; times sit on 1970-01-01
    Timestamp(NaiveDateTime),

    /// Geographic point
    GeoPt(GeoPt),

    /// Hierarchical entity identifier
    Key(Key),
}

impl Value {
    /// Get as float (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as integer; floats are not accepted
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::GeoPt(_) => "geopt",
            Value::Key(_) => "key",
        }
    }
}

/// Writes `n` in plain decimal with a fractional part, the only float form
/// the lexer reads back.
pub(crate) fn write_float(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    let text = n.to_string();
    if text.contains('.') || !n.is_finite() {
        f.write_str(&text)
    } else {
        write!(f, "{}.0", text)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write_float(f, *n),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Timestamp(ts) => write!(f, "datetime('{}')", ts.format("%Y-%m-%d %H:%M:%S")),
            Value::GeoPt(pt) => write!(f, "{}", pt),
            Value::Key(key) => write!(f, "{}", key),
        }
    }
}

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPt {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPt {
    /// Builds a point, rejecting coordinates outside the valid ranges.
    pub fn new(lat: f64, lon: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!("latitude must be between -90 and 90; received {}", lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(format!("longitude must be between -180 and 180; received {}", lon));
        }
        Ok(GeoPt { lat, lon })
    }
}

impl fmt::Display for GeoPt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GeoPt(")?;
        write_float(f, self.lat)?;
        f.write_str(", ")?;
        write_float(f, self.lon)?;
        f.write_str(")")
    }
}
