//! Scalar values, records and table definitions

mod coercion;
mod table;

pub use coercion::{compare_for_sort, key_string, loose_eq, strict_eq, to_number};
pub use table::{ColumnDef, ColumnType, Table, TableSchema};

use serde::{Deserialize, Serialize};

/// Scalar value stored in a record
///
/// Serialized as a plain JSON scalar. An absent column is not a `Value`;
/// comparison helpers take `Option<&Value>` so that "absent" and `Null` stay
/// distinguishable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,

    /// Boolean value
    Bool(bool),

    /// Integer value
    Integer(i64),

    /// Floating point value
    Float(f64),

    /// Text string
    Text(String),
}

/// Largest integer an f64 holds exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Value {
    /// Build a numeric value, using `Integer` for whole numbers.
    ///
    /// Non-finite results (empty AVG, MAX over nothing) become `Null`.
    pub fn from_f64(n: f64) -> Self {
        if !n.is_finite() {
            Value::Null
        } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
            Value::Integer(n as i64)
        } else {
            Value::Float(n)
        }
    }

    /// Numeric view of `Integer` and `Float`; `None` for everything else
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A record: lower-cased column name -> value, in insertion order
pub type SqlRow = indexmap::IndexMap<String, Value>;
