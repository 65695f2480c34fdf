//! Dynamic value types
//!
//! [`Value`] is the tagged union every tuple field, expression result, and
//! UDF argument is made of. Maps are ordered by key (no insertion order is
//! preserved), equality is structural, and the `Eq`/`Hash` implementations
//! are canonical: NaN equals NaN and `-0.0` hashes like `0.0`, so values
//! can be used as multiset keys when diffing result bags.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A string-keyed mapping of values. This is the payload shape of tuples
/// and of query result rows.
pub type Map = BTreeMap<String, Value>;

/// A dynamically-typed value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Absent or unknown value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Binary data
    Blob(Vec<u8>),
    /// Point in time (UTC)
    Timestamp(DateTime<Utc>),
    /// Ordered sequence of values
    Array(Vec<Value>),
    /// String-keyed mapping of values
    Map(Map),
}

/// The type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Float,
    String,
    Blob,
    Timestamp,
    Array,
    Map,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Blob => "blob",
            ValueType::Timestamp => "timestamp",
            ValueType::Array => "array",
            ValueType::Map => "map",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Returns the type tag of this value.
    pub fn type_of(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Blob(_) => ValueType::Blob,
            Value::Timestamp(_) => ValueType::Timestamp,
            Value::Array(_) => ValueType::Array,
            Value::Map(_) => ValueType::Map,
        }
    }

    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn mismatch(&self, expected: ValueType) -> CoreError {
        CoreError::TypeMismatch {
            expected,
            found: self.type_of(),
        }
    }

    /// Returns the boolean if this is a Bool, an error otherwise.
    pub fn as_bool(&self) -> Result<bool, CoreError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch(ValueType::Bool)),
        }
    }

    /// Returns the integer if this is an Int, an error otherwise.
    pub fn as_int(&self) -> Result<i64, CoreError> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.mismatch(ValueType::Int)),
        }
    }

    /// Returns the float if this is a Float, an error otherwise.
    pub fn as_float(&self) -> Result<f64, CoreError> {
        match self {
            Value::Float(f) => Ok(*f),
            other => Err(other.mismatch(ValueType::Float)),
        }
    }

    /// Returns a reference to the string if this is a String, an error otherwise.
    pub fn as_str(&self) -> Result<&str, CoreError> {
        match self {
            Value::String(s) => Ok(s.as_str()),
            other => Err(other.mismatch(ValueType::String)),
        }
    }

    /// Returns a reference to the bytes if this is a Blob, an error otherwise.
    pub fn as_blob(&self) -> Result<&[u8], CoreError> {
        match self {
            Value::Blob(b) => Ok(b.as_slice()),
            other => Err(other.mismatch(ValueType::Blob)),
        }
    }

    /// Returns the timestamp if this is a Timestamp, an error otherwise.
    pub fn as_timestamp(&self) -> Result<DateTime<Utc>, CoreError> {
        match self {
            Value::Timestamp(t) => Ok(*t),
            other => Err(other.mismatch(ValueType::Timestamp)),
        }
    }

    /// Returns a reference to the elements if this is an Array, an error otherwise.
    pub fn as_array(&self) -> Result<&[Value], CoreError> {
        match self {
            Value::Array(a) => Ok(a.as_slice()),
            other => Err(other.mismatch(ValueType::Array)),
        }
    }

    /// Returns a reference to the map if this is a Map, an error otherwise.
    pub fn as_map(&self) -> Result<&Map, CoreError> {
        match self {
            Value::Map(m) => Ok(m),
            other => Err(other.mismatch(ValueType::Map)),
        }
    }

    /// Converts a `serde_json::Value` into a [`Value`].
    ///
    /// JSON numbers become Int when they are exact integers and Float
    /// otherwise; JSON has no blob or timestamp representation, so those
    /// types never come out of this conversion.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(a) => Value::Array(a.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(o) => Value::Map(
                o.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts this value into a `serde_json::Value` for driver interop.
    ///
    /// Blobs are rendered as base64 strings and timestamps as RFC 3339
    /// strings; non-finite floats become null (JSON cannot carry them).
    pub fn to_json(&self) -> serde_json::Value {
        use base64::{engine::general_purpose::STANDARD, Engine};
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Blob(b) => serde_json::Value::String(STANDARD.encode(b)),
            Value::Timestamp(t) => serde_json::Value::String(t.to_rfc3339()),
            Value::Array(a) => serde_json::Value::Array(a.iter().map(Value::to_json).collect()),
            Value::Map(m) => serde_json::Value::Object(
                m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => {
                // NaN compares equal to itself so bags of results with NaN
                // fields still diff structurally
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Blob(a), Value::Blob(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => {
                // normalize so that Eq and Hash agree: all NaNs hash alike,
                // and -0.0 hashes like 0.0
                let bits = if f.is_nan() {
                    f64::NAN.to_bits()
                } else if *f == 0.0 {
                    0f64.to_bits()
                } else {
                    f.to_bits()
                };
                bits.hash(state);
            }
            Value::String(s) => s.hash(state),
            Value::Blob(b) => b.hash(state),
            Value::Timestamp(t) => t.hash(state),
            Value::Array(a) => a.hash(state),
            Value::Map(m) => m.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
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

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Value::Map(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}
