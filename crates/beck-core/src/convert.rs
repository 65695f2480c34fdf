//! Value coercions
//!
//! Every coercion between value types lives in this module. Coercions are
//! deterministic and pure: the same input always yields the same output or
//! the same error kind. The strict (`as_*`) accessors on [`Value`] never
//! convert; these functions do.
//!
//! Coercion table (excerpt):
//!
//! | from \ to   | bool      | int           | float        | string  | blob   | timestamp |
//! |-------------|-----------|---------------|--------------|---------|--------|-----------|
//! | Null        | false     | -             | -            | "null"  | -      | -         |
//! | Bool        | id        | 0 / 1         | 0.0 / 1.0    | yes     | -      | -         |
//! | Int         | `!= 0`    | id            | yes          | yes     | -      | unix secs |
//! | Float       | `!= 0.0`  | round, ranged | id           | yes     | -      | secs      |
//! | String      | parse     | parse         | parse        | id      | base64 | RFC 3339  |
//! | Blob        | -         | -             | -            | base64  | id     | -         |
//! | Timestamp   | -         | unix secs     | secs + frac  | RFC3339 | -      | id        |
//!
//! Arrays and maps accept no scalar coercion; `to_string` renders them as
//! JSON. Narrowing conversions (`to_i8` .. `to_u64`, `to_f32`) fail when
//! the value falls outside the target range.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};

use crate::error::{CoreError, Result};
use crate::value::Value;

/// Coerces a value to bool.
///
/// Null is false; numbers are true when nonzero; strings parse as
/// `"true"` / `"false"` (case-insensitive).
pub fn to_bool(v: &Value) -> Result<bool> {
    match v {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Int(i) => Ok(*i != 0),
        Value::Float(f) => Ok(*f != 0.0),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(CoreError::InvalidFormat {
                input: s.clone(),
                to: "bool",
            }),
        },
        other => Err(CoreError::Unconvertible {
            from: other.type_of(),
            to: "bool",
        }),
    }
}

/// Coerces a value to a 64-bit integer.
///
/// Floats are rounded half away from zero and must fit in the i64 range;
/// timestamps convert to Unix seconds.
pub fn to_int(v: &Value) -> Result<i64> {
    match v {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Int(i) => Ok(*i),
        Value::Float(f) => {
            let rounded = f.round();
            if !rounded.is_finite()
                || rounded < i64::MIN as f64
                || rounded >= i64::MAX as f64
            {
                return Err(CoreError::OutOfRange {
                    value: format!("{f}"),
                    to: "int",
                });
            }
            Ok(rounded as i64)
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| CoreError::InvalidFormat {
            input: s.clone(),
            to: "int",
        }),
        Value::Timestamp(t) => Ok(t.timestamp()),
        other => Err(CoreError::Unconvertible {
            from: other.type_of(),
            to: "int",
        }),
    }
}

/// Coerces a value to a 64-bit float.
pub fn to_float(v: &Value) -> Result<f64> {
    match v {
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| CoreError::InvalidFormat {
            input: s.clone(),
            to: "float",
        }),
        Value::Timestamp(t) => {
            Ok(t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) / 1e9)
        }
        other => Err(CoreError::Unconvertible {
            from: other.type_of(),
            to: "float",
        }),
    }
}

/// Coerces a value to a string.
///
/// Total: blobs render as base64, timestamps as RFC 3339, arrays and maps
/// as JSON.
pub fn to_string(v: &Value) -> Result<String> {
    match v {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Blob(b) => Ok(STANDARD.encode(b)),
        Value::Timestamp(t) => Ok(t.to_rfc3339()),
        Value::Array(_) | Value::Map(_) => Ok(v.to_json().to_string()),
    }
}

/// Coerces a value to a blob. Strings are decoded as standard base64.
pub fn to_blob(v: &Value) -> Result<Vec<u8>> {
    match v {
        Value::Blob(b) => Ok(b.clone()),
        Value::String(s) => STANDARD.decode(s).map_err(|_| CoreError::InvalidFormat {
            input: s.clone(),
            to: "blob",
        }),
        other => Err(CoreError::Unconvertible {
            from: other.type_of(),
            to: "blob",
        }),
    }
}

/// Coerces a value to a timestamp.
///
/// Integers are Unix seconds, floats are Unix seconds with a fractional
/// part, strings are parsed as RFC 3339.
pub fn to_timestamp(v: &Value) -> Result<DateTime<Utc>> {
    match v {
        Value::Timestamp(t) => Ok(*t),
        Value::Int(i) => DateTime::from_timestamp(*i, 0).ok_or(CoreError::OutOfRange {
            value: i.to_string(),
            to: "timestamp",
        }),
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(CoreError::OutOfRange {
                    value: format!("{f}"),
                    to: "timestamp",
                });
            }
            let secs = f.floor();
            let nanos = ((f - secs) * 1e9) as u32;
            DateTime::from_timestamp(secs as i64, nanos).ok_or(CoreError::OutOfRange {
                value: format!("{f}"),
                to: "timestamp",
            })
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| CoreError::InvalidFormat {
                input: s.clone(),
                to: "timestamp",
            }),
        other => Err(CoreError::Unconvertible {
            from: other.type_of(),
            to: "timestamp",
        }),
    }
}

macro_rules! narrowing_int {
    ($($name:ident => $ty:ty, $label:expr;)*) => {
        $(
            #[doc = concat!("Coerces a value to `", stringify!($ty), "`, failing outside the target range.")]
            pub fn $name(v: &Value) -> Result<$ty> {
                let wide = to_int(v)?;
                <$ty>::try_from(wide).map_err(|_| CoreError::OutOfRange {
                    value: wide.to_string(),
                    to: $label,
                })
            }
        )*
    };
}

narrowing_int! {
    to_i8 => i8, "int8";
    to_i16 => i16, "int16";
    to_i32 => i32, "int32";
    to_u8 => u8, "uint8";
    to_u16 => u16, "uint16";
    to_u32 => u32, "uint32";
    to_u64 => u64, "uint64";
}

/// Coerces a value to `f32`, failing when the magnitude exceeds the f32
/// range.
pub fn to_f32(v: &Value) -> Result<f32> {
    let wide = to_float(v)?;
    if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
        return Err(CoreError::OutOfRange {
            value: format!("{wide}"),
            to: "float32",
        });
    }
    Ok(wide as f32)
}
