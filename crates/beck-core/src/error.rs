//! Error types for the core data model

use crate::value::ValueType;
use thiserror::Error;

/// Errors raised by value access and coercion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A strict accessor (`as_*`) was called on a value of the wrong type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ValueType,
        found: ValueType,
    },

    /// No coercion exists from the source type to the target type.
    #[error("cannot convert {from} value into {to}")]
    Unconvertible { from: ValueType, to: &'static str },

    /// The value is representable in the source type but not in the target.
    #[error("value {value} out of range for {to}")]
    OutOfRange { value: String, to: &'static str },

    /// The input string is not in the format the target type expects.
    #[error("cannot parse {input:?} as {to}")]
    InvalidFormat { input: String, to: &'static str },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
