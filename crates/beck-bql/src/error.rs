//! BQL execution errors

use beck_core::CoreError;
use thiserror::Error;

/// Errors raised while constructing or running an execution plan.
///
/// The taxonomy is flat: every error that leaves
/// [`SelectPlan::process`](crate::SelectPlan::process) is one of these
/// kinds, unchanged by intermediate layers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BqlError {
    /// The plan was rejected at construction, or an arrival named an
    /// unknown input.
    #[error("configuration error: {0}")]
    Config(String),

    /// A function was called with an argument count it does not accept.
    #[error("function '{function}' does not accept {got} argument(s)")]
    Arity { function: String, got: usize },

    /// A coercion failed, a narrowing went out of range, or an operator
    /// saw unsupported operand types.
    #[error("type error: {0}")]
    Type(String),

    /// A projection alias path tried to write through a non-map value.
    #[error("cannot write through non-map value at '{segment}' in output path '{path}'")]
    PathCollision { path: String, segment: String },

    /// A user-defined function failed on its own terms.
    #[error("function '{function}' failed: {message}")]
    Udf { function: String, message: String },

    /// An invariant was violated. Seeing this is a bug.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for BqlError {
    fn from(e: CoreError) -> Self {
        BqlError::Type(e.to_string())
    }
}

/// Result type for BQL operations
pub type Result<T> = std::result::Result<T, BqlError>;
