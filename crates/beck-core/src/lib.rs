//! Core data model for the beck streaming query engine.
//!
//! This crate defines the fundamental types that flow through a beck
//! topology:
//!
//! - [`Value`]: a dynamically-typed, tagged value (null, bool, int, float,
//!   string, blob, timestamp, array, map)
//! - [`Map`]: a string-keyed mapping of values, the payload shape of every
//!   tuple and every query result row
//! - [`Tuple`]: a single event, consisting of a data map, an event
//!   timestamp, and an opaque trace
//! - [`convert`]: the coercion rules between value types
//!
//! Everything here is deterministic and allocation-only; no I/O happens in
//! this crate.

pub mod convert;
pub mod error;
pub mod tuple;
pub mod value;

pub use error::{CoreError, Result};
pub use tuple::{TraceEvent, Tuple};
pub use value::{Map, Value, ValueType};
