//! Tuple data structure
//!
//! A [`Tuple`] is the fundamental unit of data flowing through a beck
//! topology: a dynamic data map, the event timestamp, and an opaque trace
//! that execution nodes pass through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::Map;

/// One entry of a tuple's processing trace.
///
/// Traces are produced and consumed by the topology runtime; the query
/// core never inspects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// Free-form description (e.g. the node the tuple passed).
    pub message: String,
}

/// A single event in a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuple {
    /// The payload.
    pub data: Map,

    /// Event timestamp.
    pub timestamp: DateTime<Utc>,

    /// Opaque processing trace, passed through untouched.
    #[serde(default)]
    pub trace: Vec<TraceEvent>,
}

impl Tuple {
    pub fn new(data: Map, timestamp: DateTime<Utc>) -> Self {
        Self {
            data,
            timestamp,
            trace: Vec::new(),
        }
    }
}
