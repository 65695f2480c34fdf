//! Window buffers
//!
//! Each input of a plan keeps a [`WindowBuffer`]: the recent history of
//! that input, bounded by a tuple count or a time range. Buffers hold
//! tuples in arrival order; after every append the buffer satisfies its
//! [`WindowSpec`] again.

use std::collections::VecDeque;

use beck_core::Tuple;
use chrono::{DateTime, Duration, Utc};

use crate::error::{BqlError, Result};

/// Time units accepted by the planner's `RANGE d {SECONDS|MILLISECONDS|
/// MICROSECONDS}` grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnit {
    Seconds,
    Milliseconds,
    Microseconds,
}

/// How much history a buffer retains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowSpec {
    /// Keep the N most recent tuples (`RANGE N TUPLES`).
    Tuples(usize),
    /// Keep every tuple whose timestamp is within the duration of the
    /// newest timestamp seen on the input (`RANGE d SECONDS` etc).
    Time(Duration),
}

impl WindowSpec {
    /// Builds a count-based window.
    pub fn tuples(count: usize) -> Self {
        WindowSpec::Tuples(count)
    }

    /// Builds a time-based window from the planner grammar's amount/unit
    /// pair.
    pub fn time(amount: i64, unit: IntervalUnit) -> Self {
        let duration = match unit {
            IntervalUnit::Seconds => Duration::seconds(amount),
            IntervalUnit::Milliseconds => Duration::milliseconds(amount),
            IntervalUnit::Microseconds => Duration::microseconds(amount),
        };
        WindowSpec::Time(duration)
    }

    /// Rejects degenerate windows at plan construction.
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            WindowSpec::Tuples(0) => Err(BqlError::Config(
                "a tuple window must keep at least one tuple".to_string(),
            )),
            WindowSpec::Time(d) if *d <= Duration::zero() => Err(BqlError::Config(
                "a time window must span a positive duration".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// The buffered recent history of one input.
#[derive(Debug)]
pub struct WindowBuffer {
    spec: WindowSpec,
    tuples: VecDeque<Tuple>,
    /// Maximum timestamp ever observed on this input. Never decreases,
    /// even when tuples arrive out of order; time eviction measures
    /// against this reference, not wall clock.
    reference: Option<DateTime<Utc>>,
}

impl WindowBuffer {
    pub fn new(spec: WindowSpec) -> Self {
        Self {
            spec,
            tuples: VecDeque::new(),
            reference: None,
        }
    }

    /// Appends a tuple, then evicts whatever the window spec no longer
    /// covers.
    pub fn append(&mut self, tuple: Tuple) {
        let timestamp = tuple.timestamp;
        self.tuples.push_back(tuple);
        self.reference = Some(match self.reference {
            Some(r) => r.max(timestamp),
            None => timestamp,
        });
        self.evict();
    }

    fn evict(&mut self) {
        match &self.spec {
            WindowSpec::Tuples(n) => {
                while self.tuples.len() > *n {
                    self.tuples.pop_front();
                }
            }
            WindowSpec::Time(d) => {
                let Some(reference) = self.reference else {
                    return;
                };
                let cutoff = reference - *d;
                // arrival order is not timestamp order, so a stale tuple
                // can sit behind a fresh one; scan the whole buffer
                self.tuples.retain(|t| t.timestamp >= cutoff);
            }
        }
    }

    /// Ordered view (arrival order) of the buffered tuples.
    pub fn tuples(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}
