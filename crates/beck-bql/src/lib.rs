//! Continuous-query execution core for beck
//!
//! This crate executes the compiled form of one continuous query:
//!
//! ```sql
//! SELECT ISTREAM a:x AS x, f(b:y) AS out
//! FROM left [RANGE 3 TUPLES] AS a,
//!      right [RANGE 2 SECONDS] AS b
//! WHERE a:x % 2 = 0
//! ```
//!
//! For every arriving tuple the plan
//!
//! 1. appends the tuple to its input's windowed buffer and evicts expired
//!    rows,
//! 2. scans the cross-product of all buffer contents, evaluating the
//!    filter and the projection list over each combined row,
//! 3. diffs the new result bag against the previous one and emits
//!    insertions (`ISTREAM`), deletions (`DSTREAM`), or the full relation
//!    (`RSTREAM`).
//!
//! The crate also hosts the function registry and the generic function
//! adapter ([`udf`]) that turns typed Rust callables into
//! dynamically-typed UDFs with arity, variadic, and aggregation-parameter
//! semantics.
//!
//! ## What lives elsewhere
//!
//! Parsing the query text, planning (including `GROUP BY`), topology
//! wiring, and source/sink drivers are other components' jobs. This crate
//! receives a [`LogicalPlan`] value and a [`FunctionRegistry`] and does
//! the per-tuple work, synchronously, from ingest to emit.

pub mod error;
pub mod execution;
pub mod expr;
pub mod udf;
pub mod window;

pub use error::{BqlError, Result};
pub use execution::{
    EmissionMode, InputSpec, LogicalPlan, OutputPath, Projection, SelectPlan,
};
pub use expr::{BinaryOperator, Expression, UnaryOperator};
pub use udf::{convert, convert_aggregate, Context, FunctionRegistry, Udf, Variadic};
pub use window::{IntervalUnit, WindowBuffer, WindowSpec};
