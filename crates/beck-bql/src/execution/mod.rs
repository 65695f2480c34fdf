//! Execution plans
//!
//! The compiled, executable form of one continuous query. A
//! [`SelectPlan`] is built from a [`LogicalPlan`] plus a function
//! registry, owns one window buffer per input, and turns every arriving
//! tuple into a batch of emitted result maps according to the query's
//! emission mode.

mod differ;
mod plan;
mod select;

pub use plan::{EmissionMode, InputSpec, LogicalPlan, OutputPath, Projection};
pub use select::SelectPlan;
