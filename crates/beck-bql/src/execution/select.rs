//! The stream-relation-stream select plan
//!
//! Follows the theoretical processing model directly. After each tuple
//! arrives,
//!
//! - the arrival input's window buffer is updated,
//! - a SELECT is run over the cross-product of all buffer contents,
//! - the result bag is compared with the previous run's bag, and the
//!   difference dictated by the emission mode is returned.
//!
//! This plan does not support aggregation or grouping; construction
//! rejects grouping statements.

use std::collections::{BTreeMap, BTreeSet};
use std::mem;

use beck_core::{convert, Map, Tuple, Value};
use tracing::{debug, trace};

use crate::error::{BqlError, Result};
use crate::expr::Evaluator;
use crate::udf::{Context, FunctionRegistry};
use crate::window::WindowBuffer;

use super::differ;
use super::plan::{assign_output_value, EmissionMode, LogicalPlan, OutputPath};

#[derive(Debug)]
struct CompiledProjection {
    evaluator: Evaluator,
    alias: OutputPath,
}

/// The executable form of one non-grouping continuous query.
///
/// A plan is owned by exactly one executor; [`process`](Self::process) is
/// never re-entered concurrently. All state (buffers and result bags) is
/// exclusive to the plan.
#[derive(Debug)]
pub struct SelectPlan {
    emission_mode: EmissionMode,
    filter: Option<Evaluator>,
    projections: Vec<CompiledProjection>,
    /// One buffer per input alias; iterated in alias order, which keeps
    /// the scan order stable within a call.
    buffers: BTreeMap<String, WindowBuffer>,
    /// Results of the previous run.
    prev_results: Vec<Map>,
    /// Results of the current run.
    cur_results: Vec<Map>,
    ctx: Context,
}

impl SelectPlan {
    /// Compiles a logical plan against a function registry.
    ///
    /// Fails with a configuration error when the statement groups, when
    /// an input alias is duplicated, when a window spec is degenerate, or
    /// when an expression references an unknown input or function.
    pub fn new(plan: &LogicalPlan, registry: &FunctionRegistry) -> Result<Self> {
        if plan.grouping {
            return Err(BqlError::Config(
                "the default select plan does not support grouping statements".to_string(),
            ));
        }
        if plan.inputs.is_empty() {
            return Err(BqlError::Config(
                "a select plan needs at least one input".to_string(),
            ));
        }
        if plan.projections.is_empty() {
            return Err(BqlError::Config(
                "a select plan needs at least one projection".to_string(),
            ));
        }

        let mut buffers = BTreeMap::new();
        for input in &plan.inputs {
            input.window.validate()?;
            if buffers
                .insert(input.alias.clone(), WindowBuffer::new(input.window.clone()))
                .is_some()
            {
                return Err(BqlError::Config(format!(
                    "duplicate input alias '{}'",
                    input.alias
                )));
            }
        }
        let aliases: BTreeSet<String> = buffers.keys().cloned().collect();

        let filter = plan
            .filter
            .as_ref()
            .map(|f| Evaluator::compile(f, &aliases, registry))
            .transpose()?;
        let projections = plan
            .projections
            .iter()
            .map(|p| {
                Ok(CompiledProjection {
                    evaluator: Evaluator::compile(&p.expression, &aliases, registry)?,
                    alias: p.alias.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            mode = %plan.emission_mode,
            inputs = buffers.len(),
            projections = projections.len(),
            filtered = filter.is_some(),
            "select plan constructed"
        );

        Ok(Self {
            emission_mode: plan.emission_mode,
            filter,
            projections,
            buffers,
            prev_results: Vec::new(),
            cur_results: Vec::new(),
            ctx: Context::default(),
        })
    }

    /// Processes one arriving tuple and returns the records this arrival
    /// emits. The order of the returned records is undefined.
    ///
    /// The buffer append is committed before evaluation begins; on an
    /// evaluation error the result bags are rolled back so the next call
    /// behaves as if this one had never happened, and the error is
    /// returned unchanged in kind.
    pub fn process(&mut self, input: &str, tuple: Tuple) -> Result<Vec<Map>> {
        let buffer = self.buffers.get_mut(input).ok_or_else(|| {
            BqlError::Config(format!("this plan has no input named '{input}'"))
        })?;
        buffer.append(tuple);
        let buffered = buffer.len();

        self.perform_query_on_buffer()?;

        let emitted = differ::emitted_records(
            self.emission_mode,
            &self.prev_results,
            &self.cur_results,
        );
        trace!(
            input = %input,
            buffered,
            results = self.cur_results.len(),
            emitted = emitted.len(),
            "processed arrival"
        );
        Ok(emitted)
    }

    /// Runs the SELECT over the buffered tuples, rotating the result
    /// bags: the bag computed by the previous run becomes `prev_results`
    /// and the fresh results become `cur_results`, reusing the storage
    /// that held the now-discarded older bag.
    ///
    /// On error the rotation is reverted: `cur_results` gets its pre-call
    /// contents back (callers must still treat them as undefined) and
    /// `prev_results` gets back its pre-call backing storage, so the next
    /// run starts from the correct previous bag.
    fn perform_query_on_buffer(&mut self) -> Result<()> {
        let mut output = mem::take(&mut self.prev_results);
        output.clear();
        self.prev_results = mem::take(&mut self.cur_results);

        match self.scan_into(&mut output) {
            Ok(()) => {
                self.cur_results = output;
                Ok(())
            }
            Err(e) => {
                self.cur_results = mem::replace(&mut self.prev_results, output);
                Err(e)
            }
        }
    }

    /// Scans the cross-product of all buffers, appending one result map
    /// per row that passes the filter.
    fn scan_into(&self, output: &mut Vec<Map>) -> Result<()> {
        let order: Vec<(&String, &WindowBuffer)> = self.buffers.iter().collect();
        // the combined row {alias -> tuple data} is reused across the
        // whole scan; each odometer step overwrites one entry
        let mut row = Map::new();
        self.scan_product(&order, &mut row, output)
    }

    fn scan_product(
        &self,
        remaining: &[(&String, &WindowBuffer)],
        row: &mut Map,
        output: &mut Vec<Map>,
    ) -> Result<()> {
        let Some(((alias, buffer), rest)) = remaining.split_first() else {
            return self.eval_row(row, output);
        };
        for tuple in buffer.tuples() {
            row.insert((*alias).clone(), Value::Map(tuple.data.clone()));
            self.scan_product(rest, row, output)?;
        }
        Ok(())
    }

    /// Evaluates the filter and, when it holds, the projections for one
    /// combined row.
    fn eval_row(&self, row: &Map, output: &mut Vec<Map>) -> Result<()> {
        if let Some(filter) = &self.filter {
            let verdict = filter.eval(row, &self.ctx)?;
            // to_bool maps Null to false, so a Null filter skips the row
            if !convert::to_bool(&verdict)? {
                return Ok(());
            }
        }
        let mut result = Map::new();
        for projection in &self.projections {
            let value = projection.evaluator.eval(row, &self.ctx)?;
            assign_output_value(&mut result, &projection.alias, value)?;
        }
        output.push(result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinaryOperator, Expression};
    use crate::window::{IntervalUnit, WindowSpec};
    use beck_core::Value;
    use chrono::DateTime;

    use super::super::plan::{InputSpec, Projection};

    fn input(alias: &str, window: WindowSpec) -> InputSpec {
        InputSpec {
            alias: alias.to_string(),
            upstream: "s".to_string(),
            window,
        }
    }

    fn int_tuple(i: i64, secs: i64) -> Tuple {
        let mut data = Map::new();
        data.insert("int".to_string(), Value::Int(i));
        Tuple::new(data, DateTime::from_timestamp(secs, 0).unwrap())
    }

    fn select_int_plan(mode: EmissionMode, window: WindowSpec) -> LogicalPlan {
        LogicalPlan {
            emission_mode: mode,
            projections: vec![Projection::new(
                Expression::path("s.int"),
                OutputPath::from_dotted("int"),
            )],
            filter: None,
            inputs: vec![input("s", window)],
            grouping: false,
        }
    }

    fn registry() -> FunctionRegistry {
        FunctionRegistry::with_builtins()
    }

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    #[test]
    fn test_grouping_plans_are_rejected() {
        let mut plan = select_int_plan(EmissionMode::Rstream, WindowSpec::tuples(1));
        plan.grouping = true;
        let err = SelectPlan::new(&plan, &registry()).unwrap_err();
        assert!(matches!(err, BqlError::Config(_)));
    }

    #[test]
    fn test_duplicate_alias_is_rejected() {
        let mut plan = select_int_plan(EmissionMode::Rstream, WindowSpec::tuples(1));
        plan.inputs.push(input("s", WindowSpec::tuples(2)));
        let err = SelectPlan::new(&plan, &registry()).unwrap_err();
        assert!(matches!(err, BqlError::Config(_)));
    }

    #[test]
    fn test_degenerate_window_is_rejected() {
        let plan = select_int_plan(EmissionMode::Rstream, WindowSpec::tuples(0));
        assert!(SelectPlan::new(&plan, &registry()).is_err());
        let plan = select_int_plan(
            EmissionMode::Rstream,
            WindowSpec::time(0, IntervalUnit::Seconds),
        );
        assert!(SelectPlan::new(&plan, &registry()).is_err());
    }

    #[test]
    fn test_empty_inputs_or_projections_are_rejected() {
        let mut plan = select_int_plan(EmissionMode::Rstream, WindowSpec::tuples(1));
        plan.inputs.clear();
        assert!(SelectPlan::new(&plan, &registry()).is_err());

        let mut plan = select_int_plan(EmissionMode::Rstream, WindowSpec::tuples(1));
        plan.projections.clear();
        assert!(SelectPlan::new(&plan, &registry()).is_err());
    }

    #[test]
    fn test_unknown_column_fails_construction() {
        let mut plan = select_int_plan(EmissionMode::Rstream, WindowSpec::tuples(1));
        plan.filter = Some(Expression::path("other.int"));
        let err = SelectPlan::new(&plan, &registry()).unwrap_err();
        assert!(matches!(err, BqlError::Config(_)));
    }

    // ---------------------------------------------------------------
    // Processing
    // ---------------------------------------------------------------

    #[test]
    fn test_arrival_on_unknown_input_fails() {
        let plan = select_int_plan(EmissionMode::Rstream, WindowSpec::tuples(1));
        let mut ep = SelectPlan::new(&plan, &registry()).unwrap();
        let err = ep.process("nope", int_tuple(1, 0)).unwrap_err();
        assert!(matches!(err, BqlError::Config(_)));
        // and the known input still works
        assert_eq!(ep.process("s", int_tuple(1, 0)).unwrap().len(), 1);
    }

    #[test]
    fn test_rstream_reflects_window_contents() {
        let plan = select_int_plan(EmissionMode::Rstream, WindowSpec::tuples(2));
        let mut ep = SelectPlan::new(&plan, &registry()).unwrap();
        assert_eq!(ep.process("s", int_tuple(1, 0)).unwrap().len(), 1);
        assert_eq!(ep.process("s", int_tuple(2, 1)).unwrap().len(), 2);
        assert_eq!(ep.process("s", int_tuple(3, 2)).unwrap().len(), 2);
    }

    #[test]
    fn test_result_bags_rotate_between_calls() {
        let plan = select_int_plan(EmissionMode::Rstream, WindowSpec::tuples(2));
        let mut ep = SelectPlan::new(&plan, &registry()).unwrap();
        ep.process("s", int_tuple(1, 0)).unwrap();
        let after_first = ep.cur_results.clone();
        ep.process("s", int_tuple(2, 1)).unwrap();
        assert_eq!(ep.prev_results, after_first);
    }

    // ---------------------------------------------------------------
    // Rollback discipline
    // ---------------------------------------------------------------

    /// A plan whose projection divides by `s.int`, so a tuple with
    /// `int = 0` fails the scan.
    fn fragile_plan() -> LogicalPlan {
        LogicalPlan {
            emission_mode: EmissionMode::Rstream,
            projections: vec![Projection::new(
                Expression::BinaryOp {
                    op: BinaryOperator::Div,
                    lhs: Box::new(Expression::Literal(Value::Int(100))),
                    rhs: Box::new(Expression::path("s.int")),
                },
                OutputPath::from_dotted("q"),
            )],
            filter: None,
            inputs: vec![input("s", WindowSpec::tuples(1))],
            grouping: false,
        }
    }

    #[test]
    fn test_failed_scan_reports_the_error_kind_unchanged() {
        let mut ep = SelectPlan::new(&fragile_plan(), &registry()).unwrap();
        ep.process("s", int_tuple(4, 0)).unwrap();
        let err = ep.process("s", int_tuple(0, 1)).unwrap_err();
        assert!(matches!(err, BqlError::Type(_)));
    }

    #[test]
    fn test_failed_scan_restores_result_bags() {
        let mut ep = SelectPlan::new(&fragile_plan(), &registry()).unwrap();
        ep.process("s", int_tuple(4, 0)).unwrap();
        ep.process("s", int_tuple(5, 1)).unwrap();

        let prev_storage = ep.prev_results.as_ptr();
        let cur_before = ep.cur_results.clone();

        ep.process("s", int_tuple(0, 2)).unwrap_err();

        // prev has its pre-call backing storage back (identity), cur its
        // pre-call contents
        assert_eq!(ep.prev_results.as_ptr(), prev_storage);
        assert_eq!(ep.cur_results, cur_before);
    }

    #[test]
    fn test_processing_recovers_after_a_failed_call() {
        let mut ep = SelectPlan::new(&fragile_plan(), &registry()).unwrap();
        ep.process("s", int_tuple(4, 0)).unwrap();
        ep.process("s", int_tuple(0, 1)).unwrap_err();

        // the poisoned tuple was still appended; the next good tuple
        // evicts it (RANGE 1 TUPLES) and the plan continues cleanly
        let emitted = ep.process("s", int_tuple(10, 2)).unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].get("q"), Some(&Value::Int(10)));
    }
}
