//! Logical plan input types and output-path assignment

use std::fmt;

use beck_core::{Map, Value};
use serde::{Deserialize, Serialize};

use crate::error::{BqlError, Result};
use crate::expr::Expression;
use crate::window::WindowSpec;

/// What a query emits per arrival: new rows, removed rows, or the full
/// relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmissionMode {
    /// Rows that entered the result relation (`cur − prev`).
    Istream,
    /// Rows that left the result relation (`prev − cur`).
    Dstream,
    /// The full current relation.
    Rstream,
}

impl fmt::Display for EmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EmissionMode::Istream => "ISTREAM",
            EmissionMode::Dstream => "DSTREAM",
            EmissionMode::Rstream => "RSTREAM",
        };
        f.write_str(name)
    }
}

/// Where a projection writes its value in the result map: a dotted path
/// whose intermediate maps are created on demand. The empty path is the
/// result root, used by wildcard projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPath {
    segments: Vec<String>,
}

impl OutputPath {
    /// The result root; the assigned value must be a map and is merged
    /// into the result.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses a dotted alias like `"a.b"`. `"*"` is the root.
    pub fn from_dotted(path: &str) -> Self {
        if path.is_empty() || path == "*" {
            return Self::root();
        }
        Self {
            segments: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for OutputPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            f.write_str("*")
        } else {
            f.write_str(&self.segments.join("."))
        }
    }
}

/// One projected output column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub expression: Expression,
    pub alias: OutputPath,
}

impl Projection {
    pub fn new(expression: Expression, alias: OutputPath) -> Self {
        Self { expression, alias }
    }
}

/// One input of the query: an upstream stream, the alias it is joined
/// under, and its window.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    /// The alias column paths refer to. Aliases may rename the same
    /// upstream (self-join); each alias gets an independent buffer.
    pub alias: String,
    /// Name of the upstream stream this input reads.
    pub upstream: String,
    pub window: WindowSpec,
}

/// The planner's description of one continuous query, as handed to
/// [`SelectPlan::new`](crate::SelectPlan::new).
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalPlan {
    pub emission_mode: EmissionMode,
    pub projections: Vec<Projection>,
    pub filter: Option<Expression>,
    pub inputs: Vec<InputSpec>,
    /// Whether the statement groups (GROUP BY / aggregate projections).
    /// The default select plan does not handle grouping.
    pub grouping: bool,
}

/// Writes `value` into `target` at `path`, creating intermediate maps as
/// needed.
///
/// Writing through an existing non-map intermediate fails with
/// `PathCollision`, as does replacing an existing map leaf with a
/// non-map value (the projection list tried to use one name both as a
/// prefix and as a column).
pub(crate) fn assign_output_value(
    target: &mut Map,
    path: &OutputPath,
    value: Value,
) -> Result<()> {
    let segments = path.segments();
    let Some((last, init)) = segments.split_last() else {
        // root assignment: merge a map into the result
        match value {
            Value::Map(m) => {
                for (k, v) in m {
                    target.insert(k, v);
                }
                return Ok(());
            }
            other => {
                return Err(BqlError::Internal(format!(
                    "cannot merge a {} into the result root",
                    other.type_of()
                )))
            }
        }
    };

    let mut current = target;
    for segment in init {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Map(Map::new()));
        match entry {
            Value::Map(m) => current = m,
            _ => {
                return Err(BqlError::PathCollision {
                    path: path.to_string(),
                    segment: segment.clone(),
                })
            }
        }
    }
    if matches!(current.get(last), Some(Value::Map(_))) && !matches!(value, Value::Map(_)) {
        return Err(BqlError::PathCollision {
            path: path.to_string(),
            segment: last.clone(),
        });
    }
    current.insert(last.clone(), value);
    Ok(())
}
