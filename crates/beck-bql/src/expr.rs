//! Expression trees and their evaluation
//!
//! The planner hands the plan an [`Expression`] tree per filter and
//! projection. At plan construction the tree is compiled into an
//! [`Evaluator`]: function calls are resolved against the registry and
//! path heads are checked against the declared input aliases, so a plan
//! that constructs successfully cannot hit an unknown name at runtime.
//!
//! Null semantics follow the dialect: arithmetic on Null is Null,
//! comparison with Null is Null, and AND/OR use three-valued logic. The
//! WHERE clause coerces its result with `to_bool`, which maps Null to
//! false.

use std::collections::BTreeSet;
use std::sync::Arc;

use beck_core::{Map, Value};
use serde::{Deserialize, Serialize};

use crate::error::{BqlError, Result};
use crate::udf::{Context, FunctionRegistry, Udf};

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// Numeric negation
    Neg,
    /// Boolean NOT
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

/// An expression as received from the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// A constant value.
    Literal(Value),
    /// Access into the combined row: the first segment names an input
    /// alias, the rest descend into the tuple's data map.
    Path(Vec<String>),
    /// All columns of all inputs, merged.
    Wildcard,
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expression>,
    },
    BinaryOp {
        op: BinaryOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    /// Convenience constructor for an alias-qualified column path like
    /// `"s.int"`.
    pub fn path(dotted: &str) -> Self {
        Expression::Path(dotted.split('.').map(str::to_string).collect())
    }
}

/// A compiled expression: functions resolved, names validated.
pub(crate) enum Evaluator {
    Literal(Value),
    Path(Vec<String>),
    Wildcard,
    Unary {
        op: UnaryOperator,
        expr: Box<Evaluator>,
    },
    Binary {
        op: BinaryOperator,
        lhs: Box<Evaluator>,
        rhs: Box<Evaluator>,
    },
    Func {
        name: String,
        udf: Arc<dyn Udf>,
        args: Vec<Evaluator>,
    },
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Evaluator::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Evaluator::Path(segments) => f.debug_tuple("Path").field(segments).finish(),
            Evaluator::Wildcard => write!(f, "Wildcard"),
            Evaluator::Unary { op, expr } => f
                .debug_struct("Unary")
                .field("op", op)
                .field("expr", expr)
                .finish(),
            Evaluator::Binary { op, lhs, rhs } => f
                .debug_struct("Binary")
                .field("op", op)
                .field("lhs", lhs)
                .field("rhs", rhs)
                .finish(),
            Evaluator::Func { name, args, .. } => f
                .debug_struct("Func")
                .field("name", name)
                .field("args", args)
                .finish(),
        }
    }
}

impl Evaluator {
    /// Compiles an expression, failing on unknown input aliases, unknown
    /// functions, and argument counts the function cannot accept.
    pub(crate) fn compile(
        expr: &Expression,
        aliases: &BTreeSet<String>,
        registry: &FunctionRegistry,
    ) -> Result<Self> {
        match expr {
            Expression::Literal(v) => Ok(Evaluator::Literal(v.clone())),
            Expression::Path(segments) => {
                let head = segments.first().ok_or_else(|| {
                    BqlError::Config("a column path must not be empty".to_string())
                })?;
                if !aliases.contains(head) {
                    return Err(BqlError::Config(format!(
                        "unknown input '{head}' in column path"
                    )));
                }
                Ok(Evaluator::Path(segments.clone()))
            }
            Expression::Wildcard => Ok(Evaluator::Wildcard),
            Expression::UnaryOp { op, expr } => Ok(Evaluator::Unary {
                op: *op,
                expr: Box::new(Self::compile(expr, aliases, registry)?),
            }),
            Expression::BinaryOp { op, lhs, rhs } => Ok(Evaluator::Binary {
                op: *op,
                lhs: Box::new(Self::compile(lhs, aliases, registry)?),
                rhs: Box::new(Self::compile(rhs, aliases, registry)?),
            }),
            Expression::FunctionCall { name, args } => {
                let udf = registry.lookup(name).ok_or_else(|| {
                    BqlError::Config(format!("function '{name}' is not registered"))
                })?;
                if !udf.accept(args.len()) {
                    return Err(BqlError::Config(format!(
                        "function '{name}' cannot accept {} argument(s)",
                        args.len()
                    )));
                }
                let args = args
                    .iter()
                    .map(|a| Self::compile(a, aliases, registry))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Evaluator::Func {
                    name: name.clone(),
                    udf,
                    args,
                })
            }
        }
    }

    /// Evaluates against a combined row `{alias -> tuple data}`.
    pub(crate) fn eval(&self, row: &Map, ctx: &Context) -> Result<Value> {
        match self {
            Evaluator::Literal(v) => Ok(v.clone()),
            Evaluator::Path(segments) => Ok(eval_path(row, segments)),
            Evaluator::Wildcard => eval_wildcard(row),
            Evaluator::Unary { op, expr } => eval_unary(*op, expr.eval(row, ctx)?),
            Evaluator::Binary { op, lhs, rhs } => match op {
                BinaryOperator::And | BinaryOperator::Or => {
                    eval_logical(*op, lhs, rhs, row, ctx)
                }
                _ => eval_binary(*op, lhs.eval(row, ctx)?, rhs.eval(row, ctx)?),
            },
            Evaluator::Func { name, udf, args } => {
                let args = args
                    .iter()
                    .map(|a| a.eval(row, ctx))
                    .collect::<Result<Vec<_>>>()?;
                if !udf.accept(args.len()) {
                    return Err(BqlError::Arity {
                        function: name.clone(),
                        got: args.len(),
                    });
                }
                udf.call(ctx, &args)
            }
        }
    }
}

/// Descends a dotted path. Missing keys and non-map intermediates yield
/// Null, not an error.
fn eval_path(row: &Map, segments: &[String]) -> Value {
    let mut current = match row.get(&segments[0]) {
        Some(v) => v,
        None => return Value::Null,
    };
    for segment in &segments[1..] {
        match current {
            Value::Map(m) => match m.get(segment) {
                Some(v) => current = v,
                None => return Value::Null,
            },
            _ => return Value::Null,
        }
    }
    current.clone()
}

/// Merges all per-alias data maps, in ascending alias order; later
/// aliases win key collisions.
fn eval_wildcard(row: &Map) -> Result<Value> {
    let mut merged = Map::new();
    for (alias, value) in row {
        match value {
            Value::Map(data) => {
                for (k, v) in data {
                    merged.insert(k.clone(), v.clone());
                }
            }
            other => {
                return Err(BqlError::Internal(format!(
                    "input '{alias}' holds a {} instead of a map",
                    other.type_of()
                )))
            }
        }
    }
    Ok(Value::Map(merged))
}

fn eval_unary(op: UnaryOperator, v: Value) -> Result<Value> {
    match (op, v) {
        (_, Value::Null) => Ok(Value::Null),
        (UnaryOperator::Neg, Value::Int(i)) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| BqlError::Type("integer overflow in negation".to_string())),
        (UnaryOperator::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOperator::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (op, v) => Err(BqlError::Type(format!(
            "operator {op:?} is not defined for {} values",
            v.type_of()
        ))),
    }
}

/// Three-valued truth of a value: Null is unknown, Bool is itself,
/// anything else is a type error.
fn bool3(v: Value) -> Result<Option<bool>> {
    match v {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b)),
        other => Err(BqlError::Type(format!(
            "logical operand must be bool or null, found {}",
            other.type_of()
        ))),
    }
}

fn eval_logical(
    op: BinaryOperator,
    lhs: &Evaluator,
    rhs: &Evaluator,
    row: &Map,
    ctx: &Context,
) -> Result<Value> {
    let left = bool3(lhs.eval(row, ctx)?)?;
    // short circuit on the determining operand
    match (op, left) {
        (BinaryOperator::And, Some(false)) => return Ok(Value::Bool(false)),
        (BinaryOperator::Or, Some(true)) => return Ok(Value::Bool(true)),
        _ => {}
    }
    let right = bool3(rhs.eval(row, ctx)?)?;
    let out = match op {
        BinaryOperator::And => match (left, right) {
            (Some(true), Some(b)) => Some(b),
            (_, Some(false)) => Some(false),
            _ => None,
        },
        BinaryOperator::Or => match (left, right) {
            (Some(false), Some(b)) => Some(b),
            (_, Some(true)) => Some(true),
            _ => None,
        },
        _ => unreachable!("eval_logical only handles AND and OR"),
    };
    Ok(out.map(Value::Bool).unwrap_or(Value::Null))
}

fn eval_binary(op: BinaryOperator, lhs: Value, rhs: Value) -> Result<Value> {
    // arithmetic and comparison propagate Null
    if lhs.is_null() || rhs.is_null() {
        return Ok(Value::Null);
    }
    use BinaryOperator::*;
    match op {
        Add | Sub | Mul | Div | Mod => eval_arithmetic(op, lhs, rhs),
        Eq => Ok(Value::Bool(values_equal(&lhs, &rhs))),
        NotEq => Ok(Value::Bool(!values_equal(&lhs, &rhs))),
        Lt => compare(op, &lhs, &rhs).map(|o| Value::Bool(o == std::cmp::Ordering::Less)),
        LtEq => compare(op, &lhs, &rhs).map(|o| Value::Bool(o != std::cmp::Ordering::Greater)),
        Gt => compare(op, &lhs, &rhs).map(|o| Value::Bool(o == std::cmp::Ordering::Greater)),
        GtEq => compare(op, &lhs, &rhs).map(|o| Value::Bool(o != std::cmp::Ordering::Less)),
        And | Or => unreachable!("logical operators are evaluated with short-circuiting"),
    }
}

/// Structural equality with Int/Float comparing numerically.
fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
        _ => lhs == rhs,
    }
}

fn compare(op: BinaryOperator, lhs: &Value, rhs: &Value) -> Result<std::cmp::Ordering> {
    let ord = match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    };
    // None covers both incomparable types and NaN operands
    ord.ok_or_else(|| {
        BqlError::Type(format!(
            "operator {op:?} cannot compare {} and {}",
            lhs.type_of(),
            rhs.type_of()
        ))
    })
}

fn eval_arithmetic(op: BinaryOperator, lhs: Value, rhs: Value) -> Result<Value> {
    use BinaryOperator::*;
    match (op, &lhs, &rhs) {
        // string concatenation
        (Add, Value::String(a), Value::String(b)) => {
            let mut out = a.clone();
            out.push_str(b);
            Ok(Value::String(out))
        }
        (_, Value::Int(a), Value::Int(b)) => int_arithmetic(op, *a, *b),
        (_, Value::Int(a), Value::Float(b)) => float_arithmetic(op, *a as f64, *b),
        (_, Value::Float(a), Value::Int(b)) => float_arithmetic(op, *a, *b as f64),
        (_, Value::Float(a), Value::Float(b)) => float_arithmetic(op, *a, *b),
        _ => Err(BqlError::Type(format!(
            "operator {op:?} is not defined for {} and {}",
            lhs.type_of(),
            rhs.type_of()
        ))),
    }
}

fn int_arithmetic(op: BinaryOperator, a: i64, b: i64) -> Result<Value> {
    use BinaryOperator::*;
    let out = match op {
        Add => a.checked_add(b),
        Sub => a.checked_sub(b),
        Mul => a.checked_mul(b),
        Div => {
            if b == 0 {
                return Err(BqlError::Type("division by zero".to_string()));
            }
            a.checked_div(b)
        }
        Mod => {
            if b == 0 {
                return Err(BqlError::Type("modulo by zero".to_string()));
            }
            a.checked_rem(b)
        }
        _ => unreachable!("not an arithmetic operator"),
    };
    out.map(Value::Int)
        .ok_or_else(|| BqlError::Type(format!("integer overflow in {a} {op:?} {b}")))
}

fn float_arithmetic(op: BinaryOperator, a: f64, b: f64) -> Result<Value> {
    use BinaryOperator::*;
    let out = match op {
        Add => a + b,
        Sub => a - b,
        Mul => a * b,
        Div => a / b,
        Mod => a % b,
        _ => unreachable!("not an arithmetic operator"),
    };
    Ok(Value::Float(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FunctionRegistry {
        FunctionRegistry::with_builtins()
    }

    fn aliases(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Builds a row `{alias -> {column -> int}}`.
    fn row(entries: &[(&str, &[(&str, i64)])]) -> Map {
        let mut row = Map::new();
        for (alias, cols) in entries {
            let data: Map = cols
                .iter()
                .map(|(k, v)| (k.to_string(), Value::Int(*v)))
                .collect();
            row.insert(alias.to_string(), Value::Map(data));
        }
        row
    }

    fn eval(expr: &Expression, row: &Map) -> Result<Value> {
        let reg = registry();
        let ev = Evaluator::compile(expr, &aliases(&["s", "t"]), &reg)?;
        ev.eval(row, &Context::default())
    }

    fn lit(i: i64) -> Expression {
        Expression::Literal(Value::Int(i))
    }

    fn bin(op: BinaryOperator, lhs: Expression, rhs: Expression) -> Expression {
        Expression::BinaryOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    // ---------------------------------------------------------------
    // Paths
    // ---------------------------------------------------------------

    #[test]
    fn test_path_access() {
        let r = row(&[("s", &[("int", 7)])]);
        assert_eq!(eval(&Expression::path("s.int"), &r).unwrap(), Value::Int(7));
    }

    #[test]
    fn test_missing_key_yields_null() {
        let r = row(&[("s", &[("int", 7)])]);
        assert_eq!(eval(&Expression::path("s.other"), &r).unwrap(), Value::Null);
        assert_eq!(eval(&Expression::path("t.int"), &r).unwrap(), Value::Null);
    }

    #[test]
    fn test_path_through_non_map_yields_null() {
        let r = row(&[("s", &[("int", 7)])]);
        assert_eq!(
            eval(&Expression::path("s.int.deeper"), &r).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_unknown_alias_fails_compilation() {
        let reg = registry();
        let err =
            Evaluator::compile(&Expression::path("nope.int"), &aliases(&["s"]), &reg).unwrap_err();
        assert!(matches!(err, BqlError::Config(_)));
    }

    // ---------------------------------------------------------------
    // Wildcard
    // ---------------------------------------------------------------

    #[test]
    fn test_wildcard_merges_all_inputs() {
        let r = row(&[("s", &[("a", 1)]), ("t", &[("b", 2)])]);
        let v = eval(&Expression::Wildcard, &r).unwrap();
        let m = v.as_map().unwrap();
        assert_eq!(m.get("a"), Some(&Value::Int(1)));
        assert_eq!(m.get("b"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_wildcard_later_alias_wins_collisions() {
        let r = row(&[("s", &[("x", 1)]), ("t", &[("x", 2)])]);
        let v = eval(&Expression::Wildcard, &r).unwrap();
        assert_eq!(v.as_map().unwrap().get("x"), Some(&Value::Int(2)));
    }

    // ---------------------------------------------------------------
    // Arithmetic
    // ---------------------------------------------------------------

    #[test]
    fn test_int_arithmetic() {
        let r = row(&[("s", &[("int", 7)])]);
        let e = bin(BinaryOperator::Add, Expression::path("s.int"), lit(3));
        assert_eq!(eval(&e, &r).unwrap(), Value::Int(10));
        let e = bin(BinaryOperator::Mod, Expression::path("s.int"), lit(2));
        assert_eq!(eval(&e, &r).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_mixed_arithmetic_promotes_to_float() {
        let r = Map::new();
        let e = bin(
            BinaryOperator::Mul,
            lit(2),
            Expression::Literal(Value::Float(1.5)),
        );
        assert_eq!(eval(&e, &r).unwrap(), Value::Float(3.0));
    }

    #[test]
    fn test_string_concatenation() {
        let r = Map::new();
        let e = bin(
            BinaryOperator::Add,
            Expression::Literal(Value::String("foo".into())),
            Expression::Literal(Value::String("bar".into())),
        );
        assert_eq!(eval(&e, &r).unwrap(), Value::String("foobar".into()));
    }

    #[test]
    fn test_arithmetic_on_null_is_null() {
        let r = row(&[("s", &[])]);
        let e = bin(BinaryOperator::Add, Expression::path("s.missing"), lit(1));
        assert_eq!(eval(&e, &r).unwrap(), Value::Null);
    }

    #[test]
    fn test_division_and_modulo_by_zero() {
        let r = Map::new();
        for op in [BinaryOperator::Div, BinaryOperator::Mod] {
            let e = bin(op, lit(1), lit(0));
            assert!(matches!(eval(&e, &r).unwrap_err(), BqlError::Type(_)));
        }
    }

    #[test]
    fn test_integer_overflow_is_a_type_error() {
        let r = Map::new();
        let e = bin(BinaryOperator::Add, lit(i64::MAX), lit(1));
        assert!(matches!(eval(&e, &r).unwrap_err(), BqlError::Type(_)));
    }

    #[test]
    fn test_add_on_bools_is_a_type_error() {
        let r = Map::new();
        let e = bin(
            BinaryOperator::Add,
            Expression::Literal(Value::Bool(true)),
            Expression::Literal(Value::Bool(false)),
        );
        assert!(matches!(eval(&e, &r).unwrap_err(), BqlError::Type(_)));
    }

    // ---------------------------------------------------------------
    // Comparison
    // ---------------------------------------------------------------

    #[test]
    fn test_comparisons() {
        let r = Map::new();
        let cases = [
            (BinaryOperator::Lt, 1, 2, true),
            (BinaryOperator::LtEq, 2, 2, true),
            (BinaryOperator::Gt, 1, 2, false),
            (BinaryOperator::GtEq, 2, 2, true),
            (BinaryOperator::Eq, 2, 2, true),
            (BinaryOperator::NotEq, 2, 2, false),
        ];
        for (op, a, b, expected) in cases {
            let e = bin(op, lit(a), lit(b));
            assert_eq!(eval(&e, &r).unwrap(), Value::Bool(expected), "{op:?}");
        }
    }

    #[test]
    fn test_int_float_equality_is_numeric() {
        let r = Map::new();
        let e = bin(
            BinaryOperator::Eq,
            lit(2),
            Expression::Literal(Value::Float(2.0)),
        );
        assert_eq!(eval(&e, &r).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_comparison_with_null_is_null() {
        let r = row(&[("s", &[])]);
        let e = bin(BinaryOperator::Eq, Expression::path("s.missing"), lit(1));
        assert_eq!(eval(&e, &r).unwrap(), Value::Null);
    }

    #[test]
    fn test_ordering_mixed_types_is_a_type_error() {
        let r = Map::new();
        let e = bin(
            BinaryOperator::Lt,
            lit(1),
            Expression::Literal(Value::String("2".into())),
        );
        assert!(matches!(eval(&e, &r).unwrap_err(), BqlError::Type(_)));
    }

    // ---------------------------------------------------------------
    // Logic
    // ---------------------------------------------------------------

    #[test]
    fn test_three_valued_and() {
        let r = Map::new();
        let t = Expression::Literal(Value::Bool(true));
        let f = Expression::Literal(Value::Bool(false));
        let n = Expression::Literal(Value::Null);
        assert_eq!(
            eval(&bin(BinaryOperator::And, t.clone(), n.clone()), &r).unwrap(),
            Value::Null
        );
        assert_eq!(
            eval(&bin(BinaryOperator::And, f.clone(), n.clone()), &r).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            eval(&bin(BinaryOperator::And, n.clone(), f.clone()), &r).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            eval(&bin(BinaryOperator::Or, n.clone(), t.clone()), &r).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval(&bin(BinaryOperator::Or, n.clone(), f.clone()), &r).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_and_short_circuits_on_false() {
        // rhs would fail with unknown function if compiled; use a rhs
        // that fails at eval time instead: 1/0
        let r = Map::new();
        let bad = bin(BinaryOperator::Div, lit(1), lit(0));
        let e = bin(
            BinaryOperator::And,
            Expression::Literal(Value::Bool(false)),
            bin(BinaryOperator::Eq, bad, lit(1)),
        );
        assert_eq!(eval(&e, &r).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_not() {
        let r = Map::new();
        let e = Expression::UnaryOp {
            op: UnaryOperator::Not,
            expr: Box::new(Expression::Literal(Value::Bool(true))),
        };
        assert_eq!(eval(&e, &r).unwrap(), Value::Bool(false));
        let e = Expression::UnaryOp {
            op: UnaryOperator::Not,
            expr: Box::new(Expression::Literal(Value::Null)),
        };
        assert_eq!(eval(&e, &r).unwrap(), Value::Null);
    }

    #[test]
    fn test_negation() {
        let r = Map::new();
        let e = Expression::UnaryOp {
            op: UnaryOperator::Neg,
            expr: Box::new(lit(5)),
        };
        assert_eq!(eval(&e, &r).unwrap(), Value::Int(-5));
    }

    // ---------------------------------------------------------------
    // Function calls
    // ---------------------------------------------------------------

    #[test]
    fn test_function_call() {
        let r = row(&[("s", &[("int", 41)])]);
        let e = Expression::FunctionCall {
            name: "str".to_string(),
            args: vec![bin(BinaryOperator::Add, Expression::path("s.int"), lit(1))],
        };
        assert_eq!(eval(&e, &r).unwrap(), Value::String("42".into()));
    }

    #[test]
    fn test_unknown_function_fails_compilation() {
        let reg = registry();
        let e = Expression::FunctionCall {
            name: "no_such_function".to_string(),
            args: vec![],
        };
        let err = Evaluator::compile(&e, &aliases(&["s"]), &reg).unwrap_err();
        assert!(matches!(err, BqlError::Config(_)));
    }

    #[test]
    fn test_unacceptable_literal_arity_fails_compilation() {
        let reg = registry();
        let e = Expression::FunctionCall {
            name: "abs".to_string(),
            args: vec![lit(1), lit(2)],
        };
        let err = Evaluator::compile(&e, &aliases(&["s"]), &reg).unwrap_err();
        assert!(matches!(err, BqlError::Config(_)));
    }
}
