//! Builtin scalar functions
//!
//! The small function set every registry starts from. All of these go
//! through the generic adapter, so they double as an end-to-end exercise
//! of the argument and return conversions.

use beck_core::{convert as coerce, Value};

use crate::error::{BqlError, Result};

use super::generic::{convert, Variadic};
use super::FunctionRegistry;

/// Registers the builtin functions into `registry`.
///
/// Called by [`FunctionRegistry::with_builtins`]; registration of a fixed
/// set into a fresh registry cannot collide.
pub fn register_builtins(registry: &FunctionRegistry) {
    let result: Result<()> = (|| {
        registry.register("str", convert(|v: Value| -> Result<String> {
            Ok(coerce::to_string(&v)?)
        }))?;
        registry.register("abs", convert(abs))?;
        registry.register("lower", convert(|s: String| s.to_lowercase()))?;
        registry.register("upper", convert(|s: String| s.to_uppercase()))?;
        registry.register("concat", convert(|ss: Variadic<String>| ss.0.concat()))?;
        Ok(())
    })();
    debug_assert!(result.is_ok(), "builtin registration collided");
}

/// `abs(x)`: Int stays Int, Float stays Float.
fn abs(v: Value) -> Result<Value> {
    match v {
        Value::Int(i) => i
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| BqlError::Type(format!("integer overflow in abs({i})"))),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(BqlError::Type(format!(
            "abs is not defined for {} values",
            other.type_of()
        ))),
    }
}
