//! User-defined functions
//!
//! A [`Udf`] is a dynamically-typed callable invoked from expressions.
//! Most implementations come out of the generic adapter in [`generic`],
//! which bridges typed Rust callables to the `&[Value] -> Value` surface.
//!
//! The [`FunctionRegistry`] maps lowercased names to shared UDF handles.
//! It is read-mostly: plans resolve functions at construction time and
//! lookups may run concurrently; registration happens at initialization
//! or through explicit admin actions.

pub mod builtin;
pub mod generic;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use beck_core::Value;

use crate::error::{BqlError, Result};

pub use generic::{convert, convert_aggregate, Variadic};

/// Execution context handed to every UDF call.
///
/// Carries the name of the node running the plan, for diagnostics. UDFs
/// are expected to be bounded and non-blocking; a misbehaving UDF blocks
/// its plan.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Name of the node this plan runs under (empty when standalone).
    pub node_name: String,
}

impl Context {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
        }
    }
}

/// A dynamically-typed function callable from expressions.
pub trait Udf: Send + Sync {
    /// Invoke the function with already-evaluated arguments.
    fn call(&self, ctx: &Context, args: &[Value]) -> Result<Value>;

    /// Whether the function can be called with `arity` arguments.
    fn accept(&self, arity: usize) -> bool;

    /// Whether the parameter at `index` receives the whole group as an
    /// array when the function is used as an aggregate. Always false for
    /// scalar functions.
    fn is_aggregation_parameter(&self, _index: usize) -> bool {
        false
    }
}

impl std::fmt::Debug for dyn Udf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<dyn Udf>")
    }
}

/// Wraps a registered UDF so errors it raises carry the registered name.
///
/// The generic adapter produces errors with an empty function name (it
/// cannot know what the function will be registered as); this wrapper
/// fills the name in on the way out.
struct Registered {
    name: String,
    inner: Arc<dyn Udf>,
}

impl Udf for Registered {
    fn call(&self, ctx: &Context, args: &[Value]) -> Result<Value> {
        self.inner.call(ctx, args).map_err(|e| match e {
            BqlError::Udf { function, message } if function.is_empty() => BqlError::Udf {
                function: self.name.clone(),
                message,
            },
            BqlError::Arity { function, got } if function.is_empty() => BqlError::Arity {
                function: self.name.clone(),
                got,
            },
            other => other,
        })
    }

    fn accept(&self, arity: usize) -> bool {
        self.inner.accept(arity)
    }

    fn is_aggregation_parameter(&self, index: usize) -> bool {
        self.inner.is_aggregation_parameter(index)
    }
}

/// Maps function names to UDFs. Names are case-insensitive.
pub struct FunctionRegistry {
    functions: RwLock<HashMap<String, Arc<dyn Udf>>>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            functions: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry pre-populated with the builtin functions.
    pub fn with_builtins() -> Self {
        let reg = Self::new();
        builtin::register_builtins(&reg);
        reg
    }

    /// Registers a UDF under `name`. Registering the same name twice is a
    /// configuration error.
    pub fn register(&self, name: &str, udf: Arc<dyn Udf>) -> Result<()> {
        let key = name.to_ascii_lowercase();
        let wrapped: Arc<dyn Udf> = Arc::new(Registered {
            name: key.clone(),
            inner: udf,
        });
        let mut functions = self
            .functions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if functions.contains_key(&key) {
            return Err(BqlError::Config(format!(
                "function '{key}' is already registered"
            )));
        }
        functions.insert(key, wrapped);
        Ok(())
    }

    /// Looks up a UDF by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Udf>> {
        let functions = self
            .functions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        functions.get(&name.to_ascii_lowercase()).cloned()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstUdf(Value);

    impl Udf for ConstUdf {
        fn call(&self, _ctx: &Context, _args: &[Value]) -> Result<Value> {
            Ok(self.0.clone())
        }
        fn accept(&self, arity: usize) -> bool {
            arity == 0
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let reg = FunctionRegistry::new();
        reg.register("Answer", Arc::new(ConstUdf(Value::Int(42))))
            .unwrap();
        let f = reg.lookup("answer").expect("registered");
        assert_eq!(f.call(&Context::default(), &[]).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let reg = FunctionRegistry::new();
        reg.register("f", Arc::new(ConstUdf(Value::Null))).unwrap();
        assert!(reg.lookup("F").is_some());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let reg = FunctionRegistry::new();
        reg.register("f", Arc::new(ConstUdf(Value::Null))).unwrap();
        let err = reg.register("F", Arc::new(ConstUdf(Value::Null))).unwrap_err();
        assert!(matches!(err, BqlError::Config(_)));
    }

    #[test]
    fn test_lookup_unknown_is_none() {
        let reg = FunctionRegistry::new();
        assert!(reg.lookup("missing").is_none());
    }

    #[test]
    fn test_registered_wrapper_fills_in_name() {
        struct Failing;
        impl Udf for Failing {
            fn call(&self, _ctx: &Context, _args: &[Value]) -> Result<Value> {
                Err(BqlError::Udf {
                    function: String::new(),
                    message: "boom".to_string(),
                })
            }
            fn accept(&self, _arity: usize) -> bool {
                true
            }
        }
        let reg = FunctionRegistry::new();
        reg.register("exploder", Arc::new(Failing)).unwrap();
        let err = reg
            .lookup("exploder")
            .unwrap()
            .call(&Context::default(), &[])
            .unwrap_err();
        assert_eq!(
            err,
            BqlError::Udf {
                function: "exploder".to_string(),
                message: "boom".to_string(),
            }
        );
    }

    #[test]
    fn test_with_builtins_has_concat() {
        let reg = FunctionRegistry::with_builtins();
        assert!(reg.lookup("concat").is_some());
        assert!(reg.lookup("str").is_some());
    }
}
