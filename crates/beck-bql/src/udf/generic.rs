//! Generic function adapter
//!
//! Turns a typed Rust callable into a [`Udf`] with arity checking,
//! per-argument coercion, variadic parameters, and aggregation-parameter
//! semantics.
//!
//! A callable is admitted when
//!
//! - every parameter type implements [`UdfArg`] (optionally preceded by a
//!   `&Context` parameter, optionally ending in a [`Variadic`] slot), and
//! - its return type implements [`UdfRet`] (`R` or `Result<R>`).
//!
//! Both lists are closed over the value model: bool, the integer widths,
//! the float widths, `String`, `Vec<u8>` (blob), `DateTime<Utc>`,
//! [`Value`], [`Map`], and `Vec<T>` sequences of those. Anything else
//! simply has no impl and does not compile, which is where the runtime
//! rejections of a reflection-based adapter land in Rust.
//!
//! ```
//! use beck_bql::udf::{convert, Context, Variadic};
//! use beck_core::Value;
//!
//! let concat = convert(|ss: Variadic<String>| ss.0.concat());
//! let out = concat.call(&Context::default(), &["a".into(), "b".into()]).unwrap();
//! assert_eq!(out, Value::String("ab".into()));
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use beck_core::{convert as coerce, CoreError, Map, Value};
use chrono::{DateTime, Utc};

use crate::error::{BqlError, Result};

use super::{Context, Udf};

// ---------------------------------------------------------------------------
// Argument conversion
// ---------------------------------------------------------------------------

/// A type a UDF parameter slot can declare. Each implementation coerces a
/// dynamic [`Value`] into the native type.
pub trait UdfArg: Sized {
    /// Coerce a value into this type.
    fn from_value(v: &Value) -> std::result::Result<Self, CoreError>;

    /// Whether this type is a sequence (and may therefore be marked as an
    /// aggregation parameter).
    fn is_sequence() -> bool {
        false
    }
}

macro_rules! impl_scalar_arg {
    ($($ty:ty => $conv:path;)*) => {
        $(
            impl UdfArg for $ty {
                fn from_value(v: &Value) -> std::result::Result<Self, CoreError> {
                    $conv(v)
                }
            }
        )*
    };
}

impl_scalar_arg! {
    bool => coerce::to_bool;
    i8 => coerce::to_i8;
    i16 => coerce::to_i16;
    i32 => coerce::to_i32;
    i64 => coerce::to_int;
    u8 => coerce::to_u8;
    u16 => coerce::to_u16;
    u32 => coerce::to_u32;
    u64 => coerce::to_u64;
    f32 => coerce::to_f32;
    f64 => coerce::to_float;
    String => coerce::to_string;
    DateTime<Utc> => coerce::to_timestamp;
}

/// Blobs arrive as `Vec<u8>`; strings are base64-decoded.
impl UdfArg for Vec<u8> {
    fn from_value(v: &Value) -> std::result::Result<Self, CoreError> {
        coerce::to_blob(v)
    }
}

impl UdfArg for Value {
    fn from_value(v: &Value) -> std::result::Result<Self, CoreError> {
        Ok(v.clone())
    }
}

/// Maps accept no scalar coercion.
impl UdfArg for Map {
    fn from_value(v: &Value) -> std::result::Result<Self, CoreError> {
        v.as_map().cloned()
    }
}

macro_rules! impl_sequence_arg {
    ($($ty:ty),*) => {
        $(
            impl UdfArg for Vec<$ty> {
                fn from_value(v: &Value) -> std::result::Result<Self, CoreError> {
                    v.as_array()?.iter().map(<$ty>::from_value).collect()
                }

                fn is_sequence() -> bool {
                    true
                }
            }
        )*
    };
}

// Vec<u8> is a blob, not a sequence of uint8, so u8 is absent here.
impl_sequence_arg!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    DateTime<Utc>,
    Value,
    Map,
    Vec<u8>
);

/// Marker for a trailing variadic parameter slot of element type `T`.
///
/// A callable whose last parameter is `Variadic<T>` accepts any number of
/// trailing arguments, each coerced to `T`.
pub struct Variadic<T>(pub Vec<T>);

// ---------------------------------------------------------------------------
// Return conversion
// ---------------------------------------------------------------------------

/// A type a UDF may return. Implementations convert the native result
/// back into a [`Value`]; `Result<R>` propagates the callable's own error
/// as a UDF-kind error.
pub trait UdfRet {
    fn into_value(self) -> Result<Value>;
}

macro_rules! impl_scalar_ret {
    ($($ty:ty => $make:expr;)*) => {
        $(
            impl UdfRet for $ty {
                fn into_value(self) -> Result<Value> {
                    let make = $make;
                    Ok(make(self))
                }
            }
        )*
    };
}

impl_scalar_ret! {
    bool => Value::Bool;
    i8 => |v| Value::Int(i64::from(v));
    i16 => |v| Value::Int(i64::from(v));
    i32 => |v| Value::Int(i64::from(v));
    i64 => Value::Int;
    u8 => |v| Value::Int(i64::from(v));
    u16 => |v| Value::Int(i64::from(v));
    u32 => |v| Value::Int(i64::from(v));
    f32 => |v| Value::Float(f64::from(v));
    f64 => Value::Float;
    String => Value::String;
    DateTime<Utc> => Value::Timestamp;
    Map => Value::Map;
}

impl UdfRet for u64 {
    fn into_value(self) -> Result<Value> {
        let narrowed = i64::try_from(self).map_err(|_| CoreError::OutOfRange {
            value: self.to_string(),
            to: "int",
        })?;
        Ok(Value::Int(narrowed))
    }
}

impl UdfRet for Vec<u8> {
    fn into_value(self) -> Result<Value> {
        Ok(Value::Blob(self))
    }
}

impl UdfRet for Value {
    fn into_value(self) -> Result<Value> {
        Ok(self)
    }
}

macro_rules! impl_sequence_ret {
    ($($ty:ty),*) => {
        $(
            impl UdfRet for Vec<$ty> {
                fn into_value(self) -> Result<Value> {
                    let elements = self
                        .into_iter()
                        .map(UdfRet::into_value)
                        .collect::<Result<Vec<Value>>>()?;
                    Ok(Value::Array(elements))
                }
            }
        )*
    };
}

impl_sequence_ret!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    DateTime<Utc>,
    Value,
    Map,
    Vec<u8>
);

impl<T: UdfRet> UdfRet for Result<T> {
    fn into_value(self) -> Result<Value> {
        match self {
            Ok(v) => v.into_value(),
            Err(e) => Err(udf_error(e)),
        }
    }
}

/// Errors raised by the callable body surface with the UDF kind; the
/// registry fills in the function name on the way out.
fn udf_error(e: BqlError) -> BqlError {
    match e {
        already @ BqlError::Udf { .. } => already,
        other => BqlError::Udf {
            function: String::new(),
            message: other.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Callable plumbing
// ---------------------------------------------------------------------------

/// Shape of an admitted callable: slot count, whether the last declared
/// slot is variadic, and which slots have sequence types.
pub struct Descriptor {
    /// Number of required (non-variadic) parameter slots.
    pub required: usize,
    /// Whether a trailing variadic slot is present.
    pub variadic: bool,
    /// Per declared slot (the variadic slot counts as one, and is always
    /// a sequence), whether the slot type is a sequence.
    pub sequences: Vec<bool>,
}

/// Marker selecting the impl for callables whose first parameter is
/// `&Context`.
pub struct WithContext<A>(PhantomData<A>);

/// Marker selecting the impl for callables whose last parameter is
/// `Variadic<T>`.
pub struct WithVariadic<A, T>(PhantomData<(A, T)>);

/// A typed callable the adapter can wrap. Implemented by closures and fns
/// of up to four parameter slots, in every combination of leading
/// `&Context`, trailing `Variadic<T>`, and `R` / `Result<R>` return.
///
/// The type parameter `A` is a marker that disambiguates the impls; it is
/// inferred and never named in user code.
pub trait GenericCallable<A>: Send + Sync + 'static {
    fn descriptor() -> Descriptor;
    fn invoke(&self, ctx: &Context, args: &[Value]) -> Result<Value>;
}

fn slot_error(index: usize, err: CoreError) -> BqlError {
    BqlError::Type(format!("argument {}: {}", index + 1, err))
}

fn next_arg<T: UdfArg>(args: &[Value], idx: &mut usize) -> Result<T> {
    let i = *idx;
    *idx += 1;
    T::from_value(&args[i]).map_err(|e| slot_error(i, e))
}

fn collect_variadic<T: UdfArg>(args: &[Value], start: usize) -> Result<Variadic<T>> {
    let mut rest = Vec::with_capacity(args.len().saturating_sub(start));
    for (i, v) in args.iter().enumerate().skip(start) {
        rest.push(T::from_value(v).map_err(|e| slot_error(i, e))?);
    }
    Ok(Variadic(rest))
}

macro_rules! impl_fixed_arity {
    ($($A:ident),*) => {
        impl<F, R, $($A),*> GenericCallable<($($A,)*)> for F
        where
            F: Fn($($A),*) -> R + Send + Sync + 'static,
            R: UdfRet,
            $($A: UdfArg + 'static,)*
        {
            fn descriptor() -> Descriptor {
                let sequences: Vec<bool> = vec![$(<$A>::is_sequence()),*];
                Descriptor {
                    required: sequences.len(),
                    variadic: false,
                    sequences,
                }
            }

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn invoke(&self, ctx: &Context, args: &[Value]) -> Result<Value> {
                let mut idx = 0usize;
                $(let $A = next_arg::<$A>(args, &mut idx)?;)*
                (self)($($A),*).into_value()
            }
        }

        impl<F, R, $($A),*> GenericCallable<WithContext<($($A,)*)>> for F
        where
            F: Fn(&Context $(, $A)*) -> R + Send + Sync + 'static,
            R: UdfRet,
            $($A: UdfArg + 'static,)*
        {
            fn descriptor() -> Descriptor {
                let sequences: Vec<bool> = vec![$(<$A>::is_sequence()),*];
                Descriptor {
                    required: sequences.len(),
                    variadic: false,
                    sequences,
                }
            }

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn invoke(&self, ctx: &Context, args: &[Value]) -> Result<Value> {
                let mut idx = 0usize;
                $(let $A = next_arg::<$A>(args, &mut idx)?;)*
                (self)(ctx $(, $A)*).into_value()
            }
        }
    };
}

impl_fixed_arity!();
impl_fixed_arity!(A1);
impl_fixed_arity!(A1, A2);
impl_fixed_arity!(A1, A2, A3);
impl_fixed_arity!(A1, A2, A3, A4);

macro_rules! impl_variadic_arity {
    ($($A:ident),*) => {
        impl<F, R, T, $($A),*> GenericCallable<WithVariadic<($($A,)*), T>> for F
        where
            F: Fn($($A,)* Variadic<T>) -> R + Send + Sync + 'static,
            R: UdfRet,
            T: UdfArg + 'static,
            $($A: UdfArg + 'static,)*
        {
            fn descriptor() -> Descriptor {
                let mut sequences: Vec<bool> = vec![$(<$A>::is_sequence()),*];
                let required = sequences.len();
                sequences.push(true);
                Descriptor {
                    required,
                    variadic: true,
                    sequences,
                }
            }

            #[allow(non_snake_case, unused_mut)]
            fn invoke(&self, _ctx: &Context, args: &[Value]) -> Result<Value> {
                let mut idx = 0usize;
                $(let $A = next_arg::<$A>(args, &mut idx)?;)*
                let rest = collect_variadic::<T>(args, idx)?;
                (self)($($A,)* rest).into_value()
            }
        }

        impl<F, R, T, $($A),*> GenericCallable<WithContext<WithVariadic<($($A,)*), T>>> for F
        where
            F: Fn(&Context, $($A,)* Variadic<T>) -> R + Send + Sync + 'static,
            R: UdfRet,
            T: UdfArg + 'static,
            $($A: UdfArg + 'static,)*
        {
            fn descriptor() -> Descriptor {
                let mut sequences: Vec<bool> = vec![$(<$A>::is_sequence()),*];
                let required = sequences.len();
                sequences.push(true);
                Descriptor {
                    required,
                    variadic: true,
                    sequences,
                }
            }

            #[allow(non_snake_case, unused_mut)]
            fn invoke(&self, ctx: &Context, args: &[Value]) -> Result<Value> {
                let mut idx = 0usize;
                $(let $A = next_arg::<$A>(args, &mut idx)?;)*
                let rest = collect_variadic::<T>(args, idx)?;
                (self)(ctx, $($A,)* rest).into_value()
            }
        }
    };
}

impl_variadic_arity!();
impl_variadic_arity!(A1);
impl_variadic_arity!(A1, A2);
impl_variadic_arity!(A1, A2, A3);

// ---------------------------------------------------------------------------
// The adapted UDF
// ---------------------------------------------------------------------------

struct GenericUdf {
    call_fn: Box<dyn Fn(&Context, &[Value]) -> Result<Value> + Send + Sync>,
    required: usize,
    variadic: bool,
    /// None for scalar functions; for aggregates, one entry per declared
    /// slot (the variadic slot counts as one).
    agg_mask: Option<Vec<bool>>,
}

impl Udf for GenericUdf {
    fn call(&self, ctx: &Context, args: &[Value]) -> Result<Value> {
        if !self.accept(args.len()) {
            return Err(BqlError::Arity {
                function: String::new(),
                got: args.len(),
            });
        }
        (self.call_fn)(ctx, args)
    }

    fn accept(&self, arity: usize) -> bool {
        if self.variadic {
            arity >= self.required
        } else {
            arity == self.required
        }
    }

    fn is_aggregation_parameter(&self, index: usize) -> bool {
        match &self.agg_mask {
            None => false,
            Some(mask) => {
                if index < mask.len() {
                    mask[index]
                } else {
                    // indexes past the declared slots belong to the
                    // variadic expansion
                    self.variadic && mask.last().copied().unwrap_or(false)
                }
            }
        }
    }
}

/// Wraps a typed callable as a scalar UDF.
///
/// This cannot fail: a callable whose signature the adapter does not
/// support has no [`GenericCallable`] impl and is rejected at compile
/// time.
pub fn convert<A, F>(f: F) -> Arc<dyn Udf>
where
    F: GenericCallable<A>,
{
    let d = F::descriptor();
    Arc::new(GenericUdf {
        call_fn: Box::new(move |ctx, args| f.invoke(ctx, args)),
        required: d.required,
        variadic: d.variadic,
        agg_mask: None,
    })
}

/// Wraps a typed callable as an aggregate UDF.
///
/// `mask` has one entry per declared parameter slot (the variadic slot
/// counts as one) and marks the slots that receive the whole group as an
/// array. Registration fails when the mask length does not match the slot
/// count, when a marked slot does not have a sequence type, when the
/// function takes no parameters, or when no slot is marked.
pub fn convert_aggregate<A, F>(f: F, mask: &[bool]) -> Result<Arc<dyn Udf>>
where
    F: GenericCallable<A>,
{
    let d = F::descriptor();
    if d.sequences.is_empty() {
        return Err(BqlError::Config(
            "an aggregate function must take at least one parameter".to_string(),
        ));
    }
    if mask.len() != d.sequences.len() {
        return Err(BqlError::Config(format!(
            "aggregation mask has {} entries but the function has {} parameter slot(s)",
            mask.len(),
            d.sequences.len()
        )));
    }
    for (i, (&marked, &is_seq)) in mask.iter().zip(&d.sequences).enumerate() {
        if marked && !is_seq {
            return Err(BqlError::Config(format!(
                "aggregation parameter {} must have a sequence type",
                i + 1
            )));
        }
    }
    if !mask.iter().any(|&b| b) {
        return Err(BqlError::Config(
            "an aggregate function must have at least one aggregation parameter".to_string(),
        ));
    }
    Ok(Arc::new(GenericUdf {
        call_fn: Box::new(move |ctx, args| f.invoke(ctx, args)),
        required: d.required,
        variadic: d.variadic,
        agg_mask: Some(mask.to_vec()),
    }))
}
