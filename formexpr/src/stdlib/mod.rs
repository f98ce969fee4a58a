//! Standard function library
//!
//! Every builtin receives already-evaluated arguments. Numeric arguments go
//! through [`to_number`], so arithmetic and comparisons share one set of
//! coercion rules.

mod arithmetic;
mod collections;
mod compare;
mod convert;
mod dates;
mod logic;
mod nulls;
mod strings;

pub use compare::values_equal;

use crate::registry::Registry;
use crate::value::Value;

/// Signature shared by all builtins
pub type BuiltinCall = fn(&[Value]) -> Result<Value, String>;

/// A builtin function and its documentation
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub signature: &'static str,
    pub description: &'static str,
    pub call: BuiltinCall,
}

/// All builtin tables, by category
fn tables() -> [(&'static str, &'static [Builtin]); 8] {
    [
        ("comparison", compare::FUNCTIONS),
        ("logic", logic::FUNCTIONS),
        ("arithmetic", arithmetic::FUNCTIONS),
        ("string", strings::FUNCTIONS),
        ("collection", collections::FUNCTIONS),
        ("conversion", convert::FUNCTIONS),
        ("null handling", nulls::FUNCTIONS),
        ("date", dates::FUNCTIONS),
    ]
}

/// Every builtin with its category
pub fn catalogue() -> impl Iterator<Item = (&'static str, &'static Builtin)> {
    tables()
        .into_iter()
        .flat_map(|(category, functions)| functions.iter().map(move |f| (category, f)))
}

/// Register the whole standard library into `registry`
pub fn register_all(registry: &Registry) {
    let mut count = 0;
    for (_, builtin) in catalogue() {
        registry.register_documented_function(
            builtin.name,
            builtin.signature,
            builtin.description,
            builtin.call,
        );
        count += 1;
    }
    log::debug!("Registered {} standard library functions", count);
}

// =============================================================================
// Coercion and argument helpers
// =============================================================================

/// Numeric coercion: numbers pass through, numeric strings are parsed,
/// anything else is an error
pub fn to_number(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::String(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(n),
                _ => Err(format!("cannot convert '{}' to a number", s)),
            }
        }
        other => Err(format!("cannot convert {} to a number", other.type_name())),
    }
}

/// Coerce to a whole number (for indices, counts, precision)
fn to_integer(value: &Value) -> Result<i64, String> {
    let n = to_number(value)?;
    if n.fract() != 0.0 {
        return Err(format!("expected a whole number, got {}", value));
    }
    Ok(n as i64)
}

/// Check the argument count is within `min..=max`
fn arity(args: &[Value], min: usize, max: usize) -> Result<(), String> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{}", min)
        } else if max == usize::MAX {
            format!("at least {}", min)
        } else {
            format!("{} to {}", min, max)
        };
        let noun = if min == 1 && max == 1 { "argument" } else { "arguments" };
        return Err(format!("expected {} {}, got {}", expected, noun, args.len()));
    }
    Ok(())
}

/// Argument `i`, or null when absent
fn arg(args: &[Value], i: usize) -> &Value {
    const NULL: &Value = &Value::Null;
    args.get(i).unwrap_or(NULL)
}

/// Argument `i` stringified
fn string_arg(args: &[Value], i: usize) -> String {
    arg(args, i).to_string()
}

/// Argument `i` as a list
fn list_arg(args: &[Value], i: usize) -> Result<&[Value], String> {
    let value = arg(args, i);
    value
        .as_list()
        .ok_or_else(|| format!("expected an array, got {}", value.type_name()))
}
