//! Comparison builtins: eq, ne, gt, lt, gte, lte

use std::cmp::Ordering;

use super::{Builtin, arity, to_number};
use crate::value::Value;

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin {
        name: "eq",
        signature: "eq(a, b)",
        description: "True when a equals b; numeric strings compare as numbers",
        call: eq,
    },
    Builtin {
        name: "ne",
        signature: "ne(a, b)",
        description: "True when a does not equal b",
        call: ne,
    },
    Builtin {
        name: "gt",
        signature: "gt(a, b)",
        description: "True when a > b (numbers, or two strings)",
        call: gt,
    },
    Builtin {
        name: "lt",
        signature: "lt(a, b)",
        description: "True when a < b (numbers, or two strings)",
        call: lt,
    },
    Builtin {
        name: "gte",
        signature: "gte(a, b)",
        description: "True when a >= b (numbers, or two strings)",
        call: gte,
    },
    Builtin {
        name: "lte",
        signature: "lte(a, b)",
        description: "True when a <= b (numbers, or two strings)",
        call: lte,
    },
];

/// Equality with numeric coercion: `5` equals `"5"`, otherwise exact equality
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (to_number(left), to_number(right)) {
        (Ok(a), Ok(b)) => a == b,
        _ => left == right,
    }
}

/// Order two values: numerically when both coerce, lexically when both are
/// strings, otherwise an error
pub(super) fn compare_values(left: &Value, right: &Value) -> Result<Ordering, String> {
    if let (Ok(a), Ok(b)) = (to_number(left), to_number(right)) {
        return a
            .partial_cmp(&b)
            .ok_or_else(|| format!("cannot compare {} and {}", a, b));
    }
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        _ => Err(format!(
            "cannot compare {} and {}",
            left.type_name(),
            right.type_name()
        )),
    }
}

fn eq(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    Ok(Value::Bool(values_equal(&args[0], &args[1])))
}

fn ne(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    Ok(Value::Bool(!values_equal(&args[0], &args[1])))
}

fn ordered(args: &[Value], accept: fn(Ordering) -> bool) -> Result<Value, String> {
    arity(args, 2, 2)?;
    compare_values(&args[0], &args[1]).map(|o| Value::Bool(accept(o)))
}

fn gt(args: &[Value]) -> Result<Value, String> {
    ordered(args, Ordering::is_gt)
}

fn lt(args: &[Value]) -> Result<Value, String> {
    ordered(args, Ordering::is_lt)
}

fn gte(args: &[Value]) -> Result<Value, String> {
    ordered(args, Ordering::is_ge)
}

fn lte(args: &[Value]) -> Result<Value, String> {
    ordered(args, Ordering::is_le)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: fn(&[Value]) -> Result<Value, String>, a: impl Into<Value>, b: impl Into<Value>) -> Result<Value, String> {
        f(&[a.into(), b.into()])
    }

    #[test]
    fn test_numeric_equality_coercion() {
        assert_eq!(call(eq, 10, "10"), Ok(Value::Bool(true)));
        assert_eq!(call(eq, 10, "10.5"), Ok(Value::Bool(false)));
        assert_eq!(call(eq, 10, 10.0), Ok(Value::Bool(true)));
        assert_eq!(call(eq, "5", "5.0"), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_exact_equality_fallback() {
        assert_eq!(call(eq, "abc", "abc"), Ok(Value::Bool(true)));
        assert_eq!(call(eq, "abc", "ABC"), Ok(Value::Bool(false)));
        assert_eq!(call(eq, Value::Null, Value::Null), Ok(Value::Bool(true)));
        assert_eq!(call(eq, true, "true"), Ok(Value::Bool(false)));
        assert_eq!(call(ne, "a", "b"), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_ordering() {
        assert_eq!(call(gt, 20, 18), Ok(Value::Bool(true)));
        assert_eq!(call(gt, "10", 9), Ok(Value::Bool(true)));
        assert_eq!(call(lt, "apple", "banana"), Ok(Value::Bool(true)));
        assert_eq!(call(gte, 5, 5), Ok(Value::Bool(true)));
        assert_eq!(call(lte, 6, 5), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_ordering_errors() {
        let err = call(gt, "abc", 5).unwrap_err();
        assert!(err.contains("cannot compare string and number"), "{}", err);
        assert!(call(lt, Value::Null, 1).is_err());
        assert!(gt(&[Value::from(1)]).is_err());
    }
}
