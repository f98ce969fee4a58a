//! Arithmetic builtins
//!
//! All operands go through `to_number`. A zero divisor is an error rather
//! than infinity or NaN.

use super::{Builtin, arg, arity, to_integer, to_number};
use crate::value::Value;

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin {
        name: "add",
        signature: "add(a, b, ...)",
        description: "Sum of all arguments",
        call: add,
    },
    Builtin {
        name: "subtract",
        signature: "subtract(a, b)",
        description: "a minus b",
        call: subtract,
    },
    Builtin {
        name: "multiply",
        signature: "multiply(a, b, ...)",
        description: "Product of all arguments",
        call: multiply,
    },
    Builtin {
        name: "divide",
        signature: "divide(a, b)",
        description: "a divided by b; fails when b is zero",
        call: divide,
    },
    Builtin {
        name: "mod",
        signature: "mod(a, b)",
        description: "Remainder of a divided by b; fails when b is zero",
        call: modulo,
    },
    Builtin {
        name: "round",
        signature: "round(value, places?)",
        description: "Rounds to the given number of decimal places (default 0)",
        call: round,
    },
    Builtin {
        name: "floor",
        signature: "floor(value)",
        description: "Largest whole number not greater than value",
        call: floor,
    },
    Builtin {
        name: "ceil",
        signature: "ceil(value)",
        description: "Smallest whole number not less than value",
        call: ceil,
    },
    Builtin {
        name: "abs",
        signature: "abs(value)",
        description: "Absolute value",
        call: abs,
    },
    Builtin {
        name: "min",
        signature: "min(a, b, ...)",
        description: "Smallest argument, or smallest element of a single array",
        call: min,
    },
    Builtin {
        name: "max",
        signature: "max(a, b, ...)",
        description: "Largest argument, or largest element of a single array",
        call: max,
    },
    Builtin {
        name: "sum",
        signature: "sum(array)",
        description: "Sum of the numbers in an array",
        call: sum,
    },
    Builtin {
        name: "avg",
        signature: "avg(array)",
        description: "Average of the numbers in an array",
        call: avg,
    },
];

/// Arguments as numbers; a single array argument is spread
fn numbers(args: &[Value]) -> Result<Vec<f64>, String> {
    let items = match args {
        [Value::List(items)] => items.as_slice(),
        _ => args,
    };
    items.iter().map(to_number).collect()
}

fn add(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, usize::MAX)?;
    Ok(Value::Number(numbers(args)?.iter().sum()))
}

fn subtract(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    Ok(Value::Number(to_number(&args[0])? - to_number(&args[1])?))
}

fn multiply(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, usize::MAX)?;
    Ok(Value::Number(numbers(args)?.iter().product()))
}

fn divide(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    let a = to_number(&args[0])?;
    let b = to_number(&args[1])?;
    if b == 0.0 {
        return Err("division by zero".to_string());
    }
    Ok(Value::Number(a / b))
}

fn modulo(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    let a = to_number(&args[0])?;
    let b = to_number(&args[1])?;
    if b == 0.0 {
        return Err("modulo by zero".to_string());
    }
    Ok(Value::Number(a % b))
}

fn round(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 2)?;
    let n = to_number(&args[0])?;
    let places = match arg(args, 1) {
        Value::Null => 0,
        v => to_integer(v)?,
    };
    if !(0..=15).contains(&places) {
        return Err(format!("decimal places must be between 0 and 15, got {}", places));
    }
    let factor = 10f64.powi(places as i32);
    Ok(Value::Number((n * factor).round() / factor))
}

fn unary(args: &[Value], op: fn(f64) -> f64) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::Number(op(to_number(&args[0])?)))
}

fn floor(args: &[Value]) -> Result<Value, String> {
    unary(args, f64::floor)
}

fn ceil(args: &[Value]) -> Result<Value, String> {
    unary(args, f64::ceil)
}

fn abs(args: &[Value]) -> Result<Value, String> {
    unary(args, f64::abs)
}

fn min(args: &[Value]) -> Result<Value, String> {
    numbers(args)?
        .into_iter()
        .reduce(f64::min)
        .map(Value::Number)
        .ok_or_else(|| "min needs at least one number".to_string())
}

fn max(args: &[Value]) -> Result<Value, String> {
    numbers(args)?
        .into_iter()
        .reduce(f64::max)
        .map(Value::Number)
        .ok_or_else(|| "max needs at least one number".to_string())
}

fn sum(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, usize::MAX)?;
    Ok(Value::Number(numbers(args)?.iter().sum()))
}

fn avg(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, usize::MAX)?;
    let values = numbers(args)?;
    if values.is_empty() {
        return Err("cannot average an empty array".to_string());
    }
    Ok(Value::Number(values.iter().sum::<f64>() / values.len() as f64))
}
