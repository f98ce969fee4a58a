//! Logical builtins: if, and, or, not
//!
//! Falsy values are `null`, `false`, `0` and `""`.

use super::{Builtin, arg, arity};
use crate::value::Value;

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin {
        name: "if",
        signature: "if(condition, then, else)",
        description: "Returns then when condition is truthy, else otherwise",
        call: if_,
    },
    Builtin {
        name: "and",
        signature: "and(a, b, ...)",
        description: "True when every argument is truthy",
        call: and,
    },
    Builtin {
        name: "or",
        signature: "or(a, b, ...)",
        description: "True when any argument is truthy",
        call: or,
    },
    Builtin {
        name: "not",
        signature: "not(value)",
        description: "Negates the truthiness of value",
        call: not,
    },
];

fn if_(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 3)?;
    if args[0].is_truthy() {
        Ok(args[1].clone())
    } else {
        Ok(arg(args, 2).clone())
    }
}

fn and(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, usize::MAX)?;
    // Stops at the first falsy argument
    Ok(Value::Bool(args.iter().all(Value::is_truthy)))
}

fn or(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, usize::MAX)?;
    // Stops at the first truthy argument
    Ok(Value::Bool(args.iter().any(Value::is_truthy)))
}

fn not(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::Bool(!args[0].is_truthy()))
}
