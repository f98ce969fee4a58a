//! Null handling builtins: default, coalesce, isNull, isEmpty

use super::{Builtin, arity};
use crate::value::Value;

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin {
        name: "default",
        signature: "default(value, fallback)",
        description: "Returns fallback when value is null or an empty string",
        call: default,
    },
    Builtin {
        name: "coalesce",
        signature: "coalesce(a, b, ...)",
        description: "First argument that is neither null nor empty; the last one otherwise",
        call: coalesce,
    },
    Builtin {
        name: "isNull",
        signature: "isNull(value)",
        description: "True when value is null",
        call: is_null,
    },
    Builtin {
        name: "isEmpty",
        signature: "isEmpty(value)",
        description: "True for null, empty strings, empty arrays and empty objects",
        call: is_empty,
    },
];

fn default(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    if args[0].is_empty_like() {
        Ok(args[1].clone())
    } else {
        Ok(args[0].clone())
    }
}

fn coalesce(args: &[Value]) -> Result<Value, String> {
    let found = args.iter().find(|v| !v.is_empty_like()).or(args.last());
    Ok(found.cloned().unwrap_or(Value::Null))
}

fn is_null(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::Bool(args[0].is_null()))
}

fn is_empty(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    let empty = match &args[0] {
        Value::List(items) => items.is_empty(),
        Value::Map(map) => map.is_empty(),
        other => other.is_empty_like(),
    };
    Ok(Value::Bool(empty))
}
