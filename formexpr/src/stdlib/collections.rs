//! Array and object builtins

use super::{Builtin, arity, list_arg, to_integer, to_number, values_equal};
use crate::value::Value;

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin {
        name: "first",
        signature: "first(array)",
        description: "First item, or null for an empty array",
        call: first,
    },
    Builtin {
        name: "last",
        signature: "last(array)",
        description: "Last item, or null for an empty array",
        call: last,
    },
    Builtin {
        name: "count",
        signature: "count(array)",
        description: "Number of items in an array (null counts as empty)",
        call: count,
    },
    Builtin {
        name: "at",
        signature: "at(array, index)",
        description: "Item at index; negative indices count from the end",
        call: at,
    },
    Builtin {
        name: "keys",
        signature: "keys(object)",
        description: "Keys of an object, sorted",
        call: keys,
    },
    Builtin {
        name: "values",
        signature: "values(object)",
        description: "Values of an object, in key order",
        call: values,
    },
    Builtin {
        name: "includes",
        signature: "includes(array, value)",
        description: "True when the array contains value",
        call: includes,
    },
    Builtin {
        name: "reverse",
        signature: "reverse(array)",
        description: "Items in reverse order",
        call: reverse,
    },
    Builtin {
        name: "sort",
        signature: "sort(array)",
        description: "Items sorted ascending (numbers or strings)",
        call: sort,
    },
    Builtin {
        name: "unique",
        signature: "unique(array)",
        description: "Items with duplicates removed, keeping the first occurrence",
        call: unique,
    },
];

fn first(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(list_arg(args, 0)?.first().cloned().unwrap_or(Value::Null))
}

fn last(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(list_arg(args, 0)?.last().cloned().unwrap_or(Value::Null))
}

fn count(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    if args[0].is_null() {
        return Ok(Value::from(0));
    }
    Ok(Value::from(list_arg(args, 0)?.len()))
}

fn at(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    let items = list_arg(args, 0)?;
    let index = to_integer(&args[1])?;
    let resolved = if index < 0 {
        items.len().checked_sub(index.unsigned_abs() as usize)
    } else {
        Some(index as usize)
    };
    Ok(resolved
        .and_then(|i| items.get(i))
        .cloned()
        .unwrap_or(Value::Null))
}

fn object_arg(args: &[Value]) -> Result<&crate::value::Map, String> {
    args[0]
        .as_map()
        .ok_or_else(|| format!("expected an object, got {}", args[0].type_name()))
}

fn keys(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    let map = object_arg(args)?;
    Ok(Value::List(map.keys().map(|k| Value::from(k.as_str())).collect()))
}

fn values(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    let map = object_arg(args)?;
    Ok(Value::List(map.values().cloned().collect()))
}

fn includes(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    let items = list_arg(args, 0)?;
    Ok(Value::Bool(items.iter().any(|item| values_equal(item, &args[1]))))
}

fn reverse(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::List(list_arg(args, 0)?.iter().rev().cloned().collect()))
}

fn sort(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    let mut items = list_arg(args, 0)?.to_vec();

    // The ordering is chosen for the whole list up front, so the comparator is total
    if let Ok(numbers) = items.iter().map(to_number).collect::<Result<Vec<f64>, _>>() {
        let mut keyed: Vec<(f64, Value)> = numbers.into_iter().zip(items).collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        return Ok(Value::List(keyed.into_iter().map(|(_, v)| v).collect()));
    }
    if items.iter().all(|v| v.as_str().is_some()) {
        items.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
        return Ok(Value::List(items));
    }

    let types: Vec<&str> = items.iter().map(Value::type_name).collect();
    Err(format!(
        "cannot sort a mix of {}; items must all be numbers or all be strings",
        types.join(", ")
    ))
}

fn unique(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    let mut seen: Vec<Value> = Vec::new();
    for item in list_arg(args, 0)? {
        if !seen.iter().any(|s| s == item) {
            seen.push(item.clone());
        }
    }
    Ok(Value::List(seen))
}
