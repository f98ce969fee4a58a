//! Type conversion builtins: toNumber, toString, toBool, typeOf

use super::{Builtin, arity, to_number};
use crate::value::Value;

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin {
        name: "toNumber",
        signature: "toNumber(value)",
        description: "Converts a number or numeric string to a number",
        call: to_number_fn,
    },
    Builtin {
        name: "toString",
        signature: "toString(value)",
        description: "String form of value (null becomes \"\")",
        call: to_string_fn,
    },
    Builtin {
        name: "toBool",
        signature: "toBool(value)",
        description: "\"true\"/\"false\" strings by name, anything else by truthiness",
        call: to_bool,
    },
    Builtin {
        name: "typeOf",
        signature: "typeOf(value)",
        description: "One of null, boolean, number, string, array, object",
        call: type_of,
    },
];

fn to_number_fn(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    match args[0].as_bool() {
        Some(b) => Ok(Value::Number(if b { 1.0 } else { 0.0 })),
        None => to_number(&args[0]).map(Value::Number),
    }
}

fn to_string_fn(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::String(args[0].to_string()))
}

fn to_bool(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    let b = match &args[0] {
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => true,
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => false,
        other => other.is_truthy(),
    };
    Ok(Value::Bool(b))
}

fn type_of(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::from(args[0].type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_number() {
        assert_eq!(to_number_fn(&[Value::from("42.5")]), Ok(Value::from(42.5)));
        assert_eq!(to_number_fn(&[Value::from(true)]), Ok(Value::from(1)));
        assert!(to_number_fn(&[Value::from("forty")]).is_err());
        assert!(to_number_fn(&[Value::Null]).is_err());
    }

    #[test]
    fn test_to_string() {
        assert_eq!(to_string_fn(&[Value::from(10.0)]), Ok(Value::from("10")));
        assert_eq!(to_string_fn(&[Value::Null]), Ok(Value::from("")));
        assert_eq!(to_string_fn(&[Value::from(json!([1, 2]))]), Ok(Value::from("[1 2]")));
    }

    #[test]
    fn test_to_bool() {
        assert_eq!(to_bool(&[Value::from("false")]), Ok(Value::Bool(false)));
        assert_eq!(to_bool(&[Value::from("TRUE")]), Ok(Value::Bool(true)));
        assert_eq!(to_bool(&[Value::from("yes")]), Ok(Value::Bool(true)));
        assert_eq!(to_bool(&[Value::from(0)]), Ok(Value::Bool(false)));
        assert_eq!(to_bool(&[Value::Null]), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_type_of() {
        let cases = [
            (json!(null), "null"),
            (json!(true), "boolean"),
            (json!(1.5), "number"),
            (json!("x"), "string"),
            (json!([]), "array"),
            (json!({}), "object"),
        ];
        for (input, expected) in cases {
            assert_eq!(type_of(&[Value::from(input)]), Ok(Value::from(expected)));
        }
    }
}
