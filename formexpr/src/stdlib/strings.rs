//! String builtins
//!
//! Positions and lengths count characters, not bytes.

use super::{Builtin, arg, arity, list_arg, string_arg, to_integer, values_equal};
use crate::value::Value;

pub(super) const FUNCTIONS: &[Builtin] = &[
    Builtin {
        name: "concat",
        signature: "concat(a, b, ...)",
        description: "Joins the string form of every argument",
        call: concat,
    },
    Builtin {
        name: "upper",
        signature: "upper(text)",
        description: "Converts text to upper case",
        call: upper,
    },
    Builtin {
        name: "lower",
        signature: "lower(text)",
        description: "Converts text to lower case",
        call: lower,
    },
    Builtin {
        name: "trim",
        signature: "trim(text)",
        description: "Removes leading and trailing whitespace",
        call: trim,
    },
    Builtin {
        name: "length",
        signature: "length(value)",
        description: "Characters in a string, items in an array or keys in an object",
        call: length,
    },
    Builtin {
        name: "substring",
        signature: "substring(text, start, length?)",
        description: "Part of text from start, optionally limited to length characters",
        call: substring,
    },
    Builtin {
        name: "replace",
        signature: "replace(text, search, replacement)",
        description: "Replaces every occurrence of search",
        call: replace,
    },
    Builtin {
        name: "contains",
        signature: "contains(textOrArray, value)",
        description: "True when the string contains the substring, or the array the item",
        call: contains,
    },
    Builtin {
        name: "startsWith",
        signature: "startsWith(text, prefix)",
        description: "True when text starts with prefix",
        call: starts_with,
    },
    Builtin {
        name: "endsWith",
        signature: "endsWith(text, suffix)",
        description: "True when text ends with suffix",
        call: ends_with,
    },
    Builtin {
        name: "split",
        signature: "split(text, separator)",
        description: "Splits text into an array; an empty separator splits into characters",
        call: split,
    },
    Builtin {
        name: "join",
        signature: "join(array, separator?)",
        description: "Joins array items with separator (default \",\")",
        call: join,
    },
    Builtin {
        name: "padStart",
        signature: "padStart(text, width, pad?)",
        description: "Pads text on the left to width characters (default pad is a space)",
        call: pad_start,
    },
];

fn concat(args: &[Value]) -> Result<Value, String> {
    let joined: String = args.iter().map(|v| v.to_string()).collect();
    Ok(Value::String(joined))
}

fn upper(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::String(string_arg(args, 0).to_uppercase()))
}

fn lower(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::String(string_arg(args, 0).to_lowercase()))
}

fn trim(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::from(string_arg(args, 0).trim()))
}

fn length(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    let len = match &args[0] {
        Value::Null => 0,
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        Value::String(s) => s.chars().count(),
        other => other.to_string().chars().count(),
    };
    Ok(Value::from(len))
}

fn substring(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 3)?;
    let chars: Vec<char> = string_arg(args, 0).chars().collect();
    let start = to_integer(&args[1])?.clamp(0, chars.len() as i64) as usize;
    let end = match arg(args, 2) {
        Value::Null => chars.len(),
        v => {
            let len = to_integer(v)?.max(0) as usize;
            start.saturating_add(len).min(chars.len())
        }
    };
    Ok(Value::String(chars[start..end].iter().collect()))
}

fn replace(args: &[Value]) -> Result<Value, String> {
    arity(args, 3, 3)?;
    let search = string_arg(args, 1);
    if search.is_empty() {
        return Ok(Value::String(string_arg(args, 0)));
    }
    Ok(Value::String(
        string_arg(args, 0).replace(&search, &string_arg(args, 2)),
    ))
}

fn contains(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    let found = match &args[0] {
        Value::List(items) => items.iter().any(|item| values_equal(item, &args[1])),
        haystack => haystack.to_string().contains(&args[1].to_string()),
    };
    Ok(Value::Bool(found))
}

fn starts_with(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    Ok(Value::Bool(string_arg(args, 0).starts_with(&string_arg(args, 1))))
}

fn ends_with(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    Ok(Value::Bool(string_arg(args, 0).ends_with(&string_arg(args, 1))))
}

fn split(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    let text = string_arg(args, 0);
    let separator = string_arg(args, 1);
    let parts: Vec<Value> = if separator.is_empty() {
        text.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        text.split(separator.as_str()).map(Value::from).collect()
    };
    Ok(Value::List(parts))
}

fn join(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 2)?;
    let items = list_arg(args, 0)?;
    let separator = match arg(args, 1) {
        Value::Null => ",".to_string(),
        v => v.to_string(),
    };
    let joined = items
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(&separator);
    Ok(Value::String(joined))
}

/// Upper bound on the padded length
const MAX_PAD_WIDTH: i64 = 10_000;

fn pad_start(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 3)?;
    let text = string_arg(args, 0);
    let width = to_integer(&args[1])?.max(0);
    if width > MAX_PAD_WIDTH {
        return Err(format!(
            "pad width {} exceeds the maximum of {}",
            width, MAX_PAD_WIDTH
        ));
    }
    let width = width as usize;
    let pad: Vec<char> = match arg(args, 2) {
        Value::Null => vec![' '],
        v => v.to_string().chars().collect(),
    };
    let len = text.chars().count();
    if len >= width || pad.is_empty() {
        return Ok(Value::String(text));
    }
    let mut padded: String = pad.iter().cycle().take(width - len).collect();
    padded.push_str(&text);
    Ok(Value::String(padded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn test_concat_stringifies_everything() {
        let args = [s("Total: "), Value::from(42), s(" "), Value::from(true), Value::Null];
        assert_eq!(concat(&args), Ok(s("Total: 42 true")));
        assert_eq!(concat(&[]), Ok(s("")));
    }

    #[test]
    fn test_case_and_trim() {
        assert_eq!(upper(&[s("héllo")]), Ok(s("HÉLLO")));
        assert_eq!(lower(&[s("ABC")]), Ok(s("abc")));
        assert_eq!(trim(&[s("  padded \n")]), Ok(s("padded")));
        assert!(upper(&[]).is_err());
    }

    #[test]
    fn test_length() {
        assert_eq!(length(&[s("héllo")]), Ok(Value::from(5)));
        assert_eq!(length(&[Value::from(json!([1, 2, 3]))]), Ok(Value::from(3)));
        assert_eq!(length(&[Value::from(json!({"a": 1}))]), Ok(Value::from(1)));
        assert_eq!(length(&[Value::Null]), Ok(Value::from(0)));
    }

    #[test]
    fn test_substring_clamps() {
        assert_eq!(substring(&[s("Hello World"), Value::from(6)]), Ok(s("World")));
        assert_eq!(
            substring(&[s("Hello World"), Value::from(0), Value::from(5)]),
            Ok(s("Hello"))
        );
        assert_eq!(substring(&[s("abc"), Value::from(10)]), Ok(s("")));
        assert_eq!(substring(&[s("abc"), Value::from(-2), Value::from(100)]), Ok(s("abc")));
        assert!(substring(&[s("abc"), s("x")]).is_err());
    }

    #[test]
    fn test_replace_and_search() {
        assert_eq!(replace(&[s("a-b-c"), s("-"), s("+")]), Ok(s("a+b+c")));
        assert_eq!(replace(&[s("abc"), s(""), s("x")]), Ok(s("abc")));
        assert_eq!(contains(&[s("Hello"), s("ell")]), Ok(Value::Bool(true)));
        assert_eq!(contains(&[Value::from(json!([1, 2])), s("2")]), Ok(Value::Bool(true)));
        assert_eq!(contains(&[Value::from(json!(["a"])), s("b")]), Ok(Value::Bool(false)));
        assert_eq!(starts_with(&[s("Hello"), s("He")]), Ok(Value::Bool(true)));
        assert_eq!(ends_with(&[s("Hello"), s("He")]), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_split_and_join() {
        assert_eq!(
            split(&[s("a,b,c"), s(",")]),
            Ok(Value::from(json!(["a", "b", "c"])))
        );
        assert_eq!(split(&[s("ab"), s("")]), Ok(Value::from(json!(["a", "b"]))));
        assert_eq!(join(&[Value::from(json!([1, "x", true]))]), Ok(s("1,x,true")));
        assert_eq!(join(&[Value::from(json!(["a", "b"])), s(" | ")]), Ok(s("a | b")));
        assert!(join(&[s("not a list")]).is_err());
    }

    #[test]
    fn test_pad_start() {
        assert_eq!(pad_start(&[Value::from(7), Value::from(3), s("0")]), Ok(s("007")));
        assert_eq!(pad_start(&[s("ab"), Value::from(4)]), Ok(s("  ab")));
        assert_eq!(pad_start(&[s("abcdef"), Value::from(3)]), Ok(s("abcdef")));
        assert_eq!(pad_start(&[s("x"), Value::from(4), s("ab")]), Ok(s("abax")));
    }

    #[test]
    fn test_pad_start_rejects_oversized_width() {
        let err = pad_start(&[s("a"), Value::from(1e12)]).unwrap_err();
        assert!(err.contains("exceeds"), "{}", err);
        assert!(pad_start(&[s("a"), Value::from(10_001)]).is_err());

        let widest = pad_start(&[s("a"), Value::from(10_000), s("0")]).unwrap();
        assert_eq!(widest.as_str().map(|p| p.chars().count()), Some(10_000));
    }
}
