//! Runtime value representation for template evaluation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// String-keyed map of values. Also the shape of an evaluation context.
pub type Map = BTreeMap<String, Value>;

/// A dynamic value produced or consumed by an expression
///
/// Numbers are always double precision: integers are widened on the way in,
/// so `10` and `10.0` are the same value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Number (always f64)
    Number(f64),
    /// String
    String(String),
    /// Ordered list
    List(Vec<Value>),
    /// String-keyed map
    Map(Map),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null or the empty string, the two values `default`/`coalesce`/`??` skip over
    pub fn is_empty_like(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Truthiness used by `if`, `and`, `or` and ternaries.
    ///
    /// `null`, `false`, `0` and `""` are falsy; everything else is truthy,
    /// including empty lists and maps.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) => true,
        }
    }

    /// Type name as shown in suggestions and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "array",
            Value::Map(_) => "object",
        }
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as number (no string parsing, see `stdlib::to_number`)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Parse from a JSON value
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(obj) => Value::Map(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to a JSON value. Whole numbers are emitted as JSON integers.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    serde_json::json!(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

/// Format a number the way templates print it: `42`, `3.14`, `-0.5`
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // avoid "-0"
        return "0".to_string();
    }
    n.to_string()
}

/// Default stringification. Null renders as the empty string so that
/// missing optional values disappear from rendered text.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "map[")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}:{}", k, v)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(&json)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integers_widen_to_float() {
        assert_eq!(Value::from(10), Value::from(10.0));
        assert_eq!(Value::from_json(&json!(10)), Value::Number(10.0));
    }

    #[test]
    fn test_display_numbers() {
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(3.14).to_string(), "3.14");
        assert_eq!(Value::from(-0.0).to_string(), "0");
        assert_eq!(Value::from(-2.5).to_string(), "-2.5");
    }

    #[test]
    fn test_display_collections() {
        let list = Value::from(json!([1, "a", true]));
        assert_eq!(list.to_string(), "[1 a true]");

        let map = Value::from(json!({"b": 2, "a": "x"}));
        assert_eq!(map.to_string(), "map[a:x b:2]");

        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from(false).is_truthy());
        assert!(Value::from(-1).is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::List(vec![]).is_truthy());
    }

    #[test]
    fn test_typed_accessors() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("true").as_bool(), None);
        let list = Value::from(json!([1, 2]));
        assert_eq!(list.as_list().map(<[Value]>::len), Some(2));
        assert_eq!(Value::from(json!({})).as_list(), None);
    }

    #[test]
    fn test_json_interop() {
        let original = json!({"name": "Alice", "tags": ["a", "b"], "age": 30, "ratio": 0.5});
        let value = Value::from_json(&original);
        assert_eq!(value.to_json(), original);
    }

    #[test]
    fn test_deserialize_natural_shape() {
        let value: Value = serde_json::from_str(r#"{"a": [1, null, "x"], "b": false}"#).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(
            map["a"],
            Value::List(vec![Value::Number(1.0), Value::Null, Value::from("x")])
        );
        assert_eq!(map["b"], Value::Bool(false));
    }
}
