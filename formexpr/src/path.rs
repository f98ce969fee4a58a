//! Path resolution over nested maps and lists
//!
//! A path is a dotted list of fields where each field may be followed by one
//! or more list indices: `user.addresses[0].street`, `matrix[1][2]`.
//! Anything that cannot be followed (missing key, indexing a non-list,
//! out-of-range index, field access on a scalar) resolves to `None`.
//! Whether that becomes an error is the caller's decision.

use crate::value::{Map, Value};

/// One step of a parsed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Map field access: `.name`
    Key(String),
    /// List index access: `[3]`
    Index(usize),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Split a path string into segments.
///
/// Returns `None` for malformed paths: empty fields (`a..b`), unterminated
/// or non-numeric brackets (`a[`, `a[x]`, `a[-1]`), or a leading index.
pub fn parse_path(path: &str) -> Option<Vec<PathSegment>> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    for field in path.split('.') {
        let (name, mut rest) = match field.find('[') {
            Some(pos) => (&field[..pos], &field[pos..]),
            None => (field, ""),
        };
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        segments.push(PathSegment::Key(name.to_string()));

        while !rest.is_empty() {
            let inner = rest.strip_prefix('[')?;
            let close = inner.find(']')?;
            let digits = inner[..close].trim();
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            segments.push(PathSegment::Index(digits.parse().ok()?));
            rest = &inner[close + 1..];
        }
    }

    Some(segments)
}

/// Render segments back into canonical path text
pub fn join_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if let PathSegment::Key(k) = segment {
            if i > 0 {
                out.push('.');
            }
            out.push_str(k);
        } else {
            out.push_str(&segment.to_string());
        }
    }
    out
}

/// Follow `segments` starting at `root`
pub fn resolve<'a>(root: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = step(current, segment)?;
    }
    Some(current)
}

/// Follow `segments` starting at a map (a context or the registry's variables).
/// The first segment must be a key.
pub fn resolve_in<'a>(map: &'a Map, segments: &[PathSegment]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    let PathSegment::Key(root) = first else {
        return None;
    };
    resolve(map.get(root)?, rest)
}

/// Resolve a path string against a value, cloning the result
pub fn resolve_path(root: &Value, path: &str) -> Option<Value> {
    let segments = parse_path(path)?;
    resolve(root, &segments).cloned()
}

/// The identifier a path starts with: `items` for `items[0].name`
pub fn root_name(path: &str) -> Option<&str> {
    let path = path.trim();
    let end = path.find(['.', '[']).unwrap_or(path.len());
    let root = path[..end].trim();
    (!root.is_empty()).then_some(root)
}

fn step<'a>(value: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (value, segment) {
        (Value::Map(map), PathSegment::Key(key)) => map.get(key),
        (Value::List(items), PathSegment::Index(i)) => items.get(*i),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        Value::from(json!({
            "name": "Contoso",
            "revenue": 1000000,
            "addresses": [
                {"street": "123 Main St", "tags": ["home", "primary"]},
                {"street": "9 Side Rd"}
            ],
            "owner": null
        }))
    }

    #[test]
    fn test_parse_simple_and_nested() {
        assert_eq!(
            parse_path("a.b").unwrap(),
            vec![PathSegment::Key("a".into()), PathSegment::Key("b".into())]
        );
        assert_eq!(
            parse_path("items[2].name").unwrap(),
            vec![
                PathSegment::Key("items".into()),
                PathSegment::Index(2),
                PathSegment::Key("name".into())
            ]
        );
        assert_eq!(
            parse_path("m[1][0]").unwrap(),
            vec![
                PathSegment::Key("m".into()),
                PathSegment::Index(1),
                PathSegment::Index(0)
            ]
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_path("").is_none());
        assert!(parse_path("a..b").is_none());
        assert!(parse_path("a[").is_none());
        assert!(parse_path("a[x]").is_none());
        assert!(parse_path("a[-1]").is_none());
        assert!(parse_path("[0]").is_none());
        assert!(parse_path("a[0]b").is_none());
    }

    #[test]
    fn test_resolve_simple_path() {
        let record = record();
        assert_eq!(resolve_path(&record, "name"), Some(Value::from("Contoso")));
        assert_eq!(resolve_path(&record, "revenue"), Some(Value::from(1000000)));
    }

    #[test]
    fn test_resolve_array_access() {
        let record = record();
        assert_eq!(
            resolve_path(&record, "addresses[0].street"),
            Some(Value::from("123 Main St"))
        );
        assert_eq!(
            resolve_path(&record, "addresses[0].tags[1]"),
            Some(Value::from("primary"))
        );
    }

    #[test]
    fn test_resolve_missing_is_none() {
        let record = record();
        assert_eq!(resolve_path(&record, "missing"), None);
        assert_eq!(resolve_path(&record, "addresses[5].street"), None);
        assert_eq!(resolve_path(&record, "name.first"), None);
        assert_eq!(resolve_path(&record, "owner.name"), None);
        assert_eq!(resolve_path(&record, "name[0]"), None);
    }

    #[test]
    fn test_present_null_is_found() {
        let record = record();
        assert_eq!(resolve_path(&record, "owner"), Some(Value::Null));
    }

    #[test]
    fn test_resolve_in_map() {
        let Value::Map(map) = record() else {
            panic!("expected map");
        };
        let segments = parse_path("addresses[1].street").unwrap();
        assert_eq!(
            resolve_in(&map, &segments),
            Some(&Value::from("9 Side Rd"))
        );
    }

    #[test]
    fn test_root_name_and_join() {
        assert_eq!(root_name("items[0].name"), Some("items"));
        assert_eq!(root_name("user.email"), Some("user"));
        assert_eq!(root_name("plain"), Some("plain"));
        assert_eq!(root_name("[0]"), None);

        let segments = parse_path("a.b[2].c").unwrap();
        assert_eq!(join_path(&segments), "a.b[2].c");
    }
}
