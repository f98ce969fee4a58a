//! Builds the full suggestion set from registry contents

use super::{ArrayInfo, VariableSuggestion};
use crate::config::SuggestionConfig;
use crate::registry::Registry;
use crate::value::{Map, Value};

/// Marker appended to truncated sample values
const TRUNCATION_MARKER: &str = "...";

/// Every variable path (recursing into objects, and into the first element
/// of arrays) followed by every function, variables sorted by path and
/// functions by name
pub fn generate_suggestions(registry: &Registry, config: &SuggestionConfig) -> Vec<VariableSuggestion> {
    let mut suggestions = Vec::new();

    for (name, value) in registry.variables() {
        walk(&name, &value, false, config, &mut suggestions);
    }
    let variable_count = suggestions.len();

    for info in registry.functions_info() {
        suggestions.push(VariableSuggestion {
            expr: info.name,
            value_type: "function".to_string(),
            description: info.description,
            sample_value: Value::Null,
            children: Vec::new(),
            is_nested: false,
            array_info: None,
            is_function: true,
            signature: Some(info.signature),
        });
    }

    log::debug!(
        "Generated {} variable and {} function suggestions",
        variable_count,
        suggestions.len() - variable_count
    );
    suggestions
}

fn walk(
    expr: &str,
    value: &Value,
    is_nested: bool,
    config: &SuggestionConfig,
    out: &mut Vec<VariableSuggestion>,
) {
    let (description, children, array_info) = match value {
        Value::Map(map) => (
            format!("Object with {} properties", map.len()),
            map.keys().cloned().collect(),
            None,
        ),
        Value::List(items) => (
            format!("Array of {} items", items.len()),
            Vec::new(),
            Some(ArrayInfo {
                item_type: items
                    .first()
                    .map_or("unknown", Value::type_name)
                    .to_string(),
                sample_access: format!("{}[0]", expr),
                length: items.len(),
            }),
        ),
        other => (format!("{} value", other.type_name()), Vec::new(), None),
    };

    out.push(VariableSuggestion {
        expr: expr.to_string(),
        value_type: value.type_name().to_string(),
        description,
        sample_value: sample(value, config),
        children,
        is_nested,
        array_info,
        is_function: false,
        signature: None,
    });

    match value {
        Value::Map(map) => {
            for (key, child) in map {
                walk(&format!("{}.{}", expr, key), child, true, config, out);
            }
        }
        // Only the first element stands in for the whole array
        Value::List(items) => {
            if let Some(first) = items.first() {
                walk(&format!("{}[0]", expr), first, true, config, out);
            }
        }
        _ => {}
    }
}

/// Preview of `value`: strings are cut to `max_sample_chars`, objects to
/// `max_sample_keys` entries (plus a marker entry), applied recursively
fn sample(value: &Value, config: &SuggestionConfig) -> Value {
    match value {
        Value::String(s) if s.chars().count() > config.max_sample_chars => {
            let mut cut: String = s.chars().take(config.max_sample_chars).collect();
            cut.push_str(TRUNCATION_MARKER);
            Value::String(cut)
        }
        Value::Map(map) => {
            let mut preview: Map = map
                .iter()
                .take(config.max_sample_keys)
                .map(|(k, v)| (k.clone(), sample(v, config)))
                .collect();
            if map.len() > config.max_sample_keys {
                let hidden = map.len() - config.max_sample_keys;
                preview.insert(
                    TRUNCATION_MARKER.to_string(),
                    Value::String(format!("{} more", hidden)),
                );
            }
            Value::Map(preview)
        }
        Value::List(items) => Value::List(items.iter().map(|v| sample(v, config)).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry_with(name: &str, value: serde_json::Value) -> Registry {
        let registry = Registry::new();
        registry.register_variable(name, value);
        registry
    }

    fn find<'a>(suggestions: &'a [VariableSuggestion], expr: &str) -> &'a VariableSuggestion {
        suggestions
            .iter()
            .find(|s| s.expr == expr)
            .unwrap_or_else(|| panic!("no suggestion for {}", expr))
    }

    #[test]
    fn test_long_string_sample_is_truncated() {
        let registry = registry_with("bio", json!("This biography is definitely longer than twenty chars"));
        let suggestions = generate_suggestions(&registry, &SuggestionConfig::default());

        let bio = find(&suggestions, "bio");
        assert_eq!(bio.expr, "bio");
        assert_eq!(bio.value_type, "string");
        assert_eq!(bio.sample_value, Value::from("This biography is de..."));
    }

    #[test]
    fn test_objects_recurse_with_children() {
        let registry = registry_with(
            "user",
            json!({"name": "Jane", "address": {"city": "Oslo", "zip": "0150"}}),
        );
        let suggestions = generate_suggestions(&registry, &SuggestionConfig::default());

        let user = find(&suggestions, "user");
        assert_eq!(user.value_type, "object");
        assert_eq!(user.children, vec!["address", "name"]);
        assert!(!user.is_nested);

        let city = find(&suggestions, "user.address.city");
        assert!(city.is_nested);
        assert_eq!(city.sample_value, Value::from("Oslo"));
        assert_eq!(suggestions.len(), 5);
    }

    #[test]
    fn test_arrays_suggest_first_index_only() {
        let registry = registry_with("items", json!([{"sku": "A1"}, {"sku": "B2"}, {"sku": "C3"}]));
        let suggestions = generate_suggestions(&registry, &SuggestionConfig::default());

        let items = find(&suggestions, "items");
        let info = items.array_info.as_ref().unwrap();
        assert_eq!(info.item_type, "object");
        assert_eq!(info.sample_access, "items[0]");
        assert_eq!(info.length, 3);

        assert!(suggestions.iter().any(|s| s.expr == "items[0].sku"));
        assert!(!suggestions.iter().any(|s| s.expr.starts_with("items[1]")));
    }

    #[test]
    fn test_large_object_sample_is_truncated() {
        let registry = registry_with("big", json!({"a": 1, "b": 2, "c": 3, "d": 4, "e": 5}));
        let suggestions = generate_suggestions(&registry, &SuggestionConfig::default());

        let big = find(&suggestions, "big");
        let preview = big.sample_value.as_map().unwrap();
        assert_eq!(preview.len(), 4);
        assert_eq!(preview["..."], Value::from("2 more"));
        assert_eq!(big.children.len(), 5);
        assert_eq!(big.value_type, "object");
    }

    #[test]
    fn test_functions_follow_variables() {
        let registry = registry_with("x", json!(1));
        registry.register_documented_function("double", "double(n)", "Twice n", |args: &[Value]| {
            Ok(args[0].clone())
        });
        let suggestions = generate_suggestions(&registry, &SuggestionConfig::default());

        assert_eq!(suggestions[0].expr, "x");
        let double = &suggestions[1];
        assert!(double.is_function);
        assert_eq!(double.value_type, "function");
        assert_eq!(double.signature.as_deref(), Some("double(n)"));
    }
}
