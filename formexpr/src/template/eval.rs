//! Evaluator for template expressions

use std::borrow::Cow;

use super::ast::*;
use crate::error::EvalError;
use crate::path;
use crate::registry::Registry;
use crate::value::{Map, Value};

/// Per-call evaluation state: the context map plus the coalescing flag
///
/// While `coalescing` is set, unresolved variables evaluate to null instead
/// of failing. It is switched on for the left operand of `??`.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    values: Cow<'a, Map>,
    coalescing: bool,
}

impl<'a> Scope<'a> {
    /// Scope over a caller-supplied context
    pub fn new(context: &'a Map) -> Self {
        Self {
            values: Cow::Borrowed(context),
            coalescing: false,
        }
    }

    pub fn is_coalescing(&self) -> bool {
        self.coalescing
    }

    pub fn values(&self) -> &Map {
        &self.values
    }

    /// Same values, with unresolved variables demoted to null
    fn coalescing(&self) -> Scope<'_> {
        Scope {
            values: Cow::Borrowed(&*self.values),
            coalescing: true,
        }
    }

    /// A fresh copy of the context extended with loop bindings. The parent
    /// map is never mutated, so iterations cannot see each other's bindings.
    fn bind(&self, item: &str, value: Value, index: Option<(&str, usize)>) -> Scope<'static> {
        let mut values = self.values.clone().into_owned();
        values.insert(item.to_string(), value);
        if let Some((name, i)) = index {
            values.insert(name.to_string(), Value::from(i));
        }
        Scope {
            values: Cow::Owned(values),
            coalescing: self.coalescing,
        }
    }
}

/// Evaluate a template against a context.
///
/// A template made of a single part yields that part's typed value; several
/// parts are stringified and concatenated. An empty template yields `""`.
pub fn evaluate(
    template: &TemplateExpression,
    registry: &Registry,
    context: &Map,
) -> Result<Value, EvalError> {
    let scope = Scope::new(context);

    match template.parts.as_slice() {
        [] => Ok(Value::String(String::new())),
        [part] => part.evaluate(registry, &scope),
        parts => {
            let mut result = String::new();
            for part in parts {
                let value = part.evaluate(registry, &scope)?;
                result.push_str(&value.to_string());
            }
            Ok(Value::String(result))
        }
    }
}

/// Evaluate a template and stringify the result
pub fn render(
    template: &TemplateExpression,
    registry: &Registry,
    context: &Map,
) -> Result<String, EvalError> {
    evaluate(template, registry, context).map(|v| v.to_string())
}

impl Part {
    /// Evaluate this node. Nodes are never mutated by evaluation.
    pub fn evaluate(&self, registry: &Registry, scope: &Scope<'_>) -> Result<Value, EvalError> {
        match self {
            Part::Text(s) => Ok(Value::String(s.clone())),

            Part::Literal(value) => Ok(value.clone()),

            Part::Variable { path } => eval_variable(path, registry, scope),

            Part::Function { name, args } => {
                // Arguments left to right; the first failure aborts the call
                let values = args
                    .iter()
                    .map(|arg| arg.evaluate(registry, scope))
                    .collect::<Result<Vec<_>, _>>()?;

                let function = registry
                    .function(name)
                    .ok_or_else(|| EvalError::FunctionNotFound { name: name.clone() })?;

                function(&values).map_err(|message| EvalError::Function {
                    name: name.clone(),
                    message,
                })
            }

            Part::NullCoalesce { left, right } => {
                match left.evaluate(registry, &scope.coalescing()) {
                    Ok(value) if !value.is_empty_like() => Ok(value),
                    // Left errors are swallowed, never surfaced
                    _ => right.evaluate(registry, scope),
                }
            }

            Part::ForEach {
                item,
                index,
                collection,
                body,
            } => eval_for_each(item, index.as_deref(), collection, body, registry, scope),
        }
    }
}

/// Resolve a variable: context first, then the registry
fn eval_variable(path: &str, registry: &Registry, scope: &Scope<'_>) -> Result<Value, EvalError> {
    if let Some(segments) = path::parse_path(path) {
        if let Some(value) = path::resolve_in(scope.values(), &segments) {
            return Ok(value.clone());
        }
        // Root identifier looked up in the registry, then drilled into,
        // which also covers `items[0].name` on a registry list
        if let Some(value) = registry.resolve(&segments) {
            return Ok(value);
        }
    }

    if scope.is_coalescing() {
        return Ok(Value::Null);
    }
    Err(EvalError::VariableNotFound {
        path: path.to_string(),
    })
}

fn eval_for_each(
    item: &str,
    index: Option<&str>,
    collection: &Part,
    body: &Part,
    registry: &Registry,
    scope: &Scope<'_>,
) -> Result<Value, EvalError> {
    let mut result = String::new();
    let mut append = |value: Value| {
        let rendered = value.to_string();
        // Empty renders are skipped, so a body can filter with a ternary
        if !rendered.is_empty() {
            result.push_str(&rendered);
        }
    };

    match collection.evaluate(registry, scope)? {
        Value::List(items) => {
            log::trace!("forEach over {} list items", items.len());
            for (i, element) in items.into_iter().enumerate() {
                let child = scope.bind(item, element, index.map(|name| (name, i)));
                append(body.evaluate(registry, &child)?);
            }
        }
        Value::Map(map) => {
            log::trace!("forEach over {} map entries", map.len());
            for (i, (key, value)) in map.into_iter().enumerate() {
                let mut entry = Map::new();
                entry.insert("key".to_string(), Value::String(key));
                entry.insert("value".to_string(), value);
                let child = scope.bind(item, Value::Map(entry), index.map(|name| (name, i)));
                append(body.evaluate(registry, &child)?);
            }
        }
        // Nothing to iterate
        Value::Null => {}
        other => {
            return Err(EvalError::NotIterable {
                type_name: other.type_name(),
            });
        }
    }

    Ok(Value::String(result))
}
