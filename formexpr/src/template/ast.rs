//! AST types for template expressions

use serde::{Deserialize, Serialize};

use crate::path;
use crate::value::{Value, format_number};

/// A parsed template: literal text interleaved with `${...}` expressions
///
/// `parts` is empty only when `raw` is empty. A template without any
/// placeholder is a single `Part::Text` holding `raw` verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateExpression {
    /// The original template string
    pub raw: String,
    /// The parts of the template, in source order
    pub parts: Vec<Part>,
}

impl TemplateExpression {
    /// Create a new template expression
    pub fn new(raw: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            raw: raw.into(),
            parts,
        }
    }

    /// Create a template with just literal text (no expressions)
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        let parts = if s.is_empty() {
            Vec::new()
        } else {
            vec![Part::Text(s.clone())]
        };
        Self { raw: s, parts }
    }

    /// True when the template contains no `${...}` expressions
    pub fn is_text_only(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, Part::Text(_)))
    }

    /// Get all variable paths referenced in this template.
    ///
    /// Names bound by an enclosing `forEach` are not reported. Each path is
    /// listed once, in first-seen order.
    pub fn variable_paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        let mut bound = Vec::new();
        for part in &self.parts {
            collect_variable_paths(part, &mut bound, &mut paths);
        }
        paths
    }

    /// Root identifiers of all referenced variables (for dependency tracking)
    pub fn root_variables(&self) -> Vec<&str> {
        let mut roots: Vec<&str> = Vec::new();
        for p in self.variable_paths() {
            if let Some(root) = path::root_name(p) {
                if !roots.contains(&root) {
                    roots.push(root);
                }
            }
        }
        roots
    }
}

impl std::fmt::Display for TemplateExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for part in &self.parts {
            match part {
                Part::Text(s) => write!(f, "{}", s)?,
                other => write!(f, "${{{}}}", other)?,
            }
        }
        Ok(())
    }
}

/// Collect variable paths recursively, skipping loop-bound names
fn collect_variable_paths<'a>(part: &'a Part, bound: &mut Vec<&'a str>, paths: &mut Vec<&'a str>) {
    match part {
        Part::Text(_) | Part::Literal(_) => {}
        Part::Variable { path: p } => {
            let is_bound = path::root_name(p).is_some_and(|root| bound.contains(&root));
            if !is_bound && !paths.contains(&p.as_str()) {
                paths.push(p);
            }
        }
        Part::Function { args, .. } => {
            for arg in args {
                collect_variable_paths(arg, bound, paths);
            }
        }
        Part::NullCoalesce { left, right } => {
            collect_variable_paths(left, bound, paths);
            collect_variable_paths(right, bound, paths);
        }
        Part::ForEach {
            item,
            index,
            collection,
            body,
        } => {
            collect_variable_paths(collection, bound, paths);
            let depth = bound.len();
            bound.push(item);
            if let Some(index) = index {
                bound.push(index);
            }
            collect_variable_paths(body, bound, paths);
            bound.truncate(depth);
        }
    }
}

/// A node of a parsed template
///
/// Nodes are immutable once parsed; evaluation never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Part {
    /// Literal text outside of any `${...}`
    Text(String),
    /// A constant: `'string'`, `42`, `true`, `null`
    Literal(Value),
    /// A variable path: `name`, `user.addresses[0].street`
    Variable { path: String },
    /// A function call: `upper(name)`. Ternaries and comparisons desugar to
    /// calls of `if`, `eq`, `ne`, `gt`, `lt`, `gte` and `lte`.
    Function { name: String, args: Vec<Part> },
    /// Null coalesce: `a ?? b`
    NullCoalesce { left: Box<Part>, right: Box<Part> },
    /// Loop: `forEach(item, [index,] collection, body)`
    ForEach {
        item: String,
        index: Option<String>,
        collection: Box<Part>,
        body: Box<Part>,
    },
}

impl Part {
    pub fn variable(path: impl Into<String>) -> Self {
        Part::Variable { path: path.into() }
    }

    pub fn call(name: impl Into<String>, args: Vec<Part>) -> Self {
        Part::Function {
            name: name.into(),
            args,
        }
    }

    /// `cond ? then : else` is a call to `if`
    pub fn ternary(condition: Part, then_part: Part, else_part: Part) -> Self {
        Part::call("if", vec![condition, then_part, else_part])
    }

    pub fn compare(left: Part, op: CompareOp, right: Part) -> Self {
        Part::call(op.function_name(), vec![left, right])
    }
}

impl std::fmt::Display for Part {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Part::Text(s) => write!(f, "{}", s),
            Part::Literal(value) => write_literal(f, value),
            Part::Variable { path } => write!(f, "{}", path),
            Part::Function { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Part::NullCoalesce { left, right } => {
                if matches!(left.as_ref(), Part::NullCoalesce { .. }) {
                    write!(f, "({}) ?? {}", left, right)
                } else {
                    write!(f, "{} ?? {}", left, right)
                }
            }
            Part::ForEach {
                item,
                index,
                collection,
                body,
            } => {
                write!(f, "forEach({}, ", item)?;
                if let Some(index) = index {
                    write!(f, "{}, ", index)?;
                }
                write!(f, "{}, {})", collection, body)
            }
        }
    }
}

fn write_literal(f: &mut std::fmt::Formatter<'_>, value: &Value) -> std::fmt::Result {
    match value {
        Value::Null => write!(f, "null"),
        Value::Number(n) => write!(f, "{}", format_number(*n)),
        Value::String(s) => {
            write!(f, "'")?;
            for c in s.chars() {
                match c {
                    '\'' => write!(f, "\\'")?,
                    '\\' => write!(f, "\\\\")?,
                    '\n' => write!(f, "\\n")?,
                    '\t' => write!(f, "\\t")?,
                    c => write!(f, "{}", c)?,
                }
            }
            write!(f, "'")
        }
        other => write!(f, "{}", other),
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Standard library function this operator desugars to
    pub fn function_name(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Lt => "lt",
            CompareOp::Le => "lte",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "gte",
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Ne => write!(f, "!="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Le => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Ge => write!(f, ">="),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_variable_paths() {
        let template = TemplateExpression::new(
            "Name: ${name}, City: ${user.address.city ?? name}",
            vec![
                Part::Text("Name: ".to_string()),
                Part::variable("name"),
                Part::Text(", City: ".to_string()),
                Part::NullCoalesce {
                    left: Box::new(Part::variable("user.address.city")),
                    right: Box::new(Part::variable("name")),
                },
            ],
        );

        assert_eq!(template.variable_paths(), vec!["name", "user.address.city"]);
        assert_eq!(template.root_variables(), vec!["name", "user"]);
    }

    #[test]
    fn test_loop_bound_names_are_not_dependencies() {
        let template = TemplateExpression::new(
            "",
            vec![Part::ForEach {
                item: "item".to_string(),
                index: Some("i".to_string()),
                collection: Box::new(Part::variable("order.items")),
                body: Box::new(Part::call(
                    "concat",
                    vec![
                        Part::variable("i"),
                        Part::variable("item.name"),
                        Part::variable("currency"),
                    ],
                )),
            }],
        );

        assert_eq!(template.variable_paths(), vec!["order.items", "currency"]);
    }

    #[test]
    fn test_part_display() {
        let part = Part::ternary(
            Part::compare(Part::variable("age"), CompareOp::Ge, Part::Literal(Value::from(18))),
            Part::Literal(Value::from("adult")),
            Part::Literal(Value::from("it's a minor")),
        );
        assert_eq!(
            part.to_string(),
            "if(gte(age, 18), 'adult', 'it\\'s a minor')"
        );
    }

    #[test]
    fn test_text_template() {
        let template = TemplateExpression::text("plain");
        assert!(template.is_text_only());
        assert_eq!(template.parts, vec![Part::Text("plain".to_string())]);
        assert!(TemplateExpression::text("").parts.is_empty());
    }

    #[test]
    fn test_compare_op_function_names() {
        assert_eq!(CompareOp::Ge.function_name(), "gte");
        assert_eq!(CompareOp::Ne.to_string(), "!=");
    }
}
