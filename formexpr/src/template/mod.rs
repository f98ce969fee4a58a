//! Template expressions - `${...}` interpolation
//!
//! Supports:
//! - Variables and paths: `${name}`, `${user.addresses[0].street}`
//! - Literals: `${'text'}`, `${42}`, `${true}`, `${null}`
//! - Function calls: `${upper(name)}`, `${add(a, b)}`
//! - Comparisons: `${age >= 18}`
//! - Ternary conditionals: `${cond ? then : else}`
//! - Null coalesce: `${a ?? b ?? 'default'}`
//! - Loops: `${forEach(item, i, items, concat(i, ': ', item.name))}`

mod ast;
mod eval;
mod parser;

pub use ast::{CompareOp, Part, TemplateExpression};
pub use eval::{Scope, evaluate, render};
pub use parser::{parse_expression, parse_template};
