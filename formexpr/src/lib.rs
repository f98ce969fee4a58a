//! Expression and template engine for dynamic forms
//!
//! Templates are strings with `${...}` placeholders. Each placeholder holds an
//! expression: a literal, a variable path, a function call, a comparison, a
//! ternary, a null-coalesce or a `forEach` loop. An [`Engine`] parses
//! templates once, caches the result, and evaluates them against a
//! per-call context layered over its registry of variables and functions.
//!
//! ```
//! use formexpr::{Engine, Map, Value};
//!
//! let engine = Engine::new();
//! engine.register_variable("user", serde_json::json!({"name": "Ada", "age": 36}));
//!
//! let greeting = engine
//!     .evaluate_expression_as_string(
//!         "Hi ${upper(user.name)}, you are ${user.age >= 18 ? 'an adult' : 'a minor'}",
//!         &Map::new(),
//!     )
//!     .unwrap();
//! assert_eq!(greeting, "Hi ADA, you are an adult");
//!
//! let total = engine.evaluate_expression("${add(1, 2.5)}", &Map::new()).unwrap();
//! assert_eq!(total, Value::from(3.5));
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod path;
pub mod registry;
pub mod stdlib;
pub mod suggest;
pub mod template;
pub mod value;

pub use config::{EngineConfig, SuggestionConfig};
pub use engine::Engine;
pub use error::{Error, EvalError, ParseError, Result};
pub use registry::{Function, FunctionInfo, Registry};
pub use suggest::{ArrayInfo, VariableSuggestion};
pub use template::{Part, TemplateExpression, parse_template};
pub use value::{Map, Value};
