//! Autocomplete suggestions derived from the registry
//!
//! [`generate_suggestions`] walks every registered variable and function;
//! [`filter_suggestions`] narrows that set down for a partially typed
//! expression.

mod filter;
mod generator;

use serde::Serialize;

use crate::value::Value;

pub use filter::filter_suggestions;
pub use generator::generate_suggestions;

/// One accessible expression path or function
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableSuggestion {
    /// Text to insert, e.g. `user.addresses[0].street`
    pub expr: String,
    /// Value type name, or `function`
    #[serde(rename = "type")]
    pub value_type: String,
    pub description: String,
    /// Preview of the value; long strings and large objects are truncated
    pub sample_value: Value,
    /// Immediate child keys of an object
    pub children: Vec<String>,
    /// True for anything below a registry root
    pub is_nested: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_info: Option<ArrayInfo>,
    pub is_function: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Extra metadata on array-valued suggestions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayInfo {
    /// Type of the first element, `unknown` for an empty array
    pub item_type: String,
    /// Example indexed access, e.g. `items[0]`
    pub sample_access: String,
    pub length: usize,
}

impl VariableSuggestion {
    /// Number of path segments below the root (`a` is 0, `a.b[0]` is 2)
    pub fn depth(&self) -> usize {
        self.expr.matches(['.', '[']).count()
    }
}
