//! Named variables and functions shared by every evaluation
//!
//! Reads dominate: every variable lookup and function call goes through a
//! read lock, while registration takes the write lock for a single map
//! operation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::path::{self, PathSegment};
use crate::value::{Map, Value};

/// A callable: evaluated arguments in, one value or an error message out
pub type Function = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Display metadata for a registered function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,
    /// e.g. `divide(a, b)`
    pub signature: String,
    pub description: String,
}

#[derive(Clone)]
struct FunctionEntry {
    call: Function,
    info: FunctionInfo,
}

/// Thread-safe registry of variables and functions
#[derive(Default)]
pub struct Registry {
    variables: RwLock<Map>,
    functions: RwLock<HashMap<String, FunctionEntry>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("variables", &self.variable_names())
            .field("functions", &self.function_names())
            .finish()
    }
}

// Every write is a single map operation, so a poisoned lock still guards
// consistent data.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl Registry {
    /// Create an empty registry (no standard library)
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Register or replace a variable
    pub fn register_variable(&self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        log::debug!("Registering variable '{}' ({})", name, value.type_name());
        write(&self.variables).insert(name, value);
    }

    /// Remove a variable, returning its last value
    pub fn unregister_variable(&self, name: &str) -> Option<Value> {
        write(&self.variables).remove(name)
    }

    /// Get a copy of a variable's value
    pub fn variable(&self, name: &str) -> Option<Value> {
        read(&self.variables).get(name).cloned()
    }

    /// Resolve a parsed path whose first segment names a variable.
    /// Only the resolved leaf is cloned.
    pub fn resolve(&self, segments: &[PathSegment]) -> Option<Value> {
        path::resolve_in(&read(&self.variables), segments).cloned()
    }

    /// Snapshot of all variables
    pub fn variables(&self) -> Map {
        read(&self.variables).clone()
    }

    /// Variable names, sorted
    pub fn variable_names(&self) -> Vec<String> {
        read(&self.variables).keys().cloned().collect()
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Register or replace a function with a generic `name(...)` signature
    pub fn register_function<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        let name = name.into();
        let signature = format!("{}(...)", name);
        self.register_documented_function(name, signature, "User-defined function", f);
    }

    /// Register or replace a function along with its signature and description
    pub fn register_documented_function<F>(
        &self,
        name: impl Into<String>,
        signature: impl Into<String>,
        description: impl Into<String>,
        f: F,
    ) where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        let name = name.into();
        let entry = FunctionEntry {
            call: Arc::new(f),
            info: FunctionInfo {
                name: name.clone(),
                signature: signature.into(),
                description: description.into(),
            },
        };
        if write(&self.functions).insert(name.clone(), entry).is_some() {
            log::warn!("Function '{}' was already registered and has been replaced", name);
        } else {
            log::trace!("Registered function '{}'", name);
        }
    }

    /// Look up a function by name
    pub fn function(&self, name: &str) -> Option<Function> {
        read(&self.functions).get(name).map(|e| e.call.clone())
    }

    pub fn has_function(&self, name: &str) -> bool {
        read(&self.functions).contains_key(name)
    }

    /// Function names, sorted
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = read(&self.functions).keys().cloned().collect();
        names.sort();
        names
    }

    pub fn function_info(&self, name: &str) -> Option<FunctionInfo> {
        read(&self.functions).get(name).map(|e| e.info.clone())
    }

    /// Metadata for every function, sorted by name
    pub fn functions_info(&self) -> Vec<FunctionInfo> {
        let mut infos: Vec<FunctionInfo> = read(&self.functions)
            .values()
            .map(|e| e.info.clone())
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}
