//! Engine - the entry point hosts use to evaluate templates
//!
//! Owns the registry, the parse cache and the configuration. All methods
//! take `&self`, so one engine can be shared across threads.

use std::sync::Arc;

use crate::cache::ExpressionCache;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::registry::Registry;
use crate::stdlib;
use crate::suggest::{self, VariableSuggestion};
use crate::template::{self, TemplateExpression};
use crate::value::{Map, Value};

/// Template engine: registry + parse cache
#[derive(Debug)]
pub struct Engine {
    registry: Registry,
    cache: ExpressionCache,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with the standard library registered
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine with an empty registry
    pub fn bare() -> Self {
        Self::with_config(EngineConfig {
            standard_library: false,
            ..EngineConfig::default()
        })
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let registry = Registry::new();
        if config.standard_library {
            stdlib::register_all(&registry);
        }
        for (name, value) in &config.variables {
            registry.register_variable(name.clone(), value.clone());
        }
        Self {
            registry,
            cache: ExpressionCache::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register or replace a variable visible to every evaluation
    pub fn register_variable(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.registry.register_variable(name, value);
    }

    /// Register or replace a function
    pub fn register_function<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.registry.register_function(name, f);
    }

    /// Parse `raw`, reusing the cached result when it was parsed before
    pub fn parse(&self, raw: &str) -> Result<Arc<TemplateExpression>> {
        Ok(self.cache.get_or_parse(raw)?)
    }

    /// Evaluate a template string against `context`.
    ///
    /// Context values shadow registry variables of the same name. Parse
    /// errors are reported before anything is evaluated.
    pub fn evaluate_expression(&self, raw: &str, context: &Map) -> Result<Value> {
        let template = self.parse(raw)?;
        self.evaluate_template(&template, context)
    }

    /// Evaluate and stringify (null becomes `""`)
    pub fn evaluate_expression_as_string(&self, raw: &str, context: &Map) -> Result<String> {
        self.evaluate_expression(raw, context).map(|v| v.to_string())
    }

    /// Evaluate an already parsed template
    pub fn evaluate_template(&self, template: &TemplateExpression, context: &Map) -> Result<Value> {
        Ok(template::evaluate(template, &self.registry, context)?)
    }

    /// Every suggestion the registry currently offers
    pub fn generate_suggestions(&self) -> Vec<VariableSuggestion> {
        suggest::generate_suggestions(&self.registry, &self.config.suggestions)
    }

    /// Ranked suggestions for a partially typed expression
    pub fn get_expression_suggestions(&self, partial: &str) -> Vec<VariableSuggestion> {
        let all = self.generate_suggestions();
        suggest::filter_suggestions(&all, partial, &self.config.suggestions)
    }

    /// Number of parsed templates held in the cache
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
