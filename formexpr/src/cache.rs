//! Parsed-template cache keyed by raw source text
//!
//! Entries are never evicted. Hosts are expected to evaluate a bounded set
//! of template strings; call [`ExpressionCache::clear`] otherwise.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::ParseError;
use crate::template::{TemplateExpression, parse_template};

/// Shared cache of parsed templates
#[derive(Debug, Default)]
pub struct ExpressionCache {
    entries: RwLock<HashMap<String, Arc<TemplateExpression>>>,
}

impl ExpressionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached parse of `raw`, parsing and inserting it on a miss.
    ///
    /// Parsing happens outside the lock. When two callers race on the same
    /// miss, the first insert wins and both get that entry. Parse errors are
    /// not cached.
    pub fn get_or_parse(&self, raw: &str) -> Result<Arc<TemplateExpression>, ParseError> {
        if let Some(hit) = self.get(raw) {
            log::trace!("Expression cache hit: {:?}", raw);
            return Ok(hit);
        }

        log::debug!("Expression cache miss, parsing {:?}", raw);
        let parsed = Arc::new(parse_template(raw)?);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.entry(raw.to_string()).or_insert(parsed).clone())
    }

    pub fn get(&self, raw: &str) -> Option<Arc<TemplateExpression>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(raw)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_raw_string_shares_one_entry() {
        let cache = ExpressionCache::new();
        let first = cache.get_or_parse("Hello ${name}").unwrap();
        let second = cache.get_or_parse("Hello ${name}").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.get_or_parse("${other}").unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_parse_errors_are_not_cached() {
        let cache = ExpressionCache::new();
        assert!(cache.get_or_parse("${unclosed").is_err());
        assert!(cache.is_empty());
        assert!(cache.get("${unclosed").is_none());
    }

    #[test]
    fn test_clear() {
        let cache = ExpressionCache::new();
        cache.get_or_parse("${a}").unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_get_or_parse() {
        let cache = ExpressionCache::new();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for i in 0..20 {
                        let raw = format!("${{value{}}}", i % 5);
                        let parsed = cache.get_or_parse(&raw).unwrap();
                        assert_eq!(parsed.raw, raw);
                    }
                });
            }
        });
        assert_eq!(cache.len(), 5);
    }
}
