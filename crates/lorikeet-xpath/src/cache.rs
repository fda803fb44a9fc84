//! The selector cache.
//!
//! Compiling a selector is cheap but not free, and real workloads compile
//! the same handful of selectors over and over. The cache memoizes the
//! mapping (selector string, visitor configuration) to the compiled XPath
//! strings. The full configuration participates in the key: the same
//! selector compiles differently under a different prefix, namespace map,
//! builtins level, or doctype.
//!
//! Concurrency: lookups and inserts are serialized through a mutex, but
//! compilation runs outside the lock. Two threads racing on the same new
//! key may both compile; the result is deterministic and the first insert
//! wins, so the cached value is consistent either way.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use lorikeet_css::parse;

use crate::config::{Options, VisitorConfig};
use crate::error::Error;
use crate::visitor::XPathVisitor;

/// Cache key: the raw selector plus the full visitor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    selector: String,
    config: VisitorConfig,
}

/// A memoizing selector-to-XPath compiler.
///
/// Entries are created on first compile, never mutated, and removed only by
/// [`SelectorCache::clear`]. Most callers use the process-wide instance via
/// [`xpath_for`](crate::xpath_for); tests and embedders that need isolation
/// construct their own.
#[derive(Debug, Default)]
pub struct SelectorCache {
    entries: Mutex<HashMap<CacheKey, Vec<String>>>,
    compilations: AtomicUsize,
}

/// The process-wide cache instance, created at first use.
static GLOBAL: OnceLock<SelectorCache> = OnceLock::new();

impl SelectorCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache: created at first use, cleared explicitly,
    /// never implicitly reset.
    #[must_use]
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::new)
    }

    /// Compile a selector to XPath, consulting the cache.
    ///
    /// With `options.cache` set to false the cache is bypassed entirely:
    /// nothing is looked up and nothing is stored.
    ///
    /// # Errors
    ///
    /// Propagates every compile error; failed compiles are never cached.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    pub fn xpath_for(&self, selector: &str, options: &Options) -> Result<Vec<String>, Error> {
        let config = options.visitor_config()?;

        if !options.cache {
            return self.compile(selector, config);
        }

        let key = CacheKey {
            selector: selector.to_string(),
            config,
        };

        if let Some(hit) = self.entries.lock().expect("cache lock poisoned").get(&key) {
            return Ok(hit.clone());
        }

        // Compile outside the lock; a concurrent identical compile is
        // acceptable, only the cached value's consistency matters.
        let value = self.compile(selector, key.config.clone())?;

        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let cached = entries.entry(key).or_insert(value);
        Ok(cached.clone())
    }

    /// Parse and translate, unconditionally. Increments the compilation
    /// counter.
    fn compile(&self, selector: &str, config: VisitorConfig) -> Result<Vec<String>, Error> {
        let _ = self.compilations.fetch_add(1, Ordering::Relaxed);
        let list = parse(selector)?;
        XPathVisitor::new(config).visit_list(&list)
    }

    /// Drop every cached entry.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    pub fn clear(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }

    /// Number of cached entries.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many compilations this cache has performed, cache misses and
    /// bypasses included. Test instrumentation: a cache hit leaves this
    /// counter unchanged.
    #[must_use]
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }
}
