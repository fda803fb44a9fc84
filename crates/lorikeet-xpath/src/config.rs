//! Visitor configuration and per-call options.
//!
//! The same selector compiles to different XPath under different
//! configurations, so the full [`VisitorConfig`] participates in cache
//! keys (it derives `Hash`/`Eq`, and its namespace map is a `BTreeMap` so
//! equality and hashing are order-independent and deterministic).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Error;

/// Whether non-standard convenience pseudo-classes are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum Builtins {
    /// CSS3 pseudo-classes only; `:contains`, `:first`, `:last`, `:eq()`
    /// and `:has()` are rejected as unknown pseudo-classes.
    #[default]
    Strict,
    /// Convenience pseudo-classes are always available.
    Always,
}

/// The document dialect the compiled XPath will be evaluated against.
///
/// HTML parsers case-fold names while XML preserves them, so the compiled
/// path must match what the tree actually stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum Doctype {
    /// Case-sensitive element and attribute names.
    #[default]
    Xml,
    /// Element names are lowercased.
    Html4,
    /// Element and attribute names are lowercased.
    Html5,
}

/// The explicit configuration record of the XPath visitor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VisitorConfig {
    /// Path prefix applied to every compiled selector (default `//`).
    pub prefix: String,
    /// Namespace prefix to URI bindings for `ns|name` qualifiers.
    pub namespaces: BTreeMap<String, String>,
    /// Convenience pseudo-class gating.
    pub builtins: Builtins,
    /// Target document dialect.
    pub doctype: Doctype,
}

impl Default for VisitorConfig {
    fn default() -> Self {
        Self {
            prefix: "//".to_string(),
            namespaces: BTreeMap::new(),
            builtins: Builtins::default(),
            doctype: Doctype::default(),
        }
    }
}

impl VisitorConfig {
    /// Create the default configuration (`//` prefix, no namespaces,
    /// strict builtins, XML doctype).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Per-call options of [`xpath_for`](crate::xpath_for).
///
/// `prefix` and `namespaces` are conveniences that fill in a default
/// [`VisitorConfig`]; alternatively a pre-built `visitor` configuration can
/// be supplied. Supplying both is a configuration error.
#[derive(Debug, Clone)]
pub struct Options {
    /// Override the path prefix (mutually exclusive with `visitor`).
    pub prefix: Option<String>,
    /// Namespace bindings (mutually exclusive with `visitor`).
    pub namespaces: Option<BTreeMap<String, String>>,
    /// A pre-built visitor configuration.
    pub visitor: Option<VisitorConfig>,
    /// Whether to consult and populate the selector cache (default true).
    pub cache: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            prefix: None,
            namespaces: None,
            visitor: None,
            cache: true,
        }
    }
}

impl Options {
    /// Resolve these options into the visitor configuration to compile
    /// with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when a pre-built `visitor` is
    /// combined with `prefix` or `namespaces`.
    pub fn visitor_config(&self) -> Result<VisitorConfig, Error> {
        if let Some(visitor) = &self.visitor {
            if self.prefix.is_some() || self.namespaces.is_some() {
                return Err(Error::Configuration(
                    "'visitor' cannot be combined with 'prefix' or 'namespaces'".to_string(),
                ));
            }
            return Ok(visitor.clone());
        }

        let mut config = VisitorConfig::default();
        if let Some(prefix) = &self.prefix {
            config.prefix.clone_from(prefix);
        }
        if let Some(namespaces) = &self.namespaces {
            config.namespaces.clone_from(namespaces);
        }
        Ok(config)
    }
}
