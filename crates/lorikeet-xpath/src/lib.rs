//! XPath 1.0 back end for the lorikeet selector compiler.
//!
//! # Scope
//!
//! This crate implements:
//! - **XPath Visitor** — walks the selector AST from `lorikeet-css` and
//!   emits an equivalent [XPath 1.0](https://www.w3.org/TR/xpath-10/)
//!   location path, driven by an explicit configuration (path prefix,
//!   namespace map, builtins gating, target doctype)
//! - **Selector Cache** — memoizes (selector, configuration) to the
//!   compiled XPath strings, safe for concurrent use
//! - **`xpath_for`** — the sole entry point consumed by markup-query
//!   layers
//!
//! # Example
//!
//! ```
//! use lorikeet_xpath::{Options, xpath_for};
//!
//! let paths = xpath_for("div.note > p", &Options::default()).unwrap();
//! assert_eq!(
//!     paths,
//!     vec![
//!         "//div[contains(concat(' ', @class, ' '),concat(' ', 'note', ' '))]/p"
//!             .to_string()
//!     ]
//! );
//! ```

/// The selector cache.
pub mod cache;
/// Visitor configuration and per-call options.
pub mod config;
/// Error types for XPath code generation.
pub mod error;
/// The AST-to-XPath code generator.
pub mod visitor;

// Re-exports for convenience
pub use cache::SelectorCache;
pub use config::{Builtins, Doctype, Options, VisitorConfig};
pub use error::Error;
pub use visitor::XPathVisitor;

/// Compile a CSS selector into XPath 1.0 location paths, one per
/// comma-separated alternative.
///
/// This is the sole entry point of the compiler. It consults the
/// process-wide [`SelectorCache`]; pass `Options { cache: false, .. }` to
/// bypass it.
///
/// # Errors
///
/// - a syntax-kind error ([`Error::Css`] or [`Error::Unsupported`]) when
///   the selector is empty, malformed, or uses a feature with no XPath
///   counterpart;
/// - [`Error::Configuration`] when the options conflict or a namespace
///   prefix cannot be resolved.
///
/// There is no partial success: a selector list either fully compiles to N
/// strings (N = number of comma-separated alternatives) or the whole call
/// fails.
pub fn xpath_for(selector: &str, options: &Options) -> Result<Vec<String>, Error> {
    SelectorCache::global().xpath_for(selector, options)
}
