//! Error types for XPath code generation.

use thiserror::Error;

use lorikeet_css::CssError;

/// Any error raised while compiling a selector to XPath.
///
/// Two kinds are surfaced to callers: syntax errors (the selector is
/// malformed or uses a feature with no XPath counterpart) and configuration
/// errors (the options themselves are wrong). [`Error::is_syntax`] and
/// [`Error::is_configuration`] classify a value accordingly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The selector could not be tokenized or parsed.
    #[error(transparent)]
    Css(#[from] CssError),

    /// The selector parsed but uses a feature with no XPath translation:
    /// an unknown pseudo-class, a pseudo-element, or a convenience
    /// pseudo-class while builtins are strict.
    #[error("cannot convert to XPath: {0}")]
    Unsupported(String),

    /// The visitor configuration is unusable: an unresolvable namespace
    /// prefix, or conflicting option combinations.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Whether this error is of the syntax kind (malformed selector or a
    /// feature that cannot be expressed in XPath).
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self, Self::Css(_) | Self::Unsupported(_))
    }

    /// Whether this error is of the configuration kind.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
