//! Error types for selector scanning and parsing.
//!
//! Both errors are fatal to the compile that raised them; there is no
//! recovery mode. A selector list either parses completely or the whole
//! call fails.

use thiserror::Error;

use crate::tokenizer::Token;

/// An invalid character or token sequence encountered while scanning.
///
/// Raised for the conditions CSS Syntax Level 3 calls parse errors during
/// tokenization (bad strings, bad escapes) and for disallowed code points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid CSS at position {position}: {message}")]
pub struct LexError {
    /// Human-readable description of the lexical error.
    pub message: String,
    /// 0-based code point offset where the error occurred.
    pub position: usize,
}

impl LexError {
    /// Create a new lexical error at the given offset.
    #[must_use]
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// A token stream that does not match the selector grammar.
///
/// Carries the offending token and the last successfully consumed token so
/// callers can report where a selector went wrong, e.g.
/// `unexpected <delim:!> after <ident:div>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    /// Full human-readable message, including token context.
    pub message: String,
    /// 0-based code point offset of the offending token.
    pub position: usize,
    /// Display form of the offending token, when there is one.
    pub found: Option<String>,
    /// Display form of the last successfully consumed token, when there is one.
    pub after: Option<String>,
}

impl SyntaxError {
    /// Create a syntax error with no token context (e.g. an empty selector).
    #[must_use]
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
            found: None,
            after: None,
        }
    }

    /// Create a syntax error pointing at an offending token, with the last
    /// successfully consumed token as context.
    #[must_use]
    pub fn unexpected(message: &str, found: &Token, after: Option<&Token>) -> Self {
        let found_text = found.kind.to_string();
        let after_text = after.map(|t| t.kind.to_string());
        let message = after_text.as_ref().map_or_else(
            || format!("{message}: unexpected {found_text} at position {}", found.position),
            |prev| {
                format!(
                    "{message}: unexpected {found_text} after {prev} at position {}",
                    found.position
                )
            },
        );
        Self {
            message,
            position: found.position,
            found: Some(found_text),
            after: after_text,
        }
    }
}

/// Any error raised by the selector front end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CssError {
    /// The input could not be tokenized.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// The token stream does not match the selector grammar.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}
