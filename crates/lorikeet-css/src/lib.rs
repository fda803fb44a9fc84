//! CSS selector front end for the lorikeet compiler.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selector Tokenizer** ([CSS Syntax § 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - The consume-a-token algorithm restricted to selector-relevant tokens
//!   - Escape sequences and comment handling
//!   - Per-token source offsets for diagnostics
//!
//! - **An+B Micro-parser** ([CSS Syntax § 6](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax))
//!   - `odd`/`even`, bare integers, and every `An+B` spelling with its
//!     whitespace and sign rules
//!
//! - **Selector Parser** ([Selectors Level 3](https://www.w3.org/TR/selectors-3/))
//!   - Type, universal, class, ID, and attribute selectors with namespaces
//!   - Pseudo-classes (structural, negation, functional) and pseudo-elements
//!   - Complex selectors with left-associative combinators
//!   - Deprecated `/` and `//` combinator spellings (with a warning)
//!
//! - **Selector AST**
//!   - Immutable tree-shaped nodes, plus specificity calculation
//!
//! The XPath code generator that consumes this AST lives in the
//! `lorikeet-xpath` crate.

/// Error types for scanning and parsing.
pub mod error;
/// Selector parser and An+B micro-parser.
pub mod parser;
/// Selector abstract syntax tree per [Selectors Level 3](https://www.w3.org/TR/selectors-3/).
pub mod selector;
/// Selector tokenizer per [CSS Syntax § 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;

// Re-exports for convenience
pub use error::{CssError, LexError, SyntaxError};
pub use parser::{Parser, parse_an_plus_b};
pub use selector::{
    AnPlusB, AttributeOperator, CombinatorKind, Condition, NamespacePrefix, PseudoArgument,
    Selector, SelectorList, Specificity,
};
pub use tokenizer::{Token, TokenKind, Tokenizer, tokenize};

/// Parse a selector string into a [`SelectorList`].
///
/// Runs the tokenizer and the parser in sequence.
///
/// # Errors
///
/// Returns [`CssError::Lex`] when the input cannot be tokenized and
/// [`CssError::Syntax`] when the token stream does not match the selector
/// grammar (including the empty selector).
pub fn parse(input: &str) -> Result<SelectorList, CssError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    Ok(parser.parse()?)
}
