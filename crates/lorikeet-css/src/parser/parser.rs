//! CSS selector parser per [Selectors Level 3 § 4](https://www.w3.org/TR/selectors-3/#syntax).
//!
//! "The grammar of Selectors is defined in terms of CSS syntax." This is a
//! hand-written recursive-descent parser over the token stream: one function
//! per grammar production, with explicit left-associativity for combinators
//! so that `a b c` builds `((a b) c)`.

use lorikeet_common::warning::warn_once;

use crate::error::SyntaxError;
use crate::selector::{
    AttributeOperator, CombinatorKind, Condition, NamespacePrefix, PseudoArgument, Selector,
    SelectorList,
};
use crate::tokenizer::{HashType, Token, TokenKind};

use super::anb::parse_an_plus_b;

/// Selector parser.
///
/// Consumes a token vector (as produced by the tokenizer, terminated by an
/// `Eof` token) and produces a [`SelectorList`], or a [`SyntaxError`] that
/// names the offending token and the last successfully consumed token.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser from a list of tokens.
    ///
    /// The tokenizer always terminates the stream with an `Eof` token; one
    /// is appended here if the caller did not.
    #[must_use]
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.kind.is_eof()) {
            let position = tokens.last().map_or(0, |t| t.position + 1);
            tokens.push(Token::new(TokenKind::Eof, position));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    /// [§ 5 Groups of selectors](https://www.w3.org/TR/selectors-3/#grouping)
    ///
    /// `selector_list := complex_selector (',' complex_selector)*`
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] on an empty selector (distinct message) or
    /// any token sequence outside the grammar.
    pub fn parse(&mut self) -> Result<SelectorList, SyntaxError> {
        let _ = self.skip_whitespace();

        // An empty selector string is its own error, distinct from a
        // malformed one.
        if self.peek_kind().is_eof() {
            return Err(SyntaxError::new("empty CSS selector", 0));
        }

        let mut items = vec![self.complex_selector()?];
        loop {
            let _ = self.skip_whitespace();
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.bump();
                    let _ = self.skip_whitespace();
                    items.push(self.complex_selector()?);
                }
                TokenKind::Eof => break,
                _ => {
                    return Err(self.error("expected ',' or end of selector"));
                }
            }
        }

        Ok(SelectorList { items })
    }

    /// [§ 8 Combinators](https://www.w3.org/TR/selectors-3/#combinators)
    ///
    /// `complex_selector := compound_selector (combinator compound_selector)*`
    ///
    /// Whitespace is the descendant combinator when nothing stronger
    /// follows it. The non-standard `/` and `//` spellings of the child and
    /// descendant combinators are accepted for compatibility and warn once.
    fn complex_selector(&mut self) -> Result<Selector, SyntaxError> {
        let mut left = self.compound_selector()?;

        loop {
            let saw_whitespace = self.skip_whitespace();

            let kind = match self.peek_kind() {
                TokenKind::Delim('>') => {
                    self.bump();
                    CombinatorKind::Child
                }
                TokenKind::Delim('+') => {
                    self.bump();
                    CombinatorKind::NextSibling
                }
                TokenKind::Delim('~') => {
                    self.bump();
                    CombinatorKind::SubsequentSibling
                }
                TokenKind::Delim('/') => {
                    self.bump();
                    if matches!(self.peek_kind(), TokenKind::Delim('/')) {
                        self.bump();
                        warn_once(
                            "CSS",
                            "the '//' combinator is deprecated, use a descendant selector ('a b') instead",
                        );
                        CombinatorKind::Descendant
                    } else {
                        warn_once("CSS", "the '/' combinator is deprecated, use '>' instead");
                        CombinatorKind::Child
                    }
                }
                // The caller decides what a comma or `)` means.
                TokenKind::Comma | TokenKind::Eof | TokenKind::RightParen => break,
                _ if saw_whitespace && self.starts_compound() => CombinatorKind::Descendant,
                _ => {
                    return Err(self.error("expected a combinator or another selector"));
                }
            };

            let _ = self.skip_whitespace();
            let right = self.compound_selector()?;
            left = Selector::Combinator {
                kind,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// [§ 4 Selector syntax](https://www.w3.org/TR/selectors-3/#selector-syntax)
    ///
    /// "A sequence of simple selectors is a chain of simple selectors that
    /// are not separated by a combinator. It always begins with a type
    /// selector or a universal selector."
    ///
    /// The leading type/universal selector may be omitted, in which case
    /// the universal selector is implied (`.red` means `*.red`).
    fn compound_selector(&mut self) -> Result<Selector, SyntaxError> {
        let base = match self.peek_kind() {
            TokenKind::Ident(_) | TokenKind::Delim('*' | '|') => Some(self.type_or_universal()?),
            _ => None,
        };

        let mut conditions = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Hash { .. } => conditions.push(self.id_condition()?),
                TokenKind::Delim('.') => conditions.push(self.class_condition()?),
                TokenKind::LeftBracket => conditions.push(self.attribute_condition()?),
                TokenKind::Colon => conditions.push(self.pseudo_condition()?),
                _ => break,
            }
        }

        if conditions.is_empty() {
            return base.map_or_else(|| Err(self.error("expected a selector")), Ok);
        }

        let base = base.unwrap_or(Selector::Universal {
            namespace: NamespacePrefix::Unspecified,
        });
        Ok(Selector::Conditional {
            base: Box::new(base),
            conditions,
        })
    }

    /// [§ 6.1 Type selector](https://www.w3.org/TR/selectors-3/#type-selectors)
    /// [§ 6.2 Universal selector](https://www.w3.org/TR/selectors-3/#universal-selector)
    ///
    /// Parses `div`, `*`, `ns|div`, `*|div`, `|div`, `ns|*`. A namespace
    /// bar binds only when it is immediately followed by an element name or
    /// `*` (so `[a|=b]` and a stray `|` elsewhere are not captured here).
    fn type_or_universal(&mut self) -> Result<Selector, SyntaxError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.bump();
                if self.at_namespace_bar() {
                    self.bump(); // |
                    self.qualified_name_tail(NamespacePrefix::Prefix(name))
                } else {
                    Ok(Selector::Element {
                        namespace: NamespacePrefix::Unspecified,
                        name,
                    })
                }
            }
            TokenKind::Delim('*') => {
                self.bump();
                if self.at_namespace_bar() {
                    self.bump(); // |
                    self.qualified_name_tail(NamespacePrefix::Any)
                } else {
                    Ok(Selector::Universal {
                        namespace: NamespacePrefix::Unspecified,
                    })
                }
            }
            TokenKind::Delim('|') => {
                self.bump();
                self.qualified_name_tail(NamespacePrefix::NoNamespace)
            }
            _ => Err(self.error("expected an element name or '*'")),
        }
    }

    /// The element name or `*` after a namespace bar.
    fn qualified_name_tail(&mut self, namespace: NamespacePrefix) -> Result<Selector, SyntaxError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.bump();
                Ok(Selector::Element { namespace, name })
            }
            TokenKind::Delim('*') => {
                self.bump();
                Ok(Selector::Universal { namespace })
            }
            _ => Err(self.error("expected an element name or '*' after the namespace prefix")),
        }
    }

    /// [§ 6.5 ID selectors](https://www.w3.org/TR/selectors-3/#id-selectors)
    ///
    /// "An ID selector contains a 'number sign' (#) immediately followed by
    /// the ID value, which must be an identifier."
    fn id_condition(&mut self) -> Result<Condition, SyntaxError> {
        match self.peek_kind().clone() {
            TokenKind::Hash { value, hash_type } => {
                // A hash whose value is not an identifier (e.g. `#123`) is
                // not an ID selector.
                if hash_type == HashType::Unrestricted {
                    return Err(self.error("ID selector value is not an identifier"));
                }
                self.bump();
                Ok(Condition::Id(value))
            }
            _ => Err(self.error("expected an ID selector")),
        }
    }

    /// [§ 6.4 Class selectors](https://www.w3.org/TR/selectors-3/#class-html)
    ///
    /// "The class selector is given as a full stop (. U+002E) immediately
    /// followed by an identifier." No whitespace may intervene.
    fn class_condition(&mut self) -> Result<Condition, SyntaxError> {
        self.bump(); // .
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.bump();
                Ok(Condition::Class(name))
            }
            _ => Err(self.error("expected a class name after '.'")),
        }
    }

    /// [§ 6.3 Attribute selectors](https://www.w3.org/TR/selectors-3/#attribute-selectors)
    ///
    /// `attribute := '[' WS* qualified_name WS* (op value)? WS* ']'`
    ///
    /// The non-standard `!=` operator is accepted alongside the six
    /// standard operators.
    fn attribute_condition(&mut self) -> Result<Condition, SyntaxError> {
        self.bump(); // [
        let _ = self.skip_whitespace();

        // Attribute name, with optional namespace qualifier.
        let (namespace, name) = match self.peek_kind().clone() {
            TokenKind::Delim('|') => {
                self.bump();
                (NamespacePrefix::NoNamespace, self.attribute_name()?)
            }
            TokenKind::Delim('*') => {
                self.bump();
                if !matches!(self.peek_kind(), TokenKind::Delim('|')) {
                    return Err(self.error("expected '|' after '*' in an attribute name"));
                }
                self.bump();
                (NamespacePrefix::Any, self.attribute_name()?)
            }
            TokenKind::Ident(first) => {
                self.bump();
                if self.at_namespace_bar() {
                    self.bump(); // |
                    (NamespacePrefix::Prefix(first), self.attribute_name()?)
                } else {
                    (NamespacePrefix::Unspecified, first)
                }
            }
            _ => return Err(self.error("expected an attribute name")),
        };

        let _ = self.skip_whitespace();

        // Operator and value, or a bare presence test.
        let (op, value) = match self.peek_kind().clone() {
            TokenKind::RightBracket => {
                self.bump();
                return Ok(Condition::Attribute {
                    namespace,
                    name,
                    op: AttributeOperator::Exists,
                    value: None,
                });
            }
            TokenKind::Delim('=') => {
                self.bump();
                (AttributeOperator::Equals, self.attribute_value()?)
            }
            TokenKind::Delim(op_char @ ('~' | '|' | '^' | '$' | '*' | '!')) => {
                let op = match op_char {
                    '~' => AttributeOperator::Includes,
                    '|' => AttributeOperator::DashMatch,
                    '^' => AttributeOperator::Prefix,
                    '$' => AttributeOperator::Suffix,
                    '*' => AttributeOperator::Substring,
                    _ => AttributeOperator::NotEquals,
                };
                self.bump();
                // The two code points of the operator must be adjacent.
                if !matches!(self.peek_kind(), TokenKind::Delim('=')) {
                    return Err(self.error("expected '=' to complete the attribute operator"));
                }
                self.bump();
                (op, self.attribute_value()?)
            }
            _ => return Err(self.error("expected an attribute operator or ']'")),
        };

        let _ = self.skip_whitespace();
        if !matches!(self.peek_kind(), TokenKind::RightBracket) {
            return Err(self.error("expected ']' to close the attribute selector"));
        }
        self.bump();

        Ok(Condition::Attribute {
            namespace,
            name,
            op,
            value: Some(value),
        })
    }

    /// The identifier after a namespace bar inside `[...]`.
    fn attribute_name(&mut self) -> Result<String, SyntaxError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.bump();
                Ok(name)
            }
            _ => Err(self.error("expected an attribute name after the namespace prefix")),
        }
    }

    /// "Attribute values must be CSS identifiers or strings."
    fn attribute_value(&mut self) -> Result<String, SyntaxError> {
        let _ = self.skip_whitespace();
        match self.peek_kind().clone() {
            TokenKind::Ident(value) | TokenKind::String(value) => {
                self.bump();
                Ok(value)
            }
            _ => Err(self.error("expected an attribute value (identifier or string)")),
        }
    }

    /// [§ 6.6 Pseudo-classes](https://www.w3.org/TR/selectors-3/#pseudo-classes)
    /// [§ 7 Pseudo-elements](https://www.w3.org/TR/selectors-3/#pseudo-elements)
    ///
    /// `pseudo := ':' ':'? IDENT | ':' FUNCTION argument* ')'`
    ///
    /// Pseudo names must be XPath-compatible names; vendor-prefixed names
    /// like `-moz-drag-over` are rejected here rather than at code
    /// generation.
    fn pseudo_condition(&mut self) -> Result<Condition, SyntaxError> {
        self.bump(); // :
        let double = matches!(self.peek_kind(), TokenKind::Colon);
        if double {
            self.bump();
        }

        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.validate_pseudo_name(&name)?;
                self.bump();
                let name = name.to_ascii_lowercase();
                if double {
                    Ok(Condition::PseudoElement { name })
                } else {
                    Ok(Condition::PseudoClass {
                        name,
                        argument: None,
                    })
                }
            }
            TokenKind::Function(name) => {
                self.validate_pseudo_name(&name)?;
                if double {
                    return Err(self.error("functional pseudo-elements are not supported"));
                }
                self.bump();
                let name = name.to_ascii_lowercase();
                let argument = self.pseudo_function_argument(&name)?;
                Ok(Condition::PseudoClass {
                    name,
                    argument: Some(argument),
                })
            }
            _ => Err(self.error("expected a pseudo-class name after ':'")),
        }
    }

    /// Pseudo names become part of the compiled XPath, so they must be
    /// XPath-compatible NCNames: a leading letter or underscore, then
    /// letters, digits, `-`, `_`.
    fn validate_pseudo_name(&self, name: &str) -> Result<(), SyntaxError> {
        let mut chars = name.chars();
        let valid = chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(())
        } else {
            Err(self.error(&format!(
                "'{name}' is not a valid pseudo-class name"
            )))
        }
    }

    /// Parse the parenthesized argument of a functional pseudo-class,
    /// consuming through the closing `)`. Each supported function has its
    /// own argument grammar; anything else is a syntax error.
    fn pseudo_function_argument(&mut self, name: &str) -> Result<PseudoArgument, SyntaxError> {
        match name {
            // The nth family takes the An+B micro-syntax. Whitespace inside
            // the argument is significant to that grammar, so the raw token
            // sub-stream is handed over unmodified.
            "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
                let args = self.argument_tokens()?;
                let anb = parse_an_plus_b(&args)?;
                Ok(PseudoArgument::AnPlusB(anb))
            }

            // [§ 6.6.7 The negation pseudo-class](https://www.w3.org/TR/selectors-3/#negation)
            // "The negation pseudo-class... takes a simple selector as an
            // argument" — no combinators.
            "not" => {
                let _ = self.skip_whitespace();
                let inner = self.compound_selector()?;
                let _ = self.skip_whitespace();
                self.expect_right_paren()?;
                Ok(PseudoArgument::Selector(Box::new(inner)))
            }

            // `:has()` takes a relative selector: an optional leading
            // combinator, then a full complex selector.
            "has" => {
                let _ = self.skip_whitespace();
                let combinator = match self.peek_kind() {
                    TokenKind::Delim('>') => {
                        self.bump();
                        CombinatorKind::Child
                    }
                    TokenKind::Delim('+') => {
                        self.bump();
                        CombinatorKind::NextSibling
                    }
                    TokenKind::Delim('~') => {
                        self.bump();
                        CombinatorKind::SubsequentSibling
                    }
                    _ => CombinatorKind::Descendant,
                };
                let _ = self.skip_whitespace();
                let inner = self.complex_selector()?;
                self.expect_right_paren()?;
                Ok(PseudoArgument::Relative {
                    combinator,
                    selector: Box::new(inner),
                })
            }

            // `:contains()` takes a string or an identifier.
            "contains" => {
                let _ = self.skip_whitespace();
                let text = match self.peek_kind().clone() {
                    TokenKind::String(s) | TokenKind::Ident(s) => {
                        self.bump();
                        s
                    }
                    _ => return Err(self.error("expected a string argument for ':contains()'")),
                };
                let _ = self.skip_whitespace();
                self.expect_right_paren()?;
                Ok(PseudoArgument::String(text))
            }

            // `:eq()` takes an integer position.
            "eq" => {
                let _ = self.skip_whitespace();
                let index = match self.peek_kind() {
                    TokenKind::Number {
                        int_value: Some(i), ..
                    } => {
                        let i = *i;
                        self.bump();
                        i
                    }
                    _ => return Err(self.error("expected an integer argument for ':eq()'")),
                };
                let _ = self.skip_whitespace();
                self.expect_right_paren()?;
                Ok(PseudoArgument::Integer(index))
            }

            _ => Err(self.error(&format!("unsupported pseudo-class function ':{name}()'"))),
        }
    }

    /// Collect the raw tokens up to (and consuming) the closing `)`.
    fn argument_tokens(&mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut args = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RightParen => {
                    self.bump();
                    return Ok(args);
                }
                TokenKind::Eof => {
                    return Err(self.error("expected ')' to close the pseudo-class argument"));
                }
                _ => {
                    args.push(self.peek().clone());
                    self.bump();
                }
            }
        }
    }

    fn expect_right_paren(&mut self) -> Result<(), SyntaxError> {
        if matches!(self.peek_kind(), TokenKind::RightParen) {
            self.bump();
            Ok(())
        } else {
            Err(self.error("expected ')' to close the pseudo-class argument"))
        }
    }

    /// Whether the current token can begin a compound selector.
    fn starts_compound(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Ident(_)
                | TokenKind::Delim('*' | '|' | '.')
                | TokenKind::Hash { .. }
                | TokenKind::LeftBracket
                | TokenKind::Colon
        )
    }

    /// Whether the current token is a namespace bar binding to a qualified
    /// name: a `|` delim immediately followed by an identifier or `*`, but
    /// not the `|=` operator or the `||` column combinator.
    fn at_namespace_bar(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Delim('|'))
            && matches!(
                self.peek_next_kind(),
                TokenKind::Ident(_) | TokenKind::Delim('*')
            )
    }

    /// Peek at the current token.
    fn peek(&self) -> &Token {
        let index = self.position.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Peek at the current token's kind.
    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Peek one token past the current one.
    fn peek_next_kind(&self) -> &TokenKind {
        let index = (self.position + 1).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    /// The last successfully consumed non-whitespace token, if any.
    fn prev(&self) -> Option<&Token> {
        self.tokens[..self.position]
            .iter()
            .rev()
            .find(|t| !t.kind.is_whitespace())
    }

    /// Advance past the current token.
    fn bump(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    /// Skip whitespace tokens; reports whether any were skipped.
    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek_kind().is_whitespace() {
            self.bump();
            skipped = true;
        }
        skipped
    }

    /// Build a syntax error at the current token, naming the last
    /// successfully consumed token for context.
    fn error(&self, message: &str) -> SyntaxError {
        SyntaxError::unexpected(message, self.peek(), self.prev())
    }
}
