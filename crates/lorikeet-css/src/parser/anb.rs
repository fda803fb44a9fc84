//! [CSS Syntax § 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
//!
//! "The An+B notation... is a micro-syntax for a set of integers with a
//! common difference, used by the `:nth-child()` family of pseudo-classes."
//!
//! The grammar is defined over the tokens that CSS tokenization naturally
//! produces: `2n` is a dimension with unit `n`, `2n-3` is a dimension with
//! unit `n-3`, `+1` is a signed number, `-n-3` is a single ident. Whitespace
//! placement is load-bearing: `+ n` is invalid ("no whitespace can occur
//! between the + and the n"), `42n 33` is invalid (a trailing integer must
//! be signed or introduced by a sign delim), while `42n -33` and `2n + 1`
//! are valid.

use crate::error::SyntaxError;
use crate::selector::AnPlusB;
use crate::tokenizer::{NumericType, Token, TokenKind};

/// Parse the An+B argument of an `nth-*` pseudo-class.
///
/// `tokens` is the argument sub-stream between the parentheses, with
/// whitespace tokens preserved (adjacency of two tokens is expressed by the
/// absence of a whitespace token between them).
///
/// # Errors
///
/// Returns a [`SyntaxError`] on any token sequence outside the An+B
/// grammar, including trailing tokens after a complete form.
pub fn parse_an_plus_b(tokens: &[Token]) -> Result<AnPlusB, SyntaxError> {
    let mut cursor = Cursor { tokens, index: 0 };
    let _ = cursor.skip_whitespace();
    let anb = cursor.parse()?;
    let _ = cursor.skip_whitespace();
    if let Some(extra) = cursor.peek() {
        return Err(SyntaxError::unexpected(
            "invalid An+B argument: trailing input",
            extra,
            None,
        ));
    }
    Ok(anb)
}

/// What follows the `n` inside an ident or dimension unit.
enum NSuffix {
    /// `n` — a signed-integer B may follow.
    Bare,
    /// `n-` — a signless integer B must follow (negated).
    Dash,
    /// `n-<digits>` — B is complete (negative).
    Digits(i64),
}

/// Classify the `n...` portion of an ident or dimension unit,
/// case-insensitively. Returns `None` when it is not an An+B form
/// (e.g. the unit `n33` or `px`).
fn classify_n_suffix(s: &str) -> Option<NSuffix> {
    let mut chars = s.chars();
    if !matches!(chars.next(), Some('n' | 'N')) {
        return None;
    }
    let rest = chars.as_str();
    if rest.is_empty() {
        return Some(NSuffix::Bare);
    }
    if rest == "-" {
        return Some(NSuffix::Dash);
    }
    // "<ndashdigit-dimension>... whose unit is an ASCII case-insensitive
    // match for 'n-*', where '*' is a series of one or more digits"
    let digits = rest.strip_prefix('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok().map(|d| NSuffix::Digits(-d))
}

struct Cursor<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(|t| t.kind.is_whitespace()) {
            self.index += 1;
            skipped = true;
        }
        skipped
    }

    fn parse(&mut self) -> Result<AnPlusB, SyntaxError> {
        let Some(token) = self.next() else {
            return Err(SyntaxError::new("missing An+B argument", 0));
        };
        let position = token.position;

        match &token.kind {
            // "odd matches elements... equivalent to 2n+1"
            TokenKind::Ident(s) if s.eq_ignore_ascii_case("odd") => Ok(AnPlusB::odd()),
            // "even... equivalent to 2n"
            TokenKind::Ident(s) if s.eq_ignore_ascii_case("even") => Ok(AnPlusB::even()),

            // `n`, `-n`, `n-`, `-n-`, `n-3`, `-n-3`
            TokenKind::Ident(s) => {
                let (a, n_part) = s
                    .strip_prefix('-')
                    .map_or((1, s.as_str()), |rest| (-1, rest));
                self.n_form(a, n_part, position)
            }

            // "when a plus sign (+) precedes an ident starting with 'n'...
            // no whitespace can occur between the + and the n"
            TokenKind::Delim('+') => {
                let next_is_ident = matches!(
                    self.peek().map(|t| &t.kind),
                    Some(TokenKind::Ident(s)) if !s.starts_with('-')
                );
                if !next_is_ident {
                    return Err(SyntaxError::new(
                        "invalid An+B argument: '+' must be immediately followed by 'n'",
                        position,
                    ));
                }
                match self.next().map(|t| t.kind) {
                    Some(TokenKind::Ident(s)) => self.n_form(1, &s, position),
                    _ => Err(SyntaxError::new("invalid An+B argument", position)),
                }
            }

            // "<integer>" — B alone, A is zero
            TokenKind::Number {
                int_value: Some(b),
                numeric_type: NumericType::Integer,
                ..
            } => Ok(AnPlusB::new(0, *b)),

            TokenKind::Number { .. } => Err(SyntaxError::new(
                "invalid An+B argument: expected an integer",
                position,
            )),

            // "<n-dimension>" family: `2n`, `2n-`, `2n-3`
            TokenKind::Dimension {
                int_value: Some(a),
                numeric_type: NumericType::Integer,
                unit,
                ..
            } => {
                let unit = unit.clone();
                let a = *a;
                self.n_form(a, &unit, position)
            }

            TokenKind::Dimension { .. } => Err(SyntaxError::new(
                "invalid An+B argument: A must be an integer",
                position,
            )),

            _ => Err(SyntaxError::unexpected(
                "invalid An+B argument",
                &token,
                None,
            )),
        }
    }

    /// Parse the remainder of an An+B form whose A coefficient and `n...`
    /// text are known: `n_part` is an ident body or dimension unit starting
    /// at the `n`.
    fn n_form(&mut self, a: i64, n_part: &str, position: usize) -> Result<AnPlusB, SyntaxError> {
        match classify_n_suffix(n_part) {
            Some(NSuffix::Bare) => self.signed_tail(a),
            Some(NSuffix::Dash) => self.signless_tail(a),
            Some(NSuffix::Digits(b)) => Ok(AnPlusB::new(a, b)),
            None => Err(SyntaxError::new(
                format!("invalid An+B argument: '{n_part}' is not an An+B form"),
                position,
            )),
        }
    }

    /// After a bare `n` form: B is optional, and when present it is either a
    /// `<signed-integer>` ("42n -33") or a sign delim followed by a
    /// `<signless-integer>` ("2n + 1"). A signless integer with no sign at
    /// all ("42n 33") is invalid.
    fn signed_tail(&mut self, a: i64) -> Result<AnPlusB, SyntaxError> {
        let _ = self.skip_whitespace();
        let Some(token) = self.peek() else {
            return Ok(AnPlusB::new(a, 0));
        };

        match &token.kind {
            TokenKind::Number {
                int_value: Some(b),
                numeric_type: NumericType::Integer,
                signed: true,
                ..
            } => {
                let b = *b;
                let _ = self.next();
                Ok(AnPlusB::new(a, b))
            }

            TokenKind::Number { signed: false, .. } => Err(SyntaxError::unexpected(
                "invalid An+B argument: B must carry an explicit sign",
                token,
                None,
            )),

            TokenKind::Delim(sign @ ('+' | '-')) => {
                let negative = *sign == '-';
                let _ = self.next();
                let _ = self.skip_whitespace();
                let b = self.expect_signless_integer()?;
                Ok(AnPlusB::new(a, if negative { -b } else { b }))
            }

            _ => Err(SyntaxError::unexpected(
                "invalid An+B argument",
                token,
                None,
            )),
        }
    }

    /// After an `n-` form: a `<signless-integer>` must follow, and B is its
    /// negation ("n- 33" means B = -33).
    fn signless_tail(&mut self, a: i64) -> Result<AnPlusB, SyntaxError> {
        let _ = self.skip_whitespace();
        let b = self.expect_signless_integer()?;
        Ok(AnPlusB::new(a, -b))
    }

    fn expect_signless_integer(&mut self) -> Result<i64, SyntaxError> {
        let Some(token) = self.peek() else {
            return Err(SyntaxError::new(
                "invalid An+B argument: expected an integer",
                self.tokens.last().map_or(0, |t| t.position),
            ));
        };
        match &token.kind {
            TokenKind::Number {
                int_value: Some(b),
                numeric_type: NumericType::Integer,
                signed: false,
                ..
            } => {
                let b = *b;
                let _ = self.next();
                Ok(b)
            }
            _ => Err(SyntaxError::unexpected(
                "invalid An+B argument: expected a signless integer",
                token,
                None,
            )),
        }
    }
}
