//! The XPath code generator.
//!
//! Walks the selector AST and emits an equivalent
//! [XPath 1.0](https://www.w3.org/TR/xpath-10/) location path. Dispatch is
//! an exhaustive `match` over the node kinds, so a new AST variant fails to
//! compile rather than falling through at runtime. Output is deterministic
//! and pure: it depends only on the AST and the configuration.

use lorikeet_css::selector::{
    AnPlusB, AttributeOperator, CombinatorKind, Condition, NamespacePrefix, PseudoArgument,
    Selector, SelectorList,
};

use crate::config::{Builtins, Doctype, VisitorConfig};
use crate::error::Error;

/// Which sibling sequence an `nth-*` pseudo-class counts through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NthPosition {
    /// `:nth-child()` — all element siblings, front to back.
    Child,
    /// `:nth-last-child()` — all element siblings, back to front.
    LastChild,
    /// `:nth-of-type()` — siblings of the same type, front to back.
    OfType,
    /// `:nth-last-of-type()` — siblings of the same type, back to front.
    LastOfType,
}

impl NthPosition {
    /// The XPath expression for the 1-based position within the counted
    /// sequence.
    ///
    /// The `*-child` variants count siblings explicitly so the predicate is
    /// independent of the node-set the step selected; the `*-of-type`
    /// variants rely on `position()`, which inside a named step already
    /// ranges over same-named siblings.
    const fn expr(self) -> &'static str {
        match self {
            Self::Child => "(count(preceding-sibling::*) + 1)",
            Self::LastChild => "(count(following-sibling::*) + 1)",
            Self::OfType => "position()",
            Self::LastOfType => "(last() - position() + 1)",
        }
    }
}

/// The AST-to-XPath visitor, parameterized by an explicit configuration.
#[derive(Debug, Clone)]
pub struct XPathVisitor {
    config: VisitorConfig,
}

impl XPathVisitor {
    /// Create a visitor with the given configuration.
    #[must_use]
    pub const fn new(config: VisitorConfig) -> Self {
        Self { config }
    }

    /// The configuration this visitor compiles with.
    #[must_use]
    pub const fn config(&self) -> &VisitorConfig {
        &self.config
    }

    /// Compile a selector list: one XPath string per comma-separated
    /// alternative, in source order, each with the configured prefix.
    ///
    /// # Errors
    ///
    /// Fails on an unknown pseudo-class, a pseudo-element, a gated
    /// convenience pseudo-class under strict builtins, or an unresolvable
    /// namespace prefix. There is no partial success: the first failing
    /// alternative fails the whole list.
    pub fn visit_list(&self, list: &SelectorList) -> Result<Vec<String>, Error> {
        list.items.iter().map(|item| self.visit(item)).collect()
    }

    /// Compile a single selector tree into a prefixed XPath string.
    ///
    /// # Errors
    ///
    /// See [`XPathVisitor::visit_list`].
    pub fn visit(&self, selector: &Selector) -> Result<String, Error> {
        Ok(format!("{}{}", self.config.prefix, self.path(selector)?))
    }

    /// The location path of a selector, without the prefix.
    fn path(&self, selector: &Selector) -> Result<String, Error> {
        match selector {
            Selector::Element { namespace, name } => self.element_test(namespace, name),

            Selector::Universal { namespace } => self.universal_test(namespace),

            Selector::Conditional { base, conditions } => {
                let base = self.path(base)?;
                let conditions = conditions
                    .iter()
                    .map(|c| self.condition(c))
                    .collect::<Result<Vec<_>, _>>()?
                    .join(" and ");
                Ok(format!("{base}[{conditions}]"))
            }

            // Path composition: descendant -> `//`, child -> `/`,
            // next-sibling -> `/following-sibling::*[1]/self::`,
            // subsequent-sibling -> `/following-sibling::`.
            Selector::Combinator { kind, left, right } => Ok(format!(
                "{}{}{}",
                self.path(left)?,
                combinator_separator(*kind),
                self.path(right)?
            )),
        }
    }

    /// The node test for a type selector, with namespace resolution and
    /// doctype case folding applied.
    fn element_test(&self, namespace: &NamespacePrefix, name: &str) -> Result<String, Error> {
        // HTML tree builders fold element names to lowercase.
        let name = match self.config.doctype {
            Doctype::Xml => name.to_string(),
            Doctype::Html4 | Doctype::Html5 => name.to_ascii_lowercase(),
        };
        match namespace {
            NamespacePrefix::Unspecified | NamespacePrefix::NoNamespace => Ok(name),
            NamespacePrefix::Any => Ok(format!("*[local-name() = '{name}']")),
            NamespacePrefix::Prefix(prefix) => {
                self.resolve_namespace(prefix)?;
                Ok(format!("{prefix}:{name}"))
            }
        }
    }

    /// The node test for the universal selector.
    fn universal_test(&self, namespace: &NamespacePrefix) -> Result<String, Error> {
        match namespace {
            NamespacePrefix::Unspecified | NamespacePrefix::NoNamespace | NamespacePrefix::Any => {
                Ok("*".to_string())
            }
            NamespacePrefix::Prefix(prefix) => {
                self.resolve_namespace(prefix)?;
                Ok(format!("{prefix}:*"))
            }
        }
    }

    /// An unresolvable prefix is a compile-time error, never a silent
    /// wildcard.
    fn resolve_namespace(&self, prefix: &str) -> Result<(), Error> {
        if self.config.namespaces.contains_key(prefix) {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "undeclared namespace prefix '{prefix}'"
            )))
        }
    }

    /// One condition of a conditional selector, as a predicate expression.
    fn condition(&self, condition: &Condition) -> Result<String, Error> {
        match condition {
            Condition::Id(id) => Ok(format!("@id = {}", xpath_string(id))),

            // Word-boundary-safe class match: the attribute and the class
            // name are both padded with spaces, so `.red` cannot match
            // class="notred".
            Condition::Class(class) => Ok(format!(
                "contains(concat(' ', @class, ' '),concat(' ', {}, ' '))",
                xpath_string(class)
            )),

            Condition::Attribute {
                namespace,
                name,
                op,
                value,
            } => self.attribute_condition(namespace, name, *op, value.as_deref()),

            Condition::PseudoClass { name, argument } => {
                self.pseudo_class(name, argument.as_ref())
            }

            // Pseudo-elements select non-element fragments; there is
            // nothing to translate them to in a location path.
            Condition::PseudoElement { name } => Err(Error::Unsupported(format!(
                "pseudo-element '::{name}' has no XPath counterpart"
            ))),
        }
    }

    /// An attribute condition, as a predicate expression.
    fn attribute_condition(
        &self,
        namespace: &NamespacePrefix,
        name: &str,
        op: AttributeOperator,
        value: Option<&str>,
    ) -> Result<String, Error> {
        let attr = self.attribute_ref(namespace, name)?;

        if op == AttributeOperator::Exists {
            return Ok(attr);
        }
        let Some(value) = value else {
            return Err(Error::Unsupported(format!(
                "attribute operator '{op}' requires a value"
            )));
        };
        let value = xpath_string(value);

        Ok(match op {
            AttributeOperator::Exists => unreachable!("handled above"),
            AttributeOperator::Equals => format!("{attr} = {value}"),
            AttributeOperator::NotEquals => format!("{attr} != {value}"),
            // Same word-boundary expansion as the class condition.
            AttributeOperator::Includes => format!(
                "contains(concat(' ', {attr}, ' '),concat(' ', {value}, ' '))"
            ),
            // Exact match, or the value followed by a hyphen (`lang|=en`
            // matches `en` and `en-US`).
            AttributeOperator::DashMatch => {
                format!("{attr} = {value} or starts-with({attr}, concat({value}, '-'))")
            }
            AttributeOperator::Prefix => format!("starts-with({attr}, {value})"),
            // XPath 1.0 has no ends-with(); compare the tail substring.
            AttributeOperator::Suffix => format!(
                "substring({attr}, string-length({attr}) - string-length({value}) + 1) = {value}"
            ),
            AttributeOperator::Substring => format!("contains({attr}, {value})"),
        })
    }

    /// The attribute reference for a (possibly qualified) attribute name.
    fn attribute_ref(&self, namespace: &NamespacePrefix, name: &str) -> Result<String, Error> {
        // HTML5 tree builders fold attribute names too; HTML4 ones do not.
        let name = match self.config.doctype {
            Doctype::Xml | Doctype::Html4 => name.to_string(),
            Doctype::Html5 => name.to_ascii_lowercase(),
        };
        match namespace {
            NamespacePrefix::Unspecified | NamespacePrefix::NoNamespace => Ok(format!("@{name}")),
            NamespacePrefix::Any => Ok(format!("@*[local-name() = '{name}']")),
            NamespacePrefix::Prefix(prefix) => {
                self.resolve_namespace(prefix)?;
                Ok(format!("@{prefix}:{name}"))
            }
        }
    }

    /// A pseudo-class condition, as a predicate expression.
    ///
    /// Structural pseudo-classes are always available. The convenience
    /// extensions (`:contains`, `:first`, `:last`, `:eq()`, `:has()`) are
    /// gated on [`Builtins::Always`]; under [`Builtins::Strict`] they are
    /// rejected as unknown pseudo-classes.
    fn pseudo_class(
        &self,
        name: &str,
        argument: Option<&PseudoArgument>,
    ) -> Result<String, Error> {
        let always = self.config.builtins == Builtins::Always;

        match (name, argument) {
            // Structural pseudo-classes map to position and child-count
            // predicates.
            ("first-child", None) => Ok("count(preceding-sibling::*) = 0".to_string()),
            ("last-child", None) => Ok("count(following-sibling::*) = 0".to_string()),
            ("only-child", None) => {
                Ok("count(preceding-sibling::*) = 0 and count(following-sibling::*) = 0"
                    .to_string())
            }
            ("first-of-type", None) => Ok("position() = 1".to_string()),
            ("last-of-type", None) => Ok("position() = last()".to_string()),
            ("only-of-type", None) => Ok("last() = 1".to_string()),
            ("empty", None) => Ok("not(node())".to_string()),
            ("parent", None) => Ok("node()".to_string()),
            ("root", None) => Ok("not(parent::*)".to_string()),

            ("nth-child", Some(PseudoArgument::AnPlusB(anb))) => {
                Ok(nth(*anb, NthPosition::Child))
            }
            ("nth-last-child", Some(PseudoArgument::AnPlusB(anb))) => {
                Ok(nth(*anb, NthPosition::LastChild))
            }
            ("nth-of-type", Some(PseudoArgument::AnPlusB(anb))) => {
                Ok(nth(*anb, NthPosition::OfType))
            }
            ("nth-last-of-type", Some(PseudoArgument::AnPlusB(anb))) => {
                Ok(nth(*anb, NthPosition::LastOfType))
            }

            // The negation pseudo-class wraps the condition form of its
            // argument.
            ("not", Some(PseudoArgument::Selector(inner))) => {
                Ok(format!("not({})", self.negated(inner)?))
            }

            // Convenience extensions, gated on builtins.
            ("contains", Some(PseudoArgument::String(text))) if always => {
                Ok(format!("contains(., {})", xpath_string(text)))
            }
            ("first", None) if always => Ok("position() = 1".to_string()),
            ("last", None) if always => Ok("position() = last()".to_string()),
            ("eq", Some(PseudoArgument::Integer(index))) if always => {
                Ok(format!("position() = {index}"))
            }
            ("has", Some(PseudoArgument::Relative { combinator, selector })) if always => {
                self.relative_path(*combinator, selector)
            }

            ("contains" | "first" | "last" | "eq" | "has", _) => Err(Error::Unsupported(
                format!("unknown pseudo-class ':{name}' (enabled only with Builtins::Always)"),
            )),

            (
                "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" | "not",
                _,
            ) => Err(Error::Unsupported(format!(
                "':{name}' requires an argument"
            ))),

            _ => Err(Error::Unsupported(format!("unknown pseudo-class ':{name}'"))),
        }
    }

    /// The condition form of a `:not()` argument: a combinator-free
    /// selector rendered as a predicate expression on the current node.
    fn negated(&self, inner: &Selector) -> Result<String, Error> {
        match inner {
            Selector::Element { .. } | Selector::Universal { .. } => {
                Ok(format!("self::{}", self.path(inner)?))
            }
            Selector::Conditional { base, conditions } => {
                let mut parts = Vec::new();
                // An implied universal base adds no constraint.
                if !matches!(
                    **base,
                    Selector::Universal {
                        namespace: NamespacePrefix::Unspecified
                    }
                ) {
                    parts.push(format!("self::{}", self.path(base)?));
                }
                for condition in conditions {
                    parts.push(self.condition(condition)?);
                }
                Ok(parts.join(" and "))
            }
            Selector::Combinator { .. } => Err(Error::Unsupported(
                "':not()' argument cannot contain combinators".to_string(),
            )),
        }
    }

    /// The relative path of a `:has()` argument, anchored at the current
    /// node.
    fn relative_path(
        &self,
        combinator: CombinatorKind,
        selector: &Selector,
    ) -> Result<String, Error> {
        let inner = self.path(selector)?;
        Ok(match combinator {
            CombinatorKind::Descendant => format!(".//{inner}"),
            CombinatorKind::Child => format!("./{inner}"),
            CombinatorKind::NextSibling => {
                format!("./following-sibling::*[1]/self::{inner}")
            }
            CombinatorKind::SubsequentSibling => format!("./following-sibling::{inner}"),
        })
    }
}

/// The path separator of a combinator.
const fn combinator_separator(kind: CombinatorKind) -> &'static str {
    match kind {
        CombinatorKind::Descendant => "//",
        CombinatorKind::Child => "/",
        CombinatorKind::NextSibling => "/following-sibling::*[1]/self::",
        CombinatorKind::SubsequentSibling => "/following-sibling::",
    }
}

/// The `position()` arithmetic of an `nth-*` pseudo-class.
///
/// For coefficients (a, b) the matched 1-based positions are `a*n + b` for
/// integer `n >= 0`:
/// - a = 0 collapses to an equality test (or `false()` when b can never be
///   a valid position);
/// - a < 0 bounds the positions from above (`P <= b`), never producing
///   infinite-range logic;
/// - otherwise the position is checked against the residue of b modulo |a|.
fn nth(anb: AnPlusB, position: NthPosition) -> String {
    let AnPlusB { a, b } = anb;
    let p = position.expr();

    // No n >= 0 makes a*n + b a valid (>= 1) position.
    if a <= 0 && b <= 0 {
        return "false()".to_string();
    }
    if a == 0 {
        return format!("{p} = {b}");
    }

    let comparison = if a < 0 { "<=" } else { ">=" };
    if a.abs() == 1 {
        // Every position on the bounded side matches.
        format!("{p} {comparison} {b}")
    } else if b == 0 {
        // Multiples of a (only reachable with a > 0).
        format!("({p} mod {a}) = 0")
    } else {
        format!(
            "({p} {comparison} {b}) and ((({p} - {b}) mod {}) = 0)",
            a.abs()
        )
    }
}

/// Quote a value as an XPath 1.0 string literal.
///
/// XPath 1.0 strings have no escape mechanism, so a value containing one
/// quote kind is wrapped in the other, and a value containing both is
/// assembled with `concat()`.
fn xpath_string(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let mut parts = Vec::new();
    for (i, piece) in value.split('\'').enumerate() {
        if i > 0 {
            parts.push("\"'\"".to_string());
        }
        if !piece.is_empty() {
            parts.push(format!("'{piece}'"));
        }
    }
    format!("concat({})", parts.join(", "))
}
