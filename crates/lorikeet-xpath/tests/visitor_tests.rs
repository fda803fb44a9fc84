//! Integration tests for the XPath visitor's translation rules.
//!
//! These strings are observable contracts: consumers embed them in query
//! engines, so the exact spelling matters, not just the semantics.

use std::collections::BTreeMap;

use lorikeet_css::parse;
use lorikeet_xpath::{Builtins, Doctype, Error, VisitorConfig, XPathVisitor};

/// Compile a single selector with the given configuration.
fn compile_with(input: &str, config: VisitorConfig) -> Result<String, Error> {
    let list = parse(input)?;
    let mut paths = XPathVisitor::new(config).visit_list(&list)?;
    assert_eq!(paths.len(), 1, "'{input}' should be a single selector");
    Ok(paths.remove(0))
}

/// Compile with the default configuration, panicking on errors.
fn compile(input: &str) -> String {
    compile_with(input, VisitorConfig::default())
        .unwrap_or_else(|e| panic!("'{input}' should compile: {e}"))
}

/// Compile with convenience builtins enabled.
fn compile_builtins(input: &str) -> String {
    let config = VisitorConfig {
        builtins: Builtins::Always,
        ..VisitorConfig::default()
    };
    compile_with(input, config).unwrap_or_else(|e| panic!("'{input}' should compile: {e}"))
}

// Elements and compounds

#[test]
fn test_element() {
    assert_eq!(compile("foo"), "//foo");
}

#[test]
fn test_universal() {
    assert_eq!(compile("*"), "//*");
}

#[test]
fn test_class_condition_is_word_boundary_safe() {
    assert_eq!(
        compile(".red"),
        "//*[contains(concat(' ', @class, ' '),concat(' ', 'red', ' '))]"
    );
}

#[test]
fn test_id_condition() {
    assert_eq!(compile("#foo"), "//*[@id = 'foo']");
    assert_eq!(compile("div#foo"), "//div[@id = 'foo']");
}

#[test]
fn test_conditions_join_with_and() {
    assert_eq!(
        compile("div.a.b"),
        "//div[contains(concat(' ', @class, ' '),concat(' ', 'a', ' ')) \
         and contains(concat(' ', @class, ' '),concat(' ', 'b', ' '))]"
    );
}

// Combinators

#[test]
fn test_combinator_separators() {
    assert_eq!(compile("a b"), "//a//b");
    assert_eq!(compile("a > b"), "//a/b");
    assert_eq!(compile("a + b"), "//a/following-sibling::*[1]/self::b");
    assert_eq!(compile("a ~ b"), "//a/following-sibling::b");
}

#[test]
fn test_combinator_chain() {
    assert_eq!(
        compile("div > p + *"),
        "//div/p/following-sibling::*[1]/self::*"
    );
}

#[test]
fn test_deprecated_slash_combinators() {
    assert_eq!(compile("a/b"), "//a/b");
    assert_eq!(compile("a//b"), "//a//b");
}

// Attribute operators
// The |= expansion is pinned verbatim; ~= uses the same padded word
// boundary form as the class condition.

#[test]
fn test_attribute_exists() {
    assert_eq!(compile("[href]"), "//*[@href]");
}

#[test]
fn test_attribute_equals() {
    assert_eq!(compile("a[href='x']"), "//a[@href = 'x']");
}

#[test]
fn test_attribute_not_equals() {
    assert_eq!(compile("[a!=b]"), "//*[@a != 'b']");
}

#[test]
fn test_attribute_includes() {
    assert_eq!(
        compile("[a~=b]"),
        "//*[contains(concat(' ', @a, ' '),concat(' ', 'b', ' '))]"
    );
}

#[test]
fn test_attribute_dash_match() {
    assert_eq!(
        compile("a[id|='Boing']"),
        "//a[@id = 'Boing' or starts-with(@id, concat('Boing', '-'))]"
    );
}

#[test]
fn test_attribute_prefix_suffix_substring() {
    assert_eq!(compile("[a^=b]"), "//*[starts-with(@a, 'b')]");
    assert_eq!(
        compile("[a$=b]"),
        "//*[substring(@a, string-length(@a) - string-length('b') + 1) = 'b']"
    );
    assert_eq!(compile("[a*=b]"), "//*[contains(@a, 'b')]");
}

#[test]
fn test_attribute_value_quoting() {
    // A value containing an apostrophe switches to double quotes
    assert_eq!(compile("a[title=\"it's\"]"), "//a[@title = \"it's\"]");
}

// Structural pseudo-classes

#[test]
fn test_child_position_pseudos() {
    assert_eq!(
        compile("p:first-child"),
        "//p[count(preceding-sibling::*) = 0]"
    );
    assert_eq!(
        compile("p:last-child"),
        "//p[count(following-sibling::*) = 0]"
    );
    assert_eq!(
        compile("p:only-child"),
        "//p[count(preceding-sibling::*) = 0 and count(following-sibling::*) = 0]"
    );
}

#[test]
fn test_of_type_pseudos() {
    assert_eq!(compile("p:first-of-type"), "//p[position() = 1]");
    assert_eq!(compile("p:last-of-type"), "//p[position() = last()]");
    assert_eq!(compile("p:only-of-type"), "//p[last() = 1]");
}

#[test]
fn test_structure_pseudos() {
    assert_eq!(compile("div:empty"), "//div[not(node())]");
    assert_eq!(compile("div:parent"), "//div[node()]");
    assert_eq!(compile(":root"), "//*[not(parent::*)]");
}

// The nth family

#[test]
fn test_nth_child_literal() {
    assert_eq!(
        compile("li:nth-child(2)"),
        "//li[(count(preceding-sibling::*) + 1) = 2]"
    );
}

#[test]
fn test_nth_child_odd() {
    assert_eq!(
        compile("li:nth-child(odd)"),
        "//li[((count(preceding-sibling::*) + 1) >= 1) and \
         ((((count(preceding-sibling::*) + 1) - 1) mod 2) = 0)]"
    );
}

#[test]
fn test_nth_child_even() {
    assert_eq!(
        compile("li:nth-child(even)"),
        "//li[((count(preceding-sibling::*) + 1) mod 2) = 0]"
    );
}

#[test]
fn test_nth_last_child() {
    assert_eq!(
        compile("li:nth-last-child(2)"),
        "//li[(count(following-sibling::*) + 1) = 2]"
    );
}

#[test]
fn test_nth_of_type() {
    assert_eq!(compile("p:nth-of-type(3)"), "//p[position() = 3]");
    assert_eq!(
        compile("p:nth-last-of-type(2)"),
        "//p[(last() - position() + 1) = 2]"
    );
}

#[test]
fn test_nth_negative_a_is_bounded() {
    assert_eq!(compile("p:nth-of-type(-n+3)"), "//p[position() <= 3]");
}

#[test]
fn test_nth_an_plus_b_selects_expected_positions() {
    // 4n+3 over a 14-element sibling sequence must select {3, 7, 11}.
    // The emitted predicate tests `P >= b` and `(P - b) mod |a| = 0`;
    // evaluate that arithmetic directly over the sequence.
    let selected: Vec<i64> = (1..=14)
        .filter(|p| p >= &3 && (p - 3) % 4 == 0)
        .collect();
    assert_eq!(selected, vec![3, 7, 11]);
    assert_eq!(
        compile("li:nth-of-type(4n+3)"),
        "//li[(position() >= 3) and (((position() - 3) mod 4) = 0)]"
    );

    // -n+3 must select {1, 2, 3}: a bounded inequality.
    let selected: Vec<i64> = (1..=14).filter(|p| p <= &3).collect();
    assert_eq!(selected, vec![1, 2, 3]);
    assert_eq!(compile("li:nth-of-type(-n+3)"), "//li[position() <= 3]");
}

// Negation

#[test]
fn test_not_element() {
    assert_eq!(compile("p:not(span)"), "//p[not(self::span)]");
}

#[test]
fn test_not_condition() {
    assert_eq!(
        compile("p:not(.foo)"),
        "//p[not(contains(concat(' ', @class, ' '),concat(' ', 'foo', ' ')))]"
    );
}

#[test]
fn test_not_compound() {
    assert_eq!(
        compile("p:not(span.foo)"),
        "//p[not(self::span and contains(concat(' ', @class, ' '),concat(' ', 'foo', ' ')))]"
    );
}

// Convenience builtins, gated on Builtins::Always

#[test]
fn test_builtins_always() {
    assert_eq!(compile_builtins("div:contains('x')"), "//div[contains(., 'x')]");
    assert_eq!(compile_builtins("li:first"), "//li[position() = 1]");
    assert_eq!(compile_builtins("li:last"), "//li[position() = last()]");
    assert_eq!(compile_builtins("li:eq(2)"), "//li[position() = 2]");
}

#[test]
fn test_has_relative_paths() {
    assert_eq!(compile_builtins("div:has(img)"), "//div[.//img]");
    assert_eq!(compile_builtins("div:has(> img)"), "//div[./img]");
    assert_eq!(
        compile_builtins("div:has(+ img)"),
        "//div[./following-sibling::*[1]/self::img]"
    );
    assert_eq!(
        compile_builtins("div:has(~ img)"),
        "//div[./following-sibling::img]"
    );
}

#[test]
fn test_builtins_rejected_under_strict() {
    for input in ["div:contains('x')", "li:first", "li:last", "li:eq(2)", "div:has(img)"] {
        let err = compile_with(input, VisitorConfig::default())
            .expect_err(&format!("'{input}' should be rejected under Strict"));
        assert!(
            matches!(&err, Error::Unsupported(m) if m.contains("unknown pseudo-class")),
            "'{input}': {err}"
        );
    }
}

#[test]
fn test_unknown_pseudo_class() {
    let err = compile_with("div:frobnicate", VisitorConfig::default()).expect_err("unknown");
    assert!(err.is_syntax());
    assert!(err.to_string().contains("frobnicate"));
}

#[test]
fn test_pseudo_element_rejected() {
    let err = compile_with("p::before", VisitorConfig::default()).expect_err("pseudo-element");
    assert!(err.is_syntax());
    assert!(err.to_string().contains("::before"));
}

// Namespaces

fn ns_config() -> VisitorConfig {
    let mut namespaces = BTreeMap::new();
    let _ = namespaces.insert("x".to_string(), "http://example.com/ns".to_string());
    VisitorConfig {
        namespaces,
        ..VisitorConfig::default()
    }
}

#[test]
fn test_namespace_prefix_resolves() {
    assert_eq!(compile_with("x|a", ns_config()).unwrap(), "//x:a");
    assert_eq!(compile_with("x|*", ns_config()).unwrap(), "//x:*");
    assert_eq!(
        compile_with("[x|href='v']", ns_config()).unwrap(),
        "//*[@x:href = 'v']"
    );
}

#[test]
fn test_undeclared_namespace_prefix_is_configuration_error() {
    let err = compile_with("x|a", VisitorConfig::default()).expect_err("undeclared prefix");
    assert!(err.is_configuration());
    assert!(err.to_string().contains('x'));
}

#[test]
fn test_any_namespace() {
    assert_eq!(compile("*|a"), "//*[local-name() = 'a']");
    assert_eq!(compile("|a"), "//a");
}

// Doctype case folding

#[test]
fn test_doctype_case_folding() {
    let html4 = VisitorConfig {
        doctype: Doctype::Html4,
        ..VisitorConfig::default()
    };
    let html5 = VisitorConfig {
        doctype: Doctype::Html5,
        ..VisitorConfig::default()
    };

    // XML preserves case
    assert_eq!(compile("DIV"), "//DIV");
    // HTML4 folds element names but not attribute names
    assert_eq!(compile_with("DIV", html4.clone()).unwrap(), "//div");
    assert_eq!(compile_with("[HREF]", html4).unwrap(), "//*[@HREF]");
    // HTML5 folds both
    assert_eq!(compile_with("DIV[HREF]", html5).unwrap(), "//div[@href]");
}

// Determinism

#[test]
fn test_output_is_deterministic() {
    let first = compile("div.foo > p:nth-child(2n+1)");
    for _ in 0..3 {
        assert_eq!(compile("div.foo > p:nth-child(2n+1)"), first);
    }
}
