//! Integration tests for selector parsing.

use lorikeet_css::selector::{
    AnPlusB, AttributeOperator, CombinatorKind, Condition, NamespacePrefix, PseudoArgument,
    Selector, SelectorList, Specificity,
};
use lorikeet_css::{CssError, parse};

/// Parse a selector expected to be valid, returning its single item.
fn parse_one(input: &str) -> Selector {
    let list = parse(input).unwrap_or_else(|e| panic!("'{input}' should parse: {e}"));
    assert_eq!(list.items.len(), 1, "'{input}' should be a single selector");
    list.items.into_iter().next().unwrap()
}

fn parse_err(input: &str) -> CssError {
    parse(input).expect_err(&format!("'{input}' should be rejected"))
}

// Simple selectors
// [§ 6 Simple selectors](https://www.w3.org/TR/selectors-3/#simple-selectors)

#[test]
fn test_parse_type_selector() {
    let selector = parse_one("body");
    assert_eq!(
        selector,
        Selector::Element {
            namespace: NamespacePrefix::Unspecified,
            name: "body".to_string(),
        }
    );
}

#[test]
fn test_parse_universal_selector() {
    let selector = parse_one("*");
    assert!(matches!(
        selector,
        Selector::Universal {
            namespace: NamespacePrefix::Unspecified
        }
    ));
}

#[test]
fn test_parse_class_selector() {
    // ".highlight" implies the universal selector as its base
    let selector = parse_one(".highlight");
    let Selector::Conditional { base, conditions } = selector else {
        panic!("Expected Conditional");
    };
    assert!(matches!(
        *base,
        Selector::Universal {
            namespace: NamespacePrefix::Unspecified
        }
    ));
    assert_eq!(conditions, vec![Condition::Class("highlight".to_string())]);
}

#[test]
fn test_parse_id_selector() {
    let selector = parse_one("#main-content");
    let Selector::Conditional { conditions, .. } = selector else {
        panic!("Expected Conditional");
    };
    assert_eq!(conditions, vec![Condition::Id("main-content".to_string())]);
}

#[test]
fn test_parse_compound_selector() {
    let selector = parse_one("div.highlight#main");
    let Selector::Conditional { base, conditions } = selector else {
        panic!("Expected Conditional");
    };
    assert!(matches!(*base, Selector::Element { ref name, .. } if name == "div"));
    assert_eq!(conditions.len(), 2);
    assert!(matches!(&conditions[0], Condition::Class(c) if c == "highlight"));
    assert!(matches!(&conditions[1], Condition::Id(i) if i == "main"));
}

#[test]
fn test_numeric_id_rejected() {
    // "#123" is an unrestricted hash, not an identifier
    let _ = parse_err("#123");
}

// Combinators
// [§ 8 Combinators](https://www.w3.org/TR/selectors-3/#combinators)

#[test]
fn test_parse_descendant_combinator() {
    let selector = parse_one("div p");
    let Selector::Combinator { kind, left, right } = selector else {
        panic!("Expected Combinator");
    };
    assert_eq!(kind, CombinatorKind::Descendant);
    assert!(matches!(*left, Selector::Element { ref name, .. } if name == "div"));
    assert!(matches!(*right, Selector::Element { ref name, .. } if name == "p"));
}

#[test]
fn test_parse_child_combinator() {
    let selector = parse_one("ul > li");
    assert!(matches!(
        selector,
        Selector::Combinator {
            kind: CombinatorKind::Child,
            ..
        }
    ));
}

#[test]
fn test_parse_sibling_combinators() {
    assert!(matches!(
        parse_one("h1 + p"),
        Selector::Combinator {
            kind: CombinatorKind::NextSibling,
            ..
        }
    ));
    assert!(matches!(
        parse_one("h1 ~ p"),
        Selector::Combinator {
            kind: CombinatorKind::SubsequentSibling,
            ..
        }
    ));
}

#[test]
fn test_combinators_are_left_associative() {
    // "a b c" parses as ((a b) c)
    let selector = parse_one("a b c");
    let Selector::Combinator { kind, left, right } = selector else {
        panic!("Expected Combinator");
    };
    assert_eq!(kind, CombinatorKind::Descendant);
    assert!(matches!(*right, Selector::Element { ref name, .. } if name == "c"));
    let Selector::Combinator { left, right, .. } = *left else {
        panic!("Expected nested Combinator on the left");
    };
    assert!(matches!(*left, Selector::Element { ref name, .. } if name == "a"));
    assert!(matches!(*right, Selector::Element { ref name, .. } if name == "b"));
}

#[test]
fn test_combinator_without_whitespace() {
    let selector = parse_one("ul>li");
    assert!(matches!(
        selector,
        Selector::Combinator {
            kind: CombinatorKind::Child,
            ..
        }
    ));
}

#[test]
fn test_deprecated_slash_combinators() {
    // The reference system accepts XPath-flavored combinators; they map to
    // child and descendant.
    assert!(matches!(
        parse_one("a/b"),
        Selector::Combinator {
            kind: CombinatorKind::Child,
            ..
        }
    ));
    assert!(matches!(
        parse_one("a//b"),
        Selector::Combinator {
            kind: CombinatorKind::Descendant,
            ..
        }
    ));
}

#[test]
fn test_dangling_combinator_rejected() {
    let _ = parse_err("a >");
    let _ = parse_err("> a");
    let _ = parse_err("a ~");
}

// Selector lists
// [§ 5 Groups of selectors](https://www.w3.org/TR/selectors-3/#grouping)

#[test]
fn test_parse_selector_list() {
    let list = parse("h1, h2 , h3").expect("should parse");
    assert_eq!(list.items.len(), 3);
}

#[test]
fn test_trailing_comma_rejected() {
    let _ = parse_err("a,");
    let _ = parse_err(",a");
}

// Attribute selectors
// [§ 6.3 Attribute selectors](https://www.w3.org/TR/selectors-3/#attribute-selectors)

#[test]
fn test_attribute_exists() {
    let selector = parse_one("a[href]");
    let Selector::Conditional { conditions, .. } = selector else {
        panic!("Expected Conditional");
    };
    assert_eq!(
        conditions,
        vec![Condition::Attribute {
            namespace: NamespacePrefix::Unspecified,
            name: "href".to_string(),
            op: AttributeOperator::Exists,
            value: None,
        }]
    );
}

#[test]
fn test_attribute_operators() {
    let cases = [
        ("[a=b]", AttributeOperator::Equals),
        ("[a!=b]", AttributeOperator::NotEquals),
        ("[a~=b]", AttributeOperator::Includes),
        ("[a|=b]", AttributeOperator::DashMatch),
        ("[a^=b]", AttributeOperator::Prefix),
        ("[a$=b]", AttributeOperator::Suffix),
        ("[a*=b]", AttributeOperator::Substring),
    ];
    for (input, expected) in cases {
        let Selector::Conditional { conditions, .. } = parse_one(input) else {
            panic!("Expected Conditional for '{input}'");
        };
        assert!(
            matches!(&conditions[0], Condition::Attribute { op, value: Some(v), .. }
                if *op == expected && v == "b"),
            "'{input}'"
        );
    }
}

#[test]
fn test_attribute_quoted_value() {
    let Selector::Conditional { conditions, .. } = parse_one("a[id|='Boing']") else {
        panic!("Expected Conditional");
    };
    assert!(matches!(
        &conditions[0],
        Condition::Attribute {
            op: AttributeOperator::DashMatch,
            value: Some(v),
            ..
        } if v == "Boing"
    ));
}

#[test]
fn test_attribute_whitespace_tolerated_around_parts() {
    let Selector::Conditional { conditions, .. } = parse_one("[ lang |= en ]") else {
        panic!("Expected Conditional");
    };
    assert!(matches!(
        &conditions[0],
        Condition::Attribute {
            op: AttributeOperator::DashMatch,
            value: Some(v),
            ..
        } if v == "en"
    ));
}

#[test]
fn test_attribute_errors() {
    let _ = parse_err("[]");
    let _ = parse_err("[a=]");
    let _ = parse_err("[a");
    let _ = parse_err("[a==b]");
    let _ = parse_err("[a~b]");
}

// Namespaces
// [§ 3 Namespace prefixes](https://www.w3.org/TR/selectors-3/#nsprefixes)

#[test]
fn test_namespace_prefixed_element() {
    let selector = parse_one("x|a");
    assert_eq!(
        selector,
        Selector::Element {
            namespace: NamespacePrefix::Prefix("x".to_string()),
            name: "a".to_string(),
        }
    );
}

#[test]
fn test_namespace_any_and_none() {
    assert!(matches!(
        parse_one("*|a"),
        Selector::Element {
            namespace: NamespacePrefix::Any,
            ..
        }
    ));
    assert!(matches!(
        parse_one("|a"),
        Selector::Element {
            namespace: NamespacePrefix::NoNamespace,
            ..
        }
    ));
    assert!(matches!(
        parse_one("x|*"),
        Selector::Universal {
            namespace: NamespacePrefix::Prefix(_)
        }
    ));
}

#[test]
fn test_namespace_prefixed_attribute() {
    let Selector::Conditional { conditions, .. } = parse_one("[x|href]") else {
        panic!("Expected Conditional");
    };
    assert!(matches!(
        &conditions[0],
        Condition::Attribute {
            namespace: NamespacePrefix::Prefix(p),
            name,
            ..
        } if p == "x" && name == "href"
    ));
}

// Pseudo-classes and pseudo-elements
// [§ 6.6 Pseudo-classes](https://www.w3.org/TR/selectors-3/#pseudo-classes)

#[test]
fn test_simple_pseudo_class() {
    let Selector::Conditional { conditions, .. } = parse_one("p:first-child") else {
        panic!("Expected Conditional");
    };
    assert_eq!(
        conditions,
        vec![Condition::PseudoClass {
            name: "first-child".to_string(),
            argument: None,
        }]
    );
}

#[test]
fn test_pseudo_class_name_lowercased() {
    let Selector::Conditional { conditions, .. } = parse_one("p:FIRST-CHILD") else {
        panic!("Expected Conditional");
    };
    assert!(matches!(
        &conditions[0],
        Condition::PseudoClass { name, .. } if name == "first-child"
    ));
}

#[test]
fn test_nth_child_argument() {
    let Selector::Conditional { conditions, .. } = parse_one("li:nth-child(2n+1)") else {
        panic!("Expected Conditional");
    };
    assert_eq!(
        conditions,
        vec![Condition::PseudoClass {
            name: "nth-child".to_string(),
            argument: Some(PseudoArgument::AnPlusB(AnPlusB::new(2, 1))),
        }]
    );
}

#[test]
fn test_nth_child_keyword_argument() {
    let Selector::Conditional { conditions, .. } = parse_one("li:nth-child(odd)") else {
        panic!("Expected Conditional");
    };
    assert!(matches!(
        &conditions[0],
        Condition::PseudoClass {
            argument: Some(PseudoArgument::AnPlusB(anb)),
            ..
        } if *anb == AnPlusB::odd()
    ));
}

#[test]
fn test_nth_child_whitespace_in_argument() {
    let Selector::Conditional { conditions, .. } = parse_one("li:nth-child( 2n + 1 )") else {
        panic!("Expected Conditional");
    };
    assert!(matches!(
        &conditions[0],
        Condition::PseudoClass {
            argument: Some(PseudoArgument::AnPlusB(anb)),
            ..
        } if *anb == AnPlusB::new(2, 1)
    ));
}

#[test]
fn test_not_argument() {
    let Selector::Conditional { conditions, .. } = parse_one("p:not(.foo)") else {
        panic!("Expected Conditional");
    };
    let Condition::PseudoClass { name, argument } = &conditions[0] else {
        panic!("Expected PseudoClass");
    };
    assert_eq!(name, "not");
    assert!(matches!(argument, Some(PseudoArgument::Selector(_))));
}

#[test]
fn test_not_rejects_combinators() {
    let _ = parse_err("p:not(a b)");
}

#[test]
fn test_has_relative_argument() {
    let Selector::Conditional { conditions, .. } = parse_one("div:has(> img)") else {
        panic!("Expected Conditional");
    };
    assert!(matches!(
        &conditions[0],
        Condition::PseudoClass {
            name,
            argument: Some(PseudoArgument::Relative {
                combinator: CombinatorKind::Child,
                ..
            }),
        } if name == "has"
    ));
}

#[test]
fn test_has_plain_argument_is_descendant() {
    let Selector::Conditional { conditions, .. } = parse_one("div:has(img)") else {
        panic!("Expected Conditional");
    };
    assert!(matches!(
        &conditions[0],
        Condition::PseudoClass {
            argument: Some(PseudoArgument::Relative {
                combinator: CombinatorKind::Descendant,
                ..
            }),
            ..
        }
    ));
}

#[test]
fn test_contains_argument() {
    let Selector::Conditional { conditions, .. } = parse_one("div:contains('Hello')") else {
        panic!("Expected Conditional");
    };
    assert!(matches!(
        &conditions[0],
        Condition::PseudoClass {
            argument: Some(PseudoArgument::String(s)),
            ..
        } if s == "Hello"
    ));
}

#[test]
fn test_eq_argument() {
    let Selector::Conditional { conditions, .. } = parse_one("li:eq(2)") else {
        panic!("Expected Conditional");
    };
    assert!(matches!(
        &conditions[0],
        Condition::PseudoClass {
            argument: Some(PseudoArgument::Integer(2)),
            ..
        }
    ));
}

#[test]
fn test_pseudo_element() {
    let Selector::Conditional { conditions, .. } = parse_one("p::before") else {
        panic!("Expected Conditional");
    };
    assert_eq!(
        conditions,
        vec![Condition::PseudoElement {
            name: "before".to_string()
        }]
    );
}

#[test]
fn test_vendor_prefixed_pseudo_rejected_at_parse_time() {
    // "-moz-drag-over" is not an XPath-compatible name
    let err = parse_err("div:-moz-drag-over");
    assert!(matches!(err, CssError::Syntax(_)));
    assert!(err.to_string().contains("-moz-drag-over"));
}

#[test]
fn test_unknown_functional_pseudo_rejected() {
    let _ = parse_err("div:frobnicate(2)");
}

#[test]
fn test_unterminated_function_rejected() {
    let _ = parse_err("li:nth-child(2n");
}

// Errors and diagnostics

#[test]
fn test_empty_selector() {
    let err = parse_err("");
    assert!(err.to_string().contains("empty CSS selector"));
    let err = parse_err("   ");
    assert!(err.to_string().contains("empty CSS selector"));
}

#[test]
fn test_error_names_offending_and_previous_token() {
    let CssError::Syntax(err) = parse_err("div !") else {
        panic!("Expected a syntax error");
    };
    assert_eq!(err.found.as_deref(), Some("<delim:!>"));
    assert_eq!(err.after.as_deref(), Some("<ident:div>"));
    assert!(err.message.contains("<delim:!>"));
    assert!(err.message.contains("<ident:div>"));
}

#[test]
fn test_lex_error_surfaces_as_css_error() {
    let err = parse_err("'unterminated");
    assert!(matches!(err, CssError::Lex(_)));
}

// Specificity
// [§ 9 Calculating a selector's specificity](https://www.w3.org/TR/selectors-3/#specificity)

#[test]
fn test_specificity() {
    assert_eq!(parse_one("*").specificity(), Specificity::new(0, 0, 0));
    assert_eq!(parse_one("li").specificity(), Specificity::new(0, 0, 1));
    assert_eq!(
        parse_one("ul li").specificity(),
        Specificity::new(0, 0, 2)
    );
    assert_eq!(
        parse_one("div.highlight#main").specificity(),
        Specificity::new(1, 1, 1)
    );
    assert_eq!(
        parse_one("p:first-child").specificity(),
        Specificity::new(0, 1, 1)
    );
    // ":not() itself does not count, its argument does"
    assert_eq!(
        parse_one(":not(.foo)").specificity(),
        Specificity::new(0, 1, 0)
    );
}

#[test]
fn test_whitespace_only_descendant() {
    // Leading and trailing whitespace is not a combinator
    let list: SelectorList = parse("  div  ").expect("should parse");
    assert!(matches!(list.items[0], Selector::Element { .. }));
}
