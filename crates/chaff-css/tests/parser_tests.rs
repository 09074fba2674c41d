//! Tests for stylesheet rule extraction.

use chaff_css::{Declaration, Specificity, parse_stylesheet};

fn texts(css: &str) -> Vec<String> {
    parse_stylesheet(css).into_iter().map(|r| r.text).collect()
}

#[test]
fn test_simple_rule() {
    let rules = parse_stylesheet("#foo .bar { color: red; margin: 0 auto }");
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].text, "#foo .bar");
    assert_eq!(rules[0].specificity, Some(Specificity(1, 1, 0)));
    assert_eq!(
        rules[0].declarations,
        vec![
            Declaration {
                name: "color".to_string(),
                value: "red".to_string(),
                important: false,
            },
            Declaration {
                name: "margin".to_string(),
                value: "0 auto".to_string(),
                important: false,
            },
        ]
    );
}

#[test]
fn test_selector_list_is_split() {
    let rules = parse_stylesheet("h1,\n  h2 ,h3{font-weight:bold}");
    assert_eq!(texts("h1,\n  h2 ,h3{font-weight:bold}"), vec!["h1", "h2", "h3"]);
    assert!(rules.iter().all(|r| r.declarations.len() == 1));
}

#[test]
fn test_commas_inside_arguments_do_not_split() {
    assert_eq!(
        texts("a[title='a,b'], li:not(.x) {}"),
        vec!["a[title='a,b']", "li:not(.x)"]
    );
}

#[test]
fn test_comments_are_dropped() {
    assert_eq!(
        texts("/* header */ .a /* inline */ { color: red } /* .b {} */"),
        vec![".a"]
    );
    assert_eq!(texts(".a::after { content: '/* not a comment */' }"), vec![".a::after"]);
}

#[test]
fn test_media_rules_are_descended_into() {
    let css = "@media (max-width: 600px) { .narrow { display: none } @supports (display: grid) { .grid {} } } .after {}";
    assert_eq!(texts(css), vec![".narrow", ".grid", ".after"]);
}

#[test]
fn test_other_block_at_rules_are_reported_by_head() {
    let css = "@font-face { font-family: X; src: url(x.woff) }
        @keyframes   spin { from { top: 0 } to { top: 10px } }
        @import url(other.css);
        @charset \"utf-8\";
        .a {}";
    let rules = parse_stylesheet(css);
    let heads: Vec<_> = rules.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(heads, vec!["@font-face", "@keyframes spin", ".a"]);
    assert_eq!(rules[0].declarations.len(), 2);
    assert!(rules[1].declarations.is_empty());
    assert_eq!(rules[0].specificity, None);
}

#[test]
fn test_important_and_custom_properties() {
    let rules = parse_stylesheet(".a { COLOR: red ! IMPORTANT; --Main-Color: #fff }");
    let declarations = &rules[0].declarations;
    assert_eq!(declarations[0].name, "color");
    assert_eq!(declarations[0].value, "red");
    assert!(declarations[0].important);
    assert_eq!(declarations[0].to_string(), "color: red !important");
    assert_eq!(declarations[1].name, "--Main-Color");
    assert_eq!(declarations[1].to_string(), "--Main-Color: #fff");
}

#[test]
fn test_values_with_semicolons_in_strings() {
    let rules = parse_stylesheet(".q { content: \"a;b\"; color: blue }");
    assert_eq!(rules[0].declarations.len(), 2);
    assert_eq!(rules[0].declarations[0].value, "\"a;b\"");
}

#[test]
fn test_unsupported_selectors_have_no_specificity() {
    let rules = parse_stylesheet("a:hover { color: red }");
    assert_eq!(rules[0].text, "a:hover");
    assert_eq!(rules[0].specificity, None);
}

#[test]
fn test_malformed_input_is_skipped() {
    assert_eq!(texts(".a { color: red } } .b { x }"), vec![".a", ".b"]);
    assert_eq!(texts(".a { color: red"), vec![".a"]);
    assert_eq!(texts(".orphan"), Vec::<String>::new());
    assert!(parse_stylesheet(".b { nonsense }")[0].declarations.is_empty());
}

#[test]
fn test_empty_stylesheet() {
    assert!(parse_stylesheet("").is_empty());
    assert!(parse_stylesheet("  /* only a comment */ ").is_empty());
}
