//! Prefix selectors implied by a combinator selector.
//!
//! `#foo .bar .baz` can only match where `#foo .bar` and `#foo` match, so
//! those prefixes are inserted as synthetic nodes. That keeps the deeper
//! selector below them in the tree even when nobody authored the prefixes,
//! and reduction only tests it once they have matched.

use chaff_css::tokenizer::{TokenKind, tokenize_selector};

/// Prefixes of `canonical` that end on a type, id, class or universal
/// selector, shortest first, excluding `canonical` itself.
///
/// Scanning stops at the first token that is not a name, `#id`, `.`, `*` or
/// combinator, so nothing is derived past an attribute selector or
/// pseudo-class, and nothing at all from an at-rule.
#[must_use]
pub fn implied_prefixes(canonical: &str) -> Vec<String> {
    let mut prefixes: Vec<String> = Vec::new();
    let mut built = String::new();

    for token in tokenize_selector(canonical) {
        let ends_simple = match token.kind {
            TokenKind::Ident if token.text.starts_with('@') => break,
            TokenKind::Ident | TokenKind::Hash | TokenKind::Delim('*') => true,
            TokenKind::Delim('.')
            | TokenKind::Plus
            | TokenKind::Greater
            | TokenKind::Tilde
            | TokenKind::Whitespace => false,
            _ => break,
        };
        built.push_str(&token.text);

        if ends_simple && built != canonical && !prefixes.contains(&built) {
            prefixes.push(built.clone());
        }
    }
    prefixes
}
