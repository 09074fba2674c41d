//! Canonical selector text.
//!
//! Two spellings of the same selector must produce the same key: whitespace
//! layout is collapsed, and pseudo-classes and pseudo-elements that a static
//! document can never exhibit are dropped so the base selector stands in for
//! them (`.hello:hover` is "used" wherever `.hello` is).

use chaff_css::tokenizer::{
    SelectorToken, TokenKind, is_css_whitespace, tokenize_selector, trim_css_whitespace,
};
use serde::{Deserialize, Serialize};

/// Which pseudo-classes and pseudo-elements normalization removes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PseudoPolicy {
    /// Pseudo-classes assumed to hold wherever their base selector matches.
    /// Compared ASCII case-insensitively.
    pub inferable_pseudo_classes: Vec<String>,
    /// Remove `::name` pseudo-elements.
    pub strip_pseudo_elements: bool,
}

impl Default for PseudoPolicy {
    fn default() -> Self {
        Self {
            inferable_pseudo_classes: vec!["hover".to_string(), "valid".to_string()],
            strip_pseudo_elements: true,
        }
    }
}

impl PseudoPolicy {
    fn is_inferable(&self, name: &str) -> bool {
        self.inferable_pseudo_classes
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(name))
    }
}

/// Turns raw selector text into a canonical key.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    policy: PseudoPolicy,
}

impl Normalizer {
    /// Create a normalizer with the given policy.
    #[must_use]
    pub const fn new(policy: PseudoPolicy) -> Self {
        Self { policy }
    }

    /// The policy in effect.
    #[must_use]
    pub const fn policy(&self) -> &PseudoPolicy {
        &self.policy
    }

    /// Canonical form of `selector`: pseudo parts stripped, then whitespace
    /// normalized.
    ///
    /// A non-blank selector never normalizes to the empty string. When
    /// everything is stripped (`::selection`) the result is `*`, since the
    /// pseudo part applied to any element.
    #[must_use]
    pub fn normalize(&self, selector: &str) -> String {
        let canonical = normalize_whitespace(&self.strip_simple_pseudo(selector));
        if canonical.is_empty() && !trim_css_whitespace(selector).is_empty() {
            return "*".to_string();
        }
        canonical
    }

    /// Drop inferable pseudo-classes and plain pseudo-elements outside any
    /// functional notation. Whitespace is left as authored.
    ///
    /// A compound left empty by the removal gets a `*` so that `a :hover`
    /// keeps meaning "some descendant of `a`" rather than collapsing into `a`.
    #[must_use]
    pub fn strip_simple_pseudo(&self, selector: &str) -> String {
        let mut kept: Vec<SelectorToken> = Vec::new();
        let mut depth = 0usize;

        for token in tokenize_selector(selector) {
            if depth == 0 && token.kind == TokenKind::Ident && self.drop_pseudo(&mut kept, &token) {
                let compound_emptied = kept.last().is_none_or(|previous| {
                    previous.kind.is_combinator() || previous.kind == TokenKind::Comma
                });
                if compound_emptied {
                    kept.push(SelectorToken::new(TokenKind::Delim('*'), "*"));
                }
                continue;
            }

            match token.kind {
                TokenKind::Function | TokenKind::Delim('(') => depth += 1,
                TokenKind::RightParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            kept.push(token);
        }

        kept.into_iter().map(|token| token.text).collect()
    }

    /// If `ident` completes a removable pseudo, pop its colons from `kept`
    /// and return true.
    fn drop_pseudo(&self, kept: &mut Vec<SelectorToken>, ident: &SelectorToken) -> bool {
        let colons = kept
            .iter()
            .rev()
            .take(2)
            .take_while(|token| token.is_delim(':'))
            .count();

        let drop = match colons {
            2 => self.policy.strip_pseudo_elements,
            1 => self.policy.is_inferable(&ident.text),
            _ => false,
        };
        if drop {
            kept.truncate(kept.len() - colons);
        }
        drop
    }
}

/// Collapse every descendant-combinator whitespace run to one space and
/// remove all other whitespace. Whitespace inside an escape is kept.
#[must_use]
pub fn normalize_whitespace(selector: &str) -> String {
    let tokens = tokenize_selector(selector);
    let is_blank = |token: &SelectorToken| token.kind == TokenKind::Whitespace;
    let start = tokens
        .iter()
        .position(|token| !is_blank(token))
        .unwrap_or(tokens.len());
    let end = tokens
        .iter()
        .rposition(|token| !is_blank(token))
        .map_or(start, |last| last + 1);

    let mut normalized = String::with_capacity(selector.len());
    for token in &tokens[start..end] {
        match token.kind {
            TokenKind::Whitespace => normalized.push(' '),
            kind if kind.absorbs_whitespace() => normalized.push_str(token.trimmed()),
            _ => normalized.push_str(&normalize_escape_terminators(&token.text)),
        }
    }
    normalized
}

/// Rewrite the whitespace ending a hex escape as one space, so `\31\n` and
/// `\31 ` key alike. Escaped code points are copied as they are.
fn normalize_escape_terminators(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c != '\\' {
            continue;
        }
        if chars.peek().is_some_and(|next| !next.is_ascii_hexdigit()) {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
            continue;
        }
        let mut digits = 0;
        while digits < 6 && chars.peek().is_some_and(char::is_ascii_hexdigit) {
            if let Some(digit) = chars.next() {
                out.push(digit);
            }
            digits += 1;
        }
        if chars.next_if_eq(&'\r').is_some() {
            let _ = chars.next_if_eq(&'\n');
            out.push(' ');
        } else if chars.next_if(|&next| is_css_whitespace(next)).is_some() {
            out.push(' ');
        }
    }
    out
}

/// Is this an at-rule head (`@font-face`) rather than a selector?
#[must_use]
pub fn is_known_unsupported(selector: &str) -> bool {
    tokenize_selector(selector).iter().any(|token| {
        token.is_delim('@') || (token.kind == TokenKind::Ident && token.text.starts_with('@'))
    })
}
