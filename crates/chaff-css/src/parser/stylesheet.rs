//! Stylesheet parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
//!
//! This does not build component values. It finds rule boundaries, splits
//! selector lists and declaration lists, and hands every selector to
//! [`parse_selector`] for its specificity. Malformed input is skipped with
//! a deduplicated warning, the way a browser drops an invalid rule.

use std::fmt;

use chaff_common::warning::warn_once;

use crate::selector::{Specificity, parse_selector};
use crate::tokenizer::{is_css_whitespace, trim_css_whitespace};

/// Conditional group rules whose contents are ordinary style rules.
const GROUPING_AT_RULES: &[&str] = &[
    "media",
    "supports",
    "document",
    "-moz-document",
    "layer",
    "container",
    "scope",
    "starting-style",
];

/// [§ 5.4.5 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
///
/// A CSS declaration (e.g., `color: red`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The property name, lowercased unless it is a custom property.
    pub name: String,
    /// The value text with `!important` removed.
    pub value: String,
    /// Whether the declaration has `!important`.
    pub important: bool,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)?;
        if self.important {
            write!(f, " !important")?;
        }
        Ok(())
    }
}

/// One selector of a style rule together with the rule's declaration block.
///
/// A rule `h1, h2 { color: red }` yields two of these that share a copy of
/// the declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSelector {
    /// The selector exactly as authored, trimmed.
    pub text: String,
    /// Declarations of the enclosing rule.
    pub declarations: Vec<Declaration>,
    /// Specificity, when the selector parses.
    pub specificity: Option<Specificity>,
}

/// Extracts [`RuleSelector`]s from stylesheet text.
pub struct StylesheetParser {
    input: Vec<char>,
    position: usize,
    rules: Vec<RuleSelector>,
}

impl StylesheetParser {
    /// Create a parser over `css`. Comments are removed up front.
    #[must_use]
    pub fn new(css: &str) -> Self {
        Self {
            input: strip_comments(css).chars().collect(),
            position: 0,
            rules: Vec::new(),
        }
    }

    /// Parse the whole stylesheet.
    pub fn run(&mut self) {
        self.consume_list_of_rules(false);
    }

    /// Return the rules collected by [`StylesheetParser::run`].
    #[must_use]
    pub fn into_rules(self) -> Vec<RuleSelector> {
        self.rules
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_css_whitespace) {
            self.position += 1;
        }
    }

    /// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    ///
    /// When `nested`, stops after the `}` that closes the enclosing block.
    fn consume_list_of_rules(&mut self, nested: bool) {
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    if nested {
                        let _ = warn_once("CSS", "unterminated at-rule block");
                    }
                    return;
                }
                Some('}') => {
                    self.position += 1;
                    if nested {
                        return;
                    }
                    let _ = warn_once("CSS", "stray `}` at top level");
                }
                // CDO/CDC are ignored at the top level.
                Some('<') if self.starts_with("<!--") => self.position += 4,
                Some('-') if self.starts_with("-->") => self.position += 3,
                Some('@') => self.consume_at_rule(),
                Some(_) => self.consume_qualified_rule(),
            }
        }
    }

    fn starts_with(&self, literal: &str) -> bool {
        literal
            .chars()
            .enumerate()
            .all(|(i, c)| self.input.get(self.position + i) == Some(&c))
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    fn consume_at_rule(&mut self) {
        // Skip '@'.
        self.position += 1;
        let start = self.position;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii())
        {
            self.position += 1;
        }
        let name: String = self.input[start..self.position].iter().collect();
        let (prelude, stop) = self.consume_prelude();

        match stop {
            Some('{') => {}
            // Statement at-rules such as @import and @charset.
            Some(';') | None => return,
            Some(_) => {
                let _ = warn_once("CSS", &format!("malformed @{name} rule"));
                return;
            }
        }

        let lowered = name.to_ascii_lowercase();
        if GROUPING_AT_RULES.contains(&lowered.as_str()) {
            log::trace!(target: "chaff", "descending into @{name}");
            self.consume_list_of_rules(true);
            return;
        }

        let body = self.consume_block_body();
        let prelude = collapse_whitespace(&prelude);
        let text = if prelude.is_empty() {
            format!("@{name}")
        } else {
            format!("@{name} {prelude}")
        };
        // Keyframe lists and other nested bodies carry no declarations of their own.
        let declarations = if body.contains('{') {
            Vec::new()
        } else {
            parse_declarations(&body)
        };
        self.rules.push(RuleSelector {
            text,
            declarations,
            specificity: None,
        });
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    fn consume_qualified_rule(&mut self) {
        let (prelude, stop) = self.consume_prelude();
        match stop {
            Some('{') => {}
            Some(';') => {
                let _ = warn_once(
                    "CSS",
                    &format!("dropped rule without a block: {}", trim_css_whitespace(&prelude)),
                );
                return;
            }
            Some('}') => {
                // Leave the `}` for the enclosing list.
                self.position -= 1;
                let _ = warn_once(
                    "CSS",
                    &format!("dropped rule without a block: {}", trim_css_whitespace(&prelude)),
                );
                return;
            }
            _ => {
                let _ = warn_once("CSS", "unterminated rule at end of stylesheet");
                return;
            }
        }

        let body = self.consume_block_body();
        let declarations = parse_declarations(&body);

        for text in split_top_level(&prelude, ',') {
            let text = trim_css_whitespace(text);
            if text.is_empty() {
                let _ = warn_once("CSS", "empty selector in selector list");
                continue;
            }
            self.rules.push(RuleSelector {
                text: text.to_string(),
                declarations: declarations.clone(),
                specificity: parse_selector(text).ok().map(|parsed| parsed.specificity),
            });
        }
    }

    /// Read up to the first top-level `{`, `;` or `}`, consuming the stop character.
    fn consume_prelude(&mut self) -> (String, Option<char>) {
        let mut prelude = String::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        while let Some(c) = self.peek() {
            self.position += 1;
            if let Some(q) = quote {
                prelude.push(c);
                if c == '\\' {
                    if let Some(escaped) = self.peek() {
                        prelude.push(escaped);
                        self.position += 1;
                    }
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' => quote = Some(c),
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                '{' | ';' | '}' if depth == 0 => return (prelude, Some(c)),
                '\\' => {
                    prelude.push(c);
                    if let Some(escaped) = self.peek() {
                        prelude.push(escaped);
                        self.position += 1;
                    }
                    continue;
                }
                _ => {}
            }
            prelude.push(c);
        }
        (prelude, None)
    }

    /// Read a block body after its `{`, through the matching `}`.
    fn consume_block_body(&mut self) -> String {
        let mut body = String::new();
        let mut depth = 1usize;
        let mut quote: Option<char> = None;

        while let Some(c) = self.peek() {
            self.position += 1;
            if let Some(q) = quote {
                body.push(c);
                if c == '\\' {
                    if let Some(escaped) = self.peek() {
                        body.push(escaped);
                        self.position += 1;
                    }
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' => quote = Some(c),
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return body;
                    }
                }
                _ => {}
            }
            body.push(c);
        }
        let _ = warn_once("CSS", "unterminated declaration block");
        body
    }
}

/// [§ 5.4.4 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
fn parse_declarations(body: &str) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    for item in split_top_level(body, ';') {
        let item = trim_css_whitespace(item);
        if item.is_empty() || item.contains('{') {
            continue;
        }
        let Some((name, value)) = item.split_once(':') else {
            let _ = warn_once("CSS", &format!("dropped declaration without a colon: {item}"));
            continue;
        };
        let name = trim_css_whitespace(name);
        if name.is_empty() {
            continue;
        }
        let name = if name.starts_with("--") {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        };
        let value = trim_css_whitespace(value);
        let important = check_important(value);
        let value = if important {
            trim_important(value)
        } else {
            value
        };
        declarations.push(Declaration {
            name,
            value: value.to_string(),
            important,
        });
    }
    declarations
}

/// Does the value end in `!important` (any case, whitespace allowed after `!`)?
fn check_important(value: &str) -> bool {
    let Some(bang) = value.rfind('!') else {
        return false;
    };
    trim_css_whitespace(&value[bang + 1..]).eq_ignore_ascii_case("important")
}

fn trim_important(value: &str) -> &str {
    value
        .rfind('!')
        .map_or(value, |bang| trim_css_whitespace(&value[..bang]))
}

/// Split on `separator` outside strings, parentheses, brackets and braces.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Remove `/* ... */` comments outside strings.
fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'*') => {
                let _ = chars.next();
                let mut previous = '\0';
                let mut closed = false;
                for inner in chars.by_ref() {
                    if previous == '*' && inner == '/' {
                        closed = true;
                        break;
                    }
                    previous = inner;
                }
                if !closed {
                    let _ = warn_once("CSS", "unterminated comment");
                }
                // A comment still separates tokens.
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split(is_css_whitespace)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a stylesheet in one call.
#[must_use]
pub fn parse_stylesheet(css: &str) -> Vec<RuleSelector> {
    let mut parser = StylesheetParser::new(css);
    parser.run();
    parser.into_rules()
}
