//! Selector tokenizing, stylesheet rule extraction and selector matching for chaff.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selector Tokenizer** - typed `(kind, text)` tokens in which only
//!   descendant-combinator whitespace survives as a token of its own
//! - **Stylesheet Rule Parser** - one `(selector, declarations, specificity)`
//!   entry per comma-separated selector, descending into conditional group
//!   rules such as `@media`
//! - **CSS Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, universal, class, ID and attribute selectors
//!   - All four combinators
//!   - Structural pseudo-classes, `:not()` and the `:nth-*()` family
//!   - Specificity calculation
//!
//! # Not Implemented
//!
//! - Namespaces and selector lists inside `:not()`
//! - Dynamic pseudo-classes (`:hover`, `:focus`, ...), which are rejected
//! - Property value parsing

/// Stylesheet rule extraction.
pub mod parser;
/// Selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// Selector tokenizer.
pub mod tokenizer;

pub use parser::{Declaration, RuleSelector, StylesheetParser, parse_stylesheet};
pub use selector::{ParsedSelector, SelectorError, Specificity, parse_selector};
pub use tokenizer::{SelectorToken, SelectorTokenizer, TokenKind, tokenize_selector};
