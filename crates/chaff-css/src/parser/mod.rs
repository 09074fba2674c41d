//! Stylesheet rule parser module.

/// Rule extraction per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing), simplified.
pub mod stylesheet;

pub use stylesheet::{Declaration, RuleSelector, StylesheetParser, parse_stylesheet};
