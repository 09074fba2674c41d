//! Selector tokenizer module.

/// Token types.
pub mod token;
/// Tokenizer implementation.
#[allow(clippy::module_inception)]
pub mod tokenizer;

pub use token::{SelectorToken, TokenKind};
pub use tokenizer::{SelectorTokenizer, is_css_whitespace, tokenize_selector, trim_css_whitespace};
