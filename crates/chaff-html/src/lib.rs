//! HTML tokenizer and tree builder for chaff.
//!
//! # Scope
//!
//! Pages only need to be parsed well enough to answer "does this selector
//! match anything", so this crate favors leniency over fidelity:
//! - **Tokenizer** - tags, attributes (quoted and bare), comments, doctypes,
//!   raw text for `script`/`style`/`textarea`/`title`, common character references
//! - **Tree Builder** - synthesized `html`/`head`/`body`, void elements,
//!   implied end tags for paragraphs, list items, table cells and options
//!
//! # Not Implemented
//!
//! - Adoption agency algorithm (mis-nested formatting elements)
//! - Foster parenting
//! - The full named character reference table

/// Tree construction.
pub mod parser;
/// Tokenizer for converting markup into tokens.
pub mod tokenizer;

use chaff_dom::DomTree;

pub use parser::{HTMLParser, InsertionMode};
pub use tokenizer::{Attribute, HTMLTokenizer, Token};

/// Tokenize and tree-build `html` in one step.
#[must_use]
pub fn parse_document(html: &str) -> DomTree {
    let mut tokenizer = HTMLTokenizer::new(html);
    tokenizer.run();
    HTMLParser::new(tokenizer.into_tokens()).run()
}
