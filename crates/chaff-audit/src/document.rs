//! A parsed HTML page as a [`SelectorOracle`].

use chaff_css::parse_selector;
use chaff_dom::DomTree;

use crate::oracle::{MatchOutcome, SelectorOracle};

/// One page, parsed once and tested many times.
#[derive(Debug)]
pub struct HtmlDocument {
    tree: DomTree,
}

impl HtmlDocument {
    /// Parse `html`. Never fails; malformed markup is repaired.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            tree: chaff_html::parse_document(html),
        }
    }

    /// The document tree.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }
}

impl From<DomTree> for HtmlDocument {
    fn from(tree: DomTree) -> Self {
        Self { tree }
    }
}

impl SelectorOracle for HtmlDocument {
    fn test(&self, selector: &str) -> MatchOutcome {
        match parse_selector(selector) {
            Ok(parsed) if parsed.any_match(&self.tree) => MatchOutcome::Matched,
            Ok(_) => MatchOutcome::NotMatched,
            Err(error) => MatchOutcome::Unsupported(error.to_string()),
        }
    }
}
