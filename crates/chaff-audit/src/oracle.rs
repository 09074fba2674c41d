//! The question reduction asks of a document.

/// Answer to "does this selector match anything in the document?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// At least one element matches.
    Matched,
    /// No element matches.
    NotMatched,
    /// The matcher cannot evaluate this selector. Terminal for the selector.
    Unsupported(String),
}

/// Something selectors can be tested against, usually one parsed document.
pub trait SelectorOracle {
    /// Test one canonical selector.
    fn test(&self, selector: &str) -> MatchOutcome;
}

impl<F> SelectorOracle for F
where
    F: Fn(&str) -> MatchOutcome,
{
    fn test(&self, selector: &str) -> MatchOutcome {
        self(selector)
    }
}
