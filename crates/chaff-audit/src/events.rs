//! Progress events returned by [`crate::Audit`].

use std::fmt;

/// Something that happened during a run. The library never prints; callers
/// render these however they like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    /// A stylesheet was ingested.
    StylesheetLoaded {
        /// Location as configured.
        location: String,
        /// Selectors it added that were not already authored.
        new_selectors: usize,
    },
    /// The extra rules were ingested.
    ExtraRulesLoaded {
        /// Selectors they added that were not already authored.
        new_selectors: usize,
    },
    /// A stylesheet or page could not be loaded and was skipped.
    SourceFailed {
        /// Location as configured.
        location: String,
        /// Why.
        error: String,
    },
    /// A page is about to be processed.
    PageStarted {
        /// Location as configured, or a placeholder for inline markup.
        location: String,
    },
    /// An authored selector matched for the first time.
    SelectorMatched {
        /// First authored spelling.
        selector: String,
    },
    /// The matcher could not evaluate a selector.
    SelectorRejected {
        /// First authored spelling, or the canonical text of a synthetic prefix.
        selector: String,
        /// The matcher's reason.
        reason: String,
    },
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StylesheetLoaded {
                location,
                new_selectors,
            } => write!(f, "{location}: found {new_selectors} selectors"),
            Self::ExtraRulesLoaded { new_selectors } => {
                write!(f, "Added {new_selectors} extra selectors")
            }
            Self::SourceFailed { error, .. } => write!(f, "{error}"),
            Self::PageStarted { location } => write!(f, "{location}"),
            Self::SelectorMatched { selector } => write!(f, "{selector}"),
            Self::SelectorRejected { selector, reason } => write!(f, "{selector}: {reason}"),
        }
    }
}
