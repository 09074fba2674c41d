//! Text presentation of events and results.

use std::io::{self, Write};

use chaff_css::Declaration;
use owo_colors::OwoColorize;

use crate::engine::SelectorState;
use crate::events::AuditEvent;

/// Whether to emit ANSI colors. Resolved once by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Palette {
    color: bool,
}

impl Palette {
    /// A palette that colors when `color` is set.
    #[must_use]
    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    /// No colors.
    #[must_use]
    pub const fn plain() -> Self {
        Self { color: false }
    }

    /// Counts and summaries.
    #[must_use]
    pub fn yellow(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    /// Matched selectors.
    #[must_use]
    pub fn green(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    /// Failures and rejections.
    #[must_use]
    pub fn red(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }
}

/// One event as the lines a progress log shows for it.
#[must_use]
pub fn render_event(event: &AuditEvent, palette: &Palette) -> String {
    match event {
        AuditEvent::StylesheetLoaded {
            location,
            new_selectors,
        } => format!(
            "{location}\n{}",
            palette.yellow(&format!("  found {new_selectors} selectors"))
        ),
        AuditEvent::ExtraRulesLoaded { new_selectors } => {
            format!("\n{}", palette.yellow(&format!("Added {new_selectors} extra selectors")))
        }
        AuditEvent::SourceFailed { error, .. } => palette.red(error),
        AuditEvent::PageStarted { location } => format!("\n{location}"),
        AuditEvent::SelectorMatched { selector } => format!("  {}", palette.green(selector)),
        AuditEvent::SelectorRejected { selector, reason } => {
            format!("  {}", palette.red(&format!("{selector}: {reason}")))
        }
    }
}

/// Line that opens the unsupported section of a dump.
pub const UNSUPPORTED_HEADING: &str = "/* unsupported */";

/// `found U unused and S unsupported selectors out of T total`
#[must_use]
pub fn summary_line(unused: usize, unsupported: usize, total: usize) -> String {
    format!("found {unused} unused and {unsupported} unsupported selectors out of {total} total")
}

/// An authored selector still up for review, with the block it came with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedRule {
    /// The selector as authored.
    pub selector: String,
    /// Declarations of the rule it was authored in.
    pub declarations: Vec<Declaration>,
    /// [`SelectorState::Unused`] or [`SelectorState::Unsupported`].
    pub state: SelectorState,
}

/// Write `selector { a: b; c: d }` per rule, the unsupported ones after
/// [`UNSUPPORTED_HEADING`]. Rules are expected unused first.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_rules(sink: &mut impl Write, rules: &[UnusedRule]) -> io::Result<()> {
    let mut in_unsupported = false;
    for rule in rules {
        if rule.state == SelectorState::Unsupported && !in_unsupported {
            in_unsupported = true;
            writeln!(sink, "{UNSUPPORTED_HEADING}")?;
        }
        let body = rule
            .declarations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        if body.is_empty() {
            writeln!(sink, "{} {{}}", rule.selector)?;
        } else {
            writeln!(sink, "{} {{ {body} }}", rule.selector)?;
        }
    }
    Ok(())
}

/// Write one selector per line, the unsupported ones after
/// [`UNSUPPORTED_HEADING`].
///
/// # Errors
///
/// Propagates write failures.
pub fn write_selectors(
    sink: &mut impl Write,
    unused: &[String],
    unsupported: &[String],
) -> io::Result<()> {
    for selector in unused {
        writeln!(sink, "{selector}")?;
    }
    if !unsupported.is_empty() {
        writeln!(sink, "{UNSUPPORTED_HEADING}")?;
    }
    for selector in unsupported {
        writeln!(sink, "{selector}")?;
    }
    Ok(())
}
