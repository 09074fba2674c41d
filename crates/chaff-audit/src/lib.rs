//! Unused CSS selector detection for chaff.
//!
//! # Scope
//!
//! This crate provides:
//! - **Normalizer** - one canonical key per selector, ignoring whitespace
//!   layout, inferable pseudo-classes and pseudo-elements
//! - **Selector Tree** - deduplication and "implies" ordering of selectors
//! - **Implied Selectors** - synthetic prefix nodes that keep combinator
//!   selectors reachable from their parts
//! - **Reduction** - per-document testing that skips every selector whose
//!   more general ancestor did not match
//! - **Unsupported Bucket** - selectors the matcher rejects, and at-rules,
//!   reported apart from the unused ones
//! - **Audit** - the facade tying stylesheets, pages and reporting together
//!
//! ```
//! use chaff_audit::{Audit, AuditConfig};
//!
//! let mut audit = Audit::new(AuditConfig::default()).unwrap();
//! let _ = audit.ingest("#foo {} #foo .bar {} #foo .bar .baz {}");
//! let _ = audit.process("<div id=foo><p class=bar></p></div>");
//! assert_eq!(audit.selectors_to_review(), vec!["#foo .bar .baz"]);
//! ```

pub mod config;
pub mod document;
pub mod engine;
pub mod events;
pub mod implied;
pub mod normalize;
pub mod oracle;
pub mod report;
pub mod source;
pub mod tree;

use std::collections::HashSet;
use std::io::{self, Write};

use chaff_css::parse_stylesheet;
use regex::RegexSet;

pub use config::{AuditConfig, ConfigError};
pub use document::HtmlDocument;
pub use engine::{DocumentReport, Reduction, SelectorState};
pub use events::AuditEvent;
pub use implied::implied_prefixes;
pub use normalize::{Normalizer, PseudoPolicy, is_known_unsupported, normalize_whitespace};
pub use oracle::{MatchOutcome, SelectorOracle};
pub use report::{Palette, UnusedRule};
pub use source::PageSource;
pub use tree::{ImplicationPolicy, Insertion, SelectorId, SelectorNode, SelectorTree, implies};

/// Result of [`Audit::run`].
#[derive(Debug, Clone)]
pub struct AuditRun {
    /// Everything that happened, in order.
    pub events: Vec<AuditEvent>,
    /// Unused selectors followed by unsupported ones, deduplicated.
    pub to_review: Vec<String>,
}

/// Selector state across every stylesheet and page of one audit.
pub struct Audit {
    config: AuditConfig,
    normalizer: Normalizer,
    ignore: RegexSet,
    tree: SelectorTree,
    reduction: Reduction,
}

impl Audit {
    /// Create an audit with nothing ingested yet.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pattern`] if an ignore pattern does not compile.
    pub fn new(config: AuditConfig) -> Result<Self, ConfigError> {
        let ignore = config.ignore_set()?;
        Ok(Self {
            normalizer: Normalizer::new(config.pseudo.clone()),
            tree: SelectorTree::new(config.implication.clone()),
            reduction: Reduction::new(),
            ignore,
            config,
        })
    }

    /// The configuration this audit was built from.
    #[must_use]
    pub const fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// The selector tree.
    #[must_use]
    pub const fn tree(&self) -> &SelectorTree {
        &self.tree
    }

    /// Per-node reduction state.
    #[must_use]
    pub const fn reduction(&self) -> &Reduction {
        &self.reduction
    }

    /// Parse `css` and merge its selectors into the tree.
    ///
    /// Returns how many selectors became authored that were not before.
    /// Repeated spellings are recorded on the existing node. Selectors
    /// ingested after documents were processed have not been tested against
    /// those documents.
    pub fn ingest(&mut self, css: &str) -> usize {
        let mut new_selectors = 0;

        for rule in parse_stylesheet(css) {
            if self.is_ignored(&rule.text) {
                log::debug!(target: "chaff", "ignoring {}", rule.text);
                continue;
            }
            let canonical = self.normalizer.normalize(&rule.text);
            if canonical.is_empty() {
                continue;
            }

            let insertion = self.tree.insert(&canonical);
            self.reduction.on_insert(&self.tree, &insertion);
            let id = insertion.id;
            if !self.tree.record_original(id, &rule.text, rule.declarations) {
                continue;
            }
            new_selectors += 1;

            if is_known_unsupported(&canonical) {
                self.reduction.mark_unsupported(id);
                continue;
            }
            for prefix in implied_prefixes(&canonical) {
                let implied = self.tree.insert(&prefix);
                self.reduction.on_insert(&self.tree, &implied);
            }
        }
        new_selectors
    }

    fn is_ignored(&self, selector: &str) -> bool {
        !self.ignore.is_empty()
            && (self.ignore.is_match(selector)
                || self.ignore.is_match(&normalize_whitespace(selector)))
    }

    /// Forget everything, then ingest the configured stylesheets and extra
    /// rules. Sources that fail to load are reported and skipped.
    pub fn reset(&mut self) -> Vec<AuditEvent> {
        self.tree = SelectorTree::new(self.config.implication.clone());
        self.reduction = Reduction::new();

        let mut events = Vec::new();
        for path in self.config.stylesheets.clone() {
            match source::load_stylesheet(&self.config.root, &path) {
                Ok(css) => {
                    let new_selectors = self.ingest(&css);
                    log::info!(target: "chaff", "{path}: {new_selectors} selectors");
                    events.push(AuditEvent::StylesheetLoaded {
                        location: path,
                        new_selectors,
                    });
                }
                Err(error) => {
                    log::warn!(target: "chaff", "{error}");
                    events.push(AuditEvent::SourceFailed {
                        location: path,
                        error: error.to_string(),
                    });
                }
            }
        }

        if !self.config.rules.trim().is_empty() {
            let rules = self.config.rules.clone();
            let new_selectors = self.ingest(&rules);
            events.push(AuditEvent::ExtraRulesLoaded { new_selectors });
        }
        events
    }

    /// Parse one HTML document and run it through the tree.
    pub fn process(&mut self, html: &str) -> Vec<AuditEvent> {
        self.process_with(&HtmlDocument::parse(html))
    }

    /// Run one document, represented by any oracle, through the tree.
    pub fn process_with<O>(&mut self, oracle: &O) -> Vec<AuditEvent>
    where
        O: SelectorOracle + ?Sized,
    {
        let report = self.reduction.process(&self.tree, oracle);
        let mut events = Vec::new();

        for id in report.matched {
            if let Some(node) = self.tree.get(id).filter(|node| node.is_authored()) {
                events.push(AuditEvent::SelectorMatched {
                    selector: node.display_text().to_string(),
                });
            }
        }
        for (id, reason) in report.rejected {
            if let Some(node) = self.tree.get(id) {
                events.push(AuditEvent::SelectorRejected {
                    selector: node.display_text().to_string(),
                    reason,
                });
            }
        }
        events
    }

    /// [`Audit::reset`], then every configured page in order.
    pub fn run(&mut self) -> AuditRun {
        let mut events = self.reset();

        for page in self.config.pages.clone() {
            events.push(AuditEvent::PageStarted {
                location: page.label().to_string(),
            });
            match page.materialize(&self.config.root) {
                Ok(html) => events.extend(self.process(&html)),
                Err(error) => {
                    log::warn!(target: "chaff", "{error}");
                    events.push(AuditEvent::SourceFailed {
                        location: page.label().to_string(),
                        error: error.to_string(),
                    });
                }
            }
        }

        AuditRun {
            events,
            to_review: self.selectors_to_review(),
        }
    }

    /// Authored nodes in first-ingestion order with their classification.
    fn classified(&self) -> impl Iterator<Item = (&SelectorNode, SelectorState)> + '_ {
        self.tree.ids().filter_map(|id| {
            self.tree
                .get(id)
                .filter(|node| node.is_authored())
                .map(|node| (node, self.reduction.classify(&self.tree, id)))
        })
    }

    fn spellings_in(&self, state: SelectorState) -> Vec<String> {
        let mut seen = HashSet::new();
        self.classified()
            .filter(|&(_, s)| s == state)
            .flat_map(|(node, _)| node.original_selectors())
            .filter(|original| seen.insert(original.as_str()))
            .cloned()
            .collect()
    }

    /// Authored spellings no document has matched.
    #[must_use]
    pub fn unused_selectors(&self) -> Vec<String> {
        self.spellings_in(SelectorState::Unused)
    }

    /// Authored spellings the matcher could not evaluate, including the
    /// never-matched descendants of rejected selectors.
    #[must_use]
    pub fn unsupported_selectors(&self) -> Vec<String> {
        self.spellings_in(SelectorState::Unsupported)
    }

    /// Unused, then unsupported, deduplicated.
    #[must_use]
    pub fn selectors_to_review(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.unused_selectors()
            .into_iter()
            .chain(self.unsupported_selectors())
            .filter(|selector| seen.insert(selector.clone()))
            .collect()
    }

    /// Each spelling to review, unused first, with the declaration block it
    /// was authored with.
    #[must_use]
    pub fn unused_rules(&self) -> Vec<UnusedRule> {
        let mut rules = Vec::new();
        for state in [SelectorState::Unused, SelectorState::Unsupported] {
            for (node, _) in self.classified().filter(|&(_, s)| s == state) {
                for (selector, declarations) in
                    node.original_selectors().iter().zip(node.declarations())
                {
                    rules.push(UnusedRule {
                        selector: selector.clone(),
                        declarations: declarations.clone(),
                        state,
                    });
                }
            }
        }
        rules
    }

    /// Number of authored selector nodes.
    #[must_use]
    pub fn total_selectors(&self) -> usize {
        self.tree
            .ids()
            .filter(|&id| self.tree.get(id).is_some_and(SelectorNode::is_authored))
            .count()
    }

    /// Write the unused and unsupported counts, then each unsupported
    /// selector so it is not mistaken for dead CSS.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn report(&self, sink: &mut impl Write, palette: &Palette) -> io::Result<()> {
        let unsupported = self.unsupported_selectors();
        let summary = report::summary_line(
            self.unused_selectors().len(),
            unsupported.len(),
            self.total_selectors(),
        );
        writeln!(sink)?;
        writeln!(sink, "{}", palette.yellow(&summary))?;
        for selector in &unsupported {
            writeln!(sink, "  {}", palette.red(&format!("unsupported: {selector}")))?;
        }
        writeln!(sink)
    }

    /// Write the selectors to review, one per line, or as rules with their
    /// declarations. Unsupported ones follow a `/* unsupported */` line.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn dump(&self, sink: &mut impl Write, with_declarations: bool) -> io::Result<()> {
        if with_declarations {
            report::write_rules(sink, &self.unused_rules())
        } else {
            report::write_selectors(sink, &self.unused_selectors(), &self.unsupported_selectors())
        }
    }
}
