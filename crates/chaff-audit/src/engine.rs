//! Progressive reduction.
//!
//! Every selector starts Unused. Per document, only the candidates (Unused
//! nodes directly under the root or under a Used node) are tested. A match
//! makes the node Used and queues its children for the same document; a
//! non-match prunes the whole subtree for this document, since nothing more
//! specific can match where its ancestor does not. Nodes only ever leave
//! Unused, so the candidate set shrinks monotonically across documents.

use std::collections::BTreeSet;

use strum_macros::Display;

use crate::oracle::{MatchOutcome, SelectorOracle};
use crate::tree::{Insertion, SelectorId, SelectorTree};

/// Classification of a selector node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum SelectorState {
    /// Not matched by any document so far.
    #[default]
    Unused,
    /// Matched by at least one document.
    Used,
    /// Rejected by the matcher, or an at-rule.
    Unsupported,
}

/// What one document did to the partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentReport {
    /// Every node handed to the oracle, in test order.
    pub tested: Vec<SelectorId>,
    /// Nodes that became Used.
    pub matched: Vec<SelectorId>,
    /// Nodes that became Unsupported, with the matcher's reason.
    pub rejected: Vec<(SelectorId, String)>,
}

/// Per-node state plus the candidate frontier.
#[derive(Debug, Clone, Default)]
pub struct Reduction {
    states: Vec<SelectorState>,
    candidates: BTreeSet<SelectorId>,
}

impl Reduction {
    /// Fresh state: everything Unused, nothing a candidate yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Own state of `id`, not taking ancestors into account.
    #[must_use]
    pub fn state(&self, id: SelectorId) -> SelectorState {
        self.states.get(id.index()).copied().unwrap_or_default()
    }

    fn set_state(&mut self, id: SelectorId, state: SelectorState) {
        if self.states.len() <= id.index() {
            self.states.resize(id.index() + 1, SelectorState::Unused);
        }
        self.states[id.index()] = state;
    }

    /// Nodes the next document starts from, in id order.
    pub fn candidates(&self) -> impl Iterator<Item = SelectorId> + '_ {
        self.candidates.iter().copied()
    }

    fn is_open_parent(&self, id: Option<SelectorId>) -> bool {
        id.is_some_and(|parent| {
            parent == SelectorId::ROOT || self.state(parent) == SelectorState::Used
        })
    }

    /// Bring the frontier up to date after a tree insertion.
    ///
    /// Adopted nodes stop being candidates, since their new parent has not
    /// matched. If one of them is already Used, the new node is Used by
    /// implication and its other adopted children become candidates again.
    pub fn on_insert(&mut self, tree: &SelectorTree, insertion: &Insertion) {
        if !insertion.created {
            return;
        }
        let id = insertion.id;
        for adopted in &insertion.adopted {
            let _ = self.candidates.remove(adopted);
        }

        let implied_used = insertion
            .adopted
            .iter()
            .any(|&child| self.state(child) == SelectorState::Used);
        if implied_used {
            self.set_state(id, SelectorState::Used);
            for &child in &insertion.adopted {
                if self.state(child) == SelectorState::Unused {
                    let _ = self.candidates.insert(child);
                }
            }
        } else if self.is_open_parent(tree.parent(id)) {
            let _ = self.candidates.insert(id);
        }
    }

    /// Move `id` to Unsupported without testing it.
    pub fn mark_unsupported(&mut self, id: SelectorId) {
        self.set_state(id, SelectorState::Unsupported);
        let _ = self.candidates.remove(&id);
    }

    /// Run one document through the tree.
    pub fn process<O>(&mut self, tree: &SelectorTree, oracle: &O) -> DocumentReport
    where
        O: SelectorOracle + ?Sized,
    {
        let mut report = DocumentReport::default();
        let mut frontier: Vec<SelectorId> = self.candidates().collect();

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for id in frontier {
                if self.state(id) != SelectorState::Unused {
                    continue;
                }
                let Some(node) = tree.get(id) else {
                    continue;
                };
                report.tested.push(id);

                match oracle.test(node.canonical()) {
                    MatchOutcome::Matched => {
                        self.set_state(id, SelectorState::Used);
                        let _ = self.candidates.remove(&id);
                        for &child in node.children() {
                            if self.state(child) == SelectorState::Unused {
                                let _ = self.candidates.insert(child);
                                next.push(child);
                            }
                        }
                        report.matched.push(id);
                    }
                    MatchOutcome::NotMatched => {}
                    MatchOutcome::Unsupported(reason) => {
                        log::debug!(target: "chaff", "{} rejected: {reason}", node.canonical());
                        self.mark_unsupported(id);
                        report.rejected.push((id, reason));
                    }
                }
            }
            frontier = next;
        }

        log::debug!(
            target: "chaff",
            "tested {} selectors, {} matched, {} rejected",
            report.tested.len(),
            report.matched.len(),
            report.rejected.len()
        );
        report
    }

    /// Effective classification: Used if matched, otherwise Unsupported if
    /// the node or any ancestor was rejected, otherwise Unused.
    #[must_use]
    pub fn classify(&self, tree: &SelectorTree, id: SelectorId) -> SelectorState {
        match self.state(id) {
            SelectorState::Used => SelectorState::Used,
            SelectorState::Unsupported => SelectorState::Unsupported,
            SelectorState::Unused => {
                if tree
                    .ancestors(id)
                    .any(|ancestor| self.state(ancestor) == SelectorState::Unsupported)
                {
                    SelectorState::Unsupported
                } else {
                    SelectorState::Unused
                }
            }
        }
    }
}
