//! The selector implication tree.
//!
//! One node per canonical selector. A node is an ancestor of another exactly
//! when its selector is implied by the other's: `.hello` sits above
//! `.hello.world` (anything matching the latter matches the former), while
//! `.hello_world` stays beside `.hello`.
//!
//! Nodes live in an arena and are addressed by [`SelectorId`]. Children are
//! kept sorted by canonical text, so every selector a node could sit under
//! or adopt is found by binary search.

use std::collections::HashMap;

use chaff_css::Declaration;
use chaff_css::tokenizer::is_css_whitespace;
use serde::{Deserialize, Serialize};

/// Index of a node in a [`SelectorTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectorId(pub(crate) usize);

impl SelectorId {
    /// The root node, which has no selector and is never matched.
    pub const ROOT: Self = Self(0);

    /// Arena position, in creation order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Characters, beyond alphanumerics, `_` and non-ASCII, that continue a name.
///
/// `.hello` implies `.hello.world` but not `.hello-world`: the implication
/// boundary must fall on a character that cannot be part of the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImplicationPolicy {
    /// Extra word characters. `\` covers escaped name characters.
    pub word_chars: Vec<char>,
}

impl Default for ImplicationPolicy {
    fn default() -> Self {
        Self {
            word_chars: vec!['-', '\\'],
        }
    }
}

impl ImplicationPolicy {
    fn is_word_char(&self, c: char) -> bool {
        c.is_alphanumeric() || c == '_' || !c.is_ascii() || self.word_chars.contains(&c)
    }
}

/// Does every element matched by `specific` necessarily match `general`?
///
/// True when the two are equal, or when `specific` extends `general` at a
/// boundary: either `general` ends on a non-word character (`a[x]`,
/// `ul >`), or the first added character is one (`.hello` + `.world`).
///
/// Canonical text never ends on combinator whitespace, so a trailing space
/// in `general` terminates an escape (`.\31 `) and does not mark a boundary.
#[must_use]
pub fn implies(specific: &str, general: &str, policy: &ImplicationPolicy) -> bool {
    if specific == general {
        return true;
    }
    let Some(rest) = specific.strip_prefix(general) else {
        return false;
    };
    let Some(next) = rest.chars().next() else {
        return false;
    };
    if escape_continues(general, next) {
        return false;
    }
    if general
        .chars()
        .next_back()
        .is_some_and(|c| !policy.is_word_char(c) && !is_css_whitespace(c))
    {
        return true;
    }
    !policy.is_word_char(next)
}

/// Would `next` still belong to an escape that `text` ends in? True after a
/// lone `\`, and after `\` plus up to six hex digits when `next` is another
/// hex digit or the terminating whitespace.
fn escape_continues(text: &str, next: char) -> bool {
    let mut after_backslash = false;
    let mut hex_digits: Option<usize> = None;
    for c in text.chars() {
        if after_backslash {
            after_backslash = false;
            hex_digits = c.is_ascii_hexdigit().then_some(1);
            continue;
        }
        if let Some(n) = hex_digits {
            if n < 6 && c.is_ascii_hexdigit() {
                hex_digits = Some(n + 1);
                continue;
            }
            hex_digits = None;
            if is_css_whitespace(c) {
                continue;
            }
        }
        after_backslash = c == '\\';
    }
    if after_backslash {
        return true;
    }
    hex_digits.is_some_and(|n| is_css_whitespace(next) || (n < 6 && next.is_ascii_hexdigit()))
}

/// A canonical selector and everything that was authored as it.
#[derive(Debug, Clone)]
pub struct SelectorNode {
    canonical: String,
    original_selectors: Vec<String>,
    declarations: Vec<Vec<Declaration>>,
    parent: Option<SelectorId>,
    children: Vec<SelectorId>,
}

impl SelectorNode {
    fn new(canonical: String, parent: Option<SelectorId>) -> Self {
        Self {
            canonical,
            original_selectors: Vec::new(),
            declarations: Vec::new(),
            parent,
            children: Vec::new(),
        }
    }

    /// The canonical text, empty for the root.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Every authored spelling, in ingestion order, repeats included.
    #[must_use]
    pub fn original_selectors(&self) -> &[String] {
        &self.original_selectors
    }

    /// One declaration block per authored spelling.
    #[must_use]
    pub fn declarations(&self) -> &[Vec<Declaration>] {
        &self.declarations
    }

    /// False for synthetic prefix nodes and the root.
    #[must_use]
    pub fn is_authored(&self) -> bool {
        !self.original_selectors.is_empty()
    }

    /// Parent node, `None` only for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<SelectorId> {
        self.parent
    }

    /// Children, sorted by canonical text.
    #[must_use]
    pub fn children(&self) -> &[SelectorId] {
        &self.children
    }

    /// First authored spelling, or the canonical text for synthetic nodes.
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.original_selectors
            .first()
            .map_or(self.canonical.as_str(), String::as_str)
    }
}

/// Outcome of [`SelectorTree::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// The node now holding the canonical selector.
    pub id: SelectorId,
    /// False when the selector was already present.
    pub created: bool,
    /// Former siblings moved under the new node.
    pub adopted: Vec<SelectorId>,
}

/// Arena-backed implication forest under a single root.
#[derive(Debug, Clone)]
pub struct SelectorTree {
    nodes: Vec<SelectorNode>,
    index: HashMap<String, SelectorId>,
    policy: ImplicationPolicy,
}

impl Default for SelectorTree {
    fn default() -> Self {
        Self::new(ImplicationPolicy::default())
    }
}

impl SelectorTree {
    /// An empty tree holding only the root.
    #[must_use]
    pub fn new(policy: ImplicationPolicy) -> Self {
        Self {
            nodes: vec![SelectorNode::new(String::new(), None)],
            index: HashMap::new(),
            policy,
        }
    }

    /// The root id.
    #[must_use]
    pub const fn root(&self) -> SelectorId {
        SelectorId::ROOT
    }

    /// Node by id.
    #[must_use]
    pub fn get(&self, id: SelectorId) -> Option<&SelectorNode> {
        self.nodes.get(id.0)
    }

    /// Node holding `canonical`, if any.
    #[must_use]
    pub fn lookup(&self, canonical: &str) -> Option<SelectorId> {
        self.index.get(canonical).copied()
    }

    /// Number of selector nodes, root excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// True when only the root exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The implication policy in effect.
    #[must_use]
    pub const fn policy(&self) -> &ImplicationPolicy {
        &self.policy
    }

    /// Parent of `id`.
    #[must_use]
    pub fn parent(&self, id: SelectorId) -> Option<SelectorId> {
        self.get(id).and_then(SelectorNode::parent)
    }

    /// Children of `id`, sorted by canonical text.
    #[must_use]
    pub fn children(&self, id: SelectorId) -> &[SelectorId] {
        self.get(id)
            .map(SelectorNode::children)
            .unwrap_or_default()
    }

    /// All selector ids in creation order, root excluded.
    pub fn ids(&self) -> impl Iterator<Item = SelectorId> + '_ {
        (1..self.nodes.len()).map(SelectorId)
    }

    /// Proper ancestors of `id`, nearest first, ending with the root.
    pub fn ancestors(&self, id: SelectorId) -> impl Iterator<Item = SelectorId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// `id` and everything below it, pre-order.
    #[must_use]
    pub fn and_descendants(&self, id: SelectorId) -> Vec<SelectorId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Does `specific` imply `general` under this tree's policy?
    #[must_use]
    pub fn implies(&self, specific: &str, general: &str) -> bool {
        implies(specific, general, &self.policy)
    }

    /// Find or create the node for `canonical`.
    ///
    /// A new node goes under the deepest existing node it implies, and takes
    /// over those of its new siblings that imply it.
    ///
    /// # Panics
    ///
    /// Panics if `canonical` is empty; the empty key belongs to the root.
    pub fn insert(&mut self, canonical: &str) -> Insertion {
        assert!(
            !canonical.is_empty(),
            "empty canonical selector cannot be inserted"
        );

        if let Some(id) = self.lookup(canonical) {
            return Insertion {
                id,
                created: false,
                adopted: Vec::new(),
            };
        }

        let parent = self.deepest_implied(canonical);
        let id = SelectorId(self.nodes.len());

        let siblings = &self.nodes[parent.0].children;
        let at = siblings.partition_point(|&s| self.nodes[s.0].canonical.as_str() < canonical);
        let extends = siblings[at..]
            .iter()
            .take_while(|&&s| self.nodes[s.0].canonical.starts_with(canonical))
            .count();
        let (adopted, kept): (Vec<SelectorId>, Vec<SelectorId>) = siblings[at..at + extends]
            .iter()
            .copied()
            .partition(|&s| self.implies(&self.nodes[s.0].canonical, canonical));

        let mut children = self.nodes[parent.0].children[..at].to_vec();
        children.push(id);
        children.extend(kept);
        children.extend_from_slice(&self.nodes[parent.0].children[at + extends..]);
        self.nodes[parent.0].children = children;

        for &child in &adopted {
            self.nodes[child.0].parent = Some(id);
        }
        let mut node = SelectorNode::new(canonical.to_string(), Some(parent));
        node.children.clone_from(&adopted);
        self.nodes.push(node);
        let _ = self.index.insert(canonical.to_string(), id);

        log::trace!(target: "chaff", "inserted {canonical:?} under {parent:?}, adopting {}", adopted.len());
        Insertion {
            id,
            created: true,
            adopted,
        }
    }

    /// Record one authored spelling of the selector at `id`. Returns true if
    /// this made a synthetic node authored.
    pub fn record_original(
        &mut self,
        id: SelectorId,
        original: &str,
        declarations: Vec<Declaration>,
    ) -> bool {
        if id == SelectorId::ROOT {
            return false;
        }
        let Some(node) = self.nodes.get_mut(id.0) else {
            return false;
        };
        let was_authored = node.is_authored();
        node.original_selectors.push(original.to_string());
        node.declarations.push(declarations);
        !was_authored
    }

    /// Walk down from the root while some child is implied by `canonical`.
    fn deepest_implied(&self, canonical: &str) -> SelectorId {
        let mut current = SelectorId::ROOT;
        'descend: loop {
            let children = &self.nodes[current.0].children;
            for (end, _) in canonical.char_indices().skip(1) {
                let prefix = &canonical[..end];
                if !self.implies(canonical, prefix) {
                    continue;
                }
                if let Ok(found) =
                    children.binary_search_by(|&c| self.nodes[c.0].canonical.as_str().cmp(prefix))
                {
                    current = children[found];
                    continue 'descend;
                }
            }
            return current;
        }
    }
}
