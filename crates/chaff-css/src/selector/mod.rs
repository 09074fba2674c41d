//! CSS selector parsing and matching
//!
//! This module implements selector parsing and matching per
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/), over the token
//! stream produced by [`crate::tokenizer`]. Anything outside the supported
//! subset is a [`SelectorError`] rather than a silent non-match, so callers
//! can tell "matches nothing" apart from "cannot be evaluated".

mod parse;

use chaff_dom::{DomTree, ElementData, NodeId, NodeType};
use thiserror::Error;

pub use parse::parse_selector;

/// Why a selector could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Nothing but whitespace.
    #[error("empty selector")]
    Empty,
    /// A token that cannot appear at this point.
    #[error("unexpected `{0}` in selector")]
    UnexpectedToken(String),
    /// The input ended inside `[...]` or `(...)`.
    #[error("unterminated attribute selector or argument list")]
    Unterminated,
    /// A pseudo-class this matcher does not evaluate, e.g. `:hover` or `:click`.
    #[error("unsupported pseudo-class `:{0}`")]
    UnsupportedPseudoClass(String),
    /// Any pseudo-element, e.g. `::before`.
    #[error("unsupported pseudo-element `::{0}`")]
    PseudoElement(String),
    /// `ns|name` syntax.
    #[error("namespaced selectors are not supported")]
    Namespace,
    /// `a, b` where a single selector was expected.
    #[error("selector lists are not supported here")]
    SelectorList,
    /// A malformed `an+b` argument.
    #[error("invalid an+b expression `{0}`")]
    InvalidNth(String),
}

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Examples: `div`, `p`, `span`
    Type(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Examples: `.highlight`, `.nav-item`
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ///
    /// Examples: `#main`, `#nav-bar`
    Id(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    Universal,

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    /// that can be decided from a static document.
    PseudoClass(PseudoClass),

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// Examples: `[href]`, `[type=text]`, `[lang|=en]`, `[src$=".png" i]`
    Attribute(AttributeSelector),
}

/// Pseudo-classes decidable from a static document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    /// "The :root pseudo-class represents an element that is the root of the document."
    Root,
    /// [§ 14.4.1 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    FirstChild,
    /// [§ 14.4.2 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,
    /// [§ 14.4.3 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,
    /// [§ 14.5.1 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,
    /// [§ 14.5.2 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,
    /// [§ 14.5.3 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
    OnlyOfType,
    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    /// "The :empty pseudo-class represents an element that has no children
    /// except, optionally, document white space characters."
    Empty,
    /// [§ 8.2 :link](https://www.w3.org/TR/selectors-4/#the-link-pseudo),
    /// also used for `:any-link`. Every link counts as unvisited.
    Link,
    /// [§ 13.1.1 :enabled](https://www.w3.org/TR/selectors-4/#enabled-pseudo)
    Enabled,
    /// [§ 13.1.1 :disabled](https://www.w3.org/TR/selectors-4/#disabled-pseudo)
    Disabled,
    /// [§ 13.3.3 :checked](https://www.w3.org/TR/selectors-4/#checked)
    Checked,
    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation), restricted
    /// to a single compound selector argument.
    Not(Box<CompoundSelector>),
    /// [§ 14.4.5 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    NthChild(Nth),
    /// [§ 14.4.6 :nth-last-child()](https://www.w3.org/TR/selectors-4/#the-nth-last-child-pseudo)
    NthLastChild(Nth),
    /// [§ 14.5.4 :nth-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-of-type-pseudo)
    NthOfType(Nth),
    /// [§ 14.5.5 :nth-last-of-type()](https://www.w3.org/TR/selectors-4/#the-nth-last-of-type-pseudo)
    NthLastOfType(Nth),
}

/// An `an+b` pattern.
///
/// [CSS Syntax § 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    /// Step.
    pub a: i32,
    /// Offset.
    pub b: i32,
}

impl Nth {
    /// Does the 1-based `index` satisfy `index = a*n + b` for some `n >= 0`?
    #[must_use]
    pub fn matches(self, index: i32) -> bool {
        let (a, diff) = (i64::from(self.a), i64::from(index) - i64::from(self.b));
        if a == 0 {
            return diff == 0;
        }
        diff % a == 0 && diff / a >= 0
    }
}

/// How an attribute value is compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeMatcher {
    /// `[attr]`
    Exists,
    /// `[attr=value]`
    Equals(String),
    /// `[attr~=value]` - one of the whitespace-separated words.
    Includes(String),
    /// `[attr|=value]` - exactly `value` or starting with `value-`.
    DashMatch(String),
    /// `[attr^=value]`
    PrefixMatch(String),
    /// `[attr$=value]`
    SuffixMatch(String),
    /// `[attr*=value]`
    SubstringMatch(String),
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Lowercased attribute name.
    pub name: String,
    /// Comparison applied to the value.
    pub matcher: AttributeMatcher,
    /// Set by the `i` flag: compare values ASCII case-insensitively.
    pub case_insensitive: bool,
}

impl AttributeSelector {
    fn matches(&self, element: &ElementData) -> bool {
        let Some(actual) = element.attr(&self.name) else {
            return false;
        };
        let fold = |v: &str| {
            if self.case_insensitive {
                v.to_ascii_lowercase()
            } else {
                v.to_string()
            }
        };
        let actual = fold(actual);
        let expected = fold;

        match &self.matcher {
            AttributeMatcher::Exists => true,
            AttributeMatcher::Equals(v) => actual == expected(v),
            AttributeMatcher::Includes(v) => {
                let v = expected(v);
                !v.is_empty() && actual.split_ascii_whitespace().any(|w| w == v)
            }
            AttributeMatcher::DashMatch(v) => {
                let v = expected(v);
                actual == v || actual.starts_with(&format!("{v}-"))
            }
            // "If "val" is the empty string then the selector does not represent anything."
            AttributeMatcher::PrefixMatch(v) => !v.is_empty() && actual.starts_with(&expected(v)),
            AttributeMatcher::SuffixMatch(v) => !v.is_empty() && actual.ends_with(&expected(v)),
            AttributeMatcher::SubstringMatch(v) => !v.is_empty() && actual.contains(&expected(v)),
        }
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The simple selectors, in source order.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B`: B has an ancestor A.
    Descendant,
    /// `A > B`: B's parent is A.
    Child,
    /// `A + B`: B's previous element sibling is A.
    NextSibling,
    /// `A ~ B`: some previous element sibling of B is A.
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// Example: `div.container > ul.nav li` is stored as
/// ```text
/// subject: [li]
/// combinators: [(Descendant, [ul.nav]), (Child, [div.container])]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector.
    pub subject: CompoundSelector,
    /// `(combinator, compound)` pairs going left from the subject.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
///
/// `(ids, classes/attributes/pseudo-classes, types)`, compared in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Specificity {
    /// Create a new specificity with (A, B, C) components.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self(a, b, c)
    }

    const fn add(self, other: Self) -> Self {
        Self(self.0 + other.0, self.1 + other.1, self.2 + other.2)
    }
}

/// A compiled selector ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    /// The complex selector (compound selectors with combinators).
    pub complex: ComplexSelector,
    /// The specificity of this selector.
    pub specificity: Specificity,
}

impl ParsedSelector {
    /// Does the selector match at least one element of `tree`?
    #[must_use]
    pub fn any_match(&self, tree: &DomTree) -> bool {
        tree.elements().any(|id| self.matches_in_tree(tree, id))
    }

    /// All elements of `tree` the selector matches, in document order.
    #[must_use]
    pub fn select(&self, tree: &DomTree) -> Vec<NodeId> {
        tree.elements()
            .filter(|&id| self.matches_in_tree(tree, id))
            .collect()
    }

    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Match against one element with full tree context.
    #[must_use]
    pub fn matches_in_tree(&self, tree: &DomTree, node_id: NodeId) -> bool {
        compound_matches_in_tree(&self.complex.subject, tree, node_id)
            && self.matches_combinators(tree, node_id, 0)
    }

    /// Satisfy combinators `index..` starting from the element matched by the
    /// previous compound. Descendant and subsequent-sibling steps try every
    /// candidate, so `a > b c` finds the right `b` even when a nearer
    /// ancestor also matches `b`.
    fn matches_combinators(&self, tree: &DomTree, current: NodeId, index: usize) -> bool {
        let Some((combinator, compound)) = self.complex.combinators.get(index) else {
            return true;
        };
        let next = |candidate: NodeId| {
            compound_matches_in_tree(compound, tree, candidate)
                && self.matches_combinators(tree, candidate, index + 1)
        };

        match combinator {
            Combinator::Descendant => tree.ancestors(current).any(next),
            Combinator::Child => tree.parent(current).is_some_and(next),
            Combinator::NextSibling => previous_element_sibling(tree, current).is_some_and(next),
            Combinator::SubsequentSibling => tree
                .preceding_siblings(current)
                .filter(|&s| tree.as_element(s).is_some())
                .any(next),
        }
    }
}

/// Check if a compound selector matches an element.
fn compound_matches_in_tree(compound: &CompoundSelector, tree: &DomTree, node_id: NodeId) -> bool {
    let Some(element) = tree.as_element(node_id) else {
        return false;
    };
    compound.simple_selectors.iter().all(|simple| match simple {
        SimpleSelector::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
        SimpleSelector::Class(class_name) => element.has_class(class_name),
        SimpleSelector::Id(id) => element.id() == Some(id.as_str()),
        SimpleSelector::Universal => true,
        SimpleSelector::Attribute(attribute) => attribute.matches(element),
        SimpleSelector::PseudoClass(pc) => pseudo_class_matches(pc, tree, node_id, element),
    })
}

const FORM_CONTROLS: &[&str] = &[
    "button", "fieldset", "input", "optgroup", "option", "select", "textarea",
];

/// Match a pseudo-class against an element with full tree context.
fn pseudo_class_matches(
    pc: &PseudoClass,
    tree: &DomTree,
    node_id: NodeId,
    element: &ElementData,
) -> bool {
    let same_type = |id: NodeId| {
        tree.as_element(id)
            .is_some_and(|e| e.tag_name == element.tag_name)
    };
    let is_element = |id: NodeId| tree.as_element(id).is_some();

    match pc {
        PseudoClass::Root => tree.document_element() == Some(node_id),
        PseudoClass::FirstChild => position_among(tree, node_id, is_element, false) == 1,
        PseudoClass::LastChild => position_among(tree, node_id, is_element, true) == 1,
        PseudoClass::OnlyChild => {
            position_among(tree, node_id, is_element, false) == 1
                && position_among(tree, node_id, is_element, true) == 1
        }
        PseudoClass::FirstOfType => position_among(tree, node_id, same_type, false) == 1,
        PseudoClass::LastOfType => position_among(tree, node_id, same_type, true) == 1,
        PseudoClass::OnlyOfType => {
            position_among(tree, node_id, same_type, false) == 1
                && position_among(tree, node_id, same_type, true) == 1
        }
        PseudoClass::NthChild(nth) => nth.matches(position_among(tree, node_id, is_element, false)),
        PseudoClass::NthLastChild(nth) => {
            nth.matches(position_among(tree, node_id, is_element, true))
        }
        PseudoClass::NthOfType(nth) => nth.matches(position_among(tree, node_id, same_type, false)),
        PseudoClass::NthLastOfType(nth) => {
            nth.matches(position_among(tree, node_id, same_type, true))
        }
        PseudoClass::Empty => tree.children(node_id).iter().all(|&c| {
            match tree.get(c).map(|n| &n.node_type) {
                Some(NodeType::Text(t)) => t.chars().all(crate::tokenizer::is_css_whitespace),
                Some(NodeType::Comment(_)) => true,
                _ => false,
            }
        }),
        PseudoClass::Link => {
            matches!(element.tag_name.as_str(), "a" | "area" | "link")
                && element.attr("href").is_some()
        }
        PseudoClass::Enabled => {
            FORM_CONTROLS.contains(&element.tag_name.as_str()) && element.attr("disabled").is_none()
        }
        PseudoClass::Disabled => {
            FORM_CONTROLS.contains(&element.tag_name.as_str()) && element.attr("disabled").is_some()
        }
        PseudoClass::Checked => match element.tag_name.as_str() {
            "input" => element.attr("checked").is_some(),
            "option" => element.attr("selected").is_some(),
            _ => false,
        },
        PseudoClass::Not(compound) => !compound_matches_in_tree(compound, tree, node_id),
    }
}

/// 1-based position of `node_id` among its siblings accepted by `counts`,
/// counting from the end when `from_end` is set. Elements without a parent
/// are treated as the only child.
fn position_among(
    tree: &DomTree,
    node_id: NodeId,
    counts: impl Fn(NodeId) -> bool,
    from_end: bool,
) -> i32 {
    let before = if from_end {
        tree.following_siblings(node_id).filter(|&s| counts(s)).count()
    } else {
        tree.preceding_siblings(node_id).filter(|&s| counts(s)).count()
    };
    i32::try_from(before).map_or(i32::MAX, |n| n.saturating_add(1))
}

/// The immediately preceding element sibling, skipping text and comments.
fn previous_element_sibling(tree: &DomTree, node_id: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(node_id)
        .find(|&sibling_id| tree.as_element(sibling_id).is_some())
}

impl ComplexSelector {
    /// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
    #[must_use]
    pub fn calculate_specificity(&self) -> Specificity {
        self.combinators
            .iter()
            .fold(compound_specificity(&self.subject), |spec, (_, compound)| {
                spec.add(compound_specificity(compound))
            })
    }
}

fn compound_specificity(compound: &CompoundSelector) -> Specificity {
    compound
        .simple_selectors
        .iter()
        .fold(Specificity::default(), |spec, simple| match simple {
            SimpleSelector::Id(_) => spec.add(Specificity(1, 0, 0)),
            // "The specificity of a :not() pseudo-class is replaced by the
            // specificity of the most specific complex selector in its argument."
            SimpleSelector::PseudoClass(PseudoClass::Not(inner)) => {
                spec.add(compound_specificity(inner))
            }
            SimpleSelector::Class(_) | SimpleSelector::PseudoClass(_) | SimpleSelector::Attribute(_) => {
                spec.add(Specificity(0, 1, 0))
            }
            SimpleSelector::Type(_) => spec.add(Specificity(0, 0, 1)),
            SimpleSelector::Universal => spec,
        })
}
