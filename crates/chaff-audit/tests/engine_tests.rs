//! Tests for progressive reduction.

use std::cell::RefCell;

use chaff_audit::{MatchOutcome, Reduction, SelectorId, SelectorState, SelectorTree};

/// Insert `selectors` in order, keeping the reduction in step.
fn build(selectors: &[&str]) -> (SelectorTree, Reduction) {
    let mut tree = SelectorTree::default();
    let mut reduction = Reduction::new();
    for selector in selectors {
        let insertion = tree.insert(selector);
        reduction.on_insert(&tree, &insertion);
    }
    (tree, reduction)
}

/// An oracle that matches exactly `present` and rejects `rejected`.
fn document<'a>(
    present: &'a [&'a str],
    rejected: &'a [&'a str],
) -> impl Fn(&str) -> MatchOutcome + 'a {
    move |selector: &str| {
        if rejected.contains(&selector) {
            MatchOutcome::Unsupported(format!("cannot evaluate {selector}"))
        } else if present.contains(&selector) {
            MatchOutcome::Matched
        } else {
            MatchOutcome::NotMatched
        }
    }
}

fn id(tree: &SelectorTree, selector: &str) -> SelectorId {
    tree.lookup(selector).unwrap()
}

const HIERARCHY: &[&str] = &[
    "#foo",
    "#foo .bar",
    "#foo .bar .baz",
    ".other",
    ".other .x",
    ".other .y",
];

#[test]
fn test_initial_candidates_are_top_level() {
    let (tree, reduction) = build(HIERARCHY);
    let candidates: Vec<_> = reduction.candidates().collect();
    assert_eq!(candidates, vec![id(&tree, "#foo"), id(&tree, ".other")]);
}

#[test]
fn test_unmatched_ancestor_prunes_subtree() {
    let (tree, mut reduction) = build(HIERARCHY);
    let calls = RefCell::new(Vec::new());
    let oracle = |selector: &str| {
        calls.borrow_mut().push(selector.to_string());
        MatchOutcome::NotMatched
    };

    let report = reduction.process(&tree, &oracle);
    assert_eq!(calls.into_inner(), vec!["#foo", ".other"]);
    assert_eq!(report.tested.len(), 2);
    assert!(report.tested.len() < tree.len());
    assert!(report.matched.is_empty());
}

#[test]
fn test_match_descends_within_document() {
    let (tree, mut reduction) = build(HIERARCHY);
    let report = reduction.process(&tree, &document(&["#foo", "#foo .bar"], &[]));

    assert_eq!(report.matched, vec![id(&tree, "#foo"), id(&tree, "#foo .bar")]);
    assert_eq!(reduction.state(id(&tree, "#foo")), SelectorState::Used);
    assert_eq!(reduction.state(id(&tree, "#foo .bar")), SelectorState::Used);
    assert_eq!(reduction.state(id(&tree, "#foo .bar .baz")), SelectorState::Unused);
    // `.baz` was tested because `.bar` matched, `.other`'s children were not.
    assert!(report.tested.contains(&id(&tree, "#foo .bar .baz")));
    assert!(!report.tested.contains(&id(&tree, ".other .x")));
}

#[test]
fn test_used_nodes_are_not_retested() {
    let (tree, mut reduction) = build(HIERARCHY);
    let first = reduction.process(&tree, &document(&["#foo", "#foo .bar"], &[]));
    assert_eq!(first.tested.len(), 4);

    let second = reduction.process(&tree, &document(&["#foo", "#foo .bar"], &[]));
    assert_eq!(
        second.tested,
        vec![id(&tree, "#foo .bar .baz"), id(&tree, ".other")]
    );
    assert!(second.matched.is_empty());
}

#[test]
fn test_later_document_reaches_deeper() {
    let (tree, mut reduction) = build(HIERARCHY);
    let _ = reduction.process(&tree, &document(&["#foo"], &[]));
    let _ = reduction.process(&tree, &document(&["#foo", "#foo .bar", "#foo .bar .baz"], &[]));
    assert_eq!(
        reduction.state(id(&tree, "#foo .bar .baz")),
        SelectorState::Used
    );
}

#[test]
fn test_rejection_is_terminal() {
    let (tree, mut reduction) = build(&["*:click", "*:click .inner", ".fine"]);
    let report = reduction.process(&tree, &document(&[".fine"], &["*:click"]));

    let click = id(&tree, "*:click");
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].0, click);
    assert_eq!(reduction.state(click), SelectorState::Unsupported);
    assert!(reduction.candidates().all(|c| c != click));

    // The never-tested child is classified with its rejected ancestor.
    let inner = id(&tree, "*:click .inner");
    assert_eq!(reduction.state(inner), SelectorState::Unused);
    assert_eq!(reduction.classify(&tree, inner), SelectorState::Unsupported);

    let again = reduction.process(&tree, &document(&[], &["*:click"]));
    assert!(again.tested.is_empty());
}

#[test]
fn test_mark_unsupported_skips_testing() {
    let (tree, mut reduction) = build(&["@font-face", ".a"]);
    reduction.mark_unsupported(id(&tree, "@font-face"));
    let report = reduction.process(&tree, &document(&[], &[]));
    assert_eq!(report.tested, vec![id(&tree, ".a")]);
}

#[test]
fn test_late_insert_under_used_node_is_candidate() {
    let (mut tree, mut reduction) = build(&[".a"]);
    let _ = reduction.process(&tree, &document(&[".a"], &[]));
    assert_eq!(reduction.candidates().count(), 0);

    let insertion = tree.insert(".a .b");
    reduction.on_insert(&tree, &insertion);
    assert_eq!(reduction.candidates().collect::<Vec<_>>(), vec![insertion.id]);
}

#[test]
fn test_late_insert_under_unused_node_waits() {
    let (mut tree, mut reduction) = build(&[".a"]);
    let _ = reduction.process(&tree, &document(&[], &[]));

    let insertion = tree.insert(".a .b");
    reduction.on_insert(&tree, &insertion);
    assert_eq!(reduction.candidates().collect::<Vec<_>>(), vec![id(&tree, ".a")]);
}

#[test]
fn test_adopting_a_used_node_implies_use() {
    let (mut tree, mut reduction) = build(&[".x .y", ".x .z"]);
    let _ = reduction.process(&tree, &document(&[".x .y"], &[]));

    let insertion = tree.insert(".x");
    reduction.on_insert(&tree, &insertion);

    assert_eq!(reduction.state(insertion.id), SelectorState::Used);
    // `.x .z` is still Unused and its new parent is Used.
    assert_eq!(
        reduction.candidates().collect::<Vec<_>>(),
        vec![id(&tree, ".x .z")]
    );
}

#[test]
fn test_adopted_candidates_leave_the_frontier() {
    let (mut tree, mut reduction) = build(&[".p .q", ".p .r"]);
    assert_eq!(reduction.candidates().count(), 2);

    let insertion = tree.insert(".p");
    reduction.on_insert(&tree, &insertion);
    assert_eq!(reduction.candidates().collect::<Vec<_>>(), vec![insertion.id]);
}
