//! Tests for tree construction.

use chaff_dom::{DomTree, NodeId};
use chaff_html::parse_document;

/// Tag names of the element children of `id`.
fn child_tags(tree: &DomTree, id: NodeId) -> Vec<String> {
    tree.children(id)
        .iter()
        .filter_map(|&c| tree.as_element(c).map(|e| e.tag_name.clone()))
        .collect()
}

/// First element with the given tag, in document order.
fn find(tree: &DomTree, tag: &str) -> NodeId {
    tree.elements()
        .find(|&id| tree.as_element(id).is_some_and(|e| e.tag_name == tag))
        .unwrap_or_else(|| panic!("no <{tag}> in tree"))
}

#[test]
fn test_empty_document_gets_skeleton() {
    let tree = parse_document("");
    let html = tree.document_element().unwrap();
    assert_eq!(child_tags(&tree, html), vec!["head", "body"]);
}

#[test]
fn test_fragment_goes_into_body() {
    let tree = parse_document("<div id=foo><span class=bar></span></div>");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["div"]);
    let div = find(&tree, "div");
    assert_eq!(tree.as_element(div).unwrap().id(), Some("foo"));
    assert_eq!(child_tags(&tree, div), vec!["span"]);
}

#[test]
fn test_head_elements_go_into_head() {
    let tree = parse_document("<title>T</title><link rel=stylesheet><p>x</p>");
    let html = tree.document_element().unwrap();
    let head = find(&tree, "head");
    assert_eq!(child_tags(&tree, head), vec!["title", "link"]);
    assert_eq!(child_tags(&tree, html), vec!["head", "body"]);
    assert_eq!(child_tags(&tree, tree.body().unwrap()), vec!["p"]);
}

#[test]
fn test_explicit_skeleton_is_not_duplicated() {
    let tree = parse_document(
        "<!doctype html><html lang=en><head><meta charset=utf-8></head>\
         <body class=home><p>hi</p></body></html>",
    );
    let html = tree.document_element().unwrap();
    assert_eq!(tree.as_element(html).unwrap().attr("lang"), Some("en"));
    assert_eq!(child_tags(&tree, html), vec!["head", "body"]);
    let body = tree.body().unwrap();
    assert!(tree.as_element(body).unwrap().has_class("home"));
}

#[test]
fn test_void_elements_do_not_nest() {
    let tree = parse_document("<p>a<br>b<img src=x>c</p>");
    let p = find(&tree, "p");
    assert_eq!(child_tags(&tree, p), vec!["br", "img"]);
    assert!(tree.children(find(&tree, "br")).is_empty());
}

#[test]
fn test_paragraph_closed_by_block() {
    let tree = parse_document("<p>one<div>two</div>");
    let body = tree.body().unwrap();
    assert_eq!(child_tags(&tree, body), vec!["p", "div"]);
}

#[test]
fn test_unclosed_list_items_are_siblings() {
    let tree = parse_document("<ul><li>a<li>b<li>c</ul><p>after</p>");
    let ul = find(&tree, "ul");
    assert_eq!(child_tags(&tree, ul), vec!["li", "li", "li"]);
    assert_eq!(child_tags(&tree, tree.body().unwrap()), vec!["ul", "p"]);
}

#[test]
fn test_nested_list_keeps_outer_item_open() {
    let tree = parse_document("<ul><li>a<ul><li>b</ul><li>c</ul>");
    let outer = find(&tree, "ul");
    assert_eq!(child_tags(&tree, outer), vec!["li", "li"]);
}

#[test]
fn test_table_cells() {
    let tree = parse_document("<table><tr><td>1<td>2<tr><td>3</table>");
    let table = find(&tree, "table");
    assert_eq!(child_tags(&tree, table), vec!["tr", "tr"]);
    let first_row = find(&tree, "tr");
    assert_eq!(child_tags(&tree, first_row), vec!["td", "td"]);
}

#[test]
fn test_unmatched_end_tag_is_ignored() {
    let tree = parse_document("<div></span><p>x</p></div>");
    let div = find(&tree, "div");
    assert_eq!(child_tags(&tree, div), vec!["p"]);
}

#[test]
fn test_adjacent_text_is_merged() {
    let tree = parse_document("<p>a &amp; b</p>");
    let p = find(&tree, "p");
    assert_eq!(tree.children(p).len(), 1);
    assert_eq!(tree.text_content(p), "a & b");
}

#[test]
fn test_svg_self_closing_children() {
    let tree = parse_document("<svg><path/><circle/></svg>");
    let svg = find(&tree, "svg");
    assert_eq!(child_tags(&tree, svg), vec!["path", "circle"]);
}

#[test]
fn test_comments_are_kept() {
    let tree = parse_document("<div><!-- note --></div>");
    let div = find(&tree, "div");
    assert_eq!(tree.children(div).len(), 1);
    assert!(child_tags(&tree, div).is_empty());
}
