//! Tests for DOM tree construction and traversal.

use chaff_dom::{DomTree, ElementData, NodeId, NodeType};

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(tag)))
}

/// Builds `<html><body><div/><p/><span/></body></html>`.
fn sample_tree() -> (DomTree, [NodeId; 5]) {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    let body = alloc_element(&mut tree, "body");
    let div = alloc_element(&mut tree, "div");
    let p = alloc_element(&mut tree, "p");
    let span = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, body);
    tree.append_child(body, div);
    tree.append_child(body, p);
    tree.append_child(body, span);
    (tree, [html, body, div, p, span])
}

#[test]
fn test_new_tree_has_document() {
    let tree = DomTree::new();
    assert_eq!(tree.len(), 1);
    assert!(matches!(
        tree.get(NodeId::ROOT).map(|n| &n.node_type),
        Some(NodeType::Document)
    ));
    assert_eq!(tree.document_element(), None);
}

#[test]
fn test_append_links_siblings() {
    let (tree, [_, body, div, p, span]) = sample_tree();
    assert_eq!(tree.children(body), &[div, p, span]);
    assert_eq!(tree.prev_sibling(div), None);
    assert_eq!(tree.next_sibling(div), Some(p));
    assert_eq!(tree.prev_sibling(span), Some(p));
    assert_eq!(tree.parent(p), Some(body));
}

#[test]
fn test_ancestors_walk_to_document() {
    let (tree, [html, body, div, _, _]) = sample_tree();
    let ancestors: Vec<NodeId> = tree.ancestors(div).collect();
    assert_eq!(ancestors, vec![body, html, NodeId::ROOT]);
}

#[test]
fn test_sibling_iterators() {
    let (tree, [_, _, div, p, span]) = sample_tree();
    assert_eq!(tree.preceding_siblings(span).collect::<Vec<_>>(), vec![p, div]);
    assert_eq!(tree.following_siblings(div).collect::<Vec<_>>(), vec![p, span]);
    assert_eq!(tree.following_siblings(span).count(), 0);
}

#[test]
fn test_descendants_preorder() {
    let (mut tree, [html, body, div, p, span]) = sample_tree();
    let text = tree.alloc(NodeType::Text("hi".to_string()));
    tree.append_child(div, text);

    let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![html, body, div, text, p, span]);

    let elements: Vec<NodeId> = tree.elements().collect();
    assert_eq!(elements, vec![html, body, div, p, span]);
}

#[test]
fn test_document_element_and_body() {
    let (tree, [html, body, ..]) = sample_tree();
    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.body(), Some(body));
}

#[test]
fn test_element_classes_and_id() {
    let mut data = ElementData::new("DIV");
    let _ = data
        .attrs
        .insert("class".to_string(), "  nav\tmain  nav-item ".to_string());
    let _ = data.attrs.insert("id".to_string(), "top".to_string());

    assert_eq!(data.tag_name, "div");
    assert_eq!(data.classes().collect::<Vec<_>>(), vec!["nav", "main", "nav-item"]);
    assert!(data.has_class("main"));
    assert!(!data.has_class("na"));
    assert_eq!(data.id(), Some("top"));
    assert_eq!(data.attr("missing"), None);
}

#[test]
fn test_text_content() {
    let (mut tree, [_, body, div, p, _]) = sample_tree();
    let a = tree.alloc(NodeType::Text("one ".to_string()));
    let b = tree.alloc(NodeType::Text("two".to_string()));
    tree.append_child(div, a);
    tree.append_child(p, b);
    assert_eq!(tree.text_content(body), "one two");
}
