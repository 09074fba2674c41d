//! Tree construction.
//!
//! A cut-down version of the HTML tree builder: a stack of open elements,
//! synthesized `html`/`head`/`body`, void elements, and the implied end tags
//! that change which selectors match (an unclosed `<p>` or `<li>` must not
//! swallow its following siblings).

use strum_macros::Display;

use chaff_common::warning::warn_once;
use chaff_dom::{AttributesMap, DomTree, ElementData, NodeId, NodeType};

use crate::tokenizer::{Attribute, Token};

/// Elements that never have content and are never pushed on the stack.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements that belong in `<head>` when seen before any body content.
const HEAD_ELEMENTS: &[&str] = &[
    "base", "link", "meta", "noscript", "script", "style", "template", "title",
];

/// Start tags that close an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "dir", "div", "dl",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "summary",
    "table", "ul",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements that bound "has an element in scope" searches.
const DEFAULT_SCOPE: &[&str] = &[
    "applet", "caption", "html", "marquee", "object", "table", "td", "template", "th",
];

/// Boundary for "has an element in table scope".
const TABLE_SCOPE: &[&str] = &["html", "table", "template"];

/// Where the builder is in the document outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// Nothing but doctypes and comments seen yet.
    Initial,
    /// `<head>` is open.
    InHead,
    /// `<head>` was closed explicitly, `<body>` not yet started.
    AfterHead,
    /// `<body>` is open.
    InBody,
    /// `</body>` or `</html>` was seen. Further content still goes in body.
    AfterBody,
}

/// Builds a [`DomTree`] from a token stream.
pub struct HTMLParser {
    tokens: Vec<Token>,
    tree: DomTree,
    open_elements: Vec<NodeId>,
    html: Option<NodeId>,
    head: Option<NodeId>,
    body: Option<NodeId>,
    mode: InsertionMode,
}

impl HTMLParser {
    /// Create a builder over `tokens`.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            tree: DomTree::new(),
            open_elements: Vec::new(),
            html: None,
            head: None,
            body: None,
            mode: InsertionMode::Initial,
        }
    }

    /// Build the tree. The result always has `html`, `head` and `body`.
    #[must_use]
    pub fn run(mut self) -> DomTree {
        let tokens = std::mem::take(&mut self.tokens);
        for token in tokens {
            match token {
                Token::Doctype { .. } => {}
                Token::Comment { data } => self.insert_node(NodeType::Comment(data)),
                Token::Character { data } => self.handle_text(data),
                Token::StartTag {
                    name,
                    self_closing,
                    attributes,
                } => self.handle_start_tag(&name, self_closing, attributes),
                Token::EndTag { name } => self.handle_end_tag(&name),
                Token::EndOfFile => break,
            }
        }
        let _ = self.ensure_body();
        log::trace!("tree built in mode {}, {} nodes", self.mode, self.tree.len());
        self.tree
    }

    fn current_node(&self) -> NodeId {
        self.open_elements.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn current_tag(&self) -> Option<&str> {
        self.tree
            .as_element(self.current_node())
            .map(|e| e.tag_name.as_str())
    }

    fn tag_of(&self, id: NodeId) -> &str {
        self.tree
            .as_element(id)
            .map_or("", |e| e.tag_name.as_str())
    }

    fn insert_node(&mut self, node_type: NodeType) {
        let parent = self.current_node();
        let id = self.tree.alloc(node_type);
        self.tree.append_child(parent, id);
    }

    fn create_element(&mut self, name: &str, attributes: Vec<Attribute>) -> NodeId {
        let mut attrs = AttributesMap::new();
        for attribute in attributes {
            let _ = attrs.entry(attribute.name).or_insert(attribute.value);
        }
        self.tree.alloc(NodeType::Element(ElementData {
            tag_name: name.to_string(),
            attrs,
        }))
    }

    /// Add attributes from a repeated `<html>` or `<body>` tag without
    /// overwriting existing ones.
    fn merge_attributes(&mut self, id: NodeId, attributes: Vec<Attribute>) {
        if let Some(data) = self.tree.as_element_mut(id) {
            for attribute in attributes {
                let _ = data.attrs.entry(attribute.name).or_insert(attribute.value);
            }
        }
    }

    fn ensure_html(&mut self) -> NodeId {
        if let Some(html) = self.html {
            return html;
        }
        let html = self.create_element("html", Vec::new());
        self.tree.append_child(NodeId::ROOT, html);
        self.open_elements.insert(0, html);
        self.html = Some(html);
        html
    }

    fn ensure_head(&mut self) -> NodeId {
        if let Some(head) = self.head {
            return head;
        }
        let html = self.ensure_html();
        let head = self.create_element("head", Vec::new());
        self.tree.append_child(html, head);
        self.head = Some(head);
        if self.body.is_none() {
            self.open_elements.truncate(1);
            self.open_elements.push(head);
            self.mode = InsertionMode::InHead;
        }
        head
    }

    fn ensure_body(&mut self) -> NodeId {
        if let Some(body) = self.body {
            return body;
        }
        let head = self.ensure_head();
        if self.open_elements.contains(&head) {
            self.pop_until_node(head);
        }
        let html = self.ensure_html();
        let body = self.create_element("body", Vec::new());
        self.tree.append_child(html, body);
        self.open_elements.push(body);
        self.body = Some(body);
        self.mode = InsertionMode::InBody;
        body
    }

    fn handle_text(&mut self, data: String) {
        let in_body = matches!(self.mode, InsertionMode::InBody | InsertionMode::AfterBody);
        let in_head_element = self.mode == InsertionMode::InHead
            && self.current_tag().is_some_and(|t| t != "head");
        if !in_body && !in_head_element {
            if data.chars().all(|c| c.is_ascii_whitespace()) {
                return;
            }
            let _ = self.ensure_body();
        }

        let parent = self.current_node();
        let last = self.tree.children(parent).last().copied();
        if let Some(NodeType::Text(existing)) =
            last.and_then(|id| self.tree.get_mut(id)).map(|n| &mut n.node_type)
        {
            existing.push_str(&data);
            return;
        }
        self.insert_node(NodeType::Text(data));
    }

    fn handle_start_tag(&mut self, name: &str, self_closing: bool, attributes: Vec<Attribute>) {
        match name {
            "html" => {
                let html = self.ensure_html();
                self.merge_attributes(html, attributes);
                return;
            }
            "head" => {
                if self.head.is_none() {
                    let head = self.ensure_head();
                    self.merge_attributes(head, attributes);
                }
                return;
            }
            "body" => {
                let existed = self.body.is_some();
                let body = self.ensure_body();
                if existed {
                    let _ = warn_once("HTML", "duplicate <body> start tag");
                }
                self.merge_attributes(body, attributes);
                return;
            }
            _ => {}
        }

        let head_content = HEAD_ELEMENTS.contains(&name)
            && matches!(self.mode, InsertionMode::Initial | InsertionMode::InHead);
        if head_content {
            let _ = self.ensure_head();
        } else {
            let _ = self.ensure_body();
            self.close_implied_elements(name);
        }

        let element = self.create_element(name, attributes);
        let parent = self.current_node();
        self.tree.append_child(parent, element);

        let in_foreign = self.open_elements.iter().any(|&id| {
            let tag = self.tag_of(id);
            tag == "svg" || tag == "math"
        });
        let closes_itself = VOID_ELEMENTS.contains(&name) || (self_closing && in_foreign);
        if !closes_itself {
            self.open_elements.push(element);
        }
    }

    /// Pop elements that a new `name` start tag implicitly ends.
    fn close_implied_elements(&mut self, name: &str) {
        if CLOSES_PARAGRAPH.contains(&name) && self.has_in_scope(&["p"], DEFAULT_SCOPE, &["button"]) {
            self.pop_until_tag("p");
        }
        match name {
            "li" if self.has_in_scope(&["li"], DEFAULT_SCOPE, &["ol", "ul"]) => self.pop_until_tag("li"),
            "dt" | "dd" if self.has_in_scope(&["dt", "dd"], DEFAULT_SCOPE, &["dl"]) => {
                self.pop_until_one_of(&["dt", "dd"]);
            }
            "option" | "optgroup" if self.current_tag() == Some("option") => {
                let _ = self.open_elements.pop();
            }
            "tr" if self.has_in_scope(&["tr"], TABLE_SCOPE, &[]) => {
                self.pop_until_tag("tr");
            }
            "td" | "th" if self.has_in_scope(&["td", "th"], TABLE_SCOPE, &["tr"]) => {
                self.pop_until_one_of(&["td", "th"]);
            }
            "tbody" | "thead" | "tfoot"
                if self.has_in_scope(&["tbody", "thead", "tfoot"], TABLE_SCOPE, &[]) =>
            {
                self.pop_until_one_of(&["tbody", "thead", "tfoot"]);
            }
            _ if HEADINGS.contains(&name)
                && self.current_tag().is_some_and(|t| HEADINGS.contains(&t)) =>
            {
                let _ = self.open_elements.pop();
            }
            _ => {}
        }
    }

    fn handle_end_tag(&mut self, name: &str) {
        match name {
            "html" | "body" => {
                let _ = self.ensure_body();
                self.mode = InsertionMode::AfterBody;
            }
            "head" => {
                let open_head = self
                    .head
                    .filter(|head| self.body.is_none() && self.open_elements.contains(head));
                if let Some(head) = open_head {
                    self.pop_until_node(head);
                    self.mode = InsertionMode::AfterHead;
                }
            }
            _ if self.has_in_scope(&[name], Self::end_tag_scope(name), &[]) => {
                self.pop_until_tag(name);
            }
            _ => {
                let _ = warn_once("HTML", &format!("ignoring unmatched end tag </{name}>"));
            }
        }
    }

    fn end_tag_scope(name: &str) -> &'static [&'static str] {
        match name {
            "caption" | "table" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr" => TABLE_SCOPE,
            _ => DEFAULT_SCOPE,
        }
    }

    /// Is an element named one of `targets` open above the nearest element
    /// of `boundary` or `extra_boundary`?
    fn has_in_scope(&self, targets: &[&str], boundary: &[&str], extra_boundary: &[&str]) -> bool {
        for &id in self.open_elements.iter().rev() {
            let tag = self.tag_of(id);
            if targets.contains(&tag) {
                return true;
            }
            if boundary.contains(&tag) || extra_boundary.contains(&tag) {
                return false;
            }
        }
        false
    }

    fn pop_until_tag(&mut self, tag_name: &str) {
        self.pop_until_one_of(&[tag_name]);
    }

    fn pop_until_one_of(&mut self, tag_names: &[&str]) {
        while let Some(id) = self.open_elements.pop() {
            if tag_names.contains(&self.tag_of(id)) {
                break;
            }
        }
    }

    fn pop_until_node(&mut self, target: NodeId) {
        while let Some(id) = self.open_elements.pop() {
            if id == target {
                break;
            }
        }
    }
}
