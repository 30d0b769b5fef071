//! Document - High-level document API
//!
//! Owns the node arena and exposes the derived views a page script expects:
//! `documentElement`, `head`, `body`, `title`, `baseURI`, `styleSheets`.
//! `documentElement` and `styleSheets` are computed on first use and then
//! kept for the lifetime of the document.

use std::cell::OnceCell;

use crate::node::{DoctypeData, Node};
use crate::query::{ElementQuery, NodeList};
use crate::stylesheet::{StyleSheet, StyleSheetList};
use crate::{DomError, DomResult, DomTree, ElementRef, HTML_NAMESPACE, NodeId};

/// Selector for the sheets listed in `document.styleSheets`
const STYLE_SHEET_SELECTOR: &str = "style,link[rel=stylesheet]:not([disabled])";

/// Rendering mode chosen by the parser from the doctype
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentMode {
    #[default]
    NoQuirks,
    LimitedQuirks,
    Quirks,
}

/// HTML Document
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    default_base_uri: String,
    mode: DocumentMode,
    document_element: OnceCell<NodeId>,
    style_sheets: OnceCell<StyleSheetList>,
}

impl Document {
    /// Create an empty document
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            tree: DomTree::new(),
            default_base_uri: base_uri.into(),
            mode: DocumentMode::default(),
            document_element: OnceCell::new(),
            style_sheets: OnceCell::new(),
        }
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn mode(&self) -> DocumentMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DocumentMode) {
        self.mode = mode;
    }

    /// `document.compatMode`
    pub fn compat_mode(&self) -> &'static str {
        match self.mode {
            DocumentMode::Quirks => "BackCompat",
            DocumentMode::NoQuirks | DocumentMode::LimitedQuirks => "CSS1Compat",
        }
    }

    /// Base URI used when the document has no `<base href>`
    pub fn default_base_uri(&self) -> &str {
        &self.default_base_uri
    }

    pub fn set_default_base_uri(&mut self, base_uri: impl Into<String>) {
        self.default_base_uri = base_uri.into();
    }

    /// `href` of the first `<base>` element, else the configured default
    pub fn base_uri(&self) -> &str {
        self.first_by_tag("base")
            .and_then(|base| self.tree.get_attribute(base, "href"))
            .unwrap_or(self.default_base_uri.as_str())
    }

    /// The doctype node's data, if the document has one
    pub fn doctype(&self) -> Option<&DoctypeData> {
        self.tree
            .children(self.root())
            .find_map(|id| self.tree.get(id).and_then(Node::as_doctype))
    }

    /// First element child of the document, cached once found
    pub fn document_element(&self) -> Option<NodeId> {
        if let Some(&id) = self.document_element.get() {
            return Some(id);
        }
        let found = self.tree.element_children(self.root()).next()?;
        Some(*self.document_element.get_or_init(|| found))
    }

    pub fn head(&self) -> Option<NodeId> {
        self.first_by_tag("head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.first_by_tag("body")
    }

    /// Text of the first `<title>`; a document without one is an error
    pub fn title(&self) -> DomResult<String> {
        self.first_by_tag("title")
            .map(|title| self.tree.text_content(title))
            .ok_or(DomError::MissingElement("title"))
    }

    fn first_by_tag(&self, name: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.root())
            .find(|&id| self.tree.element(id).is_some_and(|e| e.has_tag_name(name)))
    }

    /// Typed view of an element
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        ElementRef::new(&self.tree, id)
    }

    /// Create a detached element in the document element's namespace
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        let namespace = self
            .document_element()
            .and_then(|id| self.tree.element(id))
            .map_or_else(|| HTML_NAMESPACE.to_string(), |e| e.namespace_uri().to_string());
        self.tree.create_element_ns(&namespace, tag_name)
    }

    pub fn create_element_ns(&mut self, namespace: &str, tag_name: &str) -> NodeId {
        self.tree.create_element_ns(namespace, tag_name)
    }

    pub fn create_text_node(&mut self, data: &str) -> NodeId {
        self.tree.create_text(data)
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.tree.create_comment(data)
    }

    pub fn create_attribute(&mut self, name: &str) -> NodeId {
        self.tree.create_attribute(name)
    }

    pub fn get_elements_by_tag_name(&self, name: &str) -> NodeList {
        NodeList::from_vec(self.tree.get_elements_by_tag_name(self.root(), name))
    }

    pub fn get_elements_by_class_name(&self, classes: &str) -> NodeList {
        self.tree.get_elements_by_class_name(self.root(), classes)
    }

    /// First element (document order) with the given `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.get_element_by_id(self.root(), id)
    }

    pub fn query_selector(&self, selector: &str) -> DomResult<Option<NodeId>> {
        self.tree.query_selector(self.root(), selector)
    }

    pub fn query_selector_all(&self, selector: &str) -> DomResult<NodeList> {
        self.tree.query_selector_all(self.root(), selector)
    }

    /// `document.styleSheets`, computed on first access
    pub fn style_sheets(&self) -> &StyleSheetList {
        self.style_sheets.get_or_init(|| self.collect_style_sheets())
    }

    fn collect_style_sheets(&self) -> StyleSheetList {
        let mut list = StyleSheetList::new();
        let owners = match self.query_selector_all(STYLE_SHEET_SELECTOR) {
            Ok(owners) => owners,
            Err(err) => {
                tracing::error!(%err, "style sheet selector rejected");
                return list;
            }
        };

        for owner in owners {
            let Some(element) = self.tree.element(owner) else {
                continue;
            };
            if element.has_tag_name("link") {
                let href = element.get_attr("href").unwrap_or("");
                list.push(StyleSheet::external(owner, href));
                continue;
            }

            let text = self.tree.text_content(owner);
            let rules = headless_css::parse_stylesheet(&text).unwrap_or_else(|err| {
                tracing::warn!(%err, node = owner.index(), "unparsable <style> contents");
                Vec::new()
            });
            list.push(StyleSheet::inline(owner, rules));
        }

        tracing::debug!(count = list.length(), "collected style sheets");
        list
    }

    /// Attach an attribute node created by [`Document::create_attribute`]
    pub fn set_attribute_node(&mut self, element: NodeId, attr: NodeId) -> DomResult<()> {
        self.tree.set_attribute_node(element, attr).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new("http://example.com/page.html");
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        let tree = doc.tree_mut();
        tree.append_child(NodeId::ROOT, html).unwrap();
        tree.append_child(html, head).unwrap();
        tree.append_child(html, body).unwrap();
        (doc, html, head, body)
    }

    #[test]
    fn test_structure_accessors() {
        let (doc, html, head, body) = skeleton();
        assert_eq!(doc.document_element(), Some(html));
        assert_eq!(doc.head(), Some(head));
        assert_eq!(doc.body(), Some(body));
        assert!(doc.doctype().is_none());
        assert_eq!(doc.compat_mode(), "CSS1Compat");
    }

    #[test]
    fn test_title_requires_element() {
        let (mut doc, _, head, _) = skeleton();
        assert_eq!(doc.title(), Err(DomError::MissingElement("title")));

        let title = doc.create_element("title");
        let text = doc.create_text_node("Hello");
        doc.tree_mut().append_child(head, title).unwrap();
        doc.tree_mut().append_child(title, text).unwrap();
        assert_eq!(doc.title().unwrap(), "Hello");
    }

    #[test]
    fn test_base_uri() {
        let (mut doc, _, head, _) = skeleton();
        assert_eq!(doc.base_uri(), "http://example.com/page.html");

        let base = doc.create_element("base");
        doc.tree_mut().set_attribute(base, "href", "http://cdn.example.com/").unwrap();
        doc.tree_mut().append_child(head, base).unwrap();
        assert_eq!(doc.base_uri(), "http://cdn.example.com/");
    }

    #[test]
    fn test_create_element_uses_document_namespace() {
        let mut doc = Document::new("");
        let svg = doc.create_element_ns("http://www.w3.org/2000/svg", "svg");
        doc.tree_mut().append_child(NodeId::ROOT, svg).unwrap();

        let child = doc.create_element("rect");
        let data = doc.tree().element(child).unwrap();
        assert_eq!(data.namespace_uri(), "http://www.w3.org/2000/svg");
        assert!(doc.tree().parent(child).is_none());
    }

    #[test]
    fn test_style_sheets() {
        let (mut doc, _, head, _) = skeleton();
        let style = doc.create_element("style");
        let css = doc.create_text_node("p { color: red } div { margin: 0 }");
        let link = doc.create_element("link");
        let disabled = doc.create_element("link");
        let tree = doc.tree_mut();
        tree.append_child(head, style).unwrap();
        tree.append_child(style, css).unwrap();
        tree.append_child(head, link).unwrap();
        tree.append_child(head, disabled).unwrap();
        tree.set_attribute(link, "rel", "stylesheet").unwrap();
        tree.set_attribute(link, "href", "a.css").unwrap();
        tree.set_attribute(disabled, "rel", "stylesheet").unwrap();
        tree.set_attribute(disabled, "disabled", "").unwrap();

        let sheets = doc.style_sheets();
        assert_eq!(sheets.length(), 2);

        let inline = sheets.item(0).unwrap();
        assert_eq!(inline.owner_node(), style);
        assert_eq!(inline.css_rules().map(<[_]>::len), Some(2));

        let external = sheets.item(1).unwrap();
        assert_eq!(external.owner_node(), link);
        assert_eq!(external.href(), Some("a.css"));
        assert!(external.css_rules().is_none());

        assert!(std::ptr::eq(sheets, doc.style_sheets()));
    }
}
