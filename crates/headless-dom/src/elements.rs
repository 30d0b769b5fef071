//! Element Variants
//!
//! Tag-name dispatch into a closed set of element shapes. Every variant is
//! structurally an element; they only differ in the convenience accessors
//! exposed through the typed views below.

use std::ops::Deref;

use crate::node::ElementData;
use crate::{DomTree, NamedNodeMap, NodeId};

/// Element shape selected from the upper-cased tag name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Anchor,
    Image,
    Link,
    Form,
    Button,
    Input,
    Select,
    Option,
    TextArea,
    Generic,
}

impl ElementKind {
    /// Dispatch table from tag name to variant; unknown tags are generic
    pub fn from_tag_name(tag_name: &str) -> Self {
        match tag_name {
            "A" => Self::Anchor,
            "IMG" => Self::Image,
            "LINK" => Self::Link,
            "FORM" => Self::Form,
            "BUTTON" => Self::Button,
            "INPUT" => Self::Input,
            "SELECT" => Self::Select,
            "OPTION" => Self::Option,
            "TEXTAREA" => Self::TextArea,
            _ => Self::Generic,
        }
    }

    /// Whether the element counts as a form control for `form.elements`
    pub fn is_form_control(self) -> bool {
        matches!(
            self,
            Self::Button | Self::Input | Self::Select | Self::TextArea
        )
    }
}

/// Borrowed view of an element inside a tree
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    tree: &'a DomTree,
    id: NodeId,
    data: &'a ElementData,
}

impl<'a> ElementRef<'a> {
    /// View `id` as an element; `None` for other node kinds
    pub fn new(tree: &'a DomTree, id: NodeId) -> Option<Self> {
        let data = tree.element(id)?;
        Some(Self { tree, id, data })
    }

    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a DomTree {
        self.tree
    }

    pub fn data(&self) -> &'a ElementData {
        self.data
    }

    pub fn kind(&self) -> ElementKind {
        self.data.kind()
    }

    pub fn tag_name(&self) -> &'a str {
        self.data.tag_name()
    }

    pub fn local_name(&self) -> &'a str {
        self.data.local_name()
    }

    pub fn namespace_uri(&self) -> &'a str {
        self.data.namespace_uri()
    }

    /// `id` attribute, empty when absent
    pub fn id(&self) -> &'a str {
        self.data.id().unwrap_or("")
    }

    /// `className`, empty when absent
    pub fn class_name(&self) -> &'a str {
        self.data.get_attr("class").unwrap_or("")
    }

    pub fn get_attribute(&self, name: &str) -> Option<&'a str> {
        self.data.get_attr(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.data.attributes().has_attribute(name)
    }

    pub fn attributes(&self) -> &'a NamedNodeMap {
        self.data.attributes()
    }

    pub fn text_content(&self) -> String {
        self.tree.text_content(self.id)
    }

    pub fn parent_node(&self) -> Option<NodeId> {
        self.tree.parent(self.id)
    }

    pub fn child_nodes(&self) -> Vec<NodeId> {
        self.tree.children(self.id).collect()
    }

    fn attr_or_empty(&self, name: &str) -> &'a str {
        self.data.get_attr(name).unwrap_or("")
    }

    fn as_kind<T>(&self, kind: ElementKind, wrap: fn(ElementRef<'a>) -> T) -> Option<T> {
        (self.kind() == kind).then(|| wrap(*self))
    }

    pub fn as_anchor(&self) -> Option<AnchorElement<'a>> {
        self.as_kind(ElementKind::Anchor, AnchorElement)
    }

    pub fn as_image(&self) -> Option<ImageElement<'a>> {
        self.as_kind(ElementKind::Image, ImageElement)
    }

    pub fn as_link(&self) -> Option<LinkElement<'a>> {
        self.as_kind(ElementKind::Link, LinkElement)
    }

    pub fn as_form(&self) -> Option<FormElement<'a>> {
        self.as_kind(ElementKind::Form, FormElement)
    }

    pub fn as_button(&self) -> Option<ButtonElement<'a>> {
        self.as_kind(ElementKind::Button, ButtonElement)
    }

    pub fn as_input(&self) -> Option<InputElement<'a>> {
        self.as_kind(ElementKind::Input, InputElement)
    }

    pub fn as_select(&self) -> Option<SelectElement<'a>> {
        self.as_kind(ElementKind::Select, SelectElement)
    }

    pub fn as_option(&self) -> Option<OptionElement<'a>> {
        self.as_kind(ElementKind::Option, OptionElement)
    }

    pub fn as_text_area(&self) -> Option<TextAreaElement<'a>> {
        self.as_kind(ElementKind::TextArea, TextAreaElement)
    }
}

macro_rules! element_views {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name<'a>(ElementRef<'a>);

            impl<'a> Deref for $name<'a> {
                type Target = ElementRef<'a>;

                fn deref(&self) -> &ElementRef<'a> {
                    &self.0
                }
            }
        )*
    };
}

element_views! {
    /// `<a>`
    AnchorElement;
    /// `<img>`
    ImageElement;
    /// `<link>`
    LinkElement;
    /// `<form>`
    FormElement;
    /// `<button>`
    ButtonElement;
    /// `<input>`
    InputElement;
    /// `<select>`
    SelectElement;
    /// `<option>`
    OptionElement;
    /// `<textarea>`
    TextAreaElement;
}

impl<'a> AnchorElement<'a> {
    pub fn href(&self) -> &'a str {
        self.attr_or_empty("href")
    }

    pub fn target(&self) -> &'a str {
        self.attr_or_empty("target")
    }

    pub fn rel(&self) -> &'a str {
        self.attr_or_empty("rel")
    }
}

impl<'a> ImageElement<'a> {
    pub fn src(&self) -> &'a str {
        self.attr_or_empty("src")
    }

    pub fn alt(&self) -> &'a str {
        self.attr_or_empty("alt")
    }
}

impl<'a> LinkElement<'a> {
    pub fn href(&self) -> &'a str {
        self.attr_or_empty("href")
    }

    pub fn rel(&self) -> &'a str {
        self.attr_or_empty("rel")
    }

    pub fn media(&self) -> &'a str {
        self.attr_or_empty("media")
    }

    pub fn disabled(&self) -> bool {
        self.has_attribute("disabled")
    }
}

impl<'a> FormElement<'a> {
    pub fn action(&self) -> &'a str {
        self.attr_or_empty("action")
    }

    /// Submission method, lower-cased, `get` by default
    pub fn method(&self) -> String {
        match self.get_attribute("method") {
            Some(m) if m.eq_ignore_ascii_case("post") => "post".to_string(),
            Some(m) if m.eq_ignore_ascii_case("dialog") => "dialog".to_string(),
            _ => "get".to_string(),
        }
    }

    /// Descendant form controls in document order
    pub fn elements(&self) -> Vec<ElementRef<'a>> {
        let tree = self.tree();
        tree.descendants(self.node_id())
            .filter_map(|id| ElementRef::new(tree, id))
            .filter(|e| e.kind().is_form_control())
            .collect()
    }
}

impl<'a> ButtonElement<'a> {
    /// `type`, `submit` unless set to `reset` or `button`
    pub fn button_type(&self) -> &'static str {
        match self.get_attribute("type") {
            Some(t) if t.eq_ignore_ascii_case("reset") => "reset",
            Some(t) if t.eq_ignore_ascii_case("button") => "button",
            _ => "submit",
        }
    }

    pub fn name(&self) -> &'a str {
        self.attr_or_empty("name")
    }

    pub fn value(&self) -> &'a str {
        self.attr_or_empty("value")
    }

    pub fn disabled(&self) -> bool {
        self.has_attribute("disabled")
    }
}

impl<'a> InputElement<'a> {
    /// `type`, lower-cased, `text` when absent
    pub fn input_type(&self) -> String {
        self.get_attribute("type")
            .filter(|t| !t.is_empty())
            .map_or_else(|| "text".to_string(), str::to_ascii_lowercase)
    }

    pub fn name(&self) -> &'a str {
        self.attr_or_empty("name")
    }

    pub fn value(&self) -> &'a str {
        self.attr_or_empty("value")
    }

    pub fn checked(&self) -> bool {
        self.has_attribute("checked")
    }

    pub fn disabled(&self) -> bool {
        self.has_attribute("disabled")
    }
}

impl<'a> SelectElement<'a> {
    pub fn name(&self) -> &'a str {
        self.attr_or_empty("name")
    }

    pub fn multiple(&self) -> bool {
        self.has_attribute("multiple")
    }

    /// Descendant `<option>` elements in document order
    pub fn options(&self) -> Vec<OptionElement<'a>> {
        let tree = self.tree();
        tree.descendants(self.node_id())
            .filter_map(|id| ElementRef::new(tree, id))
            .filter_map(|e| e.as_option())
            .collect()
    }
}

impl<'a> OptionElement<'a> {
    /// `value` attribute, falling back to the option text
    pub fn value(&self) -> String {
        match self.get_attribute("value") {
            Some(value) => value.to_string(),
            None => self.text(),
        }
    }

    pub fn selected(&self) -> bool {
        self.has_attribute("selected")
    }

    /// Text with whitespace collapsed
    pub fn text(&self) -> String {
        self.text_content()
            .split_ascii_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<'a> TextAreaElement<'a> {
    pub fn name(&self) -> &'a str {
        self.attr_or_empty("name")
    }

    pub fn value(&self) -> String {
        self.text_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_table() {
        assert_eq!(ElementKind::from_tag_name("A"), ElementKind::Anchor);
        assert_eq!(ElementKind::from_tag_name("IMG"), ElementKind::Image);
        assert_eq!(ElementKind::from_tag_name("TEXTAREA"), ElementKind::TextArea);
        assert_eq!(ElementKind::from_tag_name("DIV"), ElementKind::Generic);
        assert_eq!(ElementKind::from_tag_name("a"), ElementKind::Generic);
    }

    #[test]
    fn test_typed_views() {
        let mut tree = DomTree::new();
        let link = tree.create_element("link");
        tree.set_attribute(link, "rel", "Alternate StyleSheet").unwrap();
        tree.set_attribute(link, "href", "a.css").unwrap();

        let element = ElementRef::new(&tree, link).unwrap();
        assert!(element.as_anchor().is_none());
        let link = element.as_link().unwrap();
        assert_eq!(link.href(), "a.css");
        assert_eq!(link.rel(), "Alternate StyleSheet");
        assert!(!link.disabled());
        assert_eq!(link.tag_name(), "LINK");
    }

    #[test]
    fn test_form_controls() {
        let mut tree = DomTree::new();
        let form = tree.create_element("form");
        let fieldset = tree.create_element("fieldset");
        let input = tree.create_element("input");
        let select = tree.create_element("select");
        let option = tree.create_element("option");
        let label = tree.create_text("  Red   one ");
        tree.append_child(form, fieldset).unwrap();
        tree.append_child(fieldset, input).unwrap();
        tree.append_child(form, select).unwrap();
        tree.append_child(select, option).unwrap();
        tree.append_child(option, label).unwrap();
        tree.set_attribute(form, "method", "POST").unwrap();

        let form = ElementRef::new(&tree, form).unwrap().as_form().unwrap();
        assert_eq!(form.method(), "post");
        let controls: Vec<_> = form.elements().iter().map(|e| e.node_id()).collect();
        assert_eq!(controls, vec![input, select]);

        let input = ElementRef::new(&tree, input).unwrap().as_input().unwrap();
        assert_eq!(input.input_type(), "text");
        assert!(!input.checked());

        let select = ElementRef::new(&tree, select).unwrap().as_select().unwrap();
        let options = select.options();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].value(), "Red one");
    }

    #[test]
    fn test_non_elements_have_no_view() {
        let mut tree = DomTree::new();
        let text = tree.create_text("x");
        assert!(ElementRef::new(&tree, text).is_none());
        assert!(ElementRef::new(&tree, NodeId::NONE).is_none());
    }
}
