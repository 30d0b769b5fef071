//! DOM Node
//!
//! Links are stored as [`NodeId`]s with [`NodeId::NONE`] marking a missing
//! link; the arena in [`crate::DomTree`] owns every node.

use crate::attributes::NamedNodeMap;
use crate::elements::ElementKind;
use crate::{Attr, HTML_NAMESPACE, NodeId};

/// DOM node type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
}

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    pub(crate) parent: NodeId,
    pub(crate) first_child: NodeId,
    pub(crate) last_child: NodeId,
    pub(crate) prev_sibling: NodeId,
    pub(crate) next_sibling: NodeId,
    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent.to_option()
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child.to_option()
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child.to_option()
    }

    pub fn previous_sibling(&self) -> Option<NodeId> {
        self.prev_sibling.to_option()
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling.to_option()
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn node_type(&self) -> NodeType {
        match self.data {
            NodeData::Document => NodeType::Document,
            NodeData::Doctype(_) => NodeType::DocumentType,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::Attribute(_) => NodeType::Attribute,
        }
    }

    /// DOM `nodeName`
    pub fn node_name(&self) -> &str {
        match &self.data {
            NodeData::Document => "#document",
            NodeData::Doctype(doctype) => &doctype.name,
            NodeData::Element(element) => element.tag_name(),
            NodeData::Text(_) => "#text",
            NodeData::Comment(_) => "#comment",
            NodeData::Attribute(attr) => &attr.name,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Nodes that may hold children
    #[inline]
    pub(crate) fn is_container(&self) -> bool {
        matches!(self.data, NodeData::Document | NodeData::Element(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn as_comment(&self) -> Option<&str> {
        match &self.data {
            NodeData::Comment(c) => Some(c),
            _ => None,
        }
    }

    #[inline]
    pub fn as_doctype(&self) -> Option<&DoctypeData> {
        match &self.data {
            NodeData::Doctype(d) => Some(d),
            _ => None,
        }
    }

    #[inline]
    pub fn as_attribute(&self) -> Option<&Attr> {
        match &self.data {
            NodeData::Attribute(a) => Some(a),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// DOCTYPE
    Doctype(DoctypeData),
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
    /// Detached attribute created through `createAttribute`
    Attribute(Attr),
}

/// DOCTYPE data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctypeData {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    kind: ElementKind,
    tag_name: String,
    local_name: String,
    namespace: String,
    pub(crate) attrs: NamedNodeMap,
}

impl ElementData {
    pub fn new(namespace: &str, local_name: &str) -> Self {
        let tag_name = local_name.to_ascii_uppercase();
        let attrs = if namespace == HTML_NAMESPACE {
            NamedNodeMap::html()
        } else {
            NamedNodeMap::new()
        };

        Self {
            kind: ElementKind::from_tag_name(&tag_name),
            tag_name,
            local_name: local_name.to_string(),
            namespace: namespace.to_string(),
            attrs,
        }
    }

    /// Upper-cased tag name (`tagName`)
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Tag name as written by the parser
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn namespace_uri(&self) -> &str {
        &self.namespace
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn is_html(&self) -> bool {
        self.namespace == HTML_NAMESPACE
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get_attribute(name)
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attrs.set_attribute(name, value);
    }

    pub fn attributes(&self) -> &NamedNodeMap {
        &self.attrs
    }

    /// `id` attribute, if present
    pub fn id(&self) -> Option<&str> {
        self.attrs.get_attribute("id")
    }

    /// Iterate the whitespace-separated `class` tokens
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .get_attribute("class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }

    /// Compare against a tag name the way HTML does
    pub fn has_tag_name(&self, name: &str) -> bool {
        if self.is_html() {
            self.local_name.eq_ignore_ascii_case(name)
        } else {
            self.local_name == name || self.tag_name == name
        }
    }
}
