//! Headless DOM - Document Object Model
//!
//! Arena-based node graph with a document facade on top.
//! All nodes of a document live in one [`DomTree`] and refer to each other
//! by [`NodeId`]; parent, child and sibling links are plain indices.

mod attributes;
mod document;
mod elements;
mod error;
mod node;
mod query;
mod selectors;
mod stylesheet;
mod tree;

pub use attributes::{Attr, NamedNodeMap};
pub use document::{Document, DocumentMode};
pub use elements::{
    AnchorElement, ButtonElement, ElementKind, ElementRef, FormElement, ImageElement,
    InputElement, LinkElement, OptionElement, SelectElement, TextAreaElement,
};
pub use error::{DomError, DomResult};
pub use node::{DoctypeData, ElementData, Node, NodeData, NodeType};
pub use query::{ElementQuery, NodeList};
pub use selectors::SelectorList;
pub use stylesheet::{StyleSheet, StyleSheetList};
pub use tree::{Children, Descendants, DomTree};

/// The HTML namespace URI
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for a missing link
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this ID refers to a node at all
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn to_option(self) -> Option<NodeId> {
        if self.is_valid() { Some(self) } else { None }
    }
}
