//! Element Query and Methods
//!
//! querySelector, getElementsByClassName, closest, matches.

use std::collections::HashSet;

use crate::{DomResult, DomTree, NodeId, SelectorList};

/// Static, ordered collection of nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeList {
    nodes: Vec<NodeId>,
}

impl NodeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    pub fn length(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }
}

impl IntoIterator for NodeList {
    type Item = NodeId;
    type IntoIter = std::vec::IntoIter<NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl FromIterator<NodeId> for NodeList {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

/// Element query trait
///
/// Every query searches the descendants of `root` (never `root` itself) in
/// document order.
pub trait ElementQuery {
    /// First element matching a CSS selector
    fn query_selector(&self, root: NodeId, selector: &str) -> DomResult<Option<NodeId>>;

    /// All elements matching a CSS selector
    fn query_selector_all(&self, root: NodeId, selector: &str) -> DomResult<NodeList>;

    /// Elements carrying every class in a whitespace-separated list
    fn get_elements_by_class_name(&self, root: NodeId, classes: &str) -> NodeList;

    /// Elements with a tag name, compared case-insensitively for HTML
    fn get_elements_by_tag_name(&self, root: NodeId, tag: &str) -> NodeList;

    /// Closest inclusive ancestor matching a selector
    fn closest(&self, element: NodeId, selector: &str) -> DomResult<Option<NodeId>>;

    /// Check if element matches selector
    fn matches(&self, element: NodeId, selector: &str) -> DomResult<bool>;
}

impl ElementQuery for DomTree {
    fn query_selector(&self, root: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self.descendants(root).find(|&id| list.matches(self, id)))
    }

    fn query_selector_all(&self, root: NodeId, selector: &str) -> DomResult<NodeList> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendants(root)
            .filter(|&id| list.matches(self, id))
            .collect())
    }

    fn get_elements_by_class_name(&self, root: NodeId, classes: &str) -> NodeList {
        let wanted: HashSet<&str> = classes.split_ascii_whitespace().collect();
        if wanted.is_empty() {
            return NodeList::new();
        }

        self.descendants(root)
            .filter(|&id| {
                self.element(id).is_some_and(|e| {
                    let present: HashSet<&str> = e.classes().collect();
                    wanted.is_subset(&present)
                })
            })
            .collect()
    }

    fn get_elements_by_tag_name(&self, root: NodeId, tag: &str) -> NodeList {
        NodeList::from_vec(DomTree::get_elements_by_tag_name(self, root, tag))
    }

    fn closest(&self, element: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(
            std::iter::successors(Some(element), |&id| self.parent(id))
                .find(|&id| list.matches(self, id)),
        )
    }

    fn matches(&self, element: NodeId, selector: &str) -> DomResult<bool> {
        Ok(SelectorList::parse(selector)?.matches(self, element))
    }
}
