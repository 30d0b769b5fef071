//! DOM Tree (arena-based allocation)
//!
//! Every mutation keeps the child list a consistent doubly-linked list:
//! neighbour links are rewired before the parent's first/last pointers.

use crate::node::{DoctypeData, ElementData, Node, NodeData};
use crate::{Attr, DomError, DomResult, HTML_NAMESPACE, NodeId};

/// Arena-based DOM tree; node 0 is always the document
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Get a node, failing with [`DomError::NotFound`]
    pub fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    /// Number of nodes in the tree (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    // Only called with ids that were checked by `node()`.
    fn at(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Create a detached HTML element
    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        self.create_element_ns(HTML_NAMESPACE, local_name)
    }

    /// Create a detached element in a namespace
    pub fn create_element_ns(&mut self, namespace: &str, local_name: &str) -> NodeId {
        self.push(NodeData::Element(ElementData::new(namespace, local_name)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()))
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.push(NodeData::Doctype(DoctypeData {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }))
    }

    /// Create a detached attribute node with an empty value
    pub fn create_attribute(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Attribute(Attr::new(name, "")))
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if !self.node(parent)?.is_container() {
            return Err(DomError::HierarchyRequest("parent cannot have children"));
        }
        match self.node(child)?.data {
            NodeData::Document => {
                return Err(DomError::HierarchyRequest("document cannot be inserted"));
            }
            NodeData::Attribute(_) => {
                return Err(DomError::HierarchyRequest("attribute cannot be inserted"));
            }
            _ => {}
        }
        // A childless node can only be an ancestor of itself.
        let cycle = if self.node(child)?.first_child.is_valid() {
            self.is_inclusive_ancestor(child, parent)
        } else {
            child == parent
        };
        if cycle {
            return Err(DomError::HierarchyRequest("node cannot be inserted into itself"));
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.check_insertion(parent, child)?;
        self.detach(child)?;

        let last = self.at(parent).last_child;
        {
            let node = self.at(child);
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.at(last).next_sibling = child;
        } else {
            self.at(parent).first_child = child;
        }
        self.at(parent).last_child = child;
        Ok(child)
    }

    /// Insert `child` before `reference` under `parent`; `None` appends
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        let Some(mut reference) = reference else {
            return self.append_child(parent, child);
        };

        self.check_insertion(parent, child)?;
        if self.node(reference)?.parent != parent {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        if reference == child {
            match self.at(child).next_sibling.to_option() {
                Some(next) => reference = next,
                None => return Ok(child),
            }
        }

        self.detach(child)?;

        let prev = self.at(reference).prev_sibling;
        {
            let node = self.at(child);
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }
        self.at(reference).prev_sibling = child;
        if prev.is_valid() {
            self.at(prev).next_sibling = child;
        } else {
            self.at(parent).first_child = child;
        }
        Ok(child)
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.node(child)?.parent != parent || !parent.is_valid() {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child)?;
        Ok(child)
    }

    /// Unlink a node from its parent, if it has one
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        let (parent, prev, next) = {
            let node = self.node(id)?;
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return Ok(());
        }

        if prev.is_valid() {
            self.at(prev).next_sibling = next;
        } else {
            self.at(parent).first_child = next;
        }
        if next.is_valid() {
            self.at(next).prev_sibling = prev;
        } else {
            self.at(parent).last_child = prev;
        }

        let node = self.at(id);
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// Move every child of `from` to the end of `to`, keeping order
    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) -> DomResult<()> {
        let children: Vec<NodeId> = self.children(from).collect();
        for child in children {
            self.append_child(to, child)?;
        }
        Ok(())
    }

    /// Check whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = match self.get(current) {
                Some(n) => n.parent,
                None => return false,
            };
        }
        false
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// The document a node belongs to; `None` for the document itself
    pub fn owner_document(&self, id: NodeId) -> Option<NodeId> {
        if id == NodeId::ROOT || self.get(id).is_none() {
            None
        } else {
            Some(NodeId::ROOT)
        }
    }

    /// Iterate the children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next }
    }

    /// Iterate the element children of a node
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(|&c| self.is_element(c))
    }

    /// Pre-order traversal of everything below `root`, excluding `root`
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let next = self.get(root).map_or(NodeId::NONE, |n| n.first_child);
        Descendants {
            tree: self,
            root,
            next,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Element data of a node, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.get_mut(id)
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType("element"))
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.get_attr(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut(id)?.set_attr(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<Attr>> {
        Ok(self.element_mut(id)?.attrs.remove_named_item(name))
    }

    /// Set attributes not already present, keeping existing values
    pub fn add_attributes_if_missing<'a>(
        &mut self,
        id: NodeId,
        attrs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> DomResult<()> {
        let element = self.element_mut(id)?;
        for (name, value) in attrs {
            element.attrs.set_if_missing(name, value);
        }
        Ok(())
    }

    /// Copy a detached attribute node onto an element
    pub fn set_attribute_node(&mut self, element: NodeId, attr: NodeId) -> DomResult<Option<Attr>> {
        let attr = self
            .node(attr)?
            .as_attribute()
            .cloned()
            .ok_or(DomError::InvalidNodeType("attribute"))?;
        Ok(self.element_mut(element)?.attrs.set_named_item(attr))
    }

    /// Append text to the last child when it is a text node, else add a new text node
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> DomResult<NodeId> {
        let last = self.node(parent)?.last_child;
        if let Some(NodeData::Text(existing)) = self.get_mut(last).map(|n| &mut n.data) {
            existing.push_str(text);
            return Ok(last);
        }
        let id = self.create_text(text);
        self.append_child(parent, id)
    }

    /// Insert text before `reference`, merging with a preceding text node
    pub fn insert_text_before(&mut self, reference: NodeId, text: &str) -> DomResult<NodeId> {
        let (parent, prev) = {
            let node = self.node(reference)?;
            (node.parent, node.prev_sibling)
        };
        if !parent.is_valid() {
            return Err(DomError::HierarchyRequest("reference node has no parent"));
        }
        if let Some(NodeData::Text(existing)) = self.get_mut(prev).map(|n| &mut n.data) {
            existing.push_str(text);
            return Ok(prev);
        }
        let id = self.create_text(text);
        self.insert_before(parent, id, Some(reference))
    }

    /// DOM `textContent`
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        match &node.data {
            NodeData::Text(text) | NodeData::Comment(text) => text.clone(),
            NodeData::Attribute(attr) => attr.value.clone(),
            NodeData::Doctype(_) => String::new(),
            NodeData::Document | NodeData::Element(_) => self
                .descendants(id)
                .filter_map(|d| self.get(d).and_then(Node::as_text))
                .collect(),
        }
    }

    /// Elements below `root` whose tag name matches, in document order.
    /// `*` matches every element.
    pub fn get_elements_by_tag_name(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| {
                self.element(id)
                    .is_some_and(|e| name == "*" || e.has_tag_name(name))
            })
            .collect()
    }

    /// First element below `root` (document order) whose `id` equals `id`
    pub fn get_element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        self.descendants(root)
            .find(|&node| self.element(node).and_then(ElementData::id) == Some(id))
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.to_option()?;
        self.next = self.tree.get(current).map_or(NodeId::NONE, |n| n.next_sibling);
        Some(current)
    }
}

/// Iterative pre-order traversal bounded by a subtree root.
///
/// Descends to the first child when there is one, otherwise moves to the next
/// sibling, backtracking through parents until a sibling exists. Never climbs
/// above `root`, so it is safe for arbitrarily deep trees.
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Descendants<'_> {
    fn successor(&self, current: NodeId) -> NodeId {
        let Some(node) = self.tree.get(current) else {
            return NodeId::NONE;
        };
        if node.first_child.is_valid() {
            return node.first_child;
        }

        let mut cursor = current;
        loop {
            if cursor == self.root {
                return NodeId::NONE;
            }
            let Some(node) = self.tree.get(cursor) else {
                return NodeId::NONE;
            };
            if node.next_sibling.is_valid() {
                return node.next_sibling;
            }
            cursor = node.parent;
            if !cursor.is_valid() {
                return NodeId::NONE;
            }
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.to_option()?;
        self.next = self.successor(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(tree: &DomTree, parent: NodeId) -> Vec<NodeId> {
        tree.children(parent).collect()
    }

    fn backward(tree: &DomTree, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = tree.get(parent).and_then(Node::last_child);
        while let Some(id) = cursor {
            out.push(id);
            cursor = tree.get(id).and_then(Node::previous_sibling);
        }
        out.reverse();
        out
    }

    #[test]
    fn test_dom_tree_creation() {
        let mut tree = DomTree::new();

        let div = tree.create_element("div");
        let span = tree.create_element("span");
        let text = tree.create_text("Hello, World!");

        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, span).unwrap();
        tree.append_child(span, text).unwrap();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.parent(div), Some(tree.root()));
        assert_eq!(tree.get(div).unwrap().first_child(), Some(span));
        assert_eq!(tree.parent(text), Some(span));
        assert_eq!(tree.owner_document(text), Some(NodeId::ROOT));
        assert_eq!(tree.owner_document(NodeId::ROOT), None);
    }

    #[test]
    fn test_insert_before_links() {
        let mut tree = DomTree::new();
        let parent = tree.create_element("ul");
        let a = tree.create_element("li");
        let b = tree.create_element("li");
        let c = tree.create_element("li");

        tree.append_child(parent, c).unwrap();
        tree.insert_before(parent, a, Some(c)).unwrap();
        tree.insert_before(parent, b, Some(c)).unwrap();

        assert_eq!(forward(&tree, parent), vec![a, b, c]);
        assert_eq!(backward(&tree, parent), vec![a, b, c]);
        assert_eq!(tree.get(parent).unwrap().first_child(), Some(a));
        assert_eq!(tree.get(parent).unwrap().last_child(), Some(c));
    }

    #[test]
    fn test_insert_before_foreign_reference_fails() {
        let mut tree = DomTree::new();
        let parent = tree.create_element("div");
        let other = tree.create_element("div");
        let stranger = tree.create_element("p");
        let child = tree.create_element("span");
        tree.append_child(other, stranger).unwrap();

        let err = tree.insert_before(parent, child, Some(stranger)).unwrap_err();
        assert_eq!(
            err,
            DomError::NotAChild {
                parent,
                child: stranger
            }
        );
        assert!(tree.parent(child).is_none());
    }

    #[test]
    fn test_append_moves_node() {
        let mut tree = DomTree::new();
        let first = tree.create_element("div");
        let second = tree.create_element("div");
        let child = tree.create_text("x");

        tree.append_child(first, child).unwrap();
        tree.append_child(second, child).unwrap();

        assert!(forward(&tree, first).is_empty());
        assert!(tree.get(first).unwrap().last_child().is_none());
        assert_eq!(forward(&tree, second), vec![child]);
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("div");
        tree.append_child(outer, inner).unwrap();

        assert!(matches!(
            tree.append_child(inner, outer),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(matches!(
            tree.append_child(outer, outer),
            Err(DomError::HierarchyRequest(_))
        ));
        let text = tree.create_text("leaf");
        assert!(tree.append_child(text, inner).is_err());
    }

    #[test]
    fn test_remove_child() {
        let mut tree = DomTree::new();
        let parent = tree.create_element("div");
        let kids: Vec<_> = (0..3).map(|_| tree.create_element("p")).collect();
        for &k in &kids {
            tree.append_child(parent, k).unwrap();
        }

        tree.remove_child(parent, kids[1]).unwrap();
        assert_eq!(forward(&tree, parent), vec![kids[0], kids[2]]);
        assert_eq!(backward(&tree, parent), vec![kids[0], kids[2]]);
        assert!(tree.remove_child(parent, kids[1]).is_err());
    }

    #[test]
    fn test_reparent_children() {
        let mut tree = DomTree::new();
        let from = tree.create_element("b");
        let to = tree.create_element("i");
        let x = tree.create_text("x");
        let y = tree.create_text("y");
        tree.append_child(from, x).unwrap();
        tree.append_child(from, y).unwrap();

        tree.reparent_children(from, to).unwrap();
        assert!(forward(&tree, from).is_empty());
        assert_eq!(forward(&tree, to), vec![x, y]);
        assert_eq!(tree.text_content(to), "xy");
    }

    #[test]
    fn test_append_text_merges() {
        let mut tree = DomTree::new();
        let p = tree.create_element("p");
        let first = tree.append_text(p, "Hello").unwrap();
        let second = tree.append_text(p, ", world").unwrap();

        assert_eq!(first, second);
        assert_eq!(tree.text_content(p), "Hello, world");
    }

    #[test]
    fn test_descendants_stay_in_subtree() {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let a = tree.create_element("div");
        let a1 = tree.create_element("span");
        let b = tree.create_element("div");
        tree.append_child(tree.root(), html).unwrap();
        tree.append_child(html, a).unwrap();
        tree.append_child(a, a1).unwrap();
        tree.append_child(html, b).unwrap();

        assert_eq!(tree.descendants(a).collect::<Vec<_>>(), vec![a1]);
        assert_eq!(
            tree.descendants(tree.root()).collect::<Vec<_>>(),
            vec![html, a, a1, b]
        );
        assert_eq!(tree.descendants(b).count(), 0);
    }

    #[test]
    fn test_get_elements_by_tag_name() {
        let mut tree = DomTree::new();
        let body = tree.create_element("body");
        let p1 = tree.create_element("p");
        let div = tree.create_element("div");
        let p2 = tree.create_element("P");
        tree.append_child(tree.root(), body).unwrap();
        tree.append_child(body, p1).unwrap();
        tree.append_child(body, div).unwrap();
        tree.append_child(div, p2).unwrap();

        assert_eq!(tree.get_elements_by_tag_name(tree.root(), "p"), vec![p1, p2]);
        assert_eq!(tree.get_elements_by_tag_name(div, "P"), vec![p2]);
        assert_eq!(tree.get_elements_by_tag_name(body, "*").len(), 3);
    }

    #[test]
    fn test_attribute_nodes() {
        let mut tree = DomTree::new();
        let el = tree.create_element("input");
        let attr = tree.create_attribute("value");

        assert!(tree.set_attribute_node(el, attr).unwrap().is_none());
        assert_eq!(tree.get_attribute(el, "value"), Some(""));
        assert!(tree.append_child(el, attr).is_err());
        assert!(tree.set_attribute_node(attr, el).is_err());
    }
}
