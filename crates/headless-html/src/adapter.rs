//! Tree-construction adapter
//!
//! The callback surface a tree builder drives while consuming tokens. Each
//! mutation goes through the validated [`DomTree`] operations, so a bad
//! callback sequence surfaces as a [`DomError`] instead of a broken tree.

use headless_dom::{
    DoctypeData, Document, DocumentMode, DomError, DomResult, DomTree, Node, NodeData, NodeId,
};

/// Builds a [`Document`] from parser callbacks
#[derive(Debug)]
pub struct TreeAdapter {
    document: Document,
}

impl TreeAdapter {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            document: Document::new(base_uri),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn tree(&self) -> &DomTree {
        self.document.tree()
    }

    fn tree_mut(&mut self) -> &mut DomTree {
        self.document.tree_mut()
    }

    /// Hand over the finished document
    pub fn finish(self) -> Document {
        self.document
    }

    /// The document node every other node hangs off
    pub fn create_document(&self) -> NodeId {
        self.document.root()
    }

    /// Create a detached element; the variant follows from the tag name
    pub fn create_element<'a>(
        &mut self,
        tag_name: &str,
        namespace_uri: &str,
        attrs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> NodeId {
        let tree = self.tree_mut();
        let id = tree.create_element_ns(namespace_uri, tag_name);
        // Duplicate attributes keep the first value, as the tokenizer does.
        // `id` was just created as an element, so this cannot fail.
        let _ = tree.add_attributes_if_missing(id, attrs);
        id
    }

    pub fn create_comment_node(&mut self, text: &str) -> NodeId {
        self.tree_mut().create_comment(text)
    }

    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        self.tree_mut().create_text(text)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.tree_mut().append_child(parent, child).map(|_| ())
    }

    /// Insert `child` before `reference`, which must be a child of `parent`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> DomResult<()> {
        self.tree_mut()
            .insert_before(parent, child, Some(reference))
            .map(|_| ())
    }

    /// Append text under `parent`, merging with a trailing text node
    pub fn insert_text(&mut self, parent: NodeId, text: &str) -> DomResult<()> {
        self.tree_mut().append_text(parent, text).map(|_| ())
    }

    /// Insert text before `reference`, merging with a preceding text node
    pub fn insert_text_before(&mut self, reference: NodeId, text: &str) -> DomResult<()> {
        self.tree_mut().insert_text_before(reference, text).map(|_| ())
    }

    pub fn set_attribute_value(&mut self, element: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.tree_mut().set_attribute(element, name, value)
    }

    /// Add attributes the element does not have yet
    pub fn adopt_attributes<'a>(
        &mut self,
        element: NodeId,
        attrs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> DomResult<()> {
        self.tree_mut().add_attributes_if_missing(element, attrs)
    }

    /// Attach a doctype node to the document
    pub fn set_document_type(&mut self, name: &str, public_id: &str, system_id: &str) -> DomResult<()> {
        let root = self.document.root();
        let tree = self.tree_mut();
        let doctype = tree.create_doctype(name, public_id, system_id);
        tree.append_child(root, doctype).map(|_| ())
    }

    pub fn set_document_mode(&mut self, mode: DocumentMode) {
        self.document.set_mode(mode);
    }

    pub fn detach_node(&mut self, node: NodeId) -> DomResult<()> {
        self.tree_mut().detach(node)
    }

    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) -> DomResult<()> {
        self.tree_mut().reparent_children(from, to)
    }

    pub fn get_parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.tree().parent(node)
    }

    pub fn get_child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.tree().children(node).collect()
    }

    /// Local name of an element as the parser created it
    pub fn get_tag_name(&self, element: NodeId) -> DomResult<&str> {
        Ok(self.element(element)?.local_name())
    }

    pub fn get_namespace_uri(&self, element: NodeId) -> DomResult<&str> {
        Ok(self.element(element)?.namespace_uri())
    }

    pub fn get_text_node_content(&self, node: NodeId) -> DomResult<&str> {
        self.node(node)?
            .as_text()
            .ok_or(DomError::InvalidNodeType("text"))
    }

    pub fn get_comment_node_content(&self, node: NodeId) -> DomResult<&str> {
        self.node(node)?
            .as_comment()
            .ok_or(DomError::InvalidNodeType("comment"))
    }

    pub fn get_document_type_node_name(&self, node: NodeId) -> DomResult<&str> {
        Ok(&self.doctype(node)?.name)
    }

    pub fn get_document_type_node_public_id(&self, node: NodeId) -> DomResult<&str> {
        Ok(&self.doctype(node)?.public_id)
    }

    pub fn get_document_type_node_system_id(&self, node: NodeId) -> DomResult<&str> {
        Ok(&self.doctype(node)?.system_id)
    }

    pub fn is_element_node(&self, node: NodeId) -> bool {
        self.tree().is_element(node)
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.tree().node(id)
    }

    fn element(&self, id: NodeId) -> DomResult<&headless_dom::ElementData> {
        self.node(id)?
            .as_element()
            .ok_or(DomError::InvalidNodeType("element"))
    }

    fn doctype(&self, id: NodeId) -> DomResult<&DoctypeData> {
        match self.node(id)?.data() {
            NodeData::Doctype(doctype) => Ok(doctype),
            _ => Err(DomError::InvalidNodeType("document type")),
        }
    }
}
