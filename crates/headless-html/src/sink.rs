//! html5ever TreeSink bridge
//!
//! html5ever drives the [`TreeAdapter`] through [`TreeSink`]. The sink
//! callbacks cannot return errors, so the first contract violation is
//! recorded, every later mutation is ignored and [`TreeSink::finish`]
//! reports the violation.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;

use html5ever::interface::ElemName;
use html5ever::interface::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};

use headless_dom::{Document, DocumentMode, DomError, DomResult, NodeId};

use crate::adapter::TreeAdapter;
use crate::HtmlError;

/// Owned element name handed back to the tree builder
pub struct ElementName {
    ns: Namespace,
    local: LocalName,
}

impl fmt::Debug for ElementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}:{}", &*self.ns, &*self.local)
    }
}

impl ElemName for ElementName {
    fn ns(&self) -> &Namespace {
        &self.ns
    }

    fn local_name(&self) -> &LocalName {
        &self.local
    }
}

/// Sink that materializes html5ever callbacks into a [`Document`]
pub struct DomSink {
    adapter: RefCell<TreeAdapter>,
    violation: RefCell<Option<DomError>>,
    parse_errors: Cell<usize>,
}

impl DomSink {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            adapter: RefCell::new(TreeAdapter::new(base_uri)),
            violation: RefCell::new(None),
            parse_errors: Cell::new(0),
        }
    }

    fn poisoned(&self) -> bool {
        self.violation.borrow().is_some()
    }

    /// Run a mutation unless a violation was already recorded
    fn mutate(&self, op: impl FnOnce(&mut TreeAdapter) -> DomResult<()>) {
        if self.poisoned() {
            return;
        }
        if let Err(err) = op(&mut self.adapter.borrow_mut()) {
            tracing::error!(%err, "tree construction contract violated");
            *self.violation.borrow_mut() = Some(err);
        }
    }

    fn insert(&self, parent: NodeId, child: NodeOrText<NodeId>) {
        self.mutate(|adapter| match child {
            NodeOrText::AppendNode(node) => adapter.append_child(parent, node),
            NodeOrText::AppendText(text) => adapter.insert_text(parent, &text),
        });
    }
}

/// Attribute name as it appears in markup (`xlink:href` keeps its prefix)
fn attribute_name(attr: &Attribute) -> Cow<'_, str> {
    match &attr.name.prefix {
        Some(prefix) => Cow::Owned(format!("{}:{}", &**prefix, &*attr.name.local)),
        None => Cow::Borrowed(&*attr.name.local),
    }
}

fn with_attribute_pairs<R>(attrs: &[Attribute], f: impl FnOnce(Vec<(&str, &str)>) -> R) -> R {
    let names: Vec<Cow<'_, str>> = attrs.iter().map(attribute_name).collect();
    let pairs = names
        .iter()
        .zip(attrs)
        .map(|(name, attr)| (name.as_ref(), &*attr.value))
        .collect();
    f(pairs)
}

impl TreeSink for DomSink {
    type Handle = NodeId;
    type Output = Result<Document, HtmlError>;
    type ElemName<'a>
        = ElementName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        if let Some(err) = self.violation.into_inner() {
            return Err(HtmlError::Contract(err));
        }
        let document = self.adapter.into_inner().finish();
        tracing::debug!(
            nodes = document.tree().len(),
            parse_errors = self.parse_errors.get(),
            "parsed HTML document"
        );
        Ok(document)
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.parse_errors.set(self.parse_errors.get() + 1);
        tracing::trace!(%msg, "HTML parse error");
    }

    fn get_document(&self) -> NodeId {
        self.adapter.borrow().create_document()
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> ElementName {
        let name = {
            let adapter = self.adapter.borrow();
            adapter.get_namespace_uri(*target).and_then(|ns| {
                Ok(ElementName {
                    ns: Namespace::from(ns),
                    local: LocalName::from(adapter.get_tag_name(*target)?),
                })
            })
        };
        name.unwrap_or_else(|err| {
            self.mutate(|_| Err(err));
            ElementName {
                ns: Namespace::from(""),
                local: LocalName::from(""),
            }
        })
    }

    fn create_element(&self, name: QualName, attrs: Vec<Attribute>, _flags: ElementFlags) -> NodeId {
        with_attribute_pairs(&attrs, |pairs| {
            self.adapter
                .borrow_mut()
                .create_element(&name.local, &name.ns, pairs)
        })
    }

    fn create_comment(&self, text: StrTendril) -> NodeId {
        self.adapter.borrow_mut().create_comment_node(&text)
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> NodeId {
        self.adapter.borrow_mut().create_comment_node(&data)
    }

    fn append(&self, parent: &NodeId, child: NodeOrText<NodeId>) {
        self.insert(*parent, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        let has_parent = self.adapter.borrow().get_parent_node(*element).is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.insert(*prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        self.mutate(|adapter| adapter.set_document_type(&name, &public_id, &system_id));
    }

    fn get_template_contents(&self, target: &NodeId) -> NodeId {
        // Template contents live directly under the template element.
        *target
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        let mode = match mode {
            QuirksMode::Quirks => DocumentMode::Quirks,
            QuirksMode::LimitedQuirks => DocumentMode::LimitedQuirks,
            QuirksMode::NoQuirks => DocumentMode::NoQuirks,
        };
        self.adapter.borrow_mut().set_document_mode(mode);
    }

    fn append_before_sibling(&self, sibling: &NodeId, new_node: NodeOrText<NodeId>) {
        let sibling = *sibling;
        self.mutate(|adapter| {
            let parent = adapter
                .get_parent_node(sibling)
                .ok_or(DomError::HierarchyRequest("sibling has no parent"))?;
            match new_node {
                NodeOrText::AppendNode(node) => adapter.insert_before(parent, node, sibling),
                NodeOrText::AppendText(text) => adapter.insert_text_before(sibling, &text),
            }
        });
    }

    fn add_attrs_if_missing(&self, target: &NodeId, attrs: Vec<Attribute>) {
        let target = *target;
        self.mutate(|adapter| {
            with_attribute_pairs(&attrs, |pairs| adapter.adopt_attributes(target, pairs))
        });
    }

    fn remove_from_parent(&self, target: &NodeId) {
        let target = *target;
        self.mutate(|adapter| adapter.detach_node(target));
    }

    fn reparent_children(&self, node: &NodeId, new_parent: &NodeId) {
        let (node, new_parent) = (*node, *new_parent);
        self.mutate(|adapter| adapter.reparent_children(node, new_parent));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headless_dom::HTML_NAMESPACE;

    fn qual_name(ns: &str, local: &str) -> QualName {
        QualName::new(None, Namespace::from(ns), LocalName::from(local))
    }

    #[test]
    fn test_first_violation_wins() {
        let sink = DomSink::new("");
        let div = sink.create_element(
            qual_name(HTML_NAMESPACE, "div"),
            Vec::new(),
            ElementFlags::default(),
        );
        let orphan = sink.create_comment(StrTendril::from("x"));

        // `orphan` has no parent, so there is nothing to insert before.
        sink.append_before_sibling(&orphan, NodeOrText::AppendNode(div));
        sink.append(&sink.get_document(), NodeOrText::AppendNode(div));

        match sink.finish() {
            Err(HtmlError::Contract(DomError::HierarchyRequest(_))) => {}
            other => panic!("expected contract violation, got {other:?}"),
        }
    }

    #[test]
    fn test_elem_name() {
        let sink = DomSink::new("");
        let svg = sink.create_element(
            qual_name("http://www.w3.org/2000/svg", "svg"),
            Vec::new(),
            ElementFlags::default(),
        );
        let name = sink.elem_name(&svg);
        assert_eq!(&**name.local_name(), "svg");
        assert_eq!(&**name.ns(), "http://www.w3.org/2000/svg");
        assert_ne!(&**name.ns(), HTML_NAMESPACE);
    }
}
