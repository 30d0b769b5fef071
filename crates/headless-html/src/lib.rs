//! Headless HTML Parser
//!
//! HTML5 parsing built on html5ever. The tokenizer and tree builder are
//! html5ever's; this crate supplies the tree-construction adapter that turns
//! their callbacks into a [`headless_dom::Document`].

mod adapter;
mod sink;

pub use adapter::TreeAdapter;
pub use sink::{DomSink, ElementName};

use headless_dom::{Document, DomError};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// HTML parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HtmlError {
    /// The tree builder issued a callback sequence the adapter cannot honour
    #[error("tree construction contract violated: {0}")]
    Contract(#[source] DomError),
}

/// Parse an HTML string into a Document with an empty base URI
pub fn parse(html: &str) -> Result<Document, HtmlError> {
    parse_with_base(html, "")
}

/// Parse an HTML string; `base_uri` applies when there is no `<base href>`
pub fn parse_with_base(html: &str, base_uri: &str) -> Result<Document, HtmlError> {
    tracing::debug!(bytes = html.len(), base_uri, "parsing HTML document");
    parse_document(DomSink::new(base_uri), Default::default()).one(html)
}
