//! DOM operation errors

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    NotFound(NodeId),

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("hierarchy request error: {0}")]
    HierarchyRequest(&'static str),

    #[error("invalid node type: expected {0}")]
    InvalidNodeType(&'static str),

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("document has no <{0}> element")]
    MissingElement(&'static str),
}
