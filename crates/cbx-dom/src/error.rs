//! Error types for the document layer

use crate::node::NodeId;

/// Errors while parsing a selector
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// Selector (or one of its list entries) is empty
    #[error("empty selector")]
    Empty,

    /// Character not valid at this position
    #[error("unexpected '{found}' at position {position}")]
    Unexpected {
        /// Offending character
        found: char,
        /// Character index into the selector
        position: usize,
    },

    /// Input ended inside a bracket, paren or quoted value
    #[error("unexpected end of selector")]
    UnexpectedEnd,

    /// Pseudo-class outside the supported subset
    #[error("unsupported pseudo-class: ':{0}'")]
    UnsupportedPseudo(String),
}

/// Errors from document construction
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Handle does not belong to this document
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// Snapshot could not be decoded
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// IO error while reading a snapshot
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
