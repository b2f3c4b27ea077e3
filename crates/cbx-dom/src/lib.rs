//! CBX Document Interface
//!
//! The document tree is an external collaborator of the validation engine.
//! This crate fixes the interface the engine consumes and ships an in-memory
//! implementation used by tests and by the `cbx` binary.
//!
//! # Overview
//!
//! - **[`Document`]**: selector queries, attribute and field-state reads,
//!   ancestor traversal, layout queries, scrolling and the hide rule
//! - **[`Selector`]**: the CSS selector subset understood by [`MemoryDocument`]
//! - **[`MemoryDocument`]**: arena-backed tree, buildable in code or from JSON
//!
//! # Example
//!
//! ```rust
//! use cbx_dom::{Document, Element, MemoryDocument};
//!
//! let mut doc = MemoryDocument::new();
//! let form = doc.append(doc.root(), Element::new("form")).unwrap();
//! let name = doc
//!     .append(form, Element::new("input").attr("name", "user").value("ada"))
//!     .unwrap();
//!
//! assert_eq!(doc.query_all("form input[name=user]", None), vec![name]);
//! assert_eq!(doc.value(name), "ada");
//! assert_eq!(doc.form_of(name), Some(form));
//! ```

#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod memory;
pub mod node;
pub mod selector;

// Re-exports
pub use document::{Document, HideRule, RuleId};
pub use error::{DocumentError, SelectorError};
pub use memory::{Element, ElementSnapshot, MemoryDocument};
pub use node::NodeId;
pub use selector::{ElementView, Selector};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for document operations
    pub use crate::{Document, Element, HideRule, MemoryDocument, NodeId, Selector};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
