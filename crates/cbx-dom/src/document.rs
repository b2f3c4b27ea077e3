//! Document-tree collaborator interface
//!
//! Provides the [`Document`] trait the engine consumes. Hosts (a browser
//! binding, a server-side renderer, [`MemoryDocument`](crate::MemoryDocument))
//! implement it; the engine never creates or destroys nodes, it only reads
//! attributes and field state and toggles classes and message content on
//! constraint boxes.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Document tree consumed by the validation engine
///
/// Selectors are plain strings so hosts with a native selector engine can
/// pass them straight through. A selector the host cannot parse matches
/// nothing.
pub trait Document {
    /// Root of the tree (never matches an element selector)
    fn root(&self) -> NodeId;

    /// Parent element, `None` for the root
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// All elements matching `selector`, in document order
    ///
    /// With `scope` set only strict descendants of `scope` are considered.
    fn query_all(&self, selector: &str, scope: Option<NodeId>) -> Vec<NodeId>;

    /// Whether `node` matches `selector`
    fn matches(&self, node: NodeId, selector: &str) -> bool;

    /// Nearest inclusive ancestor matching `selector`
    ///
    /// Walks the parent chain iteratively, so arbitrarily deep markup is fine.
    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.matches(candidate, selector) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    /// Attribute value (`data-*` attributes included)
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Whether `node` carries `class`
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Add (`on == true`) or remove a class
    fn set_class(&mut self, node: NodeId, class: &str, on: bool);

    /// Current value of a field; empty string for non-fields
    fn value(&self, node: NodeId) -> String;

    /// Checked state of a checkbox or radio
    fn is_checked(&self, node: NodeId) -> bool;

    /// Selected state of an option
    fn is_selected(&self, node: NodeId) -> bool;

    /// Lower-cased control type (`text`, `radio`, `select-one`, ...)
    fn field_type(&self, node: NodeId) -> Option<String>;

    /// Option elements of a select, empty for anything else
    fn options(&self, node: NodeId) -> Vec<NodeId>;

    /// Form owning `node`
    fn form_of(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).and_then(|parent| self.closest(parent, "form"))
    }

    /// Replace the displayed content of `node`
    fn set_content(&mut self, node: NodeId, content: &str);

    /// Whether `node` is laid out (it and every ancestor are displayed)
    fn is_rendered(&self, node: NodeId) -> bool;

    /// Top edge of the node's bounding box
    fn top(&self, node: NodeId) -> f64;

    /// Scroll the viewport
    fn scroll_to(&mut self, x: f64, y: f64);

    /// Install a document-wide rule hiding every element it selects
    fn install_hide_rule(&mut self, rule: &HideRule) -> RuleId;

    /// Remove a rule installed by [`Document::install_hide_rule`]
    ///
    /// Returns `false` if the rule was not installed.
    fn remove_hide_rule(&mut self, id: RuleId) -> bool;
}

/// Handle of an installed [`HideRule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(pub u64);

/// Presentation rule hiding every element matched by `selector`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HideRule {
    /// Elements to hide
    pub selector: String,
}

impl HideRule {
    /// Create rule for selector
    #[inline]
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }

    /// Rule hiding every `.{prefix}` box lacking `{prefix}--visible`
    #[must_use]
    pub fn for_prefix(prefix: &str) -> Self {
        Self::new(format!(".{prefix}:not(.{prefix}--visible)"))
    }
}

impl Display for HideRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{display:none !important;}}", self.selector)
    }
}
