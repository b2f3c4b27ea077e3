//! Constraint box declarations
//!
//! A [`ConstraintBox`] is read fresh from the document on every use, so edits
//! to a box's attributes take effect at its next check.

use crate::config::Markers;
use cbx_dom::{Document, NodeId};

/// Attribute listing the evaluated-field selectors (`;`-separated)
pub const ATTR_SELECTORS: &str = "data-selectors";
/// Attribute listing the trigger selectors (`;`-separated)
pub const ATTR_TRIGGERS: &str = "data-triggers";
/// Attribute naming the constraint
pub const ATTR_CONSTRAINT: &str = "data-constraint";
/// Attribute carrying the constraint parameter
pub const ATTR_PARAM: &str = "data-param";
/// Attribute carrying the message template
pub const ATTR_MESSAGE: &str = "data-message";

/// Declarative metadata of one constraint box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintBox {
    /// Box element
    pub node: NodeId,
    /// Evaluated-field selectors, in declaration order
    pub selectors: Vec<String>,
    /// Trigger selectors, `None` when the box reuses `selectors`
    ///
    /// A blank `data-triggers` counts as missing.
    pub triggers: Option<Vec<String>>,
    /// Constraint name (empty when the attribute is missing)
    pub constraint: String,
    /// Constraint parameter
    pub param: Option<String>,
    /// Message template
    pub message: Option<String>,
    /// Hide/show immediately even on live typing
    pub insta: bool,
    /// Force-checked at install
    pub initial: bool,
}

impl ConstraintBox {
    /// Read the box declared on `node`
    pub fn read<D: Document + ?Sized>(doc: &D, node: NodeId, markers: &Markers) -> Self {
        Self {
            node,
            selectors: doc
                .attribute(node, ATTR_SELECTORS)
                .map(|s| split_selectors(&s))
                .unwrap_or_default(),
            triggers: doc
                .attribute(node, ATTR_TRIGGERS)
                .map(|s| split_selectors(&s))
                .filter(|triggers| !triggers.is_empty()),
            constraint: doc.attribute(node, ATTR_CONSTRAINT).unwrap_or_default(),
            param: doc.attribute(node, ATTR_PARAM),
            message: doc.attribute(node, ATTR_MESSAGE),
            insta: doc.has_class(node, &markers.insta),
            initial: doc.has_class(node, &markers.initial),
        }
    }

    /// Triggers joined into one selector expression
    #[must_use]
    pub fn trigger_selector(&self) -> String {
        self.triggers.as_ref().unwrap_or(&self.selectors).join(", ")
    }

    /// Fields evaluated by this box: union over its selectors, first-seen order
    pub fn fields<D: Document + ?Sized>(&self, doc: &D) -> Vec<NodeId> {
        let mut fields = indexmap::IndexSet::new();
        for selector in &self.selectors {
            fields.extend(doc.query_all(selector, None));
        }
        fields.into_iter().collect()
    }
}

/// Split a `;`-separated selector list, dropping blank entries
#[must_use]
pub fn split_selectors(source: &str) -> Vec<String> {
    source
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
