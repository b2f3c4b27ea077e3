//! Value extraction
//!
//! Snapshots the value and selection state of fields so constraint functions
//! stay pure and never touch the document.

use cbx_dom::{Document, NodeId};
use serde::{Deserialize, Serialize};

/// Value/selection snapshot of one field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldValue {
    /// Current value
    pub value: String,
    /// Checkbox / radio checked state
    pub checked: bool,
    /// Option selected state
    pub selected: bool,
    /// Options, present only for select-like fields
    pub options: Option<Vec<FieldValue>>,
}

impl FieldValue {
    /// Text-like field
    #[inline]
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Checkbox or radio
    #[inline]
    #[must_use]
    pub fn checkable(value: impl Into<String>, checked: bool) -> Self {
        Self {
            value: value.into(),
            checked,
            ..Self::default()
        }
    }

    /// Option of a select
    #[inline]
    #[must_use]
    pub fn option(value: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            selected,
            ..Self::default()
        }
    }

    /// Select with its options; the value is the first selected option's
    #[must_use]
    pub fn select(options: Vec<FieldValue>) -> Self {
        let value = options
            .iter()
            .find(|o| o.selected)
            .map(|o| o.value.clone())
            .unwrap_or_default();
        Self {
            value,
            options: Some(options),
            ..Self::default()
        }
    }

    /// Non-empty and chosen (checked or selected)
    #[inline]
    #[must_use]
    pub fn is_chosen(&self) -> bool {
        !self.value.is_empty() && (self.checked || self.selected)
    }

    /// Whether this snapshot carries options
    #[inline]
    #[must_use]
    pub fn is_select(&self) -> bool {
        self.options.is_some()
    }
}

/// Snapshot one field
pub fn extract_one<D: Document + ?Sized>(doc: &D, node: NodeId) -> FieldValue {
    let is_select = doc
        .field_type(node)
        .is_some_and(|kind| kind.starts_with("select"));
    let options = is_select.then(|| {
        doc.options(node)
            .into_iter()
            .map(|option| FieldValue::option(doc.value(option), doc.is_selected(option)))
            .collect()
    });

    FieldValue {
        value: doc.value(node),
        checked: doc.is_checked(node),
        selected: doc.is_selected(node),
        options,
    }
}

/// Snapshot fields in order
pub fn extract<D: Document + ?Sized>(doc: &D, nodes: &[NodeId]) -> Vec<FieldValue> {
    nodes.iter().map(|&node| extract_one(doc, node)).collect()
}
