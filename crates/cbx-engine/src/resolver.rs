//! Dependency resolution
//!
//! Maps a changed field to the constraint boxes that must re-check. A box
//! matches when its trigger selectors match the field; every match then pulls
//! in its whole group: the outermost box above it plus all boxes nested inside
//! that outermost box.

use crate::boxspec::ConstraintBox;
use crate::config::Markers;
use cbx_dom::{Document, NodeId};
use indexmap::IndexSet;
use tracing::trace;

/// Dependency resolver
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    markers: Markers,
}

impl Resolver {
    /// Create resolver for the given markers
    #[inline]
    #[must_use]
    pub fn new(markers: Markers) -> Self {
        Self { markers }
    }

    /// Markers in use
    #[inline]
    #[must_use]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// All boxes in document order
    pub fn boxes<D: Document + ?Sized>(&self, doc: &D) -> Vec<NodeId> {
        doc.query_all(&self.markers.box_selector, None)
    }

    /// Outermost box enclosing `node` (inclusive)
    pub fn top<D: Document + ?Sized>(&self, doc: &D, node: NodeId) -> NodeId {
        let mut top = node;
        while let Some(outer) = doc
            .parent(top)
            .and_then(|parent| doc.closest(parent, &self.markers.box_selector))
        {
            top = outer;
        }
        top
    }

    /// Group of `node`: boxes nested in its top box, then the top box itself
    pub fn group<D: Document + ?Sized>(&self, doc: &D, node: NodeId) -> Vec<NodeId> {
        let top = self.top(doc, node);
        let mut group = doc.query_all(&self.markers.box_selector, Some(top));
        group.push(top);
        group
    }

    /// Boxes that must re-check when `field` changes, first-seen order
    pub fn dependants<D: Document + ?Sized>(&self, doc: &D, field: NodeId) -> IndexSet<NodeId> {
        self.dependants_of(doc, &[field])
    }

    /// Union of [`Resolver::dependants`] over `fields`, first-seen order
    ///
    /// Box declarations are read once for the whole batch.
    pub fn dependants_of<D: Document + ?Sized>(
        &self,
        doc: &D,
        fields: &[NodeId],
    ) -> IndexSet<NodeId> {
        let triggers: Vec<(NodeId, String)> = self
            .boxes(doc)
            .into_iter()
            .map(|node| {
                let spec = ConstraintBox::read(doc, node, &self.markers);
                (node, spec.trigger_selector())
            })
            .filter(|(_, selector)| !selector.is_empty())
            .collect();

        let mut dependants = IndexSet::new();
        for &field in fields {
            for (node, selector) in &triggers {
                if doc.matches(field, selector) {
                    dependants.extend(self.group(doc, *node));
                }
            }
        }

        trace!(fields = fields.len(), dependants = dependants.len(), "resolved dependants");
        dependants
    }
}
