//! Submission guard
//!
//! Validates a field set synchronously and cancels the guarded action while
//! any rendered box is left in error state. The viewport is moved to the
//! topmost blocking box.

use crate::checker::CheckOutcome;
use crate::config::EngineConfig;
use crate::event::ActionEvent;
use crate::validator::Validator;
use cbx_dom::{Document, NodeId};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of one guard pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardOutcome {
    /// Every box checked, in check order
    pub checked: Vec<CheckOutcome>,
    /// Rendered boxes in error state, in check order
    pub blocking: Vec<NodeId>,
    /// Vertical scroll target when blocked
    pub scroll_to: Option<f64>,
}

impl GuardOutcome {
    /// Whether the guarded action was cancelled
    #[inline]
    #[must_use]
    pub fn blocked(&self) -> bool {
        !self.blocking.is_empty()
    }
}

/// Submission guard
#[derive(Debug, Clone)]
pub struct Guard {
    validator: Arc<Validator>,
    error_marker: Option<String>,
}

impl Guard {
    /// Create guard
    #[must_use]
    pub fn new(validator: Arc<Validator>, config: &EngineConfig) -> Self {
        Self {
            validator,
            error_marker: config.error_marker.clone(),
        }
    }

    /// Check every dependant of `fields` and block `event` on any rendered error
    pub fn stop_on_broken_constraints<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        event: &mut ActionEvent,
        fields: &[NodeId],
    ) -> GuardOutcome {
        let checked = self.validator.revalidate(doc, event.kind(), fields);

        let blocking: Vec<NodeId> = checked
            .iter()
            .filter(|outcome| outcome.visible && doc.is_rendered(outcome.node))
            .filter(|outcome| {
                self.error_marker
                    .as_deref()
                    .map_or(true, |marker| doc.has_class(outcome.node, marker))
            })
            .map(|outcome| outcome.node)
            .collect();

        let scroll_to = blocking.iter().map(|&node| doc.top(node)).reduce(f64::min);

        match scroll_to {
            Some(top) => {
                event.stop_propagation();
                event.prevent_default();
                doc.scroll_to(0.0, top);
                info!(
                    kind = %event.kind(),
                    blocking = blocking.len(),
                    top,
                    "guarded action blocked"
                );
            }
            None => debug!(kind = %event.kind(), checked = checked.len(), "guarded action allowed"),
        }

        GuardOutcome {
            checked,
            blocking,
            scroll_to,
        }
    }
}
