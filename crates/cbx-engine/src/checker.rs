//! Constraint box checking
//!
//! [`Checker::check`] evaluates one box against the live field values, renders
//! its message and applies the visibility rule:
//!
//! - a passing box is always hidden immediately
//! - a violated box is shown, unless the event is live typing and the box is
//!   not `insta`, in which case its visibility is left unchanged

use crate::boxspec::ConstraintBox;
use crate::config::{EngineConfig, Markers};
use crate::error::EngineResult;
use crate::event::EventKind;
use cbx_constraint::{extract, ConstraintRegistry, Verdict};
use cbx_dom::{Document, NodeId};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of one check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    /// Checked box
    #[serde(rename = "box")]
    pub node: NodeId,
    /// Constraint name as declared
    pub constraint: String,
    /// Evaluation result
    pub verdict: Verdict,
    /// Visibility after the check
    pub visible: bool,
    /// Rendered message, when the box was violated and declares a template
    pub message: Option<String>,
}

/// Evaluates constraint boxes and updates their display state
#[derive(Debug, Clone)]
pub struct Checker {
    registry: Arc<ConstraintRegistry>,
    markers: Markers,
    message_token: String,
}

impl Checker {
    /// Create checker
    #[must_use]
    pub fn new(registry: Arc<ConstraintRegistry>, config: &EngineConfig) -> Self {
        Self {
            registry,
            markers: config.markers(),
            message_token: config.message_token.clone(),
        }
    }

    /// Registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    /// Markers in use
    #[inline]
    #[must_use]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Evaluate `spec` without touching the box
    ///
    /// # Errors
    /// Unknown constraint names and constraint failures (e.g. invalid regex).
    pub fn evaluate<D: Document + ?Sized>(
        &self,
        doc: &D,
        spec: &ConstraintBox,
    ) -> EngineResult<Verdict> {
        let fields = extract(doc, &spec.fields(doc));
        Ok(self
            .registry
            .evaluate(&spec.constraint, &fields, spec.param.as_deref())?)
    }

    /// Check box `node` for an event of kind `kind`
    ///
    /// Never fails: anything that prevents evaluation counts as a violation.
    pub fn check<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        kind: EventKind,
        node: NodeId,
    ) -> CheckOutcome {
        let spec = ConstraintBox::read(&*doc, node, &self.markers);
        let verdict = self.evaluate(&*doc, &spec).unwrap_or_else(|err| {
            warn!(%node, constraint = %spec.constraint, error = %err, "constraint failed closed");
            Verdict::unconditional()
        });

        let message = match (&spec.message, verdict.violated) {
            (Some(template), true) => {
                let value = verdict.value.to_string();
                let rendered = template.replacen(&self.message_token, &value, 1);
                doc.set_content(node, &rendered);
                Some(rendered)
            }
            _ => None,
        };

        if !verdict.violated || spec.insta || !kind.is_live_typing() {
            doc.set_class(node, &self.markers.visible, verdict.violated);
        }
        let visible = doc.has_class(node, &self.markers.visible);

        debug!(
            %node,
            constraint = %spec.constraint,
            %kind,
            violated = verdict.violated,
            visible,
            "checked"
        );

        CheckOutcome {
            node,
            constraint: spec.constraint,
            verdict,
            visible,
            message,
        }
    }

    /// Check every box in order
    pub fn check_all<D, I>(&self, doc: &mut D, kind: EventKind, nodes: I) -> Vec<CheckOutcome>
    where
        D: Document + ?Sized,
        I: IntoIterator<Item = NodeId>,
    {
        nodes
            .into_iter()
            .map(|node| self.check(&mut *doc, kind, node))
            .collect()
    }
}
