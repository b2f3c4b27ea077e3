//! Guard pass reports

use cbx_constraint::ViolationValue;
use cbx_engine::GuardOutcome;
use cbx_dom::{Document, NodeId};
use serde::Serialize;
use std::fmt::Write as _;

/// One checked box
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxReport {
    /// Node handle
    pub node: NodeId,
    /// `id` attribute, if any
    pub id: Option<String>,
    /// Constraint name
    pub constraint: String,
    /// Constraint result
    pub violated: bool,
    /// Violation detail
    pub value: ViolationValue,
    /// Shown after the check
    pub visible: bool,
    /// Whether the box blocks the guarded action
    pub blocking: bool,
    /// Rendered message
    pub message: Option<String>,
}

/// Result of `cbx check`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    /// Snapshot that was checked
    pub snapshot: String,
    /// Number of fields validated
    pub fields: usize,
    /// Boxes in check order
    pub boxes: Vec<BoxReport>,
    /// Whether a guarded submission would be cancelled
    pub blocked: bool,
    /// Vertical scroll target when blocked
    pub scroll_to: Option<f64>,
}

impl CheckReport {
    /// Build from a guard outcome
    pub fn new<D: Document + ?Sized>(
        doc: &D,
        snapshot: impl Into<String>,
        fields: usize,
        outcome: &GuardOutcome,
    ) -> Self {
        let boxes = outcome
            .checked
            .iter()
            .map(|checked| BoxReport {
                node: checked.node,
                id: doc.attribute(checked.node, "id"),
                constraint: checked.constraint.clone(),
                violated: checked.verdict.violated,
                value: checked.verdict.value.clone(),
                visible: checked.visible,
                blocking: outcome.blocking.contains(&checked.node),
                message: checked.message.clone(),
            })
            .collect();

        Self {
            snapshot: snapshot.into(),
            fields,
            boxes,
            blocked: outcome.blocked(),
            scroll_to: outcome.scroll_to,
        }
    }

    /// Process exit code: 1 when blocked
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(self.blocked)
    }

    /// Human-readable report
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Constraint Report: {}", self.snapshot);
        let _ = writeln!(out, "  Fields: {}", self.fields);
        let _ = writeln!(out, "  Boxes: {}", self.boxes.len());
        let _ = writeln!(out);

        for b in &self.boxes {
            let status = match (b.violated, b.blocking) {
                (true, true) => "BLOCKING",
                (true, false) => "violated",
                (false, _) => "ok",
            };
            let label = b.id.clone().unwrap_or_else(|| b.node.to_string());
            let _ = write!(out, "  [{status:>8}] {label} ({})", b.constraint);
            if let Some(message) = &b.message {
                let _ = write!(out, ": {message}");
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out);
        match self.scroll_to {
            Some(top) => {
                let _ = writeln!(out, "Status: BLOCKED (scroll to {top})");
            }
            None => {
                let _ = writeln!(out, "Status: PASSED");
            }
        }
        out
    }
}
