//! Host notifications
//!
//! Provides [`EventKind`] and [`ActionEvent`], the engine's view of a raw
//! interaction delivered by the host event system.

use cbx_dom::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Kind of notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Fired on every keystroke or interim change
    Input,
    /// Fired when a value is committed
    Change,
    /// Form submission (guarded)
    Submit,
    /// Click on a control (guarded when it names fields to validate)
    Click,
    /// Synthetic check issued by the engine itself
    Forced,
}

impl EventKind {
    /// Kinds the host must deliver to [`Cbx::handle`](crate::Cbx::handle)
    pub const LISTENED: [EventKind; 4] = [
        EventKind::Input,
        EventKind::Change,
        EventKind::Submit,
        EventKind::Click,
    ];

    /// Live typing is subject to the delayed-show rule
    #[inline]
    #[must_use]
    pub fn is_live_typing(self) -> bool {
        matches!(self, Self::Input)
    }

    /// Host event name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Change => "change",
            Self::Submit => "submit",
            Self::Click => "click",
            Self::Forced => "forced",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification targeting a node, cancelable when it is a guarded action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    kind: EventKind,
    target: NodeId,
    cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl ActionEvent {
    /// Create cancelable event
    #[inline]
    #[must_use]
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Event whose default action cannot be prevented
    #[inline]
    #[must_use]
    pub fn non_cancelable(mut self) -> Self {
        self.cancelable = false;
        self
    }

    /// Event kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Event target
    #[inline]
    #[must_use]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Suppress the default action (no-op for non-cancelable events)
    #[inline]
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop further propagation
    #[inline]
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether the default action was suppressed
    #[inline]
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Whether propagation was stopped
    #[inline]
    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_input_is_live_typing() {
        assert!(EventKind::Input.is_live_typing());
        for kind in [EventKind::Change, EventKind::Submit, EventKind::Click, EventKind::Forced] {
            assert!(!kind.is_live_typing(), "{kind}");
        }
    }

    #[test]
    fn cancel_flags() {
        let mut event = ActionEvent::new(EventKind::Submit, NodeId::new(1));
        event.prevent_default();
        event.stop_propagation();
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());

        let mut event = ActionEvent::new(EventKind::Submit, NodeId::new(1)).non_cancelable();
        event.prevent_default();
        assert!(!event.default_prevented());
    }
}
