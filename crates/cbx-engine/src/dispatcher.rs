//! Debounced event dispatch
//!
//! Live-typing and committed-change notifications are coalesced per field:
//! a notification for the field that is still pending restarts its timer,
//! anything else starts a fresh timer. Only one field is tracked at a time,
//! so a timer started for an earlier field keeps running when another field
//! is notified and can no longer be restarted. It can still be cancelled:
//! [`Dispatcher::cancel_pending`] and drop abort every timer not yet fired.
//!
//! When a timer fires the field is widened to its field group (all radios of
//! the same name in the same form), the group's dependants are resolved and
//! every dependant is checked once with the original event kind.

use crate::checker::CheckOutcome;
use crate::error::{EngineError, EngineResult};
use crate::event::EventKind;
use crate::validator::Validator;
use cbx_dom::{Document, NodeId};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Dispatch counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Notifications received
    pub notifications: u64,
    /// Pending timers restarted by a repeat notification
    pub restarts: u64,
    /// Timers that fired
    pub settled: u64,
    /// Box checks run by fired timers
    pub checks: u64,
}

/// The single pending field and its timer
#[derive(Debug, Default)]
struct DebounceSlot {
    field: Option<NodeId>,
    generation: u64,
    /// Generation whose timer was restarted; it must not settle
    restarted: Option<u64>,
    /// Bumped on cancel; timers from an older epoch must not settle
    epoch: u64,
    handle: Option<JoinHandle<()>>,
    /// Timers of fields that lost the slot
    detached: Vec<JoinHandle<()>>,
}

impl DebounceSlot {
    fn abort_all(&mut self) -> usize {
        self.epoch = self.epoch.wrapping_add(1);
        self.field = None;
        let mut aborted = 0;
        for handle in self.handle.take().into_iter().chain(self.detached.drain(..)) {
            if !handle.is_finished() {
                aborted += 1;
            }
            handle.abort();
        }
        aborted
    }
}

/// Debounced dispatcher over a shared document
pub struct Dispatcher<D> {
    document: Arc<Mutex<D>>,
    validator: Arc<Validator>,
    window: Duration,
    slot: Arc<Mutex<DebounceSlot>>,
    stats: Arc<Mutex<DispatchStats>>,
}

impl<D> std::fmt::Debug for Dispatcher<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.slot.lock();
        f.debug_struct("Dispatcher")
            .field("window", &self.window)
            .field("pending", &slot.field)
            .field("stats", &*self.stats.lock())
            .finish_non_exhaustive()
    }
}

impl<D: Document + Send + 'static> Dispatcher<D> {
    /// Create dispatcher
    #[must_use]
    pub fn new(document: Arc<Mutex<D>>, validator: Arc<Validator>, window: Duration) -> Self {
        Self {
            document,
            validator,
            window,
            slot: Arc::new(Mutex::new(DebounceSlot::default())),
            stats: Arc::new(Mutex::new(DispatchStats::default())),
        }
    }

    /// Quiescence window
    #[inline]
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule a check of `field`'s dependants after the quiescence window
    ///
    /// # Errors
    /// `EngineError::NoRuntime` when called outside a tokio runtime.
    pub fn notify(&self, kind: EventKind, field: NodeId) -> EngineResult<()> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        let mut slot = self.slot.lock();
        self.stats.lock().notifications += 1;

        slot.detached.retain(|handle| !handle.is_finished());
        if let Some(handle) = slot.handle.take() {
            if slot.field == Some(field) {
                handle.abort();
                slot.restarted = Some(slot.generation);
                self.stats.lock().restarts += 1;
                debug!(%field, "debounce restarted");
            } else {
                slot.detached.push(handle);
            }
        }

        slot.generation = slot.generation.wrapping_add(1);
        slot.field = Some(field);
        let generation = slot.generation;
        let epoch = slot.epoch;

        let document = Arc::clone(&self.document);
        let validator = Arc::clone(&self.validator);
        let slot_ref = Arc::clone(&self.slot);
        let stats = Arc::clone(&self.stats);
        let window = self.window;

        slot.handle = Some(runtime.spawn(async move {
            tokio::time::sleep(window).await;
            {
                let mut slot = slot_ref.lock();
                if slot.restarted == Some(generation) || slot.epoch != epoch {
                    return;
                }
                if slot.generation == generation {
                    slot.field = None;
                    slot.handle = None;
                }
            }

            let outcomes = settle(&document, &validator, kind, field);
            let mut stats = stats.lock();
            stats.settled += 1;
            stats.checks += outcomes.len() as u64;
        }));

        Ok(())
    }

    /// Field currently awaiting its timer
    #[must_use]
    pub fn pending(&self) -> Option<NodeId> {
        self.slot.lock().field
    }

    /// Abort every timer that has not fired yet
    ///
    /// This includes timers of fields that were notified before the
    /// currently pending one. Returns the number of timers aborted.
    pub fn cancel_pending(&self) -> usize {
        let aborted = self.slot.lock().abort_all();
        if aborted > 0 {
            debug!(aborted, "pending timers aborted");
        }
        aborted
    }

    /// Counters so far
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        *self.stats.lock()
    }
}

impl<D> Drop for Dispatcher<D> {
    fn drop(&mut self) {
        self.slot.lock().abort_all();
    }
}

/// Resolve and check the dependants of `field`'s group
fn settle<D: Document>(
    document: &Mutex<D>,
    validator: &Validator,
    kind: EventKind,
    field: NodeId,
) -> Vec<CheckOutcome> {
    let mut doc = document.lock();
    let group = field_group(&*doc, field);
    let outcomes = validator.revalidate(&mut *doc, kind, &group);
    debug!(%field, %kind, group = group.len(), checks = outcomes.len(), "settled");
    outcomes
}

/// Fields re-validated together with `field`
///
/// A radio expands to every radio sharing its name and owning form;
/// anything else is a singleton.
pub fn field_group<D: Document + ?Sized>(doc: &D, field: NodeId) -> Vec<NodeId> {
    let name = match (doc.field_type(field).as_deref(), doc.attribute(field, "name")) {
        (Some("radio"), Some(name)) if !name.is_empty() => name,
        _ => return vec![field],
    };
    let form = doc.form_of(field);

    doc.query_all("input", None)
        .into_iter()
        .filter(|&other| {
            doc.field_type(other).as_deref() == Some("radio")
                && doc.attribute(other, "name").as_deref() == Some(name.as_str())
                && doc.form_of(other) == form
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbx_dom::{Element, MemoryDocument};
    use pretty_assertions::assert_eq;

    fn radio(name: &str, value: &str) -> Element {
        Element::new("input")
            .attr("type", "radio")
            .attr("name", name)
            .attr("value", value)
    }

    #[test]
    fn radio_group_is_scoped_to_form() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let form = doc.append(root, Element::new("form")).unwrap();
        let other_form = doc.append(root, Element::new("form")).unwrap();
        let r1 = doc.append(form, radio("size", "s")).unwrap();
        let r2 = doc.append(form, radio("size", "m")).unwrap();
        let fieldset = doc.append(form, Element::new("fieldset")).unwrap();
        let r3 = doc.append(fieldset, radio("size", "l")).unwrap();
        doc.append(form, radio("color", "red")).unwrap();
        doc.append(other_form, radio("size", "xl")).unwrap();

        assert_eq!(field_group(&doc, r2), vec![r1, r2, r3]);
    }

    #[test]
    fn non_radio_is_singleton() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let text = doc.append(root, Element::new("input").attr("name", "size")).unwrap();
        let nameless = doc.append(root, Element::new("input").attr("type", "radio")).unwrap();

        assert_eq!(field_group(&doc, text), vec![text]);
        assert_eq!(field_group(&doc, nameless), vec![nameless]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_aborts_superseded_timers() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let a = doc.append(root, Element::new("input")).unwrap();
        let b = doc.append(root, Element::new("input")).unwrap();
        let validator = Arc::new(Validator::new(
            Arc::new(cbx_constraint::ConstraintRegistry::builtin()),
            &crate::config::EngineConfig::default(),
        ));
        let document = Arc::new(Mutex::new(doc));
        let dispatcher = Dispatcher::new(document, validator, Duration::from_millis(10));

        dispatcher.notify(EventKind::Change, a).unwrap();
        dispatcher.notify(EventKind::Change, b).unwrap();
        assert_eq!(dispatcher.cancel_pending(), 2);
        assert_eq!(dispatcher.pending(), None);
        assert_eq!(dispatcher.cancel_pending(), 0);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(dispatcher.stats().settled, 0);
    }

    #[test]
    fn notify_without_runtime_fails() {
        let document = Arc::new(Mutex::new(MemoryDocument::new()));
        let validator = Arc::new(Validator::new(
            Arc::new(cbx_constraint::ConstraintRegistry::builtin()),
            &crate::config::EngineConfig::default(),
        ));
        let dispatcher = Dispatcher::new(document, validator, Duration::from_millis(10));

        let result = dispatcher.notify(EventKind::Input, NodeId::new(1));
        assert!(matches!(result, Err(EngineError::NoRuntime)));
        assert_eq!(dispatcher.stats(), DispatchStats::default());
    }
}
