//! Engine bootstrap and event routing
//!
//! [`Cbx`] owns one installation on a shared document: the initial forced
//! checks, the hide rule, the debounced dispatcher and the submission guard.
//! Hosts forward every notification of a [listened kind](Cbx::listened_kinds)
//! to [`Cbx::handle`].
//!
//! ```
//! use cbx_dom::{Document, Element, MemoryDocument};
//! use cbx_engine::{ActionEvent, CbxBuilder, EventKind};
//!
//! let mut doc = MemoryDocument::new();
//! let form = doc.append(doc.root(), Element::new("form")).unwrap();
//! doc.append(form, Element::new("input").id("name")).unwrap();
//! doc.append(
//!     form,
//!     Element::new("div")
//!         .class("cbx")
//!         .attr("data-selectors", "#name")
//!         .attr("data-constraint", "minTextLength")
//!         .attr("data-param", "1"),
//! )
//! .unwrap();
//!
//! let cbx = CbxBuilder::new().install(doc).unwrap();
//! let mut submit = ActionEvent::new(EventKind::Submit, form);
//! let outcome = cbx.handle(&mut submit).unwrap().unwrap();
//! assert!(outcome.blocked());
//! assert!(submit.default_prevented());
//! ```

use crate::checker::CheckOutcome;
use crate::config::EngineConfig;
use crate::dispatcher::{DispatchStats, Dispatcher};
use crate::error::{EngineError, EngineResult};
use crate::event::{ActionEvent, EventKind};
use crate::guard::{Guard, GuardOutcome};
use crate::validator::Validator;
use cbx_constraint::{ConstraintFn, ConstraintRegistry, FieldValue, Verdict};
use cbx_dom::{Document, HideRule, NodeId, RuleId};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Builder for [`Cbx`]
#[derive(Debug, Clone)]
pub struct CbxBuilder {
    config: EngineConfig,
    registry: ConstraintRegistry,
}

impl CbxBuilder {
    /// Builder with default configuration and the built-in constraints
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            registry: ConstraintRegistry::builtin(),
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the debounce window
    #[must_use]
    pub fn debounce(mut self, window: Duration) -> Self {
        self.config = self.config.with_debounce(window);
        self
    }

    /// Only visible boxes carrying `marker` block guarded actions
    #[must_use]
    pub fn error_marker(mut self, marker: impl Into<String>) -> Self {
        self.config = self.config.with_error_marker(marker);
        self
    }

    /// Add or override a constraint
    #[must_use]
    pub fn constraint<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[FieldValue], Option<&str>) -> Verdict + Send + Sync + 'static,
    {
        self.registry.register(name, f);
        self
    }

    /// Add or override a fallible constraint
    #[must_use]
    pub fn constraint_fn(mut self, name: impl Into<String>, f: ConstraintFn) -> Self {
        self.registry.register_fn(name, f);
        self
    }

    /// Install on an owned document
    ///
    /// # Errors
    /// Invalid configuration.
    pub fn install<D: Document + Send + 'static>(self, doc: D) -> EngineResult<Cbx<D>> {
        self.install_shared(Arc::new(Mutex::new(doc)))
    }

    /// Install on a document shared with the host
    ///
    /// # Errors
    /// Invalid configuration.
    pub fn install_shared<D: Document + Send + 'static>(
        self,
        document: Arc<Mutex<D>>,
    ) -> EngineResult<Cbx<D>> {
        self.config.validate()?;

        let validator = Arc::new(Validator::new(Arc::new(self.registry), &self.config));
        let mut cbx = Cbx {
            dispatcher: Dispatcher::new(
                Arc::clone(&document),
                Arc::clone(&validator),
                self.config.debounce(),
            ),
            guard: Guard::new(Arc::clone(&validator), &self.config),
            document,
            validator,
            config: self.config,
            hide_rule: None,
        };
        cbx.reinstall()?;
        Ok(cbx)
    }
}

impl Default for CbxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Installed validation engine
pub struct Cbx<D: Document + Send + 'static> {
    document: Arc<Mutex<D>>,
    config: EngineConfig,
    validator: Arc<Validator>,
    dispatcher: Dispatcher<D>,
    guard: Guard,
    hide_rule: Option<RuleId>,
}

impl<D: Document + Send + 'static> std::fmt::Debug for Cbx<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cbx")
            .field("config", &self.config)
            .field("installed", &self.is_installed())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl<D: Document + Send + 'static> Cbx<D> {
    /// Notification kinds the host must forward
    #[must_use]
    pub fn listened_kinds(&self) -> &'static [EventKind] {
        &EventKind::LISTENED
    }

    /// Force-check initial boxes and install the hide rule again after
    /// [`Cbx::teardown`]
    ///
    /// # Errors
    /// `EngineError::AlreadyInstalled` while installed.
    pub fn reinstall(&mut self) -> EngineResult<Vec<CheckOutcome>> {
        if self.hide_rule.is_some() {
            return Err(EngineError::AlreadyInstalled);
        }

        let markers = self.config.markers();
        let mut doc = self.document.lock();
        let initial = doc.query_all(&markers.initial_selector(), None);
        let outcomes = self
            .validator
            .checker()
            .check_all(&mut *doc, EventKind::Forced, initial);
        self.hide_rule = Some(doc.install_hide_rule(&HideRule::for_prefix(&markers.prefix)));

        info!(prefix = %markers.prefix, initial = outcomes.len(), "installed");
        Ok(outcomes)
    }

    /// Remove the hide rule and abort every timer that has not fired
    ///
    /// `handle` is a no-op afterwards.
    ///
    /// # Errors
    /// `EngineError::NotInstalled` if already torn down.
    pub fn teardown(&mut self) -> EngineResult<()> {
        let rule = self.hide_rule.take().ok_or(EngineError::NotInstalled)?;
        self.dispatcher.cancel_pending();
        self.document.lock().remove_hide_rule(rule);
        info!("torn down");
        Ok(())
    }

    /// Whether the engine is installed
    #[inline]
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.hide_rule.is_some()
    }

    /// Route a host notification
    ///
    /// Live-typing and change notifications are debounced and yield `None`.
    /// Submissions and clicks on controls naming fields to validate run the
    /// guard immediately and yield its outcome.
    ///
    /// # Errors
    /// `EngineError::NoRuntime` when a debounced notification arrives outside
    /// a tokio runtime.
    pub fn handle(&self, event: &mut ActionEvent) -> EngineResult<Option<GuardOutcome>> {
        if !self.is_installed() {
            debug!(kind = %event.kind(), "ignored while torn down");
            return Ok(None);
        }

        match event.kind() {
            EventKind::Input | EventKind::Change => {
                self.dispatcher.notify(event.kind(), event.target())?;
                Ok(None)
            }
            EventKind::Submit => {
                let mut doc = self.document.lock();
                let fields = doc.query_all(&self.config.field_selector, Some(event.target()));
                Ok(Some(self.guard.stop_on_broken_constraints(&mut *doc, event, &fields)))
            }
            EventKind::Click => {
                let mut doc = self.document.lock();
                let attr = &self.config.click_validates_attr;
                let Some(selector) = doc.attribute(event.target(), attr) else {
                    return Ok(None);
                };
                let fields = doc.query_all(&selector, None);
                Ok(Some(self.guard.stop_on_broken_constraints(&mut *doc, event, &fields)))
            }
            EventKind::Forced => {
                self.validate_fields(EventKind::Forced, &[event.target()]);
                Ok(None)
            }
        }
    }

    /// Run the guard over an explicit field set
    pub fn stop_on_broken_constraints(
        &self,
        event: &mut ActionEvent,
        fields: &[NodeId],
    ) -> GuardOutcome {
        let mut doc = self.document.lock();
        self.guard.stop_on_broken_constraints(&mut *doc, event, fields)
    }

    /// Check the dependants of `fields` immediately, bypassing the debounce
    pub fn validate_fields(&self, kind: EventKind, fields: &[NodeId]) -> Vec<CheckOutcome> {
        let mut doc = self.document.lock();
        self.validator.revalidate(&mut *doc, kind, fields)
    }

    /// Field awaiting its debounce timer
    #[must_use]
    pub fn pending(&self) -> Option<NodeId> {
        self.dispatcher.pending()
    }

    /// Dispatch counters
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Constraint registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ConstraintRegistry {
        self.validator.checker().registry()
    }

    /// Shared document handle
    #[must_use]
    pub fn document(&self) -> Arc<Mutex<D>> {
        Arc::clone(&self.document)
    }

    /// Run `f` with the document locked
    pub fn with_document<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        f(&mut *self.document.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbx_dom::{Element, MemoryDocument};
    use pretty_assertions::assert_eq;

    fn counter_doc() -> (MemoryDocument, NodeId, NodeId) {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let field = doc.append(root, Element::new("textarea").id("bio")).unwrap();
        let counter = doc
            .append(
                root,
                Element::new("div")
                    .class("cbx")
                    .class("cbx--initial")
                    .attr("data-selectors", "#bio")
                    .attr("data-constraint", "minTextLength")
                    .attr("data-param", "1000")
                    .attr("data-message", "%value% characters"),
            )
            .unwrap();
        (doc, field, counter)
    }

    #[test]
    fn install_checks_initial_boxes_and_hides_others() {
        let (mut doc, _, counter) = counter_doc();
        let plain = doc
            .append(
                doc.root(),
                Element::new("div")
                    .class("cbx")
                    .attr("data-selectors", "#bio")
                    .attr("data-constraint", "minTextLength")
                    .attr("data-param", "1"),
            )
            .unwrap();

        let cbx = CbxBuilder::new().install(doc).unwrap();
        cbx.with_document(|doc| {
            assert!(doc.has_class(counter, "cbx--visible"));
            assert_eq!(doc.content(counter), Some("0 characters"));
            assert!(doc.is_rendered(counter));
            assert!(!doc.is_rendered(plain));
            assert_eq!(doc.hide_rules().count(), 1);
        });
    }

    #[test]
    fn teardown_and_reinstall() {
        let (doc, _, _) = counter_doc();
        let mut cbx = CbxBuilder::new().install(doc).unwrap();

        assert!(matches!(cbx.reinstall(), Err(EngineError::AlreadyInstalled)));
        cbx.teardown().unwrap();
        assert!(!cbx.is_installed());
        assert!(matches!(cbx.teardown(), Err(EngineError::NotInstalled)));
        cbx.with_document(|doc| assert_eq!(doc.hide_rules().count(), 0));

        let outcomes = cbx.reinstall().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(cbx.is_installed());
    }

    #[test]
    fn handle_is_noop_after_teardown() {
        let (doc, field, _) = counter_doc();
        let mut cbx = CbxBuilder::new().install(doc).unwrap();
        cbx.teardown().unwrap();

        let mut event = ActionEvent::new(EventKind::Input, field);
        assert!(cbx.handle(&mut event).unwrap().is_none());
        assert_eq!(cbx.stats(), DispatchStats::default());
    }

    #[test]
    fn click_without_attribute_is_ignored() {
        let (doc, field, _) = counter_doc();
        let cbx = CbxBuilder::new().install(doc).unwrap();

        let mut event = ActionEvent::new(EventKind::Click, field);
        assert!(cbx.handle(&mut event).unwrap().is_none());
        assert!(!event.default_prevented());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let (doc, _, _) = counter_doc();
        let config = EngineConfig::default().with_class_prefix("");
        let result = CbxBuilder::new().config(config).install(doc);
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn listened_kinds_exclude_forced() {
        let (doc, _, _) = counter_doc();
        let cbx = CbxBuilder::new().install(doc).unwrap();
        let kinds = cbx.listened_kinds();
        assert_eq!(kinds.len(), 4);
        assert!(!kinds.contains(&EventKind::Forced));
    }

    #[test]
    fn custom_constraint_overrides_builtin() {
        let (doc, field, counter) = counter_doc();
        let cbx = CbxBuilder::new()
            .constraint("minTextLength", |_, _| Verdict::pass(0usize))
            .install(doc)
            .unwrap();

        assert!(cbx.registry().is_custom("minTextLength"));
        let outcomes = cbx.validate_fields(EventKind::Change, &[field]);
        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].visible);
        cbx.with_document(|doc| assert!(!doc.has_class(counter, "cbx--visible")));
    }
}
