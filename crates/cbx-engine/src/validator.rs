//! Resolve-then-check pipeline shared by the dispatcher and the guard

use crate::checker::{CheckOutcome, Checker};
use crate::config::EngineConfig;
use crate::event::EventKind;
use crate::resolver::Resolver;
use cbx_constraint::ConstraintRegistry;
use cbx_dom::{Document, NodeId};
use std::sync::Arc;

/// Resolver and checker bound to one configuration
#[derive(Debug, Clone)]
pub struct Validator {
    resolver: Resolver,
    checker: Checker,
}

impl Validator {
    /// Create validator
    #[must_use]
    pub fn new(registry: Arc<ConstraintRegistry>, config: &EngineConfig) -> Self {
        Self {
            resolver: Resolver::new(config.markers()),
            checker: Checker::new(registry, config),
        }
    }

    /// Dependency resolver
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Box checker
    #[inline]
    #[must_use]
    pub fn checker(&self) -> &Checker {
        &self.checker
    }

    /// Check every dependant of `fields` once, in first-seen order
    pub fn revalidate<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        kind: EventKind,
        fields: &[NodeId],
    ) -> Vec<CheckOutcome> {
        let boxes = self.resolver.dependants_of(&*doc, fields);
        self.checker.check_all(doc, kind, boxes)
    }
}
