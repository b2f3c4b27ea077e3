//! Constraint registry
//!
//! Provides [`ConstraintRegistry`] for resolving constraint names to
//! functions. Built-ins are generated once from the family x mode cross
//! product; custom constraints are kept in a separate table that is consulted
//! first, so a custom constraint can override a built-in of the same name.

use crate::error::ConstraintError;
use crate::family::{Family, Mode};
use crate::value::FieldValue;
use crate::verdict::{Verdict, ViolationValue};
use indexmap::IndexMap;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Name of the pattern constraint
pub const REGEX: &str = "regex";

/// Constraint function: `(fields, param) -> verdict`
///
/// Must be pure: it only sees snapshots and never touches the document.
pub type ConstraintFn =
    Arc<dyn Fn(&[FieldValue], Option<&str>) -> Result<Verdict, ConstraintError> + Send + Sync>;

/// Registry of constraint functions by name
#[derive(Clone, Default)]
pub struct ConstraintRegistry {
    builtin: IndexMap<String, ConstraintFn>,
    custom: IndexMap<String, ConstraintFn>,
}

impl ConstraintRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with the 16 built-in constraints
    #[must_use]
    pub fn builtin() -> Self {
        let mut builtin: IndexMap<String, ConstraintFn> = IndexMap::new();
        for family in Family::ALL {
            for mode in Mode::ALL {
                let f: ConstraintFn = Arc::new(move |fields: &[FieldValue], param: Option<&str>| {
                    Ok::<_, ConstraintError>(family.evaluate(mode, fields, param))
                });
                builtin.insert(family.constraint_name(mode), f);
            }
        }
        builtin.insert(REGEX.to_string(), regex_constraint());

        Self {
            builtin,
            custom: IndexMap::new(),
        }
    }

    /// Register an infallible custom constraint
    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[FieldValue], Option<&str>) -> Verdict + Send + Sync + 'static,
    {
        let wrapped: ConstraintFn = Arc::new(
            move |fields: &[FieldValue], param: Option<&str>| -> Result<Verdict, ConstraintError> {
                Ok(f(fields, param))
            },
        );
        self.register_fn(name, wrapped);
    }

    /// Register a custom constraint function as-is
    pub fn register_fn(&mut self, name: impl Into<String>, f: ConstraintFn) {
        let name = name.into();
        if self.builtin.contains_key(&name) {
            debug!(%name, "custom constraint overrides built-in");
        }
        self.custom.insert(name, f);
    }

    /// Builder-style [`ConstraintRegistry::register`]
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[FieldValue], Option<&str>) -> Verdict + Send + Sync + 'static,
    {
        self.register(name, f);
        self
    }

    /// Remove a custom constraint, revealing any built-in of the same name
    #[inline]
    pub fn remove_custom(&mut self, name: &str) -> bool {
        self.custom.shift_remove(name).is_some()
    }

    /// Check if a constraint exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.custom.contains_key(name) || self.builtin.contains_key(name)
    }

    /// Whether `name` resolves to a custom constraint
    #[inline]
    #[must_use]
    pub fn is_custom(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    /// Resolve name, custom first
    #[inline]
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ConstraintFn> {
        self.custom.get(name).or_else(|| self.builtin.get(name))
    }

    /// Evaluate constraint `name`
    ///
    /// # Errors
    /// - `ConstraintError::UnknownConstraint` if `name` is not registered
    /// - whatever the constraint itself reports (e.g. `InvalidPattern`)
    pub fn evaluate(
        &self,
        name: &str,
        fields: &[FieldValue],
        param: Option<&str>,
    ) -> Result<Verdict, ConstraintError> {
        let f = self
            .lookup(name)
            .ok_or_else(|| ConstraintError::UnknownConstraint(name.to_string()))?;
        f(fields, param)
    }

    /// All resolvable names: built-ins in generation order, then custom-only names
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.builtin
            .keys()
            .chain(self.custom.keys().filter(|k| !self.builtin.contains_key(*k)))
            .map(String::as_str)
            .collect()
    }

    /// Number of resolvable names
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names().len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builtin.is_empty() && self.custom.is_empty()
    }
}

impl fmt::Debug for ConstraintRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintRegistry")
            .field("builtin", &self.builtin.keys().collect::<Vec<_>>())
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// `regex`: violated when any value does not contain a match for the pattern
///
/// Reports the first non-matching value. A missing pattern matches
/// everything. Compiled patterns are cached per registry.
fn regex_constraint() -> ConstraintFn {
    let cache: Mutex<HashMap<String, Regex>> = Mutex::new(HashMap::new());

    Arc::new(move |fields: &[FieldValue], param: Option<&str>| -> Result<Verdict, ConstraintError> {
        let pattern = param.unwrap_or_default();
        let compiled = {
            let mut cache = cache.lock();
            match cache.get(pattern) {
                Some(compiled) => compiled.clone(),
                None => {
                    let compiled = Regex::new(pattern)
                        .map_err(|source| ConstraintError::invalid_pattern(pattern, source))?;
                    cache.insert(pattern.to_string(), compiled.clone());
                    compiled
                }
            }
        };

        Ok(match fields.iter().find(|f| !compiled.is_match(&f.value)) {
            Some(mismatch) => Verdict::fail(mismatch.value.as_str()),
            None => Verdict::pass(ViolationValue::Absent),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(values: &[&str]) -> Vec<FieldValue> {
        values.iter().map(|v| FieldValue::text(*v)).collect()
    }

    #[test]
    fn registry_new_empty() {
        let registry = ConstraintRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn builtin_has_sixteen() {
        let registry = ConstraintRegistry::builtin();
        assert_eq!(registry.len(), 16);
        for name in [
            "minSet", "maxSet", "eqSet",
            "minEmpty", "maxEmpty", "eqEmpty",
            "minTextLength", "maxTextLength", "eqTextLength",
            "minValue", "maxValue", "eqValue",
            "minNumber", "maxNumber", "eqNumber",
            "regex",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
        assert!(!registry.is_custom("minSet"));
    }

    #[test]
    fn regex_reports_first_mismatch() {
        let registry = ConstraintRegistry::builtin();
        let verdict = registry
            .evaluate(REGEX, &texts(&["abc", "123"]), Some(r"^\d+$"))
            .unwrap();
        assert_eq!(verdict, Verdict::fail("abc"));

        let verdict = registry
            .evaluate(REGEX, &texts(&["12", "123"]), Some(r"^\d+$"))
            .unwrap();
        assert_eq!(verdict, Verdict::pass(ViolationValue::Absent));
    }

    #[test]
    fn regex_is_unanchored_search() {
        let registry = ConstraintRegistry::builtin();
        assert!(!registry.evaluate(REGEX, &texts(&["a1b"]), Some(r"\d")).unwrap().violated);
        assert!(!registry.evaluate(REGEX, &texts(&["anything"]), None).unwrap().violated);
    }

    #[test]
    fn regex_invalid_pattern_errors() {
        let registry = ConstraintRegistry::builtin();
        let result = registry.evaluate(REGEX, &texts(&["x"]), Some("(unclosed"));
        assert!(matches!(result, Err(ConstraintError::InvalidPattern { .. })));
    }

    #[test]
    fn unknown_constraint_errors() {
        let registry = ConstraintRegistry::builtin();
        let result = registry.evaluate("minFoo", &[], None);
        assert!(matches!(
            result,
            Err(ConstraintError::UnknownConstraint(name)) if name == "minFoo"
        ));
    }

    #[test]
    fn custom_overrides_builtin() {
        let registry = ConstraintRegistry::builtin().with("minSet", |_, _| Verdict::pass("custom"));
        assert!(registry.is_custom("minSet"));
        assert_eq!(registry.len(), 16);

        let verdict = registry.evaluate("minSet", &[], Some("5")).unwrap();
        assert_eq!(verdict, Verdict::pass("custom"));
    }

    #[test]
    fn remove_custom_restores_builtin() {
        let mut registry = ConstraintRegistry::builtin();
        registry.register("minSet", |_, _| Verdict::pass(ViolationValue::Absent));
        assert!(registry.remove_custom("minSet"));

        let verdict = registry.evaluate("minSet", &[], Some("1")).unwrap();
        assert_eq!(verdict, Verdict::fail(0usize));
    }

    #[test]
    fn custom_only_names_are_listed() {
        let mut registry = ConstraintRegistry::builtin();
        let odd: ConstraintFn = Arc::new(
            |fields: &[FieldValue], _: Option<&str>| -> Result<Verdict, ConstraintError> {
                Ok(Verdict::new(fields.len() % 2 == 1, fields.len()))
            },
        );
        registry.register_fn("odd", odd);

        let names = registry.names();
        assert_eq!(names.len(), 17);
        assert_eq!(names.last(), Some(&"odd"));
        assert!(registry.evaluate("odd", &texts(&["a"]), None).unwrap().violated);
    }
}
