//! Constraint results

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Detail interpolated into a box message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViolationValue {
    /// A count (chosen fields, empty fields, total length)
    Count(usize),
    /// A field value
    Text(String),
    /// Nothing meaningful to report
    #[default]
    Absent,
}

impl Display for ViolationValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(count) => write!(f, "{count}"),
            Self::Text(text) => f.write_str(text),
            Self::Absent => Ok(()),
        }
    }
}

impl From<usize> for ViolationValue {
    fn from(count: usize) -> Self {
        Self::Count(count)
    }
}

impl From<String> for ViolationValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ViolationValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Outcome of one constraint evaluation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the constraint is violated
    pub violated: bool,
    /// Detail for the message template
    pub value: ViolationValue,
}

impl Verdict {
    /// Create verdict
    #[inline]
    #[must_use]
    pub fn new(violated: bool, value: impl Into<ViolationValue>) -> Self {
        Self {
            violated,
            value: value.into(),
        }
    }

    /// Satisfied constraint
    #[inline]
    #[must_use]
    pub fn pass(value: impl Into<ViolationValue>) -> Self {
        Self::new(false, value)
    }

    /// Violated constraint
    #[inline]
    #[must_use]
    pub fn fail(value: impl Into<ViolationValue>) -> Self {
        Self::new(true, value)
    }

    /// Violation with no detail, used when a constraint cannot be evaluated
    #[inline]
    #[must_use]
    pub fn unconditional() -> Self {
        Self::fail(ViolationValue::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_value_display() {
        assert_eq!(ViolationValue::Count(3).to_string(), "3");
        assert_eq!(ViolationValue::from("abc").to_string(), "abc");
        assert_eq!(ViolationValue::Absent.to_string(), "");
    }

    #[test]
    fn verdict_constructors() {
        assert!(Verdict::fail(1usize).violated);
        assert!(!Verdict::pass(1usize).violated);
        assert_eq!(Verdict::unconditional().value, ViolationValue::Absent);
    }
}
