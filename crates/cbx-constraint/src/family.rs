//! Constraint families and comparison modes
//!
//! Every built-in except `regex` is one [`Family`] evaluated under one
//! [`Mode`]; the registry generates `min<Family>`, `max<Family>` and
//! `eq<Family>` for each family.

use crate::value::FieldValue;
use crate::verdict::{Verdict, ViolationValue};

/// Comparison mode; decides when `actual` versus `reference` is a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Floor: violated when actual < reference
    Min,
    /// Ceiling: violated when actual > reference
    Max,
    /// Equality: violated when actual != reference
    Eq,
}

impl Mode {
    /// All modes, in registration order
    pub const ALL: [Mode; 3] = [Mode::Min, Mode::Max, Mode::Eq];

    /// Name prefix
    #[inline]
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Eq => "eq",
        }
    }

    /// Compare totally ordered operands
    #[inline]
    #[must_use]
    pub fn violates<T: PartialOrd + ?Sized>(self, actual: &T, reference: &T) -> bool {
        match self {
            Self::Min => actual < reference,
            Self::Max => actual > reference,
            Self::Eq => actual != reference,
        }
    }

    /// Compare numbers; a NaN operand is always a violation
    #[inline]
    #[must_use]
    pub fn violates_number(self, actual: f64, reference: f64) -> bool {
        actual.is_nan() || reference.is_nan() || self.violates(&actual, &reference)
    }
}

/// Aggregation family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Count of chosen, non-empty fields (or options of a leading select)
    Set,
    /// Count of empty fields
    Empty,
    /// Sum of value lengths
    TextLength,
    /// String comparison against the reference or the first field
    Value,
    /// Numeric comparison against the reference or the first field
    Number,
}

impl Family {
    /// All families, in registration order
    pub const ALL: [Family; 5] = [
        Family::Set,
        Family::Empty,
        Family::TextLength,
        Family::Value,
        Family::Number,
    ];

    /// Family name as used in constraint names
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Set => "Set",
            Self::Empty => "Empty",
            Self::TextLength => "TextLength",
            Self::Value => "Value",
            Self::Number => "Number",
        }
    }

    /// Constraint name for this family under `mode`
    #[must_use]
    pub fn constraint_name(self, mode: Mode) -> String {
        format!("{}{}", mode.prefix(), self.name())
    }

    /// Evaluate over field snapshots
    #[must_use]
    pub fn evaluate(self, mode: Mode, fields: &[FieldValue], reference: Option<&str>) -> Verdict {
        match self {
            Self::Set => {
                let count = match fields.first().and_then(|f| f.options.as_deref()) {
                    Some(options) => options.iter().filter(|o| o.is_chosen()).count(),
                    None => fields.iter().filter(|f| f.is_chosen()).count(),
                };
                count_verdict(mode, count, reference)
            }
            Self::Empty => {
                let count = fields.iter().filter(|f| f.value.is_empty()).count();
                count_verdict(mode, count, reference)
            }
            Self::TextLength => {
                let length = fields.iter().map(|f| f.value.chars().count()).sum();
                count_verdict(mode, length, reference)
            }
            Self::Value => compare_to_first(fields, |actual, base| {
                mode.violates(actual, reference.unwrap_or(base))
            }),
            Self::Number => compare_to_first(fields, |actual, base| {
                let against = reference.map_or_else(|| parse_number(base), parse_number);
                mode.violates_number(parse_number(actual), against)
            }),
        }
    }
}

/// Parse a numeric operand: trimmed, empty is zero, garbage is NaN
///
/// Follows form-number rules rather than Rust's: unsigned `0x`/`0o`/`0b`
/// literals are accepted, and `Infinity` (optionally signed) is the only
/// spelling of a non-finite value. `inf`, `nan` and friends are NaN.
#[must_use]
pub fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    if let Some(radix_literal) = parse_radix(trimmed) {
        return radix_literal;
    }

    let unsigned = trimmed.trim_start_matches(['+', '-']);
    if unsigned.starts_with(|c: char| c.is_ascii_alphabetic()) && unsigned != "Infinity" {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

#[allow(clippy::cast_precision_loss)]
fn parse_radix(literal: &str) -> Option<f64> {
    let prefix = literal.get(..2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some(u64::from_str_radix(&literal[2..], radix).map_or(f64::NAN, |n| n as f64))
}

#[allow(clippy::cast_precision_loss)]
fn count_verdict(mode: Mode, count: usize, reference: Option<&str>) -> Verdict {
    let reference = reference.map_or(f64::NAN, parse_number);
    Verdict::new(mode.violates_number(count as f64, reference), count)
}

/// With a reference every field is compared to it, otherwise every field
/// after the first is compared to the first. Reports the first field's value.
fn compare_to_first(fields: &[FieldValue], violates: impl Fn(&str, &str) -> bool) -> Verdict {
    let Some((first, rest)) = fields.split_first() else {
        return Verdict::pass(ViolationValue::Absent);
    };
    let base = first.value.as_str();
    let violated = if violates(base, base) {
        true
    } else {
        rest.iter().any(|field| violates(&field.value, base))
    };
    Verdict::new(violated, base)
}
