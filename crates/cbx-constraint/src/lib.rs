//! CBX Constraint System
//!
//! Named, pure constraint functions over snapshotted field values.
//!
//! # Core Concepts
//!
//! - [`FieldValue`]: value/selection snapshot of one field ([`extract`])
//! - [`Family`] x [`Mode`]: the generated built-ins (`minSet`, `maxTextLength`,
//!   `eqValue`, ...), plus `regex`
//! - [`Verdict`]: `(violated, violation value)` pair returned by every constraint
//! - [`ConstraintRegistry`]: name lookup, custom constraints shadow built-ins
//!
//! # Example
//!
//! ```rust
//! use cbx_constraint::{ConstraintRegistry, FieldValue, ViolationValue};
//!
//! let registry = ConstraintRegistry::builtin();
//! let fields = vec![FieldValue::text("abc"), FieldValue::text("123")];
//!
//! let verdict = registry.evaluate("regex", &fields, Some(r"^\d+$")).unwrap();
//! assert!(verdict.violated);
//! assert_eq!(verdict.value, ViolationValue::Text("abc".to_string()));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod family;
mod registry;
mod value;
mod verdict;

// Re-exports
pub use error::ConstraintError;
pub use family::{parse_number, Family, Mode};
pub use registry::{ConstraintFn, ConstraintRegistry, REGEX};
pub use value::{extract, extract_one, FieldValue};
pub use verdict::{Verdict, ViolationValue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
