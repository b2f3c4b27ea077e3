//! Node handles
//!
//! Provides [`NodeId`], the opaque handle a [`Document`](crate::Document)
//! hands out for its elements.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Opaque, copyable handle to an element of a document
///
/// Handles are only meaningful for the document that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Create handle from raw value
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Arena index for the in-memory document
    #[inline]
    #[must_use]
    pub(crate) fn index(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }

    #[inline]
    #[must_use]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u64)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}
