//! Error types for constraint evaluation

/// Errors while evaluating a constraint
#[derive(Debug, thiserror::Error)]
pub enum ConstraintError {
    /// Name is neither custom nor built-in
    #[error("unknown constraint: '{0}'")]
    UnknownConstraint(String),

    /// `regex` parameter does not compile
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern as written in `data-param`
        pattern: String,
        /// Compiler error
        #[source]
        source: regex::Error,
    },
}

impl ConstraintError {
    /// Create invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }
}
