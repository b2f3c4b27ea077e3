//! Error types for the engine
//!
//! Validation outcomes are never errors: unknown constraints, bad parameters
//! and unmatched selectors all degrade to "violated" or "skip". The errors
//! here cover configuration and lifecycle misuse only.

use cbx_constraint::ConstraintError;
use std::path::PathBuf;

/// Errors while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML could not be decoded
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// IO error reading a configuration file
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Decoded but unusable value
    #[error("invalid value for '{field}': {reason}")]
    Invalid {
        /// Offending config key
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create invalid value error
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Constraint evaluation error
    #[error("constraint error: {0}")]
    Constraint(#[from] ConstraintError),

    /// Debounced dispatch needs a tokio runtime
    #[error("no tokio runtime available for debounced dispatch")]
    NoRuntime,

    /// Engine is already installed on its document
    #[error("engine already installed")]
    AlreadyInstalled,

    /// Engine was torn down
    #[error("engine not installed")]
    NotInstalled,
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::invalid("class_prefix", "must not be empty");
        assert_eq!(
            err.to_string(),
            "invalid value for 'class_prefix': must not be empty"
        );
    }

    #[test]
    fn error_conversions() {
        let err: EngineError = ConfigError::invalid("message_token", "empty").into();
        assert!(matches!(err, EngineError::Config(_)));
        let err: EngineError = ConstraintError::UnknownConstraint("minFoo".into()).into();
        assert!(matches!(err, EngineError::Constraint(_)));
        assert_eq!(
            EngineError::NoRuntime.to_string(),
            "no tokio runtime available for debounced dispatch"
        );
    }
}
