//! Engine configuration
//!
//! Provides [`EngineConfig`] (serde, TOML-loadable) and [`Markers`], the
//! class names derived from the configured prefix.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Debounce quiescence window in milliseconds
    pub debounce_ms: u64,
    /// Prefix of the box marker classes
    pub class_prefix: String,
    /// When set, only visible boxes carrying this class block a guarded action
    pub error_marker: Option<String>,
    /// Token replaced by the violation value in messages
    pub message_token: String,
    /// Attribute on a click target naming the fields it validates
    pub click_validates_attr: String,
    /// Fields validated when a form is submitted
    pub field_selector: String,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With debounce window
    #[inline]
    #[must_use]
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With class prefix
    #[inline]
    #[must_use]
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    /// With error marker class
    #[inline]
    #[must_use]
    pub fn with_error_marker(mut self, marker: impl Into<String>) -> Self {
        self.error_marker = Some(marker.into());
        self
    }

    /// With message token
    #[inline]
    #[must_use]
    pub fn with_message_token(mut self, token: impl Into<String>) -> Self {
        self.message_token = token.into();
        self
    }

    /// Debounce window
    #[inline]
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Marker class names for the configured prefix
    #[inline]
    #[must_use]
    pub fn markers(&self) -> Markers {
        Markers::new(&self.class_prefix)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.class_prefix.is_empty() {
            return Err(ConfigError::invalid("class_prefix", "must not be empty"));
        }
        if !self
            .class_prefix
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::invalid(
                "class_prefix",
                format!("'{}' is not a valid class name", self.class_prefix),
            ));
        }
        if self.message_token.is_empty() {
            return Err(ConfigError::invalid("message_token", "must not be empty"));
        }
        if self.field_selector.trim().is_empty() {
            return Err(ConfigError::invalid("field_selector", "must not be empty"));
        }
        Ok(())
    }

    /// Decode and validate TOML
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, decode and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|source| ConfigError::io_error(path, source))?;
        Self::from_toml_str(&source)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 10,
            class_prefix: "cbx".to_string(),
            error_marker: None,
            message_token: "%value%".to_string(),
            click_validates_attr: "data-click-validates".to_string(),
            field_selector: "input, textarea, select".to_string(),
        }
    }
}

/// Class names and selectors derived from the class prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    /// Bare prefix; every box carries it as a class
    pub prefix: String,
    /// Selector matching every box
    pub box_selector: String,
    /// Class present while a box is shown
    pub visible: String,
    /// Class forcing immediate visibility updates on live typing
    pub insta: String,
    /// Class of boxes force-checked at install
    pub initial: String,
}

impl Markers {
    /// Derive markers for prefix
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            box_selector: format!(".{prefix}"),
            visible: format!("{prefix}--visible"),
            insta: format!("{prefix}--insta"),
            initial: format!("{prefix}--initial"),
        }
    }

    /// Selector matching boxes marked initial
    #[inline]
    #[must_use]
    pub fn initial_selector(&self) -> String {
        format!(".{}", self.initial)
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::new("cbx")
    }
}
