//! Session configuration

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use survey_draft::{EditorConfig, MIN_TOKEN_LENGTH};

/// Editing session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Draft editing switches
    pub editor: EditorConfig,
    /// Buffered background results
    pub event_capacity: usize,
    /// Start the binding lookup as soon as a persisted survey is opened
    pub auto_request_bindings: bool,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With editor configuration
    #[inline]
    #[must_use]
    pub fn with_editor(mut self, editor: EditorConfig) -> Self {
        self.editor = editor;
        self
    }

    /// With event channel capacity
    #[inline]
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// With automatic binding lookup on open
    #[inline]
    #[must_use]
    pub fn with_auto_request_bindings(mut self, enabled: bool) -> Self {
        self.auto_request_bindings = enabled;
        self
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// Fails on malformed TOML, a zero channel capacity or too-short tokens
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(source).context("invalid session configuration")?;
        anyhow::ensure!(config.event_capacity > 0, "event_capacity must be positive");
        anyhow::ensure!(
            config.editor.token_length >= MIN_TOKEN_LENGTH,
            "editor.token_length must be at least {MIN_TOKEN_LENGTH}"
        );
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Fails when the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&source).with_context(|| format!("loading {}", path.display()))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            event_capacity: 32,
            auto_request_bindings: true,
        }
    }
}
