//! Editor configuration

use serde::{Deserialize, Serialize};
use survey_model::Locale;

/// Per-session editing switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Locale that is always active and can never be removed
    pub primary_locale: Locale,
    /// Route removals of answered questions through the deletion gate
    pub deletion_warnings: bool,
    /// Length of generated token values
    pub token_length: usize,
    /// Label of the token seeded into a brand-new survey
    pub default_token_label: String,
}

impl EditorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With primary locale
    #[inline]
    #[must_use]
    pub fn with_primary_locale(mut self, locale: Locale) -> Self {
        self.primary_locale = locale;
        self
    }

    /// With deletion warnings on or off
    #[inline]
    #[must_use]
    pub fn with_deletion_warnings(mut self, enabled: bool) -> Self {
        self.deletion_warnings = enabled;
        self
    }

    /// With generated token length
    #[inline]
    #[must_use]
    pub fn with_token_length(mut self, length: usize) -> Self {
        self.token_length = length.max(MIN_TOKEN_LENGTH);
        self
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// Returns [`ConfigError`] on malformed TOML or invalid values
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        if config.token_length < MIN_TOKEN_LENGTH {
            return Err(ConfigError::TokenLengthTooShort(config.token_length));
        }
        Ok(config)
    }
}

/// Shortest accepted generated token
pub const MIN_TOKEN_LENGTH: usize = 4;

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            primary_locale: Locale::default(),
            deletion_warnings: true,
            token_length: 8,
            default_token_label: "Default".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Malformed TOML
    #[error("invalid editor configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generated tokens would be too easy to guess
    #[error("token length {0} is below the minimum of {min}", min = MIN_TOKEN_LENGTH)]
    TokenLengthTooShort(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EditorConfig::new();
        assert_eq!(config.primary_locale.as_str(), "en");
        assert!(config.deletion_warnings);
        assert_eq!(config.token_length, 8);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EditorConfig::from_toml_str(
            r#"
            primary_locale = "de"
            deletion_warnings = false
            "#,
        )
        .unwrap();
        assert_eq!(config.primary_locale.as_str(), "de");
        assert!(!config.deletion_warnings);
        assert_eq!(config.default_token_label, "Default");
    }

    #[test]
    fn toml_rejects_invalid_locale() {
        assert!(EditorConfig::from_toml_str(r#"primary_locale = "d e""#).is_err());
    }

    #[test]
    fn toml_rejects_short_tokens() {
        let err = EditorConfig::from_toml_str("token_length = 2").unwrap_err();
        assert!(matches!(err, ConfigError::TokenLengthTooShort(2)));
        assert_eq!(err.to_string(), "token length 2 is below the minimum of 4");
    }

    #[test]
    fn builder_clamps_token_length() {
        let config = EditorConfig::new().with_token_length(1);
        assert_eq!(config.token_length, MIN_TOKEN_LENGTH);
    }
}
