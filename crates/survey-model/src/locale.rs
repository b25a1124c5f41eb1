//! Locale codes and locale-keyed text maps

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Maximum accepted locale code length (BCP 47 upper bound)
pub const MAX_LOCALE_LEN: usize = 35;

/// Locale code such as `en`, `de` or `pt-BR`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Parse and validate a locale code
    ///
    /// # Errors
    /// Returns [`LocaleError`] for empty, overlong or non-alphanumeric codes
    pub fn parse(code: impl Into<String>) -> Result<Self, LocaleError> {
        let code = code.into();
        if code.is_empty() {
            return Err(LocaleError::Empty);
        }
        if code.len() > MAX_LOCALE_LEN {
            return Err(LocaleError::TooLong(code.len()));
        }
        if let Some(c) = code
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(LocaleError::InvalidCharacter { code, character: c });
        }
        Ok(Self(code))
    }

    /// Locale code
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    /// English, the default primary locale
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

/// Locale parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocaleError {
    /// Empty code
    #[error("locale code is empty")]
    Empty,

    /// Longer than [`MAX_LOCALE_LEN`]
    #[error("locale code too long ({0} chars)")]
    TooLong(usize),

    /// Character outside `[A-Za-z0-9_-]`
    #[error("invalid character {character:?} in locale code {code:?}")]
    InvalidCharacter { code: String, character: char },
}

/// Text keyed by locale
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<Locale, String>);

impl LocalizedText {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with an empty string for each locale
    #[must_use]
    pub fn seeded<'a>(locales: impl IntoIterator<Item = &'a Locale>) -> Self {
        let mut text = Self::new();
        for locale in locales {
            text.seed(locale);
        }
        text
    }

    /// Builder-style insert
    #[inline]
    #[must_use]
    pub fn with(mut self, locale: Locale, value: impl Into<String>) -> Self {
        self.set(locale, value);
        self
    }

    /// Value for a locale
    #[inline]
    #[must_use]
    pub fn get(&self, locale: &Locale) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// Value for a locale, empty string when absent
    #[inline]
    #[must_use]
    pub fn get_or_empty(&self, locale: &Locale) -> &str {
        self.get(locale).unwrap_or_default()
    }

    /// Set the value for a locale
    #[inline]
    pub fn set(&mut self, locale: Locale, value: impl Into<String>) {
        self.0.insert(locale, value.into());
    }

    /// Insert an empty string unless the locale already has a key
    #[inline]
    pub fn seed(&mut self, locale: &Locale) {
        self.0.entry(locale.clone()).or_default();
    }

    /// Remove a locale key
    #[inline]
    pub fn remove(&mut self, locale: &Locale) -> Option<String> {
        self.0.remove(locale)
    }

    /// Check if the locale has a key
    #[inline]
    #[must_use]
    pub fn contains(&self, locale: &Locale) -> bool {
        self.0.contains_key(locale)
    }

    /// Check if the locale has a non-blank value
    #[inline]
    #[must_use]
    pub fn is_filled(&self, locale: &Locale) -> bool {
        self.get(locale).is_some_and(|v| !v.trim().is_empty())
    }

    /// Iterate over `(locale, text)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&Locale, &str)> {
        self.0.iter().map(|(l, v)| (l, v.as_str()))
    }

    /// Number of locale keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no locale has a key
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Locale, String)> for LocalizedText {
    fn from_iter<T: IntoIterator<Item = (Locale, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
