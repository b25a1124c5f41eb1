//! Identifiers and the persisted/new identity split
//!
//! Backend identifiers are opaque: nothing in this workspace looks at their
//! length or format. Whether an entity exists in the system of record is
//! carried by the [`Identity`] variant alone.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a backend-assigned identifier
            #[inline]
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Raw identifier as handed out by the backend
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }
    };
}

opaque_id!(
    /// Backend identifier of a survey
    SurveyId
);
opaque_id!(
    /// Backend identifier of a survey question
    QuestionId
);
opaque_id!(
    /// Backend identifier of a public-access token
    TokenId
);
opaque_id!(
    /// Identifier of a template record
    TemplateId
);
opaque_id!(
    /// Identifier of a question inside a template.
    ///
    /// Lives in the template namespace and never becomes a [`QuestionId`].
    TemplateQuestionId
);

/// Session-local row key.
///
/// Lets callers follow a row across reorders. Freshly generated for every
/// appended or hydrated row and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey(pub Uuid);

impl RowKey {
    /// Generate a new row key
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RowKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an entity already exists in the backend's system of record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identity<I> {
    /// Saved entity carrying its backend identifier
    Persisted(I),
    /// Created during this editing session
    New,
}

/// Classification result of an [`Identity`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityClass {
    /// Has a backend identifier
    Persisted,
    /// Session-local only
    New,
}

impl<I> Identity<I> {
    /// Classify the identity
    #[inline]
    #[must_use]
    pub fn class(&self) -> IdentityClass {
        match self {
            Self::Persisted(_) => IdentityClass::Persisted,
            Self::New => IdentityClass::New,
        }
    }

    /// Backend identifier, if persisted
    #[inline]
    #[must_use]
    pub fn persisted_id(&self) -> Option<&I> {
        match self {
            Self::Persisted(id) => Some(id),
            Self::New => None,
        }
    }

    /// Check if persisted
    #[inline]
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }

    /// Check if new
    #[inline]
    #[must_use]
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New)
    }
}
