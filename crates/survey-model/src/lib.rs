//! Survey Model
//!
//! Shared vocabulary of the survey draft workspace.
//!
//! # Core Concepts
//!
//! - [`Identity`]: explicit `Persisted(id)` / `New` split for questions and tokens
//! - [`Locale`] and [`LocalizedText`]: validated locale codes and locale-keyed text
//! - [`LocalizedFields`]: the survey-level multi-locale messaging group
//! - [`SurveyRecord`], [`TemplateRecord`], [`AnswerBindings`]: backend responses
//! - [`SubmissionPayload`]: the validated hand-off to the persistence collaborator
//!
//! # Example
//!
//! ```rust
//! use survey_model::{Identity, Locale, LocalizedText, QuestionId};
//!
//! let en = Locale::parse("en").unwrap();
//! let text = LocalizedText::new().with(en.clone(), "Rate us");
//! assert_eq!(text.get(&en), Some("Rate us"));
//!
//! let saved: Identity<QuestionId> = Identity::Persisted(QuestionId::new("q1"));
//! assert!(saved.is_persisted());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod fields;
mod id;
mod locale;
mod payload;
mod record;

pub use fields::{LocalizedField, LocalizedFields, QuestionKind, Schedule, SurveyFormat, SurveyType};
pub use id::{
    Identity, IdentityClass, QuestionId, RowKey, SurveyId, TemplateId, TemplateQuestionId,
    TokenId,
};
pub use locale::{Locale, LocaleError, LocalizedText, MAX_LOCALE_LEN};
pub use payload::{QuestionPayload, SubmissionPayload, TokenPayload};
pub use record::{
    AnswerBindings, QuestionBinding, QuestionRecord, SurveyRecord, TemplateQuestion,
    TemplateRecord, TokenRecord,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
