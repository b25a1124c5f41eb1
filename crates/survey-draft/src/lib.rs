//! Survey Draft - the draft reconciliation engine
//!
//! Holds the in-session copy of a survey definition and keeps it consistent
//! while the operator edits it:
//! - Classifies every question and token as persisted or new
//! - Re-derives dense ordering after each list mutation
//! - Gates removals that could destroy stored answers
//! - Keeps locale-keyed maps and the edited locale projection in sync
//! - Merges templates without touching the draft's own identity or tokens
//! - Validates and formats the outgoing submission payload
//!
//! # Example
//!
//! ```rust
//! use survey_draft::{DraftEditor, EditorConfig};
//! use survey_model::QuestionKind;
//!
//! let mut editor = DraftEditor::new(EditorConfig::new());
//! editor.set_title("Feedback");
//! editor.append_question(QuestionKind::Rating);
//! let en = editor.draft().primary_locale().clone();
//! editor.set_question_text(0, &en, "How did we do?").unwrap();
//!
//! let payload = editor.build_submission().unwrap();
//! assert_eq!(payload.questions[0].order, 1);
//! assert!(payload.questions[0].id.is_none());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod draft;
pub mod editor;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod locale;
pub mod reconciler;
pub mod submission;
pub mod template;

pub use config::{ConfigError, EditorConfig, MIN_TOKEN_LENGTH};
pub use draft::{AnswerBinding, DraftQuestion, DraftStats, DraftToken, LocaleProjection, SurveyDraft};
pub use editor::{DraftEditor, RemovalOutcome};
pub use error::{DraftError, GateError, MutationError, ValidationErrors, ValidationIssue};
pub use gate::{DeletionGate, GatePhase, PendingRemoval};
pub use ledger::{BindingState, IdentityLedger, LookupStatus};
pub use template::PendingMerge;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
