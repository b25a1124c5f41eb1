//! Error types for the draft engine
//!
//! Every error here is recoverable from the operator's standpoint. None of them
//! is raised after a partial mutation: a failing entry point leaves the draft
//! exactly as it was.

use crate::gate::GatePhase;
use survey_model::{Locale, LocaleError, QuestionId};
use std::fmt;

/// Main draft error type
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// Mutation refused at the boundary (no-op)
    #[error("mutation rejected: {0}")]
    Mutation(#[from] MutationError),

    /// Submission blocked by field-level issues
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Answered questions are missing from the outgoing set without confirmation
    #[error("removal of answered questions was not confirmed: {}", join_ids(.question_ids))]
    UnconfirmedDestructiveDeletion {
        /// Questions whose removal needs confirmation
        question_ids: Vec<QuestionId>,
    },

    /// Answer-binding lookup failed; bindings are now unknown
    #[error("answer binding lookup failed: {0}")]
    BindingLookupFailure(String),

    /// Persisted survey could not be loaded
    #[error("survey fetch failed: {0}")]
    SurveyFetchFailure(String),

    /// Template could not be fetched; selection left inert
    #[error("template fetch failed: {0}")]
    TemplateFetchFailure(String),

    /// Backend refused the submission
    #[error("submission rejected: {0}")]
    SubmissionRejected(String),

    /// Deletion gate misuse
    #[error("deletion gate error: {0}")]
    Gate(#[from] GateError),

    /// Editing session already torn down
    #[error("editing session closed")]
    SessionClosed,
}

impl DraftError {
    /// Check if the operator must confirm something before retrying
    #[inline]
    #[must_use]
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Self::UnconfirmedDestructiveDeletion { .. })
    }

    /// Check if the error came from a collaborator rather than the draft
    #[inline]
    #[must_use]
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::BindingLookupFailure(_)
                | Self::SurveyFetchFailure(_)
                | Self::TemplateFetchFailure(_)
                | Self::SubmissionRejected(_)
        )
    }

    /// Check if retrying the same call unchanged may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BindingLookupFailure(_) | Self::SurveyFetchFailure(_) | Self::TemplateFetchFailure(_)
        )
    }
}

fn join_ids(ids: &[QuestionId]) -> String {
    ids.iter()
        .map(QuestionId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rejections raised at the mutation boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// Index past the end of the list
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Token list would become empty
    #[error("the last token cannot be removed")]
    LastToken,

    /// Primary locale cannot be removed
    #[error("primary locale {0} cannot be removed")]
    PrimaryLocale(Locale),

    /// Locale is not part of the draft
    #[error("locale {0} is not active")]
    LocaleNotActive(Locale),

    /// Locale is already part of the draft
    #[error("locale {0} is already active")]
    LocaleAlreadyActive(Locale),

    /// Malformed locale code
    #[error("invalid locale: {0}")]
    InvalidLocale(#[from] LocaleError),

    /// Another removal is waiting for confirmation
    #[error("a removal is already waiting for confirmation")]
    ConfirmationPending,

    /// The row awaiting confirmation no longer exists
    #[error("the question awaiting removal no longer exists")]
    PendingTargetGone,

    /// Token value already used in this draft
    #[error("token value {0:?} is already used")]
    DuplicateTokenValue(String),

    /// Token value is blank
    #[error("token value is blank")]
    BlankTokenValue,

    /// No template merge awaiting confirmation
    #[error("no template merge is waiting for confirmation")]
    NoPendingMerge,
}

/// Deletion gate state machine errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// Transition not allowed from the current phase
    #[error("illegal gate transition {from:?} -> {to:?}")]
    IllegalTransition { from: GatePhase, to: GatePhase },

    /// Confirm or cancel without a pending removal
    #[error("no removal is waiting for confirmation")]
    NothingPending,
}

/// One field-level submission problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Draft has no token
    EmptyTokenSet,
    /// Token value blank
    BlankTokenValue { position: usize },
    /// Token value repeated
    DuplicateTokenValue { value: String },
    /// Token label blank
    BlankTokenLabel { position: usize },
    /// Question text missing for an active locale
    MissingQuestionText { order: u32, locale: Locale },
    /// Schedule ends before it starts
    ScheduleInverted,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTokenSet => write!(f, "at least one token is required"),
            Self::BlankTokenValue { position } => write!(f, "token {position} has no value"),
            Self::DuplicateTokenValue { value } => write!(f, "token value {value:?} is used twice"),
            Self::BlankTokenLabel { position } => write!(f, "token {position} has no label"),
            Self::MissingQuestionText { order, locale } => {
                write!(f, "question {order} has no text for {locale}")
            }
            Self::ScheduleInverted => write!(f, "schedule ends before it starts"),
        }
    }
}

/// The full set of issues found by one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue
    #[inline]
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Recorded issues
    #[inline]
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Check if an issue was recorded
    #[inline]
    #[must_use]
    pub fn contains(&self, issue: &ValidationIssue) -> bool {
        self.issues.contains(issue)
    }

    /// Check if nothing was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// `Ok(())` when empty
    ///
    /// # Errors
    /// Returns `self` when at least one issue was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
