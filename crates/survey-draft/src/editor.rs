//! The draft editor facade
//!
//! [`DraftEditor`] owns the draft, its identity ledger, the deletion gate and
//! any pending template merge. Every entry point is synchronous and either
//! completes, with list order re-derived, or returns an error with the draft
//! untouched.

use crate::config::EditorConfig;
use crate::draft::{DraftQuestion, DraftStats, DraftToken, SurveyDraft};
use crate::error::{DraftError, MutationError};
use crate::gate::{DeletionGate, PendingRemoval};
use crate::ledger::{BindingState, IdentityLedger};
use crate::template::PendingMerge;
use crate::{locale, reconciler, submission, template};
use rand::distr::Alphanumeric;
use rand::Rng;
use survey_model::{
    AnswerBindings, Locale, LocalizedField, QuestionId, QuestionKind, RowKey, Schedule,
    SubmissionPayload, SurveyFormat, SurveyRecord, SurveyType, TemplateRecord,
};
use tracing::{debug, info};

/// Result of a question removal request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The question is gone
    Removed(DraftQuestion),
    /// The question may have answers; nothing happens until confirmed
    AwaitingConfirmation(PendingRemoval),
}

/// Single owner of a survey draft and everything needed to edit it safely
#[derive(Debug, Clone)]
pub struct DraftEditor {
    config: EditorConfig,
    draft: SurveyDraft,
    ledger: IdentityLedger,
    gate: DeletionGate,
    pending_merge: Option<PendingMerge>,
}

impl DraftEditor {
    /// Editor for a brand-new survey, seeded with one generated token
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let draft = SurveyDraft::empty(config.primary_locale.clone());
        let mut editor = Self {
            draft,
            ledger: IdentityLedger::for_new_survey(),
            gate: DeletionGate::new(),
            pending_merge: None,
            config,
        };
        let label = editor.config.default_token_label.clone();
        editor.generate_token(label);
        editor
    }

    /// Editor for a persisted survey; bindings stay unknown until hydrated
    #[must_use]
    pub fn from_record(record: SurveyRecord, config: EditorConfig) -> Self {
        let draft = SurveyDraft::from_record(record, config.primary_locale.clone());
        let ledger = IdentityLedger::for_draft(&draft);
        debug!(
            survey_id = ?draft.survey_id(),
            questions = draft.questions().len(),
            "draft hydrated"
        );
        Self {
            config,
            draft,
            ledger,
            gate: DeletionGate::new(),
            pending_merge: None,
        }
    }

    /// Current draft
    #[inline]
    #[must_use]
    pub fn draft(&self) -> &SurveyDraft {
        &self.draft
    }

    /// Identity ledger
    #[inline]
    #[must_use]
    pub fn ledger(&self) -> &IdentityLedger {
        &self.ledger
    }

    /// Deletion gate
    #[inline]
    #[must_use]
    pub fn gate(&self) -> &DeletionGate {
        &self.gate
    }

    /// Editor configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Template merge waiting for confirmation
    #[inline]
    #[must_use]
    pub fn pending_merge(&self) -> Option<&PendingMerge> {
        self.pending_merge.as_ref()
    }

    /// Summary counts
    #[must_use]
    pub fn stats(&self) -> DraftStats {
        self.draft.stats()
    }

    // Bindings

    /// Merge a binding lookup result
    pub fn hydrate_bindings(&mut self, bindings: AnswerBindings) {
        self.ledger.hydrate(bindings, &mut self.draft.questions);
    }

    /// Record a failed binding lookup
    pub fn mark_lookup_failed(&mut self) {
        self.ledger.mark_lookup_failed(&mut self.draft.questions);
    }

    /// Binding state of the question at `index`
    ///
    /// # Errors
    /// Returns [`MutationError::IndexOutOfBounds`]
    pub fn binding_state(&self, index: usize) -> Result<BindingState, MutationError> {
        reconciler::check_index(&self.draft.questions, index)?;
        Ok(self.ledger.binding_state(&self.draft.questions[index]))
    }

    // Questions

    /// Append a blank question and return its row key
    pub fn append_question(&mut self, kind: QuestionKind) -> RowKey {
        let question = DraftQuestion::blank(kind, self.draft.active_locales.iter());
        let key = question.key();
        reconciler::append(&mut self.draft.questions, question);
        key
    }

    /// Reorder questions
    ///
    /// # Errors
    /// Returns [`MutationError::IndexOutOfBounds`]
    pub fn move_question(&mut self, from: usize, to: usize) -> Result<(), DraftError> {
        reconciler::move_item(&mut self.draft.questions, from, to)?;
        Ok(())
    }

    /// Remove a question, or park the removal at the gate when it may
    /// destroy stored answers
    ///
    /// # Errors
    /// Returns [`MutationError::ConfirmationPending`] while another removal
    /// waits and [`MutationError::IndexOutOfBounds`] for bad indices
    pub fn remove_question(&mut self, index: usize) -> Result<RemovalOutcome, DraftError> {
        if self.gate.is_pending() {
            return Err(MutationError::ConfirmationPending.into());
        }
        reconciler::check_index(&self.draft.questions, index)?;

        let question = &self.draft.questions[index];
        let binding = self.ledger.binding_state(question);
        if self.config.deletion_warnings && binding.may_have_answers() {
            if let Some(question_id) = question.identity().persisted_id() {
                let removal = PendingRemoval {
                    index,
                    key: question.key(),
                    question_id: question_id.clone(),
                    binding,
                };
                self.gate.request(removal.clone())?;
                return Ok(RemovalOutcome::AwaitingConfirmation(removal));
            }
        }

        let removed = self.execute_removal(index)?;
        Ok(RemovalOutcome::Removed(removed))
    }

    /// Execute the removal waiting at the gate
    ///
    /// The target is found again by row key, so reorders since the request
    /// do not matter.
    ///
    /// # Errors
    /// Returns [`crate::GateError::NothingPending`] when nothing waits and
    /// [`MutationError::PendingTargetGone`] if the row no longer exists
    pub fn confirm_removal(&mut self) -> Result<DraftQuestion, DraftError> {
        let removal = self.gate.confirm()?;
        let index = self
            .draft
            .question_index(removal.key)
            .ok_or(MutationError::PendingTargetGone)?;
        self.execute_removal(index)
    }

    /// Drop the removal waiting at the gate
    ///
    /// # Errors
    /// Returns [`crate::GateError::NothingPending`] when nothing waits
    pub fn cancel_removal(&mut self) -> Result<PendingRemoval, DraftError> {
        Ok(self.gate.cancel()?)
    }

    fn execute_removal(&mut self, index: usize) -> Result<DraftQuestion, DraftError> {
        let removed = reconciler::remove_at(&mut self.draft.questions, index)?;
        if let Some(id) = removed.identity().persisted_id() {
            self.ledger.acknowledge_removal(id.clone());
        }
        debug!(key = %removed.key(), "question removed");
        Ok(removed)
    }

    /// Set question text for an active locale
    ///
    /// # Errors
    /// Returns [`MutationError`] for bad indices or inactive locales
    pub fn set_question_text(
        &mut self,
        index: usize,
        locale: &Locale,
        value: impl Into<String>,
    ) -> Result<(), DraftError> {
        let question = self.question_mut(index, Some(locale))?;
        question.text_mut().set(locale.clone(), value);
        Ok(())
    }

    /// Set question placeholder for an active locale
    ///
    /// # Errors
    /// Returns [`MutationError`] for bad indices or inactive locales
    pub fn set_question_placeholder(
        &mut self,
        index: usize,
        locale: &Locale,
        value: impl Into<String>,
    ) -> Result<(), DraftError> {
        let question = self.question_mut(index, Some(locale))?;
        question.placeholder_mut().set(locale.clone(), value);
        Ok(())
    }

    /// Mark a question required or optional
    ///
    /// # Errors
    /// Returns [`MutationError::IndexOutOfBounds`]
    pub fn set_question_required(&mut self, index: usize, required: bool) -> Result<(), DraftError> {
        self.question_mut(index, None)?.set_required(required);
        Ok(())
    }

    /// Change a question's answer kind
    ///
    /// # Errors
    /// Returns [`MutationError::IndexOutOfBounds`]
    pub fn set_question_kind(&mut self, index: usize, kind: QuestionKind) -> Result<(), DraftError> {
        self.question_mut(index, None)?.set_kind(kind);
        Ok(())
    }

    fn question_mut(
        &mut self,
        index: usize,
        locale: Option<&Locale>,
    ) -> Result<&mut DraftQuestion, MutationError> {
        reconciler::check_index(&self.draft.questions, index)?;
        if let Some(locale) = locale {
            if !self.draft.is_active(locale) {
                return Err(MutationError::LocaleNotActive(locale.clone()));
            }
        }
        Ok(&mut self.draft.questions[index])
    }

    // Tokens

    /// Append a token with an explicit value
    ///
    /// # Errors
    /// Returns [`MutationError::BlankTokenValue`] or
    /// [`MutationError::DuplicateTokenValue`]
    pub fn append_token(
        &mut self,
        value: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<RowKey, DraftError> {
        let value = value.into();
        self.check_token_value(&value, None)?;
        let token = DraftToken::new(value, label);
        let key = token.key();
        reconciler::append(&mut self.draft.tokens, token);
        Ok(key)
    }

    /// Append a token with a random value unique within the draft
    pub fn generate_token(&mut self, label: impl Into<String>) -> RowKey {
        let value = self.unique_token_value();
        let token = DraftToken::new(value, label);
        let key = token.key();
        reconciler::append(&mut self.draft.tokens, token);
        key
    }

    /// Random alphanumeric value not used by any token in the draft
    #[must_use]
    pub fn unique_token_value(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let value: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(self.config.token_length)
                .map(char::from)
                .collect();
            if !self.draft.tokens.iter().any(|t| t.value() == value) {
                return value;
            }
        }
    }

    /// Reorder tokens
    ///
    /// # Errors
    /// Returns [`MutationError::IndexOutOfBounds`]
    pub fn move_token(&mut self, from: usize, to: usize) -> Result<(), DraftError> {
        reconciler::move_item(&mut self.draft.tokens, from, to)?;
        Ok(())
    }

    /// Remove a token; the last one cannot go
    ///
    /// # Errors
    /// Returns [`MutationError::LastToken`] or [`MutationError::IndexOutOfBounds`]
    pub fn remove_token(&mut self, index: usize) -> Result<DraftToken, DraftError> {
        reconciler::check_index(&self.draft.tokens, index)?;
        if self.draft.tokens.len() == 1 {
            return Err(MutationError::LastToken.into());
        }
        Ok(reconciler::remove_at(&mut self.draft.tokens, index)?)
    }

    /// Change a token's value
    ///
    /// # Errors
    /// Returns [`MutationError`] for bad indices, blank or duplicate values
    pub fn set_token_value(&mut self, index: usize, value: impl Into<String>) -> Result<(), DraftError> {
        reconciler::check_index(&self.draft.tokens, index)?;
        let value = value.into();
        self.check_token_value(&value, Some(index))?;
        self.draft.tokens[index].set_value(value);
        Ok(())
    }

    /// Change a token's label
    ///
    /// # Errors
    /// Returns [`MutationError::IndexOutOfBounds`]
    pub fn set_token_label(&mut self, index: usize, label: impl Into<String>) -> Result<(), DraftError> {
        reconciler::check_index(&self.draft.tokens, index)?;
        self.draft.tokens[index].set_label(label);
        Ok(())
    }

    fn check_token_value(&self, value: &str, skip: Option<usize>) -> Result<(), MutationError> {
        if value.trim().is_empty() {
            return Err(MutationError::BlankTokenValue);
        }
        let taken = self
            .draft
            .tokens
            .iter()
            .enumerate()
            .any(|(i, t)| Some(i) != skip && t.value() == value);
        if taken {
            return Err(MutationError::DuplicateTokenValue(value.to_string()));
        }
        Ok(())
    }

    // Locales

    /// Activate a locale by code
    ///
    /// # Errors
    /// Returns [`MutationError::InvalidLocale`] or [`MutationError::LocaleAlreadyActive`]
    pub fn add_locale(&mut self, code: &str) -> Result<(), DraftError> {
        let locale = Locale::parse(code).map_err(MutationError::from)?;
        locale::add_locale(&mut self.draft, locale)?;
        Ok(())
    }

    /// Deactivate a locale by code
    ///
    /// # Errors
    /// Returns [`MutationError`] for invalid, inactive or primary locales
    pub fn remove_locale(&mut self, code: &str) -> Result<(), DraftError> {
        let locale = Locale::parse(code).map_err(MutationError::from)?;
        locale::remove_locale(&mut self.draft, &locale)?;
        Ok(())
    }

    /// Switch the locale being edited
    ///
    /// # Errors
    /// Returns [`MutationError`] for invalid or inactive locales
    pub fn set_active_locale(&mut self, code: &str) -> Result<(), DraftError> {
        let locale = Locale::parse(code).map_err(MutationError::from)?;
        locale::set_active_locale(&mut self.draft, &locale)?;
        Ok(())
    }

    /// Write a localized field for the locale being edited
    pub fn commit_projection(&mut self, field: LocalizedField, value: impl Into<String>) {
        locale::commit_projection(&mut self.draft, field, value);
    }

    /// Edit the primary-locale title
    pub fn set_title(&mut self, value: impl Into<String>) {
        locale::set_title(&mut self.draft, value);
    }

    /// Edit the primary-locale description
    pub fn set_description(&mut self, value: impl Into<String>) {
        locale::set_description(&mut self.draft, value);
    }

    // Metadata

    /// Set the presentation format
    pub fn set_format(&mut self, format: SurveyFormat) {
        self.draft.format = format;
    }

    /// Set the survey kind
    pub fn set_survey_type(&mut self, survey_type: SurveyType) {
        self.draft.survey_type = survey_type;
    }

    /// Set the availability window; ordering is checked at submission
    pub fn set_schedule(&mut self, schedule: Schedule) {
        self.draft.schedule = schedule;
    }

    // Templates

    /// Compute a merge with `template` and hold it for confirmation
    ///
    /// Replaces any merge already waiting.
    pub fn propose_template(&mut self, template: &TemplateRecord) -> &PendingMerge {
        let merge = template::propose(&self.draft, &self.ledger, template);
        debug!(
            template_id = %merge.template_id(),
            dropped = merge.dropped_questions(),
            "template merge proposed"
        );
        self.pending_merge.insert(merge)
    }

    /// Apply the waiting merge
    ///
    /// A removal waiting at the gate is cancelled since its row is replaced.
    ///
    /// # Errors
    /// Returns [`MutationError::NoPendingMerge`]
    pub fn confirm_template(&mut self) -> Result<(), DraftError> {
        let merge = self
            .pending_merge
            .take()
            .ok_or(MutationError::NoPendingMerge)?;
        if let Some(removal) = self.gate.reset() {
            debug!(key = %removal.key, "pending removal dropped by template merge");
        }
        template::apply(&mut self.draft, merge);
        Ok(())
    }

    /// Drop the waiting merge
    ///
    /// # Errors
    /// Returns [`MutationError::NoPendingMerge`]
    pub fn cancel_template(&mut self) -> Result<PendingMerge, DraftError> {
        Ok(self
            .pending_merge
            .take()
            .ok_or(MutationError::NoPendingMerge)?)
    }

    // Submission

    /// Accept losing the answers of removed questions after a re-prompt
    pub fn acknowledge_removals(&mut self, ids: impl IntoIterator<Item = QuestionId>) {
        for id in ids {
            self.ledger.acknowledge_removal(id);
        }
    }

    /// Validate and assemble the outgoing payload
    ///
    /// # Errors
    /// Returns [`DraftError::UnconfirmedDestructiveDeletion`] or
    /// [`DraftError::Validation`]
    pub fn build_submission(&self) -> Result<SubmissionPayload, DraftError> {
        let payload = submission::format(&self.draft, &self.ledger)?;
        info!(
            survey_id = ?payload.id,
            questions = payload.questions.len(),
            tokens = payload.tokens.len(),
            "submission payload ready"
        );
        Ok(payload)
    }

    /// Cancel everything waiting for the operator
    pub fn teardown(&mut self) {
        self.gate.reset();
        self.pending_merge = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GatePhase;

    fn editor() -> DraftEditor {
        DraftEditor::new(EditorConfig::default())
    }

    #[test]
    fn new_editor_has_one_generated_token() {
        let editor = editor();
        let tokens = editor.draft().tokens();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value().len(), 8);
        assert!(tokens[0].value().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(tokens[0].label(), "Default");
    }

    #[test]
    fn last_token_cannot_be_removed() {
        let mut editor = editor();
        let err = editor.remove_token(0).unwrap_err();
        assert!(matches!(err, DraftError::Mutation(MutationError::LastToken)));
        assert_eq!(editor.draft().tokens().len(), 1);
    }

    #[test]
    fn duplicate_token_value_rejected() {
        let mut editor = editor();
        let existing = editor.draft().tokens()[0].value().to_string();
        let err = editor.append_token(existing, "Copy").unwrap_err();
        assert!(matches!(
            err,
            DraftError::Mutation(MutationError::DuplicateTokenValue(_))
        ));
        editor.set_token_value(0, "own-value").unwrap();
        editor.set_token_value(0, "own-value").unwrap();
    }

    #[test]
    fn new_question_removed_without_gate() {
        let mut editor = editor();
        editor.append_question(QuestionKind::Rating);
        let outcome = editor.remove_question(0).unwrap();
        assert!(matches!(outcome, RemovalOutcome::Removed(_)));
        assert_eq!(editor.gate().phase(), GatePhase::Idle);
    }

    #[test]
    fn question_text_requires_active_locale() {
        let mut editor = editor();
        editor.append_question(QuestionKind::FreeText);
        let fr = Locale::parse("fr").unwrap();
        assert!(editor.set_question_text(0, &fr, "Bonjour").is_err());
        editor.add_locale("fr").unwrap();
        editor.set_question_text(0, &fr, "Bonjour").unwrap();
        assert_eq!(editor.draft().questions()[0].text().get(&fr), Some("Bonjour"));
    }

    #[test]
    fn invalid_locale_code_rejected() {
        let mut editor = editor();
        let err = editor.add_locale("not a locale").unwrap_err();
        assert!(matches!(
            err,
            DraftError::Mutation(MutationError::InvalidLocale(_))
        ));
    }

    #[test]
    fn template_confirm_without_proposal() {
        let mut editor = editor();
        assert!(matches!(
            editor.confirm_template(),
            Err(DraftError::Mutation(MutationError::NoPendingMerge))
        ));
    }
}
