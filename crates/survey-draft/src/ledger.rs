//! Identity ledger
//!
//! Remembers which persisted questions existed when the draft was opened, what
//! the backend reported about their answers, and which removals the operator
//! has acknowledged. Classification comes from the tagged [`Identity`] only.
//!
//! [`Identity`]: survey_model::Identity

use crate::draft::{AnswerBinding, DraftQuestion, SurveyDraft};
use std::collections::{BTreeMap, BTreeSet};
use survey_model::{AnswerBindings, IdentityClass, QuestionId};
use tracing::{debug, warn};

/// What is known about the answers stored against one question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingState {
    /// No stored answers
    None,
    /// Stored answers exist
    Bound(u32),
    /// Lookup pending, failed, or silent about this question
    Unknown,
}

impl BindingState {
    /// Check if removing the question could destroy answers
    #[inline]
    #[must_use]
    pub fn may_have_answers(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Progress of the answer-binding lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupStatus {
    /// Not completed yet
    Pending,
    /// Backend answered
    Loaded {
        /// Whether the survey has any responses at all
        has_responses: bool,
    },
    /// Lookup failed
    Failed,
}

/// Identity and answer-binding facts for one draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityLedger {
    status: LookupStatus,
    known_questions: BTreeSet<QuestionId>,
    reported: BTreeMap<QuestionId, u32>,
    acknowledged: BTreeSet<QuestionId>,
}

impl IdentityLedger {
    /// Ledger for a survey that was never saved
    #[must_use]
    pub fn for_new_survey() -> Self {
        Self {
            status: LookupStatus::Loaded {
                has_responses: false,
            },
            known_questions: BTreeSet::new(),
            reported: BTreeMap::new(),
            acknowledged: BTreeSet::new(),
        }
    }

    /// Ledger for a freshly hydrated draft; bindings are unknown until looked up
    #[must_use]
    pub fn for_draft(draft: &SurveyDraft) -> Self {
        Self {
            status: LookupStatus::Pending,
            known_questions: draft.persisted_question_ids().cloned().collect(),
            reported: BTreeMap::new(),
            acknowledged: BTreeSet::new(),
        }
    }

    /// Lookup progress
    #[inline]
    #[must_use]
    pub fn status(&self) -> LookupStatus {
        self.status
    }

    /// Persisted question ids seen when the draft was opened
    #[inline]
    #[must_use]
    pub fn known_questions(&self) -> &BTreeSet<QuestionId> {
        &self.known_questions
    }

    /// Ids whose removal the operator accepted
    #[inline]
    #[must_use]
    pub fn acknowledged(&self) -> &BTreeSet<QuestionId> {
        &self.acknowledged
    }

    /// Merge a binding lookup result into the ledger and the draft's questions
    ///
    /// Matching is by exact identifier. Reports for ids that were never part of
    /// the draft are ignored.
    pub fn hydrate(&mut self, bindings: AnswerBindings, questions: &mut [DraftQuestion]) {
        self.status = LookupStatus::Loaded {
            has_responses: bindings.has_responses,
        };
        self.reported = bindings
            .bindings
            .into_iter()
            .filter(|b| self.known_questions.contains(&b.question_id))
            .map(|b| (b.question_id, b.answer_count))
            .collect();
        self.attach(questions);
        debug!(
            has_responses = bindings.has_responses,
            bound = self.reported.values().filter(|n| **n > 0).count(),
            "answer bindings hydrated"
        );
    }

    /// Record a failed lookup; every persisted question becomes unknown
    pub fn mark_lookup_failed(&mut self, questions: &mut [DraftQuestion]) {
        self.status = LookupStatus::Failed;
        self.reported.clear();
        self.attach(questions);
        warn!("answer binding lookup failed, treating persisted questions as bound");
    }

    /// Binding state of a draft question
    #[must_use]
    pub fn binding_state(&self, question: &DraftQuestion) -> BindingState {
        match question.identity().persisted_id() {
            Some(id) => self.state_for_id(id),
            None => BindingState::None,
        }
    }

    /// Binding state of a persisted id
    #[must_use]
    pub fn state_for_id(&self, id: &QuestionId) -> BindingState {
        match self.status {
            LookupStatus::Pending | LookupStatus::Failed => BindingState::Unknown,
            LookupStatus::Loaded { has_responses } => match self.reported.get(id) {
                Some(0) => BindingState::None,
                Some(count) => BindingState::Bound(*count),
                None if has_responses => BindingState::Unknown,
                None => BindingState::None,
            },
        }
    }

    /// Classify a question purely from its identity tag
    #[inline]
    #[must_use]
    pub fn classify(question: &DraftQuestion) -> IdentityClass {
        question.identity().class()
    }

    /// Record that the operator accepted losing this question's answers
    pub fn acknowledge_removal(&mut self, id: QuestionId) {
        debug!(question_id = %id, "removal acknowledged");
        self.acknowledged.insert(id);
    }

    /// Persisted ids missing from the draft that may have answers and were
    /// never acknowledged
    #[must_use]
    pub fn unconfirmed_removals(&self, draft: &SurveyDraft) -> Vec<QuestionId> {
        let present: BTreeSet<&QuestionId> = draft.persisted_question_ids().collect();
        self.known_questions
            .iter()
            .filter(|id| !present.contains(id))
            .filter(|id| !self.acknowledged.contains(*id))
            .filter(|id| self.state_for_id(id).may_have_answers())
            .cloned()
            .collect()
    }

    fn attach(&self, questions: &mut [DraftQuestion]) {
        for question in questions {
            let binding = match self.binding_state(question) {
                BindingState::Bound(count) => AnswerBinding::new(count),
                BindingState::None | BindingState::Unknown => None,
            };
            question.set_answer_binding(binding);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_model::{
        Locale, LocalizedFields, LocalizedText, QuestionBinding, QuestionKind, QuestionRecord,
        Schedule, SurveyFormat, SurveyId, SurveyRecord, SurveyType,
    };

    fn question(id: &str, order: u32) -> QuestionRecord {
        QuestionRecord {
            id: QuestionId::new(id),
            order,
            kind: QuestionKind::Rating,
            text: LocalizedText::new(),
            placeholder: LocalizedText::new(),
            required: false,
        }
    }

    fn draft() -> SurveyDraft {
        let record = SurveyRecord {
            id: SurveyId::new("s1"),
            title: "t".to_string(),
            description: String::new(),
            languages: vec![],
            localized: LocalizedFields::default(),
            questions: vec![question("q1", 1), question("q2", 2), question("q3", 3)],
            tokens: vec![],
            format: SurveyFormat::default(),
            survey_type: SurveyType::default(),
            schedule: Schedule::default(),
            template_id: None,
        };
        SurveyDraft::from_record(record, Locale::default())
    }

    fn bindings(has_responses: bool, pairs: &[(&str, u32)]) -> AnswerBindings {
        AnswerBindings {
            has_responses,
            bindings: pairs
                .iter()
                .map(|(id, n)| QuestionBinding::new(QuestionId::new(*id), *n))
                .collect(),
        }
    }

    #[test]
    fn pending_lookup_is_unknown() {
        let draft = draft();
        let ledger = IdentityLedger::for_draft(&draft);
        assert_eq!(
            ledger.binding_state(&draft.questions()[0]),
            BindingState::Unknown
        );
    }

    #[test]
    fn hydrate_matches_exact_ids_only() {
        let mut draft = draft();
        let mut ledger = IdentityLedger::for_draft(&draft);
        ledger.hydrate(
            bindings(true, &[("q1", 4), ("q2", 0), ("Q3", 9), ("other", 2)]),
            &mut draft.questions,
        );
        let states: Vec<BindingState> = draft
            .questions()
            .iter()
            .map(|q| ledger.binding_state(q))
            .collect();
        assert_eq!(
            states,
            [
                BindingState::Bound(4),
                BindingState::None,
                BindingState::Unknown
            ]
        );
        assert_eq!(
            draft.questions()[0].answer_binding().map(|b| b.answer_count()),
            Some(4)
        );
        assert!(draft.questions()[2].answer_binding().is_none());
    }

    #[test]
    fn survey_without_responses_has_no_bindings() {
        let mut draft = draft();
        let mut ledger = IdentityLedger::for_draft(&draft);
        ledger.hydrate(bindings(false, &[]), &mut draft.questions);
        assert!(draft
            .questions()
            .iter()
            .all(|q| ledger.binding_state(q) == BindingState::None));
    }

    #[test]
    fn failed_lookup_clears_attached_bindings() {
        let mut draft = draft();
        let mut ledger = IdentityLedger::for_draft(&draft);
        ledger.hydrate(bindings(true, &[("q1", 4)]), &mut draft.questions);
        ledger.mark_lookup_failed(&mut draft.questions);
        assert_eq!(ledger.status(), LookupStatus::Failed);
        assert!(draft.questions()[0].answer_binding().is_none());
        assert_eq!(
            ledger.binding_state(&draft.questions()[0]),
            BindingState::Unknown
        );
    }

    #[test]
    fn unconfirmed_removals_respect_acknowledgement() {
        let mut draft = draft();
        let mut ledger = IdentityLedger::for_draft(&draft);
        ledger.hydrate(bindings(true, &[("q1", 4), ("q2", 0)]), &mut draft.questions);
        draft.questions.clear();

        assert_eq!(
            ledger.unconfirmed_removals(&draft),
            [QuestionId::new("q1"), QuestionId::new("q3")]
        );

        ledger.acknowledge_removal(QuestionId::new("q1"));
        assert_eq!(ledger.unconfirmed_removals(&draft), [QuestionId::new("q3")]);
    }

    #[test]
    fn classify_uses_identity_tag() {
        let draft = draft();
        assert_eq!(
            IdentityLedger::classify(&draft.questions()[0]),
            IdentityClass::Persisted
        );
    }
}
