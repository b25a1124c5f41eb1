//! Template merge engine
//!
//! A merge is computed up front as a [`PendingMerge`] and applied in one swap.
//! Dropping the pending value is the cancel path.

use crate::draft::{DraftQuestion, SurveyDraft};
use crate::ledger::IdentityLedger;
use crate::{locale, reconciler};
use indexmap::IndexSet;
use survey_model::{
    Locale, LocalizedFields, SurveyFormat, SurveyType, TemplateId, TemplateRecord,
};
use tracing::info;

/// Template content ready to replace the draft's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMerge {
    template_id: TemplateId,
    template_name: String,
    active_locales: IndexSet<Locale>,
    localized: LocalizedFields,
    title: String,
    description: String,
    questions: Vec<DraftQuestion>,
    format: SurveyFormat,
    survey_type: SurveyType,
    dropped_questions: usize,
    dropped_bound: usize,
}

impl PendingMerge {
    /// Template being merged
    #[inline]
    #[must_use]
    pub fn template_id(&self) -> &TemplateId {
        &self.template_id
    }

    /// Display name of the template
    #[inline]
    #[must_use]
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// Questions the draft would end up with
    #[inline]
    #[must_use]
    pub fn questions(&self) -> &[DraftQuestion] {
        &self.questions
    }

    /// Current draft questions that the merge would drop
    #[inline]
    #[must_use]
    pub fn dropped_questions(&self) -> usize {
        self.dropped_questions
    }

    /// Dropped questions that have, or may have, stored answers
    #[inline]
    #[must_use]
    pub fn dropped_bound(&self) -> usize {
        self.dropped_bound
    }
}

/// Compute a merge without touching the draft
#[must_use]
pub fn propose(draft: &SurveyDraft, ledger: &IdentityLedger, template: &TemplateRecord) -> PendingMerge {
    let primary = draft.primary_locale();

    let mut active_locales = IndexSet::new();
    active_locales.insert(primary.clone());
    active_locales.extend(template.languages.iter().cloned());

    let mut questions: Vec<DraftQuestion> = template
        .questions
        .iter()
        .map(DraftQuestion::from_template)
        .collect();
    questions.sort_by_key(DraftQuestion::order);
    reconciler::renumber(&mut questions);

    let title = match template.localized.title.get(primary) {
        Some(title) if !title.trim().is_empty() => title.to_string(),
        _ => template.name.clone(),
    };
    let description = template
        .localized
        .description
        .get_or_empty(primary)
        .to_string();

    let dropped_bound = draft
        .questions()
        .iter()
        .filter(|q| ledger.binding_state(q).may_have_answers())
        .count();

    PendingMerge {
        template_id: template.id.clone(),
        template_name: template.name.clone(),
        active_locales,
        localized: template.localized.clone(),
        title,
        description,
        questions,
        format: template.format,
        survey_type: template.survey_type,
        dropped_questions: draft.questions().len(),
        dropped_bound,
    }
}

/// Replace the draft's content with the merge
///
/// The survey id, tokens and schedule stay as they were.
pub fn apply(draft: &mut SurveyDraft, merge: PendingMerge) {
    info!(
        template_id = %merge.template_id,
        dropped = merge.dropped_questions,
        dropped_bound = merge.dropped_bound,
        "template merged"
    );
    draft.active_locales = merge.active_locales;
    draft.localized = merge.localized;
    draft.title = merge.title;
    draft.description = merge.description;
    draft.questions = merge.questions;
    draft.format = merge.format;
    draft.survey_type = merge.survey_type;
    draft.template_ref = Some(merge.template_id);
    locale::resync(draft);
}
