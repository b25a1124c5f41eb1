//! Submission formatter
//!
//! Either the full payload or the full set of problems; never a partial
//! payload. The destructive-deletion check runs first so the operator is
//! re-prompted before being asked to fix field-level issues.

use crate::draft::SurveyDraft;
use crate::error::{DraftError, ValidationErrors, ValidationIssue};
use crate::ledger::IdentityLedger;
use std::collections::BTreeSet;
use survey_model::{LocalizedFields, QuestionPayload, SubmissionPayload, TokenPayload};

/// Check the draft and assemble the outgoing payload
///
/// # Errors
/// Returns [`DraftError::UnconfirmedDestructiveDeletion`] when answered
/// questions were dropped without acknowledgement, and
/// [`DraftError::Validation`] with every field-level issue otherwise
pub fn format(draft: &SurveyDraft, ledger: &IdentityLedger) -> Result<SubmissionPayload, DraftError> {
    let question_ids = ledger.unconfirmed_removals(draft);
    if !question_ids.is_empty() {
        return Err(DraftError::UnconfirmedDestructiveDeletion { question_ids });
    }

    let localized = overlay_primary(draft);
    validate(draft).into_result()?;

    Ok(SubmissionPayload {
        id: draft.survey_id().cloned(),
        title: draft.title().to_string(),
        description: draft.description().to_string(),
        languages: draft.active_locales().iter().cloned().collect(),
        localized,
        questions: draft
            .questions()
            .iter()
            .map(|q| QuestionPayload {
                id: q.identity().persisted_id().cloned(),
                order: q.order(),
                kind: q.kind(),
                text: q.text().clone(),
                placeholder: q.placeholder().clone(),
                required: q.required(),
            })
            .collect(),
        tokens: draft
            .tokens()
            .iter()
            .map(|t| TokenPayload {
                id: t.identity().persisted_id().cloned(),
                value: t.value().to_string(),
                label: t.label().to_string(),
            })
            .collect(),
        format: draft.format(),
        survey_type: draft.survey_type(),
        starts_at: draft.schedule().starts_at,
        ends_at: draft.schedule().ends_at,
        template_id: draft.template_ref().cloned(),
    })
}

/// Every field-level issue of the draft
#[must_use]
pub fn validate(draft: &SurveyDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if draft.tokens().is_empty() {
        errors.push(ValidationIssue::EmptyTokenSet);
    }
    let mut seen = BTreeSet::new();
    for (position, token) in (1usize..).zip(draft.tokens()) {
        if token.value().trim().is_empty() {
            errors.push(ValidationIssue::BlankTokenValue { position });
        } else if !seen.insert(token.value()) {
            errors.push(ValidationIssue::DuplicateTokenValue {
                value: token.value().to_string(),
            });
        }
        if token.label().trim().is_empty() {
            errors.push(ValidationIssue::BlankTokenLabel { position });
        }
    }

    for question in draft.questions() {
        for locale in draft.active_locales() {
            if !question.text().is_filled(locale) {
                errors.push(ValidationIssue::MissingQuestionText {
                    order: question.order(),
                    locale: locale.clone(),
                });
            }
        }
    }

    if !draft.schedule().is_ordered() {
        errors.push(ValidationIssue::ScheduleInverted);
    }

    errors
}

/// Localized fields with the primary title and description taken from the
/// scalar fields
#[must_use]
pub fn overlay_primary(draft: &SurveyDraft) -> LocalizedFields {
    let mut localized = draft.localized().clone();
    let primary = draft.primary_locale().clone();
    localized.title.set(primary.clone(), draft.title());
    localized.description.set(primary, draft.description());
    localized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftToken;
    use crate::reconciler;
    use chrono::{TimeZone, Utc};
    use survey_model::Locale;

    fn draft() -> SurveyDraft {
        let mut draft = SurveyDraft::empty(Locale::default());
        crate::locale::set_title(&mut draft, "Feedback");
        reconciler::append(&mut draft.tokens, DraftToken::new("abc12345", "Default"));
        draft
    }

    #[test]
    fn minimal_draft_formats() {
        let payload = format(&draft(), &IdentityLedger::for_new_survey()).unwrap();
        assert!(payload.id.is_none());
        assert_eq!(payload.title, "Feedback");
        assert_eq!(payload.tokens.len(), 1);
        assert!(payload.tokens[0].id.is_none());
    }

    #[test]
    fn token_issues_are_all_reported() {
        let mut draft = draft();
        reconciler::append(&mut draft.tokens, DraftToken::new("abc12345", ""));
        reconciler::append(&mut draft.tokens, DraftToken::new(" ", "Other"));
        let err = format(&draft, &IdentityLedger::for_new_survey()).unwrap_err();
        let DraftError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.contains(&ValidationIssue::DuplicateTokenValue {
            value: "abc12345".to_string()
        }));
        assert!(errors.contains(&ValidationIssue::BlankTokenLabel { position: 2 }));
        assert!(errors.contains(&ValidationIssue::BlankTokenValue { position: 3 }));
    }

    #[test]
    fn empty_token_set_rejected() {
        let mut draft = draft();
        draft.tokens.clear();
        let errors = validate(&draft);
        assert!(errors.contains(&ValidationIssue::EmptyTokenSet));
    }

    #[test]
    fn inverted_schedule_rejected() {
        let mut draft = draft();
        draft.schedule.starts_at = Utc.with_ymd_and_hms(2026, 5, 2, 0, 0, 0).single();
        draft.schedule.ends_at = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).single();
        let errors = validate(&draft);
        assert_eq!(errors.issues(), [ValidationIssue::ScheduleInverted]);
    }

    #[test]
    fn untitled_draft_formats_in_every_locale() {
        let mut draft = SurveyDraft::empty(Locale::default());
        reconciler::append(&mut draft.tokens, DraftToken::new("abc123", "Default"));
        crate::locale::add_locale(&mut draft, Locale::parse("de").unwrap()).unwrap();
        let payload = format(&draft, &IdentityLedger::for_new_survey()).unwrap();
        assert_eq!(payload.title, "");
        assert_eq!(payload.languages.len(), 2);
    }
}
