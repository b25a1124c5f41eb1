//! Locale projection synchronizer
//!
//! The locale-keyed maps are the source of truth. The projection is a scalar
//! copy of one locale's values that the form edits; every write goes to both.
//! After every operation here, each active locale has a key in every map.

use crate::draft::{LocaleProjection, SurveyDraft};
use crate::error::MutationError;
use survey_model::{Locale, LocalizedField};
use tracing::debug;

/// Switch the projection to another active locale
///
/// # Errors
/// Returns [`MutationError::LocaleNotActive`] for inactive locales
pub fn set_active_locale(draft: &mut SurveyDraft, locale: &Locale) -> Result<(), MutationError> {
    if !draft.is_active(locale) {
        return Err(MutationError::LocaleNotActive(locale.clone()));
    }
    draft.projection = LocaleProjection::of(&draft.localized, locale);
    Ok(())
}

/// Write one field for the projected locale
///
/// When the projected locale is the primary locale, the scalar title and
/// description follow.
pub fn commit_projection(draft: &mut SurveyDraft, field: LocalizedField, value: impl Into<String>) {
    let value = value.into();
    let locale = draft.projection.locale().clone();
    if locale == draft.primary_locale {
        match field {
            LocalizedField::Title => draft.title.clone_from(&value),
            LocalizedField::Description => draft.description.clone_from(&value),
            _ => {}
        }
    }
    draft.localized.get_mut(field).set(locale, value.clone());
    draft.projection.set(field, value);
}

/// Edit the scalar primary-locale title
pub fn set_title(draft: &mut SurveyDraft, value: impl Into<String>) {
    write_primary(draft, LocalizedField::Title, value.into());
}

/// Edit the scalar primary-locale description
pub fn set_description(draft: &mut SurveyDraft, value: impl Into<String>) {
    write_primary(draft, LocalizedField::Description, value.into());
}

fn write_primary(draft: &mut SurveyDraft, field: LocalizedField, value: String) {
    match field {
        LocalizedField::Title => draft.title.clone_from(&value),
        LocalizedField::Description => draft.description.clone_from(&value),
        _ => {}
    }
    let primary = draft.primary_locale.clone();
    if draft.projection.locale() == &primary {
        draft.projection.set(field, value.clone());
    }
    draft.localized.get_mut(field).set(primary, value);
}

/// Activate a locale, seeding empty strings everywhere
///
/// # Errors
/// Returns [`MutationError::LocaleAlreadyActive`] when already present
pub fn add_locale(draft: &mut SurveyDraft, locale: Locale) -> Result<(), MutationError> {
    if draft.is_active(&locale) {
        return Err(MutationError::LocaleAlreadyActive(locale));
    }
    draft.localized.seed_locale(&locale);
    for question in &mut draft.questions {
        question.text_mut().seed(&locale);
        question.placeholder_mut().seed(&locale);
    }
    debug!(locale = %locale, "locale added");
    draft.active_locales.insert(locale);
    Ok(())
}

/// Deactivate a locale, pruning only its keys
///
/// # Errors
/// Returns [`MutationError::PrimaryLocale`] for the primary locale and
/// [`MutationError::LocaleNotActive`] for inactive locales
pub fn remove_locale(draft: &mut SurveyDraft, locale: &Locale) -> Result<(), MutationError> {
    if *locale == draft.primary_locale {
        return Err(MutationError::PrimaryLocale(locale.clone()));
    }
    if !draft.active_locales.shift_remove(locale) {
        return Err(MutationError::LocaleNotActive(locale.clone()));
    }
    draft.localized.remove_locale(locale);
    for question in &mut draft.questions {
        question.text_mut().remove(locale);
        question.placeholder_mut().remove(locale);
    }
    if draft.projection.locale() == locale {
        draft.projection = LocaleProjection::of(&draft.localized, &draft.primary_locale);
    }
    debug!(locale = %locale, "locale removed");
    Ok(())
}

/// Restore every invariant after a bulk replacement
///
/// Forces the primary locale in first, seeds missing keys, overlays the
/// scalar title and description onto the primary entries and re-projects.
pub fn resync(draft: &mut SurveyDraft) {
    let primary = draft.primary_locale.clone();
    if !draft.active_locales.contains(&primary) {
        draft.active_locales.shift_insert(0, primary.clone());
    }
    for locale in &draft.active_locales {
        draft.localized.seed_locale(locale);
        for question in &mut draft.questions {
            question.text_mut().seed(locale);
            question.placeholder_mut().seed(locale);
        }
    }
    draft
        .localized
        .title
        .set(primary.clone(), draft.title.clone());
    draft
        .localized
        .description
        .set(primary.clone(), draft.description.clone());

    let projected = if draft.is_active(draft.projection.locale()) {
        draft.projection.locale().clone()
    } else {
        primary
    };
    draft.projection = LocaleProjection::of(&draft.localized, &projected);
}

/// Check that every active locale is represented in every map
#[must_use]
pub fn is_complete(draft: &SurveyDraft) -> bool {
    draft.active_locales.iter().all(|locale| {
        draft.localized.covers(locale)
            && draft
                .questions
                .iter()
                .all(|q| q.text().contains(locale) && q.placeholder().contains(locale))
    })
}
