//! Survey content fields shared by drafts, records and payloads

use crate::locale::{Locale, LocalizedText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the survey-level localized text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalizedField {
    /// Survey title
    Title,
    /// Survey description
    Description,
    /// Heading shown before the first question
    StartTitle,
    /// Body shown before the first question
    StartBody,
    /// Heading shown after completion
    EndTitle,
    /// Body shown after completion
    EndBody,
    /// Heading shown once the survey has expired
    ExpiredTitle,
    /// Body shown once the survey has expired
    ExpiredBody,
}

impl LocalizedField {
    /// Every field, in display order
    pub const ALL: [LocalizedField; 8] = [
        LocalizedField::Title,
        LocalizedField::Description,
        LocalizedField::StartTitle,
        LocalizedField::StartBody,
        LocalizedField::EndTitle,
        LocalizedField::EndBody,
        LocalizedField::ExpiredTitle,
        LocalizedField::ExpiredBody,
    ];
}

/// The group of survey-level multi-locale maps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedFields {
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub start_title: LocalizedText,
    pub start_body: LocalizedText,
    pub end_title: LocalizedText,
    pub end_body: LocalizedText,
    pub expired_title: LocalizedText,
    pub expired_body: LocalizedText,
}

impl LocalizedFields {
    /// Fields with an empty string for every locale
    #[must_use]
    pub fn seeded<'a>(locales: impl IntoIterator<Item = &'a Locale>) -> Self {
        let mut fields = Self::default();
        for locale in locales {
            fields.seed_locale(locale);
        }
        fields
    }

    /// Map for a field
    #[must_use]
    pub fn get(&self, field: LocalizedField) -> &LocalizedText {
        match field {
            LocalizedField::Title => &self.title,
            LocalizedField::Description => &self.description,
            LocalizedField::StartTitle => &self.start_title,
            LocalizedField::StartBody => &self.start_body,
            LocalizedField::EndTitle => &self.end_title,
            LocalizedField::EndBody => &self.end_body,
            LocalizedField::ExpiredTitle => &self.expired_title,
            LocalizedField::ExpiredBody => &self.expired_body,
        }
    }

    /// Mutable map for a field
    pub fn get_mut(&mut self, field: LocalizedField) -> &mut LocalizedText {
        match field {
            LocalizedField::Title => &mut self.title,
            LocalizedField::Description => &mut self.description,
            LocalizedField::StartTitle => &mut self.start_title,
            LocalizedField::StartBody => &mut self.start_body,
            LocalizedField::EndTitle => &mut self.end_title,
            LocalizedField::EndBody => &mut self.end_body,
            LocalizedField::ExpiredTitle => &mut self.expired_title,
            LocalizedField::ExpiredBody => &mut self.expired_body,
        }
    }

    /// Seed an empty string for `locale` in every field that lacks it
    pub fn seed_locale(&mut self, locale: &Locale) {
        for field in LocalizedField::ALL {
            self.get_mut(field).seed(locale);
        }
    }

    /// Remove `locale` from every field
    pub fn remove_locale(&mut self, locale: &Locale) {
        for field in LocalizedField::ALL {
            self.get_mut(field).remove(locale);
        }
    }

    /// Check that every field has a key for `locale`
    #[must_use]
    pub fn covers(&self, locale: &Locale) -> bool {
        LocalizedField::ALL
            .iter()
            .all(|field| self.get(*field).contains(locale))
    }
}

/// Question answer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Numeric rating scale
    #[default]
    Rating,
    /// Free text answer
    FreeText,
}

/// Presentation format of a survey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyFormat {
    /// All questions on one page
    #[default]
    SinglePage,
    /// One question per page
    Paged,
}

/// Kind of survey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyType {
    /// General feedback
    #[default]
    Feedback,
    /// Net promoter score
    Nps,
    /// Customer satisfaction
    Csat,
}

/// Optional availability window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Opening time
    pub starts_at: Option<DateTime<Utc>>,
    /// Closing time
    pub ends_at: Option<DateTime<Utc>>,
}

impl Schedule {
    /// Check the window is not inverted
    ///
    /// An open-ended schedule is always ordered.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        match (self.starts_at, self.ends_at) {
            (Some(start), Some(end)) => end > start,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn seeded_fields_cover_locales() {
        let en = Locale::parse("en").unwrap();
        let de = Locale::parse("de").unwrap();
        let fields = LocalizedFields::seeded([&en, &de]);
        assert!(fields.covers(&en));
        assert!(fields.covers(&de));
        assert_eq!(fields.get(LocalizedField::EndBody).get(&de), Some(""));
    }

    #[test]
    fn remove_locale_only_touches_that_locale() {
        let en = Locale::parse("en").unwrap();
        let fr = Locale::parse("fr").unwrap();
        let mut fields = LocalizedFields::seeded([&en, &fr]);
        fields.title.set(en.clone(), "Hello");
        fields.remove_locale(&fr);
        assert!(!fields.covers(&fr));
        assert_eq!(fields.title.get(&en), Some("Hello"));
    }

    #[test]
    fn schedule_ordering() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        assert!(Schedule::default().is_ordered());
        assert!(Schedule { starts_at: Some(start), ends_at: Some(end) }.is_ordered());
        assert!(!Schedule { starts_at: Some(end), ends_at: Some(start) }.is_ordered());
        assert!(Schedule { starts_at: Some(end), ends_at: None }.is_ordered());
    }
}
