//! Draft entities and the owned [`SurveyDraft`] value
//!
//! Fields that carry invariants (identity, order, answer binding, locale
//! coverage) are private. They change only through the reconciler, the ledger
//! and the locale synchronizer, so a caller holding a `&SurveyDraft` always
//! observes a consistent state.

use crate::reconciler::{self, Ordered};
use indexmap::IndexSet;
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use survey_model::{
    Identity, Locale, LocalizedField, LocalizedFields, LocalizedText, QuestionId, QuestionKind,
    QuestionRecord, RowKey, Schedule, SurveyFormat, SurveyId, SurveyRecord, SurveyType,
    TemplateId, TemplateQuestion, TokenId, TokenRecord,
};

/// Backend-reported answers attached to a persisted question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnswerBinding {
    answer_count: NonZeroU32,
}

impl AnswerBinding {
    /// Binding for a positive answer count, `None` for zero
    #[inline]
    #[must_use]
    pub fn new(answer_count: u32) -> Option<Self> {
        NonZeroU32::new(answer_count).map(|answer_count| Self { answer_count })
    }

    /// Number of stored answers
    #[inline]
    #[must_use]
    pub fn answer_count(&self) -> u32 {
        self.answer_count.get()
    }
}

/// A question being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftQuestion {
    key: RowKey,
    identity: Identity<QuestionId>,
    order: u32,
    kind: QuestionKind,
    text: LocalizedText,
    placeholder: LocalizedText,
    required: bool,
    answer_binding: Option<AnswerBinding>,
}

impl DraftQuestion {
    /// Blank session-local question with empty text for every locale
    pub(crate) fn blank<'a>(
        kind: QuestionKind,
        locales: impl IntoIterator<Item = &'a Locale> + Clone,
    ) -> Self {
        Self {
            key: RowKey::new(),
            identity: Identity::New,
            order: 0,
            kind,
            text: LocalizedText::seeded(locales.clone()),
            placeholder: LocalizedText::seeded(locales),
            required: false,
            answer_binding: None,
        }
    }

    pub(crate) fn from_record(record: QuestionRecord) -> Self {
        Self {
            key: RowKey::new(),
            identity: Identity::Persisted(record.id),
            order: record.order,
            kind: record.kind,
            text: record.text,
            placeholder: record.placeholder,
            required: record.required,
            answer_binding: None,
        }
    }

    /// Template questions always enter the draft as new questions
    pub(crate) fn from_template(question: &TemplateQuestion) -> Self {
        Self {
            key: RowKey::new(),
            identity: Identity::New,
            order: question.order,
            kind: question.kind,
            text: question.text.clone(),
            placeholder: question.placeholder.clone(),
            required: question.required,
            answer_binding: None,
        }
    }

    /// Session-local row key
    #[inline]
    #[must_use]
    pub fn key(&self) -> RowKey {
        self.key
    }

    /// Persisted or new
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &Identity<QuestionId> {
        &self.identity
    }

    /// Dense 1-based position
    #[inline]
    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Answer kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    /// Question text per locale
    #[inline]
    #[must_use]
    pub fn text(&self) -> &LocalizedText {
        &self.text
    }

    /// Placeholder per locale
    #[inline]
    #[must_use]
    pub fn placeholder(&self) -> &LocalizedText {
        &self.placeholder
    }

    /// Whether an answer is mandatory
    #[inline]
    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    /// Backend-reported answers, only ever set on persisted questions
    #[inline]
    #[must_use]
    pub fn answer_binding(&self) -> Option<AnswerBinding> {
        self.answer_binding
    }

    pub(crate) fn set_kind(&mut self, kind: QuestionKind) {
        self.kind = kind;
    }

    pub(crate) fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    pub(crate) fn text_mut(&mut self) -> &mut LocalizedText {
        &mut self.text
    }

    pub(crate) fn placeholder_mut(&mut self) -> &mut LocalizedText {
        &mut self.placeholder
    }

    /// Attach or clear a binding. New questions never carry one.
    pub(crate) fn set_answer_binding(&mut self, binding: Option<AnswerBinding>) {
        self.answer_binding = if self.identity.is_persisted() {
            binding
        } else {
            None
        };
    }
}

impl Ordered for DraftQuestion {
    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

/// A public-access token being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftToken {
    key: RowKey,
    identity: Identity<TokenId>,
    order: u32,
    value: String,
    label: String,
}

impl DraftToken {
    pub(crate) fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: RowKey::new(),
            identity: Identity::New,
            order: 0,
            value: value.into(),
            label: label.into(),
        }
    }

    pub(crate) fn from_record(record: TokenRecord) -> Self {
        Self {
            key: RowKey::new(),
            identity: Identity::Persisted(record.id),
            order: 0,
            value: record.value,
            label: record.label,
        }
    }

    /// Session-local row key
    #[inline]
    #[must_use]
    pub fn key(&self) -> RowKey {
        self.key
    }

    /// Persisted or new
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &Identity<TokenId> {
        &self.identity
    }

    /// Dense 1-based position
    #[inline]
    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Access value embedded in public links
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Human description
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub(crate) fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }
}

impl Ordered for DraftToken {
    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

/// Scalar view of the localized fields for the locale being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleProjection {
    locale: Locale,
    values: BTreeMap<LocalizedField, String>,
}

impl LocaleProjection {
    /// Project `fields` onto `locale`, absent keys read as empty
    #[must_use]
    pub fn of(fields: &LocalizedFields, locale: &Locale) -> Self {
        let values = LocalizedField::ALL
            .iter()
            .map(|field| (*field, fields.get(*field).get_or_empty(locale).to_string()))
            .collect();
        Self {
            locale: locale.clone(),
            values,
        }
    }

    /// Locale being edited
    #[inline]
    #[must_use]
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Scalar value of a field
    #[must_use]
    pub fn get(&self, field: LocalizedField) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    pub(crate) fn set(&mut self, field: LocalizedField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }
}

/// The in-session survey definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyDraft {
    pub(crate) survey_id: Option<SurveyId>,
    pub(crate) primary_locale: Locale,
    pub(crate) active_locales: IndexSet<Locale>,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) localized: LocalizedFields,
    pub(crate) projection: LocaleProjection,
    pub(crate) questions: Vec<DraftQuestion>,
    pub(crate) tokens: Vec<DraftToken>,
    pub(crate) format: SurveyFormat,
    pub(crate) survey_type: SurveyType,
    pub(crate) schedule: Schedule,
    pub(crate) template_ref: Option<TemplateId>,
}

impl SurveyDraft {
    /// Empty draft for a brand-new survey
    #[must_use]
    pub fn empty(primary_locale: Locale) -> Self {
        let mut active_locales = IndexSet::new();
        active_locales.insert(primary_locale.clone());
        let localized = LocalizedFields::seeded(active_locales.iter());
        let projection = LocaleProjection::of(&localized, &primary_locale);
        Self {
            survey_id: None,
            primary_locale,
            active_locales,
            title: String::new(),
            description: String::new(),
            localized,
            projection,
            questions: Vec::new(),
            tokens: Vec::new(),
            format: SurveyFormat::default(),
            survey_type: SurveyType::default(),
            schedule: Schedule::default(),
            template_ref: None,
        }
    }

    /// Draft hydrated from a persisted survey
    ///
    /// Every question and token starts out persisted. Stored `order` values
    /// only decide the initial sequence; they are re-derived right away.
    #[must_use]
    pub fn from_record(record: SurveyRecord, primary_locale: Locale) -> Self {
        let mut active_locales = IndexSet::new();
        active_locales.insert(primary_locale.clone());
        active_locales.extend(record.languages);

        let mut questions: Vec<DraftQuestion> = record
            .questions
            .into_iter()
            .map(DraftQuestion::from_record)
            .collect();
        questions.sort_by_key(DraftQuestion::order);
        reconciler::renumber(&mut questions);

        let mut tokens: Vec<DraftToken> =
            record.tokens.into_iter().map(DraftToken::from_record).collect();
        reconciler::renumber(&mut tokens);

        let mut draft = Self {
            survey_id: Some(record.id),
            projection: LocaleProjection::of(&record.localized, &primary_locale),
            primary_locale,
            active_locales,
            title: record.title,
            description: record.description,
            localized: record.localized,
            questions,
            tokens,
            format: record.format,
            survey_type: record.survey_type,
            schedule: record.schedule,
            template_ref: record.template_id,
        };
        crate::locale::resync(&mut draft);
        draft
    }

    /// The draft's own backend identity
    #[inline]
    #[must_use]
    pub fn survey_id(&self) -> Option<&SurveyId> {
        self.survey_id.as_ref()
    }

    /// Locale that can never be removed
    #[inline]
    #[must_use]
    pub fn primary_locale(&self) -> &Locale {
        &self.primary_locale
    }

    /// Active locales in insertion order, primary first
    #[inline]
    #[must_use]
    pub fn active_locales(&self) -> &IndexSet<Locale> {
        &self.active_locales
    }

    /// Check if a locale is active
    #[inline]
    #[must_use]
    pub fn is_active(&self, locale: &Locale) -> bool {
        self.active_locales.contains(locale)
    }

    /// Scalar primary-locale title
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Scalar primary-locale description
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Multi-locale source of truth
    #[inline]
    #[must_use]
    pub fn localized(&self) -> &LocalizedFields {
        &self.localized
    }

    /// Scalar projection for the locale being edited
    #[inline]
    #[must_use]
    pub fn projection(&self) -> &LocaleProjection {
        &self.projection
    }

    /// Questions in order
    #[inline]
    #[must_use]
    pub fn questions(&self) -> &[DraftQuestion] {
        &self.questions
    }

    /// Tokens in order
    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &[DraftToken] {
        &self.tokens
    }

    /// Presentation format
    #[inline]
    #[must_use]
    pub fn format(&self) -> SurveyFormat {
        self.format
    }

    /// Survey kind
    #[inline]
    #[must_use]
    pub fn survey_type(&self) -> SurveyType {
        self.survey_type
    }

    /// Availability window
    #[inline]
    #[must_use]
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Template the draft was seeded from
    #[inline]
    #[must_use]
    pub fn template_ref(&self) -> Option<&TemplateId> {
        self.template_ref.as_ref()
    }

    /// Position of a question row
    #[must_use]
    pub fn question_index(&self, key: RowKey) -> Option<usize> {
        self.questions.iter().position(|q| q.key() == key)
    }

    /// Position of a token row
    #[must_use]
    pub fn token_index(&self, key: RowKey) -> Option<usize> {
        self.tokens.iter().position(|t| t.key() == key)
    }

    /// Persisted question ids still in the draft
    pub fn persisted_question_ids(&self) -> impl Iterator<Item = &QuestionId> {
        self.questions
            .iter()
            .filter_map(|q| q.identity().persisted_id())
    }

    /// Summary counts
    #[must_use]
    pub fn stats(&self) -> DraftStats {
        let persisted_questions = self
            .questions
            .iter()
            .filter(|q| q.identity().is_persisted())
            .count();
        let persisted_tokens = self
            .tokens
            .iter()
            .filter(|t| t.identity().is_persisted())
            .count();
        DraftStats {
            questions: self.questions.len(),
            new_questions: self.questions.len() - persisted_questions,
            bound_questions: self
                .questions
                .iter()
                .filter(|q| q.answer_binding().is_some())
                .count(),
            tokens: self.tokens.len(),
            new_tokens: self.tokens.len() - persisted_tokens,
            locales: self.active_locales.len(),
        }
    }
}

/// Summary counts of a draft
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DraftStats {
    /// Total questions
    pub questions: usize,
    /// Questions created in this session
    pub new_questions: usize,
    /// Persisted questions with stored answers
    pub bound_questions: usize,
    /// Total tokens
    pub tokens: usize,
    /// Tokens created in this session
    pub new_tokens: usize,
    /// Active locales
    pub locales: usize,
}
