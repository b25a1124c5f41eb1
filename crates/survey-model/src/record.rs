//! Backend record shapes consumed by the draft engine
//!
//! These mirror what the survey service returns. Every question and token in a
//! [`SurveyRecord`] already carries its backend identifier.

use crate::fields::{LocalizedFields, QuestionKind, Schedule, SurveyFormat, SurveyType};
use crate::id::{QuestionId, SurveyId, TemplateId, TemplateQuestionId, TokenId};
use crate::locale::{Locale, LocalizedText};
use serde::{Deserialize, Serialize};

/// A persisted survey as returned by `fetch_survey` or `submit_survey`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRecord {
    pub id: SurveyId,
    pub title: String,
    pub description: String,
    pub languages: Vec<Locale>,
    pub localized: LocalizedFields,
    pub questions: Vec<QuestionRecord>,
    pub tokens: Vec<TokenRecord>,
    pub format: SurveyFormat,
    #[serde(rename = "type")]
    pub survey_type: SurveyType,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub template_id: Option<TemplateId>,
}

/// A persisted question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub order: u32,
    pub kind: QuestionKind,
    pub text: LocalizedText,
    #[serde(default)]
    pub placeholder: LocalizedText,
    pub required: bool,
}

/// A persisted public-access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: TokenId,
    pub value: String,
    pub label: String,
}

/// A reusable template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub id: TemplateId,
    pub name: String,
    pub languages: Vec<Locale>,
    pub localized: LocalizedFields,
    pub questions: Vec<TemplateQuestion>,
    pub format: SurveyFormat,
    #[serde(rename = "type")]
    pub survey_type: SurveyType,
}

/// A question inside a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateQuestion {
    /// Template-namespace identifier, never carried into a draft
    #[serde(default)]
    pub id: Option<TemplateQuestionId>,
    pub order: u32,
    pub kind: QuestionKind,
    pub text: LocalizedText,
    #[serde(default)]
    pub placeholder: LocalizedText,
    pub required: bool,
}

/// Response of `fetch_answer_bindings`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerBindings {
    /// Whether the survey has collected any response at all
    pub has_responses: bool,
    /// Per-question answer counts
    pub bindings: Vec<QuestionBinding>,
}

impl AnswerBindings {
    /// Response for a survey without answers
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// Answer count for one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBinding {
    pub question_id: QuestionId,
    pub answer_count: u32,
}

impl QuestionBinding {
    /// Create binding fact
    #[inline]
    #[must_use]
    pub fn new(question_id: QuestionId, answer_count: u32) -> Self {
        Self {
            question_id,
            answer_count,
        }
    }
}
