//! Outgoing `submit_survey` payload

use crate::fields::{LocalizedFields, QuestionKind, SurveyFormat, SurveyType};
use crate::id::{QuestionId, SurveyId, TemplateId, TokenId};
use crate::locale::{Locale, LocalizedText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated survey definition handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    /// Present when updating an existing survey
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<SurveyId>,
    pub title: String,
    pub description: String,
    pub languages: Vec<Locale>,
    pub localized: LocalizedFields,
    pub questions: Vec<QuestionPayload>,
    pub tokens: Vec<TokenPayload>,
    pub format: SurveyFormat,
    #[serde(rename = "type")]
    pub survey_type: SurveyType,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
}

/// One question of the payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    /// Omitted for questions created in this session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<QuestionId>,
    pub order: u32,
    pub kind: QuestionKind,
    pub text: LocalizedText,
    pub placeholder: LocalizedText,
    pub required: bool,
}

/// One token of the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Omitted for tokens created in this session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<TokenId>,
    pub value: String,
    pub label: String,
}
