//! Testing utilities for the survey draft workspace
//!
//! Shared fixtures and an in-memory [`FakeBackend`].

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use survey_draft::{DraftEditor, EditorConfig};
use survey_model::{
    AnswerBindings, Locale, LocalizedFields, LocalizedText, QuestionBinding, QuestionId,
    QuestionKind, QuestionRecord, SubmissionPayload, SurveyFormat, SurveyId, SurveyRecord,
    SurveyType, TemplateId, TemplateQuestion, TemplateRecord, TokenId, TokenRecord,
};
use survey_session::{BackendError, SurveyBackend};

pub fn locale(code: &str) -> Locale {
    Locale::parse(code).unwrap()
}

pub fn text(en: &str) -> LocalizedText {
    LocalizedText::new().with(locale("en"), en)
}

pub fn question_record(id: &str, order: u32, en: &str) -> QuestionRecord {
    QuestionRecord {
        id: QuestionId::new(id),
        order,
        kind: QuestionKind::Rating,
        text: text(en),
        placeholder: LocalizedText::new(),
        required: true,
    }
}

/// Survey 42: three English rating questions and two tokens
pub fn sample_survey() -> SurveyRecord {
    SurveyRecord {
        id: SurveyId::new("42"),
        title: "Quarterly feedback".to_string(),
        description: "How are we doing?".to_string(),
        languages: vec![locale("en")],
        localized: LocalizedFields::default(),
        questions: vec![
            question_record("q1", 1, "Overall satisfaction"),
            question_record("q2", 2, "Support quality"),
            question_record("q3", 3, "Value for money"),
        ],
        tokens: vec![
            TokenRecord {
                id: TokenId::new("t1"),
                value: "alpha123".to_string(),
                label: "Email".to_string(),
            },
            TokenRecord {
                id: TokenId::new("t2"),
                value: "beta4567".to_string(),
                label: "Website".to_string(),
            },
        ],
        format: SurveyFormat::SinglePage,
        survey_type: SurveyType::Feedback,
        schedule: Default::default(),
        template_id: None,
    }
}

/// q1 has answers, q2 and q3 have none
pub fn sample_bindings() -> AnswerBindings {
    AnswerBindings {
        has_responses: true,
        bindings: vec![
            QuestionBinding::new(QuestionId::new("q1"), 12),
            QuestionBinding::new(QuestionId::new("q2"), 0),
            QuestionBinding::new(QuestionId::new("q3"), 0),
        ],
    }
}

/// Two-locale NPS template with one rating question
pub fn nps_template() -> TemplateRecord {
    TemplateRecord {
        id: TemplateId::new("nps"),
        name: "Net promoter".to_string(),
        languages: vec![locale("en"), locale("de")],
        localized: LocalizedFields::default(),
        questions: vec![TemplateQuestion {
            id: None,
            order: 1,
            kind: QuestionKind::Rating,
            text: text("Would you recommend us?").with(locale("de"), "Würden Sie uns empfehlen?"),
            placeholder: LocalizedText::new(),
            required: true,
        }],
        format: SurveyFormat::Paged,
        survey_type: SurveyType::Nps,
    }
}

/// Editor over [`sample_survey`] with [`sample_bindings`] applied
pub fn hydrated_editor() -> DraftEditor {
    let mut editor = DraftEditor::from_record(sample_survey(), EditorConfig::default());
    editor.hydrate_bindings(sample_bindings());
    editor
}

/// Backend calls that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    FetchSurvey,
    AnswerBindings,
    Templates,
    Submit,
}

#[derive(Debug, Default)]
struct FakeState {
    surveys: HashMap<SurveyId, SurveyRecord>,
    bindings: HashMap<SurveyId, AnswerBindings>,
    templates: Vec<TemplateRecord>,
    failures: HashSet<FailPoint>,
    submissions: Vec<SubmissionPayload>,
    binding_calls: usize,
    next_id: u32,
}

/// In-memory survey service
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
    binding_delay: Option<Duration>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend holding [`sample_survey`], [`sample_bindings`] and [`nps_template`]
    pub fn seeded() -> Self {
        let backend = Self::new()
            .with_survey(sample_survey())
            .with_templates(vec![nps_template()]);
        backend
            .state
            .lock()
            .bindings
            .insert(SurveyId::new("42"), sample_bindings());
        backend
    }

    pub fn with_survey(self, record: SurveyRecord) -> Self {
        self.state.lock().surveys.insert(record.id.clone(), record);
        self
    }

    pub fn with_templates(self, templates: Vec<TemplateRecord>) -> Self {
        self.state.lock().templates = templates;
        self
    }

    /// Delay every binding lookup, leaving room to supersede or tear down
    pub fn with_binding_delay(mut self, delay: Duration) -> Self {
        self.binding_delay = Some(delay);
        self
    }

    pub fn fail(&self, point: FailPoint) {
        self.state.lock().failures.insert(point);
    }

    pub fn recover(&self, point: FailPoint) {
        self.state.lock().failures.remove(&point);
    }

    pub fn submissions(&self) -> Vec<SubmissionPayload> {
        self.state.lock().submissions.clone()
    }

    pub fn binding_calls(&self) -> usize {
        self.state.lock().binding_calls
    }

    fn check(&self, point: FailPoint) -> Result<(), BackendError> {
        if self.state.lock().failures.contains(&point) {
            Err(BackendError::Transport(format!("{point:?} unavailable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SurveyBackend for FakeBackend {
    async fn fetch_survey(&self, id: &SurveyId) -> Result<SurveyRecord, BackendError> {
        self.check(FailPoint::FetchSurvey)?;
        self.state
            .lock()
            .surveys
            .get(id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(id.to_string()))
    }

    async fn fetch_answer_bindings(&self, id: &SurveyId) -> Result<AnswerBindings, BackendError> {
        self.state.lock().binding_calls += 1;
        if let Some(delay) = self.binding_delay {
            tokio::time::sleep(delay).await;
        }
        self.check(FailPoint::AnswerBindings)?;
        Ok(self
            .state
            .lock()
            .bindings
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_templates(&self) -> Result<Vec<TemplateRecord>, BackendError> {
        self.check(FailPoint::Templates)?;
        Ok(self.state.lock().templates.clone())
    }

    async fn submit_survey(&self, payload: SubmissionPayload) -> Result<SurveyRecord, BackendError> {
        if self.state.lock().failures.contains(&FailPoint::Submit) {
            return Err(BackendError::Rejected("title already taken".to_string()));
        }
        let mut state = self.state.lock();
        state.submissions.push(payload.clone());

        let mut fresh = |prefix: &str| {
            state.next_id += 1;
            format!("{prefix}-{}", state.next_id)
        };
        let id = payload.id.clone().unwrap_or_else(|| SurveyId::new(fresh("s")));
        let questions = payload
            .questions
            .iter()
            .map(|q| QuestionRecord {
                id: q.id.clone().unwrap_or_else(|| QuestionId::new(fresh("q"))),
                order: q.order,
                kind: q.kind,
                text: q.text.clone(),
                placeholder: q.placeholder.clone(),
                required: q.required,
            })
            .collect();
        let tokens = payload
            .tokens
            .iter()
            .map(|t| TokenRecord {
                id: t.id.clone().unwrap_or_else(|| TokenId::new(fresh("t"))),
                value: t.value.clone(),
                label: t.label.clone(),
            })
            .collect();

        let record = SurveyRecord {
            id: id.clone(),
            title: payload.title,
            description: payload.description,
            languages: payload.languages,
            localized: payload.localized,
            questions,
            tokens,
            format: payload.format,
            survey_type: payload.survey_type,
            schedule: survey_model::Schedule {
                starts_at: payload.starts_at,
                ends_at: payload.ends_at,
            },
            template_id: payload.template_id,
        };
        state.surveys.insert(id, record.clone());
        Ok(record)
    }
}
