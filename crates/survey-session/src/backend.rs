//! Backend collaborator contract

use async_trait::async_trait;
use survey_model::{AnswerBindings, SubmissionPayload, SurveyId, SurveyRecord, TemplateRecord};

/// Survey persistence and analysis service
///
/// Implementations own transport and authentication. Every call is a single
/// request; failures are terminal for that request.
#[async_trait]
pub trait SurveyBackend: Send + Sync + 'static {
    /// Load a persisted survey
    async fn fetch_survey(&self, id: &SurveyId) -> Result<SurveyRecord, BackendError>;

    /// Answer counts per question
    async fn fetch_answer_bindings(&self, id: &SurveyId) -> Result<AnswerBindings, BackendError>;

    /// Template catalog
    async fn fetch_templates(&self) -> Result<Vec<TemplateRecord>, BackendError>;

    /// Persist a survey and return the stored record
    async fn submit_survey(&self, payload: SubmissionPayload) -> Result<SurveyRecord, BackendError>;
}

/// Backend failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Request never produced an answer
    #[error("transport failure: {0}")]
    Transport(String),

    /// Backend answered with a refusal
    #[error("{0}")]
    Rejected(String),

    /// Requested entity does not exist
    #[error("not found: {0}")]
    NotFound(String),
}
