//! Editing session
//!
//! [`EditorSession`] owns one [`DraftEditor`] and runs the backend calls
//! around it. Binding lookups and template fetches run as spawned tasks that
//! only send a [`SessionEvent`] back; the draft is touched solely by
//! [`EditorSession::apply_event`] on the owning task.

use crate::backend::SurveyBackend;
use crate::config::SessionConfig;
use crate::ticket::{Generations, RequestKind, RequestTicket, SessionEvent, SessionToken};
use std::collections::HashMap;
use std::sync::Arc;
use survey_draft::{DraftEditor, DraftError, PendingMerge};
use survey_model::{SurveyId, SurveyRecord, TemplateId, TemplateRecord};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What applying an event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Answer bindings merged into the draft
    BindingsApplied,
    /// Template catalog replaced
    TemplatesLoaded(usize),
    /// Stale, foreign or post-teardown result ignored
    Discarded,
    /// Nothing in flight and nothing buffered
    Idle,
}

/// One operator editing one survey
pub struct EditorSession {
    token: SessionToken,
    config: SessionConfig,
    backend: Arc<dyn SurveyBackend>,
    editor: Option<DraftEditor>,
    templates: Vec<TemplateRecord>,
    generations: Generations,
    in_flight: HashMap<RequestKind, (RequestTicket, JoinHandle<()>)>,
    events_tx: mpsc::Sender<SessionEvent>,
    events_rx: mpsc::Receiver<SessionEvent>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("token", &self.token)
            .field("closed", &self.editor.is_none())
            .field("templates", &self.templates.len())
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    fn with_editor(backend: Arc<dyn SurveyBackend>, config: SessionConfig, editor: DraftEditor) -> Self {
        let (events_tx, events_rx) = mpsc::channel(config.event_capacity.max(1));
        Self {
            token: SessionToken::new(),
            config,
            backend,
            editor: Some(editor),
            templates: Vec::new(),
            generations: Generations::default(),
            in_flight: HashMap::new(),
            events_tx,
            events_rx,
        }
    }

    /// Session for a brand-new survey
    #[must_use]
    pub fn open_new(backend: Arc<dyn SurveyBackend>, config: SessionConfig) -> Self {
        let editor = DraftEditor::new(config.editor.clone());
        let session = Self::with_editor(backend, config, editor);
        info!(session = %session.token, "new survey session opened");
        session
    }

    /// Session for a persisted survey
    ///
    /// Starts the binding lookup when configured to; until it lands every
    /// persisted question counts as possibly answered.
    ///
    /// # Errors
    /// Returns [`DraftError::SurveyFetchFailure`] when the survey cannot be
    /// loaded
    pub async fn open_existing(
        backend: Arc<dyn SurveyBackend>,
        config: SessionConfig,
        id: &SurveyId,
    ) -> Result<Self, DraftError> {
        let record = backend.fetch_survey(id).await.map_err(|e| {
            warn!(survey_id = %id, error = %e, "survey fetch failed");
            DraftError::SurveyFetchFailure(e.to_string())
        })?;
        let editor = DraftEditor::from_record(record, config.editor.clone());
        let mut session = Self::with_editor(backend, config, editor);
        info!(session = %session.token, survey_id = %id, "survey session opened");
        if session.config.auto_request_bindings {
            session.request_answer_bindings()?;
        }
        Ok(session)
    }

    /// Session identity
    #[inline]
    #[must_use]
    pub fn token(&self) -> SessionToken {
        self.token
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Check if torn down
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.editor.is_none()
    }

    /// The draft editor
    ///
    /// # Errors
    /// Returns [`DraftError::SessionClosed`] after teardown
    pub fn editor(&self) -> Result<&DraftEditor, DraftError> {
        self.editor.as_ref().ok_or(DraftError::SessionClosed)
    }

    /// The draft editor, mutably
    ///
    /// # Errors
    /// Returns [`DraftError::SessionClosed`] after teardown
    pub fn editor_mut(&mut self) -> Result<&mut DraftEditor, DraftError> {
        self.editor.as_mut().ok_or(DraftError::SessionClosed)
    }

    /// Last fetched template catalog
    #[inline]
    #[must_use]
    pub fn templates(&self) -> &[TemplateRecord] {
        &self.templates
    }

    /// Check if a request of `kind` is outstanding
    #[must_use]
    pub fn is_in_flight(&self, kind: RequestKind) -> bool {
        self.in_flight.contains_key(&kind)
    }

    /// Start a binding lookup, superseding any lookup in flight
    ///
    /// Returns `None` for a survey that was never saved.
    ///
    /// # Errors
    /// Returns [`DraftError::SessionClosed`] after teardown
    pub fn request_answer_bindings(&mut self) -> Result<Option<RequestTicket>, DraftError> {
        let Some(survey_id) = self.editor()?.draft().survey_id().cloned() else {
            return Ok(None);
        };
        let ticket = self.issue(RequestKind::AnswerBindings);
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        let handle = tokio::spawn(async move {
            let result = backend.fetch_answer_bindings(&survey_id).await;
            let _ = tx.send(SessionEvent::AnswerBindings { ticket, result }).await;
        });
        self.in_flight.insert(RequestKind::AnswerBindings, (ticket, handle));
        Ok(Some(ticket))
    }

    /// Start a template catalog fetch, superseding any fetch in flight
    ///
    /// # Errors
    /// Returns [`DraftError::SessionClosed`] after teardown
    pub fn request_templates(&mut self) -> Result<RequestTicket, DraftError> {
        self.editor()?;
        let ticket = self.issue(RequestKind::Templates);
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        let handle = tokio::spawn(async move {
            let result = backend.fetch_templates().await;
            let _ = tx.send(SessionEvent::Templates { ticket, result }).await;
        });
        self.in_flight.insert(RequestKind::Templates, (ticket, handle));
        Ok(ticket)
    }

    fn issue(&mut self, kind: RequestKind) -> RequestTicket {
        self.abort(kind);
        self.generations.issue(self.token, kind)
    }

    fn abort(&mut self, kind: RequestKind) {
        if let Some((ticket, handle)) = self.in_flight.remove(&kind) {
            handle.abort();
            debug!(?kind, generation = ticket.generation, "request superseded");
        }
    }

    /// Wait for the next background result
    ///
    /// Returns `None` when nothing is buffered and nothing is in flight. A
    /// received result no longer counts as in flight, whether or not it is
    /// later passed to [`EditorSession::apply_event`].
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let event = match self.events_rx.try_recv() {
            Ok(event) => event,
            Err(_) if self.in_flight.is_empty() => return None,
            Err(_) => self.events_rx.recv().await?,
        };
        self.settle(&event.ticket());
        Some(event)
    }

    fn settle(&mut self, ticket: &RequestTicket) {
        if self
            .in_flight
            .get(&ticket.kind)
            .is_some_and(|(current, _)| current == ticket)
        {
            self.in_flight.remove(&ticket.kind);
        }
    }

    /// Apply a background result to the draft
    ///
    /// Results from another session, from a superseded request or arriving
    /// after teardown are discarded.
    ///
    /// # Errors
    /// Returns [`DraftError::BindingLookupFailure`] (bindings are now unknown)
    /// or [`DraftError::TemplateFetchFailure`] (catalog left as it was)
    pub fn apply_event(&mut self, event: SessionEvent) -> Result<EventOutcome, DraftError> {
        let ticket = event.ticket();
        if self.editor.is_none() {
            debug!(kind = ?ticket.kind, "result after teardown discarded");
            return Ok(EventOutcome::Discarded);
        }
        if ticket.session != self.token {
            debug!(kind = ?ticket.kind, from = %ticket.session, "foreign result discarded");
            return Ok(EventOutcome::Discarded);
        }
        if !self.generations.is_current(&ticket) {
            debug!(kind = ?ticket.kind, generation = ticket.generation, "stale result discarded");
            return Ok(EventOutcome::Discarded);
        }
        self.settle(&ticket);

        match event {
            SessionEvent::AnswerBindings { result, .. } => {
                let editor = self.editor_mut()?;
                match result {
                    Ok(bindings) => {
                        editor.hydrate_bindings(bindings);
                        Ok(EventOutcome::BindingsApplied)
                    }
                    Err(e) => {
                        editor.mark_lookup_failed();
                        Err(DraftError::BindingLookupFailure(e.to_string()))
                    }
                }
            }
            SessionEvent::Templates { result, .. } => match result {
                Ok(templates) => {
                    debug!(count = templates.len(), "template catalog loaded");
                    self.templates = templates;
                    Ok(EventOutcome::TemplatesLoaded(self.templates.len()))
                }
                Err(e) => {
                    warn!(error = %e, "template fetch failed");
                    Err(DraftError::TemplateFetchFailure(e.to_string()))
                }
            },
        }
    }

    /// Wait for and apply the next background result
    ///
    /// # Errors
    /// Same as [`EditorSession::apply_event`]
    pub async fn pump(&mut self) -> Result<EventOutcome, DraftError> {
        match self.next_event().await {
            Some(event) => self.apply_event(event),
            None => Ok(EventOutcome::Idle),
        }
    }

    /// Propose merging a template from the loaded catalog
    ///
    /// # Errors
    /// Returns [`DraftError::TemplateFetchFailure`] for templates not in the
    /// catalog and [`DraftError::SessionClosed`] after teardown
    pub fn select_template(&mut self, id: &TemplateId) -> Result<&PendingMerge, DraftError> {
        let template = self
            .templates
            .iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| DraftError::TemplateFetchFailure(format!("template {id} is not loaded")))?;
        let editor = self.editor.as_mut().ok_or(DraftError::SessionClosed)?;
        Ok(editor.propose_template(template))
    }

    /// Validate, submit and re-hydrate from the stored record
    ///
    /// On rejection the draft stays exactly as it was.
    ///
    /// # Errors
    /// Returns validation and deletion-safety errors from the draft, or
    /// [`DraftError::SubmissionRejected`] with the backend message verbatim
    pub async fn submit(&mut self) -> Result<SurveyId, DraftError> {
        let payload = self.editor()?.build_submission()?;
        let record = match self.backend.submit_survey(payload).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "submission rejected");
                return Err(DraftError::SubmissionRejected(e.to_string()));
            }
        };
        self.rehydrate(record)
    }

    fn rehydrate(&mut self, record: SurveyRecord) -> Result<SurveyId, DraftError> {
        if self.editor.is_none() {
            return Err(DraftError::SessionClosed);
        }
        let id = record.id.clone();
        self.abort(RequestKind::AnswerBindings);
        self.generations.invalidate(RequestKind::AnswerBindings);
        self.editor = Some(DraftEditor::from_record(record, self.config.editor.clone()));
        info!(session = %self.token, survey_id = %id, "survey saved, draft re-hydrated");
        if self.config.auto_request_bindings {
            self.request_answer_bindings()?;
        }
        Ok(id)
    }

    /// Abort in-flight requests and cancel everything pending
    ///
    /// Every later call fails with [`DraftError::SessionClosed`]; later
    /// background results are discarded.
    pub fn teardown(&mut self) {
        self.abort(RequestKind::AnswerBindings);
        self.abort(RequestKind::Templates);
        if let Some(mut editor) = self.editor.take() {
            editor.teardown();
            info!(session = %self.token, "session closed");
        }
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        for (_, (_, handle)) in self.in_flight.drain() {
            handle.abort();
        }
    }
}
