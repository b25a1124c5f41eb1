//! End-to-end editing scenarios against a hydrated draft

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;
use survey_draft::{
    BindingState, DraftEditor, DraftError, EditorConfig, GatePhase, MutationError,
    RemovalOutcome,
};
use survey_model::{
    AnswerBindings, Identity, Locale, LocalizedFields, LocalizedText, QuestionBinding,
    QuestionId, QuestionKind, QuestionRecord, RowKey, SurveyFormat, SurveyId, SurveyRecord,
    SurveyType, TemplateId, TemplateQuestion, TemplateRecord, TokenId, TokenRecord,
};

fn loc(code: &str) -> Locale {
    Locale::parse(code).unwrap()
}

fn question(id: &str, order: u32, text: &str) -> QuestionRecord {
    QuestionRecord {
        id: QuestionId::new(id),
        order,
        kind: QuestionKind::Rating,
        text: LocalizedText::new().with(loc("en"), text),
        placeholder: LocalizedText::new(),
        required: true,
    }
}

fn survey_42() -> SurveyRecord {
    SurveyRecord {
        id: SurveyId::new("42"),
        title: "Quarterly feedback".to_string(),
        description: "How are we doing?".to_string(),
        languages: vec![loc("en")],
        localized: LocalizedFields::default(),
        questions: vec![
            question("q1", 1, "Overall"),
            question("q2", 2, "Support"),
            question("q3", 3, "Pricing"),
            question("q4", 4, "Docs"),
            question("q5", 5, "Onboarding"),
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

fn bindings(pairs: &[(&str, u32)]) -> AnswerBindings {
    AnswerBindings {
        has_responses: true,
        bindings: pairs
            .iter()
            .map(|(id, n)| QuestionBinding::new(QuestionId::new(*id), *n))
            .collect(),
    }
}

fn hydrated_editor() -> DraftEditor {
    let mut editor = DraftEditor::from_record(survey_42(), EditorConfig::default());
    editor.hydrate_bindings(bindings(&[
        ("q1", 12),
        ("q2", 0),
        ("q3", 0),
        ("q4", 0),
        ("q5", 0),
    ]));
    editor
}

fn identities(editor: &DraftEditor) -> BTreeSet<(RowKey, Option<QuestionId>)> {
    editor
        .draft()
        .questions()
        .iter()
        .map(|q| (q.key(), q.identity().persisted_id().cloned()))
        .collect()
}

fn nps_template() -> TemplateRecord {
    TemplateRecord {
        id: TemplateId::new("nps"),
        name: "Net promoter".to_string(),
        languages: vec![loc("en"), loc("de")],
        localized: LocalizedFields::default(),
        questions: vec![TemplateQuestion {
            id: None,
            order: 1,
            kind: QuestionKind::Rating,
            text: LocalizedText::new()
                .with(loc("en"), "Would you recommend us?")
                .with(loc("de"), "Würden Sie uns empfehlen?"),
            placeholder: LocalizedText::new(),
            required: true,
        }],
        format: SurveyFormat::Paged,
        survey_type: SurveyType::Nps,
    }
}

proptest! {
    #[test]
    fn reorder_preserves_identities(moves in prop::collection::vec((0usize..7, 0usize..7), 1..40)) {
        let mut editor = hydrated_editor();
        editor.append_question(QuestionKind::FreeText);
        editor.append_question(QuestionKind::Rating);
        let before = identities(&editor);

        for (from, to) in moves {
            editor.move_question(from, to).unwrap();
        }

        prop_assert_eq!(identities(&editor), before);
        let orders: Vec<u32> = editor.draft().questions().iter().map(|q| q.order()).collect();
        prop_assert_eq!(orders, (1..=7).collect::<Vec<u32>>());
    }
}

#[test]
fn new_entities_never_touch_persisted_ids() {
    let mut editor = hydrated_editor();
    let persisted_before: Vec<QuestionId> =
        editor.draft().persisted_question_ids().cloned().collect();

    let mut seen_keys: BTreeSet<RowKey> = editor.draft().questions().iter().map(|q| q.key()).collect();
    for _ in 0..5 {
        let key = editor.append_question(QuestionKind::FreeText);
        assert!(seen_keys.insert(key), "row key reused");
        let index = editor.draft().question_index(key).unwrap();
        assert!(matches!(
            editor.draft().questions()[index].identity(),
            Identity::New
        ));
        let outcome = editor.remove_question(index).unwrap();
        assert!(matches!(outcome, RemovalOutcome::Removed(_)));
    }

    let persisted_after: Vec<QuestionId> =
        editor.draft().persisted_question_ids().cloned().collect();
    assert_eq!(persisted_after, persisted_before);
}

#[test]
fn gate_pending_does_not_mutate_and_cancel_restores() {
    let mut editor = hydrated_editor();
    let before = editor.draft().clone();

    let outcome = editor.remove_question(0).unwrap();
    let RemovalOutcome::AwaitingConfirmation(pending) = outcome else {
        panic!("bound question removed without confirmation");
    };
    assert_eq!(pending.question_id, QuestionId::new("q1"));
    assert_eq!(pending.binding, BindingState::Bound(12));
    assert_eq!(editor.gate().phase(), GatePhase::PendingConfirmation);
    assert_eq!(editor.draft(), &before);

    let err = editor.remove_question(1).unwrap_err();
    assert!(matches!(
        err,
        DraftError::Mutation(MutationError::ConfirmationPending)
    ));

    editor.cancel_removal().unwrap();
    assert_eq!(editor.gate().phase(), GatePhase::Idle);
    assert_eq!(editor.draft(), &before);
}

#[test]
fn gate_confirm_follows_row_across_reorder() {
    let mut editor = hydrated_editor();
    editor.remove_question(0).unwrap();
    editor.move_question(0, 4).unwrap();

    let removed = editor.confirm_removal().unwrap();
    assert_eq!(
        removed.identity().persisted_id(),
        Some(&QuestionId::new("q1"))
    );
    let remaining: Vec<&str> = editor
        .draft()
        .persisted_question_ids()
        .map(QuestionId::as_str)
        .collect();
    assert_eq!(remaining, ["q2", "q3", "q4", "q5"]);
    assert!(editor.build_submission().is_ok());
}

#[test]
fn unbound_persisted_question_removed_immediately() {
    let mut editor = hydrated_editor();
    let outcome = editor.remove_question(1).unwrap();
    assert!(matches!(outcome, RemovalOutcome::Removed(_)));
    assert!(editor.build_submission().is_ok());
}

#[test]
fn failed_lookup_gates_every_persisted_question() {
    let mut editor = DraftEditor::from_record(survey_42(), EditorConfig::default());
    editor.mark_lookup_failed();
    for index in 0..5 {
        assert_eq!(editor.binding_state(index).unwrap(), BindingState::Unknown);
    }
    let outcome = editor.remove_question(3).unwrap();
    assert!(matches!(outcome, RemovalOutcome::AwaitingConfirmation(_)));
}

#[test]
fn disabled_warnings_bypass_gate() {
    let config = EditorConfig::new().with_deletion_warnings(false);
    let mut editor = DraftEditor::from_record(survey_42(), config);
    editor.hydrate_bindings(bindings(&[("q1", 12)]));
    let outcome = editor.remove_question(0).unwrap();
    assert!(matches!(outcome, RemovalOutcome::Removed(_)));
    assert!(editor.build_submission().is_ok());
}

#[test]
fn locale_maps_stay_complete() {
    let mut editor = hydrated_editor();
    editor.add_locale("fr").unwrap();
    let fr = loc("fr");
    assert!(editor.draft().localized().covers(&fr));
    for question in editor.draft().questions() {
        assert_eq!(question.text().get(&fr), Some(""));
        assert_eq!(question.placeholder().get(&fr), Some(""));
    }

    editor.add_locale("de").unwrap();
    editor.set_question_text(0, &loc("de"), "Gesamt").unwrap();
    editor.set_question_text(0, &fr, "Global").unwrap();

    let texts_before: Vec<LocalizedText> = editor
        .draft()
        .questions()
        .iter()
        .map(|q| {
            let mut text = q.text().clone();
            text.remove(&fr);
            text
        })
        .collect();
    editor.remove_locale("fr").unwrap();
    assert!(!editor.draft().is_active(&fr));
    let texts_after: Vec<LocalizedText> = editor
        .draft()
        .questions()
        .iter()
        .map(|q| q.text().clone())
        .collect();
    assert_eq!(texts_after, texts_before);
    let first = editor.draft().questions()[0].text();
    assert_eq!(first.get(&loc("en")), Some("Overall"));
    assert_eq!(first.get(&loc("de")), Some("Gesamt"));
}

#[test]
fn single_token_cannot_be_removed() {
    let mut editor = hydrated_editor();
    editor.remove_token(0).unwrap();
    let err = editor.remove_token(0).unwrap_err();
    assert!(matches!(err, DraftError::Mutation(MutationError::LastToken)));
    assert_eq!(editor.draft().tokens().len(), 1);
    assert_eq!(editor.draft().tokens()[0].value(), "beta4567");
}

#[test]
fn template_merge_keeps_survey_identity_and_tokens() {
    let mut editor = hydrated_editor();
    let tokens_before = editor.draft().tokens().to_vec();

    let merge = editor.propose_template(&nps_template());
    assert_eq!(merge.dropped_questions(), 5);
    assert_eq!(merge.dropped_bound(), 1);
    editor.confirm_template().unwrap();

    let draft = editor.draft();
    assert_eq!(draft.survey_id(), Some(&SurveyId::new("42")));
    assert_eq!(draft.tokens(), tokens_before.as_slice());
    assert!(draft.questions().iter().all(|q| q.identity().is_new()));
    assert_eq!(draft.survey_type(), SurveyType::Nps);
    assert_eq!(draft.title(), "Net promoter");
    assert!(draft.is_active(&loc("de")));
}

#[test]
fn dropping_bound_questions_by_merge_requires_acknowledgement() {
    let mut editor = hydrated_editor();
    editor.propose_template(&nps_template());
    editor.confirm_template().unwrap();
    editor.commit_projection(survey_model::LocalizedField::Title, "Net promoter");
    editor.set_active_locale("de").unwrap();
    editor.commit_projection(survey_model::LocalizedField::Title, "Weiterempfehlung");

    let err = editor.build_submission().unwrap_err();
    let DraftError::UnconfirmedDestructiveDeletion { question_ids } = err else {
        panic!("expected destructive deletion error, got {err:?}");
    };
    assert_eq!(question_ids, [QuestionId::new("q1")]);

    editor.acknowledge_removals(question_ids);
    let payload = editor.build_submission().unwrap();
    assert_eq!(payload.id, Some(SurveyId::new("42")));
    assert_eq!(payload.template_id, Some(TemplateId::new("nps")));
}

#[test]
fn template_merge_cancels_waiting_removal() {
    let mut editor = hydrated_editor();
    let outcome = editor.remove_question(0).unwrap();
    assert!(matches!(outcome, RemovalOutcome::AwaitingConfirmation(_)));

    editor.propose_template(&nps_template());
    editor.confirm_template().unwrap();
    assert_eq!(editor.gate().phase(), GatePhase::Idle);
    assert!(editor.confirm_removal().is_err());
    assert_eq!(editor.draft().questions().len(), 1);
}

#[test]
fn cancelled_merge_changes_nothing() {
    let mut editor = hydrated_editor();
    let before = editor.draft().clone();
    editor.propose_template(&nps_template());
    editor.cancel_template().unwrap();
    assert_eq!(editor.draft(), &before);
    assert!(editor.pending_merge().is_none());
}

#[test]
fn payload_shape_for_two_locale_rating_question() {
    let mut editor = DraftEditor::new(EditorConfig::default());
    editor.set_token_value(0, "tok12345").unwrap();
    editor.set_title("Customer survey");
    editor.add_locale("de").unwrap();
    editor.set_active_locale("de").unwrap();
    editor.commit_projection(survey_model::LocalizedField::Title, "Kundenumfrage");

    editor.append_question(QuestionKind::Rating);
    editor
        .set_question_text(0, &loc("en"), "How satisfied are you?")
        .unwrap();
    editor
        .set_question_text(0, &loc("de"), "Wie zufrieden sind Sie?")
        .unwrap();
    editor.set_question_required(0, true).unwrap();

    let payload = editor.build_submission().unwrap();
    let json = serde_json::to_value(&payload).unwrap();

    let empty = json!({ "de": "", "en": "" });
    assert_eq!(
        json,
        json!({
            "title": "Customer survey",
            "description": "",
            "languages": ["en", "de"],
            "localized": {
                "title": { "en": "Customer survey", "de": "Kundenumfrage" },
                "description": empty,
                "startTitle": empty,
                "startBody": empty,
                "endTitle": empty,
                "endBody": empty,
                "expiredTitle": empty,
                "expiredBody": empty,
            },
            "questions": [{
                "order": 1,
                "kind": "rating",
                "text": { "en": "How satisfied are you?", "de": "Wie zufrieden sind Sie?" },
                "placeholder": { "en": "", "de": "" },
                "required": true,
            }],
            "tokens": [{ "value": "tok12345", "label": "Default" }],
            "format": "single_page",
            "type": "feedback",
            "startsAt": null,
            "endsAt": null,
        })
    );
}

#[test]
fn single_rating_question_in_two_locales_formats() {
    let mut editor = DraftEditor::new(EditorConfig::default());
    editor.set_token_value(0, "abc123").unwrap();
    editor.add_locale("de").unwrap();
    editor.append_question(QuestionKind::Rating);
    editor.set_question_text(0, &loc("en"), "Rate us").unwrap();
    editor
        .set_question_text(0, &loc("de"), "Bewerten Sie uns")
        .unwrap();
    editor.set_question_required(0, true).unwrap();

    let payload = editor.build_submission().unwrap();
    assert_eq!(payload.languages, [loc("en"), loc("de")]);
    assert_eq!(payload.questions.len(), 1);
    assert_eq!(payload.questions[0].order, 1);
    assert_eq!(payload.questions[0].kind, QuestionKind::Rating);
    assert!(payload.questions[0].required);
    assert_eq!(payload.questions[0].text.get(&loc("de")), Some("Bewerten Sie uns"));
    assert_eq!(payload.tokens.len(), 1);
    assert_eq!(payload.tokens[0].value, "abc123");
    assert_eq!(payload.tokens[0].label, "Default");
}

#[test]
fn missing_translation_blocks_submission() {
    let mut editor = DraftEditor::new(EditorConfig::default());
    editor.set_title("Survey");
    editor.add_locale("de").unwrap();
    editor.append_question(QuestionKind::FreeText);
    editor
        .set_question_text(0, &loc("en"), "Anything else?")
        .unwrap();

    let err = editor.build_submission().unwrap_err();
    let DraftError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(errors.issues().len(), 2);
    assert!(errors.contains(&survey_draft::ValidationIssue::MissingQuestionText {
        order: 1,
        locale: loc("de"),
    }));
}
