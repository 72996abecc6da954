use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{
    AnswerSet, AttemptResult, AttemptSummary, AuthToken, Dashboard, MaterialDraft, QuizId,
};
use quiz_core::time::fixed_now;
use quiz_core::SessionPhase;
use services::{AppServices, Clock};
use storage::repository::{AttemptRepository, Storage, StorageError};
use storage::InMemoryRepository;

#[tokio::test]
async fn generate_take_and_review_a_quiz() {
    let services = AppServices::new(&Storage::in_memory(), Clock::fixed(fixed_now()));
    services
        .auth()
        .register("ada", "ada@example.com", "secret1")
        .await
        .unwrap();

    let material_id = services
        .materials()
        .create(MaterialDraft {
            title: "Oceans".into(),
            content: "The Pacific is the largest ocean. The Atlantic separates two continents."
                .into(),
            tags: vec!["geo".into()],
        })
        .await
        .unwrap();

    let mut draft = services.quizzes().draft_for(&material_id).await.unwrap();
    draft.num_questions = 3;
    let generated = services.quizzes().generate(draft).await.unwrap();

    let sessions = services.quiz_sessions();
    let mut session = sessions.start(&generated.quiz_id).await;
    assert_eq!(session.phase(), SessionPhase::InProgress);

    // Answer every question with its correct value.
    for index in 0..session.question_count() {
        session.jump_to(index).unwrap();
        let correct = session
            .current_question()
            .and_then(|q| q.correct_answer())
            .expect("generated questions have answers");
        session.select_answer(correct).unwrap();
    }
    assert!(session.can_submit());

    let outcome = sessions.submit(&mut session).await.unwrap();
    assert_eq!(outcome.score.correct(), 3);
    assert_eq!(outcome.score.percentage(), 100);
    assert!(outcome.attempt.is_some());

    let overview = services.dashboard().overview().await.unwrap();
    assert_eq!(overview.attempt_count(), 1);
    assert!((overview.stats.average_score - 100.0).abs() < 1e-9);

    session.restart().unwrap();
    assert_eq!(session.phase(), SessionPhase::InProgress);
    assert_eq!(session.answers().answered_count(), 0);
}

/// Attempt store that is always down.
struct UnreachableAttempts;

#[async_trait]
impl AttemptRepository for UnreachableAttempts {
    async fn record_attempt(
        &self,
        _token: &AuthToken,
        _quiz_id: &QuizId,
        _answers: &AnswerSet,
    ) -> Result<AttemptResult, StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }

    async fn list_attempts(&self, _token: &AuthToken) -> Result<Vec<AttemptSummary>, StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }

    async fn list_quiz_attempts(
        &self,
        _token: &AuthToken,
        _quiz_id: &QuizId,
    ) -> Result<Vec<AttemptSummary>, StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }

    async fn dashboard(&self, _token: &AuthToken) -> Result<Dashboard, StorageError> {
        Err(StorageError::Connection("connection refused".into()))
    }
}

#[tokio::test]
async fn failed_attempt_recording_keeps_local_score() {
    let repo = InMemoryRepository::new();
    let mut storage = Storage::from_memory(repo.clone());
    storage.attempts = Arc::new(UnreachableAttempts);
    let services = AppServices::new(&storage, Clock::fixed(fixed_now()));
    services
        .auth()
        .register("ada", "ada@example.com", "secret1")
        .await
        .unwrap();

    let material_id = services
        .materials()
        .create(MaterialDraft {
            title: "Cells".into(),
            content: "Cells divide.".into(),
            tags: vec![],
        })
        .await
        .unwrap();
    let mut draft = services.quizzes().draft_for(&material_id).await.unwrap();
    draft.num_questions = 1;
    draft.question_types = vec![quiz_core::model::QuestionType::TrueFalse];
    let generated = services.quizzes().generate(draft).await.unwrap();

    let sessions = services.quiz_sessions();
    let mut session = sessions.start(&generated.quiz_id).await;
    session.select_answer(false).unwrap();

    let outcome = sessions.submit(&mut session).await.unwrap();
    assert_eq!(session.phase(), SessionPhase::Submitted);
    assert_eq!(outcome.score.correct(), 0);
    assert_eq!(outcome.score.total(), 1);
    assert!(outcome.attempt.is_none());
    assert_eq!(
        outcome.record_error.as_deref(),
        Some("Could not reach the server.")
    );
    assert!(services.auth().is_signed_in());
}
