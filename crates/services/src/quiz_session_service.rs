use std::sync::Arc;

use quiz_core::model::{AttemptResult, AttemptSummary, QuizId};
use quiz_core::{QuizSession, Score, SessionError};
use storage::repository::{AttemptRepository, QuizRepository, StorageError};
use tracing::{debug, warn};

use crate::auth_service::AuthSession;
use crate::error::QuizSessionError;

/// Result of submitting a session: the local score always, plus the
/// backend's acknowledgement when recording the attempt worked.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub score: Score,
    pub attempt: Option<AttemptResult>,
    /// Set when the attempt could not be saved; the local score still stands.
    pub record_error: Option<String>,
}

/// Drives `QuizSession` against the backend: loading quizzes and recording attempts.
#[derive(Clone)]
pub struct QuizSessionService {
    auth: Arc<AuthSession>,
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl QuizSessionService {
    #[must_use]
    pub fn new(
        auth: Arc<AuthSession>,
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            auth,
            quizzes,
            attempts,
        }
    }

    /// Fetch the quiz and hand back a session ready to answer.
    ///
    /// Never fails: a fetch failure yields a session in the `Error` phase
    /// carrying a message for the view.
    pub async fn start(&self, quiz_id: &QuizId) -> QuizSession {
        let token = match self.auth.token() {
            Ok(token) => token,
            Err(err) => return QuizSession::failed(err.to_string()),
        };

        let fetched = self
            .auth
            .guard(self.quizzes.get_quiz(&token, quiz_id).await)
            .await;
        let mut session = QuizSession::new();
        match fetched {
            Ok(quiz) => {
                debug!(quiz = %quiz_id, questions = quiz.question_count(), "quiz loaded");
                if let Err(err) = session.load_quiz(quiz) {
                    warn!(quiz = %quiz_id, error = %err, "quiz cannot be taken");
                }
            }
            Err(err) => {
                warn!(quiz = %quiz_id, error = %err, "failed to load quiz");
                session.fail(load_failure_message(&err));
            }
        }
        session
    }

    /// Grade the session locally, then record the attempt with the backend.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Session` if the session cannot be submitted
    /// (wrong phase or unanswered questions). Recording failures are reported
    /// in `SubmitOutcome::record_error` instead.
    pub async fn submit(
        &self,
        session: &mut QuizSession,
    ) -> Result<SubmitOutcome, QuizSessionError> {
        session.submit()?;
        self.record(session).await
    }

    /// Record an already submitted session with the backend.
    ///
    /// The view grades the session synchronously and only awaits this part, so
    /// the session is `Submitted` while the request is in flight.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Session` unless the session is `Submitted`.
    /// Recording failures are reported in `SubmitOutcome::record_error` instead.
    pub async fn record(&self, session: &QuizSession) -> Result<SubmitOutcome, QuizSessionError> {
        let Some(score) = session.score() else {
            return Err(SessionError::InvalidTransition {
                action: "record an attempt",
                phase: session.phase(),
            }
            .into());
        };
        let Some(quiz_id) = session.quiz().map(|q| q.id.clone()) else {
            return Ok(SubmitOutcome {
                score,
                attempt: None,
                record_error: None,
            });
        };

        let recorded = match self.auth.token() {
            Ok(token) => self
                .auth
                .guard(
                    self.attempts
                        .record_attempt(&token, &quiz_id, session.answers())
                        .await,
                )
                .await
                .map_err(|err| err.user_message()),
            Err(err) => Err(err.to_string()),
        };

        Ok(match recorded {
            Ok(attempt) => {
                debug!(quiz = %quiz_id, attempt = %attempt.attempt_id, "attempt recorded");
                SubmitOutcome {
                    score,
                    attempt: Some(attempt),
                    record_error: None,
                }
            }
            Err(message) => {
                warn!(quiz = %quiz_id, error = %message, "failed to record attempt");
                SubmitOutcome {
                    score,
                    attempt: None,
                    record_error: Some(message),
                }
            }
        })
    }

    /// Previous attempts of one quiz, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Auth` when signed out, or `Storage` on backend failure.
    pub async fn quiz_attempts(
        &self,
        quiz_id: &QuizId,
    ) -> Result<Vec<AttemptSummary>, QuizSessionError> {
        let token = self.auth.token()?;
        let attempts = self
            .auth
            .guard(self.attempts.list_quiz_attempts(&token, quiz_id).await)
            .await?;
        Ok(attempts)
    }
}

fn load_failure_message(err: &StorageError) -> String {
    match err {
        StorageError::NotFound => "Quiz not found.".to_owned(),
        other => format!("Failed to load quiz: {}", other.user_message()),
    }
}
