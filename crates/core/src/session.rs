//! Quiz-taking state machine.
//!
//! ```text
//! Loading ──load_quiz──▶ InProgress ──submit──▶ Submitted
//!    │                    ▲    │  select/next/prev/jump  │
//!    └──fail──▶ Error     │    └──────────────┘          │
//!                         └─────────restart──────────────┘
//! ```
//!
//! `Error` is terminal; a fresh `QuizSession` is the only way out.

use std::fmt;

use thiserror::Error;

use crate::grading::{Score, grade_answer};
use crate::model::{AnswerSet, AnswerValue, Question, Quiz};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    InProgress,
    Submitted,
    Error,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loading => "loading",
            Self::InProgress => "in progress",
            Self::Submitted => "submitted",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot {action} while the session is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: SessionPhase,
    },

    #[error("{unanswered} question(s) still unanswered")]
    Incomplete { unanswered: usize },

    #[error("question index {index} is out of range (quiz has {len} questions)")]
    OutOfRange { index: usize, len: usize },

    #[error("quiz has no questions")]
    EmptyQuiz,
}

/// Feedback for one question once the session is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOutcome {
    pub correct: bool,
    pub given: Option<AnswerValue>,
    pub correct_answer: Option<AnswerValue>,
    pub explanation: String,
}

/// Controller for one run through a quiz.
///
/// Every mutating operation either applies fully or returns an error and leaves
/// the session untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    phase: SessionPhase,
    quiz: Option<Quiz>,
    answers: AnswerSet,
    current: usize,
    score: Option<Score>,
    error: Option<String>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    /// A session waiting for its quiz.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Loading,
            quiz: None,
            answers: AnswerSet::default(),
            current: 0,
            score: None,
            error: None,
        }
    }

    /// Shorthand for `new()` followed by `load_quiz`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyQuiz` for a quiz without questions.
    pub fn with_quiz(quiz: Quiz) -> Result<Self, SessionError> {
        let mut session = Self::new();
        session.load_quiz(quiz)?;
        Ok(session)
    }

    /// A session whose quiz could not be fetched.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.fail(reason);
        session
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Installs the quiz and resets answers, position and score.
    ///
    /// A quiz without questions is rejected. From `Loading` the session moves
    /// to `Error`; from any other phase it is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` from `Error`.
    /// Returns `SessionError::EmptyQuiz` for a quiz without questions.
    pub fn load_quiz(&mut self, quiz: Quiz) -> Result<(), SessionError> {
        self.ensure_not_failed("load a quiz")?;
        if quiz.questions.is_empty() {
            self.fail(SessionError::EmptyQuiz.to_string());
            return Err(SessionError::EmptyQuiz);
        }

        self.answers = AnswerSet::unanswered(quiz.questions.len());
        self.quiz = Some(quiz);
        self.current = 0;
        self.score = None;
        self.phase = SessionPhase::InProgress;
        Ok(())
    }

    /// Records a fetch failure. Only meaningful while `Loading`; ignored otherwise.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.phase != SessionPhase::Loading {
            return;
        }
        self.phase = SessionPhase::Error;
        self.error = Some(reason.into());
    }

    /// Overwrites the answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless `InProgress`.
    pub fn select_answer(&mut self, value: impl Into<AnswerValue>) -> Result<(), SessionError> {
        self.ensure_in_progress("select an answer")?;
        self.answers.set(self.current, value.into());
        Ok(())
    }

    /// Moves to the next question; stays put on the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless `InProgress`.
    pub fn go_next(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress("move to the next question")?;
        if self.current + 1 < self.question_count() {
            self.current += 1;
        }
        Ok(())
    }

    /// Moves to the previous question; stays put on the first one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless `InProgress`.
    pub fn go_previous(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress("move to the previous question")?;
        self.current = self.current.saturating_sub(1);
        Ok(())
    }

    /// Jumps to any question, answered or not.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless `InProgress`.
    /// Returns `SessionError::OutOfRange` for an index past the last question.
    pub fn jump_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_in_progress("jump to a question")?;
        let len = self.question_count();
        if index >= len {
            return Err(SessionError::OutOfRange { index, len });
        }
        self.current = index;
        Ok(())
    }

    /// Grades every question and freezes the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless `InProgress`.
    /// Returns `SessionError::Incomplete` while any question is unanswered.
    pub fn submit(&mut self) -> Result<Score, SessionError> {
        self.ensure_in_progress("submit")?;
        if !self.answers.is_complete() {
            return Err(SessionError::Incomplete {
                unanswered: self.answers.unanswered_count(),
            });
        }

        let score = Score::grade(self.questions(), &self.answers);
        self.score = Some(score);
        self.phase = SessionPhase::Submitted;
        Ok(score)
    }

    /// Clears answers and score and starts the same quiz over.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` from `Loading` or `Error`.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::InProgress | SessionPhase::Submitted => {}
            phase => {
                return Err(SessionError::InvalidTransition {
                    action: "restart",
                    phase,
                });
            }
        }
        self.answers.clear();
        self.current = 0;
        self.score = None;
        self.phase = SessionPhase::InProgress;
        Ok(())
    }

    fn ensure_in_progress(&self, action: &'static str) -> Result<(), SessionError> {
        if self.phase == SessionPhase::InProgress {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                phase: self.phase,
            })
        }
    }

    fn ensure_not_failed(&self, action: &'static str) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Error {
            Err(SessionError::InvalidTransition {
                action,
                phase: self.phase,
            })
        } else {
            Ok(())
        }
    }

    //
    // ─── READ-ONLY VIEW ────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        match &self.quiz {
            Some(quiz) => &quiz.questions,
            None => &[],
        }
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions().len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions().get(self.current)
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<&AnswerValue> {
        self.answers.get(self.current)
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> Option<Score> {
        self.score
    }

    /// Fetch failure message while in `Error`.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.question_count()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.phase == SessionPhase::InProgress && self.answers.is_complete()
    }

    /// Per-question feedback; `None` before submission or for a bad index.
    #[must_use]
    pub fn outcome(&self, index: usize) -> Option<QuestionOutcome> {
        if self.phase != SessionPhase::Submitted {
            return None;
        }
        let question = self.questions().get(index)?;
        let given = self.answers.get(index).cloned();
        Some(QuestionOutcome {
            correct: given
                .as_ref()
                .is_some_and(|answer| grade_answer(question, answer)),
            given,
            correct_answer: question.correct_answer(),
            explanation: question.explanation().to_owned(),
        })
    }
}
