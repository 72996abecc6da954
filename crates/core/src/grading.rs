use thiserror::Error;

use crate::model::{AnswerSet, AnswerValue, Question, QuestionKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("correct count ({correct}) exceeds total ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

/// Grades one answer against its question.
///
/// Multiple choice and true/false compare by equality; short answers compare
/// case-insensitively after trimming. Unknown question types are never correct.
#[must_use]
pub fn grade_answer(question: &Question, answer: &AnswerValue) -> bool {
    match (question.kind(), answer) {
        (QuestionKind::MultipleChoice { correct, .. }, AnswerValue::Text(given)) => given == correct,
        (QuestionKind::TrueFalse { correct }, AnswerValue::Bool(given)) => given == correct,
        (QuestionKind::ShortAnswer { correct }, AnswerValue::Text(given)) => {
            normalize_short_answer(given) == normalize_short_answer(correct)
        }
        _ => false,
    }
}

fn normalize_short_answer(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Result of grading a full answer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    correct: u32,
    total: u32,
    percentage: u32,
}

impl Score {
    /// # Errors
    ///
    /// Returns `ScoreError::CorrectExceedsTotal` if `correct > total`.
    pub fn new(correct: u32, total: u32) -> Result<Self, ScoreError> {
        if correct > total {
            return Err(ScoreError::CorrectExceedsTotal { correct, total });
        }
        Ok(Self {
            correct,
            total,
            percentage: rounded_percentage(correct, total),
        })
    }

    /// Grades every question; unanswered slots count as incorrect.
    #[must_use]
    pub fn grade(questions: &[Question], answers: &AnswerSet) -> Self {
        let correct = questions
            .iter()
            .enumerate()
            .filter(|(index, question)| {
                answers
                    .get(*index)
                    .is_some_and(|answer| grade_answer(question, answer))
            })
            .count();
        let total = u32::try_from(questions.len()).unwrap_or(u32::MAX);
        let correct = u32::try_from(correct).unwrap_or(u32::MAX).min(total);
        Self {
            correct,
            total,
            percentage: rounded_percentage(correct, total),
        }
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// `round(correct / total * 100)`, half rounding up; `0` for an empty quiz.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.total - self.correct
    }
}

fn rounded_percentage(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = u64::from(correct);
    let total = u64::from(total);
    let pct = (correct * 200 + total) / (total * 2);
    u32::try_from(pct).unwrap_or(100)
}
