use chrono::{DateTime, Utc};

use crate::model::AnswerValue;
use crate::model::ids::{AttemptId, QuizId};

/// Per-question grading returned by the backend when an attempt is recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionResult {
    pub question_index: usize,
    pub correct: bool,
    pub correct_answer: Option<AnswerValue>,
    pub explanation: String,
}

/// Backend acknowledgement of a recorded attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptResult {
    pub attempt_id: AttemptId,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
    pub results: Vec<QuestionResult>,
}

/// One row of the attempt history.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptSummary {
    pub id: AttemptId,
    pub quiz_id: QuizId,
    pub quiz_title: Option<String>,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashboardStats {
    pub total_attempts: u32,
    /// Mean percentage, rounded to two decimals; `0.0` without attempts.
    pub average_score: f64,
}

impl DashboardStats {
    #[must_use]
    pub fn from_attempts(attempts: &[AttemptSummary]) -> Self {
        if attempts.is_empty() {
            return Self::default();
        }
        let total_attempts = u32::try_from(attempts.len()).unwrap_or(u32::MAX);
        let sum: f64 = attempts.iter().map(|a| a.percentage).sum();
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / attempts.len() as f64;
        Self {
            total_attempts,
            average_score: (mean * 100.0).round() / 100.0,
        }
    }

    /// Highest percentage among the attempts.
    #[must_use]
    pub fn best_percentage(attempts: &[AttemptSummary]) -> Option<f64> {
        attempts.iter().map(|a| a.percentage).reduce(f64::max)
    }
}

/// Attempt history (newest first) with aggregate stats.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub attempts: Vec<AttemptSummary>,
    pub stats: DashboardStats,
}
