use quiz_core::model::{AttemptSummary, QuizId};
use services::DashboardOverview;

use crate::vm::time_fmt::format_optional_datetime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatVm {
    pub label: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptRowVm {
    pub quiz_id: QuizId,
    pub quiz_title: String,
    pub score_str: String,
    pub percentage_str: String,
    pub taken_at_str: String,
}

#[must_use]
pub fn format_percentage(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{value:.0}%")
    } else {
        format!("{value:.2}%")
    }
}

#[must_use]
pub fn map_attempt_row(attempt: &AttemptSummary) -> AttemptRowVm {
    AttemptRowVm {
        quiz_id: attempt.quiz_id.clone(),
        quiz_title: attempt
            .quiz_title
            .clone()
            .unwrap_or_else(|| "Quiz Not Found".to_owned()),
        score_str: format!("{}/{}", attempt.score, attempt.total_questions),
        percentage_str: format_percentage(attempt.percentage),
        taken_at_str: format_optional_datetime(attempt.created_at),
    }
}

#[must_use]
pub fn map_attempt_rows(attempts: &[AttemptSummary]) -> Vec<AttemptRowVm> {
    attempts.iter().map(map_attempt_row).collect()
}

/// Headline numbers at the top of the dashboard.
#[must_use]
pub fn map_stats(overview: &DashboardOverview) -> Vec<StatVm> {
    vec![
        StatVm {
            label: "Materials",
            value: overview.material_count.to_string(),
        },
        StatVm {
            label: "Quizzes",
            value: overview.quiz_count.to_string(),
        },
        StatVm {
            label: "Attempts",
            value: overview.stats.total_attempts.to_string(),
        },
        StatVm {
            label: "Average score",
            value: format_percentage(overview.stats.average_score),
        },
        StatVm {
            label: "Best score",
            value: overview
                .best_percentage()
                .map_or_else(|| "-".to_owned(), format_percentage),
        },
    ]
}
