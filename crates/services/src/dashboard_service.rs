use std::sync::Arc;

use quiz_core::model::{AttemptSummary, DashboardStats, Material, QuestionTypeCounts, QuizSummary};
use storage::repository::{AttemptRepository, MaterialRepository, QuizRepository};
use tracing::warn;

use crate::auth_service::AuthSession;
use crate::error::DashboardError;

const RECENT_LIMIT: usize = 3;

/// Everything the dashboard page shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardOverview {
    pub material_count: usize,
    pub quiz_count: usize,
    pub recent_materials: Vec<Material>,
    pub recent_quizzes: Vec<QuizSummary>,
    /// Question types across `recent_quizzes`.
    pub type_mix: QuestionTypeCounts,
    /// Newest first.
    pub attempts: Vec<AttemptSummary>,
    pub stats: DashboardStats,
}

impl DashboardOverview {
    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    #[must_use]
    pub fn best_percentage(&self) -> Option<f64> {
        DashboardStats::best_percentage(&self.attempts)
    }
}

#[derive(Clone)]
pub struct DashboardService {
    auth: Arc<AuthSession>,
    materials: Arc<dyn MaterialRepository>,
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(
        auth: Arc<AuthSession>,
        materials: Arc<dyn MaterialRepository>,
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            auth,
            materials,
            quizzes,
            attempts,
        }
    }

    /// Gather counts, recent items, and attempt history.
    ///
    /// A recent quiz that fails to load is left out of `type_mix`.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Auth` when signed out, or `Storage` if a list call fails.
    pub async fn overview(&self) -> Result<DashboardOverview, DashboardError> {
        let token = self.auth.token()?;

        let mut materials = self
            .auth
            .guard(self.materials.list_materials(&token).await)
            .await?;
        let mut quizzes = self.auth.guard(self.quizzes.list_quizzes(&token).await).await?;
        let dashboard = self.auth.guard(self.attempts.dashboard(&token).await).await?;

        let material_count = materials.len();
        let quiz_count = quizzes.len();

        materials.sort_by_key(|m| std::cmp::Reverse(m.created_at));
        materials.truncate(RECENT_LIMIT);
        quizzes.sort_by_key(|q| std::cmp::Reverse(q.created_at));
        quizzes.truncate(RECENT_LIMIT);

        let mut type_mix = QuestionTypeCounts::default();
        for summary in &quizzes {
            match self.quizzes.get_quiz(&token, &summary.id).await {
                Ok(quiz) => type_mix = type_mix.merge(quiz.question_type_counts()),
                Err(err) => warn!(quiz = %summary.id, error = %err, "skipping quiz in type mix"),
            }
        }

        Ok(DashboardOverview {
            material_count,
            quiz_count,
            recent_materials: materials,
            recent_quizzes: quizzes,
            type_mix,
            attempts: dashboard.attempts,
            stats: dashboard.stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerSet, GenerateQuizRequest, QuestionType, ValidatedMaterial};
    use quiz_core::time::fixed_clock;
    use storage::InMemoryRepository;

    #[tokio::test]
    async fn empty_account_has_zeroed_overview() {
        let repo = InMemoryRepository::new();
        let auth = Arc::new(AuthSession::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        ));
        auth.register("ada", "ada@example.com", "secret1")
            .await
            .unwrap();
        let service = DashboardService::new(
            auth,
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );

        let overview = service.overview().await.unwrap();
        assert_eq!(overview.material_count, 0);
        assert_eq!(overview.attempt_count(), 0);
        assert_eq!(overview.stats, DashboardStats::default());
        assert_eq!(overview.best_percentage(), None);
    }

    #[tokio::test]
    async fn overview_limits_recent_items_and_counts_types() {
        let repo = InMemoryRepository::new();
        let auth = Arc::new(AuthSession::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        ));
        auth.register("ada", "ada@example.com", "secret1")
            .await
            .unwrap();
        let token = auth.token().unwrap();

        let mut material_ids = Vec::new();
        for n in 0..4 {
            let id = repo
                .create_material(
                    &token,
                    &ValidatedMaterial {
                        title: format!("Material {n}"),
                        content: "One fact. Another fact.".into(),
                        tags: vec![],
                    },
                )
                .await
                .unwrap();
            material_ids.push(id);
        }
        let generated = repo
            .generate_quiz(
                &token,
                &GenerateQuizRequest {
                    material_id: material_ids[0].clone(),
                    num_questions: 2,
                    question_types: vec![QuestionType::TrueFalse],
                    title: None,
                    description: None,
                },
            )
            .await
            .unwrap();
        let mut answers = AnswerSet::unanswered(2);
        answers.set(0, true.into());
        answers.set(1, true.into());
        repo.record_attempt(&token, &generated.quiz_id, &answers)
            .await
            .unwrap();

        let service = DashboardService::new(
            auth,
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );
        let overview = service.overview().await.unwrap();

        assert_eq!(overview.material_count, 4);
        assert_eq!(overview.recent_materials.len(), RECENT_LIMIT);
        assert_eq!(overview.quiz_count, 1);
        assert_eq!(overview.type_mix.true_false, 2);
        assert_eq!(overview.attempt_count(), 1);
        assert!((overview.stats.average_score - 100.0).abs() < 1e-9);
    }
}
