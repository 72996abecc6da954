use std::sync::Arc;

use quiz_core::model::{GenerateQuizDraft, GeneratedQuiz, MaterialId, Quiz, QuizId, QuizSummary};
use storage::repository::{MaterialRepository, QuizRepository};
use tracing::info;

use crate::auth_service::AuthSession;
use crate::error::QuizServiceError;

/// Quiz listing, generation and deletion.
#[derive(Clone)]
pub struct QuizService {
    auth: Arc<AuthSession>,
    quizzes: Arc<dyn QuizRepository>,
    materials: Arc<dyn MaterialRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        auth: Arc<AuthSession>,
        quizzes: Arc<dyn QuizRepository>,
        materials: Arc<dyn MaterialRepository>,
    ) -> Self {
        Self {
            auth,
            quizzes,
            materials,
        }
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Auth` when signed out, or `Storage` on backend failure.
    pub async fn list(&self) -> Result<Vec<QuizSummary>, QuizServiceError> {
        let token = self.auth.token()?;
        let quizzes = self.auth.guard(self.quizzes.list_quizzes(&token).await).await?;
        Ok(quizzes)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` with `NotFound` for a missing quiz.
    pub async fn get(&self, id: &QuizId) -> Result<Quiz, QuizServiceError> {
        let token = self.auth.token()?;
        let quiz = self.auth.guard(self.quizzes.get_quiz(&token, id).await).await?;
        Ok(quiz)
    }

    /// Generator form pre-filled for a material.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the material cannot be fetched.
    pub async fn draft_for(
        &self,
        material_id: &MaterialId,
    ) -> Result<GenerateQuizDraft, QuizServiceError> {
        let token = self.auth.token()?;
        let material = self
            .auth
            .guard(self.materials.get_material(&token, material_id).await)
            .await?;
        Ok(GenerateQuizDraft::for_material(material.id, &material.title))
    }

    /// Validate the generator form and ask the backend for a quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` for an invalid count or no question types.
    /// Returns `QuizServiceError::Storage` if generation fails.
    pub async fn generate(
        &self,
        draft: GenerateQuizDraft,
    ) -> Result<GeneratedQuiz, QuizServiceError> {
        let request = draft.validate()?;
        let token = self.auth.token()?;
        let generated = self
            .auth
            .guard(self.quizzes.generate_quiz(&token, &request).await)
            .await?;
        info!(
            quiz = %generated.quiz_id,
            questions = generated.num_questions,
            "quiz generated"
        );
        Ok(generated)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the quiz is missing or deletion fails.
    pub async fn delete(&self, id: &QuizId) -> Result<(), QuizServiceError> {
        let token = self.auth.token()?;
        self.auth.guard(self.quizzes.delete_quiz(&token, id).await).await?;
        info!(quiz = %id, "quiz deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionType, QuizError, ValidatedMaterial};
    use quiz_core::time::fixed_clock;
    use storage::InMemoryRepository;
    use storage::repository::StorageError;

    async fn setup() -> (QuizService, MaterialId) {
        let repo = InMemoryRepository::with_clock(fixed_clock());
        let auth = Arc::new(AuthSession::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        ));
        auth.register("ada", "ada@example.com", "secret1")
            .await
            .unwrap();
        let token = auth.token().unwrap();
        let material_id = repo
            .create_material(
                &token,
                &ValidatedMaterial {
                    title: "Planets".into(),
                    content: "Mars is red. Venus is hot. Jupiter is large.".into(),
                    tags: vec![],
                },
            )
            .await
            .unwrap();
        let service = QuizService::new(auth, Arc::new(repo.clone()), Arc::new(repo));
        (service, material_id)
    }

    #[tokio::test]
    async fn draft_uses_material_title_defaults() {
        let (service, material_id) = setup().await;
        let draft = service.draft_for(&material_id).await.unwrap();
        assert_eq!(draft.title, "Quiz on Planets");
        assert_eq!(draft.description, "Generated quiz based on Planets");
        assert_eq!(draft.num_questions, 5);
        assert_eq!(draft.question_types, QuestionType::ALL);
    }

    #[tokio::test]
    async fn generate_then_list_and_delete() {
        let (service, material_id) = setup().await;
        let mut draft = service.draft_for(&material_id).await.unwrap();
        draft.num_questions = 3;
        let generated = service.generate(draft).await.unwrap();
        assert_eq!(generated.num_questions, 3);

        let quizzes = service.list().await.unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].num_questions, 3);
        assert_eq!(quizzes[0].material_id, Some(material_id));

        let quiz = service.get(&generated.quiz_id).await.unwrap();
        assert_eq!(quiz.question_type_counts().total(), 3);

        service.delete(&generated.quiz_id).await.unwrap();
        assert!(matches!(
            service.get(&generated.quiz_id).await,
            Err(QuizServiceError::Storage(StorageError::NotFound))
        ));
    }

    #[tokio::test]
    async fn generate_rejects_out_of_range_count() {
        let (service, material_id) = setup().await;
        let mut draft = service.draft_for(&material_id).await.unwrap();
        draft.num_questions = 21;
        assert!(matches!(
            service.generate(draft).await,
            Err(QuizServiceError::Quiz(QuizError::InvalidQuestionCount { got: 21, .. }))
        ));
    }
}
