use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use quiz_core::Clock;
use quiz_core::grade_answer;
use quiz_core::model::{
    AnswerSet, AttemptId, AttemptResult, AttemptSummary, AuthToken, Credentials, Dashboard,
    DashboardStats, GenerateQuizRequest, GeneratedQuiz, Material, MaterialId, ProfileUpdate,
    Question, QuestionResult, QuestionType, Quiz, QuizId, QuizSummary, Registration, User, UserId,
    ValidatedMaterial,
};
use uuid::Uuid;

use crate::repository::{
    AttemptRepository, AuthRepository, AuthStore, LoginGrant, MaterialRepository, QuizRepository,
    StorageError, StoredAuth,
};

const MISSING_QUIZ_TITLE: &str = "Quiz Not Found";

struct Account {
    user: User,
    password: String,
}

struct Owned<T> {
    owner: UserId,
    value: T,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, String>,
    materials: Vec<Owned<Material>>,
    quizzes: Vec<Owned<Quiz>>,
    attempts: Vec<Owned<AttemptSummary>>,
    stored_auth: Option<StoredAuth>,
}

impl State {
    fn user_for(&self, token: &AuthToken) -> Result<&User, StorageError> {
        self.sessions
            .get(token.expose())
            .and_then(|email| self.accounts.get(email))
            .map(|account| &account.user)
            .ok_or(StorageError::Unauthorized)
    }

    fn owner(&self, token: &AuthToken) -> Result<UserId, StorageError> {
        self.user_for(token).map(|user| user.id.clone())
    }

    fn quiz(&self, owner: &UserId, id: &QuizId) -> Option<&Quiz> {
        self.quizzes
            .iter()
            .find(|q| &q.owner == owner && &q.value.id == id)
            .map(|q| &q.value)
    }

    fn material(&self, owner: &UserId, id: &MaterialId) -> Option<&Material> {
        self.materials
            .iter()
            .find(|m| &m.owner == owner && &m.value.id == id)
            .map(|m| &m.value)
    }

    fn attempts_of(&self, owner: &UserId) -> Vec<AttemptSummary> {
        self.attempts
            .iter()
            .rev()
            .filter(|a| &a.owner == owner)
            .map(|a| {
                let mut summary = a.value.clone();
                summary.quiz_title = Some(
                    self.quiz(owner, &summary.quiz_id)
                        .map_or_else(|| MISSING_QUIZ_TITLE.to_owned(), |q| q.title.clone()),
                );
                summary
            })
            .collect()
    }
}

/// In-memory backend for tests and offline prototyping.
///
/// Mirrors the REST backend closely enough for service tests: per-user
/// ownership, token checks, server-side grading of attempts, and a
/// deterministic stand-in for quiz generation.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<State>>,
    clock: Clock,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            state: Arc::default(),
            clock,
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    fn new_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Register and log in a user in one step.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the email is taken.
    pub fn sign_up(&self, registration: &Registration) -> Result<LoginGrant, StorageError> {
        self.insert_account(registration)?;
        self.issue_token(&registration.credentials())
    }

    /// Store a fully-built quiz for the token's user, e.g. a hand-written fixture.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unauthorized` for an unknown token.
    pub fn insert_quiz(&self, token: &AuthToken, quiz: Quiz) -> Result<(), StorageError> {
        let mut state = self.state()?;
        let owner = state.owner(token)?;
        state.quizzes.retain(|q| q.value.id != quiz.id);
        state.quizzes.push(Owned { owner, value: quiz });
        Ok(())
    }

    fn insert_account(&self, registration: &Registration) -> Result<(), StorageError> {
        let mut state = self.state()?;
        let key = registration.email.to_lowercase();
        if state.accounts.contains_key(&key) {
            return Err(StorageError::Conflict("User already exists".to_owned()));
        }
        let user = User {
            id: UserId::new(Self::new_id()),
            username: registration.username.clone(),
            email: registration.email.clone(),
            name: None,
        };
        state.accounts.insert(
            key,
            Account {
                user,
                password: registration.password.clone(),
            },
        );
        Ok(())
    }

    fn issue_token(&self, credentials: &Credentials) -> Result<LoginGrant, StorageError> {
        let mut state = self.state()?;
        let key = credentials.email.to_lowercase();
        let user = match state.accounts.get(&key) {
            Some(account) if account.password == credentials.password => account.user.clone(),
            _ => return Err(StorageError::Unauthorized),
        };
        let token = Self::new_id();
        state.sessions.insert(token.clone(), key);
        Ok(LoginGrant {
            token: AuthToken::new(token),
            user,
        })
    }
}

/// Splits material content into sentence-sized facts for the stand-in generator.
fn facts(material: &Material) -> Vec<String> {
    let facts: Vec<String> = material
        .content
        .split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if facts.is_empty() {
        vec![material.title.clone()]
    } else {
        facts
    }
}

fn generated_question(material: &Material, fact: &str, ty: QuestionType) -> Question {
    match ty {
        QuestionType::MultipleChoice => Question::multiple_choice(
            format!("Which statement comes from \"{}\"?", material.title),
            vec![
                fact.to_owned(),
                "None of these statements".to_owned(),
                "All of these statements".to_owned(),
            ],
            fact,
            format!("The material states: {fact}."),
        ),
        QuestionType::TrueFalse => Question::true_false(
            format!("True or false: {fact}."),
            true,
            format!("The material states: {fact}."),
        ),
        QuestionType::ShortAnswer => Question::short_answer(
            format!("Which material says: \"{fact}\"?"),
            material.title.clone(),
            "The statement is taken from this material.",
        ),
    }
}

#[async_trait]
impl AuthRepository for InMemoryRepository {
    async fn register(&self, registration: &Registration) -> Result<(), StorageError> {
        self.insert_account(registration)
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, StorageError> {
        self.issue_token(credentials)
    }

    async fn current_user(&self, token: &AuthToken) -> Result<User, StorageError> {
        let state = self.state()?;
        state.user_for(token).cloned()
    }

    async fn update_profile(
        &self,
        token: &AuthToken,
        update: &ProfileUpdate,
    ) -> Result<(), StorageError> {
        let mut state = self.state()?;
        let email = state
            .sessions
            .get(token.expose())
            .cloned()
            .ok_or(StorageError::Unauthorized)?;
        let account = state
            .accounts
            .get_mut(&email)
            .ok_or(StorageError::Unauthorized)?;
        if let Some(name) = &update.name {
            account.user.name = Some(name.clone());
        }
        if let Some(password) = &update.password {
            account.password.clone_from(password);
        }
        Ok(())
    }
}

#[async_trait]
impl MaterialRepository for InMemoryRepository {
    async fn list_materials(&self, token: &AuthToken) -> Result<Vec<Material>, StorageError> {
        let state = self.state()?;
        let owner = state.owner(token)?;
        Ok(state
            .materials
            .iter()
            .rev()
            .filter(|m| m.owner == owner)
            .map(|m| m.value.clone())
            .collect())
    }

    async fn get_material(
        &self,
        token: &AuthToken,
        id: &MaterialId,
    ) -> Result<Material, StorageError> {
        let state = self.state()?;
        let owner = state.owner(token)?;
        state
            .material(&owner, id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn create_material(
        &self,
        token: &AuthToken,
        material: &ValidatedMaterial,
    ) -> Result<MaterialId, StorageError> {
        let mut state = self.state()?;
        let owner = state.owner(token)?;
        let id = MaterialId::new(Self::new_id());
        state.materials.push(Owned {
            owner,
            value: Material {
                id: id.clone(),
                title: material.title.clone(),
                content: material.content.clone(),
                tags: material.tags.clone(),
                created_at: self.clock.now(),
                updated_at: None,
            },
        });
        Ok(id)
    }

    async fn update_material(
        &self,
        token: &AuthToken,
        id: &MaterialId,
        material: &ValidatedMaterial,
    ) -> Result<(), StorageError> {
        let mut state = self.state()?;
        let owner = state.owner(token)?;
        let now = self.clock.now();
        let existing = state
            .materials
            .iter_mut()
            .find(|m| m.owner == owner && &m.value.id == id)
            .ok_or(StorageError::NotFound)?;
        existing.value.title.clone_from(&material.title);
        existing.value.content.clone_from(&material.content);
        existing.value.tags.clone_from(&material.tags);
        existing.value.updated_at = Some(now);
        Ok(())
    }

    async fn delete_material(
        &self,
        token: &AuthToken,
        id: &MaterialId,
    ) -> Result<(), StorageError> {
        let mut state = self.state()?;
        let owner = state.owner(token)?;
        let before = state.materials.len();
        state
            .materials
            .retain(|m| !(m.owner == owner && &m.value.id == id));
        if state.materials.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn list_quizzes(&self, token: &AuthToken) -> Result<Vec<QuizSummary>, StorageError> {
        let state = self.state()?;
        let owner = state.owner(token)?;
        Ok(state
            .quizzes
            .iter()
            .rev()
            .filter(|q| q.owner == owner)
            .map(|q| QuizSummary {
                id: q.value.id.clone(),
                title: q.value.title.clone(),
                description: q.value.description.clone(),
                num_questions: u32::try_from(q.value.questions.len()).unwrap_or(u32::MAX),
                material_id: q.value.material_id.clone(),
                created_at: q.value.created_at,
            })
            .collect())
    }

    async fn get_quiz(&self, token: &AuthToken, id: &QuizId) -> Result<Quiz, StorageError> {
        let state = self.state()?;
        let owner = state.owner(token)?;
        state.quiz(&owner, id).cloned().ok_or(StorageError::NotFound)
    }

    async fn generate_quiz(
        &self,
        token: &AuthToken,
        request: &GenerateQuizRequest,
    ) -> Result<GeneratedQuiz, StorageError> {
        let mut state = self.state()?;
        let owner = state.owner(token)?;
        let material = state
            .material(&owner, &request.material_id)
            .cloned()
            .ok_or(StorageError::NotFound)?;
        if request.question_types.is_empty() {
            return Err(StorageError::Rejected(
                "At least one question type is required".to_owned(),
            ));
        }

        let facts = facts(&material);
        let questions: Vec<Question> = (0..request.num_questions as usize)
            .map(|i| {
                let ty = request.question_types[i % request.question_types.len()];
                generated_question(&material, &facts[i % facts.len()], ty)
            })
            .collect();

        let now = self.clock.now();
        let title = request
            .title
            .clone()
            .unwrap_or_else(|| format!("Quiz on {}", material.title));
        let quiz = Quiz {
            id: QuizId::new(Self::new_id()),
            title: title.clone(),
            description: request
                .description
                .clone()
                .unwrap_or_else(|| format!("Generated quiz based on {}", material.title)),
            questions,
            material_id: Some(material.id.clone()),
            created_at: now,
            updated_at: now,
        };
        let generated = GeneratedQuiz {
            quiz_id: quiz.id.clone(),
            title,
            num_questions: request.num_questions,
        };
        state.quizzes.push(Owned { owner, value: quiz });
        Ok(generated)
    }

    async fn delete_quiz(&self, token: &AuthToken, id: &QuizId) -> Result<(), StorageError> {
        let mut state = self.state()?;
        let owner = state.owner(token)?;
        let before = state.quizzes.len();
        state
            .quizzes
            .retain(|q| !(q.owner == owner && &q.value.id == id));
        if state.quizzes.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn record_attempt(
        &self,
        token: &AuthToken,
        quiz_id: &QuizId,
        answers: &AnswerSet,
    ) -> Result<AttemptResult, StorageError> {
        let mut state = self.state()?;
        let owner = state.owner(token)?;
        let quiz = state.quiz(&owner, quiz_id).ok_or(StorageError::NotFound)?;

        let results: Vec<QuestionResult> = quiz
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| QuestionResult {
                question_index: index,
                correct: answers
                    .get(index)
                    .is_some_and(|answer| grade_answer(question, answer)),
                correct_answer: question.correct_answer(),
                explanation: question.explanation().to_owned(),
            })
            .collect();
        let score = u32::try_from(results.iter().filter(|r| r.correct).count()).unwrap_or(u32::MAX);
        let total_questions = u32::try_from(results.len()).unwrap_or(u32::MAX);
        let percentage = if total_questions == 0 {
            0.0
        } else {
            f64::from(score) / f64::from(total_questions) * 100.0
        };

        let attempt_id = AttemptId::new(Self::new_id());
        state.attempts.push(Owned {
            owner,
            value: AttemptSummary {
                id: attempt_id.clone(),
                quiz_id: quiz_id.clone(),
                quiz_title: None,
                score,
                total_questions,
                percentage,
                created_at: Some(self.clock.now()),
            },
        });
        Ok(AttemptResult {
            attempt_id,
            score,
            total_questions,
            percentage,
            results,
        })
    }

    async fn list_attempts(&self, token: &AuthToken) -> Result<Vec<AttemptSummary>, StorageError> {
        let state = self.state()?;
        let owner = state.owner(token)?;
        Ok(state.attempts_of(&owner))
    }

    async fn list_quiz_attempts(
        &self,
        token: &AuthToken,
        quiz_id: &QuizId,
    ) -> Result<Vec<AttemptSummary>, StorageError> {
        let state = self.state()?;
        let owner = state.owner(token)?;
        Ok(state
            .attempts_of(&owner)
            .into_iter()
            .filter(|a| &a.quiz_id == quiz_id)
            .collect())
    }

    async fn dashboard(&self, token: &AuthToken) -> Result<Dashboard, StorageError> {
        let state = self.state()?;
        let owner = state.owner(token)?;
        let attempts = state.attempts_of(&owner);
        let stats = DashboardStats::from_attempts(&attempts);
        Ok(Dashboard { attempts, stats })
    }
}

#[async_trait]
impl AuthStore for InMemoryRepository {
    async fn load_auth(&self) -> Result<Option<StoredAuth>, StorageError> {
        Ok(self.state()?.stored_auth.clone())
    }

    async fn save_auth(&self, auth: &StoredAuth) -> Result<(), StorageError> {
        self.state()?.stored_auth = Some(auth.clone());
        Ok(())
    }

    async fn clear_auth(&self) -> Result<(), StorageError> {
        self.state()?.stored_auth = None;
        Ok(())
    }
}
