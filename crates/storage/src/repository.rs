use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerSet, AttemptResult, AttemptSummary, AuthToken, Credentials, Dashboard,
    GenerateQuizRequest, GeneratedQuiz, Material, MaterialId, ProfileUpdate, Quiz, QuizId,
    QuizSummary, Registration, User, ValidatedMaterial,
};
use thiserror::Error;

use crate::http::HttpInitError;
use crate::memory::InMemoryRepository;
use crate::sqlite::SqliteInitError;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("not authorized")]
    Unauthorized,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rejected by backend: {0}")]
    Rejected(String),

    #[error("backend returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Message suitable for showing inline next to a form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(message) | Self::Conflict(message) => message.clone(),
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_owned(),
            Self::NotFound => "Not found.".to_owned(),
            Self::Connection(_) => "Could not reach the server.".to_owned(),
            Self::Http { .. } | Self::Serialization(_) => {
                "The server returned an unexpected response.".to_owned()
            }
        }
    }
}

/// Token and user returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub token: AuthToken,
    pub user: User,
}

/// Login remembered between launches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAuth {
    pub token: AuthToken,
    pub user: User,
    pub saved_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the email is taken.
    async fn register(&self, registration: &Registration) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Unauthorized` for bad credentials.
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Unauthorized` if the token is no longer valid.
    async fn current_user(&self, token: &AuthToken) -> Result<User, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the update is rejected or cannot be sent.
    async fn update_profile(
        &self,
        token: &AuthToken,
        update: &ProfileUpdate,
    ) -> Result<(), StorageError>;
}

#[async_trait]
pub trait MaterialRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be fetched.
    async fn list_materials(&self, token: &AuthToken) -> Result<Vec<Material>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing or not owned by the user.
    async fn get_material(
        &self,
        token: &AuthToken,
        id: &MaterialId,
    ) -> Result<Material, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the material cannot be stored.
    async fn create_material(
        &self,
        token: &AuthToken,
        material: &ValidatedMaterial,
    ) -> Result<MaterialId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn update_material(
        &self,
        token: &AuthToken,
        id: &MaterialId,
        material: &ValidatedMaterial,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn delete_material(&self, token: &AuthToken, id: &MaterialId)
    -> Result<(), StorageError>;
}

#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be fetched.
    async fn list_quizzes(&self, token: &AuthToken) -> Result<Vec<QuizSummary>, StorageError>;

    /// Fetch a quiz with all its questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_quiz(&self, token: &AuthToken, id: &QuizId) -> Result<Quiz, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the material is missing, or other storage errors.
    async fn generate_quiz(
        &self,
        token: &AuthToken,
        request: &GenerateQuizRequest,
    ) -> Result<GeneratedQuiz, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn delete_quiz(&self, token: &AuthToken, id: &QuizId) -> Result<(), StorageError>;
}

#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Record a completed attempt; the backend grades it again and keeps it for history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the quiz is missing, or other storage errors.
    async fn record_attempt(
        &self,
        token: &AuthToken,
        quiz_id: &QuizId,
        answers: &AnswerSet,
    ) -> Result<AttemptResult, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be fetched.
    async fn list_attempts(&self, token: &AuthToken) -> Result<Vec<AttemptSummary>, StorageError>;

    /// Attempts of one quiz, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be fetched.
    async fn list_quiz_attempts(
        &self,
        token: &AuthToken,
        quiz_id: &QuizId,
    ) -> Result<Vec<AttemptSummary>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the dashboard cannot be fetched.
    async fn dashboard(&self, token: &AuthToken) -> Result<Dashboard, StorageError>;
}

/// Local persistence of the signed-in user.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the stored row cannot be read or decoded.
    async fn load_auth(&self) -> Result<Option<StoredAuth>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be written.
    async fn save_auth(&self, auth: &StoredAuth) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be removed.
    async fn clear_auth(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageInitError {
    #[error(transparent)]
    Http(#[from] HttpInitError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}

/// Aggregates the backend repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub auth: Arc<dyn AuthRepository>,
    pub materials: Arc<dyn MaterialRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub auth_store: Arc<dyn AuthStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_memory(InMemoryRepository::new())
    }

    /// Wrap an existing in-memory repository so tests can keep a handle for seeding.
    #[must_use]
    pub fn from_memory(repo: InMemoryRepository) -> Self {
        Self {
            auth: Arc::new(repo.clone()),
            materials: Arc::new(repo.clone()),
            quizzes: Arc::new(repo.clone()),
            attempts: Arc::new(repo.clone()),
            auth_store: Arc::new(repo),
        }
    }
}
