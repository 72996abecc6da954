use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{
    AnswerSet, AttemptResult, AttemptSummary, AuthToken, Credentials, Dashboard,
    GenerateQuizRequest, GeneratedQuiz, Material, MaterialId, ProfileUpdate, Quiz, QuizId,
    QuizSummary, Registration, User, ValidatedMaterial,
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::repository::{
    AttemptRepository, AuthRepository, LoginGrant, MaterialRepository, QuizRepository, Storage,
    StorageError, StorageInitError,
};
use crate::sqlite::SqliteRepository;

mod wire;

use wire::{
    AttemptBody, AttemptResultWire, AttemptSummaryWire, CreatedWire, DashboardWire, ErrorBody,
    GenerateBody, GeneratedWire, HealthWire, LoginBody, LoginWire, MaterialBody, MaterialWire,
    ProfileBody, QuizSummaryWire, QuizWire, RegisterBody, UserWire,
};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HttpInitError {
    #[error("invalid API url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported API url scheme `{0}` (expected http or https)")]
    UnsupportedScheme(String),

    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl HttpConfig {
    /// # Errors
    ///
    /// Returns `HttpInitError` if the url does not parse or is not http(s).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpInitError> {
        let parsed = Url::parse(base_url.trim()).map_err(|source| HttpInitError::InvalidUrl {
            url: base_url.to_owned(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HttpInitError::UnsupportedScheme(parsed.scheme().to_owned()));
        }
        Ok(Self {
            base_url: parsed,
            timeout,
        })
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Serialization(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

/// REST client for the quiz backend.
#[derive(Clone)]
pub struct HttpRepository {
    client: Client,
    base: Url,
}

impl HttpRepository {
    /// # Errors
    ///
    /// Returns `HttpInitError::Client` if the TLS backend cannot be initialized.
    pub fn new(config: HttpConfig) -> Result<Self, HttpInitError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base: config.base_url,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base url joined with percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&AuthToken>,
    ) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(method = method.as_str(), path = url.path(), "api request");
        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Response, StorageError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_owned();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_owned());
        warn!(status = status.as_u16(), path = %path, %message, "api request failed");
        Err(status_error(status, message))
    }

    async fn fetch<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, StorageError> {
        let response = Self::send(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Checks `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend is unreachable or reports unhealthy.
    pub async fn health(&self) -> Result<(), StorageError> {
        let health: HealthWire = Self::fetch(self.request(Method::GET, &["health"], None)).await?;
        if health.status == "healthy" {
            Ok(())
        } else {
            Err(StorageError::Rejected(format!(
                "backend reported status `{}`",
                health.status
            )))
        }
    }
}

fn status_error(status: StatusCode, message: String) -> StorageError {
    match status {
        // The JWT layer answers malformed tokens with 422.
        StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY => StorageError::Unauthorized,
        StatusCode::NOT_FOUND => StorageError::NotFound,
        StatusCode::CONFLICT => StorageError::Conflict(message),
        StatusCode::BAD_REQUEST => StorageError::Rejected(message),
        other => StorageError::Http {
            status: other.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl AuthRepository for HttpRepository {
    async fn register(&self, registration: &Registration) -> Result<(), StorageError> {
        let builder = self
            .request(Method::POST, &["auth", "register"], None)
            .json(&RegisterBody::from(registration));
        Self::send(builder).await?;
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, StorageError> {
        let builder = self
            .request(Method::POST, &["auth", "login"], None)
            .json(&LoginBody {
                email: &credentials.email,
                password: &credentials.password,
            });
        let wire: LoginWire = Self::fetch(builder).await?;
        Ok(LoginGrant {
            token: AuthToken::new(wire.access_token),
            user: wire.user.into(),
        })
    }

    async fn current_user(&self, token: &AuthToken) -> Result<User, StorageError> {
        let wire: UserWire =
            Self::fetch(self.request(Method::GET, &["auth", "me"], Some(token))).await?;
        Ok(wire.into())
    }

    async fn update_profile(
        &self,
        token: &AuthToken,
        update: &ProfileUpdate,
    ) -> Result<(), StorageError> {
        let builder = self
            .request(Method::PUT, &["auth", "update"], Some(token))
            .json(&ProfileBody::from(update));
        Self::send(builder).await?;
        Ok(())
    }
}

#[async_trait]
impl MaterialRepository for HttpRepository {
    async fn list_materials(&self, token: &AuthToken) -> Result<Vec<Material>, StorageError> {
        let wire: Vec<MaterialWire> =
            Self::fetch(self.request(Method::GET, &["materials"], Some(token))).await?;
        Ok(wire.into_iter().map(Material::from).collect())
    }

    async fn get_material(
        &self,
        token: &AuthToken,
        id: &MaterialId,
    ) -> Result<Material, StorageError> {
        let wire: MaterialWire = Self::fetch(self.request(
            Method::GET,
            &["materials", id.as_str()],
            Some(token),
        ))
        .await?;
        Ok(wire.into())
    }

    async fn create_material(
        &self,
        token: &AuthToken,
        material: &ValidatedMaterial,
    ) -> Result<MaterialId, StorageError> {
        let builder = self
            .request(Method::POST, &["materials"], Some(token))
            .json(&MaterialBody::from(material));
        let created: CreatedWire = Self::fetch(builder).await?;
        Ok(MaterialId::new(created.id))
    }

    async fn update_material(
        &self,
        token: &AuthToken,
        id: &MaterialId,
        material: &ValidatedMaterial,
    ) -> Result<(), StorageError> {
        let builder = self
            .request(Method::PUT, &["materials", id.as_str()], Some(token))
            .json(&MaterialBody::from(material));
        Self::send(builder).await?;
        Ok(())
    }

    async fn delete_material(
        &self,
        token: &AuthToken,
        id: &MaterialId,
    ) -> Result<(), StorageError> {
        Self::send(self.request(Method::DELETE, &["materials", id.as_str()], Some(token))).await?;
        Ok(())
    }
}

#[async_trait]
impl QuizRepository for HttpRepository {
    async fn list_quizzes(&self, token: &AuthToken) -> Result<Vec<QuizSummary>, StorageError> {
        // The list route is mounted with a trailing slash.
        let wire: Vec<QuizSummaryWire> =
            Self::fetch(self.request(Method::GET, &["quizzes", ""], Some(token))).await?;
        Ok(wire.into_iter().map(QuizSummary::from).collect())
    }

    async fn get_quiz(&self, token: &AuthToken, id: &QuizId) -> Result<Quiz, StorageError> {
        let wire: QuizWire =
            Self::fetch(self.request(Method::GET, &["quizzes", id.as_str()], Some(token))).await?;
        Ok(wire.into())
    }

    async fn generate_quiz(
        &self,
        token: &AuthToken,
        request: &GenerateQuizRequest,
    ) -> Result<GeneratedQuiz, StorageError> {
        let builder = self
            .request(Method::POST, &["quizzes", "generate"], Some(token))
            .json(&GenerateBody::from(request));
        let wire: GeneratedWire = Self::fetch(builder).await?;
        Ok(wire.into())
    }

    async fn delete_quiz(&self, token: &AuthToken, id: &QuizId) -> Result<(), StorageError> {
        Self::send(self.request(Method::DELETE, &["quizzes", id.as_str()], Some(token))).await?;
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for HttpRepository {
    async fn record_attempt(
        &self,
        token: &AuthToken,
        quiz_id: &QuizId,
        answers: &AnswerSet,
    ) -> Result<AttemptResult, StorageError> {
        let builder = self
            .request(
                Method::POST,
                &["quizzes", quiz_id.as_str(), "attempt"],
                Some(token),
            )
            .json(&AttemptBody::from(answers));
        let wire: AttemptResultWire = Self::fetch(builder).await?;
        Ok(wire.into())
    }

    async fn list_attempts(&self, token: &AuthToken) -> Result<Vec<AttemptSummary>, StorageError> {
        let wire: Vec<AttemptSummaryWire> =
            Self::fetch(self.request(Method::GET, &["quizzes", "attempts"], Some(token))).await?;
        Ok(wire.into_iter().map(AttemptSummary::from).collect())
    }

    async fn list_quiz_attempts(
        &self,
        token: &AuthToken,
        quiz_id: &QuizId,
    ) -> Result<Vec<AttemptSummary>, StorageError> {
        let wire: Vec<AttemptSummaryWire> = Self::fetch(self.request(
            Method::GET,
            &["quizzes", "attempts", quiz_id.as_str()],
            Some(token),
        ))
        .await?;
        Ok(wire.into_iter().map(AttemptSummary::from).collect())
    }

    async fn dashboard(&self, token: &AuthToken) -> Result<Dashboard, StorageError> {
        let wire: DashboardWire =
            Self::fetch(self.request(Method::GET, &["quizzes", "dashboard"], Some(token))).await?;
        Ok(wire.into())
    }
}

impl Storage {
    /// Remote backend over HTTP, with the login remembered in a local `SQLite` file.
    ///
    /// # Errors
    ///
    /// Returns `StorageInitError::Sqlite` if the database cannot be opened or migrated.
    pub async fn remote(http: HttpRepository, database_url: &str) -> Result<Self, StorageInitError> {
        let local = SqliteRepository::connect(database_url).await?;
        local.migrate().await?;
        let http = Arc::new(http);
        Ok(Self {
            auth: http.clone(),
            materials: http.clone(),
            quizzes: http.clone(),
            attempts: http,
            auth_store: Arc::new(local),
        })
    }
}
