use std::sync::Arc;

use storage::http::{HttpConfig, HttpRepository};
use storage::repository::Storage;
use tracing::{info, warn};

use crate::Clock;
use crate::auth_service::AuthSession;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::material_service::MaterialService;
use crate::quiz_service::QuizService;
use crate::quiz_session_service::QuizSessionService;

/// Assembles app-facing services over one `Storage` and one `AuthSession`.
#[derive(Clone)]
pub struct AppServices {
    auth: Arc<AuthSession>,
    materials: Arc<MaterialService>,
    quizzes: Arc<QuizService>,
    quiz_sessions: Arc<QuizSessionService>,
    dashboard: Arc<DashboardService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock) -> Self {
        let auth = Arc::new(AuthSession::new(
            clock,
            Arc::clone(&storage.auth),
            Arc::clone(&storage.auth_store),
        ));
        let materials = Arc::new(MaterialService::new(
            Arc::clone(&auth),
            Arc::clone(&storage.materials),
        ));
        let quizzes = Arc::new(QuizService::new(
            Arc::clone(&auth),
            Arc::clone(&storage.quizzes),
            Arc::clone(&storage.materials),
        ));
        let quiz_sessions = Arc::new(QuizSessionService::new(
            Arc::clone(&auth),
            Arc::clone(&storage.quizzes),
            Arc::clone(&storage.attempts),
        ));
        let dashboard = Arc::new(DashboardService::new(
            Arc::clone(&auth),
            Arc::clone(&storage.materials),
            Arc::clone(&storage.quizzes),
            Arc::clone(&storage.attempts),
        ));

        Self {
            auth,
            materials,
            quizzes,
            quiz_sessions,
            dashboard,
        }
    }

    /// Build services against the REST backend, remembering the login in `SQLite`,
    /// and restore any previous login.
    ///
    /// An unreachable backend is logged and does not abort startup.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the HTTP client or local database cannot be
    /// initialized, or the remembered login cannot be read.
    pub async fn connect(
        config: HttpConfig,
        db_url: &str,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let http = HttpRepository::new(config)?;
        match http.health().await {
            Ok(()) => info!(api = %http.base_url(), "backend is healthy"),
            Err(err) => {
                warn!(api = %http.base_url(), error = %err, "backend health check failed");
            }
        }

        let storage = Storage::remote(http, db_url).await?;
        let services = Self::new(&storage, clock);
        services.auth.restore().await?;
        Ok(services)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthSession> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn materials(&self) -> Arc<MaterialService> {
        Arc::clone(&self.materials)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }

    #[must_use]
    pub fn quiz_sessions(&self) -> Arc<QuizSessionService> {
        Arc::clone(&self.quiz_sessions)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }
}
