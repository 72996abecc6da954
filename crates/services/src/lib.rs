#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth_service;
pub mod dashboard_service;
pub mod error;
pub mod material_service;
pub mod quiz_service;
pub mod quiz_session_service;

pub use quiz_core::Clock;
pub use storage::repository::StorageError;

pub use app_services::AppServices;
pub use auth_service::AuthSession;
pub use dashboard_service::{DashboardOverview, DashboardService};
pub use error::{
    AppServicesError, AuthError, DashboardError, MaterialServiceError, QuizServiceError,
    QuizSessionError,
};
pub use material_service::{MaterialFilter, MaterialService, all_tags};
pub use quiz_service::QuizService;
pub use quiz_session_service::{QuizSessionService, SubmitOutcome};
