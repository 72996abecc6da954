use dioxus::prelude::*;
use dioxus_router::Link;
use services::{
    AuthError, DashboardError, MaterialServiceError, QuizServiceError, QuizSessionError,
    StorageError,
};

use crate::routes::Route;

/// Service failures collapsed to what a view can show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    SignedOut,
    NotFound,
    Invalid(String),
    Backend(String),
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::SignedOut => "Your session has expired. Please sign in again.".to_owned(),
            Self::NotFound => "Not found.".to_owned(),
            Self::Invalid(message) | Self::Backend(message) => message.clone(),
        }
    }
}

impl From<StorageError> for ViewError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound,
            StorageError::Unauthorized => Self::SignedOut,
            StorageError::Rejected(message) | StorageError::Conflict(message) => {
                Self::Invalid(message)
            }
            other => Self::Backend(other.user_message()),
        }
    }
}

impl From<AuthError> for ViewError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotSignedIn => Self::SignedOut,
            AuthError::Storage(err) => err.into(),
            other => Self::Invalid(other.to_string()),
        }
    }
}

impl From<MaterialServiceError> for ViewError {
    fn from(err: MaterialServiceError) -> Self {
        match err {
            MaterialServiceError::Auth(err) => err.into(),
            MaterialServiceError::Storage(err) => err.into(),
            other => Self::Invalid(other.to_string()),
        }
    }
}

impl From<QuizServiceError> for ViewError {
    fn from(err: QuizServiceError) -> Self {
        match err {
            QuizServiceError::Auth(err) => err.into(),
            QuizServiceError::Storage(err) => err.into(),
            other => Self::Invalid(other.to_string()),
        }
    }
}

impl From<QuizSessionError> for ViewError {
    fn from(err: QuizSessionError) -> Self {
        match err {
            QuizSessionError::Auth(err) => err.into(),
            QuizSessionError::Storage(err) => err.into(),
            other => Self::Invalid(other.to_string()),
        }
    }
}

impl From<DashboardError> for ViewError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Auth(err) => err.into(),
            DashboardError::Storage(err) => err.into(),
            other => Self::Backend(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(err.clone()),
            None => ViewState::Loading,
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}

/// Inline error with an optional way back to the sign-in screen.
#[component]
pub fn ErrorNotice(error: ViewError) -> Element {
    rsx! {
        div { class: "error", role: "alert",
            p { "{error.message()}" }
            if error == ViewError::SignedOut {
                Link { to: Route::Login {}, "Sign in" }
            }
        }
    }
}
