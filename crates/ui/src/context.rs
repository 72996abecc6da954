use std::sync::Arc;

use dioxus::prelude::*;
use quiz_core::model::User;
use services::{
    AppServices, AuthSession, DashboardService, MaterialService, QuizService, QuizSessionService,
};

/// Services handed to the views. Provided by the composition root (`crates/app`).
#[derive(Clone)]
pub struct AppContext {
    services: AppServices,
}

impl AppContext {
    #[must_use]
    pub fn new(services: AppServices) -> Self {
        Self { services }
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthSession> {
        self.services.auth()
    }

    #[must_use]
    pub fn materials(&self) -> Arc<MaterialService> {
        self.services.materials()
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        self.services.quizzes()
    }

    #[must_use]
    pub fn quiz_sessions(&self) -> Arc<QuizSessionService> {
        self.services.quiz_sessions()
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        self.services.dashboard()
    }
}

/// Reactive mirror of `AuthSession::current_user` so the layout re-renders on
/// login, logout and token expiry.
#[derive(Clone, Copy, PartialEq)]
pub struct CurrentUser(Signal<Option<User>>);

impl CurrentUser {
    /// Must be called inside a component scope.
    #[must_use]
    pub fn new(user: Option<User>) -> Self {
        Self(Signal::new(user))
    }

    #[must_use]
    pub fn get(&self) -> Option<User> {
        self.0.read().clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.0.read().is_some()
    }

    pub fn set(&mut self, user: Option<User>) {
        self.0.set(user);
    }

    /// Pull the latest state from the session, e.g. after a call failed with
    /// an expired token.
    pub fn sync(&mut self, auth: &AuthSession) {
        let latest = auth.current_user();
        if *self.0.peek() != latest {
            self.0.set(latest);
        }
    }
}
