mod auth;
mod dashboard;
mod materials;
mod profile;
mod quizzes;
mod state;
mod take_quiz;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use auth::{LoginView, RegisterView};
pub use dashboard::DashboardView;
pub use materials::{MaterialDetailView, MaterialEditView, MaterialNewView, MaterialsView};
pub use profile::ProfileView;
pub use quizzes::{QuizDetailView, QuizGeneratorView, QuizzesView};
pub use state::{ErrorNotice, ViewError, ViewState, view_state_from_resource};
pub use take_quiz::{TakeQuizIntent, TakeQuizView, apply_intent};
