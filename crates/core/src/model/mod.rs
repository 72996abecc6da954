mod answer;
mod attempt;
mod ids;
mod material;
mod question;
mod quiz;
mod user;

pub use answer::{AnswerSet, AnswerValue};
pub use attempt::{AttemptResult, AttemptSummary, Dashboard, DashboardStats, QuestionResult};
pub use ids::{AttemptId, MaterialId, ParseIdError, QuizId, UserId};
pub use material::{Material, MaterialDraft, MaterialError, ValidatedMaterial, parse_tags};
pub use question::{Question, QuestionKind, QuestionType, UnknownQuestionType};
pub use quiz::{
    GenerateQuizDraft, GenerateQuizRequest, GeneratedQuiz, QuestionTypeCounts, Quiz, QuizError,
    QuizSummary, DEFAULT_QUESTION_COUNT, MAX_QUESTION_COUNT,
};
pub use user::{
    AuthToken, Credentials, ProfileUpdate, ProfileUpdateDraft, Registration, User, UserError,
    MIN_PASSWORD_LEN,
};
