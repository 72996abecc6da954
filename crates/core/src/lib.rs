#![forbid(unsafe_code)]

pub mod error;
pub mod grading;
pub mod model;
pub mod session;
pub mod time;

pub use error::Error;
pub use grading::{Score, ScoreError, grade_answer};
pub use session::{QuestionOutcome, QuizSession, SessionError, SessionPhase};
pub use time::Clock;
