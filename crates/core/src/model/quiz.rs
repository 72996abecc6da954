use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{MaterialId, QuizId};
use crate::model::question::{Question, QuestionKind, QuestionType};

pub const DEFAULT_QUESTION_COUNT: u32 = 5;
pub const MAX_QUESTION_COUNT: u32 = 20;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("question count must be between 1 and {max}, got {got}")]
    InvalidQuestionCount { got: u32, max: u32 },

    #[error("select at least one question type")]
    NoQuestionTypes,
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A generated quiz with its full question list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub material_id: Option<MaterialId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question_type_counts(&self) -> QuestionTypeCounts {
        QuestionTypeCounts::from_questions(&self.questions)
    }
}

/// List-row shape of a quiz (no questions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub id: QuizId,
    pub title: String,
    pub description: String,
    pub num_questions: u32,
    pub material_id: Option<MaterialId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionTypeCounts {
    pub multiple_choice: u32,
    pub true_false: u32,
    pub short_answer: u32,
    pub unknown: u32,
}

impl QuestionTypeCounts {
    #[must_use]
    pub fn from_questions(questions: &[Question]) -> Self {
        let mut counts = Self::default();
        for question in questions {
            counts.add(question);
        }
        counts
    }

    pub fn add(&mut self, question: &Question) {
        let slot = match question.kind() {
            QuestionKind::MultipleChoice { .. } => &mut self.multiple_choice,
            QuestionKind::TrueFalse { .. } => &mut self.true_false,
            QuestionKind::ShortAnswer { .. } => &mut self.short_answer,
            QuestionKind::Unknown { .. } => &mut self.unknown,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            multiple_choice: self.multiple_choice + other.multiple_choice,
            true_false: self.true_false + other.true_false,
            short_answer: self.short_answer + other.short_answer,
            unknown: self.unknown + other.unknown,
        }
    }

    #[must_use]
    pub fn get(&self, ty: QuestionType) -> u32 {
        match ty {
            QuestionType::MultipleChoice => self.multiple_choice,
            QuestionType::TrueFalse => self.true_false,
            QuestionType::ShortAnswer => self.short_answer,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.multiple_choice + self.true_false + self.short_answer + self.unknown
    }
}

//
// ─── GENERATION ────────────────────────────────────────────────────────────────
//

/// Unvalidated input from the quiz generator form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateQuizDraft {
    pub material_id: MaterialId,
    pub num_questions: u32,
    pub question_types: Vec<QuestionType>,
    pub title: String,
    pub description: String,
}

impl GenerateQuizDraft {
    /// Draft with the generator defaults for a material.
    #[must_use]
    pub fn for_material(material_id: MaterialId, material_title: &str) -> Self {
        Self {
            material_id,
            num_questions: DEFAULT_QUESTION_COUNT,
            question_types: QuestionType::ALL.to_vec(),
            title: default_quiz_title(material_title),
            description: default_quiz_description(material_title),
        }
    }

    /// # Errors
    ///
    /// Returns `QuizError::InvalidQuestionCount` outside `1..=MAX_QUESTION_COUNT`.
    /// Returns `QuizError::NoQuestionTypes` if no type is selected.
    pub fn validate(self) -> Result<GenerateQuizRequest, QuizError> {
        if !(1..=MAX_QUESTION_COUNT).contains(&self.num_questions) {
            return Err(QuizError::InvalidQuestionCount {
                got: self.num_questions,
                max: MAX_QUESTION_COUNT,
            });
        }

        let mut question_types = Vec::with_capacity(self.question_types.len());
        for ty in self.question_types {
            if !question_types.contains(&ty) {
                question_types.push(ty);
            }
        }
        if question_types.is_empty() {
            return Err(QuizError::NoQuestionTypes);
        }

        Ok(GenerateQuizRequest {
            material_id: self.material_id,
            num_questions: self.num_questions,
            question_types,
            title: non_blank(self.title),
            description: non_blank(self.description),
        })
    }
}

/// A validated generation request. Blank title/description are left to the backend defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateQuizRequest {
    pub material_id: MaterialId,
    pub num_questions: u32,
    pub question_types: Vec<QuestionType>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuiz {
    pub quiz_id: QuizId,
    pub title: String,
    pub num_questions: u32,
}

#[must_use]
pub fn default_quiz_title(material_title: &str) -> String {
    format!("Quiz on {material_title}")
}

#[must_use]
pub fn default_quiz_description(material_title: &str) -> String {
    format!("Generated quiz based on {material_title}")
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
