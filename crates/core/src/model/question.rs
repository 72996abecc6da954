use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::AnswerValue;

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

/// The question types the generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::ShortAnswer,
    ];

    /// Wire name used by the backend (`multiple_choice`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::TrueFalse => "true_false",
            Self::ShortAnswer => "short_answer",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::MultipleChoice => "Multiple Choice",
            Self::TrueFalse => "True/False",
            Self::ShortAnswer => "Short Answer",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown question type: {0}")]
pub struct UnknownQuestionType(pub String);

impl FromStr for QuestionType {
    type Err = UnknownQuestionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple_choice" => Ok(Self::MultipleChoice),
            "true_false" => Ok(Self::TrueFalse),
            "short_answer" => Ok(Self::ShortAnswer),
            other => Err(UnknownQuestionType(other.to_owned())),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Type-specific payload of a question, including its correct answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    MultipleChoice { options: Vec<String>, correct: String },
    TrueFalse { correct: bool },
    ShortAnswer { correct: String },
    /// A type this client does not know; rendered as a placeholder, never correct.
    Unknown { type_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    kind: QuestionKind,
    explanation: String,
}

impl Question {
    #[must_use]
    pub fn new(prompt: impl Into<String>, kind: QuestionKind, explanation: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            kind,
            explanation: explanation.into(),
        }
    }

    #[must_use]
    pub fn multiple_choice(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self::new(
            prompt,
            QuestionKind::MultipleChoice {
                options,
                correct: correct.into(),
            },
            explanation,
        )
    }

    #[must_use]
    pub fn true_false(prompt: impl Into<String>, correct: bool, explanation: impl Into<String>) -> Self {
        Self::new(prompt, QuestionKind::TrueFalse { correct }, explanation)
    }

    #[must_use]
    pub fn short_answer(
        prompt: impl Into<String>,
        correct: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self::new(
            prompt,
            QuestionKind::ShortAnswer {
                correct: correct.into(),
            },
            explanation,
        )
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// `None` for `QuestionKind::Unknown`.
    #[must_use]
    pub fn question_type(&self) -> Option<QuestionType> {
        match self.kind {
            QuestionKind::MultipleChoice { .. } => Some(QuestionType::MultipleChoice),
            QuestionKind::TrueFalse { .. } => Some(QuestionType::TrueFalse),
            QuestionKind::ShortAnswer { .. } => Some(QuestionType::ShortAnswer),
            QuestionKind::Unknown { .. } => None,
        }
    }

    /// Options for multiple choice; empty for other kinds.
    #[must_use]
    pub fn options(&self) -> &[String] {
        match &self.kind {
            QuestionKind::MultipleChoice { options, .. } => options,
            _ => &[],
        }
    }

    #[must_use]
    pub fn correct_answer(&self) -> Option<AnswerValue> {
        match &self.kind {
            QuestionKind::MultipleChoice { correct, .. } | QuestionKind::ShortAnswer { correct } => {
                Some(AnswerValue::Text(correct.clone()))
            }
            QuestionKind::TrueFalse { correct } => Some(AnswerValue::Bool(*correct)),
            QuestionKind::Unknown { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_type_round_trips_wire_names() {
        for ty in QuestionType::ALL {
            assert_eq!(ty.as_str().parse::<QuestionType>().unwrap(), ty);
        }
        assert!("essay".parse::<QuestionType>().is_err());
    }

    #[test]
    fn unknown_kind_has_no_type_or_answer() {
        let q = Question::new(
            "Draw a map",
            QuestionKind::Unknown {
                type_name: "drawing".into(),
            },
            "",
        );
        assert_eq!(q.question_type(), None);
        assert_eq!(q.correct_answer(), None);
        assert!(q.options().is_empty());
    }

    #[test]
    fn true_false_correct_answer_is_bool() {
        let q = Question::true_false("Water is wet", true, "");
        assert_eq!(q.correct_answer(), Some(AnswerValue::Bool(true)));
    }
}
