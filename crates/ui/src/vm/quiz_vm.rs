use quiz_core::model::{AnswerValue, QuestionKind, QuestionType, QuestionTypeCounts, QuizId, QuizSummary};
use quiz_core::{QuizSession, Score};

use crate::vm::time_fmt::format_date;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizCardVm {
    pub id: QuizId,
    pub title: String,
    pub description: String,
    pub questions_label: String,
    pub created_str: String,
}

#[must_use]
pub fn map_quiz_card(quiz: &QuizSummary) -> QuizCardVm {
    QuizCardVm {
        id: quiz.id.clone(),
        title: quiz.title.clone(),
        description: quiz.description.clone(),
        questions_label: questions_label(quiz.num_questions),
        created_str: format_date(quiz.created_at),
    }
}

#[must_use]
pub fn map_quiz_cards(quizzes: &[QuizSummary]) -> Vec<QuizCardVm> {
    quizzes.iter().map(map_quiz_card).collect()
}

#[must_use]
pub fn questions_label(count: u32) -> String {
    if count == 1 {
        "1 question".to_owned()
    } else {
        format!("{count} questions")
    }
}

/// Non-zero rows of a question type breakdown, in display order.
#[must_use]
pub fn type_mix_rows(counts: &QuestionTypeCounts) -> Vec<(&'static str, u32)> {
    let mut rows: Vec<(&'static str, u32)> = QuestionType::ALL
        .iter()
        .map(|ty| (ty.label(), counts.get(*ty)))
        .filter(|(_, n)| *n > 0)
        .collect();
    if counts.unknown > 0 {
        rows.push(("Other", counts.unknown));
    }
    rows
}

/// Which input the take-quiz view renders for the current question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerInputVm {
    Choice {
        options: Vec<String>,
        selected: Option<String>,
    },
    TrueFalse {
        selected: Option<bool>,
    },
    Text {
        value: String,
    },
    Unsupported {
        type_name: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub position_label: String,
    pub type_label: String,
    pub prompt: String,
    pub input: AnswerInputVm,
}

/// The question under the cursor, or `None` outside `InProgress`.
#[must_use]
pub fn current_question_vm(session: &QuizSession) -> Option<QuestionVm> {
    let question = session.current_question()?;
    let answer = session.current_answer();
    let input = match question.kind() {
        QuestionKind::MultipleChoice { options, .. } => AnswerInputVm::Choice {
            options: options.clone(),
            selected: answer.and_then(AnswerValue::as_text).map(str::to_owned),
        },
        QuestionKind::TrueFalse { .. } => AnswerInputVm::TrueFalse {
            selected: answer.and_then(AnswerValue::as_bool),
        },
        QuestionKind::ShortAnswer { .. } => AnswerInputVm::Text {
            value: answer
                .and_then(AnswerValue::as_text)
                .unwrap_or_default()
                .to_owned(),
        },
        QuestionKind::Unknown { type_name } => AnswerInputVm::Unsupported {
            type_name: type_name.clone(),
        },
    };

    Some(QuestionVm {
        position_label: format!(
            "Question {} of {}",
            session.current_index() + 1,
            session.question_count()
        ),
        type_label: question
            .question_type()
            .map_or("Unsupported question", QuestionType::label)
            .to_owned(),
        prompt: question.prompt().to_owned(),
        input,
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigatorItemVm {
    pub index: usize,
    pub label: String,
    pub answered: bool,
    pub current: bool,
}

#[must_use]
pub fn navigator_items(session: &QuizSession) -> Vec<NavigatorItemVm> {
    (0..session.question_count())
        .map(|index| NavigatorItemVm {
            index,
            label: (index + 1).to_string(),
            answered: session.answers().is_answered(index),
            current: index == session.current_index(),
        })
        .collect()
}

#[must_use]
pub fn progress_label(session: &QuizSession) -> String {
    format!(
        "{} of {} answered",
        session.answers().answered_count(),
        session.question_count()
    )
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRowVm {
    pub number: usize,
    pub prompt: String,
    pub correct: bool,
    pub given: String,
    pub correct_answer: String,
    pub explanation: String,
}

/// Per-question feedback after submission; empty before.
#[must_use]
pub fn result_rows(session: &QuizSession) -> Vec<ResultRowVm> {
    session
        .questions()
        .iter()
        .enumerate()
        .filter_map(|(index, question)| {
            let outcome = session.outcome(index)?;
            Some(ResultRowVm {
                number: index + 1,
                prompt: question.prompt().to_owned(),
                correct: outcome.correct,
                given: outcome
                    .given
                    .map_or_else(|| "No answer".to_owned(), |v| v.to_string()),
                correct_answer: outcome
                    .correct_answer
                    .map_or_else(|| "Not available".to_owned(), |v| v.to_string()),
                explanation: outcome.explanation,
            })
        })
        .collect()
}

#[must_use]
pub fn score_headline(score: Score) -> String {
    format!(
        "You scored {} out of {} ({}%)",
        score.correct(),
        score.total(),
        score.percentage()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, Quiz};
    use quiz_core::time::fixed_now;

    fn quiz() -> Quiz {
        Quiz {
            id: QuizId::new("q1"),
            title: "Capitals".into(),
            description: String::new(),
            questions: vec![
                Question::multiple_choice(
                    "Capital of France?",
                    vec!["Paris".into(), "Rome".into()],
                    "Paris",
                    "Paris is the capital.",
                ),
                Question::true_false("Rome is in Italy.", true, ""),
                Question::short_answer("Capital of Spain?", "Madrid", ""),
            ],
            material_id: None,
            created_at: fixed_now(),
            updated_at: fixed_now(),
        }
    }

    #[test]
    fn question_vm_tracks_selection() {
        let mut session = QuizSession::with_quiz(quiz()).unwrap();
        let vm = current_question_vm(&session).unwrap();
        assert_eq!(vm.position_label, "Question 1 of 3");
        assert_eq!(vm.type_label, "Multiple Choice");
        assert_eq!(
            vm.input,
            AnswerInputVm::Choice {
                options: vec!["Paris".into(), "Rome".into()],
                selected: None,
            }
        );

        session.go_next().unwrap();
        session.select_answer(false).unwrap();
        let vm = current_question_vm(&session).unwrap();
        assert_eq!(vm.input, AnswerInputVm::TrueFalse { selected: Some(false) });
    }

    #[test]
    fn navigator_marks_current_and_answered() {
        let mut session = QuizSession::with_quiz(quiz()).unwrap();
        session.select_answer("Paris").unwrap();
        session.jump_to(2).unwrap();

        let items = navigator_items(&session);
        assert_eq!(items.len(), 3);
        assert!(items[0].answered && !items[0].current);
        assert!(!items[1].answered);
        assert!(items[2].current);
        assert_eq!(progress_label(&session), "1 of 3 answered");
    }

    #[test]
    fn results_appear_only_after_submit() {
        let mut session = QuizSession::with_quiz(quiz()).unwrap();
        session.select_answer("Paris").unwrap();
        session.go_next().unwrap();
        session.select_answer(false).unwrap();
        session.go_next().unwrap();
        session.select_answer(" madrid ").unwrap();
        assert!(result_rows(&session).is_empty());

        let score = session.submit().unwrap();
        let rows = result_rows(&session);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].correct);
        assert_eq!(rows[0].explanation, "Paris is the capital.");
        assert!(!rows[1].correct);
        assert_eq!(rows[1].given, "False");
        assert_eq!(rows[1].correct_answer, "True");
        assert!(rows[2].correct);
        assert_eq!(score_headline(score), "You scored 2 out of 3 (67%)");
    }

    #[test]
    fn type_mix_skips_empty_types() {
        let counts = quiz().question_type_counts();
        assert_eq!(
            type_mix_rows(&counts),
            [("Multiple Choice", 1), ("True/False", 1), ("Short Answer", 1)]
        );
        assert!(type_mix_rows(&QuestionTypeCounts::default()).is_empty());
    }

    #[test]
    fn singular_question_label() {
        assert_eq!(questions_label(1), "1 question");
        assert_eq!(questions_label(4), "4 questions");
    }
}
