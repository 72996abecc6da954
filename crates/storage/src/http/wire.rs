//! JSON shapes exchanged with the quiz backend.
//!
//! The backend is loose about ids (`id` or `_id`), counts, and timestamp
//! formats, so decoding accepts the known variants and normalizes them here.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use quiz_core::model::{
    AnswerSet, AnswerValue, AttemptId, AttemptResult, AttemptSummary, Dashboard, DashboardStats,
    GenerateQuizRequest, GeneratedQuiz, Material, MaterialId, ProfileUpdate, Question,
    QuestionKind, QuestionResult, QuestionType, Quiz, QuizId, QuizSummary, Registration, User,
    UserId, ValidatedMaterial,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parses the timestamp formats the backend emits: RFC 3339, RFC 2822
/// (`Tue, 14 Nov 2023 22:13:20 GMT`), or a naive ISO string taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn timestamp_or_epoch(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(parse_timestamp).unwrap_or_default()
}

fn optional_id(raw: Option<String>) -> Option<MaterialId> {
    raw.filter(|s| !s.trim().is_empty() && s != "None")
        .map(MaterialId::new)
}

fn answer_from_value(value: Value) -> Option<AnswerValue> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(AnswerValue::Bool(b)),
        Value::String(s) => Some(AnswerValue::Text(s)),
        other => Some(AnswerValue::Text(other.to_string())),
    }
}

//
// ─── ERRORS / HEALTH ───────────────────────────────────────────────────────────
//

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.error.or(self.message).or(self.msg)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthWire {
    pub status: String,
}

//
// ─── AUTH ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub(crate) struct RegisterBody<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

impl<'a> From<&'a Registration> for RegisterBody<'a> {
    fn from(registration: &'a Registration) -> Self {
        Self {
            username: &registration.username,
            email: &registration.email,
            password: &registration.password,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserWire {
    #[serde(alias = "_id")]
    id: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    name: Option<String>,
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        Self {
            id: UserId::new(wire.id),
            username: wire.username,
            email: wire.email,
            name: wire.name.filter(|n| !n.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginWire {
    pub access_token: String,
    pub user: UserWire,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
}

impl<'a> From<&'a ProfileUpdate> for ProfileBody<'a> {
    fn from(update: &'a ProfileUpdate) -> Self {
        Self {
            name: update.name.as_deref(),
            password: update.password.as_deref(),
        }
    }
}

//
// ─── MATERIALS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub(crate) struct MaterialBody<'a> {
    title: &'a str,
    content: &'a str,
    tags: &'a [String],
}

impl<'a> From<&'a ValidatedMaterial> for MaterialBody<'a> {
    fn from(material: &'a ValidatedMaterial) -> Self {
        Self {
            title: &material.title,
            content: &material.content,
            tags: &material.tags,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MaterialWire {
    #[serde(alias = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl From<MaterialWire> for Material {
    fn from(wire: MaterialWire) -> Self {
        Self {
            id: MaterialId::new(wire.id),
            title: wire.title,
            content: wire.content,
            tags: wire.tags,
            created_at: timestamp_or_epoch(wire.created_at.as_deref()),
            updated_at: wire.updated_at.as_deref().and_then(parse_timestamp),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedWire {
    #[serde(alias = "_id", alias = "material_id")]
    pub id: String,
}

//
// ─── QUIZZES ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct QuizSummaryWire {
    #[serde(alias = "_id")]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, alias = "question_count")]
    num_questions: u32,
    #[serde(default)]
    material_id: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<QuizSummaryWire> for QuizSummary {
    fn from(wire: QuizSummaryWire) -> Self {
        Self {
            id: QuizId::new(wire.id),
            title: wire.title,
            description: wire.description,
            num_questions: wire.num_questions,
            material_id: optional_id(wire.material_id),
            created_at: timestamp_or_epoch(wire.created_at.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionWire {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(alias = "prompt", alias = "text", default)]
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_answer: Value,
    #[serde(default)]
    explanation: Option<String>,
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

impl From<QuestionWire> for Question {
    fn from(wire: QuestionWire) -> Self {
        let unknown = || QuestionKind::Unknown {
            type_name: wire.kind.clone(),
        };
        let kind = match wire.kind.parse::<QuestionType>() {
            Ok(QuestionType::MultipleChoice) => QuestionKind::MultipleChoice {
                options: wire.options.clone(),
                correct: value_as_text(&wire.correct_answer),
            },
            Ok(QuestionType::TrueFalse) => value_as_bool(&wire.correct_answer)
                .map_or_else(unknown, |correct| QuestionKind::TrueFalse { correct }),
            Ok(QuestionType::ShortAnswer) => QuestionKind::ShortAnswer {
                correct: value_as_text(&wire.correct_answer),
            },
            Err(_) => unknown(),
        };
        Question::new(wire.question, kind, wire.explanation.unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizWire {
    #[serde(alias = "_id")]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    questions: Vec<QuestionWire>,
    #[serde(default)]
    material_id: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl From<QuizWire> for Quiz {
    fn from(wire: QuizWire) -> Self {
        let created_at = timestamp_or_epoch(wire.created_at.as_deref());
        Self {
            id: QuizId::new(wire.id),
            title: wire.title,
            description: wire.description,
            questions: wire.questions.into_iter().map(Question::from).collect(),
            material_id: optional_id(wire.material_id),
            created_at,
            updated_at: wire
                .updated_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateBody<'a> {
    material_id: &'a str,
    num_questions: u32,
    question_types: &'a [QuestionType],
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a GenerateQuizRequest> for GenerateBody<'a> {
    fn from(request: &'a GenerateQuizRequest) -> Self {
        Self {
            material_id: request.material_id.as_str(),
            num_questions: request.num_questions,
            question_types: &request.question_types,
            title: request.title.as_deref(),
            description: request.description.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeneratedWire {
    quiz_id: String,
    #[serde(default)]
    title: String,
    #[serde(default, alias = "question_count")]
    num_questions: u32,
}

impl From<GeneratedWire> for GeneratedQuiz {
    fn from(wire: GeneratedWire) -> Self {
        Self {
            quiz_id: QuizId::new(wire.quiz_id),
            title: wire.title,
            num_questions: wire.num_questions,
        }
    }
}

//
// ─── ATTEMPTS ──────────────────────────────────────────────────────────────────
//

/// `{"answers": {"0": "Paris", "1": false}}`; unanswered slots are omitted.
#[derive(Debug, Serialize)]
pub(crate) struct AttemptBody<'a> {
    answers: BTreeMap<String, &'a AnswerValue>,
}

impl<'a> From<&'a AnswerSet> for AttemptBody<'a> {
    fn from(answers: &'a AnswerSet) -> Self {
        Self {
            answers: answers
                .iter()
                .enumerate()
                .filter_map(|(index, value)| value.map(|v| (index.to_string(), v)))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionResultWire {
    #[serde(alias = "question_index")]
    question_id: usize,
    #[serde(default)]
    correct: bool,
    #[serde(default)]
    correct_answer: Value,
    #[serde(default)]
    explanation: Option<String>,
}

impl From<QuestionResultWire> for QuestionResult {
    fn from(wire: QuestionResultWire) -> Self {
        Self {
            question_index: wire.question_id,
            correct: wire.correct,
            correct_answer: answer_from_value(wire.correct_answer),
            explanation: wire.explanation.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptResultWire {
    attempt_id: String,
    score: u32,
    total_questions: u32,
    #[serde(default)]
    percentage: f64,
    #[serde(default)]
    results: Vec<QuestionResultWire>,
}

impl From<AttemptResultWire> for AttemptResult {
    fn from(wire: AttemptResultWire) -> Self {
        Self {
            attempt_id: AttemptId::new(wire.attempt_id),
            score: wire.score,
            total_questions: wire.total_questions,
            percentage: wire.percentage,
            results: wire.results.into_iter().map(QuestionResult::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptSummaryWire {
    #[serde(alias = "_id")]
    id: String,
    quiz_id: String,
    #[serde(default)]
    quiz_title: Option<String>,
    #[serde(default)]
    score: u32,
    #[serde(default)]
    total_questions: u32,
    #[serde(default)]
    percentage: f64,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<AttemptSummaryWire> for AttemptSummary {
    fn from(wire: AttemptSummaryWire) -> Self {
        Self {
            id: AttemptId::new(wire.id),
            quiz_id: QuizId::new(wire.quiz_id),
            quiz_title: wire.quiz_title,
            score: wire.score,
            total_questions: wire.total_questions,
            percentage: wire.percentage,
            created_at: wire.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatsWire {
    #[serde(default)]
    total_attempts: u32,
    #[serde(default)]
    average_score: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DashboardWire {
    #[serde(default)]
    attempts: Vec<AttemptSummaryWire>,
    #[serde(default)]
    stats: Option<StatsWire>,
}

impl From<DashboardWire> for Dashboard {
    fn from(wire: DashboardWire) -> Self {
        let attempts: Vec<AttemptSummary> =
            wire.attempts.into_iter().map(AttemptSummary::from).collect();
        let stats = wire.stats.map_or_else(
            || DashboardStats::from_attempts(&attempts),
            |s| DashboardStats {
                total_attempts: s.total_attempts,
                average_score: s.average_score,
            },
        );
        Self { attempts, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn timestamps_accept_backend_formats() {
        let expected = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        assert_eq!(parse_timestamp("2023-11-14T22:13:20Z"), Some(expected));
        assert_eq!(parse_timestamp("2023-11-14T22:13:20"), Some(expected));
        assert_eq!(
            parse_timestamp("Tue, 14 Nov 2023 22:13:20 GMT"),
            Some(expected)
        );
        assert!(parse_timestamp("2023-11-14T22:13:20.123456").is_some());
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn quiz_summary_accepts_underscore_id_and_question_count() {
        let wire: QuizSummaryWire = serde_json::from_value(json!({
            "_id": "abc",
            "title": "Cells",
            "question_count": 7,
            "material_id": "m1",
            "created_at": "2023-11-14T22:13:20"
        }))
        .unwrap();
        let summary = QuizSummary::from(wire);
        assert_eq!(summary.id.as_str(), "abc");
        assert_eq!(summary.num_questions, 7);
        assert_eq!(summary.material_id, Some(MaterialId::new("m1")));
    }

    #[test]
    fn quiz_decodes_every_question_type() {
        let wire: QuizWire = serde_json::from_value(json!({
            "_id": "q1",
            "title": "Mixed",
            "description": "",
            "material_id": "None",
            "questions": [
                {"type": "multiple_choice", "question": "Pick", "options": ["A", "B"],
                 "correct_answer": "B", "explanation": "B it is"},
                {"type": "true_false", "question": "Sky is green", "correct_answer": "False",
                 "explanation": null},
                {"type": "short_answer", "question": "Capital?", "correct_answer": "Paris",
                 "explanation": ""},
                {"type": "matching", "question": "Match", "correct_answer": []}
            ]
        }))
        .unwrap();
        let quiz = Quiz::from(wire);
        assert_eq!(quiz.material_id, None);
        assert_eq!(quiz.questions.len(), 4);
        assert_eq!(quiz.questions[0].options(), ["A", "B"]);
        assert_eq!(
            quiz.questions[1].kind(),
            &QuestionKind::TrueFalse { correct: false }
        );
        assert_eq!(
            quiz.questions[2].correct_answer(),
            Some(AnswerValue::text("Paris"))
        );
        assert_eq!(quiz.questions[3].question_type(), None);
    }

    #[test]
    fn attempt_body_keys_answers_by_index_and_skips_gaps() {
        let mut answers = AnswerSet::unanswered(3);
        answers.set(0, "Paris".into());
        answers.set(2, false.into());
        let body = serde_json::to_value(AttemptBody::from(&answers)).unwrap();
        assert_eq!(body, json!({"answers": {"0": "Paris", "2": false}}));
    }

    #[test]
    fn generate_body_omits_blank_title() {
        let request = GenerateQuizRequest {
            material_id: MaterialId::new("m1"),
            num_questions: 5,
            question_types: vec![QuestionType::MultipleChoice, QuestionType::TrueFalse],
            title: None,
            description: Some("Week 1".into()),
        };
        let body = serde_json::to_value(GenerateBody::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "material_id": "m1",
                "num_questions": 5,
                "question_types": ["multiple_choice", "true_false"],
                "description": "Week 1"
            })
        );
    }

    #[test]
    fn attempt_result_maps_question_id_to_index() {
        let wire: AttemptResultWire = serde_json::from_value(json!({
            "message": "Quiz attempt submitted successfully",
            "attempt_id": "a1",
            "score": 1,
            "total_questions": 2,
            "percentage": 50.0,
            "results": [
                {"question_id": 0, "correct": true, "correct_answer": "B", "explanation": ""},
                {"question_id": 1, "correct": false, "correct_answer": false, "explanation": "no"}
            ]
        }))
        .unwrap();
        let result = AttemptResult::from(wire);
        assert_eq!(result.results[1].question_index, 1);
        assert_eq!(result.results[1].correct_answer, Some(AnswerValue::Bool(false)));
    }

    #[test]
    fn dashboard_without_stats_computes_them() {
        let wire: DashboardWire = serde_json::from_value(json!({
            "attempts": [
                {"_id": "a1", "quiz_id": "q1", "score": 1, "total_questions": 2,
                 "percentage": 50.0, "quiz_title": "Quiz Not Found"},
                {"_id": "a2", "quiz_id": "q1", "score": 2, "total_questions": 2,
                 "percentage": 100.0}
            ]
        }))
        .unwrap();
        let dashboard = Dashboard::from(wire);
        assert_eq!(dashboard.stats.total_attempts, 2);
        assert!((dashboard.stats.average_score - 75.0).abs() < 1e-9);
    }

    #[test]
    fn error_body_prefers_error_field() {
        let body: ErrorBody =
            serde_json::from_value(json!({"msg": "Token has expired", "error": "bad"})).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("bad"));
    }
}
