use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{
    AuthToken, GenerateQuizRequest, GeneratedQuiz, MaterialDraft, MaterialId, Question, Quiz,
    QuizId, QuizSummary,
};
use quiz_core::time::fixed_now;
use storage::repository::QuizRepository;
use storage::{InMemoryRepository, Storage, StorageError};

use super::test_harness::{
    Fixture, ViewKind, fixture_over, mount, sign_in, signed_in_fixture, signed_out_fixture,
};

fn letters_quiz() -> Quiz {
    let options = vec!["A".to_owned(), "B".to_owned(), "C".to_owned()];
    Quiz {
        id: QuizId::new("q1"),
        title: "Letters".into(),
        description: "Pick the letter.".into(),
        questions: vec![
            Question::multiple_choice("First letter?", options.clone(), "A", "A comes first."),
            Question::true_false("B follows A.", true, ""),
        ],
        material_id: None,
        created_at: fixed_now(),
        updated_at: fixed_now(),
    }
}

fn seed_letters(fixture: &Fixture) -> QuizId {
    let token = fixture.services.auth().token().expect("signed in");
    fixture
        .repo
        .insert_quiz(&token, letters_quiz())
        .expect("insert quiz");
    QuizId::new("q1")
}

async fn seed_material(fixture: &Fixture, title: &str, content: &str, tags: &[&str]) -> MaterialId {
    fixture
        .services
        .materials()
        .create(MaterialDraft {
            title: title.into(),
            content: content.into(),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        })
        .await
        .expect("create material")
}

#[tokio::test(flavor = "current_thread")]
async fn login_view_smoke_renders_form() {
    let fixture = signed_out_fixture();
    let mut harness = mount(&fixture, ViewKind::Login);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Sign in"), "missing heading in {html}");
    assert!(html.contains("Create one"), "missing register link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_smoke_renders_counts_and_history() {
    let fixture = signed_in_fixture().await;
    seed_material(&fixture, "Oceans", "The Pacific is large.", &["geo"]).await;
    let quiz_id = seed_letters(&fixture);

    let sessions = fixture.services.quiz_sessions();
    let mut session = sessions.start(&quiz_id).await;
    session.select_answer("A").unwrap();
    session.go_next().unwrap();
    session.select_answer(true).unwrap();
    sessions.submit(&mut session).await.unwrap();

    let mut harness = mount(&fixture, ViewKind::Dashboard);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Welcome back, ada"), "missing greeting in {html}");
    assert!(html.contains("Oceans"), "missing recent material in {html}");
    assert!(html.contains("Letters"), "missing quiz in {html}");
    assert!(html.contains("Quiz history"), "missing history in {html}");
    assert!(html.contains("2/2"), "missing attempt score in {html}");
    assert!(html.contains("100%"), "missing percentage in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_smoke_renders_empty_state() {
    let fixture = signed_in_fixture().await;
    let mut harness = mount(&fixture, ViewKind::Dashboard);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("No materials yet"), "missing empty state in {html}");
    assert!(html.contains("No attempts yet."), "missing empty history in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn materials_view_smoke_lists_cards_and_tags() {
    let fixture = signed_in_fixture().await;
    seed_material(&fixture, "Cells", "Mitochondria make ATP.", &["bio"]).await;
    seed_material(&fixture, "French", "Paris is the capital.", &["lang"]).await;

    let mut harness = mount(&fixture, ViewKind::Materials);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Cells"), "missing first card in {html}");
    assert!(html.contains("French"), "missing second card in {html}");
    assert!(html.contains("All tags"), "missing tag filter in {html}");
    assert!(html.contains("lang"), "missing tag option in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn material_detail_view_smoke_renders_markdown() {
    let fixture = signed_in_fixture().await;
    let id = seed_material(&fixture, "Cells", "# Parts\n\n**Nucleus** holds DNA.", &[]).await;

    let mut harness = mount(&fixture, ViewKind::MaterialDetail(id));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("<h1>Parts</h1>"), "missing heading in {html}");
    assert!(html.contains("<strong>Nucleus</strong>"), "missing bold in {html}");
    assert!(html.contains("Generate quiz"), "missing action in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_detail_view_smoke_renders_type_mix() {
    let fixture = signed_in_fixture().await;
    let quiz_id = seed_letters(&fixture);

    let mut harness = mount(&fixture, ViewKind::QuizDetail(quiz_id));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Letters"), "missing title in {html}");
    assert!(html.contains("2 questions"), "missing count in {html}");
    assert!(html.contains("Multiple Choice"), "missing type mix in {html}");
    assert!(html.contains("You have not taken this quiz yet."), "missing history in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_generator_view_smoke_prefills_defaults() {
    let fixture = signed_in_fixture().await;
    let id = seed_material(&fixture, "Planets", "Mars is red.", &[]).await;

    let mut harness = mount(&fixture, ViewKind::QuizNew(id.to_string()));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Quiz on Planets"), "missing default title in {html}");
    assert!(html.contains("Short Answer"), "missing type checkbox in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_view_smoke_renders_first_question() {
    let fixture = signed_in_fixture().await;
    let quiz_id = seed_letters(&fixture);

    let mut harness = mount(&fixture, ViewKind::TakeQuiz(quiz_id));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Question 1 of 2"), "missing position in {html}");
    assert!(html.contains("First letter?"), "missing prompt in {html}");
    assert!(html.contains("0 of 2 answered"), "missing progress in {html}");
    assert!(
        html.contains("Answer every question to submit."),
        "missing submit hint in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_view_smoke_reports_missing_quiz() {
    let fixture = signed_in_fixture().await;
    let mut harness = mount(&fixture, ViewKind::TakeQuiz(QuizId::new("missing")));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Quiz not found."), "missing error in {html}");
    assert!(html.contains("Reload"), "missing reload in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn profile_view_smoke_shows_account() {
    let fixture = signed_in_fixture().await;
    let mut harness = mount(&fixture, ViewKind::Profile);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("ada@example.com"), "missing email in {html}");
    assert!(html.contains("Save changes"), "missing form in {html}");
}

struct UnreachableQuizzes;

#[async_trait]
impl QuizRepository for UnreachableQuizzes {
    async fn list_quizzes(&self, _token: &AuthToken) -> Result<Vec<QuizSummary>, StorageError> {
        Err(StorageError::Connection("refused".into()))
    }

    async fn get_quiz(&self, _token: &AuthToken, _id: &QuizId) -> Result<Quiz, StorageError> {
        Err(StorageError::Connection("refused".into()))
    }

    async fn generate_quiz(
        &self,
        _token: &AuthToken,
        _request: &GenerateQuizRequest,
    ) -> Result<GeneratedQuiz, StorageError> {
        Err(StorageError::Connection("refused".into()))
    }

    async fn delete_quiz(&self, _token: &AuthToken, _id: &QuizId) -> Result<(), StorageError> {
        Err(StorageError::Connection("refused".into()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn quizzes_view_smoke_renders_error_state() {
    let repo = InMemoryRepository::new();
    let mut storage = Storage::from_memory(repo.clone());
    storage.quizzes = Arc::new(UnreachableQuizzes);
    let fixture = fixture_over(&storage, repo);
    sign_in(&fixture).await;

    let mut harness = mount(&fixture, ViewKind::Quizzes);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Could not reach the server."), "missing error in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn take_quiz_view_smoke_reports_unreachable_backend() {
    let repo = InMemoryRepository::new();
    let mut storage = Storage::from_memory(repo.clone());
    storage.quizzes = Arc::new(UnreachableQuizzes);
    let fixture = fixture_over(&storage, repo);
    sign_in(&fixture).await;

    let mut harness = mount(&fixture, ViewKind::TakeQuiz(QuizId::new("q1")));
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("Failed to load quiz: Could not reach the server."),
        "missing error in {html}"
    );
}
