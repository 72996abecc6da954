use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::{MaterialId, QuizId};
use quiz_core::time::fixed_clock;
use services::AppServices;
use storage::{InMemoryRepository, Storage};

use crate::context::{AppContext, CurrentUser};
use crate::views::{
    DashboardView, LoginView, MaterialDetailView, MaterialsView, ProfileView, QuizDetailView,
    QuizGeneratorView, QuizzesView, TakeQuizView,
};

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Login,
    Dashboard,
    Materials,
    MaterialDetail(MaterialId),
    Quizzes,
    QuizDetail(QuizId),
    QuizNew(String),
    TakeQuiz(QuizId),
    Profile,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    services: AppServices,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let services = props.services.clone();
    use_context_provider(|| AppContext::new(services.clone()));
    use_context_provider(|| CurrentUser::new(props.services.auth().current_user()));
    use_context_provider(|| props.view.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Login => rsx! { LoginView {} },
        ViewKind::Dashboard => rsx! { DashboardView {} },
        ViewKind::Materials => rsx! { MaterialsView {} },
        ViewKind::MaterialDetail(id) => rsx! { MaterialDetailView { id } },
        ViewKind::Quizzes => rsx! { QuizzesView {} },
        ViewKind::QuizDetail(id) => rsx! { QuizDetailView { id } },
        ViewKind::QuizNew(material_id) => rsx! { QuizGeneratorView { material_id } },
        ViewKind::TakeQuiz(id) => rsx! { TakeQuizView { id } },
        ViewKind::Profile => rsx! { ProfileView {} },
    }
}

/// Services over an in-memory backend, plus the repository for seeding.
pub struct Fixture {
    pub services: AppServices,
    pub repo: InMemoryRepository,
}

pub fn fixture_over(storage: &Storage, repo: InMemoryRepository) -> Fixture {
    Fixture {
        services: AppServices::new(storage, fixed_clock()),
        repo,
    }
}

pub fn signed_out_fixture() -> Fixture {
    let repo = InMemoryRepository::with_clock(fixed_clock());
    fixture_over(&Storage::from_memory(repo.clone()), repo)
}

pub async fn signed_in_fixture() -> Fixture {
    let fixture = signed_out_fixture();
    sign_in(&fixture).await;
    fixture
}

pub async fn sign_in(fixture: &Fixture) {
    fixture
        .services
        .auth()
        .register("ada", "ada@example.com", "secret1")
        .await
        .expect("register");
}

pub struct ViewHarness {
    pub dom: VirtualDom,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild and let resources resolve.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..4 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn mount(fixture: &Fixture, view: ViewKind) -> ViewHarness {
    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            services: fixture.services.clone(),
            view,
        },
    );
    ViewHarness { dom }
}
