use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_navigator};
use quiz_core::model::{MaterialId, QuizId};
use tracing::warn;

use crate::context::{AppContext, CurrentUser};
use crate::views::{
    DashboardView, LoginView, MaterialDetailView, MaterialEditView, MaterialNewView,
    MaterialsView, ProfileView, QuizDetailView, QuizGeneratorView, QuizzesView, RegisterView,
    TakeQuizView,
};

#[derive(Clone, Debug, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/login", LoginView)] Login {},
    #[route("/register", RegisterView)] Register {},
    #[layout(SignedInLayout)]
        #[route("/", DashboardView)] Dashboard {},
        #[route("/materials", MaterialsView)] Materials {},
        #[route("/materials/new", MaterialNewView)] MaterialNew {},
        #[route("/materials/:id", MaterialDetailView)] MaterialDetail { id: MaterialId },
        #[route("/materials/:id/edit", MaterialEditView)] MaterialEdit { id: MaterialId },
        #[route("/quizzes", QuizzesView)] Quizzes {},
        #[route("/quizzes/new?:material_id", QuizGeneratorView)] QuizNew { material_id: String },
        #[route("/quizzes/:id", QuizDetailView)] QuizDetail { id: QuizId },
        #[route("/quizzes/:id/take", TakeQuizView)] TakeQuiz { id: QuizId },
        #[route("/profile", ProfileView)] Profile {},
}

/// Wraps every route that needs a signed-in user; redirects to `/login` otherwise.
#[component]
fn SignedInLayout() -> Element {
    let user = use_context::<CurrentUser>();
    let navigator = use_navigator();

    use_effect(move || {
        if !user.is_signed_in() {
            navigator.replace(Route::Login {});
        }
    });

    if !user.is_signed_in() {
        return rsx! {
            p { class: "muted", "Redirecting to sign in..." }
        };
    }

    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let ctx = use_context::<AppContext>();
    let mut user = use_context::<CurrentUser>();
    let navigator = use_navigator();
    let display_name = user
        .get()
        .map(|u| u.display_name().to_owned())
        .unwrap_or_default();

    let on_logout = move |_| {
        let auth = ctx.auth();
        spawn(async move {
            if let Err(err) = auth.logout().await {
                warn!(error = %err, "logout could not clear the remembered login");
            }
            user.set(None);
            navigator.replace(Route::Login {});
        });
    };

    rsx! {
        nav { class: "sidebar",
            h1 { "Quiz Planner" }
            ul {
                li { Link { to: Route::Dashboard {}, "Dashboard" } }
                li { Link { to: Route::Materials {}, "Materials" } }
                li { Link { to: Route::Quizzes {}, "Quizzes" } }
                li { Link { to: Route::Profile {}, "Profile" } }
            }
            div { class: "sidebar-user",
                span { "{display_name}" }
                button { class: "link-button", onclick: on_logout, "Log out" }
            }
        }
    }
}
