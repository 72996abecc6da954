use dioxus::prelude::*;
use dioxus_router::Link;
use services::DashboardOverview;

use crate::context::{AppContext, CurrentUser};
use crate::routes::Route;
use crate::views::{ErrorNotice, ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    AttemptRowVm, MaterialCardVm, QuizCardVm, StatVm, map_attempt_rows, map_material_cards,
    map_quiz_cards, map_stats, type_mix_rows,
};

#[derive(Clone, Debug, PartialEq)]
struct DashboardData {
    stats: Vec<StatVm>,
    materials: Vec<MaterialCardVm>,
    quizzes: Vec<QuizCardVm>,
    type_mix: Vec<(&'static str, u32)>,
    attempts: Vec<AttemptRowVm>,
}

impl DashboardData {
    fn from_overview(overview: &DashboardOverview) -> Self {
        Self {
            stats: map_stats(overview),
            materials: map_material_cards(&overview.recent_materials),
            quizzes: map_quiz_cards(&overview.recent_quizzes),
            type_mix: type_mix_rows(&overview.type_mix),
            attempts: map_attempt_rows(&overview.attempts),
        }
    }
}

#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut current_user = use_context::<CurrentUser>();
    let greeting = current_user
        .get()
        .map(|u| format!("Welcome back, {}", u.display_name()))
        .unwrap_or_default();

    let resource = use_resource(move || {
        let dashboard = ctx.dashboard();
        let auth = ctx.auth();
        async move {
            let overview = dashboard.overview().await.map_err(|err| {
                current_user.sync(&auth);
                ViewError::from(err)
            })?;
            Ok::<_, ViewError>(DashboardData::from_overview(&overview))
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "Dashboard" }
            p { class: "muted", "{greeting}" }

            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(error) => rsx! {
                    ErrorNotice { error }
                },
                ViewState::Ready(data) => rsx! {
                    DashboardBody { data }
                },
            }
        }
    }
}

#[component]
fn DashboardBody(data: DashboardData) -> Element {
    rsx! {
        section { class: "stats",
            for stat in data.stats {
                div { class: "stat",
                    span { class: "stat-value", "{stat.value}" }
                    span { class: "stat-label", "{stat.label}" }
                }
            }
        }

        section { class: "panel",
            h3 { "Recent materials" }
            if data.materials.is_empty() {
                p { class: "muted",
                    "No materials yet. "
                    Link { to: Route::MaterialNew {}, "Add your first material" }
                }
            } else {
                ul { class: "card-list",
                    for card in data.materials {
                        li { key: "{card.id}",
                            Link { to: Route::MaterialDetail { id: card.id.clone() }, "{card.title}" }
                            span { class: "muted", " {card.changed_str}" }
                        }
                    }
                }
            }
        }

        section { class: "panel",
            h3 { "Recent quizzes" }
            if data.quizzes.is_empty() {
                p { class: "muted", "No quizzes yet. Generate one from a material." }
            } else {
                ul { class: "card-list",
                    for card in data.quizzes {
                        li { key: "{card.id}",
                            Link { to: Route::QuizDetail { id: card.id.clone() }, "{card.title}" }
                            span { class: "muted", " {card.questions_label}" }
                        }
                    }
                }
            }
            if !data.type_mix.is_empty() {
                h4 { "Question types" }
                dl { class: "type-mix",
                    for (label, count) in data.type_mix {
                        dt { "{label}" }
                        dd { "{count}" }
                    }
                }
            }
        }

        section { class: "panel",
            h3 { "Quiz history" }
            if data.attempts.is_empty() {
                p { class: "muted", "No attempts yet." }
            } else {
                AttemptTable { rows: data.attempts }
            }
        }
    }
}

#[component]
pub fn AttemptTable(rows: Vec<AttemptRowVm>) -> Element {
    rsx! {
        table { class: "attempts",
            thead {
                tr {
                    th { "Quiz" }
                    th { "Score" }
                    th { "Percentage" }
                    th { "Taken" }
                }
            }
            tbody {
                for row in rows {
                    tr {
                        td { "{row.quiz_title}" }
                        td { "{row.score_str}" }
                        td { "{row.percentage_str}" }
                        td { "{row.taken_at_str}" }
                    }
                }
            }
        }
    }
}
