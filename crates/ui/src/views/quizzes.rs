use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use quiz_core::model::{
    GenerateQuizDraft, MAX_QUESTION_COUNT, MaterialId, QuestionType, Quiz, QuizId,
};
use tracing::warn;

use crate::context::{AppContext, CurrentUser};
use crate::routes::Route;
use crate::views::dashboard::AttemptTable;
use crate::views::{ErrorNotice, ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    AttemptRowVm, QuizCardVm, format_date, map_attempt_rows, map_quiz_cards, questions_label,
    type_mix_rows,
};

#[component]
pub fn QuizzesView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut current_user = use_context::<CurrentUser>();
    let mut action_error = use_signal(|| None::<ViewError>);

    let mut resource = {
        let ctx = ctx.clone();
        use_resource(move || {
            let quizzes = ctx.quizzes();
            let auth = ctx.auth();
            async move {
                let list = quizzes.list().await.map_err(|err| {
                    current_user.sync(&auth);
                    ViewError::from(err)
                })?;
                Ok::<_, ViewError>(map_quiz_cards(&list))
            }
        })
    };
    let state = view_state_from_resource(&resource);

    let on_delete = use_callback(move |id: QuizId| {
        let quizzes = ctx.quizzes();
        spawn(async move {
            match quizzes.delete(&id).await {
                Ok(()) => {
                    action_error.set(None);
                    resource.restart();
                }
                Err(err) => action_error.set(Some(err.into())),
            }
        });
    });

    rsx! {
        div { class: "page",
            div { class: "page-header",
                h2 { "Quizzes" }
                Link {
                    class: "button",
                    to: Route::QuizNew { material_id: String::new() },
                    "Generate quiz"
                }
            }
            if let Some(error) = action_error() {
                ErrorNotice { error }
            }
            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(error) => rsx! {
                    ErrorNotice { error }
                },
                ViewState::Ready(cards) => rsx! {
                    if cards.is_empty() {
                        p { class: "muted", "No quizzes yet. Generate one from a study material." }
                    } else {
                        ul { class: "card-list",
                            for card in cards {
                                QuizCard { key: "{card.id}", card, on_delete }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn QuizCard(card: QuizCardVm, on_delete: EventHandler<QuizId>) -> Element {
    let id = card.id.clone();
    rsx! {
        li { class: "card",
            Link { to: Route::QuizDetail { id: card.id.clone() },
                h3 { "{card.title}" }
            }
            if !card.description.is_empty() {
                p { "{card.description}" }
            }
            div { class: "card-footer",
                span { class: "muted", "{card.questions_label} · {card.created_str}" }
                Link { to: Route::TakeQuiz { id: card.id.clone() }, "Take quiz" }
                button {
                    class: "link-button danger",
                    onclick: move |_| on_delete.call(id.clone()),
                    "Delete"
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct QuizDetailData {
    quiz: Quiz,
    attempts: Vec<AttemptRowVm>,
}

#[component]
pub fn QuizDetailView(id: QuizId) -> Element {
    let ctx = use_context::<AppContext>();
    let mut current_user = use_context::<CurrentUser>();
    let navigator = use_navigator();
    let mut action_error = use_signal(|| None::<ViewError>);

    let resource = {
        let ctx = ctx.clone();
        let id = id.clone();
        use_resource(move || {
            let quizzes = ctx.quizzes();
            let sessions = ctx.quiz_sessions();
            let auth = ctx.auth();
            let id = id.clone();
            async move {
                let quiz = quizzes.get(&id).await.map_err(|err| {
                    current_user.sync(&auth);
                    ViewError::from(err)
                })?;
                // History is secondary; the quiz still renders without it.
                let attempts = match sessions.quiz_attempts(&id).await {
                    Ok(attempts) => map_attempt_rows(&attempts),
                    Err(err) => {
                        warn!(quiz = %id, error = %err, "could not load quiz attempts");
                        Vec::new()
                    }
                };
                Ok::<_, ViewError>(QuizDetailData { quiz, attempts })
            }
        })
    };
    let state = view_state_from_resource(&resource);

    let on_delete = {
        let id = id.clone();
        move |_| {
            let quizzes = ctx.quizzes();
            let id = id.clone();
            spawn(async move {
                match quizzes.delete(&id).await {
                    Ok(()) => {
                        navigator.replace(Route::Quizzes {});
                    }
                    Err(err) => action_error.set(Some(err.into())),
                }
            });
        }
    };

    rsx! {
        div { class: "page",
            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(error) => rsx! {
                    ErrorNotice { error }
                    Link { to: Route::Quizzes {}, "Back to quizzes" }
                },
                ViewState::Ready(data) => {
                    let quiz = data.quiz;
                    let count = u32::try_from(quiz.question_count()).unwrap_or(u32::MAX);
                    let type_rows = type_mix_rows(&quiz.question_type_counts());
                    let created = format_date(quiz.created_at);
                    rsx! {
                        h2 { "{quiz.title}" }
                        if !quiz.description.is_empty() {
                            p { "{quiz.description}" }
                        }
                        p { class: "muted", "{questions_label(count)} · Created {created}" }
                        if let Some(material_id) = quiz.material_id.clone() {
                            p {
                                Link { to: Route::MaterialDetail { id: material_id }, "Source material" }
                            }
                        }
                        dl { class: "type-mix",
                            for (label, n) in type_rows {
                                dt { "{label}" }
                                dd { "{n}" }
                            }
                        }
                        div { class: "actions",
                            Link { class: "button primary", to: Route::TakeQuiz { id: quiz.id.clone() }, "Take quiz" }
                            button { class: "danger", onclick: on_delete.clone(), "Delete" }
                        }
                        if let Some(error) = action_error() {
                            ErrorNotice { error }
                        }
                        section { class: "panel",
                            h3 { "Previous attempts" }
                            if data.attempts.is_empty() {
                                p { class: "muted", "You have not taken this quiz yet." }
                            } else {
                                AttemptTable { rows: data.attempts }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Generator form. An empty `material_id` asks the user to pick a material first.
#[component]
pub fn QuizGeneratorView(material_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let mut selected = use_signal(|| material_id.parse::<MaterialId>().ok());

    let materials = {
        let ctx = ctx.clone();
        use_resource(move || {
            let materials = ctx.materials();
            async move { materials.list().await.map_err(ViewError::from) }
        })
    };
    let draft = use_resource(move || {
        let quizzes = ctx.quizzes();
        let selected = selected();
        async move {
            match selected {
                Some(id) => quizzes
                    .draft_for(&id)
                    .await
                    .map(Some)
                    .map_err(ViewError::from),
                None => Ok(None),
            }
        }
    });

    let materials_state = view_state_from_resource(&materials);
    let draft_state = view_state_from_resource(&draft);
    let selected_value = selected().map(|id| id.to_string()).unwrap_or_default();

    rsx! {
        div { class: "page",
            h2 { "Generate quiz" }
            match materials_state {
                ViewState::Ready(list) => rsx! {
                    label { r#for: "generator-material", "Study material" }
                    select {
                        id: "generator-material",
                        onchange: move |evt| selected.set(evt.value().parse().ok()),
                        option { value: "", selected: selected_value.is_empty(), "Choose a material" }
                        for material in list {
                            option {
                                value: "{material.id}",
                                selected: selected_value == material.id.as_str(),
                                "{material.title}"
                            }
                        }
                    }
                },
                ViewState::Error(error) => rsx! {
                    ErrorNotice { error }
                },
                ViewState::Idle | ViewState::Loading => rsx! {},
            }
            match draft_state {
                ViewState::Ready(Some(draft)) => rsx! {
                    GeneratorForm { key: "{draft.material_id}", draft }
                },
                ViewState::Ready(None) => rsx! {
                    p { class: "muted", "Pick a study material to generate a quiz from." }
                },
                ViewState::Error(error) => rsx! {
                    ErrorNotice { error }
                },
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
            }
        }
    }
}

#[component]
fn GeneratorForm(draft: GenerateQuizDraft) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut num_questions = use_signal(|| draft.num_questions.to_string());
    let mut types = use_signal(|| draft.question_types.clone());
    let mut title = use_signal(|| draft.title.clone());
    let mut description = use_signal(|| draft.description.clone());
    let mut error = use_signal(|| None::<ViewError>);
    let mut generating = use_signal(|| false);
    let material_id = draft.material_id.clone();

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if generating() {
            return;
        }
        let Ok(count) = num_questions.peek().trim().parse::<u32>() else {
            error.set(Some(ViewError::Invalid(
                "Number of questions must be a whole number.".to_owned(),
            )));
            return;
        };
        let request = GenerateQuizDraft {
            material_id: material_id.clone(),
            num_questions: count,
            question_types: types.peek().clone(),
            title: title.peek().clone(),
            description: description.peek().clone(),
        };
        let quizzes = ctx.quizzes();
        spawn(async move {
            generating.set(true);
            let result = quizzes.generate(request).await;
            generating.set(false);
            match result {
                Ok(generated) => {
                    navigator.replace(Route::QuizDetail {
                        id: generated.quiz_id,
                    });
                }
                Err(err) => error.set(Some(err.into())),
            }
        });
    };

    rsx! {
        form { class: "generator-form", onsubmit: on_submit,
            if let Some(error) = error() {
                ErrorNotice { error }
            }
            label { r#for: "generator-count", "Number of questions (1-{MAX_QUESTION_COUNT})" }
            input {
                id: "generator-count",
                r#type: "number",
                min: "1",
                max: "{MAX_QUESTION_COUNT}",
                value: "{num_questions}",
                oninput: move |evt| num_questions.set(evt.value()),
            }
            fieldset {
                legend { "Question types" }
                for ty in QuestionType::ALL {
                    label { class: "checkbox",
                        input {
                            r#type: "checkbox",
                            checked: types.read().contains(&ty),
                            onchange: move |evt: FormEvent| toggle_type(&mut types.write(), ty, evt.checked()),
                        }
                        "{ty.label()}"
                    }
                }
            }
            label { r#for: "generator-title", "Title" }
            input {
                id: "generator-title",
                value: "{title}",
                oninput: move |evt| title.set(evt.value()),
            }
            label { r#for: "generator-description", "Description" }
            textarea {
                id: "generator-description",
                rows: "3",
                value: "{description}",
                oninput: move |evt| description.set(evt.value()),
            }
            button { r#type: "submit", disabled: generating(),
                if generating() { "Generating..." } else { "Generate quiz" }
            }
        }
    }
}

/// Keeps the selection in `QuestionType::ALL` order.
fn toggle_type(types: &mut Vec<QuestionType>, ty: QuestionType, on: bool) {
    types.retain(|t| *t != ty);
    if on {
        types.push(ty);
        types.sort_by_key(|t| QuestionType::ALL.iter().position(|a| a == t));
    }
}

#[cfg(test)]
mod tests {
    use super::toggle_type;
    use quiz_core::model::QuestionType;

    #[test]
    fn toggling_keeps_canonical_order() {
        let mut types = vec![QuestionType::ShortAnswer];
        toggle_type(&mut types, QuestionType::MultipleChoice, true);
        assert_eq!(types, [QuestionType::MultipleChoice, QuestionType::ShortAnswer]);

        toggle_type(&mut types, QuestionType::MultipleChoice, true);
        assert_eq!(types.len(), 2);

        toggle_type(&mut types, QuestionType::ShortAnswer, false);
        assert_eq!(types, [QuestionType::MultipleChoice]);
    }
}
