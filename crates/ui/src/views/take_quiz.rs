use dioxus::prelude::*;
use dioxus_router::Link;
use quiz_core::model::{AnswerValue, QuizId};
use quiz_core::{QuizSession, SessionPhase};
use services::SubmitOutcome;
use tracing::debug;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ErrorNotice, ViewError};
use crate::vm::{
    AnswerInputVm, NavigatorItemVm, QuestionVm, ResultRowVm, current_question_vm,
    navigator_items, progress_label, result_rows, score_headline,
};

/// What the view asks the session to do. Every control funnels through here.
#[derive(Clone, Debug, PartialEq)]
pub enum TakeQuizIntent {
    Answer(AnswerValue),
    Next,
    Previous,
    Jump(usize),
    Restart,
}

/// Apply one intent; rejected transitions leave the session untouched.
pub fn apply_intent(session: &mut QuizSession, intent: TakeQuizIntent) {
    let result = match intent {
        TakeQuizIntent::Answer(value) => session.select_answer(value),
        TakeQuizIntent::Next => session.go_next(),
        TakeQuizIntent::Previous => session.go_previous(),
        TakeQuizIntent::Jump(index) => session.jump_to(index),
        TakeQuizIntent::Restart => session.restart(),
    };
    if let Err(err) = result {
        debug!(error = %err, "intent ignored");
    }
}

#[component]
pub fn TakeQuizView(id: QuizId) -> Element {
    let ctx = use_context::<AppContext>();
    let mut session = use_signal(QuizSession::new);
    let mut outcome = use_signal(|| None::<SubmitOutcome>);
    let mut submit_error = use_signal(|| None::<ViewError>);
    let mut submitting = use_signal(|| false);

    let mut loader = {
        let ctx = ctx.clone();
        let id = id.clone();
        use_resource(move || {
            let sessions = ctx.quiz_sessions();
            let id = id.clone();
            async move {
                let started = sessions.start(&id).await;
                session.set(started);
                outcome.set(None);
                submit_error.set(None);
            }
        })
    };

    let dispatch = use_callback(move |intent: TakeQuizIntent| {
        if matches!(intent, TakeQuizIntent::Restart) {
            outcome.set(None);
            submit_error.set(None);
        }
        apply_intent(&mut session.write(), intent);
    });

    let on_submit = move |_| {
        let submitted = session.write().submit();
        if let Err(err) = submitted {
            debug!(error = %err, "submit ignored");
            return;
        }
        submitting.set(true);
        submit_error.set(None);
        // Recording works on a snapshot; the signal already holds the graded session.
        let snapshot = session.peek().clone();
        let sessions = ctx.quiz_sessions();
        spawn(async move {
            let result = sessions.record(&snapshot).await;
            submitting.set(false);
            match result {
                Ok(done) => outcome.set(Some(done)),
                Err(err) => submit_error.set(Some(err.into())),
            }
        });
    };

    let on_key = move |evt: KeyboardEvent| {
        if session.peek().phase() != SessionPhase::InProgress {
            return;
        }
        match evt.key() {
            Key::ArrowRight => {
                evt.prevent_default();
                dispatch.call(TakeQuizIntent::Next);
            }
            Key::ArrowLeft => {
                evt.prevent_default();
                dispatch.call(TakeQuizIntent::Previous);
            }
            _ => {}
        }
    };

    let current = session.read();
    let phase = current.phase();
    let title = current.quiz().map(|q| q.title.clone()).unwrap_or_default();

    let body = match phase {
        SessionPhase::Loading => rsx! {
            p { "Loading quiz..." }
        },
        SessionPhase::Error => {
            let message = current.error().unwrap_or("Failed to load quiz.").to_owned();
            rsx! {
                div { class: "error", role: "alert",
                    p { "{message}" }
                    button { onclick: move |_| loader.restart(), "Reload" }
                    Link { to: Route::Quizzes {}, "Back to quizzes" }
                }
            }
        }
        SessionPhase::InProgress => {
            let question = current_question_vm(&current);
            let items = navigator_items(&current);
            let progress = progress_label(&current);
            let is_first = current.is_first();
            let is_last = current.is_last();
            let can_submit = current.can_submit();
            rsx! {
                QuestionNavigator { items, on_jump: move |index: usize| dispatch.call(TakeQuizIntent::Jump(index)) }
                p { class: "muted", "{progress}" }
                if let Some(question) = question {
                    QuestionCard { question, on_answer: move |value: AnswerValue| dispatch.call(TakeQuizIntent::Answer(value)) }
                }
                div { class: "quiz-controls",
                    button {
                        id: "quiz-previous",
                        disabled: is_first,
                        onclick: move |_| dispatch.call(TakeQuizIntent::Previous),
                        "Previous"
                    }
                    button {
                        id: "quiz-next",
                        disabled: is_last,
                        onclick: move |_| dispatch.call(TakeQuizIntent::Next),
                        "Next"
                    }
                    button {
                        id: "quiz-submit",
                        class: "primary",
                        disabled: !can_submit,
                        onclick: on_submit,
                        "Submit quiz"
                    }
                }
                if !can_submit {
                    p { class: "muted", "Answer every question to submit." }
                }
                if let Some(error) = submit_error() {
                    ErrorNotice { error }
                }
            }
        }
        SessionPhase::Submitted => {
            let headline = current.score().map(score_headline).unwrap_or_default();
            let rows = result_rows(&current);
            let notice = outcome
                .read()
                .as_ref()
                .and_then(|o| o.record_error.clone());
            rsx! {
                section { class: "results",
                    h3 { "{headline}" }
                    if submitting() {
                        p { class: "muted", "Saving your attempt..." }
                    }
                    if let Some(error) = submit_error() {
                        ErrorNotice { error }
                    }
                    if let Some(notice) = notice {
                        p { class: "notice",
                            "Your score was calculated but could not be saved: {notice}"
                        }
                    }
                    ol { class: "result-list",
                        for row in rows {
                            ResultRow { key: "{row.number}", row }
                        }
                    }
                    div { class: "quiz-controls",
                        button {
                            class: "primary",
                            disabled: submitting(),
                            onclick: move |_| dispatch.call(TakeQuizIntent::Restart),
                            "Retake quiz"
                        }
                        Link { to: Route::Quizzes {}, "Back to quizzes" }
                    }
                }
            }
        }
    };
    drop(current);

    rsx! {
        div { class: "page take-quiz", tabindex: "0", onkeydown: on_key,
            if !title.is_empty() {
                h2 { "{title}" }
            }
            {body}
        }
    }
}

#[component]
fn QuestionNavigator(items: Vec<NavigatorItemVm>, on_jump: EventHandler<usize>) -> Element {
    rsx! {
        nav { class: "question-nav",
            for item in items {
                button {
                    key: "{item.index}",
                    class: navigator_class(&item),
                    onclick: move |_| on_jump.call(item.index),
                    "{item.label}"
                }
            }
        }
    }
}

fn navigator_class(item: &NavigatorItemVm) -> &'static str {
    match (item.current, item.answered) {
        (true, _) => "nav-item current",
        (false, true) => "nav-item answered",
        (false, false) => "nav-item",
    }
}

#[component]
fn QuestionCard(question: QuestionVm, on_answer: EventHandler<AnswerValue>) -> Element {
    rsx! {
        article { class: "question",
            p { class: "muted", "{question.position_label} · {question.type_label}" }
            h3 { "{question.prompt}" }
            match question.input {
                AnswerInputVm::Choice { options, selected } => rsx! {
                    ul { class: "options",
                        for option in options {
                            li {
                                label {
                                    input {
                                        r#type: "radio",
                                        name: "answer",
                                        checked: selected.as_deref() == Some(option.as_str()),
                                        onchange: {
                                            let option = option.clone();
                                            move |_| on_answer.call(AnswerValue::Text(option.clone()))
                                        },
                                    }
                                    "{option}"
                                }
                            }
                        }
                    }
                },
                AnswerInputVm::TrueFalse { selected } => rsx! {
                    div { class: "options",
                        for (text, value) in [("True", true), ("False", false)] {
                            label {
                                input {
                                    r#type: "radio",
                                    name: "answer",
                                    checked: selected == Some(value),
                                    onchange: move |_| on_answer.call(AnswerValue::Bool(value)),
                                }
                                "{text}"
                            }
                        }
                    }
                },
                AnswerInputVm::Text { value } => rsx! {
                    input {
                        class: "short-answer",
                        placeholder: "Type your answer",
                        value: "{value}",
                        oninput: move |evt| on_answer.call(AnswerValue::Text(evt.value())),
                    }
                },
                AnswerInputVm::Unsupported { type_name } => rsx! {
                    p { class: "notice", "This question type ({type_name}) is not supported." }
                },
            }
        }
    }
}

#[component]
fn ResultRow(row: ResultRowVm) -> Element {
    let verdict = if row.correct { "Correct" } else { "Incorrect" };
    let class = if row.correct { "result correct" } else { "result incorrect" };
    rsx! {
        li { class,
            p { strong { "{row.number}. {row.prompt}" } }
            p { "{verdict}. Your answer: {row.given}" }
            if !row.correct {
                p { "Correct answer: {row.correct_answer}" }
            }
            if !row.explanation.is_empty() {
                p { class: "muted", "{row.explanation}" }
            }
        }
    }
}
