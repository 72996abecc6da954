use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use crate::context::{AppContext, CurrentUser};
use crate::routes::Route;
use crate::views::ViewError;

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut current_user = use_context::<CurrentUser>();
    let navigator = use_navigator();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<ViewError>);
    let mut busy = use_signal(|| false);

    use_effect(move || {
        if current_user.is_signed_in() {
            navigator.replace(Route::Dashboard {});
        }
    });

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let auth = ctx.auth();
        let (email, password) = (email.peek().clone(), password.peek().clone());
        spawn(async move {
            busy.set(true);
            let result = auth.login(&email, &password).await;
            busy.set(false);
            match result {
                Ok(user) => {
                    error.set(None);
                    current_user.set(Some(user));
                    navigator.replace(Route::Dashboard {});
                }
                Err(err) => error.set(Some(err.into())),
            }
        });
    };

    rsx! {
        div { class: "auth-page",
            form { class: "auth-form", onsubmit: on_submit,
                h2 { "Sign in" }
                if let Some(err) = error() {
                    p { class: "error", role: "alert", "{err.message()}" }
                }
                label { r#for: "login-email", "Email" }
                input {
                    id: "login-email",
                    r#type: "email",
                    value: "{email}",
                    oninput: move |evt| email.set(evt.value()),
                }
                label { r#for: "login-password", "Password" }
                input {
                    id: "login-password",
                    r#type: "password",
                    value: "{password}",
                    oninput: move |evt| password.set(evt.value()),
                }
                button { r#type: "submit", disabled: busy(),
                    if busy() { "Signing in..." } else { "Sign in" }
                }
                p { class: "muted",
                    "No account yet? "
                    Link { to: Route::Register {}, "Create one" }
                }
            }
        }
    }
}

#[component]
pub fn RegisterView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut current_user = use_context::<CurrentUser>();
    let navigator = use_navigator();

    let mut username = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<ViewError>);
    let mut busy = use_signal(|| false);

    use_effect(move || {
        if current_user.is_signed_in() {
            navigator.replace(Route::Dashboard {});
        }
    });

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if busy() {
            return;
        }
        let auth = ctx.auth();
        let username = username.peek().clone();
        let (email, password) = (email.peek().clone(), password.peek().clone());
        spawn(async move {
            busy.set(true);
            let result = auth.register(&username, &email, &password).await;
            busy.set(false);
            match result {
                Ok(user) => {
                    error.set(None);
                    current_user.set(Some(user));
                    navigator.replace(Route::Dashboard {});
                }
                Err(err) => error.set(Some(err.into())),
            }
        });
    };

    rsx! {
        div { class: "auth-page",
            form { class: "auth-form", onsubmit: on_submit,
                h2 { "Create account" }
                if let Some(err) = error() {
                    p { class: "error", role: "alert", "{err.message()}" }
                }
                label { r#for: "register-username", "Username" }
                input {
                    id: "register-username",
                    value: "{username}",
                    oninput: move |evt| username.set(evt.value()),
                }
                label { r#for: "register-email", "Email" }
                input {
                    id: "register-email",
                    r#type: "email",
                    value: "{email}",
                    oninput: move |evt| email.set(evt.value()),
                }
                label { r#for: "register-password", "Password" }
                input {
                    id: "register-password",
                    r#type: "password",
                    value: "{password}",
                    oninput: move |evt| password.set(evt.value()),
                }
                button { r#type: "submit", disabled: busy(),
                    if busy() { "Creating account..." } else { "Create account" }
                }
                p { class: "muted",
                    "Already registered? "
                    Link { to: Route::Login {}, "Sign in" }
                }
            }
        }
    }
}
