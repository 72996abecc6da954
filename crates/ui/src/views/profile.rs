use dioxus::prelude::*;
use quiz_core::model::ProfileUpdateDraft;

use crate::context::{AppContext, CurrentUser};
use crate::views::{ErrorNotice, ViewError};

#[component]
pub fn ProfileView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut current_user = use_context::<CurrentUser>();
    let user = current_user.get();

    let mut name = use_signal(|| {
        user.as_ref()
            .and_then(|u| u.name.clone())
            .unwrap_or_default()
    });
    let mut password = use_signal(String::new);
    let mut confirm = use_signal(String::new);
    let mut error = use_signal(|| None::<ViewError>);
    let mut saved = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let auth = ctx.auth();
        let draft = ProfileUpdateDraft {
            name: name.peek().clone(),
            password: password.peek().clone(),
            confirm_password: confirm.peek().clone(),
        };
        spawn(async move {
            match auth.update_profile(draft).await {
                Ok(updated) => {
                    error.set(None);
                    saved.set(true);
                    password.set(String::new());
                    confirm.set(String::new());
                    current_user.set(Some(updated));
                }
                Err(err) => {
                    saved.set(false);
                    current_user.sync(&auth);
                    error.set(Some(err.into()));
                }
            }
        });
    };

    let Some(user) = user else {
        return rsx! {
            ErrorNotice { error: ViewError::SignedOut }
        };
    };

    rsx! {
        div { class: "page",
            h2 { "Profile" }
            dl { class: "profile",
                dt { "Username" }
                dd { "{user.username}" }
                dt { "Email" }
                dd { "{user.email}" }
            }
            form { class: "profile-form", onsubmit: on_submit,
                if let Some(error) = error() {
                    ErrorNotice { error }
                }
                if saved() {
                    p { class: "notice", "Profile updated." }
                }
                label { r#for: "profile-name", "Display name" }
                input {
                    id: "profile-name",
                    value: "{name}",
                    oninput: move |evt| name.set(evt.value()),
                }
                label { r#for: "profile-password", "New password (leave blank to keep)" }
                input {
                    id: "profile-password",
                    r#type: "password",
                    value: "{password}",
                    oninput: move |evt| password.set(evt.value()),
                }
                label { r#for: "profile-confirm", "Confirm new password" }
                input {
                    id: "profile-confirm",
                    r#type: "password",
                    value: "{confirm}",
                    oninput: move |evt| confirm.set(evt.value()),
                }
                button { r#type: "submit", "Save changes" }
            }
        }
    }
}
