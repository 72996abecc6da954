use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use quiz_core::model::{Material, MaterialDraft, MaterialId, parse_tags};
use services::{MaterialFilter, all_tags};

use crate::context::{AppContext, CurrentUser};
use crate::routes::Route;
use crate::views::{ErrorNotice, ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    MaterialCardVm, format_date, map_material_card, markdown_to_html, tags_field_value,
};

#[component]
pub fn MaterialsView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut current_user = use_context::<CurrentUser>();
    let mut search = use_signal(String::new);
    let mut tag = use_signal(|| None::<String>);
    let mut action_error = use_signal(|| None::<ViewError>);

    let mut resource = {
        let ctx = ctx.clone();
        use_resource(move || {
            let materials = ctx.materials();
            let auth = ctx.auth();
            async move {
                materials.list().await.map_err(|err| {
                    current_user.sync(&auth);
                    ViewError::from(err)
                })
            }
        })
    };

    let state = view_state_from_resource(&resource);

    let on_delete = use_callback(move |id: MaterialId| {
        let materials = ctx.materials();
        spawn(async move {
            match materials.delete(&id).await {
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
                h2 { "Study materials" }
                Link { class: "button", to: Route::MaterialNew {}, "New material" }
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
                ViewState::Ready(materials) => {
                    let tags = all_tags(&materials);
                    let filter = MaterialFilter {
                        search: search(),
                        tag: tag(),
                    };
                    let cards: Vec<MaterialCardVm> = filter
                        .apply(&materials)
                        .into_iter()
                        .map(map_material_card)
                        .collect();
                    rsx! {
                        div { class: "filters",
                            input {
                                r#type: "search",
                                placeholder: "Search materials",
                                value: "{search}",
                                oninput: move |evt| search.set(evt.value()),
                            }
                            select {
                                onchange: move |evt| {
                                    let value = evt.value();
                                    tag.set((!value.is_empty()).then_some(value));
                                },
                                option { value: "", selected: tag().is_none(), "All tags" }
                                for name in tags {
                                    option {
                                        value: "{name}",
                                        selected: tag().as_deref() == Some(name.as_str()),
                                        "{name}"
                                    }
                                }
                            }
                        }
                        if materials.is_empty() {
                            p { class: "muted", "You have not added any study materials yet." }
                        } else if cards.is_empty() {
                            p { class: "muted", "No materials match your filters." }
                        } else {
                            ul { class: "card-list",
                                for card in cards {
                                    MaterialCard { key: "{card.id}", card, on_delete }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn MaterialCard(card: MaterialCardVm, on_delete: EventHandler<MaterialId>) -> Element {
    let id = card.id.clone();
    rsx! {
        li { class: "card",
            Link { to: Route::MaterialDetail { id: card.id.clone() },
                h3 { "{card.title}" }
            }
            p { "{card.excerpt}" }
            div { class: "tags",
                for tag in card.tags {
                    span { class: "tag", "{tag}" }
                }
            }
            div { class: "card-footer",
                span { class: "muted", "{card.changed_str}" }
                Link { to: Route::MaterialEdit { id: card.id.clone() }, "Edit" }
                Link {
                    to: Route::QuizNew { material_id: card.id.to_string() },
                    "Generate quiz"
                }
                button {
                    class: "link-button danger",
                    onclick: move |_| on_delete.call(id.clone()),
                    "Delete"
                }
            }
        }
    }
}

#[component]
pub fn MaterialDetailView(id: MaterialId) -> Element {
    let ctx = use_context::<AppContext>();
    let mut current_user = use_context::<CurrentUser>();
    let navigator = use_navigator();
    let mut action_error = use_signal(|| None::<ViewError>);

    let resource = {
        let ctx = ctx.clone();
        let id = id.clone();
        use_resource(move || {
            let materials = ctx.materials();
            let auth = ctx.auth();
            let id = id.clone();
            async move {
                materials.get(&id).await.map_err(|err| {
                    current_user.sync(&auth);
                    ViewError::from(err)
                })
            }
        })
    };

    let state = view_state_from_resource(&resource);

    let on_delete = {
        let id = id.clone();
        move |_| {
            let materials = ctx.materials();
            let id = id.clone();
            spawn(async move {
                match materials.delete(&id).await {
                    Ok(()) => {
                        navigator.replace(Route::Materials {});
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
                    Link { to: Route::Materials {}, "Back to materials" }
                },
                ViewState::Ready(material) => rsx! {
                    MaterialDetails { material }
                    div { class: "actions",
                        Link { class: "button", to: Route::MaterialEdit { id: id.clone() }, "Edit" }
                        Link {
                            class: "button",
                            to: Route::QuizNew { material_id: id.to_string() },
                            "Generate quiz"
                        }
                        button { class: "danger", onclick: on_delete.clone(), "Delete" }
                    }
                    if let Some(error) = action_error() {
                        ErrorNotice { error }
                    }
                },
            }
        }
    }
}

#[component]
fn MaterialDetails(material: Material) -> Element {
    let html = markdown_to_html(&material.content);
    let created = format_date(material.created_at);
    let updated = material.updated_at.map(format_date);
    rsx! {
        article { class: "material",
            h2 { "{material.title}" }
            p { class: "muted",
                "Created {created}"
                if let Some(updated) = updated {
                    " · Updated {updated}"
                }
            }
            div { class: "tags",
                for tag in material.tags.iter() {
                    span { class: "tag", "{tag}" }
                }
            }
            div { class: "markdown", dangerous_inner_html: "{html}" }
        }
    }
}

#[component]
pub fn MaterialNewView() -> Element {
    rsx! {
        div { class: "page",
            h2 { "New material" }
            MaterialForm { editing: None, initial: MaterialDraft::default() }
        }
    }
}

#[component]
pub fn MaterialEditView(id: MaterialId) -> Element {
    let ctx = use_context::<AppContext>();
    let resource = {
        let id = id.clone();
        use_resource(move || {
            let materials = ctx.materials();
            let id = id.clone();
            async move { materials.get(&id).await.map_err(ViewError::from) }
        })
    };
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "Edit material" }
            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(error) => rsx! {
                    ErrorNotice { error }
                },
                ViewState::Ready(material) => rsx! {
                    MaterialForm {
                        editing: Some(id.clone()),
                        initial: MaterialDraft::from_material(&material),
                    }
                },
            }
        }
    }
}

/// Create/edit form. `editing` is the material being updated, `None` for a new one.
#[component]
fn MaterialForm(editing: Option<MaterialId>, initial: MaterialDraft) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut title = use_signal(|| initial.title.clone());
    let mut content = use_signal(|| initial.content.clone());
    let mut tags = use_signal(|| tags_field_value(&initial.tags));
    let mut error = use_signal(|| None::<ViewError>);
    let mut saving = use_signal(|| false);

    let cancel_to = editing
        .clone()
        .map_or(Route::Materials {}, |id| Route::MaterialDetail { id });

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if saving() {
            return;
        }
        let materials = ctx.materials();
        let editing = editing.clone();
        let draft = MaterialDraft {
            title: title.peek().clone(),
            content: content.peek().clone(),
            tags: parse_tags(&tags.peek()),
        };
        spawn(async move {
            saving.set(true);
            let saved = match editing {
                Some(id) => materials.update(&id, draft).await.map(|()| id),
                None => materials.create(draft).await,
            };
            saving.set(false);
            match saved {
                Ok(id) => {
                    navigator.replace(Route::MaterialDetail { id });
                }
                Err(err) => error.set(Some(err.into())),
            }
        });
    };

    rsx! {
        form { class: "material-form", onsubmit: on_submit,
            if let Some(error) = error() {
                ErrorNotice { error }
            }
            label { r#for: "material-title", "Title" }
            input {
                id: "material-title",
                value: "{title}",
                oninput: move |evt| title.set(evt.value()),
            }
            label { r#for: "material-content", "Content (markdown)" }
            textarea {
                id: "material-content",
                rows: "16",
                value: "{content}",
                oninput: move |evt| content.set(evt.value()),
            }
            label { r#for: "material-tags", "Tags (comma separated)" }
            input {
                id: "material-tags",
                value: "{tags}",
                oninput: move |evt| tags.set(evt.value()),
            }
            div { class: "actions",
                button { r#type: "submit", disabled: saving(),
                    if saving() { "Saving..." } else { "Save" }
                }
                Link { to: cancel_to, "Cancel" }
            }
        }
    }
}
