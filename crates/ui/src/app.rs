use dioxus::prelude::*;
use dioxus_router::Router;

use crate::context::{AppContext, CurrentUser};
use crate::routes::Route;

#[component]
pub fn App() -> Element {
    let ctx = use_context::<AppContext>();
    use_context_provider(|| CurrentUser::new(ctx.auth().current_user()));

    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }

        // Per-route headings live inside the content pane.
        document::Title { "Quiz Planner" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{errors:?}" }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
