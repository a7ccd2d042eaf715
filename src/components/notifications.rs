use leptos::prelude::*;

use crate::app::use_app;

#[component]
pub fn Notifications() -> impl IntoView {
    let items = use_app().notifier.items;

    view! {
        <div class="notifications" role="status" aria-live="polite">
            {move || {
                items
                    .get()
                    .into_iter()
                    .map(|notice| {
                        view! { <div class=notice.kind.class()>{notice.text}</div> }
                    })
                    .collect_view()
            }}
        </div>
    }
}
