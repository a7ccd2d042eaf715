use leptos::prelude::*;

use crate::app::use_app;
use crate::components::ChatPanel;
use crate::sync::NavVariant;

#[component]
pub fn HomePage() -> impl IntoView {
    let nav = use_app().nav;

    view! {
        <div class="home">
            <section class="hero">
                <h1>"Your personal AI Tutor"</h1>
                <p>
                    "Ask questions, work through problems step by step, and keep your "
                    "conversation history across sessions."
                </p>
                <Show when=move || nav.with(|v| v.variant == NavVariant::Anonymous)>
                    <p class="hint">"Log in as a student or tutor to start chatting."</p>
                </Show>
            </section>
            <ChatPanel />
        </div>
    }
}
