use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::app::{use_app, AuthDialog};
use crate::components::chat_message::{ChatBubble, ThinkingIndicator};
use crate::models::{ChatMessage, UserRole};

/// Tutor transcript plus prompt box. Reloads the history whenever the
/// logged-in user changes.
#[component]
pub fn ChatPanel() -> impl IntoView {
    let ctx = use_app();
    let messages = RwSignal::new(Vec::<ChatMessage>::new());
    let thinking = RwSignal::new(false);
    let input = RwSignal::new(String::new());

    let nav = ctx.nav;
    let user_label = Memo::new(move |_| nav.with(|v| v.label.clone()));
    let loader = ctx.clone();
    Effect::new(move |_| {
        user_label.track();
        let chat = loader.chat();
        spawn_local(async move {
            let transcript = chat.load().await;
            let _ = messages.try_set(transcript);
        });
    });

    let send = move || {
        let prompt = input.get_untracked();
        if prompt.trim().is_empty() || thinking.get_untracked() {
            return;
        }

        if !ctx.store.get().is_authenticated() {
            ctx.notifier.error("Please log in to chat with the AI Tutor.");
            ctx.dialog.set(Some(AuthDialog::Login(UserRole::Student)));
            return;
        }

        let chat = ctx.chat();
        let notifier = ctx.notifier;
        input.set(String::new());
        thinking.set(true);
        messages.update(|m| m.push(ChatMessage::user(prompt.trim())));

        spawn_local(async move {
            let result = chat.send(&prompt).await;
            thinking.set(false);
            match result {
                Ok(Some(exchange)) => messages.update(|m| m.push(exchange.reply)),
                Ok(None) => {}
                Err(e) => notifier.error(e.user_message()),
            }
        });
    };
    let send_on_key = send.clone();

    view! {
        <section class="chat-panel">
            <div class="chat-messages">
                {move || {
                    messages
                        .get()
                        .into_iter()
                        .map(|message| view! { <ChatBubble message=message /> })
                        .collect_view()
                }}
                <Show when=move || thinking.get()>
                    <ThinkingIndicator />
                </Show>
            </div>

            <div class="chat-input">
                <textarea
                    placeholder="Ask the AI Tutor anything..."
                    rows="2"
                    prop:value=move || input.get()
                    on:input=move |ev| input.set(event_target_value(&ev))
                    on:keydown=move |ev| {
                        if ev.key() == "Enter" && !ev.shift_key() {
                            ev.prevent_default();
                            send_on_key();
                        }
                    }
                ></textarea>
                <button
                    type="button"
                    class="btn btn-primary"
                    aria-label="Send message"
                    disabled=move || thinking.get()
                    on:click=move |_| send()
                >
                    <i class="fas fa-paper-plane"></i>
                </button>
            </div>
        </section>
    }
}
