use leptos::prelude::*;

use crate::models::ChatMessage;
use crate::services::{format_message, Segment};

/// One bubble of the transcript.
#[component]
pub fn ChatBubble(message: ChatMessage) -> impl IntoView {
    let is_user = message.is_user();
    let paragraphs = format_message(&message);

    view! {
        <div class=if is_user { "message user-message" } else { "message bot-message" }>
            <div class="message-avatar">
                <i class=if is_user { "fas fa-user" } else { "fas fa-robot" }></i>
            </div>
            <div class="message-content">
                {paragraphs
                    .into_iter()
                    .map(|paragraph| {
                        view! {
                            <p>
                                {paragraph
                                    .into_iter()
                                    .map(|segment| match segment {
                                        Segment::Text(text) => view! { <span>{text}</span> }.into_any(),
                                        Segment::Strong(text) => view! { <strong>{text}</strong> }.into_any(),
                                        Segment::Emphasis(text) => view! { <em>{text}</em> }.into_any(),
                                        Segment::LineBreak => view! { <br /> }.into_any(),
                                    })
                                    .collect_view()}
                            </p>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}

/// Shown while the tutor is answering.
#[component]
pub fn ThinkingIndicator() -> impl IntoView {
    view! {
        <div class="message bot-message thinking">
            <div class="message-avatar">
                <i class="fas fa-robot"></i>
            </div>
            <div class="message-content">
                <p>{crate::services::THINKING}</p>
            </div>
        </div>
    }
}
