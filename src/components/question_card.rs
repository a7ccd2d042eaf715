use leptos::prelude::*;

use crate::services::QuestionCard;

#[component]
pub fn QuestionCardView(
    card: QuestionCard,
    #[prop(into)] on_download: Callback<String>,
    #[prop(into)] on_delete: Callback<String>,
) -> impl IntoView {
    let download_id = card.id.clone();
    let delete_id = card.id.clone();
    let can_delete = card.can_delete;

    view! {
        <article class="question-card">
            <header class="question-header">
                <h4>{card.heading}</h4>
                <span class=format!("difficulty difficulty-{}", card.difficulty)>
                    {card.difficulty_label}
                </span>
            </header>
            <p class="question-text">{card.excerpt}</p>
            <p class="question-meta">{card.meta}</p>
            <footer class="question-actions">
                <span class="downloads">
                    <i class="fas fa-download"></i>
                    {format!(" {} downloads", card.downloads)}
                </span>
                <button
                    type="button"
                    class="btn btn-small"
                    on:click=move |_| on_download.run(download_id.clone())
                >
                    "Download"
                </button>
                <Show when=move || can_delete>
                    {
                        let delete_id = delete_id.clone();
                        view! {
                            <button
                                type="button"
                                class="btn btn-small btn-danger"
                                on:click=move |_| on_delete.run(delete_id.clone())
                            >
                                "Delete"
                            </button>
                        }
                    }
                </Show>
            </footer>
        </article>
    }
}
