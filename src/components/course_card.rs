use leptos::prelude::*;

use crate::services::{ChapterCard, CourseCard, EnrollAction};

#[component]
pub fn CourseCardView(
    card: CourseCard,
    /// Course id
    #[prop(into)]
    on_enroll: Callback<String>,
    /// Course id, zero-based chapter, raw rating text
    #[prop(into)]
    on_rate: Callback<(String, usize, String)>,
    /// Course id
    #[prop(into)]
    on_delete: Callback<String>,
    #[prop(into)] on_login: Callback<()>,
) -> impl IntoView {
    let id = card.id.clone();
    let delete_id = card.id.clone();
    let more = card.more_chapters;

    let enroll = match card.enroll {
        EnrollAction::LoginToEnroll => view! {
            <button type="button" class="btn btn-secondary" on:click=move |_| on_login.run(())>
                "Login to Enroll"
            </button>
        }
        .into_any(),
        EnrollAction::Enroll => view! {
            <button type="button" class="btn btn-primary" on:click=move |_| on_enroll.run(id.clone())>
                "Enroll"
            </button>
        }
        .into_any(),
        EnrollAction::AlreadyEnrolled => view! {
            <span class="badge badge-success">"Enrolled"</span>
        }
        .into_any(),
    };

    view! {
        <article class="course-card">
            <header class="course-header">
                <h3>{card.title}</h3>
                <span class="course-meta">{format!("{} | {} | By: {}", card.subject, card.grade, card.tutor)}</span>
            </header>
            <p class="course-description">{card.description}</p>
            <div class="course-rating">
                <span class="stars">{card.stars}</span>
                <span class="rating-count">{format!("({} ratings)", card.rating_count)}</span>
            </div>

            <div class="course-chapters">
                <h4>{format!("Chapters ({})", card.chapter_count)}</h4>
                {card
                    .chapters
                    .into_iter()
                    .map(|chapter| {
                        view! { <ChapterRow course_id=card.id.clone() chapter=chapter on_rate=on_rate /> }
                    })
                    .collect_view()}
                <Show when=move || { more > 0 }>
                    <p class="more">{format!("+ {} more chapters", more)}</p>
                </Show>
            </div>

            <footer class="course-actions">
                {enroll}
                <Show when=move || card.can_delete>
                    {
                        let delete_id = delete_id.clone();
                        view! {
                            <button
                                type="button"
                                class="btn btn-danger"
                                on:click=move |_| on_delete.run(delete_id.clone())
                            >
                                <i class="fas fa-trash"></i>
                                " Delete"
                            </button>
                        }
                    }
                </Show>
            </footer>
        </article>
    }
}

#[component]
fn ChapterRow(course_id: String, chapter: ChapterCard, on_rate: Callback<(String, usize, String)>) -> impl IntoView {
    let rating = RwSignal::new("5".to_string());
    let index = chapter.index;
    let heading = chapter.heading();
    let more_videos = chapter.more_videos;

    view! {
        <div class="chapter">
            <div class="chapter-title">
                <span>{heading}</span>
                <span class="chapter-rating">{format!("{:.1}★", chapter.average)}</span>
            </div>
            <ul class="chapter-videos">
                {chapter
                    .videos
                    .into_iter()
                    .map(|label| view! { <li><i class="fas fa-play-circle"></i>" "{label}</li> })
                    .collect_view()}
                <Show when=move || { more_videos > 0 }>
                    <li class="more">{format!("+ {} more videos", more_videos)}</li>
                </Show>
            </ul>
            <Show when=move || chapter.can_rate>
                {
                    let course_id = course_id.clone();
                    view! {
                        <div class="rate-chapter">
                            <select
                                prop:value=move || rating.get()
                                on:change=move |ev| rating.set(event_target_value(&ev))
                            >
                                {(1..=5)
                                    .rev()
                                    .map(|n| view! { <option value=n.to_string()>{format!("{}★", n)}</option> })
                                    .collect_view()}
                            </select>
                            <button
                                type="button"
                                class="btn btn-small"
                                on:click=move |_| on_rate.run((course_id.clone(), index, rating.get_untracked()))
                            >
                                "Rate"
                            </button>
                        </div>
                    }
                }
            </Show>
        </div>
    }
}
