use leptos::prelude::*;
use leptos::task::spawn_local;
use std::collections::BTreeSet;

use crate::app::{use_app, AuthDialog};
use crate::browser;
use crate::components::CourseCardView;
use crate::models::{Course, UserRole};
use crate::services::{parse_rating, CatalogStats, CourseFilter};

fn distinct(courses: &[Course], field: impl Fn(&Course) -> &str) -> Vec<String> {
    courses
        .iter()
        .map(|c| field(c).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[component]
pub fn CoursesPage() -> impl IntoView {
    let ctx = use_app();
    let nav = ctx.nav;
    let notifier = ctx.notifier;
    let courses = RwSignal::new(Vec::<Course>::new());
    let loading = RwSignal::new(true);
    let load_error = RwSignal::new(None::<String>);
    let grade = RwSignal::new("all".to_string());
    let subject = RwSignal::new("all".to_string());

    let catalog = StoredValue::new(ctx.courses());

    let reload = move || {
        let catalog = catalog.get_value();
        loading.set(true);
        spawn_local(async move {
            match catalog.load().await {
                Ok(list) => {
                    courses.set(list);
                    load_error.set(None);
                }
                Err(e) => load_error.set(Some(e.user_message())),
            }
            loading.set(false);
        });
    };
    reload();

    // A tutor may have been approved since the app loaded.
    let auth = ctx.auth();
    spawn_local(async move {
        if let Err(e) = auth.refresh_approval_status().await {
            log::warn!("Approval status not refreshed: {}", e);
        }
    });

    let on_enroll = Callback::new(move |course_id: String| {
        let catalog = catalog.get_value();
        spawn_local(async move {
            match catalog.enroll(&course_id).await {
                Ok(refreshed) => {
                    notifier.success(refreshed.notice);
                    courses.set(refreshed.items);
                }
                Err(e) => notifier.error(e.user_message()),
            }
        });
    });

    let on_rate = Callback::new(move |(course_id, chapter, raw): (String, usize, String)| {
        let rating = match parse_rating(&raw) {
            Ok(r) => r,
            Err(e) => return notifier.error(e.user_message()),
        };
        let Some(course) = courses.with_untracked(|list| list.iter().find(|c| c.id == course_id).cloned())
        else {
            return notifier.error("Course not found");
        };
        let catalog = catalog.get_value();
        spawn_local(async move {
            match catalog.rate(&course, chapter, rating).await {
                Ok(refreshed) => {
                    notifier.success(refreshed.notice);
                    courses.set(refreshed.items);
                }
                Err(e) => notifier.error(e.user_message()),
            }
        });
    });

    let on_delete = Callback::new(move |course_id: String| {
        let Some(course) = courses.with_untracked(|list| list.iter().find(|c| c.id == course_id).cloned())
        else {
            return;
        };
        if !browser::confirm(&format!("Delete the course \"{}\"? This cannot be undone.", course.title)) {
            return;
        }
        let catalog = catalog.get_value();
        spawn_local(async move {
            match catalog.delete(&course).await {
                Ok(refreshed) => {
                    notifier.success(refreshed.notice);
                    courses.set(refreshed.items);
                }
                Err(e) => notifier.error(e.user_message()),
            }
        });
    });

    let dialog = ctx.dialog;
    let on_login = Callback::new(move |_: ()| dialog.set(Some(AuthDialog::Login(UserRole::Student))));

    let filter = Memo::new(move |_| CourseFilter::new(&grade.get(), &subject.get()));
    let stats = Memo::new(move |_| courses.with(|list| CatalogStats::from_courses(list)));

    view! {
        <div class="courses-page">
            <header class="page-header">
                <h1>"Courses"</h1>
                <div class="stats">
                    <span>{move || format!("{} courses", stats.get().total_courses)}</span>
                    <span>{move || format!("{} tutors", stats.get().total_tutors)}</span>
                    <span>{move || format!("{} videos", stats.get().total_videos)}</span>
                </div>
            </header>

            {move || {
                let upload = nav.with(|v| v.upload);
                upload.notice().map(|text| view! { <div class="notice warning">{text}</div> })
            }}

            {move || {
                nav.with(|v| v.upload.is_visible()).then(|| {
                    let uploads = catalog.with_value(|c| courses.with(|list| c.my_uploads(list)));
                    view! {
                        <section class="my-uploads">
                            <h2>"My Uploaded Courses"</h2>
                            {if uploads.is_empty() {
                                view! { <p class="empty">"You have not uploaded any courses yet."</p> }.into_any()
                            } else {
                                uploads
                                    .into_iter()
                                    .map(|u| {
                                        view! {
                                            <div class="upload-row">
                                                <strong>{u.title}</strong>
                                                {format!(
                                                    " {} | {} | {} chapters | {} videos | Uploaded {}",
                                                    u.subject, u.grade, u.chapters, u.videos, u.uploaded
                                                )}
                                            </div>
                                        }
                                    })
                                    .collect_view()
                                    .into_any()
                            }}
                        </section>
                    }
                })
            }}

            <div class="filters">
                <select prop:value=move || grade.get() on:change=move |ev| grade.set(event_target_value(&ev))>
                    <option value="all">"All Grades"</option>
                    {move || {
                        courses
                            .with(|list| distinct(list, |c| c.grade.as_str()))
                            .into_iter()
                            .map(|g| view! { <option value=g.clone()>{g.clone()}</option> })
                            .collect_view()
                    }}
                </select>
                <select prop:value=move || subject.get() on:change=move |ev| subject.set(event_target_value(&ev))>
                    <option value="all">"All Subjects"</option>
                    {move || {
                        courses
                            .with(|list| distinct(list, |c| c.subject.as_str()))
                            .into_iter()
                            .map(|s| view! { <option value=s.clone()>{s.clone()}</option> })
                            .collect_view()
                    }}
                </select>
            </div>

            {move || {
                if loading.get() {
                    return view! { <p class="loading">"Loading courses..."</p> }.into_any();
                }
                if let Some(message) = load_error.get() {
                    return view! { <p class="error">{message}</p> }.into_any();
                }
                // Track the session so enroll and delete controls follow logins.
                nav.track();
                let cards = catalog.with_value(|c| courses.with(|list| c.cards(list, &filter.get())));
                if cards.is_empty() {
                    return view! { <p class="empty">"No courses match the selected filters."</p> }.into_any();
                }
                view! {
                    <div class="course-grid">
                        {cards
                            .into_iter()
                            .map(|card| {
                                view! {
                                    <CourseCardView
                                        card=card
                                        on_enroll=on_enroll
                                        on_rate=on_rate
                                        on_delete=on_delete
                                        on_login=on_login
                                    />
                                }
                            })
                            .collect_view()}
                    </div>
                }
                .into_any()
            }}
        </div>
    }
}
