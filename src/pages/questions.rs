use leptos::prelude::*;
use leptos::task::spawn_local;
use std::collections::BTreeSet;

use crate::app::use_app;
use crate::browser;
use crate::components::QuestionCardView;
use crate::models::Question;
use crate::services::{QuestionFile, QuestionFilter};

#[component]
pub fn QuestionsPage() -> impl IntoView {
    let ctx = use_app();
    let nav = ctx.nav;
    let notifier = ctx.notifier;
    let questions = RwSignal::new(Vec::<Question>::new());
    let loading = RwSignal::new(true);
    let load_error = RwSignal::new(None::<String>);
    let grade = RwSignal::new("all".to_string());
    let subject = RwSignal::new("all".to_string());
    let search = RwSignal::new(String::new());

    let bank = StoredValue::new(ctx.questions());

    {
        let bank = bank.get_value();
        spawn_local(async move {
            match bank.load().await {
                Ok(list) => questions.set(list),
                Err(e) => load_error.set(Some(e.user_message())),
            }
            loading.set(false);
        });
    }

    let deliver = move |result: crate::Result<QuestionFile>| match result {
        Ok(file) => match browser::save_file(&file) {
            Ok(()) => notifier.success(format!("Downloaded {}", file.file_name)),
            Err(e) => notifier.error(e.user_message()),
        },
        Err(e) => notifier.error(e.user_message()),
    };

    let on_download = Callback::new(move |question_id: String| {
        let bank = bank.get_value();
        spawn_local(async move {
            deliver(bank.download(&question_id).await);
        });
    });

    let download_bank = move |grade: String| {
        let bank = bank.get_value();
        spawn_local(async move {
            deliver(bank.question_bank(&grade).await);
        });
    };

    let on_delete = Callback::new(move |question_id: String| {
        let Some(question) =
            questions.with_untracked(|list| list.iter().find(|q| q.id == question_id).cloned())
        else {
            return;
        };
        if !browser::confirm("Delete this question? This cannot be undone.") {
            return;
        }
        let bank = bank.get_value();
        spawn_local(async move {
            match bank.delete(&question).await {
                Ok(refreshed) => {
                    notifier.success(refreshed.notice);
                    questions.set(refreshed.items);
                }
                Err(e) => notifier.error(e.user_message()),
            }
        });
    });

    let filter = Memo::new(move |_| QuestionFilter::new(&grade.get(), &subject.get(), &search.get()));
    let subjects = Memo::new(move |_| {
        questions.with(|list| {
            list.iter()
                .map(|q| q.subject.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect::<Vec<_>>()
        })
    });

    view! {
        <div class="questions-page">
            <header class="page-header">
                <h1>"Question Bank"</h1>
                <p>"Practice questions uploaded by our tutors, grouped by grade."</p>
            </header>

            <div class="filters">
                <select prop:value=move || grade.get() on:change=move |ev| grade.set(event_target_value(&ev))>
                    <option value="all">"All Grades"</option>
                    <option value="9th">"9th Grade"</option>
                    <option value="10th">"10th Grade"</option>
                    <option value="11th">"11th Grade"</option>
                    <option value="12th">"12th Grade"</option>
                </select>
                <select prop:value=move || subject.get() on:change=move |ev| subject.set(event_target_value(&ev))>
                    <option value="all">"All Subjects"</option>
                    {move || {
                        subjects
                            .get()
                            .into_iter()
                            .map(|s| view! { <option value=s.clone()>{s.clone()}</option> })
                            .collect_view()
                    }}
                </select>
                <input
                    type="search"
                    placeholder="Search questions..."
                    prop:value=move || search.get()
                    on:input=move |ev| search.set(event_target_value(&ev))
                />
            </div>

            {move || {
                if loading.get() {
                    return view! { <p class="loading">"Loading questions..."</p> }.into_any();
                }
                if let Some(message) = load_error.get() {
                    return view! { <p class="error">{message}</p> }.into_any();
                }
                nav.track();
                let sections = bank.with_value(|b| questions.with(|list| b.sections(list, &filter.get())));
                if sections.is_empty() {
                    return view! { <p class="empty">"No questions match your filters."</p> }.into_any();
                }
                sections
                    .into_iter()
                    .map(|section| {
                        let heading = section.heading();
                        let grade = section.grade.clone();
                        let download_bank = download_bank.clone();
                        view! {
                            <section class="grade-section">
                                <header class="grade-header">
                                    <h2>{heading}</h2>
                                    <button
                                        type="button"
                                        class="btn btn-secondary"
                                        on:click=move |_| download_bank(grade.clone())
                                    >
                                        <i class="fas fa-file-download"></i>
                                        " Download Question Bank"
                                    </button>
                                </header>
                                <div class="question-list">
                                    {section
                                        .cards
                                        .into_iter()
                                        .map(|card| {
                                            view! {
                                                <QuestionCardView
                                                    card=card
                                                    on_download=on_download
                                                    on_delete=on_delete
                                                />
                                            }
                                        })
                                        .collect_view()}
                                </div>
                            </section>
                        }
                    })
                    .collect_view()
                    .into_any()
            }}
        </div>
    }
}
