use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::app::{use_app, AuthDialog};
use crate::sync::{NavAction, NavVariant};

#[component]
pub fn Header() -> impl IntoView {
    let ctx = use_app();
    let nav = ctx.nav;
    let (open, set_open) = signal(false);
    let navigate = StoredValue::new_local(use_navigate());
    let go = move |path: &str| navigate.with_value(|navigate| navigate(path, Default::default()));

    let run = StoredValue::new(move |action: NavAction| {
        set_open.set(false);
        match action {
            NavAction::Login(role) => ctx.dialog.set(Some(AuthDialog::Login(role))),
            NavAction::Register => ctx.dialog.set(Some(AuthDialog::Register)),
            NavAction::AdminDashboard => go("/admin"),
            NavAction::Logout => match ctx.auth().logout() {
                Ok(notice) => {
                    ctx.notifier.info(notice);
                    go("/");
                }
                Err(e) => ctx.notifier.error(e.user_message()),
            },
        }
    });

    view! {
        <header class="header">
            <a href="/" class="brand" aria-label="AI Tutor home">
                <i class="fas fa-graduation-cap"></i>
                <span>"AI Tutor"</span>
            </a>

            <nav class="nav" aria-label="Main navigation">
                <a href="/" class="nav-link">"Tutor"</a>
                <a href="/courses" class="nav-link">"Courses"</a>
                <a href="/questions" class="nav-link">"Question Bank"</a>
                <Show when=move || nav.with(|v| v.variant == NavVariant::Admin)>
                    <a href="/admin" class="nav-link">"Admin"</a>
                </Show>

                <div class="dropdown">
                    <button
                        type="button"
                        class="dropdown-toggle"
                        aria-haspopup="true"
                        aria-expanded=move || open.get().to_string()
                        on:click=move |_| set_open.update(|o| *o = !*o)
                    >
                        <i class=move || {
                            if nav.with(|v| v.variant == NavVariant::Anonymous) {
                                "fas fa-user"
                            } else {
                                "fas fa-user-check"
                            }
                        }></i>
                        <span>{move || nav.with(|v| v.label.clone())}</span>
                    </button>
                    <Show when=move || open.get()>
                        <ul class="dropdown-menu">
                            {move || {
                                nav.get()
                                    .entries
                                    .into_iter()
                                    .map(|action| {
                                        view! {
                                            <li>
                                                <button type="button" on:click=move |_| run.with_value(|run| run(action))>
                                                    <i class=format!("fas {}", action.icon())></i>
                                                    {action.label()}
                                                </button>
                                            </li>
                                        }
                                    })
                                    .collect_view()
                            }}
                        </ul>
                    </Show>
                </div>
            </nav>
        </header>
    }
}
