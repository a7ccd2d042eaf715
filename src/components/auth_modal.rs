//! Login and registration dialogs opened from the header menu.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

use crate::app::{use_app, AuthDialog};
use crate::error::{ClientError, Field};
use crate::models::{TutorProfile, UserRole};
use crate::services::{Landing, Registration};

/// Inline message for one form field; general errors show above the form.
fn error_for(error: RwSignal<Option<ClientError>>, field: Field) -> impl Fn() -> Option<String> {
    move || {
        error.with(|e| {
            e.as_ref()
                .filter(|e| e.field() == field)
                .map(ClientError::user_message)
        })
    }
}

#[component]
fn FieldError(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.with(Option::is_some)>
            <span class="field-error">{move || message.get().unwrap_or_default()}</span>
        </Show>
    }
}

#[component]
pub fn AuthModal() -> impl IntoView {
    let dialog = use_app().dialog;

    view! {
        {move || match dialog.get() {
            Some(AuthDialog::Login(role)) => view! { <LoginForm role=role /> }.into_any(),
            Some(AuthDialog::Register) => view! { <RegisterForm /> }.into_any(),
            None => ().into_any(),
        }}
    }
}

#[component]
fn ModalFrame(title: String, children: Children) -> impl IntoView {
    let dialog = use_app().dialog;

    view! {
        <div class="modal-backdrop">
            <div class="modal" role="dialog" aria-modal="true">
                <div class="modal-header">
                    <h2>{title}</h2>
                    <button
                        type="button"
                        class="modal-close"
                        aria-label="Close"
                        on:click=move |_| dialog.set(None)
                    >
                        "×"
                    </button>
                </div>
                {children()}
            </div>
        </div>
    }
}

#[component]
fn LoginForm(role: UserRole) -> impl IntoView {
    let ctx = use_app();
    let navigate = StoredValue::new_local(use_navigate());
    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(None::<ClientError>);
    let pending = RwSignal::new(false);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if pending.get_untracked() {
            return;
        }
        pending.set(true);
        error.set(None);

        let ctx = ctx.clone();
        spawn_local(async move {
            let result = ctx
                .auth()
                .login(&username.get_untracked(), &password.get_untracked(), role)
                .await;
            pending.set(false);
            match result {
                Ok(outcome) => {
                    ctx.dialog.set(None);
                    ctx.notifier.success(outcome.notice);
                    if outcome.landing == Landing::AdminDashboard {
                        navigate.with_value(|navigate| navigate("/admin", Default::default()));
                    }
                }
                Err(e) => {
                    if e.field() == Field::General {
                        ctx.notifier.error(e.user_message());
                    }
                    error.set(Some(e));
                }
            }
        });
    };

    view! {
        <ModalFrame title=format!("{} Login", role.title())>
            <form class="auth-form" on:submit=submit>
                <Show when=move || error.with(|e| e.as_ref().is_some_and(|e| e.field() == Field::General))>
                    <p class="form-error">{error_for(error, Field::General)}</p>
                </Show>

                <label for="login-username">"Username"</label>
                <input
                    id="login-username"
                    type="text"
                    autocomplete="username"
                    prop:value=move || username.get()
                    on:input=move |ev| username.set(event_target_value(&ev))
                />
                <FieldError message=Signal::derive(error_for(error, Field::Username)) />

                <label for="login-password">"Password"</label>
                <input
                    id="login-password"
                    type="password"
                    autocomplete="current-password"
                    prop:value=move || password.get()
                    on:input=move |ev| password.set(event_target_value(&ev))
                />
                <FieldError message=Signal::derive(error_for(error, Field::Password)) />

                <button type="submit" class="btn btn-primary" disabled=move || pending.get()>
                    {move || if pending.get() { "Logging in..." } else { "Login" }}
                </button>
            </form>
        </ModalFrame>
    }
}

#[component]
fn RegisterForm() -> impl IntoView {
    let ctx = use_app();
    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let role = RwSignal::new(String::new());
    let full_name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let qualification = RwSignal::new(String::new());
    let experience = RwSignal::new(String::new());
    let error = RwSignal::new(None::<ClientError>);
    let pending = RwSignal::new(false);

    let is_tutor = move || role.with(|r| r == UserRole::Tutor.as_str());

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if pending.get_untracked() {
            return;
        }

        let selected = UserRole::parse(&role.get_untracked());
        let tutor = (selected == Some(UserRole::Tutor)).then(|| TutorProfile {
            full_name: full_name.get_untracked(),
            email: email.get_untracked(),
            qualification: qualification.get_untracked(),
            years_of_experience: experience.get_untracked().trim().parse().ok(),
        });
        let registration = Registration {
            username: username.get_untracked(),
            password: password.get_untracked(),
            role: selected,
            tutor,
        };

        pending.set(true);
        error.set(None);
        let ctx = ctx.clone();
        spawn_local(async move {
            let result = ctx.auth().register(&registration).await;
            pending.set(false);
            match result {
                Ok(outcome) => {
                    ctx.notifier.success(outcome.notice());
                    // Registration does not log in; offer the matching login next.
                    ctx.dialog
                        .set(registration.role.map(AuthDialog::Login));
                }
                Err(e) => {
                    if e.field() == Field::General {
                        ctx.notifier.error(e.user_message());
                    }
                    error.set(Some(e));
                }
            }
        });
    };

    view! {
        <ModalFrame title="Register".to_string()>
            <form class="auth-form" on:submit=submit>
                <Show when=move || error.with(|e| e.as_ref().is_some_and(|e| e.field() == Field::General))>
                    <p class="form-error">{error_for(error, Field::General)}</p>
                </Show>

                <label for="reg-username">"Username"</label>
                <input
                    id="reg-username"
                    type="text"
                    prop:value=move || username.get()
                    on:input=move |ev| username.set(event_target_value(&ev))
                />
                <FieldError message=Signal::derive(error_for(error, Field::Username)) />

                <label for="reg-password">"Password"</label>
                <input
                    id="reg-password"
                    type="password"
                    autocomplete="new-password"
                    prop:value=move || password.get()
                    on:input=move |ev| password.set(event_target_value(&ev))
                />
                <FieldError message=Signal::derive(error_for(error, Field::Password)) />

                <label for="reg-role">"I am a"</label>
                <select
                    id="reg-role"
                    prop:value=move || role.get()
                    on:change=move |ev| role.set(event_target_value(&ev))
                >
                    <option value="">"Select user type"</option>
                    <option value="student">"Student"</option>
                    <option value="tutor">"Tutor"</option>
                </select>
                <FieldError message=Signal::derive(error_for(error, Field::UserType)) />

                <Show when=is_tutor>
                    <fieldset class="tutor-fields">
                        <legend>"Tutor application"</legend>

                        <label for="reg-full-name">"Full name"</label>
                        <input
                            id="reg-full-name"
                            type="text"
                            prop:value=move || full_name.get()
                            on:input=move |ev| full_name.set(event_target_value(&ev))
                        />
                        <FieldError message=Signal::derive(error_for(error, Field::FullName)) />

                        <label for="reg-email">"Email"</label>
                        <input
                            id="reg-email"
                            type="email"
                            prop:value=move || email.get()
                            on:input=move |ev| email.set(event_target_value(&ev))
                        />
                        <FieldError message=Signal::derive(error_for(error, Field::Email)) />

                        <label for="reg-qualification">"Qualification"</label>
                        <input
                            id="reg-qualification"
                            type="text"
                            prop:value=move || qualification.get()
                            on:input=move |ev| qualification.set(event_target_value(&ev))
                        />
                        <FieldError message=Signal::derive(error_for(error, Field::Qualification)) />

                        <label for="reg-experience">"Years of experience"</label>
                        <input
                            id="reg-experience"
                            type="number"
                            min="0"
                            prop:value=move || experience.get()
                            on:input=move |ev| experience.set(event_target_value(&ev))
                        />
                        <FieldError message=Signal::derive(error_for(error, Field::Experience)) />
                    </fieldset>
                </Show>

                <button type="submit" class="btn btn-primary" disabled=move || pending.get()>
                    {move || if pending.get() { "Registering..." } else { "Register" }}
                </button>
            </form>
        </ModalFrame>
    }
}
