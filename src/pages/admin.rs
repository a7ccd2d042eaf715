//! Admin dashboard: stats, system status, users and tutor applications.
//! Refreshes on a timer while mounted.

use gloo_timers::callback::Interval;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use send_wrapper::SendWrapper;

use crate::app::use_app;
use crate::browser;
use crate::components::{
    role_matches, CourseDetailsPanel, TutorApplicationsView, UserDetailsPanel, UserTable,
};
use crate::models::UserRole;
use crate::services::{AdminSnapshot, AdminStats, CourseDetails, TutorApplications, UserDetails};

#[component]
pub fn AdminPage() -> impl IntoView {
    let ctx = use_app();
    let nav = ctx.nav;
    let notifier = ctx.notifier;
    let admin = ctx.admin();
    let navigate = use_navigate();

    let gate = admin.clone();
    Effect::new(move |_| {
        nav.track();
        if let Err(e) = gate.verify_access() {
            notifier.error(e.user_message());
            navigate("/", Default::default());
        }
    });

    view! {
        {move || {
            // Follows session changes.
            nav.track();
            match admin.verify_access() {
                Ok(user) => view! { <Dashboard admin_name=user.username /> }.into_any(),
                Err(e) => view! {
                    <div class="access-denied">
                        <i class="fas fa-lock"></i>
                        <h2>"Access denied"</h2>
                        <p>{e.user_message()}</p>
                    </div>
                }
                .into_any(),
            }
        }}
    }
}

#[component]
fn Dashboard(admin_name: String) -> impl IntoView {
    let ctx = use_app();
    let notifier = ctx.notifier;
    let dashboard = StoredValue::new(ctx.admin());
    let snapshot = RwSignal::new(None::<AdminSnapshot>);
    let applications = RwSignal::new(TutorApplications::default());
    let user_details = RwSignal::new(None::<UserDetails>);
    let course_details = RwSignal::new(None::<CourseDetails>);
    let role_filter = RwSignal::new(None::<UserRole>);

    let refresh = move || {
        let dashboard = dashboard.get_value();
        spawn_local(async move {
            match dashboard.refresh().await {
                Ok(s) => {
                    let _ = snapshot.try_set(Some(s));
                }
                Err(e) => notifier.error(e.user_message()),
            }
            match dashboard.tutor_applications().await {
                Ok(a) => {
                    let _ = applications.try_set(a);
                }
                Err(e) => log::warn!("Tutor applications unavailable: {}", e),
            }
        });
    };
    refresh();

    let period = ctx.config.admin_refresh_interval().as_millis();
    let interval = SendWrapper::new(Interval::new(
        u32::try_from(period).unwrap_or(u32::MAX),
        refresh,
    ));
    on_cleanup(move || drop(interval));

    let on_view = Callback::new(move |username: String| {
        let dashboard = dashboard.get_value();
        spawn_local(async move {
            match dashboard.user_details(&username).await {
                Ok(details) => {
                    course_details.set(None);
                    user_details.set(Some(details));
                }
                Err(e) => notifier.error(e.user_message()),
            }
        });
    });

    let on_course = Callback::new(move |course_id: String| {
        let dashboard = dashboard.get_value();
        spawn_local(async move {
            match dashboard.course_details(&course_id).await {
                Ok(details) => course_details.set(Some(details)),
                Err(e) => notifier.error(e.user_message()),
            }
        });
    });

    let on_delete = Callback::new(move |username: String| {
        if !browser::confirm(&format!(
            "Delete user {}? Their chats, courses and questions will be removed too.",
            username
        )) {
            return;
        }
        let dashboard = dashboard.get_value();
        spawn_local(async move {
            match dashboard.delete_user(&username).await {
                Ok(refreshed) => {
                    notifier.success(refreshed.notice);
                    user_details.set(None);
                    snapshot.update(|s| {
                        if let Some(s) = s {
                            s.stats = AdminStats::from_users(&refreshed.items);
                            s.users = refreshed.items;
                        }
                    });
                }
                Err(e) => notifier.error(e.user_message()),
            }
        });
    });

    let decide = move |username: String, approve: bool| {
        let dashboard = dashboard.get_value();
        spawn_local(async move {
            let result = if approve {
                dashboard.approve(&username).await
            } else {
                dashboard.reject(&username).await
            };
            match result {
                Ok(update) => {
                    notifier.success(update.notice);
                    applications.set(update.applications);
                }
                Err(e) => notifier.error(e.user_message()),
            }
        });
    };
    let on_approve = Callback::new(move |username: String| decide(username, true));
    let on_reject = Callback::new(move |username: String| decide(username, false));

    let close_user = Callback::new(move |_: ()| user_details.set(None));
    let close_course = Callback::new(move |_: ()| course_details.set(None));

    view! {
        <div class="admin-page">
            <header class="page-header">
                <h1>"Admin Dashboard"</h1>
                <button type="button" class="btn btn-secondary" on:click=move |_| refresh()>
                    <i class="fas fa-sync"></i>
                    " Refresh"
                </button>
            </header>

            {move || match snapshot.get() {
                None => view! { <p class="loading">"Loading dashboard..."</p> }.into_any(),
                Some(s) => view! {
                    <section class="stat-cards">
                        <div class="stat-card"><span>"Total users"</span><strong>{s.stats.total_users}</strong></div>
                        <div class="stat-card"><span>"Students"</span><strong>{s.stats.students}</strong></div>
                        <div class="stat-card"><span>"Tutors"</span><strong>{s.stats.tutors}</strong></div>
                        <div class="stat-card"><span>"Admins"</span><strong>{s.stats.admins}</strong></div>
                        <div class="stat-card">
                            <span>"Chats"</span>
                            <strong>{s.chat_count.map(|c| c.to_string()).unwrap_or_else(|| "N/A".to_string())}</strong>
                        </div>
                    </section>
                    <section class="system-status">
                        <span class=if s.status.server_online { "status online" } else { "status offline" }>
                            {if s.status.server_online { "Server: Online" } else { "Server: Offline" }}
                        </span>
                        <span class=format!("status db-{}", s.status.database.label().to_lowercase())>
                            {format!("Database: {}", s.status.database.label())}
                        </span>
                        <span class="checked">
                            {format!("Last checked {}", s.status.checked_at.format("%H:%M:%S UTC"))}
                        </span>
                    </section>
                }
                .into_any(),
            }}

            <section class="users">
                <header>
                    <h2>"Users"</h2>
                    <select on:change=move |ev| role_filter.set(UserRole::parse(&event_target_value(&ev)))>
                        <option value="all">"All roles"</option>
                        <option value="student">"Students"</option>
                        <option value="tutor">"Tutors"</option>
                        <option value="admin">"Admins"</option>
                    </select>
                </header>
                {
                    let admin_name = admin_name.clone();
                    move || {
                        let role = role_filter.get();
                        let users = snapshot.with(|s| {
                            s.as_ref()
                                .map(|s| s.users.iter().filter(|u| role_matches(u, role)).cloned().collect())
                                .unwrap_or_default()
                        });
                        view! {
                            <UserTable
                                users=users
                                admin=admin_name.clone()
                                on_view=on_view
                                on_delete=on_delete
                            />
                        }
                    }
                }
            </section>

            {move || {
                user_details.get().map(|details| {
                    view! { <UserDetailsPanel details=details on_course=on_course on_close=close_user /> }
                })
            }}
            {move || {
                course_details.get().map(|details| {
                    view! { <CourseDetailsPanel details=details on_close=close_course /> }
                })
            }}

            <section class="applications">
                <h2>"Tutor Applications"</h2>
                {move || {
                    view! {
                        <TutorApplicationsView
                            applications=applications.get()
                            on_approve=on_approve
                            on_reject=on_reject
                        />
                    }
                }}
            </section>
        </div>
    }
}
