use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;
use std::time::Duration;

use crate::api::{ApiClient, FetchTransport};
use crate::browser::LocalStorage;
use crate::components::{AuthModal, Header, Notifications};
use crate::config::ClientConfig;
use crate::models::UserRole;
use crate::pages::{AdminPage, CoursesPage, HomePage, QuestionsPage};
use crate::services::{AdminDashboard, AuthGateway, ChatService, CourseCatalog, QuestionBank};
use crate::session::SessionStore;
use crate::sync::{NavSink, NavView, UiSynchronizer};

impl NavSink for RwSignal<NavView> {
    fn apply(&self, view: &NavView) {
        // The signal is gone once the app unmounts.
        let _ = self.try_set(view.clone());
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    pub fn class(&self) -> &'static str {
        match self {
            NoticeKind::Success => "notification success",
            NoticeKind::Error => "notification error",
            NoticeKind::Info => "notification info",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub text: String,
}

/// Toasts that dismiss themselves after the configured duration.
#[derive(Clone, Copy)]
pub struct Notifier {
    pub items: RwSignal<Vec<Notice>>,
    next_id: StoredValue<u64>,
    duration_ms: u32,
}

impl Notifier {
    fn new(duration: Duration) -> Self {
        Self {
            items: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
            duration_ms: u32::try_from(duration.as_millis()).unwrap_or(u32::MAX),
        }
    }

    pub fn push(&self, kind: NoticeKind, text: impl Into<String>) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.items.update(|items| {
            items.push(Notice {
                id,
                kind,
                text: text.into(),
            })
        });

        let items = self.items;
        Timeout::new(self.duration_ms, move || {
            let _ = items.try_update(|items| items.retain(|n| n.id != id));
        })
        .forget();
    }

    pub fn success(&self, text: impl Into<String>) {
        self.push(NoticeKind::Success, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.push(NoticeKind::Error, text);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.push(NoticeKind::Info, text);
    }
}

/// Which auth dialog is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthDialog {
    Login(UserRole),
    Register,
}

/// Shared by every page through context.
#[derive(Clone)]
pub struct AppContext {
    pub config: ClientConfig,
    pub api: ApiClient<FetchTransport>,
    pub store: SessionStore,
    pub sync: UiSynchronizer,
    pub nav: RwSignal<NavView>,
    pub notifier: Notifier,
    pub dialog: RwSignal<Option<AuthDialog>>,
}

impl AppContext {
    fn new(config: ClientConfig) -> Self {
        let store = SessionStore::new(LocalStorage);
        let sync = UiSynchronizer::bind(&store);
        let nav = RwSignal::new(NavView::default());
        sync.mount(nav);

        Self {
            api: ApiClient::new(FetchTransport, &config),
            notifier: Notifier::new(config.notification_duration()),
            config,
            store,
            sync,
            nav,
            dialog: RwSignal::new(None),
        }
    }

    pub fn auth(&self) -> AuthGateway<FetchTransport> {
        AuthGateway::new(self.api.clone(), self.store.clone())
    }

    pub fn chat(&self) -> ChatService<FetchTransport> {
        ChatService::new(self.api.clone(), self.store.clone())
    }

    pub fn courses(&self) -> CourseCatalog<FetchTransport> {
        CourseCatalog::new(self.api.clone(), self.store.clone())
    }

    pub fn questions(&self) -> QuestionBank<FetchTransport> {
        QuestionBank::new(self.api.clone(), self.store.clone())
    }

    pub fn admin(&self) -> AdminDashboard<FetchTransport> {
        AdminDashboard::new(self.api.clone(), self.store.clone())
    }
}

pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}

#[component]
pub fn App() -> impl IntoView {
    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        log::warn!("Invalid client configuration, using defaults: {:#}", e);
        ClientConfig::default()
    });
    log::info!("Backend at {}", config.backend_url);

    let ctx = AppContext::new(config);
    provide_context(ctx.clone());

    // Startup: probe the backend, then catch up on a tutor's approval.
    spawn_local(async move {
        let auth = ctx.auth();
        if let Err(e) = auth.check_backend().await {
            ctx.notifier.error(e.user_message());
            return;
        }
        if let Err(e) = auth.refresh_approval_status().await {
            log::warn!("Approval status not refreshed: {}", e);
        }
    });

    view! {
        <Router>
            <div class="app">
                <Header />
                <Notifications />
                <AuthModal />
                <main class="container">
                    <Routes fallback=|| view! { <NotFound /> }>
                        <Route path=path!("/") view=HomePage />
                        <Route path=path!("/courses") view=CoursesPage />
                        <Route path=path!("/questions") view=QuestionsPage />
                        <Route path=path!("/admin") view=AdminPage />
                    </Routes>
                </main>
                <Footer />
            </div>
        </Router>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="not-found">
            <h1>"404"</h1>
            <h2>"Page Not Found"</h2>
            <a href="/" class="btn btn-primary">"Back to the tutor"</a>
        </div>
    }
}

#[component]
fn Footer() -> impl IntoView {
    view! {
        <footer class="footer">
            <p>"AI Tutor. Learn with courses, question banks and a patient chat tutor."</p>
        </footer>
    }
}
