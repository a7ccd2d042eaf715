//! Navigation state derived from the session, pushed to whatever views are mounted.

use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::models::{ApprovalStatus, UserRole};
use crate::session::{ListenerId, Session, SessionStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavVariant {
    Anonymous,
    Member,
    Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    Login(UserRole),
    Register,
    AdminDashboard,
    Logout,
}

impl NavAction {
    pub fn label(&self) -> String {
        match self {
            NavAction::Login(role) => format!("{} Login", role.title()),
            NavAction::Register => "Register".to_string(),
            NavAction::AdminDashboard => "Admin Dashboard".to_string(),
            NavAction::Logout => "Logout".to_string(),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NavAction::Login(UserRole::Student) => "fa-user-graduate",
            NavAction::Login(UserRole::Tutor) => "fa-chalkboard-teacher",
            NavAction::Login(UserRole::Admin) | NavAction::AdminDashboard => "fa-user-shield",
            NavAction::Register => "fa-user-plus",
            NavAction::Logout => "fa-sign-out-alt",
        }
    }
}

/// Whether a tutor may see the upload controls, and what to tell them if not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadAffordance {
    Hidden,
    Visible,
    AwaitingApproval,
    Rejected,
}

impl UploadAffordance {
    pub fn for_session(session: &Session) -> Self {
        match session.user() {
            Some(user) if user.role == UserRole::Tutor => match user.approval {
                Some(ApprovalStatus::Pending) => UploadAffordance::AwaitingApproval,
                Some(ApprovalStatus::Rejected) => UploadAffordance::Rejected,
                Some(ApprovalStatus::Approved) | None => UploadAffordance::Visible,
            },
            _ => UploadAffordance::Hidden,
        }
    }

    pub fn is_visible(&self) -> bool {
        *self == UploadAffordance::Visible
    }

    pub fn notice(&self) -> Option<&'static str> {
        match self {
            UploadAffordance::AwaitingApproval => Some(
                "Your tutor application is awaiting admin approval. Uploads unlock once you are approved.",
            ),
            UploadAffordance::Rejected => Some(
                "Your tutor application was rejected. Please contact an administrator.",
            ),
            UploadAffordance::Hidden | UploadAffordance::Visible => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavView {
    pub variant: NavVariant,
    /// Text of the header status link: "Login" or the username
    pub label: String,
    pub entries: Vec<NavAction>,
    pub upload: UploadAffordance,
}

impl Default for NavView {
    fn default() -> Self {
        nav_view(&Session::Anonymous)
    }
}

pub fn nav_view(session: &Session) -> NavView {
    let upload = UploadAffordance::for_session(session);
    match session.user() {
        None => NavView {
            variant: NavVariant::Anonymous,
            label: "Login".to_string(),
            entries: vec![
                NavAction::Login(UserRole::Student),
                NavAction::Login(UserRole::Tutor),
                NavAction::Login(UserRole::Admin),
                NavAction::Register,
            ],
            upload,
        },
        Some(user) if user.role == UserRole::Admin => NavView {
            variant: NavVariant::Admin,
            label: user.username.clone(),
            entries: vec![NavAction::AdminDashboard, NavAction::Logout],
            upload,
        },
        Some(user) => NavView {
            variant: NavVariant::Member,
            label: user.username.clone(),
            entries: vec![NavAction::Logout],
            upload,
        },
    }
}

/// Anything that renders a `NavView`.
pub trait NavSink: Send + Sync {
    fn apply(&self, view: &NavView);
}

pub type SinkId = u64;

struct Inner {
    store: SessionStore,
    sinks: Mutex<Vec<(SinkId, Arc<dyn NavSink>)>>,
    last: Mutex<Option<NavView>>,
    next_id: AtomicU64,
    listener: Mutex<Option<ListenerId>>,
}

#[derive(Clone)]
pub struct UiSynchronizer {
    inner: Arc<Inner>,
}

impl UiSynchronizer {
    /// Follow `store`: every session change re-derives the view.
    pub fn bind(store: &SessionStore) -> Self {
        let synchronizer = Self {
            inner: Arc::new(Inner {
                store: store.clone(),
                sinks: Mutex::new(Vec::new()),
                last: Mutex::new(None),
                next_id: AtomicU64::new(1),
                listener: Mutex::new(None),
            }),
        };

        let weak: Weak<Inner> = Arc::downgrade(&synchronizer.inner);
        let id = store.subscribe(move |session| {
            if let Some(inner) = weak.upgrade() {
                UiSynchronizer { inner }.sync(session);
            }
        });
        *synchronizer.inner.listener.lock() = Some(id);

        synchronizer
    }

    /// Attach a view; it immediately receives the current state.
    pub fn mount(&self, sink: impl NavSink + 'static) -> SinkId {
        let sink: Arc<dyn NavSink> = Arc::new(sink);
        let view = nav_view(&self.inner.store.get());
        sink.apply(&view);

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.sinks.lock().push((id, sink));
        *self.inner.last.lock() = Some(view);
        id
    }

    pub fn unmount(&self, id: SinkId) -> bool {
        let mut sinks = self.inner.sinks.lock();
        let before = sinks.len();
        sinks.retain(|(existing, _)| *existing != id);
        let removed = sinks.len() != before;
        if sinks.is_empty() {
            *self.inner.last.lock() = None;
        }
        removed
    }

    /// Re-read the store and push if anything changed.
    pub fn resync(&self) -> bool {
        let session = self.inner.store.get();
        self.sync(&session)
    }

    /// Push the view for `session` to every sink. Returns false when nothing
    /// was pushed: no sinks mounted, or the view is unchanged.
    pub fn sync(&self, session: &Session) -> bool {
        let sinks: Vec<Arc<dyn NavSink>> = self
            .inner
            .sinks
            .lock()
            .iter()
            .map(|(_, s)| Arc::clone(s))
            .collect();
        if sinks.is_empty() {
            return false;
        }

        let view = nav_view(session);
        {
            let mut last = self.inner.last.lock();
            if last.as_ref() == Some(&view) {
                return false;
            }
            *last = Some(view.clone());
        }

        debug!("Navigation now {:?} for {:?}", view.variant, view.label);
        for sink in sinks {
            sink.apply(&view);
        }
        true
    }

    /// Stop following the store.
    pub fn detach(&self) {
        if let Some(id) = self.inner.listener.lock().take() {
            self.inner.store.unsubscribe(id);
        }
    }
}
