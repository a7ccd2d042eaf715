use log::{info, warn};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::storage::{Storage, KEY_APPROVAL, KEY_USERNAME, KEY_USER_TYPE};
use crate::error::Result;
use crate::models::{ApprovalStatus, UserRole};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSession {
    pub username: String,
    pub role: UserRole,
    /// Only meaningful for tutors
    pub approval: Option<ApprovalStatus>,
}

impl UserSession {
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            role,
            approval: None,
        }
    }

    pub fn with_approval(mut self, approval: Option<ApprovalStatus>) -> Self {
        self.approval = approval;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(UserSession),
}

impl Session {
    pub fn user(&self) -> Option<&UserSession> {
        match self {
            Session::Authenticated(user) => Some(user),
            Session::Anonymous => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.user().map(|u| u.username.as_str())
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user().map(|u| u.role)
    }

    pub fn approval(&self) -> Option<ApprovalStatus> {
        self.user().and_then(|u| u.approval)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(UserRole::Admin)
    }

    pub fn is_tutor(&self) -> bool {
        self.role() == Some(UserRole::Tutor)
    }
}

pub type ListenerId = u64;

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

struct Inner {
    storage: Box<dyn Storage>,
    current: RwLock<Session>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_id: AtomicU64,
}

/// The one place session state lives. Every change is written through to
/// storage first, then each subscriber is told exactly once.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Restore whatever session the storage holds.
    pub fn new(storage: impl Storage + 'static) -> Self {
        let current = read_session(&storage);
        if let Some(user) = current.user() {
            info!("Restored session for {} ({})", user.username, user.role);
        }

        Self {
            inner: Arc::new(Inner {
                storage: Box::new(storage),
                current: RwLock::new(current),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn get(&self) -> Session {
        self.inner.current.read().clone()
    }

    pub fn set(&self, session: Session) -> Result<()> {
        write_session(self.inner.storage.as_ref(), &session)?;

        match session.user() {
            Some(user) => info!("Session set: {} as {}", user.username, user.role),
            None => info!("Session cleared"),
        }

        *self.inner.current.write() = session.clone();
        self.notify(&session);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.set(Session::Anonymous)
    }

    /// Replace the tutor's approval status. Returns whether anything changed;
    /// subscribers hear about it only when it did.
    pub fn update_approval(&self, approval: Option<ApprovalStatus>) -> Result<bool> {
        let session = self.get();
        let Some(user) = session.user() else {
            return Ok(false);
        };
        if user.role != UserRole::Tutor || user.approval == approval {
            return Ok(false);
        }

        self.set(Session::Authenticated(user.clone().with_approval(approval)))?;
        Ok(true)
    }

    pub fn subscribe(&self, listener: impl Fn(&Session) + Send + Sync + 'static) -> ListenerId {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    fn notify(&self, session: &Session) {
        // Listeners may call back into the store.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in listeners {
            listener(session);
        }
    }
}

fn read_session(storage: &dyn Storage) -> Session {
    let Some(username) = storage.get(KEY_USERNAME).filter(|u| !u.trim().is_empty()) else {
        return Session::Anonymous;
    };

    let raw_role = storage.get(KEY_USER_TYPE).unwrap_or_default();
    let Some(role) = UserRole::parse(&raw_role) else {
        warn!("Stored user type {:?} is not recognised, starting anonymous", raw_role);
        return Session::Anonymous;
    };

    let approval = storage
        .get(KEY_APPROVAL)
        .and_then(|raw| ApprovalStatus::parse(&raw));

    Session::Authenticated(UserSession::new(username, role).with_approval(approval))
}

fn write_session(storage: &dyn Storage, session: &Session) -> Result<()> {
    match session.user() {
        Some(user) => {
            storage.set(KEY_USERNAME, &user.username)?;
            storage.set(KEY_USER_TYPE, user.role.as_str())?;
            match user.approval {
                Some(approval) => storage.set(KEY_APPROVAL, approval.as_str()),
                None => storage.remove(KEY_APPROVAL),
            }
        }
        None => {
            storage.remove(KEY_USERNAME)?;
            storage.remove(KEY_USER_TYPE)?;
            storage.remove(KEY_APPROVAL)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_restores_from_storage() {
        let storage = MemoryStorage::with_entries([
            (KEY_USERNAME, "bob"),
            (KEY_USER_TYPE, "tutor"),
            (KEY_APPROVAL, "pending"),
        ]);
        let store = SessionStore::new(storage);
        let session = store.get();
        assert_eq!(session.username(), Some("bob"));
        assert!(session.is_tutor());
        assert_eq!(session.approval(), Some(ApprovalStatus::Pending));
    }

    #[test]
    fn test_unknown_role_starts_anonymous() {
        let storage =
            MemoryStorage::with_entries([(KEY_USERNAME, "eve"), (KEY_USER_TYPE, "superuser")]);
        assert_eq!(SessionStore::new(storage).get(), Session::Anonymous);
    }

    #[test]
    fn test_set_writes_through_and_notifies_once() {
        let storage = MemoryStorage::new();
        let store = SessionStore::new(storage.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store
            .set(Session::Authenticated(UserSession::new("sam", UserRole::Student)))
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(storage.get(KEY_USERNAME).as_deref(), Some("sam"));
        assert_eq!(storage.get(KEY_USER_TYPE).as_deref(), Some("student"));
        assert_eq!(storage.get(KEY_APPROVAL), None);
    }

    #[test]
    fn test_update_approval_only_notifies_on_change() {
        let store = SessionStore::new(MemoryStorage::new());
        store
            .set(Session::Authenticated(
                UserSession::new("bob", UserRole::Tutor).with_approval(Some(ApprovalStatus::Pending)),
            ))
            .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!store.update_approval(Some(ApprovalStatus::Pending)).unwrap());
        assert!(store.update_approval(Some(ApprovalStatus::Approved)).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.get().approval(), Some(ApprovalStatus::Approved));
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = SessionStore::new(MemoryStorage::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.clear().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_can_read_store() {
        let store = SessionStore::new(MemoryStorage::new());
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let handle = store.clone();
        store.subscribe(move |_| {
            *sink.lock() = handle.get().username().map(str::to_string);
        });

        store
            .set(Session::Authenticated(UserSession::new("root", UserRole::Admin)))
            .unwrap();
        assert_eq!(seen.lock().as_deref(), Some("root"));
    }
}
