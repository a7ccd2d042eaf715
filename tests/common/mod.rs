//! Shared fixtures: a scripted backend plus an in-memory session.
#![allow(dead_code)]

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tutor_web::api::{ApiClient, Method, MockTransport};
use tutor_web::models::{ApprovalStatus, UserRole};
use tutor_web::services::{AdminDashboard, AuthGateway, ChatService, CourseCatalog, QuestionBank};
use tutor_web::session::{MemoryStorage, Session, SessionStore, UserSession};
use tutor_web::sync::{NavSink, NavView, UiSynchronizer};
use tutor_web::ClientConfig;

pub struct TestEnv {
    pub mock: MockTransport,
    pub storage: MemoryStorage,
    pub store: SessionStore,
    pub api: ApiClient<MockTransport>,
}

impl TestEnv {
    /// Backend with no routes at all; every call is a network error.
    pub fn empty() -> Self {
        Self::with_mock(MockTransport::new())
    }

    /// Backend seeded with the demo catalog and user list.
    pub fn demo() -> Self {
        Self::with_mock(MockTransport::demo())
    }

    fn with_mock(mock: MockTransport) -> Self {
        let storage = MemoryStorage::new();
        let store = SessionStore::new(storage.clone());
        let api = ApiClient::new(mock.clone(), &ClientConfig::default());
        Self {
            mock,
            storage,
            store,
            api,
        }
    }

    pub fn login_as(self, username: &str, role: UserRole) -> Self {
        self.login_with_approval(username, role, None)
    }

    pub fn login_with_approval(
        self,
        username: &str,
        role: UserRole,
        approval: Option<ApprovalStatus>,
    ) -> Self {
        self.store
            .set(Session::Authenticated(
                UserSession::new(username, role).with_approval(approval),
            ))
            .expect("memory storage never fails");
        self
    }

    pub fn auth(&self) -> AuthGateway<MockTransport> {
        AuthGateway::new(self.api.clone(), self.store.clone())
    }

    pub fn courses(&self) -> CourseCatalog<MockTransport> {
        CourseCatalog::new(self.api.clone(), self.store.clone())
    }

    pub fn questions(&self) -> QuestionBank<MockTransport> {
        QuestionBank::new(self.api.clone(), self.store.clone())
    }

    pub fn chat(&self) -> ChatService<MockTransport> {
        ChatService::new(self.api.clone(), self.store.clone())
    }

    pub fn admin(&self) -> AdminDashboard<MockTransport> {
        AdminDashboard::new(self.api.clone(), self.store.clone())
    }

    /// Count store notifications from here on.
    pub fn count_notifications(&self) -> Arc<AtomicUsize> {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        self.store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        calls
    }

    pub fn body_of(&self, method: Method, path: &str) -> Value {
        self.mock
            .requests_to(method, path)
            .last()
            .and_then(|r| r.body.clone())
            .unwrap_or(Value::Null)
    }
}

/// Nav sink that keeps every view it was handed.
#[derive(Clone, Default)]
pub struct RecordingSink(pub Arc<Mutex<Vec<NavView>>>);

impl RecordingSink {
    pub fn mount(sync: &UiSynchronizer) -> Self {
        let sink = Self::default();
        sync.mount(sink.clone());
        sink
    }

    pub fn last(&self) -> Option<NavView> {
        self.0.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }
}

impl NavSink for RecordingSink {
    fn apply(&self, view: &NavView) {
        self.0.lock().push(view.clone());
    }
}

pub fn login_reply(username: &str, role: &str, approval: Option<&str>) -> Value {
    let mut body = json!({
        "success": true,
        "username": username,
        "userType": role,
        "message": "Login successful"
    });
    if let (Some(status), Some(fields)) = (approval, body.as_object_mut()) {
        fields.insert("approval_status".into(), json!(status));
    }
    body
}

pub fn tutor_list(names: &[&str]) -> Value {
    let tutors: Vec<Value> = names
        .iter()
        .map(|n| json!({ "username": n, "userType": "tutor" }))
        .collect();
    json!({ "success": true, "tutors": tutors })
}
