//! Login, registration and logout against a scripted backend.

mod common;

use common::{login_reply, tutor_list, RecordingSink, TestEnv};
use serde_json::json;
use std::sync::atomic::Ordering;

use tutor_web::api::Method;
use tutor_web::models::{ApprovalStatus, TutorProfile, UserRole};
use tutor_web::services::{Landing, Registration, RegistrationOutcome};
use tutor_web::session::{Session, Storage, KEY_APPROVAL, KEY_USERNAME, KEY_USER_TYPE};
use tutor_web::sync::{NavVariant, UiSynchronizer, UploadAffordance};
use tutor_web::{ClientError, Field};

fn bob_registration() -> Registration {
    Registration {
        username: "bob".into(),
        password: "x".into(),
        role: Some(UserRole::Tutor),
        tutor: Some(TutorProfile {
            full_name: "Bob".into(),
            email: "b@x.com".into(),
            qualification: "BSc".into(),
            years_of_experience: Some(2),
        }),
    }
}

// ============================================================================
// LOGIN
// ============================================================================

#[tokio::test]
async fn test_valid_login_sets_all_keys_and_notifies_once() {
    let env = TestEnv::empty();
    env.mock.ok(
        Method::Post,
        "/login",
        login_reply("alice", "tutor", Some("approved")),
    );
    let notifications = env.count_notifications();

    let outcome = env
        .auth()
        .login("alice", "secret", UserRole::Tutor)
        .await
        .unwrap();

    assert_eq!(outcome.landing, Landing::Home);
    assert_eq!(outcome.notice, "Login successful! Welcome back alice!");
    assert_eq!(env.storage.get(KEY_USERNAME).as_deref(), Some("alice"));
    assert_eq!(env.storage.get(KEY_USER_TYPE).as_deref(), Some("tutor"));
    assert_eq!(env.storage.get(KEY_APPROVAL).as_deref(), Some("approved"));
    assert_eq!(notifications.load(Ordering::SeqCst), 1);

    let body = env.body_of(Method::Post, "/login");
    assert_eq!(
        body,
        json!({ "username": "alice", "password": "secret", "userType": "tutor" })
    );
}

#[tokio::test]
async fn test_invalid_login_leaves_storage_untouched() {
    let env = TestEnv::empty();
    env.mock.respond(
        Method::Post,
        "/login",
        401,
        json!({ "success": false, "message": "Invalid password" }),
    );
    let notifications = env.count_notifications();

    let err = env
        .auth()
        .login("alice", "wrong", UserRole::Tutor)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::Rejected {
            status: 401,
            message: "Invalid password".into()
        }
    );
    assert!(err.user_message().contains("Invalid password"));
    assert_eq!(err.field(), Field::General);
    assert!(env.storage.is_empty());
    assert_eq!(env.store.get(), Session::Anonymous);
    assert_eq!(notifications.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_blank_fields_never_reach_the_server() {
    let env = TestEnv::empty();

    let err = env.auth().login("   ", "pw", UserRole::Student).await.unwrap_err();
    assert_eq!(err.field(), Field::Username);
    assert_eq!(err.user_message(), "Please enter a username");

    let err = env.auth().login("sam", "", UserRole::Student).await.unwrap_err();
    assert_eq!(err.field(), Field::Password);

    assert_eq!(env.mock.request_count(), 0);
}

#[tokio::test]
async fn test_login_when_server_is_down() {
    let env = TestEnv::empty();
    env.mock.unreachable(Method::Post, "/login");

    let err = env
        .auth()
        .login("sam", "pw", UserRole::Student)
        .await
        .unwrap_err();

    assert!(err.is_network());
    assert!(err.user_message().starts_with("Could not connect to the server"));
    assert!(env.storage.is_empty());
}

#[tokio::test]
async fn test_admin_login_lands_on_dashboard() {
    let env = TestEnv::empty();
    env.mock
        .ok(Method::Post, "/login", login_reply("root", "admin", None));

    let outcome = env.auth().login("root", "pw", UserRole::Admin).await.unwrap();

    assert_eq!(outcome.landing, Landing::AdminDashboard);
    assert!(env.store.get().is_admin());
    assert_eq!(env.storage.get(KEY_APPROVAL), None);
}

#[tokio::test]
async fn test_stored_role_is_the_server_confirmed_one() {
    let env = TestEnv::empty();
    env.mock
        .ok(Method::Post, "/login", login_reply("sam", "student", None));

    env.auth().login("sam", "pw", UserRole::Student).await.unwrap();

    assert_eq!(env.store.get().role(), Some(UserRole::Student));
}

// ============================================================================
// LOGOUT
// ============================================================================

#[tokio::test]
async fn test_logout_clears_keys_and_returns_nav_to_anonymous() {
    let env = TestEnv::empty().login_with_approval(
        "bob",
        UserRole::Tutor,
        Some(ApprovalStatus::Pending),
    );
    let sync = UiSynchronizer::bind(&env.store);
    let sink = RecordingSink::mount(&sync);
    assert_eq!(sink.last().map(|v| v.variant), Some(NavVariant::Member));

    let notice = env.auth().logout().unwrap();

    assert_eq!(notice, "Goodbye bob! You have been logged out.");
    assert_eq!(env.storage.get(KEY_USERNAME), None);
    assert_eq!(env.storage.get(KEY_USER_TYPE), None);
    assert_eq!(env.storage.get(KEY_APPROVAL), None);
    let view = sink.last().unwrap();
    assert_eq!(view.variant, NavVariant::Anonymous);
    assert_eq!(view.label, "Login");
}

// ============================================================================
// REGISTRATION
// ============================================================================

#[tokio::test]
async fn test_tutor_registration_then_login_stays_gated() {
    let env = TestEnv::empty();
    env.mock.respond(
        Method::Post,
        "/register",
        201,
        json!({ "success": true, "message": "User bob registered successfully as tutor", "username": "bob" }),
    );
    env.mock
        .ok(Method::Post, "/login", login_reply("bob", "tutor", Some("pending")));
    let sync = UiSynchronizer::bind(&env.store);
    let sink = RecordingSink::mount(&sync);

    let outcome = env.auth().register(&bob_registration()).await.unwrap();

    assert!(matches!(
        outcome,
        RegistrationOutcome::TutorPendingApproval { .. }
    ));
    assert!(outcome.notice().contains("pending admin approval"));
    assert_eq!(env.store.get(), Session::Anonymous);

    let body = env.body_of(Method::Post, "/register");
    assert_eq!(body["userType"], "tutor");
    assert_eq!(body["fullName"], "Bob");
    assert_eq!(body["email"], "b@x.com");
    assert_eq!(body["qualification"], "BSc");
    assert_eq!(body["yearsOfExperience"], 2);

    env.auth().login("bob", "x", UserRole::Tutor).await.unwrap();

    assert_eq!(env.store.get().approval(), Some(ApprovalStatus::Pending));
    let view = sink.last().unwrap();
    assert_eq!(view.upload, UploadAffordance::AwaitingApproval);
    assert!(!view.upload.is_visible());
}

#[tokio::test]
async fn test_student_registration_notice() {
    let env = TestEnv::empty();
    env.mock.ok(
        Method::Post,
        "/register",
        json!({ "success": true, "message": "ok", "username": "sam" }),
    );

    let outcome = env
        .auth()
        .register(&Registration {
            username: "sam".into(),
            password: "pw".into(),
            role: Some(UserRole::Student),
            tutor: None,
        })
        .await
        .unwrap();

    assert_eq!(outcome.notice(), "Registration successful! Welcome sam!");
    assert_eq!(outcome.username(), "sam");
    assert!(env.body_of(Method::Post, "/register").get("fullName").is_none());
}

#[tokio::test]
async fn test_registration_validation_is_local() {
    let env = TestEnv::empty();
    let auth = env.auth();

    let mut no_role = bob_registration();
    no_role.role = None;
    assert_eq!(auth.register(&no_role).await.unwrap_err().field(), Field::UserType);

    let mut admin = bob_registration();
    admin.role = Some(UserRole::Admin);
    assert_eq!(auth.register(&admin).await.unwrap_err().field(), Field::UserType);

    let mut no_profile = bob_registration();
    no_profile.tutor = None;
    assert_eq!(auth.register(&no_profile).await.unwrap_err().field(), Field::FullName);

    assert_eq!(env.mock.request_count(), 0);
}

#[tokio::test]
async fn test_duplicate_user_surfaces_server_message() {
    let env = TestEnv::empty();
    env.mock.respond(
        Method::Post,
        "/register",
        409,
        json!({ "success": false, "message": "User already exists" }),
    );

    let err = env.auth().register(&bob_registration()).await.unwrap_err();
    assert_eq!(err.user_message(), "User already exists");
}

// ============================================================================
// APPROVAL RE-SYNC
// ============================================================================

#[tokio::test]
async fn test_approval_shows_upload_without_relogin() {
    let env = TestEnv::empty().login_with_approval(
        "bob",
        UserRole::Tutor,
        Some(ApprovalStatus::Pending),
    );
    let sync = UiSynchronizer::bind(&env.store);
    let sink = RecordingSink::mount(&sync);
    assert!(!sink.last().unwrap().upload.is_visible());

    env.mock
        .ok(Method::Get, "/admin/approved-tutors", tutor_list(&["alice", "bob"]));

    let status = env.auth().refresh_approval_status().await.unwrap();

    assert_eq!(status, Some(ApprovalStatus::Approved));
    assert_eq!(env.storage.get(KEY_APPROVAL).as_deref(), Some("approved"));
    assert!(sink.last().unwrap().upload.is_visible());
    assert!(env.mock.requests_to(Method::Post, "/login").is_empty());
}

#[tokio::test]
async fn test_later_refresh_picks_up_approval() {
    let env = TestEnv::empty().login_with_approval(
        "bob",
        UserRole::Tutor,
        Some(ApprovalStatus::Pending),
    );
    let sync = UiSynchronizer::bind(&env.store);
    let sink = RecordingSink::mount(&sync);
    env.mock
        .ok(Method::Get, "/admin/approved-tutors", tutor_list(&[]))
        .ok(Method::Get, "/admin/approved-tutors", tutor_list(&["bob"]))
        .ok(Method::Get, "/admin/rejected-tutors", tutor_list(&[]))
        .ok(Method::Get, "/admin/pending-tutors", tutor_list(&["bob"]));

    // App start: still pending.
    let status = env.auth().refresh_approval_status().await.unwrap();
    assert_eq!(status, Some(ApprovalStatus::Pending));
    assert!(!sink.last().unwrap().upload.is_visible());

    // Admin approves while the page is open; the next refresh sees it.
    let status = env.auth().refresh_approval_status().await.unwrap();
    assert_eq!(status, Some(ApprovalStatus::Approved));
    assert!(sink.last().unwrap().upload.is_visible());
    assert_eq!(env.mock.requests_to(Method::Get, "/admin/approved-tutors").len(), 2);
}

#[tokio::test]
async fn test_unchanged_approval_does_not_notify() {
    let env = TestEnv::empty().login_with_approval(
        "bob",
        UserRole::Tutor,
        Some(ApprovalStatus::Pending),
    );
    env.mock
        .ok(Method::Get, "/admin/approved-tutors", tutor_list(&[]))
        .ok(Method::Get, "/admin/rejected-tutors", tutor_list(&[]))
        .ok(Method::Get, "/admin/pending-tutors", tutor_list(&["bob"]));
    let notifications = env.count_notifications();

    let status = env.auth().refresh_approval_status().await.unwrap();

    assert_eq!(status, Some(ApprovalStatus::Pending));
    assert_eq!(notifications.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_refresh_skips_non_tutors() {
    let env = TestEnv::empty().login_as("sam", UserRole::Student);
    assert_eq!(env.auth().refresh_approval_status().await.unwrap(), None);
    assert_eq!(env.mock.request_count(), 0);
}

// ============================================================================
// BACKEND PROBE
// ============================================================================

#[tokio::test]
async fn test_check_backend() {
    let up = TestEnv::demo();
    assert!(up.auth().check_backend().await.is_ok());

    let down = TestEnv::empty();
    down.mock.unreachable(Method::Get, "/test");
    assert!(down.auth().check_backend().await.unwrap_err().is_network());
}
