//! Admin dashboard: access control, snapshot, user management and tutor approvals.

mod common;

use common::{tutor_list, TestEnv};
use serde_json::json;

use tutor_web::api::Method;
use tutor_web::models::{ApprovalStatus, UserRole};
use tutor_web::services::{AdminStats, DatabaseStatus, UserDetails};
use tutor_web::{ClientError, Field};

fn admin_env() -> TestEnv {
    TestEnv::demo().login_as("root", UserRole::Admin)
}

fn with_applications(env: &TestEnv) {
    env.mock
        .ok(Method::Get, "/admin/pending-tutors", tutor_list(&["bob"]))
        .ok(Method::Get, "/admin/approved-tutors", tutor_list(&["alice"]))
        .ok(Method::Get, "/admin/rejected-tutors", tutor_list(&[]));
}

// ============================================================================
// ACCESS
// ============================================================================

#[tokio::test]
async fn test_non_admin_is_turned_away_before_any_request() {
    for env in [
        TestEnv::demo(),
        TestEnv::demo().login_as("sam", UserRole::Student),
        TestEnv::demo().login_as("alice", UserRole::Tutor),
    ] {
        let admin = env.admin();
        assert_eq!(
            admin.refresh().await.unwrap_err(),
            ClientError::AccessDenied("Admin privileges required.".into())
        );
        assert!(admin.delete_user("kim").await.is_err());
        assert!(admin.approve("bob").await.is_err());
        assert_eq!(env.mock.request_count(), 0);
    }
}

// ============================================================================
// SNAPSHOT
// ============================================================================

#[tokio::test]
async fn test_refresh_snapshot() {
    let env = admin_env();

    let snapshot = env.admin().refresh().await.unwrap();

    assert_eq!(
        snapshot.stats,
        AdminStats {
            total_users: 5,
            students: 2,
            tutors: 2,
            admins: 1,
        }
    );
    assert_eq!(snapshot.chat_count, Some(42));
    assert!(snapshot.status.server_online);
    assert_eq!(snapshot.status.database, DatabaseStatus::Connected);
    assert_eq!(snapshot.users[1].display_name(), "Alice Moreau");
}

#[tokio::test]
async fn test_snapshot_survives_missing_chat_count() {
    let env = admin_env();
    env.mock
        .clear(Method::Get, "/admin/chats/count")
        .unreachable(Method::Get, "/admin/chats/count");

    let snapshot = env.admin().refresh().await.unwrap();

    assert_eq!(snapshot.chat_count, None);
    assert_eq!(snapshot.stats.total_users, 5);
}

#[tokio::test]
async fn test_system_status_variants() {
    let env = admin_env();
    env.mock.clear(Method::Get, "/test-db").respond(
        Method::Get,
        "/test-db",
        500,
        json!({ "success": false, "error": "connection refused" }),
    );
    let status = env.admin().system_status().await;
    assert!(status.server_online);
    assert_eq!(status.database, DatabaseStatus::Error);
    assert_eq!(status.database.label(), "Error");

    let env = TestEnv::empty().login_as("root", UserRole::Admin);
    let status = env.admin().system_status().await;
    assert!(!status.server_online);
    assert_eq!(status.database, DatabaseStatus::Disconnected);
}

// ============================================================================
// USERS
// ============================================================================

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let env = admin_env();

    let err = env.admin().delete_user("root").await.unwrap_err();

    assert_eq!(err.field(), Field::General);
    assert_eq!(err.user_message(), "You cannot delete your own account!");
    assert_eq!(env.mock.request_count(), 0);
}

#[tokio::test]
async fn test_delete_user_and_reload() {
    let env = admin_env();
    env.mock.ok(
        Method::Delete,
        "/admin/users/sam",
        json!({ "success": true, "message": "User sam deleted", "chats_deleted": 3 }),
    );

    let refreshed = env.admin().delete_user("sam").await.unwrap();

    assert_eq!(refreshed.notice, "User sam deleted successfully.");
    assert_eq!(env.mock.requests_to(Method::Delete, "/admin/users/sam").len(), 1);
    assert_eq!(env.mock.requests_to(Method::Get, "/admin/users").len(), 1);
}

#[tokio::test]
async fn test_user_details_by_role() {
    let env = admin_env();
    let admin = env.admin();

    assert_eq!(
        admin.user_details("ghost").await.unwrap_err(),
        ClientError::NotFound("User ghost not found".into())
    );

    match admin.user_details("sam").await.unwrap() {
        UserDetails::Student { enrollments, .. } => {
            let ids: Vec<&str> = enrollments.iter().map(|e| e.course_id.as_str()).collect();
            assert_eq!(ids, ["c-mech", "c-optics"]);
            assert_eq!(enrollments[0].ratings_display(), "Chapter 1: 4★, Chapter 2: 3★");
            assert_eq!(enrollments[0].average_display(), "3.5");
            assert_eq!(enrollments[1].average_display(), "Not rated");
        }
        other => panic!("expected student details, got {:?}", other),
    }

    match admin.user_details("alice").await.unwrap() {
        UserDetails::Tutor {
            user,
            courses,
            question_count,
            question_downloads,
        } => {
            assert_eq!(user.approval_status, Some(ApprovalStatus::Approved));
            assert_eq!(courses.len(), 2);
            assert_eq!(courses[0].enrolled, 1);
            assert_eq!(question_count, 1);
            assert_eq!(question_downloads, 5);
        }
        other => panic!("expected tutor details, got {:?}", other),
    }

    let details = admin.user_details("root").await.unwrap();
    assert!(matches!(details, UserDetails::Admin { .. }));
    assert_eq!(details.user().joined(), "Jan 1, 2024");
}

#[tokio::test]
async fn test_course_details() {
    let env = admin_env();
    let admin = env.admin();

    let details = admin.course_details("c-mech").await.unwrap();
    assert_eq!(details.title, "Mechanics Basics");
    assert_eq!(details.created, "May 1, 2024");
    assert_eq!(details.students.len(), 1);
    assert_eq!(
        details.students[0].ratings_display(),
        "Chapter 1: 4★\nChapter 2: 3★"
    );

    let chem = admin.course_details("c-chem").await.unwrap();
    assert!(chem.students.is_empty());

    assert_eq!(
        admin.course_details("c-none").await.unwrap_err(),
        ClientError::NotFound("Course not found".into())
    );
}

// ============================================================================
// TUTOR APPROVALS
// ============================================================================

#[tokio::test]
async fn test_approve_pending_tutor() {
    let env = admin_env();
    with_applications(&env);
    env.mock.ok(
        Method::Post,
        "/admin/approve-tutor",
        json!({ "success": true }),
    );

    let update = env.admin().approve("bob").await.unwrap();

    assert_eq!(update.notice, "Tutor bob is now approved.");
    assert_eq!(
        env.body_of(Method::Post, "/admin/approve-tutor"),
        json!({ "username": "bob" })
    );
}

#[tokio::test]
async fn test_rejecting_approved_tutor_is_refused_locally() {
    let env = admin_env();
    with_applications(&env);

    let err = env.admin().reject("alice").await.unwrap_err();

    assert_eq!(
        err,
        ClientError::InvalidTransition {
            from: ApprovalStatus::Approved,
            to: ApprovalStatus::Rejected,
        }
    );
    assert!(env
        .mock
        .requests_to(Method::Post, "/admin/reject-tutor")
        .is_empty());
}

#[tokio::test]
async fn test_unknown_application() {
    let env = admin_env();
    with_applications(&env);

    let err = env.admin().approve("zed").await.unwrap_err();

    assert_eq!(
        err,
        ClientError::NotFound("No tutor application found for zed".into())
    );
}

#[tokio::test]
async fn test_applications_are_grouped() {
    let env = admin_env();
    with_applications(&env);

    let applications = env.admin().tutor_applications().await.unwrap();

    assert_eq!(applications.pending.len(), 1);
    assert_eq!(applications.approved[0].username, "alice");
    assert!(applications.rejected.is_empty());
}
