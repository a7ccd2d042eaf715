pub mod admin;
pub mod auth;
pub mod chat;
pub mod courses;
pub mod questions;

pub use admin::{
    AdminDashboard, AdminSnapshot, AdminStats, ApplicationUpdate, CourseDetails, DatabaseStatus,
    EnrolledStudent, StudentEnrollment, SystemStatus, TutorApplications, TutorCourse, UserDetails,
};
pub use auth::{AuthGateway, Landing, LoginOutcome, Registration, RegistrationOutcome};
pub use chat::{format_message, ChatService, Exchange, Paragraph, Segment, THINKING};
pub use courses::{
    parse_rating, CatalogStats, ChapterCard, CourseCard, CourseCatalog, CourseFilter, EnrollAction,
    UploadSummary,
};
pub use questions::{GradeSection, QuestionBank, QuestionCard, QuestionFile, QuestionFilter};

use crate::error::{ClientError, Result};
use crate::session::{SessionStore, UserSession};

/// Result of a mutating action: the notice to show plus the freshly reloaded list.
#[derive(Clone, Debug, PartialEq)]
pub struct Refreshed<T> {
    pub notice: String,
    pub items: Vec<T>,
}

pub(crate) fn require_user(store: &SessionStore) -> Result<UserSession> {
    store
        .get()
        .user()
        .cloned()
        .ok_or(ClientError::LoginRequired)
}

/// `None` for the "all" choice of a filter dropdown.
pub(crate) fn selection(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value.to_string())
    }
}
