use chrono::{DateTime, Utc};
use log::{info, warn};

use super::Refreshed;
use crate::api::{ApiClient, Transport};
use crate::error::{ClientError, Field, Result};
use crate::models::{
    timestamp, ApprovalDecision, ApprovalStatus, ChapterRating, Course, User, UserRole,
};
use crate::session::{SessionStore, UserSession};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total_users: usize,
    pub students: usize,
    pub tutors: usize,
    pub admins: usize,
}

impl AdminStats {
    pub fn from_users(users: &[User]) -> Self {
        let count = |role: UserRole| users.iter().filter(|u| u.role == role).count();
        Self {
            total_users: users.len(),
            students: count(UserRole::Student),
            tutors: count(UserRole::Tutor),
            admins: count(UserRole::Admin),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatabaseStatus {
    Connected,
    /// Backend answered but reported a database failure
    Error,
    Disconnected,
}

impl DatabaseStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DatabaseStatus::Connected => "Connected",
            DatabaseStatus::Error => "Error",
            DatabaseStatus::Disconnected => "Disconnected",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SystemStatus {
    pub server_online: bool,
    pub database: DatabaseStatus,
    pub checked_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AdminSnapshot {
    pub users: Vec<User>,
    pub stats: AdminStats,
    /// `None` when the count could not be fetched
    pub chat_count: Option<u64>,
    pub status: SystemStatus,
}

fn mean(ratings: &[ChapterRating]) -> Option<f64> {
    if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().map(|r| r.rating).sum::<f64>() / ratings.len() as f64)
    }
}

/// "Chapter 1: 4★, Chapter 3: 5★"
fn describe_ratings(ratings: &[ChapterRating], separator: &str, empty: &str) -> String {
    if ratings.is_empty() {
        return empty.to_string();
    }
    ratings
        .iter()
        .map(|r| format!("Chapter {}: {}★", r.chapter + 1, r.rating))
        .collect::<Vec<_>>()
        .join(separator)
}

#[derive(Clone, Debug, PartialEq)]
pub struct StudentEnrollment {
    pub course_id: String,
    pub title: String,
    pub tutor: String,
    pub subject: String,
    pub grade: String,
    pub ratings: Vec<ChapterRating>,
}

impl StudentEnrollment {
    pub fn ratings_display(&self) -> String {
        describe_ratings(&self.ratings, ", ", "No ratings")
    }

    pub fn average_display(&self) -> String {
        mean(&self.ratings)
            .map(|avg| format!("{:.1}", avg))
            .unwrap_or_else(|| "Not rated".to_string())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TutorCourse {
    pub course_id: String,
    pub title: String,
    pub subject: String,
    pub grade: String,
    pub enrolled: usize,
    pub rating_count: usize,
    pub average: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum UserDetails {
    Student {
        user: User,
        enrollments: Vec<StudentEnrollment>,
    },
    Tutor {
        user: User,
        courses: Vec<TutorCourse>,
        question_count: usize,
        question_downloads: u64,
    },
    Admin {
        user: User,
    },
}

impl UserDetails {
    pub fn user(&self) -> &User {
        match self {
            UserDetails::Student { user, .. }
            | UserDetails::Tutor { user, .. }
            | UserDetails::Admin { user } => user,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnrolledStudent {
    pub username: String,
    pub ratings: Vec<ChapterRating>,
}

impl EnrolledStudent {
    pub fn ratings_display(&self) -> String {
        describe_ratings(&self.ratings, "\n", "No ratings yet")
    }

    pub fn average_display(&self) -> String {
        mean(&self.ratings)
            .map(|avg| format!("{:.1}", avg))
            .unwrap_or_else(|| "No ratings".to_string())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CourseDetails {
    pub course_id: String,
    pub title: String,
    pub tutor: String,
    pub subject: String,
    pub grade: String,
    pub created: String,
    pub students: Vec<EnrolledStudent>,
}

impl CourseDetails {
    fn from_course(course: &Course) -> Self {
        Self {
            course_id: course.id.clone(),
            title: course.title.clone(),
            tutor: course.tutor_username.clone(),
            subject: course.subject.clone(),
            grade: course.grade.clone(),
            created: timestamp::format_date(course.created_at),
            students: course
                .enrollments
                .iter()
                .map(|student| EnrolledStudent {
                    username: student.clone(),
                    ratings: course.ratings_by(student).cloned().collect(),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TutorApplications {
    pub pending: Vec<User>,
    pub approved: Vec<User>,
    pub rejected: Vec<User>,
}

impl TutorApplications {
    /// Where `username` currently sits. Approved wins if a tutor shows up twice.
    pub fn status_of(&self, username: &str) -> Option<ApprovalStatus> {
        let listed = |list: &[User]| list.iter().any(|u| u.username == username);
        if listed(&self.approved) {
            Some(ApprovalStatus::Approved)
        } else if listed(&self.rejected) {
            Some(ApprovalStatus::Rejected)
        } else if listed(&self.pending) {
            Some(ApprovalStatus::Pending)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApplicationUpdate {
    pub notice: String,
    pub applications: TutorApplications,
}

#[derive(Clone)]
pub struct AdminDashboard<T> {
    api: ApiClient<T>,
    store: SessionStore,
}

impl<T: Transport> AdminDashboard<T> {
    pub fn new(api: ApiClient<T>, store: SessionStore) -> Self {
        Self { api, store }
    }

    pub fn verify_access(&self) -> Result<UserSession> {
        match self.store.get().user() {
            Some(user) if user.role == UserRole::Admin => Ok(user.clone()),
            _ => Err(ClientError::AccessDenied(
                "Admin privileges required.".to_string(),
            )),
        }
    }

    pub async fn load_users(&self) -> Result<Vec<User>> {
        self.verify_access()?;
        self.api.users().await
    }

    pub fn stats(users: &[User]) -> AdminStats {
        AdminStats::from_users(users)
    }

    pub async fn chat_count(&self) -> Result<u64> {
        self.verify_access()?;
        self.api.chat_count().await
    }

    pub async fn system_status(&self) -> SystemStatus {
        let server_online = self.api.ping().await.is_ok();
        let database = match self.api.ping_database().await {
            Ok(_) => DatabaseStatus::Connected,
            Err(ClientError::Rejected { .. }) => DatabaseStatus::Error,
            Err(_) => DatabaseStatus::Disconnected,
        };

        SystemStatus {
            server_online,
            database,
            checked_at: Utc::now(),
        }
    }

    /// Everything the dashboard shows; what the periodic refresh calls.
    pub async fn refresh(&self) -> Result<AdminSnapshot> {
        let users = self.load_users().await?;
        let chat_count = self
            .api
            .chat_count()
            .await
            .inspect_err(|e| warn!("Chat count unavailable: {}", e))
            .ok();
        let status = self.system_status().await;

        Ok(AdminSnapshot {
            stats: AdminStats::from_users(&users),
            users,
            chat_count,
            status,
        })
    }

    pub async fn delete_user(&self, username: &str) -> Result<Refreshed<User>> {
        let admin = self.verify_access()?;
        if admin.username == username {
            return Err(ClientError::validation(
                Field::General,
                "You cannot delete your own account!",
            ));
        }

        let deleted = self.api.delete_user(username).await?;
        info!(
            "Deleted user {} ({} chats, {} courses, {} questions)",
            username, deleted.chats_deleted, deleted.courses_deleted, deleted.questions_deleted
        );

        Ok(Refreshed {
            notice: format!("User {} deleted successfully.", username),
            items: self.api.users().await?,
        })
    }

    pub async fn user_details(&self, username: &str) -> Result<UserDetails> {
        let users = self.load_users().await?;
        let user = users
            .into_iter()
            .find(|u| u.username == username)
            .ok_or_else(|| ClientError::NotFound(format!("User {} not found", username)))?;

        match user.role {
            UserRole::Admin => Ok(UserDetails::Admin { user }),
            UserRole::Student => {
                let courses = self.api.courses().await?;
                let enrollments = courses
                    .iter()
                    .filter(|c| c.is_enrolled(username))
                    .map(|c| StudentEnrollment {
                        course_id: c.id.clone(),
                        title: c.title.clone(),
                        tutor: c.tutor_username.clone(),
                        subject: c.subject.clone(),
                        grade: c.grade.clone(),
                        ratings: c.ratings_by(username).cloned().collect(),
                    })
                    .collect();
                Ok(UserDetails::Student { user, enrollments })
            }
            UserRole::Tutor => {
                let courses = self
                    .api
                    .courses()
                    .await?
                    .iter()
                    .filter(|c| c.is_owned_by(username))
                    .map(|c| TutorCourse {
                        course_id: c.id.clone(),
                        title: c.title.clone(),
                        subject: c.subject.clone(),
                        grade: c.grade.clone(),
                        enrolled: c.enrollments.len(),
                        rating_count: c.ratings.len(),
                        average: c.average_rating(),
                    })
                    .collect();

                // Question stats are a nice-to-have on this view.
                let questions = self
                    .api
                    .questions()
                    .await
                    .inspect_err(|e| warn!("Questions unavailable for {}: {}", username, e))
                    .unwrap_or_default();
                let own: Vec<_> = questions.iter().filter(|q| q.is_owned_by(username)).collect();

                Ok(UserDetails::Tutor {
                    user,
                    courses,
                    question_count: own.len(),
                    question_downloads: own.iter().map(|q| u64::from(q.downloads)).sum(),
                })
            }
        }
    }

    pub async fn course_details(&self, course_id: &str) -> Result<CourseDetails> {
        self.verify_access()?;
        let courses = self.api.courses().await?;
        courses
            .iter()
            .find(|c| c.id == course_id)
            .map(CourseDetails::from_course)
            .ok_or_else(|| ClientError::NotFound("Course not found".to_string()))
    }

    pub async fn tutor_applications(&self) -> Result<TutorApplications> {
        self.verify_access()?;
        Ok(TutorApplications {
            pending: self.api.tutors(ApprovalStatus::Pending).await?,
            approved: self.api.tutors(ApprovalStatus::Approved).await?,
            rejected: self.api.tutors(ApprovalStatus::Rejected).await?,
        })
    }

    pub async fn approve(&self, username: &str) -> Result<ApplicationUpdate> {
        self.decide(username, ApprovalDecision::Approve).await
    }

    pub async fn reject(&self, username: &str) -> Result<ApplicationUpdate> {
        self.decide(username, ApprovalDecision::Reject).await
    }

    async fn decide(&self, username: &str, decision: ApprovalDecision) -> Result<ApplicationUpdate> {
        let applications = self.tutor_applications().await?;
        let current = applications.status_of(username).ok_or_else(|| {
            ClientError::NotFound(format!("No tutor application found for {}", username))
        })?;
        let next = current.transition(decision)?;

        let ack = self.api.decide_tutor(username, decision).await?;
        info!("Tutor {} moved from {} to {}", username, current, next);

        Ok(ApplicationUpdate {
            notice: ack.message_or(&format!("Tutor {} is now {}.", username, next)),
            applications: self.tutor_applications().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, role: UserRole) -> User {
        User {
            username: name.into(),
            role,
            created_at: None,
            approval_status: None,
            full_name: None,
            email: None,
            qualification: None,
            years_of_experience: None,
        }
    }

    fn rating(student: &str, chapter: usize, value: f64) -> ChapterRating {
        ChapterRating {
            student: student.into(),
            chapter,
            rating: value,
            rated_at: None,
        }
    }

    #[test]
    fn test_stats_by_role() {
        let users = vec![
            user("root", UserRole::Admin),
            user("alice", UserRole::Tutor),
            user("sam", UserRole::Student),
            user("kim", UserRole::Student),
        ];
        let stats = AdminStats::from_users(&users);
        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.students, 2);
        assert_eq!(stats.tutors, 1);
        assert_eq!(stats.admins, 1);
    }

    #[test]
    fn test_enrollment_displays() {
        let enrollment = StudentEnrollment {
            course_id: "c1".into(),
            title: "Mechanics".into(),
            tutor: "alice".into(),
            subject: "Physics".into(),
            grade: "10th".into(),
            ratings: vec![rating("sam", 0, 4.0), rating("sam", 2, 5.0)],
        };
        assert_eq!(enrollment.ratings_display(), "Chapter 1: 4★, Chapter 3: 5★");
        assert_eq!(enrollment.average_display(), "4.5");

        let empty = StudentEnrollment {
            ratings: Vec::new(),
            ..enrollment
        };
        assert_eq!(empty.ratings_display(), "No ratings");
        assert_eq!(empty.average_display(), "Not rated");
    }

    #[test]
    fn test_application_status_lookup() {
        let applications = TutorApplications {
            pending: vec![user("bob", UserRole::Tutor)],
            approved: vec![user("alice", UserRole::Tutor)],
            rejected: vec![user("eve", UserRole::Tutor)],
        };
        assert_eq!(applications.status_of("bob"), Some(ApprovalStatus::Pending));
        assert_eq!(applications.status_of("alice"), Some(ApprovalStatus::Approved));
        assert_eq!(applications.status_of("eve"), Some(ApprovalStatus::Rejected));
        assert_eq!(applications.status_of("zed"), None);
    }
}
