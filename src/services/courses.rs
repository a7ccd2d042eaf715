use log::info;
use std::collections::HashSet;

use super::{require_user, selection, Refreshed};
use crate::api::{ApiClient, Transport};
use crate::error::{ClientError, Field, Result};
use crate::models::{star_bar, timestamp, video_label, Course, UserRole};
use crate::session::{Session, SessionStore};

const CHAPTER_PREVIEW: usize = 3;
const VIDEO_PREVIEW: usize = 2;

/// Grade and subject dropdowns. `None` means "all"; otherwise exact match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub grade: Option<String>,
    pub subject: Option<String>,
}

impl CourseFilter {
    pub fn new(grade: &str, subject: &str) -> Self {
        Self {
            grade: selection(grade),
            subject: selection(subject),
        }
    }

    pub fn matches(&self, course: &Course) -> bool {
        self.grade.as_deref().map_or(true, |g| g == course.grade)
            && self.subject.as_deref().map_or(true, |s| s == course.subject)
    }

    pub fn apply<'a>(&self, courses: &'a [Course]) -> Vec<&'a Course> {
        courses.iter().filter(|c| self.matches(c)).collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_courses: usize,
    pub total_tutors: usize,
    pub total_videos: usize,
}

impl CatalogStats {
    pub fn from_courses(courses: &[Course]) -> Self {
        let tutors: HashSet<&str> = courses.iter().map(|c| c.tutor_username.as_str()).collect();
        Self {
            total_courses: courses.len(),
            total_tutors: tutors.len(),
            total_videos: courses.iter().map(Course::video_count).sum(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnrollAction {
    LoginToEnroll,
    Enroll,
    AlreadyEnrolled,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChapterCard {
    /// Zero-based, as the rating endpoint expects
    pub index: usize,
    pub title: String,
    pub videos: Vec<String>,
    pub more_videos: usize,
    pub average: f64,
    pub can_rate: bool,
}

impl ChapterCard {
    pub fn heading(&self) -> String {
        format!("Chapter {}: {}", self.index + 1, self.title)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CourseCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tutor: String,
    pub grade: String,
    pub subject: String,
    pub stars: String,
    pub rating_count: usize,
    pub chapter_count: usize,
    pub chapters: Vec<ChapterCard>,
    pub more_chapters: usize,
    pub enroll: EnrollAction,
    pub can_delete: bool,
}

impl CourseCard {
    pub fn build(course: &Course, session: &Session) -> Self {
        let viewer = session.user();
        let can_rate = viewer.is_some();

        let chapters = course
            .chapters
            .iter()
            .take(CHAPTER_PREVIEW)
            .enumerate()
            .map(|(index, chapter)| ChapterCard {
                index,
                title: chapter.title.clone(),
                videos: chapter
                    .videos
                    .iter()
                    .take(VIDEO_PREVIEW)
                    .map(|url| video_label(url))
                    .collect(),
                more_videos: chapter.videos.len().saturating_sub(VIDEO_PREVIEW),
                average: course.chapter_average(index),
                can_rate,
            })
            .collect();

        let enroll = match viewer {
            None => EnrollAction::LoginToEnroll,
            Some(user) if course.is_enrolled(&user.username) => EnrollAction::AlreadyEnrolled,
            Some(_) => EnrollAction::Enroll,
        };
        let can_delete = viewer
            .is_some_and(|u| u.role == UserRole::Tutor && course.is_owned_by(&u.username));

        Self {
            id: course.id.clone(),
            title: course.title.clone(),
            description: course.description_or_default().to_string(),
            tutor: course.tutor_username.clone(),
            grade: course.grade.clone(),
            subject: course.subject.clone(),
            stars: star_bar(course.average_rating()),
            rating_count: course.ratings.len(),
            chapter_count: course.chapters.len(),
            chapters,
            more_chapters: course.chapters.len().saturating_sub(CHAPTER_PREVIEW),
            enroll,
            can_delete,
        }
    }
}

/// One entry of a tutor's "My Uploaded Courses" list.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadSummary {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub grade: String,
    pub chapters: usize,
    pub videos: usize,
    pub uploaded: String,
}

pub fn cards(courses: &[Course], filter: &CourseFilter, session: &Session) -> Vec<CourseCard> {
    filter
        .apply(courses)
        .into_iter()
        .map(|c| CourseCard::build(c, session))
        .collect()
}

fn valid_rating(rating: f64) -> bool {
    rating.is_finite() && (1.0..=5.0).contains(&rating)
}

fn invalid_rating() -> ClientError {
    ClientError::validation(Field::Rating, "Please enter a valid rating between 1 and 5")
}

/// Parse the rating a student typed. Fractions such as `4.5` are allowed.
pub fn parse_rating(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|r| valid_rating(*r))
        .ok_or_else(invalid_rating)
}

#[derive(Clone)]
pub struct CourseCatalog<T> {
    api: ApiClient<T>,
    store: SessionStore,
}

impl<T: Transport> CourseCatalog<T> {
    pub fn new(api: ApiClient<T>, store: SessionStore) -> Self {
        Self { api, store }
    }

    pub async fn load(&self) -> Result<Vec<Course>> {
        self.api.courses().await
    }

    pub fn cards(&self, courses: &[Course], filter: &CourseFilter) -> Vec<CourseCard> {
        cards(courses, filter, &self.store.get())
    }

    pub async fn enroll(&self, course_id: &str) -> Result<Refreshed<Course>> {
        let user = require_user(&self.store)?;
        let ack = self.api.enroll(&user.username, course_id).await?;
        info!("{} enrolled in {}", user.username, course_id);

        Ok(Refreshed {
            notice: ack.message_or("Successfully enrolled in the course!"),
            items: self.load().await?,
        })
    }

    pub async fn rate(&self, course: &Course, chapter: usize, rating: f64) -> Result<Refreshed<Course>> {
        let user = require_user(&self.store)?;
        if !valid_rating(rating) {
            return Err(invalid_rating());
        }
        if chapter >= course.chapters.len() {
            return Err(ClientError::validation(Field::Chapter, "Invalid chapter number"));
        }

        self.api
            .rate(&user.username, &course.id, chapter, rating)
            .await?;
        info!(
            "{} rated chapter {} of {} with {}",
            user.username,
            chapter + 1,
            course.id,
            rating
        );

        Ok(Refreshed {
            notice: "Thank you for your rating!".to_string(),
            items: self.load().await?,
        })
    }

    pub async fn delete(&self, course: &Course) -> Result<Refreshed<Course>> {
        let user = require_user(&self.store)?;
        if user.role != UserRole::Tutor || !course.is_owned_by(&user.username) {
            return Err(ClientError::AccessDenied(
                "You can only delete your own courses".to_string(),
            ));
        }

        let ack = self.api.delete_course(&user.username, &course.id).await?;
        info!("{} deleted course {}", user.username, course.id);

        Ok(Refreshed {
            notice: ack.message_or("Course deleted successfully!"),
            items: self.load().await?,
        })
    }

    /// Courses the logged-in tutor uploaded; empty for everyone else.
    pub fn my_uploads(&self, courses: &[Course]) -> Vec<UploadSummary> {
        let session = self.store.get();
        let Some(user) = session.user().filter(|u| u.role == UserRole::Tutor) else {
            return Vec::new();
        };

        courses
            .iter()
            .filter(|c| c.is_owned_by(&user.username))
            .map(|c| UploadSummary {
                id: c.id.clone(),
                title: c.title.clone(),
                subject: c.subject.clone(),
                grade: c.grade.clone(),
                chapters: c.chapters.len(),
                videos: c.video_count(),
                uploaded: timestamp::format_date(c.created_at),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chapter;
    use crate::session::UserSession;

    fn course(id: &str, grade: &str, subject: &str, tutor: &str) -> Course {
        Course {
            id: id.into(),
            title: format!("{} {}", grade, subject),
            description: None,
            subject: subject.into(),
            grade: grade.into(),
            tutor_username: tutor.into(),
            chapters: (1..=5)
                .map(|n| Chapter {
                    title: format!("Part {}", n),
                    videos: vec![
                        "https://youtu.be/a".into(),
                        "https://cdn.example.com/b.mp4".into(),
                        "https://cdn.example.com/c.mp4".into(),
                    ],
                })
                .collect(),
            enrollments: vec!["sam".into()],
            ratings: Vec::new(),
            avg_rating: Some(2.6),
            total_videos: None,
            created_at: None,
        }
    }

    #[test]
    fn test_filter_is_exact_and_case_sensitive() {
        let courses = vec![
            course("a", "10th", "Physics", "alice"),
            course("b", "10th", "physics", "alice"),
            course("c", "12th", "Physics", "bob"),
            course("d", "10th", "Chemistry", "bob"),
        ];
        let filter = CourseFilter::new("10th", "Physics");
        let ids: Vec<&str> = filter.apply(&courses).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a"]);

        assert_eq!(CourseFilter::new("all", "").apply(&courses).len(), 4);
    }

    #[test]
    fn test_stats_count_distinct_tutors() {
        let courses = vec![
            course("a", "10th", "Physics", "alice"),
            course("b", "12th", "Physics", "alice"),
            course("c", "12th", "Physics", "bob"),
        ];
        let stats = CatalogStats::from_courses(&courses);
        assert_eq!(stats.total_courses, 3);
        assert_eq!(stats.total_tutors, 2);
        assert_eq!(stats.total_videos, 45);
    }

    #[test]
    fn test_card_for_anonymous_viewer() {
        let card = CourseCard::build(&course("a", "10th", "Physics", "alice"), &Session::Anonymous);
        assert_eq!(card.stars, "★★★☆☆");
        assert_eq!(card.chapters.len(), 3);
        assert_eq!(card.more_chapters, 2);
        assert_eq!(card.chapters[0].videos, ["YouTube Video", "b.mp4"]);
        assert_eq!(card.chapters[0].more_videos, 1);
        assert_eq!(card.chapters[2].heading(), "Chapter 3: Part 3");
        assert!(!card.chapters[0].can_rate);
        assert_eq!(card.enroll, EnrollAction::LoginToEnroll);
        assert!(!card.can_delete);
        assert_eq!(card.description, "No description available");
    }

    #[test]
    fn test_card_for_owner_and_student() {
        let c = course("a", "10th", "Physics", "alice");
        let owner = Session::Authenticated(UserSession::new("alice", UserRole::Tutor));
        let card = CourseCard::build(&c, &owner);
        assert!(card.can_delete);
        assert_eq!(card.enroll, EnrollAction::Enroll);

        let student = Session::Authenticated(UserSession::new("sam", UserRole::Student));
        let card = CourseCard::build(&c, &student);
        assert!(!card.can_delete);
        assert!(card.chapters[0].can_rate);
        assert_eq!(card.enroll, EnrollAction::AlreadyEnrolled);
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating(" 4 "), Ok(4.0));
        assert_eq!(parse_rating("4.5"), Ok(4.5));
        assert_eq!(parse_rating("1.0"), Ok(1.0));
        assert!(parse_rating("0").is_err());
        assert!(parse_rating("5.1").is_err());
        assert!(parse_rating("NaN").is_err());
        assert!(parse_rating("inf").is_err());
        assert_eq!(parse_rating("four").unwrap_err().field(), Field::Rating);
    }
}
