use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::timestamp;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    pub title: String,
    #[serde(default)]
    pub videos: Vec<String>,
}

/// One student's rating of one chapter (chapter is a zero-based index).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChapterRating {
    pub student: String,
    #[serde(default)]
    pub chapter: usize,
    pub rating: f64,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub rated_at: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub subject: String,
    pub grade: String,
    pub tutor_username: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub enrollments: Vec<String>,
    #[serde(default)]
    pub ratings: Vec<ChapterRating>,
    #[serde(default)]
    pub avg_rating: Option<f64>,
    #[serde(default)]
    pub total_videos: Option<usize>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: Option<NaiveDateTime>,
}

impl Course {
    /// Server-computed average when present, otherwise derived from the ratings.
    pub fn average_rating(&self) -> f64 {
        self.avg_rating
            .unwrap_or_else(|| mean(self.ratings.iter().map(|r| r.rating)))
    }

    pub fn chapter_average(&self, chapter: usize) -> f64 {
        mean(
            self.ratings
                .iter()
                .filter(|r| r.chapter == chapter)
                .map(|r| r.rating),
        )
    }

    pub fn video_count(&self) -> usize {
        self.total_videos
            .unwrap_or_else(|| self.chapters.iter().map(|c| c.videos.len()).sum())
    }

    pub fn is_enrolled(&self, username: &str) -> bool {
        self.enrollments.iter().any(|u| u == username)
    }

    pub fn is_owned_by(&self, username: &str) -> bool {
        self.tutor_username == username
    }

    pub fn ratings_by<'a>(&'a self, student: &'a str) -> impl Iterator<Item = &'a ChapterRating> {
        self.ratings.iter().filter(move |r| r.student == student)
    }

    pub fn description_or_default(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("No description available")
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Five-glyph star bar for an average rating: `★★★☆☆`.
pub fn star_bar(average: f64) -> String {
    let filled = average.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Short label for a video link.
pub fn video_label(url: &str) -> String {
    if url.contains("youtube.com") || url.contains("youtu.be") {
        return "YouTube Video".to_string();
    }
    if url.contains("vimeo.com") {
        return "Vimeo Video".to_string();
    }

    let Some((_, rest)) = url.trim().split_once("://") else {
        return "Video".to_string();
    };
    let path = rest
        .split(['?', '#'])
        .next()
        .and_then(|r| r.find('/').map(|idx| &r[idx..]))
        .unwrap_or("");

    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "Video".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course_json() -> &'static str {
        r#"{
            "_id": "c1",
            "title": "Mechanics",
            "subject": "Physics",
            "grade": "10th",
            "tutor_username": "alice",
            "chapters": [
                {"title": "Motion", "videos": ["https://youtu.be/x", "https://cdn.example.com/v/intro.mp4"]},
                {"title": "Forces", "videos": []}
            ],
            "enrollments": ["sam"],
            "ratings": [
                {"student": "sam", "chapter": 0, "rating": 4.0, "rated_at": "2024-05-02T09:00:00"},
                {"student": "kim", "chapter": 0, "rating": 5}
            ],
            "created_at": "2024-05-01T10:00:00.123"
        }"#
    }

    #[test]
    fn test_course_derived_fields() {
        let course: Course = serde_json::from_str(course_json()).unwrap();
        assert_eq!(course.average_rating(), 4.5);
        assert_eq!(course.chapter_average(0), 4.5);
        assert_eq!(course.chapter_average(1), 0.0);
        assert_eq!(course.video_count(), 2);
        assert!(course.is_enrolled("sam"));
        assert!(!course.is_enrolled("kim"));
        assert_eq!(course.ratings_by("sam").count(), 1);
        assert_eq!(course.description_or_default(), "No description available");
    }

    #[test]
    fn test_star_bar() {
        assert_eq!(star_bar(0.0), "☆☆☆☆☆");
        assert_eq!(star_bar(3.4), "★★★☆☆");
        assert_eq!(star_bar(4.5), "★★★★★");
    }

    #[test]
    fn test_video_label() {
        assert_eq!(video_label("https://www.youtube.com/watch?v=abc"), "YouTube Video");
        assert_eq!(video_label("https://vimeo.com/123"), "Vimeo Video");
        assert_eq!(video_label("https://cdn.example.com/v/intro.mp4?t=3"), "intro.mp4");
        assert_eq!(video_label("https://cdn.example.com/"), "Video");
        assert_eq!(video_label("not a url"), "Video");
    }
}
