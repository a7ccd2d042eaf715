use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::timestamp;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub question: String,
    pub subject: String,
    pub grade: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub tutor_username: Option<String>,
    #[serde(default)]
    pub downloads: u32,
    #[serde(default)]
    pub has_file: bool,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: Option<NaiveDateTime>,
}

impl Question {
    pub fn title_or(&self, fallback: &'static str) -> String {
        non_blank(self.title.as_deref()).unwrap_or(fallback).to_string()
    }

    pub fn chapter_or_default(&self) -> &str {
        non_blank(self.chapter.as_deref()).unwrap_or("Not specified")
    }

    pub fn tutor_or_default(&self) -> &str {
        non_blank(self.tutor_username.as_deref()).unwrap_or("Unknown Tutor")
    }

    /// Difficulty key, `medium` when the uploader left it out.
    pub fn difficulty_key(&self) -> &str {
        non_blank(self.difficulty.as_deref()).unwrap_or("medium")
    }

    /// "Hard" for "hard"
    pub fn difficulty_label(&self) -> String {
        let key = self.difficulty_key();
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn is_owned_by(&self, username: &str) -> bool {
        self.tutor_username.as_deref() == Some(username)
    }

    /// Case-insensitive search over the question text and title.
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || self.question.to_lowercase().contains(needle_lower)
            || self
                .title
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(needle_lower))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
