use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::info;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write;

use super::{require_user, selection, Refreshed};
use crate::api::{ApiClient, DownloadReply, Transport};
use crate::error::{ClientError, Result};
use crate::models::{Question, UserRole};
use crate::session::{Session, SessionStore};

const EXCERPT_CHARS: usize = 150;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    pub grade: Option<String>,
    pub subject: Option<String>,
    /// Lowercased search term, empty for none
    pub search: String,
}

impl QuestionFilter {
    pub fn new(grade: &str, subject: &str, search: &str) -> Self {
        Self {
            grade: selection(grade),
            subject: selection(subject),
            search: search.trim().to_lowercase(),
        }
    }

    pub fn matches(&self, question: &Question) -> bool {
        self.grade.as_deref().map_or(true, |g| g == question.grade)
            && self.subject.as_deref().map_or(true, |s| s == question.subject)
            && question.matches_search(&self.search)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuestionCard {
    pub id: String,
    pub heading: String,
    pub difficulty: String,
    pub difficulty_label: String,
    pub excerpt: String,
    pub meta: String,
    pub downloads: u32,
    pub can_delete: bool,
}

impl QuestionCard {
    pub fn build(question: &Question, number: usize, session: &Session) -> Self {
        let can_delete = session
            .user()
            .is_some_and(|u| u.role == UserRole::Tutor && question.is_owned_by(&u.username));

        Self {
            id: question.id.clone(),
            heading: format!("Q{}: {}", number, question.title_or("Question")),
            difficulty: question.difficulty_key().to_string(),
            difficulty_label: question.difficulty_label(),
            excerpt: excerpt(&question.question),
            meta: format!(
                "{} | {} | By: {}",
                question.subject,
                question.chapter_or_default(),
                question.tutor_or_default()
            ),
            downloads: question.downloads,
            can_delete,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GradeSection {
    pub grade: String,
    pub cards: Vec<QuestionCard>,
}

impl GradeSection {
    pub fn heading(&self) -> String {
        format!("{} Grade Questions", self.grade)
    }
}

/// Filtered questions grouped by grade, numbered continuously across groups.
pub fn sections(questions: &[Question], filter: &QuestionFilter, session: &Session) -> Vec<GradeSection> {
    let mut by_grade: BTreeMap<GradeKey, Vec<&Question>> = BTreeMap::new();
    for question in questions.iter().filter(|q| filter.matches(q)) {
        by_grade
            .entry(GradeKey(question.grade.clone()))
            .or_default()
            .push(question);
    }

    let mut number = 0;
    by_grade
        .into_iter()
        .map(|(GradeKey(grade), questions)| GradeSection {
            grade,
            cards: questions
                .into_iter()
                .map(|q| {
                    number += 1;
                    QuestionCard::build(q, number, session)
                })
                .collect(),
        })
        .collect()
}

/// Orders "9th" before "10th" before "12th"; non-numeric grades sort after, by name.
#[derive(Clone, Debug, PartialEq, Eq)]
struct GradeKey(String);

impl GradeKey {
    fn level(&self) -> Option<u32> {
        let digits: String = self.0.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().ok()
    }
}

impl Ord for GradeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.level(), other.level()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for GradeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// A file ready to hand to the browser's download.
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionFile {
    pub file_name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl QuestionFile {
    fn from_reply(reply: DownloadReply) -> Result<Self> {
        let file_name = reply
            .file_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "question_file".to_string());

        if let Some(encoded) = reply.file_data {
            // Uploads may arrive as data URLs.
            let payload = match encoded.split_once(";base64,") {
                Some((_, data)) => data,
                None => encoded.as_str(),
            };
            let content = STANDARD
                .decode(payload.trim())
                .map_err(|e| ClientError::Parse(format!("file data is not base64: {}", e)))?;
            return Ok(Self {
                file_name,
                mime_type: reply
                    .file_type
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
                content,
            });
        }

        match reply.text_content {
            Some(text) => Ok(Self {
                file_name,
                mime_type: reply.file_type.unwrap_or_else(|| "text/plain".to_string()),
                content: text.into_bytes(),
            }),
            None => Err(ClientError::Parse("download contained no file".to_string())),
        }
    }
}

/// Plain-text bank of every question in one grade.
pub fn bank_text(grade: &str, questions: &[&Question]) -> String {
    let mut out = format!("--- {} Grade Question Bank ---\n\n", grade);
    for (index, q) in questions.iter().enumerate() {
        let _ = writeln!(out, "Question {}: {}", index + 1, q.title_or("Untitled"));
        let _ = writeln!(out, "Subject: {}", q.subject);
        let _ = writeln!(out, "Difficulty: {}", q.difficulty_key());
        let _ = writeln!(out, "Chapter: {}", q.chapter_or_default());
        let _ = writeln!(out, "Uploaded by: {}\n", q.tutor_or_default());
        let _ = writeln!(out, "{}\n", q.question);
        let _ = writeln!(out, "{}\n", "-".repeat(50));
    }
    out
}

#[derive(Clone)]
pub struct QuestionBank<T> {
    api: ApiClient<T>,
    store: SessionStore,
}

impl<T: Transport> QuestionBank<T> {
    pub fn new(api: ApiClient<T>, store: SessionStore) -> Self {
        Self { api, store }
    }

    pub async fn load(&self) -> Result<Vec<Question>> {
        self.api.questions().await
    }

    pub fn sections(&self, questions: &[Question], filter: &QuestionFilter) -> Vec<GradeSection> {
        sections(questions, filter, &self.store.get())
    }

    pub async fn download(&self, question_id: &str) -> Result<QuestionFile> {
        require_user(&self.store)?;
        let reply = self.api.download_question(question_id).await?;
        let file = QuestionFile::from_reply(reply)?;
        info!("Downloaded {} ({} bytes)", file.file_name, file.content.len());
        Ok(file)
    }

    pub async fn question_bank(&self, grade: &str) -> Result<QuestionFile> {
        require_user(&self.store)?;
        let questions = self.load().await?;
        let in_grade: Vec<&Question> = questions.iter().filter(|q| q.grade == grade).collect();
        if in_grade.is_empty() {
            return Err(ClientError::NotFound(format!(
                "No questions found for {} grade.",
                grade
            )));
        }

        Ok(QuestionFile {
            file_name: format!("{}_question_bank.txt", grade),
            mime_type: "text/plain".to_string(),
            content: bank_text(grade, &in_grade).into_bytes(),
        })
    }

    pub async fn delete(&self, question: &Question) -> Result<Refreshed<Question>> {
        let user = require_user(&self.store)?;
        if user.role != UserRole::Tutor || !question.is_owned_by(&user.username) {
            return Err(ClientError::AccessDenied(
                "You can only delete your own questions".to_string(),
            ));
        }

        let ack = self
            .api
            .delete_question(&user.username, &question.id)
            .await?;
        info!("{} deleted question {}", user.username, question.id);

        Ok(Refreshed {
            notice: ack.message_or("Question deleted successfully!"),
            items: self.load().await?,
        })
    }
}
