use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::require_user;
use crate::api::{ApiClient, Transport};
use crate::error::{ClientError, Result};
use crate::models::{ChatMessage, Sender};
use crate::session::SessionStore;

pub const GREETING_ANONYMOUS: &str = "Hello! I'm your AI Tutor. Please log in to start a session.";
pub const GREETING: &str = "Hello! I'm your AI Tutor. How can I help you learn today?";
pub const THINKING: &str = "AI Tutor is thinking...";
const CHAT_UNAVAILABLE: &str = "Sorry, the chat server is currently unavailable.";
const HISTORY_UNAVAILABLE: &str = "Could not connect to the chat history server.";

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\n\s*){2,}").expect("paragraph pattern compiles"));
static INLINE_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*|\*(.*?)\*").expect("inline pattern compiles"));

/// Piece of a rendered chat message. Text is never interpreted as HTML.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Strong(String),
    Emphasis(String),
    LineBreak,
}

pub type Paragraph = Vec<Segment>;

/// Split a message into paragraphs of typed segments. Bot replies get
/// `**strong**` and `*emphasis*`; user text only keeps its line breaks.
pub fn format_message(message: &ChatMessage) -> Vec<Paragraph> {
    match message.sender {
        Sender::User => vec![lines(&message.text, |line, out| {
            out.push(Segment::Text(line.to_string()))
        })],
        Sender::Bot => PARAGRAPH_BREAK
            .split(&message.text)
            .filter(|p| !p.trim().is_empty())
            .map(|p| lines(p, inline_markup))
            .collect(),
    }
}

fn lines(text: &str, mut render_line: impl FnMut(&str, &mut Paragraph)) -> Paragraph {
    let mut out = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push(Segment::LineBreak);
        }
        if !line.is_empty() {
            render_line(line, &mut out);
        }
    }
    out
}

fn inline_markup(line: &str, out: &mut Paragraph) {
    let mut last = 0;
    for caps in INLINE_MARKUP.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            out.push(Segment::Text(line[last..whole.start()].to_string()));
        }
        match (caps.get(1), caps.get(2)) {
            (Some(strong), _) => out.push(Segment::Strong(strong.as_str().to_string())),
            (None, Some(em)) => out.push(Segment::Emphasis(em.as_str().to_string())),
            (None, None) => {}
        }
        last = whole.end();
    }
    if last < line.len() {
        out.push(Segment::Text(line[last..].to_string()));
    }
}

/// The user's prompt and the tutor's answer (or the error shown in its place).
#[derive(Clone, Debug, PartialEq)]
pub struct Exchange {
    pub prompt: ChatMessage,
    pub reply: ChatMessage,
}

#[derive(Clone)]
pub struct ChatService<T> {
    api: ApiClient<T>,
    store: SessionStore,
}

impl<T: Transport> ChatService<T> {
    pub fn new(api: ApiClient<T>, store: SessionStore) -> Self {
        Self { api, store }
    }

    /// Transcript to show. Failures become a bot message rather than an error.
    pub async fn load(&self) -> Vec<ChatMessage> {
        let session = self.store.get();
        let Some(username) = session.username() else {
            return vec![ChatMessage::bot(GREETING_ANONYMOUS)];
        };

        match self.api.history(username).await {
            Ok(history) if history.is_empty() => vec![ChatMessage::bot(GREETING)],
            Ok(history) => {
                info!("Loaded {} chat messages for {}", history.len(), username);
                history
            }
            Err(ClientError::Rejected { message, .. }) => {
                vec![ChatMessage::bot(format!("Error loading history: {}", message))]
            }
            Err(e) if e.is_network() => vec![ChatMessage::bot(HISTORY_UNAVAILABLE)],
            Err(e) => {
                warn!("History unreadable: {}", e);
                vec![ChatMessage::bot("Error loading history: Server error.")]
            }
        }
    }

    /// Ask the tutor. A blank prompt is ignored; only a missing login is an error.
    pub async fn send(&self, prompt: &str) -> Result<Option<Exchange>> {
        let user = require_user(&self.store)?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(None);
        }

        let reply = match self.api.chat(&user.username, prompt).await {
            Ok(text) => ChatMessage::bot(text),
            Err(ClientError::Rejected { message, .. }) => {
                ChatMessage::bot(format!("Error: {}", message))
            }
            Err(e) => {
                warn!("Chat request failed: {}", e);
                ChatMessage::bot(CHAT_UNAVAILABLE)
            }
        };

        Ok(Some(Exchange {
            prompt: ChatMessage::user(prompt),
            reply,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Segment {
        Segment::Text(s.to_string())
    }

    #[test]
    fn test_bot_markup() {
        let paragraphs = format_message(&ChatMessage::bot("Use **F = ma** here, *carefully*."));
        assert_eq!(
            paragraphs,
            vec![vec![
                text("Use "),
                Segment::Strong("F = ma".into()),
                text(" here, "),
                Segment::Emphasis("carefully".into()),
                text("."),
            ]]
        );
    }

    #[test]
    fn test_paragraphs_and_line_breaks() {
        let paragraphs = format_message(&ChatMessage::bot("Step one\nStep two\n\n  \nDone"));
        assert_eq!(
            paragraphs,
            vec![
                vec![text("Step one"), Segment::LineBreak, text("Step two")],
                vec![text("Done")],
            ]
        );
    }

    #[test]
    fn test_user_text_is_literal() {
        let paragraphs = format_message(&ChatMessage::user("what is **this**?\n<b>x</b>"));
        assert_eq!(
            paragraphs,
            vec![vec![
                text("what is **this**?"),
                Segment::LineBreak,
                text("<b>x</b>"),
            ]]
        );
    }
}
