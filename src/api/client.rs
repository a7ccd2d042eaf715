use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::Write;
use std::sync::Arc;

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::models::{
    ApprovalDecision, ApprovalStatus, ChatMessage, Course, Question, TutorProfile, User, UserRole,
};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LoginReply {
    pub username: String,
    #[serde(rename = "userType")]
    pub role: UserRole,
    #[serde(default, alias = "approvalStatus")]
    pub approval_status: Option<ApprovalStatus>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Plain `{success, message}` acknowledgement.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

impl Ack {
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

#[derive(Deserialize)]
struct HistoryPayload {
    #[serde(default)]
    history: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct CoursesPayload {
    #[serde(default)]
    courses: Vec<Course>,
}

#[derive(Deserialize)]
struct QuestionsPayload {
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct UsersPayload {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Deserialize)]
struct TutorsPayload {
    #[serde(default, alias = "users")]
    tutors: Vec<User>,
}

#[derive(Deserialize)]
struct CountPayload {
    #[serde(default)]
    count: u64,
}

/// Either a stored file (base64) or the question text served as a file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DownloadReply {
    #[serde(default)]
    pub file_data: Option<String>,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct DeletedUser {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub chats_deleted: u64,
    #[serde(default)]
    pub courses_deleted: u64,
    #[serde(default)]
    pub questions_deleted: u64,
}

/// Typed access to every backend endpoint the client uses.
#[derive(Clone)]
pub struct ApiClient<T> {
    transport: T,
    base_url: Arc<str>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            base_url: Arc::from(config.backend_url.as_str()),
        }
    }

    pub async fn login(&self, username: &str, password: &str, role: UserRole) -> Result<LoginReply> {
        self.call(ApiRequest::post(
            "/login",
            json!({ "username": username, "password": password, "userType": role }),
        ))
        .await
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
        tutor: Option<&TutorProfile>,
    ) -> Result<Ack> {
        let mut body = json!({ "username": username, "password": password, "userType": role });
        if let (Some(profile), Some(fields)) = (tutor, body.as_object_mut()) {
            fields.insert("fullName".into(), json!(profile.full_name));
            fields.insert("email".into(), json!(profile.email));
            fields.insert("qualification".into(), json!(profile.qualification));
            fields.insert("yearsOfExperience".into(), json!(profile.years_of_experience));
        }
        self.call(ApiRequest::post("/register", body)).await
    }

    pub async fn history(&self, username: &str) -> Result<Vec<ChatMessage>> {
        let payload: HistoryPayload = self
            .call(ApiRequest::post("/history", json!({ "username": username })))
            .await?;
        Ok(payload.history)
    }

    /// `/chat` answers `{text}` or `{error}` instead of the usual envelope.
    pub async fn chat(&self, username: &str, prompt: &str) -> Result<String> {
        let request = ApiRequest::post("/chat", json!({ "prompt": prompt, "username": username }));
        let response = self.dispatch(&request).await?;

        match response.body.get("text").and_then(Value::as_str) {
            Some(text) if response.is_http_success() && !text.is_empty() => Ok(text.to_string()),
            _ => {
                let message = response
                    .body
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown server response")
                    .to_string();
                warn!("POST /chat rejected ({}): {}", response.status, message);
                Err(ClientError::Rejected {
                    status: response.status,
                    message,
                })
            }
        }
    }

    pub async fn courses(&self) -> Result<Vec<Course>> {
        let payload: CoursesPayload = self.call(ApiRequest::get("/courses")).await?;
        Ok(payload.courses)
    }

    pub async fn enroll(&self, username: &str, course_id: &str) -> Result<Ack> {
        self.call(ApiRequest::post(
            "/courses/enroll",
            json!({ "username": username, "course_id": course_id }),
        ))
        .await
    }

    pub async fn rate(&self, username: &str, course_id: &str, chapter: usize, rating: f64) -> Result<Ack> {
        self.call(ApiRequest::post(
            "/courses/rate",
            json!({
                "username": username,
                "course_id": course_id,
                "chapter": chapter,
                "rating": rating,
            }),
        ))
        .await
    }

    pub async fn delete_course(&self, username: &str, course_id: &str) -> Result<Ack> {
        self.call(ApiRequest::delete(
            format!("/tutor/courses/{}", encode_segment(course_id)),
            json!({ "username": username }),
        ))
        .await
    }

    pub async fn questions(&self) -> Result<Vec<Question>> {
        let payload: QuestionsPayload = self.call(ApiRequest::get("/questions")).await?;
        Ok(payload.questions)
    }

    pub async fn download_question(&self, question_id: &str) -> Result<DownloadReply> {
        self.call(ApiRequest::get(format!(
            "/questions/download/{}",
            encode_segment(question_id)
        )))
        .await
    }

    pub async fn delete_question(&self, username: &str, question_id: &str) -> Result<Ack> {
        self.call(ApiRequest::delete(
            format!("/tutor/questions/{}", encode_segment(question_id)),
            json!({ "username": username }),
        ))
        .await
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        let payload: UsersPayload = self.call(ApiRequest::get("/admin/users")).await?;
        Ok(payload.users)
    }

    pub async fn delete_user(&self, username: &str) -> Result<DeletedUser> {
        self.call(ApiRequest::delete(
            format!("/admin/users/{}", encode_segment(username)),
            json!({}),
        ))
        .await
    }

    pub async fn chat_count(&self) -> Result<u64> {
        let payload: CountPayload = self.call(ApiRequest::get("/admin/chats/count")).await?;
        Ok(payload.count)
    }

    pub async fn tutors(&self, status: ApprovalStatus) -> Result<Vec<User>> {
        let payload: TutorsPayload = self
            .call(ApiRequest::get(format!("/admin/{}-tutors", status.as_str())))
            .await?;
        Ok(payload.tutors)
    }

    pub async fn decide_tutor(&self, username: &str, decision: ApprovalDecision) -> Result<Ack> {
        self.call(ApiRequest::post(decision.path(), json!({ "username": username })))
            .await
    }

    /// `/test` has no envelope; any 2xx counts as up.
    pub async fn ping(&self) -> Result<()> {
        let response = self.dispatch(&ApiRequest::get("/test")).await?;
        if response.is_http_success() {
            Ok(())
        } else {
            Err(ClientError::Rejected {
                status: response.status,
                message: server_message(&response),
            })
        }
    }

    pub async fn ping_database(&self) -> Result<Ack> {
        self.call(ApiRequest::get("/test-db")).await
    }

    async fn call<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let response = self.dispatch(&request).await?;
        read_envelope(&request, response)
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse> {
        debug!("{} {}{}", request.method, self.base_url, request.path);
        self.transport
            .send(&self.base_url, request)
            .await
            .inspect_err(|e| error!("{} {} failed: {}", request.method, request.path, e))
    }
}

fn read_envelope<R: DeserializeOwned>(request: &ApiRequest, response: ApiResponse) -> Result<R> {
    let success = response
        .body
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if !success {
        let message = server_message(&response);
        warn!(
            "{} {} rejected ({}): {}",
            request.method, request.path, response.status, message
        );
        return Err(ClientError::Rejected {
            status: response.status,
            message,
        });
    }

    serde_json::from_value(response.body).map_err(|e| {
        error!("{} {} payload unreadable: {}", request.method, request.path, e);
        ClientError::Parse(e.to_string())
    })
}

fn server_message(response: &ApiResponse) -> String {
    ["message", "error"]
        .iter()
        .find_map(|key| response.body.get(*key).and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed (HTTP {})", response.status))
}

/// Percent-encode one path segment (RFC 3986 unreserved set passes through).
pub(crate) fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
    out
}
