//! Scripted in-memory backend. Responses are queued per route; the last one
//! queued for a route keeps answering once the others are used up.

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use super::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::{ClientError, Result};

type Route = (Method, String);

#[derive(Default)]
struct MockState {
    routes: HashMap<Route, VecDeque<Result<ApiResponse>>>,
    requests: Vec<ApiRequest>,
}

#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.push(method, path, Ok(ApiResponse::new(status, body)))
    }

    pub fn ok(&self, method: Method, path: &str, body: Value) -> &Self {
        self.respond(method, path, 200, body)
    }

    /// Route answers with a transport failure, as if the server were down.
    pub fn unreachable(&self, method: Method, path: &str) -> &Self {
        self.push(
            method,
            path,
            Err(ClientError::Network("connection refused".to_string())),
        )
    }

    /// Drop everything queued for a route so the next `respond` replaces it.
    pub fn clear(&self, method: Method, path: &str) -> &Self {
        self.state.lock().routes.remove(&(method, path.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    /// A small populated backend: two tutors' courses and questions, a few users.
    pub fn demo() -> Self {
        let mock = Self::new();
        mock.ok(Method::Get, "/test", json!({ "status": "Server is running" }))
            .ok(
                Method::Get,
                "/test-db",
                json!({ "success": true, "message": "Database connected" }),
            )
            .ok(Method::Get, "/courses", demo_courses())
            .ok(Method::Get, "/questions", demo_questions())
            .ok(Method::Get, "/admin/users", demo_users())
            .ok(
                Method::Get,
                "/admin/chats/count",
                json!({ "success": true, "count": 42 }),
            );
        mock
    }

    fn push(&self, method: Method, path: &str, response: Result<ApiResponse>) -> &Self {
        self.state
            .lock()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }
}

impl Transport for MockTransport {
    async fn send(&self, _base_url: &str, request: &ApiRequest) -> Result<ApiResponse> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());

        let key = (request.method, request.path.clone());
        let queue = state.routes.get_mut(&key).ok_or_else(|| {
            ClientError::Network(format!("no route for {} {}", request.method, request.path))
        })?;

        if queue.len() > 1 {
            queue
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Network("empty route".to_string())))
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ClientError::Network("empty route".to_string())))
        }
    }
}

fn demo_courses() -> Value {
    json!({
        "success": true,
        "count": 3,
        "courses": [
            {
                "_id": "c-mech",
                "title": "Mechanics Basics",
                "description": "Motion, forces and energy.",
                "subject": "Physics",
                "grade": "10th",
                "tutor_username": "alice",
                "chapters": [
                    { "title": "Motion", "videos": ["https://www.youtube.com/watch?v=m1", "https://cdn.example.com/v/motion-2.mp4", "https://vimeo.com/3"] },
                    { "title": "Forces", "videos": ["https://cdn.example.com/v/forces.mp4"] },
                    { "title": "Energy", "videos": [] },
                    { "title": "Momentum", "videos": [] }
                ],
                "enrollments": ["sam"],
                "ratings": [
                    { "student": "sam", "chapter": 0, "rating": 4.0, "rated_at": "2024-05-03T09:00:00" },
                    { "student": "sam", "chapter": 1, "rating": 3.0, "rated_at": "2024-05-04T09:00:00" }
                ],
                "avg_rating": 3.5,
                "total_videos": 4,
                "enrollment_count": 1,
                "created_at": "2024-05-01T10:00:00.000123"
            },
            {
                "_id": "c-chem",
                "title": "Acids and Bases",
                "subject": "Chemistry",
                "grade": "10th",
                "tutor_username": "alice",
                "chapters": [{ "title": "pH", "videos": ["https://cdn.example.com/v/ph.mp4"] }],
                "enrollments": [],
                "ratings": [],
                "avg_rating": 0,
                "total_videos": 1,
                "created_at": "2024-04-20T08:00:00"
            },
            {
                "_id": "c-optics",
                "title": "Optics",
                "subject": "physics",
                "grade": "12th",
                "tutor_username": "bob",
                "chapters": [{ "title": "Lenses", "videos": [] }],
                "enrollments": ["sam", "kim"],
                "ratings": [{ "student": "kim", "chapter": 0, "rating": 5 }],
                "avg_rating": 5.0,
                "total_videos": 0,
                "created_at": "2024-03-02T12:00:00"
            }
        ]
    })
}

fn demo_questions() -> Value {
    json!({
        "success": true,
        "count": 3,
        "questions": [
            {
                "_id": "q-newton",
                "title": "Newton's Second Law",
                "question": "A 2 kg cart accelerates at 3 m/s^2. What net force acts on it?",
                "subject": "Physics",
                "grade": "10th",
                "difficulty": "easy",
                "chapter": "Forces",
                "tutor_username": "alice",
                "downloads": 5,
                "has_file": false,
                "created_at": "2024-05-02T10:00:00"
            },
            {
                "_id": "q-titration",
                "question": "Describe how to find the end point of an acid-base titration.",
                "subject": "Chemistry",
                "grade": "12th",
                "difficulty": "hard",
                "tutor_username": "bob",
                "downloads": 1,
                "has_file": true,
                "created_at": "2024-05-03T10:00:00"
            },
            {
                "_id": "q-ohm",
                "title": "Ohm's Law",
                "question": "A 10 ohm resistor carries 0.5 A. Find the voltage across it.",
                "subject": "Physics",
                "grade": "12th",
                "difficulty": "medium",
                "chapter": "Electricity",
                "tutor_username": "bob",
                "downloads": 0,
                "has_file": false,
                "created_at": "2024-05-04T10:00:00"
            }
        ]
    })
}

fn demo_users() -> Value {
    json!({
        "success": true,
        "count": 5,
        "users": [
            { "_id": "u1", "username": "root", "userType": "admin", "createdAt": "2024-01-01T00:00:00" },
            { "_id": "u2", "username": "alice", "userType": "tutor", "createdAt": "2024-01-05T09:30:00", "approval_status": "approved", "fullName": "Alice Moreau" },
            { "_id": "u3", "username": "bob", "userType": "tutor", "createdAt": "2024-02-10T14:00:00", "approval_status": "pending", "fullName": "Bob" },
            { "_id": "u4", "username": "sam", "userType": "student", "createdAt": "2024-03-01T08:15:00" },
            { "_id": "u5", "username": "kim", "userType": "student" }
        ]
    })
}
