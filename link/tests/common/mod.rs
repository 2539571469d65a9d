#![allow(dead_code)]
//! Shared helpers: a scripted in-memory backend for the admin client.

use async_trait::async_trait;
use booking_link::{
    AdminClient, AdminDashboard, AdminSessionGuard, ApiError, ApiRequest, ApiResponse, Credential,
    MemoryCredentialStore, Record, Transport,
};
use parking_lot::Mutex;
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// One request as seen by the fake backend.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub credential: Credential,
}

type Reply = Result<ApiResponse, ApiError>;

/// Replies are queued per `METHOD path`; the last queued reply repeats.
/// Unscripted routes answer 404.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

fn route_key(method: &Method, path: &str) -> String {
    format!("{} {}", method, path)
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, method: Method, path: &str, reply: Reply) {
        self.replies
            .lock()
            .entry(route_key(&method, path))
            .or_default()
            .push_back(reply);
    }

    pub fn reply_json(&self, method: Method, path: &str, body: Value) {
        self.reply(method, path, Ok(ApiResponse::json(body)));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method && call.path == path)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let path = request.path.to_string();
        self.calls.lock().push(RecordedCall {
            method: request.method.clone(),
            path: path.clone(),
            query: request.query.clone(),
            body: request.body.clone(),
            credential: request.credential.clone(),
        });

        let mut replies = self.replies.lock();
        match replies.get_mut(&route_key(&request.method, &path)) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if queue.len() == 1 => queue[0].clone(),
            _ => Err(ApiError::NotFound {
                message: format!("no scripted reply for {} {}", request.method, path),
            }),
        }
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn session() -> Credential {
    Credential::session_cookie("session", "test-sid")
}

pub fn client_over(fake: &Arc<FakeTransport>, credential: Credential) -> AdminClient {
    AdminClient::builder()
        .credential(credential)
        .build_with_transport(fake.clone())
        .expect("client")
}

pub fn guard_over(fake: &Arc<FakeTransport>, credential: Credential) -> AdminSessionGuard {
    AdminSessionGuard::new(
        client_over(fake, credential),
        Box::new(MemoryCredentialStore::new()),
        "test",
    )
}

pub fn dashboard_over(fake: &Arc<FakeTransport>) -> AdminDashboard {
    AdminDashboard::new(guard_over(fake, session()))
}

pub fn admin_identity() -> Value {
    json!({ "name": "Ann Admin", "email": "admin@x.com", "role": "admin" })
}

pub fn record(value: Value) -> Record {
    serde_json::from_value(value).expect("record")
}

/// Fake backend with one admin and a `users` table holding Ann.
pub fn users_backend() -> Arc<FakeTransport> {
    init_logging();
    let fake = FakeTransport::new();
    fake.reply_json(Method::GET, "/admin/check-auth", admin_identity());
    fake.reply_json(
        Method::GET,
        "/admin/tables",
        json!([{ "name": "users", "fields": 4 }, { "name": "bookings", "fields": 6 }]),
    );
    fake.reply_json(
        Method::GET,
        "/admin/tables/users",
        json!([{ "id": 1, "full_name": "Ann", "email": "a@x.com" }]),
    );
    fake.reply_json(Method::GET, "/admin/tables/bookings", json!([]));
    fake
}

/// Mounted dashboard over [`users_backend`].
pub async fn mounted_dashboard(fake: &Arc<FakeTransport>) -> AdminDashboard {
    let mut dashboard = dashboard_over(fake);
    let outcome = dashboard.mount().await;
    assert!(
        matches!(outcome, booking_link::MountOutcome::Ready(_)),
        "mount failed: {:?}",
        outcome
    );
    dashboard
}
