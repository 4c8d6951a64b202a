//! Shared fixtures for API integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use platewatch_api::{ApiClient, ApiError, HttpRequest, HttpResponse, HttpTransport};
use platewatch_core::{Role, Session, User};
use platewatch_session::{MemoryStorage, SessionContext};
use serde_json::Value;

/// Transport that replays queued responses and records requests.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Queues a JSON response.
    pub fn respond(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .expect("response lock should work")
            .push_back(HttpResponse {
                status,
                body: serde_json::to_vec(&body).expect("fixture body should encode"),
            });
    }

    /// Returns all recorded requests.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request lock should work").clone()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests
            .lock()
            .expect("request lock should work")
            .push(request.clone());
        self.responses
            .lock()
            .expect("response lock should work")
            .pop_front()
            .ok_or_else(|| ApiError::Transport("no scripted response".to_string()))
    }
}

/// Builds a client over a fresh in-memory session.
#[allow(dead_code)]
pub fn client() -> (ApiClient, Arc<ScriptedTransport>, SessionContext) {
    let transport = Arc::new(ScriptedTransport::default());
    let session = SessionContext::new(Arc::new(MemoryStorage::new()));
    let client = ApiClient::new("http://api.example.test/", session.clone(), transport.clone())
        .expect("client should build");
    (client, transport, session)
}

/// Fixture officer session.
#[allow(dead_code)]
pub fn officer_session() -> Session {
    Session {
        token: "token-123".to_string(),
        user: User {
            id: Some(1),
            name: "Officer".to_string(),
            email: Some("officer@example.test".to_string()),
            role: Role::Officer,
        },
    }
}
