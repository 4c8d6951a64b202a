//! Shared fixtures for view model integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use platewatch_api::{
    ApiClient, ApiError, Backend, HttpRequest, HttpResponse, HttpTransport, RemoteBackend,
};
use platewatch_core::{LoginRequest, NewComplaint, RegisterRequest, Role, Session, User};
use platewatch_local::LocalBackend;
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
    #[allow(dead_code)]
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

/// Remote backend over a scripted transport and a fresh session.
#[allow(dead_code)]
pub fn remote() -> (Arc<dyn Backend>, Arc<ScriptedTransport>, SessionContext) {
    let transport = Arc::new(ScriptedTransport::default());
    let session = SessionContext::new(Arc::new(MemoryStorage::new()));
    let client = ApiClient::new("http://api.example.test", session.clone(), transport.clone())
        .expect("client should build");
    (Arc::new(RemoteBackend::new(client)), transport, session)
}

/// Local backend with a registered, logged-in fixture officer.
#[allow(dead_code)]
pub fn local_officer() -> (Arc<dyn Backend>, SessionContext) {
    let session = SessionContext::new(Arc::new(MemoryStorage::new()));
    let backend = LocalBackend::new(session.clone());
    backend
        .register(&RegisterRequest {
            name: "Fixture Officer".to_string(),
            email: "fixture@example.test".to_string(),
            password: "fixture-pass".to_string(),
            role: Role::Officer,
        })
        .expect("fixture registration should work");
    let response = backend
        .login(&LoginRequest {
            email: "fixture@example.test".to_string(),
            password: "fixture-pass".to_string(),
        })
        .expect("fixture login should work");
    session
        .save(&Session {
            token: response.token,
            user: response.user,
        })
        .expect("session should save");
    (Arc::new(backend), session)
}

/// Replaces the session with a fixture administrator.
#[allow(dead_code)]
pub fn act_as_admin(session: &SessionContext) {
    session
        .save(&Session {
            token: "local-admin".to_string(),
            user: User {
                id: Some(99),
                name: "Fixture Admin".to_string(),
                email: None,
                role: Role::Admin,
            },
        })
        .expect("admin session should save");
}

/// Complaint body for `plate`.
#[allow(dead_code)]
pub fn new_complaint(plate: &str, description: &str) -> NewComplaint {
    NewComplaint {
        plate: plate.to_string(),
        description: description.to_string(),
        date: "12.05.2025".to_string(),
        location: "Moda, Kadıköy, İstanbul".to_string(),
        city: Some("İstanbul".to_string()),
        district: Some("Kadıköy".to_string()),
        neighborhood: Some("Moda".to_string()),
        address_detail: None,
    }
}
