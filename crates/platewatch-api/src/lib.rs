#![warn(missing_docs)]
//! # platewatch-api
//!
//! ## Purpose
//! Wraps every outbound call to the detection/complaint REST API.
//!
//! ## Responsibilities
//! - Build requests against the configured base URL and attach the bearer
//!   token held by the [`SessionContext`].
//! - Normalize failures into [`ApiError`], including the forced session clear
//!   on HTTP 401.
//! - Define the [`Backend`] capability and its live implementation,
//!   [`RemoteBackend`].
//!
//! ## Data flow
//! View models call [`Backend`] operations -> [`RemoteBackend`] shapes the
//! endpoint call -> [`ApiClient::request`] sends it through an
//! [`HttpTransport`] -> JSON body is decoded into `platewatch-core` types.
//!
//! ## Ownership and lifetimes
//! Requests own their bodies so transports can be swapped (blocking HTTP in
//! production, scripted transports in tests) without lifetime coupling.
//!
//! ## Error model
//! One attempt per call: no retry, no timeout, no backoff. Non-2xx responses
//! carry the server message (`detail`, then `message`, then `error`).
//!
//! ## Security and privacy notes
//! Request logs include method, endpoint, and status only. Bodies and tokens
//! are never logged.

mod backend;
mod transport;

use std::sync::Arc;

use platewatch_core::{CoreError, MediaFile, redact_sensitive};
use platewatch_session::{SessionContext, StorageError};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub use backend::{Backend, ComplaintPage, RemoteBackend, VEHICLE_QUERY_SOURCE};
pub use transport::ReqwestTransport;

/// Fallback message when an error body names no message.
pub const GENERIC_FAILURE_MESSAGE: &str = "API Request Failed";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// HTTP method subset used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`.
    Get,
    /// `POST`.
    Post,
    /// `PUT`.
    Put,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        })
    }
}

/// Request body variants.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON document.
    Json(Value),
    /// Multipart upload with a single `file` field.
    File(MediaFile),
}

/// Per-call options passed to [`ApiClient::request`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// HTTP method.
    pub method: Method,
    /// Request body.
    pub body: RequestBody,
}

impl RequestOptions {
    /// `GET` without a body.
    pub fn get() -> Self {
        Self {
            method: Method::Get,
            body: RequestBody::Empty,
        }
    }

    /// `POST` with a JSON body.
    pub fn post_json(body: Value) -> Self {
        Self {
            method: Method::Post,
            body: RequestBody::Json(body),
        }
    }

    /// `PUT` with a JSON body.
    pub fn put_json(body: Value) -> Self {
        Self {
            method: Method::Put,
            body: RequestBody::Json(body),
        }
    }

    /// `POST` with a multipart file body.
    pub fn post_file(file: MediaFile) -> Self {
        Self {
            method: Method::Post,
            body: RequestBody::File(file),
        }
    }
}

/// Fully resolved request handed to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: RequestBody,
}

impl HttpRequest {
    /// Returns the first header value with a case-insensitive name match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw transport response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

/// Abstract HTTP transport used by [`ApiClient`].
pub trait HttpTransport: Send + Sync {
    /// Sends one request and returns the raw response.
    ///
    /// # Errors
    /// Returns [`ApiError::Transport`] when no response was received.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Client for the detection/complaint API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    session: SessionContext,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidEndpoint`] when the URL does not parse or
    /// is not http(s).
    pub fn new(
        base_url: &str,
        session: SessionContext,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|error| ApiError::InvalidEndpoint(format!("invalid base url: {error}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidEndpoint(format!(
                "unsupported scheme {}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            transport,
        })
    }

    /// Returns the configured base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the session context used for bearer tokens.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Sends one request and returns the decoded JSON body.
    ///
    /// # Side effects
    /// On HTTP 401 the persisted session is cleared before
    /// [`ApiError::Unauthorized`] is returned.
    ///
    /// # Errors
    /// - [`ApiError::Unauthorized`] for 401.
    /// - [`ApiError::Status`] for any other non-2xx status.
    /// - [`ApiError::Transport`] / [`ApiError::Decode`] for transport and
    ///   body failures.
    pub fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let mut headers = Vec::new();
        if matches!(options.body, RequestBody::Json(_)) {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = self.session.token()? {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let request = HttpRequest {
            method: options.method,
            url: format!("{}{}", self.base_url, endpoint),
            headers,
            body: options.body,
        };

        let response = self.transport.send(&request).inspect_err(|error| {
            warn!(
                method = %request.method,
                endpoint,
                error = %redact_sensitive(&error.to_string()),
                "api request failed"
            );
        })?;
        debug!(method = %request.method, endpoint, status = response.status, "api request completed");

        if response.status == 401 {
            warn!(endpoint, "unauthorized response, clearing session");
            self.session.clear()?;
            let body = decode_body(&response.body).unwrap_or(Value::Null);
            return Err(ApiError::Unauthorized {
                message: error_message(&body),
            });
        }

        if !(200..300).contains(&response.status) {
            let body = decode_body(&response.body).unwrap_or(Value::Null);
            return Err(ApiError::Status {
                status: response.status,
                message: error_message(&body),
            });
        }

        decode_body(&response.body)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn decode_body(raw: &[u8]) -> Result<Value, ApiError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(raw).map_err(|error| ApiError::Decode(error.to_string()))
}

/// Extracts the user-facing message from an error body.
///
/// The first present field of `detail`, `message`, `error` wins; non-string
/// values (for example validation arrays) are rendered as compact JSON.
pub fn error_message(body: &Value) -> String {
    for key in ["detail", "message", "error"] {
        match body.get(key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(message)) if message.is_empty() => continue,
            Some(Value::String(message)) => return message.clone(),
            Some(other) => return other.to_string(),
        }
    }
    GENERIC_FAILURE_MESSAGE.to_string()
}

/// Errors produced by API calls and backends.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Base URL violates client policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// HTTP 401; the session has already been cleared.
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Server-supplied message.
        message: String,
    },
    /// Any other non-2xx status.
    #[error("{message} (HTTP {status})")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-supplied message.
        message: String,
    },
    /// No response was received.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Response body did not match the expected shape.
    #[error("response decode failure: {0}")]
    Decode(String),
    /// Analysis endpoint reported a failure inside a 2xx body.
    #[error("{0}")]
    Analysis(String),
    /// Persisted client state could not be read or written.
    #[error("client storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Returns the HTTP status behind this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the message suitable for a user-facing notice.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized { message } | ApiError::Status { message, .. } => {
                message.clone()
            }
            ApiError::Analysis(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Decode(inner) => ApiError::Decode(inner.to_string()),
            CoreError::AnalysisFailed(message) => ApiError::Analysis(message),
        }
    }
}
