//! Blocking HTTP transport.

use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};

use crate::{ApiError, HttpRequest, HttpResponse, HttpTransport, Method, RequestBody};

/// [`HttpTransport`] backed by a blocking `reqwest` client.
///
/// The client is built without a request timeout; a hung call blocks until
/// the transport itself gives up.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the transport, sending `user_agent` on every request.
    ///
    /// # Errors
    /// Returns [`ApiError::Transport`] when the TLS backend cannot be
    /// initialized.
    pub fn new(user_agent: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|error| ApiError::Transport(format!("client init failed: {error}")))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                let encoded = serde_json::to_vec(value)
                    .map_err(|error| ApiError::Decode(error.to_string()))?;
                builder.body(encoded)
            }
            RequestBody::File(file) => {
                // Content type (with boundary) comes from the multipart form.
                let part = Part::bytes(file.bytes.clone())
                    .file_name(file.name.clone())
                    .mime_str(&file.mime)
                    .map_err(|error| ApiError::Transport(format!("invalid mime type: {error}")))?;
                builder.multipart(Form::new().part("file", part))
            }
        };

        let response = builder
            .send()
            .map_err(|error| ApiError::Transport(error.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|error| ApiError::Transport(format!("body read failed: {error}")))?
            .to_vec();

        Ok(HttpResponse { status, body })
    }
}
