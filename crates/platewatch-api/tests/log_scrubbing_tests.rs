//! Integration tests for credential scrubbing in request logs.

use std::io;
use std::sync::{Arc, Mutex};

use platewatch_api::{ApiClient, ApiError, HttpRequest, HttpResponse, HttpTransport, RequestOptions};
use platewatch_session::{MemoryStorage, SessionContext};

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log lock should work")).into_owned()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log lock should work").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct LeakyTransport;

impl HttpTransport for LeakyTransport {
    fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        Err(ApiError::Transport(
            "proxy refused authorization=Bearer s3cr3t-value".to_string(),
        ))
    }
}

#[test]
fn log_scrubbing_tests_transport_failure_hides_credentials() {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    let session = SessionContext::new(Arc::new(MemoryStorage::new()));
    let client = ApiClient::new("http://api.example.test", session, Arc::new(LeakyTransport))
        .expect("client should build");

    let result = tracing::subscriber::with_default(subscriber, || {
        client.request("/complaints/", RequestOptions::get())
    });

    assert!(matches!(result, Err(ApiError::Transport(_))));
    let text = log.text();
    assert!(text.contains("api request failed"));
    assert!(text.contains("<redacted>"));
    assert!(!text.contains("s3cr3t-value"));
}
