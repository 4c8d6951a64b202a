#![warn(missing_docs)]
//! # platewatch-app
//!
//! ## Purpose
//! Wires configuration, logging, client storage, and the selected backend
//! together for the `platewatch` command-line client.
//!
//! ## Responsibilities
//! - Resolve [`AppConfig`] from the environment, with CLI overrides.
//! - Install the `tracing` subscriber once per process.
//! - Build the remote or local [`Backend`] over a shared [`SessionContext`].
//! - Load media files from disk with a MIME type guessed from the extension.
//!
//! ## Data flow
//! env + flags -> [`AppConfig`] -> [`open_session`] + [`build_backend`] ->
//! view models in `platewatch-ui` -> terminal output.
//!
//! ## Error model
//! Setup failures are [`AppError`]. The binary wraps them with `anyhow`
//! context and exits non-zero.
//!
//! ## Security and privacy notes
//! - A plain-HTTP API URL that is not loopback logs a warning.
//! - [`redact_sensitive`] scrubs credentials from free-form text before it is
//!   logged.
//!
//! ## Example
//! ```rust
//! use platewatch_app::{BackendKind, redact_sensitive};
//!
//! assert_eq!("local".parse::<BackendKind>().ok(), Some(BackendKind::Local));
//! assert_eq!(redact_sensitive("token=abc"), "token=<redacted>");
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use platewatch_api::{ApiClient, ApiError, Backend, DEFAULT_BASE_URL, RemoteBackend, ReqwestTransport};
use platewatch_core::{MediaFile, Role};
pub use platewatch_core::redact_sensitive;
use platewatch_local::LocalBackend;
use platewatch_session::{FileStorage, SessionContext};
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use url::{Host, Url};

/// Build-time application version loaded from the root `VERSION` file.
pub const APP_VERSION: &str = env!("PLATEWATCH_VERSION");
/// `User-Agent` sent to the remote API (`platewatch/<version>`).
pub const USER_AGENT: &str = env!("PLATEWATCH_USER_AGENT");

/// Env var holding the API base URL.
pub const API_URL_ENV: &str = "PLATEWATCH_API_URL";
/// Env var selecting the backend (`remote` or `local`).
pub const BACKEND_ENV: &str = "PLATEWATCH_BACKEND";
/// Env var holding the client storage path.
pub const STATE_PATH_ENV: &str = "PLATEWATCH_STATE_PATH";
/// Env var holding the log filter directive.
pub const LOG_ENV: &str = "PLATEWATCH_LOG";
/// Default client storage path, relative to the working directory.
pub const DEFAULT_STATE_PATH: &str = ".platewatch/state.json";

/// Returns the app version sourced from the root `VERSION` file.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Which [`Backend`] implementation serves requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// The REST API.
    #[default]
    Remote,
    /// Storage-backed stand-in for offline use.
    Local,
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(BackendKind::Remote),
            "local" => Ok(BackendKind::Local),
            other => Err(AppError::Config(format!(
                "unknown backend {other:?}, expected remote or local"
            ))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Remote => "remote",
            BackendKind::Local => "local",
        })
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Validated API base URL.
    pub api_url: String,
    /// Selected backend.
    pub backend: BackendKind,
    /// Client storage file.
    pub state_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            backend: BackendKind::Remote,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
        }
    }
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] for an invalid URL or backend name.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] for an invalid URL or backend name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self::default().with_overrides(
            read(API_URL_ENV).as_deref(),
            read(BACKEND_ENV).as_deref(),
            read(STATE_PATH_ENV).map(PathBuf::from),
        )
    }

    /// Applies explicit overrides on top of this configuration.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] for an invalid URL or backend name.
    pub fn with_overrides(
        mut self,
        api_url: Option<&str>,
        backend: Option<&str>,
        state_path: Option<PathBuf>,
    ) -> Result<Self, AppError> {
        if let Some(api_url) = api_url {
            self.api_url = validate_api_url(api_url)?;
        }
        if let Some(backend) = backend {
            self.backend = backend.parse()?;
        }
        if let Some(state_path) = state_path {
            self.state_path = state_path;
        }
        Ok(self)
    }
}

fn validate_api_url(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|error| AppError::Config(format!("invalid API URL: {error}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::Config(format!(
            "API URL must be http or https, got {}",
            parsed.scheme()
        )));
    }
    if !is_https_endpoint(trimmed) && !is_loopback_endpoint(trimmed) {
        warn!(host = ?parsed.host_str(), "API URL is plain HTTP on a non-loopback host");
    }
    Ok(trimmed.to_string())
}

/// Returns `true` when the endpoint URL is HTTPS.
pub fn is_https_endpoint(endpoint: &str) -> bool {
    Url::parse(endpoint)
        .map(|url| url.scheme() == "https")
        .unwrap_or(false)
}

/// Returns `true` when the endpoint host is `localhost` or a loopback IP.
pub fn is_loopback_endpoint(endpoint: &str) -> bool {
    let Ok(url) = Url::parse(endpoint) else {
        return false;
    };
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(address)) => address.is_loopback(),
        Some(Host::Ipv6(address)) => address.is_loopback(),
        None => false,
    }
}

/// Picks the log filter: `PLATEWATCH_LOG`, then `RUST_LOG`, then `info`.
pub fn log_filter_directive<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    [LOG_ENV, "RUST_LOG"]
        .into_iter()
        .find_map(|key| lookup(key).filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| "info".to_string())
}

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// # Errors
/// Returns [`AppError::Logging`] for an unparsable directive or when a
/// subscriber is already installed.
pub fn init_logging() -> Result<(), AppError> {
    let directive = log_filter_directive(|key| std::env::var(key).ok());
    let filter = EnvFilter::try_new(&directive)
        .map_err(|error| AppError::Logging(format!("invalid log filter {directive:?}: {error}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| AppError::Logging(error.to_string()))
}

/// Opens the file-backed session at the configured path.
pub fn open_session(config: &AppConfig) -> SessionContext {
    SessionContext::new(Arc::new(FileStorage::new(config.state_path.clone())))
}

/// Builds the configured backend over `session`.
///
/// # Errors
/// Returns [`AppError::Api`] when the HTTP client cannot be created or the
/// base URL is rejected.
pub fn build_backend(
    config: &AppConfig,
    session: &SessionContext,
) -> Result<Arc<dyn Backend>, AppError> {
    Ok(match config.backend {
        BackendKind::Remote => {
            let transport = Arc::new(ReqwestTransport::new(USER_AGENT)?);
            let client = ApiClient::new(&config.api_url, session.clone(), transport)?;
            Arc::new(RemoteBackend::new(client))
        }
        BackendKind::Local => Arc::new(LocalBackend::new(session.clone())),
    })
}

/// Resolves the role requested at registration.
///
/// Administrators can only be created against the local backend; the remote
/// API assigns roles itself.
///
/// # Errors
/// Returns [`AppError::Config`] when an administrator is requested for the
/// remote backend.
pub fn registration_role(config: &AppConfig, admin: bool) -> Result<Role, AppError> {
    match (admin, config.backend) {
        (false, _) => Ok(Role::Officer),
        (true, BackendKind::Local) => Ok(Role::Admin),
        (true, BackendKind::Remote) => Err(AppError::Config(
            "administrator accounts can only be registered with the local backend".to_string(),
        )),
    }
}

/// Guesses a MIME type from a file extension.
pub fn guess_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Reads a file from disk as a [`MediaFile`].
///
/// # Errors
/// Returns [`AppError::Io`] when the file cannot be read.
pub fn load_media(path: &Path) -> Result<MediaFile, AppError> {
    let bytes = std::fs::read(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(MediaFile::new(name, guess_mime(path), bytes))
}

/// App setup error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
    /// Logging could not be initialized.
    #[error("logging error: {0}")]
    Logging(String),
    /// Backend construction failed.
    #[error("backend error: {0}")]
    Api(#[from] ApiError),
    /// Local file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    //! Unit tests for backend selection and MIME guessing.

    use super::*;

    #[test]
    fn backend_kind_parses_case_insensitively() {
        assert_eq!("Remote".parse::<BackendKind>().ok(), Some(BackendKind::Remote));
        assert_eq!(" LOCAL ".parse::<BackendKind>().ok(), Some(BackendKind::Local));
        assert!("mock".parse::<BackendKind>().is_err());
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(guess_mime(Path::new("car.JPG")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(guess_mime(Path::new("notes.txt")), "text/plain");
        assert_eq!(guess_mime(Path::new("README")), "application/octet-stream");
    }

    #[test]
    fn loopback_hosts_are_recognized() {
        assert!(is_loopback_endpoint("http://127.0.0.1:8000"));
        assert!(is_loopback_endpoint("http://localhost:8000"));
        assert!(is_loopback_endpoint("http://[::1]:8000"));
        assert!(!is_loopback_endpoint("http://10.0.0.4:8000"));
    }
}
