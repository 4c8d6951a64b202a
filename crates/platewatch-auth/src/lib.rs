#![warn(missing_docs)]
//! # platewatch-auth
//!
//! ## Purpose
//! Implements login, registration, logout, and the page guards for
//! `platewatch`.
//!
//! ## Responsibilities
//! - Gate the submit control so one login/registration is in flight at a
//!   time.
//! - Persist the session on success and pick the landing page by role.
//! - Map failure status codes to the user-facing hints.
//! - Guard protected pages (`check_auth`) and the admin page
//!   (`require_admin`).
//!
//! ## Data flow
//! CLI collects credentials -> [`AuthController::login`] calls
//! [`Backend::login`] -> [`SessionContext::save`] -> [`AuthOutcome::Navigate`].
//!
//! ## Error model
//! Credential and validation failures are not errors: they come back as
//! [`AuthOutcome::Failed`] carrying a [`Notice`]. Only storage failures while
//! reading the session are [`AuthError`].
//!
//! ## Security and privacy notes
//! E-mail addresses, passwords, and tokens are never logged.
//!
//! ## Example
//! ```rust
//! use platewatch_auth::login_failure_message;
//! use platewatch_api::ApiError;
//!
//! let error = ApiError::Unauthorized { message: "Incorrect username or password".into() };
//! assert_eq!(login_failure_message(&error), "Hatalı e-posta veya şifre.");
//! ```

use std::sync::Arc;

use platewatch_api::{ApiError, Backend};
use platewatch_core::{
    LoginRequest, Notice, Page, RegisterRequest, Role, Session, User, redact_sensitive,
};
use platewatch_session::{SessionContext, StorageError};
use thiserror::Error;
use tracing::{info, warn};

/// Hint shown for HTTP 422 and locally detected blank fields.
pub const VALIDATION_HINT: &str = "Girdiğiniz bilgileri kontrol ediniz (Eksik veya hatalı veri).";
/// Hint shown for HTTP 401 on login.
pub const CREDENTIAL_HINT: &str = "Hatalı e-posta veya şifre.";
/// Hint shown for HTTP 400 on registration.
pub const DUPLICATE_EMAIL_HINT: &str = "Bu e-posta adresi ile daha önce kayıt olunmuş.";
/// Notice title for failed logins.
pub const LOGIN_FAILED_TITLE: &str = "Giriş Başarısız";
/// Notice title for failed registrations.
pub const REGISTER_FAILED_TITLE: &str = "Kayıt Başarısız";
/// Notice title when a non-admin opens the admin page.
pub const ACCESS_DENIED_TITLE: &str = "Erişim Reddedildi";
/// Notice body when a non-admin opens the admin page.
pub const ACCESS_DENIED_MESSAGE: &str = "Bu sayfaya erişim yetkiniz yok!";

/// Authentication state derived from the persisted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No session.
    Anonymous,
    /// Session present for the given role.
    Authenticated(Role),
}

/// Result of a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Success; the client should navigate.
    Navigate(Page),
    /// Failure to show in a modal; the submit control is enabled again.
    Failed(Notice),
    /// Submission ignored because another one is in flight.
    Ignored,
}

/// Result of [`AuthController::check_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthGuard {
    /// A token exists. The user profile is shown when available.
    Allowed(Option<User>),
    /// No token; go to the login page.
    Redirect(Page),
}

/// Result of [`AuthController::require_admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminGuard {
    /// The session belongs to an administrator.
    Granted(User),
    /// Access denied; show the notice, then navigate.
    Denied {
        /// Access denied notice.
        notice: Notice,
        /// Where to go afterwards.
        redirect: Page,
    },
}

/// Login/registration form controller.
pub struct AuthController {
    session: SessionContext,
    backend: Arc<dyn Backend>,
    submit_enabled: bool,
}

impl AuthController {
    /// Creates a controller with the submit control enabled.
    pub fn new(session: SessionContext, backend: Arc<dyn Backend>) -> Self {
        Self {
            session,
            backend,
            submit_enabled: true,
        }
    }

    /// Returns `true` when the submit control accepts input.
    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    /// Returns the current state from persisted session data.
    pub fn state(&self) -> Result<AuthState, AuthError> {
        Ok(match self.session.load()? {
            Some(session) => AuthState::Authenticated(session.user.role),
            None => AuthState::Anonymous,
        })
    }

    /// Submits the login form.
    ///
    /// On success the session is saved and the control stays disabled, since
    /// the client navigates away.
    pub fn login(&mut self, email: &str, password: &str) -> AuthOutcome {
        if !self.submit_enabled {
            return AuthOutcome::Ignored;
        }
        if email.trim().is_empty() || password.is_empty() {
            return AuthOutcome::Failed(Notice::error(LOGIN_FAILED_TITLE, VALIDATION_HINT));
        }

        self.submit_enabled = false;
        info!("login attempt");
        match self.perform_login(email, password) {
            Ok(role) => {
                info!(?role, "login succeeded");
                AuthOutcome::Navigate(landing_page(role))
            }
            Err(error) => {
                warn!(error = %redact_sensitive(&error.to_string()), "login failed");
                self.submit_enabled = true;
                AuthOutcome::Failed(Notice::error(
                    LOGIN_FAILED_TITLE,
                    login_failure_message(&error),
                ))
            }
        }
    }

    /// Submits the registration form and chains into login.
    pub fn register(&mut self, name: &str, email: &str, password: &str) -> AuthOutcome {
        self.register_as(name, email, password, Role::Officer)
    }

    /// Registers an account with an explicit role and chains into login.
    ///
    /// The remote API assigns roles server-side; an explicit role is only
    /// honored by backends that store accounts locally.
    pub fn register_as(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> AuthOutcome {
        if !self.submit_enabled {
            return AuthOutcome::Ignored;
        }
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return AuthOutcome::Failed(Notice::error(REGISTER_FAILED_TITLE, VALIDATION_HINT));
        }

        self.submit_enabled = false;
        info!("registration attempt");
        let result = self
            .backend
            .register(&RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role,
            })
            .and_then(|()| self.perform_login(email, password));

        match result {
            Ok(role) => AuthOutcome::Navigate(landing_page(role)),
            Err(error) => {
                warn!(error = %redact_sensitive(&error.to_string()), "registration failed");
                self.submit_enabled = true;
                AuthOutcome::Failed(Notice::error(
                    REGISTER_FAILED_TITLE,
                    register_failure_message(&error),
                ))
            }
        }
    }

    fn perform_login(&self, email: &str, password: &str) -> Result<Role, ApiError> {
        let response = self.backend.login(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let role = response.user.role;
        self.session.save(&Session {
            token: response.token,
            user: response.user,
        })?;
        Ok(role)
    }

    /// Guard run on every protected page load.
    pub fn check_auth(&self) -> Result<AuthGuard, AuthError> {
        if self.session.token()?.is_none() {
            return Ok(AuthGuard::Redirect(Page::Login));
        }
        Ok(AuthGuard::Allowed(self.session.user()?))
    }

    /// Guard run when the admin page loads.
    pub fn require_admin(&self) -> Result<AdminGuard, AuthError> {
        match self.session.load()? {
            Some(session) if session.user.is_admin() => Ok(AdminGuard::Granted(session.user)),
            _ => Ok(AdminGuard::Denied {
                notice: Notice::error(ACCESS_DENIED_TITLE, ACCESS_DENIED_MESSAGE),
                redirect: Page::Dashboard,
            }),
        }
    }

    /// Fetches the profile behind the current token.
    pub fn profile(&self) -> Result<User, AuthError> {
        Ok(self.backend.profile()?)
    }

    /// Clears the session and returns the login page.
    pub fn logout(&self) -> Result<Page, AuthError> {
        self.session.clear()?;
        info!("logged out");
        Ok(Page::Login)
    }
}

impl std::fmt::Debug for AuthController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthController")
            .field("submit_enabled", &self.submit_enabled)
            .finish_non_exhaustive()
    }
}

/// Landing page after login.
pub fn landing_page(role: Role) -> Page {
    match role {
        Role::Admin => Page::Admin,
        Role::Officer => Page::Dashboard,
    }
}

/// Maps a login failure to its user-facing message.
pub fn login_failure_message(error: &ApiError) -> String {
    match error.status() {
        Some(422) => VALIDATION_HINT.to_string(),
        Some(401) => CREDENTIAL_HINT.to_string(),
        _ => error.user_message(),
    }
}

/// Maps a registration failure to its user-facing message.
///
/// Covers both the registration call and the chained login.
pub fn register_failure_message(error: &ApiError) -> String {
    match error.status() {
        Some(422) => VALIDATION_HINT.to_string(),
        Some(400) => DUPLICATE_EMAIL_HINT.to_string(),
        _ => error.user_message(),
    }
}

/// Errors raised while reading auth state.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Session storage could not be read or written.
    #[error("session storage failure: {0}")]
    Storage(#[from] StorageError),
    /// Backend call failed.
    #[error("auth backend failure: {0}")]
    Api(#[from] ApiError),
}
