#![warn(missing_docs)]
//! # platewatch-local
//!
//! ## Purpose
//! Offline [`Backend`] that keeps accounts and complaints in client storage.
//!
//! ## Responsibilities
//! - Register and log in a single local account (`registered_user`).
//! - Persist complaints under `complaints` with the same status workflow and
//!   role rules as the live API.
//! - Report failures with the same status codes as the live API so
//!   controllers behave identically in both modes.
//!
//! ## Data flow
//! Controllers call [`Backend`] operations -> [`LocalBackend`] reads and
//! rewrites JSON values in [`ClientStorage`] -> owned model values return.
//!
//! ## Error model
//! Business-rule failures are [`ApiError::Status`] (400 duplicate, 401 bad
//! credentials, 403 role, 404 unknown id, 501 detection). Storage failures
//! are [`ApiError::Storage`].
//!
//! ## Security and privacy notes
//! No credentials are built in. Accounts exist only after `register`; test
//! suites seed their own fixture user.

use std::sync::Arc;

use chrono::Utc;
use platewatch_api::{ApiError, Backend, ComplaintPage};
use platewatch_core::{
    Complaint, ComplaintStatus, ComplaintUpdate, ImageAnalysis, LoginRequest, LoginResponse,
    MediaFile, NewComplaint, RegisterRequest, Role, User, VehicleQueryOutcome, VideoAnalysis,
};
use platewatch_session::{COMPLAINTS_KEY, ClientStorage, REGISTERED_USER_KEY, SessionContext};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Id assigned to the single local account.
pub const LOCAL_USER_ID: i64 = 1;

/// Message returned by detection calls in local mode.
pub const DETECTION_UNAVAILABLE: &str = "Detection is not available in local mode";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RegisteredUser {
    name: String,
    email: String,
    password: String,
    role: Role,
}

impl RegisteredUser {
    fn profile(&self) -> User {
        User {
            id: Some(LOCAL_USER_ID),
            name: self.name.clone(),
            email: Some(self.email.clone()),
            role: self.role,
        }
    }
}

/// [`Backend`] persisted in client storage.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    session: SessionContext,
}

impl LocalBackend {
    /// Creates a backend sharing the session's storage.
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }

    fn storage(&self) -> Arc<dyn ClientStorage> {
        self.session.storage()
    }

    fn registered_user(&self) -> Result<Option<RegisteredUser>, ApiError> {
        match self.storage().get(REGISTERED_USER_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|error| ApiError::Decode(error.to_string())),
            None => Ok(None),
        }
    }

    fn complaints(&self) -> Result<Vec<Complaint>, ApiError> {
        match self.storage().get(COMPLAINTS_KEY)? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|error| ApiError::Decode(error.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    fn store_complaints(&self, complaints: &[Complaint]) -> Result<(), ApiError> {
        let encoded =
            serde_json::to_string(complaints).map_err(|error| ApiError::Decode(error.to_string()))?;
        self.storage().set(COMPLAINTS_KEY, &encoded)?;
        Ok(())
    }

    fn current_user(&self) -> Result<User, ApiError> {
        if self.session.token()?.is_none() {
            return Err(unauthorized());
        }
        self.session.user()?.ok_or_else(unauthorized)
    }
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized {
        message: "Not authenticated".to_string(),
    }
}

fn status(status: u16, message: &str) -> ApiError {
    ApiError::Status {
        status,
        message: message.to_string(),
    }
}

fn not_found() -> ApiError {
    status(404, "Complaint not found")
}

fn visible_to(user: &User, complaint: &Complaint) -> bool {
    user.is_admin() || complaint.user_id.is_none() || complaint.user_id == user.id
}

impl Backend for LocalBackend {
    fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let matched = self
            .registered_user()?
            .filter(|user| user.email == request.email && user.password == request.password)
            .ok_or_else(|| status(401, "Incorrect username or password"))?;

        info!(role = ?matched.role, "local login accepted");
        Ok(LoginResponse {
            token: format!("local-{}", Uuid::new_v4()),
            user: matched.profile(),
        })
    }

    fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        if let Some(existing) = self.registered_user()?
            && existing.email == request.email
        {
            return Err(status(
                400,
                "The user with this email already exists in the system.",
            ));
        }

        let user = RegisteredUser {
            name: request.name.clone(),
            email: request.email.clone(),
            password: request.password.clone(),
            role: request.role,
        };
        let encoded =
            serde_json::to_string(&user).map_err(|error| ApiError::Decode(error.to_string()))?;
        self.storage().set(REGISTERED_USER_KEY, &encoded)?;
        Ok(())
    }

    fn profile(&self) -> Result<User, ApiError> {
        self.current_user()
    }

    fn list_complaints(&self, page: ComplaintPage) -> Result<Vec<Complaint>, ApiError> {
        let user = self.current_user()?;
        Ok(self
            .complaints()?
            .into_iter()
            .filter(|complaint| visible_to(&user, complaint))
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .collect())
    }

    fn get_complaint(&self, id: i64) -> Result<Complaint, ApiError> {
        let user = self.current_user()?;
        let complaint = self
            .complaints()?
            .into_iter()
            .find(|complaint| complaint.id == id)
            .ok_or_else(not_found)?;

        if !visible_to(&user, &complaint) {
            return Err(status(403, "Not authorized to view this complaint"));
        }
        Ok(complaint)
    }

    fn create_complaint(&self, complaint: &NewComplaint) -> Result<Complaint, ApiError> {
        let user = self.current_user()?;
        let mut complaints = self.complaints()?;
        let id = complaints.iter().map(|c| c.id).max().unwrap_or(0) + 1;

        let created = Complaint {
            id,
            user_id: user.id,
            plate: complaint.plate.clone(),
            description: complaint.description.clone(),
            date: complaint.date.clone(),
            location: complaint.location.clone(),
            city: complaint.city.clone(),
            district: complaint.district.clone(),
            neighborhood: complaint.neighborhood.clone(),
            address_detail: complaint.address_detail.clone(),
            status: ComplaintStatus::Pending,
            admin_note: None,
            created_at: Some(Utc::now().to_rfc3339()),
        };
        complaints.push(created.clone());
        self.store_complaints(&complaints)?;

        info!(id, "local complaint stored");
        Ok(created)
    }

    fn update_complaint(&self, id: i64, update: &ComplaintUpdate) -> Result<Complaint, ApiError> {
        if !self.current_user()?.is_admin() {
            return Err(status(403, "Only admins can update complaints"));
        }

        let mut complaints = self.complaints()?;
        let complaint = complaints
            .iter_mut()
            .find(|complaint| complaint.id == id)
            .ok_or_else(not_found)?;
        complaint.apply_update(update);
        let updated = complaint.clone();
        self.store_complaints(&complaints)?;

        info!(id, status = %updated.status, "local complaint updated");
        Ok(updated)
    }

    fn detect_image(&self, _file: &MediaFile) -> Result<ImageAnalysis, ApiError> {
        Err(status(501, DETECTION_UNAVAILABLE))
    }

    fn detect_video(&self, _file: &MediaFile) -> Result<VideoAnalysis, ApiError> {
        Err(status(501, DETECTION_UNAVAILABLE))
    }

    fn query_vehicle(&self, _plate: &str) -> Result<VehicleQueryOutcome, ApiError> {
        Ok(VehicleQueryOutcome::NotFound)
    }
}
