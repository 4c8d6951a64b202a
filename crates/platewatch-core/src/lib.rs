#![warn(missing_docs)]
//! # platewatch-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `platewatch` workspace.
//!
//! ## Responsibilities
//! - Represent complaints and the closed three-state triage workflow.
//! - Represent sessions, users, and roles as persisted by the client.
//! - Decode detection and vehicle lookup payloads returned by the API.
//! - Scrub credentials from free-form text with [`redact_sensitive`] before
//!   it reaches a log line.
//!
//! ## Data flow
//! Backends decode wire JSON into [`Complaint`], [`ImageAnalysis`],
//! [`VideoAnalysis`], and [`VehicleQueryOutcome`]. View models read these
//! values and never see raw JSON.
//!
//! ## Ownership and lifetimes
//! All values own their strings so render passes can hold transient copies
//! without borrowing from network buffers.
//!
//! ## Error model
//! Decode failures and analysis failures reported inside a successful
//! response body return [`CoreError`].
//!
//! ## Example
//! ```rust
//! use platewatch_core::{ComplaintStatus, normalize_plate};
//!
//! assert_eq!(ComplaintStatus::Approved.wire_literal(), "Onaylandı");
//! assert_eq!(normalize_plate("34 abc 123"), "34ABC123");
//! ```

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Wire literal for [`ComplaintStatus::Pending`].
pub const STATUS_PENDING: &str = "İnceleniyor";
/// Wire literal for [`ComplaintStatus::Approved`].
pub const STATUS_APPROVED: &str = "Onaylandı";
/// Wire literal for [`ComplaintStatus::Rejected`].
pub const STATUS_REJECTED: &str = "Reddedildi";

/// Triage status of a complaint.
///
/// The localized literals are the wire values expected by the backend; they
/// are mapped only at the serde boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintStatus {
    /// Awaiting administrator review.
    #[default]
    #[serde(rename = "İnceleniyor")]
    Pending,
    /// Accepted by an administrator.
    #[serde(rename = "Onaylandı")]
    Approved,
    /// Rejected by an administrator.
    #[serde(rename = "Reddedildi")]
    Rejected,
}

impl ComplaintStatus {
    /// Every status in workflow order.
    pub const ALL: [ComplaintStatus; 3] = [
        ComplaintStatus::Pending,
        ComplaintStatus::Approved,
        ComplaintStatus::Rejected,
    ];

    /// Returns the wire literal for this status.
    pub fn wire_literal(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => STATUS_PENDING,
            ComplaintStatus::Approved => STATUS_APPROVED,
            ComplaintStatus::Rejected => STATUS_REJECTED,
        }
    }

    /// Parses a wire literal. Returns `None` for anything outside the
    /// fixed vocabulary.
    pub fn from_wire(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.wire_literal() == raw)
    }

    /// Returns `true` for approved or rejected complaints.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ComplaintStatus::Pending)
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_literal())
    }
}

/// Complaint record as returned by the complaint endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    /// Backend-assigned identifier.
    pub id: i64,
    /// Owner user id, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Plate the complaint refers to.
    pub plate: String,
    /// Free-text description written by the citizen.
    #[serde(default)]
    pub description: String,
    /// Incident date as entered (`DD.MM.YYYY`).
    #[serde(default)]
    pub date: String,
    /// Combined address string.
    #[serde(default)]
    pub location: String,
    /// City part of the address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// District part of the address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// Neighborhood part of the address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    /// Free-form address detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_detail: Option<String>,
    /// Current triage status.
    #[serde(default)]
    pub status: ComplaintStatus,
    /// Administrator decision note.
    #[serde(default, alias = "adminNote", skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
    /// Server creation timestamp (ISO-8601), kept raw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Complaint {
    /// Returns the date shown to users: the entered date, falling back to the
    /// creation timestamp formatted as `DD.MM.YYYY`, then `-`.
    pub fn display_date(&self) -> String {
        if !self.date.trim().is_empty() {
            return self.date.clone();
        }

        self.created_at
            .as_deref()
            .and_then(format_timestamp_date)
            .unwrap_or_else(|| "-".to_string())
    }

    /// Returns the admin note when it contains non-whitespace text.
    pub fn note(&self) -> Option<&str> {
        self.admin_note
            .as_deref()
            .filter(|note| !note.trim().is_empty())
    }
}

/// Body of `POST /complaints/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComplaint {
    /// Normalized plate.
    pub plate: String,
    /// Description of the incident.
    pub description: String,
    /// Incident date (`DD.MM.YYYY`).
    pub date: String,
    /// Combined address string.
    pub location: String,
    /// City part of the address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// District part of the address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// Neighborhood part of the address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    /// Free-form address detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_detail: Option<String>,
}

/// Body of `PUT /complaints/{id}`.
///
/// Absent fields leave the stored values untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComplaintUpdate {
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ComplaintStatus>,
    /// New admin note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
}

impl Complaint {
    /// Applies an update in place. Only present fields change.
    pub fn apply_update(&mut self, update: &ComplaintUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(note) = &update.admin_note {
            self.admin_note = Some(note.clone());
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrator triaging complaints.
    Admin,
    /// Field officer filing complaints. Unknown roles decode to this variant.
    #[serde(other)]
    Officer,
}

/// Authenticated user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Login e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account role.
    pub role: Role,
}

impl User {
    /// Returns `true` for administrators.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Persisted client session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token for protected calls.
    pub token: String,
    /// Profile of the logged-in user.
    pub user: User,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account e-mail.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// Logged-in user.
    pub user: User,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Account e-mail.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Requested role.
    pub role: Role,
}

/// One plate observed in an uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Recognized plate text.
    pub text: String,
    /// Plate category reported by the model (for example `TR Standard`).
    #[serde(default)]
    pub category: String,
    /// City resolved from the plate prefix, or `Unknown`.
    #[serde(default)]
    pub city: String,
    /// Detector confidence in `[0.0, 1.0]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf: Option<f64>,
    /// Bounding box `[x1, y1, x2, y2]` in source pixels.
    #[serde(default, rename = "box", skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<Vec<f64>>,
}

/// Response of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    /// Annotated image as a data URL.
    #[serde(default)]
    pub image: String,
    /// Plates found in the image.
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// One tracked vehicle found in an uploaded video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDetection {
    /// Tracker identity.
    #[serde(default)]
    pub track_id: i64,
    /// Best recognized plate text for the track.
    pub text: String,
    /// Plate category.
    #[serde(default)]
    pub category: String,
    /// Plate crop thumbnail as a data URL.
    #[serde(default)]
    pub image: String,
    /// Frame index the thumbnail was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_idx: Option<u64>,
    /// Recognition confidence in `[0.0, 1.0]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Response of `POST /predict_video`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    /// Per-track results.
    #[serde(default)]
    pub results: Vec<VideoDetection>,
}

/// File payload sent to the detection endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Original file name.
    pub name: String,
    /// MIME type (for example `image/jpeg`).
    pub mime: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl MediaFile {
    /// Creates a media file.
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

impl std::fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Analysis result tagged by the upload mode that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    /// Result of an image upload.
    Image(ImageAnalysis),
    /// Result of a video upload.
    Video(VideoAnalysis),
}

/// Decodes a `/predict` body.
///
/// # Errors
/// Returns [`CoreError::AnalysisFailed`] when the body carries an `error`
/// field, and [`CoreError::Decode`] for shape mismatches.
pub fn parse_image_analysis(body: Value) -> Result<ImageAnalysis, CoreError> {
    reject_embedded_error(&body)?;
    serde_json::from_value(body).map_err(CoreError::Decode)
}

/// Decodes a `/predict_video` body.
///
/// # Errors
/// Same as [`parse_image_analysis`].
pub fn parse_video_analysis(body: Value) -> Result<VideoAnalysis, CoreError> {
    reject_embedded_error(&body)?;
    serde_json::from_value(body).map_err(CoreError::Decode)
}

fn reject_embedded_error(body: &Value) -> Result<(), CoreError> {
    match body.get("error") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(message)) => Err(CoreError::AnalysisFailed(message.clone())),
        Some(other) => Err(CoreError::AnalysisFailed(other.to_string())),
    }
}

/// Vehicle registry record returned by `/api/vehicle/query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleLookup {
    /// Formatted plate.
    pub plate: String,
    /// Whether the record came from the local demo registry.
    #[serde(default)]
    pub is_local: bool,
    /// Vehicle identity.
    pub vehicle: Vehicle,
    /// Last mileage reading.
    pub mileage: Mileage,
    /// Damage history summary.
    pub damage_status: DamageStatus,
}

/// Vehicle identity block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Manufacturer.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// Model year.
    pub year: u32,
    /// Fuel type.
    pub fuel_type: String,
    /// Body color.
    pub color: String,
}

/// Mileage reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mileage {
    /// Odometer value in kilometers.
    pub value: u64,
    /// Date of the reading.
    pub last_updated: String,
}

/// Damage history summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageStatus {
    /// Whether any damage is on record.
    pub has_damage: bool,
    /// Number of damage records.
    #[serde(default)]
    pub damage_count: u32,
    /// Individual damage records, oldest first.
    #[serde(default)]
    pub records: Vec<DamageRecord>,
}

/// One damage record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRecord {
    /// Incident date.
    pub date: String,
    /// Incident type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Damaged part.
    pub location: String,
    /// Severity label.
    pub severity: String,
    /// Repair cost label.
    pub cost: String,
}

/// Outcome of a vehicle lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleQueryOutcome {
    /// A record exists for the plate.
    Found(VehicleLookup),
    /// The registry has no record (or reported an error) for the plate.
    NotFound,
}

/// Decodes a `/api/vehicle/query` body.
///
/// A body with `status == "NOT_FOUND"` or an `error` field is
/// [`VehicleQueryOutcome::NotFound`].
///
/// # Errors
/// Returns [`CoreError::Decode`] when a found record is malformed.
pub fn parse_vehicle_response(body: Value) -> Result<VehicleQueryOutcome, CoreError> {
    let not_found = body.get("status").and_then(Value::as_str) == Some("NOT_FOUND")
        || body.get("error").is_some_and(|error| !error.is_null());
    if not_found {
        return Ok(VehicleQueryOutcome::NotFound);
    }

    serde_json::from_value(body)
        .map(VehicleQueryOutcome::Found)
        .map_err(CoreError::Decode)
}

/// Navigation targets of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Login form.
    Login,
    /// Registration form.
    Register,
    /// Officer dashboard (upload and own complaints).
    Dashboard,
    /// Administrator triage page.
    Admin,
    /// Complaint authoring page.
    Complaint,
}

impl Page {
    /// Returns the page document name.
    pub fn path(self) -> &'static str {
        match self {
            Page::Login => "login.html",
            Page::Register => "register.html",
            Page::Dashboard => "dashboard.html",
            Page::Admin => "admin.html",
            Page::Complaint => "complaint.html",
        }
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Completed action.
    Success,
    /// Expected negative outcome (for example no record found).
    Warning,
    /// Failed action.
    Error,
}

/// Modal message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Modal title.
    pub title: String,
    /// Modal body.
    pub message: String,
    /// Severity.
    pub kind: NoticeKind,
}

impl Notice {
    /// Creates a success notice.
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(NoticeKind::Success, title, message)
    }

    /// Creates a warning notice.
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(NoticeKind::Warning, title, message)
    }

    /// Creates an error notice.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(NoticeKind::Error, title, message)
    }

    fn with_kind(kind: NoticeKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
        }
    }
}

/// Normalizes plate text to uppercase ASCII alphanumerics.
pub fn normalize_plate(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Formats an ISO-8601 timestamp as `DD.MM.YYYY`.
///
/// Accepts RFC 3339 (with offset) and naive `YYYY-MM-DDTHH:MM:SS[.f]` forms.
pub fn format_timestamp_date(raw: &str) -> Option<String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.format("%d.%m.%Y").to_string());
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|parsed| parsed.format("%d.%m.%Y").to_string())
}

const REDACTED: &str = "<redacted>";
const SENSITIVE_KEYS: [&str; 3] = ["password", "token", "authorization"];

/// Redacts credential values in log-safe output.
///
/// `key=value` and `key: value` pairs for password, token, and authorization
/// keys lose their value. A word following `Bearer` is dropped as well.
pub fn redact_sensitive(input: &str) -> String {
    let mut redact_next = false;
    input
        .split(' ')
        .map(|word| {
            if redact_next && !word.is_empty() {
                redact_next = false;
                return REDACTED.to_string();
            }
            let lower = word.to_ascii_lowercase();
            if lower == "bearer" {
                redact_next = true;
                return word.to_string();
            }
            if !SENSITIVE_KEYS.iter().any(|key| lower.contains(key)) {
                return word.to_string();
            }
            match word.find(['=', ':']) {
                Some(split) => {
                    let value = &word[split + 1..];
                    if value.is_empty() || value.eq_ignore_ascii_case("bearer") {
                        redact_next = true;
                        word.to_string()
                    } else {
                        format!("{}{REDACTED}", &word[..=split])
                    }
                }
                None => word.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Errors produced by model decoding.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Payload did not match the expected shape.
    #[error("payload decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Analysis endpoint answered successfully but reported a failure.
    #[error("analysis failed: {0}")]
    AnalysisFailed(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for wire mapping and display helpers.

    use serde_json::json;

    use super::*;

    #[test]
    fn status_maps_to_fixed_wire_literals() {
        for status in ComplaintStatus::ALL {
            let encoded = serde_json::to_value(status).expect("status should encode");
            assert_eq!(encoded, Value::String(status.wire_literal().to_string()));
            assert_eq!(ComplaintStatus::from_wire(status.wire_literal()), Some(status));
        }
        assert!(serde_json::from_value::<ComplaintStatus>(json!("Pending")).is_err());
    }

    #[test]
    fn display_date_falls_back_to_creation_timestamp() {
        let complaint: Complaint = serde_json::from_value(json!({
            "id": 1,
            "plate": "34ABC123",
            "date": "",
            "created_at": "2025-03-09T10:15:00.123456+03:00"
        }))
        .expect("complaint should decode");

        assert_eq!(complaint.display_date(), "09.03.2025");
        assert_eq!(complaint.status, ComplaintStatus::Pending);
    }

    #[test]
    fn embedded_error_is_an_analysis_failure() {
        let error = parse_image_analysis(json!({"error": "model not loaded"}))
            .expect_err("embedded error should fail");
        assert!(matches!(error, CoreError::AnalysisFailed(message) if message == "model not loaded"));
    }

    #[test]
    fn unknown_role_decodes_as_officer() {
        let user: User = serde_json::from_value(json!({"name": "Ayşe", "role": "auditor"}))
            .expect("user should decode");
        assert_eq!(user.role, Role::Officer);
    }

    #[test]
    fn server_error_text_loses_credentials() {
        assert_eq!(
            redact_sensitive("invalid token=eyJhbGci for user"),
            "invalid token=<redacted> for user"
        );
        assert_eq!(redact_sensitive("rejected Bearer abc"), "rejected Bearer <redacted>");
        assert_eq!(redact_sensitive("model not loaded"), "model not loaded");
    }

    #[test]
    fn roles_encode_as_lowercase_names() {
        assert_eq!(serde_json::to_value(Role::Admin).expect("role should encode"), json!("admin"));
        assert_eq!(
            serde_json::to_value(Role::Officer).expect("role should encode"),
            json!("officer")
        );
        let admin: User = serde_json::from_value(json!({"name": "Zeynep", "role": "admin"}))
            .expect("user should decode");
        assert_eq!(admin.role, Role::Admin);
    }
}
