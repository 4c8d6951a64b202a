//! Backend capability and the live REST implementation.

use chrono::Utc;
use platewatch_core::{
    Complaint, ComplaintUpdate, ImageAnalysis, LoginRequest, LoginResponse, MediaFile,
    NewComplaint, RegisterRequest, User, VehicleQueryOutcome, VideoAnalysis,
    parse_image_analysis, parse_vehicle_response, parse_video_analysis,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::info;

use crate::{ApiClient, ApiError, RequestOptions};

/// `source` tag sent with vehicle lookups.
pub const VEHICLE_QUERY_SOURCE: &str = "web_client";

/// Paging window for complaint listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplaintPage {
    /// Records to skip.
    pub skip: u32,
    /// Maximum records to return.
    pub limit: u32,
}

impl Default for ComplaintPage {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
        }
    }
}

/// Storage backend capability shared by the live and local implementations.
///
/// Both implementations report failures with the same [`ApiError`] taxonomy
/// so controllers branch on status codes the same way in either mode.
pub trait Backend: Send + Sync {
    /// Exchanges credentials for a token and profile.
    fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// Creates an account.
    fn register(&self, request: &RegisterRequest) -> Result<(), ApiError>;

    /// Returns the profile behind the current token.
    fn profile(&self) -> Result<User, ApiError>;

    /// Lists complaints visible to the current session.
    fn list_complaints(&self, page: ComplaintPage) -> Result<Vec<Complaint>, ApiError>;

    /// Fetches one complaint.
    fn get_complaint(&self, id: i64) -> Result<Complaint, ApiError>;

    /// Files a new complaint.
    fn create_complaint(&self, complaint: &NewComplaint) -> Result<Complaint, ApiError>;

    /// Applies an administrator update.
    fn update_complaint(&self, id: i64, update: &ComplaintUpdate) -> Result<Complaint, ApiError>;

    /// Runs plate detection on an image.
    fn detect_image(&self, file: &MediaFile) -> Result<ImageAnalysis, ApiError>;

    /// Runs plate tracking on a video.
    fn detect_video(&self, file: &MediaFile) -> Result<VideoAnalysis, ApiError>;

    /// Looks up the vehicle registry record for a plate.
    fn query_vehicle(&self, plate: &str) -> Result<VehicleQueryOutcome, ApiError>;
}

/// [`Backend`] talking to the real REST API.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: ApiClient,
}

impl RemoteBackend {
    /// Wraps an API client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Returns the wrapped client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let body = self.client.request(endpoint, options)?;
        decode(body)
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|error| ApiError::Decode(error.to_string()))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|error| ApiError::Decode(error.to_string()))
}

impl Backend for RemoteBackend {
    fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.call("/auth/login", RequestOptions::post_json(encode(request)?))
    }

    fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        self.client
            .request("/auth/register", RequestOptions::post_json(encode(request)?))?;
        Ok(())
    }

    fn profile(&self) -> Result<User, ApiError> {
        self.call("/auth/me", RequestOptions::get())
    }

    fn list_complaints(&self, page: ComplaintPage) -> Result<Vec<Complaint>, ApiError> {
        let endpoint = format!("/complaints/?skip={}&limit={}", page.skip, page.limit);
        self.call(&endpoint, RequestOptions::get())
    }

    fn get_complaint(&self, id: i64) -> Result<Complaint, ApiError> {
        self.call(&format!("/complaints/{id}"), RequestOptions::get())
    }

    fn create_complaint(&self, complaint: &NewComplaint) -> Result<Complaint, ApiError> {
        self.call("/complaints/", RequestOptions::post_json(encode(complaint)?))
    }

    fn update_complaint(&self, id: i64, update: &ComplaintUpdate) -> Result<Complaint, ApiError> {
        self.call(
            &format!("/complaints/{id}"),
            RequestOptions::put_json(encode(update)?),
        )
    }

    fn detect_image(&self, file: &MediaFile) -> Result<ImageAnalysis, ApiError> {
        info!(size = file.bytes.len(), "dispatching image detection");
        let body = self
            .client
            .request("/predict", RequestOptions::post_file(file.clone()))?;
        Ok(parse_image_analysis(body)?)
    }

    fn detect_video(&self, file: &MediaFile) -> Result<VideoAnalysis, ApiError> {
        info!(size = file.bytes.len(), "dispatching video detection");
        let body = self
            .client
            .request("/predict_video", RequestOptions::post_file(file.clone()))?;
        Ok(parse_video_analysis(body)?)
    }

    fn query_vehicle(&self, plate: &str) -> Result<VehicleQueryOutcome, ApiError> {
        let body = self.client.request(
            "/api/vehicle/query",
            RequestOptions::post_json(json!({
                "plate": plate,
                "source": VEHICLE_QUERY_SOURCE,
                "timestamp": Utc::now().to_rfc3339(),
            })),
        )?;
        Ok(parse_vehicle_response(body)?)
    }
}
