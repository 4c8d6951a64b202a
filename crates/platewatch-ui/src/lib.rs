#![warn(missing_docs)]
//! # platewatch-ui
//!
//! ## Purpose
//! Defines the view models behind every `platewatch` surface: the officer's
//! complaint list, complaint authoring, admin triage, upload, and result
//! presentation.
//!
//! ## Responsibilities
//! - Own per-view UI state and re-render it from backend responses.
//! - Produce structured render models (cards, rows, badges) instead of
//!   markup.
//! - Turn failures into [`Notice`] values or navigation [`Effect`]s.
//!
//! ## Data flow
//! Shell event -> view operation -> [`platewatch_api::Backend`] call ->
//! render model stored on the view -> shell prints it.
//!
//! ## Ownership and lifetimes
//! Views own their render models. Each refresh rebuilds them from scratch;
//! nothing is diffed or patched in place.
//!
//! ## Error model
//! Backend failures never escape a view as errors. They become
//! [`ListState::Failed`], a [`Notice`], or [`Effect::Navigate`] to the login
//! page for 401. Only client storage failures surface as [`UiError`].
//!
//! ## Security and privacy notes
//! Staged files are logged by fingerprint and size, never by content.

mod admin;
mod complaints;
mod draft;
mod lookup;
mod results;
mod upload;

use platewatch_api::ApiError;
use platewatch_auth::AuthError;
use platewatch_core::{Notice, Page};
use platewatch_session::StorageError;
use thiserror::Error;

pub use admin::{
    APPROVAL_NOTE, AdminTriageView, ComplaintDetail, Confirmation, DetailAction, QuickAction,
    REJECTION_NOTE, TriageRow, TriageStats, default_note, filter_complaints, matches_filter,
};
pub use complaints::{ComplaintCard, ComplaintListView, NoteBlock, card_for};
pub use draft::ComplaintDraft;
pub use lookup::{DamageSummary, TimelineEntry, VehicleCard, VehicleLookupModal, group_thousands};
pub use results::{
    DetectionCard, ImageResults, ResultAction, ResultActionKind, ResultPresenter, ResultsView,
    VideoResults, VideoRow, score_label,
};
pub use upload::{UploadMode, UploadView, fingerprint};

/// Message shown while a list is loading.
pub const LOADING_MESSAGE: &str = "Yükleniyor...";

/// Visual tone of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Positive (approved, standard plate).
    Success,
    /// Negative (rejected).
    Danger,
    /// Awaiting action (pending).
    Warning,
    /// No emphasis.
    Neutral,
}

/// Status or category badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    /// Tone of the badge.
    pub tone: Tone,
    /// Fixed class string for the tone.
    pub class: &'static str,
    /// Badge label.
    pub text: String,
}

/// Render state of a fetched list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState<T> {
    /// Fetch in progress.
    Loading,
    /// Fetch succeeded with no rows; carries the empty-state message.
    Empty(&'static str),
    /// Fetch failed; carries the error-state message.
    Failed(&'static str),
    /// Rows to render.
    Ready(Vec<T>),
}

impl<T> ListState<T> {
    /// Returns rendered rows, or an empty slice for non-ready states.
    pub fn rows(&self) -> &[T] {
        match self {
            ListState::Ready(rows) => rows,
            _ => &[],
        }
    }
}

/// Side effect requested by a view operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show a modal notice.
    Show(Notice),
    /// Navigate to another page.
    Navigate(Page),
}

/// Converts a backend failure into the effects the shell should apply.
///
/// 401 becomes a login redirect (the session is already cleared); anything
/// else becomes an error notice.
pub(crate) fn failure_effects(title: &str, error: &ApiError) -> Vec<Effect> {
    match error {
        ApiError::Unauthorized { .. } => vec![Effect::Navigate(Page::Login)],
        other => vec![Effect::Show(Notice::error(title, other.user_message()))],
    }
}

/// View model failures.
#[derive(Debug, Error)]
pub enum UiError {
    /// Persisted client state could not be read or written.
    #[error("client storage failure: {0}")]
    Storage(#[from] StorageError),
    /// Auth state could not be evaluated.
    #[error("auth failure: {0}")]
    Auth(#[from] AuthError),
}
