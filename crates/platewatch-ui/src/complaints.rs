//! Officer-facing complaint list.

use std::sync::Arc;

use platewatch_api::{ApiError, Backend, ComplaintPage};
use platewatch_core::{Complaint, ComplaintStatus, Page, redact_sensitive};
use platewatch_session::SessionContext;
use tracing::{error, info};

use crate::{Badge, ListState, Tone, UiError};

const EMPTY_MESSAGE: &str = "Henüz şikayet kaydınız yok.";
const FAILED_MESSAGE: &str = "Şikayetler yüklenemedi.";

/// One complaint rendered as a sidebar card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintCard {
    /// Complaint id (detail link target).
    pub id: i64,
    /// Plate.
    pub plate: String,
    /// Display date.
    pub date: String,
    /// Description.
    pub description: String,
    /// Status badge.
    pub badge: Badge,
    /// Admin note block, when a note exists.
    pub note: Option<NoteBlock>,
}

/// Admin note rendered under a status-dependent label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteBlock {
    /// Label preceding the note.
    pub label: &'static str,
    /// Note text.
    pub text: String,
    /// Tone matching the status.
    pub tone: Tone,
}

/// Builds the card for one complaint.
pub fn card_for(complaint: &Complaint) -> ComplaintCard {
    let (tone, class, text) = match complaint.status {
        ComplaintStatus::Approved => (Tone::Success, "bg-green-600", "Onaylandı"),
        ComplaintStatus::Rejected => (Tone::Danger, "bg-red-600", "Onaylanmadı"),
        ComplaintStatus::Pending => (Tone::Warning, "bg-yellow-600", "İnceleniyor"),
    };
    let label = match complaint.status {
        ComplaintStatus::Approved => "Açıklama",
        ComplaintStatus::Rejected => "Red Gerekçesi",
        ComplaintStatus::Pending => "Yönetici Notu",
    };

    ComplaintCard {
        id: complaint.id,
        plate: complaint.plate.clone(),
        date: complaint.display_date(),
        description: complaint.description.clone(),
        badge: Badge {
            tone,
            class,
            text: text.to_string(),
        },
        note: complaint.note().map(|note| NoteBlock {
            label,
            text: note.to_string(),
            tone,
        }),
    }
}

/// Complaint list for the current session.
pub struct ComplaintListView {
    session: SessionContext,
    backend: Arc<dyn Backend>,
    state: ListState<ComplaintCard>,
}

impl ComplaintListView {
    /// Creates the view in loading state.
    pub fn new(session: SessionContext, backend: Arc<dyn Backend>) -> Self {
        Self {
            session,
            backend,
            state: ListState::Loading,
        }
    }

    /// Current render state.
    pub fn state(&self) -> &ListState<ComplaintCard> {
        &self.state
    }

    /// Refetches and re-renders the list.
    ///
    /// Returns the login page when the session was rejected.
    pub fn refresh(&mut self) -> Option<Page> {
        self.state = ListState::Loading;
        match self.backend.list_complaints(ComplaintPage::default()) {
            Ok(complaints) if complaints.is_empty() => {
                self.state = ListState::Empty(EMPTY_MESSAGE);
                None
            }
            Ok(complaints) => {
                self.state = ListState::Ready(complaints.iter().map(card_for).collect());
                None
            }
            Err(failure) => {
                error!(
                    error = %redact_sensitive(&failure.to_string()),
                    "failed to load complaints"
                );
                self.state = ListState::Failed(FAILED_MESSAGE);
                matches!(failure, ApiError::Unauthorized { .. }).then_some(Page::Login)
            }
        }
    }

    /// Stores `plate` for the complaint authoring page and navigates there.
    pub fn submit_complaint(session: &SessionContext, plate: &str) -> Result<Page, UiError> {
        session.set_pending_plate(plate)?;
        info!("pending complaint plate stored");
        Ok(Page::Complaint)
    }

    /// Session handle used by this view.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }
}
