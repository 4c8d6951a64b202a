//! Administrator triage: filterable complaint table, counters, detail panel,
//! and the confirm-before-persist status update flow.

use std::sync::Arc;

use platewatch_api::{ApiError, Backend, ComplaintPage};
use platewatch_auth::{AdminGuard, AuthController};
use platewatch_core::{
    Complaint, ComplaintStatus, ComplaintUpdate, Notice, Page, redact_sensitive,
};
use platewatch_session::SessionContext;
use tracing::{error, info};

use crate::{Badge, Effect, ListState, Tone, UiError, failure_effects};

/// Note stored when an approval is confirmed without a note.
pub const APPROVAL_NOTE: &str =
    "Bildiriminiz sistem yöneticisi tarafından incelenmiş ve onaylanmıştır.";
/// Note stored when a rejection is confirmed without a note.
pub const REJECTION_NOTE: &str = "Bildiriminiz sistem yöneticisi tarafından reddedilmiştir.";

const EMPTY_MESSAGE: &str = "Kayıt bulunamadı.";
const FAILED_MESSAGE: &str = "Veri yüklenemedi.";
const DETAIL_FAILED_MESSAGE: &str = "Detaylar yüklenemedi.";
const NO_DESCRIPTION: &str = "Açıklama yok.";
const CONFIRM_TITLE: &str = "İşlem Onayı";
const SUCCESS_TITLE: &str = "Başarılı";
const SUCCESS_MESSAGE: &str = "İşlem başarıyla tamamlandı.";
const ERROR_TITLE: &str = "Hata";

/// Canned note for a status, if it has one.
pub fn default_note(status: ComplaintStatus) -> Option<&'static str> {
    match status {
        ComplaintStatus::Approved => Some(APPROVAL_NOTE),
        ComplaintStatus::Rejected => Some(REJECTION_NOTE),
        ComplaintStatus::Pending => None,
    }
}

/// Returns `true` when `complaint` passes both filters.
///
/// The term matches plate or description case-insensitively and is used as
/// typed, so surrounding whitespace is part of the needle. An empty term
/// matches everything. An unset status filter matches every status.
pub fn matches_filter(
    complaint: &Complaint,
    term: &str,
    status: Option<ComplaintStatus>,
) -> bool {
    let term = term.to_lowercase();
    let text_match = term.is_empty()
        || complaint.plate.to_lowercase().contains(&term)
        || complaint.description.to_lowercase().contains(&term);
    let status_match = status.is_none_or(|wanted| wanted == complaint.status);
    text_match && status_match
}

/// Keeps the complaints that pass both filters, in input order.
pub fn filter_complaints<'a>(
    complaints: &'a [Complaint],
    term: &str,
    status: Option<ComplaintStatus>,
) -> Vec<&'a Complaint> {
    complaints
        .iter()
        .filter(|complaint| matches_filter(complaint, term, status))
        .collect()
}

/// Dashboard counters over the full complaint set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriageStats {
    /// All complaints.
    pub total: usize,
    /// Complaints awaiting review.
    pub pending: usize,
    /// Approved complaints.
    pub approved: usize,
    /// Rejected complaints.
    pub rejected: usize,
}

impl TriageStats {
    /// Counts complaints per status.
    pub fn from_complaints(complaints: &[Complaint]) -> Self {
        complaints.iter().fold(
            Self {
                total: complaints.len(),
                ..Self::default()
            },
            |mut stats, complaint| {
                match complaint.status {
                    ComplaintStatus::Pending => stats.pending += 1,
                    ComplaintStatus::Approved => stats.approved += 1,
                    ComplaintStatus::Rejected => stats.rejected += 1,
                }
                stats
            },
        )
    }
}

/// One-click action on a pending row. Always uses the canned note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    /// Target status.
    pub status: ComplaintStatus,
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageRow {
    /// Complaint id.
    pub id: i64,
    /// Display date.
    pub date: String,
    /// Plate.
    pub plate: String,
    /// Location or `-`.
    pub location: String,
    /// Description or `-`.
    pub description: String,
    /// Status badge.
    pub badge: Badge,
    /// Approve/reject shortcuts, present only for pending rows.
    pub actions: Vec<QuickAction>,
}

impl TriageRow {
    fn from_complaint(complaint: &Complaint) -> Self {
        let actions = if complaint.status == ComplaintStatus::Pending {
            vec![
                QuickAction {
                    status: ComplaintStatus::Approved,
                },
                QuickAction {
                    status: ComplaintStatus::Rejected,
                },
            ]
        } else {
            Vec::new()
        };

        Self {
            id: complaint.id,
            date: complaint.display_date(),
            plate: complaint.plate.clone(),
            location: or_dash(&complaint.location),
            description: or_dash(&complaint.description),
            badge: status_badge(complaint.status),
            actions,
        }
    }
}

/// Approve/reject button in the detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailAction {
    /// Target status.
    pub status: ComplaintStatus,
    /// Disabled when the complaint already has this status.
    pub enabled: bool,
}

/// Detail panel for one complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintDetail {
    /// Complaint id.
    pub id: i64,
    /// Plate.
    pub plate: String,
    /// Display date.
    pub date: String,
    /// Location or `-`.
    pub location: String,
    /// Description or the no-description placeholder.
    pub description: String,
    /// Editable note, prefilled with the stored admin note.
    pub note: String,
    /// Current status.
    pub status: ComplaintStatus,
    /// Status badge.
    pub badge: Badge,
    /// Approve and reject buttons.
    pub actions: [DetailAction; 2],
}

impl ComplaintDetail {
    fn from_complaint(complaint: &Complaint) -> Self {
        let action = |status| DetailAction {
            status,
            enabled: complaint.status != status,
        };
        let description = if complaint.description.trim().is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            complaint.description.clone()
        };

        Self {
            id: complaint.id,
            plate: complaint.plate.clone(),
            date: complaint.display_date(),
            location: or_dash(&complaint.location),
            description,
            note: complaint.admin_note.clone().unwrap_or_default(),
            status: complaint.status,
            badge: status_badge(complaint.status),
            actions: [
                action(ComplaintStatus::Approved),
                action(ComplaintStatus::Rejected),
            ],
        }
    }

    fn allows(&self, status: ComplaintStatus) -> bool {
        self.actions
            .iter()
            .any(|action| action.status == status && action.enabled)
    }
}

/// Pending status change awaiting the administrator's confirmation.
///
/// Nothing is persisted until it is passed to [`AdminTriageView::confirm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Complaint id.
    pub id: i64,
    /// Requested status.
    pub status: ComplaintStatus,
    /// Note to store, after canned-note substitution.
    pub note: String,
    /// Dialog title.
    pub title: &'static str,
    /// Dialog prompt summarizing status and note.
    pub message: String,
}

impl Confirmation {
    fn new(id: i64, status: ComplaintStatus, note: &str) -> Self {
        let note = if note.trim().is_empty() {
            default_note(status).unwrap_or_default().to_string()
        } else {
            note.to_string()
        };
        let message = if note.is_empty() {
            format!("Bu kaydı \"{status}\" olarak işaretlemek istediğinize emin misiniz?")
        } else {
            format!(
                "Bu kaydı \"{status}\" olarak işaretlemek üzeresiniz.\n\nNot: {note}\n\nOnaylıyor musunuz?"
            )
        };

        Self {
            id,
            status,
            note,
            title: CONFIRM_TITLE,
            message,
        }
    }
}

/// Admin triage page.
pub struct AdminTriageView {
    auth: AuthController,
    backend: Arc<dyn Backend>,
    text_filter: String,
    status_filter: Option<ComplaintStatus>,
    table: ListState<TriageRow>,
    stats: TriageStats,
    detail: Option<ComplaintDetail>,
}

impl AdminTriageView {
    /// Creates the view with empty filters and a loading table.
    pub fn new(session: SessionContext, backend: Arc<dyn Backend>) -> Self {
        Self {
            auth: AuthController::new(session, Arc::clone(&backend)),
            backend,
            text_filter: String::new(),
            status_filter: None,
            table: ListState::Loading,
            stats: TriageStats::default(),
            detail: None,
        }
    }

    /// Runs the admin guard, then loads table and counters.
    pub fn open(&mut self) -> Result<Vec<Effect>, UiError> {
        match self.auth.require_admin()? {
            AdminGuard::Granted(_) => Ok(self.refresh()),
            AdminGuard::Denied { notice, redirect } => {
                Ok(vec![Effect::Show(notice), Effect::Navigate(redirect)])
            }
        }
    }

    /// Sets the free-text filter and redraws.
    pub fn set_text_filter(&mut self, term: &str) -> Vec<Effect> {
        self.text_filter = term.to_string();
        self.refresh()
    }

    /// Sets or clears the status filter and redraws.
    pub fn set_status_filter(&mut self, status: Option<ComplaintStatus>) -> Vec<Effect> {
        self.status_filter = status;
        self.refresh()
    }

    /// Refetches complaints, then rebuilds the table and counters.
    ///
    /// Counters always cover the full set. On failure the table shows its
    /// error state and the counters keep their last values.
    pub fn refresh(&mut self) -> Vec<Effect> {
        self.table = ListState::Loading;
        match self.backend.list_complaints(ComplaintPage::default()) {
            Ok(complaints) => {
                self.stats = TriageStats::from_complaints(&complaints);
                let rows: Vec<TriageRow> =
                    filter_complaints(&complaints, &self.text_filter, self.status_filter)
                        .into_iter()
                        .map(TriageRow::from_complaint)
                        .collect();
                self.table = if rows.is_empty() {
                    ListState::Empty(EMPTY_MESSAGE)
                } else {
                    ListState::Ready(rows)
                };
                Vec::new()
            }
            Err(failure) => {
                error!(
                    error = %redact_sensitive(&failure.to_string()),
                    "failed to load triage table"
                );
                self.table = ListState::Failed(FAILED_MESSAGE);
                unauthorized_redirect(&failure)
            }
        }
    }

    /// Current table state.
    pub fn table(&self) -> &ListState<TriageRow> {
        &self.table
    }

    /// Current counters.
    pub fn stats(&self) -> TriageStats {
        self.stats
    }

    /// Active text filter.
    pub fn text_filter(&self) -> &str {
        &self.text_filter
    }

    /// Active status filter.
    pub fn status_filter(&self) -> Option<ComplaintStatus> {
        self.status_filter
    }

    /// Info line under the table, once rows have been fetched.
    pub fn showing_info(&self) -> Option<String> {
        let count = match &self.table {
            ListState::Ready(rows) => rows.len(),
            ListState::Empty(_) => 0,
            ListState::Loading | ListState::Failed(_) => return None,
        };
        let mut line = format!("Toplam {count} kayıt gösteriliyor");
        if let Some(status) = self.status_filter {
            line.push_str(&format!(" ({status})"));
        }
        Some(line)
    }

    /// Opens the detail panel for `id`.
    pub fn open_detail(&mut self, id: i64) -> Vec<Effect> {
        match self.backend.get_complaint(id) {
            Ok(complaint) => {
                self.detail = Some(ComplaintDetail::from_complaint(&complaint));
                Vec::new()
            }
            Err(ApiError::Unauthorized { .. }) => vec![Effect::Navigate(Page::Login)],
            Err(failure) => {
                error!(
                    error = %redact_sensitive(&failure.to_string()),
                    id,
                    "failed to load complaint detail"
                );
                vec![Effect::Show(Notice::error(ERROR_TITLE, DETAIL_FAILED_MESSAGE))]
            }
        }
    }

    /// Open detail panel, if any.
    pub fn detail(&self) -> Option<&ComplaintDetail> {
        self.detail.as_ref()
    }

    /// Replaces the note being edited in the detail panel.
    pub fn set_detail_note(&mut self, note: &str) {
        if let Some(detail) = &mut self.detail {
            detail.note = note.to_string();
        }
    }

    /// Closes the detail panel without persisting anything.
    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    /// Prepares a status change for confirmation.
    ///
    /// A blank note is replaced with the canned note for `status`.
    pub fn request_status_update(
        &self,
        id: i64,
        status: ComplaintStatus,
        note: &str,
    ) -> Confirmation {
        Confirmation::new(id, status, note)
    }

    /// Prepares a status change from the detail panel and closes it.
    ///
    /// Returns `None` when no detail is open or the action is disabled.
    pub fn request_status_update_from_detail(
        &mut self,
        status: ComplaintStatus,
    ) -> Option<Confirmation> {
        let detail = self.detail.take_if(|detail| detail.allows(status))?;
        Some(Confirmation::new(detail.id, status, &detail.note))
    }

    /// Persists a confirmed status change and redraws.
    pub fn confirm(&mut self, pending: Confirmation) -> Vec<Effect> {
        let update = ComplaintUpdate {
            status: Some(pending.status),
            admin_note: Some(pending.note),
        };
        match self.backend.update_complaint(pending.id, &update) {
            Ok(_) => {
                info!(id = pending.id, status = ?pending.status, "complaint status updated");
                let mut effects = self.refresh();
                effects.push(Effect::Show(Notice::success(SUCCESS_TITLE, SUCCESS_MESSAGE)));
                effects
            }
            Err(failure) => {
                error!(
                    error = %redact_sensitive(&failure.to_string()),
                    id = pending.id,
                    "status update failed"
                );
                failure_effects(ERROR_TITLE, &failure)
            }
        }
    }

    /// Discards a pending status change.
    pub fn cancel(&self, pending: Confirmation) {
        info!(id = pending.id, "status update cancelled");
    }
}

fn status_badge(status: ComplaintStatus) -> Badge {
    let (tone, class) = match status {
        ComplaintStatus::Approved => (
            Tone::Success,
            "bg-green-900/30 border-green-700 text-green-400",
        ),
        ComplaintStatus::Rejected => (Tone::Danger, "bg-red-900/30 border-red-700 text-red-400"),
        ComplaintStatus::Pending => (
            Tone::Warning,
            "bg-yellow-900/30 border-yellow-700 text-yellow-400",
        ),
    };
    Badge {
        tone,
        class,
        text: status.wire_literal().to_string(),
    }
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

fn unauthorized_redirect(error: &ApiError) -> Vec<Effect> {
    match error {
        ApiError::Unauthorized { .. } => vec![Effect::Navigate(Page::Login)],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for filtering, counters, and confirmation text.

    use super::*;

    fn complaint(id: i64, plate: &str, description: &str, status: ComplaintStatus) -> Complaint {
        Complaint {
            id,
            user_id: None,
            plate: plate.to_string(),
            description: description.to_string(),
            date: "02.03.2025".to_string(),
            location: String::new(),
            city: None,
            district: None,
            neighborhood: None,
            address_detail: None,
            status,
            admin_note: None,
            created_at: None,
        }
    }

    #[test]
    fn filter_matches_plate_or_description_case_insensitively() {
        let record = complaint(1, "34ABC123", "Double parked", ComplaintStatus::Pending);
        assert!(matches_filter(&record, "abc", None));
        assert!(matches_filter(&record, "PARKED", None));
        assert!(matches_filter(&record, "", None));
        assert!(!matches_filter(&record, "xyz", None));
        assert!(!matches_filter(&record, "abc", Some(ComplaintStatus::Approved)));
    }

    #[test]
    fn counters_cover_every_status() {
        let stats = TriageStats::from_complaints(&[
            complaint(1, "A1", "", ComplaintStatus::Pending),
            complaint(2, "A2", "", ComplaintStatus::Approved),
            complaint(3, "A3", "", ComplaintStatus::Approved),
            complaint(4, "A4", "", ComplaintStatus::Rejected),
        ]);
        assert_eq!(
            stats,
            TriageStats {
                total: 4,
                pending: 1,
                approved: 2,
                rejected: 1
            }
        );
    }

    #[test]
    fn confirmation_prompt_mentions_note() {
        let with_note = Confirmation::new(7, ComplaintStatus::Rejected, " ");
        assert_eq!(with_note.note, REJECTION_NOTE);
        assert!(with_note.message.contains("Not: Bildiriminiz"));
        assert!(with_note.message.starts_with("Bu kaydı \"Reddedildi\""));

        let without_note = Confirmation::new(7, ComplaintStatus::Pending, "");
        assert_eq!(
            without_note.message,
            "Bu kaydı \"İnceleniyor\" olarak işaretlemek istediğinize emin misiniz?"
        );
    }

    #[test]
    fn rows_offer_shortcuts_only_while_pending() {
        let pending = TriageRow::from_complaint(&complaint(1, "A1", "", ComplaintStatus::Pending));
        let approved =
            TriageRow::from_complaint(&complaint(2, "A2", "", ComplaintStatus::Approved));
        assert_eq!(pending.actions.len(), 2);
        assert!(approved.actions.is_empty());
        assert_eq!(pending.description, "-");
        assert_eq!(pending.location, "-");
    }

    #[test]
    fn detail_disables_current_status() {
        let detail =
            ComplaintDetail::from_complaint(&complaint(1, "A1", "", ComplaintStatus::Approved));
        assert!(!detail.allows(ComplaintStatus::Approved));
        assert!(detail.allows(ComplaintStatus::Rejected));
        assert_eq!(detail.description, NO_DESCRIPTION);
    }
}
