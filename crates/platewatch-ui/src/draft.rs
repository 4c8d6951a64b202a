//! Complaint authoring page reached through the pending plate.

use std::sync::Arc;

use chrono::NaiveDate;
use platewatch_api::Backend;
use platewatch_core::{NewComplaint, Notice, Page, normalize_plate, redact_sensitive};
use platewatch_session::SessionContext;
use tracing::{info, warn};

use crate::{Effect, UiError, failure_effects};

const DATE_FORMAT: &str = "%d.%m.%Y";
const INVALID_TITLE: &str = "Eksik Bilgi";
const MISSING_FIELDS_MESSAGE: &str = "Lütfen plaka, açıklama, tarih ve şehir alanlarını doldurunuz.";
const INVALID_DATE_MESSAGE: &str = "Tarih GG.AA.YYYY biçiminde olmalıdır.";
const SUBMIT_FAILED_TITLE: &str = "Hata";
const SUBMITTED_TITLE: &str = "Başarılı";
const SUBMITTED_MESSAGE: &str = "Şikayetiniz kaydedildi.";

/// Editable complaint form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintDraft {
    /// Normalized plate.
    pub plate: String,
    /// Incident description.
    pub description: String,
    /// Incident date as `DD.MM.YYYY`.
    pub date: String,
    /// City.
    pub city: String,
    /// District.
    pub district: String,
    /// Neighborhood.
    pub neighborhood: String,
    /// Free-form address detail.
    pub address_detail: String,
}

impl ComplaintDraft {
    /// Starts a draft prefilled from the stored pending plate.
    pub fn from_session(session: &SessionContext) -> Result<Self, UiError> {
        Ok(Self {
            plate: session.pending_plate()?.unwrap_or_default(),
            ..Self::default()
        })
    }

    /// Sets the plate, normalizing it.
    pub fn set_plate(&mut self, raw: &str) {
        self.plate = normalize_plate(raw);
    }

    /// Combined address, most specific part first, skipping blanks.
    pub fn location(&self) -> String {
        [
            &self.address_detail,
            &self.neighborhood,
            &self.district,
            &self.city,
        ]
        .into_iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }

    /// Checks required fields and the date format.
    pub fn validate(&self) -> Result<NewComplaint, Notice> {
        let required = [&self.plate, &self.description, &self.date, &self.city];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(Notice::error(INVALID_TITLE, MISSING_FIELDS_MESSAGE));
        }
        if NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).is_err() {
            return Err(Notice::error(INVALID_TITLE, INVALID_DATE_MESSAGE));
        }

        Ok(NewComplaint {
            plate: normalize_plate(&self.plate),
            description: self.description.trim().to_string(),
            date: self.date.trim().to_string(),
            location: self.location(),
            city: non_blank(&self.city),
            district: non_blank(&self.district),
            neighborhood: non_blank(&self.neighborhood),
            address_detail: non_blank(&self.address_detail),
        })
    }

    /// Validates and posts the draft.
    ///
    /// On success the pending plate is cleared and the client navigates to
    /// the dashboard.
    pub fn submit(
        &self,
        session: &SessionContext,
        backend: &Arc<dyn Backend>,
    ) -> Result<Vec<Effect>, UiError> {
        let complaint = match self.validate() {
            Ok(complaint) => complaint,
            Err(notice) => return Ok(vec![Effect::Show(notice)]),
        };

        match backend.create_complaint(&complaint) {
            Ok(created) => {
                session.clear_pending_plate()?;
                info!(id = created.id, "complaint filed");
                Ok(vec![
                    Effect::Show(Notice::success(SUBMITTED_TITLE, SUBMITTED_MESSAGE)),
                    Effect::Navigate(Page::Dashboard),
                ])
            }
            Err(failure) => {
                warn!(
                    error = %redact_sensitive(&failure.to_string()),
                    "complaint submission failed"
                );
                Ok(failure_effects(SUBMIT_FAILED_TITLE, &failure))
            }
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    //! Unit tests for draft validation.

    use super::*;

    fn draft() -> ComplaintDraft {
        ComplaintDraft {
            plate: "34ABC123".to_string(),
            description: "Parked on the crossing".to_string(),
            date: "14.02.2025".to_string(),
            city: "İstanbul".to_string(),
            district: "Kadıköy".to_string(),
            neighborhood: String::new(),
            address_detail: "Bahariye Cd.".to_string(),
        }
    }

    #[test]
    fn location_joins_non_blank_parts() {
        assert_eq!(draft().location(), "Bahariye Cd., Kadıköy, İstanbul");
    }

    #[test]
    fn validate_rejects_impossible_dates() {
        let mut invalid = draft();
        invalid.date = "31.02.2025".to_string();
        let notice = invalid.validate().expect_err("February 31st should fail");
        assert_eq!(notice.message, INVALID_DATE_MESSAGE);
    }

    #[test]
    fn validate_requires_description() {
        let mut invalid = draft();
        invalid.description = "  ".to_string();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn validate_builds_request() {
        let request = draft().validate().expect("draft should validate");
        assert_eq!(request.neighborhood, None);
        assert_eq!(request.district.as_deref(), Some("Kadıköy"));
    }

    #[test]
    fn set_plate_normalizes() {
        let mut form = ComplaintDraft::default();
        form.set_plate("34 abc-123");
        assert_eq!(form.plate, "34ABC123");
    }
}
