//! Vehicle history modal opened from a detected plate.

use platewatch_api::Backend;
use platewatch_core::{
    DamageStatus, Notice, VehicleLookup, VehicleQueryOutcome, redact_sensitive,
};
use tracing::{info, warn};

const NOT_FOUND_TITLE: &str = "Kayıt Bulunamadı";
const NOT_FOUND_MESSAGE: &str = "Bu plakaya ait kayıt bulunamadı.";
const ERROR_TITLE: &str = "Hata";

/// Formats `value` with `.` between thousands groups (`142500` -> `142.500`).
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}

fn join_present<'a>(parts: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// One damage record on the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    /// Record date.
    pub date: String,
    /// `type - location (severity)`.
    pub summary: String,
    /// Repair cost as reported.
    pub cost: String,
}

/// Damage section of the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DamageSummary {
    /// At least one damage record.
    Damaged {
        /// `N ADET KAYIT`.
        headline: String,
        /// Records, newest first as reported.
        timeline: Vec<TimelineEntry>,
    },
    /// No damage on record.
    Clean {
        /// `TEMİZ`.
        headline: &'static str,
    },
}

impl DamageSummary {
    fn from_status(status: &DamageStatus) -> Self {
        if !status.has_damage {
            return DamageSummary::Clean { headline: "TEMİZ" };
        }
        let timeline = status
            .records
            .iter()
            .map(|record| {
                let mut summary = join_present([record.kind.as_str(), record.location.as_str()], " - ");
                if !record.severity.trim().is_empty() {
                    summary.push_str(&format!(" ({})", record.severity.trim()));
                }
                TimelineEntry {
                    date: record.date.clone(),
                    summary,
                    cost: record.cost.clone(),
                }
            })
            .collect();
        DamageSummary::Damaged {
            headline: format!("{} ADET KAYIT", status.damage_count),
            timeline,
        }
    }
}

/// Rendered vehicle record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleCard {
    /// Queried plate.
    pub plate: String,
    /// `brand model`.
    pub title: String,
    /// `year • fuel • color`, skipping empty parts.
    pub info: String,
    /// `142.500 KM`.
    pub mileage: String,
    /// `Son Kontrol: date`, absent when the date is empty.
    pub mileage_date: Option<String>,
    /// Damage section.
    pub damage: DamageSummary,
    /// Whether the record came from the local registry.
    pub is_local: bool,
}

impl VehicleCard {
    fn from_lookup(lookup: &VehicleLookup) -> Self {
        let vehicle = &lookup.vehicle;
        let year = if vehicle.year > 0 {
            vehicle.year.to_string()
        } else {
            String::new()
        };
        let last_updated = lookup.mileage.last_updated.trim();

        Self {
            plate: lookup.plate.clone(),
            title: join_present([vehicle.brand.as_str(), vehicle.model.as_str()], " "),
            info: join_present(
                [year.as_str(), vehicle.fuel_type.as_str(), vehicle.color.as_str()],
                " • ",
            ),
            mileage: format!("{} KM", group_thousands(lookup.mileage.value)),
            mileage_date: (!last_updated.is_empty())
                .then(|| format!("Son Kontrol: {last_updated}")),
            damage: DamageSummary::from_status(&lookup.damage_status),
            is_local: lookup.is_local,
        }
    }
}

/// Modal state.
#[derive(Debug, Default)]
pub struct VehicleLookupModal {
    visible: bool,
    loading: bool,
    card: Option<VehicleCard>,
}

impl VehicleLookupModal {
    /// Creates a hidden modal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the modal is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether a query is running.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Rendered record, once loaded.
    pub fn card(&self) -> Option<&VehicleCard> {
        self.card.as_ref()
    }

    /// Shows the modal and queries `plate`.
    ///
    /// Not-found and failed queries close the modal and return the notice to
    /// show instead. A call while a query is running is ignored.
    pub fn open(&mut self, backend: &dyn Backend, plate: &str) -> Option<Notice> {
        if self.loading {
            return None;
        }
        self.visible = true;
        self.loading = true;
        self.card = None;

        let outcome = backend.query_vehicle(plate);
        self.loading = false;

        match outcome {
            Ok(VehicleQueryOutcome::Found(lookup)) => {
                info!(found = true, "vehicle lookup finished");
                self.card = Some(VehicleCard::from_lookup(&lookup));
                None
            }
            Ok(VehicleQueryOutcome::NotFound) => {
                info!(found = false, "vehicle lookup finished");
                self.close();
                Some(Notice::warning(NOT_FOUND_TITLE, NOT_FOUND_MESSAGE))
            }
            Err(failure) => {
                warn!(error = %redact_sensitive(&failure.to_string()), "vehicle lookup failed");
                self.close();
                Some(Notice::error(
                    ERROR_TITLE,
                    format!("Sorgu hatası: {}", failure.user_message()),
                ))
            }
        }
    }

    /// Hides the modal and drops the record.
    pub fn close(&mut self) {
        self.visible = false;
        self.card = None;
    }
}
