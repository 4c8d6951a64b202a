//! Integration tests for the admin triage view over the local backend.

mod common;

use platewatch_api::Backend;
use platewatch_core::{Complaint, ComplaintStatus, NoticeKind, Page};
use platewatch_ui::{
    APPROVAL_NOTE, AdminTriageView, Effect, ListState, REJECTION_NOTE, TriageStats,
    filter_complaints,
};
use proptest::prelude::*;

fn seeded_view() -> AdminTriageView {
    let (backend, session) = common::local_officer();
    backend
        .create_complaint(&common::new_complaint("34ABC123", "Blocking the bus lane"))
        .expect("complaint should be created");
    backend
        .create_complaint(&common::new_complaint("06XYZ99", "Parked on the crossing"))
        .expect("complaint should be created");
    backend
        .create_complaint(&common::new_complaint("35KLM77", "Double parked near school"))
        .expect("complaint should be created");
    common::act_as_admin(&session);

    let mut view = AdminTriageView::new(session, backend);
    assert!(view.open().expect("guard should run").is_empty());
    view
}

#[test]
fn admin_triage_tests_officer_is_turned_away() {
    let (backend, session) = common::local_officer();
    let mut view = AdminTriageView::new(session, backend);

    let effects = view.open().expect("guard should run");

    assert_eq!(effects.len(), 2);
    assert!(matches!(&effects[0], Effect::Show(notice) if notice.title == "Erişim Reddedildi"));
    assert_eq!(effects[1], Effect::Navigate(Page::Dashboard));
}

#[test]
fn admin_triage_tests_filters_combine_and_update_info_line() {
    let mut view = seeded_view();
    assert_eq!(view.table().rows().len(), 3);
    assert_eq!(
        view.stats(),
        TriageStats {
            total: 3,
            pending: 3,
            approved: 0,
            rejected: 0
        }
    );
    assert_eq!(view.showing_info().as_deref(), Some("Toplam 3 kayıt gösteriliyor"));

    view.set_text_filter("PARKED");
    assert_eq!(view.table().rows().len(), 2);

    view.set_status_filter(Some(ComplaintStatus::Approved));
    assert_eq!(view.table(), &ListState::Empty("Kayıt bulunamadı."));
    assert_eq!(
        view.showing_info().as_deref(),
        Some("Toplam 0 kayıt gösteriliyor (Onaylandı)")
    );
    assert_eq!(view.stats().total, 3);
}

#[test]
fn admin_triage_tests_blank_note_uses_canned_text() {
    let mut view = seeded_view();
    let first = view.table().rows()[0].id;

    let pending = view.request_status_update(first, ComplaintStatus::Approved, "   ");
    assert_eq!(pending.title, "İşlem Onayı");
    assert_eq!(pending.note, APPROVAL_NOTE);

    let effects = view.confirm(pending);
    assert!(matches!(
        effects.last(),
        Some(Effect::Show(notice)) if notice.kind == NoticeKind::Success
            && notice.message == "İşlem başarıyla tamamlandı."
    ));
    assert_eq!(view.stats().approved, 1);

    let row = &view.table().rows()[0];
    assert_eq!(row.badge.text, "Onaylandı");
    assert!(row.actions.is_empty());

    view.open_detail(first);
    assert_eq!(view.detail().map(|detail| detail.note.as_str()), Some(APPROVAL_NOTE));
}

#[test]
fn admin_triage_tests_custom_note_passes_through() {
    let mut view = seeded_view();
    let id = view.table().rows()[1].id;

    let pending = view.request_status_update(id, ComplaintStatus::Rejected, "Plate unreadable");
    assert_eq!(pending.note, "Plate unreadable");
    assert_ne!(pending.note, REJECTION_NOTE);
    view.confirm(pending);

    view.open_detail(id);
    let detail = view.detail().expect("detail should be open");
    assert_eq!(detail.note, "Plate unreadable");
    assert_eq!(detail.status, ComplaintStatus::Rejected);
}

#[test]
fn admin_triage_tests_cancel_persists_nothing() {
    let mut view = seeded_view();
    let id = view.table().rows()[0].id;

    let pending = view.request_status_update(id, ComplaintStatus::Rejected, "");
    view.cancel(pending);
    view.refresh();

    assert_eq!(view.stats().pending, 3);
}

#[test]
fn admin_triage_tests_detail_reopens_identically() {
    let mut view = seeded_view();
    let id = view.table().rows()[2].id;

    assert!(view.open_detail(id).is_empty());
    let first = view.detail().cloned();
    view.close_detail();
    assert!(view.detail().is_none());
    view.open_detail(id);

    assert_eq!(view.detail().cloned(), first);
}

#[test]
fn admin_triage_tests_detail_update_closes_panel_and_disables_current_status() {
    let mut view = seeded_view();
    let id = view.table().rows()[0].id;
    view.open_detail(id);
    view.set_detail_note("Checked the footage");

    let pending = view
        .request_status_update_from_detail(ComplaintStatus::Approved)
        .expect("approve should be enabled for a pending complaint");
    assert!(view.detail().is_none());
    assert_eq!(pending.note, "Checked the footage");
    view.confirm(pending);

    view.open_detail(id);
    assert!(view.request_status_update_from_detail(ComplaintStatus::Approved).is_none());
    assert!(view.detail().is_some());
}

#[test]
fn admin_triage_tests_missing_detail_shows_error_notice() {
    let mut view = seeded_view();

    let effects = view.open_detail(404);

    assert!(matches!(
        effects.as_slice(),
        [Effect::Show(notice)] if notice.message == "Detaylar yüklenemedi."
    ));
    assert!(view.detail().is_none());
}

#[test]
fn admin_triage_tests_search_term_is_not_trimmed() {
    let parked = Complaint {
        id: 1,
        user_id: None,
        plate: "34ABC123".to_string(),
        description: "parked".to_string(),
        date: String::new(),
        location: String::new(),
        city: None,
        district: None,
        neighborhood: None,
        address_detail: None,
        status: ComplaintStatus::Pending,
        admin_note: None,
        created_at: None,
    };
    let on_sidewalk = Complaint {
        id: 2,
        description: "on sidewalk".to_string(),
        ..parked.clone()
    };
    let complaints = vec![parked, on_sidewalk];

    assert!(filter_complaints(&complaints, " abc", None).is_empty());
    let spaced: Vec<i64> = filter_complaints(&complaints, " ", None)
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(spaced, vec![2]);
    assert_eq!(filter_complaints(&complaints, "abc", None).len(), 2);
}

fn arb_status() -> impl Strategy<Value = ComplaintStatus> {
    prop::sample::select(ComplaintStatus::ALL.to_vec())
}

fn arb_complaint() -> impl Strategy<Value = Complaint> {
    (1i64..1000, "[A-Za-z0-9]{2,8}", "[a-zA-Z ]{0,16}", arb_status()).prop_map(
        |(id, plate, description, status)| Complaint {
            id,
            user_id: None,
            plate,
            description,
            date: String::new(),
            location: String::new(),
            city: None,
            district: None,
            neighborhood: None,
            address_detail: None,
            status,
            admin_note: None,
            created_at: None,
        },
    )
}

proptest! {
    #[test]
    fn admin_triage_tests_filter_keeps_exactly_matching_records(
        complaints in prop::collection::vec(arb_complaint(), 0..24),
        term in "[a-zA-Z0-9 ]{0,3}",
        status in prop::option::of(arb_status()),
    ) {
        let kept = filter_complaints(&complaints, &term, status);
        let needle = term.to_lowercase();
        let expected: Vec<&Complaint> = complaints
            .iter()
            .filter(|c| {
                (c.plate.to_lowercase().contains(&needle)
                    || c.description.to_lowercase().contains(&needle))
                    && status.is_none_or(|s| s == c.status)
            })
            .collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn admin_triage_tests_status_filter_narrows_text_filter(
        complaints in prop::collection::vec(arb_complaint(), 0..24),
        term in "[a-zA-Z0-9 ]{0,3}",
        status in arb_status(),
    ) {
        let narrowed = filter_complaints(&complaints, &term, Some(status));
        let text_only: Vec<&Complaint> = filter_complaints(&complaints, &term, None)
            .into_iter()
            .filter(|c| c.status == status)
            .collect();
        prop_assert_eq!(narrowed, text_only);
        prop_assert_eq!(filter_complaints(&complaints, "", None).len(), complaints.len());
    }
}
