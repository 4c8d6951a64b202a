//! Integration tests for administrator triage against the local backend.

use platewatch_api::Backend;
use platewatch_app::{
    AppConfig, AppError, BackendKind, build_backend, open_session, registration_role,
};
use platewatch_auth::{AuthController, AuthOutcome};
use platewatch_core::{ComplaintStatus, NewComplaint, Page, Role};
use platewatch_ui::{APPROVAL_NOTE, AdminTriageView, Effect};
use tempfile::tempdir;

#[test]
fn local_triage_tests_admin_role_needs_local_backend() {
    let local = AppConfig {
        backend: BackendKind::Local,
        ..AppConfig::default()
    };
    let remote = AppConfig::default();

    assert_eq!(registration_role(&local, true).ok(), Some(Role::Admin));
    assert_eq!(registration_role(&local, false).ok(), Some(Role::Officer));
    assert_eq!(registration_role(&remote, false).ok(), Some(Role::Officer));
    assert!(matches!(registration_role(&remote, true), Err(AppError::Config(_))));
}

#[test]
fn local_triage_tests_local_admin_approves_officer_complaint() {
    let dir = tempdir().expect("temp dir should be created");
    let config = AppConfig {
        backend: BackendKind::Local,
        state_path: dir.path().join("state.json"),
        ..AppConfig::default()
    };

    let officer_session = open_session(&config);
    let officer_backend =
        build_backend(&config, &officer_session).expect("local backend should build");
    let mut officer = AuthController::new(officer_session.clone(), officer_backend.clone());
    assert_eq!(
        officer.register("Fixture Officer", "officer@example.test", "officer-pass"),
        AuthOutcome::Navigate(Page::Dashboard)
    );
    let filed = officer_backend
        .create_complaint(&NewComplaint {
            plate: "34ABC123".to_string(),
            description: "double parked".to_string(),
            date: "01.06.2025".to_string(),
            location: "Kadıköy, İstanbul".to_string(),
            city: Some("İstanbul".to_string()),
            district: Some("Kadıköy".to_string()),
            neighborhood: None,
            address_detail: None,
        })
        .expect("officer complaint should be stored");

    let admin_session = open_session(&config);
    let admin_backend = build_backend(&config, &admin_session).expect("local backend should build");
    let role = registration_role(&config, true).expect("local admin should be allowed");
    let mut admin = AuthController::new(admin_session.clone(), admin_backend.clone());
    assert_eq!(
        admin.register_as("Fixture Admin", "admin@example.test", "admin-pass", role),
        AuthOutcome::Navigate(Page::Admin)
    );

    let mut view = AdminTriageView::new(admin_session, admin_backend.clone());
    let effects = view.open().expect("admin guard should pass");
    assert!(effects.is_empty());
    assert_eq!(view.stats().pending, 1);

    let pending = view.request_status_update(filed.id, ComplaintStatus::Approved, "");
    let effects = view.confirm(pending);

    assert!(matches!(effects.last(), Some(Effect::Show(notice)) if notice.title == "Başarılı"));
    assert_eq!(view.stats().approved, 1);
    let stored = admin_backend
        .get_complaint(filed.id)
        .expect("complaint should still exist");
    assert_eq!(stored.status, ComplaintStatus::Approved);
    assert_eq!(stored.admin_note.as_deref(), Some(APPROVAL_NOTE));
}
