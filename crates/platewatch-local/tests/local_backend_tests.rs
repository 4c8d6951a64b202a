//! Integration tests for the storage-backed local backend.

use std::sync::Arc;

use platewatch_api::{ApiError, Backend, ComplaintPage};
use platewatch_core::{
    ComplaintStatus, ComplaintUpdate, LoginRequest, MediaFile, NewComplaint, RegisterRequest,
    Role, Session, User, VehicleQueryOutcome,
};
use platewatch_local::LocalBackend;
use platewatch_session::{MemoryStorage, SessionContext};

fn fixture() -> (LocalBackend, SessionContext) {
    let session = SessionContext::new(Arc::new(MemoryStorage::new()));
    (LocalBackend::new(session.clone()), session)
}

fn login_officer(backend: &LocalBackend, session: &SessionContext) {
    backend
        .register(&RegisterRequest {
            name: "Fixture Officer".to_string(),
            email: "fixture@example.test".to_string(),
            password: "fixture-pass".to_string(),
            role: Role::Officer,
        })
        .expect("fixture registration should work");
    let response = backend
        .login(&LoginRequest {
            email: "fixture@example.test".to_string(),
            password: "fixture-pass".to_string(),
        })
        .expect("fixture login should work");
    session
        .save(&Session {
            token: response.token,
            user: response.user,
        })
        .expect("session should save");
}

fn act_as_admin(session: &SessionContext) {
    session
        .save(&Session {
            token: "local-admin".to_string(),
            user: User {
                id: Some(99),
                name: "Fixture Admin".to_string(),
                email: None,
                role: Role::Admin,
            },
        })
        .expect("admin session should save");
}

fn new_complaint(plate: &str) -> NewComplaint {
    NewComplaint {
        plate: plate.to_string(),
        description: "Parked on the sidewalk".to_string(),
        date: "12.05.2025".to_string(),
        location: "Moda, Kadıköy, İstanbul".to_string(),
        city: Some("İstanbul".to_string()),
        district: Some("Kadıköy".to_string()),
        neighborhood: Some("Moda".to_string()),
        address_detail: None,
    }
}

#[test]
fn local_backend_tests_complaint_lifecycle_follows_triage_rules() {
    let (backend, session) = fixture();
    login_officer(&backend, &session);

    let first = backend
        .create_complaint(&new_complaint("34ABC123"))
        .expect("complaint should be created");
    let second = backend
        .create_complaint(&new_complaint("06XYZ99"))
        .expect("complaint should be created");
    assert_eq!((first.id, second.id), (1, 2));
    assert_eq!(first.status, ComplaintStatus::Pending);
    assert!(first.created_at.is_some());

    let forbidden = backend
        .update_complaint(
            first.id,
            &ComplaintUpdate {
                status: Some(ComplaintStatus::Approved),
                admin_note: None,
            },
        )
        .expect_err("officers cannot triage");
    assert_eq!(forbidden.status(), Some(403));

    act_as_admin(&session);
    backend
        .update_complaint(
            first.id,
            &ComplaintUpdate {
                status: Some(ComplaintStatus::Rejected),
                admin_note: Some("Insufficient evidence".to_string()),
            },
        )
        .expect("admin update should work");

    // A note-only update must not revert the terminal status.
    let noted = backend
        .update_complaint(
            first.id,
            &ComplaintUpdate {
                status: None,
                admin_note: Some("Reviewed twice".to_string()),
            },
        )
        .expect("note update should work");
    assert_eq!(noted.status, ComplaintStatus::Rejected);
    assert_eq!(noted.admin_note.as_deref(), Some("Reviewed twice"));

    let all = backend
        .list_complaints(ComplaintPage::default())
        .expect("admin listing should work");
    assert_eq!(all.len(), 2);

    let paged = backend
        .list_complaints(ComplaintPage { skip: 1, limit: 1 })
        .expect("paged listing should work");
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].plate, "06XYZ99");
}

#[test]
fn local_backend_tests_unknown_id_is_not_found() {
    let (backend, session) = fixture();
    act_as_admin(&session);

    let error = backend.get_complaint(42).expect_err("unknown id should fail");
    assert_eq!(error.status(), Some(404));
}

#[test]
fn local_backend_tests_requires_session_for_complaints() {
    let (backend, _session) = fixture();
    let error = backend
        .list_complaints(ComplaintPage::default())
        .expect_err("anonymous listing should fail");
    assert!(matches!(error, ApiError::Unauthorized { .. }));
}

#[test]
fn local_backend_tests_detection_and_lookup_are_stubbed() {
    let (backend, _session) = fixture();
    let error = backend
        .detect_image(&MediaFile::new("car.jpg", "image/jpeg", vec![1]))
        .expect_err("detection is unavailable locally");
    assert_eq!(error.status(), Some(501));

    assert_eq!(
        backend.query_vehicle("34ABC123").expect("lookup should work"),
        VehicleQueryOutcome::NotFound
    );
}
