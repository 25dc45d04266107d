// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Assignment lifecycle tests: creation, updates, deletion and statistics.

use time::Duration;
use tokio::sync::Mutex;

use crate::{
    ApiError, AssignmentResponse, CreateAssignmentRequest, UpdateAssignmentRequest,
    assignment_statistics, create_assignment, delete_assignment, list_all_assignments,
    list_assignments_for_brigadista, update_assignment,
};

use super::helpers::{
    FakeZoneDirectory, conglomerate_request, create_ok, create_test_now, setup_test_persistence,
    zone_request,
};

fn assert_invalid_field<T: std::fmt::Debug>(result: Result<T, ApiError>, expected: &str) {
    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, expected),
        other => panic!("Expected InvalidInput for '{expected}', got {other:?}"),
    }
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_applies_defaults_and_resolves_view() {
    let (persistence, fixture) = setup_test_persistence();
    let persistence = Mutex::new(persistence);
    let zones = FakeZoneDirectory::with_zones(&[]);

    let created: AssignmentResponse = create_ok(
        &persistence,
        &zones,
        &fixture.admin,
        &conglomerate_request(fixture.brigadista.user_id, fixture.conglomerate_id),
        create_test_now(),
    )
    .await;

    assert_eq!(created.assignment_type, "conglomerate");
    assert_eq!(created.status, "Pending");
    assert_eq!(created.priority, "Medium");
    assert_eq!(created.progress, 0);
    assert_eq!(created.assigned_at, "2026-03-10T08:30:00Z");
    assert_eq!(created.started_at, None);
    assert_eq!(created.brigade_label, "Brigada Norte");
    assert_eq!(created.brigadista.id, fixture.brigadista.user_id);
    assert_eq!(created.brigadista.email, "carlos@ifn.gov.co");
    assert_eq!(created.assigned_by.id, fixture.admin.user_id);
    assert_eq!(created.assigned_by.name, "Ana Rodríguez");

    let conglomerate = created.conglomerate.expect("conglomerate should be resolved");
    assert_eq!(conglomerate.code, "CG-0001");
    assert_eq!(conglomerate.municipality, "Medellín");
    assert_eq!(conglomerate.vereda, "Santa Elena");
    assert!((conglomerate.latitude - 6.2442).abs() < f64::EPSILON);
    assert!((conglomerate.longitude - -75.5812).abs() < f64::EPSILON);
    assert!(created.subplot.is_none());
    assert!(created.zone_id.is_none());
    assert_eq!(zones.calls(), 0);
}

#[tokio::test]
async fn test_create_subplot_assignment_keeps_only_subplot_reference() {
    let (persistence, fixture) = setup_test_persistence();
    let persistence = Mutex::new(persistence);
    let zones = FakeZoneDirectory::with_zones(&[]);

    let request = CreateAssignmentRequest {
        assignment_type: String::from("subplot"),
        subplot: Some(fixture.subplot_id),
        zone_id: Some(String::from("Z-IGNORED")),
        ..conglomerate_request(fixture.brigadista.user_id, fixture.conglomerate_id)
    };
    let created = create_ok(&persistence, &zones, &fixture.admin, &request, create_test_now()).await;

    let subplot = created.subplot.expect("subplot should be resolved");
    assert_eq!(subplot.conglomerate_code, "CG-0001");
    assert_eq!(subplot.number, 3);
    assert!((subplot.latitude - 6.2443).abs() < f64::EPSILON);
    assert!((subplot.longitude - -75.5811).abs() < f64::EPSILON);
    assert!(created.conglomerate.is_none());
    assert!(created.zone_id.is_none());
}

#[tokio::test]
async fn test_create_with_completed_status_is_fully_progressed() {
    let (persistence, fixture) = setup_test_persistence();
    let persistence = Mutex::new(persistence);
    let zones = FakeZoneDirectory::with_zones(&[]);

    let request = CreateAssignmentRequest {
        status: Some(String::from("Completed")),
        priority: Some(String::from("High")),
        due_at: Some(String::from("2026-04-01")),
        ..conglomerate_request(fixture.brigadista.user_id, fixture.conglomerate_id)
    };
    let created = create_ok(&persistence, &zones, &fixture.admin, &request, create_test_now()).await;

    assert_eq!(created.status, "Completed");
    assert_eq!(created.priority, "High");
    assert_eq!(created.progress, 100);
    assert_eq!(created.completed_at.as_deref(), Some("2026-03-10T08:30:00Z"));
    assert_eq!(created.due_at.as_deref(), Some("2026-04-01T00:00:00Z"));
}

#[tokio::test]
async fn test_create_rejects_invalid_input_without_persisting() {
    let (persistence, fixture) = setup_test_persistence();
    let persistence = Mutex::new(persistence);
    let zones = FakeZoneDirectory::with_zones(&["Z-001"]);
    let base = conglomerate_request(fixture.brigadista.user_id, fixture.conglomerate_id);
    let now = create_test_now();

    let cases: Vec<(CreateAssignmentRequest, &str)> = vec![
        (
            CreateAssignmentRequest {
                assignment_type: String::from("parcel"),
                ..base.clone()
            },
            "type",
        ),
        (
            CreateAssignmentRequest {
                conglomerate: None,
                ..base.clone()
            },
            "conglomerate",
        ),
        (
            CreateAssignmentRequest {
                assignment_type: String::from("zone"),
                zone_id: Some(String::from("   ")),
                ..base.clone()
            },
            "zoneId",
        ),
        (
            CreateAssignmentRequest {
                status: Some(String::from("Archived")),
                ..base.clone()
            },
            "status",
        ),
        (
            CreateAssignmentRequest {
                priority: Some(String::from("Urgent")),
                ..base.clone()
            },
            "priority",
        ),
        (
            CreateAssignmentRequest {
                due_at: Some(String::from("next tuesday")),
                ..base.clone()
            },
            "dueAt",
        ),
    ];

    for (request, field) in cases {
        let result =
            create_assignment(&persistence, &zones, &fixture.admin, &request, now).await;
        assert_invalid_field(result, field);
    }

    assert!(persistence.lock().await.list_assignments().unwrap().is_empty());
    assert_eq!(zones.calls(), 0);
}

#[tokio::test]
async fn test_create_requires_existing_references() {
    let (persistence, fixture) = setup_test_persistence();
    let persistence = Mutex::new(persistence);
    let zones = FakeZoneDirectory::with_zones(&[]);
    let now = create_test_now();

    let unknown_brigadista = conglomerate_request(999, fixture.conglomerate_id);
    let unknown_conglomerate = conglomerate_request(fixture.brigadista.user_id, 999);
    let unknown_subplot = CreateAssignmentRequest {
        assignment_type: String::from("subplot"),
        subplot: Some(999),
        ..conglomerate_request(fixture.brigadista.user_id, fixture.conglomerate_id)
    };

    for (request, resource) in [
        (unknown_brigadista, "User"),
        (unknown_conglomerate, "Conglomerate"),
        (unknown_subplot, "Subplot"),
    ] {
        let result =
            create_assignment(&persistence, &zones, &fixture.admin, &request, now).await;
        match result {
            Err(ApiError::ResourceNotFound { resource_type, .. }) => {
                assert_eq!(resource_type, resource);
            }
            other => panic!("Expected ResourceNotFound for {resource}, got {other:?}"),
        }
    }

    assert!(persistence.lock().await.list_assignments().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_zone_assignment_verifies_zone() {
    let (persistence, fixture) = setup_test_persistence();
    let persistence = Mutex::new(persistence);
    let zones = FakeZoneDirectory::with_zones(&["Z-001"]);

    let created = create_ok(
        &persistence,
        &zones,
        &fixture.admin,
        &zone_request(fixture.brigadista.user_id, " Z-001 "),
        create_test_now(),
    )
    .await;

    assert_eq!(created.assignment_type, "zone");
    assert_eq!(created.zone_id.as_deref(), Some("Z-001"));
    assert!(created.conglomerate.is_none());
    assert!(created.zone_data.is_none());
    assert_eq!(zones.calls(), 1);
}

#[tokio::test]
async fn test_create_zone_assignment_fails_for_unknown_zone() {
    let (persistence, fixture) = setup_test_persistence();
    let persistence = Mutex::new(persistence);
    let zones = FakeZoneDirectory::with_zones(&["Z-001"]);

    let err = create_assignment(
        &persistence,
        &zones,
        &fixture.admin,
        &zone_request(fixture.brigadista.user_id, "Z-404"),
        create_test_now(),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err,
        ApiError::ResourceNotFound {
            resource_type: String::from("Zone"),
            message: String::from("Zone 'Z-404' not found"),
        }
    );
    assert!(persistence.lock().await.list_assignments().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_zone_assignment_fails_when_service_unavailable() {
    let (persistence, fixture) = setup_test_persistence();
    let persistence = Mutex::new(persistence);
    let zones = FakeZoneDirectory::unavailable();

    let err = create_assignment(
        &persistence,
        &zones,
        &fixture.admin,
        &zone_request(fixture.brigadista.user_id, "Z-001"),
        create_test_now(),
    )
    .await
    .unwrap_err();

    match err {
        ApiError::ResourceNotFound { message, .. } => {
            assert!(message.contains("could not be verified"), "{message}");
        }
        other => panic!("Expected ResourceNotFound, got {other:?}"),
    }
    assert!(persistence.lock().await.list_assignments().unwrap().is_empty());
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_listings_are_newest_first() {
    let (persistence, fixture) = setup_test_persistence();
    let persistence = Mutex::new(persistence);
    let zones = FakeZoneDirectory::with_zones(&[]);
    let now = create_test_now();

    let mut ids: Vec<i64> = Vec::new();
    for (offset, brigadista) in [
        (0, &fixture.brigadista),
        (2, &fixture.other_brigadista),
        (1, &fixture.brigadista),
    ] {
        let created = create_ok(
            &persistence,
            &zones,
            &fixture.admin,
            &conglomerate_request(brigadista.user_id, fixture.conglomerate_id),
            now + Duration::hours(offset),
        )
        .await;
        ids.push(created.id);
    }

    let mut guard = persistence.lock().await;

    let all: Vec<i64> = list_all_assignments(&mut guard, &fixture.admin)
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(all, vec![ids[1], ids[2], ids[0]]);

    let mine: Vec<i64> =
        list_assignments_for_brigadista(&mut guard, &fixture.admin, fixture.brigadista.user_id)
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
    assert_eq!(mine, vec![ids[2], ids[0]]);
}

// ============================================================================
// Update
// ============================================================================

async fn setup_owned_assignment() -> (Mutex<ifn_persistence::Persistence>, super::helpers::Fixture, i64)
{
    let (persistence, fixture) = setup_test_persistence();
    let persistence = Mutex::new(persistence);
    let zones = FakeZoneDirectory::with_zones(&[]);
    let created = create_ok(
        &persistence,
        &zones,
        &fixture.admin,
        &conglomerate_request(fixture.brigadista.user_id, fixture.conglomerate_id),
        create_test_now(),
    )
    .await;
    (persistence, fixture, created.id)
}

#[tokio::test]
async fn test_owner_update_drops_admin_only_fields() {
    let (persistence, fixture, id) = setup_owned_assignment().await;
    let mut guard = persistence.lock().await;

    let request = UpdateAssignmentRequest {
        status: Some(String::from("InProgress")),
        progress: Some(40),
        notes: Some(String::from("Parcela 2 medida")),
        priority: Some(String::from("Not even a priority")),
        due_at: Some(String::from("garbage")),
        brigade_label: Some(String::from("Brigada Sur")),
        ..UpdateAssignmentRequest::default()
    };
    let later = create_test_now() + Duration::days(1);
    let updated =
        update_assignment(&mut guard, &fixture.brigadista, id, &request, later).unwrap();

    assert_eq!(updated.status, "InProgress");
    assert_eq!(updated.progress, 40);
    assert_eq!(updated.notes, "Parcela 2 medida");
    assert_eq!(updated.started_at.as_deref(), Some("2026-03-11T08:30:00Z"));
    assert_eq!(updated.priority, "Medium");
    assert_eq!(updated.due_at, None);
    assert_eq!(updated.brigade_label, "Brigada Norte");
}

#[tokio::test]
async fn test_admin_update_changes_admin_fields() {
    let (persistence, fixture, id) = setup_owned_assignment().await;
    let mut guard = persistence.lock().await;

    let request = UpdateAssignmentRequest {
        priority: Some(String::from("High")),
        due_at: Some(String::from("2026-05-01T12:00:00Z")),
        brigade_label: Some(String::from("Brigada Sur")),
        ..UpdateAssignmentRequest::default()
    };
    let updated =
        update_assignment(&mut guard, &fixture.admin, id, &request, create_test_now()).unwrap();

    assert_eq!(updated.priority, "High");
    assert_eq!(updated.due_at.as_deref(), Some("2026-05-01T12:00:00Z"));
    assert_eq!(updated.brigade_label, "Brigada Sur");
    assert_eq!(updated.status, "Pending");
}

#[tokio::test]
async fn test_admin_update_validates_admin_fields() {
    let (persistence, fixture, id) = setup_owned_assignment().await;
    let mut guard = persistence.lock().await;

    let request = UpdateAssignmentRequest {
        priority: Some(String::from("Urgent")),
        ..UpdateAssignmentRequest::default()
    };

    assert_invalid_field(
        update_assignment(&mut guard, &fixture.admin, id, &request, create_test_now()),
        "priority",
    );
}

#[tokio::test]
async fn test_update_rejects_out_of_range_progress() {
    let (persistence, fixture, id) = setup_owned_assignment().await;
    let mut guard = persistence.lock().await;

    let request = UpdateAssignmentRequest {
        progress: Some(150),
        ..UpdateAssignmentRequest::default()
    };

    assert_invalid_field(
        update_assignment(&mut guard, &fixture.brigadista, id, &request, create_test_now()),
        "progress",
    );
    assert_eq!(guard.get_assignment(id).unwrap().unwrap().progress.value(), 0);
}

#[tokio::test]
async fn test_non_owner_brigadista_cannot_update() {
    let (persistence, fixture, id) = setup_owned_assignment().await;
    let mut guard = persistence.lock().await;

    let request = UpdateAssignmentRequest {
        status: Some(String::from("Completed")),
        ..UpdateAssignmentRequest::default()
    };
    let err = update_assignment(
        &mut guard,
        &fixture.other_brigadista,
        id,
        &request,
        create_test_now(),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::Forbidden { .. }));
    assert_eq!(
        guard.get_assignment(id).unwrap().unwrap().status.as_str(),
        "Pending"
    );
}

#[tokio::test]
async fn test_update_of_missing_assignment_is_not_found_for_everyone() {
    let (persistence, fixture, _id) = setup_owned_assignment().await;
    let mut guard = persistence.lock().await;

    for actor in [&fixture.admin, &fixture.other_brigadista] {
        let err = update_assignment(
            &mut guard,
            actor,
            999,
            &UpdateAssignmentRequest::default(),
            create_test_now(),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::ResourceNotFound { .. }));
    }
}

#[tokio::test]
async fn test_completing_forces_full_progress_and_is_idempotent() {
    let (persistence, fixture, id) = setup_owned_assignment().await;
    let mut guard = persistence.lock().await;

    let request = UpdateAssignmentRequest {
        status: Some(String::from("Completed")),
        progress: Some(80),
        ..UpdateAssignmentRequest::default()
    };
    let first_at = create_test_now() + Duration::days(2);
    let first =
        update_assignment(&mut guard, &fixture.brigadista, id, &request, first_at).unwrap();

    assert_eq!(first.progress, 100);
    assert_eq!(first.completed_at.as_deref(), Some("2026-03-12T08:30:00Z"));

    let second = update_assignment(
        &mut guard,
        &fixture.brigadista,
        id,
        &request,
        first_at + Duration::days(1),
    )
    .unwrap();

    assert_eq!(second, first);
}

#[tokio::test]
async fn test_unstorable_timestamps_are_rejected_and_listings_survive() {
    let (persistence, fixture, id) = setup_owned_assignment().await;
    let zones = FakeZoneDirectory::with_zones(&[]);

    let request = CreateAssignmentRequest {
        due_at: Some(String::from("9999-12-31T23:00:00-05:00")),
        ..conglomerate_request(fixture.brigadista.user_id, fixture.conglomerate_id)
    };
    assert_invalid_field(
        create_assignment(&persistence, &zones, &fixture.admin, &request, create_test_now()).await,
        "dueAt",
    );

    let mut guard = persistence.lock().await;
    let request = UpdateAssignmentRequest {
        started_at: Some(String::from("0000-01-01T00:00:00+01:00")),
        ..UpdateAssignmentRequest::default()
    };
    assert_invalid_field(
        update_assignment(&mut guard, &fixture.brigadista, id, &request, create_test_now()),
        "startedAt",
    );

    let all = list_all_assignments(&mut guard, &fixture.admin).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].started_at, None);
}

#[tokio::test]
async fn test_responses_match_stored_precision() {
    let (persistence, fixture) = setup_test_persistence();
    let persistence = Mutex::new(persistence);
    let zones = FakeZoneDirectory::with_zones(&[]);
    let now = create_test_now() + Duration::nanoseconds(123_456_789);

    let created = create_ok(
        &persistence,
        &zones,
        &fixture.admin,
        &conglomerate_request(fixture.brigadista.user_id, fixture.conglomerate_id),
        now,
    )
    .await;
    assert_eq!(created.assigned_at, "2026-03-10T08:30:00.123456Z");

    let mut guard = persistence.lock().await;
    let listed = list_all_assignments(&mut guard, &fixture.admin).unwrap();
    assert_eq!(listed[0].assigned_at, created.assigned_at);

    let request = UpdateAssignmentRequest {
        status: Some(String::from("InProgress")),
        started_at: Some(String::from("2026-03-11T07:00:00.987654321Z")),
        ..UpdateAssignmentRequest::default()
    };
    let first =
        update_assignment(&mut guard, &fixture.brigadista, created.id, &request, now).unwrap();
    let second =
        update_assignment(&mut guard, &fixture.brigadista, created.id, &request, now).unwrap();

    assert_eq!(first.started_at.as_deref(), Some("2026-03-11T07:00:00.987654Z"));
    assert_eq!(second, first);
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_removes_assignment() {
    let (persistence, fixture, id) = setup_owned_assignment().await;
    let mut guard = persistence.lock().await;

    let response = delete_assignment(&mut guard, &fixture.admin, id).unwrap();

    assert_eq!(response.message, format!("Assignment {id} deleted"));
    assert!(guard.get_assignment(id).unwrap().is_none());
}

#[test]
fn test_delete_missing_assignment_is_not_found() {
    let (mut persistence, fixture) = setup_test_persistence();

    let err = delete_assignment(&mut persistence, &fixture.admin, 999).unwrap_err();

    assert_eq!(
        err,
        ApiError::ResourceNotFound {
            resource_type: String::from("Assignment"),
            message: String::from("No assignment with ID 999"),
        }
    );
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test]
async fn test_statistics_count_by_category_and_omit_empty_ones() {
    let (persistence, fixture) = setup_test_persistence();
    let persistence = Mutex::new(persistence);
    let zones = FakeZoneDirectory::with_zones(&["Z-001"]);
    let now = create_test_now();
    let brigadista = fixture.brigadista.user_id;

    let requests: Vec<CreateAssignmentRequest> = vec![
        conglomerate_request(brigadista, fixture.conglomerate_id),
        CreateAssignmentRequest {
            priority: Some(String::from("High")),
            ..conglomerate_request(brigadista, fixture.conglomerate_id)
        },
        CreateAssignmentRequest {
            status: Some(String::from("InProgress")),
            ..zone_request(brigadista, "Z-001")
        },
    ];
    for request in &requests {
        create_ok(&persistence, &zones, &fixture.admin, request, now).await;
    }

    let mut guard = persistence.lock().await;
    let stats = assignment_statistics(&mut guard, &fixture.admin).unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_status.get("Pending"), Some(&2));
    assert_eq!(stats.by_status.get("InProgress"), Some(&1));
    assert!(!stats.by_status.contains_key("Completed"));
    assert_eq!(stats.by_type.get("conglomerate"), Some(&2));
    assert_eq!(stats.by_type.get("zone"), Some(&1));
    assert!(!stats.by_type.contains_key("subplot"));
    assert_eq!(stats.by_priority.get("Medium"), Some(&2));
    assert_eq!(stats.by_priority.get("High"), Some(&1));
    assert!(!stats.by_priority.contains_key("Low"));
}

#[test]
fn test_statistics_on_empty_database() {
    let (mut persistence, fixture) = setup_test_persistence();

    let stats = assignment_statistics(&mut persistence, &fixture.admin).unwrap();

    assert_eq!(stats.total, 0);
    assert!(stats.by_status.is_empty());
    assert!(stats.by_type.is_empty());
    assert!(stats.by_priority.is_empty());
}
