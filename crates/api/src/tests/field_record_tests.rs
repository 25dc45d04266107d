// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tree and sample handler tests.

use ifn_persistence::Persistence;
use time::Duration;

use crate::{
    ApiError, CreateSampleRequest, CreateTreeRequest, SampleInfo, TreeInfo, UpdateSampleRequest,
    UpdateTreeRequest, create_sample, create_tree, delete_sample, delete_subplot, delete_tree,
    get_sample, get_tree, list_samples, list_samples_for_tree, list_samples_for_user, list_trees,
    list_trees_for_subplot, update_sample, update_tree,
};

use super::helpers::{Fixture, create_test_now, setup_test_persistence};

fn tree_request(code: &str, subplot: i64) -> CreateTreeRequest {
    CreateTreeRequest {
        code: code.to_string(),
        subplot,
        individual_number: 1,
        species: String::from("Quercus humboldtii"),
        dbh_cm: 35.4,
        height_m: 19.0,
        commercial_height_m: Some(8.5),
        condition: None,
        sanitary_state: Some(String::from("Sano")),
        notes: None,
    }
}

fn sample_request(code: &str, tree_code: &str) -> CreateSampleRequest {
    CreateSampleRequest {
        code: code.to_string(),
        tree_code: tree_code.to_string(),
        collected_at: None,
        sample_type: String::from("Leaf"),
        quantity: 2.0,
        condition: None,
        image_url: None,
        notes: None,
    }
}

fn record_tree(persistence: &mut Persistence, fixture: &Fixture, code: &str) -> TreeInfo {
    create_tree(
        persistence,
        &fixture.brigadista,
        &tree_request(code, fixture.subplot_id),
        create_test_now(),
    )
    .unwrap()
}

fn assert_invalid_field<T: std::fmt::Debug>(result: Result<T, ApiError>, expected: &str) {
    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, expected),
        other => panic!("Expected InvalidInput for '{expected}', got {other:?}"),
    }
}

// ============================================================================
// Trees
// ============================================================================

#[test]
fn test_create_tree_applies_defaults_and_resolves_view() {
    let (mut persistence, fixture) = setup_test_persistence();

    let tree: TreeInfo = record_tree(&mut persistence, &fixture, "AR-0001");

    assert_eq!(tree.code, "AR-0001");
    assert_eq!(tree.condition, "Alive");
    assert_eq!(tree.subplot.id, fixture.subplot_id);
    assert_eq!(tree.subplot.conglomerate_code, "CG-0001");
    assert_eq!(tree.recorded_by.id, fixture.brigadista.user_id);
    assert_eq!(tree.recorded_by.name, "Carlos Pérez");
    assert_eq!(tree.created_at, "2026-03-10T08:30:00Z");
    assert_eq!(get_tree(&mut persistence, tree.id).unwrap(), tree);
}

#[test]
fn test_create_tree_validates_input() {
    let (mut persistence, fixture) = setup_test_persistence();
    let now = create_test_now();
    let actor = fixture.brigadista;
    let base = tree_request("AR-0001", fixture.subplot_id);

    let cases: Vec<(CreateTreeRequest, &str)> = vec![
        (tree_request("AR-1", fixture.subplot_id), "code"),
        (CreateTreeRequest { dbh_cm: 0.0, ..base.clone() }, "dbhCm"),
        (CreateTreeRequest { height_m: -2.0, ..base.clone() }, "heightM"),
        (
            CreateTreeRequest { commercial_height_m: Some(25.0), ..base.clone() },
            "commercialHeightM",
        ),
        (CreateTreeRequest { individual_number: 0, ..base.clone() }, "individualNumber"),
        (CreateTreeRequest { species: String::from(" "), ..base.clone() }, "species"),
        (
            CreateTreeRequest { condition: Some(String::from("Burnt")), ..base.clone() },
            "condition",
        ),
    ];
    for (request, field) in cases {
        assert_invalid_field(create_tree(&mut persistence, &actor, &request, now), field);
    }

    let orphan = tree_request("AR-0001", 999);
    assert!(matches!(
        create_tree(&mut persistence, &actor, &orphan, now),
        Err(ApiError::ResourceNotFound { ref resource_type, .. }) if resource_type == "Subplot"
    ));

    create_tree(&mut persistence, &actor, &base, now).unwrap();
    assert_invalid_field(create_tree(&mut persistence, &actor, &base, now), "code");
    assert_eq!(list_trees(&mut persistence).unwrap().len(), 1);
}

#[test]
fn test_tree_listings() {
    let (mut persistence, fixture) = setup_test_persistence();
    let now = create_test_now();
    let later = CreateTreeRequest {
        individual_number: 2,
        ..tree_request("AR-0002", fixture.subplot_id)
    };
    record_tree(&mut persistence, &fixture, "AR-0001");
    create_tree(&mut persistence, &fixture.admin, &later, now + Duration::minutes(5)).unwrap();

    let recent: Vec<String> = list_trees(&mut persistence)
        .unwrap()
        .into_iter()
        .map(|t| t.code)
        .collect();
    assert_eq!(recent, vec!["AR-0002", "AR-0001"]);

    let in_subplot: Vec<i32> = list_trees_for_subplot(&mut persistence, fixture.subplot_id)
        .unwrap()
        .into_iter()
        .map(|t| t.individual_number)
        .collect();
    assert_eq!(in_subplot, vec![1, 2]);

    assert!(matches!(
        list_trees_for_subplot(&mut persistence, 999),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_only_recorder_or_admin_changes_a_tree() {
    let (mut persistence, fixture) = setup_test_persistence();
    let tree = record_tree(&mut persistence, &fixture, "AR-0001");
    let change = UpdateTreeRequest {
        condition: Some(String::from("StandingDead")),
        ..UpdateTreeRequest::default()
    };

    let err = update_tree(&mut persistence, &fixture.other_brigadista, tree.id, &change)
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden { .. }));
    let err = delete_tree(&mut persistence, &fixture.other_brigadista, tree.id).unwrap_err();
    assert!(matches!(err, ApiError::Forbidden { .. }));

    let updated = update_tree(&mut persistence, &fixture.brigadista, tree.id, &change).unwrap();
    assert_eq!(updated.condition, "StandingDead");
    assert_eq!(updated.species, tree.species);

    let too_short = UpdateTreeRequest {
        height_m: Some(4.0),
        ..UpdateTreeRequest::default()
    };
    assert_invalid_field(
        update_tree(&mut persistence, &fixture.admin, tree.id, &too_short),
        "commercialHeightM",
    );

    delete_tree(&mut persistence, &fixture.admin, tree.id).unwrap();
    assert!(matches!(
        get_tree(&mut persistence, tree.id),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_subplot_with_trees_cannot_be_deleted() {
    let (mut persistence, fixture) = setup_test_persistence();
    record_tree(&mut persistence, &fixture, "AR-0001");

    let err = delete_subplot(&mut persistence, &fixture.admin, fixture.subplot_id).unwrap_err();

    assert!(matches!(err, ApiError::Conflict { .. }));
}

// ============================================================================
// Samples
// ============================================================================

#[test]
fn test_create_sample_links_known_tree() {
    let (mut persistence, fixture) = setup_test_persistence();
    let tree = record_tree(&mut persistence, &fixture, "AR-0001");
    let now = create_test_now();

    let linked: SampleInfo = create_sample(
        &mut persistence,
        &fixture.brigadista,
        &sample_request("MS-0001", "AR-0001"),
        now,
    )
    .unwrap();
    let unlinked: SampleInfo = create_sample(
        &mut persistence,
        &fixture.brigadista,
        &sample_request("MS-0002", "AR-0777"),
        now,
    )
    .unwrap();

    assert_eq!(linked.tree, Some(tree.id));
    assert_eq!(linked.status, "Pending");
    assert_eq!(linked.condition, "Fresh");
    assert_eq!(linked.sample_type, "Leaf");
    assert_eq!(linked.collected_at, "2026-03-10T08:30:00Z");
    assert_eq!(unlinked.tree, None);
    assert_eq!(unlinked.tree_code, "AR-0777");
    assert_eq!(get_sample(&mut persistence, linked.id).unwrap(), linked);
}

#[test]
fn test_create_sample_validates_input() {
    let (mut persistence, fixture) = setup_test_persistence();
    let now = create_test_now();
    let actor = fixture.brigadista;
    let base = sample_request("MS-0001", "AR-0001");

    let cases: Vec<(CreateSampleRequest, &str)> = vec![
        (sample_request("MS-01", "AR-0001"), "code"),
        (sample_request("MS-0001", "TREE-1"), "treeCode"),
        (CreateSampleRequest { sample_type: String::from("Root"), ..base.clone() }, "type"),
        (CreateSampleRequest { quantity: 0.0, ..base.clone() }, "quantity"),
        (
            CreateSampleRequest { condition: Some(String::from("Frozen")), ..base.clone() },
            "condition",
        ),
        (
            CreateSampleRequest { collected_at: Some(String::from("yesterday")), ..base.clone() },
            "collectedAt",
        ),
        (
            CreateSampleRequest {
                collected_at: Some(String::from("9999-12-31T23:00:00-05:00")),
                ..base.clone()
            },
            "collectedAt",
        ),
    ];
    for (request, field) in cases {
        assert_invalid_field(create_sample(&mut persistence, &actor, &request, now), field);
    }
    assert!(list_samples(&mut persistence).unwrap().is_empty());
}

#[test]
fn test_sample_listings() {
    let (mut persistence, fixture) = setup_test_persistence();
    let now = create_test_now();
    let morning = CreateSampleRequest {
        collected_at: Some(String::from("2026-03-09T09:00:00-05:00")),
        ..sample_request("MS-0001", "AR-0001")
    };
    let afternoon = CreateSampleRequest {
        collected_at: Some(String::from("2026-03-09T15:00:00-05:00")),
        ..sample_request("MS-0002", "AR-0001")
    };
    create_sample(&mut persistence, &fixture.brigadista, &morning, now).unwrap();
    create_sample(&mut persistence, &fixture.brigadista, &afternoon, now).unwrap();
    create_sample(
        &mut persistence,
        &fixture.other_brigadista,
        &sample_request("MS-0003", "AR-0002"),
        now,
    )
    .unwrap();

    let for_tree = list_samples_for_tree(&mut persistence, "AR-0001").unwrap();
    let codes: Vec<&str> = for_tree.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(codes, vec!["MS-0002", "MS-0001"]);
    assert_eq!(for_tree[1].collected_at, "2026-03-09T14:00:00Z");

    let mine =
        list_samples_for_user(&mut persistence, &fixture.brigadista, fixture.brigadista.user_id)
            .unwrap();
    assert_eq!(mine.len(), 2);
    let err = list_samples_for_user(
        &mut persistence,
        &fixture.brigadista,
        fixture.other_brigadista.user_id,
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden { .. }));
    assert_eq!(
        list_samples_for_user(&mut persistence, &fixture.admin, fixture.other_brigadista.user_id)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_sample_status_is_admin_only() {
    let (mut persistence, fixture) = setup_test_persistence();
    let sample = create_sample(
        &mut persistence,
        &fixture.brigadista,
        &sample_request("MS-0001", "AR-0001"),
        create_test_now(),
    )
    .unwrap();

    let own_edit = UpdateSampleRequest {
        quantity: Some(5.0),
        status: Some(String::from("Processed")),
        ..UpdateSampleRequest::default()
    };
    let updated = update_sample(&mut persistence, &fixture.brigadista, sample.id, &own_edit)
        .unwrap();
    assert!((updated.quantity - 5.0).abs() < f64::EPSILON);
    assert_eq!(updated.status, "Pending");

    let review = UpdateSampleRequest {
        status: Some(String::from("Rejected")),
        ..UpdateSampleRequest::default()
    };
    let reviewed = update_sample(&mut persistence, &fixture.admin, sample.id, &review).unwrap();
    assert_eq!(reviewed.status, "Rejected");

    let bad = UpdateSampleRequest {
        status: Some(String::from("Lost")),
        ..UpdateSampleRequest::default()
    };
    assert_invalid_field(
        update_sample(&mut persistence, &fixture.admin, sample.id, &bad),
        "status",
    );

    let err = update_sample(&mut persistence, &fixture.other_brigadista, sample.id, &review)
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden { .. }));
}

#[test]
fn test_delete_sample() {
    let (mut persistence, fixture) = setup_test_persistence();
    let sample = create_sample(
        &mut persistence,
        &fixture.brigadista,
        &sample_request("MS-0001", "AR-0001"),
        create_test_now(),
    )
    .unwrap();

    let err = delete_sample(&mut persistence, &fixture.other_brigadista, sample.id).unwrap_err();
    assert!(matches!(err, ApiError::Forbidden { .. }));

    delete_sample(&mut persistence, &fixture.brigadista, sample.id).unwrap();
    assert!(matches!(
        get_sample(&mut persistence, sample.id),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_deleting_a_tree_keeps_its_samples() {
    let (mut persistence, fixture) = setup_test_persistence();
    let tree = record_tree(&mut persistence, &fixture, "AR-0001");
    let sample = create_sample(
        &mut persistence,
        &fixture.brigadista,
        &sample_request("MS-0001", "AR-0001"),
        create_test_now(),
    )
    .unwrap();

    delete_tree(&mut persistence, &fixture.brigadista, tree.id).unwrap();

    let kept = get_sample(&mut persistence, sample.id).unwrap();
    assert_eq!(kept.tree, None);
    assert_eq!(kept.tree_code, "AR-0001");
}
