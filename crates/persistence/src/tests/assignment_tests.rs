// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for assignment storage, ordering and grouped counts.

use ifn_domain::{
    AssignmentKind, AssignmentPatch, AssignmentStatistics, AssignmentStatus, AssignmentTarget,
    OwnerFields, Priority, Progress,
};
use time::Duration;
use time::macros::datetime;

use super::{
    create_test_admin, create_test_assignment, create_test_brigadista, create_test_conglomerate,
    create_test_now, create_test_subplot,
};
use crate::{Persistence, PersistenceError};

struct Fixture {
    persistence: Persistence,
    admin_id: i64,
    brigadista_id: i64,
    conglomerate_id: i64,
}

fn setup() -> Fixture {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let admin_id: i64 = create_test_admin(&mut persistence);
    let brigadista_id: i64 = create_test_brigadista(&mut persistence, "carlos@ifn.gov.co");
    let conglomerate_id: i64 = create_test_conglomerate(&mut persistence, "CG-0001");
    Fixture {
        persistence,
        admin_id,
        brigadista_id,
        conglomerate_id,
    }
}

#[test]
fn test_insert_and_get_assignment() {
    let mut fx: Fixture = setup();
    let assignment = create_test_assignment(
        fx.brigadista_id,
        fx.admin_id,
        AssignmentTarget::Conglomerate(fx.conglomerate_id),
        create_test_now(),
    );

    let assignment_id: i64 = fx.persistence.insert_assignment(&assignment).unwrap();
    let stored = fx
        .persistence
        .get_assignment(assignment_id)
        .unwrap()
        .unwrap();

    assert_eq!(stored.assignment_id, Some(assignment_id));
    assert_eq!(stored.target, AssignmentTarget::Conglomerate(fx.conglomerate_id));
    assert_eq!(stored.status, AssignmentStatus::Pending);
    assert_eq!(stored.priority, Priority::Medium);
    assert_eq!(stored.assigned_at, create_test_now());
    assert_eq!(stored.progress, Progress::NONE);
    assert_eq!(stored.assigned_by, fx.admin_id);
}

#[test]
fn test_zone_assignment_keeps_only_zone_reference() {
    let mut fx: Fixture = setup();
    let assignment = create_test_assignment(
        fx.brigadista_id,
        fx.admin_id,
        AssignmentTarget::Zone(String::from("ZN-12")),
        create_test_now(),
    );

    let assignment_id: i64 = fx.persistence.insert_assignment(&assignment).unwrap();
    let stored = fx
        .persistence
        .get_assignment(assignment_id)
        .unwrap()
        .unwrap();

    assert_eq!(stored.kind(), AssignmentKind::Zone);
    assert_eq!(stored.target.zone_id(), Some("ZN-12"));
    assert_eq!(stored.target.conglomerate_id(), None);
    assert_eq!(stored.target.subplot_id(), None);
}

#[test]
fn test_insert_with_unknown_reference_fails_and_persists_nothing() {
    let mut fx: Fixture = setup();
    let assignment = create_test_assignment(
        fx.brigadista_id,
        fx.admin_id,
        AssignmentTarget::Subplot(404),
        create_test_now(),
    );

    assert!(fx.persistence.insert_assignment(&assignment).is_err());
    assert!(fx.persistence.list_assignments().unwrap().is_empty());
}

#[test]
fn test_get_missing_assignment_returns_none() {
    let mut fx: Fixture = setup();
    assert!(fx.persistence.get_assignment(12345).unwrap().is_none());
}

#[test]
fn test_listings_are_newest_first() {
    let mut fx: Fixture = setup();
    let subplot_id: i64 = create_test_subplot(&mut fx.persistence, "CG-0001");
    let now = create_test_now();

    let older = create_test_assignment(
        fx.brigadista_id,
        fx.admin_id,
        AssignmentTarget::Conglomerate(fx.conglomerate_id),
        now - Duration::days(2),
    );
    let newer = create_test_assignment(
        fx.brigadista_id,
        fx.admin_id,
        AssignmentTarget::Subplot(subplot_id),
        now,
    );
    let other_owner = create_test_assignment(
        fx.admin_id,
        fx.admin_id,
        AssignmentTarget::Zone(String::from("ZN-1")),
        now - Duration::days(1),
    );

    let older_id: i64 = fx.persistence.insert_assignment(&older).unwrap();
    let newer_id: i64 = fx.persistence.insert_assignment(&newer).unwrap();
    let other_id: i64 = fx.persistence.insert_assignment(&other_owner).unwrap();

    let all: Vec<Option<i64>> = fx
        .persistence
        .list_assignments()
        .unwrap()
        .into_iter()
        .map(|a| a.assignment_id)
        .collect();
    assert_eq!(all, vec![Some(newer_id), Some(other_id), Some(older_id)]);

    let mine: Vec<Option<i64>> = fx
        .persistence
        .list_assignments_for_brigadista(fx.brigadista_id)
        .unwrap()
        .into_iter()
        .map(|a| a.assignment_id)
        .collect();
    assert_eq!(mine, vec![Some(newer_id), Some(older_id)]);
}

#[test]
fn test_sub_second_timestamps_sort_chronologically() {
    let mut fx: Fixture = setup();
    let now = create_test_now();

    let first = create_test_assignment(
        fx.brigadista_id,
        fx.admin_id,
        AssignmentTarget::Zone(String::from("ZN-1")),
        now + Duration::milliseconds(500),
    );
    let second = create_test_assignment(
        fx.brigadista_id,
        fx.admin_id,
        AssignmentTarget::Zone(String::from("ZN-2")),
        now + Duration::seconds(1),
    );

    fx.persistence.insert_assignment(&first).unwrap();
    fx.persistence.insert_assignment(&second).unwrap();

    let zones: Vec<String> = fx
        .persistence
        .list_assignments()
        .unwrap()
        .into_iter()
        .filter_map(|a| a.target.zone_id().map(str::to_string))
        .collect();
    assert_eq!(zones, vec!["ZN-2", "ZN-1"]);
}

#[test]
fn test_update_writes_patched_fields() {
    let mut fx: Fixture = setup();
    let mut assignment = create_test_assignment(
        fx.brigadista_id,
        fx.admin_id,
        AssignmentTarget::Conglomerate(fx.conglomerate_id),
        create_test_now(),
    );
    let assignment_id: i64 = fx.persistence.insert_assignment(&assignment).unwrap();
    assignment.assignment_id = Some(assignment_id);

    assignment.apply_patch(
        &AssignmentPatch::Owner(OwnerFields {
            status: Some(AssignmentStatus::Completed),
            notes: Some(String::from("Listo")),
            ..OwnerFields::default()
        }),
        create_test_now() + Duration::hours(3),
    );
    fx.persistence.update_assignment(&assignment).unwrap();

    let stored = fx
        .persistence
        .get_assignment(assignment_id)
        .unwrap()
        .unwrap();
    assert_eq!(stored, assignment);
    assert_eq!(stored.progress, Progress::COMPLETE);
}

#[test]
fn test_update_missing_assignment_is_not_found() {
    let mut fx: Fixture = setup();
    let mut assignment = create_test_assignment(
        fx.brigadista_id,
        fx.admin_id,
        AssignmentTarget::Conglomerate(fx.conglomerate_id),
        create_test_now(),
    );
    assignment.assignment_id = Some(777);

    assert!(matches!(
        fx.persistence.update_assignment(&assignment),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_delete_assignment() {
    let mut fx: Fixture = setup();
    let assignment = create_test_assignment(
        fx.brigadista_id,
        fx.admin_id,
        AssignmentTarget::Conglomerate(fx.conglomerate_id),
        create_test_now(),
    );
    let assignment_id: i64 = fx.persistence.insert_assignment(&assignment).unwrap();

    fx.persistence.delete_assignment(assignment_id).unwrap();

    assert!(fx.persistence.get_assignment(assignment_id).unwrap().is_none());
    assert!(matches!(
        fx.persistence.delete_assignment(assignment_id),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_statistics_group_and_omit_empty_categories() {
    let mut fx: Fixture = setup();
    let now = create_test_now();

    for (index, zone) in ["ZN-1", "ZN-2"].into_iter().enumerate() {
        let assignment = create_test_assignment(
            fx.brigadista_id,
            fx.admin_id,
            AssignmentTarget::Zone(zone.to_string()),
            now + Duration::minutes(i64::try_from(index).unwrap()),
        );
        fx.persistence.insert_assignment(&assignment).unwrap();
    }
    let mut completed = create_test_assignment(
        fx.brigadista_id,
        fx.admin_id,
        AssignmentTarget::Conglomerate(fx.conglomerate_id),
        now,
    );
    completed.status = AssignmentStatus::Completed;
    completed.priority = Priority::High;
    fx.persistence.insert_assignment(&completed).unwrap();

    let stats: AssignmentStatistics = fx.persistence.assignment_statistics().unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_status.len(), 2);
    assert_eq!(stats.by_status[&AssignmentStatus::Pending], 2);
    assert_eq!(stats.by_status[&AssignmentStatus::Completed], 1);
    assert_eq!(stats.by_kind.len(), 2);
    assert_eq!(stats.by_kind[&AssignmentKind::Zone], 2);
    assert_eq!(stats.by_kind[&AssignmentKind::Conglomerate], 1);
    assert_eq!(stats.by_priority[&Priority::Medium], 2);
    assert_eq!(stats.by_priority[&Priority::High], 1);
    assert!(!stats.by_priority.contains_key(&Priority::Low));
}

#[test]
fn test_statistics_on_empty_store() {
    let mut fx: Fixture = setup();
    assert_eq!(
        fx.persistence.assignment_statistics().unwrap(),
        AssignmentStatistics::default()
    );
}

#[test]
fn test_unstorable_timestamp_is_rejected_without_writing() {
    let mut fx: Fixture = setup();
    let mut assignment = create_test_assignment(
        fx.brigadista_id,
        fx.admin_id,
        AssignmentTarget::Conglomerate(fx.conglomerate_id),
        create_test_now(),
    );
    assignment.due_at = Some(datetime!(9999-12-31 23:00 -05:00));

    let result = fx.persistence.insert_assignment(&assignment);
    assert!(matches!(result, Err(PersistenceError::Other(_))));
    assert!(fx.persistence.list_assignments().unwrap().is_empty());

    assignment.due_at = Some(datetime!(0000-01-01 00:00 +01:00));
    let result = fx.persistence.insert_assignment(&assignment);
    assert!(matches!(result, Err(PersistenceError::Other(_))));
    assert!(fx.persistence.list_assignments().unwrap().is_empty());
}
