// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Duration;
use time::macros::datetime;

use super::{create_test_assignment, create_test_now};
use crate::{
    AdminFields, Assignment, AssignmentPatch, AssignmentStatus, OwnerFields, Priority, Progress,
};

#[test]
fn test_owner_patch_applies_only_present_fields() {
    let mut assignment: Assignment = create_test_assignment();
    let patch = AssignmentPatch::Owner(OwnerFields {
        progress: Some(Progress::new(40).unwrap()),
        notes: Some(String::from("Parcela con acceso difícil")),
        ..OwnerFields::default()
    });

    assignment.apply_patch(&patch, create_test_now());

    assert_eq!(assignment.progress.value(), 40);
    assert_eq!(assignment.notes, "Parcela con acceso difícil");
    assert_eq!(assignment.status, AssignmentStatus::Pending);
    assert_eq!(assignment.brigade_label, "Brigada Norte");
    assert!(assignment.started_at.is_none());
}

#[test]
fn test_admin_patch_updates_admin_fields() {
    let mut assignment: Assignment = create_test_assignment();
    let due = datetime!(2026-04-01 00:00 UTC);
    let patch = AssignmentPatch::Admin {
        common: OwnerFields::default(),
        admin: AdminFields {
            priority: Some(Priority::High),
            due_at: Some(due),
            brigade_label: Some(String::from("Brigada Sur")),
        },
    };

    assignment.apply_patch(&patch, create_test_now());

    assert_eq!(assignment.priority, Priority::High);
    assert_eq!(assignment.due_at, Some(due));
    assert_eq!(assignment.brigade_label, "Brigada Sur");
}

#[test]
fn test_entering_in_progress_stamps_start_once() {
    let mut assignment: Assignment = create_test_assignment();
    let first = create_test_now();
    let later = first + Duration::hours(5);
    let patch = AssignmentPatch::Owner(OwnerFields {
        status: Some(AssignmentStatus::InProgress),
        ..OwnerFields::default()
    });

    assignment.apply_patch(&patch, first);
    assert_eq!(assignment.started_at, Some(first));

    assignment.apply_patch(&patch, later);
    assert_eq!(assignment.started_at, Some(first));
}

#[test]
fn test_explicit_start_date_wins_over_stamp() {
    let mut assignment: Assignment = create_test_assignment();
    let supplied = datetime!(2026-03-09 06:00 UTC);
    let patch = AssignmentPatch::Owner(OwnerFields {
        status: Some(AssignmentStatus::InProgress),
        started_at: Some(supplied),
        ..OwnerFields::default()
    });

    assignment.apply_patch(&patch, create_test_now());

    assert_eq!(assignment.started_at, Some(supplied));
}

#[test]
fn test_completion_forces_full_progress_and_stamps_completion() {
    let mut assignment: Assignment = create_test_assignment();
    let now = create_test_now();
    let patch = AssignmentPatch::Owner(OwnerFields {
        status: Some(AssignmentStatus::Completed),
        progress: Some(Progress::new(60).unwrap()),
        ..OwnerFields::default()
    });

    assignment.apply_patch(&patch, now);

    assert_eq!(assignment.status, AssignmentStatus::Completed);
    assert_eq!(assignment.progress, Progress::COMPLETE);
    assert_eq!(assignment.completed_at, Some(now));
}

#[test]
fn test_completed_assignment_keeps_full_progress() {
    let mut assignment: Assignment = create_test_assignment();
    let now = create_test_now();
    assignment.apply_patch(
        &AssignmentPatch::Owner(OwnerFields {
            status: Some(AssignmentStatus::Completed),
            ..OwnerFields::default()
        }),
        now,
    );

    assignment.apply_patch(
        &AssignmentPatch::Owner(OwnerFields {
            progress: Some(Progress::new(10).unwrap()),
            ..OwnerFields::default()
        }),
        now,
    );

    assert_eq!(assignment.progress, Progress::COMPLETE);
}

#[test]
fn test_repeating_a_patch_is_idempotent() {
    let mut assignment: Assignment = create_test_assignment();
    let now = create_test_now();
    let patch = AssignmentPatch::Admin {
        common: OwnerFields {
            status: Some(AssignmentStatus::Completed),
            notes: Some(String::from("Cerrado")),
            ..OwnerFields::default()
        },
        admin: AdminFields {
            priority: Some(Priority::Low),
            ..AdminFields::default()
        },
    };

    assignment.apply_patch(&patch, now);
    let once: Assignment = assignment.clone();
    assignment.apply_patch(&patch, now + Duration::minutes(30));

    assert_eq!(assignment, once);
}

#[test]
fn test_pausing_does_not_touch_dates() {
    let mut assignment: Assignment = create_test_assignment();
    assignment.apply_patch(
        &AssignmentPatch::Owner(OwnerFields {
            status: Some(AssignmentStatus::Paused),
            ..OwnerFields::default()
        }),
        create_test_now(),
    );

    assert_eq!(assignment.status, AssignmentStatus::Paused);
    assert!(assignment.started_at.is_none());
    assert!(assignment.completed_at.is_none());
}

#[test]
fn test_stamped_dates_drop_sub_microsecond_precision() {
    let mut assignment: Assignment = create_test_assignment();
    let now = datetime!(2026-03-10 09:00:00.123456789 UTC);
    let patch = AssignmentPatch::Owner(OwnerFields {
        status: Some(AssignmentStatus::InProgress),
        ..OwnerFields::default()
    });

    assignment.apply_patch(&patch, now);

    assert_eq!(
        assignment.started_at,
        Some(datetime!(2026-03-10 09:00:00.123456 UTC))
    );
}
