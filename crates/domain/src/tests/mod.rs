// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod patch;

use time::OffsetDateTime;
use time::macros::datetime;

use crate::{Assignment, AssignmentDraft, AssignmentTarget};

pub fn create_test_now() -> OffsetDateTime {
    datetime!(2026-03-10 08:30 UTC)
}

pub fn create_test_draft(target: AssignmentTarget) -> AssignmentDraft {
    AssignmentDraft {
        brigadista_id: 7,
        target,
        status: None,
        priority: None,
        due_at: None,
        brigade_label: String::from("Brigada Norte"),
        notes: String::new(),
    }
}

pub fn create_test_assignment() -> Assignment {
    let mut assignment: Assignment = Assignment::create(
        create_test_draft(AssignmentTarget::Conglomerate(3)),
        1,
        create_test_now(),
    );
    assignment.assignment_id = Some(42);
    assignment
}
