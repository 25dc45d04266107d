// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The assignment entity and its creation rules.
//!
//! An assignment is one unit of field work delegated to a brigadista by an
//! administrator. Its target is fixed at creation; status, progress and
//! scheduling fields change through [`crate::AssignmentPatch`].

use time::OffsetDateTime;

use crate::types::{AssignmentKind, AssignmentStatus, AssignmentTarget, Priority, Progress};
use crate::validation::truncate_to_micros;

/// Caller-supplied values for a new assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDraft {
    /// The user who will perform the work.
    pub brigadista_id: i64,
    /// The work being assigned.
    pub target: AssignmentTarget,
    /// Initial status; `Pending` when absent.
    pub status: Option<AssignmentStatus>,
    /// Initial priority; `Medium` when absent.
    pub priority: Option<Priority>,
    /// Optional deadline.
    pub due_at: Option<OffsetDateTime>,
    /// Free-text brigade grouping label.
    pub brigade_label: String,
    /// Free-text notes.
    pub notes: String,
}

/// A unit of field work delegated to a brigadista.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Canonical identifier, `None` until persisted.
    pub assignment_id: Option<i64>,
    /// The user who performs the work.
    pub brigadista_id: i64,
    /// The single reference this assignment is bound to.
    pub target: AssignmentTarget,
    pub status: AssignmentStatus,
    pub priority: Priority,
    /// Set once at creation.
    pub assigned_at: OffsetDateTime,
    pub started_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
    pub due_at: Option<OffsetDateTime>,
    pub progress: Progress,
    pub brigade_label: String,
    pub notes: String,
    /// The administrator who created the assignment. Immutable.
    pub assigned_by: i64,
}

impl Assignment {
    /// Builds a new, not yet persisted assignment from a draft.
    ///
    /// Missing status and priority fall back to their defaults. A draft
    /// that already carries a non-pending status goes through the same
    /// transition rules as an update.
    ///
    /// # Arguments
    ///
    /// * `draft` - The caller-supplied values
    /// * `assigned_by` - The administrator creating the assignment
    /// * `now` - The creation timestamp, kept at microsecond precision
    #[must_use]
    pub fn create(draft: AssignmentDraft, assigned_by: i64, now: OffsetDateTime) -> Self {
        let now: OffsetDateTime = truncate_to_micros(now);
        let status: AssignmentStatus = draft.status.unwrap_or_default();

        let mut assignment: Self = Self {
            assignment_id: None,
            brigadista_id: draft.brigadista_id,
            target: draft.target,
            status,
            priority: draft.priority.unwrap_or_default(),
            assigned_at: now,
            started_at: None,
            completed_at: None,
            due_at: draft.due_at,
            progress: Progress::NONE,
            brigade_label: draft.brigade_label,
            notes: draft.notes,
            assigned_by,
        };
        assignment.settle_transition(Some(status), now);
        assignment
    }

    /// Returns the kind of work this assignment targets.
    #[must_use]
    pub const fn kind(&self) -> AssignmentKind {
        self.target.kind()
    }

    /// Returns true if `user_id` is the brigadista who owns this assignment.
    #[must_use]
    pub const fn is_owned_by(&self, user_id: i64) -> bool {
        self.brigadista_id == user_id
    }
}
