// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role-scoped assignment updates and status transition rules.
//!
//! A patch only ever carries the fields its author may change. Owners get
//! [`OwnerFields`]; administrators additionally get [`AdminFields`]. Fields
//! left as `None` are not touched.
//!
//! Status changes are settled on the server:
//! - entering `InProgress` stamps `started_at` if it is still unset
//! - entering `Completed` stamps `completed_at` if it is still unset
//! - a `Completed` assignment always has progress 100
//!
//! Timestamps supplied explicitly in the patch take precedence over the
//! stamps. Applying the same patch twice leaves the assignment unchanged
//! after the first application.

use time::OffsetDateTime;

use crate::assignment::Assignment;
use crate::types::{AssignmentStatus, Priority, Progress};
use crate::validation::truncate_to_micros;

/// Fields any authorized actor (owner or administrator) may change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OwnerFields {
    pub status: Option<AssignmentStatus>,
    pub progress: Option<Progress>,
    pub started_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
    pub notes: Option<String>,
}

/// Fields only an administrator may change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdminFields {
    pub priority: Option<Priority>,
    pub due_at: Option<OffsetDateTime>,
    pub brigade_label: Option<String>,
}

/// An update whose shape is determined by the author's role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentPatch {
    /// Update authored by the owning brigadista.
    Owner(OwnerFields),
    /// Update authored by an administrator.
    Admin {
        /// Fields shared with owners.
        common: OwnerFields,
        /// Administrator-only fields.
        admin: AdminFields,
    },
}

impl AssignmentPatch {
    /// Returns the fields shared by every role.
    #[must_use]
    pub const fn common(&self) -> &OwnerFields {
        match self {
            Self::Owner(common) | Self::Admin { common, .. } => common,
        }
    }

    /// Returns the administrator-only fields, if this is an administrator patch.
    #[must_use]
    pub const fn admin(&self) -> Option<&AdminFields> {
        match self {
            Self::Owner(_) => None,
            Self::Admin { admin, .. } => Some(admin),
        }
    }
}

impl Assignment {
    /// Applies a patch in place.
    ///
    /// # Arguments
    ///
    /// * `patch` - The role-scoped update
    /// * `now` - Timestamp used when a transition stamps a date, kept at
    ///   microsecond precision
    pub fn apply_patch(&mut self, patch: &AssignmentPatch, now: OffsetDateTime) {
        let now: OffsetDateTime = truncate_to_micros(now);
        let common: &OwnerFields = patch.common();

        if let Some(status) = common.status {
            self.status = status;
        }
        if let Some(progress) = common.progress {
            self.progress = progress;
        }
        if let Some(started_at) = common.started_at {
            self.started_at = Some(started_at);
        }
        if let Some(completed_at) = common.completed_at {
            self.completed_at = Some(completed_at);
        }
        if let Some(notes) = &common.notes {
            self.notes.clone_from(notes);
        }

        if let Some(admin) = patch.admin() {
            if let Some(priority) = admin.priority {
                self.priority = priority;
            }
            if let Some(due_at) = admin.due_at {
                self.due_at = Some(due_at);
            }
            if let Some(label) = &admin.brigade_label {
                self.brigade_label.clone_from(label);
            }
        }

        self.settle_transition(common.status, now);
    }

    /// Derives dates and progress implied by the current status.
    pub(crate) fn settle_transition(
        &mut self,
        entered: Option<AssignmentStatus>,
        now: OffsetDateTime,
    ) {
        match entered {
            Some(AssignmentStatus::InProgress) if self.started_at.is_none() => {
                self.started_at = Some(now);
            }
            Some(AssignmentStatus::Completed) if self.completed_at.is_none() => {
                self.completed_at = Some(now);
            }
            _ => {}
        }

        if self.status == AssignmentStatus::Completed {
            self.progress = Progress::COMPLETE;
        }
    }
}
