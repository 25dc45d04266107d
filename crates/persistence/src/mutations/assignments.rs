// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Assignment mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use ifn_domain::Assignment;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::assignments;
use crate::error::PersistenceError;
use crate::timestamps;

/// Inserts a new assignment and returns its ID.
///
/// Only the reference column matching the target is written; the other two
/// stay NULL.
///
/// # Errors
///
/// Returns an error if a timestamp cannot be encoded or the insert fails
/// (including foreign key violations for unknown users or references).
pub fn insert_assignment(
    conn: &mut SqliteConnection,
    assignment: &Assignment,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(assignments::table)
        .values((
            assignments::brigadista_id.eq(assignment.brigadista_id),
            assignments::kind.eq(assignment.kind().as_str()),
            assignments::conglomerate_id.eq(assignment.target.conglomerate_id()),
            assignments::subplot_id.eq(assignment.target.subplot_id()),
            assignments::zone_id.eq(assignment.target.zone_id()),
            assignments::status.eq(assignment.status.as_str()),
            assignments::priority.eq(assignment.priority.as_str()),
            assignments::assigned_at.eq(timestamps::encode(assignment.assigned_at)?),
            assignments::started_at.eq(timestamps::encode_optional(assignment.started_at)?),
            assignments::completed_at.eq(timestamps::encode_optional(assignment.completed_at)?),
            assignments::due_at.eq(timestamps::encode_optional(assignment.due_at)?),
            assignments::progress.eq(i32::from(assignment.progress.value())),
            assignments::brigade_label.eq(&assignment.brigade_label),
            assignments::notes.eq(&assignment.notes),
            assignments::assigned_by.eq(assignment.assigned_by),
        ))
        .execute(conn)?;

    let assignment_id: i64 = get_last_insert_rowid(conn)?;

    info!(
        assignment_id,
        brigadista_id = assignment.brigadista_id,
        kind = %assignment.kind(),
        assigned_by = assignment.assigned_by,
        "Assignment created"
    );
    Ok(assignment_id)
}

/// Writes the mutable fields of an existing assignment.
///
/// The brigadista, target, `assigned_at` and `assigned_by` are never
/// rewritten.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the assignment has no ID or does
/// not exist, or another error if the update fails.
pub fn update_assignment(
    conn: &mut SqliteConnection,
    assignment: &Assignment,
) -> Result<(), PersistenceError> {
    let assignment_id: i64 = assignment.assignment_id.ok_or_else(|| {
        PersistenceError::NotFound("Cannot update an assignment that was never stored".to_string())
    })?;

    let rows_affected: usize = diesel::update(assignments::table)
        .filter(assignments::assignment_id.eq(assignment_id))
        .set((
            assignments::status.eq(assignment.status.as_str()),
            assignments::priority.eq(assignment.priority.as_str()),
            assignments::started_at.eq(timestamps::encode_optional(assignment.started_at)?),
            assignments::completed_at.eq(timestamps::encode_optional(assignment.completed_at)?),
            assignments::due_at.eq(timestamps::encode_optional(assignment.due_at)?),
            assignments::progress.eq(i32::from(assignment.progress.value())),
            assignments::brigade_label.eq(&assignment.brigade_label),
            assignments::notes.eq(&assignment.notes),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Assignment with ID {assignment_id} not found"
        )));
    }

    info!(assignment_id, status = %assignment.status, "Assignment updated");
    Ok(())
}

/// Permanently deletes an assignment.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the assignment does not exist.
pub fn delete_assignment(
    conn: &mut SqliteConnection,
    assignment_id: i64,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(assignments::table)
        .filter(assignments::assignment_id.eq(assignment_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Assignment with ID {assignment_id} not found"
        )));
    }

    info!(assignment_id, "Assignment deleted");
    Ok(())
}
