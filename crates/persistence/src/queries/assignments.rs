// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Assignment queries.
//!
//! Rows are rebuilt into [`Assignment`] values on the way out. A row whose
//! kind and reference columns disagree, or whose enum text is unknown, is
//! reported as `PersistenceError::CorruptRecord` rather than skipped.

use std::str::FromStr;

use diesel::SqliteConnection;
use diesel::prelude::*;
use ifn_domain::{
    Assignment, AssignmentKind, AssignmentStatus, AssignmentTarget, DomainError, Priority,
    Progress,
};
use num_traits::ToPrimitive;
use tracing::debug;

use crate::diesel_schema::assignments;
use crate::error::PersistenceError;
use crate::timestamps;

const TABLE: &str = "assignments";

/// Diesel Queryable struct for assignment rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = assignments)]
struct AssignmentRow {
    assignment_id: i64,
    brigadista_id: i64,
    kind: String,
    conglomerate_id: Option<i64>,
    subplot_id: Option<i64>,
    zone_id: Option<String>,
    status: String,
    priority: String,
    assigned_at: String,
    started_at: Option<String>,
    completed_at: Option<String>,
    due_at: Option<String>,
    progress: i32,
    brigade_label: String,
    notes: String,
    assigned_by: i64,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = PersistenceError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        let id: i64 = row.assignment_id;
        let corrupt = |e: DomainError| PersistenceError::CorruptRecord {
            table: TABLE,
            reason: format!("row {id}: {e}"),
        };

        let kind: AssignmentKind = AssignmentKind::from_str(&row.kind).map_err(corrupt)?;
        let target: AssignmentTarget =
            AssignmentTarget::from_stored(kind, row.conglomerate_id, row.subplot_id, row.zone_id)
                .map_err(corrupt)?;

        Ok(Self {
            assignment_id: Some(id),
            brigadista_id: row.brigadista_id,
            target,
            status: AssignmentStatus::from_str(&row.status).map_err(corrupt)?,
            priority: Priority::from_str(&row.priority).map_err(corrupt)?,
            assigned_at: timestamps::decode(TABLE, id, &row.assigned_at)?,
            started_at: timestamps::decode_optional(TABLE, id, row.started_at.as_deref())?,
            completed_at: timestamps::decode_optional(TABLE, id, row.completed_at.as_deref())?,
            due_at: timestamps::decode_optional(TABLE, id, row.due_at.as_deref())?,
            progress: Progress::new(i64::from(row.progress)).map_err(corrupt)?,
            brigade_label: row.brigade_label,
            notes: row.notes,
            assigned_by: row.assigned_by,
        })
    }
}

fn rebuild_all(rows: Vec<AssignmentRow>) -> Result<Vec<Assignment>, PersistenceError> {
    rows.into_iter().map(Assignment::try_from).collect()
}

/// Retrieves an assignment by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
/// Returns `Ok(None)` if the assignment is not found.
pub fn get_assignment(
    conn: &mut SqliteConnection,
    assignment_id: i64,
) -> Result<Option<Assignment>, PersistenceError> {
    debug!(assignment_id, "Looking up assignment");

    let row: Option<AssignmentRow> = assignments::table
        .filter(assignments::assignment_id.eq(assignment_id))
        .select(AssignmentRow::as_select())
        .first(conn)
        .optional()?;

    row.map(Assignment::try_from).transpose()
}

/// Lists every assignment, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_assignments(conn: &mut SqliteConnection) -> Result<Vec<Assignment>, PersistenceError> {
    let rows: Vec<AssignmentRow> = assignments::table
        .order((
            assignments::assigned_at.desc(),
            assignments::assignment_id.desc(),
        ))
        .select(AssignmentRow::as_select())
        .load(conn)?;

    rebuild_all(rows)
}

/// Lists the assignments owned by one brigadista, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_assignments_for_brigadista(
    conn: &mut SqliteConnection,
    brigadista_id: i64,
) -> Result<Vec<Assignment>, PersistenceError> {
    let rows: Vec<AssignmentRow> = assignments::table
        .filter(assignments::brigadista_id.eq(brigadista_id))
        .order((
            assignments::assigned_at.desc(),
            assignments::assignment_id.desc(),
        ))
        .select(AssignmentRow::as_select())
        .load(conn)?;

    debug!(brigadista_id, count = rows.len(), "Loaded brigadista assignments");
    rebuild_all(rows)
}

/// Counts all assignments.
///
/// # Errors
///
/// Returns an error if the query fails or the count cannot be converted.
pub fn count_assignments(conn: &mut SqliteConnection) -> Result<usize, PersistenceError> {
    let total: i64 = assignments::table.count().get_result(conn)?;
    total
        .to_usize()
        .ok_or_else(|| PersistenceError::Other(format!("Count conversion failed: {total}")))
}

fn to_usize_counts(rows: Vec<(String, i64)>) -> Result<Vec<(String, usize)>, PersistenceError> {
    let mut result: Vec<(String, usize)> = Vec::with_capacity(rows.len());
    for (value, count_i64) in rows {
        let count_usize: usize = count_i64.to_usize().ok_or_else(|| {
            PersistenceError::Other(format!("Count conversion failed: {count_i64}"))
        })?;
        result.push((value, count_usize));
    }
    Ok(result)
}

/// Counts assignments grouped by stored status.
///
/// Returns `(status, count)` pairs. Statuses with no assignments are absent.
///
/// # Errors
///
/// Returns an error if the query fails or a count cannot be converted.
pub fn count_assignments_by_status(
    conn: &mut SqliteConnection,
) -> Result<Vec<(String, usize)>, PersistenceError> {
    let rows: Vec<(String, i64)> = assignments::table
        .group_by(assignments::status)
        .select((
            assignments::status,
            diesel::dsl::count(assignments::assignment_id),
        ))
        .load(conn)?;
    to_usize_counts(rows)
}

/// Counts assignments grouped by stored kind.
///
/// # Errors
///
/// Returns an error if the query fails or a count cannot be converted.
pub fn count_assignments_by_kind(
    conn: &mut SqliteConnection,
) -> Result<Vec<(String, usize)>, PersistenceError> {
    let rows: Vec<(String, i64)> = assignments::table
        .group_by(assignments::kind)
        .select((
            assignments::kind,
            diesel::dsl::count(assignments::assignment_id),
        ))
        .load(conn)?;
    to_usize_counts(rows)
}

/// Counts assignments grouped by stored priority.
///
/// # Errors
///
/// Returns an error if the query fails or a count cannot be converted.
pub fn count_assignments_by_priority(
    conn: &mut SqliteConnection,
) -> Result<Vec<(String, usize)>, PersistenceError> {
    let rows: Vec<(String, i64)> = assignments::table
        .group_by(assignments::priority)
        .select((
            assignments::priority,
            diesel::dsl::count(assignments::assignment_id),
        ))
        .load(conn)?;
    to_usize_counts(rows)
}
