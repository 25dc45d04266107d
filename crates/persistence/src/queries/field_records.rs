// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tree and sample queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{SampleData, TreeData};
use crate::diesel_schema::{samples, trees};
use crate::error::PersistenceError;
use crate::timestamps;

#[derive(Queryable, Selectable)]
#[diesel(table_name = trees)]
struct TreeRow {
    tree_id: i64,
    code: String,
    subplot_id: i64,
    individual_number: i32,
    species: String,
    dbh_cm: f64,
    height_m: f64,
    commercial_height_m: f64,
    condition: String,
    sanitary_state: String,
    notes: String,
    recorded_by: i64,
    created_at: String,
}

impl TryFrom<TreeRow> for TreeData {
    type Error = PersistenceError;

    fn try_from(row: TreeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            created_at: timestamps::decode("trees", row.tree_id, &row.created_at)?,
            tree_id: row.tree_id,
            code: row.code,
            subplot_id: row.subplot_id,
            individual_number: row.individual_number,
            species: row.species,
            dbh_cm: row.dbh_cm,
            height_m: row.height_m,
            commercial_height_m: row.commercial_height_m,
            condition: row.condition,
            sanitary_state: row.sanitary_state,
            notes: row.notes,
            recorded_by: row.recorded_by,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = samples)]
struct SampleRow {
    sample_id: i64,
    code: String,
    tree_code: String,
    tree_id: Option<i64>,
    collected_at: String,
    kind: String,
    quantity: f64,
    condition: String,
    image_url: String,
    notes: String,
    status: String,
    recorded_by: i64,
    created_at: String,
}

impl TryFrom<SampleRow> for SampleData {
    type Error = PersistenceError;

    fn try_from(row: SampleRow) -> Result<Self, Self::Error> {
        let id: i64 = row.sample_id;
        Ok(Self {
            collected_at: timestamps::decode("samples", id, &row.collected_at)?,
            created_at: timestamps::decode("samples", id, &row.created_at)?,
            sample_id: id,
            code: row.code,
            tree_code: row.tree_code,
            tree_id: row.tree_id,
            kind: row.kind,
            quantity: row.quantity,
            condition: row.condition,
            image_url: row.image_url,
            notes: row.notes,
            status: row.status,
            recorded_by: row.recorded_by,
        })
    }
}

fn rebuild_trees(rows: Vec<TreeRow>) -> Result<Vec<TreeData>, PersistenceError> {
    rows.into_iter().map(TreeData::try_from).collect()
}

fn rebuild_samples(rows: Vec<SampleRow>) -> Result<Vec<SampleData>, PersistenceError> {
    rows.into_iter().map(SampleData::try_from).collect()
}

/// Retrieves a tree by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
/// Returns `Ok(None)` if the tree is not found.
pub fn get_tree(
    conn: &mut SqliteConnection,
    tree_id: i64,
) -> Result<Option<TreeData>, PersistenceError> {
    let row: Option<TreeRow> = trees::table
        .filter(trees::tree_id.eq(tree_id))
        .select(TreeRow::as_select())
        .first(conn)
        .optional()?;

    row.map(TreeData::try_from).transpose()
}

/// Returns the ID of the tree with this code, if any.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_tree_id_by_code(
    conn: &mut SqliteConnection,
    code: &str,
) -> Result<Option<i64>, PersistenceError> {
    Ok(trees::table
        .filter(trees::code.eq(code))
        .select(trees::tree_id)
        .first(conn)
        .optional()?)
}

/// Lists every tree, most recently recorded first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_trees(conn: &mut SqliteConnection) -> Result<Vec<TreeData>, PersistenceError> {
    let rows: Vec<TreeRow> = trees::table
        .order((trees::created_at.desc(), trees::tree_id.desc()))
        .select(TreeRow::as_select())
        .load(conn)?;

    rebuild_trees(rows)
}

/// Lists the trees of one subplot ordered by individual number.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_trees_for_subplot(
    conn: &mut SqliteConnection,
    subplot_id: i64,
) -> Result<Vec<TreeData>, PersistenceError> {
    let rows: Vec<TreeRow> = trees::table
        .filter(trees::subplot_id.eq(subplot_id))
        .order((trees::individual_number.asc(), trees::tree_id.asc()))
        .select(TreeRow::as_select())
        .load(conn)?;

    debug!(subplot_id, count = rows.len(), "Loaded subplot trees");
    rebuild_trees(rows)
}

/// Retrieves a sample by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
/// Returns `Ok(None)` if the sample is not found.
pub fn get_sample(
    conn: &mut SqliteConnection,
    sample_id: i64,
) -> Result<Option<SampleData>, PersistenceError> {
    let row: Option<SampleRow> = samples::table
        .filter(samples::sample_id.eq(sample_id))
        .select(SampleRow::as_select())
        .first(conn)
        .optional()?;

    row.map(SampleData::try_from).transpose()
}

/// Lists every sample, most recently recorded first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_samples(conn: &mut SqliteConnection) -> Result<Vec<SampleData>, PersistenceError> {
    let rows: Vec<SampleRow> = samples::table
        .order((samples::created_at.desc(), samples::sample_id.desc()))
        .select(SampleRow::as_select())
        .load(conn)?;

    rebuild_samples(rows)
}

/// Lists the samples taken from one tree code, most recently collected
/// first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_samples_for_tree_code(
    conn: &mut SqliteConnection,
    tree_code: &str,
) -> Result<Vec<SampleData>, PersistenceError> {
    let rows: Vec<SampleRow> = samples::table
        .filter(samples::tree_code.eq(tree_code))
        .order((samples::collected_at.desc(), samples::sample_id.desc()))
        .select(SampleRow::as_select())
        .load(conn)?;

    rebuild_samples(rows)
}

/// Lists the samples one user recorded, most recently recorded first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_samples_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<SampleData>, PersistenceError> {
    let rows: Vec<SampleRow> = samples::table
        .filter(samples::recorded_by.eq(user_id))
        .order((samples::created_at.desc(), samples::sample_id.desc()))
        .select(SampleRow::as_select())
        .load(conn)?;

    debug!(user_id, count = rows.len(), "Loaded user samples");
    rebuild_samples(rows)
}
