// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tree and sample mutations.
//!
//! Codes, measurements and vocabulary values are validated by the caller;
//! CHECK constraints in the schema back them up.

use diesel::SqliteConnection;
use diesel::dsl::exists;
use diesel::prelude::*;
use tracing::info;

use crate::backend::sqlite::{get_last_insert_rowid, is_foreign_key_violation, is_unique_violation};
use crate::data_models::{NewSample, NewTree, SampleChanges, TreeChanges};
use crate::diesel_schema::{samples, trees};
use crate::error::PersistenceError;
use crate::timestamps;

#[derive(AsChangeset)]
#[diesel(table_name = trees)]
struct TreeChangeset<'a> {
    individual_number: Option<i32>,
    species: Option<&'a str>,
    dbh_cm: Option<f64>,
    height_m: Option<f64>,
    commercial_height_m: Option<f64>,
    condition: Option<&'a str>,
    sanitary_state: Option<&'a str>,
    notes: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = samples)]
struct SampleChangeset<'a> {
    collected_at: Option<String>,
    kind: Option<&'a str>,
    quantity: Option<f64>,
    condition: Option<&'a str>,
    image_url: Option<&'a str>,
    notes: Option<&'a str>,
    status: Option<&'a str>,
}

/// Inserts a tree and returns its ID.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateCode` if the code is taken,
/// `PersistenceError::NotFound` if the subplot does not exist, or another
/// error if the insert fails.
pub fn insert_tree(conn: &mut SqliteConnection, tree: NewTree<'_>) -> Result<i64, PersistenceError> {
    diesel::insert_into(trees::table)
        .values((
            trees::code.eq(tree.code),
            trees::subplot_id.eq(tree.subplot_id),
            trees::individual_number.eq(tree.individual_number),
            trees::species.eq(tree.species.trim()),
            trees::dbh_cm.eq(tree.dbh_cm),
            trees::height_m.eq(tree.height_m),
            trees::commercial_height_m.eq(tree.commercial_height_m),
            trees::condition.eq(tree.condition),
            trees::sanitary_state.eq(tree.sanitary_state),
            trees::notes.eq(tree.notes),
            trees::recorded_by.eq(tree.recorded_by),
            trees::created_at.eq(timestamps::encode(tree.created_at)?),
        ))
        .execute(conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                PersistenceError::DuplicateCode {
                    entity: "tree",
                    code: tree.code.to_string(),
                }
            } else if is_foreign_key_violation(&e) {
                PersistenceError::NotFound(format!("Subplot with ID {} not found", tree.subplot_id))
            } else {
                PersistenceError::from(e)
            }
        })?;

    let tree_id: i64 = get_last_insert_rowid(conn)?;

    info!(
        tree_id,
        code = tree.code,
        subplot_id = tree.subplot_id,
        recorded_by = tree.recorded_by,
        "Tree recorded"
    );
    Ok(tree_id)
}

/// Applies field changes to a tree.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the tree does not exist.
pub fn update_tree(
    conn: &mut SqliteConnection,
    tree_id: i64,
    changes: TreeChanges<'_>,
) -> Result<(), PersistenceError> {
    let target = trees::table.filter(trees::tree_id.eq(tree_id));

    let rows_affected: usize = if changes.is_empty() {
        usize::from(diesel::select(exists(target)).get_result::<bool>(conn)?)
    } else {
        diesel::update(target)
            .set(&TreeChangeset {
                individual_number: changes.individual_number,
                species: changes.species.map(str::trim),
                dbh_cm: changes.dbh_cm,
                height_m: changes.height_m,
                commercial_height_m: changes.commercial_height_m,
                condition: changes.condition,
                sanitary_state: changes.sanitary_state,
                notes: changes.notes,
            })
            .execute(conn)?
    };

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!("Tree with ID {tree_id} not found")));
    }

    info!(tree_id, "Tree updated");
    Ok(())
}

/// Deletes a tree. Samples taken from it keep their tree code but lose the
/// link.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the tree does not exist.
pub fn delete_tree(conn: &mut SqliteConnection, tree_id: i64) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(trees::table)
        .filter(trees::tree_id.eq(tree_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!("Tree with ID {tree_id} not found")));
    }

    info!(tree_id, "Tree deleted");
    Ok(())
}

/// Inserts a sample and returns its ID. The status starts as `Pending`.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateCode` if the code is taken, or
/// another error if a timestamp cannot be encoded or the insert fails.
pub fn insert_sample(
    conn: &mut SqliteConnection,
    sample: NewSample<'_>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(samples::table)
        .values((
            samples::code.eq(sample.code),
            samples::tree_code.eq(sample.tree_code),
            samples::tree_id.eq(sample.tree_id),
            samples::collected_at.eq(timestamps::encode(sample.collected_at)?),
            samples::kind.eq(sample.kind),
            samples::quantity.eq(sample.quantity),
            samples::condition.eq(sample.condition),
            samples::image_url.eq(sample.image_url),
            samples::notes.eq(sample.notes),
            samples::recorded_by.eq(sample.recorded_by),
            samples::created_at.eq(timestamps::encode(sample.created_at)?),
        ))
        .execute(conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                PersistenceError::DuplicateCode {
                    entity: "sample",
                    code: sample.code.to_string(),
                }
            } else {
                PersistenceError::from(e)
            }
        })?;

    let sample_id: i64 = get_last_insert_rowid(conn)?;

    info!(
        sample_id,
        code = sample.code,
        tree_code = sample.tree_code,
        linked = sample.tree_id.is_some(),
        "Sample recorded"
    );
    Ok(sample_id)
}

/// Applies field changes to a sample.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the sample does not exist, or
/// another error if a timestamp cannot be encoded.
pub fn update_sample(
    conn: &mut SqliteConnection,
    sample_id: i64,
    changes: SampleChanges<'_>,
) -> Result<(), PersistenceError> {
    let target = samples::table.filter(samples::sample_id.eq(sample_id));

    let rows_affected: usize = if changes.is_empty() {
        usize::from(diesel::select(exists(target)).get_result::<bool>(conn)?)
    } else {
        diesel::update(target)
            .set(&SampleChangeset {
                collected_at: timestamps::encode_optional(changes.collected_at)?,
                kind: changes.kind,
                quantity: changes.quantity,
                condition: changes.condition,
                image_url: changes.image_url,
                notes: changes.notes,
                status: changes.status,
            })
            .execute(conn)?
    };

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!("Sample with ID {sample_id} not found")));
    }

    info!(sample_id, status = changes.status, "Sample updated");
    Ok(())
}

/// Deletes a sample.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the sample does not exist.
pub fn delete_sample(conn: &mut SqliteConnection, sample_id: i64) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(samples::table)
        .filter(samples::sample_id.eq(sample_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!("Sample with ID {sample_id} not found")));
    }

    info!(sample_id, "Sample deleted");
    Ok(())
}
