// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conglomerate and subplot mutations.

use diesel::SqliteConnection;
use diesel::dsl::exists;
use diesel::prelude::*;
use tracing::info;

use crate::backend::sqlite::{get_last_insert_rowid, is_foreign_key_violation, is_unique_violation};
use crate::data_models::{ConglomerateChanges, NewConglomerate, NewSubplot, SubplotChanges};
use crate::diesel_schema::{conglomerates, subplots};
use crate::error::PersistenceError;

/// Inserts a conglomerate.
///
/// The code must already be validated by the caller.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateCode` if the code is taken.
pub fn create_conglomerate(
    conn: &mut SqliteConnection,
    conglomerate: NewConglomerate<'_>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(conglomerates::table)
        .values((
            conglomerates::code.eq(conglomerate.code),
            conglomerates::department.eq(conglomerate.department),
            conglomerates::municipality.eq(conglomerate.municipality),
            conglomerates::vereda.eq(conglomerate.vereda),
            conglomerates::latitude.eq(conglomerate.latitude),
            conglomerates::longitude.eq(conglomerate.longitude),
        ))
        .execute(conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                PersistenceError::DuplicateCode {
                    entity: "conglomerate",
                    code: conglomerate.code.to_string(),
                }
            } else {
                PersistenceError::from(e)
            }
        })?;

    let conglomerate_id: i64 = get_last_insert_rowid(conn)?;

    info!(conglomerate_id, code = conglomerate.code, "Conglomerate created");
    Ok(conglomerate_id)
}

/// Inserts a subplot.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if no conglomerate has the parent
/// code, or another error if the insert fails.
pub fn create_subplot(
    conn: &mut SqliteConnection,
    subplot: NewSubplot<'_>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(subplots::table)
        .values((
            subplots::conglomerate_code.eq(subplot.conglomerate_code),
            subplots::number.eq(subplot.number),
            subplots::latitude.eq(subplot.latitude),
            subplots::longitude.eq(subplot.longitude),
        ))
        .execute(conn)
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                PersistenceError::NotFound(format!(
                    "No conglomerate with code {}",
                    subplot.conglomerate_code
                ))
            } else {
                PersistenceError::from(e)
            }
        })?;

    let subplot_id: i64 = get_last_insert_rowid(conn)?;

    info!(
        subplot_id,
        conglomerate_code = subplot.conglomerate_code,
        number = subplot.number,
        "Subplot created"
    );
    Ok(subplot_id)
}

#[derive(AsChangeset)]
#[diesel(table_name = conglomerates)]
struct ConglomerateChangeset<'a> {
    department: Option<&'a str>,
    municipality: Option<&'a str>,
    vereda: Option<&'a str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(AsChangeset)]
#[diesel(table_name = subplots)]
struct SubplotChangeset {
    number: Option<i32>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Applies field changes to a conglomerate.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the conglomerate does not exist.
pub fn update_conglomerate(
    conn: &mut SqliteConnection,
    conglomerate_id: i64,
    changes: ConglomerateChanges<'_>,
) -> Result<(), PersistenceError> {
    let target = conglomerates::table.filter(conglomerates::conglomerate_id.eq(conglomerate_id));

    let rows_affected: usize = if changes.is_empty() {
        usize::from(diesel::select(exists(target)).get_result::<bool>(conn)?)
    } else {
        diesel::update(target)
            .set(&ConglomerateChangeset {
                department: changes.department,
                municipality: changes.municipality,
                vereda: changes.vereda,
                latitude: changes.latitude,
                longitude: changes.longitude,
            })
            .execute(conn)?
    };

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Conglomerate with ID {conglomerate_id} not found"
        )));
    }

    info!(conglomerate_id, "Conglomerate updated");
    Ok(())
}

/// Deletes a conglomerate.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the conglomerate does not exist,
/// or `PersistenceError::InUse` if subplots or assignments still reference it.
pub fn delete_conglomerate(
    conn: &mut SqliteConnection,
    conglomerate_id: i64,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(conglomerates::table)
        .filter(conglomerates::conglomerate_id.eq(conglomerate_id))
        .execute(conn)
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                PersistenceError::InUse(format!(
                    "Conglomerate {conglomerate_id} still has subplots or assignments"
                ))
            } else {
                PersistenceError::from(e)
            }
        })?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Conglomerate with ID {conglomerate_id} not found"
        )));
    }

    info!(conglomerate_id, "Conglomerate deleted");
    Ok(())
}

/// Applies field changes to a subplot.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the subplot does not exist.
pub fn update_subplot(
    conn: &mut SqliteConnection,
    subplot_id: i64,
    changes: SubplotChanges,
) -> Result<(), PersistenceError> {
    let target = subplots::table.filter(subplots::subplot_id.eq(subplot_id));

    let rows_affected: usize = if changes.is_empty() {
        usize::from(diesel::select(exists(target)).get_result::<bool>(conn)?)
    } else {
        diesel::update(target)
            .set(&SubplotChangeset {
                number: changes.number,
                latitude: changes.latitude,
                longitude: changes.longitude,
            })
            .execute(conn)?
    };

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Subplot with ID {subplot_id} not found"
        )));
    }

    info!(subplot_id, "Subplot updated");
    Ok(())
}

/// Deletes a subplot.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the subplot does not exist, or
/// `PersistenceError::InUse` if trees or assignments still reference it.
pub fn delete_subplot(conn: &mut SqliteConnection, subplot_id: i64) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(subplots::table)
        .filter(subplots::subplot_id.eq(subplot_id))
        .execute(conn)
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                PersistenceError::InUse(format!(
                    "Subplot {subplot_id} still has trees or assignments"
                ))
            } else {
                PersistenceError::from(e)
            }
        })?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Subplot with ID {subplot_id} not found"
        )));
    }

    info!(subplot_id, "Subplot deleted");
    Ok(())
}
