// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conglomerate and subplot queries.
//!
//! Existence checks used before inserts that reference these entities,
//! plus the lookups behind listings and display views.

use diesel::SqliteConnection;
use diesel::dsl::{count, exists};
use diesel::prelude::*;

use crate::data_models::{ConglomerateData, SubplotData};
use crate::diesel_schema::{conglomerates, subplots};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = conglomerates)]
struct ConglomerateRow {
    conglomerate_id: i64,
    code: String,
    department: String,
    municipality: String,
    vereda: String,
    latitude: f64,
    longitude: f64,
}

impl From<ConglomerateRow> for ConglomerateData {
    fn from(row: ConglomerateRow) -> Self {
        Self {
            conglomerate_id: row.conglomerate_id,
            code: row.code,
            department: row.department,
            municipality: row.municipality,
            vereda: row.vereda,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = subplots)]
struct SubplotRow {
    subplot_id: i64,
    conglomerate_code: String,
    number: i32,
    latitude: f64,
    longitude: f64,
}

impl From<SubplotRow> for SubplotData {
    fn from(row: SubplotRow) -> Self {
        Self {
            subplot_id: row.subplot_id,
            conglomerate_code: row.conglomerate_code,
            number: row.number,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

/// Retrieves a conglomerate by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the conglomerate is not found.
pub fn get_conglomerate(
    conn: &mut SqliteConnection,
    conglomerate_id: i64,
) -> Result<Option<ConglomerateData>, PersistenceError> {
    let row: Option<ConglomerateRow> = conglomerates::table
        .filter(conglomerates::conglomerate_id.eq(conglomerate_id))
        .select(ConglomerateRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(ConglomerateData::from))
}

/// Lists conglomerates ordered by code.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_conglomerates(
    conn: &mut SqliteConnection,
) -> Result<Vec<ConglomerateData>, PersistenceError> {
    let rows: Vec<ConglomerateRow> = conglomerates::table
        .order(conglomerates::code.asc())
        .select(ConglomerateRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(ConglomerateData::from).collect())
}

/// Returns true if a conglomerate with this ID exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn conglomerate_exists(
    conn: &mut SqliteConnection,
    conglomerate_id: i64,
) -> Result<bool, PersistenceError> {
    Ok(diesel::select(exists(
        conglomerates::table.filter(conglomerates::conglomerate_id.eq(conglomerate_id)),
    ))
    .get_result(conn)?)
}

/// Returns true if a conglomerate with this code exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn conglomerate_code_exists(
    conn: &mut SqliteConnection,
    code: &str,
) -> Result<bool, PersistenceError> {
    Ok(diesel::select(exists(conglomerates::table.filter(conglomerates::code.eq(code))))
        .get_result(conn)?)
}

/// Retrieves a subplot by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the subplot is not found.
pub fn get_subplot(
    conn: &mut SqliteConnection,
    subplot_id: i64,
) -> Result<Option<SubplotData>, PersistenceError> {
    let row: Option<SubplotRow> = subplots::table
        .filter(subplots::subplot_id.eq(subplot_id))
        .select(SubplotRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(SubplotData::from))
}

/// Lists subplots ordered by conglomerate code, then number.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_subplots(conn: &mut SqliteConnection) -> Result<Vec<SubplotData>, PersistenceError> {
    let rows: Vec<SubplotRow> = subplots::table
        .order((subplots::conglomerate_code.asc(), subplots::number.asc()))
        .select(SubplotRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(SubplotData::from).collect())
}

/// Returns true if a subplot with this ID exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn subplot_exists(conn: &mut SqliteConnection, subplot_id: i64) -> Result<bool, PersistenceError> {
    let matches: i64 = subplots::table
        .filter(subplots::subplot_id.eq(subplot_id))
        .select(count(subplots::subplot_id))
        .first(conn)?;

    Ok(matches > 0)
}

/// Lists the subplots of one conglomerate ordered by number.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_subplots_for_conglomerate(
    conn: &mut SqliteConnection,
    conglomerate_code: &str,
) -> Result<Vec<SubplotData>, PersistenceError> {
    let rows: Vec<SubplotRow> = subplots::table
        .filter(subplots::conglomerate_code.eq(conglomerate_code))
        .order((subplots::number.asc(), subplots::subplot_id.asc()))
        .select(SubplotRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(SubplotData::from).collect())
}
