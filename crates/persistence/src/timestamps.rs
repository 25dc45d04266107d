// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Timestamp column encoding.
//!
//! Timestamps are stored as UTC text with a fixed microsecond width so that
//! lexical order in SQL matches chronological order.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::error::PersistenceError;

/// Encodes a timestamp for storage.
///
/// # Errors
///
/// Returns an error if the UTC instant falls outside years `0..=9999`,
/// which RFC 3339 cannot represent.
pub fn encode(timestamp: OffsetDateTime) -> Result<String, PersistenceError> {
    let utc: OffsetDateTime = timestamp
        .checked_to_offset(UtcOffset::UTC)
        .filter(|utc| (0..=9999).contains(&utc.year()))
        .ok_or_else(|| {
            PersistenceError::Other(format!("Timestamp {timestamp} is outside the storable range"))
        })?;

    utc.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
    ))
    .map_err(|e| PersistenceError::Other(format!("Failed to encode timestamp: {e}")))
}

/// Encodes an optional timestamp for storage.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be encoded.
pub fn encode_optional(
    timestamp: Option<OffsetDateTime>,
) -> Result<Option<String>, PersistenceError> {
    timestamp.map(encode).transpose()
}

/// Decodes a stored timestamp column.
///
/// # Errors
///
/// Returns `PersistenceError::CorruptRecord` if the text is not RFC 3339.
pub fn decode(
    table: &'static str,
    id: i64,
    value: &str,
) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| PersistenceError::CorruptRecord {
        table,
        reason: format!("row {id} has invalid timestamp '{value}': {e}"),
    })
}

/// Decodes an optional stored timestamp column.
///
/// # Errors
///
/// Returns `PersistenceError::CorruptRecord` if the text is not RFC 3339.
pub fn decode_optional(
    table: &'static str,
    id: i64,
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.map(|v| decode(table, id, v)).transpose()
}
