// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

use crate::error::DomainError;

/// Validates a conglomerate code of the form `CG-` followed by four digits.
///
/// # Errors
///
/// Returns `DomainError::InvalidConglomerateCode` if the code is malformed.
pub fn validate_conglomerate_code(code: &str) -> Result<(), DomainError> {
    if has_code_format(code, "CG-") {
        Ok(())
    } else {
        Err(DomainError::InvalidConglomerateCode(code.to_string()))
    }
}

/// Validates a tree code, `AR-0000`.
///
/// # Errors
///
/// Returns `DomainError::InvalidTreeCode` if the code is malformed.
pub fn validate_tree_code(code: &str) -> Result<(), DomainError> {
    if has_code_format(code, "AR-") {
        Ok(())
    } else {
        Err(DomainError::InvalidTreeCode(code.to_string()))
    }
}

/// Validates a sample code, `MS-0000`.
///
/// # Errors
///
/// Returns `DomainError::InvalidSampleCode` if the code is malformed.
pub fn validate_sample_code(code: &str) -> Result<(), DomainError> {
    if has_code_format(code, "MS-") {
        Ok(())
    } else {
        Err(DomainError::InvalidSampleCode(code.to_string()))
    }
}

fn has_code_format(code: &str, prefix: &str) -> bool {
    code.strip_prefix(prefix)
        .is_some_and(|digits| digits.len() == 4 && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Parses a client-supplied timestamp.
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates, which are read
/// as midnight UTC. The result is normalized with [`normalize_timestamp`].
///
/// # Arguments
///
/// * `field` - The field name, used in the error
/// * `value` - The raw input
///
/// # Errors
///
/// Returns `DomainError::InvalidTimestamp` if neither format matches, or
/// `DomainError::TimestampOutOfRange` if the instant has no four-digit UTC
/// year.
pub fn parse_timestamp(field: &str, value: &str) -> Result<OffsetDateTime, DomainError> {
    let parsed: OffsetDateTime = OffsetDateTime::parse(value, &Rfc3339)
        .or_else(|_| {
            Date::parse(value, format_description!("[year]-[month]-[day]"))
                .map(|date| date.midnight().assume_utc())
        })
        .map_err(|_| DomainError::InvalidTimestamp {
            field: field.to_string(),
            value: value.to_string(),
        })?;

    normalize_timestamp(parsed).ok_or_else(|| DomainError::TimestampOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Converts a timestamp to the form every stored timestamp takes: UTC,
/// microsecond precision, year within `0..=9999`.
///
/// Returns `None` if the UTC instant falls outside that year range.
#[must_use]
pub fn normalize_timestamp(timestamp: OffsetDateTime) -> Option<OffsetDateTime> {
    let utc: OffsetDateTime = timestamp.checked_to_offset(UtcOffset::UTC)?;
    if !(0..=9999).contains(&utc.year()) {
        return None;
    }
    Some(truncate_to_micros(utc))
}

/// Drops sub-microsecond precision.
#[must_use]
pub fn truncate_to_micros(timestamp: OffsetDateTime) -> OffsetDateTime {
    timestamp - Duration::nanoseconds(i64::from(timestamp.nanosecond() % 1_000))
}

/// Formats a timestamp as RFC 3339.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimestamp` if the timestamp cannot be
/// represented (years outside `0..=9999`).
pub fn format_timestamp(field: &str, timestamp: OffsetDateTime) -> Result<String, DomainError> {
    timestamp
        .format(&Rfc3339)
        .map_err(|_| DomainError::InvalidTimestamp {
            field: field.to_string(),
            value: timestamp.to_string(),
        })
}
