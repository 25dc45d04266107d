// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::AssignmentKind;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The assignment type is not one of the supported kinds.
    InvalidAssignmentType(String),
    /// The assignment status is not recognized.
    InvalidStatus(String),
    /// The assignment priority is not recognized.
    InvalidPriority(String),
    /// Progress is outside the inclusive 0..=100 range.
    InvalidProgress {
        /// The rejected value.
        value: i64,
    },
    /// The reference matching the assignment type was not supplied.
    MissingTargetReference {
        /// The assignment kind whose reference is missing.
        kind: AssignmentKind,
    },
    /// A stored assignment does not carry exactly one reference matching its kind.
    InconsistentTarget {
        /// The stored kind.
        kind: AssignmentKind,
    },
    /// A conglomerate code does not follow the `CG-0000` pattern.
    InvalidConglomerateCode(String),
    /// A tree code does not follow the `AR-0000` pattern.
    InvalidTreeCode(String),
    /// A sample code does not follow the `MS-0000` pattern.
    InvalidSampleCode(String),
    /// The tree condition is not recognized.
    InvalidTreeCondition(String),
    /// The sample kind is not recognized.
    InvalidSampleKind(String),
    /// The sample condition is not recognized.
    InvalidSampleCondition(String),
    /// The sample status is not recognized.
    InvalidSampleStatus(String),
    /// A timestamp could not be parsed.
    InvalidTimestamp {
        /// The field being parsed.
        field: String,
        /// The rejected input.
        value: String,
    },
    /// A timestamp parsed but falls outside the storable year range.
    TimestampOutOfRange {
        /// The field being parsed.
        field: String,
        /// The rejected input.
        value: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAssignmentType(value) => write!(
                f,
                "Invalid assignment type: '{value}'. Must be one of conglomerate, subplot, zone"
            ),
            Self::InvalidStatus(value) => write!(
                f,
                "Invalid status: '{value}'. Must be one of Pending, InProgress, Completed, Paused"
            ),
            Self::InvalidPriority(value) => write!(
                f,
                "Invalid priority: '{value}'. Must be one of High, Medium, Low"
            ),
            Self::InvalidProgress { value } => {
                write!(f, "Invalid progress: {value}. Must be between 0 and 100")
            }
            Self::MissingTargetReference { kind } => {
                write!(f, "A {kind} reference is required for a {kind} assignment")
            }
            Self::InconsistentTarget { kind } => write!(
                f,
                "Stored {kind} assignment does not reference exactly one {kind}"
            ),
            Self::InvalidConglomerateCode(code) => write!(
                f,
                "Invalid conglomerate code: '{code}'. Expected format CG-0000"
            ),
            Self::InvalidTreeCode(code) => {
                write!(f, "Invalid tree code: '{code}'. Expected format AR-0000")
            }
            Self::InvalidSampleCode(code) => {
                write!(f, "Invalid sample code: '{code}'. Expected format MS-0000")
            }
            Self::InvalidTreeCondition(value) => write!(
                f,
                "Invalid tree condition: '{value}'. Must be one of Alive, StandingDead, Fallen, Stump"
            ),
            Self::InvalidSampleKind(value) => write!(
                f,
                "Invalid sample type: '{value}'. Must be one of Leaf, Bark, Soil, Seed, Fruit"
            ),
            Self::InvalidSampleCondition(value) => write!(
                f,
                "Invalid sample condition: '{value}'. Must be one of Fresh, Dry, Preserved"
            ),
            Self::InvalidSampleStatus(value) => write!(
                f,
                "Invalid sample status: '{value}'. Must be one of Pending, Processed, Rejected"
            ),
            Self::InvalidTimestamp { field, value } => {
                write!(f, "Invalid timestamp for '{field}': '{value}'")
            }
            Self::TimestampOutOfRange { field, value } => write!(
                f,
                "Timestamp for '{field}' is out of range: '{value}'. Year must be between 0000 and 9999 in UTC"
            ),
        }
    }
}

impl std::error::Error for DomainError {}
