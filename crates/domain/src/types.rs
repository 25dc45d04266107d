// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of field work an assignment targets.
///
/// Determines which reference an assignment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentKind {
    /// A sampling site stored locally.
    Conglomerate,
    /// A subdivision of a conglomerate stored locally.
    Subplot,
    /// A geographic zone owned by the external zone service.
    Zone,
}

impl AssignmentKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 3] = [Self::Conglomerate, Self::Subplot, Self::Zone];

    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Conglomerate => "conglomerate",
            Self::Subplot => "subplot",
            Self::Zone => "zone",
        }
    }
}

impl FromStr for AssignmentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conglomerate" => Ok(Self::Conglomerate),
            "subplot" => Ok(Self::Subplot),
            "zone" => Ok(Self::Zone),
            _ => Err(DomainError::InvalidAssignmentType(s.to_string())),
        }
    }
}

impl std::fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress state of an assignment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum AssignmentStatus {
    /// Created, work not started.
    #[default]
    Pending,
    /// Work under way.
    InProgress,
    /// Work finished. Progress is always 100.
    Completed,
    /// Work suspended.
    Paused,
}

impl AssignmentStatus {
    /// All statuses, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Paused,
    ];

    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Paused => "Paused",
        }
    }
}

impl FromStr for AssignmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "InProgress" => Ok(Self::InProgress),
            "Completed" => Ok(Self::Completed),
            "Paused" => Ok(Self::Paused),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scheduling priority of an assignment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// All priorities, in declaration order.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Self::High),
            "Medium" => Ok(Self::Medium),
            "Low" => Ok(Self::Low),
            _ => Err(DomainError::InvalidPriority(s.to_string())),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Completion percentage of an assignment, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Progress(u8);

impl Progress {
    /// No work done.
    pub const NONE: Self = Self(0);
    /// Work finished.
    pub const COMPLETE: Self = Self(100);

    /// Creates a progress value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidProgress` if `value` is outside `0..=100`.
    pub fn new(value: i64) -> Result<Self, DomainError> {
        match u8::try_from(value) {
            Ok(percent) if percent <= 100 => Ok(Self(percent)),
            _ => Err(DomainError::InvalidProgress { value }),
        }
    }

    /// Returns the percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

/// The single piece of work an assignment is bound to.
///
/// An assignment references exactly one target and the variant always
/// matches the assignment kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssignmentTarget {
    /// Local conglomerate id.
    Conglomerate(i64),
    /// Local subplot id.
    Subplot(i64),
    /// Identifier in the external zone service.
    Zone(String),
}

impl AssignmentTarget {
    /// Selects the reference matching `kind` from the supplied candidates.
    ///
    /// References that do not match `kind` are discarded.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingTargetReference` if the matching
    /// reference is absent or blank.
    pub fn select(
        kind: AssignmentKind,
        conglomerate_id: Option<i64>,
        subplot_id: Option<i64>,
        zone_id: Option<&str>,
    ) -> Result<Self, DomainError> {
        let target: Option<Self> = match kind {
            AssignmentKind::Conglomerate => conglomerate_id.map(Self::Conglomerate),
            AssignmentKind::Subplot => subplot_id.map(Self::Subplot),
            AssignmentKind::Zone => zone_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| Self::Zone(id.to_string())),
        };
        target.ok_or(DomainError::MissingTargetReference { kind })
    }

    /// Rebuilds a target from stored columns.
    ///
    /// Unlike [`AssignmentTarget::select`], every column that does not
    /// match `kind` must be empty.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InconsistentTarget` if the columns do not
    /// carry exactly one reference matching `kind`.
    pub fn from_stored(
        kind: AssignmentKind,
        conglomerate_id: Option<i64>,
        subplot_id: Option<i64>,
        zone_id: Option<String>,
    ) -> Result<Self, DomainError> {
        match (kind, conglomerate_id, subplot_id, zone_id) {
            (AssignmentKind::Conglomerate, Some(id), None, None) => Ok(Self::Conglomerate(id)),
            (AssignmentKind::Subplot, None, Some(id), None) => Ok(Self::Subplot(id)),
            (AssignmentKind::Zone, None, None, Some(id)) if !id.is_empty() => Ok(Self::Zone(id)),
            _ => Err(DomainError::InconsistentTarget { kind }),
        }
    }

    /// Returns the kind matching this target.
    #[must_use]
    pub const fn kind(&self) -> AssignmentKind {
        match self {
            Self::Conglomerate(_) => AssignmentKind::Conglomerate,
            Self::Subplot(_) => AssignmentKind::Subplot,
            Self::Zone(_) => AssignmentKind::Zone,
        }
    }

    #[must_use]
    pub const fn conglomerate_id(&self) -> Option<i64> {
        match self {
            Self::Conglomerate(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn subplot_id(&self) -> Option<i64> {
        match self {
            Self::Subplot(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn zone_id(&self) -> Option<&str> {
        match self {
            Self::Zone(id) => Some(id.as_str()),
            _ => None,
        }
    }
}
