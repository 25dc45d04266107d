// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vocabularies for the trees and botanical samples brigadistas record in
//! the field.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Physical condition of a measured tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeCondition {
    Alive,
    StandingDead,
    Fallen,
    Stump,
}

impl TreeCondition {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Alive => "Alive",
            Self::StandingDead => "StandingDead",
            Self::Fallen => "Fallen",
            Self::Stump => "Stump",
        }
    }
}

impl FromStr for TreeCondition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Alive" => Ok(Self::Alive),
            "StandingDead" => Ok(Self::StandingDead),
            "Fallen" => Ok(Self::Fallen),
            "Stump" => Ok(Self::Stump),
            _ => Err(DomainError::InvalidTreeCondition(s.to_string())),
        }
    }
}

impl std::fmt::Display for TreeCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a botanical sample consists of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleKind {
    Leaf,
    Bark,
    Soil,
    Seed,
    Fruit,
}

impl SampleKind {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Leaf => "Leaf",
            Self::Bark => "Bark",
            Self::Soil => "Soil",
            Self::Seed => "Seed",
            Self::Fruit => "Fruit",
        }
    }
}

impl FromStr for SampleKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Leaf" => Ok(Self::Leaf),
            "Bark" => Ok(Self::Bark),
            "Soil" => Ok(Self::Soil),
            "Seed" => Ok(Self::Seed),
            "Fruit" => Ok(Self::Fruit),
            _ => Err(DomainError::InvalidSampleKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for SampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a sample was preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleCondition {
    Fresh,
    Dry,
    Preserved,
}

impl SampleCondition {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fresh => "Fresh",
            Self::Dry => "Dry",
            Self::Preserved => "Preserved",
        }
    }
}

impl FromStr for SampleCondition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fresh" => Ok(Self::Fresh),
            "Dry" => Ok(Self::Dry),
            "Preserved" => Ok(Self::Preserved),
            _ => Err(DomainError::InvalidSampleCondition(s.to_string())),
        }
    }
}

impl std::fmt::Display for SampleCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Laboratory processing state of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SampleStatus {
    #[default]
    Pending,
    Processed,
    Rejected,
}

impl SampleStatus {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processed => "Processed",
            Self::Rejected => "Rejected",
        }
    }
}

impl FromStr for SampleStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processed" => Ok(Self::Processed),
            "Rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidSampleStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for SampleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
