// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod assignment;
mod error;
mod field_records;
mod patch;
mod statistics;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use assignment::{Assignment, AssignmentDraft};
pub use error::DomainError;
pub use field_records::{SampleCondition, SampleKind, SampleStatus, TreeCondition};
pub use patch::{AdminFields, AssignmentPatch, OwnerFields};
pub use statistics::AssignmentStatistics;
pub use types::{AssignmentKind, AssignmentStatus, AssignmentTarget, Priority, Progress};
pub use validation::{
    format_timestamp, normalize_timestamp, parse_timestamp, truncate_to_micros,
    validate_conglomerate_code, validate_sample_code, validate_tree_code,
};
