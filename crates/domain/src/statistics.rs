// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Aggregate assignment counts.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::DomainError;
use crate::types::{AssignmentKind, AssignmentStatus, Priority};

/// Assignment counts grouped by status, kind and priority.
///
/// Categories without any assignment are absent from the maps rather than
/// present with a zero count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssignmentStatistics {
    pub total: usize,
    pub by_status: BTreeMap<AssignmentStatus, usize>,
    pub by_kind: BTreeMap<AssignmentKind, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
}

impl AssignmentStatistics {
    /// Builds statistics from grouped `(value, count)` rows.
    ///
    /// # Arguments
    ///
    /// * `total` - Total number of assignments
    /// * `by_status` - Rows grouped by stored status
    /// * `by_kind` - Rows grouped by stored kind
    /// * `by_priority` - Rows grouped by stored priority
    ///
    /// # Errors
    ///
    /// Returns an error if a grouped value is not a recognized category.
    pub fn from_grouped(
        total: usize,
        by_status: &[(String, usize)],
        by_kind: &[(String, usize)],
        by_priority: &[(String, usize)],
    ) -> Result<Self, DomainError> {
        Ok(Self {
            total,
            by_status: collect_nonzero(by_status)?,
            by_kind: collect_nonzero(by_kind)?,
            by_priority: collect_nonzero(by_priority)?,
        })
    }
}

fn collect_nonzero<K>(rows: &[(String, usize)]) -> Result<BTreeMap<K, usize>, DomainError>
where
    K: FromStr<Err = DomainError> + Ord,
{
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for (value, count) in rows {
        if *count == 0 {
            continue;
        }
        *counts.entry(K::from_str(value)?).or_insert(0) += count;
    }
    Ok(counts)
}
