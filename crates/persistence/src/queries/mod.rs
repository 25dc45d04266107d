// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `users` — user accounts, sessions and password verification
//! - `reference` — conglomerates and subplots
//! - `assignments` — assignment lookups, listings and grouped counts
//! - `field_records` — trees and botanical samples

pub mod assignments;
pub mod field_records;
pub mod reference;
pub mod users;
