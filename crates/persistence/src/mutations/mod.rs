// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `users` — user accounts and sessions
//! - `reference` — conglomerates and subplots
//! - `assignments` — assignment insert, update and delete
//! - `field_records` — tree and sample insert, update and delete

pub mod assignments;
pub mod field_records;
pub mod reference;
pub mod users;
