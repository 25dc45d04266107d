// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for IFN field assignments and field records.
//!
//! Handlers take an explicit [`AuthenticatedActor`] and a persistence
//! handle, enforce authorization before touching storage, and return DTOs
//! from [`request_response`]. Errors are translated into [`ApiError`] at
//! this boundary so lower-layer errors never leak to callers.

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
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod field_records;
mod handlers;
mod request_response;
mod views;
mod zone;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
pub use error::{ApiError, AuthError, translate_domain_error, translate_persistence_error};
pub use field_records::{
    create_sample, create_tree, delete_sample, delete_tree, get_sample, get_tree, list_samples,
    list_samples_for_tree, list_samples_for_user, list_trees, list_trees_for_subplot,
    update_sample, update_tree,
};
pub use handlers::{
    assignment_statistics, create_assignment, create_conglomerate, create_subplot, create_user,
    current_user, delete_assignment, delete_conglomerate, delete_subplot, delete_user,
    get_conglomerate, get_subplot, get_user, list_all_assignments,
    list_assignments_for_brigadista, list_brigadistas, list_conglomerates, list_my_assignments,
    list_subplots, list_subplots_for_conglomerate, list_users, login, logout, update_assignment,
    update_conglomerate, update_subplot, update_user,
};
pub use request_response::{
    AssignedBySummary, AssignmentResponse, BrigadistaSummary, ConglomerateInfo,
    ConglomerateSummary, CreateAssignmentRequest, CreateConglomerateRequest,
    CreateSampleRequest, CreateSubplotRequest, CreateTreeRequest, CreateUserRequest,
    LoginRequest, LoginResponse, MessageResponse, RecordedBySummary, SampleInfo,
    StatisticsResponse, SubplotInfo, SubplotSummary, TreeInfo, UpdateAssignmentRequest,
    UpdateConglomerateRequest, UpdateSampleRequest, UpdateSubplotRequest, UpdateTreeRequest,
    UpdateUserRequest, UserInfo,
};
pub use zone::{
    HttpZoneDirectory, ZoneClientConfigError, ZoneDirectory, ZoneRecord, ZoneServiceError,
    enrich_with_zones,
};
