// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A stored user account.
///
/// `role` and `status` are kept as their stored strings; the API layer
/// parses them into typed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub zone: String,
    pub status: String,
    pub created_at: String,
}

impl UserData {
    /// Returns true if the account may sign in.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == "Active"
    }
}

/// Values for a new user account.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub name: &'a str,
    /// Normalized to lowercase before storage.
    pub email: &'a str,
    /// Plain text; hashed before storage.
    pub password: &'a str,
    pub role: &'a str,
    pub zone: &'a str,
}

/// A stored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// A stored conglomerate (sampling site).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConglomerateData {
    pub conglomerate_id: i64,
    pub code: String,
    pub department: String,
    pub municipality: String,
    pub vereda: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Values for a new conglomerate.
#[derive(Debug, Clone, Copy)]
pub struct NewConglomerate<'a> {
    pub code: &'a str,
    pub department: &'a str,
    pub municipality: &'a str,
    pub vereda: &'a str,
    pub latitude: f64,
    pub longitude: f64,
}

/// A stored subplot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubplotData {
    pub subplot_id: i64,
    pub conglomerate_code: String,
    pub number: i32,
    pub latitude: f64,
    pub longitude: f64,
}

/// Values for a new subplot.
#[derive(Debug, Clone, Copy)]
pub struct NewSubplot<'a> {
    pub conglomerate_code: &'a str,
    pub number: i32,
    pub latitude: f64,
    pub longitude: f64,
}

/// Field changes to a user account. `None` leaves a column untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserChanges<'a> {
    pub name: Option<&'a str>,
    /// Normalized to lowercase before storage.
    pub email: Option<&'a str>,
    /// Plain text; hashed before storage.
    pub password: Option<&'a str>,
    pub zone: Option<&'a str>,
    pub status: Option<&'a str>,
}

impl UserChanges<'_> {
    /// Returns true if no column would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.zone.is_none()
            && self.status.is_none()
    }
}

/// Field changes to a conglomerate. The code never changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConglomerateChanges<'a> {
    pub department: Option<&'a str>,
    pub municipality: Option<&'a str>,
    pub vereda: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ConglomerateChanges<'_> {
    /// Returns true if no column would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.department.is_none()
            && self.municipality.is_none()
            && self.vereda.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }
}

/// Field changes to a subplot. The parent conglomerate never changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubplotChanges {
    pub number: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl SubplotChanges {
    /// Returns true if no column would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }
}

/// A stored tree measurement.
///
/// `condition` is kept as its stored string, like user roles.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeData {
    pub tree_id: i64,
    pub code: String,
    pub subplot_id: i64,
    pub individual_number: i32,
    pub species: String,
    pub dbh_cm: f64,
    pub height_m: f64,
    pub commercial_height_m: f64,
    pub condition: String,
    pub sanitary_state: String,
    pub notes: String,
    pub recorded_by: i64,
    pub created_at: OffsetDateTime,
}

/// Values for a new tree.
#[derive(Debug, Clone, Copy)]
pub struct NewTree<'a> {
    pub code: &'a str,
    pub subplot_id: i64,
    pub individual_number: i32,
    pub species: &'a str,
    pub dbh_cm: f64,
    pub height_m: f64,
    pub commercial_height_m: f64,
    pub condition: &'a str,
    pub sanitary_state: &'a str,
    pub notes: &'a str,
    pub recorded_by: i64,
    pub created_at: OffsetDateTime,
}

/// Field changes to a tree. Code, subplot and recorder never change.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeChanges<'a> {
    pub individual_number: Option<i32>,
    pub species: Option<&'a str>,
    pub dbh_cm: Option<f64>,
    pub height_m: Option<f64>,
    pub commercial_height_m: Option<f64>,
    pub condition: Option<&'a str>,
    pub sanitary_state: Option<&'a str>,
    pub notes: Option<&'a str>,
}

impl TreeChanges<'_> {
    /// Returns true if no column would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.individual_number.is_none()
            && self.species.is_none()
            && self.dbh_cm.is_none()
            && self.height_m.is_none()
            && self.commercial_height_m.is_none()
            && self.condition.is_none()
            && self.sanitary_state.is_none()
            && self.notes.is_none()
    }
}

/// A stored botanical sample.
///
/// `tree_id` is set when a tree with `tree_code` existed at collection
/// time, and cleared if that tree is later deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleData {
    pub sample_id: i64,
    pub code: String,
    pub tree_code: String,
    pub tree_id: Option<i64>,
    pub collected_at: OffsetDateTime,
    pub kind: String,
    pub quantity: f64,
    pub condition: String,
    pub image_url: String,
    pub notes: String,
    pub status: String,
    pub recorded_by: i64,
    pub created_at: OffsetDateTime,
}

/// Values for a new sample. Status starts as `Pending`.
#[derive(Debug, Clone, Copy)]
pub struct NewSample<'a> {
    pub code: &'a str,
    pub tree_code: &'a str,
    pub tree_id: Option<i64>,
    pub collected_at: OffsetDateTime,
    pub kind: &'a str,
    pub quantity: f64,
    pub condition: &'a str,
    pub image_url: &'a str,
    pub notes: &'a str,
    pub recorded_by: i64,
    pub created_at: OffsetDateTime,
}

/// Field changes to a sample. Code, tree and recorder never change.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleChanges<'a> {
    pub collected_at: Option<OffsetDateTime>,
    pub kind: Option<&'a str>,
    pub quantity: Option<f64>,
    pub condition: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub status: Option<&'a str>,
}

impl SampleChanges<'_> {
    /// Returns true if no column would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.collected_at.is_none()
            && self.kind.is_none()
            && self.quantity.is_none()
            && self.condition.is_none()
            && self.image_url.is_none()
            && self.notes.is_none()
            && self.status.is_none()
    }
}
