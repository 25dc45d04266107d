// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! All JSON field names are camelCase. Timestamps are RFC 3339 strings.

use std::collections::BTreeMap;

use crate::zone::ZoneRecord;

// ============================================================================
// Authentication & users
// ============================================================================

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    /// The account email.
    pub email: String,
    /// The account password.
    pub password: String,
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// The bearer token (opaque).
    pub token: String,
    /// Session expiration timestamp.
    pub expires_at: String,
    /// The authenticated user.
    pub user: UserInfo,
}

/// A user account as shown to clients. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub zone: String,
    pub status: String,
}

/// API request to create a user.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// `admin` or `brigadista`; defaults to `brigadista`.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
}

/// API request to update a user. Absent fields are left untouched.
///
/// `status` is only honored for administrators.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    /// `Active` or `Inactive`.
    #[serde(default)]
    pub status: Option<String>,
}

// ============================================================================
// Reference entities
// ============================================================================

/// A conglomerate with its full location.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConglomerateInfo {
    pub id: i64,
    pub code: String,
    pub department: String,
    pub municipality: String,
    pub vereda: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// API request to create a conglomerate.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConglomerateRequest {
    /// Code of the form `CG-0000`.
    pub code: String,
    pub department: String,
    pub municipality: String,
    #[serde(default)]
    pub vereda: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// API request to update a conglomerate. The code cannot change.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConglomerateRequest {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub vereda: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// A subplot with its full location.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubplotInfo {
    pub id: i64,
    pub conglomerate_code: String,
    pub number: i32,
    pub latitude: f64,
    pub longitude: f64,
}

/// API request to create a subplot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubplotRequest {
    /// Code of the parent conglomerate, `CG-0000`.
    pub conglomerate_code: String,
    pub number: i32,
    pub latitude: f64,
    pub longitude: f64,
}

/// API request to update a subplot. The parent conglomerate cannot change.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubplotRequest {
    #[serde(default)]
    pub number: Option<i32>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

// ============================================================================
// Field records
// ============================================================================

/// The user who recorded a tree or sample.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecordedBySummary {
    pub id: i64,
    pub name: String,
}

/// A measured tree.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeInfo {
    pub id: i64,
    /// Code of the form `AR-0000`.
    pub code: String,
    pub subplot: SubplotSummary,
    pub individual_number: i32,
    pub species: String,
    /// Diameter at breast height, in centimeters.
    pub dbh_cm: f64,
    pub height_m: f64,
    pub commercial_height_m: f64,
    pub condition: String,
    pub sanitary_state: String,
    pub notes: String,
    pub recorded_by: RecordedBySummary,
    pub created_at: String,
}

/// API request to record a tree.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreeRequest {
    pub code: String,
    pub subplot: i64,
    pub individual_number: i32,
    pub species: String,
    pub dbh_cm: f64,
    pub height_m: f64,
    #[serde(default)]
    pub commercial_height_m: Option<f64>,
    /// Defaults to `Alive`.
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub sanitary_state: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// API request to update a tree. Code and subplot cannot change.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTreeRequest {
    #[serde(default)]
    pub individual_number: Option<i32>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub dbh_cm: Option<f64>,
    #[serde(default)]
    pub height_m: Option<f64>,
    #[serde(default)]
    pub commercial_height_m: Option<f64>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub sanitary_state: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A botanical sample.
///
/// `tree` is the ID of the tree with `tree_code` when one was on record at
/// collection time.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleInfo {
    pub id: i64,
    /// Code of the form `MS-0000`.
    pub code: String,
    pub tree_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<i64>,
    pub collected_at: String,
    #[serde(rename = "type")]
    pub sample_type: String,
    pub quantity: f64,
    pub condition: String,
    pub image_url: String,
    pub notes: String,
    pub status: String,
    pub recorded_by: RecordedBySummary,
    pub created_at: String,
}

/// API request to record a sample.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSampleRequest {
    pub code: String,
    /// Code of the source tree, `AR-0000`.
    pub tree_code: String,
    /// Defaults to the time of the request.
    #[serde(default)]
    pub collected_at: Option<String>,
    #[serde(rename = "type")]
    pub sample_type: String,
    pub quantity: f64,
    /// Defaults to `Fresh`.
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// API request to update a sample.
///
/// `status` is only honored for administrators.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSampleRequest {
    #[serde(default)]
    pub collected_at: Option<String>,
    #[serde(default, rename = "type")]
    pub sample_type: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

// ============================================================================
// Assignments
// ============================================================================

/// API request to create an assignment.
///
/// Only the reference matching `type` is used; the others are discarded.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    /// The brigadista's user ID.
    pub brigadista: i64,
    /// `conglomerate`, `subplot` or `zone`.
    #[serde(rename = "type")]
    pub assignment_type: String,
    #[serde(default)]
    pub conglomerate: Option<i64>,
    #[serde(default)]
    pub subplot: Option<i64>,
    #[serde(default)]
    pub zone_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub brigade_label: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// API request to update an assignment.
///
/// Absent fields are left untouched. Fields the caller's role may not
/// change are ignored. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: Option<i64>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub brigade_label: Option<String>,
}

/// The brigadista an assignment belongs to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BrigadistaSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// The administrator who created an assignment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssignedBySummary {
    pub id: i64,
    pub name: String,
}

/// The conglomerate an assignment targets.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConglomerateSummary {
    pub id: i64,
    pub code: String,
    pub department: String,
    pub municipality: String,
    pub vereda: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// The subplot an assignment targets.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubplotSummary {
    pub id: i64,
    pub conglomerate_code: String,
    pub number: i32,
    pub latitude: f64,
    pub longitude: f64,
}

/// An assignment with owner and references resolved for display.
///
/// Exactly one of `conglomerate`, `subplot` and `zone_id` is present,
/// matching `assignment_type`. `zone_data` is only present on zone
/// assignments in enriched listings, and is `null` when the lookup failed.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub id: i64,
    pub brigadista: BrigadistaSummary,
    #[serde(rename = "type")]
    pub assignment_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conglomerate: Option<ConglomerateSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subplot: Option<SubplotSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub zone_data: Option<Option<ZoneRecord>>,
    pub status: String,
    pub priority: String,
    pub assigned_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<String>,
    pub progress: u8,
    pub brigade_label: String,
    pub notes: String,
    pub assigned_by: AssignedBySummary,
}

/// Distinguishes a present `null` from an absent field.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Aggregate assignment counts. Empty categories are omitted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
}

/// A plain confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
