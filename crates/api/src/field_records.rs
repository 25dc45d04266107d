// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Handlers for the trees and botanical samples brigadistas record.
//!
//! Any authenticated user may record and read field records. Only the
//! recorder or an administrator may change or delete one, and only an
//! administrator may move a sample through laboratory review.

use std::str::FromStr;

use ifn_domain::{
    SampleCondition, SampleKind, SampleStatus, TreeCondition, truncate_to_micros,
    validate_sample_code, validate_tree_code,
};
use ifn_persistence::{
    NewSample, NewTree, Persistence, SampleChanges, SampleData, TreeChanges, TreeData,
};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::handlers::{
    parse_optional, parse_optional_timestamp, require_non_blank, subplot_not_found,
};
use crate::request_response::{
    CreateSampleRequest, CreateTreeRequest, MessageResponse, SampleInfo, TreeInfo,
    UpdateSampleRequest, UpdateTreeRequest,
};
use crate::views::ViewResolver;

// ---------------------------------------------------------------------------
// Trees
// ---------------------------------------------------------------------------

/// Records a tree measured in a subplot.
///
/// # Errors
///
/// Returns an error if:
/// - The code is malformed or already registered
/// - A measurement or the condition is invalid
/// - The subplot does not exist
pub fn create_tree(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &CreateTreeRequest,
    now: OffsetDateTime,
) -> Result<TreeInfo, ApiError> {
    validate_tree_code(&request.code).map_err(translate_domain_error)?;
    require_non_blank("species", &request.species)?;
    validate_individual_number(request.individual_number)?;
    validate_positive("dbhCm", request.dbh_cm)?;
    validate_positive("heightM", request.height_m)?;
    let commercial_height_m: f64 = request.commercial_height_m.unwrap_or_default();
    validate_commercial_height(commercial_height_m, request.height_m)?;
    let condition: TreeCondition =
        parse_optional(request.condition.as_deref(), TreeCondition::from_str)?
            .unwrap_or(TreeCondition::Alive);

    let exists: bool = persistence
        .subplot_exists(request.subplot)
        .map_err(translate_persistence_error)?;
    if !exists {
        return Err(subplot_not_found(request.subplot));
    }

    let tree_id: i64 = persistence
        .insert_tree(NewTree {
            code: &request.code,
            subplot_id: request.subplot,
            individual_number: request.individual_number,
            species: &request.species,
            dbh_cm: request.dbh_cm,
            height_m: request.height_m,
            commercial_height_m,
            condition: condition.as_str(),
            sanitary_state: request.sanitary_state.as_deref().unwrap_or_default(),
            notes: request.notes.as_deref().unwrap_or_default(),
            recorded_by: authenticated_actor.user_id,
            created_at: truncate_to_micros(now),
        })
        .map_err(translate_persistence_error)?;

    info!(
        tree_id,
        code = %request.code,
        subplot_id = request.subplot,
        recorded_by = authenticated_actor.user_id,
        "Recorded tree"
    );

    get_tree(persistence, tree_id)
}

/// Lists every tree, most recently recorded first.
///
/// # Errors
///
/// Returns an error if the trees cannot be loaded.
pub fn list_trees(persistence: &mut Persistence) -> Result<Vec<TreeInfo>, ApiError> {
    let trees: Vec<TreeData> = persistence.list_trees().map_err(translate_persistence_error)?;
    ViewResolver::new(persistence).trees(trees)
}

/// Lists the trees of one subplot ordered by individual number.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the subplot does not exist.
pub fn list_trees_for_subplot(
    persistence: &mut Persistence,
    subplot_id: i64,
) -> Result<Vec<TreeInfo>, ApiError> {
    let exists: bool = persistence
        .subplot_exists(subplot_id)
        .map_err(translate_persistence_error)?;
    if !exists {
        return Err(subplot_not_found(subplot_id));
    }

    let trees: Vec<TreeData> = persistence
        .list_trees_for_subplot(subplot_id)
        .map_err(translate_persistence_error)?;
    ViewResolver::new(persistence).trees(trees)
}

/// Returns one tree.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if no tree has this ID.
pub fn get_tree(persistence: &mut Persistence, tree_id: i64) -> Result<TreeInfo, ApiError> {
    let tree: TreeData = load_tree(persistence, tree_id)?;
    ViewResolver::new(persistence).tree(tree)
}

/// Updates a tree's measurements. Code and subplot cannot change.
///
/// # Errors
///
/// Returns an error if:
/// - The tree does not exist
/// - The actor is neither an administrator nor the recorder
/// - A supplied measurement or the condition is invalid
pub fn update_tree(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    tree_id: i64,
    request: &UpdateTreeRequest,
) -> Result<TreeInfo, ApiError> {
    let stored: TreeData = load_tree(persistence, tree_id)?;
    AuthorizationService::require_self_or_admin(
        authenticated_actor,
        stored.recorded_by,
        "update_tree",
    )?;

    if let Some(species) = &request.species {
        require_non_blank("species", species)?;
    }
    if let Some(number) = request.individual_number {
        validate_individual_number(number)?;
    }
    if let Some(dbh_cm) = request.dbh_cm {
        validate_positive("dbhCm", dbh_cm)?;
    }
    if let Some(height_m) = request.height_m {
        validate_positive("heightM", height_m)?;
    }
    validate_commercial_height(
        request.commercial_height_m.unwrap_or(stored.commercial_height_m),
        request.height_m.unwrap_or(stored.height_m),
    )?;
    let condition: Option<TreeCondition> =
        parse_optional(request.condition.as_deref(), TreeCondition::from_str)?;

    persistence
        .update_tree(
            tree_id,
            TreeChanges {
                individual_number: request.individual_number,
                species: request.species.as_deref(),
                dbh_cm: request.dbh_cm,
                height_m: request.height_m,
                commercial_height_m: request.commercial_height_m,
                condition: condition.as_ref().map(TreeCondition::as_str),
                sanitary_state: request.sanitary_state.as_deref(),
                notes: request.notes.as_deref(),
            },
        )
        .map_err(translate_persistence_error)?;

    info!(tree_id, updated_by = authenticated_actor.user_id, "Updated tree");

    get_tree(persistence, tree_id)
}

/// Deletes a tree. Samples taken from it keep their tree code.
///
/// # Errors
///
/// Returns an error if the tree does not exist or the actor is neither an
/// administrator nor the recorder.
pub fn delete_tree(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    tree_id: i64,
) -> Result<MessageResponse, ApiError> {
    let stored: TreeData = load_tree(persistence, tree_id)?;
    AuthorizationService::require_self_or_admin(
        authenticated_actor,
        stored.recorded_by,
        "delete_tree",
    )?;

    persistence
        .delete_tree(tree_id)
        .map_err(translate_persistence_error)?;

    info!(tree_id, deleted_by = authenticated_actor.user_id, "Deleted tree");

    Ok(MessageResponse {
        message: format!("Tree {tree_id} deleted"),
    })
}

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

/// Records a botanical sample.
///
/// The sample is linked to the tree with `treeCode` when one is on record;
/// otherwise only the code is kept. `collectedAt` defaults to `now`.
///
/// # Errors
///
/// Returns an error if:
/// - The sample or tree code is malformed, or the sample code is taken
/// - The type, condition or collection date is invalid
/// - The quantity is not positive
pub fn create_sample(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &CreateSampleRequest,
    now: OffsetDateTime,
) -> Result<SampleInfo, ApiError> {
    validate_sample_code(&request.code).map_err(translate_domain_error)?;
    validate_tree_code(&request.tree_code)
        .map_err(|e| ApiError::invalid("treeCode", e.to_string()))?;
    let kind: SampleKind =
        SampleKind::from_str(&request.sample_type).map_err(translate_domain_error)?;
    validate_positive("quantity", request.quantity)?;
    let condition: SampleCondition =
        parse_optional(request.condition.as_deref(), SampleCondition::from_str)?
            .unwrap_or(SampleCondition::Fresh);
    let now: OffsetDateTime = truncate_to_micros(now);
    let collected_at: OffsetDateTime =
        parse_optional_timestamp("collectedAt", request.collected_at.as_deref())?.unwrap_or(now);

    let tree_id: Option<i64> = persistence
        .get_tree_id_by_code(&request.tree_code)
        .map_err(translate_persistence_error)?;

    let sample_id: i64 = persistence
        .insert_sample(NewSample {
            code: &request.code,
            tree_code: &request.tree_code,
            tree_id,
            collected_at,
            kind: kind.as_str(),
            quantity: request.quantity,
            condition: condition.as_str(),
            image_url: request.image_url.as_deref().unwrap_or_default(),
            notes: request.notes.as_deref().unwrap_or_default(),
            recorded_by: authenticated_actor.user_id,
            created_at: now,
        })
        .map_err(translate_persistence_error)?;

    info!(
        sample_id,
        code = %request.code,
        tree_code = %request.tree_code,
        linked = tree_id.is_some(),
        recorded_by = authenticated_actor.user_id,
        "Recorded sample"
    );

    get_sample(persistence, sample_id)
}

/// Lists every sample, most recently recorded first.
///
/// # Errors
///
/// Returns an error if the samples cannot be loaded.
pub fn list_samples(persistence: &mut Persistence) -> Result<Vec<SampleInfo>, ApiError> {
    let samples: Vec<SampleData> = persistence
        .list_samples()
        .map_err(translate_persistence_error)?;
    ViewResolver::new(persistence).samples(samples)
}

/// Lists the samples taken from one tree code, most recently collected
/// first. An unknown code yields an empty list.
///
/// # Errors
///
/// Returns an error if the code is malformed.
pub fn list_samples_for_tree(
    persistence: &mut Persistence,
    tree_code: &str,
) -> Result<Vec<SampleInfo>, ApiError> {
    validate_tree_code(tree_code).map_err(translate_domain_error)?;
    let samples: Vec<SampleData> = persistence
        .list_samples_for_tree_code(tree_code)
        .map_err(translate_persistence_error)?;
    ViewResolver::new(persistence).samples(samples)
}

/// Lists the samples one user recorded.
///
/// # Errors
///
/// Returns an error if the actor is neither an administrator nor that user.
pub fn list_samples_for_user(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    user_id: i64,
) -> Result<Vec<SampleInfo>, ApiError> {
    AuthorizationService::require_self_or_admin(
        authenticated_actor,
        user_id,
        "list_samples_for_user",
    )?;
    let samples: Vec<SampleData> = persistence
        .list_samples_for_user(user_id)
        .map_err(translate_persistence_error)?;
    ViewResolver::new(persistence).samples(samples)
}

/// Returns one sample.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if no sample has this ID.
pub fn get_sample(persistence: &mut Persistence, sample_id: i64) -> Result<SampleInfo, ApiError> {
    let sample: SampleData = load_sample(persistence, sample_id)?;
    ViewResolver::new(persistence).sample(sample)
}

/// Updates a sample.
///
/// The recorder and administrators may edit the collection details. Only
/// administrators may change the status; a status sent by anyone else is
/// dropped.
///
/// # Errors
///
/// Returns an error if:
/// - The sample does not exist
/// - The actor is neither an administrator nor the recorder
/// - A supplied field is invalid
pub fn update_sample(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    sample_id: i64,
    request: &UpdateSampleRequest,
) -> Result<SampleInfo, ApiError> {
    let stored: SampleData = load_sample(persistence, sample_id)?;
    AuthorizationService::require_self_or_admin(
        authenticated_actor,
        stored.recorded_by,
        "update_sample",
    )?;

    let kind: Option<SampleKind> =
        parse_optional(request.sample_type.as_deref(), SampleKind::from_str)?;
    let condition: Option<SampleCondition> =
        parse_optional(request.condition.as_deref(), SampleCondition::from_str)?;
    if let Some(quantity) = request.quantity {
        validate_positive("quantity", quantity)?;
    }
    let collected_at: Option<OffsetDateTime> =
        parse_optional_timestamp("collectedAt", request.collected_at.as_deref())?;

    let status: Option<SampleStatus> = if authenticated_actor.is_admin() {
        parse_optional(request.status.as_deref(), SampleStatus::from_str)?
    } else {
        if request.status.is_some() {
            debug!(
                user_id = authenticated_actor.user_id,
                "Dropping admin-only status from sample update"
            );
        }
        None
    };

    persistence
        .update_sample(
            sample_id,
            SampleChanges {
                collected_at,
                kind: kind.as_ref().map(SampleKind::as_str),
                quantity: request.quantity,
                condition: condition.as_ref().map(SampleCondition::as_str),
                image_url: request.image_url.as_deref(),
                notes: request.notes.as_deref(),
                status: status.as_ref().map(SampleStatus::as_str),
            },
        )
        .map_err(translate_persistence_error)?;

    info!(
        sample_id,
        status = status.as_ref().map(SampleStatus::as_str),
        updated_by = authenticated_actor.user_id,
        "Updated sample"
    );

    get_sample(persistence, sample_id)
}

/// Deletes a sample.
///
/// # Errors
///
/// Returns an error if the sample does not exist or the actor is neither
/// an administrator nor the recorder.
pub fn delete_sample(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    sample_id: i64,
) -> Result<MessageResponse, ApiError> {
    let stored: SampleData = load_sample(persistence, sample_id)?;
    AuthorizationService::require_self_or_admin(
        authenticated_actor,
        stored.recorded_by,
        "delete_sample",
    )?;

    persistence
        .delete_sample(sample_id)
        .map_err(translate_persistence_error)?;

    info!(sample_id, deleted_by = authenticated_actor.user_id, "Deleted sample");

    Ok(MessageResponse {
        message: format!("Sample {sample_id} deleted"),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_tree(persistence: &mut Persistence, tree_id: i64) -> Result<TreeData, ApiError> {
    persistence
        .get_tree(tree_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Tree", format!("No tree with ID {tree_id}")))
}

fn load_sample(persistence: &mut Persistence, sample_id: i64) -> Result<SampleData, ApiError> {
    persistence
        .get_sample(sample_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Sample", format!("No sample with ID {sample_id}")))
}

fn validate_positive(field: &str, value: f64) -> Result<(), ApiError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ApiError::invalid(
            field,
            format!("Must be a positive number, got {value}"),
        ));
    }
    Ok(())
}

fn validate_individual_number(number: i32) -> Result<(), ApiError> {
    if number < 1 {
        return Err(ApiError::invalid(
            "individualNumber",
            format!("Individual number must be at least 1, got {number}"),
        ));
    }
    Ok(())
}

/// Commercial height is the usable trunk length, so it never exceeds the
/// total height.
fn validate_commercial_height(commercial_height_m: f64, height_m: f64) -> Result<(), ApiError> {
    if !commercial_height_m.is_finite() || commercial_height_m < 0.0 {
        return Err(ApiError::invalid(
            "commercialHeightM",
            format!("Must not be negative, got {commercial_height_m}"),
        ));
    }
    if commercial_height_m > height_m {
        return Err(ApiError::invalid(
            "commercialHeightM",
            format!("Commercial height {commercial_height_m} exceeds total height {height_m}"),
        ));
    }
    Ok(())
}
