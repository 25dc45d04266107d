// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handlers.
//!
//! Every handler takes an explicit [`AuthenticatedActor`] (except `login`)
//! and enforces authorization before touching state. Synchronous handlers
//! borrow the persistence layer directly; the two handlers that call the
//! zone service take the shared mutex and never hold it across a zone
//! lookup.

use std::str::FromStr;

use ifn_domain::{
    AdminFields, Assignment, AssignmentDraft, AssignmentKind, AssignmentPatch,
    AssignmentStatistics, AssignmentStatus, AssignmentTarget, OwnerFields, Priority, Progress,
    format_timestamp, parse_timestamp, validate_conglomerate_code,
};
use ifn_persistence::{
    ConglomerateChanges, ConglomerateData, NewConglomerate, NewSubplot, NewUser, Persistence,
    SubplotChanges, SubplotData, UserChanges, UserData,
};
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    AssignmentResponse, ConglomerateInfo, CreateAssignmentRequest, CreateConglomerateRequest,
    CreateSubplotRequest, CreateUserRequest, LoginRequest, LoginResponse, MessageResponse,
    StatisticsResponse, SubplotInfo, UpdateAssignmentRequest, UpdateConglomerateRequest,
    UpdateSubplotRequest, UpdateUserRequest, UserInfo,
};
use crate::views::{ViewResolver, conglomerate_info, statistics_response, subplot_info, user_info};
use crate::zone::{ZoneDirectory, ZoneRecord, ZoneServiceError, enrich_with_zones};

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Authenticates a user and opens a session.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `request` - The login credentials
/// * `lifetime` - How long the session stays valid
/// * `now` - The current time
///
/// # Errors
///
/// Returns `ApiError::AuthenticationFailed` for bad credentials or an
/// inactive account.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
    lifetime: Duration,
    now: OffsetDateTime,
) -> Result<LoginResponse, ApiError> {
    let (token, expires_at, user): (String, OffsetDateTime, UserData) =
        AuthenticationService::login(
            persistence,
            &request.email,
            &request.password,
            lifetime,
            now,
        )?;

    Ok(LoginResponse {
        token,
        expires_at: format_timestamp("expiresAt", expires_at).map_err(translate_domain_error)?,
        user: user_info(user),
    })
}

/// Ends the session identified by `session_token`.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Returns the profile of the calling user.
///
/// # Errors
///
/// Returns `ApiError::AuthenticationFailed` if the user no longer exists.
pub fn current_user(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<UserInfo, ApiError> {
    let user: UserData = persistence
        .get_user_by_id(authenticated_actor.user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::AuthenticationFailed {
            reason: String::from("User not found"),
        })?;
    Ok(user_info(user))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Creates a user account.
///
/// The role defaults to `brigadista` when not supplied.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an administrator
/// - A required field is blank or the role is unknown
/// - The email is already registered
pub fn create_user(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &CreateUserRequest,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "create_user")?;

    require_non_blank("name", &request.name)?;
    require_non_blank("password", &request.password)?;
    require_email(&request.email)?;

    let role: Role = match request.role.as_deref() {
        None => Role::Brigadista,
        Some(value) => Role::from_str(value).map_err(|_| {
            ApiError::invalid("role", format!("Role must be 'admin' or 'brigadista', got '{value}'"))
        })?,
    };

    let user_id: i64 = persistence
        .create_user(NewUser {
            name: &request.name,
            email: &request.email,
            password: &request.password,
            role: role.as_str(),
            zone: request.zone.as_deref().unwrap_or_default(),
        })
        .map_err(translate_persistence_error)?;

    info!(
        user_id,
        role = role.as_str(),
        created_by = authenticated_actor.user_id,
        "Created user"
    );

    let user: UserData = persistence
        .get_user_by_id(user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::Internal {
            message: format!("User {user_id} missing after insert"),
        })?;
    Ok(user_info(user))
}

/// Lists every user.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator.
pub fn list_users(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<Vec<UserInfo>, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "list_users")?;
    let users: Vec<UserData> = persistence.list_users().map_err(translate_persistence_error)?;
    Ok(users.into_iter().map(user_info).collect())
}

/// Lists active brigadistas, the candidates for new assignments.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator.
pub fn list_brigadistas(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<Vec<UserInfo>, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "list_brigadistas")?;
    let users: Vec<UserData> = persistence
        .list_active_brigadistas()
        .map_err(translate_persistence_error)?;
    Ok(users.into_iter().map(user_info).collect())
}

/// Returns one user.
///
/// # Errors
///
/// Returns an error if the actor is neither an administrator nor the user,
/// or the user does not exist.
pub fn get_user(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    user_id: i64,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::require_self_or_admin(authenticated_actor, user_id, "get_user")?;
    load_user(persistence, user_id).map(user_info)
}

/// Updates a user account.
///
/// Users may edit their own name, email, password and zone.
/// Administrators may edit any account and may also change its status.
/// A status sent by anyone else is dropped.
///
/// # Errors
///
/// Returns an error if:
/// - The user does not exist
/// - The actor is neither an administrator nor the user
/// - A supplied field is blank, the email is malformed or taken, or the
///   status is unknown
pub fn update_user(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    user_id: i64,
    request: &UpdateUserRequest,
) -> Result<UserInfo, ApiError> {
    load_user(persistence, user_id)?;
    AuthorizationService::require_self_or_admin(authenticated_actor, user_id, "update_user")?;

    if let Some(name) = &request.name {
        require_non_blank("name", name)?;
    }
    if let Some(password) = &request.password {
        require_non_blank("password", password)?;
    }
    if let Some(email) = &request.email {
        require_email(email)?;
    }

    let status: Option<&str> = if authenticated_actor.is_admin() {
        match request.status.as_deref() {
            None => None,
            Some(status @ ("Active" | "Inactive")) => Some(status),
            Some(other) => {
                return Err(ApiError::invalid(
                    "status",
                    format!("Status must be 'Active' or 'Inactive', got '{other}'"),
                ));
            }
        }
    } else {
        if request.status.is_some() {
            debug!(
                user_id = authenticated_actor.user_id,
                "Dropping admin-only status from self update"
            );
        }
        None
    };

    persistence
        .update_user(
            user_id,
            UserChanges {
                name: request.name.as_deref(),
                email: request.email.as_deref(),
                password: request.password.as_deref(),
                zone: request.zone.as_deref(),
                status,
            },
        )
        .map_err(translate_persistence_error)?;

    info!(
        user_id,
        status_changed = status.is_some(),
        updated_by = authenticated_actor.user_id,
        "Updated user"
    );

    load_user(persistence, user_id).map(user_info)
}

/// Deletes a user account.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an administrator, or is deleting their own account
/// - The user does not exist
/// - Assignments or field records still reference the user
pub fn delete_user(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    user_id: i64,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "delete_user")?;
    if authenticated_actor.user_id == user_id {
        return Err(ApiError::invalid("id", "Administrators cannot delete their own account"));
    }

    persistence
        .delete_user(user_id)
        .map_err(|e| match translate_persistence_error(e) {
            ApiError::ResourceNotFound { .. } => user_not_found(user_id),
            other => other,
        })?;

    info!(user_id, deleted_by = authenticated_actor.user_id, "Deleted user");

    Ok(MessageResponse {
        message: format!("User {user_id} deleted"),
    })
}

// ---------------------------------------------------------------------------
// Reference entities
// ---------------------------------------------------------------------------

/// Registers a conglomerate.
///
/// # Errors
///
/// Returns an error if the code is malformed or already registered, or a
/// coordinate is out of range.
pub fn create_conglomerate(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &CreateConglomerateRequest,
) -> Result<ConglomerateInfo, ApiError> {
    validate_conglomerate_code(&request.code).map_err(translate_domain_error)?;
    require_non_blank("department", &request.department)?;
    require_non_blank("municipality", &request.municipality)?;
    validate_coordinates(request.latitude, request.longitude)?;

    let conglomerate_id: i64 = persistence
        .create_conglomerate(NewConglomerate {
            code: &request.code,
            department: &request.department,
            municipality: &request.municipality,
            vereda: &request.vereda,
            latitude: request.latitude,
            longitude: request.longitude,
        })
        .map_err(translate_persistence_error)?;

    info!(
        conglomerate_id,
        code = %request.code,
        created_by = authenticated_actor.user_id,
        "Registered conglomerate"
    );

    get_conglomerate(persistence, conglomerate_id)
}

/// Lists conglomerates ordered by code.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_conglomerates(persistence: &mut Persistence) -> Result<Vec<ConglomerateInfo>, ApiError> {
    let conglomerates: Vec<ConglomerateData> = persistence
        .list_conglomerates()
        .map_err(translate_persistence_error)?;
    Ok(conglomerates.into_iter().map(conglomerate_info).collect())
}

/// Returns one conglomerate.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if no conglomerate has this ID.
pub fn get_conglomerate(
    persistence: &mut Persistence,
    conglomerate_id: i64,
) -> Result<ConglomerateInfo, ApiError> {
    persistence
        .get_conglomerate(conglomerate_id)
        .map_err(translate_persistence_error)?
        .map(conglomerate_info)
        .ok_or_else(|| conglomerate_not_found(conglomerate_id))
}

/// Updates a conglomerate's location. The code cannot change.
///
/// # Errors
///
/// Returns an error if the conglomerate does not exist, a supplied name is
/// blank, or a coordinate is out of range.
pub fn update_conglomerate(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    conglomerate_id: i64,
    request: &UpdateConglomerateRequest,
) -> Result<ConglomerateInfo, ApiError> {
    if let Some(department) = &request.department {
        require_non_blank("department", department)?;
    }
    if let Some(municipality) = &request.municipality {
        require_non_blank("municipality", municipality)?;
    }
    validate_optional_coordinates(request.latitude, request.longitude)?;

    persistence
        .update_conglomerate(
            conglomerate_id,
            ConglomerateChanges {
                department: request.department.as_deref(),
                municipality: request.municipality.as_deref(),
                vereda: request.vereda.as_deref(),
                latitude: request.latitude,
                longitude: request.longitude,
            },
        )
        .map_err(|e| match translate_persistence_error(e) {
            ApiError::ResourceNotFound { .. } => conglomerate_not_found(conglomerate_id),
            other => other,
        })?;

    info!(
        conglomerate_id,
        updated_by = authenticated_actor.user_id,
        "Updated conglomerate"
    );

    get_conglomerate(persistence, conglomerate_id)
}

/// Deletes a conglomerate.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the conglomerate
/// does not exist, or subplots or assignments still reference it.
pub fn delete_conglomerate(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    conglomerate_id: i64,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "delete_conglomerate")?;

    persistence
        .delete_conglomerate(conglomerate_id)
        .map_err(|e| match translate_persistence_error(e) {
            ApiError::ResourceNotFound { .. } => conglomerate_not_found(conglomerate_id),
            other => other,
        })?;

    info!(
        conglomerate_id,
        deleted_by = authenticated_actor.user_id,
        "Deleted conglomerate"
    );

    Ok(MessageResponse {
        message: format!("Conglomerate {conglomerate_id} deleted"),
    })
}

/// Registers a subplot.
///
/// # Errors
///
/// Returns an error if the conglomerate code is malformed or unknown, or a
/// coordinate is out of range.
pub fn create_subplot(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    request: &CreateSubplotRequest,
) -> Result<SubplotInfo, ApiError> {
    validate_conglomerate_code(&request.conglomerate_code).map_err(|e| {
        ApiError::invalid("conglomerateCode", e.to_string())
    })?;
    validate_coordinates(request.latitude, request.longitude)?;

    let parent_exists: bool = persistence
        .conglomerate_code_exists(&request.conglomerate_code)
        .map_err(translate_persistence_error)?;
    if !parent_exists {
        return Err(conglomerate_code_not_found(&request.conglomerate_code));
    }

    let subplot_id: i64 = persistence
        .create_subplot(NewSubplot {
            conglomerate_code: &request.conglomerate_code,
            number: request.number,
            latitude: request.latitude,
            longitude: request.longitude,
        })
        .map_err(translate_persistence_error)?;

    info!(
        subplot_id,
        conglomerate_code = %request.conglomerate_code,
        created_by = authenticated_actor.user_id,
        "Registered subplot"
    );

    get_subplot(persistence, subplot_id)
}

/// Lists subplots.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_subplots(persistence: &mut Persistence) -> Result<Vec<SubplotInfo>, ApiError> {
    let subplots: Vec<SubplotData> = persistence
        .list_subplots()
        .map_err(translate_persistence_error)?;
    Ok(subplots.into_iter().map(subplot_info).collect())
}

/// Returns one subplot.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if no subplot has this ID.
pub fn get_subplot(persistence: &mut Persistence, subplot_id: i64) -> Result<SubplotInfo, ApiError> {
    persistence
        .get_subplot(subplot_id)
        .map_err(translate_persistence_error)?
        .map(subplot_info)
        .ok_or_else(|| subplot_not_found(subplot_id))
}

/// Lists the subplots of one conglomerate ordered by number.
///
/// # Errors
///
/// Returns an error if the code is malformed or no conglomerate has it.
pub fn list_subplots_for_conglomerate(
    persistence: &mut Persistence,
    conglomerate_code: &str,
) -> Result<Vec<SubplotInfo>, ApiError> {
    validate_conglomerate_code(conglomerate_code).map_err(translate_domain_error)?;

    let exists: bool = persistence
        .conglomerate_code_exists(conglomerate_code)
        .map_err(translate_persistence_error)?;
    if !exists {
        return Err(conglomerate_code_not_found(conglomerate_code));
    }

    let subplots: Vec<SubplotData> = persistence
        .list_subplots_for_conglomerate(conglomerate_code)
        .map_err(translate_persistence_error)?;
    Ok(subplots.into_iter().map(subplot_info).collect())
}

/// Updates a subplot's number or location. The parent cannot change.
///
/// # Errors
///
/// Returns an error if the subplot does not exist or a coordinate is out
/// of range.
pub fn update_subplot(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    subplot_id: i64,
    request: &UpdateSubplotRequest,
) -> Result<SubplotInfo, ApiError> {
    validate_optional_coordinates(request.latitude, request.longitude)?;

    persistence
        .update_subplot(
            subplot_id,
            SubplotChanges {
                number: request.number,
                latitude: request.latitude,
                longitude: request.longitude,
            },
        )
        .map_err(|e| match translate_persistence_error(e) {
            ApiError::ResourceNotFound { .. } => subplot_not_found(subplot_id),
            other => other,
        })?;

    info!(subplot_id, updated_by = authenticated_actor.user_id, "Updated subplot");

    get_subplot(persistence, subplot_id)
}

/// Deletes a subplot.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the subplot does
/// not exist, or trees or assignments still reference it.
pub fn delete_subplot(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    subplot_id: i64,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "delete_subplot")?;

    persistence
        .delete_subplot(subplot_id)
        .map_err(|e| match translate_persistence_error(e) {
            ApiError::ResourceNotFound { .. } => subplot_not_found(subplot_id),
            other => other,
        })?;

    info!(subplot_id, deleted_by = authenticated_actor.user_id, "Deleted subplot");

    Ok(MessageResponse {
        message: format!("Subplot {subplot_id} deleted"),
    })
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

/// Creates an assignment.
///
/// Input is validated before any lookup. Zone references are verified
/// against the zone service before the persistence lock is taken; local
/// references and the brigadista are checked under the lock, immediately
/// before the insert. Nothing is stored if any check fails.
///
/// # Arguments
///
/// * `persistence` - The shared persistence layer
/// * `zones` - The zone service
/// * `authenticated_actor` - The creating administrator
/// * `request` - The assignment to create
/// * `now` - The creation timestamp
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an administrator
/// - The type, status, priority or due date is invalid
/// - The reference matching the type is missing
/// - The brigadista, conglomerate, subplot or zone does not exist
pub async fn create_assignment(
    persistence: &Mutex<Persistence>,
    zones: &dyn ZoneDirectory,
    authenticated_actor: &AuthenticatedActor,
    request: &CreateAssignmentRequest,
    now: OffsetDateTime,
) -> Result<AssignmentResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "create_assignment")?;

    let draft: AssignmentDraft = parse_draft(request)?;

    if let AssignmentTarget::Zone(zone_id) = &draft.target {
        verify_zone(zones, zone_id).await?;
    }

    let mut guard = persistence.lock().await;
    let persistence: &mut Persistence = &mut guard;

    if persistence
        .get_user_by_id(draft.brigadista_id)
        .map_err(translate_persistence_error)?
        .is_none()
    {
        return Err(ApiError::not_found(
            "User",
            format!("No brigadista with ID {}", draft.brigadista_id),
        ));
    }

    match draft.target {
        AssignmentTarget::Conglomerate(conglomerate_id) => {
            let exists: bool = persistence
                .conglomerate_exists(conglomerate_id)
                .map_err(translate_persistence_error)?;
            if !exists {
                return Err(ApiError::not_found(
                    "Conglomerate",
                    format!("No conglomerate with ID {conglomerate_id}"),
                ));
            }
        }
        AssignmentTarget::Subplot(subplot_id) => {
            let exists: bool = persistence
                .subplot_exists(subplot_id)
                .map_err(translate_persistence_error)?;
            if !exists {
                return Err(ApiError::not_found(
                    "Subplot",
                    format!("No subplot with ID {subplot_id}"),
                ));
            }
        }
        AssignmentTarget::Zone(_) => {}
    }

    let mut assignment: Assignment =
        Assignment::create(draft, authenticated_actor.user_id, now);
    let assignment_id: i64 = persistence
        .insert_assignment(&assignment)
        .map_err(translate_persistence_error)?;
    assignment.assignment_id = Some(assignment_id);

    info!(
        assignment_id,
        brigadista_id = assignment.brigadista_id,
        kind = assignment.kind().as_str(),
        assigned_by = authenticated_actor.user_id,
        "Created assignment"
    );

    ViewResolver::new(persistence).resolve(&assignment)
}

/// Lists the caller's assignments, newest first, with zone data attached.
///
/// Zone lookups run concurrently after the persistence lock is released.
/// A failed lookup yields `zoneData: null` for that item only.
///
/// # Errors
///
/// Returns an error if the assignments cannot be loaded.
pub async fn list_my_assignments(
    persistence: &Mutex<Persistence>,
    zones: &dyn ZoneDirectory,
    authenticated_actor: &AuthenticatedActor,
) -> Result<Vec<AssignmentResponse>, ApiError> {
    let (assignments, mut views): (Vec<Assignment>, Vec<AssignmentResponse>) = {
        let mut guard = persistence.lock().await;
        let persistence: &mut Persistence = &mut guard;
        let assignments: Vec<Assignment> = persistence
            .list_assignments_for_brigadista(authenticated_actor.user_id)
            .map_err(translate_persistence_error)?;
        let views: Vec<AssignmentResponse> =
            ViewResolver::new(persistence).resolve_all(&assignments)?;
        (assignments, views)
    };

    let zone_data: Vec<Option<Option<ZoneRecord>>> =
        enrich_with_zones(zones, &assignments).await;
    for (view, data) in views.iter_mut().zip(zone_data) {
        view.zone_data = data;
    }

    Ok(views)
}

/// Lists every assignment, newest first.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator.
pub fn list_all_assignments(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<Vec<AssignmentResponse>, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "list_assignments")?;
    let assignments: Vec<Assignment> = persistence
        .list_assignments()
        .map_err(translate_persistence_error)?;
    ViewResolver::new(persistence).resolve_all(&assignments)
}

/// Lists one brigadista's assignments, newest first.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator.
pub fn list_assignments_for_brigadista(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    brigadista_id: i64,
) -> Result<Vec<AssignmentResponse>, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "list_assignments_for_brigadista")?;
    let assignments: Vec<Assignment> = persistence
        .list_assignments_for_brigadista(brigadista_id)
        .map_err(translate_persistence_error)?;
    ViewResolver::new(persistence).resolve_all(&assignments)
}

/// Updates an assignment.
///
/// Owners may change status, progress, start and completion dates and
/// notes. Administrators may additionally change priority, due date and
/// brigade label. Fields outside the caller's whitelist are dropped
/// without being parsed.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `authenticated_actor` - The caller
/// * `assignment_id` - The assignment to update
/// * `request` - The requested changes
/// * `now` - Timestamp used for derived transition dates
///
/// # Errors
///
/// Returns an error if:
/// - The assignment does not exist
/// - The actor is neither an administrator nor the owner
/// - A whitelisted field is invalid
pub fn update_assignment(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    assignment_id: i64,
    request: &UpdateAssignmentRequest,
    now: OffsetDateTime,
) -> Result<AssignmentResponse, ApiError> {
    let mut assignment: Assignment = load_assignment(persistence, assignment_id)?;
    AuthorizationService::authorize_assignment_update(authenticated_actor, &assignment)?;

    let patch: AssignmentPatch = build_patch(authenticated_actor, request)?;
    assignment.apply_patch(&patch, now);

    persistence
        .update_assignment(&assignment)
        .map_err(translate_persistence_error)?;

    info!(
        assignment_id,
        status = assignment.status.as_str(),
        progress = assignment.progress.value(),
        updated_by = authenticated_actor.user_id,
        "Updated assignment"
    );

    ViewResolver::new(persistence).resolve(&assignment)
}

/// Deletes an assignment.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator or the
/// assignment does not exist.
pub fn delete_assignment(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    assignment_id: i64,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "delete_assignment")?;

    persistence
        .delete_assignment(assignment_id)
        .map_err(|e| match translate_persistence_error(e) {
            ApiError::ResourceNotFound { .. } => assignment_not_found(assignment_id),
            other => other,
        })?;

    info!(
        assignment_id,
        deleted_by = authenticated_actor.user_id,
        "Deleted assignment"
    );

    Ok(MessageResponse {
        message: format!("Assignment {assignment_id} deleted"),
    })
}

/// Returns assignment counts grouped by status, type and priority.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator.
pub fn assignment_statistics(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<StatisticsResponse, ApiError> {
    AuthorizationService::require_admin(authenticated_actor, "assignment_statistics")?;
    let stats: AssignmentStatistics = persistence
        .assignment_statistics()
        .map_err(translate_persistence_error)?;
    Ok(statistics_response(&stats))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_assignment(
    persistence: &mut Persistence,
    assignment_id: i64,
) -> Result<Assignment, ApiError> {
    persistence
        .get_assignment(assignment_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| assignment_not_found(assignment_id))
}

fn assignment_not_found(assignment_id: i64) -> ApiError {
    ApiError::not_found("Assignment", format!("No assignment with ID {assignment_id}"))
}

fn load_user(persistence: &mut Persistence, user_id: i64) -> Result<UserData, ApiError> {
    persistence
        .get_user_by_id(user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| user_not_found(user_id))
}

fn user_not_found(user_id: i64) -> ApiError {
    ApiError::not_found("User", format!("No user with ID {user_id}"))
}

fn conglomerate_not_found(conglomerate_id: i64) -> ApiError {
    ApiError::not_found(
        "Conglomerate",
        format!("No conglomerate with ID {conglomerate_id}"),
    )
}

fn conglomerate_code_not_found(code: &str) -> ApiError {
    ApiError::not_found("Conglomerate", format!("No conglomerate with code {code}"))
}

pub(crate) fn subplot_not_found(subplot_id: i64) -> ApiError {
    ApiError::not_found("Subplot", format!("No subplot with ID {subplot_id}"))
}

fn require_email(email: &str) -> Result<(), ApiError> {
    if !email.contains('@') {
        return Err(ApiError::invalid("email", "Email must be a valid address"));
    }
    Ok(())
}

pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid(field, "Must not be blank"));
    }
    Ok(())
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ApiError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ApiError::invalid(
            "latitude",
            format!("Latitude must be between -90 and 90, got {latitude}"),
        ));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ApiError::invalid(
            "longitude",
            format!("Longitude must be between -180 and 180, got {longitude}"),
        ));
    }
    Ok(())
}

fn validate_optional_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(), ApiError> {
    validate_coordinates(latitude.unwrap_or_default(), longitude.unwrap_or_default())
}

pub(crate) fn parse_optional<T>(
    value: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, ifn_domain::DomainError>,
) -> Result<Option<T>, ApiError> {
    value.map(parse).transpose().map_err(translate_domain_error)
}

pub(crate) fn parse_optional_timestamp(
    field: &str,
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, ApiError> {
    parse_optional(value, |raw| parse_timestamp(field, raw))
}

fn parse_draft(request: &CreateAssignmentRequest) -> Result<AssignmentDraft, ApiError> {
    let kind: AssignmentKind =
        AssignmentKind::from_str(&request.assignment_type).map_err(translate_domain_error)?;
    let target: AssignmentTarget = AssignmentTarget::select(
        kind,
        request.conglomerate,
        request.subplot,
        request.zone_id.as_deref(),
    )
    .map_err(translate_domain_error)?;

    Ok(AssignmentDraft {
        brigadista_id: request.brigadista,
        target,
        status: parse_optional(request.status.as_deref(), AssignmentStatus::from_str)?,
        priority: parse_optional(request.priority.as_deref(), Priority::from_str)?,
        due_at: parse_optional_timestamp("dueAt", request.due_at.as_deref())?,
        brigade_label: request.brigade_label.clone().unwrap_or_default(),
        notes: request.notes.clone().unwrap_or_default(),
    })
}

/// Builds the patch the caller's role allows.
fn build_patch(
    authenticated_actor: &AuthenticatedActor,
    request: &UpdateAssignmentRequest,
) -> Result<AssignmentPatch, ApiError> {
    let common: OwnerFields = OwnerFields {
        status: parse_optional(request.status.as_deref(), AssignmentStatus::from_str)?,
        progress: request
            .progress
            .map(Progress::new)
            .transpose()
            .map_err(translate_domain_error)?,
        started_at: parse_optional_timestamp("startedAt", request.started_at.as_deref())?,
        completed_at: parse_optional_timestamp("completedAt", request.completed_at.as_deref())?,
        notes: request.notes.clone(),
    };

    if !authenticated_actor.is_admin() {
        if request.priority.is_some() || request.due_at.is_some() || request.brigade_label.is_some()
        {
            debug!(
                user_id = authenticated_actor.user_id,
                "Dropping admin-only fields from owner update"
            );
        }
        return Ok(AssignmentPatch::Owner(common));
    }

    let admin: AdminFields = AdminFields {
        priority: parse_optional(request.priority.as_deref(), Priority::from_str)?,
        due_at: parse_optional_timestamp("dueAt", request.due_at.as_deref())?,
        brigade_label: request.brigade_label.clone(),
    };
    Ok(AssignmentPatch::Admin { common, admin })
}

/// Confirms a zone exists in the zone service.
///
/// An unreachable service blocks creation the same way a missing zone
/// does, with a message that tells the two apart.
async fn verify_zone(zones: &dyn ZoneDirectory, zone_id: &str) -> Result<(), ApiError> {
    match zones.get_zone(zone_id).await {
        Ok(_) => Ok(()),
        Err(ZoneServiceError::NotFound { .. }) => {
            Err(ApiError::not_found("Zone", format!("Zone '{zone_id}' not found")))
        }
        Err(ZoneServiceError::Unavailable { reason, .. }) => {
            warn!(zone_id, reason = %reason, "Zone could not be verified");
            Err(ApiError::not_found(
                "Zone",
                format!("Zone '{zone_id}' could not be verified: zone service unavailable"),
            ))
        }
    }
}
