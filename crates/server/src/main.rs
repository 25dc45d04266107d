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
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use axum::{
    Json, Router,
    extract::{
        Path, State as AxumState,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use ifn_api::{
    ApiError, AssignmentResponse, ConglomerateInfo, CreateAssignmentRequest,
    CreateConglomerateRequest, CreateSampleRequest, CreateSubplotRequest, CreateTreeRequest,
    CreateUserRequest, HttpZoneDirectory, LoginRequest, LoginResponse, MessageResponse,
    SampleInfo, StatisticsResponse, SubplotInfo, TreeInfo, UpdateAssignmentRequest,
    UpdateConglomerateRequest, UpdateSampleRequest, UpdateSubplotRequest, UpdateTreeRequest,
    UpdateUserRequest, UserInfo, ZoneDirectory,
};
use ifn_persistence::{NewUser, Persistence, PersistenceError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use session::SessionUser;

/// IFN Server - assignment tracking for the national forest inventory
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "IFN_DATABASE")]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(long, env = "IFN_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the server to
    #[arg(short, long, env = "IFN_PORT", default_value_t = 5000)]
    port: u16,

    /// Base URL of the zone service
    #[arg(long, env = "ZONE_SERVICE_URL", default_value = "http://localhost:5002/api")]
    zone_service_url: String,

    /// Timeout for each zone service request, in milliseconds
    #[arg(long, env = "ZONE_TIMEOUT_MS", default_value_t = 3000)]
    zone_timeout_ms: u64,

    /// Session lifetime in hours
    #[arg(long, env = "IFN_SESSION_HOURS", default_value_t = 24)]
    session_hours: u32,

    /// Email of the administrator to create on startup if missing
    #[arg(long, env = "IFN_ADMIN_EMAIL", requires = "admin_password")]
    admin_email: Option<String>,

    /// Password of the startup administrator
    #[arg(long, env = "IFN_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// Display name of the startup administrator
    #[arg(long, env = "IFN_ADMIN_NAME", default_value = "Administrador")]
    admin_name: String,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The persistence layer. Never held across a zone service call.
    persistence: Arc<Mutex<Persistence>>,
    /// The zone service client.
    zones: Arc<dyn ZoneDirectory>,
    /// Lifetime of sessions issued at login.
    session_lifetime: time::Duration,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Human-readable error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::AuthenticationFailed { .. } => Self {
                status: StatusCode::UNAUTHORIZED,
                message: err.to_string(),
            },
            ApiError::Forbidden { .. } => Self {
                status: StatusCode::FORBIDDEN,
                message: err.to_string(),
            },
            ApiError::InvalidInput { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            },
            ApiError::ResourceNotFound { message, .. } => Self {
                status: StatusCode::NOT_FOUND,
                message,
            },
            ApiError::Conflict { message } => Self {
                status: StatusCode::CONFLICT,
                message,
            },
            ApiError::Internal { message } => {
                error!(error = %message, "Internal error");
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("Invalid request body: {}", rejection.body_text()),
        }
    }
}

impl From<PathRejection> for HttpError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("Invalid path parameter: {}", rejection.body_text()),
        }
    }
}

impl HttpError {
    /// A 500 whose body carries no internal detail.
    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: String::from("Internal server error"),
        }
    }
}

/// Response body for the liveness check.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, HttpError> {
    let Json(request) = payload?;
    let now: OffsetDateTime = OffsetDateTime::now_utc();

    let mut persistence = app_state.persistence.lock().await;
    ifn_api::AuthenticationService::purge_expired_sessions(&mut persistence, now);
    Ok(Json(ifn_api::login(
        &mut persistence,
        &request,
        app_state.session_lifetime,
        now,
    )?))
}

async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
) -> Result<Json<MessageResponse>, HttpError> {
    ifn_api::logout(&mut *app_state.persistence.lock().await, &session.token)?;

    info!(user_id = session.user.user_id, "User logged out");
    Ok(Json(MessageResponse {
        message: String::from("Logged out"),
    }))
}

async fn handle_me(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::current_user(&mut persistence, &session.actor)?))
}

async fn handle_list_users(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
) -> Result<Json<Vec<UserInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::list_users(&mut persistence, &session.actor)?))
}

async fn handle_list_brigadistas(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
) -> Result<Json<Vec<UserInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::list_brigadistas(
        &mut persistence,
        &session.actor,
    )?))
}

async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserInfo>), HttpError> {
    let Json(request) = payload?;
    let mut persistence = app_state.persistence.lock().await;
    Ok((
        StatusCode::CREATED,
        Json(ifn_api::create_user(
            &mut persistence,
            &session.actor,
            &request,
        )?),
    ))
}

async fn handle_get_user(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserInfo>, HttpError> {
    let Path(user_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::get_user(
        &mut persistence,
        &session.actor,
        user_id,
    )?))
}

async fn handle_update_user(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserInfo>, HttpError> {
    let Path(user_id) = path?;
    let Json(request) = payload?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::update_user(
        &mut persistence,
        &session.actor,
        user_id,
        &request,
    )?))
}

async fn handle_delete_user(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, HttpError> {
    let Path(user_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::delete_user(
        &mut persistence,
        &session.actor,
        user_id,
    )?))
}

async fn handle_list_conglomerates(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionUser,
) -> Result<Json<Vec<ConglomerateInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::list_conglomerates(&mut persistence)?))
}

async fn handle_get_conglomerate(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ConglomerateInfo>, HttpError> {
    let Path(conglomerate_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::get_conglomerate(
        &mut persistence,
        conglomerate_id,
    )?))
}

async fn handle_create_conglomerate(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    payload: Result<Json<CreateConglomerateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ConglomerateInfo>), HttpError> {
    let Json(request) = payload?;
    let mut persistence = app_state.persistence.lock().await;
    Ok((
        StatusCode::CREATED,
        Json(ifn_api::create_conglomerate(
            &mut persistence,
            &session.actor,
            &request,
        )?),
    ))
}

async fn handle_update_conglomerate(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateConglomerateRequest>, JsonRejection>,
) -> Result<Json<ConglomerateInfo>, HttpError> {
    let Path(conglomerate_id) = path?;
    let Json(request) = payload?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::update_conglomerate(
        &mut persistence,
        &session.actor,
        conglomerate_id,
        &request,
    )?))
}

async fn handle_delete_conglomerate(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, HttpError> {
    let Path(conglomerate_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::delete_conglomerate(
        &mut persistence,
        &session.actor,
        conglomerate_id,
    )?))
}

async fn handle_list_subplots(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionUser,
) -> Result<Json<Vec<SubplotInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::list_subplots(&mut persistence)?))
}

async fn handle_get_subplot(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<SubplotInfo>, HttpError> {
    let Path(subplot_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::get_subplot(&mut persistence, subplot_id)?))
}

async fn handle_create_subplot(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    payload: Result<Json<CreateSubplotRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubplotInfo>), HttpError> {
    let Json(request) = payload?;
    let mut persistence = app_state.persistence.lock().await;
    Ok((
        StatusCode::CREATED,
        Json(ifn_api::create_subplot(
            &mut persistence,
            &session.actor,
            &request,
        )?),
    ))
}

async fn handle_list_subplots_for_conglomerate(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionUser,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<SubplotInfo>>, HttpError> {
    let Path(conglomerate_code) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::list_subplots_for_conglomerate(
        &mut persistence,
        &conglomerate_code,
    )?))
}

async fn handle_update_subplot(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateSubplotRequest>, JsonRejection>,
) -> Result<Json<SubplotInfo>, HttpError> {
    let Path(subplot_id) = path?;
    let Json(request) = payload?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::update_subplot(
        &mut persistence,
        &session.actor,
        subplot_id,
        &request,
    )?))
}

async fn handle_delete_subplot(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, HttpError> {
    let Path(subplot_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::delete_subplot(
        &mut persistence,
        &session.actor,
        subplot_id,
    )?))
}

async fn handle_list_trees(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionUser,
) -> Result<Json<Vec<TreeInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::list_trees(&mut persistence)?))
}

async fn handle_list_trees_for_subplot(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<TreeInfo>>, HttpError> {
    let Path(subplot_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::list_trees_for_subplot(
        &mut persistence,
        subplot_id,
    )?))
}

async fn handle_get_tree(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<TreeInfo>, HttpError> {
    let Path(tree_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::get_tree(&mut persistence, tree_id)?))
}

async fn handle_create_tree(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    payload: Result<Json<CreateTreeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TreeInfo>), HttpError> {
    let Json(request) = payload?;
    let mut persistence = app_state.persistence.lock().await;
    Ok((
        StatusCode::CREATED,
        Json(ifn_api::create_tree(
            &mut persistence,
            &session.actor,
            &request,
            OffsetDateTime::now_utc(),
        )?),
    ))
}

async fn handle_update_tree(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTreeRequest>, JsonRejection>,
) -> Result<Json<TreeInfo>, HttpError> {
    let Path(tree_id) = path?;
    let Json(request) = payload?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::update_tree(
        &mut persistence,
        &session.actor,
        tree_id,
        &request,
    )?))
}

async fn handle_delete_tree(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, HttpError> {
    let Path(tree_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::delete_tree(
        &mut persistence,
        &session.actor,
        tree_id,
    )?))
}

async fn handle_list_samples(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionUser,
) -> Result<Json<Vec<SampleInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::list_samples(&mut persistence)?))
}

async fn handle_list_samples_for_tree(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionUser,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<SampleInfo>>, HttpError> {
    let Path(tree_code) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::list_samples_for_tree(
        &mut persistence,
        &tree_code,
    )?))
}

async fn handle_list_samples_for_user(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<SampleInfo>>, HttpError> {
    let Path(user_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::list_samples_for_user(
        &mut persistence,
        &session.actor,
        user_id,
    )?))
}

async fn handle_get_sample(
    AxumState(app_state): AxumState<AppState>,
    _session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<SampleInfo>, HttpError> {
    let Path(sample_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::get_sample(&mut persistence, sample_id)?))
}

async fn handle_create_sample(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    payload: Result<Json<CreateSampleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SampleInfo>), HttpError> {
    let Json(request) = payload?;
    let mut persistence = app_state.persistence.lock().await;
    Ok((
        StatusCode::CREATED,
        Json(ifn_api::create_sample(
            &mut persistence,
            &session.actor,
            &request,
            OffsetDateTime::now_utc(),
        )?),
    ))
}

async fn handle_update_sample(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateSampleRequest>, JsonRejection>,
) -> Result<Json<SampleInfo>, HttpError> {
    let Path(sample_id) = path?;
    let Json(request) = payload?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::update_sample(
        &mut persistence,
        &session.actor,
        sample_id,
        &request,
    )?))
}

async fn handle_delete_sample(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, HttpError> {
    let Path(sample_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::delete_sample(
        &mut persistence,
        &session.actor,
        sample_id,
    )?))
}

async fn handle_list_assignments(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
) -> Result<Json<Vec<AssignmentResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::list_all_assignments(
        &mut persistence,
        &session.actor,
    )?))
}

async fn handle_list_my_assignments(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
) -> Result<Json<Vec<AssignmentResponse>>, HttpError> {
    let assignments: Vec<AssignmentResponse> = ifn_api::list_my_assignments(
        &app_state.persistence,
        app_state.zones.as_ref(),
        &session.actor,
    )
    .await?;
    Ok(Json(assignments))
}

async fn handle_list_assignments_for_brigadista(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<AssignmentResponse>>, HttpError> {
    let Path(brigadista_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::list_assignments_for_brigadista(
        &mut persistence,
        &session.actor,
        brigadista_id,
    )?))
}

async fn handle_create_assignment(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    payload: Result<Json<CreateAssignmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AssignmentResponse>), HttpError> {
    let Json(request) = payload?;
    let created: AssignmentResponse = ifn_api::create_assignment(
        &app_state.persistence,
        app_state.zones.as_ref(),
        &session.actor,
        &request,
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn handle_update_assignment(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateAssignmentRequest>, JsonRejection>,
) -> Result<Json<AssignmentResponse>, HttpError> {
    let Path(assignment_id) = path?;
    let Json(request) = payload?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::update_assignment(
        &mut persistence,
        &session.actor,
        assignment_id,
        &request,
        OffsetDateTime::now_utc(),
    )?))
}

async fn handle_delete_assignment(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, HttpError> {
    let Path(assignment_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::delete_assignment(
        &mut persistence,
        &session.actor,
        assignment_id,
    )?))
}

async fn handle_assignment_statistics(
    AxumState(app_state): AxumState<AppState>,
    session: SessionUser,
) -> Result<Json<StatisticsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(ifn_api::assignment_statistics(
        &mut persistence,
        &session.actor,
    )?))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    let api: Router<AppState> = Router::new()
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/me", get(handle_me))
        .route("/users", get(handle_list_users).post(handle_create_user))
        .route("/users/brigadistas", get(handle_list_brigadistas))
        .route(
            "/users/{id}",
            get(handle_get_user)
                .put(handle_update_user)
                .delete(handle_delete_user),
        )
        .route(
            "/conglomerates",
            get(handle_list_conglomerates).post(handle_create_conglomerate),
        )
        .route(
            "/conglomerates/{id}",
            get(handle_get_conglomerate)
                .put(handle_update_conglomerate)
                .delete(handle_delete_conglomerate),
        )
        .route(
            "/subplots",
            get(handle_list_subplots).post(handle_create_subplot),
        )
        .route(
            "/subplots/{id}",
            get(handle_get_subplot)
                .put(handle_update_subplot)
                .delete(handle_delete_subplot),
        )
        .route(
            "/subplots/conglomerate/{code}",
            get(handle_list_subplots_for_conglomerate),
        )
        .route("/trees", get(handle_list_trees).post(handle_create_tree))
        .route(
            "/trees/{id}",
            get(handle_get_tree)
                .put(handle_update_tree)
                .delete(handle_delete_tree),
        )
        .route("/trees/subplot/{id}", get(handle_list_trees_for_subplot))
        .route(
            "/samples",
            get(handle_list_samples).post(handle_create_sample),
        )
        .route(
            "/samples/{id}",
            get(handle_get_sample)
                .put(handle_update_sample)
                .delete(handle_delete_sample),
        )
        .route("/samples/tree/{code}", get(handle_list_samples_for_tree))
        .route("/samples/user/{id}", get(handle_list_samples_for_user))
        .route(
            "/assignments",
            get(handle_list_assignments).post(handle_create_assignment),
        )
        .route("/assignments/mine", get(handle_list_my_assignments))
        .route("/assignments/stats", get(handle_assignment_statistics))
        .route(
            "/assignments/by-user/{id}",
            get(handle_list_assignments_for_brigadista),
        )
        .route(
            "/assignments/{id}",
            put(handle_update_assignment).delete(handle_delete_assignment),
        );

    Router::new()
        .route("/health", get(handle_health))
        .nest("/api", api)
        .with_state(app_state)
}

/// Creates the configured administrator unless a user with that email exists.
///
/// # Errors
///
/// Returns an error if the lookup or insert fails.
fn bootstrap_admin(
    persistence: &mut Persistence,
    email: &str,
    password: &str,
    name: &str,
) -> Result<(), PersistenceError> {
    if persistence.get_user_by_email(email)?.is_some() {
        info!(email, "Bootstrap administrator already exists");
        return Ok(());
    }

    let user_id: i64 = persistence.create_user(NewUser {
        name,
        email,
        password,
        role: "admin",
        zone: "",
    })?;
    info!(user_id, email, "Created bootstrap administrator");
    Ok(())
}

/// Binds the listening socket. `host` may be an IP address or a host name.
async fn bind_listener(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((host, port)).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing IFN Server");

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!(path = %db_path, "Using file-based database");
        Persistence::new_with_file(db_path)?
    } else {
        warn!("Using in-memory database; data is lost on shutdown");
        Persistence::new_in_memory()?
    };

    match (&args.admin_email, &args.admin_password) {
        (Some(email), Some(password)) => {
            bootstrap_admin(&mut persistence, email, password, &args.admin_name)?;
        }
        _ if persistence.count_users()? == 0 => {
            warn!("No users exist and no bootstrap administrator is configured");
        }
        _ => {}
    }

    let zones: HttpZoneDirectory = HttpZoneDirectory::new(
        &args.zone_service_url,
        std::time::Duration::from_millis(args.zone_timeout_ms),
    )?;
    info!(
        url = %args.zone_service_url,
        timeout_ms = args.zone_timeout_ms,
        "Zone service client configured"
    );

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        zones: Arc::new(zones),
        session_lifetime: time::Duration::hours(i64::from(args.session_hours)),
    };

    let app: Router = build_router(app_state);

    let listener: TcpListener = bind_listener(&args.host, args.port).await?;
    info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
