// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for authenticated routes.
//!
//! Every route except login and the health check takes a [`SessionUser`],
//! which validates the `Authorization: Bearer <token>` header before the
//! handler runs.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use ifn_api::{AuthenticatedActor, AuthenticationService};
use ifn_persistence::UserData;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{AppState, ErrorResponse};

/// The authenticated caller of a request.
///
/// # Errors
///
/// Extraction fails with HTTP 401 if:
/// - The Authorization header is missing or not a bearer token
/// - The token is unknown or expired
/// - The user no longer exists or is inactive
pub struct SessionUser {
    /// Request-scoped identity passed to every handler.
    pub actor: AuthenticatedActor,
    /// The caller's stored record.
    pub user: UserData,
    /// The bearer token, kept for logout.
    pub token: String,
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header: &str = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token: &str = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                warn!("Authorization header is not a bearer token");
                SessionError::InvalidAuthorizationHeader
            })?;

        let (actor, user) = AuthenticationService::validate_session(
            &mut *state.persistence.lock().await,
            token,
            OffsetDateTime::now_utc(),
        )
        .map_err(|e| {
            warn!(error = %e, "Session validation failed");
            SessionError::InvalidSession
        })?;

        debug!(user_id = actor.user_id, role = %actor.role, "Session validated");

        Ok(Self {
            actor,
            user,
            token: token.to_string(),
        })
    }
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// The token does not identify a live session of an active user.
    InvalidSession,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: &str = match self {
            Self::MissingAuthorizationHeader => "Missing Authorization header",
            Self::InvalidAuthorizationHeader => {
                "Invalid Authorization header format. Expected: 'Bearer <token>'"
            }
            Self::InvalidSession => "Invalid or expired session",
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                message: message.to_string(),
            }),
        )
            .into_response()
    }
}
