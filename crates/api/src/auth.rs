// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use std::str::FromStr;

use ifn_domain::Assignment;
use ifn_persistence::{Persistence, PersistenceError, SessionData, UserData};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::AuthError;

/// User roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Administrators create, re-prioritise and delete assignments and
    /// manage user accounts.
    Admin,
    /// Field workers. A brigadista may only read and update the
    /// assignments they own.
    Brigadista,
}

impl Role {
    /// Returns the stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Brigadista => "brigadista",
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "brigadista" => Ok(Self::Brigadista),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {s}"),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The caller of a request, resolved from its bearer token.
///
/// Built once per request and passed explicitly into every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user ID of the caller.
    pub user_id: i64,
    /// The caller's role.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Returns true if the actor has the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor is an administrator.
    ///
    /// # Arguments
    ///
    /// * `actor` - The authenticated actor
    /// * `action` - The attempted action, used in the error
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` if the actor is not an administrator.
    pub fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Brigadista => Err(AuthError::Forbidden {
                action: action.to_string(),
                required: String::from("admin role"),
            }),
        }
    }

    /// Checks that the actor is an administrator or the user `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` if the actor is neither.
    pub fn require_self_or_admin(
        actor: &AuthenticatedActor,
        owner_id: i64,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || actor.user_id == owner_id {
            return Ok(());
        }
        Err(AuthError::Forbidden {
            action: action.to_string(),
            required: String::from("admin role or record ownership"),
        })
    }

    /// Checks that the actor may update an assignment.
    ///
    /// Administrators may update any assignment; brigadistas only their own.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` if the actor is neither an
    /// administrator nor the owner.
    pub fn authorize_assignment_update(
        actor: &AuthenticatedActor,
        assignment: &Assignment,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || assignment.is_owned_by(actor.user_id) {
            return Ok(());
        }
        Err(AuthError::Forbidden {
            action: String::from("update_assignment"),
            required: String::from("admin role or assignment ownership"),
        })
    }
}

/// Authentication service for bearer-token sessions.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session lifetime.
    pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::hours(24);

    /// Verifies credentials and opens a session.
    ///
    /// Unknown emails, wrong passwords and inactive accounts all fail with
    /// the same reason; the specific cause is only logged.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `email` - The login email (case-insensitive)
    /// * `password` - The plain text password
    /// * `lifetime` - How long the session stays valid
    /// * `now` - The current time
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `expires_at`, `user`)
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub fn login(
        persistence: &mut Persistence,
        email: &str,
        password: &str,
        lifetime: Duration,
        now: OffsetDateTime,
    ) -> Result<(String, OffsetDateTime, UserData), AuthError> {
        let invalid_credentials = || AuthError::AuthenticationFailed {
            reason: String::from("Invalid credentials"),
        };

        let Some(user) = persistence
            .get_user_by_email(email)
            .map_err(Self::map_persistence_error)?
        else {
            info!(email, "Login rejected: unknown email");
            return Err(invalid_credentials());
        };

        let password_matches: bool = persistence
            .verify_password(password, &user.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !password_matches {
            info!(user_id = user.user_id, "Login rejected: wrong password");
            return Err(invalid_credentials());
        }

        if !user.is_active() {
            info!(user_id = user.user_id, "Login rejected: inactive account");
            return Err(invalid_credentials());
        }

        let _: Role = Role::from_str(&user.role)?;

        let session_token: String = Self::generate_session_token();
        let expires_at: OffsetDateTime = now + lifetime;

        persistence
            .create_session(&session_token, user.user_id, expires_at)
            .map_err(Self::map_persistence_error)?;

        info!(user_id = user.user_id, role = %user.role, "User logged in");
        Ok((session_token, expires_at, user))
    }

    /// Resolves a bearer token into the acting user.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `session_token` - The bearer token
    /// * `now` - The current time
    ///
    /// # Returns
    ///
    /// A tuple of (`authenticated_actor`, `user`)
    ///
    /// # Errors
    ///
    /// Returns an error if the token is unknown or expired, or the user is
    /// missing or inactive.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<(AuthenticatedActor, UserData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime =
            OffsetDateTime::parse(&session.expires_at, &Rfc3339).map_err(|e| {
                AuthError::AuthenticationFailed {
                    reason: format!("Failed to parse session expiration: {e}"),
                }
            })?;

        if now >= expires_at {
            debug!(session_id = session.session_id, "Session expired");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: UserData = persistence
            .get_user_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;

        if !user.is_active() {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("User is inactive"),
            });
        }

        let role: Role = Role::from_str(&user.role)?;

        persistence
            .update_session_activity(session.session_id)
            .map_err(Self::map_persistence_error)?;

        Ok((AuthenticatedActor::new(user.user_id, role), user))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)?;
        Ok(())
    }

    /// Removes sessions that have expired.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn purge_expired_sessions(persistence: &mut Persistence, now: OffsetDateTime) {
        if let Err(e) = persistence.delete_expired_sessions(now) {
            warn!(error = %e, "Failed to purge expired sessions");
        }
    }

    /// Generates an opaque 256-bit session token.
    fn generate_session_token() -> String {
        format!(
            "{:032x}{:032x}",
            rand::random::<u128>(),
            rand::random::<u128>()
        )
    }

    fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::AuthenticationFailed {
            reason: format!("Database error: {err}"),
        }
    }
}
