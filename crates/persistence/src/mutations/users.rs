// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and session mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::backend::sqlite::{get_last_insert_rowid, is_foreign_key_violation, is_unique_violation};
use crate::data_models::{NewUser, UserChanges};
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

/// Creates a new user.
///
/// The email is normalized to lowercase and the password is hashed with
/// bcrypt before storage.
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateEmail` if the email is taken, or
/// another error if the insert fails.
pub fn create_user(conn: &mut SqliteConnection, user: NewUser<'_>) -> Result<i64, PersistenceError> {
    let normalized_email: String = user.email.trim().to_lowercase();

    info!(email = %normalized_email, role = user.role, "Creating user");

    let password_hash: String = bcrypt::hash(user.password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::insert_into(users::table)
        .values((
            users::name.eq(user.name.trim()),
            users::email.eq(&normalized_email),
            users::password_hash.eq(&password_hash),
            users::role.eq(user.role),
            users::zone.eq(user.zone.trim()),
        ))
        .execute(conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                PersistenceError::DuplicateEmail(normalized_email.clone())
            } else {
                PersistenceError::from(e)
            }
        })?;

    let user_id: i64 = get_last_insert_rowid(conn)?;

    info!(user_id, "User created");
    Ok(user_id)
}

#[derive(AsChangeset)]
#[diesel(table_name = users)]
struct UserChangeset<'a> {
    name: Option<&'a str>,
    email: Option<String>,
    password_hash: Option<String>,
    zone: Option<&'a str>,
    status: Option<&'a str>,
}

/// Applies field changes to a user account.
///
/// A new email is normalized to lowercase and a new password is hashed,
/// as on creation.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the user does not exist, or
/// `PersistenceError::DuplicateEmail` if the new email is taken.
pub fn update_user(
    conn: &mut SqliteConnection,
    user_id: i64,
    changes: UserChanges<'_>,
) -> Result<(), PersistenceError> {
    let target = users::table.filter(users::user_id.eq(user_id));

    if changes.is_empty() {
        let found: bool = diesel::select(diesel::dsl::exists(target)).get_result(conn)?;
        return if found {
            Ok(())
        } else {
            Err(PersistenceError::NotFound(format!("User with ID {user_id} not found")))
        };
    }

    let email: Option<String> = changes.email.map(|email| email.trim().to_lowercase());
    let password_hash: Option<String> = changes
        .password
        .map(|password| bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .transpose()
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    let rows_affected: usize = diesel::update(target)
        .set(&UserChangeset {
            name: changes.name.map(str::trim),
            email: email.clone(),
            password_hash,
            zone: changes.zone.map(str::trim),
            status: changes.status,
        })
        .execute(conn)
        .map_err(|e| {
            if is_unique_violation(&e) {
                PersistenceError::DuplicateEmail(email.clone().unwrap_or_default())
            } else {
                PersistenceError::from(e)
            }
        })?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!("User with ID {user_id} not found")));
    }

    info!(user_id, password_changed = changes.password.is_some(), "User updated");
    Ok(())
}

/// Deletes a user account and its sessions.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the user does not exist, or
/// `PersistenceError::InUse` if assignments or field records still
/// reference the user.
pub fn delete_user(conn: &mut SqliteConnection, user_id: i64) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(users::table)
        .filter(users::user_id.eq(user_id))
        .execute(conn)
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                PersistenceError::InUse(format!(
                    "User {user_id} still has assignments or field records"
                ))
            } else {
                PersistenceError::from(e)
            }
        })?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!("User with ID {user_id} not found")));
    }

    info!(user_id, "User deleted");
    Ok(())
}

/// Creates a new session for a user.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The unique session token
/// * `user_id` - The user ID
/// * `expires_at` - The encoded expiration timestamp
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    user_id: i64,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = get_last_insert_rowid(conn)?;

    debug!(session_id, user_id, expires_at, "Session created");
    Ok(session_id)
}

/// Updates the last activity timestamp for a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut SqliteConnection,
    session_id: i64,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(
            sessions::last_activity_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(
                "CURRENT_TIMESTAMP",
            )),
        )
        .execute(conn)?;

    Ok(())
}

/// Deletes a session by token.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(conn: &mut SqliteConnection, session_token: &str) -> Result<(), PersistenceError> {
    debug!("Deleting session by token");

    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    Ok(())
}

/// Deletes all sessions that expired before `now`.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `now` - The encoded current timestamp
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: &str,
) -> Result<usize, PersistenceError> {
    let deleted: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(now))
        .execute(conn)?;

    if deleted > 0 {
        info!(deleted, "Deleted expired sessions");
    }
    Ok(deleted)
}
