// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for IFN field assignments.
//!
//! Stores user accounts, sessions, the conglomerate and subplot reference
//! entities, assignments, and the trees and botanical samples recorded in
//! the field in `SQLite` through Diesel. The schema is
//! embedded as Diesel migrations and applied when a connection is opened.
//!
//! ## Storage conventions
//!
//! - Foreign keys are enforced (`PRAGMA foreign_keys = ON`) and verified at
//!   startup.
//! - File databases run in WAL mode.
//! - Timestamps are fixed-width UTC text, so `ORDER BY` on them is
//!   chronological.
//! - An assignment row keeps a `kind` column plus three nullable reference
//!   columns. A CHECK constraint keeps exactly the matching one populated.
//! - Deleting a record that others still reference fails with
//!   `PersistenceError::InUse` instead of cascading.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` gives every caller its own shared-cache
//! in-memory database, so tests never see each other's rows.

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

use diesel::SqliteConnection;
use ifn_domain::{Assignment, AssignmentStatistics};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod timestamps;

#[cfg(test)]
mod tests;

pub use data_models::{
    ConglomerateChanges, ConglomerateData, NewConglomerate, NewSample, NewSubplot, NewTree,
    NewUser, SampleChanges, SampleData, SessionData, SubplotChanges, SubplotData, TreeChanges,
    TreeData, UserChanges, UserData,
};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single `SQLite` connection.
///
/// The connection is synchronous. Async callers wrap the adapter in a mutex
/// and must not hold the lock across unrelated awaits.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_ifn_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Creates a user account.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateEmail` if the email is taken.
    pub fn create_user(&mut self, user: NewUser<'_>) -> Result<i64, PersistenceError> {
        mutations::users::create_user(&mut self.conn, user)
    }

    /// Retrieves a user by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_email(&mut self.conn, email)
    }

    /// Retrieves a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_id(&mut self, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_id(&mut self.conn, user_id)
    }

    /// Lists all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(&mut self) -> Result<Vec<UserData>, PersistenceError> {
        queries::users::list_users(&mut self.conn)
    }

    /// Lists active brigadistas.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_active_brigadistas(&mut self) -> Result<Vec<UserData>, PersistenceError> {
        queries::users::list_active_brigadistas(&mut self.conn)
    }

    /// Counts all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_users(&mut self) -> Result<i64, PersistenceError> {
        queries::users::count_users(&mut self.conn)
    }

    /// Applies field changes to a user account.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the user does not exist, or
    /// `PersistenceError::DuplicateEmail` if the new email is taken.
    pub fn update_user(
        &mut self,
        user_id: i64,
        changes: UserChanges<'_>,
    ) -> Result<(), PersistenceError> {
        mutations::users::update_user(&mut self.conn, user_id, changes)
    }

    /// Deletes a user account and its sessions.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the user does not exist, or
    /// `PersistenceError::InUse` if other records still reference the user.
    pub fn delete_user(&mut self, user_id: i64) -> Result<(), PersistenceError> {
        mutations::users::delete_user(&mut self.conn, user_id)
    }

    /// Verifies a password against a stored bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is malformed.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        queries::users::verify_password(password, password_hash)
    }

    // ========================================================================
    // Session Management
    // ========================================================================

    /// Creates a new session for a user.
    ///
    /// # Arguments
    ///
    /// * `session_token` - The unique session token
    /// * `user_id` - The user ID
    /// * `expires_at` - The expiration timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        user_id: i64,
        expires_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        let expires_at: String = timestamps::encode(expires_at)?;
        mutations::users::create_session(&mut self.conn, session_token, user_id, &expires_at)
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::users::get_session_by_token(&mut self.conn, session_token)
    }

    /// Updates the last activity timestamp for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_session_activity(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        mutations::users::update_session_activity(&mut self.conn, session_id)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::users::delete_session(&mut self.conn, session_token)
    }

    /// Deletes every session that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(&mut self, now: OffsetDateTime) -> Result<usize, PersistenceError> {
        let now: String = timestamps::encode(now)?;
        mutations::users::delete_expired_sessions(&mut self.conn, &now)
    }

    // ========================================================================
    // Reference Entities
    // ========================================================================

    /// Creates a conglomerate.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateCode` if the code is taken.
    pub fn create_conglomerate(
        &mut self,
        conglomerate: NewConglomerate<'_>,
    ) -> Result<i64, PersistenceError> {
        mutations::reference::create_conglomerate(&mut self.conn, conglomerate)
    }

    /// Retrieves a conglomerate by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_conglomerate(
        &mut self,
        conglomerate_id: i64,
    ) -> Result<Option<ConglomerateData>, PersistenceError> {
        queries::reference::get_conglomerate(&mut self.conn, conglomerate_id)
    }

    /// Lists all conglomerates.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_conglomerates(&mut self) -> Result<Vec<ConglomerateData>, PersistenceError> {
        queries::reference::list_conglomerates(&mut self.conn)
    }

    /// Returns true if the conglomerate exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn conglomerate_exists(&mut self, conglomerate_id: i64) -> Result<bool, PersistenceError> {
        queries::reference::conglomerate_exists(&mut self.conn, conglomerate_id)
    }

    /// Returns true if a conglomerate with this code exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn conglomerate_code_exists(&mut self, code: &str) -> Result<bool, PersistenceError> {
        queries::reference::conglomerate_code_exists(&mut self.conn, code)
    }

    /// Applies field changes to a conglomerate.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the conglomerate does not exist.
    pub fn update_conglomerate(
        &mut self,
        conglomerate_id: i64,
        changes: ConglomerateChanges<'_>,
    ) -> Result<(), PersistenceError> {
        mutations::reference::update_conglomerate(&mut self.conn, conglomerate_id, changes)
    }

    /// Deletes a conglomerate.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the conglomerate does not exist,
    /// or `PersistenceError::InUse` if it is still referenced.
    pub fn delete_conglomerate(&mut self, conglomerate_id: i64) -> Result<(), PersistenceError> {
        mutations::reference::delete_conglomerate(&mut self.conn, conglomerate_id)
    }

    /// Creates a subplot.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the parent conglomerate code
    /// does not exist, or another error if the insert fails.
    pub fn create_subplot(&mut self, subplot: NewSubplot<'_>) -> Result<i64, PersistenceError> {
        mutations::reference::create_subplot(&mut self.conn, subplot)
    }

    /// Retrieves a subplot by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_subplot(&mut self, subplot_id: i64) -> Result<Option<SubplotData>, PersistenceError> {
        queries::reference::get_subplot(&mut self.conn, subplot_id)
    }

    /// Lists all subplots.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_subplots(&mut self) -> Result<Vec<SubplotData>, PersistenceError> {
        queries::reference::list_subplots(&mut self.conn)
    }

    /// Lists the subplots of one conglomerate ordered by number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_subplots_for_conglomerate(
        &mut self,
        conglomerate_code: &str,
    ) -> Result<Vec<SubplotData>, PersistenceError> {
        queries::reference::list_subplots_for_conglomerate(&mut self.conn, conglomerate_code)
    }

    /// Returns true if the subplot exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn subplot_exists(&mut self, subplot_id: i64) -> Result<bool, PersistenceError> {
        queries::reference::subplot_exists(&mut self.conn, subplot_id)
    }

    /// Applies field changes to a subplot.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the subplot does not exist.
    pub fn update_subplot(
        &mut self,
        subplot_id: i64,
        changes: SubplotChanges,
    ) -> Result<(), PersistenceError> {
        mutations::reference::update_subplot(&mut self.conn, subplot_id, changes)
    }

    /// Deletes a subplot.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the subplot does not exist, or
    /// `PersistenceError::InUse` if it is still referenced.
    pub fn delete_subplot(&mut self, subplot_id: i64) -> Result<(), PersistenceError> {
        mutations::reference::delete_subplot(&mut self.conn, subplot_id)
    }

    // ========================================================================
    // Field Records
    // ========================================================================

    /// Stores a new tree and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateCode` if the code is taken, or
    /// `PersistenceError::NotFound` if the subplot does not exist.
    pub fn insert_tree(&mut self, tree: NewTree<'_>) -> Result<i64, PersistenceError> {
        mutations::field_records::insert_tree(&mut self.conn, tree)
    }

    /// Retrieves a tree by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    pub fn get_tree(&mut self, tree_id: i64) -> Result<Option<TreeData>, PersistenceError> {
        queries::field_records::get_tree(&mut self.conn, tree_id)
    }

    /// Returns the ID of the tree with this code, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_tree_id_by_code(&mut self, code: &str) -> Result<Option<i64>, PersistenceError> {
        queries::field_records::get_tree_id_by_code(&mut self.conn, code)
    }

    /// Lists every tree, most recently recorded first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn list_trees(&mut self) -> Result<Vec<TreeData>, PersistenceError> {
        queries::field_records::list_trees(&mut self.conn)
    }

    /// Lists the trees of one subplot ordered by individual number.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn list_trees_for_subplot(
        &mut self,
        subplot_id: i64,
    ) -> Result<Vec<TreeData>, PersistenceError> {
        queries::field_records::list_trees_for_subplot(&mut self.conn, subplot_id)
    }

    /// Applies field changes to a tree.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the tree does not exist.
    pub fn update_tree(
        &mut self,
        tree_id: i64,
        changes: TreeChanges<'_>,
    ) -> Result<(), PersistenceError> {
        mutations::field_records::update_tree(&mut self.conn, tree_id, changes)
    }

    /// Deletes a tree.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the tree does not exist.
    pub fn delete_tree(&mut self, tree_id: i64) -> Result<(), PersistenceError> {
        mutations::field_records::delete_tree(&mut self.conn, tree_id)
    }

    /// Stores a new sample and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateCode` if the code is taken.
    pub fn insert_sample(&mut self, sample: NewSample<'_>) -> Result<i64, PersistenceError> {
        mutations::field_records::insert_sample(&mut self.conn, sample)
    }

    /// Retrieves a sample by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    pub fn get_sample(&mut self, sample_id: i64) -> Result<Option<SampleData>, PersistenceError> {
        queries::field_records::get_sample(&mut self.conn, sample_id)
    }

    /// Lists every sample, most recently recorded first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn list_samples(&mut self) -> Result<Vec<SampleData>, PersistenceError> {
        queries::field_records::list_samples(&mut self.conn)
    }

    /// Lists the samples taken from one tree code, most recently collected
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn list_samples_for_tree_code(
        &mut self,
        tree_code: &str,
    ) -> Result<Vec<SampleData>, PersistenceError> {
        queries::field_records::list_samples_for_tree_code(&mut self.conn, tree_code)
    }

    /// Lists the samples one user recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn list_samples_for_user(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<SampleData>, PersistenceError> {
        queries::field_records::list_samples_for_user(&mut self.conn, user_id)
    }

    /// Applies field changes to a sample.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the sample does not exist.
    pub fn update_sample(
        &mut self,
        sample_id: i64,
        changes: SampleChanges<'_>,
    ) -> Result<(), PersistenceError> {
        mutations::field_records::update_sample(&mut self.conn, sample_id, changes)
    }

    /// Deletes a sample.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the sample does not exist.
    pub fn delete_sample(&mut self, sample_id: i64) -> Result<(), PersistenceError> {
        mutations::field_records::delete_sample(&mut self.conn, sample_id)
    }

    // ========================================================================
    // Assignments
    // ========================================================================

    /// Stores a new assignment and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_assignment(&mut self, assignment: &Assignment) -> Result<i64, PersistenceError> {
        mutations::assignments::insert_assignment(&mut self.conn, assignment)
    }

    /// Retrieves an assignment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    pub fn get_assignment(
        &mut self,
        assignment_id: i64,
    ) -> Result<Option<Assignment>, PersistenceError> {
        queries::assignments::get_assignment(&mut self.conn, assignment_id)
    }

    /// Lists every assignment, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn list_assignments(&mut self) -> Result<Vec<Assignment>, PersistenceError> {
        queries::assignments::list_assignments(&mut self.conn)
    }

    /// Lists one brigadista's assignments, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn list_assignments_for_brigadista(
        &mut self,
        brigadista_id: i64,
    ) -> Result<Vec<Assignment>, PersistenceError> {
        queries::assignments::list_assignments_for_brigadista(&mut self.conn, brigadista_id)
    }

    /// Writes the mutable fields of a stored assignment.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the assignment does not exist.
    pub fn update_assignment(&mut self, assignment: &Assignment) -> Result<(), PersistenceError> {
        mutations::assignments::update_assignment(&mut self.conn, assignment)
    }

    /// Permanently deletes an assignment.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the assignment does not exist.
    pub fn delete_assignment(&mut self, assignment_id: i64) -> Result<(), PersistenceError> {
        mutations::assignments::delete_assignment(&mut self.conn, assignment_id)
    }

    /// Computes assignment counts by status, kind and priority.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a stored category is unknown.
    pub fn assignment_statistics(&mut self) -> Result<AssignmentStatistics, PersistenceError> {
        let total: usize = queries::assignments::count_assignments(&mut self.conn)?;
        let by_status: Vec<(String, usize)> =
            queries::assignments::count_assignments_by_status(&mut self.conn)?;
        let by_kind: Vec<(String, usize)> =
            queries::assignments::count_assignments_by_kind(&mut self.conn)?;
        let by_priority: Vec<(String, usize)> =
            queries::assignments::count_assignments_by_priority(&mut self.conn)?;

        AssignmentStatistics::from_grouped(total, &by_status, &by_kind, &by_priority).map_err(|e| {
            PersistenceError::CorruptRecord {
                table: "assignments",
                reason: e.to_string(),
            }
        })
    }
}
