// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use ifn_domain::DomainError;
use ifn_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor lacks the role or ownership the action requires.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// What the action requires.
        required: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Forbidden { action, required } => {
                write!(f, "Forbidden: '{action}' requires {required}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract. Each variant corresponds to one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed (401).
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor lacks the role or ownership required (403).
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// What the action requires.
        required: String,
    },
    /// Invalid input was provided (400).
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested or referenced resource was not found (404).
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The operation conflicts with records that depend on the target (409).
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred (500).
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Builds a `ResourceNotFound` error.
    pub(crate) fn not_found(resource_type: &str, message: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message: message.into(),
        }
    }

    /// Builds an `InvalidInput` error.
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Forbidden { action, required } => {
                write!(f, "Forbidden: '{action}' requires {required}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Forbidden { action, required } => Self::Forbidden { action, required },
        }
    }
}

/// Translates a domain error into an API error.
///
/// Every domain error is a rejected input.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let field: &str = match &err {
        DomainError::InvalidAssignmentType(_) => "type",
        DomainError::InvalidStatus(_) => "status",
        DomainError::InvalidPriority(_) => "priority",
        DomainError::InvalidProgress { .. } => "progress",
        DomainError::MissingTargetReference { kind } => match kind {
            ifn_domain::AssignmentKind::Conglomerate => "conglomerate",
            ifn_domain::AssignmentKind::Subplot => "subplot",
            ifn_domain::AssignmentKind::Zone => "zoneId",
        },
        DomainError::InconsistentTarget { .. } => "target",
        DomainError::InvalidConglomerateCode(_)
        | DomainError::InvalidTreeCode(_)
        | DomainError::InvalidSampleCode(_) => "code",
        DomainError::InvalidTreeCondition(_) | DomainError::InvalidSampleCondition(_) => {
            "condition"
        }
        DomainError::InvalidSampleKind(_) => "type",
        DomainError::InvalidSampleStatus(_) => "status",
        DomainError::InvalidTimestamp { field, .. }
        | DomainError::TimestampOutOfRange { field, .. } => field.as_str(),
    };
    ApiError::invalid(field, err.to_string())
}

/// Translates a persistence error into an API error.
///
/// Missing records become `ResourceNotFound`, uniqueness conflicts become
/// `InvalidInput`, deletes blocked by references become `Conflict`, and
/// everything else is internal.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::not_found("Record", message),
        PersistenceError::DuplicateEmail(email) => {
            ApiError::invalid("email", format!("A user with email '{email}' already exists"))
        }
        PersistenceError::DuplicateCode { entity, code } => {
            ApiError::invalid("code", format!("A {entity} with code '{code}' already exists"))
        }
        PersistenceError::InUse(message) => ApiError::Conflict { message },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
