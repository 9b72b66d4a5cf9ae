// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Workflow Error Taxonomy
//!
//! Every workflow operation returns `Result<_, RegistryError>`. Validation
//! and authorization failures are raised before a transaction is opened;
//! once a transaction has begun, any failure rolls the whole operation back
//! before the error surfaces. Database driver detail never crosses the API
//! boundary: it is logged and replaced with a generic `Internal` message.

use thiserror::Error;

/// Why a credential was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No credential, or not a well-formed `Bearer` header.
    MissingToken,
    /// Signature valid but the token is past its expiry.
    ExpiredToken,
    /// Signature or claim verification failed.
    InvalidToken,
    /// Login with an unknown username/password pair.
    BadCredentials,
}

impl AuthRejection {
    pub fn message(&self) -> &'static str {
        match self {
            AuthRejection::MissingToken => "Token missing or invalid",
            AuthRejection::ExpiredToken => "Token expired",
            AuthRejection::InvalidToken => "Invalid token",
            AuthRejection::BadCredentials => "Invalid credentials",
        }
    }
}

/// Failure taxonomy shared by every workflow component.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Missing or malformed input, or a pre-write validation failure.
    #[error("{0}")]
    InvalidArgument(String),

    /// Missing, expired, or unverifiable credential.
    #[error("{}", .0.message())]
    Unauthenticated(AuthRejection),

    /// Valid credential, insufficient role or ownership.
    #[error("{0}")]
    Forbidden(String),

    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness or duplicate violation.
    #[error("{0}")]
    Conflict(String),

    /// The course edition has no remaining seats.
    #[error("Course edition is full")]
    CapacityExceeded,

    /// The student has not passed one or more prerequisite courses.
    #[error("Student does not meet course prerequisites")]
    PrerequisiteNotMet,

    /// Unexpected database or infrastructure failure. The payload is for
    /// the log only; the HTTP layer replaces it with a generic message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        RegistryError::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        RegistryError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        RegistryError::Conflict(msg.into())
    }

    /// Map a write error, naming the uniqueness violation after the
    /// operation it raced. Anything else falls through to the generic
    /// conversion.
    pub fn on_unique(err: sqlx::Error, conflict_msg: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return RegistryError::Conflict(conflict_msg.to_string());
            }
        }
        err.into()
    }
}

impl From<sqlx::Error> for RegistryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // Constraint races between concurrent requests surface here
            // rather than in the pre-checks.
            if db_err.is_unique_violation() {
                return RegistryError::Conflict("duplicate record".to_string());
            }
        }
        RegistryError::Internal(err.to_string())
    }
}
