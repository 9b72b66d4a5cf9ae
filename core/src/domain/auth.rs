// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Authorization Requirements
//!
//! Declarative per-operation access predicates. Every workflow operation
//! names a [`Requirement`] and evaluates it against the caller's resolved
//! [`Identity`] before any database access; an unauthorized caller never
//! reaches the session gateway.
//!
//! ```text
//! bearer token ─► TokenVerifier ─► Identity { user_id, role }
//!                                      └─ Requirement::check(&identity)
//! ```

use crate::domain::error::RegistryError;
use crate::domain::user::Role;

/// The authenticated caller: subject id plus role, as resolved from a
/// verified bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Access predicate attached to a workflow operation.
///
/// Deny by default: a requirement either passes or the operation fails with
/// `Forbidden` carrying an operator-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Caller must hold exactly this role.
    Role(Role),
    /// Caller must hold the role, or be the named subject themselves.
    RoleOrSelf { role: Role, subject: i64 },
}

impl Requirement {
    /// Evaluate the predicate against a resolved identity.
    pub fn check(&self, identity: &Identity) -> Result<(), RegistryError> {
        match self {
            Requirement::Role(required) => {
                if identity.role == *required {
                    Ok(())
                } else {
                    Err(RegistryError::Forbidden(format!(
                        "operation requires the {} role",
                        required
                    )))
                }
            }
            Requirement::RoleOrSelf { role, subject } => {
                if identity.role == *role || identity.user_id == *subject {
                    Ok(())
                } else {
                    Err(RegistryError::Forbidden(
                        "operation is limited to the account owner".to_string(),
                    ))
                }
            }
        }
    }
}
