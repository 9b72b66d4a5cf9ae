// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Account Lifecycle Service
//!
//! Registration of role-typed users, credential login, and the cascading
//! deletion of a student's records.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{Identity, RegistryError, Role};

/// Body of `PUT /dbproj/user`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(&str, &str), RegistryError> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok((username, password))
            }
            _ => Err(RegistryError::invalid("Username and password are required")),
        }
    }
}

/// Body of `POST /dbproj/register/{role}`. `is_coordinator` is only
/// meaningful for instructors and defaults to false.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub is_coordinator: bool,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(&str, &str, &str), RegistryError> {
        match (
            self.username.as_deref(),
            self.email.as_deref(),
            self.password.as_deref(),
        ) {
            (Some(username), Some(email), Some(password))
                if !username.is_empty() && !email.is_empty() && !password.is_empty() =>
            {
                Ok((username, email, password))
            }
            _ => Err(RegistryError::invalid(
                "Username, email, and password are required",
            )),
        }
    }
}

#[async_trait]
pub trait AccountService: Send + Sync {
    /// Check the credential against the user store and issue a bearer token.
    async fn login(&self, request: LoginRequest) -> Result<String, RegistryError>;

    /// Register a user with the given role: a `users` row plus the
    /// role-profile row, in one transaction. Admin only, for every sub-role.
    /// Returns the new user id.
    async fn register(
        &self,
        actor: &Identity,
        role: Role,
        request: RegisterRequest,
    ) -> Result<i64, RegistryError>;

    /// Delete a student and every dependent row, in foreign-key order,
    /// within one transaction. Admin only.
    async fn delete_student(&self, actor: &Identity, student_id: i64)
        -> Result<(), RegistryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_both_fields() {
        let req = LoginRequest {
            username: Some("alice".to_string()),
            password: None,
        };
        assert!(req.validate().is_err());

        let req = LoginRequest {
            username: Some("alice".to_string()),
            password: Some(String::new()),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_register_requires_all_three_fields() {
        let req = RegisterRequest {
            username: Some("alice".to_string()),
            email: None,
            password: Some("pw1".to_string()),
            is_coordinator: false,
        };
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            username: Some("alice".to_string()),
            email: Some("alice@example.edu".to_string()),
            password: Some("pw1".to_string()),
            is_coordinator: false,
        };
        assert_eq!(
            req.validate().unwrap(),
            ("alice", "alice@example.edu", "pw1")
        );
    }
}
