// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Account Lifecycle
//!
//! Credential login, role-typed registration, and the cascading student
//! deletion. Registration and deletion each run under one transaction;
//! deletion walks the dependent tables in foreign-key order and re-reads
//! afterwards to confirm the user row is gone.

use async_trait::async_trait;
use sqlx::Row;
use tracing::{info, warn};

use crate::application::accounts::{AccountService, LoginRequest, RegisterRequest};
use crate::domain::{AuthRejection, Identity, RegistryError, Role};
use crate::infrastructure::db::Database;
use crate::infrastructure::token::TokenIssuer;

pub struct PgAccountService {
    db: Database,
    tokens: TokenIssuer,
}

impl PgAccountService {
    pub fn new(db: Database, tokens: TokenIssuer) -> Self {
        Self { db, tokens }
    }
}

#[async_trait]
impl AccountService for PgAccountService {
    async fn login(&self, request: LoginRequest) -> Result<String, RegistryError> {
        let (username, password) = request.validate()?;

        let row = sqlx::query(
            r#"
            SELECT user_id, role
            FROM users
            WHERE username = $1 AND password = $2
            "#,
        )
        .bind(username)
        .bind(password)
        .fetch_optional(self.db.pool())
        .await?;

        let Some(row) = row else {
            warn!(username, "login rejected");
            return Err(RegistryError::Unauthenticated(AuthRejection::BadCredentials));
        };

        let user_id: i64 = row.try_get("user_id")?;
        let role: Role = row
            .try_get::<String, _>("role")?
            .parse()
            .map_err(|e| RegistryError::Internal(format!("corrupt role column: {e}")))?;

        let token = self.tokens.issue(&Identity::new(user_id, role))?;
        info!(username, user_id, "user logged in");
        Ok(token)
    }

    async fn register(
        &self,
        _actor: &Identity,
        role: Role,
        request: RegisterRequest,
    ) -> Result<i64, RegistryError> {
        let (username, email, password) = request.validate()?;

        let mut tx = self.db.begin().await?;

        let user_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password, email, role)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id
            "#,
        )
        .bind(username)
        .bind(password)
        .bind(email)
        .bind(role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RegistryError::on_unique(e, "Username already exists"))?;

        match role {
            Role::Student => {
                sqlx::query("INSERT INTO student (user_id) VALUES ($1)")
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            }
            Role::Admin => {
                sqlx::query("INSERT INTO admin (user_id) VALUES ($1)")
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            }
            Role::Instructor => {
                sqlx::query("INSERT INTO instructor (user_id, is_coordinator) VALUES ($1, $2)")
                    .bind(user_id)
                    .bind(request.is_coordinator)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        info!(username, user_id, %role, "user registered");
        Ok(user_id)
    }

    async fn delete_student(
        &self,
        _actor: &Identity,
        student_id: i64,
    ) -> Result<(), RegistryError> {
        let mut tx = self.db.begin().await?;

        let exists = sqlx::query("SELECT 1 FROM users WHERE user_id = $1 AND role = 'student'")
            .bind(student_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(RegistryError::not_found("Student does not exist"));
        }

        // Dependents first, user row last.
        for statement in [
            "DELETE FROM activity_participation WHERE student_id = $1",
            "DELETE FROM student_class WHERE student_id = $1",
            "DELETE FROM course_enrollment WHERE student_id = $1",
            "DELETE FROM financial_account WHERE student_id = $1",
            "DELETE FROM degree_enrollment WHERE student_id = $1",
            "DELETE FROM academic_record WHERE student_id = $1",
            "DELETE FROM student WHERE user_id = $1",
            "DELETE FROM users WHERE user_id = $1",
        ] {
            sqlx::query(statement)
                .bind(student_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        // Confirm absence after commit.
        let survivor = sqlx::query("SELECT 1 FROM users WHERE user_id = $1")
            .bind(student_id)
            .fetch_optional(self.db.pool())
            .await?;
        if survivor.is_some() {
            return Err(RegistryError::Internal(format!(
                "user {student_id} survived deletion"
            )));
        }

        info!(student_id, "student records deleted");
        Ok(())
    }
}
