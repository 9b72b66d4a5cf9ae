// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Session Gateway
//!
//! Wraps `sqlx::postgres::PgPool` in a thin `Database` newtype that is
//! injected into every workflow implementation. Each operation acquires one
//! transaction via [`Database::begin`], commits explicitly on success, and
//! relies on transaction drop to roll back every effect on any early
//! return. The pool is the only connection state in the process; there are
//! no module-level globals.

use sqlx::postgres::{PgPool, PgPoolOptions, Postgres};
use sqlx::Transaction;
use anyhow::Result;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Open the single transaction a workflow operation runs under.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Run an operator-supplied SQL script (schema bootstrap, triggers).
    /// Statements run as one batch; used by `aula init-db` only.
    pub async fn execute_script(&self, sql: &str) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(sql).execute(&self.pool).await?;
        Ok(())
    }
}
