// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure: database gateway, configuration, token machinery, and
//! the PostgreSQL service implementations.

pub mod config;
pub mod db;
pub mod postgres;
pub mod token;
