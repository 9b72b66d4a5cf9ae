// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Presentation: the HTTP route table, the response envelope, and bearer
//! credential extraction.

pub mod api;
pub mod auth;
pub mod envelope;

pub use api::{app, AppState};
