// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Aula Core
//!
//! Academic registry service: enrollment, grading, and reporting workflows
//! for a university programme catalogue, served over HTTP against
//! PostgreSQL.
//!
//! Layers, outermost first:
//!
//! - [`presentation`] — the `/dbproj` route table, response envelope, and
//!   bearer credential extraction;
//! - [`application`] — service traits and request validation;
//! - [`domain`] — roles, identities, authorization requirements, grading
//!   rules, and the error taxonomy;
//! - [`infrastructure`] — the PostgreSQL gateway, token machinery, and the
//!   service implementations.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
