// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: entities, the role/authorization model, and the error
//! taxonomy shared by every workflow component.

pub mod auth;
pub mod catalog;
pub mod enrollment;
pub mod error;
pub mod user;

pub use auth::{Identity, Requirement};
pub use error::{AuthRejection, RegistryError};
pub use user::Role;
