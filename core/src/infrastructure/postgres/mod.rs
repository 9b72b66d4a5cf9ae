// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! PostgreSQL implementations of the application service traits.

pub mod accounts;
pub mod enrollment;
pub mod grading;
pub mod reporting;

pub use accounts::PgAccountService;
pub use enrollment::PgEnrollmentService;
pub use grading::PgGradingService;
pub use reporting::PgReportingService;
