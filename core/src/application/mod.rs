// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application layer: one service trait per workflow component, plus the
//! request/response types the HTTP surface binds to. Implementations live
//! in `crate::infrastructure::postgres`.

pub mod accounts;
pub mod enrollment;
pub mod grading;
pub mod reporting;

pub use accounts::{AccountService, LoginRequest, RegisterRequest};
pub use enrollment::{CourseEditionEnrollRequest, DegreeEnrollRequest, EnrollmentService};
pub use grading::{GradeSubmissionOutcome, GradeSubmissionRequest, GradingService};
pub use reporting::ReportingService;
