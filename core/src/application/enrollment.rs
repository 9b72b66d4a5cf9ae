// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Enrollment Workflow Service
//!
//! Degree, activity, and course-edition enrollment. Each operation runs its
//! reads and writes inside a single transaction; validation failures before
//! the first write short-circuit, and any failure after it rolls everything
//! back.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{Identity, RegistryError};

/// Body of `POST /dbproj/enroll_degree/{degree_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DegreeEnrollRequest {
    pub student_id: Option<i64>,
    /// Enrollment date as `YYYY-MM-DD`.
    pub date: Option<String>,
}

impl DegreeEnrollRequest {
    /// Both fields are required; the date must be a calendar date.
    pub fn validate(&self) -> Result<(i64, NaiveDate), RegistryError> {
        let (Some(student_id), Some(date)) = (self.student_id, self.date.as_deref()) else {
            return Err(RegistryError::invalid("Student ID and date are required"));
        };
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| RegistryError::invalid("Enrollment date must be YYYY-MM-DD"))?;
        Ok((student_id, date))
    }
}

/// Body of `POST /dbproj/enroll_course_edition/{edition_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseEditionEnrollRequest {
    /// Requested class groupings, processed in caller-supplied order.
    #[serde(default)]
    pub classes: Vec<i64>,
}

impl CourseEditionEnrollRequest {
    pub fn validate(&self) -> Result<&[i64], RegistryError> {
        if self.classes.is_empty() {
            return Err(RegistryError::invalid("At least one class ID is required"));
        }
        Ok(&self.classes)
    }
}

#[async_trait]
pub trait EnrollmentService: Send + Sync {
    /// Enroll a student in a degree programme. Admin only. The financial
    /// debt entry is materialized by a database trigger, not by this call.
    async fn enroll_degree(
        &self,
        actor: &Identity,
        degree_id: i64,
        request: DegreeEnrollRequest,
    ) -> Result<(), RegistryError>;

    /// Enroll the calling student in an activity and charge its fee to the
    /// student's financial account. Both writes commit together.
    async fn enroll_activity(&self, actor: &Identity, activity_id: i64)
        -> Result<(), RegistryError>;

    /// Enroll the calling student in a course edition plus the requested
    /// classes. Capacity, duplicate, and prerequisite checks run in that
    /// order; one invalid class id aborts the whole call.
    async fn enroll_course_edition(
        &self,
        actor: &Identity,
        edition_id: i64,
        request: CourseEditionEnrollRequest,
    ) -> Result<(), RegistryError>;
}
