// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Enrollment Records
//!
//! Rows the workflow engine writes: degree enrollments, course-edition
//! enrollments with their eventual grade, class memberships, and activity
//! participations. Also the two numeric rules every grading path shares:
//! the 0–20 grade scale and the 9.5 approval threshold.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A grade at or above this value counts as an approval and satisfies
/// prerequisite edges.
pub const PASS_THRESHOLD: f64 = 9.5;

/// Inclusive bounds of the grading scale.
pub const GRADE_MIN: f64 = 0.0;
pub const GRADE_MAX: f64 = 20.0;

/// Whether a submitted grade is on the 0–20 scale.
pub fn grade_in_range(grade: f64) -> bool {
    grade.is_finite() && (GRADE_MIN..=GRADE_MAX).contains(&grade)
}

/// Prerequisites minus passed courses. An empty result means the student
/// may enroll; a non-empty one lists every unmet prerequisite code.
pub fn missing_prerequisites(prerequisites: &[String], passed: &[String]) -> Vec<String> {
    let passed: HashSet<&str> = passed.iter().map(String::as_str).collect();
    prerequisites
        .iter()
        .filter(|code| !passed.contains(code.as_str()))
        .cloned()
        .collect()
}

/// A student's enrollment in a degree programme. Creating one triggers the
/// financial debt entry on the database side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegreeEnrollment {
    pub student_id: i64,
    pub degree_id: i64,
    pub enrollment_date: NaiveDate,
}

/// A student's enrollment in one course edition. Grade and period stay
/// null until the coordinator submits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseEnrollment {
    pub student_id: i64,
    pub edition_id: i64,
    pub grade: Option<f64>,
    pub evaluation_period: Option<String>,
}

/// A student's registration in an activity; the fee lands on the
/// financial account in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityParticipation {
    pub student_id: i64,
    pub activity_id: i64,
    pub registration_date: NaiveDate,
}

/// Per-student running balance of owed fees. Provisioned by a database
/// trigger on degree enrollment, never inserted by the workflow layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialAccount {
    pub student_id: i64,
    pub balance: f64,
}
