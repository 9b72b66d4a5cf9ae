// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Reporting Queries
//!
//! Read-only aggregate views: student transcript, degree roster statistics,
//! top performers, per-district ranking, and the monthly approval report.
//! No operation here mutates state.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Identity, RegistryError};

/// One transcript line of `student_details`, ordered year desc then
/// edition id desc.
#[derive(Debug, Clone, Serialize)]
pub struct StudentCourseRecord {
    pub course_edition_id: i64,
    pub course_name: String,
    pub course_edition_year: i32,
    pub grade: Option<f64>,
    pub evaluation_period: Option<String>,
    pub attendance: Option<i32>,
    pub course_code: String,
    pub coordinator_id: Option<i64>,
    pub coordinator_name: Option<String>,
}

/// Per-edition statistics of `degree_details`. Approval means grade ≥ 9.5.
#[derive(Debug, Clone, Serialize)]
pub struct DegreeEditionStats {
    pub course_id: String,
    pub course_name: String,
    pub course_edition_id: i64,
    pub course_edition_year: i32,
    pub capacity: i64,
    pub enrolled_count: i64,
    pub approved_count: i64,
    pub coordinator_id: Option<i64>,
    pub instructors: Vec<i64>,
}

/// One graded course of a top-ranked student.
#[derive(Debug, Clone, Serialize)]
pub struct TopStudentGrade {
    pub course_edition_id: i64,
    pub course_edition_name: String,
    pub grade: f64,
    pub date: String,
}

/// One of the current year's top three students.
#[derive(Debug, Clone, Serialize)]
pub struct TopStudent {
    pub student_name: String,
    pub average_grade: f64,
    pub grades: Vec<TopStudentGrade>,
    pub activities: Vec<String>,
}

/// The best-ranked student of one district. Ties on average grade break
/// towards the lowest student id.
#[derive(Debug, Clone, Serialize)]
pub struct DistrictTopStudent {
    pub student_id: i64,
    pub district: String,
    pub average_grade: f64,
}

/// One month bucket of the approval report. Buckets derive from the
/// edition year (`YYYY-01`); the schema has no finer-grained grade date.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReportRow {
    pub month: String,
    pub course_edition_id: i64,
    pub course_edition_name: String,
    pub approved: i64,
    pub evaluated: i64,
}

#[async_trait]
pub trait ReportingService: Send + Sync {
    /// Transcript of one student. Admin or the student themselves.
    async fn student_details(
        &self,
        actor: &Identity,
        student_id: i64,
    ) -> Result<Vec<StudentCourseRecord>, RegistryError>;

    /// Enrollment and approval statistics for every edition belonging to a
    /// degree. Admin only.
    async fn degree_details(
        &self,
        actor: &Identity,
        degree_id: i64,
    ) -> Result<Vec<DegreeEditionStats>, RegistryError>;

    /// Top three students of the current year by mean grade, with their
    /// grade breakdown and activity list. Admin only.
    async fn top_three(&self, actor: &Identity) -> Result<Vec<TopStudent>, RegistryError>;

    /// Best student per district by mean grade. Admin only.
    async fn top_by_district(
        &self,
        actor: &Identity,
    ) -> Result<Vec<DistrictTopStudent>, RegistryError>;

    /// Per month bucket, the course edition with the most approvals. Admin
    /// only.
    async fn monthly_report(
        &self,
        actor: &Identity,
    ) -> Result<Vec<MonthlyReportRow>, RegistryError>;
}
