// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Academic Catalog
//!
//! Reference data the workflows read but never create: degree programmes,
//! courses with their prerequisite edges, yearly course editions, class
//! groupings, and extracurricular activities.

use serde::{Deserialize, Serialize};

/// A degree programme. Static reference data managed outside this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegreeProgram {
    pub degree_id: i64,
    pub name: String,
}

/// A course in the catalog. Prerequisite edges (`course_prerequisites`)
/// form a DAG over course codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub code: String,
    pub name: String,
}

/// A specific year's offering of a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseEdition {
    pub edition_id: i64,
    pub course_code: String,
    pub year: i32,
    pub capacity: i64,
    pub coordinator_id: Option<i64>,
}

/// An extracurricular activity with a participation fee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub activity_id: i64,
    pub name: String,
    pub fee: f64,
}
