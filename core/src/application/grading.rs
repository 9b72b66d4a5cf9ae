// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Grading Workflow Service
//!
//! Grade submission for one course edition, restricted to the edition's
//! coordinator of record. The batch is all-or-nothing: one invalid grade or
//! unenrolled student aborts every update in the call.
//!
//! Entries that are not a well-formed `[student_id, grade]` pair are
//! skipped rather than rejected — inherited wire behavior — but the skip
//! count is reported back instead of being dropped silently.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Identity, RegistryError};

/// Body of `POST /dbproj/submit_grades/{edition_id}`. Grades arrive as
/// `[[student_id, grade], ...]`; malformed members are tolerated, so the
/// list is taken as raw JSON and shaped per entry.
#[derive(Debug, Clone, Deserialize)]
pub struct GradeSubmissionRequest {
    pub period: Option<String>,
    #[serde(default)]
    pub grades: Vec<Value>,
}

impl GradeSubmissionRequest {
    /// Period and a non-empty grade list are both required.
    pub fn validate(&self) -> Result<(&str, &[Value]), RegistryError> {
        match self.period.as_deref() {
            Some(period) if !period.is_empty() && !self.grades.is_empty() => {
                Ok((period, &self.grades))
            }
            _ => Err(RegistryError::invalid(
                "Evaluation period and grades are required",
            )),
        }
    }
}

/// One well-formed entry: the student and the raw grade value, which still
/// has to pass the 0–20 range check.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeEntry {
    pub student_id: i64,
    pub grade: Value,
}

/// Shape a raw wire entry into a `[student_id, grade]` pair.
/// Anything else — wrong arity, non-array, non-integer student id —
/// returns `None` and counts as skipped.
pub fn parse_grade_entry(value: &Value) -> Option<GradeEntry> {
    let pair = value.as_array()?;
    if pair.len() != 2 {
        return None;
    }
    let student_id = pair[0].as_i64()?;
    Some(GradeEntry {
        student_id,
        grade: pair[1].clone(),
    })
}

/// Result of a grade submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeSubmissionOutcome {
    /// Enrollment rows updated with a grade and evaluation period.
    pub updated: u64,
    /// Malformed entries that were tolerated and dropped.
    pub skipped: u64,
}

#[async_trait]
pub trait GradingService: Send + Sync {
    /// Record grades for an edition. Caller must be an instructor and the
    /// edition's coordinator; all updates share one transaction.
    async fn submit_grades(
        &self,
        actor: &Identity,
        edition_id: i64,
        request: GradeSubmissionRequest,
    ) -> Result<GradeSubmissionOutcome, RegistryError>;
}
