// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Grade Submission
//!
//! All-or-nothing grade recording for a course edition. The coordinator
//! check reads the edition row inside the same transaction as the updates,
//! so a coordinator reassignment mid-batch cannot split authority.

use async_trait::async_trait;
use sqlx::Row;
use tracing::{info, warn};

use crate::application::grading::{
    parse_grade_entry, GradeSubmissionOutcome, GradeSubmissionRequest, GradingService,
};
use crate::domain::enrollment::grade_in_range;
use crate::domain::{Identity, RegistryError};
use crate::infrastructure::db::Database;

pub struct PgGradingService {
    db: Database,
}

impl PgGradingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GradingService for PgGradingService {
    async fn submit_grades(
        &self,
        actor: &Identity,
        edition_id: i64,
        request: GradeSubmissionRequest,
    ) -> Result<GradeSubmissionOutcome, RegistryError> {
        let (period, grades) = request.validate()?;

        let mut tx = self.db.begin().await?;

        let edition = sqlx::query(
            "SELECT coordinator_id::int8 AS coordinator_id FROM course_edition WHERE edition_id = $1",
        )
        .bind(edition_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(edition) = edition else {
            return Err(RegistryError::not_found("Course edition does not exist"));
        };
        let coordinator_id: Option<i64> = edition.try_get("coordinator_id")?;
        if coordinator_id != Some(actor.user_id) {
            warn!(
                edition_id,
                actor = actor.user_id,
                "grade submission by non-coordinator refused"
            );
            return Err(RegistryError::Forbidden(
                "Only the course coordinator can submit grades".to_string(),
            ));
        }

        let mut updated = 0u64;
        let mut skipped = 0u64;

        for raw in grades {
            let Some(entry) = parse_grade_entry(raw) else {
                skipped += 1;
                warn!(edition_id, ?raw, "malformed grade entry skipped");
                continue;
            };
            let student_id = entry.student_id;

            let grade = entry.grade.as_f64().filter(|g| grade_in_range(*g)).ok_or_else(
                || RegistryError::invalid(format!("Invalid grade for student {student_id}")),
            )?;

            let enrolled = sqlx::query(
                "SELECT 1 FROM course_enrollment WHERE student_id = $1 AND edition_id = $2",
            )
            .bind(student_id)
            .bind(edition_id)
            .fetch_optional(&mut *tx)
            .await?;
            if enrolled.is_none() {
                return Err(RegistryError::invalid(format!(
                    "Student {student_id} is not enrolled in this course edition"
                )));
            }

            let result = sqlx::query(
                r#"
                UPDATE course_enrollment
                SET grade = $3, evaluation_period = $4
                WHERE student_id = $1 AND edition_id = $2
                "#,
            )
            .bind(student_id)
            .bind(edition_id)
            .bind(grade)
            .bind(period)
            .execute(&mut *tx)
            .await?;
            updated += result.rows_affected();
        }

        tx.commit().await?;
        info!(edition_id, updated, skipped, "grades recorded");
        Ok(GradeSubmissionOutcome { updated, skipped })
    }
}
