// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Enrollment Workflows
//!
//! Degree, activity, and course-edition enrollment over `sqlx`. Every
//! operation runs all of its reads and writes under one transaction, so a
//! failure anywhere in the middle of a multi-row write leaves nothing
//! behind. Duplicate detection is done twice: a pre-check for a clean error
//! message, and the unique constraint itself for the race the pre-check
//! cannot close.

use async_trait::async_trait;
use sqlx::Row;
use tracing::{info, warn};

use crate::application::enrollment::{
    CourseEditionEnrollRequest, DegreeEnrollRequest, EnrollmentService,
};
use crate::domain::catalog::{Activity, CourseEdition};
use crate::domain::enrollment::{missing_prerequisites, DegreeEnrollment, PASS_THRESHOLD};
use crate::domain::{Identity, RegistryError};
use crate::infrastructure::db::Database;

pub struct PgEnrollmentService {
    db: Database,
}

impl PgEnrollmentService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EnrollmentService for PgEnrollmentService {
    async fn enroll_degree(
        &self,
        _actor: &Identity,
        degree_id: i64,
        request: DegreeEnrollRequest,
    ) -> Result<(), RegistryError> {
        let (student_id, date) = request.validate()?;

        let mut tx = self.db.begin().await?;

        let student = sqlx::query("SELECT 1 FROM student WHERE user_id = $1")
            .bind(student_id)
            .fetch_optional(&mut *tx)
            .await?;
        if student.is_none() {
            return Err(RegistryError::invalid("Student does not exist"));
        }

        let degree = sqlx::query("SELECT 1 FROM degree_program WHERE degree_id = $1")
            .bind(degree_id)
            .fetch_optional(&mut *tx)
            .await?;
        if degree.is_none() {
            return Err(RegistryError::invalid("Degree program does not exist"));
        }

        let duplicate = sqlx::query(
            "SELECT 1 FROM degree_enrollment WHERE student_id = $1 AND degree_id = $2",
        )
        .bind(student_id)
        .bind(degree_id)
        .fetch_optional(&mut *tx)
        .await?;
        if duplicate.is_some() {
            return Err(RegistryError::invalid(
                "Student is already enrolled in this degree",
            ));
        }

        let enrollment = DegreeEnrollment {
            student_id,
            degree_id,
            enrollment_date: date,
        };

        // The tuition debt row is materialized by an insert trigger on this
        // table, inside the same transaction.
        sqlx::query(
            r#"
            INSERT INTO degree_enrollment (student_id, degree_id, enrollment_date)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(enrollment.student_id)
        .bind(enrollment.degree_id)
        .bind(enrollment.enrollment_date)
        .execute(&mut *tx)
        .await
        .map_err(|e| RegistryError::on_unique(e, "Student is already enrolled in this degree"))?;

        tx.commit().await?;
        info!(student_id, degree_id, "student enrolled in degree");
        Ok(())
    }

    async fn enroll_activity(
        &self,
        actor: &Identity,
        activity_id: i64,
    ) -> Result<(), RegistryError> {
        let student_id = actor.user_id;
        let mut tx = self.db.begin().await?;

        let activity = sqlx::query(
            "SELECT activity_id::int8 AS activity_id, name, fee::float8 AS fee
             FROM activity WHERE activity_id = $1",
        )
        .bind(activity_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(activity) = activity else {
            return Err(RegistryError::not_found("Activity does not exist"));
        };
        let activity = Activity {
            activity_id: activity.try_get("activity_id")?,
            name: activity.try_get("name")?,
            fee: activity.try_get("fee")?,
        };

        let duplicate = sqlx::query(
            "SELECT 1 FROM activity_participation WHERE student_id = $1 AND activity_id = $2",
        )
        .bind(student_id)
        .bind(activity_id)
        .fetch_optional(&mut *tx)
        .await?;
        if duplicate.is_some() {
            return Err(RegistryError::conflict(
                "Student is already enrolled in this activity",
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO activity_participation (student_id, activity_id, registration_date)
            VALUES ($1, $2, CURRENT_DATE)
            "#,
        )
        .bind(student_id)
        .bind(activity_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            RegistryError::on_unique(e, "Student is already enrolled in this activity")
        })?;

        // Charge the fee to the student's account in the same transaction.
        let charged = sqlx::query(
            r#"
            UPDATE financial_account
            SET balance = balance + $2::numeric
            WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .bind(activity.fee)
        .execute(&mut *tx)
        .await?;
        if charged.rows_affected() == 0 {
            warn!(student_id, activity_id, "no financial account to charge");
        }

        tx.commit().await?;
        info!(
            student_id,
            activity_id,
            activity = %activity.name,
            fee = activity.fee,
            "student enrolled in activity"
        );
        Ok(())
    }

    async fn enroll_course_edition(
        &self,
        actor: &Identity,
        edition_id: i64,
        request: CourseEditionEnrollRequest,
    ) -> Result<(), RegistryError> {
        let classes = request.validate()?;
        let student_id = actor.user_id;

        let mut tx = self.db.begin().await?;

        let edition = sqlx::query(
            r#"
            SELECT edition_id::int8 AS edition_id, course_code, year,
                   capacity::int8 AS capacity, coordinator_id::int8 AS coordinator_id
            FROM course_edition
            WHERE edition_id = $1
            "#,
        )
        .bind(edition_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = edition else {
            return Err(RegistryError::not_found("Course edition does not exist"));
        };
        let edition = CourseEdition {
            edition_id: row.try_get("edition_id")?,
            course_code: row.try_get("course_code")?,
            year: row.try_get("year")?,
            capacity: row.try_get("capacity")?,
            coordinator_id: row.try_get("coordinator_id")?,
        };

        let enrolled: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM course_enrollment WHERE edition_id = $1")
                .bind(edition_id)
                .fetch_one(&mut *tx)
                .await?;
        if enrolled >= edition.capacity {
            return Err(RegistryError::CapacityExceeded);
        }

        let duplicate = sqlx::query(
            "SELECT 1 FROM course_enrollment WHERE student_id = $1 AND edition_id = $2",
        )
        .bind(student_id)
        .bind(edition_id)
        .fetch_optional(&mut *tx)
        .await?;
        if duplicate.is_some() {
            return Err(RegistryError::conflict(
                "Student is already enrolled in this course edition",
            ));
        }

        let required: Vec<String> = sqlx::query_scalar(
            "SELECT prerequisite_code FROM course_prerequisites WHERE course_code = $1",
        )
        .bind(&edition.course_code)
        .fetch_all(&mut *tx)
        .await?;

        let passed: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT ce.course_code
            FROM course_enrollment en
            JOIN course_edition ce ON ce.edition_id = en.edition_id
            WHERE en.student_id = $1 AND en.grade::float8 >= $2
            "#,
        )
        .bind(student_id)
        .bind(PASS_THRESHOLD)
        .fetch_all(&mut *tx)
        .await?;

        let missing = missing_prerequisites(&required, &passed);
        if !missing.is_empty() {
            warn!(student_id, edition_id, ?missing, "prerequisites not met");
            return Err(RegistryError::PrerequisiteNotMet);
        }

        sqlx::query("INSERT INTO course_enrollment (student_id, edition_id) VALUES ($1, $2)")
            .bind(student_id)
            .bind(edition_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                RegistryError::on_unique(e, "Student is already enrolled in this course edition")
            })?;

        for class_id in classes {
            let belongs =
                sqlx::query("SELECT 1 FROM class WHERE class_id = $1 AND edition_id = $2")
                    .bind(class_id)
                    .bind(edition_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if belongs.is_none() {
                return Err(RegistryError::invalid(format!(
                    "Class {class_id} does not belong to course edition {edition_id}"
                )));
            }
            sqlx::query("INSERT INTO student_class (student_id, class_id) VALUES ($1, $2)")
                .bind(student_id)
                .bind(class_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(
            student_id,
            edition_id,
            classes = classes.len(),
            "student enrolled in course edition"
        );
        Ok(())
    }
}
