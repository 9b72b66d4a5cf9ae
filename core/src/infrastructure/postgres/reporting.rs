// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Reporting Queries
//!
//! The read-only aggregate views. Each runs straight against the pool
//! without a transaction. Grades are stored as NUMERIC and cast to
//! `float8` at the read edge; ids cast to `int8` so every row maps onto
//! the i64-based DTOs without a decimal type in the crate.

use async_trait::async_trait;
use sqlx::Row;

use crate::application::reporting::{
    DegreeEditionStats, DistrictTopStudent, MonthlyReportRow, ReportingService,
    StudentCourseRecord, TopStudent, TopStudentGrade,
};
use crate::domain::enrollment::PASS_THRESHOLD;
use crate::domain::{Identity, RegistryError};
use crate::infrastructure::db::Database;

pub struct PgReportingService {
    db: Database,
}

impl PgReportingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReportingService for PgReportingService {
    async fn student_details(
        &self,
        _actor: &Identity,
        student_id: i64,
    ) -> Result<Vec<StudentCourseRecord>, RegistryError> {
        let rows = sqlx::query(
            r#"
            SELECT en.edition_id::int8 AS course_edition_id,
                   c.name AS course_name,
                   ce.year,
                   en.grade::float8 AS grade,
                   en.evaluation_period,
                   en.attendance,
                   ce.course_code,
                   ce.coordinator_id::int8 AS coordinator_id,
                   u.username AS coordinator_name
            FROM course_enrollment en
            JOIN course_edition ce ON ce.edition_id = en.edition_id
            JOIN course c ON c.code = ce.course_code
            LEFT JOIN users u ON u.user_id = ce.coordinator_id
            WHERE en.student_id = $1
            ORDER BY ce.year DESC, en.edition_id DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(StudentCourseRecord {
                    course_edition_id: row.try_get("course_edition_id")?,
                    course_name: row.try_get("course_name")?,
                    course_edition_year: row.try_get("year")?,
                    grade: row.try_get("grade")?,
                    evaluation_period: row.try_get("evaluation_period")?,
                    attendance: row.try_get("attendance")?,
                    course_code: row.try_get("course_code")?,
                    coordinator_id: row.try_get("coordinator_id")?,
                    coordinator_name: row.try_get("coordinator_name")?,
                })
            })
            .collect()
    }

    async fn degree_details(
        &self,
        _actor: &Identity,
        degree_id: i64,
    ) -> Result<Vec<DegreeEditionStats>, RegistryError> {
        let rows = sqlx::query(
            r#"
            SELECT c.code AS course_id,
                   c.name AS course_name,
                   ce.edition_id::int8 AS course_edition_id,
                   ce.year,
                   ce.capacity::int8 AS capacity,
                   COUNT(DISTINCT en.student_id) AS enrolled_count,
                   COUNT(DISTINCT en.student_id)
                       FILTER (WHERE en.grade::float8 >= $2) AS approved_count,
                   ce.coordinator_id::int8 AS coordinator_id,
                   ARRAY_REMOVE(ARRAY_AGG(DISTINCT ia.instructor_id::int8), NULL) AS instructors
            FROM course_edition ce
            JOIN course c ON c.code = ce.course_code
            JOIN degree_courses dc ON dc.course_code = c.code AND dc.degree_id = $1
            LEFT JOIN course_enrollment en ON en.edition_id = ce.edition_id
            LEFT JOIN instructor_assignment ia ON ia.edition_id = ce.edition_id
            GROUP BY c.code, c.name, ce.edition_id, ce.year,
                     ce.capacity, ce.coordinator_id
            ORDER BY ce.year DESC, c.code
            "#,
        )
        .bind(degree_id)
        .bind(PASS_THRESHOLD)
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(DegreeEditionStats {
                    course_id: row.try_get("course_id")?,
                    course_name: row.try_get("course_name")?,
                    course_edition_id: row.try_get("course_edition_id")?,
                    course_edition_year: row.try_get("year")?,
                    capacity: row.try_get("capacity")?,
                    enrolled_count: row.try_get("enrolled_count")?,
                    approved_count: row.try_get("approved_count")?,
                    coordinator_id: row.try_get("coordinator_id")?,
                    instructors: row.try_get("instructors")?,
                })
            })
            .collect()
    }

    async fn top_three(&self, _actor: &Identity) -> Result<Vec<TopStudent>, RegistryError> {
        // Current-year ranking; ties break towards the lowest student id.
        let ranked = sqlx::query(
            r#"
            WITH ranked AS (
                SELECT s.user_id AS student_id,
                       s.name AS student_name,
                       AVG(en.grade::float8) AS average_grade
                FROM course_enrollment en
                JOIN course_edition ce ON ce.edition_id = en.edition_id
                JOIN student s ON s.user_id = en.student_id
                WHERE en.grade IS NOT NULL
                  AND ce.year = EXTRACT(YEAR FROM CURRENT_DATE)::int
                GROUP BY s.user_id, s.name
                ORDER BY average_grade DESC, s.user_id ASC
                LIMIT 3
            )
            SELECT student_id::int8 AS student_id, student_name, average_grade
            FROM ranked
            ORDER BY average_grade DESC, student_id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        let mut top = Vec::with_capacity(ranked.len());
        for row in ranked {
            let student_id: i64 = row.try_get("student_id")?;
            let student_name: String = row.try_get("student_name")?;
            let average_grade: f64 = row.try_get("average_grade")?;

            let grade_rows = sqlx::query(
                r#"
                SELECT en.edition_id::int8 AS course_edition_id,
                       c.name || ' - ' || ce.year::text AS course_edition_name,
                       en.grade::float8 AS grade,
                       ce.year::text || '-01-01' AS date
                FROM course_enrollment en
                JOIN course_edition ce ON ce.edition_id = en.edition_id
                JOIN course c ON c.code = ce.course_code
                WHERE en.student_id = $1
                  AND en.grade IS NOT NULL
                  AND ce.year = EXTRACT(YEAR FROM CURRENT_DATE)::int
                ORDER BY en.grade::float8 DESC, en.edition_id ASC
                "#,
            )
            .bind(student_id)
            .fetch_all(self.db.pool())
            .await?;

            let mut grades = Vec::with_capacity(grade_rows.len());
            for grade_row in grade_rows {
                grades.push(TopStudentGrade {
                    course_edition_id: grade_row.try_get("course_edition_id")?,
                    course_edition_name: grade_row.try_get("course_edition_name")?,
                    grade: grade_row.try_get("grade")?,
                    date: grade_row.try_get("date")?,
                });
            }

            let activities: Vec<String> = sqlx::query_scalar(
                r#"
                SELECT a.name
                FROM activity_participation ap
                JOIN activity a ON a.activity_id = ap.activity_id
                WHERE ap.student_id = $1
                ORDER BY a.name
                "#,
            )
            .bind(student_id)
            .fetch_all(self.db.pool())
            .await?;

            top.push(TopStudent {
                student_name,
                average_grade,
                grades,
                activities,
            });
        }

        Ok(top)
    }

    async fn top_by_district(
        &self,
        _actor: &Identity,
    ) -> Result<Vec<DistrictTopStudent>, RegistryError> {
        let rows = sqlx::query(
            r#"
            WITH averages AS (
                SELECT s.user_id AS student_id,
                       s.district,
                       AVG(en.grade::float8) AS average_grade
                FROM student s
                JOIN course_enrollment en ON en.student_id = s.user_id
                WHERE en.grade IS NOT NULL AND s.district IS NOT NULL
                GROUP BY s.user_id, s.district
            ),
            ranked AS (
                SELECT student_id, district, average_grade,
                       RANK() OVER (
                           PARTITION BY district
                           ORDER BY average_grade DESC, student_id ASC
                       ) AS position
                FROM averages
            )
            SELECT student_id::int8 AS student_id, district, average_grade
            FROM ranked
            WHERE position = 1
            ORDER BY district
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(DistrictTopStudent {
                    student_id: row.try_get("student_id")?,
                    district: row.try_get("district")?,
                    average_grade: row.try_get("average_grade")?,
                })
            })
            .collect()
    }

    async fn monthly_report(
        &self,
        _actor: &Identity,
    ) -> Result<Vec<MonthlyReportRow>, RegistryError> {
        // The schema carries no per-grade date, only the edition year, so
        // buckets collapse to the YYYY-01 month of each edition's year.
        let rows = sqlx::query(
            r#"
            WITH per_edition AS (
                SELECT TO_CHAR(MAKE_DATE(ce.year, 1, 1), 'YYYY-MM') AS month,
                       ce.edition_id::int8 AS course_edition_id,
                       c.name AS course_edition_name,
                       COUNT(*) FILTER (WHERE en.grade::float8 >= $1) AS approved,
                       COUNT(*) AS evaluated
                FROM course_enrollment en
                JOIN course_edition ce ON ce.edition_id = en.edition_id
                JOIN course c ON c.code = ce.course_code
                WHERE en.grade IS NOT NULL
                  AND ce.year >= EXTRACT(YEAR FROM CURRENT_DATE)::int - 1
                GROUP BY ce.year, ce.edition_id, c.name
            )
            SELECT DISTINCT ON (month)
                   month, course_edition_id, course_edition_name, approved, evaluated
            FROM per_edition
            ORDER BY month DESC, approved DESC, course_edition_id ASC
            "#,
        )
        .bind(PASS_THRESHOLD)
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(MonthlyReportRow {
                    month: row.try_get("month")?,
                    course_edition_id: row.try_get("course_edition_id")?,
                    course_edition_name: row.try_get("course_edition_name")?,
                    approved: row.try_get("approved")?,
                    evaluated: row.try_get("evaluated")?,
                })
            })
            .collect()
    }
}
