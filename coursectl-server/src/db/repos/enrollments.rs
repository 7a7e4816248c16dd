//! Enrollment repository
//!
//! The only writer that changes membership and the course counter
//! together, inside one transaction.

use std::collections::HashMap;

use sqlx::{PgPool, Row};

use coursectl_core::{CourseId, EnrollmentChange};

use super::DbError;

/// Enrollment repository
pub struct EnrollmentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> EnrollmentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Apply one change to `student_course` and move the counter by its
    /// delta if a row was actually inserted or deleted.
    ///
    /// Insert uses ON CONFLICT DO NOTHING, so a concurrent duplicate
    /// enroll is reported as "no change" rather than an error.
    pub async fn apply(&self, change: EnrollmentChange) -> Result<bool, DbError> {
        let mut tx = self.pool.begin().await?;

        let result = match change {
            EnrollmentChange::Add {
                student_id,
                course_id,
            } => {
                sqlx::query(
                    r#"
                    INSERT INTO student_course (student_id, course_id)
                    VALUES ($1, $2)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(student_id)
                .bind(course_id)
                .execute(&mut *tx)
                .await?
            }
            EnrollmentChange::Remove {
                student_id,
                course_id,
            } => {
                sqlx::query("DELETE FROM student_course WHERE student_id = $1 AND course_id = $2")
                    .bind(student_id)
                    .bind(course_id)
                    .execute(&mut *tx)
                    .await?
            }
        };

        let changed = result.rows_affected() > 0;
        if changed {
            sqlx::query(
                "UPDATE courses SET number_of_students = number_of_students + $2 WHERE id = $1",
            )
            .bind(change.course_id())
            .bind(change.delta())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(changed)
    }

    /// Live membership count per course, for courses with any students.
    pub async fn counts(&self) -> Result<HashMap<CourseId, i64>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT course_id, COUNT(*) AS enrolled
            FROM student_course
            GROUP BY course_id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| (r.get::<i64, _>("course_id"), r.get::<i64, _>("enrolled")))
            .collect())
    }
}
