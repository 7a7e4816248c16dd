//! Course repository

use sqlx::{FromRow, PgPool};

use coursectl_core::{Course, CourseId, StudentId};

use super::DbError;

#[derive(Debug, Clone, FromRow)]
struct CourseRow {
    id: i64,
    course_name: String,
    teacher_name: String,
    course_description: String,
    number_of_students: i32,
    credit: i32,
}

impl From<CourseRow> for Course {
    fn from(r: CourseRow) -> Self {
        Self {
            id: Some(r.id),
            course_name: r.course_name,
            teacher_name: r.teacher_name,
            course_description: r.course_description,
            number_of_students: r.number_of_students,
            credit: r.credit,
        }
    }
}

/// Course repository
pub struct CourseRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CourseRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Course>, DbError> {
        let rows: Vec<CourseRow> = sqlx::query_as(
            r#"
            SELECT id, course_name, teacher_name, course_description, number_of_students, credit
            FROM courses
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Course::from).collect())
    }

    /// Case-insensitive substring search on the course name.
    pub async fn find_by_name(&self, needle: &str) -> Result<Vec<Course>, DbError> {
        let rows: Vec<CourseRow> = sqlx::query_as(
            r#"
            SELECT id, course_name, teacher_name, course_description, number_of_students, credit
            FROM courses
            WHERE strpos(lower(course_name), lower($1)) > 0
            ORDER BY id
            "#,
        )
        .bind(needle)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Course::from).collect())
    }

    pub async fn get(&self, id: CourseId) -> Result<Course, DbError> {
        let row: CourseRow = sqlx::query_as(
            r#"
            SELECT id, course_name, teacher_name, course_description, number_of_students, credit
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(DbError::NotFound {
            resource: "course",
            id,
        })?;

        Ok(row.into())
    }

    /// Courses a student takes, in enrollment order.
    pub async fn taken_by(&self, student_id: StudentId) -> Result<Vec<Course>, DbError> {
        let rows: Vec<CourseRow> = sqlx::query_as(
            r#"
            SELECT c.id, c.course_name, c.teacher_name, c.course_description,
                   c.number_of_students, c.credit
            FROM courses c
            JOIN student_course sc ON sc.course_id = c.id
            WHERE sc.student_id = $1
            ORDER BY sc.enrolled_at, c.id
            "#,
        )
        .bind(student_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Course::from).collect())
    }

    /// Insert or overwrite every column, counter included.
    pub async fn save(&self, course: &Course) -> Result<CourseId, DbError> {
        match course.id {
            None => {
                let id = sqlx::query_scalar(
                    r#"
                    INSERT INTO courses
                        (course_name, teacher_name, course_description, number_of_students, credit)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id
                    "#,
                )
                .bind(&course.course_name)
                .bind(&course.teacher_name)
                .bind(&course.course_description)
                .bind(course.number_of_students)
                .bind(course.credit)
                .fetch_one(self.pool)
                .await?;
                Ok(id)
            }
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE courses
                    SET course_name = $2, teacher_name = $3, course_description = $4,
                        number_of_students = $5, credit = $6
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(&course.course_name)
                .bind(&course.teacher_name)
                .bind(&course.course_description)
                .bind(course.number_of_students)
                .bind(course.credit)
                .execute(self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::NotFound {
                        resource: "course",
                        id,
                    });
                }
                Ok(id)
            }
        }
    }

    /// Delete a course. Remaining enrollment rows make this a foreign-key
    /// violation.
    pub async fn delete(&self, id: CourseId) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "course",
                id,
            });
        }
        Ok(())
    }

    pub async fn set_count(&self, id: CourseId, count: i32) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE courses SET number_of_students = $2 WHERE id = $1")
            .bind(id)
            .bind(count)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "course",
                id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::{EnrollmentRepo, StudentRepo};
    use crate::db::{create_pool, migrations};
    use coursectl_core::{EnrollmentChange, Student};

    // Run with: DATABASE_URL=postgres://... cargo test -p coursectl-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn delete_with_enrollments_is_refused() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");

        let courses = CourseRepo::new(&pool);
        let students = StudentRepo::new(&pool);
        let course_id = courses
            .save(&Course::new("Databases", "Codd", "Relational model", 6))
            .await
            .expect("course insert failed");
        let student_id = students
            .save(&Student::new("Rashad", "Guliyev", "Computer Science", None))
            .await
            .expect("student insert failed");
        EnrollmentRepo::new(&pool)
            .apply(EnrollmentChange::Add {
                student_id,
                course_id,
            })
            .await
            .expect("enroll failed");

        let err = courses.delete(course_id).await.unwrap_err();
        let err = coursectl_core::StoreError::from(err);
        assert!(matches!(err, coursectl_core::StoreError::ConstraintViolation(_)));

        students.delete(student_id).await.expect("student delete failed");
        courses.delete(course_id).await.expect("course delete failed");
    }
}
