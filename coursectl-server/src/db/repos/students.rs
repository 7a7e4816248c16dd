//! Student repository
//!
//! Scalar fields live in `students`; the enrolled-course collection is
//! read from and written to `student_course`.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Row};

use coursectl_core::{CourseId, SortDirection, Student, StudentFilter, StudentId, StudentSortKey};

use super::DbError;

/// Student row without its enrollments
#[derive(Debug, Clone, FromRow)]
struct StudentRow {
    id: i64,
    name: String,
    surname: String,
    major: String,
    date_of_birth: Option<NaiveDate>,
}

impl From<StudentRow> for Student {
    fn from(r: StudentRow) -> Self {
        Self {
            id: Some(r.id),
            name: r.name,
            surname: r.surname,
            major: r.major,
            date_of_birth: r.date_of_birth,
            courses: Vec::new(),
        }
    }
}

const SELECT_STUDENTS: &str = "SELECT id, name, surname, major, date_of_birth FROM students";

/// Student repository
pub struct StudentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> StudentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all students in id order.
    pub async fn list(&self) -> Result<Vec<Student>, DbError> {
        let rows: Vec<StudentRow> = sqlx::query_as(&format!("{SELECT_STUDENTS} ORDER BY id"))
            .fetch_all(self.pool)
            .await?;
        self.with_courses(rows).await
    }

    /// List students ordered by one lowercased property, ties in id order.
    /// Byte order under `COLLATE "C"` keeps this in step with the
    /// in-memory store whatever the database locale is.
    ///
    /// The column name comes from a closed enum, never from user input.
    pub async fn list_ordered(
        &self,
        key: StudentSortKey,
        direction: SortDirection,
    ) -> Result<Vec<Student>, DbError> {
        let sql = format!(
            "{SELECT_STUDENTS} ORDER BY lower({}) COLLATE \"C\" {}, id ASC",
            key.column(),
            direction.sql()
        );
        let rows: Vec<StudentRow> = sqlx::query_as(&sql).fetch_all(self.pool).await?;
        self.with_courses(rows).await
    }

    /// Filtered listing. Substring filters compare lowercased text with
    /// `strpos` so `%` and `_` in the needle match literally.
    pub async fn find(&self, filter: &StudentFilter) -> Result<Vec<Student>, DbError> {
        let (condition, value) = match filter {
            StudentFilter::NameContains(v) => ("strpos(lower(name), lower($1)) > 0", v),
            StudentFilter::SurnameContains(v) => ("strpos(lower(surname), lower($1)) > 0", v),
            StudentFilter::Major(v) => ("major = $1", v),
        };
        let sql = format!("{SELECT_STUDENTS} WHERE {condition} ORDER BY id");
        let rows: Vec<StudentRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_all(self.pool)
            .await?;
        self.with_courses(rows).await
    }

    /// Get a single student by id.
    pub async fn get(&self, id: StudentId) -> Result<Student, DbError> {
        let row: StudentRow = sqlx::query_as(&format!("{SELECT_STUDENTS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(DbError::NotFound {
                resource: "student",
                id,
            })?;

        let mut student = Student::from(row);
        student.courses = self.course_ids(id).await?;
        Ok(student)
    }

    /// Students enrolled in a course.
    pub async fn enrolled_in(&self, course_id: CourseId) -> Result<Vec<Student>, DbError> {
        let rows: Vec<StudentRow> = sqlx::query_as(
            r#"
            SELECT s.id, s.name, s.surname, s.major, s.date_of_birth
            FROM students s
            JOIN student_course sc ON sc.student_id = s.id
            WHERE sc.course_id = $1
            ORDER BY s.id
            "#,
        )
        .bind(course_id)
        .fetch_all(self.pool)
        .await?;
        self.with_courses(rows).await
    }

    /// Upsert scalar fields and replace the enrollment rows (atomic).
    ///
    /// Rows for courses the student keeps are left alone so their
    /// enrollment order survives; new ones are appended in the given order.
    pub async fn save(&self, student: &Student) -> Result<StudentId, DbError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = match student.id {
            None => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO students (name, surname, major, date_of_birth)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(&student.name)
                .bind(&student.surname)
                .bind(&student.major)
                .bind(student.date_of_birth)
                .fetch_one(&mut *tx)
                .await?
            }
            Some(id) => sqlx::query_scalar(
                r#"
                UPDATE students
                SET name = $2, surname = $3, major = $4, date_of_birth = $5
                WHERE id = $1
                RETURNING id
                "#,
            )
            .bind(id)
            .bind(&student.name)
            .bind(&student.surname)
            .bind(&student.major)
            .bind(student.date_of_birth)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound {
                resource: "student",
                id,
            })?,
        };

        sqlx::query("DELETE FROM student_course WHERE student_id = $1 AND NOT (course_id = ANY($2))")
            .bind(id)
            .bind(&student.courses)
            .execute(&mut *tx)
            .await?;

        let kept: Vec<i64> =
            sqlx::query_scalar("SELECT course_id FROM student_course WHERE student_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        // Plain INSERT: a duplicate id in the collection is a PK violation.
        for course_id in student.courses.iter().filter(|c| !kept.contains(c)) {
            sqlx::query("INSERT INTO student_course (student_id, course_id) VALUES ($1, $2)")
                .bind(id)
                .bind(course_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Delete a student; enrollment rows cascade.
    pub async fn delete(&self, id: StudentId) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "student",
                id,
            });
        }
        Ok(())
    }

    async fn course_ids(&self, id: StudentId) -> Result<Vec<CourseId>, DbError> {
        let ids = sqlx::query_scalar(
            "SELECT course_id FROM student_course WHERE student_id = $1 ORDER BY enrolled_at, course_id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }

    /// Attach course ids to a batch of rows with one query.
    async fn with_courses(&self, rows: Vec<StudentRow>) -> Result<Vec<Student>, DbError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let pairs = sqlx::query(
            r#"
            SELECT student_id, course_id
            FROM student_course
            WHERE student_id = ANY($1)
            ORDER BY enrolled_at, course_id
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_student: HashMap<i64, Vec<CourseId>> = HashMap::new();
        for pair in pairs {
            by_student
                .entry(pair.get("student_id"))
                .or_default()
                .push(pair.get("course_id"));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let courses = by_student.remove(&row.id).unwrap_or_default();
                let mut student = Student::from(row);
                student.courses = courses;
                student
            })
            .collect())
    }
}
