//! Schema migrations for the records tables
//!
//! Idempotent; safe to run on every startup.

use sqlx::PgPool;

/// Create tables and indexes if they do not exist yet
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running coursectl migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL DEFAULT '',
            surname TEXT NOT NULL DEFAULT '',
            major TEXT NOT NULL DEFAULT '',
            date_of_birth DATE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id BIGSERIAL PRIMARY KEY,
            course_name TEXT NOT NULL DEFAULT '',
            teacher_name TEXT NOT NULL DEFAULT '',
            course_description TEXT NOT NULL DEFAULT '',
            number_of_students INT NOT NULL DEFAULT 0,
            credit INT NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Student side owns the pair: deleting a student drops its rows,
    // deleting a course with rows left is refused.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS student_course (
            student_id BIGINT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
            course_id BIGINT NOT NULL REFERENCES courses(id),
            enrolled_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
            PRIMARY KEY (student_id, course_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    tracing::info!("coursectl migrations complete");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_student_course_course ON student_course(course_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_students_name ON students(name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_students_surname ON students(surname)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_students_major ON students(major)")
        .execute(pool)
        .await?;

    Ok(())
}
