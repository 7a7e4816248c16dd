//! Repository implementations for database access
//!
//! Each repository borrows the pool and exposes plain async methods
//! returning [`DbError`]; [`PgStore`](super::PgStore) adapts them to the
//! core `RecordStore` trait.

pub mod courses;
pub mod enrollments;
pub mod students;

pub use courses::CourseRepo;
pub use enrollments::EnrollmentRepo;
pub use students::StudentRepo;

use coursectl_core::StoreError;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: i64 },
}

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => StoreError::NotFound { resource, id },
            DbError::Sqlx(sqlx::Error::Database(db))
                if db.is_unique_violation() || db.is_foreign_key_violation() =>
            {
                StoreError::ConstraintViolation(db.message().to_owned())
            }
            DbError::Sqlx(e) => StoreError::Backend(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_through() {
        let err: StoreError = DbError::NotFound {
            resource: "course",
            id: 3,
        }
        .into();
        assert!(matches!(err, StoreError::NotFound { resource: "course", id: 3 }));
    }

    #[test]
    fn other_sqlx_errors_are_backend() {
        let err: StoreError = DbError::Sqlx(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
