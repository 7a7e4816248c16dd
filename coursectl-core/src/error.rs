//! Structured error types for record store operations.
//!
//! Backends map their native failures onto these variants. Callers see
//! either a missing record, a refused write, or a broken backend.

use thiserror::Error;

/// Error returned by every [`RecordStore`](crate::RecordStore) operation
#[derive(Error, Debug)]
pub enum StoreError {
    /// Lookup by id found nothing
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: i64 },

    /// The store rejected the write (duplicate pair, dangling reference)
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Backend failure (connection, protocol, decoding)
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn student_not_found(id: i64) -> Self {
        Self::NotFound {
            resource: "student",
            id,
        }
    }

    pub fn course_not_found(id: i64) -> Self {
        Self::NotFound {
            resource: "course",
            id,
        }
    }

    pub fn constraint(reason: impl Into<String>) -> Self {
        Self::ConstraintViolation(reason.into())
    }

    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend(reason.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
