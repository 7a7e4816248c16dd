//! Record store abstraction
//!
//! The enrollment join table is the single authority for who takes what.
//! [`RecordStore::apply_enrollment`] is the only operation that changes
//! membership and the cached course counter together; every other write
//! is plain last-writer-wins persistence.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::{Course, CourseId, EnrollmentChange, Student, StudentId};
use crate::sort::{SortDirection, StudentSortKey};

pub mod memory;

pub use memory::MemoryStore;

/// Student search filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentFilter {
    /// Case-insensitive substring of `name`
    NameContains(String),
    /// Case-insensitive substring of `surname`
    SurnameContains(String),
    /// Exact `major`
    Major(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// All students in id order, each with its enrolled course ids.
    async fn list_students(&self) -> StoreResult<Vec<Student>>;

    /// All students ordered by `key`; ties keep id order.
    async fn list_students_ordered(
        &self,
        key: StudentSortKey,
        direction: SortDirection,
    ) -> StoreResult<Vec<Student>>;

    async fn find_students(&self, filter: &StudentFilter) -> StoreResult<Vec<Student>>;

    async fn get_student(&self, id: StudentId) -> StoreResult<Student>;

    /// Insert when `student.id` is `None`, otherwise overwrite the stored
    /// record, including its enrolled-course collection. Course counters
    /// are not touched.
    async fn save_student(&self, student: &Student) -> StoreResult<StudentId>;

    /// Delete a student; its enrollment rows go with it.
    async fn delete_student(&self, id: StudentId) -> StoreResult<()>;

    async fn list_courses(&self) -> StoreResult<Vec<Course>>;

    /// Case-insensitive substring match on `course_name`.
    async fn find_courses_by_name(&self, needle: &str) -> StoreResult<Vec<Course>>;

    async fn get_course(&self, id: CourseId) -> StoreResult<Course>;

    /// Insert or overwrite a course, counter included.
    async fn save_course(&self, course: &Course) -> StoreResult<CourseId>;

    /// Delete a course. Fails with a constraint violation while any
    /// student is still enrolled.
    async fn delete_course(&self, id: CourseId) -> StoreResult<()>;

    async fn set_course_count(&self, id: CourseId, count: i32) -> StoreResult<()>;

    /// Courses taken by a student, in enrollment order.
    async fn courses_of(&self, student_id: StudentId) -> StoreResult<Vec<Course>>;

    /// Students enrolled in a course, in id order.
    async fn students_of(&self, course_id: CourseId) -> StoreResult<Vec<Student>>;

    /// Live membership count for every course that has at least one student.
    async fn enrollment_counts(&self) -> StoreResult<HashMap<CourseId, i64>>;

    /// Add or remove one enrollment pair and move the course counter by
    /// the change's delta, atomically. Returns `false` (and leaves the
    /// counter alone) when membership was already in the requested state.
    async fn apply_enrollment(&self, change: EnrollmentChange) -> StoreResult<bool>;
}
