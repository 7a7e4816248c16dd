//! coursectl-core: academic records and enrollment bookkeeping
//!
//! Holds the student/course model, the [`RecordStore`] abstraction that
//! persistence backends implement, and the [`Registrar`] which owns the
//! only real business rule: keeping each course's `number_of_students`
//! counter in step with the enrollment join table.

pub mod error;
pub mod model;
pub mod registrar;
pub mod sort;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use model::{
    Course, CourseDetail, CourseId, EnrollmentChange, OfferedCourse, Student, StudentDetail,
    StudentId, MAJORS,
};
pub use registrar::{DropOutcome, EnrollOutcome, Registrar};
pub use sort::{SearchQuery, SortDirection, StudentSortKey};
pub use store::{MemoryStore, RecordStore, StudentFilter};
