//! PostgreSQL-backed [`RecordStore`]

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use coursectl_core::{
    Course, CourseId, EnrollmentChange, RecordStore, SortDirection, Student, StoreResult,
    StudentFilter, StudentId, StudentSortKey,
};

use super::repos::{CourseRepo, EnrollmentRepo, StudentRepo};

/// Record store over a sqlx connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn students(&self) -> StudentRepo<'_> {
        StudentRepo::new(&self.pool)
    }

    fn courses(&self) -> CourseRepo<'_> {
        CourseRepo::new(&self.pool)
    }

    fn enrollments(&self) -> EnrollmentRepo<'_> {
        EnrollmentRepo::new(&self.pool)
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn list_students(&self) -> StoreResult<Vec<Student>> {
        Ok(self.students().list().await?)
    }

    async fn list_students_ordered(
        &self,
        key: StudentSortKey,
        direction: SortDirection,
    ) -> StoreResult<Vec<Student>> {
        Ok(self.students().list_ordered(key, direction).await?)
    }

    async fn find_students(&self, filter: &StudentFilter) -> StoreResult<Vec<Student>> {
        Ok(self.students().find(filter).await?)
    }

    async fn get_student(&self, id: StudentId) -> StoreResult<Student> {
        Ok(self.students().get(id).await?)
    }

    async fn save_student(&self, student: &Student) -> StoreResult<StudentId> {
        Ok(self.students().save(student).await?)
    }

    async fn delete_student(&self, id: StudentId) -> StoreResult<()> {
        Ok(self.students().delete(id).await?)
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        Ok(self.courses().list().await?)
    }

    async fn find_courses_by_name(&self, needle: &str) -> StoreResult<Vec<Course>> {
        Ok(self.courses().find_by_name(needle).await?)
    }

    async fn get_course(&self, id: CourseId) -> StoreResult<Course> {
        Ok(self.courses().get(id).await?)
    }

    async fn save_course(&self, course: &Course) -> StoreResult<CourseId> {
        Ok(self.courses().save(course).await?)
    }

    async fn delete_course(&self, id: CourseId) -> StoreResult<()> {
        Ok(self.courses().delete(id).await?)
    }

    async fn set_course_count(&self, id: CourseId, count: i32) -> StoreResult<()> {
        Ok(self.courses().set_count(id, count).await?)
    }

    async fn courses_of(&self, student_id: StudentId) -> StoreResult<Vec<Course>> {
        Ok(self.courses().taken_by(student_id).await?)
    }

    async fn students_of(&self, course_id: CourseId) -> StoreResult<Vec<Student>> {
        Ok(self.students().enrolled_in(course_id).await?)
    }

    async fn enrollment_counts(&self) -> StoreResult<HashMap<CourseId, i64>> {
        Ok(self.enrollments().counts().await?)
    }

    async fn apply_enrollment(&self, change: EnrollmentChange) -> StoreResult<bool> {
        Ok(self.enrollments().apply(change).await?)
    }
}
