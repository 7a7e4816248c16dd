//! Enrollment coordinator
//!
//! Every path that changes who takes which course goes through here.
//! Counter movement is delegated to [`RecordStore::apply_enrollment`], so
//! the pair and the counter change together; [`Registrar::list_courses`]
//! recomputes counters from the join table as a backstop for any write
//! that bypassed it (raw saves, a crash mid-detach).

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::StoreResult;
use crate::model::{
    Course, CourseDetail, CourseId, EnrollmentChange, OfferedCourse, Student, StudentDetail,
    StudentId,
};
use crate::sort::{SortDirection, StudentSortKey};
use crate::store::{RecordStore, StudentFilter};

/// Result of an enroll request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollOutcome {
    Enrolled,
    AlreadyEnrolled,
}

/// Result of a drop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Dropped,
    /// Nothing to remove; the counter is left as it was
    NotEnrolled,
}

#[derive(Clone)]
pub struct Registrar {
    store: Arc<dyn RecordStore>,
}

impl Registrar {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Enrollment
    // ========================================================================

    pub async fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> StoreResult<EnrollOutcome> {
        let student = self.store.get_student(student_id).await?;
        self.store.get_course(course_id).await?;

        if student.is_enrolled_in(course_id) {
            debug!(student_id, course_id, "already enrolled, nothing to do");
            return Ok(EnrollOutcome::AlreadyEnrolled);
        }

        let added = self
            .store
            .apply_enrollment(EnrollmentChange::Add {
                student_id,
                course_id,
            })
            .await?;

        if added {
            info!(student_id, course_id, "student enrolled");
            Ok(EnrollOutcome::Enrolled)
        } else {
            // Another request inserted the pair between our read and write.
            Ok(EnrollOutcome::AlreadyEnrolled)
        }
    }

    pub async fn drop_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> StoreResult<DropOutcome> {
        self.store.get_student(student_id).await?;
        self.store.get_course(course_id).await?;

        let removed = self
            .store
            .apply_enrollment(EnrollmentChange::Remove {
                student_id,
                course_id,
            })
            .await?;

        if removed {
            info!(student_id, course_id, "student dropped course");
            Ok(DropOutcome::Dropped)
        } else {
            debug!(student_id, course_id, "drop requested for non-enrolled student");
            Ok(DropOutcome::NotEnrolled)
        }
    }

    /// Detach every enrolled student, then delete the course.
    pub async fn delete_course(&self, course_id: CourseId) -> StoreResult<()> {
        self.store.get_course(course_id).await?;

        let enrolled = self.store.students_of(course_id).await?;
        let detached = enrolled.len();
        for mut student in enrolled {
            student.detach(course_id);
            self.store.save_student(&student).await?;
        }

        self.store.delete_course(course_id).await?;
        info!(course_id, detached, "course deleted");
        Ok(())
    }

    // ========================================================================
    // Courses
    // ========================================================================

    /// All courses, with any stale counter corrected and persisted first.
    pub async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        let mut courses = self.store.list_courses().await?;
        self.heal_counters(&mut courses).await?;
        Ok(courses)
    }

    /// Bring each course's counter in line with live membership.
    /// Returns how many courses needed a correction.
    pub async fn heal_counters(&self, courses: &mut [Course]) -> StoreResult<usize> {
        let counts = self.store.enrollment_counts().await?;
        let mut corrected = 0;

        for course in courses.iter_mut() {
            let Some(id) = course.id else { continue };
            let live = counts.get(&id).copied().unwrap_or(0) as i32;
            if course.number_of_students != live {
                warn!(
                    course_id = id,
                    stored = course.number_of_students,
                    live,
                    "course counter drifted, correcting"
                );
                self.store.set_course_count(id, live).await?;
                course.number_of_students = live;
                corrected += 1;
            }
        }

        Ok(corrected)
    }

    /// Courses whose name contains `term`, counters corrected like
    /// [`list_courses`](Self::list_courses).
    pub async fn search_courses(&self, term: Option<&str>) -> StoreResult<Vec<Course>> {
        let Some(needle) = term else {
            return self.list_courses().await;
        };
        let mut courses = self.store.find_courses_by_name(needle).await?;
        self.heal_counters(&mut courses).await?;
        Ok(courses)
    }

    pub async fn get_course(&self, id: CourseId) -> StoreResult<Course> {
        self.store.get_course(id).await
    }

    pub async fn course_detail(&self, id: CourseId) -> StoreResult<CourseDetail> {
        let mut course = self.store.get_course(id).await?;
        let students = self.store.students_of(id).await?;
        self.heal_counters(std::slice::from_mut(&mut course)).await?;
        Ok(CourseDetail { course, students })
    }

    /// Insert or update a course from user input. The cached counter is
    /// never taken from input: new courses start at zero, existing ones
    /// keep their stored value.
    pub async fn save_course(&self, mut course: Course) -> StoreResult<CourseId> {
        course.number_of_students = match course.id {
            Some(id) => self.store.get_course(id).await?.number_of_students,
            None => 0,
        };
        let id = self.store.save_course(&course).await?;
        debug!(course_id = id, "course saved");
        Ok(id)
    }

    /// Every course, flagged with whether `student_id` already takes it.
    pub async fn offered_courses(&self, student_id: StudentId) -> StoreResult<Vec<OfferedCourse>> {
        let student = self.store.get_student(student_id).await?;
        let courses = self.list_courses().await?;
        Ok(courses
            .into_iter()
            .map(|course| OfferedCourse {
                enrolled: course.id.is_some_and(|id| student.is_enrolled_in(id)),
                course,
            })
            .collect())
    }

    // ========================================================================
    // Students
    // ========================================================================

    pub async fn list_students(&self) -> StoreResult<Vec<Student>> {
        self.store.list_students().await
    }

    /// Ordered listing; an unrecognized key falls back to the plain list.
    pub async fn sorted_students(
        &self,
        key: Option<StudentSortKey>,
        direction: SortDirection,
    ) -> StoreResult<Vec<Student>> {
        match key {
            Some(key) => self.store.list_students_ordered(key, direction).await,
            None => self.store.list_students().await,
        }
    }

    /// Students matching `filter`, or all students without one.
    pub async fn search_students(
        &self,
        filter: Option<StudentFilter>,
    ) -> StoreResult<Vec<Student>> {
        match filter {
            Some(filter) => self.store.find_students(&filter).await,
            None => self.store.list_students().await,
        }
    }

    pub async fn get_student(&self, id: StudentId) -> StoreResult<Student> {
        self.store.get_student(id).await
    }

    pub async fn student_detail(&self, id: StudentId) -> StoreResult<StudentDetail> {
        let student = self.store.get_student(id).await?;
        let courses = self.store.courses_of(id).await?;
        Ok(StudentDetail { student, courses })
    }

    /// Insert or update a student's own fields. Enrollment is only changed
    /// through [`enroll`](Self::enroll) and [`drop_course`](Self::drop_course),
    /// so an update keeps whatever courses the student currently takes.
    pub async fn save_student(&self, mut student: Student) -> StoreResult<StudentId> {
        student.courses = match student.id {
            Some(id) => self.store.get_student(id).await?.courses,
            None => Vec::new(),
        };
        let id = self.store.save_student(&student).await?;
        debug!(student_id = id, "student saved");
        Ok(id)
    }

    /// Drop every course the student takes, then delete the record.
    pub async fn delete_student(&self, id: StudentId) -> StoreResult<()> {
        let student = self.store.get_student(id).await?;

        for course_id in student.courses {
            self.store
                .apply_enrollment(EnrollmentChange::Remove {
                    student_id: id,
                    course_id,
                })
                .await?;
        }

        self.store.delete_student(id).await?;
        info!(student_id = id, "student deleted");
        Ok(())
    }
}
