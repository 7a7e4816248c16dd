//! In-memory record store
//!
//! Mirrors the relational schema: students, courses, and an enrollment
//! list of `(student_id, course_id)` pairs kept in insertion order. The
//! same referential rules apply as in PostgreSQL (student deletion drops
//! its pairs, course deletion is refused while pairs exist).

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecordStore, StudentFilter};
use crate::error::{StoreError, StoreResult};
use crate::model::{Course, CourseId, EnrollmentChange, Student, StudentId};
use crate::sort::{contains_ignore_case, sort_students, SortDirection, StudentSortKey};

#[derive(Default)]
struct Tables {
    students: BTreeMap<StudentId, Student>,
    courses: BTreeMap<CourseId, Course>,
    enrollments: Vec<(StudentId, CourseId)>,
    next_student_id: StudentId,
    next_course_id: CourseId,
}

impl Tables {
    fn course_ids_of(&self, student_id: StudentId) -> Vec<CourseId> {
        self.enrollments
            .iter()
            .filter(|(s, _)| *s == student_id)
            .map(|(_, c)| *c)
            .collect()
    }

    /// Stored student with its course ids filled from the enrollment list
    fn hydrate(&self, student: &Student) -> Student {
        let mut out = student.clone();
        out.courses = student
            .id
            .map(|id| self.course_ids_of(id))
            .unwrap_or_default();
        out
    }

    fn all_students(&self) -> Vec<Student> {
        self.students.values().map(|s| self.hydrate(s)).collect()
    }

    fn is_enrolled(&self, student_id: StudentId, course_id: CourseId) -> bool {
        self.enrollments
            .iter()
            .any(|&(s, c)| s == student_id && c == course_id)
    }

    fn check_course_refs(&self, courses: &[CourseId]) -> StoreResult<()> {
        for (i, course_id) in courses.iter().enumerate() {
            if !self.courses.contains_key(course_id) {
                return Err(StoreError::constraint(format!(
                    "course {course_id} does not exist"
                )));
            }
            if courses[..i].contains(course_id) {
                return Err(StoreError::constraint(format!(
                    "duplicate enrollment in course {course_id}"
                )));
            }
        }
        Ok(())
    }
}

/// Thread-safe in-memory store
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_students(&self) -> StoreResult<Vec<Student>> {
        Ok(self.tables.read().await.all_students())
    }

    async fn list_students_ordered(
        &self,
        key: StudentSortKey,
        direction: SortDirection,
    ) -> StoreResult<Vec<Student>> {
        let mut students = self.tables.read().await.all_students();
        sort_students(&mut students, key, direction);
        Ok(students)
    }

    async fn find_students(&self, filter: &StudentFilter) -> StoreResult<Vec<Student>> {
        let tables = self.tables.read().await;
        let matches = tables
            .students
            .values()
            .filter(|s| match filter {
                StudentFilter::NameContains(needle) => contains_ignore_case(&s.name, needle),
                StudentFilter::SurnameContains(needle) => {
                    contains_ignore_case(&s.surname, needle)
                }
                StudentFilter::Major(major) => s.major == *major,
            })
            .map(|s| tables.hydrate(s))
            .collect();
        Ok(matches)
    }

    async fn get_student(&self, id: StudentId) -> StoreResult<Student> {
        let tables = self.tables.read().await;
        tables
            .students
            .get(&id)
            .map(|s| tables.hydrate(s))
            .ok_or_else(|| StoreError::student_not_found(id))
    }

    async fn save_student(&self, student: &Student) -> StoreResult<StudentId> {
        let mut tables = self.tables.write().await;
        tables.check_course_refs(&student.courses)?;

        let id = match student.id {
            Some(id) => {
                if !tables.students.contains_key(&id) {
                    return Err(StoreError::student_not_found(id));
                }
                id
            }
            None => {
                tables.next_student_id += 1;
                tables.next_student_id
            }
        };

        let mut row = student.clone();
        row.id = Some(id);
        row.courses.clear();
        tables.students.insert(id, row);

        // Replace this student's pairs, keeping their position for courses
        // that stay and appending new ones in the given order.
        let existing = tables.course_ids_of(id);
        tables
            .enrollments
            .retain(|&(s, c)| s != id || student.courses.contains(&c));
        for &course_id in &student.courses {
            if !existing.contains(&course_id) {
                tables.enrollments.push((id, course_id));
            }
        }

        Ok(id)
    }

    async fn delete_student(&self, id: StudentId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.students.remove(&id).is_none() {
            return Err(StoreError::student_not_found(id));
        }
        tables.enrollments.retain(|&(s, _)| s != id);
        Ok(())
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        Ok(self.tables.read().await.courses.values().cloned().collect())
    }

    async fn find_courses_by_name(&self, needle: &str) -> StoreResult<Vec<Course>> {
        let tables = self.tables.read().await;
        Ok(tables
            .courses
            .values()
            .filter(|c| contains_ignore_case(&c.course_name, needle))
            .cloned()
            .collect())
    }

    async fn get_course(&self, id: CourseId) -> StoreResult<Course> {
        self.tables
            .read()
            .await
            .courses
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::course_not_found(id))
    }

    async fn save_course(&self, course: &Course) -> StoreResult<CourseId> {
        let mut tables = self.tables.write().await;
        let id = match course.id {
            Some(id) => {
                if !tables.courses.contains_key(&id) {
                    return Err(StoreError::course_not_found(id));
                }
                id
            }
            None => {
                tables.next_course_id += 1;
                tables.next_course_id
            }
        };

        let mut row = course.clone();
        row.id = Some(id);
        tables.courses.insert(id, row);
        Ok(id)
    }

    async fn delete_course(&self, id: CourseId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.courses.contains_key(&id) {
            return Err(StoreError::course_not_found(id));
        }
        if tables.enrollments.iter().any(|&(_, c)| c == id) {
            return Err(StoreError::constraint(format!(
                "course {id} still has enrolled students"
            )));
        }
        tables.courses.remove(&id);
        Ok(())
    }

    async fn set_course_count(&self, id: CourseId, count: i32) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let course = tables
            .courses
            .get_mut(&id)
            .ok_or_else(|| StoreError::course_not_found(id))?;
        course.number_of_students = count;
        Ok(())
    }

    async fn courses_of(&self, student_id: StudentId) -> StoreResult<Vec<Course>> {
        let tables = self.tables.read().await;
        Ok(tables
            .course_ids_of(student_id)
            .iter()
            .filter_map(|id| tables.courses.get(id).cloned())
            .collect())
    }

    async fn students_of(&self, course_id: CourseId) -> StoreResult<Vec<Student>> {
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .values()
            .filter(|s| s.id.is_some_and(|id| tables.is_enrolled(id, course_id)))
            .map(|s| tables.hydrate(s))
            .collect())
    }

    async fn enrollment_counts(&self) -> StoreResult<HashMap<CourseId, i64>> {
        let tables = self.tables.read().await;
        let mut counts = HashMap::new();
        for &(_, course_id) in &tables.enrollments {
            *counts.entry(course_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn apply_enrollment(&self, change: EnrollmentChange) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let (student_id, course_id) = (change.student_id(), change.course_id());

        if !tables.students.contains_key(&student_id) {
            return Err(StoreError::constraint(format!(
                "student {student_id} does not exist"
            )));
        }
        if !tables.courses.contains_key(&course_id) {
            return Err(StoreError::constraint(format!(
                "course {course_id} does not exist"
            )));
        }

        let changed = match change {
            EnrollmentChange::Add { .. } => {
                if tables.is_enrolled(student_id, course_id) {
                    false
                } else {
                    tables.enrollments.push((student_id, course_id));
                    true
                }
            }
            EnrollmentChange::Remove { .. } => {
                let before = tables.enrollments.len();
                tables
                    .enrollments
                    .retain(|&(s, c)| !(s == student_id && c == course_id));
                tables.enrollments.len() != before
            }
        };

        if changed {
            if let Some(course) = tables.courses.get_mut(&course_id) {
                course.number_of_students += change.delta();
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, StudentId, CourseId) {
        let store = MemoryStore::new();
        let s = store
            .save_student(&Student::new("Ada", "Lovelace", "Mathematics", None))
            .await
            .unwrap();
        let c = store
            .save_course(&Course::new("Analysis", "Cauchy", "Limits", 6))
            .await
            .unwrap();
        (store, s, c)
    }

    #[tokio::test]
    async fn assigns_ids_on_insert() {
        let (store, s, c) = seeded().await;
        assert_eq!(s, 1);
        assert_eq!(c, 1);
        assert_eq!(store.get_student(s).await.unwrap().id, Some(1));
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let store = MemoryStore::new();
        let mut student = Student::new("Ghost", "Writer", "Law", None);
        student.id = Some(42);
        let err = store.save_student(&student).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn apply_enrollment_moves_counter_once() {
        let (store, s, c) = seeded().await;
        let add = EnrollmentChange::Add {
            student_id: s,
            course_id: c,
        };

        assert!(store.apply_enrollment(add).await.unwrap());
        assert!(!store.apply_enrollment(add).await.unwrap());
        assert_eq!(store.get_course(c).await.unwrap().number_of_students, 1);
        assert_eq!(store.get_student(s).await.unwrap().courses, vec![c]);
    }

    #[tokio::test]
    async fn save_student_overwrites_collection() {
        let (store, s, c) = seeded().await;
        let c2 = store
            .save_course(&Course::new("Algebra", "Noether", "Rings", 6))
            .await
            .unwrap();

        let mut student = store.get_student(s).await.unwrap();
        student.courses = vec![c2, c];
        store.save_student(&student).await.unwrap();
        assert_eq!(store.get_student(s).await.unwrap().courses, vec![c2, c]);

        student.courses = vec![c];
        store.save_student(&student).await.unwrap();
        assert_eq!(store.get_student(s).await.unwrap().courses, vec![c]);
        // raw saves never touch the cached counter
        assert_eq!(store.get_course(c).await.unwrap().number_of_students, 0);
    }

    #[tokio::test]
    async fn save_student_rejects_duplicate_pairs() {
        let (store, s, c) = seeded().await;
        let mut student = store.get_student(s).await.unwrap();
        student.courses = vec![c, c];
        let err = store.save_student(&student).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn course_delete_refused_while_enrolled() {
        let (store, s, c) = seeded().await;
        store
            .apply_enrollment(EnrollmentChange::Add {
                student_id: s,
                course_id: c,
            })
            .await
            .unwrap();

        let err = store.delete_course(c).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn student_delete_drops_pairs() {
        let (store, s, c) = seeded().await;
        store
            .apply_enrollment(EnrollmentChange::Add {
                student_id: s,
                course_id: c,
            })
            .await
            .unwrap();

        store.delete_student(s).await.unwrap();
        assert!(store.students_of(c).await.unwrap().is_empty());
        assert!(store.enrollment_counts().await.unwrap().is_empty());
        store.delete_course(c).await.unwrap();
    }

    #[tokio::test]
    async fn find_students_by_filter() {
        let store = MemoryStore::new();
        for (name, surname, major) in [
            ("Grace", "Hopper", "Computer Science"),
            ("Alan", "Turing", "Mathematics"),
            ("Margaret", "Hamilton", "Computer Science"),
        ] {
            store
                .save_student(&Student::new(name, surname, major, None))
                .await
                .unwrap();
        }

        let by_name = store
            .find_students(&StudentFilter::NameContains("GAR".into()))
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].surname, "Hamilton");

        let by_surname = store
            .find_students(&StudentFilter::SurnameContains("h".into()))
            .await
            .unwrap();
        assert_eq!(by_surname.len(), 2);

        let by_major = store
            .find_students(&StudentFilter::Major("Computer Science".into()))
            .await
            .unwrap();
        assert_eq!(by_major.len(), 2);

        let none = store
            .find_students(&StudentFilter::NameContains("zzz".into()))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
