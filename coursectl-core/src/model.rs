//! Student and course records
//!
//! Records carry `id: None` until the store assigns one. A student's
//! `courses` field is the ordered view of its rows in the enrollment join
//! table; a course never stores its students, only the cached count.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type StudentId = i64;
pub type CourseId = i64;

/// Reference list of majors offered by the student form
pub const MAJORS: &[&str] = &[
    "Computer Science",
    "Computer Engineering",
    "Information Technology",
    "Electrical Engineering",
    "Mathematics",
    "Law",
    "Finance",
    "Business Administration",
];

/// Student record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: Option<StudentId>,
    pub name: String,
    pub surname: String,
    /// Free text; [`MAJORS`] is only a suggestion list
    pub major: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Enrolled course ids, in enrollment order
    #[serde(default)]
    pub courses: Vec<CourseId>,
}

impl Student {
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        major: impl Into<String>,
        date_of_birth: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            surname: surname.into(),
            major: major.into(),
            date_of_birth,
            courses: Vec::new(),
        }
    }

    pub fn is_enrolled_in(&self, course_id: CourseId) -> bool {
        self.courses.contains(&course_id)
    }

    /// Remove every reference to `course_id`, returning whether any existed.
    pub fn detach(&mut self, course_id: CourseId) -> bool {
        let before = self.courses.len();
        self.courses.retain(|&c| c != course_id);
        self.courses.len() != before
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// Course record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: Option<CourseId>,
    pub course_name: String,
    pub teacher_name: String,
    pub course_description: String,
    /// Cached count of enrolled students
    pub number_of_students: i32,
    pub credit: i32,
}

impl Course {
    pub fn new(
        course_name: impl Into<String>,
        teacher_name: impl Into<String>,
        course_description: impl Into<String>,
        credit: i32,
    ) -> Self {
        Self {
            id: None,
            course_name: course_name.into(),
            teacher_name: teacher_name.into(),
            course_description: course_description.into(),
            number_of_students: 0,
            credit,
        }
    }
}

/// Student together with the courses it takes
#[derive(Debug, Clone, Serialize)]
pub struct StudentDetail {
    pub student: Student,
    pub courses: Vec<Course>,
}

/// Course together with the students enrolled in it
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    pub course: Course,
    pub students: Vec<Student>,
}

/// A course as offered to one particular student
#[derive(Debug, Clone, Serialize)]
pub struct OfferedCourse {
    pub course: Course,
    pub enrolled: bool,
}

/// A single mutation of the enrollment join table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentChange {
    Add {
        student_id: StudentId,
        course_id: CourseId,
    },
    Remove {
        student_id: StudentId,
        course_id: CourseId,
    },
}

impl EnrollmentChange {
    pub fn student_id(&self) -> StudentId {
        match *self {
            Self::Add { student_id, .. } | Self::Remove { student_id, .. } => student_id,
        }
    }

    pub fn course_id(&self) -> CourseId {
        match *self {
            Self::Add { course_id, .. } | Self::Remove { course_id, .. } => course_id,
        }
    }

    /// Counter adjustment applied when the change takes effect
    pub fn delta(&self) -> i32 {
        match self {
            Self::Add { .. } => 1,
            Self::Remove { .. } => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detach_removes_every_reference() {
        let mut student = Student::new("Ada", "Lovelace", "Mathematics", None);
        student.courses = vec![1, 2, 1];

        assert!(student.detach(1));
        assert_eq!(student.courses, vec![2]);
        assert!(!student.detach(1));
    }

    #[test]
    fn change_accessors() {
        let add = EnrollmentChange::Add {
            student_id: 4,
            course_id: 9,
        };
        let remove = EnrollmentChange::Remove {
            student_id: 4,
            course_id: 9,
        };
        assert_eq!(add.delta(), 1);
        assert_eq!(remove.delta(), -1);
        assert_eq!(remove.student_id(), 4);
        assert_eq!(add.course_id(), 9);
    }

    #[test]
    fn new_course_starts_empty() {
        let course = Course::new("Compilers", "Aho", "Parsing and codegen", 6);
        assert_eq!(course.number_of_students, 0);
        assert!(course.id.is_none());
    }
}
