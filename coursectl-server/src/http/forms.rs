//! Form bodies posted by the student and course pages
//!
//! Browsers submit every field as text, including empty hidden ids and
//! blank dates. Only type conversion happens here; field contents are
//! otherwise stored as given.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use coursectl_core::{Course, CourseId, Student, StudentId};

use super::error::ApiError;

/// Treat an empty or whitespace-only field as absent.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }))
}

fn parse_id(raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    raw.map(|v| {
        v.parse::<i64>()
            .map_err(|_| ApiError::bad_request(format!("invalid id '{}'", v)))
    })
    .transpose()
}

/// `POST /student/`
#[derive(Debug, Default, Deserialize)]
pub struct StudentForm {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub major: String,
    /// `YYYY-MM-DD`, as produced by `<input type="date">`
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_of_birth: Option<String>,
}

impl StudentForm {
    pub fn into_student(self) -> Result<Student, ApiError> {
        let id: Option<StudentId> = parse_id(self.id.as_deref())?;
        let date_of_birth = self
            .date_of_birth
            .as_deref()
            .map(|v| {
                NaiveDate::parse_from_str(v, "%Y-%m-%d")
                    .map_err(|_| ApiError::bad_request(format!("invalid date of birth '{}'", v)))
            })
            .transpose()?;

        let mut student = Student::new(self.name, self.surname, self.major, date_of_birth);
        student.id = id;
        Ok(student)
    }
}

/// `POST /course/`
///
/// Carries no student count: the counter is owned by enrollment.
#[derive(Debug, Default, Deserialize)]
pub struct CourseForm {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(default)]
    pub course_description: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub credit: Option<String>,
}

impl CourseForm {
    pub fn into_course(self) -> Result<Course, ApiError> {
        let id: Option<CourseId> = parse_id(self.id.as_deref())?;
        let credit = match self.credit.as_deref() {
            Some(v) => v
                .parse::<i32>()
                .map_err(|_| ApiError::bad_request(format!("invalid credit '{}'", v)))?,
            None => 0,
        };

        let mut course = Course::new(
            self.course_name,
            self.teacher_name,
            self.course_description,
            credit,
        );
        course.id = id;
        Ok(course)
    }
}
