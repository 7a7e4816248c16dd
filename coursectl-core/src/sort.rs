//! Sort and search request helpers
//!
//! Sort direction is always an explicit request parameter. A sorted
//! listing links to the same property with [`SortDirection::toggled`],
//! so repeated clicks alternate ascending/descending per client.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::Student;
use crate::store::StudentFilter;

/// Student properties that support ordered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentSortKey {
    Name,
    Surname,
    Major,
}

impl StudentSortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Surname => "surname",
            Self::Major => "major",
        }
    }

    /// Column heading
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Surname => "Surname",
            Self::Major => "Major",
        }
    }

    /// Parse a path segment; unknown properties yield `None`, which callers
    /// treat as "no ordering requested".
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "surname" => Some(Self::Surname),
            "major" => Some(Self::Major),
            _ => None,
        }
    }

    /// Column backing this key in the `students` table
    pub fn column(&self) -> &'static str {
        self.as_str()
    }

    fn field<'a>(&self, student: &'a Student) -> &'a str {
        match self {
            Self::Name => &student.name,
            Self::Surname => &student.surname,
            Self::Major => &student.major,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parse `asc`/`desc`; anything else (or nothing) means ascending.
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "desc" => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Stable in-place ordering of students by the lowercased `key` field,
/// ties broken by id. Matches `ORDER BY lower(col) COLLATE "C"` in SQL.
pub fn sort_students(students: &mut [Student], key: StudentSortKey, direction: SortDirection) {
    students.sort_by(|a, b| {
        let (left, right) = (key.field(a).to_lowercase(), key.field(b).to_lowercase());
        direction
            .apply(left.cmp(&right))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Search terms as submitted by a search form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub major: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

impl SearchQuery {
    /// Trimmed, non-blank name term; `None` means "list everything".
    pub fn term(&self) -> Option<&str> {
        non_blank(&self.name)
    }

    /// First non-blank of `name`, `surname`, `major`.
    pub fn student_filter(&self) -> Option<StudentFilter> {
        if let Some(name) = non_blank(&self.name) {
            return Some(StudentFilter::NameContains(name.to_owned()));
        }
        if let Some(surname) = non_blank(&self.surname) {
            return Some(StudentFilter::SurnameContains(surname.to_owned()));
        }
        non_blank(&self.major).map(|major| StudentFilter::Major(major.to_owned()))
    }
}

/// Case-insensitive substring match
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
