//! Server-rendered pages
//!
//! Plain string builders returning [`Html`]. Every value that came from a
//! record or a request goes through [`escape`] before it is written.

use std::fmt::Write;

use axum::http::StatusCode;
use axum::response::Html;

use coursectl_core::{
    Course, CourseDetail, OfferedCourse, SortDirection, Student, StudentDetail, StudentSortKey,
    MAJORS,
};

/// Escape text for use in element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<nav><a href="/student/">Students</a> | <a href="/course/">Courses</a></nav>
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = escape(title),
        body = body,
    ))
}

fn id_or_empty(id: Option<i64>) -> String {
    id.map(|v| v.to_string()).unwrap_or_default()
}

fn search_form(action: &str, term: Option<&str>) -> String {
    format!(
        r#"<form method="get" action="{action}"><input type="text" name="name" value="{value}"> <button type="submit">Search</button></form>"#,
        value = escape(term.unwrap_or_default()),
    )
}

// ============================================================================
// Students
// ============================================================================

/// Currently applied ordering, used to render the header toggle links
#[derive(Debug, Clone, Copy)]
pub struct AppliedSort {
    pub key: StudentSortKey,
    pub direction: SortDirection,
}

fn sort_link(key: StudentSortKey, applied: Option<AppliedSort>) -> String {
    let (next, marker) = match applied {
        Some(a) if a.key == key => (
            a.direction.toggled(),
            match a.direction {
                SortDirection::Asc => " &#9650;",
                SortDirection::Desc => " &#9660;",
            },
        ),
        _ => (SortDirection::Asc, ""),
    };
    format!(
        r#"<a href="/student/sort/{key}?dir={dir}">{label}</a>{marker}"#,
        key = key.as_str(),
        dir = next.as_str(),
        label = key.label(),
    )
}

pub fn student_index(
    students: &[Student],
    applied: Option<AppliedSort>,
    term: Option<&str>,
) -> Html<String> {
    let mut body = String::new();
    body.push_str(r#"<p><a href="/student/new">New student</a></p>"#);
    body.push_str(&search_form("/student/search", term));

    let _ = write!(
        body,
        "<table>\n<tr><th>Id</th><th>{}</th><th>{}</th><th>{}</th><th>Date of birth</th><th></th></tr>\n",
        sort_link(StudentSortKey::Name, applied),
        sort_link(StudentSortKey::Surname, applied),
        sort_link(StudentSortKey::Major, applied),
    );
    for s in students {
        let id = id_or_empty(s.id);
        let _ = writeln!(
            body,
            r#"<tr><td>{id}</td><td>{name}</td><td>{surname}</td><td>{major}</td><td>{dob}</td><td><a href="/student/info/{id}">Info</a> <a href="/student/update/{id}">Edit</a> <a href="/course/takeCourse/{id}">Take course</a> <a href="/student/delete/{id}">Delete</a></td></tr>"#,
            name = escape(&s.name),
            surname = escape(&s.surname),
            major = escape(&s.major),
            dob = s.date_of_birth.map(|d| d.to_string()).unwrap_or_default(),
        );
    }
    body.push_str("</table>\n");
    if students.is_empty() {
        body.push_str("<p>No students.</p>\n");
    }

    layout("Students", &body)
}

pub fn student_form(student: &Student) -> Html<String> {
    let title = if student.id.is_some() {
        "Edit student"
    } else {
        "New student"
    };

    let mut majors = String::new();
    for major in MAJORS {
        let selected = if *major == student.major {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            majors,
            r#"<option value="{m}"{selected}>{m}</option>"#,
            m = escape(major),
        );
    }
    if !student.major.is_empty() && !MAJORS.contains(&student.major.as_str()) {
        let _ = write!(
            majors,
            r#"<option value="{m}" selected>{m}</option>"#,
            m = escape(&student.major),
        );
    }

    let body = format!(
        r#"<form method="post" action="/student/">
<input type="hidden" name="id" value="{id}">
<label>Name <input type="text" name="name" value="{name}" required></label>
<label>Surname <input type="text" name="surname" value="{surname}" required></label>
<label>Major <select name="major">{majors}</select></label>
<label>Date of birth <input type="date" name="date_of_birth" value="{dob}"></label>
<button type="submit">Save</button>
</form>
"#,
        id = id_or_empty(student.id),
        name = escape(&student.name),
        surname = escape(&student.surname),
        dob = student
            .date_of_birth
            .map(|d| d.to_string())
            .unwrap_or_default(),
    );

    layout(title, &body)
}

pub fn student_info(detail: &StudentDetail) -> Html<String> {
    let s = &detail.student;
    let id = id_or_empty(s.id);

    let mut body = format!(
        r#"<dl>
<dt>Name</dt><dd>{name}</dd>
<dt>Surname</dt><dd>{surname}</dd>
<dt>Major</dt><dd>{major}</dd>
<dt>Date of birth</dt><dd>{dob}</dd>
</dl>
<p><a href="/student/update/{id}">Edit</a> <a href="/course/takeCourse/{id}">Take course</a></p>
<h2>Courses</h2>
"#,
        name = escape(&s.name),
        surname = escape(&s.surname),
        major = escape(&s.major),
        dob = s.date_of_birth.map(|d| d.to_string()).unwrap_or_default(),
    );

    if detail.courses.is_empty() {
        body.push_str("<p>Not enrolled in any course.</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>Course</th><th>Teacher</th><th>Credit</th><th></th></tr>\n");
        for c in &detail.courses {
            let _ = writeln!(
                body,
                r#"<tr><td><a href="/course/{cid}">{name}</a></td><td>{teacher}</td><td>{credit}</td><td><a href="/student/drop/{id}/course/{cid}">Drop</a></td></tr>"#,
                cid = id_or_empty(c.id),
                name = escape(&c.course_name),
                teacher = escape(&c.teacher_name),
                credit = c.credit,
            );
        }
        body.push_str("</table>\n");
    }

    layout(&s.full_name(), &body)
}

// ============================================================================
// Courses
// ============================================================================

pub fn course_index(courses: &[Course], term: Option<&str>) -> Html<String> {
    let mut body = String::new();
    body.push_str(r#"<p><a href="/course/new">New course</a></p>"#);
    body.push_str(&search_form("/course/search", term));
    body.push_str(
        "<table>\n<tr><th>Id</th><th>Course</th><th>Teacher</th><th>Description</th><th>Students</th><th>Credit</th><th></th></tr>\n",
    );
    for c in courses {
        let _ = writeln!(
            body,
            r#"<tr><td>{id}</td><td>{name}</td><td>{teacher}</td><td>{desc}</td><td>{count}</td><td>{credit}</td><td><a href="/course/{id}">Info</a> <a href="/course/update/{id}">Edit</a> <a href="/course/delete/{id}">Delete</a></td></tr>"#,
            id = id_or_empty(c.id),
            name = escape(&c.course_name),
            teacher = escape(&c.teacher_name),
            desc = escape(&c.course_description),
            count = c.number_of_students,
            credit = c.credit,
        );
    }
    body.push_str("</table>\n");
    if courses.is_empty() {
        body.push_str("<p>No courses.</p>\n");
    }

    layout("Courses", &body)
}

pub fn course_form(course: &Course) -> Html<String> {
    let title = if course.id.is_some() {
        "Edit course"
    } else {
        "New course"
    };

    let body = format!(
        r#"<form method="post" action="/course/">
<input type="hidden" name="id" value="{id}">
<label>Course name <input type="text" name="course_name" value="{name}" required></label>
<label>Teacher <input type="text" name="teacher_name" value="{teacher}"></label>
<label>Description <textarea name="course_description">{desc}</textarea></label>
<label>Credit <input type="number" name="credit" value="{credit}" min="0"></label>
<button type="submit">Save</button>
</form>
"#,
        id = id_or_empty(course.id),
        name = escape(&course.course_name),
        teacher = escape(&course.teacher_name),
        desc = escape(&course.course_description),
        credit = course.credit,
    );

    layout(title, &body)
}

pub fn course_info(detail: &CourseDetail) -> Html<String> {
    let c = &detail.course;

    let mut body = format!(
        r#"<dl>
<dt>Teacher</dt><dd>{teacher}</dd>
<dt>Description</dt><dd>{desc}</dd>
<dt>Credit</dt><dd>{credit}</dd>
<dt>Students</dt><dd>{count}</dd>
</dl>
<h2>Enrolled students</h2>
"#,
        teacher = escape(&c.teacher_name),
        desc = escape(&c.course_description),
        credit = c.credit,
        count = c.number_of_students,
    );

    if detail.students.is_empty() {
        body.push_str("<p>Nobody has taken this course yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for s in &detail.students {
            let _ = writeln!(
                body,
                r#"<li><a href="/student/info/{id}">{name}</a></li>"#,
                id = id_or_empty(s.id),
                name = escape(&s.full_name()),
            );
        }
        body.push_str("</ul>\n");
    }

    layout(&c.course_name, &body)
}

/// Course catalogue as seen by one student, with enroll links.
pub fn take_course(student: &Student, offered: &[OfferedCourse]) -> Html<String> {
    let sid = id_or_empty(student.id);
    let mut body = format!(
        r#"<p>Choosing courses for <a href="/student/info/{sid}">{name}</a></p>
<table>
<tr><th>Course</th><th>Teacher</th><th>Students</th><th>Credit</th><th></th></tr>
"#,
        name = escape(&student.full_name()),
    );
    for o in offered {
        let c = &o.course;
        let cid = id_or_empty(c.id);
        let action = if o.enrolled {
            "Enrolled".to_string()
        } else {
            format!(r#"<a href="/course/takeCourse/{sid}/selectedCourse/{cid}">Take</a>"#)
        };
        let _ = writeln!(
            body,
            "<tr><td>{name}</td><td>{teacher}</td><td>{count}</td><td>{credit}</td><td>{action}</td></tr>",
            name = escape(&c.course_name),
            teacher = escape(&c.teacher_name),
            count = c.number_of_students,
            credit = c.credit,
        );
    }
    body.push_str("</table>\n");

    layout("Take a course", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<p>{message}</p>
<p><a href="/student/">Back to students</a></p>
"#,
        message = escape(message),
    );
    layout(title, &body)
}
