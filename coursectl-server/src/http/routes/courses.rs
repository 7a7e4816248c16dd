//! Course pages and enrollment browsing

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    routing::get,
    Form, Router,
};

use coursectl_core::{Course, CourseId, EnrollOutcome, SearchQuery, StudentId};

use crate::http::error::ApiError;
use crate::http::extractors::Ids;
use crate::http::forms::CourseForm;
use crate::http::server::AppState;
use crate::http::views;

/// GET /course - list every course, counters recomputed
async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let courses = state.registrar.list_courses().await?;
    Ok(views::course_index(&courses, None))
}

/// GET /course/new - blank form
async fn new_form() -> Html<String> {
    views::course_form(&Course::default())
}

/// GET /course/update/{id} - filled-in form
async fn edit_form(
    State(state): State<Arc<AppState>>,
    Ids(id): Ids<CourseId>,
) -> Result<Html<String>, ApiError> {
    let course = state.registrar.get_course(id).await?;
    Ok(views::course_form(&course))
}

/// POST /course/ - insert or update from the form
async fn save(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CourseForm>,
) -> Result<Redirect, ApiError> {
    let course = form.into_course()?;
    state.registrar.save_course(course).await?;
    Ok(Redirect::to("/course/"))
}

/// GET /course/{id} - course with its students
async fn info(
    State(state): State<Arc<AppState>>,
    Ids(id): Ids<CourseId>,
) -> Result<Html<String>, ApiError> {
    let detail = state.registrar.course_detail(id).await?;
    Ok(views::course_info(&detail))
}

/// GET /course/delete/{id} - detach every student, then delete
async fn delete(
    State(state): State<Arc<AppState>>,
    Ids(id): Ids<CourseId>,
) -> Result<Redirect, ApiError> {
    state.registrar.delete_course(id).await?;
    Ok(Redirect::to("/course/"))
}

/// GET /course/search?name= - case-insensitive course name search
async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, ApiError> {
    let term = query.term();
    let courses = state.registrar.search_courses(term).await?;
    Ok(views::course_index(&courses, term))
}

/// GET /course/takeCourse/{student_id} - catalogue for one student
async fn take_course(
    State(state): State<Arc<AppState>>,
    Ids(student_id): Ids<StudentId>,
) -> Result<Html<String>, ApiError> {
    let student = state.registrar.get_student(student_id).await?;
    let offered = state.registrar.offered_courses(student_id).await?;
    Ok(views::take_course(&student, &offered))
}

/// GET /course/takeCourse/{student_id}/selectedCourse/{course_id}
///
/// A new enrollment returns to the catalogue; an existing one goes to the
/// student's page.
async fn select_course(
    State(state): State<Arc<AppState>>,
    Ids((student_id, course_id)): Ids<(StudentId, CourseId)>,
) -> Result<Redirect, ApiError> {
    let target = match state.registrar.enroll(student_id, course_id).await? {
        EnrollOutcome::Enrolled => format!("/course/takeCourse/{}", student_id),
        EnrollOutcome::AlreadyEnrolled => format!("/student/info/{}", student_id),
    };
    Ok(Redirect::to(&target))
}

/// Course routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/course", get(index))
        .route("/course/", get(index).post(save))
        .route("/course/list", get(index))
        .route("/course/new", get(new_form))
        .route("/course/search", get(search))
        .route("/course/{id}", get(info))
        .route("/course/update/{id}", get(edit_form))
        .route("/course/delete/{id}", get(delete))
        .route("/course/takeCourse/{student_id}", get(take_course))
        .route(
            "/course/takeCourse/{student_id}/selectedCourse/{course_id}",
            get(select_course),
        )
}
