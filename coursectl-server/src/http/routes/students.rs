//! Student pages

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use coursectl_core::{CourseId, SearchQuery, SortDirection, Student, StudentId, StudentSortKey};

use crate::http::error::ApiError;
use crate::http::extractors::Ids;
use crate::http::forms::StudentForm;
use crate::http::server::AppState;
use crate::http::views::{self, AppliedSort};

/// Query string of `/student/sort/{property}`
#[derive(Debug, Default, Deserialize)]
pub struct SortParams {
    pub dir: Option<String>,
}

/// GET /student - list every student
async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let students = state.registrar.list_students().await?;
    Ok(views::student_index(&students, None, None))
}

/// GET /student/new - blank form
async fn new_form() -> Html<String> {
    views::student_form(&Student::default())
}

/// POST /student/ - insert or update from the form
async fn save(
    State(state): State<Arc<AppState>>,
    Form(form): Form<StudentForm>,
) -> Result<Redirect, ApiError> {
    let student = form.into_student()?;
    state.registrar.save_student(student).await?;
    Ok(Redirect::to("/student/"))
}

/// GET /student/{id} and /student/info/{id} - student with its courses
async fn info(
    State(state): State<Arc<AppState>>,
    Ids(id): Ids<StudentId>,
) -> Result<Html<String>, ApiError> {
    let detail = state.registrar.student_detail(id).await?;
    Ok(views::student_info(&detail))
}

/// GET /student/update/{id} - filled-in form
async fn edit_form(
    State(state): State<Arc<AppState>>,
    Ids(id): Ids<StudentId>,
) -> Result<Html<String>, ApiError> {
    let student = state.registrar.get_student(id).await?;
    Ok(views::student_form(&student))
}

/// GET /student/delete/{id}
async fn delete(
    State(state): State<Arc<AppState>>,
    Ids(id): Ids<StudentId>,
) -> Result<Redirect, ApiError> {
    state.registrar.delete_student(id).await?;
    Ok(Redirect::to("/student/"))
}

/// GET /student/drop/{student_id}/course/{course_id}
async fn drop_course(
    State(state): State<Arc<AppState>>,
    Ids((student_id, course_id)): Ids<(StudentId, CourseId)>,
) -> Result<Redirect, ApiError> {
    state.registrar.drop_course(student_id, course_id).await?;
    Ok(Redirect::to(&format!("/student/info/{}", student_id)))
}

/// GET /student/search?name=|surname=|major= - name and surname match
/// case-insensitive substrings, major matches exactly
async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, ApiError> {
    let students = state.registrar.search_students(query.student_filter()).await?;
    Ok(views::student_index(&students, None, query.term()))
}

/// GET /student/sort/{property}?dir=asc|desc
///
/// The rendered header links carry the opposite direction, so following
/// the same column twice alternates the order.
async fn sort(
    State(state): State<Arc<AppState>>,
    Path(property): Path<String>,
    Query(params): Query<SortParams>,
) -> Result<Html<String>, ApiError> {
    let key = StudentSortKey::parse(&property);
    let direction = SortDirection::parse(params.dir.as_deref());
    let students = state.registrar.sorted_students(key, direction).await?;

    let applied = key.map(|key| AppliedSort { key, direction });
    Ok(views::student_index(&students, applied, None))
}

/// Student routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/student", get(index))
        .route("/student/", get(index).post(save))
        .route("/student/list", get(index))
        .route("/student/new", get(new_form))
        .route("/student/search", get(search))
        .route("/student/sort/{property}", get(sort))
        .route("/student/{id}", get(info))
        .route("/student/info/{id}", get(info))
        .route("/student/update/{id}", get(edit_form))
        .route("/student/delete/{id}", get(delete))
        .route(
            "/student/drop/{student_id}/course/{course_id}",
            get(drop_course),
        )
}
