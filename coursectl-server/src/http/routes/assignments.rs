//! Homework and exam endpoints
//!
//! Each handler exists once, parameterized by [`AssignmentKind`]; the router
//! mounts it under both `/homework` and `/exams`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::course_id;
use crate::db::{Assignment, AssignmentGrade, AssignmentRepo, GradeRepo, GradeSheetRow, NewAssignment};
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;
use crate::models::{AssignmentKind, Content, CourseId, EmailAddress};
use crate::rules;

#[derive(Deserialize)]
pub struct CreateAssignmentRequest {
    pub details: String,
}

#[derive(Deserialize)]
pub struct SetGradeRequest {
    pub student_email: String,
    /// `null` clears the grade
    pub grade: Option<f64>,
}

#[derive(Serialize)]
pub struct SectionAssignments {
    pub sec_no: i64,
    pub assignments: Vec<Assignment>,
}

/// Assignments view: professors see every section, students their own
/// section with grades.
#[derive(Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum AssignmentsResponse {
    Professor {
        kind: AssignmentKind,
        sections: Vec<SectionAssignments>,
    },
    Student {
        kind: AssignmentKind,
        section: i64,
        assignments: Vec<AssignmentGrade>,
    },
}

async fn require_professor(
    state: &AppState,
    user: &AuthUser,
    course: &CourseId,
) -> Result<(), ApiError> {
    if rules::is_prof_for_class(&state.pool, &user.email, course.as_str()).await? {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "only the professor of {} may do this",
            course.as_str()
        )))
    }
}

async fn list_assignments(
    state: Arc<AppState>,
    user: AuthUser,
    raw_id: String,
    kind: AssignmentKind,
) -> Result<Json<AssignmentsResponse>, ApiError> {
    let id = course_id(&raw_id)?;
    let access = rules::course_access(&state.pool, &user.email, id.as_str()).await?;
    let repo = AssignmentRepo::new(&state.pool);

    if access.is_professor {
        let mut by_section: BTreeMap<i64, Vec<Assignment>> = BTreeMap::new();
        for assignment in repo.list_for_course(kind, id.as_str()).await? {
            by_section.entry(assignment.sec_no).or_default().push(assignment);
        }
        let sections = by_section
            .into_iter()
            .map(|(sec_no, assignments)| SectionAssignments { sec_no, assignments })
            .collect();
        return Ok(Json(AssignmentsResponse::Professor { kind, sections }));
    }

    let Some(section) = access.section else {
        return Err(ApiError::forbidden(format!(
            "not enrolled in {}",
            id.as_str()
        )));
    };
    let assignments = GradeRepo::new(&state.pool)
        .student_grades(kind, &user.email, id.as_str(), section)
        .await?;

    Ok(Json(AssignmentsResponse::Student {
        kind,
        section,
        assignments,
    }))
}

async fn create_assignment(
    state: Arc<AppState>,
    user: AuthUser,
    (raw_id, sec_no): (String, i64),
    kind: AssignmentKind,
    req: CreateAssignmentRequest,
) -> Result<(StatusCode, Json<NewAssignment>), ApiError> {
    let id = course_id(&raw_id)?;
    let details = Content::new("details", &req.details)?;
    require_professor(&state, &user, &id).await?;

    let created = AssignmentRepo::new(&state.pool)
        .add(kind, id.as_str(), sec_no, &details)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn grade_sheet(
    state: Arc<AppState>,
    user: AuthUser,
    (raw_id, sec_no, number): (String, i64, i64),
    kind: AssignmentKind,
) -> Result<Json<Vec<GradeSheetRow>>, ApiError> {
    let id = course_id(&raw_id)?;
    require_professor(&state, &user, &id).await?;

    let rows = GradeRepo::new(&state.pool)
        .grade_sheet(kind, id.as_str(), sec_no, number)
        .await?;
    Ok(Json(rows))
}

async fn set_grade(
    state: Arc<AppState>,
    user: AuthUser,
    (raw_id, sec_no, number): (String, i64, i64),
    kind: AssignmentKind,
    req: SetGradeRequest,
) -> Result<StatusCode, ApiError> {
    let id = course_id(&raw_id)?;
    let student = EmailAddress::new(&req.student_email)?;
    require_professor(&state, &user, &id).await?;

    GradeRepo::new(&state.pool)
        .set_grade(kind, student.as_str(), id.as_str(), sec_no, number, req.grade)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// Per-kind entry points for the router.

async fn list_homework(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<AssignmentsResponse>, ApiError> {
    list_assignments(state, user, id, AssignmentKind::Homework).await
}

async fn list_exams(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<AssignmentsResponse>, ApiError> {
    list_assignments(state, user, id, AssignmentKind::Exam).await
}

async fn create_homework(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(path): Path<(String, i64)>,
    Json(req): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<NewAssignment>), ApiError> {
    create_assignment(state, user, path, AssignmentKind::Homework, req).await
}

async fn create_exam(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(path): Path<(String, i64)>,
    Json(req): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<NewAssignment>), ApiError> {
    create_assignment(state, user, path, AssignmentKind::Exam, req).await
}

async fn homework_grades(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(path): Path<(String, i64, i64)>,
) -> Result<Json<Vec<GradeSheetRow>>, ApiError> {
    grade_sheet(state, user, path, AssignmentKind::Homework).await
}

async fn exam_grades(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(path): Path<(String, i64, i64)>,
) -> Result<Json<Vec<GradeSheetRow>>, ApiError> {
    grade_sheet(state, user, path, AssignmentKind::Exam).await
}

async fn set_homework_grade(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(path): Path<(String, i64, i64)>,
    Json(req): Json<SetGradeRequest>,
) -> Result<StatusCode, ApiError> {
    set_grade(state, user, path, AssignmentKind::Homework, req).await
}

async fn set_exam_grade(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(path): Path<(String, i64, i64)>,
    Json(req): Json<SetGradeRequest>,
) -> Result<StatusCode, ApiError> {
    set_grade(state, user, path, AssignmentKind::Exam, req).await
}

/// Assignment routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/courses/{id}/homework", get(list_homework))
        .route("/courses/{id}/exams", get(list_exams))
        .route("/courses/{id}/sections/{sec}/homework", post(create_homework))
        .route("/courses/{id}/sections/{sec}/exams", post(create_exam))
        .route(
            "/courses/{id}/sections/{sec}/homework/{no}/grades",
            get(homework_grades).put(set_homework_grade),
        )
        .route(
            "/courses/{id}/sections/{sec}/exams/{no}/grades",
            get(exam_grades).put(set_exam_grade),
        )
}
