//! Course catalog, sections, enroll and drop

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::course_id;
use crate::db::{Course, CourseRepo, ProfessorContact, SectionWithCount};
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;
use crate::models::{CourseRole, Page, PageParams, Paginated};
use crate::rules::{self, DropOutcome, EnrollDecision, GradeSummary};

/// Grade summary with the ratio form of the total
#[derive(Serialize)]
pub struct GradeSummaryResponse {
    pub homework_average: Option<f64>,
    pub exam_average: Option<f64>,
    pub total: Option<f64>,
    pub total_ratio: Option<f64>,
}

impl From<GradeSummary> for GradeSummaryResponse {
    fn from(s: GradeSummary) -> Self {
        Self {
            homework_average: s.homework_average,
            exam_average: s.exam_average,
            total: s.total,
            total_ratio: s.total_ratio(),
        }
    }
}

/// Course as seen by the requesting user
#[derive(Serialize)]
pub struct CourseResponse {
    #[serde(flatten)]
    pub course: Course,
    pub role: CourseRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professor: Option<ProfessorContact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grades: Option<GradeSummaryResponse>,
}

#[derive(Serialize)]
pub struct EnrollResponse {
    pub course_id: String,
    pub section_no: i64,
}

#[derive(Serialize)]
pub struct DropResponse {
    pub course_id: String,
    pub posts_removed: u64,
    pub comments_removed: u64,
}

#[derive(Deserialize, Default)]
pub struct DropRequest {
    /// Only drop if enrolled in this section
    pub section: Option<i64>,
}

/// GET /courses - catalog, paginated
async fn list_courses(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<Course>>, ApiError> {
    let page = Page::from(params);
    let courses = CourseRepo::new(&state.pool).list(page).await?;
    Ok(Json(courses))
}

/// GET /courses/{id} - course info for the viewer
async fn get_course(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<CourseResponse>, ApiError> {
    let id = course_id(&raw_id)?;
    let repo = CourseRepo::new(&state.pool);
    let course = repo.get(id.as_str()).await?;
    let access = rules::course_access(&state.pool, &user.email, id.as_str()).await?;

    let mut response = CourseResponse {
        course,
        role: access.course_role(),
        section: None,
        professor: None,
        grades: None,
    };

    if let Some(section) = access.section {
        response.section = Some(section);
        response.professor = repo.professor_contact(id.as_str()).await?;
        let summary = rules::summarize(&state.pool, &user.email, id.as_str()).await?;
        response.grades = Some(summary.into());
    }

    Ok(Json(response))
}

/// GET /courses/{id}/sections - sections with head counts
async fn list_sections(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<SectionWithCount>>, ApiError> {
    let id = course_id(&raw_id)?;
    let repo = CourseRepo::new(&state.pool);
    repo.get(id.as_str()).await?;
    Ok(Json(repo.sections(id.as_str()).await?))
}

/// POST /courses/{id}/sections/{sec}/enroll
async fn enroll(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((raw_id, sec_no)): Path<(String, i64)>,
) -> Result<(StatusCode, Json<EnrollResponse>), ApiError> {
    let id = course_id(&raw_id)?;
    let decision = rules::enroll(
        &state.pool,
        &user.email,
        id.as_str(),
        sec_no,
        state.capacity_policy,
    )
    .await?;

    match decision {
        EnrollDecision::Eligible => Ok((
            StatusCode::CREATED,
            Json(EnrollResponse {
                course_id: id.as_str().to_owned(),
                section_no: sec_no,
            }),
        )),
        EnrollDecision::NotAStudent => Err(ApiError::forbidden("only students can enroll")),
        EnrollDecision::AlreadyEnrolled => {
            Err(ApiError::conflict(format!("already enrolled in {}", id.as_str())))
        }
        EnrollDecision::TeachingAssistant => Err(ApiError::forbidden(
            "teaching assistants cannot enroll in a course they assist",
        )),
        EnrollDecision::SectionNotFound => Err(ApiError::NotFound {
            resource: "section",
            id: format!("{}/{}", id.as_str(), sec_no),
        }),
        EnrollDecision::SectionFull { enrolled, max_limit } => Err(ApiError::conflict(format!(
            "section {} is full ({} enrolled, limit {})",
            sec_no, enrolled, max_limit
        ))),
    }
}

/// POST /courses/{id}/drop - drop the caller's own enrollment
async fn drop_course(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(raw_id): Path<String>,
    body: Option<Json<DropRequest>>,
) -> Result<Json<DropResponse>, ApiError> {
    let id = course_id(&raw_id)?;
    let Json(req) = body.unwrap_or_default();

    let outcome = rules::drop_course(
        &state.pool,
        state.clock.as_ref(),
        &user.email,
        id.as_str(),
        req.section,
    )
    .await?;

    match outcome {
        DropOutcome::Dropped {
            posts_removed,
            comments_removed,
        } => Ok(Json(DropResponse {
            course_id: id.as_str().to_owned(),
            posts_removed,
            comments_removed,
        })),
        DropOutcome::NotEnrolled => Err(ApiError::NotFound {
            resource: "enrollment",
            id: format!("{}/{}", user.email, id.as_str()),
        }),
        DropOutcome::NoDeadline => Err(ApiError::forbidden(format!(
            "{} has no drop deadline; drops are closed",
            id.as_str()
        ))),
        DropOutcome::PastDeadline { deadline } => Err(ApiError::forbidden(format!(
            "the drop deadline for {} was {}",
            id.as_str(),
            deadline
        ))),
    }
}

/// Course routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/{id}", get(get_course))
        .route("/courses/{id}/sections", get(list_sections))
        .route("/courses/{id}/sections/{sec}/enroll", post(enroll))
        .route("/courses/{id}/drop", post(drop_course))
}
