//! Role-specific landing data

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::db::{Course, CourseRepo, EnrolledCourse, EnrollmentRepo};
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;
use crate::models::UserRole;

/// Dashboard response, tagged by role
#[derive(Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DashboardResponse {
    Student {
        enrolled: Vec<EnrolledCourse>,
        assisting: Vec<Course>,
    },
    Professor {
        teaching: Vec<Course>,
    },
}

/// GET /dashboard
async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let courses = CourseRepo::new(&state.pool);

    let response = match user.role {
        UserRole::Student => DashboardResponse::Student {
            enrolled: EnrollmentRepo::new(&state.pool)
                .enrolled_courses(&user.email)
                .await?,
            assisting: courses.assisted_by(&user.email).await?,
        },
        UserRole::Professor => DashboardResponse::Professor {
            teaching: courses.taught_by(&user.email).await?,
        },
        UserRole::Unknown => {
            return Err(ApiError::forbidden("account has no student or professor profile"));
        }
    };

    Ok(Json(response))
}

/// Dashboard routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(dashboard))
}
