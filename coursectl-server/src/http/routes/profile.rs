//! Profile view and password change

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, verify_password};
use crate::db::{ProfessorProfile, StudentProfile, User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;
use crate::models::{UserRole, ValidationError};

#[derive(Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: User,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professor: Option<ProfessorProfile>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// GET /profile
async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let users = UserRepo::new(&state.pool);
    let record = users.get(&user.email).await?;

    let (student, professor) = match user.role {
        UserRole::Student => (users.student_profile(&user.email).await?, None),
        UserRole::Professor => (None, users.professor_profile(&user.email).await?),
        UserRole::Unknown => (None, None),
    };

    Ok(Json(ProfileResponse {
        user: record,
        role: user.role,
        student,
        professor,
    }))
}

/// POST /profile/password
async fn change_password(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    if req.new_password.is_empty() {
        return Err(ValidationError::Empty { field: "new_password" }.into());
    }
    if req.new_password != req.confirm_password {
        return Err(ValidationError::Mismatch { field: "confirm_password" }.into());
    }

    let users = UserRepo::new(&state.pool);
    let current = users.password_hash(&user.email).await?;
    if !current.is_some_and(|hash| verify_password(&req.old_password, &hash)) {
        return Err(ApiError::forbidden("current password is incorrect"));
    }

    users
        .update_password(&user.email, &hash_password(&req.new_password))
        .await?;
    tracing::info!(email = %user.email, "password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Profile routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profile/password", post(change_password))
}
