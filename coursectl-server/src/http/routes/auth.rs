//! Login and logout

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::verify_password;
use crate::db::{SessionRepo, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;
use crate::models::{EmailAddress, UserRole, ValidationError};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub email: String,
    pub role: UserRole,
}

/// POST /login - exchange credentials for a bearer token
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = EmailAddress::new(&req.email)?;
    if req.password.is_empty() {
        return Err(ValidationError::Empty { field: "password" }.into());
    }

    let users = UserRepo::new(&state.pool);
    let stored = users.password_hash(email.as_str()).await?;
    let valid = stored.is_some_and(|hash| verify_password(&req.password, &hash));
    if !valid {
        tracing::info!(email = email.as_str(), "login rejected");
        return Err(ApiError::unauthorized("invalid email or password"));
    }

    let role = users.resolve_role(email.as_str()).await?;
    let token = SessionRepo::new(&state.pool).create(email.as_str()).await?;
    tracing::info!(email = email.as_str(), role = role.as_str(), "user logged in");

    Ok(Json(LoginResponse {
        token,
        email: email.as_str().to_owned(),
        role,
    }))
}

/// POST /logout - end the current session
async fn logout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<StatusCode, ApiError> {
    SessionRepo::new(&state.pool).delete(&user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}
