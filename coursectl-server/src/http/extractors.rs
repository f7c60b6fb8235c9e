//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::ApiError;
use super::server::AppState;
use crate::db::{SessionRepo, UserRepo};
use crate::models::UserRole;

/// The signed-in user, resolved from `Authorization: Bearer <token>`
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub role: UserRole,
    pub token: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?
            .to_owned();

        let email = SessionRepo::new(&state.pool)
            .email_for(&token)
            .await?
            .ok_or_else(|| ApiError::unauthorized("session expired or unknown"))?;

        let role = UserRepo::new(&state.pool).resolve_role(&email).await?;

        Ok(Self { email, role, token })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
