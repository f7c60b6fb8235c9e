//! Course forum endpoints
//!
//! Readable and writable by enrolled students, the course's TAs and its
//! professor.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::course_id;
use crate::db::{Comment, ForumRepo, Post, PostWithComments};
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;
use crate::models::{Content, CourseId};
use crate::rules;

#[derive(Deserialize)]
pub struct CreateEntryRequest {
    pub content: String,
}

async fn require_forum_access(
    state: &AppState,
    user: &AuthUser,
    course: &CourseId,
) -> Result<(), ApiError> {
    let access = rules::course_access(&state.pool, &user.email, course.as_str()).await?;
    if access.course_role().can_use_forum() {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "the {} forum is open to its students and teaching team only",
            course.as_str()
        )))
    }
}

/// GET /courses/{id}/posts - posts with their comments
async fn list_posts(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<PostWithComments>>, ApiError> {
    let id = course_id(&raw_id)?;
    require_forum_access(&state, &user, &id).await?;
    Ok(Json(ForumRepo::new(&state.pool).list(id.as_str()).await?))
}

/// POST /courses/{id}/posts
async fn create_post(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(raw_id): Path<String>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let id = course_id(&raw_id)?;
    let content = Content::new("content", &req.content)?;
    require_forum_access(&state, &user, &id).await?;

    let post = ForumRepo::new(&state.pool)
        .create_post(id.as_str(), &user.email, &content)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// POST /courses/{id}/posts/{post_no}/comments
async fn create_comment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((raw_id, post_no)): Path<(String, i64)>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let id = course_id(&raw_id)?;
    let content = Content::new("content", &req.content)?;
    require_forum_access(&state, &user, &id).await?;

    let comment = ForumRepo::new(&state.pool)
        .create_comment(id.as_str(), post_no, &user.email, &content)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Forum routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/courses/{id}/posts", get(list_posts).post(create_post))
        .route("/courses/{id}/posts/{post_no}/comments", post(create_comment))
}
