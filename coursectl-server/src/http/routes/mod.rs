//! Route handlers organized by resource

pub mod assignments;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod forum;
pub mod health;
pub mod profile;

use crate::http::error::ApiError;
use crate::models::CourseId;

/// Validate a course id taken from the path.
pub(crate) fn course_id(raw: &str) -> Result<CourseId, ApiError> {
    Ok(CourseId::new(raw)?)
}
