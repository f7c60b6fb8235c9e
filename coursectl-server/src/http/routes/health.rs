//! Health check endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::server::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "ok",
        Err(err) => {
            tracing::warn!("health check query failed: {}", err);
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[tokio::test]
    async fn health_returns_ok() {
        let pool = open_in_memory().await.unwrap();
        let state = Arc::new(AppState::new(pool));
        let Json(body) = health(State(state)).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.database, "ok");
    }
}
