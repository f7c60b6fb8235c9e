//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::clock::{Clock, SystemClock};
use crate::rules::CapacityPolicy;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    pub cors_permissive: bool,

    /// How section limits are enforced on enroll
    pub capacity_policy: CapacityPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
            capacity_policy: CapacityPolicy::default(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// Source of "today" for drop deadlines
    pub clock: Arc<dyn Clock>,
    pub capacity_policy: CapacityPolicy,
}

impl AppState {
    /// State with the wall clock and the default capacity policy.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
            capacity_policy: CapacityPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_capacity_policy(mut self, policy: CapacityPolicy) -> Self {
        self.capacity_policy = policy;
        self
    }
}

/// Build the application router without binding a socket.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::profile::router())
        .merge(routes::dashboard::router())
        .merge(routes::courses::router())
        .merge(routes::assignments::router())
        .merge(routes::forum::router())
        .with_state(Arc::new(state))
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("sqlite://coursectl.db").await?;
/// run_server(pool, ServerConfig::default()).await?;
/// ```
pub async fn run_server(pool: SqlitePool, config: ServerConfig) -> Result<(), ServerError> {
    let state = AppState::new(pool).with_capacity_policy(config.capacity_policy);
    tracing::info!(capacity_policy = config.capacity_policy.as_str(), "enrollment policy");

    // CORS configuration
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        // Localhost only
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://localhost:3030"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
                HeaderValue::from_static("http://127.0.0.1:3030"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
