//! HTTP server layer
//!
//! Axum server with:
//! - Bearer-token sessions
//! - CORS (localhost only by default)
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use extractors::AuthUser;
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
