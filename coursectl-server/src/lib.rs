//! coursectl-server: course management over a single SQLite file
//!
//! Tracks students, professors, courses, sections, enrollments, homework and
//! exam grades, and a per-course forum. Exposes the business rules through a
//! JSON HTTP API and loads roster exports from CSV.

pub mod auth;
pub mod clock;
pub mod db;
pub mod http;
pub mod import;
pub mod models;
pub mod rules;

pub use clock::{Clock, FixedClock, SystemClock};
pub use db::{create_pool, open_in_memory, DbError};
pub use http::{run_server, ApiError, AppState, ServerConfig};
pub use rules::{CapacityPolicy, DropOutcome, EnrollDecision};
