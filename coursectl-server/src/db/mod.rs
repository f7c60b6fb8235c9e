//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - The pool is injected everywhere; nothing opens its own connection
//! - List operations use JOINs - no N+1 queries
//! - Multi-table writes run in one transaction
//! - Rely on key constraints and report conflicts, not check-then-insert

pub mod pool;
pub mod repos;
pub mod schema;

pub use pool::{begin_write, create_pool, create_pool_with_options, open_in_memory};
pub use repos::*;
