//! Command implementations for the coursectl CLI

pub mod db;
pub mod import;
pub mod serve;

// Re-export dispatcher functions for flat access from main.rs
pub use db::run_db;
pub use import::run_import;
pub use serve::run_serve;
