//! Personal Wellness Tracker Backend Library
//!
//! This library provides the core functionality for the wellness tracker
//! backend: password-based authentication, bearer-token authorization, and
//! per-user habit tracking over a SQLite store.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;

// Re-export commonly used types
pub use api::ApiServer;
pub use crate::core::Config;
pub use db::DatabaseManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for the library
pub type Result<T> = anyhow::Result<T>;
