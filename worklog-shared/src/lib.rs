//! # Worklog Shared Library
//!
//! Shared types and business logic used by the Worklog API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models, the access resolver and the search builder
//! - `auth`: Password hashing, JWT tokens and the axum auth middleware
//! - `db`: Connection pool and migration runner
//! - `sanitize`: Storage-time text cleaning for free-text fields

pub mod auth;
pub mod db;
pub mod models;
pub mod sanitize;

/// Current version of the Worklog shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
