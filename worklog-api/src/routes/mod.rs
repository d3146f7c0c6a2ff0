/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `logs`: Log listing/search, detail, create, update, delete
/// - `clients`: Client CRUD and membership management
/// - `users`: Profile endpoints

pub mod auth;
pub mod clients;
pub mod health;
pub mod logs;
pub mod users;
