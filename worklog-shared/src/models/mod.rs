/// Database models for Worklog
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, profile updates and authentication data
/// - `client`: Organizations that own logs
/// - `client_user`: Many-to-many membership linking users to clients
/// - `log`: Log entries, the access resolver and the search builder
///
/// # Example
///
/// ```no_run
/// use worklog_shared::models::user::{User, CreateUser};
/// use worklog_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     username: "jdoe".to_string(),
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     first_name: Some("John".to_string()),
///     last_name: Some("Doe".to_string()),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod client;
pub mod client_user;
pub mod log;
pub mod user;
