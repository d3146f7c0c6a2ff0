/// User model and database operations
///
/// Users authenticate against the API and gain visibility of logs through
/// client memberships (see the `client_user` model).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(100) NOT NULL UNIQUE,
///     email CITEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role VARCHAR(50) NOT NULL DEFAULT 'member',
///     first_name VARCHAR(100),
///     last_name VARCHAR(100),
///     building_number VARCHAR(50),
///     street_address VARCHAR(255),
///     postcode VARCHAR(20),
///     city VARCHAR(100),
///     contact_number VARCHAR(50),
///     last_login_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// There is no derived `name` column or accessor here: the display name is
/// computed by a pure helper at the presentation boundary, keeping this
/// struct a plain data record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::sanitize;

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Login name, unique across all users
    pub username: String,

    /// Email address (case-insensitive via CITEXT), unique
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Plain role label ("admin" or "member"); a permission framework is
    /// deliberately out of scope
    pub role: String,

    /// Optional given name
    pub first_name: Option<String>,

    /// Optional family name
    pub last_name: Option<String>,

    /// Optional address fields
    pub building_number: Option<String>,
    pub street_address: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,

    /// Optional phone number
    pub contact_number: Option<String>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Login name
    pub username: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT a plaintext password)
    pub password_hash: String,

    /// Optional given name
    pub first_name: Option<String>,

    /// Optional family name
    pub last_name: Option<String>,
}

/// Input for a profile update
///
/// Optional fields that are absent are written as SQL NULL, not skipped:
/// a profile update replaces the whole profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub building_number: Option<String>,
    pub street_address: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub contact_number: Option<String>,
}

/// Columns selected for every `User` row
const USER_COLUMNS: &str = "id, username, email, password_hash, role, first_name, last_name, \
     building_number, street_address, postcode, city, contact_number, \
     last_login_at, created_at, updated_at";

/// Table-qualified column list for queries that join `client_user`
/// (both tables carry a `created_at` column)
const USER_COLUMNS_QUALIFIED: &str =
    "users.id, users.username, users.email, users.password_hash, users.role, \
     users.first_name, users.last_name, users.building_number, users.street_address, \
     users.postcode, users.city, users.contact_number, users.last_login_at, \
     users.created_at, users.updated_at";

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the username or email already exists (unique
    /// constraint violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.first_name)
        .bind(data.last_name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive via CITEXT)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates a user's profile fields
    ///
    /// Every profile column is written: free-text values are cleaned
    /// (tag-stripped and trimmed) first, and absent optional fields become
    /// SQL NULL. The password, username and role are not touched here.
    ///
    /// # Returns
    ///
    /// True if a row was updated, false if the user doesn't exist.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UserProfileUpdate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2,
                last_name = $3,
                email = $4,
                building_number = $5,
                street_address = $6,
                postcode = $7,
                city = $8,
                contact_number = $9,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(sanitize::clean_opt(data.first_name.as_deref()))
        .bind(sanitize::clean_opt(data.last_name.as_deref()))
        .bind(sanitize::clean(&data.email))
        .bind(sanitize::clean_opt(data.building_number.as_deref()))
        .bind(sanitize::clean_opt(data.street_address.as_deref()))
        .bind(sanitize::clean_opt(data.postcode.as_deref()))
        .bind(sanitize::clean_opt(data.city.as_deref()))
        .bind(sanitize::clean_opt(data.contact_number.as_deref()))
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamps the last login timestamp, typically after successful
    /// authentication
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the users who share at least one client with the given user
    ///
    /// Excludes the user themselves; ordered by first name. This backs the
    /// colleague listing: the people whose log activity a user can see.
    pub async fn colleagues_of(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT DISTINCT {USER_COLUMNS_QUALIFIED}
            FROM users
            INNER JOIN client_user ON users.id = client_user.user_id
            WHERE users.id != $1
              AND client_user.client_id IN (
                  SELECT client_id FROM client_user WHERE user_id = $1
              )
            ORDER BY users.first_name ASC
            "#,
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Deletes a user by ID; returns true if a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_struct() {
        let create_user = CreateUser {
            username: "jdoe".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: Some("John".to_string()),
            last_name: None,
        };

        assert_eq!(create_user.username, "jdoe");
        assert_eq!(create_user.email, "test@example.com");
    }

    #[test]
    fn test_profile_update_default_is_all_absent() {
        let update = UserProfileUpdate::default();
        assert!(update.first_name.is_none());
        assert!(update.last_name.is_none());
        assert!(update.building_number.is_none());
        assert!(update.contact_number.is_none());
        assert!(update.email.is_empty());
    }

    // Integration tests for database operations live in the api crate's
    // tests/ directory against a real database.
}
