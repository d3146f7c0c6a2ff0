/// Membership model: the `client_user` join table
///
/// A row links a user to a client and grants the user visibility of that
/// client's logs. It is membership, not ownership: many users can be
/// assigned to a client, and a user can be assigned to many clients.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE client_user (
///     client_id UUID NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (client_id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use worklog_shared::models::client_user::ClientUser;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, client_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// ClientUser::assign(&pool, client_id, user_id).await?;
/// assert!(ClientUser::is_assigned(&pool, client_id, user_id).await?);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A single membership row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClientUser {
    /// Client the user is assigned to
    pub client_id: Uuid,

    /// Assigned user
    pub user_id: Uuid,

    /// When the assignment was made
    pub created_at: DateTime<Utc>,
}

impl ClientUser {
    /// Assigns a user to a client
    ///
    /// # Errors
    ///
    /// Returns an error if the pair already exists (primary key violation)
    /// or either side doesn't exist (foreign key violation).
    pub async fn assign(pool: &PgPool, client_id: Uuid, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, ClientUser>(
            r#"
            INSERT INTO client_user (client_id, user_id)
            VALUES ($1, $2)
            RETURNING client_id, user_id, created_at
            "#,
        )
        .bind(client_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(membership)
    }

    /// Removes a user's assignment to a client
    ///
    /// # Returns
    ///
    /// True if a membership row was removed, false if none existed.
    pub async fn unassign(
        pool: &PgPool,
        client_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM client_user WHERE client_id = $1 AND user_id = $2")
            .bind(client_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether a user is assigned to a client
    ///
    /// This is the single-resource authorization question behind the log
    /// detail and update routes: a user may touch a log iff they are
    /// assigned to the log's owning client.
    pub async fn is_assigned(
        pool: &PgPool,
        client_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM client_user
                WHERE client_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(client_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists all memberships for a user, oldest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, ClientUser>(
            r#"
            SELECT client_id, user_id, created_at
            FROM client_user
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }

    /// Lists all memberships for a client, oldest first
    pub async fn list_for_client(pool: &PgPool, client_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, ClientUser>(
            r#"
            SELECT client_id, user_id, created_at
            FROM client_user
            WHERE client_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(client_id)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_user_serializes() {
        let row = ClientUser {
            client_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&row).unwrap();
        assert!(json["client_id"].is_string());
        assert!(json["user_id"].is_string());
    }

    // Membership semantics against a live database are covered by the api
    // crate's integration tests.
}
