/// Client model and database operations
///
/// A client is an organization/tenant: it owns logs and has member users
/// via the `client_user` join table. Deleting a client cascades to its
/// logs and membership rows.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE clients (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     company VARCHAR(191) NOT NULL,
///     first_name VARCHAR(100),
///     last_name VARCHAR(100),
///     email VARCHAR(255),
///     contact_number VARCHAR(50),
///     building_number VARCHAR(50),
///     street_address VARCHAR(255),
///     postcode VARCHAR(20),
///     city VARCHAR(100),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::sanitize;

/// Client model representing an organization that owns logs
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    /// Unique client ID (UUID v4)
    pub id: Uuid,

    /// Company name
    pub company: String,

    /// Contact person given name
    pub first_name: Option<String>,

    /// Contact person family name
    pub last_name: Option<String>,

    /// Contact email
    pub email: Option<String>,

    /// Contact phone number
    pub contact_number: Option<String>,

    /// Address fields
    pub building_number: Option<String>,
    pub street_address: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,

    /// When the client was created
    pub created_at: DateTime<Utc>,

    /// When the client was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClient {
    /// Company name (required)
    pub company: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub building_number: Option<String>,
    pub street_address: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
}

/// Input for updating an existing client
///
/// Only non-None fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClient {
    pub company: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub building_number: Option<String>,
    pub street_address: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
}

/// Columns selected for every `Client` row
const CLIENT_COLUMNS: &str = "id, company, first_name, last_name, email, contact_number, \
     building_number, street_address, postcode, city, created_at, updated_at";

/// Table-qualified column list for queries that join `client_user`
/// (both tables carry a `created_at` column)
const CLIENT_COLUMNS_QUALIFIED: &str =
    "clients.id, clients.company, clients.first_name, clients.last_name, clients.email, \
     clients.contact_number, clients.building_number, clients.street_address, \
     clients.postcode, clients.city, clients.created_at, clients.updated_at";

impl Client {
    /// Creates a new client
    ///
    /// Free-text fields are cleaned (tag-stripped and trimmed) before the
    /// write.
    pub async fn create(pool: &PgPool, data: CreateClient) -> Result<Self, sqlx::Error> {
        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clients (company, first_name, last_name, email, contact_number,
                                 building_number, street_address, postcode, city)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CLIENT_COLUMNS}
            "#,
        ))
        .bind(sanitize::clean(&data.company))
        .bind(sanitize::clean_opt(data.first_name.as_deref()))
        .bind(sanitize::clean_opt(data.last_name.as_deref()))
        .bind(sanitize::clean_opt(data.email.as_deref()))
        .bind(sanitize::clean_opt(data.contact_number.as_deref()))
        .bind(sanitize::clean_opt(data.building_number.as_deref()))
        .bind(sanitize::clean_opt(data.street_address.as_deref()))
        .bind(sanitize::clean_opt(data.postcode.as_deref()))
        .bind(sanitize::clean_opt(data.city.as_deref()))
        .fetch_one(pool)
        .await?;

        Ok(client)
    }

    /// Finds a client by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(client)
    }

    /// Updates an existing client
    ///
    /// Only non-None fields in `data` are written; the query is built
    /// dynamically from the fields present.
    ///
    /// # Returns
    ///
    /// The updated client if found, None if the client doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateClient,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE clients SET updated_at = NOW()");
        let mut bind_count = 1;

        let fields = [
            ("company", data.company.is_some()),
            ("first_name", data.first_name.is_some()),
            ("last_name", data.last_name.is_some()),
            ("email", data.email.is_some()),
            ("contact_number", data.contact_number.is_some()),
            ("building_number", data.building_number.is_some()),
            ("street_address", data.street_address.is_some()),
            ("postcode", data.postcode.is_some()),
            ("city", data.city.is_some()),
        ];

        for (column, present) in fields {
            if present {
                bind_count += 1;
                query.push_str(&format!(", {} = ${}", column, bind_count));
            }
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {CLIENT_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Client>(&query).bind(id);

        for value in [
            data.company,
            data.first_name,
            data.last_name,
            data.email,
            data.contact_number,
            data.building_number,
            data.street_address,
            data.postcode,
            data.city,
        ]
        .into_iter()
        .flatten()
        {
            q = q.bind(sanitize::clean(&value));
        }

        let client = q.fetch_optional(pool).await?;

        Ok(client)
    }

    /// Deletes a client by ID
    ///
    /// Cascades to the client's logs and membership rows.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the clients a user is assigned to, ordered by company name
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let clients = sqlx::query_as::<_, Client>(&format!(
            r#"
            SELECT {CLIENT_COLUMNS_QUALIFIED}
            FROM clients
            INNER JOIN client_user ON clients.id = client_user.client_id
            WHERE client_user.user_id = $1
            ORDER BY clients.company ASC
            "#,
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(clients)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_client_default() {
        let update = UpdateClient::default();
        assert!(update.company.is_none());
        assert!(update.email.is_none());
        assert!(update.city.is_none());
    }

    #[test]
    fn test_create_client_optional_fields() {
        let create = CreateClient {
            company: "Acme Ltd".to_string(),
            first_name: None,
            last_name: None,
            email: Some("office@acme.example".to_string()),
            contact_number: None,
            building_number: None,
            street_address: None,
            postcode: None,
            city: None,
        };
        assert_eq!(create.company, "Acme Ltd");
        assert!(create.first_name.is_none());
    }
}
