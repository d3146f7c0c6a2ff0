/// Log model, access resolver and search builder
///
/// A log is a free-text record entry owned by exactly one client. Users
/// never query logs directly by ownership: visibility is resolved through
/// the `client_user` membership table, so a user sees a log iff they are
/// assigned to the log's client.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE logs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     slug VARCHAR(255) NOT NULL UNIQUE,
///     title VARCHAR(191) NOT NULL,
///     description TEXT NOT NULL,
///     body TEXT NOT NULL,
///     notes TEXT NOT NULL DEFAULT '',
///     client_id UUID NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
///     user_created UUID NOT NULL REFERENCES users(id),
///     user_modified UUID REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Free text is stored as plain text: cleaning (tag strip + trim) happens
/// on write, HTML escaping only at the presentation boundary. The slug is
/// the public identifier used in URLs; the UUID stays internal.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::sanitize;

/// Log model, the full row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Log {
    /// Unique log ID (UUID v4), internal only
    pub id: Uuid,

    /// URL-safe public identifier, unique
    pub slug: String,

    /// Short title (5..=191 chars, validated at the API boundary)
    pub title: String,

    /// Summary of the entry
    pub description: String,

    /// Full text of the entry
    pub body: String,

    /// Free-form notes, may be empty
    pub notes: String,

    /// Owning client
    pub client_id: Uuid,

    /// User who created the entry
    pub user_created: Uuid,

    /// User who last modified the entry (None until the first update)
    pub user_modified: Option<Uuid>,

    /// When the entry was created
    pub created_at: DateTime<Utc>,

    /// When the entry was last updated
    pub updated_at: DateTime<Utc>,
}

/// Projection returned by the access resolver and the listing endpoint
///
/// Only the columns the listing needs: {id, slug, title, description,
/// created_at, updated_at}.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LogSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLog {
    /// Owning client
    pub client_id: Uuid,

    /// Acting user, stamped as `user_created`
    pub user_created: Uuid,

    pub title: String,
    pub description: String,
    pub body: String,

    /// Optional notes; absent means empty
    pub notes: Option<String>,
}

/// Input for updating an existing log
///
/// All four free-text fields are overwritten; there is no partial update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogUpdate {
    pub title: String,
    pub description: String,
    pub body: String,
    pub notes: Option<String>,
}

/// Raw search parameters from the listing request
///
/// `search` is the free-text term; the remaining fields are
/// presence-as-boolean flags selecting which columns to match. See
/// [`LogSearch::to_sql`] for the AND/OR semantics.
#[derive(Debug, Clone, Default)]
pub struct LogSearch {
    /// Free-text term; None disables filtering entirely
    pub search: Option<String>,

    /// Match against the title column
    pub title: bool,

    /// Match against the description column
    pub desc: bool,

    /// Match against the body column
    pub body: bool,

    /// Match against the creation date
    pub created_at: bool,

    /// Match against the last-update date
    pub updated_at: bool,
}

impl LogSearch {
    /// Whether any field flag is set
    pub fn has_field_flags(&self) -> bool {
        self.title || self.desc || self.body || self.created_at || self.updated_at
    }

    /// Builds the SQL filter fragment and its single bind value
    ///
    /// Returns None when no `search` param is present (the filter is a
    /// no-op). Otherwise returns a parenthesized condition referencing one
    /// placeholder `$bind_index`, plus the `%term%` pattern to bind there.
    /// The term is tag-stripped first; binding stays parameterized, so the
    /// strip only keeps the matchable term set aligned with what can be
    /// stored.
    ///
    /// Semantics:
    /// - At least one field flag set: conjunction (AND) over exactly the
    ///   flagged columns; date columns compare the date's string form
    ///   (`::date::text`).
    /// - No field flags: disjunction (OR) over all five columns; the
    ///   timestamp columns compare their full text form here.
    ///
    /// A present-but-empty term still produces a `%%` pattern, which
    /// matches every row. That is deliberate: an empty search with flags
    /// set means "show everything in these fields".
    ///
    /// # Example
    ///
    /// ```
    /// use worklog_shared::models::log::LogSearch;
    ///
    /// let search = LogSearch {
    ///     search: Some("outage".to_string()),
    ///     title: true,
    ///     ..Default::default()
    /// };
    ///
    /// let (condition, pattern) = search.to_sql(2).unwrap();
    /// assert_eq!(condition, "(logs.title LIKE $2)");
    /// assert_eq!(pattern, "%outage%");
    /// ```
    pub fn to_sql(&self, bind_index: usize) -> Option<(String, String)> {
        let term = self.search.as_deref()?;
        let pattern = format!("%{}%", sanitize::strip_tags(term));

        let conditions = if self.has_field_flags() {
            let mut conditions = Vec::new();
            if self.title {
                conditions.push(format!("logs.title LIKE ${bind_index}"));
            }
            if self.desc {
                conditions.push(format!("logs.description LIKE ${bind_index}"));
            }
            if self.body {
                conditions.push(format!("logs.body LIKE ${bind_index}"));
            }
            if self.created_at {
                conditions.push(format!("logs.created_at::date::text LIKE ${bind_index}"));
            }
            if self.updated_at {
                conditions.push(format!("logs.updated_at::date::text LIKE ${bind_index}"));
            }
            conditions.join(" AND ")
        } else {
            [
                format!("logs.title LIKE ${bind_index}"),
                format!("logs.description LIKE ${bind_index}"),
                format!("logs.body LIKE ${bind_index}"),
                format!("logs.created_at::text LIKE ${bind_index}"),
                format!("logs.updated_at::text LIKE ${bind_index}"),
            ]
            .join(" OR ")
        };

        Some((format!("({conditions})"), pattern))
    }
}

/// Columns selected for every `Log` row
const LOG_COLUMNS: &str = "id, slug, title, description, body, notes, client_id, \
     user_created, user_modified, created_at, updated_at";

/// Summary columns, table-qualified for the membership join
const SUMMARY_COLUMNS: &str =
    "logs.id, logs.slug, logs.title, logs.description, logs.created_at, logs.updated_at";

impl Log {
    /// Creates a new log entry
    ///
    /// Free-text fields are cleaned (tag-stripped and trimmed) and the slug
    /// is generated from the cleaned title with a random suffix to keep it
    /// unique. The caller is responsible for having checked that
    /// `user_created` is assigned to `client_id`.
    pub async fn create(pool: &PgPool, data: CreateLog) -> Result<Self, sqlx::Error> {
        let title = sanitize::clean(&data.title);
        let slug = generate_slug(&title);

        let log = sqlx::query_as::<_, Log>(&format!(
            r#"
            INSERT INTO logs (slug, title, description, body, notes, client_id, user_created)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {LOG_COLUMNS}
            "#,
        ))
        .bind(&slug)
        .bind(&title)
        .bind(sanitize::clean(&data.description))
        .bind(sanitize::clean(&data.body))
        .bind(sanitize::clean(data.notes.as_deref().unwrap_or("")))
        .bind(data.client_id)
        .bind(data.user_created)
        .fetch_one(pool)
        .await?;

        Ok(log)
    }

    /// Finds a log by its internal ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let log = sqlx::query_as::<_, Log>(&format!(
            "SELECT {LOG_COLUMNS} FROM logs WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(log)
    }

    /// Finds a log by its public slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        let log = sqlx::query_as::<_, Log>(&format!(
            "SELECT {LOG_COLUMNS} FROM logs WHERE slug = $1",
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(log)
    }

    /// Resolves the set of logs visible to a user
    ///
    /// Joins `logs` to `client_user` on the owning client and filters by
    /// the user's memberships. `GROUP BY logs.id` deduplicates in case of
    /// redundant membership rows; ordering is by log id ascending and
    /// nothing stronger is guaranteed. A user with no memberships gets an
    /// empty vec.
    pub async fn visible_to_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<LogSummary>, sqlx::Error> {
        let logs = sqlx::query_as::<_, LogSummary>(&format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM logs
            LEFT JOIN client_user ON logs.client_id = client_user.client_id
            WHERE client_user.user_id = $1
            GROUP BY logs.id
            ORDER BY logs.id ASC
            "#,
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(logs)
    }

    /// Resolves visible logs with the search filter and pagination applied
    ///
    /// Composes [`Log::visible_to_user`]'s membership join with the
    /// [`LogSearch`] fragment. With no search term this is the plain
    /// resolver plus LIMIT/OFFSET.
    pub async fn search_visible_to_user(
        pool: &PgPool,
        user_id: Uuid,
        search: &LogSearch,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LogSummary>, sqlx::Error> {
        let mut query = format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM logs
            LEFT JOIN client_user ON logs.client_id = client_user.client_id
            WHERE client_user.user_id = $1
            "#,
        );

        let filter = search.to_sql(2);
        if let Some((condition, _)) = &filter {
            query.push_str(&format!(" AND {condition}"));
        }

        let (limit_bind, offset_bind) = if filter.is_some() { (3, 4) } else { (2, 3) };
        query.push_str(&format!(
            " GROUP BY logs.id ORDER BY logs.id ASC LIMIT ${limit_bind} OFFSET ${offset_bind}"
        ));

        let mut q = sqlx::query_as::<_, LogSummary>(&query).bind(user_id);
        if let Some((_, pattern)) = filter {
            q = q.bind(pattern);
        }
        let logs = q.bind(limit).bind(offset).fetch_all(pool).await?;

        Ok(logs)
    }

    /// Counts the visible logs matching a search, for pagination totals
    pub async fn count_visible_to_user(
        pool: &PgPool,
        user_id: Uuid,
        search: &LogSearch,
    ) -> Result<i64, sqlx::Error> {
        let mut query = String::from(
            r#"
            SELECT COUNT(DISTINCT logs.id)
            FROM logs
            LEFT JOIN client_user ON logs.client_id = client_user.client_id
            WHERE client_user.user_id = $1
            "#,
        );

        let filter = search.to_sql(2);
        if let Some((condition, _)) = &filter {
            query.push_str(&format!(" AND {condition}"));
        }

        let mut q = sqlx::query_scalar::<_, i64>(&query).bind(user_id);
        if let Some((_, pattern)) = filter {
            q = q.bind(pattern);
        }
        let count = q.fetch_one(pool).await?;

        Ok(count)
    }

    /// Lists a client's logs, newest first
    pub async fn list_by_client(
        pool: &PgPool,
        client_id: Uuid,
    ) -> Result<Vec<LogSummary>, sqlx::Error> {
        let logs = sqlx::query_as::<_, LogSummary>(
            r#"
            SELECT id, slug, title, description, created_at, updated_at
            FROM logs
            WHERE client_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(pool)
        .await?;

        Ok(logs)
    }

    /// Updates a log's free-text fields
    ///
    /// Overwrites title, description, body and notes with cleaned values,
    /// stamps `user_modified` to the acting user and refreshes
    /// `updated_at`. Validation happens before this call, so there are no
    /// partial writes: either the whole row updates or nothing does.
    ///
    /// # Returns
    ///
    /// True if a row was written, false if the log doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        acting_user: Uuid,
        data: LogUpdate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE logs
            SET title = $2,
                description = $3,
                body = $4,
                notes = $5,
                user_modified = $6,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(sanitize::clean(&data.title))
        .bind(sanitize::clean(&data.description))
        .bind(sanitize::clean(&data.body))
        .bind(sanitize::clean(data.notes.as_deref().unwrap_or("")))
        .bind(acting_user)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a log by ID; returns true if a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM logs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Reduces a title to a URL-safe slug base
///
/// Lowercases, maps runs of non-alphanumeric characters to single dashes
/// and trims leading/trailing dashes. May return an empty string for
/// titles with no alphanumeric content.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    out
}

/// Generates a unique slug from a title
///
/// Appends a short random suffix to the slugified title so that two logs
/// with the same title get distinct slugs without a retry loop.
pub fn generate_slug(title: &str) -> String {
    const SUFFIX_LEN: usize = 6;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    let base = slugify(title);
    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_with(term: Option<&str>) -> LogSearch {
        LogSearch {
            search: term.map(|t| t.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_search_term_is_noop() {
        let search = LogSearch {
            search: None,
            title: true,
            desc: true,
            ..Default::default()
        };
        assert!(search.to_sql(2).is_none());
    }

    #[test]
    fn test_unscoped_search_ors_all_fields() {
        let search = search_with(Some("foo"));

        let (condition, pattern) = search.to_sql(2).unwrap();
        assert_eq!(pattern, "%foo%");
        assert_eq!(
            condition,
            "(logs.title LIKE $2 OR logs.description LIKE $2 OR logs.body LIKE $2 \
             OR logs.created_at::text LIKE $2 OR logs.updated_at::text LIKE $2)"
        );
    }

    #[test]
    fn test_single_flag_degenerates_to_one_condition() {
        let search = LogSearch {
            search: Some("foo".to_string()),
            title: true,
            ..Default::default()
        };

        let (condition, _) = search.to_sql(2).unwrap();
        assert_eq!(condition, "(logs.title LIKE $2)");
    }

    #[test]
    fn test_multiple_flags_are_conjoined() {
        let search = LogSearch {
            search: Some("foo".to_string()),
            title: true,
            desc: true,
            created_at: true,
            ..Default::default()
        };

        let (condition, _) = search.to_sql(3).unwrap();
        assert_eq!(
            condition,
            "(logs.title LIKE $3 AND logs.description LIKE $3 \
             AND logs.created_at::date::text LIKE $3)"
        );
    }

    #[test]
    fn test_date_flags_compare_date_text() {
        let search = LogSearch {
            search: Some("2026-01".to_string()),
            updated_at: true,
            ..Default::default()
        };

        let (condition, pattern) = search.to_sql(2).unwrap();
        assert_eq!(condition, "(logs.updated_at::date::text LIKE $2)");
        assert_eq!(pattern, "%2026-01%");
    }

    #[test]
    fn test_empty_term_with_flags_matches_everything() {
        let search = LogSearch {
            search: Some(String::new()),
            title: true,
            ..Default::default()
        };

        let (condition, pattern) = search.to_sql(2).unwrap();
        assert_eq!(condition, "(logs.title LIKE $2)");
        assert_eq!(pattern, "%%");
    }

    #[test]
    fn test_search_term_is_tag_stripped() {
        let search = search_with(Some("<b>foo</b>"));

        let (_, pattern) = search.to_sql(2).unwrap();
        assert_eq!(pattern, "%foo%");
    }

    #[test]
    fn test_has_field_flags() {
        assert!(!search_with(Some("x")).has_field_flags());

        let search = LogSearch {
            body: true,
            ..Default::default()
        };
        assert!(search.has_field_flags());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Incident A"), "incident-a");
        assert_eq!(slugify("  Power -- Outage!  "), "power-outage");
        assert_eq!(slugify("Case #42: DB down"), "case-42-db-down");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_generate_slug_appends_suffix() {
        let slug = generate_slug("Incident A");
        assert!(slug.starts_with("incident-a-"));
        assert_eq!(slug.len(), "incident-a-".len() + 6);
    }

    #[test]
    fn test_generate_slug_empty_title_still_yields_slug() {
        let slug = generate_slug("???");
        assert_eq!(slug.len(), 6);
        assert!(slug.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_slug_is_unique_per_call() {
        let a = generate_slug("Same Title");
        let b = generate_slug("Same Title");
        assert_ne!(a, b);
    }

    // Resolver and update semantics against a live database are covered by
    // the api crate's integration tests.
}
