/// Log endpoints: listing/search, detail, create, update, delete
///
/// # Endpoints
///
/// - `GET    /v1/logs` - Paginated listing of the caller's visible logs
/// - `POST   /v1/logs` - Create a log
/// - `GET    /v1/logs/:slug` - Detail
/// - `PUT    /v1/logs/:slug` - Update
/// - `DELETE /v1/logs/:slug` - Delete
///
/// Visibility is always resolved through client membership: every route
/// here checks that the caller is assigned to the log's owning client.
///
/// # Listing query parameters
///
/// `search` is the free-text term. `title`, `desc`, `body`, `created_at`
/// and `updated_at` are presence-as-boolean flags: if any are present the
/// term must match all flagged fields (AND); with no flags it may match
/// any field (OR). `page` and `per_page` control pagination.

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
    render,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use worklog_shared::{
    auth::middleware::AuthContext,
    models::{
        client_user::ClientUser,
        log::{CreateLog, Log, LogSearch, LogUpdate},
    },
};

/// Default page size for the listing
const DEFAULT_PER_PAGE: i64 = 25;

/// Upper bound on the page size
const MAX_PER_PAGE: i64 = 100;

/// Query parameters for the listing endpoint
///
/// The field flags are deserialized as `Option<String>` because presence
/// is what matters, not the value: `?title` and `?title=on` both set the
/// flag.
#[derive(Debug, Default, Deserialize)]
pub struct ListLogsQuery {
    /// Free-text search term
    pub search: Option<String>,

    /// Field flags (presence-as-boolean)
    pub title: Option<String>,
    pub desc: Option<String>,
    pub body: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,

    /// 1-based page number
    pub page: Option<i64>,

    /// Page size (clamped to 100)
    pub per_page: Option<i64>,
}

impl ListLogsQuery {
    /// Converts the raw query into the model-layer search parameters
    fn to_search(&self) -> LogSearch {
        LogSearch {
            search: self.search.clone(),
            title: self.title.is_some(),
            desc: self.desc.is_some(),
            body: self.body.is_some(),
            created_at: self.created_at.is_some(),
            updated_at: self.updated_at.is_some(),
        }
    }
}

/// One row of the listing response
///
/// `description` is escaped for display; `short_description` is the plain
/// truncated form.
#[derive(Debug, Serialize)]
pub struct LogSummaryResponse {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Paginated listing response
#[derive(Debug, Serialize)]
pub struct ListLogsResponse {
    pub items: Vec<LogSummaryResponse>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// Create log request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLogRequest {
    /// Owning client
    pub client_id: Uuid,

    #[validate(length(min = 5, max = 191, message = "Title must be 5-191 characters"))]
    pub title: String,

    #[validate(length(min = 20, message = "Description must be at least 20 characters"))]
    pub description: String,

    #[validate(length(min = 20, message = "Body must be at least 20 characters"))]
    pub body: String,

    /// Optional notes
    pub notes: Option<String>,
}

/// Update log request
///
/// Same validation rules as creation; the owning client cannot change.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLogRequest {
    #[validate(length(min = 5, max = 191, message = "Title must be 5-191 characters"))]
    pub title: String,

    #[validate(length(min = 20, message = "Description must be at least 20 characters"))]
    pub description: String,

    #[validate(length(min = 20, message = "Body must be at least 20 characters"))]
    pub body: String,

    pub notes: Option<String>,
}

/// Full log detail response
///
/// `description`, `body` and `notes` are HTML-escaped with newlines
/// converted to `<br />`; the `edit_*` variants carry the stored plain
/// text for edit forms.
#[derive(Debug, Serialize)]
pub struct LogDetailResponse {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub notes: String,
    pub edit_description: String,
    pub edit_body: String,
    pub edit_notes: String,
    pub short_description: String,
    pub path: String,
    pub client_id: Uuid,
    pub user_created: Uuid,
    pub user_modified: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LogDetailResponse {
    fn from_log(log: Log, base_url: &str) -> Self {
        Self {
            path: render::log_path(base_url, &log.slug),
            slug: log.slug,
            title: log.title,
            description: render::render_multiline(&log.description),
            body: render::render_multiline(&log.body),
            notes: render::render_multiline(&log.notes),
            edit_description: render::edit_text(&log.description),
            edit_body: render::edit_text(&log.body),
            edit_notes: render::edit_text(&log.notes),
            short_description: render::short_description(&log.description),
            client_id: log.client_id,
            user_created: log.user_created,
            user_modified: log.user_modified,
            created_at: log.created_at,
            updated_at: log.updated_at,
        }
    }
}

/// Requires that the caller is assigned to a client
async fn require_membership(
    state: &AppState,
    client_id: Uuid,
    user_id: Uuid,
) -> Result<(), ApiError> {
    let assigned = ClientUser::is_assigned(&state.db, client_id, user_id).await?;

    if !assigned {
        return Err(ApiError::Forbidden(
            "Not assigned to this log's client".to_string(),
        ));
    }

    Ok(())
}

/// Lists the caller's visible logs with search and pagination
///
/// # Endpoint
///
/// ```text
/// GET /v1/logs?search=outage&title&desc&page=1&per_page=25
/// ```
pub async fn list_logs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListLogsQuery>,
) -> ApiResult<Json<ListLogsResponse>> {
    let search = query.to_search();

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    let offset = (page - 1) * per_page;

    let total = Log::count_visible_to_user(&state.db, auth.user_id, &search).await?;
    let summaries =
        Log::search_visible_to_user(&state.db, auth.user_id, &search, per_page, offset).await?;

    let items = summaries
        .into_iter()
        .map(|summary| LogSummaryResponse {
            path: render::log_path(state.base_url(), &summary.slug),
            short_description: render::short_description(&summary.description),
            description: render::render_multiline(&summary.description),
            id: summary.id,
            slug: summary.slug,
            title: summary.title,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
        })
        .collect();

    Ok(Json(ListLogsResponse {
        items,
        page,
        per_page,
        total,
    }))
}

/// Creates a log entry
///
/// The caller must be assigned to the target client.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: validation failed
/// - `403 Forbidden`: caller is not assigned to the client
pub async fn create_log(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateLogRequest>,
) -> ApiResult<(StatusCode, Json<LogDetailResponse>)> {
    req.validate().map_err(validation_error)?;

    require_membership(&state, req.client_id, auth.user_id).await?;

    let log = Log::create(
        &state.db,
        CreateLog {
            client_id: req.client_id,
            user_created: auth.user_id,
            title: req.title,
            description: req.description,
            body: req.body,
            notes: req.notes,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(LogDetailResponse::from_log(log, state.base_url())),
    ))
}

/// Fetches a log by slug
///
/// # Errors
///
/// - `404 Not Found`: no log with this slug
/// - `403 Forbidden`: caller is not assigned to the log's client
pub async fn get_log(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(slug): Path<String>,
) -> ApiResult<Json<LogDetailResponse>> {
    let log = Log::find_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("Log not found".to_string()))?;

    require_membership(&state, log.client_id, auth.user_id).await?;

    Ok(Json(LogDetailResponse::from_log(log, state.base_url())))
}

/// Updates a log's free-text fields
///
/// Overwrites title, description, body and notes with cleaned values and
/// stamps `user_modified` to the caller. Validation failures leave the row
/// untouched.
///
/// # Errors
///
/// - `404 Not Found`: no log with this slug
/// - `403 Forbidden`: caller is not assigned to the log's client
/// - `422 Unprocessable Entity`: validation failed
pub async fn update_log(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(slug): Path<String>,
    Json(req): Json<UpdateLogRequest>,
) -> ApiResult<Json<LogDetailResponse>> {
    req.validate().map_err(validation_error)?;

    let log = Log::find_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("Log not found".to_string()))?;

    require_membership(&state, log.client_id, auth.user_id).await?;

    let updated = Log::update(
        &state.db,
        log.id,
        auth.user_id,
        LogUpdate {
            title: req.title,
            description: req.description,
            body: req.body,
            notes: req.notes,
        },
    )
    .await?;

    if !updated {
        return Err(ApiError::NotFound("Log not found".to_string()));
    }

    let log = Log::find_by_id(&state.db, log.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Log not found".to_string()))?;

    Ok(Json(LogDetailResponse::from_log(log, state.base_url())))
}

/// Deletes a log
///
/// # Errors
///
/// - `404 Not Found`: no log with this slug
/// - `403 Forbidden`: caller is not assigned to the log's client
pub async fn delete_log(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(slug): Path<String>,
) -> ApiResult<StatusCode> {
    let log = Log::find_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("Log not found".to_string()))?;

    require_membership(&state, log.client_id, auth.user_id).await?;

    Log::delete(&state.db, log.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
